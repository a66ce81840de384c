use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table::{Table, Value};

/// Kind reported when no rule matches a message.
pub const UNKNOWN_KIND: &str = "unknown";

pub const DEFAULT_MESSAGE_COLUMN: &str = "Message";
pub const DEFAULT_KIND_COLUMN: &str = "Measurement";
pub const DEFAULT_VALUE_COLUMN: &str = "Value";

/// One named classification rule. A rule may carry several alternative
/// capture groups for differently worded phrasings of the same measurement;
/// exactly one is expected to capture on a successful match.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub kind: String,
    pub pattern: Regex,
}

impl PatternRule {
    pub fn new(kind: impl Into<String>, pattern: Regex) -> Self {
        Self {
            kind: kind.into(),
            pattern,
        }
    }
}

/// The (kind, value) outcome of classifying one message.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub kind: String,
    pub value: Option<f64>,
}

impl Extraction {
    fn unknown() -> Self {
        Self {
            kind: UNKNOWN_KIND.to_string(),
            value: None,
        }
    }
}

static DEFAULT_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    [
        ("Rainfall", r"(\d+(\.\d+)?)\s?mm"),
        ("Temperature", r"(\d+(\.\d+)?)\s?C"),
        (
            "Pollution_level",
            r"=\s*(-?\d+(\.\d+)?)|Pollution at \s*(-?\d+(\.\d+)?)",
        ),
    ]
    .iter()
    .map(|(kind, pattern)| {
        PatternRule::new(*kind, Regex::new(pattern).expect("default rule pattern"))
    })
    .collect()
});

/// Classifies free-text sensor messages into typed numeric measurements.
///
/// Rules are tried strictly in declared order and the first match wins, so
/// rule order defines precedence on ambiguous messages. The rule set is
/// fixed at construction.
pub struct MeasurementExtractor {
    rules: Vec<PatternRule>,
}

impl MeasurementExtractor {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Extractor with the stock rainfall / temperature / pollution rules.
    pub fn with_default_rules() -> Self {
        Self::new(DEFAULT_RULES.clone())
    }

    /// Classify one message.
    ///
    /// Returns the first matching rule's kind with the first non-absent
    /// captured group parsed as a float, or ("unknown", absent) when nothing
    /// matches. A matched capture that fails to parse is a contract
    /// violation in the rule set and surfaces as a parse error.
    pub fn extract(&self, message: &str) -> Result<Extraction> {
        for rule in &self.rules {
            let Some(captures) = rule.pattern.captures(message) else {
                continue;
            };
            let capture = captures
                .iter()
                .skip(1)
                .flatten()
                .next()
                .ok_or_else(|| {
                    PipelineError::Parse(format!(
                        "rule '{}' matched without capturing a value",
                        rule.kind
                    ))
                })?;
            let value: f64 = capture
                .as_str()
                .parse()
                .map_err(|_| PipelineError::Parse(capture.as_str().to_string()))?;
            debug!("message matched rule '{}' with value {}", rule.kind, value);
            return Ok(Extraction {
                kind: rule.kind.clone(),
                value: Some(value),
            });
        }
        Ok(Extraction::unknown())
    }

    /// Classify every message in a table, appending two parallel columns
    /// (kind and value) aligned by row. Rows whose message cell is not text
    /// come out as ("unknown", null).
    pub fn annotate_table(
        &self,
        table: &mut Table,
        message_column: &str,
        kind_column: &str,
        value_column: &str,
    ) -> Result<()> {
        let idx = table.column_index(message_column)?;
        let mut kinds = Vec::with_capacity(table.num_rows());
        let mut values = Vec::with_capacity(table.num_rows());
        for row in 0..table.num_rows() {
            let extraction = match table.value_at(row, idx).as_str() {
                Some(message) => self.extract(message)?,
                None => Extraction::unknown(),
            };
            kinds.push(Value::Text(extraction.kind));
            values.push(extraction.value.map(Value::Number).unwrap_or(Value::Null));
        }
        table.add_column(kind_column, kinds)?;
        table.add_column(value_column, values)?;
        Ok(())
    }
}

impl Default for MeasurementExtractor {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
