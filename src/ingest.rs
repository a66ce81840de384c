use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::{error, info};

use crate::error::{PipelineError, Result};
use crate::table::{Table, Value};

/// Handle to the survey database. Connecting validates the descriptor; a
/// bad path surfaces as a connection error.
pub struct DbEngine {
    conn: Connection,
}

impl DbEngine {
    pub fn connect(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| PipelineError::Connection(e.to_string()))?;
        info!("database engine created for '{}'", db_path);
        Ok(Self { conn })
    }

    /// Execute a query and materialize the result as a record table.
    ///
    /// SQLite NULLs become null cells, INTEGER/REAL become numbers, TEXT
    /// becomes text. Zero rows is an empty-result error, not an empty table.
    pub fn query(&self, sql: &str) -> Result<Table> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| PipelineError::Query(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let num_columns = columns.len();
        let mut table = Table::new(columns)?;

        let mut rows = stmt
            .query([])
            .map_err(|e| PipelineError::Query(e.to_string()))?;
        while let Some(row) = rows.next().map_err(|e| PipelineError::Query(e.to_string()))? {
            let mut cells = Vec::with_capacity(num_columns);
            for i in 0..num_columns {
                let cell = match row
                    .get_ref(i)
                    .map_err(|e| PipelineError::Query(e.to_string()))?
                {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Number(n as f64),
                    ValueRef::Real(f) => Value::Number(f),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(_) => {
                        return Err(PipelineError::Query(format!(
                            "unexpected BLOB cell in column {i}"
                        )))
                    }
                };
                cells.push(cell);
            }
            table.push_row(cells)?;
        }

        if table.num_rows() == 0 {
            error!("query returned an empty result");
            return Err(PipelineError::EmptyResult);
        }
        info!("query returned {} rows", table.num_rows());
        Ok(table)
    }
}

/// Download a CSV file and decode it into a record table.
pub fn fetch_csv(url: &str) -> Result<Table> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| PipelineError::Fetch(e.to_string()))?;
    let body = response
        .text()
        .map_err(|e| PipelineError::Fetch(e.to_string()))?;
    info!("fetched CSV from '{}' ({} bytes)", url, body.len());
    parse_csv(&body)
}

/// Decode CSV text into a record table. The first record is the header row.
/// Empty fields become null cells and numeric-looking fields become numbers.
pub fn parse_csv(text: &str) -> Result<Table> {
    if text.trim().is_empty() {
        return Err(PipelineError::InvalidFormat("empty payload".to_string()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::InvalidFormat(e.to_string()))?
        .clone();
    let mut table = Table::new(headers.iter().map(|h| h.to_string()))?;
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;
        table.push_row(record.iter().map(decode_field).collect())?;
    }
    Ok(table)
}

fn decode_field(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    match field.trim().parse::<f64>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::Text(field.to_string()),
    }
}

/// Encode a record table as CSV text, header row first.
pub fn write_csv(table: &Table) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns())
        .map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;
    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(encode_field).collect();
        writer
            .write_record(&fields)
            .map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::InvalidFormat(e.to_string()))
}

fn encode_field(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("{n}"),
        Value::Text(s) => s.clone(),
        Value::Null => String::new(),
    }
}
