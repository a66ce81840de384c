use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::correct::{self, CorrectionMap};
use crate::error::{PipelineError, Result};
use crate::ingest::DbEngine;
use crate::merge::{self, HttpCsvSource, MappingSource};
use crate::reconcile;
use crate::table::Table;

/// Orchestrates the field-data run: ingest, swap the mislabeled column
/// pair, normalize values, merge the weather-station mapping, and drop the
/// spurious index column, in that fixed order, aborting on the first
/// failure.
///
/// Configuration is fixed at construction. The engine handle and working
/// table are the only mutable state and stay absent until ingestion runs.
pub struct FieldPipeline {
    config: PipelineConfig,
    corrections: CorrectionMap,
    mapping: Box<dyn MappingSource>,
    engine: Option<DbEngine>,
    table: Option<Table>,
}

impl FieldPipeline {
    /// Pipeline reading its mapping table from the configured CSV URL.
    pub fn new(config: PipelineConfig) -> Self {
        let mapping = Box::new(HttpCsvSource::new(config.weather_mapping_csv.clone()));
        Self::with_mapping_source(config, mapping)
    }

    /// Pipeline with an injected mapping source (tests use a stub).
    pub fn with_mapping_source(config: PipelineConfig, mapping: Box<dyn MappingSource>) -> Self {
        let corrections = config.values_to_rename.clone();
        Self {
            config,
            corrections,
            mapping,
            engine: None,
            table: None,
        }
    }

    /// Run every stage in order and return the finished table.
    ///
    /// A failing stage logs and propagates its error unchanged; no later
    /// stage runs and no partial result is returned.
    pub fn run(&mut self) -> Result<&Table> {
        info!("starting field-data pipeline run");

        self.stage("ingest", Self::ingest)?;
        self.stage("reconcile-columns", Self::reconcile_columns)?;
        self.stage("correct-values", Self::correct_values)?;
        self.stage("merge-mapping", Self::merge_mapping)?;
        self.stage("drop-spurious-column", Self::drop_spurious_column)?;

        let table = self.working_table()?;
        info!(
            "pipeline finished: {} rows, {} columns",
            table.num_rows(),
            table.num_columns()
        );
        Ok(table)
    }

    /// The finished table from the last successful `run`. A failed run
    /// leaves nothing behind: there is no partial result to hand out.
    pub fn into_table(self) -> Option<Table> {
        self.table
    }

    fn stage(&mut self, name: &str, f: fn(&mut Self) -> Result<()>) -> Result<()> {
        info!("stage '{}' starting", name);
        f(self).map_err(|e| {
            error!("stage '{}' failed: {}", name, e);
            // Discard the half-processed table so it cannot escape.
            self.table = None;
            e
        })
    }

    fn working_table(&mut self) -> Result<&mut Table> {
        self.table
            .as_mut()
            .ok_or_else(|| PipelineError::Query("no table has been ingested".to_string()))
    }

    fn ingest(&mut self) -> Result<()> {
        // Reuse the engine handle on repeat runs; connect only once.
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => DbEngine::connect(&self.config.db_path)?,
        };
        let table = engine.query(&self.config.sql_query)?;
        self.engine = Some(engine);
        self.table = Some(table);
        Ok(())
    }

    fn reconcile_columns(&mut self) -> Result<()> {
        let swap = self.config.columns_to_rename.clone();
        let table = self.working_table()?;
        reconcile::swap_columns(table, &swap.from, &swap.to)
    }

    fn correct_values(&mut self) -> Result<()> {
        let abs_column = self.config.abs_column.clone();
        let category_column = self.config.category_column.clone();
        let corrections = self.corrections.clone();
        let table = self.working_table()?;
        correct::absolute_values(table, &abs_column)?;
        correct::correct_categories(table, &category_column, &corrections)
    }

    fn merge_mapping(&mut self) -> Result<()> {
        let key = self.config.key_column.clone();
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| PipelineError::Query("no table has been ingested".to_string()))?;
        let joined = merge::merge_mapping(table, self.mapping.as_ref(), &key)?;
        self.table = Some(joined);
        Ok(())
    }

    fn drop_spurious_column(&mut self) -> Result<()> {
        let drop = self.config.drop_column.clone();
        self.working_table()?.drop_column(&drop)
    }
}
