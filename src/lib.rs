pub mod config;
pub mod correct;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod reconcile;
pub mod table;
