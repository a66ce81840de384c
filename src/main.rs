use clap::{Parser, Subcommand};
use tracing::info;

use agridata::config::{LogLevel, PipelineConfig};
use agridata::extract::{
    MeasurementExtractor, DEFAULT_KIND_COLUMN, DEFAULT_MESSAGE_COLUMN, DEFAULT_VALUE_COLUMN,
};
use agridata::{ingest, logging, pipeline::FieldPipeline};

#[derive(Parser)]
#[command(name = "agridata")]
#[command(about = "Maji Ndogo field survey data pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full field-data pipeline and write the result as CSV
    Run {
        /// Path to the pipeline TOML configuration
        #[arg(long, default_value = "config.toml")]
        config: String,
        /// Where to write the finished table (stdout if omitted)
        #[arg(long)]
        output: Option<String>,
    },
    /// Parse sensor messages in a CSV file into measurement kind/value columns
    Extract {
        /// CSV file holding the sensor messages
        #[arg(long)]
        input: String,
        /// Where to write the annotated table (stdout if omitted)
        #[arg(long)]
        output: Option<String>,
        /// Column holding the free-text messages
        #[arg(long, default_value = DEFAULT_MESSAGE_COLUMN)]
        column: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            let config = PipelineConfig::load(&config)?;
            logging::init(config.logging_level);

            let mut pipeline = FieldPipeline::new(config);
            let table = pipeline.run()?;
            let csv = ingest::write_csv(table)?;
            emit(&csv, output.as_deref())?;
        }
        Commands::Extract {
            input,
            output,
            column,
        } => {
            logging::init(LogLevel::default());

            let text = std::fs::read_to_string(&input)?;
            let mut table = ingest::parse_csv(&text)?;
            let extractor = MeasurementExtractor::with_default_rules();
            extractor.annotate_table(
                &mut table,
                &column,
                DEFAULT_KIND_COLUMN,
                DEFAULT_VALUE_COLUMN,
            )?;
            info!("annotated {} sensor messages", table.num_rows());

            let csv = ingest::write_csv(&table)?;
            emit(&csv, output.as_deref())?;
        }
    }

    Ok(())
}

fn emit(csv: &str, output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, csv)?;
            println!("wrote {path}");
        }
        None => print!("{csv}"),
    }
    Ok(())
}
