use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::models::Dataset;
use crate::processors::aggregation::partition;
use crate::processors::columns::REGION;
use crate::readers::DatasetLoader;
use crate::server;
use crate::settings::Settings;
use crate::utils::progress::ProgressReporter;
use crate::writers::ParquetWriter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    init_thread_pool(settings.workers);

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            input,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if static_dir.is_some() {
                settings.server.static_dir = static_dir;
            }

            let dataset = load_dataset(&settings, input).await?;
            info!(
                "Loaded {} records for {} states",
                dataset.len(),
                dataset.unique_states().len()
            );
            server::serve(&settings.server, Arc::new(dataset)).await?;
        }

        Commands::Convert {
            input,
            output,
            compression,
        } => {
            let compression = compression.unwrap_or_else(|| settings.data.compression.clone());
            let loader = DatasetLoader::new(
                input.unwrap_or_else(|| settings.data.csv_path.clone()),
                output.unwrap_or_else(|| settings.data.parquet_path.clone()),
            )
            .with_compression(&compression);

            println!("Converting {}...", loader.csv_path().display());
            let progress = ProgressReporter::new_spinner("Converting CSV to Parquet...", false);
            let output = tokio::task::spawn_blocking(move || loader.convert_to_parquet()).await??;
            progress.finish_with_message(&format!("Wrote {}", output.display()));

            let file_info = ParquetWriter::new()
                .with_compression(&compression)?
                .get_file_info(&output)?;
            println!("\n{}", file_info.summary());
        }

        Commands::Info { file } => {
            let dataset = load_dataset(&settings, file).await?;
            println!("{}", dataset_summary(&dataset));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let initialised = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = initialised {
        debug!("Keeping existing tracing subscriber: {}", e);
    }
    Ok(())
}

fn init_thread_pool(workers: usize) {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
    {
        Ok(()) => debug!("Using {} worker threads", workers),
        Err(e) => warn!("Worker pool already configured: {}", e),
    }
}

/// Load an explicit file, or the configured source through the cache.
async fn load_dataset(settings: &Settings, path: Option<PathBuf>) -> Result<Dataset> {
    let loader = DatasetLoader::from_settings(&settings.data);
    let progress = ProgressReporter::new_spinner("Loading dataset...", false);

    let dataset = tokio::task::spawn_blocking(move || match path {
        Some(path) => DatasetLoader::load_path(&path),
        None => loader.load(),
    })
    .await??;

    progress.finish_with_message(&format!("Loaded {} records", dataset.len()));
    Ok(dataset)
}

fn dataset_summary(dataset: &Dataset) -> String {
    let records = dataset.records();
    let first = records.iter().map(|r| r.date).min();
    let last = records.iter().map(|r| r.date).max();
    let date_range = match (first, last) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "empty".to_string(),
    };

    let regions: Vec<String> = partition(&[REGION], records)
        .into_iter()
        .map(|(key, members)| {
            let name = key.first().map(|k| k.to_string()).unwrap_or_default();
            format!("  - {}: {}", name, members.len())
        })
        .collect();

    format!(
        "Dataset Summary:\n\
        - Records: {}\n\
        - Date range: {}\n\
        - States: {}\n\
        - Wind direction column: {}\n\
        - Records by region:\n{}",
        dataset.len(),
        date_range,
        dataset.unique_states().len(),
        dataset.wind_dir_column().unwrap_or("none"),
        regions.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use chrono::NaiveDate;

    #[test]
    fn test_dataset_summary() {
        let records = vec![
            Record::new(
                NaiveDate::from_ymd_opt(2015, 2, 1).unwrap(),
                Some("Texas".to_string()),
                Some(0.2),
                None,
                None,
            ),
            Record::new(
                NaiveDate::from_ymd_opt(2019, 8, 1).unwrap(),
                Some("Hawaii".to_string()),
                Some(0.1),
                None,
                None,
            ),
        ];
        let summary = dataset_summary(&Dataset::from_records(records, None));

        assert!(summary.contains("Records: 2"));
        assert!(summary.contains("2015-02-01 to 2019-08-01"));
        assert!(summary.contains("Wind direction column: none"));
        assert!(summary.contains("  - Other: 1"));
        assert!(summary.contains("  - Southern: 1"));
    }
}
