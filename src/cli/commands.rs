use crate::cli::args::{Cli, Commands};
use crate::config::ImportConfig;
use crate::models::Station;
use crate::processors::{ImportMode, StationImport};
use crate::readers::{ArchiveSource, StationReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::{JsonLinesWriter, ObservationSink};
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

pub fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = ImportConfig::load(cli.config.as_deref()).context("Could not load configuration")?;

    match cli.command {
        Commands::Stations { directory } => {
            let stations = load_stations(&directory, &config)?;
            for station in &stations {
                println!("{}", station);
            }
            println!("{} stations selected", stations.len());
        }

        Commands::Import {
            directory,
            archive_dir,
            mode,
            latest_n,
            output,
            no_progress,
        } => {
            let stations = load_stations(&directory, &config)?;
            let mode = mode.into_mode(latest_n);
            let progress = ProgressReporter::new(
                stations.len() as u64,
                &format!("Importing {} data...", mode.display_name()),
                no_progress,
            );
            let source = ArchiveSource::new(archive_dir);

            let count = match output {
                Some(path) => {
                    let writer = JsonLinesWriter::create(&path)
                        .with_context(|| format!("Could not create {}", path.display()))?;
                    let writer = import(source, writer, progress, mode, &stations)?;
                    let written = writer.written();
                    writer.into_inner()?;
                    written
                }
                None => {
                    let writer = JsonLinesWriter::new(std::io::stdout().lock());
                    let writer = import(source, writer, progress, mode, &stations)?;
                    let written = writer.written();
                    writer.into_inner()?;
                    written
                }
            };
            info!("Forwarded {} {} data points", count, mode.display_name());
        }
    }

    Ok(())
}

fn load_stations(directory: &Path, config: &ImportConfig) -> Result<Vec<Station>> {
    let stations = StationReader::new()
        .stations_in_bboxes(directory, config.geo_filter())
        .context("Could not load station list")?;
    info!(
        "Selected {} stations from {}",
        stations.len(),
        directory.display()
    );
    Ok(stations)
}

fn import<S: ObservationSink>(
    source: ArchiveSource,
    sink: S,
    progress: ProgressReporter,
    mode: ImportMode,
    stations: &[Station],
) -> Result<S> {
    let mut import = StationImport::new(source, sink).with_progress(progress);
    import
        .run(mode, stations)
        .with_context(|| format!("{} import failed", mode.display_name()))?;
    Ok(import.into_sink())
}

fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dwd_station_import={}", log_level)));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
