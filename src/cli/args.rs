use crate::processors::ImportMode;
use crate::utils::constants::DEFAULT_LATEST_N;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dwd-station-import")]
#[command(about = "Import DWD 10-minute air temperature observations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Config file providing BBOXES (environment variables override it)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the stations selected by the configured bounding boxes
    Stations {
        #[arg(short, long, help = "Local copy of the station directory text")]
        directory: PathBuf,
    },

    /// Import observations for the selected stations
    Import {
        #[arg(short, long, help = "Local copy of the station directory text")]
        directory: PathBuf,

        #[arg(
            short,
            long,
            help = "Mirror of the 10_minutes/air_temperature tree (now/, recent/, historical/)"
        )]
        archive_dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ModeArg::MostRecent)]
        mode: ModeArg,

        #[arg(long, default_value_t = DEFAULT_LATEST_N, help = "Rows kept per station in most-recent mode")]
        latest_n: usize,

        #[arg(short, long, help = "JSON lines output file [default: stdout]")]
        output: Option<PathBuf>,

        #[arg(long, help = "Hide the progress bar")]
        no_progress: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Every row of the most recent data
    Today,
    /// Every row of the current year
    Recent,
    /// The last N rows of the most recent data
    MostRecent,
    /// The full record
    Historical,
}

impl ModeArg {
    pub fn into_mode(self, latest_n: usize) -> ImportMode {
        match self {
            ModeArg::Today => ImportMode::Today,
            ModeArg::Recent => ImportMode::Recent,
            ModeArg::MostRecent => ImportMode::MostRecent(latest_n),
            ModeArg::Historical => ImportMode::Historical,
        }
    }
}
