use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "co-wind-dashboard")]
#[command(about = "Carbon monoxide and wind statistics for US states, served as JSON")]
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
        help = "Settings file [default: co-wind.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the dataset once and serve the dashboard API
    Serve {
        #[arg(long, help = "Address to bind [default: from settings]")]
        host: Option<String>,

        #[arg(short, long, help = "Port to listen on [default: from settings]")]
        port: Option<u16>,

        #[arg(long, help = "Directory of static dashboard assets")]
        static_dir: Option<PathBuf>,

        #[arg(long, help = "Load this CSV or Parquet file instead of the configured source")]
        input: Option<PathBuf>,
    },

    /// Convert the source CSV to the cached Parquet file
    Convert {
        #[arg(short, long, help = "Source CSV [default: from settings]")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Output Parquet file [default: from settings]")]
        output: Option<PathBuf>,

        #[arg(long, help = "Compression codec [default: from settings]")]
        compression: Option<String>,
    },

    /// Display a summary of a dataset
    Info {
        #[arg(short, long, help = "CSV or Parquet file [default: configured source]")]
        file: Option<PathBuf>,
    },
}
