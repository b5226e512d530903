use clap::Parser;
use co_wind_dashboard::cli::{run, Cli};
use co_wind_dashboard::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
