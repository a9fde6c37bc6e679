use clap::Parser;
use weather_etl::cli::{run, Cli};
use weather_etl::error::Result;
use weather_etl::utils::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    run(cli).await
}
