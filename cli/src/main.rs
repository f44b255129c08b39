use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env first so RUST_LOG set there reaches the subscriber
    let config = Config::load()?;
    init_tracing();
    let cli = Cli::parse();
    let mut app = CliApp::new(config);
    app.run(cli).await?;
    Ok(())
}
