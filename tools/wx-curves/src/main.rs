//! wx-curves: well-log curve data from the command line.

use clap::Parser;

use wx_curves::Cli;
use wx_telemetry::{init_logging, TelemetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if cli.verbose {
        telemetry = telemetry.verbose();
    }
    init_logging(&telemetry)?;

    let output = wx_curves::run(cli).await?;
    println!("{output}");
    Ok(())
}
