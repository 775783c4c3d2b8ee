use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod error;
mod geo;
mod irradiance;
mod model;
mod optimize;
mod output;
mod solar;
mod strategy;
mod time;

use cli::Args;
use model::ClearSkyModel;

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays clean for JSON
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let request = args.angle_request()?;
    tracing::debug!(?request, "validated request");

    let model = ClearSkyModel::default().with_linke_turbidity(args.linke_turbidity);
    let results = strategy::run_all(&request, &model)?;

    match args.format.as_str() {
        "json" => println!("{}", output::render_json(&results)?),
        "text" => print!("{}", output::render_text(&request, &results)),
        _ => unreachable!(),
    }

    Ok(())
}
