use anyhow::Result;
use clap::Parser;
use confluence_scoring::{InstrumentSession, Sample, ScoringEngine, SignalResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

mod config;
mod report;

use config::{Config, InstrumentConfig};

#[derive(Parser, Debug)]
#[clap(name = "confluence-replay", about = "Replay recorded samples through the scoring engine")]
struct Args {
    #[clap(short, long, default_value = "replay.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Loading configuration from {:?}", args.config);
    let config = Config::load(&args.config)?;
    let json_output = config.json_output;

    // One independent session per instrument; scoring is CPU-bound
    let mut handles = Vec::with_capacity(config.instruments.len());
    for instrument in config.instruments {
        handles.push(tokio::task::spawn_blocking(move || {
            let symbol = instrument.symbol.clone();
            (symbol, replay(instrument))
        }));
    }

    let mut failures = 0;
    for handle in handles {
        let (symbol, outcome) = handle.await?;
        match outcome {
            Ok(signal) if json_output => println!("{}", serde_json::to_string_pretty(&signal)?),
            Ok(signal) => print!("{}", report::render(&symbol, &signal)),
            Err(e) => {
                error!(symbol = %symbol, "Replay failed: {:#}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} instrument(s) failed to replay");
    }
    Ok(())
}

/// Feed one instrument's recorded samples through its session and score once
fn replay(instrument: InstrumentConfig) -> Result<SignalResult> {
    let engine = Arc::new(ScoringEngine::new(instrument.scoring_config()?)?);
    let mut session = InstrumentSession::with_engine(instrument.symbol.as_str(), engine);

    info!(symbol = %instrument.symbol, "Loading samples from {:?}", instrument.data_file);
    let contents = std::fs::read_to_string(&instrument.data_file)?;
    let samples: Vec<Sample> = serde_json::from_str(&contents)?;

    let mut rejected = 0usize;
    for sample in samples {
        if let Err(e) = session.append(sample) {
            warn!(symbol = %instrument.symbol, "Skipping sample: {}", e);
            rejected += 1;
        }
    }

    let signal = match &instrument.windows {
        Some(windows) => session.score_with_windows(windows)?,
        None => session.score()?,
    };

    info!(
        symbol = %instrument.symbol,
        buffered = session.buffer().len(),
        rejected,
        bucket = %signal.overall_bucket,
        confidence = signal.confidence_percent,
        "Scored instrument"
    );
    Ok(signal)
}
