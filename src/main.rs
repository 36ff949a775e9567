//! Entropy Pool CLI
//!
//! Command-line harness that feeds mock sources into one shared pool from
//! several threads, then exercises gated extraction and CSPRNG reseeding.

use clap::{Parser, ValueEnum};
use rndpool::{
    source::harvest, FileConfig, MockSource, Quality, ReseedableRng, SharedPool,
};
use rand_core::RngCore;
use std::path::PathBuf;
use std::thread;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QualityArg {
    Any,
    Good,
}

impl From<QualityArg> for Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Any => Quality::Any,
            QualityArg::Good => Quality::Good,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "rndpool", version, about = "Entropy pool demonstration harness")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Samples per source (overrides the config file).
    #[arg(long)]
    rounds: Option<u32>,
    /// Number of producer threads (overrides the config file).
    #[arg(long)]
    threads: Option<u32>,
    /// Bytes to extract.
    #[arg(long, default_value_t = 32)]
    bytes: usize,
    /// Extraction quality.
    #[arg(long, value_enum, default_value_t = QualityArg::Good)]
    quality: QualityArg,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Entropy pool v{}", rndpool::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.harvest.rounds = rounds;
    }
    if let Some(threads) = args.threads {
        config.harvest.sources = threads;
    }

    let pool = SharedPool::with_config(config.pool.clone());
    let harvest_config = config.harvest.clone();

    info!(
        sources = harvest_config.sources,
        rounds = harvest_config.rounds,
        "Harvesting mock sources..."
    );

    let producers: Vec<_> = (0..harvest_config.sources)
        .map(|id| {
            let pool = pool.clone();
            let harvest_config = harvest_config.clone();
            thread::spawn(move || {
                let mut source = MockSource::with_seed(
                    format!("mock-{}", id),
                    harvest_config.claim_bits_per_byte,
                    u64::from(id) + 1,
                );
                harvest(
                    &mut source,
                    &pool,
                    harvest_config.rounds,
                    harvest_config.chunk_bytes,
                )
            })
        })
        .collect();

    for (id, handle) in producers.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(claimed)) => info!(source = id, claimed_bits = claimed, "Source done"),
            Ok(Err(e)) => warn!("Source {} failed: {}", id, e),
            Err(_) => warn!("Source {} panicked", id),
        }
    }

    info!(
        "Pool holds an estimated {} bits",
        pool.get_entropy_estimate()
    );

    // Reseed before the requested extraction so both compete for the same estimate.
    let mut rng = ReseedableRng::from_os_entropy();
    match rng.reseed_from_pool(&pool) {
        Ok(()) => info!("CSPRNG reseeded from pool"),
        Err(e) => warn!("Reseed failed: {}", e),
    }

    if args.bytes > 0 {
        let mut output = vec![0u8; args.bytes];
        match pool.extract(&mut output, args.quality.into()) {
            Ok(produced) => {
                if produced < output.len() {
                    warn!(
                        "Short extraction: {} of {} bytes",
                        produced,
                        output.len()
                    );
                }
                println!("Pool bytes: {}", hex(&output[..produced]));
            }
            Err(e) => warn!("Extraction failed: {}", e),
        }
    }

    let mut sample = [0u8; 32];
    rng.fill_bytes(&mut sample);
    println!("CSPRNG bytes: {}", hex(&sample));

    match toml::to_string_pretty(&pool.stats()) {
        Ok(stats) => println!("\n[stats]\n{}", stats),
        Err(e) => warn!("Failed to render stats: {}", e),
    }

    info!("Done. Reseed count: {}", rng.reseed_count());
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
