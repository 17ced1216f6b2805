use clap::{Args, Parser, Subcommand};
use distinct_window_rs::{
    BulkDistinctSketchOps, DecayingSketch, DistinctConfig, DistinctCounter,
    DistinctCounterOptsBuilder, DistinctSketchOps, DistinctSketchStats,
    common::{bytes2hr, relative_error_pct},
};
use std::{
    fs,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    sketch: SketchArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SketchArgs {
    /// JSON file holding a serialized sketch configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// log2 of the register count (4..=31)
    #[arg(short, long, global = true)]
    log_size: Option<u32>,

    /// Sliding window length in seconds
    #[arg(short, long, global = true)]
    max_age_secs: Option<u64>,

    /// Number of decay slots
    #[arg(short, long, global = true)]
    age_buckets: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count distinct input lines
    Count {
        /// Read lines from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Observe input lines and print the exported registers as JSON
    Export {
        /// Read lines from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Metric name
        #[arg(short, long, default_value = "distinct_values")]
        name: String,

        /// Label attached to the observations, as name=value (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
    },

    /// Feed synthetic distinct values and report the estimate error
    Simulate {
        /// Number of distinct values
        #[arg(short, long, default_value = "100000")]
        distinct: usize,

        /// Times each value is observed
        #[arg(short, long, default_value = "1")]
        repeat: usize,
    },

    /// Display the effective configuration
    Info,
}

/// Defaults read from the environment (and `.env`).
struct EnvConfig {
    log_size: u32,
    max_age_secs: u64,
    age_buckets: usize,
}

impl EnvConfig {
    fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        Ok(Self {
            log_size: std::env::var("DISTINCT_LOG_SIZE")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .map_err(|_| "Invalid DISTINCT_LOG_SIZE")?,
            max_age_secs: std::env::var("DISTINCT_MAX_AGE_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| "Invalid DISTINCT_MAX_AGE_SECS")?,
            age_buckets: std::env::var("DISTINCT_AGE_BUCKETS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .map_err(|_| "Invalid DISTINCT_AGE_BUCKETS")?,
        })
    }
}

fn resolve_config(args: &SketchArgs) -> Result<DistinctConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => DistinctConfig::from_bytes(&fs::read(path)?)?,
        None => {
            let env = EnvConfig::from_env()?;
            DistinctConfig {
                log_size: env.log_size,
                max_age: Duration::from_secs(env.max_age_secs),
                age_buckets: env.age_buckets,
            }
        }
    };

    if let Some(log_size) = args.log_size {
        config.log_size = log_size;
    }
    if let Some(secs) = args.max_age_secs {
        config.max_age = Duration::from_secs(secs);
    }
    if let Some(buckets) = args.age_buckets {
        config.age_buckets = buckets;
    }

    config.validate()?;
    Ok(config)
}

fn open_input(input: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match input {
        Some(path) => Ok(Box::new(BufReader::new(fs::File::open(path)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn parse_labels(labels: &[String]) -> Result<(Vec<String>, Vec<String>), String> {
    let mut names = Vec::with_capacity(labels.len());
    let mut values = Vec::with_capacity(labels.len());
    for label in labels {
        let (name, value) = label
            .split_once('=')
            .ok_or_else(|| format!("Label '{label}' must be name=value"))?;
        names.push(name.to_string());
        values.push(value.to_string());
    }
    Ok((names, values))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli.sketch)?;

    match &cli.command {
        Commands::Count { input } => {
            let sketch = DecayingSketch::new(config)?;
            let mut lines = 0usize;
            for line in open_input(input.as_deref())?.lines() {
                sketch.observe(line?.as_bytes())?;
                lines += 1;
            }
            info!(lines, "observed input");
            println!("Lines observed: {lines}");
            println!("Registers: {}", sketch.register_count());
            println!("Estimated distinct: {:.0}", sketch.estimate()?);
        }

        Commands::Export {
            input,
            name,
            labels,
        } => {
            let (label_names, label_values) = parse_labels(labels)?;
            let opts = DistinctCounterOptsBuilder::default()
                .name(name.clone())
                .help("Distinct values observed over a sliding window")
                .label_names(label_names)
                .sketch(config)
                .build()?;
            let counter = DistinctCounter::new(opts)?;

            let values: Vec<&str> = label_values.iter().map(String::as_str).collect();
            let child = counter.with_label_values(&values)?;
            for line in open_input(input.as_deref())?.lines() {
                child.observe(line?.as_bytes())?;
            }

            let family = counter.collect()?;
            println!("{}", serde_json::to_string_pretty(&family)?);
        }

        Commands::Simulate { distinct, repeat } => {
            let sketch = DecayingSketch::new(config)?;
            let items: Vec<Vec<u8>> = (0..*distinct)
                .map(|i| format!("simulated_{i}").into_bytes())
                .collect();
            let refs: Vec<&[u8]> = items.iter().map(Vec::as_slice).collect();

            for _ in 0..*repeat {
                for chunk in refs.chunks(1024) {
                    sketch.observe_bulk(chunk)?;
                }
            }

            let estimate = sketch.estimate()?;
            println!("Distinct values: {distinct}");
            println!("Observations: {}", distinct * repeat);
            println!("Estimate: {estimate:.1}");
            println!(
                "Relative error: {:.3}%",
                relative_error_pct(estimate, *distinct)
            );
        }

        Commands::Info => {
            println!("Configuration:");
            println!("  Log size: {}", config.log_size);
            println!("  Registers per slot: {}", config.register_count());
            println!("  Max age: {:?}", config.max_age);
            println!("  Age buckets: {}", config.age_buckets);
            println!("  Sub-window: {:?}", config.sub_window());
            println!("  Memory: {}", bytes2hr(config.memory_footprint()));
            println!("  JSON: {}", String::from_utf8_lossy(&config.to_bytes()?));
        }
    }

    Ok(())
}
