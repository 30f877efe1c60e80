//! skel-bench
//!
//! Throughput benchmarks for the skel worker pool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skel::bench::{self, BatchMode, BatchOptions};
use skel::{EventLoop, HelloObjectAsync, HelloWorld, SkelConfig};

/// Skel worker pool benchmarks
#[derive(Parser, Debug)]
#[command(name = "skel-bench")]
#[command(about = "Skel worker pool benchmarks", long_about = None)]
struct Cli {
    /// Path to a skel.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Queue every HelloObjectAsync call at once
    ObjectAsync {
        #[arg(long)]
        iterations: usize,

        /// Worker pool size
        #[arg(long)]
        concurrency: usize,

        /// Track peak memory
        #[arg(long)]
        mem: bool,
    },

    /// Run one HelloWorld method with a bounded number of calls in flight
    Batch {
        #[arg(long)]
        iterations: usize,

        /// Worker pool size and maximum calls in flight
        #[arg(long)]
        concurrency: usize,

        /// shout, busy_threads, sleepy_threads or contentious_threads
        #[arg(long)]
        mode: String,

        /// Sleep per call for sleepy_threads, in ms
        #[arg(long)]
        sleep: Option<u64>,

        /// Phrase passed to each call (defaults to [bench] phrase)
        #[arg(long)]
        phrase: Option<String>,

        /// Fail unless at least this many runs per second
        #[arg(long)]
        min_rate: Option<f64>,
    },

    /// Time construction and a single shout
    Single,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SkelConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;

    init_tracing(&config, cli.log_json);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(run(cli.command, config, cli.json))
}

fn init_tracing(config: &SkelConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

async fn run(command: Command, config: SkelConfig, json: bool) -> Result<()> {
    info!("skel-bench v{}", skel::module::VERSION);

    match command {
        Command::ObjectAsync {
            iterations,
            concurrency,
            mem,
        } => {
            let lp = event_loop(&config, Some(concurrency))?;
            let object = HelloObjectAsync::named("park bench")?;
            let report = bench::object_async(&lp, &object, iterations, mem).await?;
            if json {
                println!("{}", report.to_json());
            } else {
                println!("{}", report);
            }
        }

        Command::Batch {
            iterations,
            concurrency,
            mode,
            sleep,
            phrase,
            min_rate,
        } => {
            let mode: BatchMode = mode.parse()?;
            let lp = event_loop(&config, Some(concurrency))?;
            let options = BatchOptions {
                mode,
                iterations,
                concurrency,
                sleep,
                phrase: phrase.unwrap_or_else(|| config.bench.phrase.clone()),
            };
            let report = bench::batch(&lp, &HelloWorld::new(), &options).await?;
            if json {
                println!("{}", report.to_json());
            } else {
                println!("{}", report);
            }

            if let Some(min) = min_rate {
                report.check_min_rate(min)?;
            }
        }

        Command::Single => {
            let lp = event_loop(&config, None)?;
            let report = bench::single(&lp, &config.bench.phrase).await?;
            if json {
                println!("{}", report.to_json());
            } else {
                println!("{}", report);
            }
        }
    }

    Ok(())
}

fn event_loop(config: &SkelConfig, concurrency: Option<usize>) -> Result<EventLoop> {
    let pool = config.pool_config(concurrency).context("Invalid pool size")?;
    info!("Starting worker pool with {} threads", pool.size());
    EventLoop::new(pool).context("Failed to start worker pool")
}
