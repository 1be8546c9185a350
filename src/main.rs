mod app;
mod cache;
mod config;
mod event;
mod list;
mod roster;
mod ui;

use cache::{NoopStorage, SqliteStorage, StudentCache};
use clap::Parser;
use color_eyre::Result;
use roster::MockSource;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "Browse students and their courses from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/roster/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Students fetched per page
  #[arg(short, long)]
  page_size: Option<usize>,

  /// Don't read or write the on-device cache
  #[arg(long)]
  no_cache: bool,

  /// Seed for generated course enrollments
  #[arg(long)]
  seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, command line wins over the file
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(page_size) = args.page_size {
    config.page_size = page_size;
  }
  if args.seed.is_some() {
    config.seed = args.seed;
  }
  if args.no_cache {
    config.cache.enabled = false;
  }
  config.validate()?;

  // The terminal belongs to the UI, so logs go to a file
  let _log_guard = init_logging(&config)?;

  let source = match config.seed {
    Some(seed) => MockSource::new(seed, config.latency()),
    None => MockSource::random(config.latency()),
  };

  let cache = if config.cache.enabled {
    StudentCache::new(SqliteStorage::open(config.cache.path.as_deref())?)
  } else {
    StudentCache::new(NoopStorage)
  };

  tracing::info!(
    page_size = config.page_size,
    seed = source.seed(),
    cache = config.cache.enabled,
    "Starting roster"
  );

  let mut app = app::App::new(&config, source, cache);
  app.run().await?;

  Ok(())
}

fn init_logging(config: &config::Config) -> Result<WorkerGuard> {
  let dir = config.log_dir()?;
  std::fs::create_dir_all(&dir)?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
    &dir,
    "roster.log",
  ));

  let filter =
    EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| EnvFilter::new("roster=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
