use anyhow::{bail, Context, Result};
use clap::Parser;

use fimwatch::{
    baseline::BaselineStore,
    cli::Cli,
    config::FimConfig,
    monitor::{BaselineSource, Monitor, PrepareOutcome},
    prompt::{ArgsPrompt, Prompt},
    sink::ConsoleSink,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    let mut config = FimConfig::load_or_default(cli.config.as_deref())?;
    config.apply_env();
    if let Some(retries) = cli.retries {
        config.hasher.retries = retries;
    }
    if let Some(ms) = cli.retry_delay {
        config.hasher.retry_delay_ms = ms;
    }
    if let Some(path) = &cli.baseline {
        config.store.baseline_path = path.clone();
    }
    if let Err(err) = config.validate() {
        bail!("invalid configuration: {}", err);
    }

    let mut prompt = ArgsPrompt::new(cli.rebuild, cli.path.clone());
    let Some(rebuild) = prompt.confirm_rebuild() else {
        tracing::info!("no baseline choice made, exiting");
        return Ok(());
    };
    let Some(directory) = prompt.choose_directory() else {
        bail!("no directory selected");
    };

    tracing::info!("starting fimwatch on: {}", directory.display());

    let store = BaselineStore::new(&config.store.baseline_path);
    let mut monitor = Monitor::new(directory, store, config.hasher.retry_policy())
        .with_poll_timeout(config.watcher.poll_timeout());

    let source = if rebuild {
        BaselineSource::Build
    } else {
        BaselineSource::Resume
    };
    match monitor.prepare(source)? {
        PrepareOutcome::Built { files } => {
            tracing::info!("baseline built: {} files", files);
        }
        PrepareOutcome::Resumed { entries } => {
            tracing::info!("baseline resumed: {} entries", entries);
        }
        PrepareOutcome::NoBaseline => {
            tracing::warn!("no existing baseline found, building a new one");
            if let PrepareOutcome::Built { files } = monitor.prepare(BaselineSource::Build)? {
                tracing::info!("baseline built: {} files", files);
            }
        }
    }

    let handle = monitor.handle();
    ctrlc::set_handler(move || {
        handle.stop();
    })
    .context("failed to install interrupt handler")?;

    let mut sink = ConsoleSink::new(cli.output, cli.no_color);
    monitor.run(&mut sink)
}
