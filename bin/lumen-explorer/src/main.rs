use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lumen_chain::{ChainReader, NodeClient};
use lumen_common::logging::{self, LoggerConfig};
use lumen_common::{shutdown_channel, ShutdownSignal};
use lumen_config::Config;
use lumen_indexer::EventProcessor;
use lumen_primitives::params::{GenesisConfig, Network, Params};
use tracing::*;

use crate::args::Args;

mod args;

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e}");
        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    let config = Config::load(&args.config_file)
        .with_context(|| format!("loading config {}", args.config_file.display()))?;
    if config.indexer.refresh_interval == 0 {
        anyhow::bail!("indexer.refresh_interval must be positive");
    }

    init_logging(&args, &config)?;

    let network: Network = args
        .network
        .as_deref()
        .unwrap_or(&config.network)
        .parse()?;
    let params = resolve_params(network, &config)?;
    info!(%network, "loaded configuration");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("lumen-rt")
        .build()
        .expect("init: build rt");

    runtime.block_on(run(config, Arc::new(params)))
}

fn init_logging(args: &Args, config: &Config) -> anyhow::Result<()> {
    let mut lconfig = LoggerConfig::new("lumen-explorer".to_owned());

    if let Some(verbosity) = &args.verbosity {
        lconfig.set_verbosity(verbosity.clone());
    }
    if let Some(format) = &args.log_format {
        lconfig.set_format(format.parse()?);
    }
    if let Some(path) = &args.log_file {
        lconfig.set_file(path.clone());
    }
    if let Some(color) = args.log_color {
        lconfig.set_color(color);
    }
    if let Some(level) = &config.db.log_level {
        lconfig.add_directive(format!("lumen_db={level}"));
    }

    logging::init(lconfig).context("init logging")?;
    Ok(())
}

/// Resolves the network preset, folding in a genesis allocation file when
/// the config names one.
fn resolve_params(network: Network, config: &Config) -> anyhow::Result<Params> {
    let params = Params::for_network(network);

    let Some(path) = &config.genesis_file else {
        return Ok(params);
    };

    let raw = std::fs::read(path)
        .with_context(|| format!("reading genesis file {}", path.display()))?;
    let genesis: GenesisConfig = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing genesis file {}", path.display()))?;

    Ok(params.with_genesis(genesis))
}

async fn run(config: Config, params: Arc<Params>) -> anyhow::Result<()> {
    // Schema first; failing here is fatal, per boot policy.
    lumen_db::run_migrations(&config.db.master)
        .await
        .context("running migrations")?;
    let pool = lumen_db::connect(
        &config.db.master,
        config.db.max_open_conns,
        config.db.max_idle_conns,
    )
    .await
    .context("opening database pool")?;

    let node = Arc::new(NodeClient::new(&config.node.endpoint)?);

    // Connectivity probe.  Not fatal; the processor retries every tick.
    match node.chain_status().await {
        Ok(status) => info!(
            best_slot = status.best.slot,
            finalized_slot = status.finalized.slot,
            "connected to node"
        ),
        Err(e) => warn!(err = %e, "node unreachable at startup, will keep retrying"),
    }

    let (signal, guard) = shutdown_channel();
    tokio::spawn(listen_for_signals(signal));

    let processor = EventProcessor::new(
        node,
        pool,
        params,
        Duration::from_secs(config.indexer.refresh_interval),
    );
    processor.run(guard).await;

    info!("exiting");
    Ok(())
}

/// Turns SIGINT/SIGTERM/SIGQUIT into a shutdown signal.  The first signal
/// cancels the processor, which finishes its in-flight tick; repeated
/// signals are acknowledged but change nothing.
async fn listen_for_signals(signal: ShutdownSignal) {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut interrupt = unix_signal(SignalKind::interrupt()).expect("init: SIGINT handler");
    let mut terminate = unix_signal(SignalKind::terminate()).expect("init: SIGTERM handler");
    let mut quit = unix_signal(SignalKind::quit()).expect("init: SIGQUIT handler");

    tokio::select! {
        _ = interrupt.recv() => {}
        _ = terminate.recv() => {}
        _ = quit.recv() => {}
    }

    info!("got interrupt, shutting down");
    signal.send();

    loop {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
            _ = quit.recv() => {}
        }
        warn!("already shutting down");
    }
}
