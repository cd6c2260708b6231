//! Binary entrypoint for the photo gallery.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rust_photo_gallery::events::UiCommand;
use rust_photo_gallery::render::RenderPlan;
use rust_photo_gallery::tasks::{fetcher, gallery, input, loader, presenter};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "rust-photo-gallery", about = "Terminal photo gallery browser")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Override the listing endpoint from the config file
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("rust_photo_gallery={level}").parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = rust_photo_gallery::config::Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(endpoint) = cli.endpoint {
        cfg.endpoint = endpoint;
    }
    let cfg = cfg.validated().context("validating configuration")?;
    info!(endpoint = %cfg.endpoint, page_size = cfg.page_size, "starting gallery");
    println!("{}", input::help());

    let cancel = CancellationToken::new();
    let (cmd_tx, cmd_rx) = mpsc::channel::<UiCommand>(16);
    let (fetch_req_tx, fetch_req_rx) = mpsc::channel(4);
    let (fetch_out_tx, fetch_out_rx) = mpsc::channel(4);
    let (load_req_tx, load_req_rx) = mpsc::channel(64);
    let (load_out_tx, load_out_rx) = mpsc::channel(64);
    let (frame_tx, frame_rx) = watch::channel(RenderPlan::empty());

    let mut tasks = JoinSet::new();
    tasks.spawn(fetcher::run(
        cfg.endpoint.clone(),
        cfg.page_size,
        fetch_req_rx,
        fetch_out_tx,
        cancel.clone(),
    ));
    tasks.spawn(loader::run(
        load_req_rx,
        load_out_tx,
        cancel.clone(),
        cfg.loader_max_concurrent_loads,
    ));
    tasks.spawn(presenter::run(frame_rx, cancel.clone()));
    tasks.spawn(input::run(cmd_tx, cancel.clone()));
    tasks.spawn(gallery::run(
        cfg,
        cmd_rx,
        fetch_req_tx,
        fetch_out_rx,
        load_req_tx,
        load_out_rx,
        frame_tx,
        cancel.clone(),
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received; shutting down");
            cancel.cancel();
        }
        _ = cancel.cancelled() => {}
    }

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!(error = ?err, "task exited with error"),
            Err(err) => error!(error = ?err, "task panicked"),
        }
    }
    Ok(())
}
