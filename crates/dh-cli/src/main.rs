//! `drafthook`: run the design engine against an in-memory document.
//!
//! Messages arrive as newline-delimited JSON on stdin (or `--input`) and
//! every outbound message is printed as one JSON line on stdout.

mod cli;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use dh_core::config::EngineConfig;
use dh_engine::Plugin;
use dh_scene::{HostProfile, render_svg};
use std::path::Path;
use tokio::io::{AsyncBufRead, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    let profile = match &args.host {
        Some(path) => HostProfile::from_json(&read_file(path).await?)
            .with_context(|| format!("loading host profile {}", path.display()))?,
        None => HostProfile::default(),
    };
    let config = match &args.config {
        Some(path) => EngineConfig::from_json(&read_file(path).await?)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let host = profile.build().context("building host document")?;
    log::info!(
        "document ready: {} nodes, {} fonts available",
        host.document.len(),
        profile.fonts.len()
    );
    let mut plugin = Plugin::new(host.document, host.fonts, host.assets, config);

    let input: Box<dyn AsyncBufRead + Unpin> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut stdout = tokio::io::stdout();
    let summary = session::run(&mut plugin, input, &mut stdout).await?;
    log::info!(
        "handled {} messages, rejected {}, posted {}",
        summary.handled,
        summary.rejected,
        summary.posted
    );

    let document = plugin.into_engine().canvas;
    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&document.snapshot())?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }
    if let Some(path) = &args.svg {
        tokio::fs::write(path, render_svg(&document))
            .await
            .with_context(|| format!("writing svg {}", path.display()))?;
    }
    Ok(())
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}
