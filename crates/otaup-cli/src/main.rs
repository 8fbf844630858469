mod config;
mod render;
#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use otaup_core::DeviceFingerprint;
use otaup_installer::RecoveryReboot;
use otaup_pipeline::{PipelineState, UpdateChannel, UpdatePipeline};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::render::Renderer;

#[derive(Parser, Debug)]
#[command(name = "otaup")]
#[command(about = "Over-the-air update client for the head unit", long_about = None)]
struct Cli {
    /// Host configuration file.
    #[arg(long, default_value = "/etc/otaup.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the catalog for available updates.
    Check {
        /// Limit the scan to one channel.
        channel: Option<Channel>,
    },
    /// Download and apply the newest update on a channel.
    Apply {
        channel: Channel,
        /// Reboot into recovery without prompting once applied.
        #[arg(long)]
        yes: bool,
    },
    /// Remove leftover work files from a previous attempt.
    Cleanup,
    /// Show the resolved device identity and paths.
    Doctor,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Channel {
    System,
    Mcu,
    App,
}

impl From<Channel> for UpdateChannel {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::System => Self::System,
            Channel::Mcu => Self::Mcu,
            Channel::App => Self::App,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Check { channel } => check(&config, channel),
        Commands::Apply { channel, yes } => apply(&config, channel.into(), yes),
        Commands::Cleanup => cleanup(&config),
        Commands::Doctor => doctor(&config),
    }
}

fn check(config: &Config, channel: Option<Channel>) -> Result<()> {
    let pipeline = UpdatePipeline::new(
        config.open_store()?,
        config.layout(),
        Arc::new(RecoveryReboot::default()),
        |_| {},
    );
    let probe = config.probe();
    let channels: Vec<UpdateChannel> = match channel {
        Some(channel) => vec![channel.into()],
        None => vec![UpdateChannel::System, UpdateChannel::Mcu, UpdateChannel::App],
    };

    for channel in channels {
        match pipeline.check(channel, &probe)? {
            Some(candidate) => println!(
                "{}: update available, version {} ({})",
                channel.as_str(),
                candidate.version,
                candidate.object_key
            ),
            None => println!("{}: up to date", channel.as_str()),
        }
    }
    Ok(())
}

fn apply(config: &Config, channel: UpdateChannel, yes: bool) -> Result<()> {
    let renderer = Arc::new(Renderer::new());
    let handler = {
        let renderer = Arc::clone(&renderer);
        move |event| renderer.handle(event)
    };
    let pipeline = UpdatePipeline::new(
        config.open_store()?,
        config.layout(),
        Arc::new(RecoveryReboot::default()),
        handler,
    );

    let probe = config.probe();
    let Some(candidate) = pipeline.check(channel, &probe)? else {
        println!("{}: up to date", channel.as_str());
        return Ok(());
    };
    println!(
        "Applying {} update {} ({})",
        channel.as_str(),
        candidate.version,
        candidate.object_key
    );

    pipeline.start(candidate)?;
    pipeline.wait();

    match pipeline.state() {
        PipelineState::AwaitingReboot => {
            if yes {
                // A successful trigger never returns; an error already
                // printed the manual-reboot prompt.
                let _ = pipeline.confirm_reboot();
            } else {
                println!("Reboot into recovery to finish the update.");
            }
            Ok(())
        }
        PipelineState::Cancelled => bail!("update was cancelled"),
        _ => bail!("update failed; see the messages above"),
    }
}

fn cleanup(config: &Config) -> Result<()> {
    let layout = config.layout();
    otaup_installer::remove_with_retry(&layout.downloads_dir())?;
    otaup_installer::remove_with_retry(&layout.staging_root())?;
    println!("Removed work files under {}", layout.work_root().display());
    Ok(())
}

fn doctor(config: &Config) -> Result<()> {
    let probe = config.probe();
    let fingerprint = DeviceFingerprint::from_probe(&probe);
    let layout = config.layout();

    println!("cpu: {}", fingerprint.cpu.as_str());
    println!("resolution: {}", fingerprint.resolution);
    println!("catalog token: {}", fingerprint.catalog_token());
    println!("mcu archive: {}", fingerprint.cpu.mcu_tag().archive_name());
    println!("system build: {}", probe.system_build_date);
    println!("app build: {}", probe.app_build_timestamp);
    println!("work root: {}", layout.work_root().display());
    println!("target root: {}", layout.target_root().display());
    Ok(())
}
