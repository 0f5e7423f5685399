//! cloud-platform-rs - cloud platform bootstrap
//!
//! Fetches instance metadata and user-data from the platform the node is
//! running on and prints what the boot orchestrator would receive.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cloud_platform_rs::config::{DEFAULT_SETTINGS_PATH, load_settings};
use cloud_platform_rs::netutils::AlwaysReady;
use cloud_platform_rs::platforms::platform_names;
use cloud_platform_rs::{PlatformError, acquire_network_config, platform_by_name};

#[derive(Parser)]
#[command(name = "cloud-platform-rs")]
#[command(author, version, about = "Cloud platform bootstrap", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Settings file
    #[arg(long, env = "CLOUD_PLATFORM_CONFIG", default_value = DEFAULT_SETTINGS_PATH)]
    config: PathBuf,

    /// Platform to use, overriding the settings file
    #[arg(long, env = "CLOUD_PLATFORM")]
    platform: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch metadata and print the network configuration as JSON
    Network,
    /// Download the machine configuration from user-data
    Configuration {
        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the kernel arguments required by the platform
    KernelArgs,
    /// Print platform name and boot mode
    Info,
    /// List known platforms
    List,
}

fn init_logging(verbosity: u8) {
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    // RUST_LOG wins over -v when set
    let result = match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(
            builder.with_env_filter(filter).compact().finish(),
        ),
        Err(_) => {
            let level = match verbosity {
                0 => Level::INFO,
                1 => Level::DEBUG,
                _ => Level::TRACE,
            };
            tracing::subscriber::set_global_default(
                builder.with_max_level(level).compact().finish(),
            )
        }
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Cancel `ctx` on Ctrl-C
fn cancel_on_interrupt(ctx: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            ctx.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = load_settings(&cli.config)
        .await
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    if let Some(platform) = cli.platform {
        settings.platform = platform;
    }

    let platform = platform_by_name(&settings.platform, &settings)?;

    let ctx = CancellationToken::new();
    cancel_on_interrupt(ctx.clone());

    match cli.command {
        Commands::Network => {
            let config = acquire_network_config(platform.as_ref(), &ctx)
                .await
                .context("fetching network configuration")?;
            println!("{}", config.to_json()?);
        }
        Commands::Configuration { output } => {
            match platform.configuration(&ctx, &AlwaysReady).await {
                Ok(data) => match output {
                    Some(path) => {
                        tokio::fs::write(&path, &data).await?;
                        info!("Wrote {} bytes to {}", data.len(), path.display());
                    }
                    None => {
                        use tokio::io::AsyncWriteExt;
                        tokio::io::stdout().write_all(&data).await?;
                    }
                },
                Err(PlatformError::NoConfigSource) => {
                    info!("Platform {} has no machine configuration", platform.name());
                }
                Err(e) => return Err(e).context("downloading machine configuration"),
            }
        }
        Commands::KernelArgs => {
            println!("{}", platform.kernel_args());
        }
        Commands::Info => {
            println!("{} ({})", platform.name(), platform.mode());
        }
        Commands::List => {
            for name in platform_names() {
                println!("{}", name);
            }
        }
    }

    Ok(())
}
