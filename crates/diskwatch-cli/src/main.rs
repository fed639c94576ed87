use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use diskwatch_core::{
    Credentials, DfProbe, HostContext, IpApiResolver, Monitor, MonitorConfig, Notifier,
    PushoverNotifier, SystemClock, UtilizationProbe,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod output;

#[derive(Debug, Parser)]
#[command(name = "diskwatchd")]
#[command(about = "Disk usage watcher with Pushover alerts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Run {
        #[command(flatten)]
        watch: WatchArgs,
        #[command(flatten)]
        credentials: CredentialArgs,
        #[arg(long)]
        no_diagnostics: bool,
    },
    Once {
        #[arg(long, env = "DISKWATCH_TARGET")]
        target: String,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
        #[arg(long)]
        no_diagnostics: bool,
    },
    Host {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Notify {
        #[command(flatten)]
        credentials: CredentialArgs,
        #[arg(long)]
        message: String,
    },
}

#[derive(Debug, Args)]
struct WatchArgs {
    #[arg(long, env = "DISKWATCH_TARGET")]
    target: String,
    #[arg(long, env = "DISKWATCH_INTERVAL")]
    interval: String,
    #[arg(long, env = "DISKWATCH_THRESHOLD")]
    threshold: f64,
    #[arg(long, env = "DISKWATCH_NAG_INTERVAL")]
    nag_interval: String,
}

#[derive(Debug, Args)]
struct CredentialArgs {
    #[arg(long, env = "PUSHOVER_APP_TOKEN", hide_env_values = true)]
    app_token: String,
    #[arg(long, env = "PUSHOVER_USER_KEY", hide_env_values = true)]
    user_key: String,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Credentials::new(args.app_token, args.user_key)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            watch,
            credentials,
            no_diagnostics,
        } => {
            let config = MonitorConfig::new(
                watch.target,
                &watch.interval,
                watch.threshold,
                &watch.nag_interval,
                credentials.into(),
            )
            .context("invalid monitor configuration")?
            .with_diagnostics(!no_diagnostics);

            let host = HostContext::resolve(&IpApiResolver::new()).await;
            let probe = DfProbe::new(config.collect_diagnostics);
            let notifier = PushoverNotifier::new(config.credentials.clone());
            let mut monitor = Monitor::new(config, host, probe, notifier, SystemClock);

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("received ctrl-c, stopping");
                    on_signal.cancel();
                }
            });

            monitor.run(cancel).await;
        }
        Command::Once {
            target,
            format,
            no_diagnostics,
        } => {
            let reading = DfProbe::new(!no_diagnostics)
                .probe(&target)
                .await
                .with_context(|| format!("probing {target}"))?;
            println!("{}", output::render_reading(&reading, format)?);
        }
        Command::Host { format } => {
            let host = HostContext::resolve(&IpApiResolver::new()).await;
            println!("{}", output::render_host(&host, format)?);
        }
        Command::Notify {
            credentials,
            message,
        } => {
            let result = PushoverNotifier::new(credentials.into())
                .notify(&message)
                .await
                .context("sending notification")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
