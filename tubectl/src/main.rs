use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tubectl::commands::StatsCommand;
use tubectl::config::{Config, DEFAULT_LOG_LEVEL, parse_log_level};
use tubectl::session::Session;
use tubeline::queue::{BeanstalkClient, MemoryQueue};

#[derive(Parser)]
#[command(name = "tubectl")]
#[command(about = "Interactive prompt for putting jobs into beanstalkd")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short = 'H', long, global = true, help = "Broker host [default: localhost]")]
    host: Option<String>,

    #[arg(
        short = 'p',
        long,
        visible_short_alias = 'P',
        global = true,
        help = "Broker port [default: 11300]"
    )]
    port: Option<u16>,

    #[arg(long, help = "Use an in-memory queue instead of connecting to a broker")]
    offline: bool,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Suppress output except errors")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show tube statistics and exit")]
    Stats(StatsCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        if !cli.quiet {
            eprintln!("⚠️  Warning: Could not load config ({}), using defaults", e);
        }
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    });
    config.override_address(cli.host.clone(), cli.port);

    setup_logging(&cli, &config)?;

    match execute_command(&cli, &config).await {
        Ok(()) => {
            if cli.verbose {
                info!("Session finished");
            }
        }
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli, config: &Config) -> Result<()> {
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        config.get_log_level()
    };

    let (log_level, rejected) = match parse_log_level(log_level) {
        Some(level) => (level, None),
        None => (LevelFilter::WARN, Some(log_level.to_string())),
    };

    let env_filter = EnvFilter::from_default_env()
        .add_directive(format!("tubectl={}", log_level).parse()?)
        .add_directive(format!("tubeline={}", log_level).parse()?);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    if let Some(level) = rejected {
        warn!(
            "Unknown log level {:?} in configuration, using {}",
            level, DEFAULT_LOG_LEVEL
        );
    }

    Ok(())
}

async fn execute_command(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Some(Commands::Stats(command)) => command.execute(config).await,
        None => run_session(cli.offline, config).await,
    }
}

async fn run_session(offline: bool, config: &Config) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    if offline {
        warn!("Running offline: jobs are kept in memory and discarded on exit");
        return Session::new(config, MemoryQueue::new())
            .run(input, output)
            .await;
    }

    let address = config.address();
    let client = BeanstalkClient::connect(config.get_host(), config.get_port())
        .await
        .with_context(|| format!("Could not connect to {}", address))?;
    Session::new(config, client).run(input, output).await
}
