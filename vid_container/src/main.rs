use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};

use shared_utils::common_utils::is_supported_platform;
use shared_utils::logging::{init_logging, init_stderr_logging, LogConfig};
use shared_utils::notify::{DesktopNotifier, Notifier, NullNotifier};
use shared_utils::report::print_summary_report;
use shared_utils::tool_runner::SystemToolRunner;
use vid_container::{Pipeline, TargetContainer, ToolConfig};

const PROGRAM_NAME: &str = "vid_container";

#[derive(Parser)]
#[command(name = "vid-container")]
#[command(
    version,
    about = "Remux videos into another container and delete sources that verify",
    long_about = None
)]
struct Cli {
    /// Target container format
    #[arg(short, long, value_enum)]
    container: TargetContainer,

    /// Video files and/or directories (searched recursively)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// JSON file with binary paths and the disk space margin
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Probe binary, overrides the configured one
    #[arg(long, value_name = "PATH")]
    probe: Option<PathBuf>,

    /// Directory for the run log (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Don't raise desktop notifications on errors
    #[arg(long)]
    no_notify: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !is_supported_platform() {
        eprintln!("❌ This platform is not supported yet");
        std::process::exit(1);
    }

    let mut log_config = LogConfig::default();
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir);
    }
    if cli.verbose {
        log_config = log_config.with_level(Level::DEBUG);
    }
    let log_dir = log_config.log_dir.clone();
    let level = log_config.level;
    match init_logging(PROGRAM_NAME, log_config) {
        Ok(_) => println!("Check logging results at {}\n", log_dir.display()),
        Err(e) => {
            eprintln!("⚠️  Logging to file disabled: {:#}", e);
            if let Err(e) = init_stderr_logging(PROGRAM_NAME, level) {
                eprintln!("⚠️  Terminal logging disabled: {:#}", e);
            }
        }
    }

    info!(
        "Started on {} (PID {}) with args: {:?}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        std::process::id(),
        std::env::args().collect::<Vec<_>>()
    );

    if cli.paths.is_empty() {
        error!("❌ No paths given to process");
        std::process::exit(1);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let notifier: Box<dyn Notifier> = if cli.no_notify {
        Box::new(NullNotifier)
    } else {
        Box::new(DesktopNotifier::new("vid-container"))
    };
    let runner = SystemToolRunner;

    let report = Pipeline::new(&config, cli.container, &runner, &*notifier).run(&cli.paths);
    print_summary_report(&report.summary(cli.container));

    if !report.state.failures.is_empty() {
        warn!(
            "{} file(s) failed; see the list above",
            report.state.failures.len()
        );
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ToolConfig> {
    let mut config = match &cli.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    if let Some(probe) = &cli.probe {
        config = config.with_probe(probe);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
