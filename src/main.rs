mod archive;
mod config;
mod error;
mod fetch;
mod job;
mod logging;
mod metadata;
mod paths;
mod steam_root;

use std::process::{Command as Process, ExitCode};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{AppConfig, Source, load_cfg, save_cfg};
use crate::job::{AcquireContext, Job, JobEvent, JobReport, JobRunner, PostInstall};
use crate::logging::{CONSOLE_LOG_LEVEL, DEFAULT_LOG_LEVEL, init_logging};
use crate::paths::{PATH_CONFIG, PATH_DOWNLOAD, PATH_LOG};
use crate::steam_root::SteamRootResolver;

/// How often the foreground drains job events
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(
    name = "manifest-fetch",
    version,
    about = "Download Steam manifest archives and install them into Steam"
)]
struct Cli {
    /// Also print info-level log lines on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download and extract the manifest archive for an app id
    Fetch(FetchArgs),
    /// Show or change saved settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Show where Steam is installed
    Locate,
    /// Open the download folder
    Open,
}

#[derive(Args)]
struct FetchArgs {
    #[arg(value_parser = parse_app_id, help = "Steam app id, e.g. 480")]
    app_id: String,
    /// Source to download from (defaults to the saved setting)
    #[arg(long, value_enum)]
    source: Option<SourceArg>,
    /// Copy <appid>.lua into Steam afterwards
    #[arg(long, overrides_with = "no_auto_install")]
    auto_install: bool,
    /// Don't copy anything into Steam
    #[arg(long, overrides_with = "auto_install")]
    no_auto_install: bool,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the current settings
    Show,
    /// Set the default download source
    Source {
        #[arg(value_enum)]
        source: SourceArg,
    },
    /// Turn automatic install into Steam on or off
    AutoInstall {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Primary,
    Mirrored,
}

impl From<SourceArg> for Source {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Primary => Source::Primary,
            SourceArg::Mirrored => Source::Mirrored,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn parse_app_id(raw: &str) -> Result<String, String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err("app id must not be empty".to_string());
    }
    Ok(id.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let console_level = if cli.verbose {
        DEFAULT_LOG_LEVEL
    } else {
        CONSOLE_LOG_LEVEL
    };
    let _log_guard = match init_logging(&PATH_LOG, console_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    };

    let mut config = load_cfg(&PATH_CONFIG);

    match cli.command {
        Command::Fetch(args) => fetch(args, &config),
        Command::Config(cmd) => configure(cmd, &mut config),
        Command::Locate => locate(),
        Command::Open => open_download_dir(),
    }
}

fn fetch(args: FetchArgs, config: &AppConfig) -> ExitCode {
    let source = args.source.map(Source::from).unwrap_or(config.download_source);
    let auto_import = if args.auto_install {
        true
    } else if args.no_auto_install {
        false
    } else {
        config.auto_import
    };

    let mut runner = JobRunner::new(AcquireContext::system(auto_import));
    let events = match runner.start(Job::new(args.app_id, source)) {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match drain_events(&events) {
        Some(report) if report.succeeded() => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Some(report) => {
            eprintln!("{}", report);
            ExitCode::FAILURE
        }
        None => {
            eprintln!("job ended without a result, see the log file");
            ExitCode::FAILURE
        }
    }
}

/// Print events as they arrive until the job reports back
fn drain_events(events: &Receiver<JobEvent>) -> Option<JobReport> {
    loop {
        match events.try_recv() {
            Ok(JobEvent::Log(line)) => println!("{}", line),
            Ok(JobEvent::GameInfo {
                name,
                header_image,
                folder,
            }) => {
                println!("Name:   {}", name.as_deref().unwrap_or("unknown"));
                if let Some(url) = header_image {
                    println!("Header: {}", url);
                }
                println!("Folder: {}", PATH_DOWNLOAD.join(folder).display());
            }
            Ok(JobEvent::Finished(report)) => {
                if let PostInstall::Failed(e) = &report.post_install {
                    eprintln!("Download kept, but installing into Steam failed: {}", e);
                }
                return Some(report);
            }
            Err(TryRecvError::Empty) => thread::sleep(POLL_INTERVAL),
            Err(TryRecvError::Disconnected) => return None,
        }
    }
}

fn configure(cmd: ConfigCommand, config: &mut AppConfig) -> ExitCode {
    match cmd {
        ConfigCommand::Show => {
            println!("download source: {}", config.download_source);
            println!(
                "auto install:    {}",
                if config.auto_import { "on" } else { "off" }
            );
            println!("config file:     {}", PATH_CONFIG.display());
            println!("download folder: {}", PATH_DOWNLOAD.display());
            return ExitCode::SUCCESS;
        }
        ConfigCommand::Source { source } => {
            config.download_source = source.into();
            println!("Download source set to {}", config.download_source);
        }
        ConfigCommand::AutoInstall { state } => {
            config.auto_import = matches!(state, Toggle::On);
            println!(
                "Auto install {}",
                if config.auto_import { "enabled" } else { "disabled" }
            );
        }
    }

    match save_cfg(&PATH_CONFIG, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("failed to save {}: {}", PATH_CONFIG.display(), e);
            eprintln!("Could not save settings: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn locate() -> ExitCode {
    match SteamRootResolver::system().resolve() {
        Ok(root) => {
            println!("{} (found via {})", root.path.display(), root.method);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_download_dir() -> ExitCode {
    if let Err(e) = std::fs::create_dir_all(&*PATH_DOWNLOAD) {
        eprintln!("Could not create {}: {}", PATH_DOWNLOAD.display(), e);
        return ExitCode::FAILURE;
    }

    let opener = if cfg!(windows) {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    match Process::new(opener).arg(&*PATH_DOWNLOAD).spawn() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Could not run {}: {}", opener, e);
            eprintln!("Download folder: {}", PATH_DOWNLOAD.display());
            ExitCode::FAILURE
        }
    }
}
