//! toroid - Toroidal desktop cursor wrap-around
//!
//! Teleports the pointer to the opposite screen edge when it crosses a
//! boundary, turning the desktop into a torus.

mod config;
mod geometry;
mod session;
mod wrap;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use geometry::Axis;
use wrap::Dispatcher;

/// toroid - wrap the cursor to the opposite screen edge
#[derive(Parser)]
#[command(name = "toroid")]
#[command(version = "0.1.0")]
#[command(about = "Wrap the cursor to the opposite screen edge", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wrap loop (default when no subcommand is given)
    Run {
        /// Axes to wrap on
        #[arg(short, long, value_enum)]
        axis: Option<Axis>,

        /// Fork to the background after startup
        #[arg(short, long)]
        background: bool,
    },

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show system information
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };

    // Initialize logging
    let filter = if cli.verbose || config.general.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command.unwrap_or(Commands::Run {
        axis: None,
        background: false,
    }) {
        Commands::Run { axis, background } => {
            let axis = axis.unwrap_or(config.wrap.axis);
            let background = background || config.general.background;

            // Fork before the runtime exists; a forked tokio runtime is
            // not usable in the child.
            if background {
                daemonize()?;
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_wrap(config, axis))?;
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config();
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Commands::Info => {
            print_system_info(&config);
        }
    }

    Ok(())
}

/// Run the wrap loop until a termination signal arrives.
#[cfg(target_os = "linux")]
async fn run_wrap(config: Config, axis: Axis) -> anyhow::Result<()> {
    use session::{DisplaySession, X11Session};

    let session = X11Session::connect()?;

    let mut geometry = session.query_geometry();
    if let Some(width) = config.wrap.width {
        geometry.width = width;
    }
    if let Some(height) = config.wrap.height {
        geometry.height = height;
    }

    tracing::info!(
        "Starting toroid: {}x{}, axis {:?}",
        geometry.width,
        geometry.height,
        axis
    );

    let shutdown_rx = spawn_signal_listener()?;

    let mut dispatcher = Dispatcher::new(session, geometry, axis);
    dispatcher.run(shutdown_rx).await?;

    tracing::info!("toroid stopped");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn run_wrap(_config: Config, _axis: Axis) -> anyhow::Result<()> {
    anyhow::bail!("cursor wrapping requires an X11 display (Linux only)");
}

/// Forward SIGINT/SIGTERM/SIGHUP onto a watch channel the dispatcher
/// observes, so teardown happens on the normal control-flow path instead
/// of inside a signal handler.
#[cfg(unix)]
fn spawn_signal_listener() -> anyhow::Result<watch::Receiver<bool>> {
    use tokio::signal::unix::{signal, SignalKind};

    let (tx, rx) = watch::channel(false);
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
            _ = hangup.recv() => {}
        }
        let _ = tx.send(true);
    });

    Ok(rx)
}

/// Detach from the controlling terminal.
#[cfg(unix)]
fn daemonize() -> anyhow::Result<()> {
    // daemon(3): keep the working directory, redirect stdio to /dev/null.
    let rc = unsafe { libc::daemon(1, 0) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

#[cfg(not(unix))]
fn daemonize() -> anyhow::Result<()> {
    anyhow::bail!("running in the background is not supported on this platform");
}

/// Print system information
fn print_system_info(config: &Config) {
    println!("toroid System Information");
    println!("=========================\n");

    #[cfg(target_os = "linux")]
    {
        use session::DisplaySession;

        match session::X11Session::connect() {
            Ok(session) => {
                let geometry = session.query_geometry();
                println!("Display: {}x{}", geometry.width, geometry.height);
            }
            Err(err) => println!("Display: unavailable ({})", err),
        }
    }

    #[cfg(not(target_os = "linux"))]
    println!("Display: unsupported platform");

    println!("Axis: {:?}", config.wrap.axis);
    println!("Debug: {}", config.general.debug);
}
