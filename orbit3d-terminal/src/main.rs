/// orbit3d terminal viewer
///
/// Renders a cube, a sphere and a second cube lit by an orbiting light.
/// Controls:
///   - Left drag: Orbit the camera
///   - Mouse wheel: Zoom
///   - WASD / Arrow Keys: Orbit in steps
///   - R: Reset the camera
///   - Q/ESC/Ctrl-C: Quit
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use orbit3d_terminal::{AppConfig, TerminalApp};

#[derive(Parser, Debug)]
#[command(name = "orbit3d-terminal", about = "Orbit a lit 3D scene in the terminal")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target frames per second, overriding the config file
    #[arg(long)]
    fps: Option<u32>,

    /// Write logs to this file; the terminal itself is busy rendering
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(fps) = cli.fps {
        config.terminal.fps = fps;
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("starting with {} scene objects", config.viewer.scene.len());
    TerminalApp::new(config)?.run()?;

    println!("Thank you for using orbit3d!");
    Ok(())
}
