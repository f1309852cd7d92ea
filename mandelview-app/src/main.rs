mod controller;
mod error;
mod input;
mod script;
mod settings;
mod status;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueHint};
use tracing::{debug, info};

use crate::controller::Controller;
use crate::error::{AppError, Result};
use crate::input::{GestureTracker, InputEvent};
use crate::settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "Headless Mandelbrot explorer")]
struct Cli {
    /// Settings file. Defaults to `settings.json` next to the executable.
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Input events to replay, one per line. `-` reads standard input.
    #[arg(long, value_hint = ValueHint::FilePath)]
    script: Option<PathBuf>,

    /// Save the final frame as a PNG.
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Print the status line to STDOUT after every render
    #[arg(long)]
    print_status: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!("Starting Mandelview");

    let settings = Settings::load(cli.config.as_deref());
    let events = match cli.script.as_deref() {
        Some(path) => script::parse(&read_script(path)?)?,
        None => Vec::new(),
    };

    let mut controller = Controller::new(&settings)?;
    let id = controller.render();
    finish_render(&mut controller, id, cli.print_status);

    let mut gestures = GestureTracker::new();
    for event in events {
        let Some(command) = gestures.handle(event) else {
            if let (InputEvent::PointerDragged { .. }, Some(overlay)) = (event, gestures.overlay()) {
                debug!(?overlay, "Selection");
            }
            continue;
        };
        let id = controller.apply(command)?;
        finish_render(&mut controller, id, cli.print_status);
    }

    let view = controller.viewport();
    info!(left = view.left, top = view.top, zoom = view.zoom, "Final view");

    if let Some(path) = cli.output.as_deref() {
        controller.export(path)?;
    }
    Ok(())
}

fn finish_render(controller: &mut Controller, id: u64, print_status: bool) {
    if let Some(report) = controller.wait_for(id) {
        debug!(id, rows = report.rows_completed, "Render finished");
    }
    let status = controller.status();
    info!("{status}");
    if print_status {
        println!("{status}");
    }
}

fn read_script(path: &Path) -> Result<String> {
    let io_err = |source| AppError::Io {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source).map_err(io_err)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path).map_err(io_err)
    }
}
