// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — scan a document or card into a rectified image.
//
// Entry point. Initialises logging, loads settings, runs the capture loop
// over a photo (or the camera) until a frame is acceptable, freezes it into a
// correction session, commits, and writes the rectified PNG.

mod capture;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scanwerk_bridge::{FrameSource, StillImageSource, camera_source};
use scanwerk_core::error::Result;
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{Point, ScanMode, ScannerConfig, ScannerError};
use scanwerk_vision::DragState;
use scanwerk_vision::image::{open_frame, save_frame};

use capture::CaptureLoop;
use state::ScanSession;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "scanwerk", version, about = "Find a document in a photo and straighten it")]
struct Args {
    /// Photo to scan. Without it the platform camera is used.
    input: Option<PathBuf>,

    /// Where to write the rectified PNG (default: scan-<timestamp>.png).
    output: Option<PathBuf>,

    /// JSON settings file. Takes precedence over --mode.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Detection preset: document or card.
    #[arg(long)]
    mode: Option<ScanMode>,

    /// Give up after this many frames without an acceptable detection.
    #[arg(long, default_value_t = 50)]
    max_frames: u64,

    /// Drag the frozen corners to these positions before committing:
    /// `x0,y0,x1,y1,x2,y2,x3,y3` in top-left, top-right, bottom-right,
    /// bottom-left order.
    #[arg(long, value_parser = parse_corners)]
    corners: Option<[Point; 4]>,

    /// Also write the annotated preview of the accepted frame.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Print the effective settings as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!("Scanwerk starting");

    match run(&args).await {
        Ok(Some(path)) => {
            println!("Saved {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(RunError::NothingFound { frames }) => {
            eprintln!("No document found after {frames} frames.");
            eprintln!("Make sure the whole page is visible against a contrasting background.");
            ExitCode::from(2)
        }
        Err(RunError::Scanner(err)) => {
            tracing::error!(error = %err, "Scan failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

/// Why a run ended without output.
#[derive(Debug)]
enum RunError {
    NothingFound { frames: u64 },
    Scanner(scanwerk_core::ScannerError),
}

impl From<ScannerError> for RunError {
    fn from(err: ScannerError) -> Self {
        Self::Scanner(err)
    }
}

/// Parse eight comma-separated coordinates into four corners.
fn parse_corners(text: &str) -> std::result::Result<[Point; 4], String> {
    let values = text
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if values.len() != 8 {
        return Err(format!("expected 8 coordinates, got {}", values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err("coordinates must be finite".into());
    }
    Ok(std::array::from_fn(|i| Point::new(values[2 * i], values[2 * i + 1])))
}

/// Drag each frozen corner onto `targets`, one pointer gesture per corner.
///
/// A release on degenerate intermediate corners is logged and the drags
/// continue; only the final commit decides.
fn drag_corners(session: &mut ScanSession, targets: &[Point; 4]) -> Result<()> {
    let corrector = session.corrector_mut().ok_or_else(|| {
        ScannerError::PreconditionViolation("no correction session to adjust".into())
    })?;
    for (index, target) in targets.iter().enumerate() {
        let from = corrector.corners()[index];
        corrector.pointer_down(from)?;
        if corrector.state() != DragState::Dragging(index) {
            return Err(ScannerError::PreconditionViolation(format!(
                "corner {index} handle overlaps another corner"
            )));
        }
        corrector.pointer_move(*target)?;
        if let Err(err) = corrector.pointer_up() {
            tracing::debug!(index, error = %err, "Intermediate corners rejected");
        }
    }
    tracing::info!(corners = ?corrector.corners(), "Corners adjusted");
    Ok(())
}

/// Settings from `--config`, else the `--mode` preset.
fn load_config(args: &Args) -> Result<ScannerConfig> {
    let config = match &args.config {
        Some(path) => ScannerConfig::load(path)?,
        None => ScannerConfig::for_mode(args.mode.unwrap_or_default()),
    };
    config.validate()?;
    Ok(config)
}

fn open_source(args: &Args) -> Result<Box<dyn FrameSource>> {
    match &args.input {
        Some(path) => {
            let frame = open_frame(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(Box::new(StillImageSource::new(name, frame)))
        }
        None => Ok(camera_source()),
    }
}

fn default_output() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("scan-{stamp}.png"))
}

async fn run(args: &Args) -> std::result::Result<Option<PathBuf>, RunError> {
    let config = load_config(args)?;
    if args.print_config {
        let json = serde_json::to_string_pretty(&config).map_err(ScannerError::from)?;
        println!("{json}");
        return Ok(None);
    }

    let source = open_source(args)?;
    tracing::info!(source = source.source_name(), mode = ?config.mode, "Capture starting");
    let session = ScanSession::new(source.frame_size(), config)?;
    let mut capture = CaptureLoop::new(source, session)?;

    let Some(outcome) = capture.run_until_acceptable(Some(args.max_frames)).await? else {
        return Err(RunError::NothingFound {
            frames: capture.ticks(),
        });
    };
    if let Some(message) = capture.session().status_message() {
        tracing::info!(%message, "Guidance");
    }
    if let Some(path) = &args.preview {
        save_frame(&outcome.annotated, path)?;
    }

    let mut session = capture.into_session();
    let corrector = session.freeze()?;
    tracing::info!(corners = ?corrector.corners(), "Corners frozen");
    if let Some(targets) = &args.corners {
        drag_corners(&mut session, targets)?;
    }
    let rectified = session.commit()?;

    let output = args.output.clone().unwrap_or_else(default_output);
    save_frame(&rectified, &output)?;
    tracing::info!(
        session = %session.id(),
        path = %output.display(),
        width = rectified.width(),
        height = rectified.height(),
        "Scan saved"
    );
    Ok(Some(output))
}
