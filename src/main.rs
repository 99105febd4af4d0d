//! Replay driver for state machine descriptions.
//!
//! Loads a description, then replays a script of raw pointer events against it,
//! printing every semantic event, state change, printed line and redraw.
//!
//! # Usage
//!
//! ```text
//! hotspot-replay <description.json> <script.jsonl> [config.toml]
//! ```
//!
//! # Script Format
//!
//! One JSON value per line; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! {"kind": "move", "x": 12, "y": 8}
//! {"kind": "press", "x": 12, "y": 8}
//! {"kind": "rightClick", "x": 12, "y": 8}
//! {"move_to": [40, 40]}
//! {"reset": true}
//! ```
//!
//! Without a config file, relative image locations resolve against the
//! description's directory.

#![allow(clippy::multiple_crate_versions)]

use hotspot::host::RedrawScheduler;
use hotspot::observability::init_tracing;
use hotspot::{description, initialize, Config, ImageLoader, Interactor, LoadWorker, RawEvent};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Event(RawEvent),
    MoveTo { move_to: (f64, f64) },
    Reset { reset: bool },
}

struct Args {
    description: PathBuf,
    script: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args_os().skip(1);
    let description = args.next()?.into();
    let script = args.next()?.into();
    let config = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return None;
    }
    Some(Args {
        description,
        script,
        config,
    })
}

fn load_config(args: &Args) -> hotspot::Result<Config> {
    match &args.config {
        Some(path) => Config::from_file(path),
        None => {
            let root = args
                .description
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Ok(Config {
                image_root: root.to_string_lossy().into_owned(),
                ..Config::default()
            })
        }
    }
}

fn region_label(interactor: &Interactor, region: Option<hotspot::RegionId>) -> String {
    region
        .and_then(|id| interactor.fsm().and_then(|fsm| fsm.region(id)))
        .map_or_else(|| "<none>".to_string(), |r| r.name().to_string())
}

fn settle<F: hotspot::Fetch>(
    interactor: &mut Interactor,
    worker: &mut LoadWorker<F>,
    scheduler: &RedrawScheduler,
) {
    let delivered = worker.pump(interactor);
    if delivered > 0 {
        println!("  loads completed: {delivered}");
    }
    for line in interactor.take_console() {
        println!("  | {line}");
    }
    if scheduler.take_redraw() {
        println!("  redraw");
    }
}

fn run(args: &Args) -> hotspot::Result<bool> {
    let config = load_config(args)?;
    init_tracing(&config);

    let mut interactor = initialize(&config, ImageLoader::default());
    let scheduler = RedrawScheduler::new();
    interactor.set_host(Some(scheduler.handle()));
    let mut worker = LoadWorker::new(config.file_fetcher());

    if !interactor.install_description(description::from_file(&args.description)) {
        eprintln!(
            "failed to load {}: {}",
            args.description.display(),
            interactor.failure().unwrap_or("unknown error")
        );
        return Ok(false);
    }
    println!("state: {}", interactor.current_state().unwrap_or("<none>"));
    settle(&mut interactor, &mut worker, &scheduler);

    let script = std::fs::read_to_string(&args.script)?;
    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(line).map_err(|e| {
            hotspot::HotspotError::Description(format!("script line {}: {e}", number + 1))
        })?;

        match step {
            Step::Event(raw) => {
                println!("{:?} at ({}, {})", raw.kind, raw.x, raw.y);
                let before = interactor.current_state().map(str::to_string);
                let dispatched = interactor.dispatch(&raw)?;
                for d in &dispatched {
                    println!(
                        "  {} {}{}",
                        d.event,
                        region_label(&interactor, d.region),
                        if d.fired { "" } else { " (unmatched)" }
                    );
                }
                let after = interactor.current_state().map(str::to_string);
                if before != after {
                    println!("  state: {}", after.as_deref().unwrap_or("<none>"));
                }
            }
            Step::MoveTo { move_to: (x, y) } => {
                println!("move interactor to ({x}, {y})");
                interactor.set_position(x, y);
            }
            Step::Reset { reset } => {
                if reset {
                    println!("reset");
                    interactor.reset();
                }
            }
        }
        settle(&mut interactor, &mut worker, &scheduler);
    }

    print!("{}", interactor.view());
    let diagnostics = interactor.diagnostics().snapshot();
    if !diagnostics.is_empty() {
        println!("diagnostics:");
        for diagnostic in diagnostics {
            println!("  {diagnostic}");
        }
    }
    Ok(true)
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        eprintln!("usage: hotspot-replay <description.json> <script.jsonl> [config.toml]");
        return ExitCode::from(2);
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "replay aborted");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
