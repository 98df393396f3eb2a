//! CLI tool for gridview - replays a scroll script against a dataset and
//! prints what was materialized at each step as JSON
//!
//! Usage:
//!   gridview_cli <dataset.json> <script.json>              # Trace to stdout
//!   gridview_cli <dataset.json> <script.json> -o out.json  # Trace to file
//!   gridview_cli --generate 1000x20 <script.json>          # Synthetic dataset
//!
//! Set `RUST_LOG=gridview=debug` to log diff decisions to stderr.

#![allow(clippy::exit)]

use std::env;
use std::fs;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use gridview::render::DiffStats;
use gridview::{
    Column, Dataset, GridConfig, GridviewError, MeasureType, MemoryProvider,
    RecordingMaterializer, Result, ScrollState, TableView, Viewport, WindowChange,
};

/// One scripted interaction
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
enum Step {
    ScrollTo { x: f64, y: f64 },
    ScrollBy { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
    SetActive { active: bool },
    Reload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Script {
    #[serde(default)]
    config: GridConfig,
    width: f64,
    height: f64,
    steps: Vec<Step>,
}

/// State after one step
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceEntry {
    /// `None` for the initial load
    step: Option<Step>,
    scroll: ScrollState,
    viewport: Option<Viewport>,
    recomputed: bool,
    change: Option<WindowChange>,
    stats: Option<DiffStats>,
    live_cells: usize,
    /// Cells of the previous window that were kept
    reused: Option<u64>,
}

#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second initialization only happens in embedded use; keep the first
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
fn init_tracing() {}

/// Parse `<rows>x<cols>`
fn parse_dimensions(dims: &str) -> Result<(u32, u32)> {
    let (rows, cols) = dims
        .split_once('x')
        .ok_or_else(|| GridviewError::Other(format!("expected <rows>x<cols>, got {dims}")))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| GridviewError::Other(format!("invalid dimension {s:?}: {e}")))
    };
    Ok((parse(rows)?, parse(cols)?))
}

fn load_provider(source: &str, generate: bool) -> Result<MemoryProvider> {
    if generate {
        let (rows, cols) = parse_dimensions(source)?;
        let columns = (0..cols)
            .map(|i| {
                Column::new(format!("Column {}", i + 1), 100.0)
                    .with_measure_type(MeasureType::Continuous)
            })
            .collect();
        return Ok(MemoryProvider::sequential(columns, rows));
    }
    let dataset: Dataset = serde_json::from_str(&fs::read_to_string(source)?)?;
    Ok(MemoryProvider::new(dataset))
}

fn entry(
    view: &TableView<RecordingMaterializer, MemoryProvider>,
    step: Option<Step>,
    recomputed: bool,
    previous_cells: u64,
) -> TraceEntry {
    let last = view.last_diff().filter(|_| recomputed);
    TraceEntry {
        step,
        scroll: view.scroll_state(),
        viewport: view.viewport(),
        recomputed,
        change: last.map(|d| d.change),
        stats: last.map(|d| d.stats),
        live_cells: view.materializer().live_count(),
        reused: last.map(|d| d.stats.reused(previous_cells)),
    }
}

fn run(args: &[String]) -> Result<String> {
    let (source, generate, rest) = match args {
        [flag, dims, rest @ ..] if flag == "--generate" => (dims.as_str(), true, rest),
        [path, rest @ ..] => (path.as_str(), false, rest),
        [] => return Err(GridviewError::Other("missing dataset".to_string())),
    };
    let script_path = rest
        .first()
        .ok_or_else(|| GridviewError::Other("missing script".to_string()))?;

    let script: Script = serde_json::from_str(&fs::read_to_string(script_path)?)?;
    let provider = load_provider(source, generate)?;
    let mut view = TableView::new(script.config, RecordingMaterializer::new(), provider)?
        .with_size(script.width, script.height);

    let mut trace = Vec::with_capacity(script.steps.len() + 1);
    view.load();
    trace.push(entry(&view, None, true, 0));

    for step in script.steps {
        let previous_cells = view.materializer().live_count() as u64;
        let outcome = match step {
            Step::ScrollTo { x, y } => view.scroll_to(x, y),
            Step::ScrollBy { dx, dy } => view.scroll_by(dx, dy),
            Step::Resize { width, height } => view.resize(width, height),
            Step::SetActive { active } => view.set_active(active),
            Step::Reload => Some(view.load()),
        };
        trace.push(entry(&view, Some(step), outcome.is_some(), previous_cells));
    }

    Ok(serde_json::to_string_pretty(&trace)?)
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("Usage: gridview_cli <dataset.json | --generate ROWSxCOLS> <script.json> [-o output.json]");
        std::process::exit(1);
    }

    let output_path = match args.iter().position(|a| a == "-o") {
        Some(i) => args.get(i + 1).cloned(),
        None => None,
    };
    let positional: Vec<String> = match args.iter().position(|a| a == "-o") {
        Some(i) => args.iter().take(i).cloned().collect(),
        None => args,
    };

    let json = match run(&positional) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing {path}: {e}");
                std::process::exit(1);
            }
            eprintln!("Written: {path}");
        }
        None => {
            let mut stdout = io::stdout();
            if stdout.write_all(json.as_bytes()).is_err() || writeln!(stdout).is_err() {
                std::process::exit(1);
            }
        }
    }
}
