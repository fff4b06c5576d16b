mod renderer;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracelens_core::export::{self, ExportFormat};
use tracelens_core::model;
use tracelens_core::processor::{self, FrameFilter, ProcessOptions};
use tracelens_core::{ContentKind, Controller, LayoutConfig, TraceSession, render};
use tracelens_protocol::Theme;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "tracelens")]
#[command(about = "Explore a Chrome performance trace as a zoomable flame chart", long_about = None)]
struct Cli {
    /// Chrome trace JSON (object or array form)
    trace: PathBuf,

    /// Network requests JSON for the waterfall view
    #[arg(long)]
    network: Option<PathBuf>,

    /// Annotations JSON (highlights, links, labels)
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// User interactions JSON
    #[arg(long)]
    interactions: Option<PathBuf>,

    /// Layout overrides as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial view
    #[arg(long, value_enum, default_value_t = Mode::Flame)]
    mode: Mode,

    /// Only build frames overlapping this range, in ms: --range START END
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    range: Option<Vec<f64>>,

    /// Turn every main-thread duration event into a frame, not just script calls
    #[arg(long)]
    all_events: bool,

    /// Write a static SVG or PNG to this path instead of opening the viewer
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Export height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    #[arg(long, value_enum, default_value_t = ThemeArg::Dark)]
    theme: ThemeArg,

    /// Log file for the interactive viewer (the terminal belongs to the UI)
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Flame,
    Network,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if cli.export.is_some() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else if let Some(path) = &cli.log {
        let file = std::fs::File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    }
    Ok(())
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {what} from {}", path.display()))
}

fn load_session(cli: &Cli, config: &LayoutConfig) -> Result<TraceSession> {
    let range = match cli.range.as_deref() {
        Some([start, end]) => Some((*start, *end)),
        Some(_) => bail!("--range takes exactly two values"),
        None => None,
    };
    let options = ProcessOptions {
        range,
        filter: if cli.all_events {
            FrameFilter::All
        } else {
            FrameFilter::CallFrames
        },
    };
    let mut session = TraceSession::new(Duration::from_millis(config.debounce_ms)).with_options(options);

    let bytes = read(&cli.trace, "trace")?;
    let events = match processor::parse_trace_events(&bytes) {
        Ok(events) => events,
        Err(err) => {
            tracing::warn!(%err, path = %cli.trace.display(), "malformed trace, showing empty view");
            Vec::new()
        }
    };
    session.load_events(events);

    if let Some(path) = &cli.network {
        let raw = model::parse_network_requests(&read(path, "network requests")?)?;
        session.load_network(&raw);
    }
    if let Some(path) = &cli.annotations {
        session.set_annotations(model::parse_annotations(&read(path, "annotations")?)?);
    }
    if let Some(path) = &cli.interactions {
        session.set_interactions(model::parse_interactions(&read(path, "interactions")?)?);
    }
    session.set_mode(match cli.mode {
        Mode::Flame => ContentKind::Flame,
        Mode::Network => ContentKind::Network,
    });

    tracing::info!(
        frames = session.trace().frames.len(),
        requests = session.network().requests.len(),
        annotations = session.annotations().len(),
        interactions = session.interactions().len(),
        "loaded"
    );
    Ok(session)
}

fn export_to(session: &TraceSession, config: LayoutConfig, cli: &Cli, path: &Path) -> Result<()> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .with_context(|| format!("{}: expected a .svg or .png extension", path.display()))?;

    let ticket = session.begin_export();
    let data = session.data();
    let controller = Controller::new(config, cli.width, cli.height, &data);
    let commands = render(&controller.scene(data));
    let theme = Theme::from(cli.theme);

    let bytes = match format {
        ExportFormat::Svg => export::render_svg(&commands, cli.width, cli.height, theme).into_bytes(),
        ExportFormat::Png => export::render_png(&commands, cli.width, cli.height, theme)?,
    };
    let bytes = session.finish_export(ticket, bytes)?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), commands = commands.len(), "exported");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = match &cli.config {
        Some(path) => LayoutConfig::from_json(&read(path, "config")?)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    let mut session = load_session(&cli, &config)?;

    match &cli.export {
        Some(path) => export_to(&session, config, &cli, path),
        None => renderer::render_tui(&mut session, &config, cli.theme.into()),
    }
}
