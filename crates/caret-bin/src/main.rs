//! Caret entrypoint.
//!
//! Loads a document into an `EditorState` measured with terminal-cell
//! metrics, replays a sequence of cursor motions and prints where every
//! cursor ended up along with the viewport state.
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use core_config::{Config, Settings, load_from};
use core_render::{EditorBox, SharedBox, timing};
use core_state::EditorState;
use core_text::{CellSurface, Point, TextBuffer, WordBoundaryError};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Once;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "caret.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "caret", version, about = "Caret positioning engine")]
struct Args {
    /// Document to load. Without one the editor runs with no buffer attached.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `caret.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Editor width in pixels.
    #[arg(long, default_value_t = 640.0)]
    pub width: f64,
    /// Editor height in pixels.
    #[arg(long, default_value_t = 480.0)]
    pub height: f64,
    /// Extra cursor as LINE:COLUMN (repeatable).
    #[arg(long = "cursor", value_parser = parse_point)]
    pub cursors: Vec<Point>,
    /// Motion to apply, in order (repeatable).
    #[arg(long = "motion", value_enum)]
    pub motions: Vec<Motion>,
    /// Extend selections instead of collapsing them.
    #[arg(long)]
    pub select: bool,
    /// Pause between motions, in milliseconds. 0 waits one frame.
    #[arg(long = "step-delay-ms")]
    pub step_delay_ms: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Right,
    Left,
    Up,
    Down,
    LineStart,
    LineEnd,
    WordStart,
    WordEnd,
    Top,
    Bottom,
    SelectWord,
    SelectParagraph,
    SelectAll,
    DeleteSelection,
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (line, column) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COLUMN, got `{raw}`"))?;
    let line = line
        .trim()
        .parse()
        .map_err(|e| format!("bad line `{line}`: {e}"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|e| format!("bad column `{column}`: {e}"))?;
    Ok(Point::new(line, column))
}

struct AppStartup {
    _log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { _log_guard: None }
    }

    fn run(&mut self, args: &Args) -> Result<EditorState> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let config = load_from(args.config.clone())?;
        let state = Self::load_editor_state(args, &config)?;
        info!(
            target: "runtime.startup",
            path = args.path.as_ref().map(|p| p.display().to_string()).as_deref(),
            config_override = args.config.is_some(),
            config_found = config.raw.is_some(),
            screen_lines = state.screen_len(),
            "bootstrap_complete"
        );
        Ok(state)
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self._log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }

    fn load_editor_state(args: &Args, config: &Config) -> Result<EditorState> {
        if !(args.width > 0.0 && args.height > 0.0) {
            bail!("editor size must be positive, got {}x{}", args.width, args.height);
        }
        let settings: Settings = config.resolve();
        let bounds = SharedBox::new(EditorBox::sized(args.width, args.height));
        let mut state = EditorState::new(settings, Rc::new(CellSurface), bounds)
            .context("font cannot be measured")?;
        if let Some(path) = args.path.as_ref() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "untitled".to_string());
            state.attach_buffer(TextBuffer::from_str(name, &content));
        } else {
            warn!(target: "runtime.startup", "no_document");
        }
        for point in &args.cursors {
            state.add_cursor(*point);
        }
        Ok(state)
    }
}

fn step(state: &mut EditorState, motion: Motion, select: bool) -> Result<(), WordBoundaryError> {
    match motion {
        Motion::WordStart => return state.move_to_start_of_word(select),
        Motion::WordEnd => return state.move_to_end_of_word(select),
        Motion::SelectWord => return state.select_word(),
        Motion::Right => state.move_right(1, select),
        Motion::Left => state.move_left(1, select),
        Motion::Up => state.move_up(1, select),
        Motion::Down => state.move_down(1, select),
        Motion::LineStart => state.move_to_start_of_line(select),
        Motion::LineEnd => state.move_to_end_of_line(select),
        Motion::Top => state.move_to_top(select),
        Motion::Bottom => state.move_to_bottom(select),
        Motion::SelectParagraph => state.select_paragraph(),
        Motion::SelectAll => state.select_all(),
        Motion::DeleteSelection => state.delete_selection(),
    }
    Ok(())
}

fn apply(state: &mut EditorState, motion: Motion, select: bool) {
    if let Err(e) = step(state, motion, select) {
        error!(target: "runtime", ?motion, %e, "motion_failed");
    }
    state.scroll_cursor_into_view();
}

fn report(state: &EditorState) {
    for cursor in state.cursors() {
        let selection = cursor.selection();
        let xy = cursor.drawing();
        println!(
            "{} at {}:{} anchor {}:{} drawn ({:.1}, {:.1})",
            cursor.id(),
            cursor.position().line,
            cursor.position().column,
            selection.anchor().line,
            selection.anchor().column,
            xy.x,
            xy.y
        );
    }
    let lines = state.visible_lines();
    println!(
        "scroll {:.1} (rollover {:.1}) lines {}..={} of {}",
        state.scroll(),
        state.rollover_scroll(),
        lines.start(),
        lines.end(),
        state.screen_len()
    );
    if let Some(bar) = state.scrollbar() {
        println!(
            "scrollbar thumb {:.1}+{:.1} of {:.1}x{:.1}",
            bar.thumb_top, bar.thumb_height, bar.track_width, bar.track_height
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let mut state = startup.run(&args)?;
    for motion in &args.motions {
        apply(&mut state, *motion, args.select);
        match args.step_delay_ms {
            Some(0) => timing::delay().await,
            Some(ms) => timing::sleep(ms).await,
            None => {}
        }
    }
    info!(target: "runtime", motions = args.motions.len(), "replay_complete");
    report(&state);
    Ok(())
}
