//! damedit - paint a source file with syntax colours in the terminal

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use damedit::config::Settings;
use damedit::error::Result;
use damedit::syntax::{active_line, find_next, HighlightScheduler, SyntaxManager, TextIndex};
use damedit::terminal::{clear_screen, Painter};

/// How often `--watch` checks the file for changes
const WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Paint a source file with syntax colours
#[derive(Parser, Debug)]
#[command(name = "damedit", version, about = "Paint a source file with syntax colours")]
struct Args {
    /// File to highlight
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Directory of language profiles (overrides the settings file)
    #[arg(long, value_name = "DIR")]
    configs: Option<PathBuf>,

    /// Language profile to load after detection
    #[arg(long, value_name = "FILE")]
    language: Option<PathBuf>,

    /// Theme file merged over the default theme
    #[arg(long, value_name = "FILE")]
    theme: Option<PathBuf>,

    /// Highlight the next match of TEXT after the caret
    #[arg(long, value_name = "TEXT")]
    find: Option<String>,

    /// Put the caret on line N and highlight that line
    #[arg(long, value_name = "N")]
    line: Option<usize>,

    /// Show a line number gutter
    #[arg(short = 'n', long)]
    line_numbers: bool,

    /// Repaint whenever the file changes
    #[arg(short, long)]
    watch: bool,
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so painted output on stdout stays clean
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load();

    let mut manager = SyntaxManager::new();
    manager.enabled = settings.highlighting;

    let configs = args.configs.as_ref().unwrap_or(&settings.configs_dir);
    if let Err(e) = manager.scan_profiles(configs) {
        warn!(dir = %configs.display(), error = %e, "could not scan language profiles");
    }

    for theme in settings.theme.iter().chain(args.theme.iter()) {
        if let Err(e) = manager.apply_theme_file(theme) {
            eprintln!("Failed to load theme {}: {}", theme.display(), e);
        }
    }

    manager.open_path(&args.file);
    if let Some(language) = &args.language {
        match manager.load_language_file(language) {
            Ok(profile) => {
                for diagnostic in &profile.diagnostics {
                    eprintln!("{}: {}", language.display(), diagnostic);
                }
            }
            Err(e) => eprintln!("Failed to load language {}: {}", language.display(), e),
        }
    }
    info!(profile = %manager.profile().name, file = %args.file.display(), "highlighting");

    let text = fs::read_to_string(&args.file)?;
    paint(&manager, &text, &args, &mut io::stdout().lock())?;

    if args.watch {
        watch(&manager, &args, settings.debounce())?;
    }
    Ok(())
}

/// Classify `text` and write it out with the host decorations
fn paint<W: Write>(manager: &SyntaxManager, text: &str, args: &Args, out: &mut W) -> Result<()> {
    let caret = args
        .line
        .map_or(0, |line| TextIndex::new(text).offset(line.max(1), 0));

    let mut painter = Painter::new(text);
    painter.set_line_numbers(args.line_numbers);
    manager.repaint(text, &mut painter);

    if args.line.is_some() {
        painter.set_active_line(Some(active_line(text, caret)));
    }
    if let Some(needle) = &args.find {
        let found = find_next(text, needle, caret);
        if found.is_none() {
            info!(needle = %needle, "no match");
        }
        painter.set_search(found);
    }

    painter.render(out, manager.theme())
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Repaint after the file stops changing for one debounce window
fn watch(manager: &SyntaxManager, args: &Args, window: Duration) -> Result<()> {
    let mut scheduler = HighlightScheduler::new(window);
    let mut last_modified = modified(&args.file);

    loop {
        let now = Instant::now();
        let current = modified(&args.file);
        if current != last_modified {
            last_modified = current;
            scheduler.notify_edit(now);
        }

        let repainted = scheduler.run_due(now, || -> Result<()> {
            match fs::read_to_string(&args.file) {
                Ok(text) => {
                    let mut out = io::stdout().lock();
                    clear_screen(&mut out)?;
                    paint(manager, &text, args, &mut out)?;
                }
                Err(e) => warn!(file = %args.file.display(), error = %e, "could not reread file"),
            }
            Ok(())
        });
        if let Some(result) = repainted {
            result?;
        }

        let nap = scheduler
            .time_until_due(now)
            .map_or(WATCH_INTERVAL, |due| due.min(WATCH_INTERVAL));
        thread::sleep(nap.max(Duration::from_millis(1)));
    }
}
