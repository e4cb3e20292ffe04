mod app;
mod event;
mod ui;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use patternlock::config::Config;
use patternlock::store::json_store::JsonStore;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::lock_grid::LockGrid;
use ui::components::status_bar::{Footer, Header};
use ui::layout::AppLayout;

/// Roughly one frame at 60 Hz.
const TICK_RATE: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "patternlock", version, about = "Draw and verify 3x3 unlock patterns in the terminal")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Fraction of each cell that reacts to the pointer (0.05-1.0)")]
    hit_factor: Option<f32>,

    #[arg(short, long, help = "Hide the path and dot animations")]
    stealth: bool,

    #[arg(long, help = "Disable the terminal bell on each selected dot")]
    no_haptics: bool,

    #[arg(short, long, help = "Config file to use instead of the default")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Write logs to FILE (filter with PATTERNLOCK_LOG)")]
    log: Option<PathBuf>,

    #[arg(long, help = "Start by replaying a random pattern")]
    demo: bool,

    #[arg(long, help = "Draw by moving the mouse without holding a button")]
    hover: bool,

    #[arg(long, help = "Forget the enrolled pattern and saved state before starting")]
    reset: bool,

    #[arg(long, help = "Write the effective settings to the config file and exit")]
    write_config: bool,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let filter = EnvFilter::try_from_env("PATTERNLOCK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("patternlock=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if let Some(factor) = cli.hit_factor {
        config.hit_factor = factor;
    }
    config.validate();
    config.normalize_theme(&ui::theme::Theme::available_themes());
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let config = load_config(&cli)?;
    if cli.write_config {
        let path = cli.config.clone().unwrap_or_else(Config::config_path);
        if cli.config.is_some() {
            config.save_to(&path)?;
        } else {
            config.save()?;
        }
        println!("Wrote {}", path.display());
        return Ok(());
    }
    if cli.reset {
        JsonStore::new()?.clear()?;
        info!("cleared saved lock state");
    }
    info!(theme = %config.theme, hit_factor = config.hit_factor, "starting");

    let mut app = App::new(config);
    if cli.stealth {
        app.session.set_stealth_mode(true);
    }
    if cli.no_haptics {
        app.session.set_haptic_feedback_enabled(false);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // The grid needs a size before a replay can place its cursor.
    let size = terminal.size()?;
    app.update_surface(ratatui::layout::Rect::new(0, 0, size.width, size.height));
    if cli.demo {
        app.start_demo();
    }

    let events = EventHandler::new(TICK_RATE, cli.hover);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        if app.session.take_dirty().is_some() {
            terminal.draw(|frame| render(frame, app))?;
        }

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::PointerDown(column, row) => app.pointer_down(column, row),
            AppEvent::PointerDrag(positions) => app.pointer_drag(&positions),
            AppEvent::PointerUp(column, row) => app.pointer_up(column, row),
            AppEvent::Hover(column, row) => app.hover(column, row),
            AppEvent::Tick => app.tick(),
            AppEvent::Resize(_, _) => app.session.invalidate(),
        }

        if app.host.take_bells() > 0 {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07")?;
            backend.flush()?;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => {
            if app.session.is_in_progress() {
                app.cancel_gesture();
            } else if app.screen == AppScreen::Replay {
                app.leave_replay();
            } else {
                app.quit();
            }
        }
        KeyCode::Char('s') => app.toggle_stealth(),
        KeyCode::Char('i') => app.toggle_input(),
        KeyCode::Char('h') => app.toggle_haptics(),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('c') => app.clear(),
        KeyCode::Char('r') => app.rerecord(),
        KeyCode::Char('p') => {
            if app.screen == AppScreen::Replay {
                app.leave_replay();
            } else {
                app.start_replay();
            }
        }
        KeyCode::Char('d') => app.start_demo(),
        _ => {}
    }
    // Header flags and the status line live outside the session.
    app.session.invalidate();
}

fn render(frame: &mut ratatui::Frame, app: &mut App) {
    let area = frame.area();
    app.update_surface(area);

    let colors = &app.theme.colors;
    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    let buf = frame.buffer_mut();

    Header::new(app.screen.title(), app.flags(), app.session.pattern().len(), &app.theme)
        .render(layout.header, buf);

    let grid = app.frame();
    LockGrid::new(&grid, &app.theme, "Pattern")
        .focused(app.session.is_in_progress())
        .render(layout.main, buf);

    let hints: &[&str] = match app.screen {
        AppScreen::Replay => &["[p/Esc] Stop", "[d] Another", "[s] Stealth", "[t] Theme", "[q] Quit"],
        _ => &[
            "[Esc] Cancel",
            "[c] Clear",
            "[r] Re-record",
            "[p] Replay",
            "[s] Stealth",
            "[i] Input",
            "[h] Haptics",
            "[t] Theme",
            "[q] Quit",
        ],
    };
    Footer::new(&app.status, hints, &app.theme).render(layout.footer, buf);
}
