mod ui;

use clap::Parser;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use notify_rust::{Notification, Urgency};
use pomocli::{
    app::{App, Flow},
    cli::Args,
    clock::{self, DeferredResume, GRACE_DELAY, TICK_PERIOD},
    config::{self, AppConfig, CONFIG_FILE},
    event::{self, AppEvent},
    timer::{Activity, TickOutcome},
};
use ratatui::prelude::*;
use std::{fs, io, path::Path, process::Stdio, sync::Mutex};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
type Tui = Terminal<CrosstermBackend<io::Stdout>>;
const LOG_FILE: &str = "pomocli.log";
const LOG_ENV: &str = "POMOCLI_LOG";
const SOUND_DIR: &str = "/usr/share/sounds/freedesktop/stereo";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let durations = match args.durations() {
        Ok(d) => d,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let dir = config::config_dir();
    let dir_created = fs::create_dir_all(&dir);
    init_logging(&dir);
    if let Err(e) = dir_created {
        warn!(dir = %dir.display(), error = %e, "could not create config directory");
    }

    let mut config = AppConfig::load_or_create(&dir.join(CONFIG_FILE)).unwrap_or_else(|e| {
        warn!(error = %e, "could not read config, using defaults");
        AppConfig::default()
    });
    if let Some(s) = durations.session_secs {
        config.default_session_time = s;
    }
    if let Some(b) = durations.break_secs {
        config.default_break_time = b;
    }

    let mut app = App::new(&config);
    if durations.autostart {
        app.timer.start(&mut app.queue);
    }
    info!(
        session = config.default_session_time,
        break_secs = config.default_break_time,
        "starting"
    );

    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app, !args.no_sound).await;

    restore_terminal()?;
    terminal.show_cursor()?;
    info!("bye");

    res
}

async fn run(terminal: &mut Tui, app: &mut App, sound: bool) -> Result<()> {
    let (tx, mut rx) = event::channel();
    let input = event::spawn_input_task(tx.clone());
    let ticker = clock::spawn_ticker(tx.clone(), TICK_PERIOD);
    let mut deferred = DeferredResume::new();

    terminal.draw(|f| ui::render(f, app))?;

    while let Some(ev) = rx.recv().await {
        match ev {
            AppEvent::Render | AppEvent::Resize(..) => {
                terminal.draw(|f| ui::render(f, app))?;
            }
            AppEvent::Tick => {
                if let TickOutcome::IntervalEnded { finished, resume } = app.on_tick() {
                    announce(finished, sound);
                    deferred.schedule(tx.clone(), resume, GRACE_DELAY);
                }
            }
            AppEvent::Resume(token) => {
                app.on_resume(token);
            }
            AppEvent::Key(key) => {
                if handle_key(key, app) == Flow::Quit {
                    break;
                }
                if !app.timer.is_resume_pending() {
                    deferred.cancel();
                }
            }
        }
    }

    deferred.cancel();
    ticker.abort();
    input.abort();
    Ok(())
}

// ============================================================================
// Event Handlers
// ============================================================================

fn handle_key(key: KeyEvent, app: &mut App) -> Flow {
    if key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    {
        return Flow::Quit;
    }

    match key.code {
        KeyCode::Enter => {
            let line = std::mem::take(&mut app.prompt);
            return app.execute(&line);
        }
        KeyCode::Backspace => {
            app.prompt.pop();
            app.history.reset_cursor();
        }
        KeyCode::Up => match app.history.recall_previous() {
            Some(line) => app.prompt = line.to_owned(),
            None => app.set_message("No previous commands"),
        },
        KeyCode::Down => match app.history.recall_next() {
            Some(line) => app.prompt = line.to_owned(),
            None => app.set_message("No previous commands"),
        },
        KeyCode::Char(c) if is_prompt_char(key.modifiers, c) => {
            app.prompt.push(c);
            app.history.reset_cursor();
        }
        _ => {}
    }
    Flow::Continue
}

/// Plain printable characters only; Ctrl/Alt chords never reach the prompt.
fn is_prompt_char(modifiers: KeyModifiers, c: char) -> bool {
    !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) && !c.is_control()
}

// ============================================================================
// Utilities
// ============================================================================

fn init_logging(dir: &Path) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false);

    match fs::OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)) {
        Ok(file) => {
            let _ = builder.with_writer(Mutex::new(file)).try_init();
        }
        Err(_) => {
            let _ = builder.with_writer(io::sink).try_init();
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

fn announce(finished: Activity, sound: bool) {
    let (title, body, chime) = match finished {
        Activity::Session => (
            "Break Time! ☕",
            "Session complete. Take a short break.",
            "complete.oga",
        ),
        Activity::Break => (
            "Back to Work! 🎯",
            "Your next session starts in a moment.",
            "bell.oga",
        ),
    };

    if let Err(e) = Notification::new()
        .summary(title)
        .body(body)
        .appname("pomocli")
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show()
    {
        debug!(error = %e, "desktop notification failed");
    }

    if sound {
        play_chime(chime);
    }
}

fn play_chime(name: &str) {
    let path = Path::new(SOUND_DIR).join(name);
    if !path.exists() {
        debug!(path = %path.display(), "no chime installed");
        return;
    }
    // The child is reaped by the runtime; nothing waits on it.
    if let Err(e) = tokio::process::Command::new("paplay")
        .arg(&path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        debug!(error = %e, "could not play chime");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords_do_not_reach_the_prompt() {
        assert!(is_prompt_char(KeyModifiers::NONE, 'a'));
        assert!(is_prompt_char(KeyModifiers::SHIFT, 'A'));
        assert!(is_prompt_char(KeyModifiers::NONE, ' '));
        assert!(!is_prompt_char(KeyModifiers::CONTROL, 'a'));
        assert!(!is_prompt_char(KeyModifiers::ALT, 'x'));
        assert!(!is_prompt_char(KeyModifiers::NONE, '\u{7}'));
    }

    #[test]
    fn ctrl_a_leaves_prompt_alone() {
        let mut app = App::new(&AppConfig::default());
        app.prompt.push_str("sta");
        let flow = handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL), &mut app);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(app.prompt, "sta");

        handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE), &mut app);
        assert_eq!(app.prompt, "star");
    }

    #[test]
    fn esc_and_quit_end_the_loop() {
        let mut app = App::new(&AppConfig::default());
        assert_eq!(handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &mut app), Flow::Quit);

        app.prompt.push_str("quit");
        assert_eq!(handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut app), Flow::Quit);
        assert!(app.prompt.is_empty());
    }
}
