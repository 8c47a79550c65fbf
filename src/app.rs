//! Application context.
//!
//! [`App`] owns every piece of mutable state: the activity timer, the
//! session queue, command history, the project name and the status line.
//! The run loop holds the only `App` and feeds it ticks, resumes and typed
//! commands one at a time.

use tracing::{info, warn};

use crate::command::{Command, CommandHistory, NumericArg};
use crate::config::AppConfig;
use crate::error::{Error, Result, ValidationError};
use crate::persistence::{Project, ProjectStore};
use crate::queue::SessionQueue;
use crate::timer::{ActivityTimer, ResumeToken, TickOutcome};

/// What the run loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub remaining_secs: u32,
}

pub struct App {
    pub timer: ActivityTimer,
    pub queue: SessionQueue,
    pub history: CommandHistory,
    pub project_name: String,
    /// Text being typed at the prompt.
    pub prompt: String,
    store: ProjectStore,
    message: Option<StatusMessage>,
    message_secs: u32,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            timer: ActivityTimer::new(config.default_session_time, config.default_break_time),
            queue: SessionQueue::new(),
            history: CommandHistory::new(),
            project_name: String::new(),
            prompt: String::new(),
            store: ProjectStore::new(config.project_dir()),
            message: None,
            message_secs: config.default_message_time.max(1),
        }
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    /// Shows `text` on the status line, restarting its countdown.
    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            remaining_secs: self.message_secs,
        });
    }

    pub fn project(&self) -> Project {
        Project {
            name: self.project_name.clone(),
            items: self.queue.items().to_vec(),
        }
    }

    /// One second has passed.
    pub fn on_tick(&mut self) -> TickOutcome {
        if let Some(msg) = self.message.as_mut() {
            msg.remaining_secs = msg.remaining_secs.saturating_sub(1);
            if msg.remaining_secs == 0 {
                self.message = None;
            }
        }
        self.timer.tick(&mut self.queue)
    }

    pub fn on_resume(&mut self, token: ResumeToken) -> bool {
        self.timer.resume(token, &mut self.queue)
    }

    /// Runs one typed line. Blank lines are ignored; everything else,
    /// recognised or not, goes into the history.
    pub fn execute(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        self.history.push(line);
        info!(command = line, "command");

        match Command::parse(line) {
            Command::Quit => return Flow::Quit,
            Command::Start => self.timer.start(&mut self.queue),
            Command::Stop => self.timer.stop(),
            Command::Session(minutes) => {
                let secs = self.checked_minutes(minutes);
                self.timer.set_session(secs);
            }
            Command::Break(minutes) => {
                let secs = self.checked_minutes(minutes);
                self.timer.set_break(secs);
            }
            Command::Reset => self.timer.reset(),
            Command::Add { name, repeats, minutes } => self.add(name, repeats, minutes),
            Command::Completed => {
                self.queue.toggle_show_completed();
            }
            Command::Project(name) => match name {
                Some(name) => {
                    self.project_name = name;
                    self.set_message(format!("Project set to '{}'", self.project_name));
                }
                None => self.report(ValidationError::EmptyProjectName),
            },
            Command::Save(path) => {
                if let Err(e) = self.save(path.as_deref()) {
                    self.report(e);
                }
            }
            Command::Load(path) => {
                if let Err(e) = self.load(path.as_deref()) {
                    self.report(e);
                }
            }
            Command::Unknown(raw) => self.set_message(format!("Unknown command: {raw}")),
        }
        Flow::Continue
    }

    fn checked_minutes(&mut self, minutes: NumericArg) -> Option<u32> {
        let secs = minutes.minutes_to_secs();
        if let Some(e) = secs.error() {
            self.report(e);
        }
        secs.value()
    }

    fn add(&mut self, name: Option<String>, repeats: NumericArg, minutes: NumericArg) {
        let Some(name) = name else {
            self.report(ValidationError::EmptyName);
            return;
        };
        let minutes = minutes.minutes_to_secs();
        let fallback = repeats.error().or_else(|| minutes.error());
        let repeats = repeats.or(1);
        let secs = minutes.or(self.timer.session_secs());

        let added = match self.queue.add(&name, repeats, secs) {
            Ok(item) => format!(
                "Added '{}' ({} x {} min)",
                item.name(),
                item.total_repeats(),
                item.secs_per_repeat() / 60
            ),
            Err(e) => return self.report(e),
        };
        match fallback {
            Some(e) => self.set_message(format!("{added}. {e}")),
            None => self.set_message(added),
        }
    }

    fn save(&mut self, path: Option<&str>) -> Result<()> {
        let path = self.store.resolve(path, &self.project_name)?;
        self.store.save(&path, &self.project())?;
        self.set_message(format!("Saved to {}", path.display()));
        Ok(())
    }

    /// Appends the stored queue to the current one and picks the next item.
    ///
    /// A freeform session that is running or paused takes on the promoted
    /// item's length, so the repeat it is credited with was actually timed.
    fn load(&mut self, path: Option<&str>) -> Result<()> {
        let path = self.store.resolve(path, &self.project_name)?;
        let project = self.store.load(&path)?;
        if !project.name.trim().is_empty() {
            self.project_name = project.name;
        }
        let was_freeform = self.queue.current().is_none();
        let added = self.queue.extend(project.items);
        let promoted = self.queue.advance_to_next().map(|i| i.secs_per_repeat());
        if let (true, Some(secs)) = (was_freeform, promoted) {
            self.timer.bind_item(secs);
        }
        self.set_message(format!("Loaded {added} sessions from {}", path.display()));
        Ok(())
    }

    fn report(&mut self, err: impl Into<Error>) {
        let err = err.into();
        warn!(error = %err, "command failed");
        self.set_message(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ItemStatus;
    use crate::timer::{Activity, TimerStatus};

    fn app() -> App {
        App::new(&AppConfig {
            default_message_time: 3,
            ..AppConfig::default()
        })
    }

    #[test]
    fn blank_lines_are_not_recorded() {
        let mut app = app();
        assert_eq!(app.execute("   "), Flow::Continue);
        assert!(app.history.is_empty());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app();
        assert_eq!(app.execute("QUIT"), Flow::Quit);
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn add_uses_defaults_for_missing_args() {
        let mut app = app();
        app.execute("add reading");
        let item = &app.queue.items()[0];
        assert_eq!(item.total_repeats(), 1);
        assert_eq!(item.secs_per_repeat(), app.timer.session_secs());
        assert_eq!(item.status(), ItemStatus::Pending);
    }

    #[test]
    fn add_without_name_is_reported() {
        let mut app = app();
        app.execute("add");
        assert!(app.queue.is_empty());
        assert_eq!(app.message().unwrap().text, ValidationError::EmptyName.to_string());
    }

    #[test]
    fn add_with_bad_number_keeps_default_and_says_so() {
        let mut app = app();
        app.execute("add write lots 10");
        assert_eq!(app.queue.items()[0].total_repeats(), 1);
        assert_eq!(app.queue.items()[0].secs_per_repeat(), 600);
        assert!(app.message().unwrap().text.contains("Ignored invalid number 'lots'"));
    }

    #[test]
    fn session_with_bad_minutes_keeps_previous_length() {
        let mut app = app();
        app.execute("session 5");
        app.execute("session abc");
        assert_eq!(app.timer.session_secs(), 300);
        assert_eq!(app.timer.remaining_secs(), 300);
        assert_eq!(app.timer.status(), TimerStatus::Running);
        assert!(app.message().is_some());
    }

    #[test]
    fn break_command_switches_activity() {
        let mut app = app();
        app.execute("break 2");
        assert_eq!(app.timer.activity(), Activity::Break);
        assert_eq!(app.timer.break_secs(), 120);
    }

    #[test]
    fn project_requires_a_name() {
        let mut app = app();
        app.execute("project");
        assert!(app.project_name.is_empty());
        app.execute("project Thesis");
        assert_eq!(app.project_name, "Thesis");
    }

    #[test]
    fn completed_toggles_view_flag() {
        let mut app = app();
        app.execute("completed");
        assert!(app.queue.show_completed());
        app.execute("completed");
        assert!(!app.queue.show_completed());
    }

    #[test]
    fn message_expires_after_its_countdown() {
        let mut app = app();
        app.set_message("hello");
        app.on_tick();
        app.on_tick();
        assert!(app.message().is_some());
        app.on_tick();
        assert!(app.message().is_none());
    }

    #[test]
    fn new_message_restarts_countdown() {
        let mut app = app();
        app.set_message("one");
        app.on_tick();
        app.on_tick();
        app.set_message("two");
        app.on_tick();
        app.on_tick();
        assert_eq!(app.message().unwrap().text, "two");
    }
}
