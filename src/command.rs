//! Runtime command language typed at the prompt.
//!
//! A line is split on whitespace into a verb and up to three arguments. The
//! verb is matched case-insensitively; arguments keep their case so session
//! names and file paths come through as typed.

use chrono::{DateTime, Local};

use crate::error::ValidationError;

/// A numeric argument that may be missing or unparseable.
///
/// Callers decide the fallback with [`or`](Self::or); [`error`](Self::error)
/// tells whether the given text was thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericArg {
    Absent,
    Value(u32),
    Invalid(String),
}

impl NumericArg {
    /// Accepts positive whole numbers only.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Absent,
            Some(s) => match s.parse::<u32>() {
                Ok(n) if n > 0 => Self::Value(n),
                _ => Self::Invalid(s.into()),
            },
        }
    }

    /// Minutes to seconds. Overflowing values count as invalid.
    pub fn minutes_to_secs(self) -> Self {
        match self {
            Self::Value(m) => match m.checked_mul(60) {
                Some(secs) => Self::Value(secs),
                None => Self::Invalid(m.to_string()),
            },
            other => other,
        }
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            Self::Value(n) => Some(*n),
            _ => None,
        }
    }

    pub fn or(&self, default: u32) -> u32 {
        self.value().unwrap_or(default)
    }

    /// The validation error to report when the argument was discarded.
    pub fn error(&self) -> Option<ValidationError> {
        match self {
            Self::Invalid(raw) => Some(ValidationError::InvalidNumber(raw.clone())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// Minutes, as typed.
    Session(NumericArg),
    Break(NumericArg),
    Reset,
    Add {
        name: Option<String>,
        repeats: NumericArg,
        minutes: NumericArg,
    },
    Completed,
    Project(Option<String>),
    Save(Option<String>),
    Load(Option<String>),
    Quit,
    Unknown(String),
}

/// Splits a line into `(verb, arg1, arg2, arg3)`. The verb is lowercased.
pub fn split_line(line: &str) -> (String, Option<&str>, Option<&str>, Option<&str>) {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    (verb, parts.next(), parts.next(), parts.next())
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let (verb, first, second, third) = split_line(line);
        let owned = |s: Option<&str>| s.map(str::to_owned);

        match verb.as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "session" => Self::Session(NumericArg::parse(first)),
            "break" => Self::Break(NumericArg::parse(first)),
            "reset" => Self::Reset,
            "add" => Self::Add {
                name: owned(first),
                repeats: NumericArg::parse(second),
                minutes: NumericArg::parse(third),
            },
            "completed" => Self::Completed,
            "project" => Self::Project(owned(first)),
            "save" => Self::Save(owned(first)),
            "load" => Self::Load(owned(first)),
            "quit" => Self::Quit,
            _ => Self::Unknown(line.trim().into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub line: String,
    pub at: DateTime<Local>,
}

/// Append-only log of typed lines with Up/Down recall.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: &str) {
        self.entries.push(HistoryEntry {
            line: line.into(),
            at: Local::now(),
        });
        self.cursor = None;
    }

    /// Forgets the recall position, e.g. after the user edits the prompt.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Steps back, wrapping from the oldest entry to the newest.
    pub fn recall_previous(&mut self) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        let idx = match self.cursor {
            None | Some(0) => last,
            Some(i) => i - 1,
        };
        self.cursor = Some(idx);
        Some(&self.entries[idx].line)
    }

    /// Steps forward, wrapping from the newest entry to the oldest.
    pub fn recall_next(&mut self) -> Option<&str> {
        let last = self.entries.len().checked_sub(1)?;
        let idx = match self.cursor {
            Some(i) if i < last => i + 1,
            _ => 0,
        };
        self.cursor = Some(idx);
        Some(&self.entries[idx].line)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_is_case_insensitive_but_args_keep_case() {
        assert_eq!(
            Command::parse("  ADD Write  2 10"),
            Command::Add {
                name: Some("Write".into()),
                repeats: NumericArg::Value(2),
                minutes: NumericArg::Value(10),
            }
        );
        assert_eq!(Command::parse("Load /tmp/My.json"), Command::Load(Some("/tmp/My.json".into())));
    }

    #[test]
    fn extra_words_are_ignored() {
        assert_eq!(split_line("add a 1 2 3 4").3, Some("2"));
        assert_eq!(Command::parse("start now please"), Command::Start);
    }

    #[test]
    fn unknown_and_empty_lines() {
        assert_eq!(Command::parse("xyz 1"), Command::Unknown("xyz 1".into()));
        assert_eq!(Command::parse("exit"), Command::Unknown("exit".into()));
        assert_eq!(Command::parse("   "), Command::Unknown(String::new()));
    }

    #[test]
    fn numeric_arg_falls_back_on_garbage() {
        let arg = NumericArg::parse(Some("ten"));
                assert_eq!(arg.or(25), 25);
        assert_eq!(arg.error(), Some(ValidationError::InvalidNumber("ten".into())));

        assert!(NumericArg::parse(Some("0")).error().is_some());
        assert!(NumericArg::parse(Some("-3")).error().is_some());
        assert!(NumericArg::parse(None).error().is_none());
        assert_eq!(NumericArg::parse(None).or(7), 7);
    }

    #[test]
    fn minutes_convert_and_overflow() {
        assert_eq!(NumericArg::Value(5).minutes_to_secs(), NumericArg::Value(300));
        assert!(NumericArg::Value(u32::MAX).minutes_to_secs().error().is_some());
        assert_eq!(NumericArg::Absent.minutes_to_secs(), NumericArg::Absent);
    }

    #[test]
    fn history_keeps_order_and_time() {
        let mut h = CommandHistory::new();
        h.push("start");
        h.push("xyz");
        let e = h.entries();
        assert_eq!(e[0].line, "start");
        assert_eq!(e[1].line, "xyz");
        assert!(e[0].at <= e[1].at);
    }

    #[test]
    fn history_recall_wraps_both_ways() {
        let mut h = CommandHistory::new();
        assert!(h.recall_previous().is_none());

        h.push("start");
        h.push("add a");
        h.push("stop");

        assert_eq!(h.recall_previous(), Some("stop"));
        assert_eq!(h.recall_previous(), Some("add a"));
        assert_eq!(h.recall_previous(), Some("start"));
        assert_eq!(h.recall_previous(), Some("stop"));
        assert_eq!(h.recall_next(), Some("start"));
        assert_eq!(h.recall_next(), Some("add a"));

        h.push("reset");
        assert_eq!(h.recall_previous(), Some("reset"));
        assert_eq!(h.len(), 4);
    }
}
