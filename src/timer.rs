//! Activity state machine.
//!
//! Owns the live countdown: which activity is timed, how many seconds are
//! left and whether the clock is running. The caller feeds it one
//! [`tick`](ActivityTimer::tick) per second.
//!
//! ## End of an interval
//!
//! ```text
//! Running --tick at 0--> Finished --(grace delay)--> resume(token) --> Running
//! ```
//!
//! When the countdown runs out the timer flips the activity and hands back a
//! [`ResumeToken`]. Nothing restarts until that token is passed to
//! [`resume`](ActivityTimer::resume). Any user action that changes the run
//! state bumps the epoch, so a token issued before that action is stale and
//! its resume is ignored.

use tracing::{debug, info};

use crate::queue::SessionQueue;

pub const DEFAULT_SESSION_SECS: u32 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Session,
    Break,
}

impl Activity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Session => "SESSION",
            Self::Break => "BREAK",
        }
    }

    fn flipped(self) -> Self {
        match self {
            Self::Session => Self::Break,
            Self::Break => Self::Session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    Paused,
    Finished,
}

/// Permission to resume after the grace delay, valid for one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeToken {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing happened.
    Idle,
    /// One second was taken off the clock.
    Counted,
    /// The countdown ran out. `finished` is the activity that just ended.
    IntervalEnded {
        finished: Activity,
        resume: ResumeToken,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityTimer {
    activity: Activity,
    remaining_secs: u32,
    status: TimerStatus,
    session_secs: u32,
    break_secs: u32,
    epoch: u64,
    pending_resume: bool,
}

impl ActivityTimer {
    /// Creates a finished timer holding a full session.
    ///
    /// Zero durations fall back to the built-in defaults.
    pub fn new(session_secs: u32, break_secs: u32) -> Self {
        let session_secs = if session_secs > 0 { session_secs } else { DEFAULT_SESSION_SECS };
        let break_secs = if break_secs > 0 { break_secs } else { DEFAULT_BREAK_SECS };
        Self {
            activity: Activity::Session,
            remaining_secs: session_secs,
            status: TimerStatus::Finished,
            session_secs,
            break_secs,
            epoch: 0,
            pending_resume: false,
        }
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn session_secs(&self) -> u32 {
        self.session_secs
    }

    pub fn break_secs(&self) -> u32 {
        self.break_secs
    }

    pub fn is_resume_pending(&self) -> bool {
        self.pending_resume
    }

    /// Configured length of the current activity kind.
    pub fn activity_duration(&self) -> u32 {
        match self.activity {
            Activity::Session => self.session_secs,
            Activity::Break => self.break_secs,
        }
    }

    /// Advances the clock by one second.
    pub fn tick(&mut self, queue: &mut SessionQueue) -> TickOutcome {
        if self.status != TimerStatus::Running {
            return TickOutcome::Idle;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            return TickOutcome::Counted;
        }

        let finished = self.activity;
        self.status = TimerStatus::Finished;
        self.remaining_secs = 0;

        if finished == Activity::Session {
            queue.record_repeat_completion();
        }
        self.activity = finished.flipped();

        self.epoch += 1;
        self.pending_resume = true;
        info!(finished = finished.name(), next = self.activity.name(), "interval ended");

        TickOutcome::IntervalEnded {
            finished,
            resume: ResumeToken { epoch: self.epoch },
        }
    }

    /// Applies the deferred continuation of an ended interval.
    ///
    /// Returns `false` and changes nothing when the token is stale.
    pub fn resume(&mut self, token: ResumeToken, queue: &mut SessionQueue) -> bool {
        if !self.pending_resume || token.epoch != self.epoch || self.status != TimerStatus::Finished {
            debug!(token = token.epoch, epoch = self.epoch, "dropping stale resume");
            return false;
        }
        self.pending_resume = false;

        self.remaining_secs = self.activity_duration();
        if self.activity == Activity::Session {
            if let Some(item) = queue.advance_to_next() {
                self.remaining_secs = item.secs_per_repeat();
            }
        }
        self.status = TimerStatus::Running;
        info!(activity = self.activity.name(), secs = self.remaining_secs, "resumed");
        true
    }

    pub fn start(&mut self, queue: &mut SessionQueue) {
        self.cancel_pending();
        if self.status == TimerStatus::Finished {
            let next = queue.advance_to_next().map(|i| i.secs_per_repeat());
            match (self.activity, next) {
                (Activity::Session, Some(secs)) => self.remaining_secs = secs,
                _ if self.remaining_secs == 0 => self.remaining_secs = self.activity_duration(),
                _ => {}
            }
        }
        self.status = TimerStatus::Running;
    }

    /// Puts a newly promoted queue item's length on a live session clock.
    ///
    /// Only a running or paused session is touched; a finished timer picks
    /// the item up on the next `start` or resume.
    pub fn bind_item(&mut self, secs_per_repeat: u32) -> bool {
        if self.activity != Activity::Session || self.status == TimerStatus::Finished {
            return false;
        }
        self.remaining_secs = secs_per_repeat;
        debug!(secs = secs_per_repeat, "bound session to queue item");
        true
    }

    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
        }
    }

    /// Switches to a session and starts it. A positive `secs` also becomes
    /// the new default session length.
    pub fn set_session(&mut self, secs: Option<u32>) {
        self.cancel_pending();
        if let Some(secs) = secs.filter(|s| *s > 0) {
            self.session_secs = secs;
        }
        self.activity = Activity::Session;
        self.remaining_secs = self.session_secs;
        self.status = TimerStatus::Running;
    }

    pub fn set_break(&mut self, secs: Option<u32>) {
        self.cancel_pending();
        if let Some(secs) = secs.filter(|s| *s > 0) {
            self.break_secs = secs;
        }
        self.activity = Activity::Break;
        self.remaining_secs = self.break_secs;
        self.status = TimerStatus::Running;
    }

    /// Pauses and puts the full duration of the current activity back.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.status = TimerStatus::Paused;
        self.remaining_secs = self.activity_duration();
    }

    fn cancel_pending(&mut self) {
        if self.pending_resume {
            debug!(epoch = self.epoch, "cancelling pending resume");
        }
        self.pending_resume = false;
        self.epoch += 1;
    }
}

impl Default for ActivityTimer {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_SECS, DEFAULT_BREAK_SECS)
    }
}
