//! Event bus.
//!
//! Every producer (terminal input, render pacing, the one-second ticker and
//! deferred resumes) sends an [`AppEvent`] over one unbounded channel. The
//! run loop is the only receiver and the only code that touches application
//! state, so ticks and commands never interleave.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::timer::ResumeToken;

pub const RENDER_RATE: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum AppEvent {
    /// Key press (release and repeat events are filtered out).
    Key(KeyEvent),
    Resize(u16, u16),
    /// One second of wall time has passed.
    Tick,
    /// Time to redraw.
    Render,
    /// The grace delay after an interval has elapsed.
    Resume(ResumeToken),
}

pub type EventSender = mpsc::UnboundedSender<AppEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Spawns the task forwarding terminal input and render pacing.
///
/// Exits once the receiving side is gone.
pub fn spawn_input_task(tx: EventSender) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut render_interval = interval(RENDER_RATE);
        let mut reader = EventStream::new();

        loop {
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(_)) => Ok(()),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input error");
                        Ok(())
                    }
                    None => break,
                },
            };
            if sent.is_err() {
                break;
            }
        }
    })
}
