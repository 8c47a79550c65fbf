//! pomocli: a terminal Pomodoro timer that works through a queue of named
//! sessions and keeps that queue in project files.

pub mod app;
pub mod cli;
pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod persistence;
pub mod queue;
pub mod timer;
