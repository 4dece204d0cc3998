//! `sable`: a terminal music player built around a shuffle/loop aware
//! playback queue.
//!
//! The library half holds the playback core (`transport`) and the pieces it
//! talks to; `runtime` wires them into the terminal front end.

pub mod app;
pub mod config;
pub mod edit;
pub mod engine;
pub mod library;
pub mod notify;
pub mod runtime;
pub mod scrobble;
pub mod secrets;
pub mod transport;
pub mod ui;
