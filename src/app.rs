//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model`. It only holds view state (selection,
//! follow mode, popups, toasts); tracks and playback live in the transport.

mod model;

pub use model::*;
