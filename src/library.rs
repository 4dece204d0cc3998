//! Local music library: track model, directory scanning and catalog queries.

mod display;
mod index;
mod model;
mod scan;

pub use display::display_from_fields;
pub use index::{Library, LibraryIndex};
pub use model::{Album, Track};
pub use scan::{COVER_FILE_NAME, scan};
