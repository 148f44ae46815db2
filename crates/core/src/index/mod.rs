//! In-memory index of publishable notes.
//!
//! The index is the single source of truth for link resolution. It lives for
//! the lifetime of the process: built once by a full sync, then updated entry by
//! entry as vault files change.

pub mod store;
pub mod types;

pub use store::NoteIndex;
pub use types::{Note, ShortTitleCollision};
