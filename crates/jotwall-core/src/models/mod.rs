//! Data models for Jotwall

mod color;
mod note;

pub use color::NoteColor;
pub use note::{format_relative_time, Note, NoteDraft, NoteId};
