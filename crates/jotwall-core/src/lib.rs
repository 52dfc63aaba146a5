//! jotwall-core - Core library for Jotwall
//!
//! Models, the Supabase-backed note store, masonry column layout and the
//! compose/delete lifecycle shared by every Jotwall client.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod layout;
pub mod lifecycle;
pub mod models;
pub mod session;
pub mod store;
pub mod util;

pub use error::{Error, Result};
pub use lifecycle::{LifecycleState, NoteLifecycle, SaveOutcome};
pub use models::{Note, NoteColor, NoteDraft, NoteId};
pub use session::SessionHub;
pub use store::NoteStore;
