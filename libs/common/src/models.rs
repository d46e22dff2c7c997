//! Domain models stored in PostgreSQL

pub mod archive;
pub mod event;
pub mod photo;
pub mod session;

pub use archive::{Archive, ArchiveStatus};
pub use event::{Event, EventStatus, EventUpdate, NewEvent};
pub use photo::{FileSpec, NewPhoto, Photo};
pub use session::Session;
