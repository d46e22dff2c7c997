//! Repositories for database operations
//!
//! Reads and updates of events and photos go through the `live_events` and
//! `live_photos` views, so soft-deleted rows never surface. Inserts target
//! the base tables. Every method that compares against the clock takes `now`
//! from the caller.

pub mod archive;
pub mod event;
pub mod photo;
pub mod session;

pub use archive::ArchiveRepository;
pub use event::EventRepository;
pub use photo::PhotoRepository;
pub use session::SessionRepository;
