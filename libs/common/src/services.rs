//! Domain services
//!
//! Handlers call these and nothing else. Each service owns the repositories
//! it needs and, for photos, the object store client.

pub mod event;
pub mod photo;
pub mod session;

pub use event::EventService;
pub use photo::{
    BulkDownload, BulkUpload, PhotoDeletion, PhotoService, PhotoWithUrl, Requester, UploadTicket,
};
pub use session::SessionService;
