//! Per-account game libraries (purchase records).

mod repository;
mod service;
mod types;

pub use repository::LibraryRepository;
pub use service::{LibraryError, LibraryResult, LibraryService};
pub use types::{LibraryEntry, LibraryItem};
