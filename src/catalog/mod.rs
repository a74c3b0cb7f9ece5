//! Game catalog: browsing for everyone, maintenance for administrators.

mod repository;
mod service;
mod types;

pub use repository::GameRepository;
pub use service::{
    CatalogError, CatalogResult, CatalogService, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
pub use types::{Game, GameUpdate, NewGame};
