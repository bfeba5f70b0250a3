//! Saved listings: a per-user heart toggle and the favorites page.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Favorite, FavoriteState};
pub use repository::FavoriteRepository;
pub use router::favorites_router;
pub use service::FavoritesService;
