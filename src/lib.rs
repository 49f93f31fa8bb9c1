pub mod app;
pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod helius;
pub mod listing;
pub mod normalize;
pub mod output;
pub mod pacing;
pub mod simplehash;
pub mod store;
pub mod uri;
