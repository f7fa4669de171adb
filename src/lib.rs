//! Core library for interwiki language-link graph analysis

pub mod cluster;
pub mod component;
pub mod config;
pub mod data;
pub mod error;
pub mod index;
pub mod layout;
pub mod memopt;
pub mod repo;

pub use component::{Component, PageKey, PageRecord};
pub use config::Config;
pub use error::AnalysisError;
pub use repo::Repository;
