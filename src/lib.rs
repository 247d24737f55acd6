//! Storefront: a small shop whose pages are served from a precomputed, denormalized cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
