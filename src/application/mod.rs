//! Application services layer.

pub mod auth;
pub mod comments;
pub mod error;
pub mod maintenance;
pub mod purchases;
pub mod repos;
pub mod storefront;
