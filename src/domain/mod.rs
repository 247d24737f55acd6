//! Domain layer types and invariants.

pub mod catalog;
pub mod clock;
pub mod entities;
pub mod error;
pub mod reset;
