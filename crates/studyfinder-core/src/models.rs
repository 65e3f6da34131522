//! Domain models for StudyFinder.
//!
//! These are the core types shared across all crates.

pub mod group;
pub mod identity;
pub mod membership;
pub mod user;
