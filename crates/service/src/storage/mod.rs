//! Storage abstractions for the service layer
//!
//! Specialty images live on the filesystem, keyed by their generated name.

pub mod image_store;
