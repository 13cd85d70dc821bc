//! Specialty (`especialidade`) module: commands, repository seam, image
//! upload workflow and service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod upload;
pub mod service;

pub use service::EspecialidadeService;
