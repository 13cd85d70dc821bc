//! Provider (`convenio`) module: domain inputs, repository seam and service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::ConvenioService;
