//! Service layer for providers (`convenio`) and their specialties (`especialidade`).
//! - Business-rule violations are collected in a per-operation [`notification::Notifier`].
//! - Lookup failures and infrastructure failures travel as [`errors::ServiceError`].
//! - Specialty images are persisted through [`storage::image_store::ImageStore`].

pub mod errors;
pub mod notification;
pub mod storage;
pub mod convenio;
pub mod especialidade;
#[cfg(test)]
pub mod test_support;
