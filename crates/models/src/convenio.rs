use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{endereco, errors::ModelError, especialidade};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "convenio")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub document: String,
    pub email: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Endereco,
    Especialidade,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Endereco => Entity::has_one(endereco::Entity).into(),
            Relation::Especialidade => Entity::has_many(especialidade::Entity).into(),
        }
    }
}

impl Related<endereco::Entity> for Entity {
    fn to() -> RelationDef { Relation::Endereco.def() }
}

impl Related<especialidade::Entity> for Entity {
    fn to() -> RelationDef { Relation::Especialidade.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(ModelError::Validation("provider name must have between 2 and 100 characters".into()));
    }
    Ok(())
}

/// Individual (11 digits) or company (14 digits) registration number, digits only.
pub fn validate_document(document: &str) -> Result<(), ModelError> {
    if !document.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("provider document must contain digits only".into()));
    }
    if !matches!(document.len(), 11 | 14) {
        return Err(ModelError::Validation("provider document must have 11 or 14 digits".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ModelError::Validation("provider email is invalid".into())),
    }
}

pub fn validate_phone(phone: Option<&str>) -> Result<(), ModelError> {
    if let Some(p) = phone {
        if p.chars().count() > 20 {
            return Err(ModelError::Validation("provider phone must have at most 20 characters".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_accepts_both_lengths() {
        assert!(validate_document("12345678901").is_ok());
        assert!(validate_document("12345678000199").is_ok());
        assert!(validate_document("123").is_err());
        assert!(validate_document("1234567890a").is_err());
    }

    #[test]
    fn email_requires_domain() {
        assert!(validate_email("contato@clinica.com.br").is_ok());
        assert!(validate_email("contato@clinica").is_err());
        assert!(validate_email("@clinica.com").is_err());
    }

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("A").is_err());
        assert!(validate_name("Clinica Sao Lucas").is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }
}
