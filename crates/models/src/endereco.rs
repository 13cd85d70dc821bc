use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{convenio, errors::ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "endereco")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub convenio_id: Uuid,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Convenio }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Convenio => Entity::belongs_to(convenio::Entity)
                .from(Column::ConvenioId)
                .to(convenio::Column::Id)
                .into(),
        }
    }
}

impl Related<convenio::Entity> for Entity {
    fn to() -> RelationDef { Relation::Convenio.def() }
}

impl ActiveModelBehavior for ActiveModel {}

fn required(value: &str, field: &str, max: usize) -> Result<(), ModelError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ModelError::Validation(format!("address {field} is required")));
    }
    if len > max {
        return Err(ModelError::Validation(format!("address {field} must have at most {max} characters")));
    }
    Ok(())
}

pub fn validate_street(v: &str) -> Result<(), ModelError> { required(v, "street", 200) }
pub fn validate_number(v: &str) -> Result<(), ModelError> { required(v, "number", 50) }
pub fn validate_district(v: &str) -> Result<(), ModelError> { required(v, "district", 100) }
pub fn validate_city(v: &str) -> Result<(), ModelError> { required(v, "city", 100) }

pub fn validate_postal_code(v: &str) -> Result<(), ModelError> {
    if v.len() != 8 || !v.chars().all(|c| c.is_ascii_digit()) {
        return Err(ModelError::Validation("address postal code must have 8 digits".into()));
    }
    Ok(())
}

pub fn validate_state(v: &str) -> Result<(), ModelError> {
    if v.len() != 2 || !v.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ModelError::Validation("address state must be a 2-letter code".into()));
    }
    Ok(())
}
