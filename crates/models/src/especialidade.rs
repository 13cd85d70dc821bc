use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{convenio, errors::ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "especialidade")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub convenio_id: Uuid,
    pub name: String,
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub value: f64,
    pub active: bool,
    /// Generated file name in the image directory; `None` until the first upload lands.
    pub image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let len = name.trim().chars().count();
    if !(2..=200).contains(&len) {
        return Err(ModelError::Validation("specialty name must have between 2 and 200 characters".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ModelError> {
    let len = description.trim().chars().count();
    if !(2..=1000).contains(&len) {
        return Err(ModelError::Validation("specialty description must have between 2 and 1000 characters".into()));
    }
    Ok(())
}

pub fn validate_value(value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::Validation("specialty value must be a non-negative number".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_must_be_non_negative_and_finite() {
        assert!(validate_value(0.0).is_ok());
        assert!(validate_value(150.0).is_ok());
        assert!(validate_value(-0.01).is_err());
        assert!(validate_value(f64::NAN).is_err());
    }

    #[test]
    fn description_bounds() {
        assert!(validate_description("x").is_err());
        assert!(validate_description("Consultas cardiologicas").is_ok());
    }
}
