use chrono::Utc;
use models::{convenio, endereco, especialidade};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider payload for create and update. `id` is required on update and
/// must match the id in the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvenioInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub document: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub endereco: Option<EnderecoInput>,
}

/// Address payload, nested in a provider on create or sent alone on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnderecoInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub convenio_id: Option<Uuid>,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: Option<String>,
    pub district: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
}

/// Provider with everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvenioDetail {
    #[serde(flatten)]
    pub convenio: convenio::Model,
    pub endereco: Option<endereco::Model>,
    #[serde(default)]
    pub especialidades: Vec<especialidade::Model>,
}

impl ConvenioInput {
    pub(crate) fn into_new_model(self) -> (convenio::Model, Option<EnderecoInput>) {
        let now = Utc::now().into();
        let model = convenio::Model {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.trim().to_string(),
            document: self.document,
            email: self.email.trim().to_string(),
            phone: self.phone,
            active: self.active,
            created_at: now,
            updated_at: now,
        };
        (model, self.endereco)
    }

    /// Overwrite every mutable field of `current`.
    pub(crate) fn apply_to(self, current: &mut convenio::Model) {
        current.name = self.name.trim().to_string();
        current.document = self.document;
        current.email = self.email.trim().to_string();
        current.phone = self.phone;
        current.active = self.active;
        current.updated_at = Utc::now().into();
    }
}

impl EnderecoInput {
    pub(crate) fn into_new_model(self, convenio_id: Uuid) -> endereco::Model {
        endereco::Model {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            convenio_id,
            street: self.street,
            number: self.number,
            complement: self.complement,
            district: self.district,
            postal_code: self.postal_code,
            city: self.city,
            state: self.state.to_ascii_uppercase(),
        }
    }

    pub(crate) fn apply_to(self, current: &mut endereco::Model) {
        current.street = self.street;
        current.number = self.number;
        current.complement = self.complement;
        current.district = self.district;
        current.postal_code = self.postal_code;
        current.city = self.city;
        current.state = self.state.to_ascii_uppercase();
    }
}
