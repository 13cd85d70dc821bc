use models::especialidade;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image bytes as they arrive from the request layer.
#[derive(Debug, Clone)]
pub enum ImageUpload {
    /// Inline JSON payload; the base name comes from the record's `image` field.
    Base64(String),
    /// Multipart file part; the base name is the part's file name.
    File { file_name: String, bytes: Vec<u8> },
}

/// Internal command for creating or updating a specialty, whichever input
/// shape it came from.
#[derive(Debug, Clone)]
pub struct EspecialidadeCommand {
    pub id: Option<Uuid>,
    pub convenio_id: Uuid,
    pub name: String,
    pub description: String,
    pub value: f64,
    pub active: bool,
    /// Desired base name (create) or current name (update). Empty means none.
    pub image: Option<String>,
    pub upload: Option<ImageUpload>,
}

/// JSON body for specialty create/update with an inline base64 image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspecialidadeInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub convenio_id: Uuid,
    pub name: String,
    pub description: String,
    pub value: f64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub image: Option<String>,
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub image_upload: Option<String>,
}

impl EspecialidadeInput {
    pub fn into_command(self) -> EspecialidadeCommand {
        let upload = self
            .image_upload
            .filter(|s| !s.trim().is_empty())
            .map(ImageUpload::Base64);
        EspecialidadeCommand {
            id: self.id,
            convenio_id: self.convenio_id,
            name: self.name,
            description: self.description,
            value: self.value,
            active: self.active,
            image: self.image,
            upload,
        }
    }

    /// Multipart variant: the JSON part carries the fields, the file part the bytes.
    pub fn into_command_with_file(self, file_name: String, bytes: Vec<u8>) -> EspecialidadeCommand {
        let mut cmd = self.into_command();
        cmd.upload = Some(ImageUpload::File { file_name, bytes });
        cmd
    }
}

/// Specialty as listed, with the owning provider's name when known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspecialidadeView {
    #[serde(flatten)]
    pub especialidade: especialidade::Model,
    pub convenio_name: Option<String>,
}
