//! Turning an [`ImageUpload`] into a stored file under a generated name.

use base64::{engine::general_purpose, Engine};
use common::metrics::{IMAGES_STORED_TOTAL, IMAGE_COLLISIONS_TOTAL};
use tracing::{debug, info};
use uuid::Uuid;

use super::domain::ImageUpload;
use crate::errors::ServiceError;
use crate::notification::Notifier;
use crate::storage::image_store::{is_safe_name, ImageStore, StoreOutcome};

pub const IMAGE_REQUIRED: &str = "provide an image for this specialty";
pub const IMAGE_COLLISION: &str = "a file with this name already exists";
pub const IMAGE_NOT_BASE64: &str = "the image payload is not valid base64";
pub const IMAGE_EMPTY: &str = "the image payload is empty";
pub const IMAGE_BAD_NAME: &str = "the image name is empty or is not a plain file name";

/// Decoded bytes plus the name they will be stored under.
#[derive(Debug)]
pub struct StagedImage {
    pub name: String,
    bytes: Vec<u8>,
}

impl StagedImage {
    pub fn len(&self) -> usize { self.bytes.len() }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
}

/// `<uuid>_<base>`; the token is fresh on every call.
pub fn generate_name(base: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), base)
}

/// Decode the payload and pick its generated name.
///
/// Inline payloads take their base name from `base_name`; file parts use
/// their own file name. Every problem found is recorded and `None` returned.
pub fn stage(upload: ImageUpload, base_name: Option<&str>, notifier: &mut Notifier) -> Option<StagedImage> {
    let (base, bytes) = match upload {
        ImageUpload::Base64(payload) => {
            let base = base_name.map(str::trim).unwrap_or_default().to_string();
            match general_purpose::STANDARD.decode(payload.trim()) {
                Ok(bytes) => (base, Some(bytes)),
                Err(e) => {
                    debug!(error = %e, "image payload rejected");
                    notifier.record(IMAGE_NOT_BASE64);
                    (base, None)
                }
            }
        }
        ImageUpload::File { file_name, bytes } => (file_name.trim().to_string(), Some(bytes)),
    };

    let mut ok = true;
    if !is_safe_name(&base) {
        notifier.record(IMAGE_BAD_NAME);
        ok = false;
    }
    let bytes = match bytes {
        Some(b) if b.is_empty() => {
            notifier.record(IMAGE_EMPTY);
            None
        }
        other => other,
    };
    match bytes {
        Some(bytes) if ok => Some(StagedImage { name: generate_name(&base), bytes }),
        _ => None,
    }
}

/// Write the staged image without replacing anything already stored.
///
/// Returns the stored name, or `None` after recording a collision.
pub async fn persist(store: &dyn ImageStore, staged: StagedImage, notifier: &mut Notifier) -> Result<Option<String>, ServiceError> {
    match store.create_new(&staged.name, &staged.bytes).await? {
        StoreOutcome::Written => {
            IMAGES_STORED_TOTAL.inc();
            info!(image = %staged.name, bytes = staged.bytes.len(), "image_stored");
            Ok(Some(staged.name))
        }
        StoreOutcome::Collision => {
            IMAGE_COLLISIONS_TOTAL.inc();
            notifier.record(IMAGE_COLLISION);
            Ok(None)
        }
    }
}
