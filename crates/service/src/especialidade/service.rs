use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use common::metrics::{ORPHANS_REMOVED_TOTAL, VALIDATION_FAILURES_TOTAL};
use models::especialidade;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{EspecialidadeCommand, EspecialidadeView};
use super::repository::EspecialidadeRepository;
use super::upload::{self, IMAGE_REQUIRED};
use crate::convenio::repository::ConvenioRepository;
use crate::errors::ServiceError;
use crate::notification::{Notifier, ID_MISMATCH};
use crate::storage::image_store::ImageStore;

pub const CONVENIO_MISSING: &str = "the informed provider does not exist";

/// Specialty workflow: field validation, image upload and persistence.
pub struct EspecialidadeService {
    repo: Arc<dyn EspecialidadeRepository>,
    convenios: Arc<dyn ConvenioRepository>,
    images: Arc<dyn ImageStore>,
}

impl EspecialidadeService {
    pub fn new(
        repo: Arc<dyn EspecialidadeRepository>,
        convenios: Arc<dyn ConvenioRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self { repo, convenios, images }
    }

    pub async fn list(&self) -> Result<Vec<EspecialidadeView>, ServiceError> {
        self.repo.list().await
    }

    pub async fn list_by_convenio(&self, convenio_id: Uuid) -> Result<Vec<especialidade::Model>, ServiceError> {
        self.repo.list_by_convenio(convenio_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<especialidade::Model, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("especialidade"))
    }

    /// Create a specialty. An image is mandatory.
    ///
    /// The image is written before the row; if persisting the row then fails
    /// the file stays behind and is left for [`Self::sweep_orphan_images`].
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::convenio::repository::mock::MockConvenioRepository;
    /// use service::especialidade::{domain::EspecialidadeCommand, repository::mock::MockEspecialidadeRepository, EspecialidadeService};
    /// use service::notification::Notifier;
    /// use service::storage::image_store::FsImageStore;
    /// let store = FsImageStore::new(std::env::temp_dir());
    /// let svc = EspecialidadeService::new(Arc::new(MockEspecialidadeRepository::default()), Arc::new(MockConvenioRepository::default()), Arc::new(store));
    /// let cmd = EspecialidadeCommand { id: None, convenio_id: uuid::Uuid::new_v4(), name: "Cardiology".into(), description: "Heart".into(), value: 150.0, active: false, image: Some("x".into()), upload: None };
    /// let mut notifier = Notifier::new();
    /// let created = tokio_test::block_on(svc.create(cmd, &mut notifier)).unwrap();
    /// assert!(created.is_none());
    /// assert!(notifier.has_notifications());
    /// ```
    #[instrument(skip(self, cmd, notifier), fields(convenio_id = %cmd.convenio_id, name = %cmd.name))]
    pub async fn create(&self, mut cmd: EspecialidadeCommand, notifier: &mut Notifier) -> Result<Option<especialidade::Model>, ServiceError> {
        self.validate(&cmd, notifier).await?;

        let staged = match cmd.upload.take() {
            Some(upload) => upload::stage(upload, cmd.image.as_deref(), notifier),
            None => {
                notifier.record(IMAGE_REQUIRED);
                None
            }
        };
        let staged = match staged {
            Some(s) if !notifier.has_notifications() => s,
            _ => return Ok(reject("especialidade.create")),
        };
        let Some(image) = upload::persist(self.images.as_ref(), staged, notifier).await? else {
            return Ok(reject("especialidade.create"));
        };

        let now = Utc::now().into();
        let model = especialidade::Model {
            id: cmd.id.unwrap_or_else(Uuid::new_v4),
            convenio_id: cmd.convenio_id,
            name: cmd.name.trim().to_string(),
            description: cmd.description.trim().to_string(),
            value: cmd.value,
            active: cmd.active,
            image: Some(image.clone()),
            created_at: now,
            updated_at: now,
        };
        match self.repo.create(model).await {
            Ok(created) => {
                info!(especialidade_id = %created.id, image = %image, "especialidade_created");
                Ok(Some(created))
            }
            Err(e) => {
                warn!(image = %image, error = %e, "specialty not persisted; image file orphaned");
                Err(e)
            }
        }
    }

    /// Update a specialty.
    ///
    /// Every scalar field is overwritten. The image is the exception: it only
    /// changes when a new upload arrives, otherwise the stored name is kept.
    /// Replaced image files are not deleted.
    #[instrument(skip(self, cmd, notifier))]
    pub async fn update(&self, id: Uuid, mut cmd: EspecialidadeCommand, notifier: &mut Notifier) -> Result<Option<especialidade::Model>, ServiceError> {
        if cmd.id != Some(id) {
            notifier.record(ID_MISMATCH);
            return Ok(reject("especialidade.update"));
        }
        let mut current = self.get(id).await?;

        let base_name = cmd
            .image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(current.image.as_deref())
            .map(str::to_string);

        self.validate(&cmd, notifier).await?;
        let staged = cmd.upload.take().and_then(|u| upload::stage(u, base_name.as_deref(), notifier));
        if notifier.has_notifications() {
            return Ok(reject("especialidade.update"));
        }

        if let Some(staged) = staged {
            let Some(image) = upload::persist(self.images.as_ref(), staged, notifier).await? else {
                return Ok(reject("especialidade.update"));
            };
            if let Some(old) = current.image.replace(image) {
                info!(especialidade_id = %id, old_image = %old, "image replaced; old file kept");
            }
        }

        current.convenio_id = cmd.convenio_id;
        current.name = cmd.name.trim().to_string();
        current.description = cmd.description.trim().to_string();
        current.value = cmd.value;
        current.active = cmd.active;
        current.updated_at = Utc::now().into();

        let updated = self.repo.update(current).await?;
        info!(especialidade_id = %updated.id, "especialidade_updated");
        Ok(Some(updated))
    }

    /// Delete by id. The image file stays on disk.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<especialidade::Model, ServiceError> {
        let current = self.get(id).await?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("especialidade"));
        }
        info!(especialidade_id = %id, "especialidade_deleted");
        Ok(current)
    }

    /// Remove image files no specialty references. Returns the removed names.
    ///
    /// Must not run while creates are in flight: a file written just before
    /// its row is inserted looks unreferenced.
    #[instrument(skip(self))]
    pub async fn sweep_orphan_images(&self) -> Result<Vec<String>, ServiceError> {
        let referenced: HashSet<String> = self.repo.image_names().await?.into_iter().collect();
        let mut removed = Vec::new();
        for name in self.images.list().await? {
            if referenced.contains(&name) {
                continue;
            }
            if self.images.remove(&name).await? {
                ORPHANS_REMOVED_TOTAL.inc();
                removed.push(name);
            }
        }
        info!(removed = removed.len(), "orphan_sweep_finished");
        Ok(removed)
    }

    async fn validate(&self, cmd: &EspecialidadeCommand, notifier: &mut Notifier) -> Result<(), ServiceError> {
        notifier.check(especialidade::validate_name(&cmd.name))?;
        notifier.check(especialidade::validate_description(&cmd.description))?;
        notifier.check(especialidade::validate_value(cmd.value))?;
        if self.convenios.get(cmd.convenio_id).await?.is_none() {
            notifier.record(CONVENIO_MISSING);
        }
        Ok(())
    }
}

fn reject<T>(operation: &str) -> Option<T> {
    VALIDATION_FAILURES_TOTAL.with_label_values(&[operation]).inc();
    warn!(operation, "operation rejected by validation");
    None
}
