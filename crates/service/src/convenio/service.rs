use std::sync::Arc;

use common::metrics::VALIDATION_FAILURES_TOTAL;
use models::{convenio, endereco};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{ConvenioDetail, ConvenioInput, EnderecoInput};
use super::repository::ConvenioRepository;
use crate::errors::ServiceError;
use crate::especialidade::repository::EspecialidadeRepository;
use crate::notification::{Notifier, ID_MISMATCH};

pub const DUPLICATE_DOCUMENT: &str = "a provider with this document already exists";
pub const HAS_ESPECIALIDADES: &str = "the provider still has specialties and cannot be removed";
pub const ENDERECO_OWNER_MISMATCH: &str = "the address belongs to another provider";

/// Provider CRUD orchestration. No file I/O happens here.
pub struct ConvenioService {
    repo: Arc<dyn ConvenioRepository>,
    especialidades: Arc<dyn EspecialidadeRepository>,
}

impl ConvenioService {
    pub fn new(repo: Arc<dyn ConvenioRepository>, especialidades: Arc<dyn EspecialidadeRepository>) -> Self {
        Self { repo, especialidades }
    }

    pub async fn list(&self) -> Result<Vec<convenio::Model>, ServiceError> {
        self.repo.list().await
    }

    /// Provider with its address and specialties.
    #[instrument(skip(self))]
    pub async fn get_detail(&self, id: Uuid) -> Result<ConvenioDetail, ServiceError> {
        let (convenio, endereco) = self
            .repo
            .get_with_endereco(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("convenio"))?;
        let especialidades = self.especialidades.list_by_convenio(id).await?;
        Ok(ConvenioDetail { convenio, endereco, especialidades })
    }

    /// Create a provider together with its optional address.
    ///
    /// Returns `Ok(None)` when the input was rejected; the reasons are on `notifier`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::convenio::{domain::ConvenioInput, repository::mock::MockConvenioRepository, ConvenioService};
    /// use service::especialidade::repository::mock::MockEspecialidadeRepository;
    /// use service::notification::Notifier;
    /// let svc = ConvenioService::new(Arc::new(MockConvenioRepository::default()), Arc::new(MockEspecialidadeRepository::default()));
    /// let input = ConvenioInput { id: None, name: "Clinica Sul".into(), document: "12345678000199".into(), email: "sul@clinica.com".into(), phone: None, active: true, endereco: None };
    /// let mut notifier = Notifier::new();
    /// let created = tokio_test::block_on(svc.create(input, &mut notifier)).unwrap();
    /// assert!(created.is_some());
    /// assert!(!notifier.has_notifications());
    /// ```
    #[instrument(skip(self, input, notifier), fields(document = %input.document))]
    pub async fn create(&self, input: ConvenioInput, notifier: &mut Notifier) -> Result<Option<ConvenioDetail>, ServiceError> {
        validate_convenio(&input, notifier)?;
        if let Some(e) = &input.endereco {
            validate_endereco(e, notifier)?;
        }
        if notifier.has_notifications() {
            return Ok(reject("convenio.create"));
        }
        if self.repo.find_by_document(&input.document).await?.is_some() {
            notifier.record(DUPLICATE_DOCUMENT);
            return Ok(reject("convenio.create"));
        }

        let (model, endereco) = input.into_new_model();
        let endereco = endereco.map(|e| e.into_new_model(model.id));
        let created = self.repo.create(model, endereco.clone()).await?;
        info!(convenio_id = %created.id, "convenio_created");
        Ok(Some(ConvenioDetail { convenio: created, endereco, especialidades: Vec::new() }))
    }

    /// Full replacement of the provider's mutable fields. The address is
    /// updated through [`ConvenioService::update_endereco`].
    #[instrument(skip(self, input, notifier))]
    pub async fn update(&self, id: Uuid, input: ConvenioInput, notifier: &mut Notifier) -> Result<Option<convenio::Model>, ServiceError> {
        if input.id != Some(id) {
            notifier.record(ID_MISMATCH);
            return Ok(reject("convenio.update"));
        }
        let mut current = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("convenio"))?;

        validate_convenio(&input, notifier)?;
        if notifier.has_notifications() {
            return Ok(reject("convenio.update"));
        }
        if let Some(other) = self.repo.find_by_document(&input.document).await? {
            if other.id != id {
                notifier.record(DUPLICATE_DOCUMENT);
                return Ok(reject("convenio.update"));
            }
        }

        input.apply_to(&mut current);
        let updated = self.repo.update(current).await?;
        info!(convenio_id = %updated.id, "convenio_updated");
        Ok(Some(updated))
    }

    /// Delete a provider and, by cascade, its address.
    ///
    /// Refused with a notification while specialties still reference it.
    #[instrument(skip(self, notifier))]
    pub async fn delete(&self, id: Uuid, notifier: &mut Notifier) -> Result<Option<ConvenioDetail>, ServiceError> {
        let (convenio, endereco) = self
            .repo
            .get_with_endereco(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("convenio"))?;

        let especialidades = self.especialidades.list_by_convenio(id).await?;
        if !especialidades.is_empty() {
            notifier.record(HAS_ESPECIALIDADES);
            return Ok(reject("convenio.delete"));
        }

        if !self.repo.delete(id).await? {
            // Removed between the load and the delete.
            return Err(ServiceError::not_found("convenio"));
        }
        info!(convenio_id = %id, "convenio_deleted");
        Ok(Some(ConvenioDetail { convenio, endereco, especialidades }))
    }

    pub async fn get_endereco(&self, id: Uuid) -> Result<endereco::Model, ServiceError> {
        self.repo.get_endereco(id).await?.ok_or_else(|| ServiceError::not_found("endereco"))
    }

    #[instrument(skip(self, input, notifier))]
    pub async fn update_endereco(&self, id: Uuid, input: EnderecoInput, notifier: &mut Notifier) -> Result<Option<endereco::Model>, ServiceError> {
        if input.id != Some(id) {
            notifier.record(ID_MISMATCH);
            return Ok(reject("endereco.update"));
        }
        let mut current = self.repo.get_endereco(id).await?.ok_or_else(|| ServiceError::not_found("endereco"))?;

        if input.convenio_id.is_some_and(|owner| owner != current.convenio_id) {
            notifier.record(ENDERECO_OWNER_MISMATCH);
        }
        validate_endereco(&input, notifier)?;
        if notifier.has_notifications() {
            return Ok(reject("endereco.update"));
        }

        input.apply_to(&mut current);
        let updated = self.repo.update_endereco(current).await?;
        info!(endereco_id = %updated.id, convenio_id = %updated.convenio_id, "endereco_updated");
        Ok(Some(updated))
    }
}

fn reject<T>(operation: &str) -> Option<T> {
    VALIDATION_FAILURES_TOTAL.with_label_values(&[operation]).inc();
    warn!(operation, "operation rejected by validation");
    None
}

fn validate_convenio(input: &ConvenioInput, notifier: &mut Notifier) -> Result<(), ServiceError> {
    notifier.check(convenio::validate_name(&input.name))?;
    notifier.check(convenio::validate_document(&input.document))?;
    notifier.check(convenio::validate_email(&input.email))?;
    notifier.check(convenio::validate_phone(input.phone.as_deref()))
}

fn validate_endereco(input: &EnderecoInput, notifier: &mut Notifier) -> Result<(), ServiceError> {
    notifier.check(endereco::validate_street(&input.street))?;
    notifier.check(endereco::validate_number(&input.number))?;
    notifier.check(endereco::validate_district(&input.district))?;
    notifier.check(endereco::validate_city(&input.city))?;
    notifier.check(endereco::validate_postal_code(&input.postal_code))?;
    notifier.check(endereco::validate_state(&input.state))
}
