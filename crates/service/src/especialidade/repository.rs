use async_trait::async_trait;
use models::especialidade;
use uuid::Uuid;

use super::domain::EspecialidadeView;
use crate::errors::ServiceError;

/// Storage gateway for specialties.
#[async_trait]
pub trait EspecialidadeRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<EspecialidadeView>, ServiceError>;
    async fn list_by_convenio(&self, convenio_id: Uuid) -> Result<Vec<especialidade::Model>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<especialidade::Model>, ServiceError>;
    async fn create(&self, model: especialidade::Model) -> Result<especialidade::Model, ServiceError>;
    async fn update(&self, model: especialidade::Model) -> Result<especialidade::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    /// Every image name currently referenced by a specialty.
    async fn image_names(&self) -> Result<Vec<String>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockEspecialidadeRepository {
        rows: Mutex<HashMap<Uuid, especialidade::Model>>,
        writes: AtomicU32,
        fail_writes: AtomicBool,
    }

    impl MockEspecialidadeRepository {
        /// Number of successful create/update/delete calls.
        pub fn writes(&self) -> u32 { self.writes.load(Ordering::SeqCst) }

        /// Make every later write fail as if the database were down.
        pub fn fail_writes(&self) { self.fail_writes.store(true, Ordering::SeqCst); }

        pub fn len(&self) -> usize { self.rows.lock().unwrap().len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }

        fn guard(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EspecialidadeRepository for MockEspecialidadeRepository {
        async fn list(&self) -> Result<Vec<EspecialidadeView>, ServiceError> {
            let mut all: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .cloned()
                .map(|especialidade| EspecialidadeView { especialidade, convenio_name: None })
                .collect();
            all.sort_by(|a, b| a.especialidade.name.cmp(&b.especialidade.name));
            Ok(all)
        }

        async fn list_by_convenio(&self, convenio_id: Uuid) -> Result<Vec<especialidade::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().values().filter(|e| e.convenio_id == convenio_id).cloned().collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<especialidade::Model>, ServiceError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn create(&self, model: especialidade::Model) -> Result<especialidade::Model, ServiceError> {
            self.guard()?;
            self.rows.lock().unwrap().insert(model.id, model.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(model)
        }

        async fn update(&self, model: especialidade::Model) -> Result<especialidade::Model, ServiceError> {
            self.guard()?;
            let mut rows = self.rows.lock().unwrap();
            if !rows.contains_key(&model.id) {
                return Err(ServiceError::not_found("especialidade"));
            }
            rows.insert(model.id, model.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(model)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            self.guard()?;
            let existed = self.rows.lock().unwrap().remove(&id).is_some();
            if existed { self.writes.fetch_add(1, Ordering::SeqCst); }
            Ok(existed)
        }

        async fn image_names(&self) -> Result<Vec<String>, ServiceError> {
            Ok(self.rows.lock().unwrap().values().filter_map(|e| e.image.clone()).collect())
        }
    }
}
