use async_trait::async_trait;
use models::{convenio, endereco};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Storage gateway for providers and their addresses.
#[async_trait]
pub trait ConvenioRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<convenio::Model>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<convenio::Model>, ServiceError>;
    async fn get_with_endereco(&self, id: Uuid) -> Result<Option<(convenio::Model, Option<endereco::Model>)>, ServiceError>;
    async fn find_by_document(&self, document: &str) -> Result<Option<convenio::Model>, ServiceError>;
    async fn create(&self, convenio: convenio::Model, endereco: Option<endereco::Model>) -> Result<convenio::Model, ServiceError>;
    async fn update(&self, convenio: convenio::Model) -> Result<convenio::Model, ServiceError>;
    /// Deletes the provider; its address goes with it.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn get_endereco(&self, id: Uuid) -> Result<Option<endereco::Model>, ServiceError>;
    async fn update_endereco(&self, endereco: endereco::Model) -> Result<endereco::Model, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockConvenioRepository {
        convenios: Mutex<HashMap<Uuid, convenio::Model>>,
        enderecos: Mutex<HashMap<Uuid, endereco::Model>>, // key: endereco id
        writes: AtomicU32,
    }

    impl MockConvenioRepository {
        /// Number of successful create/update/delete calls.
        pub fn writes(&self) -> u32 { self.writes.load(Ordering::SeqCst) }

        fn bump(&self) { self.writes.fetch_add(1, Ordering::SeqCst); }
    }

    #[async_trait]
    impl ConvenioRepository for MockConvenioRepository {
        async fn list(&self) -> Result<Vec<convenio::Model>, ServiceError> {
            let mut all: Vec<_> = self.convenios.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(all)
        }

        async fn get(&self, id: Uuid) -> Result<Option<convenio::Model>, ServiceError> {
            Ok(self.convenios.lock().unwrap().get(&id).cloned())
        }

        async fn get_with_endereco(&self, id: Uuid) -> Result<Option<(convenio::Model, Option<endereco::Model>)>, ServiceError> {
            let Some(c) = self.convenios.lock().unwrap().get(&id).cloned() else { return Ok(None) };
            let e = self.enderecos.lock().unwrap().values().find(|e| e.convenio_id == id).cloned();
            Ok(Some((c, e)))
        }

        async fn find_by_document(&self, document: &str) -> Result<Option<convenio::Model>, ServiceError> {
            Ok(self.convenios.lock().unwrap().values().find(|c| c.document == document).cloned())
        }

        async fn create(&self, convenio: convenio::Model, endereco: Option<endereco::Model>) -> Result<convenio::Model, ServiceError> {
            let mut convenios = self.convenios.lock().unwrap();
            if convenios.values().any(|c| c.document == convenio.document) {
                return Err(ServiceError::Db("duplicate key value violates unique constraint".into()));
            }
            convenios.insert(convenio.id, convenio.clone());
            if let Some(e) = endereco {
                self.enderecos.lock().unwrap().insert(e.id, e);
            }
            drop(convenios);
            self.bump();
            Ok(convenio)
        }

        async fn update(&self, convenio: convenio::Model) -> Result<convenio::Model, ServiceError> {
            let mut convenios = self.convenios.lock().unwrap();
            if !convenios.contains_key(&convenio.id) {
                return Err(ServiceError::not_found("convenio"));
            }
            convenios.insert(convenio.id, convenio.clone());
            drop(convenios);
            self.bump();
            Ok(convenio)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let existed = self.convenios.lock().unwrap().remove(&id).is_some();
            self.enderecos.lock().unwrap().retain(|_, e| e.convenio_id != id);
            if existed { self.bump(); }
            Ok(existed)
        }

        async fn get_endereco(&self, id: Uuid) -> Result<Option<endereco::Model>, ServiceError> {
            Ok(self.enderecos.lock().unwrap().get(&id).cloned())
        }

        async fn update_endereco(&self, endereco: endereco::Model) -> Result<endereco::Model, ServiceError> {
            let mut enderecos = self.enderecos.lock().unwrap();
            if !enderecos.contains_key(&endereco.id) {
                return Err(ServiceError::not_found("endereco"));
            }
            enderecos.insert(endereco.id, endereco.clone());
            drop(enderecos);
            self.bump();
            Ok(endereco)
        }
    }
}
