use async_trait::async_trait;
use models::{convenio, endereco};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::convenio::repository::ConvenioRepository;
use crate::errors::ServiceError;

/// SeaORM-backed repository implementation.
pub struct SeaOrmConvenioRepository {
    pub db: DatabaseConnection,
}

fn convenio_insert(m: convenio::Model) -> convenio::ActiveModel {
    convenio::ActiveModel {
        id: Set(m.id),
        name: Set(m.name),
        document: Set(m.document),
        email: Set(m.email),
        phone: Set(m.phone),
        active: Set(m.active),
        created_at: Set(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

fn endereco_insert(m: endereco::Model) -> endereco::ActiveModel {
    endereco::ActiveModel {
        id: Set(m.id),
        convenio_id: Set(m.convenio_id),
        street: Set(m.street),
        number: Set(m.number),
        complement: Set(m.complement),
        district: Set(m.district),
        postal_code: Set(m.postal_code),
        city: Set(m.city),
        state: Set(m.state),
    }
}

fn convenio_changes(m: convenio::Model) -> convenio::ActiveModel {
    convenio::ActiveModel {
        id: Unchanged(m.id),
        name: Set(m.name),
        document: Set(m.document),
        email: Set(m.email),
        phone: Set(m.phone),
        active: Set(m.active),
        created_at: Unchanged(m.created_at),
        updated_at: Set(m.updated_at),
    }
}

fn endereco_changes(m: endereco::Model) -> endereco::ActiveModel {
    endereco::ActiveModel {
        id: Unchanged(m.id),
        convenio_id: Unchanged(m.convenio_id),
        street: Set(m.street),
        number: Set(m.number),
        complement: Set(m.complement),
        district: Set(m.district),
        postal_code: Set(m.postal_code),
        city: Set(m.city),
        state: Set(m.state),
    }
}

#[async_trait]
impl ConvenioRepository for SeaOrmConvenioRepository {
    async fn list(&self) -> Result<Vec<convenio::Model>, ServiceError> {
        let rows = convenio::Entity::find().order_by_asc(convenio::Column::Name).all(&self.db).await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<convenio::Model>, ServiceError> {
        Ok(convenio::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn get_with_endereco(&self, id: Uuid) -> Result<Option<(convenio::Model, Option<endereco::Model>)>, ServiceError> {
        let row = convenio::Entity::find_by_id(id)
            .find_also_related(endereco::Entity)
            .one(&self.db)
            .await?;
        Ok(row)
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<convenio::Model>, ServiceError> {
        let row = convenio::Entity::find()
            .filter(convenio::Column::Document.eq(document.to_string()))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    async fn create(&self, convenio: convenio::Model, endereco: Option<endereco::Model>) -> Result<convenio::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let created = convenio_insert(convenio).insert(&txn).await?;
        if let Some(e) = endereco {
            endereco_insert(e).insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(created)
    }

    async fn update(&self, convenio: convenio::Model) -> Result<convenio::Model, ServiceError> {
        Ok(convenio_changes(convenio).update(&self.db).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = convenio::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn get_endereco(&self, id: Uuid) -> Result<Option<endereco::Model>, ServiceError> {
        Ok(endereco::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn update_endereco(&self, endereco: endereco::Model) -> Result<endereco::Model, ServiceError> {
        Ok(endereco_changes(endereco).update(&self.db).await?)
    }
}
