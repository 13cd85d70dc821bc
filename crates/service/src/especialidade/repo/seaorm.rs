use async_trait::async_trait;
use models::{convenio, especialidade};
use sea_orm::{
    ActiveModelTrait, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::especialidade::domain::EspecialidadeView;
use crate::especialidade::repository::EspecialidadeRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmEspecialidadeRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl EspecialidadeRepository for SeaOrmEspecialidadeRepository {
    async fn list(&self) -> Result<Vec<EspecialidadeView>, ServiceError> {
        let rows = especialidade::Entity::find()
            .find_also_related(convenio::Entity)
            .order_by_asc(especialidade::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(especialidade, c)| EspecialidadeView { especialidade, convenio_name: c.map(|c| c.name) })
            .collect())
    }

    async fn list_by_convenio(&self, convenio_id: Uuid) -> Result<Vec<especialidade::Model>, ServiceError> {
        let rows = especialidade::Entity::find()
            .filter(especialidade::Column::ConvenioId.eq(convenio_id))
            .order_by_asc(especialidade::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<especialidade::Model>, ServiceError> {
        Ok(especialidade::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, m: especialidade::Model) -> Result<especialidade::Model, ServiceError> {
        let am = especialidade::ActiveModel {
            id: Set(m.id),
            convenio_id: Set(m.convenio_id),
            name: Set(m.name),
            description: Set(m.description),
            value: Set(m.value),
            active: Set(m.active),
            image: Set(m.image),
            created_at: Set(m.created_at),
            updated_at: Set(m.updated_at),
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn update(&self, m: especialidade::Model) -> Result<especialidade::Model, ServiceError> {
        let am = especialidade::ActiveModel {
            id: Unchanged(m.id),
            convenio_id: Set(m.convenio_id),
            name: Set(m.name),
            description: Set(m.description),
            value: Set(m.value),
            active: Set(m.active),
            image: Set(m.image),
            created_at: Unchanged(m.created_at),
            updated_at: Set(m.updated_at),
        };
        Ok(am.update(&self.db).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = especialidade::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn image_names(&self) -> Result<Vec<String>, ServiceError> {
        let names: Vec<Option<String>> = especialidade::Entity::find()
            .select_only()
            .column(especialidade::Column::Image)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(names.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convenio::repo::seaorm::SeaOrmConvenioRepository;
    use crate::convenio::repository::ConvenioRepository;
    use crate::test_support::get_db;
    use chrono::Utc;

    #[tokio::test]
    async fn especialidade_repository_roundtrip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let convenios = SeaOrmConvenioRepository { db: db.clone() };
        let repo = SeaOrmEspecialidadeRepository { db };

        let now = Utc::now().into();
        let doc = format!("{:011}", Uuid::new_v4().as_u128() % 100_000_000_000);
        let c = convenios
            .create(
                convenio::Model {
                    id: Uuid::new_v4(),
                    name: "Clinica Repo".into(),
                    document: doc,
                    email: "repo@clinica.com".into(),
                    phone: None,
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
                None,
            )
            .await?;

        let image = format!("{}_x", Uuid::new_v4());
        let created = repo
            .create(especialidade::Model {
                id: Uuid::new_v4(),
                convenio_id: c.id,
                name: "Cardiology".into(),
                description: "Heart".into(),
                value: 150.0,
                active: false,
                image: Some(image.clone()),
                created_at: now,
                updated_at: now,
            })
            .await?;

        let listed = repo.list().await?;
        let view = listed.iter().find(|v| v.especialidade.id == created.id).expect("listed");
        assert_eq!(view.convenio_name.as_deref(), Some("Clinica Repo"));
        assert!(repo.image_names().await?.contains(&image));

        let mut changed = created.clone();
        changed.value = 200.0;
        let updated = repo.update(changed).await?;
        assert_eq!(updated.value, 200.0);
        assert_eq!(updated.image.as_deref(), Some(image.as_str()));

        assert!(repo.delete(created.id).await?);
        assert!(repo.get(created.id).await?.is_none());
        convenios.delete(c.id).await?;
        Ok(())
    }
}
