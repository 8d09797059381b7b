use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    vehicle::{VehicleDao, VehicleEntity},
    DaoError,
};
use time::format_description::well_known::Iso8601;
use time::PrimitiveDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct VehicleDb {
    id: Vec<u8>,
    name: String,
    slug: String,
    price_per_day_cents: i64,
    available: bool,
    created: String,
    deleted: Option<String>,
    update_version: Vec<u8>,
}

impl TryFrom<&VehicleDb> for VehicleEntity {
    type Error = DaoError;
    fn try_from(vehicle: &VehicleDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(vehicle.id.as_ref())?,
            name: vehicle.name.as_str().into(),
            slug: vehicle.slug.as_str().into(),
            price_per_day_cents: vehicle.price_per_day_cents,
            available: vehicle.available,
            created: PrimitiveDateTime::parse(&vehicle.created, &Iso8601::DATE_TIME)?,
            deleted: vehicle
                .deleted
                .as_ref()
                .map(|deleted| PrimitiveDateTime::parse(deleted, &Iso8601::DATE_TIME))
                .transpose()?,
            version: Uuid::from_slice(&vehicle.update_version)?,
        })
    }
}

const SELECT_VEHICLE: &str = r"SELECT id, name, slug, price_per_day_cents, available, created, deleted, update_version FROM vehicle";

pub struct VehicleDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl VehicleDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl VehicleDao for VehicleDaoImpl {
    type Transaction = TransactionImpl;

    async fn all(&self, tx: Self::Transaction) -> Result<Arc<[VehicleEntity]>, DaoError> {
        sqlx::query_as::<_, VehicleDb>(&format!("{SELECT_VEHICLE} WHERE deleted IS NULL"))
            .fetch_all(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .iter()
            .map(VehicleEntity::try_from)
            .collect::<Result<Arc<[VehicleEntity]>, DaoError>>()
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<VehicleEntity>, DaoError> {
        sqlx::query_as::<_, VehicleDb>(&format!("{SELECT_VEHICLE} WHERE id = ?"))
            .bind(id.as_bytes().to_vec())
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(VehicleEntity::try_from)
            .transpose()
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        tx: Self::Transaction,
    ) -> Result<Option<VehicleEntity>, DaoError> {
        sqlx::query_as::<_, VehicleDb>(&format!(
            "{SELECT_VEHICLE} WHERE slug = ? AND deleted IS NULL"
        ))
        .bind(slug)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(VehicleEntity::try_from)
        .transpose()
    }

    async fn create(
        &self,
        entity: &VehicleEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let created = entity.created.format(&Iso8601::DATE_TIME)?;
        let deleted = entity
            .deleted
            .as_ref()
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        sqlx::query(
            r"INSERT INTO vehicle (id, name, slug, price_per_day_cents, available, created, deleted, update_version, update_process)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.name.as_ref())
        .bind(entity.slug.as_ref())
        .bind(entity.price_per_day_cents)
        .bind(entity.available)
        .bind(&created)
        .bind(&deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &VehicleEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let deleted = entity
            .deleted
            .as_ref()
            .map(|deleted| deleted.format(&Iso8601::DATE_TIME))
            .transpose()?;
        sqlx::query(
            r"UPDATE vehicle
                SET name = ?, price_per_day_cents = ?, available = ?, deleted = ?, update_version = ?, update_process = ?
                WHERE id = ?",
        )
        .bind(entity.name.as_ref())
        .bind(entity.price_per_day_cents)
        .bind(entity.available)
        .bind(&deleted)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .bind(entity.id.as_bytes().to_vec())
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }
}
