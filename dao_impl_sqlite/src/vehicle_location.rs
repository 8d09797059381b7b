use std::sync::Arc;

use crate::{ResultDbErrorExt, TransactionImpl};
use async_trait::async_trait;
use dao::{
    vehicle_location::{VehicleLocationDao, VehicleLocationEntity},
    DaoError,
};
use time::format_description::well_known::Iso8601;
use time::PrimitiveDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct VehicleLocationDb {
    id: Vec<u8>,
    vehicle_id: Vec<u8>,
    latitude: f64,
    longitude: f64,
    recorded: String,
    created: String,
    update_version: Vec<u8>,
}

impl TryFrom<&VehicleLocationDb> for VehicleLocationEntity {
    type Error = DaoError;
    fn try_from(location: &VehicleLocationDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(location.id.as_ref())?,
            vehicle_id: Uuid::from_slice(location.vehicle_id.as_ref())?,
            latitude: location.latitude,
            longitude: location.longitude,
            recorded: PrimitiveDateTime::parse(&location.recorded, &Iso8601::DATE_TIME)?,
            created: PrimitiveDateTime::parse(&location.created, &Iso8601::DATE_TIME)?,
            version: Uuid::from_slice(&location.update_version)?,
        })
    }
}

pub struct VehicleLocationDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl VehicleLocationDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl VehicleLocationDao for VehicleLocationDaoImpl {
    type Transaction = TransactionImpl;

    async fn create(
        &self,
        entity: &VehicleLocationEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let recorded = entity.recorded.format(&Iso8601::DATE_TIME)?;
        let created = entity.created.format(&Iso8601::DATE_TIME)?;
        sqlx::query(
            r"INSERT INTO vehicle_location (id, vehicle_id, latitude, longitude, recorded, created, update_version, update_process)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entity.id.as_bytes().to_vec())
        .bind(entity.vehicle_id.as_bytes().to_vec())
        .bind(entity.latitude)
        .bind(entity.longitude)
        .bind(&recorded)
        .bind(&created)
        .bind(entity.version.as_bytes().to_vec())
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn find_latest_by_vehicle_id(
        &self,
        vehicle_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<VehicleLocationEntity>, DaoError> {
        // ISO timestamps sort lexicographically, newest ping wins.
        sqlx::query_as::<_, VehicleLocationDb>(
            r"SELECT id, vehicle_id, latitude, longitude, recorded, created, update_version
                FROM vehicle_location
                WHERE vehicle_id = ?
                ORDER BY recorded DESC
                LIMIT 1",
        )
        .bind(vehicle_id.as_bytes().to_vec())
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(VehicleLocationEntity::try_from)
        .transpose()
    }
}
