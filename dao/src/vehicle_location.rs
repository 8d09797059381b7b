use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

/// GPS ping reported by a field device. Append-only, no soft delete.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleLocationEntity {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded: PrimitiveDateTime,
    pub created: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait VehicleLocationDao {
    type Transaction: crate::Transaction + Clone + Send + Sync + 'static;

    async fn create(
        &self,
        entity: &VehicleLocationEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn find_latest_by_vehicle_id(
        &self,
        vehicle_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<VehicleLocationEntity>, DaoError>;
}
