use std::fmt::Debug;

use async_trait::async_trait;
use dao::vehicle_location::VehicleLocationEntity;
use dao::MockTransaction;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleLocation {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded: PrimitiveDateTime,
    pub created: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&VehicleLocationEntity> for VehicleLocation {
    fn from(location: &VehicleLocationEntity) -> Self {
        Self {
            id: location.id,
            vehicle_id: location.vehicle_id,
            latitude: location.latitude,
            longitude: location.longitude,
            recorded: location.recorded,
            created: Some(location.created),
            version: location.version,
        }
    }
}

impl TryFrom<&VehicleLocation> for VehicleLocationEntity {
    type Error = ServiceError;
    fn try_from(location: &VehicleLocation) -> Result<Self, Self::Error> {
        Ok(Self {
            id: location.id,
            vehicle_id: location.vehicle_id,
            latitude: location.latitude,
            longitude: location.longitude,
            recorded: location.recorded,
            created: location.created.ok_or(ServiceError::InternalError)?,
            version: location.version,
        })
    }
}

#[automock(type Context=(); type Transaction = MockTransaction;)]
#[async_trait]
pub trait VehicleLocationService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    /// Stores a GPS ping from a field device.
    async fn report(
        &self,
        location: &VehicleLocation,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VehicleLocation, ServiceError>;

    async fn latest_for_vehicle(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<VehicleLocation>, ServiceError>;
}
