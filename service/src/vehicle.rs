use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::vehicle::VehicleEntity;
use dao::MockTransaction;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: Arc<str>,
    pub slug: Arc<str>,
    pub price_per_day_cents: i64,
    pub available: bool,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&VehicleEntity> for Vehicle {
    fn from(vehicle: &VehicleEntity) -> Self {
        Self {
            id: vehicle.id,
            name: vehicle.name.clone(),
            slug: vehicle.slug.clone(),
            price_per_day_cents: vehicle.price_per_day_cents,
            available: vehicle.available,
            created: Some(vehicle.created),
            deleted: vehicle.deleted,
            version: vehicle.version,
        }
    }
}

impl TryFrom<&Vehicle> for VehicleEntity {
    type Error = ServiceError;
    fn try_from(vehicle: &Vehicle) -> Result<Self, Self::Error> {
        Ok(Self {
            id: vehicle.id,
            name: vehicle.name.clone(),
            slug: vehicle.slug.clone(),
            price_per_day_cents: vehicle.price_per_day_cents,
            available: vehicle.available,
            created: vehicle.created.ok_or(ServiceError::InternalError)?,
            deleted: vehicle.deleted,
            version: vehicle.version,
        })
    }
}

#[automock(type Context=(); type Transaction = MockTransaction;)]
#[async_trait]
pub trait VehicleService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Vehicle]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError>;
    async fn get_by_slug(
        &self,
        slug: &str,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError>;
    async fn exists(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<bool, ServiceError>;
    async fn create(
        &self,
        vehicle: &Vehicle,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError>;
    async fn update(
        &self,
        vehicle: &Vehicle,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError>;
    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;
}
