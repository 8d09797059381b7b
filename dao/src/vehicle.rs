use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VehicleEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub slug: Arc<str>,
    pub price_per_day_cents: i64,
    /// Manual listing flag, e.g. taken down for maintenance. Independent of
    /// any booking state.
    pub available: bool,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait VehicleDao {
    type Transaction: crate::Transaction + Clone + Send + Sync + 'static;

    async fn all(&self, tx: Self::Transaction) -> Result<Arc<[VehicleEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<VehicleEntity>, DaoError>;
    async fn find_by_slug(
        &self,
        slug: &str,
        tx: Self::Transaction,
    ) -> Result<Option<VehicleEntity>, DaoError>;
    async fn create(
        &self,
        entity: &VehicleEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &VehicleEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
