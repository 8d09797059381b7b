use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use fleetly_utils::DateRange;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

/// Stored booking lifecycle state. Only `Confirmed` and `Active` bookings
/// block a vehicle; the transition rules live in the service layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DaoError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "active" => Ok(BookingStatus::Active),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            unknown => Err(DaoError::UnknownBookingStatus(unknown.into())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingEntity {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub renter: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub status: BookingStatus,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait BookingDao {
    type Transaction: crate::Transaction + Clone + Send + Sync + 'static;

    async fn all(&self, tx: Self::Transaction) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError>;
    async fn find_by_vehicle_id(
        &self,
        vehicle_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;

    /// All non-deleted bookings, any status, whose `[start_date, end_date)`
    /// intersects the given span.
    async fn find_in_span(
        &self,
        span: DateRange,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;

    /// Inserts the booking unless a blocking (confirmed or active) booking of
    /// the same vehicle intersects the entity's date span. Returns whether
    /// the row was written; `false` means the span is taken. Check and insert
    /// are one statement, so concurrent commits cannot both pass.
    async fn create_unless_blocked(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError>;

    /// Writes the entity unless another blocking booking of the same vehicle
    /// intersects its date span. Same guard as `create_unless_blocked`, used
    /// when rescheduling or when a booking turns blocking on confirmation.
    async fn update_unless_blocked(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError>;

    async fn update(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
