use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use dao::booking::BookingEntity;
use dao::MockTransaction;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this state reserves the vehicle. Pending requests
    /// and finished or cancelled bookings never block a rental.
    pub fn is_blocking(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Lifecycle: pending -> confirmed -> active -> completed, with
    /// cancellation possible from every non-terminal state.
    pub fn may_transition_to(&self, next: BookingStatus) -> bool {
        match (self, next) {
            (BookingStatus::Pending, BookingStatus::Confirmed) => true,
            (BookingStatus::Confirmed, BookingStatus::Active) => true,
            (BookingStatus::Active, BookingStatus::Completed) => true,
            (_, BookingStatus::Cancelled) => !self.is_terminal(),
            _ => false,
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", dao::booking::BookingStatus::from(*self).as_str())
    }
}

impl From<dao::booking::BookingStatus> for BookingStatus {
    fn from(status: dao::booking::BookingStatus) -> Self {
        match status {
            dao::booking::BookingStatus::Pending => Self::Pending,
            dao::booking::BookingStatus::Confirmed => Self::Confirmed,
            dao::booking::BookingStatus::Active => Self::Active,
            dao::booking::BookingStatus::Completed => Self::Completed,
            dao::booking::BookingStatus::Cancelled => Self::Cancelled,
        }
    }
}
impl From<BookingStatus> for dao::booking::BookingStatus {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::Active => Self::Active,
            BookingStatus::Completed => Self::Completed,
            BookingStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// A rental of one vehicle over the half-open day span
/// `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub renter: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub status: BookingStatus,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&BookingEntity> for Booking {
    fn from(booking: &BookingEntity) -> Self {
        Self {
            id: booking.id,
            vehicle_id: booking.vehicle_id,
            renter: booking.renter.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: booking.status.into(),
            created: Some(booking.created),
            deleted: booking.deleted,
            version: booking.version,
        }
    }
}

impl TryFrom<&Booking> for BookingEntity {
    type Error = ServiceError;
    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            id: booking.id,
            vehicle_id: booking.vehicle_id,
            renter: booking.renter.clone(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: booking.status.into(),
            created: booking.created.ok_or(ServiceError::InternalError)?,
            deleted: booking.deleted,
            version: booking.version,
        })
    }
}

#[automock(type Context=(); type Transaction = MockTransaction;)]
#[async_trait]
pub trait BookingService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;
    async fn get_for_vehicle(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError>;

    /// Creates a booking in status `Pending` (marketplace request) or
    /// `Confirmed` (owner rent-out). Fails with
    /// [`ServiceError::OverlappingDateRange`] when the span is blocked.
    async fn create(
        &self,
        booking: &Booking,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    /// Moves a non-terminal booking to a new day span.
    async fn reschedule(
        &self,
        id: Uuid,
        start_date: Date,
        end_date: Date,
        version: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    /// Advances the booking lifecycle. Confirming re-runs the overlap guard
    /// since the booking starts blocking the vehicle at that point.
    async fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        version: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;
}
