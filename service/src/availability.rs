use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::MockTransaction;
use fleetly_utils::DateRange;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::vehicle::Vehicle;
use crate::ServiceError;

/// One blocking booking's day span, for greying out a calendar widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BookedRange {
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleAvailability {
    pub vehicle: Vehicle,
    pub available_in_range: bool,
    pub available_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleDetail {
    pub vehicle: Vehicle,
    pub available_today: bool,
    pub booked_ranges: Arc<[BookedRange]>,
}

/// Read side of the booking domain: decides which vehicles are free over a
/// query interval. Stateless and side-effect free; every call recomputes
/// from the booking store. A `None` range means the default "today"
/// interval, `[midnight today, midnight tomorrow)`.
#[automock(type Context=(); type Transaction = MockTransaction;)]
#[async_trait]
pub trait AvailabilityService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    /// The booked set: ids of vehicles with at least one blocking booking
    /// intersecting the interval.
    async fn booked_vehicles(
        &self,
        range: Option<DateRange>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HashSet<Uuid>, ServiceError>;

    /// All blocking day spans of one vehicle, ascending by start, unbounded
    /// in time. An unknown vehicle id yields an empty list.
    async fn booked_date_ranges(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BookedRange]>, ServiceError>;

    /// Every vehicle annotated with availability over the interval and over
    /// the "today" default.
    async fn vehicle_overview(
        &self,
        range: Option<DateRange>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[VehicleAvailability]>, ServiceError>;

    async fn vehicle_detail(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VehicleDetail, ServiceError>;
    async fn vehicle_detail_by_slug(
        &self,
        slug: &str,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VehicleDetail, ServiceError>;

    /// Vehicles rentable today, cheapest first, capped to 16 entries.
    async fn available_vehicles(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Vehicle]>, ServiceError>;
}
