use crate::gen_service_impl;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{booking::BookingDao, TransactionDao};
use fleetly_utils::DateRange;
use service::{
    availability::{AvailabilityService, BookedRange, VehicleAvailability, VehicleDetail},
    booking::Booking,
    clock::ClockService,
    permission::{Authentication, FLEET_PRIVILEGE, RENTER_PRIVILEGE},
    vehicle::{Vehicle, VehicleService},
    PermissionService, ServiceError,
};
use tokio::join;
use tracing::instrument;
use uuid::Uuid;

/// Cap for the "available today" listing.
const AVAILABLE_VEHICLES_LIMIT: usize = 16;

/// A booking reserves its vehicle over the query interval iff its status is
/// blocking and its half-open day span intersects the interval.
pub fn blocking_overlaps(booking: &Booking, range: &DateRange) -> bool {
    booking.status.is_blocking() && range.overlaps_span(booking.start_date, booking.end_date)
}

/// The booked set: ids of vehicles with at least one blocking booking
/// intersecting the interval.
pub fn booked_vehicle_ids(bookings: &[Booking], range: &DateRange) -> HashSet<Uuid> {
    bookings
        .iter()
        .filter(|booking| blocking_overlaps(booking, range))
        .map(|booking| booking.vehicle_id)
        .collect()
}

/// The manual listing flag and the computed booking state both have to hold.
pub fn is_available(vehicle: &Vehicle, booked: &HashSet<Uuid>) -> bool {
    vehicle.available && !booked.contains(&vehicle.id)
}

gen_service_impl! {
    struct AvailabilityServiceImpl: AvailabilityService = AvailabilityServiceDeps {
        BookingDao: BookingDao<Transaction = Self::Transaction> = booking_dao,
        VehicleService: VehicleService<Transaction = Self::Transaction, Context = Self::Context> = vehicle_service,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ClockService: ClockService = clock_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

impl<Deps: AvailabilityServiceDeps> AvailabilityServiceImpl<Deps> {
    fn today(&self) -> DateRange {
        DateRange::single_day(self.clock_service.date_now())
    }

    async fn check_read_permission(
        &self,
        context: Authentication<Deps::Context>,
    ) -> Result<(), ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)
    }

    async fn bookings_in_span(
        &self,
        range: DateRange,
        tx: Deps::Transaction,
    ) -> Result<Vec<Booking>, ServiceError> {
        Ok(self
            .booking_dao
            .find_in_span(range, tx)
            .await?
            .iter()
            .map(Booking::from)
            .collect())
    }

    async fn detail_for_vehicle(
        &self,
        vehicle: Vehicle,
        tx: Deps::Transaction,
    ) -> Result<VehicleDetail, ServiceError> {
        let bookings: Vec<Booking> = self
            .booking_dao
            .find_by_vehicle_id(vehicle.id, tx)
            .await?
            .iter()
            .map(Booking::from)
            .collect();

        let today = self.today();
        let booked_today = booked_vehicle_ids(&bookings, &today);
        let mut booked_ranges: Vec<BookedRange> = bookings
            .iter()
            .filter(|booking| booking.status.is_blocking())
            .map(|booking| BookedRange {
                start_date: booking.start_date,
                end_date: booking.end_date,
            })
            .collect();
        booked_ranges.sort();

        let available_today = is_available(&vehicle, &booked_today);
        Ok(VehicleDetail {
            vehicle,
            available_today,
            booked_ranges: booked_ranges.into(),
        })
    }
}

#[async_trait]
impl<Deps: AvailabilityServiceDeps> AvailabilityService for AvailabilityServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    #[instrument(skip(self, tx))]
    async fn booked_vehicles(
        &self,
        range: Option<DateRange>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<HashSet<Uuid>, ServiceError> {
        self.check_read_permission(context).await?;

        let range = range.unwrap_or_else(|| self.today());
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self.bookings_in_span(range, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(booked_vehicle_ids(&bookings, &range))
    }

    async fn booked_date_ranges(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[BookedRange]>, ServiceError> {
        self.check_read_permission(context).await?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut ranges: Vec<BookedRange> = self
            .booking_dao
            .find_by_vehicle_id(vehicle_id, tx.clone())
            .await?
            .iter()
            .map(Booking::from)
            .filter(|booking| booking.status.is_blocking())
            .map(|booking| BookedRange {
                start_date: booking.start_date,
                end_date: booking.end_date,
            })
            .collect();
        self.transaction_dao.commit(tx).await?;
        ranges.sort();
        Ok(ranges.into())
    }

    #[instrument(skip(self, tx))]
    async fn vehicle_overview(
        &self,
        range: Option<DateRange>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[VehicleAvailability]>, ServiceError> {
        self.check_read_permission(context).await?;

        let today = self.today();
        let range = range.unwrap_or(today);
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicles = self
            .vehicle_service
            .get_all(Authentication::Full, Some(tx.clone()))
            .await?;

        let bookings_in_range = self.bookings_in_span(range, tx.clone()).await?;
        let booked_in_range = booked_vehicle_ids(&bookings_in_range, &range);
        let booked_today = if range == today {
            booked_in_range.clone()
        } else {
            let bookings_today = self.bookings_in_span(today, tx.clone()).await?;
            booked_vehicle_ids(&bookings_today, &today)
        };
        self.transaction_dao.commit(tx).await?;

        Ok(vehicles
            .iter()
            .map(|vehicle| VehicleAvailability {
                available_in_range: is_available(vehicle, &booked_in_range),
                available_today: is_available(vehicle, &booked_today),
                vehicle: vehicle.clone(),
            })
            .collect())
    }

    async fn vehicle_detail(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VehicleDetail, ServiceError> {
        self.check_read_permission(context).await?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicle = self
            .vehicle_service
            .get(vehicle_id, Authentication::Full, Some(tx.clone()))
            .await?;
        let detail = self.detail_for_vehicle(vehicle, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(detail)
    }

    async fn vehicle_detail_by_slug(
        &self,
        slug: &str,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VehicleDetail, ServiceError> {
        self.check_read_permission(context).await?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicle = self
            .vehicle_service
            .get_by_slug(slug, Authentication::Full, Some(tx.clone()))
            .await?;
        let detail = self.detail_for_vehicle(vehicle, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(detail)
    }

    async fn available_vehicles(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Vehicle]>, ServiceError> {
        self.check_read_permission(context).await?;

        let today = self.today();
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicles = self
            .vehicle_service
            .get_all(Authentication::Full, Some(tx.clone()))
            .await?;
        let bookings = self.bookings_in_span(today, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;

        let booked = booked_vehicle_ids(&bookings, &today);
        let mut available: Vec<Vehicle> = vehicles
            .iter()
            .filter(|vehicle| is_available(vehicle, &booked))
            .cloned()
            .collect();
        available.sort_by_key(|vehicle| vehicle.price_per_day_cents);
        available.truncate(AVAILABLE_VEHICLES_LIMIT);
        Ok(available.into())
    }
}
