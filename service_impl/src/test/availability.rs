use std::sync::Arc;

use crate::availability::*;
use crate::test::error_test::*;
use dao::booking::{BookingEntity, MockBookingDao};
use dao::{MockTransaction, MockTransactionDao};
use fleetly_utils::DateRange;
use mockall::predicate::eq;
use service::{
    availability::{AvailabilityService, BookedRange},
    booking::{Booking, BookingStatus},
    clock::MockClockService,
    vehicle::{MockVehicleService, Vehicle},
    MockPermissionService,
};
use time::macros::date;
use uuid::{uuid, Uuid};

pub fn default_vehicle_id() -> Uuid {
    uuid!("7A3D95D0-1C92-4A42-8E4E-9E7E2E7B9A21")
}
pub fn default_version() -> Uuid {
    uuid!("C56C3F0B-9E36-4F9A-93E6-5B7BBE0F8B6D")
}

pub fn generate_default_vehicle() -> Vehicle {
    Vehicle {
        id: default_vehicle_id(),
        name: "Bulli T2".into(),
        slug: "bulli-t2".into(),
        price_per_day_cents: 10_000,
        available: true,
        created: Some(generate_default_datetime()),
        deleted: None,
        version: default_version(),
    }
}

pub fn generate_default_booking() -> Booking {
    Booking {
        id: uuid!("1B7E4B51-6B1A-43A4-A2D5-C53E3A5A5E10"),
        vehicle_id: default_vehicle_id(),
        renter: "renate".into(),
        start_date: date!(2024 - 06 - 10),
        end_date: date!(2024 - 06 - 15),
        status: BookingStatus::Confirmed,
        created: Some(generate_default_datetime()),
        deleted: None,
        version: default_version(),
    }
}

fn generate_default_booking_entity() -> BookingEntity {
    BookingEntity {
        id: uuid!("1B7E4B51-6B1A-43A4-A2D5-C53E3A5A5E10"),
        vehicle_id: default_vehicle_id(),
        renter: "renate".into(),
        start_date: date!(2024 - 06 - 10),
        end_date: date!(2024 - 06 - 15),
        status: dao::booking::BookingStatus::Confirmed,
        created: generate_default_datetime(),
        deleted: None,
        version: default_version(),
    }
}

// ---------------------------------------------------------------------------
// The pure resolver core.
// ---------------------------------------------------------------------------

// Booking fully contains the query interval.
#[test]
fn test_booked_set_contains_vehicle_with_contained_interval() {
    let bookings = [generate_default_booking()];
    let range = DateRange::new(date!(2024 - 06 - 12), date!(2024 - 06 - 13)).unwrap();
    let booked = booked_vehicle_ids(&bookings, &range);
    assert!(booked.contains(&default_vehicle_id()));
}

// Booking end equals query start: under the half-open convention the two
// spans only touch, so the vehicle stays free.
#[test]
fn test_touching_booking_does_not_block() {
    let bookings = [generate_default_booking()];
    let range = DateRange::new(date!(2024 - 06 - 15), date!(2024 - 06 - 20)).unwrap();
    assert!(booked_vehicle_ids(&bookings, &range).is_empty());

    // And the mirror image: query end equals booking start.
    let range = DateRange::new(date!(2024 - 06 - 05), date!(2024 - 06 - 10)).unwrap();
    assert!(booked_vehicle_ids(&bookings, &range).is_empty());
}

// Non-blocking statuses never enter the booked set, full date overlap or not.
#[test]
fn test_non_blocking_statuses_are_ignored() {
    let range = DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 15)).unwrap();
    for status in [
        BookingStatus::Pending,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ] {
        let bookings = [Booking {
            status,
            ..generate_default_booking()
        }];
        assert!(
            booked_vehicle_ids(&bookings, &range).is_empty(),
            "status {} must not block",
            status
        );
    }
    for status in [BookingStatus::Confirmed, BookingStatus::Active] {
        let bookings = [Booking {
            status,
            ..generate_default_booking()
        }];
        assert!(
            !booked_vehicle_ids(&bookings, &range).is_empty(),
            "status {} must block",
            status
        );
    }
}

#[test]
fn test_blocking_overlaps_single_booking() {
    let booking = generate_default_booking();
    let inside = DateRange::new(date!(2024 - 06 - 14), date!(2024 - 06 - 20)).unwrap();
    let outside = DateRange::new(date!(2024 - 07 - 01), date!(2024 - 07 - 02)).unwrap();
    assert!(blocking_overlaps(&booking, &inside));
    assert!(!blocking_overlaps(&booking, &outside));
}

// The manual flag wins even with zero bookings.
#[test]
fn test_unavailable_flag_beats_empty_booked_set() {
    let vehicle = Vehicle {
        available: false,
        ..generate_default_vehicle()
    };
    assert!(!is_available(&vehicle, &Default::default()));
}

#[test]
fn test_is_available_checks_booked_set() {
    let vehicle = generate_default_vehicle();
    assert!(is_available(&vehicle, &Default::default()));
    let booked = [vehicle.id].into_iter().collect();
    assert!(!is_available(&vehicle, &booked));
    let booked_other = [uuid!("019526F3-0A68-4E3B-89B3-52C7E0A0B2F4")]
        .into_iter()
        .collect();
    assert!(is_available(&vehicle, &booked_other));
}

// ---------------------------------------------------------------------------
// The DAO-backed service around the core.
// ---------------------------------------------------------------------------

pub struct AvailabilityServiceDependencies {
    pub booking_dao: MockBookingDao,
    pub vehicle_service: MockVehicleService,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub transaction_dao: MockTransactionDao,
}

pub struct AvailabilityTestDeps;
impl AvailabilityServiceDeps for AvailabilityTestDeps {
    type Context = ();
    type Transaction = MockTransaction;
    type BookingDao = MockBookingDao;
    type VehicleService = MockVehicleService;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type TransactionDao = MockTransactionDao;
}

impl AvailabilityServiceDependencies {
    pub fn build_service(self) -> AvailabilityServiceImpl<AvailabilityTestDeps> {
        AvailabilityServiceImpl::new(
            self.booking_dao.into(),
            self.vehicle_service.into(),
            self.permission_service.into(),
            self.clock_service.into(),
            self.transaction_dao.into(),
        )
    }
}

pub fn build_dependencies(permission: bool) -> AvailabilityServiceDependencies {
    let booking_dao = MockBookingDao::new();
    let vehicle_service = MockVehicleService::new();
    let mut permission_service = MockPermissionService::new();
    permission_service
        .expect_check_permission()
        .with(eq("renter"), eq(().auth()))
        .returning(move |_, _| {
            if permission {
                Ok(())
            } else {
                Err(service::ServiceError::Forbidden)
            }
        });
    permission_service
        .expect_check_permission()
        .returning(|_, _| Err(service::ServiceError::Forbidden));
    let mut clock_service = MockClockService::new();
    clock_service
        .expect_date_now()
        .returning(|| date!(2024 - 06 - 12));
    let mut transaction_dao = MockTransactionDao::new();
    transaction_dao
        .expect_use_transaction()
        .returning(|_| Ok(MockTransaction));
    transaction_dao.expect_commit().returning(|_| Ok(()));

    AvailabilityServiceDependencies {
        booking_dao,
        vehicle_service,
        permission_service,
        clock_service,
        transaction_dao,
    }
}

#[tokio::test]
async fn test_booked_vehicles_defaults_to_today() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .booking_dao
        .expect_find_in_span()
        .with(
            eq(DateRange::single_day(date!(2024 - 06 - 12))),
            eq(MockTransaction),
        )
        .times(1)
        .returning(|_, _| Ok(Arc::new([generate_default_booking_entity()])));

    let availability_service = dependencies.build_service();
    let result = availability_service
        .booked_vehicles(None, ().auth(), None)
        .await;
    assert!(result.is_ok());
    let booked = result.unwrap();
    assert!(booked.contains(&default_vehicle_id()));
}

#[tokio::test]
async fn test_booked_vehicles_no_permission() {
    let dependencies = build_dependencies(false);
    let availability_service = dependencies.build_service();
    let result = availability_service
        .booked_vehicles(None, ().auth(), None)
        .await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_booked_vehicles_is_idempotent() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .booking_dao
        .expect_find_in_span()
        .times(2)
        .returning(|_, _| Ok(Arc::new([generate_default_booking_entity()])));

    let availability_service = dependencies.build_service();
    let range = DateRange::new(date!(2024 - 06 - 12), date!(2024 - 06 - 13)).unwrap();
    let first = availability_service
        .booked_vehicles(Some(range), ().auth(), None)
        .await
        .unwrap();
    let second = availability_service
        .booked_vehicles(Some(range), ().auth(), None)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_booked_date_ranges_sorted_and_filtered() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .booking_dao
        .expect_find_by_vehicle_id()
        .with(eq(default_vehicle_id()), eq(MockTransaction))
        .returning(|_, _| {
            Ok(Arc::new([
                BookingEntity {
                    id: Uuid::new_v4(),
                    start_date: date!(2024 - 08 - 01),
                    end_date: date!(2024 - 08 - 05),
                    ..generate_default_booking_entity()
                },
                BookingEntity {
                    id: Uuid::new_v4(),
                    start_date: date!(2024 - 07 - 01),
                    end_date: date!(2024 - 07 - 05),
                    status: dao::booking::BookingStatus::Cancelled,
                    ..generate_default_booking_entity()
                },
                generate_default_booking_entity(),
            ]))
        });

    let availability_service = dependencies.build_service();
    let result = availability_service
        .booked_date_ranges(default_vehicle_id(), ().auth(), None)
        .await;
    assert!(result.is_ok());
    let ranges = result.unwrap();
    assert_eq!(
        ranges.as_ref(),
        &[
            BookedRange {
                start_date: date!(2024 - 06 - 10),
                end_date: date!(2024 - 06 - 15),
            },
            BookedRange {
                start_date: date!(2024 - 08 - 01),
                end_date: date!(2024 - 08 - 05),
            },
        ]
    );
}

#[tokio::test]
async fn test_vehicle_overview_annotates_range_and_today() {
    let mut dependencies = build_dependencies(true);
    let free_vehicle_id = uuid!("019526F3-0A68-4E3B-89B3-52C7E0A0B2F4");
    let down_vehicle_id = uuid!("5C0C1D0A-92D1-47C4-8E0E-6A1C9D8E2B33");
    dependencies.vehicle_service.expect_get_all().returning(move |_, _| {
        Ok(Arc::new([
            generate_default_vehicle(),
            Vehicle {
                id: free_vehicle_id,
                slug: "ducato-maxi".into(),
                ..generate_default_vehicle()
            },
            Vehicle {
                id: down_vehicle_id,
                slug: "sprinter-311".into(),
                available: false,
                ..generate_default_vehicle()
            },
        ]))
    });
    // Query range: booked for the default vehicle. Today (2024-06-12) falls
    // inside the same booking.
    dependencies
        .booking_dao
        .expect_find_in_span()
        .with(
            eq(DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 20)).unwrap()),
            eq(MockTransaction),
        )
        .returning(|_, _| Ok(Arc::new([generate_default_booking_entity()])));
    dependencies
        .booking_dao
        .expect_find_in_span()
        .with(
            eq(DateRange::single_day(date!(2024 - 06 - 12))),
            eq(MockTransaction),
        )
        .returning(|_, _| Ok(Arc::new([generate_default_booking_entity()])));

    let availability_service = dependencies.build_service();
    let range = DateRange::new(date!(2024 - 06 - 10), date!(2024 - 06 - 20)).unwrap();
    let result = availability_service
        .vehicle_overview(Some(range), ().auth(), None)
        .await;
    assert!(result.is_ok());
    let overview = result.unwrap();
    assert_eq!(overview.len(), 3);

    let booked = &overview[0];
    assert_eq!(booked.vehicle.id, default_vehicle_id());
    assert!(!booked.available_in_range);
    assert!(!booked.available_today);

    let free = &overview[1];
    assert_eq!(free.vehicle.id, free_vehicle_id);
    assert!(free.available_in_range);
    assert!(free.available_today);

    let down = &overview[2];
    assert_eq!(down.vehicle.id, down_vehicle_id);
    assert!(!down.available_in_range);
    assert!(!down.available_today);
}

#[tokio::test]
async fn test_vehicle_detail_blocks_calendar() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .vehicle_service
        .expect_get()
        .with(
            eq(default_vehicle_id()),
            eq(service::permission::Authentication::Full),
            eq(Some(MockTransaction)),
        )
        .returning(|_, _, _| Ok(generate_default_vehicle()));
    dependencies
        .booking_dao
        .expect_find_by_vehicle_id()
        .returning(|_, _| {
            Ok(Arc::new([
                generate_default_booking_entity(),
                BookingEntity {
                    id: Uuid::new_v4(),
                    start_date: date!(2024 - 06 - 12),
                    end_date: date!(2024 - 06 - 13),
                    status: dao::booking::BookingStatus::Cancelled,
                    ..generate_default_booking_entity()
                },
            ]))
        });

    let availability_service = dependencies.build_service();
    let result = availability_service
        .vehicle_detail(default_vehicle_id(), ().auth(), None)
        .await;
    assert!(result.is_ok());
    let detail = result.unwrap();
    assert_eq!(detail.vehicle, generate_default_vehicle());
    // Today (2024-06-12) is inside the confirmed booking.
    assert!(!detail.available_today);
    assert_eq!(
        detail.booked_ranges.as_ref(),
        &[BookedRange {
            start_date: date!(2024 - 06 - 10),
            end_date: date!(2024 - 06 - 15),
        }]
    );
}

#[tokio::test]
async fn test_vehicle_detail_by_slug() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .vehicle_service
        .expect_get_by_slug()
        .withf(|slug, _, _| slug == "bulli-t2")
        .returning(|_, _, _| Ok(generate_default_vehicle()));
    dependencies
        .booking_dao
        .expect_find_by_vehicle_id()
        .returning(|_, _| Ok(Arc::new([])));

    let availability_service = dependencies.build_service();
    let result = availability_service
        .vehicle_detail_by_slug("bulli-t2", ().auth(), None)
        .await;
    assert!(result.is_ok());
    let detail = result.unwrap();
    assert!(detail.available_today);
    assert!(detail.booked_ranges.is_empty());
}

#[tokio::test]
async fn test_available_vehicles_sorted_by_price_and_capped() {
    let mut dependencies = build_dependencies(true);
    dependencies.vehicle_service.expect_get_all().returning(|_, _| {
        let mut vehicles = vec![generate_default_vehicle()];
        for price in (1..=19).rev() {
            vehicles.push(Vehicle {
                id: Uuid::new_v4(),
                price_per_day_cents: price * 1_000,
                ..generate_default_vehicle()
            });
        }
        Ok(vehicles.into())
    });
    // The default vehicle is booked over today and must not show up.
    dependencies
        .booking_dao
        .expect_find_in_span()
        .returning(|_, _| Ok(Arc::new([generate_default_booking_entity()])));

    let availability_service = dependencies.build_service();
    let result = availability_service.available_vehicles(().auth(), None).await;
    assert!(result.is_ok());
    let vehicles = result.unwrap();
    assert_eq!(vehicles.len(), 16);
    assert!(vehicles.iter().all(|vehicle| vehicle.id != default_vehicle_id()));
    let prices: Vec<i64> = vehicles
        .iter()
        .map(|vehicle| vehicle.price_per_day_cents)
        .collect();
    let mut sorted = prices.clone();
    sorted.sort();
    assert_eq!(prices, sorted);
    assert_eq!(prices[0], 1_000);
}
