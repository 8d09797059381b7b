use crate::test::error_test::*;
use crate::vehicle_location::*;
use dao::vehicle_location::{MockVehicleLocationDao, VehicleLocationEntity};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::eq;
use service::{
    clock::MockClockService,
    uuid_service::MockUuidService,
    vehicle::MockVehicleService,
    vehicle_location::{VehicleLocation, VehicleLocationService},
    MockPermissionService, ValidationFailureItem,
};
use uuid::{uuid, Uuid};

pub fn default_id() -> Uuid {
    uuid!("3E7A1F26-4B8C-49D7-BD0E-2F1A6C3D5E88")
}
pub fn default_vehicle_id() -> Uuid {
    uuid!("7A3D95D0-1C92-4A42-8E4E-9E7E2E7B9A21")
}
pub fn default_version() -> Uuid {
    uuid!("C56C3F0B-9E36-4F9A-93E6-5B7BBE0F8B6D")
}

pub fn generate_default_location() -> VehicleLocation {
    VehicleLocation {
        id: default_id(),
        vehicle_id: default_vehicle_id(),
        latitude: 52.520_008,
        longitude: 13.404_954,
        recorded: generate_default_datetime(),
        created: Some(generate_default_datetime()),
        version: default_version(),
    }
}

pub fn generate_default_location_entity() -> VehicleLocationEntity {
    VehicleLocationEntity {
        id: default_id(),
        vehicle_id: default_vehicle_id(),
        latitude: 52.520_008,
        longitude: 13.404_954,
        recorded: generate_default_datetime(),
        created: generate_default_datetime(),
        version: default_version(),
    }
}

pub struct VehicleLocationServiceDependencies {
    pub vehicle_location_dao: MockVehicleLocationDao,
    pub vehicle_service: MockVehicleService,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub transaction_dao: MockTransactionDao,
}

pub struct VehicleLocationTestDeps;
impl VehicleLocationServiceDeps for VehicleLocationTestDeps {
    type Context = ();
    type Transaction = MockTransaction;
    type VehicleLocationDao = MockVehicleLocationDao;
    type VehicleService = MockVehicleService;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type TransactionDao = MockTransactionDao;
}

impl VehicleLocationServiceDependencies {
    pub fn build_service(self) -> VehicleLocationServiceImpl<VehicleLocationTestDeps> {
        VehicleLocationServiceImpl::new(
            self.vehicle_location_dao.into(),
            self.vehicle_service.into(),
            self.permission_service.into(),
            self.clock_service.into(),
            self.uuid_service.into(),
            self.transaction_dao.into(),
        )
    }
}

pub fn build_dependencies(
    permission: bool,
    privilege: &'static str,
) -> VehicleLocationServiceDependencies {
    let vehicle_location_dao = MockVehicleLocationDao::new();
    let mut vehicle_service = MockVehicleService::new();
    vehicle_service
        .expect_exists()
        .returning(|_, _, _| Ok(true));
    let mut permission_service = MockPermissionService::new();
    permission_service
        .expect_check_permission()
        .with(eq(privilege), eq(().auth()))
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
        .expect_date_time_now()
        .returning(generate_default_datetime);
    let mut uuid_service = MockUuidService::new();
    uuid_service
        .expect_new_uuid()
        .with(eq("vehicle-location-id"))
        .returning(|_| default_id());
    uuid_service
        .expect_new_uuid()
        .with(eq("vehicle-location-version"))
        .returning(|_| default_version());
    let mut transaction_dao = MockTransactionDao::new();
    transaction_dao
        .expect_use_transaction()
        .returning(|_| Ok(MockTransaction));
    transaction_dao.expect_commit().returning(|_| Ok(()));

    VehicleLocationServiceDependencies {
        vehicle_location_dao,
        vehicle_service,
        permission_service,
        clock_service,
        uuid_service,
        transaction_dao,
    }
}

#[tokio::test]
async fn test_report_location() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_location_dao
        .expect_create()
        .with(
            eq(generate_default_location_entity()),
            eq("vehicle-location-service"),
            eq(MockTransaction),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    let location_service = dependencies.build_service();
    let result = location_service
        .report(
            &VehicleLocation {
                id: Uuid::nil(),
                version: Uuid::nil(),
                created: None,
                ..generate_default_location()
            },
            ().auth(),
            None,
        )
        .await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), generate_default_location());
}

#[tokio::test]
async fn test_report_location_no_permission() {
    let dependencies = build_dependencies(true, "renter");
    let location_service = dependencies.build_service();
    let result = location_service
        .report(&generate_default_location(), ().auth(), None)
        .await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_report_location_non_zero_id() {
    let dependencies = build_dependencies(true, "fleet");
    let location_service = dependencies.build_service();
    let result = location_service
        .report(
            &VehicleLocation {
                version: Uuid::nil(),
                created: None,
                ..generate_default_location()
            },
            ().auth(),
            None,
        )
        .await;
    test_zero_id_error(&result);
}

#[tokio::test]
async fn test_report_location_non_zero_version() {
    let dependencies = build_dependencies(true, "fleet");
    let location_service = dependencies.build_service();
    let result = location_service
        .report(
            &VehicleLocation {
                id: Uuid::nil(),
                created: None,
                ..generate_default_location()
            },
            ().auth(),
            None,
        )
        .await;
    test_zero_version_error(&result);
}

#[tokio::test]
async fn test_report_location_unknown_vehicle() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies.vehicle_service.checkpoint();
    dependencies
        .vehicle_service
        .expect_exists()
        .returning(|_, _, _| Ok(false));
    let location_service = dependencies.build_service();
    let result = location_service
        .report(
            &VehicleLocation {
                id: Uuid::nil(),
                version: Uuid::nil(),
                created: None,
                ..generate_default_location()
            },
            ().auth(),
            None,
        )
        .await;
    test_not_found(&result, &default_vehicle_id());
}

#[tokio::test]
async fn test_report_location_out_of_bounds() {
    let dependencies = build_dependencies(true, "fleet");
    let location_service = dependencies.build_service();
    let result = location_service
        .report(
            &VehicleLocation {
                id: Uuid::nil(),
                version: Uuid::nil(),
                created: None,
                latitude: 91.0,
                ..generate_default_location()
            },
            ().auth(),
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("latitude".into()),
        1,
    );
}

#[tokio::test]
async fn test_latest_for_vehicle() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies
        .vehicle_location_dao
        .expect_find_latest_by_vehicle_id()
        .with(eq(default_vehicle_id()), eq(MockTransaction))
        .returning(|_, _| Ok(Some(generate_default_location_entity())));
    let location_service = dependencies.build_service();
    let result = location_service
        .latest_for_vehicle(default_vehicle_id(), ().auth(), None)
        .await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), Some(generate_default_location()));
}

#[tokio::test]
async fn test_latest_for_vehicle_without_pings() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies
        .vehicle_location_dao
        .expect_find_latest_by_vehicle_id()
        .returning(|_, _| Ok(None));
    let location_service = dependencies.build_service();
    let result = location_service
        .latest_for_vehicle(default_vehicle_id(), ().auth(), None)
        .await;
    assert!(result.is_ok());
    assert!(result.unwrap().is_none());
}
