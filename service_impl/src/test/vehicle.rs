use std::sync::Arc;

use crate::test::error_test::*;
use crate::vehicle::*;
use dao::vehicle::{MockVehicleDao, VehicleEntity};
use dao::{MockTransaction, MockTransactionDao};
use mockall::predicate::eq;
use service::{
    clock::MockClockService,
    uuid_service::MockUuidService,
    vehicle::{Vehicle, VehicleService},
    MockPermissionService, ValidationFailureItem,
};
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::{uuid, Uuid};

pub fn default_id() -> Uuid {
    uuid!("7A3D95D0-1C92-4A42-8E4E-9E7E2E7B9A21")
}
pub fn default_version() -> Uuid {
    uuid!("C56C3F0B-9E36-4F9A-93E6-5B7BBE0F8B6D")
}
pub fn default_changed_version() -> Uuid {
    uuid!("0F2C9A64-42E3-4BD2-9D2E-0F4C4B6A1E77")
}

pub fn generate_default_vehicle() -> Vehicle {
    Vehicle {
        id: default_id(),
        name: "Bulli T2".into(),
        slug: "bulli-t2".into(),
        price_per_day_cents: 10_000,
        available: true,
        created: Some(generate_default_datetime()),
        deleted: None,
        version: default_version(),
    }
}

pub fn generate_default_vehicle_entity() -> VehicleEntity {
    VehicleEntity {
        id: default_id(),
        name: "Bulli T2".into(),
        slug: "bulli-t2".into(),
        price_per_day_cents: 10_000,
        available: true,
        created: generate_default_datetime(),
        deleted: None,
        version: default_version(),
    }
}

pub struct VehicleServiceDependencies {
    pub vehicle_dao: MockVehicleDao,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub transaction_dao: MockTransactionDao,
}

pub struct VehicleTestDeps;
impl VehicleServiceDeps for VehicleTestDeps {
    type Context = ();
    type Transaction = MockTransaction;
    type VehicleDao = MockVehicleDao;
    type PermissionService = MockPermissionService;
    type ClockService = MockClockService;
    type UuidService = MockUuidService;
    type TransactionDao = MockTransactionDao;
}

impl VehicleServiceDependencies {
    pub fn build_service(self) -> VehicleServiceImpl<VehicleTestDeps> {
        VehicleServiceImpl::new(
            self.vehicle_dao.into(),
            self.permission_service.into(),
            self.clock_service.into(),
            self.uuid_service.into(),
            self.transaction_dao.into(),
        )
    }
}

pub fn build_dependencies(permission: bool, privilege: &'static str) -> VehicleServiceDependencies {
    let vehicle_dao = MockVehicleDao::new();
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
        .with(eq("vehicle-id"))
        .returning(|_| default_id());
    uuid_service
        .expect_new_uuid()
        .with(eq("vehicle-version"))
        .returning(|_| default_changed_version());
    let mut transaction_dao = MockTransactionDao::new();
    transaction_dao
        .expect_use_transaction()
        .returning(|_| Ok(MockTransaction));
    transaction_dao.expect_commit().returning(|_| Ok(()));

    VehicleServiceDependencies {
        vehicle_dao,
        permission_service,
        clock_service,
        uuid_service,
        transaction_dao,
    }
}

#[tokio::test]
async fn test_get_all_vehicles() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies.vehicle_dao.expect_all().returning(|_| {
        Ok(Arc::new([
            generate_default_vehicle_entity(),
            VehicleEntity {
                id: uuid!("019526F3-0A68-4E3B-89B3-52C7E0A0B2F4"),
                slug: "ducato-maxi".into(),
                ..generate_default_vehicle_entity()
            },
        ]))
    });
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.get_all(().auth(), None).await;
    assert!(result.is_ok());
    let result = result.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0], generate_default_vehicle());
}

#[tokio::test]
async fn test_get_all_vehicles_fleet_role() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_all()
        .returning(|_| Ok(Arc::new([])));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.get_all(().auth(), None).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_get_all_vehicles_no_permission() {
    let dependencies = build_dependencies(false, "renter");
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.get_all(().auth(), None).await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_get_vehicle() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .with(eq(default_id()), eq(MockTransaction))
        .times(1)
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.get(default_id(), ().auth(), None).await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), generate_default_vehicle());
}

#[tokio::test]
async fn test_get_vehicle_not_found() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.get(default_id(), ().auth(), None).await;
    test_not_found(&result, &default_id());
}

#[tokio::test]
async fn test_get_vehicle_by_slug() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies
        .vehicle_dao
        .expect_find_by_slug()
        .withf(|slug, _| slug == "bulli-t2")
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .get_by_slug("bulli-t2", ().auth(), None)
        .await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), generate_default_vehicle());
}

#[tokio::test]
async fn test_get_vehicle_by_slug_not_found() {
    let mut dependencies = build_dependencies(true, "renter");
    dependencies
        .vehicle_dao
        .expect_find_by_slug()
        .returning(|_, _| Ok(None));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .get_by_slug("no-such-van", ().auth(), None)
        .await;
    if let Err(service::ServiceError::SlugNotFound(slug)) = result {
        assert_eq!(slug.as_ref(), "no-such-van");
    } else {
        panic!("Expected slug not found error");
    }
}

#[tokio::test]
async fn test_create_vehicle() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_slug()
        .returning(|_, _| Ok(None));
    dependencies
        .vehicle_dao
        .expect_create()
        .with(
            eq(VehicleEntity {
                version: default_changed_version(),
                ..generate_default_vehicle_entity()
            }),
            eq("vehicle-service"),
            eq(MockTransaction),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .create(
            &Vehicle {
                id: Uuid::nil(),
                version: Uuid::nil(),
                created: None,
                ..generate_default_vehicle()
            },
            ().auth(),
            None,
        )
        .await;
    assert!(result.is_ok());
    assert_eq!(
        result.unwrap(),
        Vehicle {
            version: default_changed_version(),
            ..generate_default_vehicle()
        }
    );
}

#[tokio::test]
async fn test_create_vehicle_no_permission() {
    let dependencies = build_dependencies(true, "renter");
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .create(&generate_default_vehicle(), ().auth(), None)
        .await;
    test_forbidden(&result);
}

#[tokio::test]
async fn test_create_vehicle_duplicate_slug() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_slug()
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .create(
            &Vehicle {
                id: Uuid::nil(),
                version: Uuid::nil(),
                created: None,
                ..generate_default_vehicle()
            },
            ().auth(),
            None,
        )
        .await;
    if let Err(service::ServiceError::EntityAlreadyExists(id)) = result {
        assert_eq!(id, default_id());
    } else {
        panic!("Expected entity already exists error");
    }
}

#[tokio::test]
async fn test_create_vehicle_invalid_price() {
    let dependencies = build_dependencies(true, "fleet");
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .create(
            &Vehicle {
                id: Uuid::nil(),
                version: Uuid::nil(),
                created: None,
                price_per_day_cents: 0,
                ..generate_default_vehicle()
            },
            ().auth(),
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("price_per_day_cents".into()),
        1,
    );
}

#[tokio::test]
async fn test_update_vehicle() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .with(eq(default_id()), eq(MockTransaction))
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    dependencies
        .vehicle_dao
        .expect_update()
        .with(
            eq(VehicleEntity {
                available: false,
                price_per_day_cents: 12_000,
                version: default_changed_version(),
                ..generate_default_vehicle_entity()
            }),
            eq("vehicle-service"),
            eq(MockTransaction),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .update(
            &Vehicle {
                available: false,
                price_per_day_cents: 12_000,
                ..generate_default_vehicle()
            },
            ().auth(),
            None,
        )
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_vehicle_version_mismatch() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .update(
            &Vehicle {
                version: default_changed_version(),
                ..generate_default_vehicle()
            },
            ().auth(),
            None,
        )
        .await;
    test_conflicts(
        &result,
        &default_id(),
        &default_version(),
        &default_changed_version(),
    );
}

#[tokio::test]
async fn test_update_vehicle_slug_immutable() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service
        .update(
            &Vehicle {
                slug: "bulli-t3".into(),
                ..generate_default_vehicle()
            },
            ().auth(),
            None,
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::ModificationNotAllowed("slug".into()),
        1,
    );
}

#[tokio::test]
async fn test_delete_vehicle() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .with(eq(default_id()), eq(MockTransaction))
        .returning(|_, _| Ok(Some(generate_default_vehicle_entity())));
    dependencies
        .vehicle_dao
        .expect_update()
        .with(
            eq(VehicleEntity {
                deleted: Some(PrimitiveDateTime::new(
                    Date::from_calendar_date(2063, Month::April, 5).unwrap(),
                    Time::from_hms(23, 42, 0).unwrap(),
                )),
                version: default_changed_version(),
                ..generate_default_vehicle_entity()
            }),
            eq("vehicle-service"),
            eq(MockTransaction),
        )
        .times(1)
        .returning(|_, _, _| Ok(()));

    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.delete(default_id(), ().auth(), None).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_vehicle_not_found() {
    let mut dependencies = build_dependencies(true, "fleet");
    dependencies
        .vehicle_dao
        .expect_find_by_id()
        .returning(|_, _| Ok(None));
    let vehicle_service = dependencies.build_service();
    let result = vehicle_service.delete(default_id(), ().auth(), None).await;
    test_not_found(&result, &default_id());
}
