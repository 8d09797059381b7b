use crate::gen_service_impl;

use async_trait::async_trait;
use dao::{vehicle_location::VehicleLocationDao, TransactionDao};
use service::{
    clock::ClockService,
    permission::{Authentication, FLEET_PRIVILEGE, RENTER_PRIVILEGE},
    uuid_service::UuidService,
    vehicle::VehicleService,
    vehicle_location::{VehicleLocation, VehicleLocationService},
    PermissionService, ServiceError, ValidationFailureItem,
};
use tokio::join;
use uuid::Uuid;

const VEHICLE_LOCATION_SERVICE_PROCESS: &str = "vehicle-location-service";

gen_service_impl! {
    struct VehicleLocationServiceImpl: VehicleLocationService = VehicleLocationServiceDeps {
        VehicleLocationDao: VehicleLocationDao<Transaction = Self::Transaction> = vehicle_location_dao,
        VehicleService: VehicleService<Transaction = Self::Transaction, Context = Self::Context> = vehicle_service,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: VehicleLocationServiceDeps> VehicleLocationService
    for VehicleLocationServiceImpl<Deps>
{
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn report(
        &self,
        location: &VehicleLocation,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<VehicleLocation, ServiceError> {
        self.permission_service
            .check_permission(FLEET_PRIVILEGE, context)
            .await?;

        if location.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if location.version != Uuid::nil() {
            return Err(ServiceError::VersionSetOnCreate);
        }
        if location.created.is_some() {
            return Err(ServiceError::CreatedSetOnCreate);
        }

        let mut validation = Vec::new();
        if !(-90.0..=90.0).contains(&location.latitude) {
            validation.push(ValidationFailureItem::InvalidValue("latitude".into()));
        }
        if !(-180.0..=180.0).contains(&location.longitude) {
            validation.push(ValidationFailureItem::InvalidValue("longitude".into()));
        }
        if !validation.is_empty() {
            return Err(ServiceError::ValidationError(validation.into()));
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        if !self
            .vehicle_service
            .exists(location.vehicle_id, Authentication::Full, Some(tx.clone()))
            .await?
        {
            return Err(ServiceError::EntityNotFound(location.vehicle_id));
        }

        let location = VehicleLocation {
            id: self.uuid_service.new_uuid("vehicle-location-id"),
            version: self.uuid_service.new_uuid("vehicle-location-version"),
            created: Some(self.clock_service.date_time_now()),
            ..location.clone()
        };
        self.vehicle_location_dao
            .create(
                &(&location).try_into()?,
                VEHICLE_LOCATION_SERVICE_PROCESS,
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(location)
    }

    async fn latest_for_vehicle(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Option<VehicleLocation>, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let location = self
            .vehicle_location_dao
            .find_latest_by_vehicle_id(vehicle_id, tx.clone())
            .await?
            .as_ref()
            .map(VehicleLocation::from);
        self.transaction_dao.commit(tx).await?;
        Ok(location)
    }
}
