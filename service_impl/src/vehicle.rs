use crate::gen_service_impl;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{vehicle::VehicleDao, TransactionDao};
use service::{
    clock::ClockService,
    permission::{Authentication, FLEET_PRIVILEGE, RENTER_PRIVILEGE},
    uuid_service::UuidService,
    vehicle::{Vehicle, VehicleService},
    PermissionService, ServiceError, ValidationFailureItem,
};
use tokio::join;
use uuid::Uuid;

const VEHICLE_SERVICE_PROCESS: &str = "vehicle-service";

gen_service_impl! {
    struct VehicleServiceImpl: VehicleService = VehicleServiceDeps {
        VehicleDao: VehicleDao<Transaction = Self::Transaction> = vehicle_dao,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: VehicleServiceDeps> VehicleService for VehicleServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Vehicle]>, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicles = self
            .vehicle_dao
            .all(tx.clone())
            .await?
            .iter()
            .map(Vehicle::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(vehicles)
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicle = self
            .vehicle_dao
            .find_by_id(id, tx.clone())
            .await?
            .as_ref()
            .map(Vehicle::from)
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok(vehicle)
    }

    async fn get_by_slug(
        &self,
        slug: &str,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let vehicle = self
            .vehicle_dao
            .find_by_slug(slug, tx.clone())
            .await?
            .as_ref()
            .map(Vehicle::from)
            .ok_or_else(|| ServiceError::SlugNotFound(slug.into()))?;
        self.transaction_dao.commit(tx).await?;
        Ok(vehicle)
    }

    async fn exists(
        &self,
        id: Uuid,
        _context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<bool, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let found = self.vehicle_dao.find_by_id(id, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(found.is_some())
    }

    async fn create(
        &self,
        vehicle: &Vehicle,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError> {
        self.permission_service
            .check_permission(FLEET_PRIVILEGE, context)
            .await?;

        if vehicle.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if vehicle.version != Uuid::nil() {
            return Err(ServiceError::VersionSetOnCreate);
        }
        if vehicle.created.is_some() {
            return Err(ServiceError::CreatedSetOnCreate);
        }
        if vehicle.deleted.is_some() {
            return Err(ServiceError::DeletedSetOnCreate);
        }

        let mut validation = Vec::new();
        if vehicle.name.is_empty() {
            validation.push(ValidationFailureItem::InvalidValue("name".into()));
        }
        if vehicle.slug.is_empty() {
            validation.push(ValidationFailureItem::InvalidValue("slug".into()));
        }
        if vehicle.price_per_day_cents <= 0 {
            validation.push(ValidationFailureItem::InvalidValue(
                "price_per_day_cents".into(),
            ));
        }
        if !validation.is_empty() {
            return Err(ServiceError::ValidationError(validation.into()));
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        if let Some(existing) = self
            .vehicle_dao
            .find_by_slug(vehicle.slug.as_ref(), tx.clone())
            .await?
        {
            return Err(ServiceError::EntityAlreadyExists(existing.id));
        }

        let vehicle = Vehicle {
            id: self.uuid_service.new_uuid("vehicle-id"),
            version: self.uuid_service.new_uuid("vehicle-version"),
            created: Some(self.clock_service.date_time_now()),
            ..vehicle.clone()
        };
        self.vehicle_dao
            .create(&(&vehicle).try_into()?, VEHICLE_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(vehicle)
    }

    async fn update(
        &self,
        vehicle: &Vehicle,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Vehicle, ServiceError> {
        self.permission_service
            .check_permission(FLEET_PRIVILEGE, context)
            .await?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let persisted = self
            .vehicle_dao
            .find_by_id(vehicle.id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(vehicle.id))?;
        if persisted.version != vehicle.version {
            return Err(ServiceError::EntityConflicts(
                vehicle.id,
                persisted.version,
                vehicle.version,
            ));
        }

        let mut validation = Vec::new();
        if persisted.slug != vehicle.slug {
            validation.push(ValidationFailureItem::ModificationNotAllowed("slug".into()));
        }
        if vehicle.created != Some(persisted.created) {
            validation.push(ValidationFailureItem::ModificationNotAllowed(
                "created".into(),
            ));
        }
        if vehicle.name.is_empty() {
            validation.push(ValidationFailureItem::InvalidValue("name".into()));
        }
        if vehicle.price_per_day_cents <= 0 {
            validation.push(ValidationFailureItem::InvalidValue(
                "price_per_day_cents".into(),
            ));
        }
        if !validation.is_empty() {
            return Err(ServiceError::ValidationError(validation.into()));
        }

        let vehicle = Vehicle {
            version: self.uuid_service.new_uuid("vehicle-version"),
            ..vehicle.clone()
        };
        self.vehicle_dao
            .update(&(&vehicle).try_into()?, VEHICLE_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(vehicle)
    }

    async fn delete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_permission(FLEET_PRIVILEGE, context)
            .await?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .vehicle_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        entity.deleted = Some(self.clock_service.date_time_now());
        entity.version = self.uuid_service.new_uuid("vehicle-version");
        self.vehicle_dao
            .update(&entity, VEHICLE_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }
}
