use crate::gen_service_impl;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{booking::BookingDao, TransactionDao};
use service::{
    booking::{Booking, BookingService, BookingStatus},
    clock::ClockService,
    permission::{Authentication, FLEET_PRIVILEGE, RENTER_PRIVILEGE},
    uuid_service::UuidService,
    vehicle::VehicleService,
    PermissionService, ServiceError, ValidationFailureItem,
};
use time::Date;
use tokio::join;
use uuid::Uuid;

const BOOKING_SERVICE_PROCESS: &str = "booking-service";

gen_service_impl! {
    struct BookingServiceImpl: BookingService = BookingServiceDeps {
        BookingDao: BookingDao<Transaction = Self::Transaction> = booking_dao,
        VehicleService: VehicleService<Transaction = Self::Transaction, Context = Self::Context> = vehicle_service,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: BookingServiceDeps> BookingService for BookingServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        self.permission_service
            .check_permission(FLEET_PRIVILEGE, context)
            .await?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .all(tx.clone())
            .await?
            .iter()
            .map(Booking::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(bookings)
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = self
            .booking_dao
            .find_by_id(id, tx.clone())
            .await?
            .as_ref()
            .map(Booking::from)
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.transaction_dao.commit(tx).await?;
        Ok(booking)
    }

    async fn get_for_vehicle(
        &self,
        vehicle_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .find_by_vehicle_id(vehicle_id, tx.clone())
            .await?
            .iter()
            .map(Booking::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(bookings)
    }

    async fn create(
        &self,
        booking: &Booking,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(RENTER_PRIVILEGE, context)
            .await?;

        if booking.id != Uuid::nil() {
            return Err(ServiceError::IdSetOnCreate);
        }
        if booking.version != Uuid::nil() {
            return Err(ServiceError::VersionSetOnCreate);
        }
        if booking.created.is_some() {
            return Err(ServiceError::CreatedSetOnCreate);
        }
        if booking.deleted.is_some() {
            return Err(ServiceError::DeletedSetOnCreate);
        }
        if booking.end_date <= booking.start_date {
            return Err(ServiceError::DateOrderWrong(
                booking.start_date,
                booking.end_date,
            ));
        }

        let mut validation = Vec::new();
        if booking.vehicle_id == Uuid::nil() {
            validation.push(ValidationFailureItem::InvalidValue("vehicle_id".into()));
        }
        if booking.renter.is_empty() {
            validation.push(ValidationFailureItem::InvalidValue("renter".into()));
        }
        // A booking enters the system as a marketplace request or as a direct
        // rent-out; the later states are reached through set_status.
        if !matches!(
            booking.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ) {
            validation.push(ValidationFailureItem::InvalidValue("status".into()));
        }
        if !validation.is_empty() {
            return Err(ServiceError::ValidationError(validation.into()));
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        if !self
            .vehicle_service
            .exists(booking.vehicle_id, Authentication::Full, Some(tx.clone()))
            .await?
        {
            return Err(ServiceError::EntityNotFound(booking.vehicle_id));
        }

        let booking = Booking {
            id: self.uuid_service.new_uuid("booking-id"),
            version: self.uuid_service.new_uuid("booking-version"),
            created: Some(self.clock_service.date_time_now()),
            ..booking.clone()
        };
        let written = self
            .booking_dao
            .create_unless_blocked(&(&booking).try_into()?, BOOKING_SERVICE_PROCESS, tx.clone())
            .await?;
        if !written {
            return Err(ServiceError::OverlappingDateRange);
        }
        self.transaction_dao.commit(tx).await?;
        Ok(booking)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        start_date: Date,
        end_date: Date,
        version: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let (renter_permission, fleet_permission) = join!(
            self.permission_service
                .check_permission(RENTER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context),
        );
        renter_permission.or(fleet_permission)?;

        if end_date <= start_date {
            return Err(ServiceError::DateOrderWrong(start_date, end_date));
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .booking_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.version != version {
            return Err(ServiceError::EntityConflicts(id, entity.version, version));
        }
        let status: BookingStatus = entity.status.into();
        if status.is_terminal() {
            return Err(ServiceError::ValidationError(
                [
                    ValidationFailureItem::ModificationNotAllowed("start_date".into()),
                    ValidationFailureItem::ModificationNotAllowed("end_date".into()),
                ]
                .into(),
            ));
        }

        entity.start_date = start_date;
        entity.end_date = end_date;
        entity.version = self.uuid_service.new_uuid("booking-version");
        if status.is_blocking() {
            let written = self
                .booking_dao
                .update_unless_blocked(&entity, BOOKING_SERVICE_PROCESS, tx.clone())
                .await?;
            if !written {
                return Err(ServiceError::OverlappingDateRange);
            }
        } else {
            self.booking_dao
                .update(&entity, BOOKING_SERVICE_PROCESS, tx.clone())
                .await?;
        }
        self.transaction_dao.commit(tx).await?;
        Ok(Booking::from(&entity))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        version: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        // Renters may cancel their own requests; everything else is a fleet
        // operation.
        if status == BookingStatus::Cancelled {
            let (renter_permission, fleet_permission) = join!(
                self.permission_service
                    .check_permission(RENTER_PRIVILEGE, context.clone()),
                self.permission_service
                    .check_permission(FLEET_PRIVILEGE, context),
            );
            renter_permission.or(fleet_permission)?;
        } else {
            self.permission_service
                .check_permission(FLEET_PRIVILEGE, context)
                .await?;
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let mut entity = self
            .booking_dao
            .find_by_id(id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.version != version {
            return Err(ServiceError::EntityConflicts(id, entity.version, version));
        }

        let current: BookingStatus = entity.status.into();
        if !current.may_transition_to(status) {
            return Err(ServiceError::InvalidStatusTransition(current, status));
        }

        entity.status = status.into();
        entity.version = self.uuid_service.new_uuid("booking-version");
        if status.is_blocking() && !current.is_blocking() {
            // The booking starts reserving the vehicle with this transition,
            // so the overlap guard runs again. Two pending requests for the
            // same span may coexist; only one of them can be confirmed.
            let written = self
                .booking_dao
                .update_unless_blocked(&entity, BOOKING_SERVICE_PROCESS, tx.clone())
                .await?;
            if !written {
                return Err(ServiceError::OverlappingDateRange);
            }
        } else {
            self.booking_dao
                .update(&entity, BOOKING_SERVICE_PROCESS, tx.clone())
                .await?;
        }
        self.transaction_dao.commit(tx).await?;
        Ok(Booking::from(&entity))
    }
}
