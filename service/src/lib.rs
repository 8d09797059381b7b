use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod availability;
pub mod booking;
pub mod clock;
pub mod permission;
pub mod user_service;
pub mod uuid_service;
pub mod vehicle;
pub mod vehicle_location;

pub use permission::{Authentication, MockContext, MockPermissionService, PermissionService};
pub use user_service::UserService;

use booking::BookingStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailureItem {
    InvalidValue(Arc<str>),
    ModificationNotAllowed(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("No entity with slug {0}")]
    SlugNotFound(Arc<str>),

    #[error("Entity {0} already exists")]
    EntityAlreadyExists(Uuid),

    #[error("Entity {0} conflicts, expected version {1} but got {2}")]
    EntityConflicts(Uuid, Uuid, Uuid),

    #[error("Validation failed: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("Id must not be set on create")]
    IdSetOnCreate,

    #[error("Version must not be set on create")]
    VersionSetOnCreate,

    #[error("Created timestamp must not be set on create")]
    CreatedSetOnCreate,

    #[error("Deleted timestamp must not be set on create")]
    DeletedSetOnCreate,

    #[error("Date range overlaps a blocking booking")]
    OverlappingDateRange,

    #[error("Date range must end after it starts, got {0} to {1}")]
    DateOrderWrong(time::Date, time::Date),

    #[error("Booking status cannot change from {0} to {1}")]
    InvalidStatusTransition(BookingStatus, BookingStatus),

    #[error("Internal error")]
    InternalError,
}
