use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserTO {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleTO {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrivilegeTO {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRoleTO {
    pub user: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RolePrivilegeTO {
    pub role: String,
    pub privilege: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VehicleTO {
    #[serde(default)]
    pub id: Uuid,
    pub name: Arc<str>,
    pub slug: Arc<str>,
    pub price_per_day_cents: i64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub created: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub deleted: Option<PrimitiveDateTime>,
    #[serde(rename = "$version")]
    #[serde(default)]
    pub version: Uuid,
}

fn default_available() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatusTO {
    Pending,
    Confirmed,
    Active,
    Completed,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct BookingTO {
    #[serde(default)]
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub renter: Arc<str>,
    pub start_date: Date,
    pub end_date: Date,
    pub status: BookingStatusTO,
    #[serde(default)]
    pub created: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub deleted: Option<PrimitiveDateTime>,
    #[serde(rename = "$version")]
    #[serde(default)]
    pub version: Uuid,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct RescheduleBookingTO {
    pub start_date: Date,
    pub end_date: Date,
    #[serde(rename = "$version")]
    pub version: Uuid,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct BookingStatusUpdateTO {
    pub status: BookingStatusTO,
    #[serde(rename = "$version")]
    pub version: Uuid,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookedRangeTO {
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VehicleAvailabilityTO {
    #[serde(flatten)]
    pub vehicle: VehicleTO,
    pub available_in_range: bool,
    pub available_today: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VehicleDetailTO {
    #[serde(flatten)]
    pub vehicle: VehicleTO,
    pub available_today: bool,
    pub booked_dates: Vec<BookedRangeTO>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VehicleLocationTO {
    #[serde(default)]
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded: PrimitiveDateTime,
    #[serde(default)]
    pub created: Option<PrimitiveDateTime>,
    #[serde(rename = "$version")]
    #[serde(default)]
    pub version: Uuid,
}

#[cfg(feature = "service-impl")]
mod conversions {
    use super::*;
    use fleetly_utils::derive_from_reference;
    use service::availability::{BookedRange, VehicleAvailability, VehicleDetail};
    use service::booking::{Booking, BookingStatus};
    use service::permission::{Privilege, Role, User};
    use service::vehicle::Vehicle;
    use service::vehicle_location::VehicleLocation;

    impl From<&User> for UserTO {
        fn from(user: &User) -> Self {
            Self {
                name: user.name.to_string(),
            }
        }
    }

    impl From<&Role> for RoleTO {
        fn from(role: &Role) -> Self {
            Self {
                name: role.name.to_string(),
            }
        }
    }

    impl From<&Privilege> for PrivilegeTO {
        fn from(privilege: &Privilege) -> Self {
            Self {
                name: privilege.name.to_string(),
            }
        }
    }

    impl From<&Vehicle> for VehicleTO {
        fn from(vehicle: &Vehicle) -> Self {
            Self {
                id: vehicle.id,
                name: vehicle.name.clone(),
                slug: vehicle.slug.clone(),
                price_per_day_cents: vehicle.price_per_day_cents,
                available: vehicle.available,
                created: vehicle.created,
                deleted: vehicle.deleted,
                version: vehicle.version,
            }
        }
    }
    impl From<&VehicleTO> for Vehicle {
        fn from(vehicle: &VehicleTO) -> Self {
            Self {
                id: vehicle.id,
                name: vehicle.name.clone(),
                slug: vehicle.slug.clone(),
                price_per_day_cents: vehicle.price_per_day_cents,
                available: vehicle.available,
                created: vehicle.created,
                deleted: vehicle.deleted,
                version: vehicle.version,
            }
        }
    }
    derive_from_reference!(Vehicle, VehicleTO);

    impl From<&BookingStatus> for BookingStatusTO {
        fn from(status: &BookingStatus) -> Self {
            match status {
                BookingStatus::Pending => Self::Pending,
                BookingStatus::Confirmed => Self::Confirmed,
                BookingStatus::Active => Self::Active,
                BookingStatus::Completed => Self::Completed,
                BookingStatus::Cancelled => Self::Cancelled,
            }
        }
    }
    impl From<&BookingStatusTO> for BookingStatus {
        fn from(status: &BookingStatusTO) -> Self {
            match status {
                BookingStatusTO::Pending => Self::Pending,
                BookingStatusTO::Confirmed => Self::Confirmed,
                BookingStatusTO::Active => Self::Active,
                BookingStatusTO::Completed => Self::Completed,
                BookingStatusTO::Cancelled => Self::Cancelled,
            }
        }
    }

    impl From<&Booking> for BookingTO {
        fn from(booking: &Booking) -> Self {
            Self {
                id: booking.id,
                vehicle_id: booking.vehicle_id,
                renter: booking.renter.clone(),
                start_date: booking.start_date,
                end_date: booking.end_date,
                status: (&booking.status).into(),
                created: booking.created,
                deleted: booking.deleted,
                version: booking.version,
            }
        }
    }
    impl From<&BookingTO> for Booking {
        fn from(booking: &BookingTO) -> Self {
            Self {
                id: booking.id,
                vehicle_id: booking.vehicle_id,
                renter: booking.renter.clone(),
                start_date: booking.start_date,
                end_date: booking.end_date,
                status: (&booking.status).into(),
                created: booking.created,
                deleted: booking.deleted,
                version: booking.version,
            }
        }
    }
    derive_from_reference!(Booking, BookingTO);

    impl From<&BookedRange> for BookedRangeTO {
        fn from(range: &BookedRange) -> Self {
            Self {
                start_date: range.start_date,
                end_date: range.end_date,
            }
        }
    }

    impl From<&VehicleAvailability> for VehicleAvailabilityTO {
        fn from(availability: &VehicleAvailability) -> Self {
            Self {
                vehicle: VehicleTO::from(&availability.vehicle),
                available_in_range: availability.available_in_range,
                available_today: availability.available_today,
            }
        }
    }

    impl From<&VehicleDetail> for VehicleDetailTO {
        fn from(detail: &VehicleDetail) -> Self {
            Self {
                vehicle: VehicleTO::from(&detail.vehicle),
                available_today: detail.available_today,
                booked_dates: detail.booked_ranges.iter().map(BookedRangeTO::from).collect(),
            }
        }
    }

    impl From<&VehicleLocation> for VehicleLocationTO {
        fn from(location: &VehicleLocation) -> Self {
            Self {
                id: location.id,
                vehicle_id: location.vehicle_id,
                latitude: location.latitude,
                longitude: location.longitude,
                recorded: location.recorded,
                created: location.created,
                version: location.version,
            }
        }
    }
    impl From<&VehicleLocationTO> for VehicleLocation {
        fn from(location: &VehicleLocationTO) -> Self {
            Self {
                id: location.id,
                vehicle_id: location.vehicle_id,
                latitude: location.latitude,
                longitude: location.longitude,
                recorded: location.recorded,
                created: location.created,
                version: location.version,
            }
        }
    }
}
