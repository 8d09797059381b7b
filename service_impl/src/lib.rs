use std::sync::Arc;

use async_trait::async_trait;
use service::permission::{Authentication, MockContext};
use service::ServiceError;

pub mod availability;
pub mod booking;
pub mod clock;
pub mod macros;
pub mod permission;
pub mod uuid_service;
pub mod vehicle;
pub mod vehicle_location;

mod test;

/// Always authenticates as DEVUSER. Stands in for a real login service during
/// development; the dev bootstrap grants DEVUSER the admin role.
pub struct UserServiceDev;

#[async_trait]
impl service::UserService for UserServiceDev {
    type Context = MockContext;

    async fn current_user(
        &self,
        _context: Authentication<MockContext>,
    ) -> Result<Arc<str>, ServiceError> {
        Ok("DEVUSER".into())
    }
}
