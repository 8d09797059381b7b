use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod booking;
pub mod vehicle;
pub mod vehicle_location;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(Box<dyn std::error::Error + Send + Sync>),

    #[error("Invalid timestamp in database: {0}")]
    TimestampParseError(#[from] time::error::Parse),

    #[error("Could not format timestamp: {0}")]
    TimestampFormatError(#[from] time::error::Format),

    #[error("Invalid uuid in database: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Unknown booking status in database: {0}")]
    UnknownBookingStatus(Box<str>),
}

pub trait Transaction {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao {
    type Transaction: Transaction + Clone + Send + Sync + 'static;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError>;
    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;
    async fn commit(&self, tx: Self::Transaction) -> Result<(), DaoError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEntity {
    pub name: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleEntity {
    pub name: Arc<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivilegeEntity {
    pub name: Arc<str>,
}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait PermissionDao {
    type Transaction: Transaction + Clone + Send + Sync + 'static;

    async fn has_privilege(
        &self,
        user: &str,
        privilege: &str,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError>;

    async fn create_user(
        &self,
        user: &UserEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn all_users(&self, tx: Self::Transaction) -> Result<Arc<[UserEntity]>, DaoError>;
    async fn find_user(
        &self,
        username: &str,
        tx: Self::Transaction,
    ) -> Result<Option<UserEntity>, DaoError>;
    async fn delete_user(&self, username: &str, tx: Self::Transaction) -> Result<(), DaoError>;

    async fn create_role(
        &self,
        role: &RoleEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn all_roles(&self, tx: Self::Transaction) -> Result<Arc<[RoleEntity]>, DaoError>;
    async fn delete_role(&self, rolename: &str, tx: Self::Transaction) -> Result<(), DaoError>;

    async fn create_privilege(
        &self,
        privilege: &PrivilegeEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn all_privileges(
        &self,
        tx: Self::Transaction,
    ) -> Result<Arc<[PrivilegeEntity]>, DaoError>;
    async fn delete_privilege(
        &self,
        privilege: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn add_user_role(
        &self,
        user: &str,
        role: &str,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete_user_role(
        &self,
        user: &str,
        role: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn add_role_privilege(
        &self,
        role: &str,
        privilege: &str,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete_role_privilege(
        &self,
        role: &str,
        privilege: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn privileges_for_user(
        &self,
        user: &str,
        tx: Self::Transaction,
    ) -> Result<Arc<[PrivilegeEntity]>, DaoError>;
}
