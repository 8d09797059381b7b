use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, PrivilegeEntity, RoleEntity, Transaction, UserEntity};
use sqlx::SqlitePool;
use tokio::sync::Mutex;

pub mod booking;
pub mod vehicle;
pub mod vehicle_location;

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| DaoError::DatabaseQueryError(Box::new(err)))
    }
}

#[derive(Clone, Debug)]
pub struct TransactionImpl {
    tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}

impl Transaction for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}
#[async_trait]
impl dao::TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(tx.into()),
        })
    }

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        if let Some(tx) = Arc::into_inner(transaction.tx) {
            tx.into_inner().commit().await.map_db_error()?;
        } else {
            // Another service still holds the transaction; the outermost
            // holder commits.
            tracing::trace!("Deferring commit to the outer transaction holder");
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NameDb {
    name: String,
}

pub struct PermissionDaoImpl {
    _pool: Arc<SqlitePool>,
}
impl PermissionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl dao::PermissionDao for PermissionDaoImpl {
    type Transaction = TransactionImpl;

    async fn has_privilege(
        &self,
        user: &str,
        privilege: &str,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError> {
        let count: i64 = sqlx::query_scalar(
            r"SELECT count(*) FROM user
                INNER JOIN user_role ON user.name = user_role.user_name
                INNER JOIN role ON user_role.role_name = role.name
                INNER JOIN role_privilege ON role.name = role_privilege.role_name
                WHERE role_privilege.privilege_name = ? AND user.name = ?",
        )
        .bind(privilege)
        .bind(user)
        .fetch_one(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(count > 0)
    }

    async fn create_user(
        &self,
        user: &UserEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"INSERT INTO user (name, update_process) VALUES (?, ?)")
            .bind(user.name.as_ref())
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn all_users(&self, tx: Self::Transaction) -> Result<Arc<[UserEntity]>, DaoError> {
        Ok(sqlx::query_as::<_, NameDb>(r"SELECT name FROM user")
            .fetch_all(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .iter()
            .map(|row| UserEntity {
                name: row.name.as_str().into(),
            })
            .collect())
    }

    async fn find_user(
        &self,
        username: &str,
        tx: Self::Transaction,
    ) -> Result<Option<UserEntity>, DaoError> {
        Ok(
            sqlx::query_as::<_, NameDb>(r"SELECT name FROM user WHERE name = ?")
                .bind(username)
                .fetch_optional(tx.tx.lock().await.as_mut())
                .await
                .map_db_error()?
                .map(|row| UserEntity {
                    name: row.name.as_str().into(),
                }),
        )
    }

    async fn delete_user(&self, username: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        sqlx::query(r"DELETE FROM user WHERE name = ?")
            .bind(username)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn create_role(
        &self,
        role: &RoleEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"INSERT INTO role (name, update_process) VALUES (?, ?)")
            .bind(role.name.as_ref())
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn all_roles(&self, tx: Self::Transaction) -> Result<Arc<[RoleEntity]>, DaoError> {
        Ok(sqlx::query_as::<_, NameDb>(r"SELECT name FROM role")
            .fetch_all(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .iter()
            .map(|row| RoleEntity {
                name: row.name.as_str().into(),
            })
            .collect())
    }

    async fn delete_role(&self, rolename: &str, tx: Self::Transaction) -> Result<(), DaoError> {
        sqlx::query(r"DELETE FROM role WHERE name = ?")
            .bind(rolename)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn create_privilege(
        &self,
        privilege: &PrivilegeEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"INSERT INTO privilege (name, update_process) VALUES (?, ?)")
            .bind(privilege.name.as_ref())
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn all_privileges(
        &self,
        tx: Self::Transaction,
    ) -> Result<Arc<[PrivilegeEntity]>, DaoError> {
        Ok(sqlx::query_as::<_, NameDb>(r"SELECT name FROM privilege")
            .fetch_all(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .iter()
            .map(|row| PrivilegeEntity {
                name: row.name.as_str().into(),
            })
            .collect())
    }

    async fn delete_privilege(
        &self,
        privilege: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"DELETE FROM privilege WHERE name = ?")
            .bind(privilege)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn add_user_role(
        &self,
        user: &str,
        role: &str,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"INSERT INTO user_role (user_name, role_name, update_process) VALUES (?, ?, ?)")
            .bind(user)
            .bind(role)
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn delete_user_role(
        &self,
        user: &str,
        role: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"DELETE FROM user_role WHERE user_name = ? AND role_name = ?")
            .bind(user)
            .bind(role)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn add_role_privilege(
        &self,
        role: &str,
        privilege: &str,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(
            r"INSERT INTO role_privilege (role_name, privilege_name, update_process) VALUES (?, ?, ?)",
        )
        .bind(role)
        .bind(privilege)
        .bind(process)
        .execute(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?;
        Ok(())
    }

    async fn delete_role_privilege(
        &self,
        role: &str,
        privilege: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        sqlx::query(r"DELETE FROM role_privilege WHERE role_name = ? AND privilege_name = ?")
            .bind(role)
            .bind(privilege)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn privileges_for_user(
        &self,
        user: &str,
        tx: Self::Transaction,
    ) -> Result<Arc<[PrivilegeEntity]>, DaoError> {
        Ok(sqlx::query_as::<_, NameDb>(
            r"SELECT privilege.name as name FROM user
                INNER JOIN user_role ON user.name = user_role.user_name
                INNER JOIN role ON user_role.role_name = role.name
                INNER JOIN role_privilege ON role.name = role_privilege.role_name
                INNER JOIN privilege ON role_privilege.privilege_name = privilege.name
                WHERE user.name = ?",
        )
        .bind(user)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(|row| PrivilegeEntity {
            name: row.name.as_str().into(),
        })
        .collect())
    }
}
