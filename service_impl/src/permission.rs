use crate::gen_service_impl;
use std::sync::Arc;

use async_trait::async_trait;
use dao::{PermissionDao, TransactionDao};
use service::permission::{Authentication, Privilege, Role, User, ADMIN_PRIVILEGE};
use service::{PermissionService, ServiceError, UserService};

const PERMISSION_SERVICE_PROCESS: &str = "permission-service";

gen_service_impl! {
    struct PermissionServiceImpl: PermissionService = PermissionServiceDeps {
        PermissionDao: PermissionDao<Transaction = Self::Transaction> = permission_dao,
        UserService: UserService<Context = Self::Context> = user_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao,
    }
}

#[async_trait]
impl<Deps: PermissionServiceDeps> PermissionService for PermissionServiceImpl<Deps> {
    type Context = Deps::Context;

    async fn check_permission(
        &self,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        let context = match context {
            Authentication::Full => return Ok(()),
            Authentication::Context(context) => context,
        };
        let current_user = self
            .user_service
            .current_user(Authentication::Context(context))
            .await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        let has_privilege = self
            .permission_dao
            .has_privilege(current_user.as_ref(), privilege, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        if has_privilege {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    async fn create_user(
        &self,
        user: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .create_user(
                &dao::UserEntity { name: user.into() },
                PERMISSION_SERVICE_PROCESS,
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn user_exists(
        &self,
        user: &str,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        let found = self.permission_dao.find_user(user, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(found.is_some())
    }

    async fn delete_user(
        &self,
        user: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao.delete_user(user, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn get_all_users(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[User]>, ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        let users = self
            .permission_dao
            .all_users(tx.clone())
            .await?
            .iter()
            .map(User::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(users)
    }

    async fn create_role(
        &self,
        role: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .create_role(
                &dao::RoleEntity { name: role.into() },
                PERMISSION_SERVICE_PROCESS,
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn delete_role(
        &self,
        role: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao.delete_role(role, tx.clone()).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn get_all_roles(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Role]>, ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        let roles = self
            .permission_dao
            .all_roles(tx.clone())
            .await?
            .iter()
            .map(Role::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(roles)
    }

    async fn create_privilege(
        &self,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .create_privilege(
                &dao::PrivilegeEntity {
                    name: privilege.into(),
                },
                PERMISSION_SERVICE_PROCESS,
                tx.clone(),
            )
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn delete_privilege(
        &self,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .delete_privilege(privilege, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn get_all_privileges(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Privilege]>, ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        let privileges = self
            .permission_dao
            .all_privileges(tx.clone())
            .await?
            .iter()
            .map(Privilege::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(privileges)
    }

    async fn add_user_role(
        &self,
        user: &str,
        role: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .add_user_role(user, role, PERMISSION_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn delete_user_role(
        &self,
        user: &str,
        role: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .delete_user_role(user, role, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn add_role_privilege(
        &self,
        role: &str,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .add_role_privilege(role, privilege, PERMISSION_SERVICE_PROCESS, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn delete_role_privilege(
        &self,
        role: &str,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.check_permission(ADMIN_PRIVILEGE, context).await?;
        let tx = self.transaction_dao.use_transaction(None).await?;
        self.permission_dao
            .delete_role_privilege(role, privilege, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(())
    }

    async fn privileges_for_current_user(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Privilege]>, ServiceError> {
        let current_user = match context {
            Authentication::Full => return Ok(Arc::new([])),
            Authentication::Context(context) => {
                self.user_service
                    .current_user(Authentication::Context(context))
                    .await?
            }
        };
        let tx = self.transaction_dao.use_transaction(None).await?;
        let privileges = self
            .permission_dao
            .privileges_for_user(current_user.as_ref(), tx.clone())
            .await?
            .iter()
            .map(Privilege::from)
            .collect();
        self.transaction_dao.commit(tx).await?;
        Ok(privileges)
    }
}
