use sea_orm::{
    ActiveValue, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, CreateAccountCmd, EngineError, ResultEngine, Role, UpdateAccountCmd, accounts,
    packages,
};

use super::{Engine, access::require_admin, normalize_email, normalize_required_text, with_tx};

impl Engine {
    /// Turn credentials into a resolved [`Account`].
    ///
    /// The single trust boundary: everything downstream works with the
    /// returned value and never re-derives identity from request data.
    /// Unknown email and wrong password collapse into one answer.
    pub async fn resolve_account(&self, email: &str, password: &str) -> ResultEngine<Account> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = accounts::Entity::find()
                .filter(accounts::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            match model {
                Some(model) if model.password == password => Account::try_from(model),
                _ => Err(EngineError::Unauthenticated(
                    "invalid credentials".to_string(),
                )),
            }
        })
    }

    /// Open signup. New accounts are always customers.
    pub async fn create_account(&self, cmd: CreateAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let email = normalize_email(&cmd.email)?;
        let address = normalize_required_text(&cmd.address, "address")?;
        if cmd.password.is_empty() {
            return Err(EngineError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let account = Account::new(name, email, address, Role::Customer);
        let entry: accounts::ActiveModel = (&account, cmd.password.as_str()).into();
        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::Email.eq(account.email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "email {} already registered",
                    account.email
                )));
            }
            entry.insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// All accounts, for the admin screen.
    pub async fn list_accounts(&self, requester: &Account) -> ResultEngine<Vec<Account>> {
        require_admin(requester)?;
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .order_by_asc(accounts::Column::Email)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }

    /// Update an account.
    ///
    /// The owner may change name/email/address; an admin may change
    /// email/address/role of any account. Role changes by non-admins and
    /// profile-name changes by non-owners are refused.
    pub async fn update_account(
        &self,
        requester: &Account,
        cmd: UpdateAccountCmd,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let target = self.require_account_by_id(&db_tx, cmd.account_id).await?;
            let is_self = target.id == requester.id.to_string();
            if !requester.role.is_admin() && !is_self {
                return Err(EngineError::Forbidden(format!(
                    "account {} belongs to someone else",
                    cmd.account_id
                )));
            }
            if cmd.role.is_some() && !requester.role.is_admin() {
                return Err(EngineError::Forbidden(
                    "only admins may change roles".to_string(),
                ));
            }
            if cmd.name.is_some() && !is_self {
                return Err(EngineError::Forbidden(
                    "only the owner may change the profile name".to_string(),
                ));
            }
            if cmd.name.is_none() && cmd.email.is_none() && cmd.address.is_none() && cmd.role.is_none()
            {
                return Account::try_from(target);
            }

            let mut entry = target.clone().into_active_model();
            if let Some(name) = &cmd.name {
                entry.name = ActiveValue::Set(normalize_required_text(name, "name")?);
            }
            if let Some(email) = &cmd.email {
                let email = normalize_email(email)?;
                let taken = accounts::Entity::find()
                    .filter(accounts::Column::Email.eq(email.clone()))
                    .filter(accounts::Column::Id.ne(target.id.clone()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::Conflict(format!(
                        "email {email} already registered"
                    )));
                }
                entry.email = ActiveValue::Set(email);
            }
            if let Some(address) = &cmd.address {
                entry.address = ActiveValue::Set(normalize_required_text(address, "address")?);
            }
            if let Some(role) = cmd.role {
                entry.role = ActiveValue::Set(role.as_str().to_string());
            }

            let updated = entry.update(&db_tx).await?;
            Account::try_from(updated)
        })
    }

    /// Delete an account. Refused while the account still owns packages.
    pub async fn delete_account(&self, requester: &Account, account_id: Uuid) -> ResultEngine<()> {
        require_admin(requester)?;
        with_tx!(self, |db_tx| {
            let target = self.require_account_by_id(&db_tx, account_id).await?;
            let owned = packages::Entity::find()
                .filter(packages::Column::OwnerId.eq(target.id.clone()))
                .count(&db_tx)
                .await?;
            if owned > 0 {
                return Err(EngineError::Conflict(format!(
                    "account {account_id} still owns {owned} packages"
                )));
            }
            accounts::Entity::delete_by_id(target.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
