//! Command structs for engine operations.
//!
//! These types group parameters for write operations (package creation,
//! account signup/update), keeping call sites readable and avoiding long
//! argument lists.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::Role;

/// Create a package for the requesting account.
#[derive(Clone, Debug)]
pub struct CreatePackageCmd {
    pub recipient_name: String,
    pub recipient_address: String,
    pub weight: Decimal,
    pub method_id: Uuid,
}

impl CreatePackageCmd {
    #[must_use]
    pub fn new(
        recipient_name: impl Into<String>,
        recipient_address: impl Into<String>,
        weight: Decimal,
        method_id: Uuid,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            recipient_address: recipient_address.into(),
            weight,
            method_id,
        }
    }
}

/// Open signup. The created account is always a customer; admins are
/// bootstrapped out-of-band.
#[derive(Clone, Debug)]
pub struct CreateAccountCmd {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
}

impl CreateAccountCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: address.into(),
            password: password.into(),
        }
    }
}

/// Update an existing account.
///
/// Owners may change their own name/email/address; only admins may touch
/// `role` or other people's accounts.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub account_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(account_id: Uuid) -> Self {
        Self {
            account_id,
            name: None,
            email: None,
            address: None,
            role: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}
