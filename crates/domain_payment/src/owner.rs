//! Shopper identities
//!
//! The owner record belongs to the host platform. The gateway only reads the
//! authentication flag and keeps one back reference on it: the identifier of
//! the shopper's remote customer profile.

use serde::{Deserialize, Serialize};

use core_kernel::OwnerId;

/// A shopper as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub email: String,
    authenticated: bool,
    remote_customer_id: Option<String>,
}

impl Owner {
    /// Creates a logged-in shopper without a remote profile
    pub fn authenticated(id: OwnerId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            authenticated: true,
            remote_customer_id: None,
        }
    }

    /// Creates a guest shopper; guests never get a remote profile
    pub fn anonymous(email: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(),
            email: email.into(),
            authenticated: false,
            remote_customer_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn remote_customer_id(&self) -> Option<&str> {
        self.remote_customer_id.as_deref()
    }

    /// Binds the remote customer profile to this shopper
    ///
    /// Guests are never bound; the call is ignored for them and `false` is
    /// returned.
    pub fn bind_remote_customer(&mut self, customer_id: impl Into<String>) -> bool {
        if !self.authenticated {
            return false;
        }
        self.remote_customer_id = Some(customer_id.into());
        true
    }

    /// Builder-style binding, mostly useful when loading existing records
    pub fn with_remote_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.bind_remote_customer(customer_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_owner_cannot_be_bound() {
        let mut guest = Owner::anonymous("guest@example.com");
        assert!(!guest.bind_remote_customer("ABC123"));
        assert!(guest.remote_customer_id().is_none());
    }

    #[test]
    fn test_authenticated_owner_binding() {
        let owner = Owner::authenticated(OwnerId::new(), "ada@example.com")
            .with_remote_customer("F0A2B0C6E1A34B7E");
        assert!(owner.is_authenticated());
        assert_eq!(owner.remote_customer_id(), Some("F0A2B0C6E1A34B7E"));
    }
}
