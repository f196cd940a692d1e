//! Payment Domain Ports
//!
//! Records are persisted by the host commerce platform. The gateway needs two
//! write paths into it: binding a remote customer profile onto a shopper and
//! deleting a payment method once its remote card is gone. Payments
//! themselves are returned to the caller, who saves them.
//!
//! ```rust,ignore
//! let resolver = CustomerIdentityResolver::new(gateway, owners);
//! let reconciler = PaymentMethodReconciler::new(gateway, resolver, payment_methods);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, OperationMetadata, OwnerId, PaymentMethodId, PortError};

use crate::owner::Owner;
use crate::payment_method::PaymentMethod;

/// Storage for shopper records
#[async_trait]
pub trait OwnerStore: DomainPort {
    /// Loads a shopper
    async fn get_owner(
        &self,
        id: OwnerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Owner, PortError>;

    /// Persists a shopper, including its remote customer back reference
    async fn save_owner(
        &self,
        owner: &Owner,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// Storage for payment methods
#[async_trait]
pub trait PaymentMethodStore: DomainPort {
    async fn save_payment_method(
        &self,
        payment_method: &PaymentMethod,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    async fn delete_payment_method(
        &self,
        id: PaymentMethodId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// In-memory stores for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of OwnerStore
    #[derive(Debug, Default, Clone)]
    pub struct MockOwnerStore {
        owners: Arc<RwLock<HashMap<OwnerId, Owner>>>,
    }

    impl MockOwnerStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with shoppers for testing
        pub async fn with_owners(owners: Vec<Owner>) -> Self {
            let store = Self::new();
            for owner in owners {
                store.owners.write().await.insert(owner.id, owner);
            }
            store
        }

        /// Returns the stored copy of a shopper, if any
        pub async fn stored(&self, id: OwnerId) -> Option<Owner> {
            self.owners.read().await.get(&id).cloned()
        }
    }

    impl DomainPort for MockOwnerStore {}

    #[async_trait]
    impl OwnerStore for MockOwnerStore {
        async fn get_owner(
            &self,
            id: OwnerId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Owner, PortError> {
            self.owners
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Owner", id))
        }

        async fn save_owner(
            &self,
            owner: &Owner,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.owners.write().await.insert(owner.id, owner.clone());
            Ok(())
        }
    }

    /// In-memory implementation of PaymentMethodStore
    #[derive(Debug, Default, Clone)]
    pub struct MockPaymentMethodStore {
        methods: Arc<RwLock<HashMap<PaymentMethodId, PaymentMethod>>>,
    }

    impl MockPaymentMethodStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn stored(&self, id: PaymentMethodId) -> Option<PaymentMethod> {
            self.methods.read().await.get(&id).cloned()
        }

        pub async fn len(&self) -> usize {
            self.methods.read().await.len()
        }
    }

    impl DomainPort for MockPaymentMethodStore {}

    #[async_trait]
    impl PaymentMethodStore for MockPaymentMethodStore {
        async fn save_payment_method(
            &self,
            payment_method: &PaymentMethod,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.methods
                .write()
                .await
                .insert(payment_method.id, payment_method.clone());
            Ok(())
        }

        async fn delete_payment_method(
            &self,
            id: PaymentMethodId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.methods
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("PaymentMethod", id))
        }
    }
}
