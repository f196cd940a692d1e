//! Merchant credentials
//!
//! The processor issues one passcode per API family. Payment operations
//! (charge, complete, void, return) use the payments key and customer profile
//! operations use the profiles key; the two are never interchangeable.

use base64::{engine::general_purpose::STANDARD, Engine};
use secrecy::{ExposeSecret, SecretString};

/// Which API key authenticates a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiScope {
    Payments,
    Profiles,
}

/// Merchant identity and per-scope API passcodes
#[derive(Debug)]
pub struct MerchantCredentials {
    merchant_id: String,
    payments_api_key: SecretString,
    profiles_api_key: SecretString,
}

impl MerchantCredentials {
    pub fn new(
        merchant_id: impl Into<String>,
        payments_api_key: impl Into<String>,
        profiles_api_key: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            payments_api_key: SecretString::new(payments_api_key.into().into()),
            profiles_api_key: SecretString::new(profiles_api_key.into().into()),
        }
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Returns the `Authorization` header value for `scope`
    pub fn authorization_header(&self, scope: ApiScope) -> String {
        let key = match scope {
            ApiScope::Payments => &self.payments_api_key,
            ApiScope::Profiles => &self.profiles_api_key,
        };
        let passcode = STANDARD.encode(format!("{}:{}", self.merchant_id, key.expose_secret()));
        format!("Passcode {}", passcode)
    }
}

impl Clone for MerchantCredentials {
    fn clone(&self) -> Self {
        Self::new(
            self.merchant_id.clone(),
            self.payments_api_key.expose_secret(),
            self.profiles_api_key.expose_secret(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_selects_key() {
        let credentials = MerchantCredentials::new("300200578", "pay-key", "profile-key");

        let payments = credentials.authorization_header(ApiScope::Payments);
        let profiles = credentials.authorization_header(ApiScope::Profiles);

        assert_eq!(payments, format!("Passcode {}", STANDARD.encode("300200578:pay-key")));
        assert_eq!(profiles, format!("Passcode {}", STANDARD.encode("300200578:profile-key")));
    }

    #[test]
    fn test_debug_hides_keys() {
        let credentials = MerchantCredentials::new("300200578", "pay-key", "profile-key");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("pay-key"));
        assert!(!debug.contains("profile-key"));
        assert!(debug.contains("300200578"));
    }
}
