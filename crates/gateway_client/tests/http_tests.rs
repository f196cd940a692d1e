//! HTTP transport tests against a local mock server

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gateway_client::{
    AddCardRequest, AdjustmentRequest, BamboraGateway, CreateProfileRequest, MerchantCredentials,
    PaymentRequest, ProfileBilling, ProfileToken, RemoteGateway, RemoteProcessorError,
};

const MERCHANT_ID: &str = "300200578";

fn passcode(key: &str) -> String {
    format!("Passcode {}", STANDARD.encode(format!("{}:{}", MERCHANT_ID, key)))
}

async fn gateway(server: &MockServer) -> BamboraGateway {
    let credentials = MerchantCredentials::new(MERCHANT_ID, "payments-key", "profiles-key");
    BamboraGateway::new(credentials, &format!("{}/v1", server.uri()), Duration::from_secs(5))
        .unwrap()
}

// ============================================================================
// Payment Calls
// ============================================================================

mod payment_calls {
    use super::*;

    #[tokio::test]
    async fn test_create_payment_uses_payments_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .and(header("Authorization", passcode("payments-key").as_str()))
            .and(body_partial_json(json!({
                "order_number": "1001",
                "amount": 50.0,
                "payment_method": "payment_profile",
                "payment_profile": {"customer_code": "CUST1", "card_id": "1", "complete": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "10000123",
                "approved": "1",
                "message": "Approved",
                "type": "PA"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = PaymentRequest::profile("1001", dec!(50.00), "CUST1", "1", false);
        let response = gateway(&server).await.create_payment(&request).await.unwrap();

        assert_eq!(response.id, "10000123");
        assert!(response.is_approved());
        assert_eq!(response.transaction_type.as_deref(), Some("PA"));
    }

    #[tokio::test]
    async fn test_completion_path_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments/10000123/completions"))
            .and(body_json(json!({"amount": 30.0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 10000124})))
            .expect(1)
            .mount(&server)
            .await;

        let response = gateway(&server)
            .await
            .complete_payment("10000123", &AdjustmentRequest::new(dec!(30.00)))
            .await
            .unwrap();
        assert_eq!(response.id, "10000124");
    }

    #[tokio::test]
    async fn test_return_sends_order_number() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments/10000123/returns"))
            .and(body_json(json!({"amount": 20.0, "order_number": "1001"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "10000125"})))
            .expect(1)
            .mount(&server)
            .await;

        let request = AdjustmentRequest::new(dec!(20.00)).with_order_number("1001");
        gateway(&server)
            .await
            .return_payment("10000123", &request)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_body_becomes_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments/10000123/void"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 194,
                "category": 2,
                "message": "Transaction already voided",
                "reference": ""
            })))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .await
            .void_payment("10000123", &AdjustmentRequest::new(dec!(50.00)))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RemoteProcessorError::Rejected {
                code: 194,
                category: 2,
                message: "Transaction already voided".to_string(),
                http_status: 400,
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let request = PaymentRequest::token("1", dec!(1.00), "tok", "Ada Lovelace", true);
        let err = gateway(&server).await.create_payment(&request).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(err.message(), "HTTP 502");
    }

    #[tokio::test]
    async fn test_garbage_success_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payments"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let request = PaymentRequest::token("1", dec!(1.00), "tok", "Ada Lovelace", true);
        let err = gateway(&server).await.create_payment(&request).await.unwrap_err();
        assert!(matches!(err, RemoteProcessorError::Decode(_)));
    }
}

// ============================================================================
// Profile Calls
// ============================================================================

mod profile_calls {
    use super::*;

    fn token() -> ProfileToken {
        ProfileToken {
            name: "Ada Lovelace".to_string(),
            code: "tok-profile".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_profile_uses_profiles_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/profiles"))
            .and(header("Authorization", passcode("profiles-key").as_str()))
            .and(body_partial_json(json!({
                "billing": {"name": "Ada Lovelace", "email_address": "ada@example.com"},
                "token": {"name": "Ada Lovelace", "code": "tok-profile"},
                "validate": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 1,
                "message": "Operation Successful",
                "customer_code": "F0A2B0C6E1A34B7E"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = CreateProfileRequest {
            billing: ProfileBilling {
                name: "Ada Lovelace".to_string(),
                email_address: "ada@example.com".to_string(),
                phone_number: "1234567890".to_string(),
                address_line1: "1 Main St".to_string(),
                address_line2: None,
                city: "Toronto".to_string(),
                province: Some("ON".to_string()),
                postal_code: "M5V 2T6".to_string(),
                country: "CA".to_string(),
            },
            token: token(),
            validate: true,
        };
        let response = gateway(&server).await.create_profile(&request).await.unwrap();
        assert_eq!(response.customer_code.as_deref(), Some("F0A2B0C6E1A34B7E"));
    }

    #[tokio::test]
    async fn test_add_card_and_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/profiles/CUST1/cards"))
            .and(body_partial_json(json!({"validate": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 1, "message": "Operation Successful", "customer_code": "CUST1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/profiles/CUST1/cards"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 1,
                "message": "Operation Successful",
                "card": [
                    {"card_id": 1, "name": "Ada", "number": "4030XXXXXXXX3333",
                     "expiry_month": "09", "expiry_year": "27", "card_type": "VI", "function": "DEB"},
                    {"card_id": 2, "name": "Ada", "number": "5100XXXXXXXX0003",
                     "expiry_month": "01", "expiry_year": "30", "card_type": "MC", "function": "CR"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = gateway(&server).await;
        client
            .add_card("CUST1", &AddCardRequest { token: token(), validate: true })
            .await
            .unwrap();
        let cards = client.get_cards("CUST1").await.unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(gateway_client::most_recently_added_card(&cards).unwrap().card_type, "MC");
    }

    #[tokio::test]
    async fn test_delete_card() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/profiles/CUST1/cards/2"))
            .and(header("Authorization", passcode("profiles-key").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 1, "message": "Operation Successful", "customer_code": "CUST1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = gateway(&server).await.delete_card("CUST1", "2").await.unwrap();
        assert_eq!(response.code, 1);
    }
}

#[test]
fn test_invalid_base_url_rejected() {
    let credentials = MerchantCredentials::new(MERCHANT_ID, "a", "b");
    let err = BamboraGateway::new(credentials, "not a url", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, RemoteProcessorError::Config(_)));
}
