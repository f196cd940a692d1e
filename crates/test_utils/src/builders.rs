//! Test Data Builders
//!
//! Builders for payments and payment methods that drive the domain records
//! through their real transitions, so a built record is always one the
//! lifecycle could have produced.

use chrono::{DateTime, Utc};
use core_kernel::{Money, OrderId, OwnerId};
use domain_payment::{BillingAddress, CardDetails, Payment, PaymentMethod, PaymentState};

use crate::fixtures::{AddressFixtures, MoneyFixtures, TokenFixtures};

/// Builder for payments in a given lifecycle state
pub struct TestPaymentBuilder {
    order_id: OrderId,
    amount: Money,
    state: PaymentState,
    remote_id: String,
    refunded: Option<Money>,
    charged_at: DateTime<Utc>,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    /// Creates a builder for a new CAD 50.00 payment
    pub fn new() -> Self {
        Self {
            order_id: OrderId::new(1001),
            amount: MoneyFixtures::cad_50(),
            state: PaymentState::New,
            remote_id: "10000001".to_string(),
            refunded: None,
            charged_at: Utc::now(),
        }
    }

    pub fn with_order_id(mut self, order_id: u64) -> Self {
        self.order_id = OrderId::new(order_id);
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_remote_id(mut self, remote_id: impl Into<String>) -> Self {
        self.remote_id = remote_id.into();
        self
    }

    pub fn charged_at(mut self, at: DateTime<Utc>) -> Self {
        self.charged_at = at;
        self
    }

    pub fn authorized(mut self) -> Self {
        self.state = PaymentState::Authorization;
        self
    }

    pub fn completed(mut self) -> Self {
        self.state = PaymentState::Completed;
        self
    }

    pub fn voided(mut self) -> Self {
        self.state = PaymentState::AuthorizationVoided;
        self
    }

    /// A completed payment with `refunded` already returned
    pub fn refunded(mut self, refunded: Money) -> Self {
        self.state = PaymentState::Completed;
        self.refunded = Some(refunded);
        self
    }

    /// Builds the payment
    ///
    /// # Panics
    ///
    /// Panics when the requested state cannot be reached with the given amounts.
    pub fn build(self) -> Payment {
        let mut payment = Payment::new(self.order_id, self.amount);

        match self.state {
            PaymentState::New => {}
            PaymentState::Authorization => {
                payment
                    .record_charge(self.remote_id, false, self.charged_at)
                    .expect("authorize test payment");
            }
            PaymentState::AuthorizationVoided => {
                payment
                    .record_charge(self.remote_id, false, self.charged_at)
                    .expect("authorize test payment");
                payment.record_void().expect("void test payment");
            }
            _ => {
                payment
                    .record_charge(self.remote_id, true, self.charged_at)
                    .expect("complete test payment");
            }
        }

        if let Some(refunded) = self.refunded {
            payment.record_refund(refunded).expect("refund test payment");
        }
        payment
    }
}

/// Builder for payment methods
pub struct TestPaymentMethodBuilder {
    owner_id: Option<OwnerId>,
    billing_address: BillingAddress,
    token: Option<String>,
    profile_card: Option<(String, String, String, u32, i32)>,
    consumed: bool,
}

impl Default for TestPaymentMethodBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentMethodBuilder {
    /// Creates a builder for an unattached guest payment method
    pub fn new() -> Self {
        Self {
            owner_id: None,
            billing_address: AddressFixtures::toronto(),
            token: None,
            profile_card: None,
            consumed: false,
        }
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_billing_address(mut self, address: BillingAddress) -> Self {
        self.billing_address = address;
        self
    }

    /// Attaches the default single-use token
    pub fn with_token(self) -> Self {
        self.with_custom_token(TokenFixtures::valid())
    }

    pub fn with_custom_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Marks the single-use token as already charged
    pub fn consumed(mut self) -> Self {
        self.consumed = true;
        self
    }

    /// Attaches a stored profile card
    pub fn with_profile_card(
        mut self,
        card_id: impl Into<String>,
        brand_code: impl Into<String>,
        masked_number: impl Into<String>,
        exp_month: u32,
        exp_year: i32,
    ) -> Self {
        self.profile_card = Some((
            card_id.into(),
            brand_code.into(),
            masked_number.into(),
            exp_month,
            exp_year,
        ));
        self
    }

    /// Attaches a stored Visa card with id `card_id`
    pub fn with_visa(self, card_id: impl Into<String>) -> Self {
        self.with_profile_card(card_id, "VI", "4030XXXXXXXX3333", 9, 2029)
    }

    /// Builds the payment method
    ///
    /// # Panics
    ///
    /// Panics when the profile card fixture has an unknown brand or bad expiry.
    pub fn build(self) -> PaymentMethod {
        let mut method = PaymentMethod::new(self.owner_id, self.billing_address);

        if let Some(token) = self.token {
            method.record_single_use_token(token);
        }
        if let Some((card_id, brand, number, month, year)) = self.profile_card {
            let details = CardDetails::from_processor(&brand, &number, month, year)
                .expect("valid card fixture");
            method
                .record_profile_card(card_id, details)
                .expect("valid card expiry");
        }
        if self.consumed {
            method.mark_token_consumed();
        }
        method
    }
}
