//! Payment processor client.
//!
//! Outbound HTTPS client for the card processor: create customers,
//! look up saved payment methods, create charges. The call contract
//! mirrors a Stripe-style API (`/v1/customers`, `/v1/payment_methods`,
//! `/v1/charges`) against a configurable base URL so tests can point
//! it at a stub.
//!
//! The charge call and the local database write are NOT atomic. A
//! charge that succeeds remotely but fails to commit locally is logged
//! at error level with the charge id for manual reconciliation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Statuses the processor reports for a successful charge.
const SUCCESS_STATUSES: &[&str] = &["succeeded", "requires_capture"];

/// A processor-side payment method (saved card).
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorPaymentMethod {
    pub id: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
}

/// A processor-side charge.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorCharge {
    pub id: String,
    pub status: String,
}

impl ProcessorCharge {
    /// Whether the charge went through.
    pub fn is_success(&self) -> bool {
        SUCCESS_STATUSES.contains(&self.status.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ProcessorCustomer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodList {
    data: Vec<ProcessorPaymentMethod>,
}

#[derive(Debug, Deserialize)]
struct SetupIntent {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateCustomerBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateChargeBody<'a> {
    amount: i64,
    currency: &'a str,
    customer: &'a str,
    payment_method: &'a str,
    confirm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt_email: Option<&'a str>,
}

/// HTTP client for the card processor.
#[derive(Clone)]
pub struct ProcessorClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl ProcessorClient {
    /// Creates a client against the configured base URL.
    pub fn new(base_url: String, secret_key: String) -> Self {
        ProcessorClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Returns the existing processor customer id, or creates one.
    ///
    /// Customer creation requires an email address on file; without one
    /// the charge flow is rejected before any network call.
    pub async fn ensure_customer(
        &self,
        existing: Option<&str>,
        name: &str,
        email: Option<&str>,
    ) -> ApiResult<String> {
        if let Some(id) = existing {
            return Ok(id.to_string());
        }

        let email = email.ok_or_else(|| {
            ApiError::BadRequest(
                "Customer has no email address on file; cannot create a processor account"
                    .to_string(),
            )
        })?;

        debug!(name, "Creating processor customer");

        let response = self
            .client
            .post(self.url("/v1/customers"))
            .bearer_auth(&self.secret_key)
            .json(&CreateCustomerBody {
                name,
                email: Some(email),
            })
            .send()
            .await?
            .error_for_status()?;

        let customer: ProcessorCustomer = response.json().await?;
        Ok(customer.id)
    }

    /// The customer's default saved payment method, if any.
    pub async fn default_payment_method(
        &self,
        processor_customer_id: &str,
    ) -> ApiResult<Option<ProcessorPaymentMethod>> {
        let response = self
            .client
            .get(self.url("/v1/payment_methods"))
            .bearer_auth(&self.secret_key)
            .query(&[("customer", processor_customer_id), ("type", "card")])
            .send()
            .await?
            .error_for_status()?;

        let list: PaymentMethodList = response.json().await?;
        Ok(list.data.into_iter().next())
    }

    /// Creates and confirms a charge against a saved payment method.
    ///
    /// A transport-level success with a non-success charge status is an
    /// error to the caller; only `succeeded`/`requires_capture` counts.
    pub async fn create_charge(
        &self,
        processor_customer_id: &str,
        payment_method_id: &str,
        amount_cents: i64,
        receipt_email: Option<&str>,
    ) -> ApiResult<ProcessorCharge> {
        debug!(
            customer = processor_customer_id,
            amount_cents, "Creating processor charge"
        );

        let response = self
            .client
            .post(self.url("/v1/charges"))
            .bearer_auth(&self.secret_key)
            .json(&CreateChargeBody {
                amount: amount_cents,
                currency: "usd",
                customer: processor_customer_id,
                payment_method: payment_method_id,
                confirm: true,
                receipt_email,
            })
            .send()
            .await?
            .error_for_status()?;

        let charge: ProcessorCharge = response.json().await?;
        if !charge.is_success() {
            return Err(ApiError::Processor(format!(
                "Charge {} was not successful (status: {})",
                charge.id, charge.status
            )));
        }

        Ok(charge)
    }

    /// Creates a hosted link for the customer to add a card.
    pub async fn create_setup_link(&self, processor_customer_id: &str) -> ApiResult<String> {
        let response = self
            .client
            .post(self.url("/v1/setup_intents"))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({ "customer": processor_customer_id }))
            .send()
            .await?
            .error_for_status()?;

        let intent: SetupIntent = response.json().await?;
        Ok(intent
            .url
            .unwrap_or_else(|| format!("{}/setup/{}", self.base_url, intent.id)))
    }
}
