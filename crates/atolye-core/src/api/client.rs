//! API client for the repair-service REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests: customers, machines, repair tickets with their attached
//! operations, spare parts and change logs, the global price catalogs, and
//! backend-generated QR codes.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{SessionData, TokenProvider};
use crate::models::{
    Customer, Machine, NewCustomer, NewMachine, NewOperation, NewRepair, NewRepairLog,
    NewSparePart, Operation, Repair, RepairLog, RepairUpdate, SparePart,
};

use super::gateway::{Gateway, RequestOptions, UnauthorizedPolicy};
use super::ApiError;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct QrCodeResponse {
    #[serde(rename = "qrCode")]
    qr_code: String,
}

/// API client for the repair-service backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    gateway: Gateway,
    base_url: String,
}

impl ApiClient {
    /// Create a client against `base_url`, reading the session credential
    /// through `provider` on every call.
    pub fn new(base_url: impl Into<String>, provider: Arc<dyn TokenProvider>) -> Result<Self> {
        // No request timeout: a pending call runs to completion or to a
        // transport-level failure.
        let client = Client::builder().build()?;
        let gateway = Gateway::new(client.clone(), provider);

        Ok(Self {
            client,
            gateway,
            base_url: base_url.into(),
        })
    }

    /// Replace the gateway's 401 policy.
    pub fn with_unauthorized_policy(mut self, policy: UnauthorizedPolicy) -> Self {
        self.gateway = self.gateway.with_unauthorized_policy(policy);
        self
    }

    /// The gateway this client sends through.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Authenticate against the backend and return session data.
    ///
    /// Goes over the raw transport rather than the gateway so a stale stored
    /// token is never attached to a login attempt.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionData> {
        let url = format!("{}/api/Auth/Login", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        debug!(username = username, "Login succeeded");

        Ok(SessionData::new(login.token, username.to_string()))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .gateway
            .send(url, RequestOptions::default())
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<Response> {
        let payload = serde_json::to_string(body).context("Failed to serialize request body")?;
        let response = self
            .gateway
            .send(url, RequestOptions::method(method.clone()).with_body(payload))
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;

        Self::check_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, url: &str, body: &B) -> Result<T> {
        let response = self.send_json(Method::POST, url, body).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn put<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        self.send_json(Method::PUT, url, body).await?;
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let response = self
            .gateway
            .send(url, RequestOptions::method(Method::DELETE))
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Customers =====

    /// Fetch all customers
    pub async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        let url = format!("{}/api/customers", self.base_url);
        self.get(&url).await
    }

    /// Create a customer and return the stored record
    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer> {
        let url = format!("{}/api/customers", self.base_url);
        self.post(&url, customer).await
    }

    /// Delete a customer
    pub async fn delete_customer(&self, id: i64) -> Result<()> {
        let url = format!("{}/api/customers/{}", self.base_url, id);
        self.delete(&url).await
    }

    // ===== Machines =====

    /// Fetch machines, optionally restricted to one customer
    pub async fn fetch_machines(&self, customer_id: Option<i64>) -> Result<Vec<Machine>> {
        let url = match customer_id {
            Some(id) => format!("{}/api/machines?customerId={}", self.base_url, id),
            None => format!("{}/api/machines", self.base_url),
        };
        self.get(&url).await
    }

    /// Fetch a single machine, including its QR code if one was attached
    pub async fn fetch_machine(&self, id: i64) -> Result<Machine> {
        let url = format!("{}/api/machines/{}", self.base_url, id);
        self.get(&url).await
    }

    /// Register a machine for a customer
    pub async fn create_machine(&self, machine: &NewMachine) -> Result<Machine> {
        let url = format!("{}/api/machines", self.base_url);
        self.post(&url, machine).await
    }

    // ===== Repairs =====

    /// Fetch all repair tickets
    pub async fn fetch_repairs(&self) -> Result<Vec<Repair>> {
        let url = format!("{}/api/Repairs", self.base_url);
        self.get(&url).await
    }

    /// Fetch one repair ticket with its machine, operations and spare parts
    pub async fn fetch_repair(&self, id: i64) -> Result<Repair> {
        let url = format!("{}/api/Repairs/{}", self.base_url, id);
        self.get(&url).await
    }

    /// Open a repair ticket and return the stored record
    pub async fn create_repair(&self, repair: &NewRepair) -> Result<Repair> {
        let url = format!("{}/api/Repairs", self.base_url);
        self.post(&url, repair).await
    }

    /// Apply a partial update; unset fields are left untouched by the backend
    pub async fn update_repair(&self, id: i64, update: &RepairUpdate) -> Result<()> {
        let url = format!("{}/api/Repairs/{}", self.base_url, id);
        self.put(&url, update).await
    }

    /// Delete a repair ticket
    pub async fn delete_repair(&self, id: i64) -> Result<()> {
        let url = format!("{}/api/Repairs/{}", self.base_url, id);
        self.delete(&url).await
    }

    // ===== Operations attached to a repair =====

    /// Fetch the operations attached to a repair
    pub async fn fetch_repair_operations(&self, repair_id: i64) -> Result<Vec<Operation>> {
        let url = format!("{}/api/Repairs/{}/operations", self.base_url, repair_id);
        self.get(&url).await
    }

    /// Attach operations to a repair (the backend takes a batch)
    pub async fn add_repair_operations(
        &self,
        repair_id: i64,
        operations: &[NewOperation],
    ) -> Result<()> {
        let url = format!("{}/api/Repairs/{}/operations", self.base_url, repair_id);
        self.send_json(Method::POST, &url, &operations).await?;
        Ok(())
    }

    /// Detach one operation from a repair
    pub async fn delete_repair_operation(&self, repair_id: i64, operation_id: i64) -> Result<()> {
        let url = format!(
            "{}/api/Repairs/{}/operations/{}",
            self.base_url, repair_id, operation_id
        );
        self.delete(&url).await
    }

    /// Remove every operation attached to a repair
    pub async fn clear_repair_operations(&self, repair_id: i64) -> Result<()> {
        let url = format!("{}/api/Repairs/{}/operations", self.base_url, repair_id);
        self.delete(&url).await
    }

    // ===== Spare parts attached to a repair =====

    /// Fetch the spare parts attached to a repair
    pub async fn fetch_repair_spare_parts(&self, repair_id: i64) -> Result<Vec<SparePart>> {
        let url = format!("{}/api/Repairs/{}/spareParts", self.base_url, repair_id);
        self.get(&url).await
    }

    /// Attach spare parts to a repair (the backend takes a batch)
    pub async fn add_repair_spare_parts(
        &self,
        repair_id: i64,
        parts: &[NewSparePart],
    ) -> Result<()> {
        let url = format!("{}/api/Repairs/{}/spareParts", self.base_url, repair_id);
        self.send_json(Method::POST, &url, &parts).await?;
        Ok(())
    }

    /// Detach one spare part from a repair
    pub async fn delete_repair_spare_part(&self, repair_id: i64, part_id: i64) -> Result<()> {
        let url = format!(
            "{}/api/Repairs/{}/spareParts/{}",
            self.base_url, repair_id, part_id
        );
        self.delete(&url).await
    }

    /// Remove every spare part attached to a repair
    pub async fn clear_repair_spare_parts(&self, repair_id: i64) -> Result<()> {
        let url = format!("{}/api/Repairs/{}/spareParts", self.base_url, repair_id);
        self.delete(&url).await
    }

    // ===== Repair logs =====

    /// Fetch the change history of a repair
    pub async fn fetch_repair_logs(&self, repair_id: i64) -> Result<Vec<RepairLog>> {
        let url = format!("{}/api/Repairs/{}/logs", self.base_url, repair_id);
        self.get(&url).await
    }

    /// Append an entry to a repair's change history
    pub async fn add_repair_log(&self, repair_id: i64, log: &NewRepairLog) -> Result<()> {
        let url = format!("{}/api/Repairs/{}/logs", self.base_url, repair_id);
        self.send_json(Method::POST, &url, log).await?;
        Ok(())
    }

    // ===== Global price catalogs =====

    /// Fetch the global operation catalog
    pub async fn fetch_operations(&self) -> Result<Vec<Operation>> {
        let url = format!("{}/api/operations", self.base_url);
        self.get(&url).await
    }

    /// Add an operation to the global catalog
    pub async fn create_operation(&self, operation: &NewOperation) -> Result<Operation> {
        let url = format!("{}/api/operations", self.base_url);
        self.post(&url, operation).await
    }

    /// Fetch the global spare part catalog
    pub async fn fetch_spare_parts(&self) -> Result<Vec<SparePart>> {
        let url = format!("{}/api/spareParts", self.base_url);
        self.get(&url).await
    }

    /// Add a spare part to the global catalog
    pub async fn create_spare_part(&self, part: &NewSparePart) -> Result<SparePart> {
        let url = format!("{}/api/spareParts", self.base_url);
        self.post(&url, part).await
    }

    // ===== QR codes =====

    /// Ask the backend to render `text` as a QR code.
    /// Returns a `data:image/png;base64,...` URI.
    pub async fn generate_qr(&self, text: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &format!("{}/api/Repairs/qr", self.base_url),
            &[("text", text)],
        )
        .context("Failed to build QR code URL")?;

        let qr: QrCodeResponse = self.get(url.as_str()).await?;
        debug!("QR code response received");
        Ok(qr.qr_code)
    }

    /// Generate a QR code for `text` and store it on the repair record,
    /// the way report pages link back to themselves.
    pub async fn attach_qr_code(&self, repair_id: i64, text: &str) -> Result<String> {
        let qr_code = self.generate_qr(text).await?;

        let update = RepairUpdate {
            qr_code: Some(qr_code.clone()),
            ..Default::default()
        };
        self.update_repair(repair_id, &update).await?;

        Ok(qr_code)
    }
}
