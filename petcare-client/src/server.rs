use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error};

pub use petcare_shared::device::{Device, LockMode};
pub use petcare_shared::entities::Entities;
pub use petcare_shared::pet::{Pet, PetLocation};

/// Everything a command needs from the cloud service.
///
/// Calls are made one at a time; nothing here retries.
#[async_trait]
pub trait PetcareApi: Send + Sync {
    async fn get_token(&self, email: &str, password: &str) -> Result<String>;

    async fn fetch_entities(&self) -> Result<Entities>;

    /// Raw aggregate report, household wide unless `pet_id` is given.
    async fn fetch_report(&self, household_id: u64, pet_id: Option<u64>) -> Result<Value>;

    /// `None` when the service has nothing to say.
    async fn fetch_notifications(&self) -> Result<Option<Value>>;

    /// `true` when the service acknowledged the requested mode.
    async fn set_lock_mode(&self, device_id: u64, mode: LockMode) -> Result<bool>;

    /// `true` when the service acknowledged the requested location.
    async fn set_pet_position(&self, pet_id: u64, location: PetLocation) -> Result<bool>;

    async fn close_session(&self) -> Result<()>;

    async fn fetch_device(&self, device_id: u64) -> Result<Option<Device>> {
        let entities = self.fetch_entities().await?;
        Ok(entities.devices.into_iter().find(|d| d.id == device_id))
    }

    async fn fetch_pet(&self, pet_id: u64) -> Result<Option<Pet>> {
        let entities = self.fetch_entities().await?;
        Ok(entities.pets.into_iter().find(|p| p.id == pet_id))
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct TokenData {
    token: String,
}

/// HTTP implementation of [`PetcareApi`].
pub struct ApiClient {
    api_url: String,
    client_device_id: String,
    token: Option<String>,
    // taken on close so later calls fail instead of reopening connections
    client: Mutex<Option<Client>>,
}

impl ApiClient {
    pub fn new(api_url: &str, client_device_id: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("petcare/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client_device_id: client_device_id.to_string(),
            token,
            client: Mutex::new(Some(client)),
        })
    }

    fn client(&self) -> Result<Client> {
        self.client
            .lock()
            .map_err(|_| anyhow!("HTTP session lock poisoned"))?
            .clone()
            .ok_or_else(|| anyhow!("session already closed"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| anyhow!("no token configured for this session"))?;
        Ok(request
            .bearer_auth(token)
            .header("X-Device-Id", &self.client_device_id))
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!("GET {}", url);
        let res = self
            .authed(self.client()?.get(&url))?
            .send()
            .await
            .with_context(|| format!("GET {}", path))?;
        let res = res.error_for_status().map_err(|e| {
            error!("{:?}", e);
            anyhow!(e)
        })?;
        Ok(res.json().await?)
    }

    /// Sends a control request and checks the echoed `data.<field>` against `expected`.
    async fn acknowledged(&self, request: RequestBuilder, field: &str, expected: i64) -> Result<bool> {
        let res = self.authed(request)?.send().await?;
        let res = res.error_for_status()?;
        let body: Value = res.json().await.unwrap_or(Value::Null);
        Ok(body["data"][field].as_i64() == Some(expected))
    }
}

#[async_trait]
impl PetcareApi for ApiClient {
    async fn get_token(&self, email: &str, password: &str) -> Result<String> {
        let url = self.url("/auth/login");
        let res = self
            .client()?
            .post(&url)
            .header("X-Device-Id", &self.client_device_id)
            .json(&json!({
                "email_address": email,
                "password": password,
                "device_id": self.client_device_id,
            }))
            .send()
            .await
            .context("POST /auth/login")?;

        if res.status() == StatusCode::UNAUTHORIZED {
            return Err(anyhow!("invalid email or password"));
        }
        let envelope: Envelope<TokenData> = res.error_for_status()?.json().await?;
        Ok(envelope.data.token)
    }

    async fn fetch_entities(&self) -> Result<Entities> {
        let body = self.get_json("/me/start").await?;
        let envelope: Envelope<Entities> =
            serde_json::from_value(body).context("Unexpected /me/start payload")?;
        Ok(envelope.data)
    }

    async fn fetch_report(&self, household_id: u64, pet_id: Option<u64>) -> Result<Value> {
        let path = match pet_id {
            Some(pet_id) => format!("/report/household/{}/pet/{}/aggregate", household_id, pet_id),
            None => format!("/report/household/{}/aggregate", household_id),
        };
        self.get_json(&path).await
    }

    async fn fetch_notifications(&self) -> Result<Option<Value>> {
        let url = self.url("/notification");
        let res = self
            .authed(self.client()?.get(&url))?
            .send()
            .await
            .context("GET /notification")?
            .error_for_status()?;

        if res.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn set_lock_mode(&self, device_id: u64, mode: LockMode) -> Result<bool> {
        let url = self.url(&format!("/device/{}/control", device_id));
        let request = self
            .client()?
            .put(&url)
            .json(&json!({ "locking": mode.wire_value() }));
        self.acknowledged(request, "locking", mode.wire_value())
            .await
            .with_context(|| format!("PUT /device/{}/control", device_id))
    }

    async fn set_pet_position(&self, pet_id: u64, location: PetLocation) -> Result<bool> {
        let url = self.url(&format!("/pet/{}/position", pet_id));
        let since = Utc::now().format("%Y-%m-%d %H:%M").to_string();
        let request = self
            .client()?
            .post(&url)
            .json(&json!({ "where": location.wire_value(), "since": since }));
        self.acknowledged(request, "where", location.wire_value())
            .await
            .with_context(|| format!("POST /pet/{}/position", pet_id))
    }

    async fn close_session(&self) -> Result<()> {
        let client = self
            .client
            .lock()
            .map_err(|_| anyhow!("HTTP session lock poisoned"))?
            .take();
        if client.is_some() {
            debug!("HTTP session closed");
        }
        Ok(())
    }
}
