/// Leshan REST API client over HTTP.
///
/// Talks to the demo/bootstrap server JSON API:
/// - `/api/clients` for registrations and security information
/// - `/api/bsclients` for bootstrap configurations
/// - `/api/objectspecs` for object models
///
/// Endpoint names are always pushed as a single percent-encoded path
/// segment, so names containing `/` or spaces cannot escape their route.
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{BootstrapConfig, BootstrapConfigs, ObjectSpec, Registration, SecurityConfig};
use super::LeshanApi;
use crate::config::{UpstreamAuth, UpstreamConfig};
use crate::error::{AdminError, Result};

/// Header carrying the static upstream token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

pub struct LeshanClient {
    client: Client,
    config: UpstreamConfig,
}

impl LeshanClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AdminError::Config(format!(
                    "Upstream URL {} cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");

        match &self.config.auth {
            UpstreamAuth::None => builder,
            UpstreamAuth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            UpstreamAuth::Token(token) => builder.header(AUTH_TOKEN_HEADER, token),
        }
    }

    /// Send a request and turn non-2xx statuses into `AdminError::Upstream`.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, body = %body, "Upstream rejected request");
            return Err(AdminError::Upstream { status, body });
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        let resp = self.send(self.request(Method::GET, url)).await?;

        resp.json()
            .await
            .map_err(|e| AdminError::Serialization(format!("Unexpected upstream payload: {e}")))
    }
}

#[async_trait]
impl LeshanApi for LeshanClient {
    async fn list_clients(&self) -> Result<Vec<Registration>> {
        self.get_json(&["api", "clients"]).await
    }

    async fn get_client(&self, endpoint: &str) -> Result<Registration> {
        self.get_json(&["api", "clients", endpoint]).await
    }

    async fn object_specs(&self, endpoint: &str) -> Result<Vec<ObjectSpec>> {
        self.get_json(&["api", "objectspecs", endpoint]).await
    }

    async fn list_bootstrap_configs(&self) -> Result<BootstrapConfigs> {
        self.get_json(&["api", "bsclients"]).await
    }

    async fn put_bootstrap_config(&self, endpoint: &str, config: &BootstrapConfig) -> Result<()> {
        let url = self.url(&["api", "bsclients", endpoint])?;
        self.send(self.request(Method::POST, url).json(config)).await?;
        Ok(())
    }

    async fn delete_bootstrap_config(&self, endpoint: &str) -> Result<()> {
        let url = self.url(&["api", "bsclients", endpoint])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn list_security_configs(&self) -> Result<Vec<SecurityConfig>> {
        self.get_json(&["api", "clients", "securityconf"]).await
    }

    async fn put_security_config(&self, config: &SecurityConfig) -> Result<()> {
        let url = self.url(&["api", "clients"])?;
        self.send(self.request(Method::PUT, url).json(config)).await?;
        Ok(())
    }

    async fn delete_security_config(&self, endpoint: &str) -> Result<()> {
        let url = self.url(&["api", "clients", endpoint])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
