/// Upstream Leshan server abstraction.
///
/// The Leshan server owns all device state: registrations, bootstrap
/// configurations and security information. This crate only reads and
/// writes them through its REST API. Handlers and the bulk pipeline talk
/// to the `LeshanApi` trait so tests can swap in a mock server.
pub mod leshan;
pub mod models;

use async_trait::async_trait;

use crate::error::Result;
use models::{BootstrapConfig, BootstrapConfigs, ObjectSpec, Registration, SecurityConfig};

pub use leshan::LeshanClient;

/// Operations the gateway needs from the Leshan REST API.
///
/// Every method fails with `AdminError::Upstream` on a non-2xx response and
/// `AdminError::Http` on transport errors. No method retries.
#[async_trait]
pub trait LeshanApi: Send + Sync {
    /// List clients currently registered with the LwM2M server.
    async fn list_clients(&self) -> Result<Vec<Registration>>;

    /// Fetch one registered client by endpoint name.
    async fn get_client(&self, endpoint: &str) -> Result<Registration>;

    /// Fetch the object models a client exposes.
    async fn object_specs(&self, endpoint: &str) -> Result<Vec<ObjectSpec>>;

    /// List all bootstrap configurations.
    async fn list_bootstrap_configs(&self) -> Result<BootstrapConfigs>;

    /// Create or replace the bootstrap configuration of an endpoint.
    async fn put_bootstrap_config(&self, endpoint: &str, config: &BootstrapConfig) -> Result<()>;

    /// Remove the bootstrap configuration of an endpoint.
    async fn delete_bootstrap_config(&self, endpoint: &str) -> Result<()>;

    /// List all security configurations.
    async fn list_security_configs(&self) -> Result<Vec<SecurityConfig>>;

    /// Create or replace a security configuration (endpoint is in the body).
    async fn put_security_config(&self, config: &SecurityConfig) -> Result<()>;

    /// Remove the security configuration of an endpoint.
    async fn delete_security_config(&self, endpoint: &str) -> Result<()>;
}
