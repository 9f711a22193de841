/// Runtime configuration for leshan-admin.
///
/// Everything is resolved once at process start from command-line flags
/// and environment variables (a `.env` file is loaded first by `main`),
/// then passed down explicitly to the upstream client, the pipeline and
/// the gateway handlers.
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use reqwest::Url;

use crate::error::{AdminError, Result};
use crate::export::ClientCommand;
use crate::pipeline::PipelineConfig;

/// How requests to the Leshan server are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamAuth {
    /// No credentials (local development server).
    None,
    /// HTTP Basic credentials, e.g. for an nginx front.
    Basic { username: String, password: String },
    /// Static `X-Auth-Token` header.
    Token(String),
}

/// Connection settings for the Leshan REST API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub auth: UpstreamAuth,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(base_url: &str, auth: UpstreamAuth, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AdminError::Config(format!("Invalid upstream URL {base_url:?}: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(AdminError::Config(format!(
                "Upstream URL {base_url} cannot carry a path"
            )));
        }

        Ok(Self {
            base_url,
            auth,
            timeout,
        })
    }
}

/// Upstream connection flags shared by every subcommand that talks to Leshan.
#[derive(Debug, Clone, Args)]
pub struct UpstreamArgs {
    /// Base URL of the Leshan server REST API.
    #[arg(long, env = "LESHAN_BASE_URL", default_value = "http://localhost")]
    pub leshan_url: String,

    /// Static token sent as `X-Auth-Token` to the Leshan server.
    #[arg(long, env = "LESHAN_AUTH_TOKEN")]
    pub leshan_token: Option<String>,

    /// Basic-Auth user for the Leshan server.
    #[arg(long, env = "LESHAN_USERNAME", requires = "leshan_password")]
    pub leshan_username: Option<String>,

    /// Basic-Auth password for the Leshan server.
    #[arg(long, env = "LESHAN_PASSWORD")]
    pub leshan_password: Option<String>,

    /// Per-request timeout for upstream calls, in seconds.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,
}

impl UpstreamArgs {
    /// Pick the authentication variant. A token wins over Basic credentials.
    pub fn auth(&self) -> UpstreamAuth {
        if let Some(token) = self.leshan_token.as_ref().filter(|t| !t.is_empty()) {
            return UpstreamAuth::Token(token.clone());
        }

        match (&self.leshan_username, &self.leshan_password) {
            (Some(username), Some(password)) if !username.is_empty() => UpstreamAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            },
            _ => UpstreamAuth::None,
        }
    }

    pub fn to_config(&self) -> Result<UpstreamConfig> {
        UpstreamConfig::new(
            &self.leshan_url,
            self.auth(),
            Duration::from_secs(self.upstream_timeout_secs),
        )
    }
}

/// Bulk provisioning flags: pacing and artifact export.
#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Pause between two devices of a bulk run, in milliseconds.
    #[arg(long, env = "DEVICE_DELAY_MS", default_value_t = 500)]
    pub device_delay_ms: u64,

    /// Directory receiving the client start-command artifacts.
    #[arg(long, env = "EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Skip writing start-command artifacts.
    #[arg(long)]
    pub no_export: bool,

    /// Client jar referenced by the generated start commands.
    #[arg(long, env = "CLIENT_JAR", default_value = "leshan-client-demo.jar")]
    pub client_jar: String,

    /// Server host passed to the client with `-u`.
    #[arg(long, env = "CLIENT_SERVER_HOST", default_value = "127.0.0.1")]
    pub client_server_host: String,
}

impl PipelineArgs {
    pub fn device_delay(&self) -> Duration {
        Duration::from_millis(self.device_delay_ms)
    }

    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            export_dir: (!self.no_export).then(|| self.export_dir.clone()),
            client_command: ClientCommand {
                jar: self.client_jar.clone(),
                server_host: self.client_server_host.clone(),
            },
        }
    }
}

/// Gateway flags.
#[derive(Debug, Clone, Args)]
pub struct GatewayArgs {
    /// Address the gateway listens on.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:4000")]
    pub listen_addr: String,

    /// Bearer token callers must present.
    #[arg(long, env = "GATEWAY_TOKEN")]
    pub gateway_token: String,
}

impl GatewayArgs {
    pub fn validate(&self) -> Result<()> {
        if self.gateway_token.trim().is_empty() {
            return Err(AdminError::Config("GATEWAY_TOKEN must not be empty".into()));
        }
        Ok(())
    }
}
