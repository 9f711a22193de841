/// Bulk provisioning pipeline.
///
/// For each endpoint, in order:
/// 1. Derive the OSCORE credential from the 1-based run position
/// 2. Store the bootstrap configuration (POST /api/bsclients/{endpoint})
/// 3. Store the security configuration (PUT /api/clients)
/// 4. Record the client start command
/// 5. Wait on the pacer before the next endpoint
///
/// Steps 2 and 3 are independent: a failure in one neither skips nor
/// undoes the other, and neither aborts the run. Every device ends up in
/// the summary with its own outcome. Start commands are exported once the
/// loop completes and list only devices with both configurations stored.
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::export::{self, ClientCommand, StartCommand};
use crate::pacing::Pacer;
use crate::provision::{
    build_bootstrap_config, build_security_config, derive_credential, generate_endpoints,
    DeviceTemplate, OscoreCredential,
};
use crate::upstream::LeshanApi;

/// Outcome for a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResult {
    pub endpoint: String,
    pub bootstrap_ok: bool,
    pub security_ok: bool,
    /// Upstream failure text; both failures are joined with `"; "`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscore: Option<OscoreCredential>,
}

impl ConfigResult {
    pub fn is_complete(&self) -> bool {
        self.bootstrap_ok && self.security_ok
    }
}

/// Result of a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigureSummary {
    /// Devices with both configurations stored.
    pub successful: usize,
    pub total: usize,
    pub results: Vec<ConfigResult>,
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Where start-command artifacts go. `None` disables the export.
    ///
    /// Runs sharing a directory overwrite each other's files; the last run
    /// to finish wins.
    pub export_dir: Option<PathBuf>,
    pub client_command: ClientCommand,
}

/// Expand a template and provision every resulting endpoint.
pub async fn run_bulk_generate(
    api: &dyn LeshanApi,
    pacer: &dyn Pacer,
    template: &DeviceTemplate,
    config: &PipelineConfig,
) -> ConfigureSummary {
    let endpoints = generate_endpoints(template);
    bulk_configure(api, pacer, &endpoints, config).await
}

/// Provision `endpoints` sequentially against the Leshan server.
pub async fn bulk_configure(
    api: &dyn LeshanApi,
    pacer: &dyn Pacer,
    endpoints: &[String],
    config: &PipelineConfig,
) -> ConfigureSummary {
    let run_id = Uuid::now_v7();
    let span = info_span!("bulk_configure", %run_id, total = endpoints.len());

    async move {
        info!("Starting bulk configuration");

        let total = endpoints.len();
        let mut results = Vec::with_capacity(total);

        for (endpoint, seq) in endpoints.iter().zip(1u32..) {
            if seq > 1 {
                pacer.pace().await;
            }

            let result = configure_device(api, endpoint, seq, &config.client_command).await;
            info!(
                endpoint = %endpoint,
                bootstrap = result.bootstrap_ok,
                security = result.security_ok,
                progress = %format!("{seq}/{total}"),
                "Device processed"
            );
            results.push(result);
        }

        let successful = results.iter().filter(|r| r.is_complete()).count();
        info!(successful, total, "Bulk configuration complete");

        if let Some(dir) = &config.export_dir {
            let commands: Vec<StartCommand> = results
                .iter()
                .filter(|r| r.is_complete())
                .filter_map(|r| {
                    Some(StartCommand {
                        endpoint: r.endpoint.clone(),
                        command: r.command.clone()?,
                        oscore: r.oscore.clone()?,
                    })
                })
                .collect();

            if let Err(e) = export::write_artifacts(dir, &commands) {
                warn!(dir = %dir.display(), error = %e, "Failed to export start commands");
            }
        }

        ConfigureSummary {
            successful,
            total,
            results,
        }
    }
    .instrument(span)
    .await
}

/// Store both configurations for one device and record the outcome.
async fn configure_device(
    api: &dyn LeshanApi,
    endpoint: &str,
    seq: u32,
    client_command: &ClientCommand,
) -> ConfigResult {
    let oscore = derive_credential(seq);
    let mut errors = Vec::new();

    let bootstrap = build_bootstrap_config(endpoint, &oscore);
    let bootstrap_ok = match api.put_bootstrap_config(endpoint, &bootstrap).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                endpoint = %endpoint,
                error = %e,
                master_secret = %oscore.master_secret,
                sender_id = %oscore.sender_id,
                recipient_id = %oscore.recipient_id,
                "Bootstrap config failed"
            );
            errors.push(format!("Bootstrap failed: {}", e.detail()));
            false
        }
    };

    let security = build_security_config(endpoint, &oscore);
    let security_ok = match api.put_security_config(&security).await {
        Ok(()) => true,
        Err(e) => {
            warn!(endpoint = %endpoint, error = %e, "Security config failed");
            errors.push(format!("Security failed: {}", e.detail()));
            false
        }
    };

    // No compensation: a lone bootstrap or security entry stays upstream.
    if bootstrap_ok != security_ok {
        warn!(
            endpoint = %endpoint,
            bootstrap = bootstrap_ok,
            security = security_ok,
            "Device left partially configured"
        );
    }

    ConfigResult {
        endpoint: endpoint.to_string(),
        bootstrap_ok,
        security_ok,
        error: (!errors.is_empty()).then(|| errors.join("; ")),
        command: Some(client_command.render(endpoint, &oscore)),
        oscore: Some(oscore),
    }
}
