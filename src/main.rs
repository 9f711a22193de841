use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use leshan_admin::config::{GatewayArgs, PipelineArgs, UpstreamArgs};
use leshan_admin::error::{AdminError, Result};
use leshan_admin::export;
use leshan_admin::pacing::FixedDelay;
use leshan_admin::pipeline::run_bulk_generate;
use leshan_admin::provision::DeviceTemplate;
use leshan_admin::server::{self, AppState};
use leshan_admin::upstream::LeshanClient;

#[derive(Parser)]
#[command(name = "leshan-admin")]
#[command(about = "Admin gateway and bulk OSCORE/EDHOC provisioning for a Leshan LwM2M server")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the admin HTTP gateway
    Serve {
        #[command(flatten)]
        gateway: GatewayArgs,
        #[command(flatten)]
        upstream: UpstreamArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Provision a range of devices once and print the summary
    Generate {
        #[command(flatten)]
        template: TemplateArgs,
        #[command(flatten)]
        upstream: UpstreamArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Write client start commands for a range without contacting Leshan
    Commands {
        #[command(flatten)]
        template: TemplateArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

/// Device range flags.
#[derive(Args)]
struct TemplateArgs {
    /// Endpoint name prefix, e.g. "Sensor".
    #[arg(long)]
    prefix: String,
    #[arg(long, default_value_t = 1)]
    start: i64,
    /// Number of devices (1-100).
    #[arg(long)]
    count: i64,
    /// Zero-padding width of the device number (1-6).
    #[arg(long, default_value_t = 2)]
    padding: i64,
}

impl TemplateArgs {
    fn to_template(&self) -> Result<DeviceTemplate> {
        DeviceTemplate::new(&self.prefix, self.start, self.count, self.padding)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; flags and the real environment still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Serve {
            gateway,
            upstream,
            pipeline,
        } => {
            gateway.validate()?;
            let client = LeshanClient::new(upstream.to_config()?)?;
            info!(upstream = %client.base_url(), "Proxying to Leshan");

            let state = AppState {
                upstream: Arc::new(client),
                pacer: Arc::new(FixedDelay::new(pipeline.device_delay())),
                pipeline: pipeline.to_config(),
                gateway_token: gateway.gateway_token.clone(),
            };
            server::serve(state, &gateway.listen_addr).await
        }
        Commands::Generate {
            template,
            upstream,
            pipeline,
        } => {
            let template = template.to_template()?;
            let client = LeshanClient::new(upstream.to_config()?)?;
            let pacer = FixedDelay::new(pipeline.device_delay());

            let summary =
                run_bulk_generate(&client, &pacer, &template, &pipeline.to_config())
                    .await;
            if summary.successful < summary.total {
                warn!(
                    successful = summary.successful,
                    total = summary.total,
                    "Some devices were not fully configured"
                );
            }

            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| AdminError::Serialization(e.to_string()))?;
            println!("{json}");
            Ok(())
        }
        Commands::Commands { template, pipeline } => {
            let template = template.to_template()?;
            let config = pipeline.to_config();
            let commands = export::plan_start_commands(&template, &config.client_command);

            let files = export::write_artifacts(&pipeline.export_dir, &commands)?;
            info!(
                count = commands.len(),
                log = %files.command_log.display(),
                "Start commands written"
            );
            Ok(())
        }
    }
}
