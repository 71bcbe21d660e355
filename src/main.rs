//! provider-grpc - reconciles GrpcKind resources against the list service

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, CustomResourceExt};

use provider_grpc::client::GrpcListService;
use provider_grpc::config::{ListServiceConfig, ReconcileConfig, DEFAULT_LIST_SERVICE_ENDPOINT};
use provider_grpc::controller::{error_policy, reconcile, Context};
use provider_grpc::crd::GrpcKind;
use provider_grpc::external::ListExternal;
use provider_grpc::retry::RetryConfig;
use provider_grpc::telemetry::{init_tracing, LogFormat};

/// provider-grpc - manage lists on a remote gRPC service from Kubernetes
#[derive(Parser, Debug)]
#[command(name = "provider-grpc", version, about, long_about = None)]
struct Cli {
    /// Generate the GrpcKind CRD manifest and exit
    #[arg(long)]
    crd: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as controller (default mode)
    ///
    /// Installs the GrpcKind CRD, connects to the list service and reconciles
    /// GrpcKind resources until interrupted.
    Controller(ControllerArgs),
}

/// Controller mode arguments
#[derive(Parser, Debug)]
struct ControllerArgs {
    /// Address of the list service
    #[arg(long, env = "LIST_SERVICE_ENDPOINT", default_value = DEFAULT_LIST_SERVICE_ENDPOINT)]
    list_service_endpoint: String,

    /// Timeout for establishing the list service channel, in seconds
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value = "10")]
    connect_timeout_secs: u64,

    /// Timeout for each list service call, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// How often an in-sync GrpcKind is observed again, in seconds
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "60")]
    poll_interval_secs: u64,

    /// Requeue delay after a failed reconcile, in seconds
    #[arg(long, env = "ERROR_BACKOFF_SECS", default_value = "5")]
    error_backoff_secs: u64,

    /// Do not install the GrpcKind CRD on startup
    #[arg(long, env = "SKIP_CRD_INSTALL")]
    skip_crd_install: bool,
}

impl ControllerArgs {
    fn list_service_config(&self) -> ListServiceConfig {
        ListServiceConfig {
            endpoint: self.list_service_endpoint.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.crd {
        let crd = serde_yaml::to_string(&GrpcKind::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize CRD: {}", e))?;
        println!("{crd}");
        return Ok(());
    }

    init_tracing(cli.log_format)?;

    match cli.command {
        Some(Commands::Controller(args)) => run_controller(args).await,
        // Without a subcommand, controller flags come from the environment
        None => run_controller(ControllerArgs::parse_from(["controller"])).await,
    }
}

/// Ensure the GrpcKind CRD is installed
///
/// Uses server-side apply so the installed CRD always matches this binary.
async fn ensure_crd_installed(client: &Client) -> anyhow::Result<()> {
    use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
    use kube::api::{Patch, PatchParams};

    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    let params = PatchParams::apply("provider-grpc").force();

    tracing::info!("Installing GrpcKind CRD...");
    crds.patch(
        "grpckinds.mygroup.grpc.crossplane.io",
        &params,
        &Patch::Apply(&GrpcKind::crd()),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to install GrpcKind CRD: {}", e))?;

    Ok(())
}

/// Run the GrpcKind controller until a shutdown signal arrives
async fn run_controller(args: ControllerArgs) -> anyhow::Result<()> {
    tracing::info!("Starting provider-grpc controller");

    let client = Client::try_default()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

    if args.skip_crd_install {
        tracing::info!("Skipping CRD installation");
    } else {
        ensure_crd_installed(&client).await?;
    }

    let list_config = args.list_service_config();
    tracing::info!(endpoint = %list_config.uri(), "Connecting to list service...");
    let service = GrpcListService::connect_with_retry(&list_config, &RetryConfig::default())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to list service: {}", e))?;

    let ctx = Arc::new(Context::new(
        client.clone(),
        Arc::new(ListExternal::new(service)),
        args.reconcile_config(),
    ));

    let kinds: Api<GrpcKind> = Api::all(client);

    tracing::info!("Starting GrpcKind controller...");
    Controller::new(kinds, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok(action) => tracing::debug!(?action, "Reconciliation completed"),
                Err(e) => tracing::error!(error = ?e, "Reconciliation error"),
            }
        })
        .await;

    tracing::info!("Shutting down");
    Ok(())
}
