//! n8n Workflow Builder
//!
//! MCP server for managing n8n workflows, with node-type validation against
//! the instance's live node catalog.
//!
//! ```text
//!  MCP client ──stdio / HTTP──▶ WorkflowBuilderServer ──▶ N8nApiClient ──▶ n8n /api/v1
//!                                        │
//!                                        ▼
//!                                   NodeCatalog ──────────▶ n8n /node-types
//! ```

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use n8n_workflow_builder::{
    serve_stdio, ApiClientConfig, ApiServer, ApiServerConfig, CatalogConfig, Error, N8nApiClient,
    NodeCatalog, Result, SystemClock, WorkflowBuilderServer,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// How the MCP server talks to its client
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// MCP over stdin/stdout
    Stdio,
    /// REST API plus MCP Streamable HTTP at /mcp
    Http,
}

/// n8n Workflow Builder - MCP server for the n8n REST API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the n8n instance
    #[arg(long, env = "N8N_HOST", default_value = "http://localhost:5678")]
    n8n_host: String,

    /// n8n API key
    #[arg(long, env = "N8N_API_KEY", default_value = "", hide_env_values = true)]
    n8n_api_key: String,

    /// MCP transport
    #[arg(long, env = "TRANSPORT", value_enum, default_value = "stdio")]
    transport: Transport,

    /// REST/MCP HTTP bind address (http transport only)
    #[arg(long, env = "API_ADDR", default_value = "127.0.0.1:8090")]
    api_addr: String,

    /// Allow cross-origin requests (http transport only)
    #[arg(long, env = "CORS")]
    cors: bool,

    /// Seconds a loaded node catalog stays fresh
    #[arg(long, env = "CATALOG_TTL_SECS", default_value = "3600")]
    catalog_ttl_secs: u64,

    /// Timeout for each n8n request in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting n8n Workflow Builder");
    info!("  Version: {}", n8n_workflow_builder::VERSION);
    info!("  n8n host: {}", args.n8n_host);
    info!("  Transport: {:?}", args.transport);
    if args.n8n_api_key.is_empty() {
        warn!("N8N_API_KEY is not set; requests to n8n will be unauthenticated");
    }

    let client = Arc::new(N8nApiClient::new(ApiClientConfig {
        base_url: args.n8n_host.clone(),
        api_key: Some(args.n8n_api_key.clone()),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
    })?);

    let catalog = NodeCatalog::new(
        client.clone(),
        Arc::new(SystemClock),
        CatalogConfig {
            freshness_window: Duration::from_secs(args.catalog_ttl_secs),
            ..Default::default()
        },
    );

    // Warm the catalog so the first validation does not wait on n8n
    {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            catalog.ensure_loaded().await;
            info!(node_count = catalog.node_count(), "Node catalog warmed up");
        });
    }

    match args.transport {
        Transport::Stdio => {
            serve_stdio(WorkflowBuilderServer::new(client, catalog)).await?;
        }
        Transport::Http => {
            let addr: SocketAddr = args.api_addr.parse().map_err(|e| {
                Error::Configuration(format!("Invalid API address {}: {}", args.api_addr, e))
            })?;

            let config = ApiServerConfig {
                addr,
                cors_enabled: args.cors,
                ..Default::default()
            };
            let server = Arc::new(ApiServer::new(config, client, catalog));

            {
                let server = server.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("Received Ctrl-C");
                        server.shutdown();
                    }
                });
            }

            server.run().await?;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = ["hyper=warn", "reqwest=info", "tower=warn", "axum=info", "rmcp=info"]
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(
            EnvFilter::from_default_env().add_directive(level.into()),
            |filter, directive| filter.add_directive(directive),
        );

    // stdout carries protocol frames in stdio mode
    let writer = match args.transport {
        Transport::Stdio => BoxMakeWriter::new(std::io::stderr),
        Transport::Http => BoxMakeWriter::new(std::io::stdout),
    };

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_ansi(false).with_writer(writer))
            .init();
    }
}
