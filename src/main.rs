// src/main.rs

use axum::{Router, routing::{get, post}, serve};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

mod api;
mod bidding;
mod config;
mod error;
mod logging;
mod model;
mod openrtb;
mod mock_vendor;

use bidding::usersync::AdgenerationSyncer;
use bidding::vendor_client::VendorClient;
use config::config_manager::{ConfigManager, DEFAULT_CURRENCY, DEFAULT_ENDPOINT, DEFAULT_SYNC_URL};
use logging::runtime_logger::{LogLevel, RuntimeLogger};

#[derive(Clone)]
pub struct AppState {
    pub runtime_logger: Arc<RuntimeLogger>,
    pub config: Arc<ConfigManager>,
    pub client: VendorClient,
    pub syncer: AdgenerationSyncer,
}

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version = "1.0", about = "An OpenRTB bidder adapter for Ad Generation")]
struct CliArgs {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "logs")]
    log_dir: String,
    /// Ad Generation 竞价接口地址
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,
    #[arg(long, default_value = DEFAULT_SYNC_URL)]
    sync_url: String,
    /// 大于 0 时启动本地 Mock 服务
    #[arg(long, default_value_t = 0)]
    mock_port: u16,
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let log_file = rolling::hourly(&args.log_dir, "adg_bidder.json");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().with_writer(non_blocking));
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Unable to set global tracing subscriber: {}", e);
        return;
    }
    info!("ADG bidder starting on port {}", args.port);

    // 初始化运行日志记录器
    let runtime_logger = RuntimeLogger::new(&args.log_dir, "runtime", 1000, 100, 1000);
    runtime_logger.log(LogLevel::Info, "ADG bidder is starting...").await;

    if args.mock_port > 0 {
        let mock_port = args.mock_port;
        tokio::spawn(async move {
            mock_vendor::start_mock_vendor_server(mock_port).await;
        });
    }

    let config = Arc::new(ConfigManager::from_args(&args.endpoint, &args.currency, &args.sync_url));
    let state = Arc::new(AppState {
        runtime_logger: runtime_logger.clone(),
        syncer: AdgenerationSyncer::new(&config.sync_url),
        client: VendorClient::new(),
        config,
    });

    let app = Router::new()
        .route("/openrtb", post(api::handlers::handle_openrtb_request))
        .route("/usersync", get(api::handlers::handle_usersync))
        .with_state(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            runtime_logger.log(LogLevel::Error, &format!("Failed to bind {}: {}", addr, e)).await;
            runtime_logger.shutdown().await;
            return;
        }
    };
    runtime_logger.log(LogLevel::Info, &format!("ADG bidder running at http://{}", addr)).await;

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
    };
    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!("ADG bidder server error: {}", e);
    }

    runtime_logger.log(LogLevel::Info, "ADG bidder shut down.").await;
    runtime_logger.shutdown().await;
}
