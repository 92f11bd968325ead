use receipt_splitter::config::StorageBackend;
use receipt_splitter::db::{MemoryReceiptStore, PgReceiptStore, ReceiptStore};
use receipt_splitter::extraction::{AzureReceiptExtractor, ReceiptExtractor};
use receipt_splitter::{api, create_pool, ensure_schema, AppConfig, AppError, ReceiptService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 存储
    let store: Arc<dyn ReceiptStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgReceiptStore::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory receipt store");
            Arc::new(MemoryReceiptStore::new())
        }
    };

    let extractor: Arc<dyn ReceiptExtractor> = Arc::new(AzureReceiptExtractor::new(&config.extraction));
    let service = Arc::new(ReceiptService::new(extractor, store));
    let app = api::router(api::AppState::new(service));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /receipts/process-receipt");
    info!("  GET    /receipts");
    info!("  PUT    /receipts/:id");
    info!("  DELETE /receipts/:id");
    info!("  POST   /receipts/:id/split");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
