use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// 连接参数: URL + 慢查询日志阈值
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    let options = PgConnectOptions::from_str(&config.url)?;
    Ok(options.log_slow_statements(
        tracing::log::LevelFilter::Warn,
        Duration::from_secs(config.slow_statement_secs),
    ))
}

/// 创建数据库连接池, 连接数和获取超时取自配置
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(config)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        "Database pool ready (max {} connections, acquire timeout {}s)",
        config.max_connections,
        config.acquire_timeout_secs
    );
    Ok(pool)
}

/// 建表 (不存在时)
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS receipts (
            id          BIGSERIAL PRIMARY KEY,
            record_type TEXT NOT NULL DEFAULT 'receipt',
            name        TEXT NOT NULL,
            date        TIMESTAMPTZ NOT NULL,
            total       NUMERIC NOT NULL,
            items       JSONB NOT NULL DEFAULT '[]'::jsonb,
            tax         NUMERIC NOT NULL DEFAULT 0,
            discount    NUMERIC NOT NULL DEFAULT 0,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_receipts_date ON receipts (date DESC)")
        .execute(pool)
        .await?;

    tracing::info!("Receipt schema ready");
    Ok(())
}
