use crate::config::DbConfig;
use crate::source::{RecordSource, newest_first};
use crate::{FetchError, Result};
use apiwatch_core::record::{LogRecord, RawResponse};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow};

/// Reads the most recent rows of the API log table
///
/// A short-lived single-connection pool is opened per fetch; callers are
/// expected to sit behind [`crate::CachedSource`].
pub struct MySqlSource {
    config: DbConfig,
}

impl MySqlSource {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    fn query(&self) -> String {
        // Table name is validated as a plain identifier in DbSettings::resolve
        format!(
            "SELECT CAST(id AS CHAR) AS id, apiName, createdAt, CAST(response AS CHAR) AS response \
             FROM `{}` ORDER BY createdAt DESC LIMIT ?",
            self.config.table
        )
    }
}

#[async_trait]
impl RecordSource for MySqlSource {
    fn describe(&self) -> String {
        format!(
            "mysql://{}@{}:{}/{}.{}",
            self.config.user,
            self.config.host,
            self.config.port,
            self.config.database,
            self.config.table
        )
    }

    async fn fetch(&self) -> Result<Vec<LogRecord>> {
        let config = &self.config;
        tracing::info!("Connecting to log store at {}", self.describe());

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(FetchError::Connect)?;

        let rows = sqlx::query(&self.query())
            .bind(config.row_limit)
            .fetch_all(&pool)
            .await
            .map_err(FetchError::Query);
        pool.close().await;
        let rows = rows?;

        let mut records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>>>()?;
        newest_first(&mut records);

        tracing::info!("Fetched {} log rows", records.len());
        Ok(records)
    }
}

fn row_to_record(row: &MySqlRow) -> Result<LogRecord> {
    let id: Option<String> = row.try_get("id").map_err(FetchError::Query)?;
    let api_name: String = row.try_get("apiName").map_err(FetchError::Query)?;
    let created_at: NaiveDateTime = row.try_get("createdAt").map_err(FetchError::Query)?;
    let response: Option<String> = row.try_get("response").map_err(FetchError::Query)?;

    Ok(LogRecord::new(
        id.unwrap_or_default(),
        api_name,
        created_at,
        RawResponse::from(response),
    ))
}
