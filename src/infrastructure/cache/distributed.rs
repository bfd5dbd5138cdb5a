//! Distributed cache provider backed by Redis

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError, RedisResult};

use super::connection::{self, ResolvedConnection};
use crate::domain::CacheError;
use crate::domain::cache::{CacheProvider, effective_ttl};
use crate::infrastructure::observability::{OperationTimer, record_cache_operation};

/// Options for a distributed provider
#[derive(Debug, Clone, PartialEq)]
pub struct DistributedOptions {
    /// Redis URL or `host:port,option=value` endpoint list
    pub configuration: String,
    /// Logical database, overrides any database in `configuration`
    pub database: Option<i64>,
    /// Namespace prepended to every key as `{prefix}:{key}`
    pub key_prefix: Option<String>,
    /// Upper bound on establishing the connection
    pub connect_timeout: Duration,
    /// Upper bound on each command round-trip
    pub operation_timeout: Duration,
}

impl Default for DistributedOptions {
    fn default() -> Self {
        Self {
            configuration: "redis://127.0.0.1:6379".to_string(),
            database: None,
            key_prefix: None,
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(5),
        }
    }
}

impl DistributedOptions {
    /// Creates options for the given connection string
    pub fn new(configuration: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            ..Default::default()
        }
    }

    /// Sets the logical database
    pub fn with_database(mut self, database: i64) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-operation timeout
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Checks the options without touching the network
    pub fn validate(&self, name: &str) -> Result<(), CacheError> {
        self.resolve(name).map(|_| ())
    }

    fn resolve(&self, name: &str) -> Result<ResolvedSettings, CacheError> {
        let ResolvedConnection {
            mut info,
            connect_timeout,
            sync_timeout,
            ignored_endpoints,
        } = connection::resolve(&self.configuration)
            .map_err(|message| CacheError::invalid_config(name, message))?;

        if let Some(database) = self.database {
            if database < 0 {
                return Err(CacheError::invalid_config(name, "database cannot be negative"));
            }
            info.redis.db = database;
        }

        if self.key_prefix.as_deref().is_some_and(str::is_empty) {
            return Err(CacheError::invalid_config(name, "key_prefix cannot be empty"));
        }

        let connect_timeout = connect_timeout.unwrap_or(self.connect_timeout);
        let operation_timeout = sync_timeout.unwrap_or(self.operation_timeout);

        if connect_timeout.is_zero() || operation_timeout.is_zero() {
            return Err(CacheError::invalid_config(name, "timeouts must be greater than 0"));
        }

        if !ignored_endpoints.is_empty() {
            tracing::warn!(
                provider = name,
                ignored = ?ignored_endpoints,
                "Only the first endpoint of the connection string is used"
            );
        }

        let client = Client::open(info)
            .map_err(|e| CacheError::invalid_config(name, format!("invalid connection: {}", e)))?;

        Ok(ResolvedSettings {
            client,
            connect_timeout,
            operation_timeout,
        })
    }
}

struct ResolvedSettings {
    client: Client,
    connect_timeout: Duration,
    operation_timeout: Duration,
}

/// Redis-backed cache provider
///
/// Redis enforces expiry server-side, so `get_raw` and `exists` observe the same
/// state. The connection manager reconnects on its own after transient failures;
/// this provider never retries a failed command.
#[derive(Clone)]
pub struct DistributedProvider {
    name: String,
    connection: ConnectionManager,
    key_prefix: Option<String>,
    operation_timeout: Duration,
}

impl fmt::Debug for DistributedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedProvider")
            .field("name", &self.name)
            .field("key_prefix", &self.key_prefix)
            .field("operation_timeout", &self.operation_timeout)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl DistributedProvider {
    /// Connects to the backend.
    ///
    /// Fails with [`CacheError::ProviderInitialization`] when the store cannot be
    /// reached within the connect timeout.
    pub async fn connect(
        name: impl Into<String>,
        options: &DistributedOptions,
    ) -> Result<Self, CacheError> {
        let name = name.into();
        let settings = options.resolve(&name)?;

        let connection =
            tokio::time::timeout(settings.connect_timeout, ConnectionManager::new(settings.client))
                .await
                .map_err(|_| {
                    CacheError::initialization(
                        &name,
                        format!("connection timed out after {:?}", settings.connect_timeout),
                    )
                })?
                .map_err(|e| {
                    CacheError::initialization(&name, format!("failed to connect to Redis: {}", e))
                })?;

        Ok(Self {
            name,
            connection,
            key_prefix: options.key_prefix.clone(),
            operation_timeout: settings.operation_timeout,
        })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Runs one command under the operation timeout, mapping failures
    async fn run<T, F>(&self, operation: &'static str, key: &str, command: F) -> Result<T, CacheError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(self.map_error(operation, key, e)),
            Err(_) => {
                tracing::warn!(
                    provider = %self.name,
                    operation,
                    key,
                    timeout = ?self.operation_timeout,
                    "Cache operation timed out"
                );
                Err(CacheError::timeout(&self.name, operation, self.operation_timeout))
            }
        }
    }

    fn map_error(&self, operation: &'static str, key: &str, error: RedisError) -> CacheError {
        if error.kind() == ErrorKind::TypeError || error.code() == Some("WRONGTYPE") {
            return CacheError::type_mismatch(key, "string", error.to_string());
        }

        tracing::warn!(
            provider = %self.name,
            operation,
            key,
            error = %error,
            "Cache backend unavailable"
        );

        CacheError::backend_unavailable(
            &self.name,
            format!("{} '{}' failed: {}", operation, key, error),
        )
    }
}

fn outcome<T>(result: &Result<T, CacheError>, success: &'static str) -> &'static str {
    match result {
        Ok(_) => success,
        Err(CacheError::Timeout { .. }) => "timeout",
        Err(_) => "error",
    }
}

#[async_trait]
impl CacheProvider for DistributedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let timer = OperationTimer::start();
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Result<Option<String>, _> =
            self.run("get", key, conn.get(&prefixed_key)).await;

        let label = match &result {
            Ok(Some(_)) => "hit",
            Ok(None) => "miss",
            Err(_) => outcome(&result, "ok"),
        };
        record_cache_operation(&self.name, "get", label, timer.elapsed());

        result
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let timer = OperationTimer::start();
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Result<(), _> = match effective_ttl(ttl) {
            Some(ttl) => {
                // PSETEX rejects 0, sub-millisecond TTLs round up
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                self.run("set", key, conn.pset_ex(&prefixed_key, value, millis))
                    .await
            }
            None => self.run("set", key, conn.set(&prefixed_key, value)).await,
        };

        record_cache_operation(&self.name, "set", outcome(&result, "ok"), timer.elapsed());
        result
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let timer = OperationTimer::start();
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Result<i64, _> = self.run("remove", key, conn.del(&prefixed_key)).await;

        record_cache_operation(&self.name, "remove", outcome(&result, "ok"), timer.elapsed());
        result.map(|_| ())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let timer = OperationTimer::start();
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Result<bool, _> = self.run("exists", key, conn.exists(&prefixed_key)).await;

        let label = match &result {
            Ok(true) => "hit",
            Ok(false) => "miss",
            Err(_) => outcome(&result, "ok"),
        };
        record_cache_operation(&self.name, "exists", label, timer.elapsed());

        result
    }
}
