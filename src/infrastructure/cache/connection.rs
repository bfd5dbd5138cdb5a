//! Distributed connection string parsing
//!
//! Two forms are accepted:
//! - a URL: `redis://[user:password@]host[:port][/db]` (or `rediss://`, `unix://`)
//! - an endpoint list: `host:port,password=secret,defaultDatabase=2,ssl=false,...`
//!
//! In the endpoint form only the first endpoint is used and unknown options
//! (`allowAdmin`, `abortConnect`, `name`, ...) are ignored.

use std::time::Duration;

use redis::{ConnectionInfo, IntoConnectionInfo};

pub const DEFAULT_REDIS_PORT: u16 = 6379;

const URL_SCHEMES: [&str; 4] = ["redis://", "rediss://", "unix://", "redis+unix://"];

/// Parsed endpoint-list connection string
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<i64>,
    pub ssl: bool,
    pub connect_timeout: Option<Duration>,
    pub sync_timeout: Option<Duration>,
    /// Endpoints listed after the first one
    pub ignored_endpoints: Vec<String>,
}

impl EndpointConfig {
    pub fn parse(configuration: &str) -> Result<Self, String> {
        let mut endpoint: Option<(String, u16)> = None;
        let mut ignored_endpoints = Vec::new();
        let mut config = Self {
            host: String::new(),
            port: DEFAULT_REDIS_PORT,
            username: None,
            password: None,
            database: None,
            ssl: false,
            connect_timeout: None,
            sync_timeout: None,
            ignored_endpoints: Vec::new(),
        };

        for token in configuration.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let Some((key, value)) = token.split_once('=') else {
                if endpoint.is_none() {
                    endpoint = Some(parse_endpoint(token)?);
                } else {
                    ignored_endpoints.push(token.to_string());
                }
                continue;
            };

            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "password" => config.password = Some(value.to_string()),
                "user" => config.username = Some(value.to_string()),
                "defaultdatabase" => {
                    config.database = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid defaultDatabase '{}'", value))?,
                    );
                }
                "ssl" => {
                    config.ssl = value
                        .to_lowercase()
                        .parse()
                        .map_err(|_| format!("invalid ssl flag '{}'", value))?;
                }
                "connecttimeout" => config.connect_timeout = Some(parse_millis(key, value)?),
                "synctimeout" | "asynctimeout" => {
                    config.sync_timeout = Some(parse_millis(key, value)?)
                }
                _ => {}
            }
        }

        let (host, port) = endpoint.ok_or_else(|| "no endpoint in connection string".to_string())?;
        config.host = host;
        config.port = port;
        config.ignored_endpoints = ignored_endpoints;

        Ok(config)
    }

    /// URL without credentials or database, which are applied separately
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "rediss" } else { "redis" };

        if self.host.contains(':') {
            format!("{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        }
    }
}

fn parse_endpoint(token: &str) -> Result<(String, u16), String> {
    if let Some(rest) = token.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| format!("unterminated IPv6 endpoint '{}'", token))?;

        let port = match after.strip_prefix(':') {
            Some(port) => parse_port(port)?,
            None if after.is_empty() => DEFAULT_REDIS_PORT,
            None => return Err(format!("invalid endpoint '{}'", token)),
        };

        return Ok((host.to_string(), port));
    }

    match token.rsplit_once(':') {
        Some((host, _)) if host.is_empty() => Err(format!("missing host in endpoint '{}'", token)),
        Some((host, port)) if !host.contains(':') => Ok((host.to_string(), parse_port(port)?)),
        // bare IPv6 address without a port
        _ => Ok((token.to_string(), DEFAULT_REDIS_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16, String> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("invalid port '{}'", port)),
        Ok(port) => Ok(port),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, String> {
    value
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| format!("invalid {} '{}'", key, value))
}

/// Connection target plus any timeouts the connection string carried
#[derive(Debug, Clone)]
pub struct ResolvedConnection {
    pub info: ConnectionInfo,
    pub connect_timeout: Option<Duration>,
    pub sync_timeout: Option<Duration>,
    pub ignored_endpoints: Vec<String>,
}

/// Turns either connection string form into redis connection parameters
pub fn resolve(configuration: &str) -> Result<ResolvedConnection, String> {
    let configuration = configuration.trim();

    if configuration.is_empty() {
        return Err("connection string cannot be empty".to_string());
    }

    if URL_SCHEMES.iter().any(|scheme| configuration.starts_with(scheme)) {
        let info = configuration
            .into_connection_info()
            .map_err(|e| format!("invalid connection URL: {}", e))?;

        return Ok(ResolvedConnection {
            info,
            connect_timeout: None,
            sync_timeout: None,
            ignored_endpoints: Vec::new(),
        });
    }

    let endpoint = EndpointConfig::parse(configuration)?;
    let mut info = endpoint
        .base_url()
        .as_str()
        .into_connection_info()
        .map_err(|e| format!("invalid endpoint: {}", e))?;

    info.redis.username = endpoint.username;
    info.redis.password = endpoint.password;

    if let Some(database) = endpoint.database {
        info.redis.db = database;
    }

    Ok(ResolvedConnection {
        info,
        connect_timeout: endpoint.connect_timeout,
        sync_timeout: endpoint.sync_timeout,
        ignored_endpoints: endpoint.ignored_endpoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint_with_flags() {
        let config = EndpointConfig::parse("10.10.188.136:6379,allowadmin=true").unwrap();

        assert_eq!(config.host, "10.10.188.136");
        assert_eq!(config.port, 6379);
        assert_eq!(config.password, None);
        assert!(!config.ssl);
    }

    #[test]
    fn test_parse_default_port() {
        let config = EndpointConfig::parse("cache.internal").unwrap();
        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.port, DEFAULT_REDIS_PORT);
    }

    #[test]
    fn test_parse_all_options() {
        let config = EndpointConfig::parse(
            "localhost:6380, password=s3cret, user=app, defaultDatabase=3, ssl=True, \
             connectTimeout=1500, syncTimeout=250, abortConnect=false",
        )
        .unwrap();

        assert_eq!(config.port, 6380);
        assert_eq!(config.password.as_deref(), Some("s3cret"));
        assert_eq!(config.username.as_deref(), Some("app"));
        assert_eq!(config.database, Some(3));
        assert!(config.ssl);
        assert_eq!(config.connect_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.sync_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.base_url(), "rediss://localhost:6380");
    }

    #[test]
    fn test_parse_password_with_special_characters() {
        let config = EndpointConfig::parse("localhost,password=p@ss:w/rd").unwrap();
        assert_eq!(config.password.as_deref(), Some("p@ss:w/rd"));
    }

    #[test]
    fn test_parse_ipv6() {
        let config = EndpointConfig::parse("[::1]:7000").unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 7000);
        assert_eq!(config.base_url(), "redis://[::1]:7000");

        let bare = EndpointConfig::parse("::1").unwrap();
        assert_eq!(bare.host, "::1");
        assert_eq!(bare.port, DEFAULT_REDIS_PORT);
    }

    #[test]
    fn test_parse_multiple_endpoints_keeps_first() {
        let config = EndpointConfig::parse("primary:6379,replica:6379").unwrap();
        assert_eq!(config.host, "primary");
        assert_eq!(config.ignored_endpoints, vec!["replica:6379".to_string()]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(EndpointConfig::parse("allowadmin=true").is_err());
        assert!(EndpointConfig::parse("localhost:notaport").is_err());
        assert!(EndpointConfig::parse("localhost:0").is_err());
        assert!(EndpointConfig::parse(":6379").is_err());
        assert!(EndpointConfig::parse("localhost,defaultDatabase=x").is_err());
        assert!(EndpointConfig::parse("localhost,ssl=maybe").is_err());
        assert!(EndpointConfig::parse("localhost,syncTimeout=-5").is_err());
        assert!(EndpointConfig::parse("[::1").is_err());
    }

    #[test]
    fn test_resolve_endpoint_form() {
        let resolved =
            resolve("127.0.0.1:6379,password=secret,defaultDatabase=4,syncTimeout=100").unwrap();

        assert_eq!(resolved.info.redis.password.as_deref(), Some("secret"));
        assert_eq!(resolved.info.redis.db, 4);
        assert_eq!(resolved.sync_timeout, Some(Duration::from_millis(100)));
        assert_eq!(resolved.connect_timeout, None);
    }

    #[test]
    fn test_resolve_url_form() {
        let resolved = resolve("redis://:pw@127.0.0.1:6379/2").unwrap();

        assert_eq!(resolved.info.redis.password.as_deref(), Some("pw"));
        assert_eq!(resolved.info.redis.db, 2);
        assert!(resolved.sync_timeout.is_none());
    }

    #[test]
    fn test_resolve_tls() {
        use redis::ConnectionAddr;

        let endpoint = resolve("localhost:6380,ssl=true,password=secret").unwrap();
        assert!(matches!(
            endpoint.info.addr,
            ConnectionAddr::TcpTls { ref host, port: 6380, .. } if host == "localhost"
        ));
        assert_eq!(endpoint.info.redis.password.as_deref(), Some("secret"));

        let url = resolve("rediss://cache.internal:6380/1").unwrap();
        assert!(matches!(url.info.addr, ConnectionAddr::TcpTls { port: 6380, .. }));
        assert_eq!(url.info.redis.db, 1);
    }

    #[test]
    fn test_resolve_rejects_empty_and_garbage() {
        assert!(resolve("").is_err());
        assert!(resolve("   ").is_err());
        assert!(resolve("redis://host:port-is-not-a-number").is_err());
    }
}
