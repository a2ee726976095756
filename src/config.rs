use std::{env, fmt, net::SocketAddr};

use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub warehouse: WarehouseConfig,
}

/// Where trip records live and how connections to them are handed out.
#[derive(Clone)]
pub struct WarehouseConfig {
    pub url: String,
    pub schema: String,
    pub table: String,
    /// `0` opens a fresh connection for every fetch.
    pub pool_size: u32,
    pub bootstrap: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = var("APP_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let url = var("WAREHOUSE_URL").unwrap_or_else(|| "sqlite://taxi.db".to_string());
        let schema = var("WAREHOUSE_SCHEMA").unwrap_or_else(|| "main".to_string());
        let table = var("WAREHOUSE_TABLE").unwrap_or_else(|| "taxi_trips".to_string());
        validate_identifier("WAREHOUSE_SCHEMA", &schema)?;
        validate_identifier("WAREHOUSE_TABLE", &table)?;

        let pool_size = match var("WAREHOUSE_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|err| AppError::Config(format!("invalid WAREHOUSE_POOL_SIZE: {err}")))?,
            None => 0,
        };

        let bootstrap = var("WAREHOUSE_BOOTSTRAP")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            listen_addr,
            warehouse: WarehouseConfig {
                url,
                schema,
                table,
                pool_size,
                bootstrap,
            },
        })
    }
}

impl WarehouseConfig {
    /// `schema.table`, safe to splice into SQL because both parts were validated.
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("url", &self.redacted_url())
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("pool_size", &self.pool_size)
            .field("bootstrap", &self.bootstrap)
            .finish()
    }
}

/// Masks the password component of a connection URL.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                // Only fails for cannot-be-a-base URLs, which carry no password.
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

fn validate_identifier(name: &str, value: &str) -> Result<(), AppError> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "{name} must be a plain SQL identifier, got '{value}'"
        )))
    }
}
