use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub services: ServicesConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub worker_pool: WorkerPoolConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub service_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    #[serde(default)]
    pub domain: String,
    pub payment_url: Option<String>,
    pub shipping_url: Option<String>,
}

/// Outbound proxy. Only used when both host and port are set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProxyConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Unset `url` selects the in-memory repository.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerPoolConfig {
    pub size: usize,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults(config::Config::builder())?
            .add_source(config::File::with_name("config/default").required(false))
            // Per-environment overrides, e.g. config/production.toml
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `CHECKOUT__HTTP__TIMEOUT_SECONDS=3`
            .add_source(config::Environment::with_prefix("CHECKOUT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.port", 80)?
            .set_default("server.service_name", "orders")?
            .set_default("http.timeout_seconds", 5)?
            .set_default("services.domain", "")?
            .set_default("worker_pool.size", 32)
    }

    /// The single deadline applied to every join of an order attempt.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn payment_uri(&self) -> String {
        self.services
            .payment_url
            .clone()
            .unwrap_or_else(|| format!("http://payment{}/paymentAuth", self.domain_suffix()))
    }

    pub fn shipping_uri(&self) -> String {
        self.services
            .shipping_url
            .clone()
            .unwrap_or_else(|| format!("http://shipping{}/shipping", self.domain_suffix()))
    }

    pub fn proxy_url(&self) -> Option<String> {
        match (&self.proxy.host, self.proxy.port) {
            (Some(host), Some(port)) if !host.is_empty() => {
                Some(format!("http://{}:{}", host, port))
            }
            _ => None,
        }
    }

    fn domain_suffix(&self) -> String {
        if self.services.domain.is_empty() {
            String::new()
        } else {
            format!(".{}", self.services.domain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        Config::defaults(config::Config::builder())
            .unwrap()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.service_name, "orders");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.worker_pool.size, 32);
        assert!(config.database.url.is_none());
        assert!(config.proxy_url().is_none());
    }

    #[test]
    fn test_service_uris_without_domain() {
        let config = from_toml("");
        assert_eq!(config.payment_uri(), "http://payment/paymentAuth");
        assert_eq!(config.shipping_uri(), "http://shipping/shipping");
    }

    #[test]
    fn test_service_uris_with_domain() {
        let config = from_toml("[services]\ndomain = \"sock-shop.svc.cluster.local\"");
        assert_eq!(
            config.payment_uri(),
            "http://payment.sock-shop.svc.cluster.local/paymentAuth"
        );
        assert_eq!(
            config.shipping_uri(),
            "http://shipping.sock-shop.svc.cluster.local/shipping"
        );
    }

    #[test]
    fn test_explicit_service_urls_win() {
        let config = from_toml(
            "[services]\ndomain = \"ignored\"\npayment_url = \"http://localhost:8081/paymentAuth\"",
        );
        assert_eq!(config.payment_uri(), "http://localhost:8081/paymentAuth");
        assert_eq!(config.shipping_uri(), "http://shipping.ignored/shipping");
    }

    #[test]
    fn test_proxy_needs_host_and_port() {
        let config = from_toml("[proxy]\nhost = \"squid\"");
        assert!(config.proxy_url().is_none());

        let config = from_toml("[proxy]\nhost = \"squid\"\nport = 3128");
        assert_eq!(config.proxy_url().as_deref(), Some("http://squid:3128"));
    }

    #[test]
    fn test_timeout_override() {
        let config = from_toml("[http]\ntimeout_seconds = 2");
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}
