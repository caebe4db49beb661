use std::net::SocketAddr;

use serde::Deserialize;
use demo_svc_core::error::{DemoSvcError, Result};

use crate::obs::metrics::DEFAULT_NAMESPACE;

pub const VERSION_VAR: &str = "VERSION";
pub const HTTP_PORT_VAR: &str = "HTTP_PORT";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_schema_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: default_schema_version(),
            server: ServerSection::default(),
            service: ServiceSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(DemoSvcError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.service.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    /// Apply `VERSION` and `HTTP_PORT` from `lookup`. A missing variable keeps
    /// the current value and logs a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(VERSION_VAR) {
            Some(v) => self.service.version = v,
            None => tracing::warn!(
                variable = VERSION_VAR,
                configured = %self.service.version,
                "environment variable not found, keeping configured value"
            ),
        }

        match lookup(HTTP_PORT_VAR) {
            Some(raw) => {
                let port: u16 = raw.parse().map_err(|e| DemoSvcError::InvalidEnv {
                    key: HTTP_PORT_VAR.to_string(),
                    reason: format!("{raw:?} is not a port: {e}"),
                })?;
                let mut addr = self.server.listen_addr()?;
                addr.set_port(port);
                self.server.listen = addr.to_string();
            }
            None => tracing::warn!(
                variable = HTTP_PORT_VAR,
                configured = %self.server.listen,
                "environment variable not found, keeping configured value"
            ),
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            DemoSvcError::Config(format!(
                "server.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Reported in every canned response body.
    #[serde(default = "default_service_version")]
    pub version: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            version: default_service_version(),
        }
    }
}

impl ServiceSection {
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(DemoSvcError::Config("service.version must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Series name prefix; empty means bare names.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.namespace.chars();
        let valid = match chars.next() {
            None => true,
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_' || first == ':')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
            }
        };
        if !valid {
            return Err(DemoSvcError::Config(format!(
                "metrics.namespace is not a valid metric name prefix: {}",
                self.namespace
            )));
        }
        Ok(())
    }
}

fn default_schema_version() -> u32 {
    1
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_service_version() -> String {
    "v1.0.0".into()
}
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
