//! Service config loader (strict parsing) with environment overrides.

pub mod schema;

use std::fs;

use demo_svc_core::env;
use demo_svc_core::error::{DemoSvcError, Result};

pub use schema::{MetricsSection, ServerSection, ServiceConfig, ServiceSection};

/// Names the YAML file to load. Unset means built-in defaults.
pub const CONFIG_PATH_VAR: &str = "DEMO_SVC_CONFIG";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| DemoSvcError::Io(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| DemoSvcError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// File (if `DEMO_SVC_CONFIG` is set) or defaults, then process environment.
pub fn load() -> Result<ServiceConfig> {
    let mut cfg = match env::lookup(CONFIG_PATH_VAR) {
        Some(path) => load_from_file(&path)?,
        None => ServiceConfig::default(),
    };
    cfg.apply_overrides(env::lookup)?;
    cfg.validate()?;
    Ok(cfg)
}
