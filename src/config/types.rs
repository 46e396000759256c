use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::guard::GuardConfig;
use crate::verifier::VerifierConfig;

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: where to listen, where the dashboard lives,
/// how to verify tokens and which paths to guard.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub upstream: UpstreamConfig,
    pub verifier: VerifierConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    /// Forward the verified identity upstream as X-Auth-* headers.
    pub include_identity_headers: Option<bool>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The dashboard application requests are relayed to.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct UpstreamConfig {
    pub base_url: String,
}

/// Load config from a YAML file named "config.yaml" in the current
/// directory, with SESSIONGATE_* environment overrides (double underscore
/// as the section separator, e.g. SESSIONGATE_VERIFIER__SECRET).
pub fn load_config() -> ConfigV1 {
    let figment = Figment::new()
        .merge(Yaml::file("./config.yaml"))
        .merge(Env::prefixed("SESSIONGATE_").split("__"));
    let config = match figment.extract::<Config>() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    };
    match config {
        Config::ConfigV1(c) => c,
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
