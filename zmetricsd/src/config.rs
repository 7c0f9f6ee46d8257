//! zmetricsd config.
use clap::Args;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::{
    fmt,
    net::{IpAddr, SocketAddr, ToSocketAddrs},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{error, warn};
use zmetrics_core::{OutputConfig, OutputFormat, RangeOptions};

use crate::error::MetricsdError;

/// Password the node ships with in regtest setups.
pub const DEFAULT_RPC_PASSWORD: &str = "notsecret";

/// Prefix of the environment variables read by [`load_config`].
pub const ENV_PREFIX: &str = "ZMETRICS_";

/// Config information required for zmetricsd.
///
/// Keys are kebab-case in TOML (`rpc-user`, `start-height`, ...). Unset range bounds are resolved
/// against the node at run time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ZmetricsdConfig {
    /// Log filter used when `RUST_LOG` is not set. Numeric levels 0-6 are accepted too.
    #[serde(deserialize_with = "lenient_string")]
    pub log_level: String,
    /// Node RPC user.
    #[serde(deserialize_with = "lenient_string")]
    pub rpc_user: String,
    /// Node RPC password.
    #[serde(deserialize_with = "lenient_string")]
    pub rpc_password: String,
    /// Node RPC host name or IP address.
    #[serde(deserialize_with = "lenient_string")]
    pub rpc_host: String,
    /// Node RPC port.
    pub rpc_port: u16,
    /// Per request timeout, in seconds.
    pub rpc_timeout: u64,
    /// Newer range boundary. Defaults to the node's chain height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_height: Option<u32>,
    /// Older range boundary. Defaults to `start-height - num-blocks`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_height: Option<u32>,
    /// Look-back distance used when `end-height` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_blocks: Option<u32>,
    /// Directory receiving the report.
    pub output_dir: PathBuf,
    /// `json` or `html`. Anything else is written as JSON, see [`Self::output_config`].
    #[serde(deserialize_with = "lenient_string")]
    pub output_format: String,
    /// Template file used for HTML output.
    pub html_template: PathBuf,
}

impl Default for ZmetricsdConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            rpc_user: "zcashrpc".to_string(),
            rpc_password: DEFAULT_RPC_PASSWORD.to_string(),
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 38232,
            rpc_timeout: 30,
            start_height: None,
            end_height: None,
            num_blocks: None,
            output_dir: PathBuf::from("./blocks"),
            output_format: OutputFormat::Json.as_str().to_string(),
            html_template: PathBuf::from("block.template.html"),
        }
    }
}

impl ZmetricsdConfig {
    /// Performs checks on config data.
    pub fn check_config(&self) -> Result<(), MetricsdError> {
        let node_addr = self.node_address()?;

        if self.rpc_timeout == 0 {
            return Err(MetricsdError::ConfigError(
                "rpc-timeout must be at least one second.".to_string(),
            ));
        }

        if !is_loopback_addr(&node_addr) && self.rpc_password == DEFAULT_RPC_PASSWORD {
            warn!(
                "Connecting to non-loopback node address {} with the default RPC password.",
                node_addr
            );
        }

        Ok(())
    }

    /// Resolves `rpc-host:rpc-port` to a socket address.
    pub fn node_address(&self) -> Result<SocketAddr, MetricsdError> {
        let address = match self.rpc_host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.rpc_port).to_string(),
            Err(_) => format!("{}:{}", self.rpc_host, self.rpc_port),
        };
        fetch_socket_addr_from_hostname(&address)
    }

    /// Request timeout of the node connection.
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout)
    }

    /// Range bounds as given by the user.
    pub fn range_options(&self) -> RangeOptions {
        RangeOptions {
            start_height: self.start_height,
            end_height: self.end_height,
            num_blocks: self.num_blocks,
        }
    }

    /// Output settings for the report writer.
    ///
    /// An unrecognised `output-format` is logged here, so call this once logging is up.
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            output_dir: self.output_dir.clone(),
            format: OutputFormat::from_config_value(&self.output_format),
            html_template: self.html_template.clone(),
        }
    }
}

/// Command line overrides, applied on top of the file and environment.
#[derive(Debug, Clone, Default, Args, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigOverrides {
    /// Log filter, e.g. `debug` or `zmetrics_core=trace`.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Node RPC user.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_user: Option<String>,
    /// Node RPC password.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_password: Option<String>,
    /// Node RPC host.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_host: Option<String>,
    /// Node RPC port.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_port: Option<u16>,
    /// Per request timeout in seconds.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_timeout: Option<u64>,
    /// Newer range boundary.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_height: Option<u32>,
    /// Older range boundary.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_height: Option<u32>,
    /// Blocks to look back from the start height.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_blocks: Option<u32>,
    /// Report directory.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Report format, `json` or `html`.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// HTML template file.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_template: Option<PathBuf>,
}

/// Reads a string value the environment provider may have typed as a number or boolean,
/// e.g. `ZMETRICS_RPC_PASSWORD=12345`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientString;

    impl Visitor<'_> for LenientString {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_char<E: de::Error>(self, v: char) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(LenientString)
}

/// Resolves a hostname to a SocketAddr.
fn fetch_socket_addr_from_hostname(address: &str) -> Result<SocketAddr, MetricsdError> {
    address.parse::<SocketAddr>().or_else(|_| {
        let addrs: Vec<_> = address
            .to_socket_addrs()
            .map_err(|e| MetricsdError::ConfigError(format!("Invalid address '{address}': {e}")))?
            .collect();
        if let Some(ipv4_addr) = addrs.iter().find(|addr| addr.is_ipv4()) {
            Ok(*ipv4_addr)
        } else {
            addrs.into_iter().next().ok_or_else(|| {
                MetricsdError::ConfigError(format!("Unable to resolve address '{address}'"))
            })
        }
    })
}

pub(crate) fn is_loopback_addr(addr: &SocketAddr) -> bool {
    addr.ip().is_loopback()
}

/// Loads config data, layered from lowest to highest precedence:
/// defaults, the TOML file at `file_path`, `ZMETRICS_` environment variables, `overrides`.
///
/// A missing TOML file is not an error. Values are not checked here, see
/// [`ZmetricsdConfig::check_config`].
pub fn load_config(
    file_path: &Path,
    overrides: &ConfigOverrides,
) -> Result<ZmetricsdConfig, MetricsdError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(ZmetricsdConfig::default()))
        .merge(Toml::file(file_path))
        // ZMETRICS_RPC_USER -> rpc-user
        .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replace('_', "-").into()))
        .merge(Serialized::defaults(overrides));

    figment.extract::<ZmetricsdConfig>().map_err(|figment_error| {
        error!(
            "Failed to extract configuration using figment: {}",
            figment_error
        );
        MetricsdError::ConfigError(format!(
            "zmetricsd configuration loading failed during figment extract '{}' (could be TOML file, environment variables or arguments). Details: {}",
            file_path.display(),
            figment_error
        ))
    })
}
