use figment::Jail;
use std::{
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing_subscriber::fmt::MakeWriter;

use zmetrics_core::OutputFormat;
// Use the explicit library name `zmetricsdlib` as defined in Cargo.toml [lib] name.
use zmetricsdlib::config::{load_config, ConfigOverrides, ZmetricsdConfig};
use zmetricsdlib::error::MetricsdError;

#[test]
// Missing config file is tolerated and every value takes its default.
fn test_missing_file_gives_defaults() {
    Jail::expect_with(|jail| {
        let path = jail.directory().join("absent.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();

        assert_eq!(config, ZmetricsdConfig::default());
        assert_eq!(config.rpc_user, "zcashrpc");
        assert_eq!(config.rpc_password, "notsecret");
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 38232);
        assert_eq!(config.output_dir, PathBuf::from("./blocks"));
        assert_eq!(config.output_format, "json");
        assert_eq!(config.output_config().format, OutputFormat::Json);
        assert_eq!(config.start_height, None);
        assert_eq!(config.end_height, None);
        assert_eq!(config.num_blocks, None);
        assert!(config.check_config().is_ok());
        Ok(())
    });
}

#[test]
// Validates loading every kebab-case key from TOML.
fn test_deserialize_full_valid_config() {
    Jail::expect_with(|jail| {
        let toml_str = r#"
            log-level = "debug"
            rpc-user = "user"
            rpc-password = "password"
            rpc-host = "localhost"
            rpc-port = 18232
            rpc-timeout = 5
            start-height = 2000000
            end-height = 1999990
            num-blocks = 3
            output-dir = "out"
            output-format = "html"
            html-template = "templates/block.html"
        "#;
        jail.create_file("zmetrics.toml", toml_str)?;
        let path = jail.directory().join("zmetrics.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rpc_user, "user");
        assert_eq!(config.rpc_password, "password");
        assert_eq!(config.rpc_port, 18232);
        assert_eq!(config.rpc_timeout().as_secs(), 5);
        assert_eq!(config.start_height, Some(2_000_000));
        assert_eq!(config.end_height, Some(1_999_990));
        assert_eq!(config.num_blocks, Some(3));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.output_config().format, OutputFormat::Html);
        assert_eq!(config.html_template, PathBuf::from("templates/block.html"));

        let addr = config.node_address().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 18232);
        Ok(())
    });
}

#[test]
// Explicit zero look-back stays distinct from an unset one.
fn test_zero_num_blocks_is_kept() {
    Jail::expect_with(|jail| {
        jail.create_file("zmetrics.toml", "num-blocks = 0")?;
        let path = jail.directory().join("zmetrics.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();

        assert_eq!(config.num_blocks, Some(0));
        assert_eq!(config.range_options().num_blocks, Some(0));
        Ok(())
    });
}

/// Log sink shared between a test and its subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
// Unrecognised output formats load, then fall back to JSON with a warning.
fn test_unknown_output_format_falls_back_to_json() {
    Jail::expect_with(|jail| {
        jail.create_file("zmetrics.toml", r#"output-format = "csv""#)?;
        let path = jail.directory().join("zmetrics.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.output_format, "csv");

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let output = tracing::subscriber::with_default(subscriber, || config.output_config());

        assert_eq!(output.format, OutputFormat::Json);
        let logged = logs.contents();
        assert!(logged.contains("WARN"), "{logged}");
        assert!(logged.contains("Unrecognised output format 'csv'"), "{logged}");
        Ok(())
    });
}

#[test]
// Digit-only strings from the environment or the file stay strings.
fn test_numeric_looking_strings_load() {
    Jail::expect_with(|jail| {
        jail.create_file("zmetrics.toml", "rpc-user = 1000")?;
        jail.set_env("ZMETRICS_RPC_PASSWORD", "12345");
        jail.set_env("ZMETRICS_LOG_LEVEL", "5");
        let path = jail.directory().join("zmetrics.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();

        assert_eq!(config.rpc_user, "1000");
        assert_eq!(config.rpc_password, "12345");
        assert_eq!(config.log_level, "5");
        assert_eq!(zmetricsdlib::log_filter_directive(&config.log_level), "debug");
        Ok(())
    });
}

#[test]
// Environment variables override the TOML file, arguments override both.
fn test_precedence_file_env_args() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "zmetrics.toml",
            r#"
            rpc-user = "from-file"
            rpc-port = 1111
            start-height = 500
            "#,
        )?;
        jail.set_env("ZMETRICS_RPC_USER", "from-env");
        jail.set_env("ZMETRICS_RPC_PORT", "2222");
        jail.set_env("ZMETRICS_OUTPUT_DIR", "env-blocks");
        let path = jail.directory().join("zmetrics.toml");

        let overrides = ConfigOverrides {
            rpc_port: Some(3333),
            end_height: Some(490),
            ..Default::default()
        };
        let config = load_config(&path, &overrides).unwrap();

        assert_eq!(config.rpc_user, "from-env");
        assert_eq!(config.rpc_port, 3333);
        assert_eq!(config.start_height, Some(500));
        assert_eq!(config.end_height, Some(490));
        assert_eq!(config.output_dir, PathBuf::from("env-blocks"));
        Ok(())
    });
}

#[test]
// Malformed values are reported as config errors.
fn test_invalid_value_is_config_error() {
    Jail::expect_with(|jail| {
        jail.create_file("zmetrics.toml", r#"rpc-port = "not a port""#)?;
        let path = jail.directory().join("zmetrics.toml");

        let result = load_config(&path, &ConfigOverrides::default());

        assert!(matches!(result, Err(MetricsdError::ConfigError(_))));
        Ok(())
    });
}

#[test]
// An unresolvable node host fails the config check.
fn test_unresolvable_host_fails_check() {
    Jail::expect_with(|jail| {
        jail.create_file("zmetrics.toml", r#"rpc-host = "no such host.invalid""#)?;
        let path = jail.directory().join("zmetrics.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();

        assert!(matches!(
            config.check_config(),
            Err(MetricsdError::ConfigError(_))
        ));
        Ok(())
    });
}

#[test]
// A zero request timeout is rejected.
fn test_zero_timeout_fails_check() {
    Jail::expect_with(|jail| {
        jail.set_env("ZMETRICS_RPC_TIMEOUT", "0");
        let path = jail.directory().join("zmetrics.toml");

        let config = load_config(&path, &ConfigOverrides::default()).unwrap();

        assert!(matches!(
            config.check_config(),
            Err(MetricsdError::ConfigError(_))
        ));
        Ok(())
    });
}

#[test]
// IPv6 hosts are accepted without brackets.
fn test_ipv6_host() {
    let config = ZmetricsdConfig {
        rpc_host: "::1".to_string(),
        ..Default::default()
    };

    let addr = config.node_address().unwrap();
    assert_eq!(addr, "[::1]:38232".parse().unwrap());
}
