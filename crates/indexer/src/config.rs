//! Configuration management for the node rewards indexer.
//!
//! This module handles loading configuration from:
//! - TOML files
//! - Environment variables (`${VAR_NAME}` placeholders)
//! - Default values (fallbacks)

use alloy_primitives::Address;
use anyhow::{Context, Result};
use noderewards_core::Selectors;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::report::{parse_utc_offset, ReportFormat};

/// Main configuration for the indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Block explorer data source
    pub explorer: ExplorerConfig,

    /// Method selector overrides
    #[serde(default)]
    pub selectors: Selectors,

    /// Report output
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Block explorer (`module=account&action=txlist`) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Explorer API endpoint (e.g., "https://api.polygonscan.com/api")
    pub api_url: String,

    /// Explorer API key
    #[serde(default)]
    pub api_key: String,

    /// Node contract address
    pub contract: Address,

    /// First block to fetch
    #[serde(default)]
    pub start_block: u64,

    /// Last block to fetch
    #[serde(default = "default_end_block")]
    pub end_block: u64,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between page requests in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format: pretty or json
    #[serde(default)]
    pub format: ReportFormat,

    /// Offset used for formatted timestamps, e.g. "+02:00"
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            utc_offset: default_utc_offset(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_end_block() -> u64 {
    99_999_999
}

fn default_page_size() -> u32 {
    1000
}

fn default_request_delay_ms() -> u64 {
    250 // free explorer tiers allow ~5 req/s
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables can be referenced using `${VAR_NAME}` syntax.
    /// For example: `api_key = "${POLYGONSCAN_API_KEY}"`
    ///
    /// # Example
    /// ```no_run
    /// # use noderewards_indexer::config::Config;
    /// let config = Config::from_file("noderewards.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let expanded = expand_env_vars(&contents)?;

        let config: Config = toml::from_str(&expanded)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml).context("Failed to parse TOML configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let api_url = self.explorer.api_url.trim();
        if api_url.is_empty() {
            anyhow::bail!("Explorer api_url cannot be empty");
        }
        if !api_url.starts_with("https://") && !api_url.starts_with("http://") {
            anyhow::bail!("Explorer api_url must start with http:// or https://");
        }

        if self.explorer.contract.is_zero() {
            anyhow::bail!("Explorer contract must be a non-zero address");
        }

        if self.explorer.start_block > self.explorer.end_block {
            anyhow::bail!(
                "Explorer start_block ({}) cannot exceed end_block ({})",
                self.explorer.start_block,
                self.explorer.end_block
            );
        }
        if self.explorer.page_size == 0 {
            anyhow::bail!("Explorer page_size must be > 0");
        }
        if self.explorer.timeout_secs == 0 {
            anyhow::bail!("Explorer timeout_secs must be > 0");
        }

        self.selectors
            .validate()
            .context("Invalid [selectors] section")?;

        parse_utc_offset(&self.report.utc_offset)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Logging level must be one of: {} (got '{}')",
                valid_levels.join(", "),
                self.logging.level
            );
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "Logging format must be one of: {} (got '{}')",
                valid_formats.join(", "),
                self.logging.format
            );
        }

        Ok(())
    }
}

/// Expand `${VAR_NAME}` placeholders from the environment.
///
/// Placeholders inside TOML comments are left untouched. A `#` inside any
/// string (basic, literal or their triple-quoted multi-line forms) does not
/// start a comment, and string state carries across lines.
///
/// # Errors
/// Returns an error if a placeholder is unclosed, empty, or names an unset
/// variable.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut state = ScanState::Code;
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];

        if state != ScanState::Comment && rest.starts_with("${") {
            let line_no = input[..pos].matches('\n').count() + 1;
            let (value, len) = expand_placeholder(rest, line_no)?;
            out.push_str(&value);
            pos += len;
            continue;
        }

        let (next, len) = state.step(rest);
        out.push_str(&rest[..len]);
        state = next;
        pos += len;
    }

    Ok(out)
}

const TRIPLE_DOUBLE: &str = "\"\"\"";
const TRIPLE_SINGLE: &str = "'''";

/// Lexical position of the placeholder scanner within a TOML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    Comment,
    Basic,
    Literal,
    MultiBasic,
    MultiLiteral,
}

impl ScanState {
    /// State after the token at the start of `rest`, and the token's byte length.
    ///
    /// `rest` must not be empty.
    fn step(self, rest: &str) -> (Self, usize) {
        let mut chars = rest.chars();
        let Some(ch) = chars.next() else {
            return (self, 0);
        };

        match (self, ch) {
            (Self::Code, '#') => (Self::Comment, 1),
            (Self::Code, '"') if rest.starts_with(TRIPLE_DOUBLE) => (Self::MultiBasic, 3),
            (Self::Code, '"') => (Self::Basic, 1),
            (Self::Code, '\'') if rest.starts_with(TRIPLE_SINGLE) => (Self::MultiLiteral, 3),
            (Self::Code, '\'') => (Self::Literal, 1),
            // Escapes only exist in basic strings; the escaped char never closes one.
            (Self::Basic | Self::MultiBasic, '\\') => {
                (self, 1 + chars.next().map_or(0, char::len_utf8))
            }
            (Self::Basic, '"') | (Self::Literal, '\'') => (Self::Code, 1),
            (Self::MultiBasic, '"') if rest.starts_with(TRIPLE_DOUBLE) => (Self::Code, 3),
            (Self::MultiLiteral, '\'') if rest.starts_with(TRIPLE_SINGLE) => (Self::Code, 3),
            (Self::Comment | Self::Basic | Self::Literal, '\n') => (Self::Code, 1),
            (_, ch) => (self, ch.len_utf8()),
        }
    }
}

/// Resolve the placeholder at the start of `rest`; returns its value and length.
fn expand_placeholder(rest: &str, line_no: usize) -> Result<(String, usize)> {
    let after = &rest[2..];
    let line_end = after.find('\n').unwrap_or(after.len());
    let Some(end) = after[..line_end].find('}') else {
        anyhow::bail!(
            "Unclosed environment variable placeholder on line {}",
            line_no
        );
    };

    let name = &after[..end];
    if name.is_empty() {
        anyhow::bail!("Empty environment variable name on line {}", line_no);
    }

    let value = std::env::var(name).with_context(|| {
        format!(
            "Environment variable '{}' is not set (referenced on line {})",
            name, line_no
        )
    })?;

    Ok((value, end + 3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::fixed_bytes;
    use noderewards_core::{CLAIM_SINGLE_SELECTOR, NODE_CREATE_SELECTOR};

    const MINIMAL: &str = r#"
[explorer]
api_url = "https://api.polygonscan.com/api"
api_key = "KEY"
contract = "0x8258fDDF7E0477B8DfF86970813Ce5D333C88B57"
"#;

    #[test]
    fn test_load_example_config() {
        let toml = r#"
[explorer]
api_url = "https://api.polygonscan.com/api"
api_key = "KEY"
contract = "0x8258fDDF7E0477B8DfF86970813Ce5D333C88B57"
start_block = 25000000
end_block = 30000000
page_size = 500
request_delay_ms = 1000

[selectors]
claim_all = "0x11223344"

[report]
format = "json"
utc_offset = "+02:00"

[logging]
level = "debug"
format = "json"
        "#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.explorer.start_block, 25_000_000);
        assert_eq!(config.explorer.page_size, 500);
        assert_eq!(config.selectors.node_create, NODE_CREATE_SELECTOR);
        assert_eq!(config.selectors.claim_all, fixed_bytes!("11223344"));
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.explorer.start_block, 0);
        assert_eq!(config.explorer.end_block, 99_999_999);
        assert_eq!(config.explorer.page_size, 1000);
        assert_eq!(config.explorer.timeout_secs, 30);
        assert_eq!(config.selectors, Selectors::default());
        assert_eq!(config.report.format, ReportFormat::Pretty);
        assert_eq!(config.report.utc_offset, "+00:00");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_validation_empty_api_url() {
        let toml = MINIMAL.replace("https://api.polygonscan.com/api", "");
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("api_url"));
    }

    #[test]
    fn test_validation_zero_contract() {
        let toml = MINIMAL.replace(
            "0x8258fDDF7E0477B8DfF86970813Ce5D333C88B57",
            "0x0000000000000000000000000000000000000000",
        );
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }

    #[test]
    fn test_validation_duplicate_selectors() {
        let toml = format!(
            "{}\n[selectors]\nclaim_all = \"{}\"\n",
            MINIMAL, CLAIM_SINGLE_SELECTOR
        );
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(format!("{:#}", err).contains("more than one event kind"));
    }

    #[test]
    fn test_validation_block_range() {
        let toml = format!("{}start_block = 10\nend_block = 5\n", MINIMAL);
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("start_block"));
    }

    #[test]
    fn test_validation_bad_offset() {
        let toml = format!("{}\n[report]\nutc_offset = \"CET\"\n", MINIMAL);
        assert!(Config::from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_validation_bad_log_level() {
        let toml = format!("{}\n[logging]\nlevel = \"verbose\"\n", MINIMAL);
        let err = Config::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("Logging level"));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("NODEREWARDS_TEST_KEY", "secret");
        let out = expand_env_vars("api_key = \"${NODEREWARDS_TEST_KEY}\"\n").unwrap();
        assert_eq!(out, "api_key = \"secret\"\n");
        std::env::remove_var("NODEREWARDS_TEST_KEY");
    }

    #[test]
    fn test_expand_env_vars_undefined() {
        let err = expand_env_vars("key = \"${NODEREWARDS_SURELY_UNDEFINED}\"").unwrap_err();
        assert!(err.to_string().contains("NODEREWARDS_SURELY_UNDEFINED"));
    }

    #[test]
    fn test_expand_env_vars_empty_and_unclosed() {
        assert!(expand_env_vars("key = \"${}\"").is_err());
        assert!(expand_env_vars("key = \"${OPEN\"").is_err());
    }

    #[test]
    fn test_expand_env_vars_ignores_comments() {
        let input = "# api_key = \"${NOT_SET_ANYWHERE}\"\nlevel = \"info\" # ${ALSO_NOT_SET}\n";
        assert_eq!(expand_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_expand_env_vars_hash_in_string() {
        std::env::set_var("NODEREWARDS_TEST_HASH", "v");
        let input = "key = \"a#b${NODEREWARDS_TEST_HASH}\" # ${NOT_SET_ANYWHERE}\n";
        assert_eq!(
            expand_env_vars(input).unwrap(),
            "key = \"a#bv\" # ${NOT_SET_ANYWHERE}\n"
        );
        std::env::remove_var("NODEREWARDS_TEST_HASH");
    }

    #[test]
    fn test_expand_env_vars_multiline_basic_string() {
        std::env::set_var("NODEREWARDS_TEST_ML", "v");
        let input = "note = \"\"\"\nsee # ${NODEREWARDS_TEST_ML}\n\"\"\"\n";
        assert_eq!(
            expand_env_vars(input).unwrap(),
            "note = \"\"\"\nsee # v\n\"\"\"\n"
        );
        std::env::remove_var("NODEREWARDS_TEST_ML");
    }

    #[test]
    fn test_expand_env_vars_multiline_literal_then_comment() {
        std::env::set_var("NODEREWARDS_TEST_ML_LITERAL", "v");
        let input = "path = '''\n# ${NODEREWARDS_TEST_ML_LITERAL}\n''' # ${NOT_SET_ANYWHERE}\n";
        assert_eq!(
            expand_env_vars(input).unwrap(),
            "path = '''\n# v\n''' # ${NOT_SET_ANYWHERE}\n"
        );
        std::env::remove_var("NODEREWARDS_TEST_ML_LITERAL");
    }

    #[test]
    fn test_expand_env_vars_escaped_quote() {
        std::env::set_var("NODEREWARDS_TEST_ESCAPE", "v");
        let input = "key = \"a\\\"#${NODEREWARDS_TEST_ESCAPE}\" # ${NOT_SET_ANYWHERE}\n";
        assert_eq!(
            expand_env_vars(input).unwrap(),
            "key = \"a\\\"#v\" # ${NOT_SET_ANYWHERE}\n"
        );
        std::env::remove_var("NODEREWARDS_TEST_ESCAPE");
    }

    #[test]
    fn test_expand_env_vars_reports_line() {
        let err = expand_env_vars("a = 1\nb = \"\"\"\n\n${NOT_SET_ANYWHERE}\"\"\"\n").unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_config_from_file_with_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noderewards.toml");
        std::env::set_var("NODEREWARDS_TEST_API_KEY", "file-key");
        std::fs::write(
            &path,
            MINIMAL.replace("\"KEY\"", "\"${NODEREWARDS_TEST_API_KEY}\""),
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.explorer.api_key, "file-key");
        std::env::remove_var("NODEREWARDS_TEST_API_KEY");
    }
}
