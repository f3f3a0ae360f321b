//! Application configuration management.
//!
//! Settings are merged from, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config PATH`, else `config.toml` in the platform
//!    config directory when it exists)
//! 3. `FINDDUP_*` environment variables (`FINDDUP_FORMAT=s5`,
//!    `FINDDUP_EQUAL_ONLY=true`, ...). Numeric values are accepted for the
//!    format (`FINDDUP_FORMAT=5`) and for switches (`FINDDUP_EQUAL_ONLY=1`).
//! 4. command-line flags
//!
//! ```toml
//! format = "5s"
//! include_zero = false
//! equal_only = false
//! child_groups = false
//! print_tree = false
//! normalize_unicode = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::FinderConfig;
use crate::scanner::{FormatError, RecordFormat};

/// Prefix of the environment variables read into the configuration.
pub const ENV_PREFIX: &str = "FINDDUP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Field layout of listing lines
    #[serde(deserialize_with = "lenient::string")]
    pub format: String,
    /// Keep empty-file records
    #[serde(deserialize_with = "lenient::switch")]
    pub include_zero: bool,
    /// Only group directories whose contents match exactly
    #[serde(deserialize_with = "lenient::switch")]
    pub equal_only: bool,
    /// Also report groups implied by a reported parent group
    #[serde(deserialize_with = "lenient::switch")]
    pub child_groups: bool,
    /// Print the grouped tree before the report
    #[serde(deserialize_with = "lenient::switch")]
    pub print_tree: bool,
    /// Normalize paths to NFC before merging
    #[serde(deserialize_with = "lenient::switch")]
    pub normalize_unicode: bool,
}

/// Deserializers for values whose type the provider guessed.
///
/// The environment provider reads `FINDDUP_FORMAT=5` and
/// `FINDDUP_EQUAL_ONLY=1` as integers.
mod lenient {
    use std::fmt;

    use serde::de::{self, Deserializer, Unexpected, Visitor};

    struct StringVisitor;

    impl Visitor<'_> for StringVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or an integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(StringVisitor)
    }

    struct SwitchVisitor;

    impl Visitor<'_> for SwitchVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean, 0 or 1")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    pub fn switch<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(SwitchVisitor)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: RecordFormat::default().to_string(),
            include_zero: false,
            equal_only: false,
            child_groups: false,
            print_tree: false,
            normalize_unicode: false,
        }
    }
}

/// Values given on the command line. Unset flags leave lower layers alone.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    equal_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    child_groups: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    print_tree: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalize_unicode: Option<bool>,
}

impl CliOverrides {
    fn from_cli(cli: &Cli) -> Self {
        let input = cli.input();
        let flag = |set: bool| set.then_some(true);
        Self {
            format: input.format.clone(),
            include_zero: flag(input.include_zero),
            equal_only: flag(input.equal_only),
            child_groups: flag(cli.child_groups()),
            print_tree: flag(input.print_tree),
            normalize_unicode: flag(input.normalize_unicode),
        }
    }
}

impl Config {
    /// Load the configuration for an invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit config file is missing, or a layer
    /// holds a value of the wrong type.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => Self::default_path().filter(|p| p.exists()),
        };
        if let Some(path) = &file {
            log::debug!("Loading config from {}", path.display());
        }

        Self::figment(file.as_deref())
            .merge(Serialized::defaults(CliOverrides::from_cli(cli)))
            .extract()
            .context("invalid configuration")
    }

    /// Defaults, file and environment layers, without command-line flags.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Platform-specific default configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "finddup", "finddup").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the finder configuration, validating the format string.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] for an invalid format string.
    pub fn finder_config(&self) -> Result<FinderConfig, FormatError> {
        Ok(FinderConfig::default()
            .with_format(self.format.parse()?)
            .with_include_zero(self.include_zero)
            .with_equal_only(self.equal_only)
            .with_child_groups(self.child_groups)
            .with_normalize_unicode(self.normalize_unicode))
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render configuration")
    }
}
