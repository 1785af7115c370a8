//! Logic for loading the executor configuration.
//!
//! Can be deserialized from YAML (see [`Configuration::from_str`]) or JSON, or built in code.

use std::str::FromStr;
use std::time::Duration;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
}

/// Execution settings shared by every operation an [`Executor`](crate::Executor) runs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// Maximum number of resolver calls in flight at once for one operation; defaults to 10
    pub max_parallelism: usize,

    /// Time budget of one operation in human-readable format, e.g. `30s`. No limit when absent.
    #[serde(with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,
}

fn default_max_parallelism() -> usize {
    10
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_parallelism: default_max_parallelism(),
            timeout: None,
        }
    }
}

impl Configuration {
    /// Checks values the type system lets through.
    pub fn validate(self) -> Result<Self, ConfigurationError> {
        if self.max_parallelism == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "max_parallelism must be greater than 0",
                error: format!("got {}", self.max_parallelism),
            });
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "timeout must be greater than 0",
                error: "got 0s".to_string(),
            });
        }
        Ok(self)
    }

    /// JSON schema of the configuration, for editor support and validation.
    pub fn json_schema() -> RootSchema {
        let settings = SchemaSettings::draft07().with(|s| {
            s.option_nullable = true;
            s.option_add_null_type = false;
            s.inline_subschemas = true;
        });
        settings.into_generator().into_root_schema_for::<Configuration>()
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_yaml::from_str::<Configuration>(s)
            .map_err(ConfigurationError::DeserializeConfigError)?
            .validate()
    }
}
