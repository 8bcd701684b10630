//! Relation configuration.
//!
//! Relation options can live in `config/relations.toml` or in environment
//! variables, so key fields and case handling can change without a rebuild:
//!
//! ```toml
//! [relations.profile]
//! kind = "has_one"
//! foreign_key = "user_id"
//!
//! [relations.orders]
//! kind = "has_many"
//! foreign_key = ["tenant_id", "customer_id"]
//! local_key = ["tenant_id", "id"]
//! case_insensitive = true
//! ```
//!
//! Environment overrides use the `LIFEGUARD_REMOTE` prefix with `__` as the
//! separator, e.g. `LIFEGUARD_REMOTE__RELATIONS__PROFILE__CASE_INSENSITIVE=true`.
//! Fetchers are code, so they are attached after loading via
//! [`RemoteRelationBuilder::with_fetcher`].

use crate::relation::def::{RelationOptions, RemoteRelationBuilder, RemoteRelationDef};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;

const CONFIG_PATH: &str = "config/relations.toml";
const ENV_PREFIX: &str = "LIFEGUARD_REMOTE";

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct RelationsConfig {
    #[serde(default)]
    pub relations: BTreeMap<String, RelationOptions>,
}

impl RelationsConfig {
    /// Load relation options from `config/relations.toml`, overlaid by env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_PATH).required(false))
            .add_source(Self::environment());

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // A present but unreadable file falls back to env only.
                if std::path::Path::new(CONFIG_PATH).exists() {
                    log::warn!(
                        "Failed to load {}, falling back to env. Error: {}",
                        CONFIG_PATH,
                        err
                    );
                }
                Config::builder()
                    .add_source(Self::environment())
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load relation configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        Self::from_settings(settings)
    }

    /// Parse relation options from a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Self::from_settings(settings)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn from_settings(settings: Config) -> Result<Self, ConfigError> {
        settings.try_deserialize::<RelationsConfig>().map_err(|e| {
            ConfigError::Message(format!(
                "Relation configuration could not be loaded: {}",
                e
            ))
        })
    }

    /// Start a definition for a configured relation
    ///
    /// Returns `None` when no relation with that name is configured.
    pub fn relation(&self, name: &str) -> Option<RemoteRelationBuilder> {
        self.relations
            .get(name)
            .cloned()
            .map(|options| RemoteRelationDef::from_options(name, options))
    }
}
