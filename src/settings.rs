//! Settings of the `munch` command line tool.
//!
//! Built-in defaults are overridden by an optional file (`munch.toml`,
//! `munch.yaml`, `munch.json`, or the path given), which is overridden by
//! `MUNCH_` prefixed environment variables such as `MUNCH_LOG_LEVEL=debug`.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Separator of compound keys when nesting flat documents.
    pub separator: String,
    /// Tag munches with their type when writing YAML.
    pub yaml_tagged: bool,
    /// Spaces per level of JSON output; compact when absent.
    pub json_indent: Option<usize>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: ".".to_owned(),
            yaml_tagged: false,
            json_indent: None,
            log_level: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Loads the settings. A file given by `path` must exist; without a path
    /// `munch.*` in the working directory is read when present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = Settings::default();
        let settings = Config::builder()
            .set_default("separator", defaults.separator)?
            .set_default("yaml_tagged", defaults.yaml_tagged)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name(path.unwrap_or("munch")).required(path.is_some()))
            .add_source(Environment::with_prefix("MUNCH").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
