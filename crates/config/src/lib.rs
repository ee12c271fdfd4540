//! Configuration loading.
//!
//! Precedence, lowest to highest: built-in defaults, a TOML file
//! (`modwatch.toml` in the working directory unless an explicit path is
//! given), then `MODWATCH_`-prefixed environment variables.

pub mod error;

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use modwatch_extract::TimestampPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, Result};

const DEFAULT_CONFIG_FILE: &str = "modwatch.toml";
const ENV_PREFIX: &str = "MODWATCH_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the SQLite release database.
    pub database: PathBuf,
    /// Base URL of the mod hosting site.
    pub site: String,
    /// Whether a file listing row without an upload timestamp fails the
    /// page or is tolerated.
    pub timestamps: TimestampPolicy,
    /// Directory scanned for local mod files.
    pub mods_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        // Fall back to the working directory on platforms with no
        // conventional data directory.
        let database = ProjectDirs::from("", "", "modwatch")
            .map(|dirs| dirs.data_dir().join("modwatch.db"))
            .unwrap_or_else(|| PathBuf::from("modwatch.db"));
        Self {
            database,
            site: "https://minecraft.curseforge.com/".to_string(),
            timestamps: TimestampPolicy::default(),
            mods_dir: PathBuf::from("mods"),
        }
    }
}

impl Config {
    /// Load configuration, merging the file at `path` (or the default
    /// config file, if present) and the process environment over the
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .or_raise(|| ErrorKind::Invalid)
    }
}
