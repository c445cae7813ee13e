use std::{fs, path::Path, path::PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cert_sign_request::{dn::DN, engine::Engine};

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory for the temporary request config.
    pub temp_dir: Option<PathBuf>,
    pub engine: Engine,
    /// Subject defaults, overridden by `REQ_*` variables and arguments.
    pub defaults: DN,
}

fn parse_config_file(path: &Path) -> anyhow::Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Can't read {path:?}"))?;
    toml::from_str::<Config>(&data)
        .with_context(|| format!("Can't parse file {path:?}"))
}

/// Loads the config named on the command line, which has to exist, or the one
/// in the user's config dir, falling back to defaults when there is none.
pub fn read_config(
    app: Option<&ProjectDirs>,
    user_config_path: Option<&Path>,
) -> anyhow::Result<Config> {
    if let Some(user_config_path) = user_config_path {
        if !user_config_path.exists() {
            anyhow::bail!("can't find file {user_config_path:?}");
        }
        return parse_config_file(user_config_path);
    }
    match app.map(|app| app.config_dir().join("config.toml")) {
        Some(config_path) if config_path.exists() => {
            debug!(path = %config_path.display(), "using config file");
            parse_config_file(&config_path)
        }
        _ => Ok(Config::default()),
    }
}
