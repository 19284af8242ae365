use std::{
    ffi::OsString,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::error::ConfigResult;

/// Environment variable which points straight at a config file.
pub static CONFIG_PATH_ENV: &str = "LECTERN_CONFIG";

pub fn find_config_file(use_local: bool) -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    #[cfg(unix)]
    let home = std::env::var_os("HOME");
    #[cfg(windows)]
    let home = std::env::var_os("APPDATA");
    #[cfg(not(any(unix, windows)))]
    let home: Option<OsString> = None;

    find_config_file_in(home, use_local)
}

fn find_config_file_in(home: Option<OsString>, use_local: bool) -> PathBuf {
    if use_local {
        return PathBuf::from("./config.toml");
    }

    if let Some(app_path) = home {
        let mut path = PathBuf::from(app_path);

        if cfg!(unix) {
            path = path.join(".config");
        }

        path = path.join(crate::APPLICATION_NAME).join("config.toml");

        if path.exists() {
            return path;
        }
    }

    PathBuf::from("./config.toml")
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    read_config_from(&find_config_file(use_local))
}

fn read_config_from(filename: &Path) -> ConfigResult<Vec<u8>> {
    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(crate::config::error::ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    let mut fd = File::open(filename)?;
    let mut buf = Vec::new();
    fd.read_to_end(&mut buf)?;

    Ok(buf)
}
