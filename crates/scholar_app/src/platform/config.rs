use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use scholar_engine::ClientSettings;
use scholar_logging::{scholar_info, scholar_warn};
use serde::{Deserialize, Serialize};
use url::Url;

use super::cli::Cli;

pub(crate) const CONFIG_FILENAME: &str = "scholar.ron";

/// Optional settings file; every field falls back to the built-in default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    pub server: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub max_download_mb: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub download_filename: Option<String>,
}

/// Loads the config file. An explicit path must exist and parse; the
/// implicit `./scholar.ron` is skipped with a warning when unreadable.
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            let config = ron::from_str(&content)
                .with_context(|| format!("parsing config file {}", path.display()))?;
            scholar_info!("Loaded config from {:?}", path);
            Ok(config)
        }
        None => Ok(load_implicit(Path::new(CONFIG_FILENAME))),
    }
}

fn load_implicit(path: &Path) -> FileConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return FileConfig::default();
        }
        Err(err) => {
            scholar_warn!("Failed to read config from {:?}: {}", path, err);
            return FileConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            scholar_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            scholar_warn!("Failed to parse config from {:?}: {}", path, err);
            FileConfig::default()
        }
    }
}

/// Layers command line over config file over defaults.
pub(crate) fn resolve_settings(cli: &Cli, file: FileConfig) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(server) = cli.server.as_deref().or(file.server.as_deref()) {
        settings.base_url = parse_base_url(server)?;
    }
    if let Some(secs) = file.connect_timeout_secs {
        settings.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.timeout.or(file.request_timeout_secs) {
        if secs == 0 {
            bail!("timeout must be at least one second");
        }
        settings.request_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(mb) = file.max_download_mb {
        settings.max_download_bytes = mb.saturating_mul(1024 * 1024);
    }
    if let Some(dir) = cli.output_dir.clone().or(file.output_dir) {
        settings.output_dir = dir;
    }
    if let Some(name) = cli.filename.clone().or(file.download_filename) {
        settings.download_filename = name;
    }

    Ok(settings)
}

/// Parses the server root, making sure relative endpoints resolve beneath it.
fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid server url {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("server url must use http or https: {raw}");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
