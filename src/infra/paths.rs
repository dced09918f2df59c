// src/infra/paths.rs — Config and data locations
//
// REVISELAB_HOME overrides everything. Otherwise config lives in
// ~/.reviselab/ and sampled datasets land in ./data (relative to the run).

use std::path::PathBuf;

/// Returns the REVISELAB_HOME override, if set.
fn reviselab_home() -> Option<PathBuf> {
    std::env::var_os("REVISELAB_HOME").map(PathBuf::from)
}

/// Configuration directory: $REVISELAB_HOME/ or ~/.reviselab/
pub fn config_dir() -> PathBuf {
    if let Some(home) = reviselab_home() {
        return home;
    }
    dirs_home().join(".reviselab")
}

/// Home directory, falling back to the working directory on exotic systems.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Directory for cached dataset samples: $REVISELAB_HOME/data or ./data
pub fn data_dir() -> PathBuf {
    if let Some(home) = reviselab_home() {
        return home.join("data");
    }
    PathBuf::from("data")
}

/// Default results file
pub fn default_results_path() -> PathBuf {
    PathBuf::from("results.json")
}
