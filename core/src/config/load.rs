use std::path::{Path, PathBuf};

use crate::error::CoreError;

use super::types::AppConfig;

pub const CONFIG_FILE: &str = "vox.toml";

pub fn load_default() -> Result<AppConfig, CoreError> {
    load_from(Path::new(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> Result<AppConfig, CoreError> {
    let mut cfg: AppConfig = if path.exists() {
        let s = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str::<AppConfig>(&s).map_err(CoreError::ConfigParse)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(v) = env_non_empty("VOX_WORKDIR") {
        cfg.workdir = v;
    }
    if let Some(v) = env_non_empty("VOX_SHELL_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(ms) => cfg.shell.timeout_ms = ms,
            Err(_) => tracing::warn!(value = %v, "ignoring invalid VOX_SHELL_TIMEOUT_MS"),
        }
    }
    if let Some(v) = env_non_empty("VOX_MEMORY_PATH") {
        cfg.memory.path = v;
    }
    if let Some(v) = env_non_empty("VOX_AUDIT_PATH") {
        cfg.audit.path = v;
    }
    if let Some(v) = env_non_empty("VOX_LOG_DIR") {
        cfg.logging.dir = Some(v);
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Expands `~` and `$VARS` in configured paths.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

impl AppConfig {
    pub fn workdir_path(&self) -> PathBuf {
        expand_path(&self.workdir)
    }

    /// Creates the sandbox root if needed and returns its canonical form.
    pub fn ensure_workdir(&self) -> Result<PathBuf, CoreError> {
        let path = self.workdir_path();
        let to_err = |source| CoreError::Workdir {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(&path).map_err(to_err)?;
        path.canonicalize().map_err(to_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.shell.timeout_ms, 10_000);
        assert_eq!(cfg.shell.max_output_bytes, 1024 * 1024);
        assert_eq!(cfg.http_server.port, 8080);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vox.toml");
        std::fs::write(
            &path,
            "[shell]\ntimeout_ms = 2500\n\n[policy]\nextra_allow = [\"jq\"]\n",
        )
        .unwrap();

        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.shell.timeout_ms, 2500);
        assert_eq!(cfg.shell.program, "sh");
        assert_eq!(cfg.policy.extra_allow, vec!["jq".to_string()]);
        assert!(cfg.memory.enabled);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vox.toml");
        std::fs::write(&path, "shell = [").unwrap();
        assert!(matches!(load_from(&path), Err(CoreError::ConfigParse(_))));
    }

    #[test]
    fn ensure_workdir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("root");
        let cfg = AppConfig {
            workdir: target.display().to_string(),
            ..AppConfig::default()
        };
        let root = cfg.ensure_workdir().unwrap();
        assert!(root.is_dir());
        assert!(root.is_absolute());
    }
}
