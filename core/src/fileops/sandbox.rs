use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("path escapes the working directory: {0}")]
    Escape(String),

    #[error("invalid path: {0}")]
    Invalid(String),

    #[error("sandbox root unavailable: {path}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The single directory every file operation and shell command is confined to.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// `root` must already exist; it is canonicalised once here.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|source| SandboxError::Root {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `raw` against the root and proves the result stays inside it.
    ///
    /// The check is done twice: lexically on the normalised path, then on the
    /// canonical form of the deepest ancestor that exists, so a symlink inside
    /// the root that points outside is refused as well.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, SandboxError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SandboxError::Invalid("empty path".into()));
        }
        if raw.contains('\0') {
            return Err(SandboxError::Invalid(raw.to_string()));
        }

        let joined = self.root.join(raw);
        let normalized = normalize(&joined);
        if !normalized.starts_with(&self.root) {
            return Err(SandboxError::Escape(raw.to_string()));
        }

        let mut existing = normalized.as_path();
        while !existing.exists() {
            match existing.parent() {
                Some(parent) => existing = parent,
                None => break,
            }
        }
        if let Ok(real) = existing.canonicalize() {
            if !real.starts_with(&self.root) {
                return Err(SandboxError::Escape(raw.to_string()));
            }
        }

        Ok(normalized)
    }

    /// Root-relative rendering for user-facing messages.
    pub fn display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }
}

/// Lexical `.`/`..` folding without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> (tempfile::TempDir, Sandbox) {
        let dir = tempfile::tempdir().unwrap();
        let sb = Sandbox::new(dir.path()).unwrap();
        (dir, sb)
    }

    #[test]
    fn relative_paths_resolve_under_root() {
        let (_dir, sb) = sandbox();
        let p = sb.resolve("notes/a.txt").unwrap();
        assert!(p.starts_with(sb.root()));
        assert_eq!(sb.display(&p), Path::new("notes").join("a.txt").display().to_string());
        assert_eq!(sb.display(&sb.resolve(".").unwrap()), ".");
    }

    #[test]
    fn traversal_is_rejected() {
        let (_dir, sb) = sandbox();
        assert!(matches!(
            sb.resolve("../../etc/passwd"),
            Err(SandboxError::Escape(_))
        ));
        assert!(matches!(sb.resolve("a/../../x"), Err(SandboxError::Escape(_))));
        assert!(sb.resolve("a/../b").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_only_inside_root() {
        let (_dir, sb) = sandbox();
        assert!(matches!(sb.resolve("/etc/passwd"), Err(SandboxError::Escape(_))));
        let inside = sb.root().join("x.txt");
        assert_eq!(sb.resolve(inside.to_str().unwrap()).unwrap(), inside);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_rejected() {
        let (_dir, sb) = sandbox();
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), sb.root().join("link")).unwrap();
        assert!(matches!(
            sb.resolve("link/secret.txt"),
            Err(SandboxError::Escape(_))
        ));
    }

    #[test]
    fn empty_path_is_invalid() {
        let (_dir, sb) = sandbox();
        assert!(matches!(sb.resolve("  "), Err(SandboxError::Invalid(_))));
    }
}
