//! Finding the Node.js binary and `tsserver.js`.

use crate::error::EngineError;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use tracing::debug;

/// Environment variable naming an explicit `tsserver.js`.
pub const TSSERVER_ENV: &str = "TSC_STDIN_TSSERVER";

/// Environment variable naming the Node.js binary.
pub const NODE_ENV: &str = "TSC_STDIN_NODE";

/// Location of `tsserver.js` relative to a `node_modules` parent directory.
const TSSERVER_RELATIVE: &str = "node_modules/typescript/lib/tsserver.js";

/// How to launch the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// The Node.js binary.
    pub node: OsString,
    /// An explicit `tsserver.js`; searched for when `None`.
    pub tsserver: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            node: OsString::from("node"),
            tsserver: None,
        }
    }
}

impl EngineSettings {
    /// Read [`NODE_ENV`] and [`TSSERVER_ENV`]. Empty values count as unset.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var_os(name).filter(|value| !value.is_empty());
        let mut settings = Self::default();
        if let Some(node) = non_empty(NODE_ENV) {
            settings.node = node;
        }
        settings.tsserver = non_empty(TSSERVER_ENV).map(PathBuf::from);
        settings
    }

    /// The explicit `tsserver.js`, or the nearest one above any of `search_dirs` (in order).
    pub fn locate_tsserver(&self, search_dirs: &[&Path]) -> Result<PathBuf, EngineError> {
        if let Some(explicit) = &self.tsserver {
            return Ok(explicit.clone());
        }
        search_dirs
            .iter()
            .find_map(|dir| find_tsserver(dir))
            .ok_or_else(|| EngineError::TsServerNotFound {
                searched: search_dirs
                    .first()
                    .map(|dir| dir.to_path_buf())
                    .unwrap_or_default(),
            })
    }

    /// The command line that starts the server.
    pub fn command(&self, tsserver: &Path) -> ProcessCommand {
        let mut cmd = ProcessCommand::new(&self.node);
        cmd.arg(tsserver)
            .arg("--disableAutomaticTypingAcquisition")
            .arg("--suppressDiagnosticEvents");
        cmd
    }
}

/// The nearest `node_modules/typescript/lib/tsserver.js` in `dir` or its ancestors.
pub fn find_tsserver(dir: &Path) -> Option<PathBuf> {
    let found = dir
        .ancestors()
        .map(|ancestor| ancestor.join(TSSERVER_RELATIVE))
        .find(|candidate| candidate.is_file());
    if let Some(path) = &found {
        debug!(tsserver = %path.display(), "found tsserver");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn install_typescript(root: &Path) -> PathBuf {
        let path = root.join(TSSERVER_RELATIVE);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "// tsserver").unwrap();
        path
    }

    #[test]
    fn test_finds_nearest_install() {
        let dir = tempfile::tempdir().unwrap();
        let outer = install_typescript(dir.path());
        let inner = install_typescript(&dir.path().join("packages/app"));
        fs::create_dir_all(dir.path().join("packages/app/src")).unwrap();
        fs::create_dir_all(dir.path().join("packages/lib")).unwrap();

        assert_eq!(find_tsserver(&dir.path().join("packages/app/src")), Some(inner));
        assert_eq!(find_tsserver(&dir.path().join("packages/lib")), Some(outer));
    }

    #[test]
    fn test_search_dirs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = install_typescript(&dir.path().join("tools"));
        fs::create_dir_all(dir.path().join("project")).unwrap();

        let settings = EngineSettings::default();
        let found = settings
            .locate_tsserver(&[&dir.path().join("project"), &dir.path().join("tools")])
            .unwrap();
        assert_eq!(found, fallback);
    }

    #[test]
    fn test_explicit_path_wins() {
        let settings = EngineSettings {
            tsserver: Some(PathBuf::from("/opt/ts/tsserver.js")),
            ..EngineSettings::default()
        };
        assert_eq!(
            settings.locate_tsserver(&[]).unwrap(),
            PathBuf::from("/opt/ts/tsserver.js")
        );
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineSettings::default()
            .locate_tsserver(&[dir.path()])
            .unwrap_err();
        assert!(matches!(err, EngineError::TsServerNotFound { ref searched } if searched == dir.path()));
    }

    #[test]
    fn test_command_line() {
        let cmd = EngineSettings::default().command(Path::new("/ts/tsserver.js"));
        let args: Vec<_> = cmd.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "node");
        assert_eq!(
            args,
            vec![
                "/ts/tsserver.js",
                "--disableAutomaticTypingAcquisition",
                "--suppressDiagnosticEvents"
            ]
        );
    }
}
