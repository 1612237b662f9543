//! Project configuration discovery and resolution.
//!
//! The nearest `tsconfig.json` above the target file is parsed as strict JSON, its `extends`
//! chain is followed, and the result is flattened into [`CompilerOptions`]. Without a config the
//! engine defaults apply. Either way `noEmit` ends up `true`.

use crate::options::CompilerOptions;
use crate::path::{directory_of, is_rooted, to_absolute_path};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "tsconfig.json";

/// Options whose string value is a path relative to the declaring config.
const PATH_OPTIONS: &[&str] = &[
    "baseUrl",
    "rootDir",
    "outDir",
    "outFile",
    "out",
    "declarationDir",
    "tsBuildInfoFile",
    "generateCpuProfile",
    "generateTrace",
];

/// Options whose list entries are paths relative to the declaring config.
const PATH_LIST_OPTIONS: &[&str] = &["typeRoots", "rootDirs"];

/// Errors produced while loading project configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// The config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A config file is not valid JSON (or not shaped like a config).
    #[error("failed to parse {}", .path.display())]
    Parse {
        /// The config file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// The outcome of configuration resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// The root config file, or `None` when engine defaults were used.
    pub config_file: Option<PathBuf>,
    /// Flattened options with `noEmit` forced on.
    pub options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(spec) => vec![spec],
            Self::Many(specs) => specs,
        }
    }
}

/// Find `tsconfig.json` in `dir` or the nearest ancestor that has one.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Resolve the compiler options for `target`.
///
/// The ancestor search starts at the directory of `target`, made absolute against `base_dir`.
/// Path options of the root config resolve against `base_dir` as well.
pub fn resolve_compiler_options(
    target: &str,
    base_dir: &Path,
) -> Result<ResolvedConfig, ConfigError> {
    let search_dir = PathBuf::from(to_absolute_path(base_dir, directory_of(target)));
    debug!(dir = %search_dir.display(), "searching for {CONFIG_FILE_NAME}");

    let Some(config_file) = find_config_file(&search_dir) else {
        info!("no {CONFIG_FILE_NAME} found, using engine defaults");
        let mut options = CompilerOptions::engine_defaults();
        options.force_no_emit();
        return Ok(ResolvedConfig {
            config_file: None,
            options,
        });
    };

    info!(config = %config_file.display(), "resolving project configuration");
    let mut resolver = Resolver::default();
    let mut options = resolver.load(&config_file, base_dir)?;
    options.force_no_emit();

    Ok(ResolvedConfig {
        config_file: Some(config_file),
        options,
    })
}

/// Tracks the configs currently being loaded so `extends` cycles can be cut.
#[derive(Debug, Default)]
struct Resolver {
    stack: Vec<PathBuf>,
}

impl Resolver {
    /// Load `path`, resolving its `extends` chain and relative options against `dir`.
    fn load(&mut self, path: &Path, dir: &Path) -> Result<CompilerOptions, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        self.stack.push(path.to_path_buf());
        let mut options = CompilerOptions::new();

        for spec in raw.extends.map(Extends::into_vec).unwrap_or_default() {
            let Some(base) = resolve_extends_path(&spec, dir) else {
                warn!(config = %path.display(), extends = %spec, "extended config not found, skipping");
                continue;
            };
            if self.stack.contains(&base) {
                warn!(config = %path.display(), extends = %base.display(), "circular extends, skipping");
                continue;
            }
            debug!(config = %path.display(), extends = %base.display(), "following extends");
            let base_dir = base.parent().map(Path::to_path_buf).unwrap_or_default();
            let inherited = self.load(&base, &base_dir)?;
            options.extend(inherited);
        }

        if let Some(own) = raw.compiler_options {
            options.extend(convert_options(own, dir));
        }

        self.stack.pop();
        Ok(options)
    }
}

/// Resolve an `extends` specifier to an existing config file.
///
/// Specifiers starting with `./` or `../`, and absolute ones, name a file relative to `dir`,
/// with `.json` appended when missing. Anything else (including `.` and `..`) is a package
/// looked up under `node_modules` in `dir` and each ancestor; a package directory resolves
/// to its `tsconfig.json`.
pub fn resolve_extends_path(spec: &str, dir: &Path) -> Option<PathBuf> {
    if spec.starts_with("./") || spec.starts_with("../") || is_rooted(spec) {
        return file_candidate(&PathBuf::from(to_absolute_path(dir, spec)));
    }

    dir.ancestors()
        .map(|ancestor| ancestor.join("node_modules").join(spec))
        .find_map(|candidate| {
            file_candidate(&candidate).or_else(|| {
                let nested = candidate.join(CONFIG_FILE_NAME);
                nested.is_file().then_some(nested)
            })
        })
}

fn file_candidate(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if path.extension().is_some_and(|ext| ext == "json") {
        return None;
    }
    let mut with_ext = path.as_os_str().to_owned();
    with_ext.push(".json");
    let with_ext = PathBuf::from(with_ext);
    with_ext.is_file().then_some(with_ext)
}

/// Convert the raw `compilerOptions` object of a config declared in `dir`.
fn convert_options(raw: Map<String, Value>, dir: &Path) -> CompilerOptions {
    let mut options = CompilerOptions::new();
    for (name, value) in raw {
        let value = match (name.as_str(), value) {
            (name, Value::String(path)) if PATH_OPTIONS.contains(&name) => {
                Value::String(to_absolute_path(dir, &path))
            }
            (name, Value::Array(items)) if PATH_LIST_OPTIONS.contains(&name) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(path) => Value::String(to_absolute_path(dir, &path)),
                        other => other,
                    })
                    .collect(),
            ),
            ("lib", Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(lib) => Value::String(lib_file_name(&lib)),
                        other => other,
                    })
                    .collect(),
            ),
            (_, value) => value,
        };
        options.set(name, value);
    }
    options
}

/// Map a `lib` entry to the engine's library file name.
pub fn lib_file_name(lib: &str) -> String {
    let lib = lib.to_ascii_lowercase();
    if lib.ends_with(".d.ts") {
        return lib;
    }
    let lib = match lib.as_str() {
        "es6" => "es2015",
        "es7" => "es2016",
        other => other,
    };
    format!("lib.{lib}.d.ts")
}
