//! Source files and the source-provider seam.
//!
//! The engine asks its host for every file it needs through [`SourceProvider`]. The default
//! provider reads from disk; [`BufferOverride`] decorates any provider so that exactly one path
//! (the file under test) is served from the in-memory buffer instead.

use crate::line_index::{LineAndCharacter, LineIndex};
use crate::path::{is_rooted, normalize_path};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Language version a source file is parsed for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptTarget {
    /// ECMAScript 3.
    Es3,
    /// ECMAScript 5 (engine default).
    #[default]
    Es5,
    /// ECMAScript 2015.
    Es2015,
    /// ECMAScript 2016.
    Es2016,
    /// ECMAScript 2017.
    Es2017,
    /// ECMAScript 2018.
    Es2018,
    /// ECMAScript 2019.
    Es2019,
    /// ECMAScript 2020.
    Es2020,
    /// ECMAScript 2021.
    Es2021,
    /// ECMAScript 2022.
    Es2022,
    /// ECMAScript 2023.
    Es2023,
    /// ECMAScript 2024.
    Es2024,
    /// The newest supported proposals.
    EsNext,
    /// JSON documents.
    Json,
}

impl ScriptTarget {
    /// The newest language version.
    pub const LATEST: Self = Self::EsNext;

    /// Parse a `target` option value (case-insensitive, e.g. `"ES2020"`, `"es6"`).
    pub fn from_option(value: &str) -> Option<Self> {
        let target = match value.to_ascii_lowercase().as_str() {
            "es3" => Self::Es3,
            "es5" => Self::Es5,
            "es6" | "es2015" => Self::Es2015,
            "es2016" => Self::Es2016,
            "es2017" => Self::Es2017,
            "es2018" => Self::Es2018,
            "es2019" => Self::Es2019,
            "es2020" => Self::Es2020,
            "es2021" => Self::Es2021,
            "es2022" => Self::Es2022,
            "es2023" => Self::Es2023,
            "es2024" => Self::Es2024,
            "esnext" | "latest" => Self::EsNext,
            "json" => Self::Json,
            _ => return None,
        };
        Some(target)
    }

    /// The canonical option spelling (`"es2020"`, `"esnext"`, ...).
    pub fn as_option(self) -> &'static str {
        match self {
            Self::Es3 => "es3",
            Self::Es5 => "es5",
            Self::Es2015 => "es2015",
            Self::Es2016 => "es2016",
            Self::Es2017 => "es2017",
            Self::Es2018 => "es2018",
            Self::Es2019 => "es2019",
            Self::Es2020 => "es2020",
            Self::Es2021 => "es2021",
            Self::Es2022 => "es2022",
            Self::Es2023 => "es2023",
            Self::Es2024 => "es2024",
            Self::EsNext => "esnext",
            Self::Json => "json",
        }
    }
}

/// One file as seen by the engine: name, text and a line index over the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    file_name: String,
    text: String,
    language_version: ScriptTarget,
    line_index: LineIndex,
}

impl SourceFile {
    /// Create a source file from its full text.
    pub fn new(
        file_name: impl Into<String>,
        text: impl Into<String>,
        language_version: ScriptTarget,
    ) -> Self {
        let text = text.into();
        let line_index = LineIndex::from_text(&text);
        Self {
            file_name: file_name.into(),
            text,
            language_version,
            line_index,
        }
    }

    /// The file name exactly as requested by the engine.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full file text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Language version the file was created for.
    pub fn language_version(&self) -> ScriptTarget {
        self.language_version
    }

    /// The line-start index of [`Self::text`].
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Map a UTF-16 offset to a zero-based line/character pair.
    pub fn line_and_character_of_position(&self, position: usize) -> LineAndCharacter {
        self.line_index.line_and_character_of_position(position)
    }
}

/// Host-side file lookup used by the engine while building a program.
pub trait SourceProvider {
    /// Return the source file for `file_name`, parsed for `language_version`.
    ///
    /// When the file cannot be produced, implementations report a human-readable reason through
    /// `on_error` and return `None`.
    fn get_source_file(
        &self,
        file_name: &str,
        language_version: ScriptTarget,
        on_error: &mut dyn FnMut(&str),
    ) -> Option<Arc<SourceFile>>;
}

/// Reads source files from the local filesystem.
///
/// Relative names are resolved against `base_dir`.
#[derive(Debug, Clone)]
pub struct DiskSourceProvider {
    base_dir: PathBuf,
}

impl DiskSourceProvider {
    /// Create a disk provider resolving relative names against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The directory relative names are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl SourceProvider for DiskSourceProvider {
    fn get_source_file(
        &self,
        file_name: &str,
        language_version: ScriptTarget,
        on_error: &mut dyn FnMut(&str),
    ) -> Option<Arc<SourceFile>> {
        let path = if is_rooted(file_name) {
            PathBuf::from(file_name)
        } else {
            self.base_dir.join(file_name)
        };

        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(file = %path.display(), "read source file from disk");
                Some(Arc::new(SourceFile::new(file_name, text, language_version)))
            }
            Err(err) => {
                on_error(&format!("Cannot read file '{}': {}.", path.display(), err));
                None
            }
        }
    }
}

/// The per-run request: which path is under test, and the buffer that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    target_path: String,
    buffer: String,
}

impl RequestContext {
    /// Create a request context. `target_path` is normalized here, once.
    pub fn new(target_path: &str, buffer: impl Into<String>) -> Self {
        Self {
            target_path: normalize_path(target_path),
            buffer: buffer.into(),
        }
    }

    /// The normalized target path.
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    /// The buffer content substituted for the target file.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

/// Decorates a provider so the target path is served from the request buffer.
///
/// Matching is an exact string comparison against the normalized target path; every other
/// lookup goes to the fallback unchanged.
#[derive(Debug, Clone)]
pub struct BufferOverride<P> {
    context: Arc<RequestContext>,
    fallback: P,
}

impl<P: SourceProvider> BufferOverride<P> {
    /// Wrap `fallback`, overriding the target path of `context`.
    pub fn new(context: Arc<RequestContext>, fallback: P) -> Self {
        Self { context, fallback }
    }

    /// The request this override serves.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// The wrapped provider.
    pub fn fallback(&self) -> &P {
        &self.fallback
    }
}

impl<P: SourceProvider> SourceProvider for BufferOverride<P> {
    fn get_source_file(
        &self,
        file_name: &str,
        language_version: ScriptTarget,
        on_error: &mut dyn FnMut(&str),
    ) -> Option<Arc<SourceFile>> {
        if file_name == self.context.target_path() {
            debug!(file = file_name, "serving target file from buffer");
            return Some(Arc::new(SourceFile::new(
                file_name,
                self.context.buffer(),
                language_version,
            )));
        }
        self.fallback
            .get_source_file(file_name, language_version, on_error)
    }
}
