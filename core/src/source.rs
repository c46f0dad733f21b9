use std::path::{Path, PathBuf};

use crate::CanopyErrorExt;

/// How the text of a [`Callable`] is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Python source text, parsed by the pest front-end.
    Python,
    /// A syntax tree serialized as JSON (`_type`-tagged objects).
    JsonTree,
}

impl SourceFormat {
    /// Pick the format from a file extension: `.json` is a serialized tree,
    /// anything else is treated as source text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SourceFormat::JsonTree,
            _ => SourceFormat::Python,
        }
    }
}

/// The source of a single function: a name for diagnostics plus the text
/// the front-end parses.
#[derive(Debug, Clone)]
pub struct Callable {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
    pub format: SourceFormat,
}

impl Callable {
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn CanopyErrorExt>> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let content = std::fs::read_to_string(&path).map_err(|err| {
            Box::<dyn CanopyErrorExt>::from(Box::new(MissingSourceError {
                path: path.clone(),
                reason: err.to_string(),
            }))
        })?;
        let format = SourceFormat::from_path(&path);
        Ok(Callable {
            name,
            path,
            content,
            format,
        })
    }

    /// Build a callable from in-memory Python source.
    pub fn from_source(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Callable {
            path: PathBuf::from(&name),
            name,
            content: content.into(),
            format: SourceFormat::Python,
        }
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl std::fmt::Display for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callable: {} at {:?}", self.name, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MissingSourceError {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for MissingSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot read source at {:?}: {}", self.path, self.reason)
    }
}

impl std::error::Error for MissingSourceError {}

impl CanopyErrorExt for MissingSourceError {
    fn level(&self) -> crate::Level {
        crate::Level::Error
    }

    fn message(&self) -> String {
        format!("Cannot read source at {:?}: {}", self.path, self.reason)
    }

    fn issuer(&self) -> String {
        "canopy.source".to_string()
    }

    fn span(&self) -> Option<crate::location::Span> {
        None
    }

    fn location(&self) -> Option<crate::location::Location> {
        None
    }
}
