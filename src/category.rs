use std::path::Path;

/// Classification of a tracked file, derived from its name alone.
///
/// Drives grouping in the aggregated output and the symbol shown next to
/// an entry in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Python,
    TypeScript,
    TypeScriptX,
    Css,
    Readme,
    /// Accepted by the allow-list but not one of the known types.
    Unknown,
}

/// Bucket order for the aggregated output. The readme bucket is handled
/// separately and always comes last.
pub const BUCKET_ORDER: [FileCategory; 5] = [
    FileCategory::Python,
    FileCategory::TypeScript,
    FileCategory::TypeScriptX,
    FileCategory::Css,
    FileCategory::Unknown,
];

/// Case-insensitive name of the file that always counts as readme.
pub const README_FILENAME: &str = "readme.md";

impl FileCategory {
    /// Derive the category from a filename. Pure: looks only at the
    /// final path component, never at the filesystem.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name == README_FILENAME {
            return FileCategory::Readme;
        }
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("py") => FileCategory::Python,
            Some("ts") => FileCategory::TypeScript,
            Some("tsx") => FileCategory::TypeScriptX,
            Some("css") => FileCategory::Css,
            _ => FileCategory::Unknown,
        }
    }

    /// Tag used in structured headers and log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            FileCategory::Python => "python",
            FileCategory::TypeScript => "typescript",
            FileCategory::TypeScriptX => "typescriptx",
            FileCategory::Css => "css",
            FileCategory::Readme => "readme",
            FileCategory::Unknown => "unknown",
        }
    }

    /// Symbol shown next to a file entry in the list.
    pub fn symbol(&self) -> &'static str {
        match self {
            FileCategory::Python => "🐍",
            FileCategory::TypeScript => "📘",
            FileCategory::TypeScriptX => "📗",
            FileCategory::Css => "🎨",
            FileCategory::Readme => "📄",
            FileCategory::Unknown => "❓",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn derives_known_extensions() {
        assert_eq!(
            FileCategory::from_path(Path::new("/a/b/main.py")),
            FileCategory::Python
        );
        assert_eq!(
            FileCategory::from_path(Path::new("app.TS")),
            FileCategory::TypeScript
        );
        assert_eq!(
            FileCategory::from_path(Path::new("view.tsx")),
            FileCategory::TypeScriptX
        );
        assert_eq!(
            FileCategory::from_path(Path::new("style.css")),
            FileCategory::Css
        );
    }

    #[test]
    fn readme_overrides_extension() {
        assert_eq!(
            FileCategory::from_path(Path::new("/docs/README.md")),
            FileCategory::Readme
        );
        // Any other .md file is not a readme.
        assert_eq!(
            FileCategory::from_path(Path::new("/docs/notes.md")),
            FileCategory::Unknown
        );
    }

    #[test]
    fn unrecognized_is_unknown() {
        assert_eq!(
            FileCategory::from_path(&PathBuf::from("data.toml")),
            FileCategory::Unknown
        );
        assert_eq!(
            FileCategory::from_path(Path::new("Makefile")),
            FileCategory::Unknown
        );
    }
}
