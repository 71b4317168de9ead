use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path};

use crate::category::README_FILENAME;

/// Directories never descended into, no matter where they appear.
pub const EXCLUDED_DIRS: [&str; 9] = [
    "node_modules",
    "__pycache__",
    "venv",
    "env",
    "build",
    "dist",
    ".git",
    ".svn",
    ".hg",
];

/// Extensions rejected outright: binary and document formats that can
/// never produce useful text output.
const BLACKLISTED_EXTENSIONS: [&str; 30] = [
    ".exe", ".dll", ".so", ".dylib", ".bin", ".o", ".a", ".class", ".jar", ".pyc", ".png", ".jpg",
    ".jpeg", ".gif", ".bmp", ".ico", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    ".zip", ".tar", ".gz", ".7z", ".rar", ".woff", ".woff2",
];

/// Answers the allow/deny question for an extension nobody has seen
/// before. The interactive shell plugs in a prompt; headless mode and
/// tests plug in fixed or scripted answers.
pub trait ExtensionDecider {
    fn decide(&mut self, extension: &str) -> bool;
}

/// Decider that gives the same answer for every extension.
pub struct StaticDecider(pub bool);

impl ExtensionDecider for StaticDecider {
    fn decide(&mut self, _extension: &str) -> bool {
        self.0
    }
}

/// Whether a single directory name disqualifies its whole subtree.
pub fn is_excluded_dir(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

fn has_excluded_component(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => {
            let name = name.to_string_lossy();
            name.starts_with('.') || EXCLUDED_DIRS.contains(&name.as_ref())
        }
        _ => false,
    })
}

/// Lower-cased extension with a leading dot, the form the allow-list
/// stores. `None` for files without an extension.
fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

/// Decides which paths make it into the tracked set.
///
/// Results are not a pure function of the path: unknown extensions are
/// resolved through the injected decider once per session, and a "yes"
/// extends the allow-list for the rest of the batch.
pub struct PathFilter {
    allowed: BTreeSet<String>,
    decisions: HashMap<String, bool>,
    decider: Box<dyn ExtensionDecider + Send>,
}

impl PathFilter {
    pub fn new(
        allowed: BTreeSet<String>,
        decider: Box<dyn ExtensionDecider + Send>,
    ) -> Self {
        PathFilter {
            allowed,
            decisions: HashMap::new(),
            decider,
        }
    }

    pub fn is_eligible(&mut self, path: &Path) -> bool {
        if has_excluded_component(path) {
            return false;
        }

        let extension = dotted_extension(path);
        if let Some(ext) = &extension {
            if BLACKLISTED_EXTENSIONS.contains(&ext.as_str()) {
                return false;
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name == README_FILENAME {
            return true;
        }

        // Extensionless files cannot be allow-listed, so there is no
        // decision to cache for them.
        let Some(ext) = extension else {
            return false;
        };

        if self.allowed.contains(&ext) {
            return true;
        }
        if let Some(&cached) = self.decisions.get(&ext) {
            return cached;
        }

        let verdict = self.decider.decide(&ext);
        self.decisions.insert(ext.clone(), verdict);
        if verdict {
            log::info!("Extension {ext} accepted for this session");
            self.allowed.insert(ext);
        } else {
            log::debug!("Extension {ext} declined");
        }
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_file_types;
    use std::path::PathBuf;

    use std::sync::{Arc, Mutex};

    /// Decider that replays a fixed answer sequence and records what it
    /// was asked, so tests can assert on prompt counts.
    struct ScriptedDecider {
        answers: Vec<bool>,
        asked: Arc<Mutex<Vec<String>>>,
    }

    impl ExtensionDecider for ScriptedDecider {
        fn decide(&mut self, extension: &str) -> bool {
            self.asked.lock().unwrap().push(extension.to_string());
            self.answers.remove(0)
        }
    }

    fn filter_with(answers: Vec<bool>) -> (PathFilter, Arc<Mutex<Vec<String>>>) {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let decider = ScriptedDecider {
            answers,
            asked: asked.clone(),
        };
        (
            PathFilter::new(default_file_types(), Box::new(decider)),
            asked,
        )
    }

    #[test]
    fn accepts_allow_listed_extensions() {
        let mut filter = PathFilter::new(default_file_types(), Box::new(StaticDecider(false)));
        assert!(filter.is_eligible(Path::new("/work/app/main.py")));
        assert!(filter.is_eligible(Path::new("/work/app/Widget.TSX")));
        assert!(filter.is_eligible(Path::new("/work/app/style.css")));
    }

    #[test]
    fn readme_accepted_case_insensitively() {
        let mut filter = PathFilter::new(BTreeSet::new(), Box::new(StaticDecider(false)));
        assert!(filter.is_eligible(Path::new("/work/README.md")));
        assert!(filter.is_eligible(Path::new("/work/ReadMe.MD")));
        assert!(!filter.is_eligible(Path::new("/work/notes.md")));
    }

    #[test]
    fn rejects_under_excluded_dirs_at_any_depth() {
        let mut filter = PathFilter::new(default_file_types(), Box::new(StaticDecider(true)));
        for dir in EXCLUDED_DIRS {
            let path = PathBuf::from("/work").join(dir).join("deep/nested/mod.py");
            assert!(!filter.is_eligible(&path), "should reject under {dir}");
        }
        assert!(!filter.is_eligible(Path::new("/a/b/node_modules/c/d/e/f.ts")));
    }

    #[test]
    fn rejects_hidden_components() {
        let mut filter = PathFilter::new(default_file_types(), Box::new(StaticDecider(true)));
        assert!(!filter.is_eligible(Path::new("/work/.cache/main.py")));
        assert!(!filter.is_eligible(Path::new("/work/.hidden.py")));
    }

    #[test]
    fn rejects_blacklisted_and_extensionless() {
        let (mut filter, asked) = filter_with(vec![]);
        assert!(!filter.is_eligible(Path::new("/work/tool.exe")));
        assert!(!filter.is_eligible(Path::new("/work/photo.JPG")));
        assert!(!filter.is_eligible(Path::new("/work/Makefile")));
        // None of those should ever reach the decider.
        assert!(asked.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_extension_prompts_once_per_session() {
        let (mut filter, asked) = filter_with(vec![true]);
        assert!(filter.is_eligible(Path::new("/work/config.toml")));
        assert!(filter.is_eligible(Path::new("/work/other.toml")));
        assert_eq!(asked.lock().unwrap().as_slice(), [".toml".to_string()]);
    }

    #[test]
    fn denied_extension_stays_denied() {
        let (mut filter, asked) = filter_with(vec![false]);
        assert!(!filter.is_eligible(Path::new("/work/data.csv")));
        assert!(!filter.is_eligible(Path::new("/work/more.csv")));
        assert_eq!(asked.lock().unwrap().len(), 1);
    }
}
