use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::filter::{self, PathFilter};

/// Recursively enumerate `root`, yielding eligible files only.
///
/// Excluded directories are never opened, so huge dependency trees cost
/// nothing. Walk errors (permission denied, vanished entries) are
/// logged and contribute zero files. The result is sorted
/// case-insensitively by full path; that ordering is the one guarantee
/// downstream consumers rely on.
pub fn list_eligible_files(root: &Path, filter: &mut PathFilter) -> Vec<PathBuf> {
    let mut collected: Vec<PathBuf> = Vec::new();

    let mut walker = WalkBuilder::new(root);
    walker
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .hidden(true)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && filter::is_excluded_dir(&entry.file_name().to_string_lossy()))
        });

    for result in walker.build() {
        let dirent = match result {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Error while scanning {}: {e}", root.display());
                continue;
            }
        };

        if !dirent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = dirent.into_path();
        if filter.is_eligible(&path) {
            collected.push(path);
        }
    }

    collected.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StaticDecider;
    use crate::settings::default_file_types;
    use std::fs;
    use tempfile::TempDir;

    // The default tempdir prefix is ".tmp", which the hidden-component
    // rule would reject wholesale.
    fn tempdir() -> TempDir {
        tempfile::Builder::new()
            .prefix("clipsum-scan")
            .tempdir()
            .unwrap()
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn collects_only_eligible_files_sorted() {
        let dir = tempdir();
        let root = dir.path();
        write(&root.join("b.py"), "print('b')");
        write(&root.join("a/main.ts"), "let x = 1;");
        write(&root.join("README.md"), "# readme");
        write(&root.join("notes.txt"), "not allowed by default");
        write(&root.join("logo.png"), "binary-ish");

        let mut filter = PathFilter::new(default_file_types(), Box::new(StaticDecider(false)));
        let files = list_eligible_files(root, &mut filter);

        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        assert_eq!(names, ["a/main.ts", "b.py", "README.md"]);
    }

    #[test]
    fn never_descends_into_excluded_dirs() {
        let dir = tempdir();
        let root = dir.path();
        write(&root.join("keep.py"), "ok");
        write(&root.join("node_modules/pkg/index.ts"), "skip");
        write(&root.join("__pycache__/keep.cpython.py"), "skip");
        write(&root.join("sub/venv/lib/thing.py"), "skip");

        let mut filter = PathFilter::new(default_file_types(), Box::new(StaticDecider(true)));
        let files = list_eligible_files(root, &mut filter);
        assert_eq!(files, vec![root.join("keep.py")]);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempdir();
        let gone = dir.path().join("never_created");
        let mut filter = PathFilter::new(default_file_types(), Box::new(StaticDecider(false)));
        assert!(list_eligible_files(&gone, &mut filter).is_empty());
    }
}
