use crate::aggregator::{self, AggregateOptions};
use crate::category::FileCategory;
use crate::cli::Cli;
use crate::clipboard;
use crate::file_scanner;
use crate::filter::{PathFilter, StaticDecider};
use crate::settings::Settings;
use crate::tui;
use anyhow::Result;
use std::path::PathBuf;

/// Turn the raw drop strings into usable absolute paths: strip the
/// quoting some transports add, resolve to canonical form, drop
/// anything that no longer exists, and dedupe while keeping order.
fn resolve_drop_paths(raw: &[String]) -> Vec<PathBuf> {
    let mut seen = std::collections::HashSet::new();
    let mut paths = Vec::new();
    for s in raw {
        let trimmed = s.trim().trim_matches('"');
        if trimmed.is_empty() {
            continue;
        }
        let path = PathBuf::from(trimmed);
        let resolved = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        if seen.insert(resolved.clone()) {
            paths.push(resolved);
        }
    }
    paths
}

/// Headless mode: one filter-aggregate-copy pass, no shell. Unknown
/// extensions are resolved by a fixed decider since there is nobody to
/// ask.
fn run_headless(paths: Vec<PathBuf>, settings: &Settings, cli: &Cli) -> Result<()> {
    let decider = StaticDecider(cli.allow_unknown);
    let mut filter = PathFilter::new(settings.allowed_file_types.clone(), Box::new(decider));

    let mut files: Vec<(PathBuf, FileCategory)> = Vec::new();
    for path in paths {
        if path.is_dir() {
            for file in file_scanner::list_eligible_files(&path, &mut filter) {
                files.push((file.clone(), FileCategory::from_path(&file)));
            }
        } else if filter.is_eligible(&path) {
            let category = FileCategory::from_path(&path);
            files.push((path, category));
        } else {
            log::info!("Skipping ineligible path {}", path.display());
        }
    }
    files.sort_by_key(|(p, _)| p.to_string_lossy().to_lowercase());
    files.dedup_by(|(a, _), (b, _)| a == b);

    let options = AggregateOptions {
        xml_format: settings.xml_format,
        filepath: settings.filepath,
    };
    let output = aggregator::aggregate(&files, &options);

    for warning in &output.warnings {
        eprintln!("⚠️  {warning}");
    }

    if cli.dry_run {
        print!("{}", output.blob);
        if !output.blob.is_empty() && !output.blob.ends_with('\n') {
            println!();
        }
        println!(
            "(Dry run: would copy {} files, {} characters. Clipboard not affected.)",
            output.file_count, output.char_count
        );
        return Ok(());
    }

    if output.file_count == 0 {
        println!("No eligible files found, or all files were unreadable.");
        std::process::exit(1);
    }

    clipboard::copy_text_to_clipboard(output.blob)?;
    println!(
        "✅ Copied content from {} files, totaling {} characters.",
        output.file_count, output.char_count
    );
    Ok(())
}

/// Main orchestrator: load settings, apply session overrides, then
/// dispatch to headless or interactive mode.
pub fn run_clipsum(cli: Cli) -> Result<()> {
    let mut settings = Settings::load();
    if cli.plain {
        settings.xml_format = false;
    }
    if cli.no_filepath {
        settings.filepath = false;
    }

    let paths = resolve_drop_paths(&cli.paths);

    if cli.all {
        if paths.is_empty() {
            println!("No paths given. Nothing to copy.");
            std::process::exit(1);
        }
        return run_headless(paths, &settings, &cli);
    }

    let mut app = tui::TuiApp::new(settings);
    if !paths.is_empty() {
        app.add_paths(paths);
    }
    tui::run_shell(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tempdir() -> TempDir {
        tempfile::Builder::new()
            .prefix("clipsum-flow")
            .tempdir()
            .unwrap()
    }

    #[test]
    fn resolve_strips_quotes_and_dedupes() {
        let dir = tempdir();
        let file = dir.path().join("a.py");
        fs::write(&file, "pass").unwrap();

        let raw = vec![
            format!("\"{}\"", file.display()),
            file.display().to_string(),
            dir.path().join("missing.py").display().to_string(),
        ];
        let resolved = resolve_drop_paths(&raw);
        assert_eq!(resolved, vec![file.canonicalize().unwrap()]);
    }
}
