use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::category::{BUCKET_ORDER, FileCategory};

/// Header toggles, mirroring the persisted settings at batch start.
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub xml_format: bool,
    pub filepath: bool,
}

/// Result of one aggregation pass. `char_count` sums raw, pre-header
/// characters. Warnings carry the per-file skips that did not abort the
/// batch.
#[derive(Debug, Default)]
pub struct AggregateOutput {
    pub blob: String,
    pub file_count: usize,
    pub char_count: usize,
    pub warnings: Vec<String>,
}

fn wrap_content(path: &Path, content: &str, category: FileCategory, options: &AggregateOptions) -> String {
    let mut block = String::new();
    if options.xml_format {
        block.push_str("<file_info>\n");
        if options.filepath {
            block.push_str(&format!("  <path>{}</path>\n", path.display()));
        }
        block.push_str(&format!("  <type>{}</type>\n", category.tag()));
        block.push_str("</file_info>\n");
        block.push_str(&format!("<content>\n{content}\n</content>"));
    } else {
        if options.filepath {
            block.push_str(&format!("# {}\n", path.display()));
        }
        block.push_str(content);
    }
    block
}

/// Read and wrap `files` (already sorted by the caller), group the
/// wrapped contents into per-category buckets, and join the buckets in
/// the fixed category order with the readme bucket last.
///
/// Directories in the input are skipped silently; an unreadable or
/// non-UTF-8 file is skipped with a warning and never aborts the batch.
/// Clipboard interaction is the caller's business, not ours.
pub fn aggregate(
    files: &[(PathBuf, FileCategory)],
    options: &AggregateOptions,
) -> AggregateOutput {
    let mut buckets: HashMap<FileCategory, Vec<String>> = HashMap::new();
    let mut readme_block: Option<String> = None;
    let mut output = AggregateOutput::default();

    for (path, category) in files {
        if path.is_dir() {
            continue;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                let warning = format!("Skipping {}: {e}", path.display());
                log::warn!("{warning}");
                output.warnings.push(warning);
                continue;
            }
        };

        let block = wrap_content(path, &content, *category, options);
        if *category == FileCategory::Readme {
            if readme_block.is_some() {
                log::debug!("Replacing earlier readme with {}", path.display());
            }
            readme_block = Some(block);
        } else {
            buckets.entry(*category).or_default().push(block);
        }
        output.file_count += 1;
        output.char_count += content.chars().count();
        log::debug!("Processed {} file {}", category.tag(), path.display());
    }

    let mut blocks: Vec<String> = Vec::new();
    for category in BUCKET_ORDER {
        if let Some(bucket) = buckets.remove(&category) {
            blocks.extend(bucket);
        }
    }
    if let Some(readme) = readme_block {
        blocks.push(readme);
    }
    output.blob = blocks.join("\n\n");
    output
}
