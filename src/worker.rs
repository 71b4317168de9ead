use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::aggregator::{self, AggregateOptions, AggregateOutput};
use crate::category::FileCategory;
use crate::file_scanner;
use crate::filter::{ExtensionDecider, PathFilter};

/// Messages a background batch sends to the owning thread. The worker
/// only computes; every tree or settings mutation happens on the
/// receiving side.
pub enum BatchEvent {
    /// An eligible file turned up during a scan.
    FileFound(PathBuf),
    /// The filter hit an unknown extension and needs a verdict. The
    /// worker blocks on `reply` until the owner answers.
    AskExtension {
        extension: String,
        reply: Sender<bool>,
    },
    Warning(String),
    /// Scan finished; `found` counts eligible files sent, including any
    /// the owner may discard as duplicates.
    ScanDone { found: usize },
    /// Aggregation finished; the blob is ready for the clipboard.
    CopyReady(AggregateOutput),
}

/// Decider that forwards the question over the event channel and waits
/// for the owner's answer. A closed channel means deny.
struct ChannelDecider {
    events: Sender<BatchEvent>,
}

impl ExtensionDecider for ChannelDecider {
    fn decide(&mut self, extension: &str) -> bool {
        let (reply_tx, reply_rx) = mpsc::channel();
        let event = BatchEvent::AskExtension {
            extension: extension.to_string(),
            reply: reply_tx,
        };
        if self.events.send(event).is_err() {
            return false;
        }
        reply_rx.recv().unwrap_or(false)
    }
}

/// Walk the dropped paths on a background thread, streaming eligible
/// files back as they are found. At most one batch runs at a time; the
/// caller enforces that by not spawning while a receiver is live.
pub fn spawn_scan_batch(paths: Vec<PathBuf>, allowed: BTreeSet<String>) -> Receiver<BatchEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let decider = ChannelDecider { events: tx.clone() };
        let mut filter = PathFilter::new(allowed, Box::new(decider));
        let mut found = 0;
        for path in paths {
            if path.is_dir() {
                for file in file_scanner::list_eligible_files(&path, &mut filter) {
                    if tx.send(BatchEvent::FileFound(file)).is_err() {
                        return;
                    }
                    found += 1;
                }
            } else if filter.is_eligible(&path) {
                if tx.send(BatchEvent::FileFound(path)).is_err() {
                    return;
                }
                found += 1;
            } else {
                log::debug!("Dropped path {} is not eligible", path.display());
                let warning = format!("{} is not an eligible file.", path.display());
                if tx.send(BatchEvent::Warning(warning)).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(BatchEvent::ScanDone { found });
    });
    rx
}

/// Aggregate the selected files on a background thread. The clipboard
/// write stays with the owner so the worker has no side effects.
pub fn spawn_copy_batch(
    files: Vec<(PathBuf, FileCategory)>,
    options: AggregateOptions,
) -> Receiver<BatchEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let output = aggregator::aggregate(&files, &options);
        let _ = tx.send(BatchEvent::CopyReady(output));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::default_file_types;
    use std::fs;
    use tempfile::TempDir;

    fn tempdir() -> TempDir {
        tempfile::Builder::new()
            .prefix("clipsum-worker")
            .tempdir()
            .unwrap()
    }

    #[test]
    fn scan_batch_streams_files_and_finishes() {
        let dir = tempdir();
        let root = dir.path();
        fs::write(root.join("a.py"), "pass").unwrap();
        fs::write(root.join("b.txt"), "not allowed").unwrap();

        let rx = spawn_scan_batch(vec![root.to_path_buf()], default_file_types());
        let mut files = Vec::new();
        let mut finished = false;
        for event in rx {
            match event {
                BatchEvent::FileFound(path) => files.push(path),
                BatchEvent::AskExtension { reply, .. } => {
                    reply.send(false).unwrap();
                }
                BatchEvent::ScanDone { found } => {
                    assert_eq!(found, 1);
                    finished = true;
                }
                _ => {}
            }
        }
        assert!(finished);
        assert_eq!(files, vec![root.join("a.py")]);
    }

    #[test]
    fn ask_extension_round_trip_extends_the_batch() {
        let dir = tempdir();
        let root = dir.path();
        fs::write(root.join("a.toml"), "x = 1").unwrap();
        fs::write(root.join("b.toml"), "y = 2").unwrap();

        let rx = spawn_scan_batch(vec![root.to_path_buf()], default_file_types());
        let mut prompts = 0;
        let mut files = Vec::new();
        for event in rx {
            match event {
                BatchEvent::AskExtension { extension, reply } => {
                    assert_eq!(extension, ".toml");
                    prompts += 1;
                    reply.send(true).unwrap();
                }
                BatchEvent::FileFound(path) => files.push(path),
                _ => {}
            }
        }
        // Cached after the first answer: one prompt, both files found.
        assert_eq!(prompts, 1);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn copy_batch_delivers_aggregate_output() {
        let dir = tempdir();
        let root = dir.path();
        fs::write(root.join("a.py"), "print(1)").unwrap();

        let rx = spawn_copy_batch(
            vec![(root.join("a.py"), FileCategory::Python)],
            AggregateOptions {
                xml_format: false,
                filepath: false,
            },
        );
        match rx.recv().unwrap() {
            BatchEvent::CopyReady(output) => {
                assert_eq!(output.file_count, 1);
                assert_eq!(output.blob, "print(1)");
            }
            _ => panic!("expected CopyReady"),
        }
    }
}
