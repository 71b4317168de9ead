use std::sync::mpsc::{Receiver, Sender};

use crate::worker::BatchEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    pub(super) fn symbol(&self) -> &'static str {
        match self {
            StatusKind::Info => "ℹ️",
            StatusKind::Warning => "⚠️",
            StatusKind::Error => "❌",
        }
    }
}

/// Which modal question, if any, the shell is currently showing. While
/// a question is up, list navigation is suspended.
pub(super) enum AppMode {
    Normal,
    ConfirmClear,
    AskExtension {
        extension: String,
        reply: Sender<bool>,
    },
    /// Allowed-file-types manager: the list view is replaced by the
    /// allow-list, with its own cursor.
    ManageTypes { cursor: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BatchKind {
    Scan,
    Copy,
}

/// The one in-flight background batch. Commands that would start a
/// second batch are refused while this exists.
pub(super) struct BatchState {
    pub rx: Receiver<BatchEvent>,
    pub kind: BatchKind,
    /// Files actually added to the tree so far (scan batches only).
    pub added: usize,
}
