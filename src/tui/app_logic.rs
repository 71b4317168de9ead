use super::app_state::{AppMode, BatchKind, BatchState, StatusKind};
use crate::aggregator::{AggregateOptions, AggregateOutput};
use crate::clipboard;
use crate::file_tree::{FileTree, NodeId};
use crate::settings::{Settings, default_file_types};
use crate::worker::{self, BatchEvent};
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;

pub struct TuiApp {
    pub(super) tree: FileTree,
    pub(super) settings: Settings,
    pub(super) mode: AppMode,
    pub(super) status: (StatusKind, String),
    pub(super) cursor: usize,
    pub(super) scroll_offset: usize,
    pub(super) list_viewport_height: usize,
    pub(super) batch: Option<BatchState>,
    pub(super) quit: bool,
}

impl TuiApp {
    pub fn new(settings: Settings) -> Self {
        TuiApp {
            tree: FileTree::new(),
            settings,
            mode: AppMode::Normal,
            status: (
                StatusKind::Info,
                "Welcome! Add files or folders to begin.".to_string(),
            ),
            cursor: 0,
            scroll_offset: 0,
            list_viewport_height: 0,
            batch: None,
            quit: false,
        }
    }

    pub(super) fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = (kind, message.into());
    }

    pub(super) fn batch_active(&self) -> bool {
        self.batch.is_some()
    }

    /// The drop entry point: filter out already-tracked paths, then hand
    /// the rest to a background scan batch.
    pub fn add_paths(&mut self, paths: Vec<PathBuf>) {
        let new_paths: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| {
                if self.tree.contains(p) {
                    log::debug!("Path already added: {}", p.display());
                    false
                } else {
                    true
                }
            })
            .collect();

        if new_paths.is_empty() {
            self.set_status(StatusKind::Warning, "No new files were added.");
            return;
        }
        if self.batch_active() {
            self.set_status(StatusKind::Warning, "A batch is already running.");
            return;
        }

        let rx = worker::spawn_scan_batch(new_paths, self.settings.allowed_file_types.clone());
        self.batch = Some(BatchState {
            rx,
            kind: BatchKind::Scan,
            added: 0,
        });
        self.set_status(StatusKind::Info, "Processing files...");
    }

    /// Drain pending events from the in-flight batch and apply them to
    /// the tree. All shared-state mutation happens here, on the owning
    /// thread.
    pub fn poll_batch(&mut self) {
        loop {
            // try_recv only needs a shared borrow, so the tree stays
            // free for mutation inside the arms.
            let event = match &self.batch {
                Some(state) => state.rx.try_recv(),
                None => return,
            };
            match event {
                Ok(BatchEvent::FileFound(path)) => {
                    if self.tree.contains(&path) {
                        log::debug!("Path already added: {}", path.display());
                    } else {
                        self.tree.insert(&path);
                        if let Some(state) = &mut self.batch {
                            state.added += 1;
                        }
                    }
                }
                Ok(BatchEvent::AskExtension { extension, reply }) => {
                    // The worker is now blocked on the reply, so the
                    // channel stays quiet until the user answers.
                    self.mode = AppMode::AskExtension { extension, reply };
                }
                Ok(BatchEvent::Warning(message)) => {
                    self.set_status(StatusKind::Warning, message);
                }
                Ok(BatchEvent::ScanDone { found }) => {
                    let added = self.batch.take().map(|s| s.added).unwrap_or(0);
                    log::info!("Scan batch done: {found} eligible, {added} added");
                    if added == 0 {
                        self.set_status(StatusKind::Warning, "No new files were added.");
                    } else {
                        let plural = if added == 1 { "" } else { "s" };
                        self.set_status(StatusKind::Info, format!("Added {added} file{plural}"));
                    }
                    self.clamp_cursor();
                    return;
                }
                Ok(BatchEvent::CopyReady(output)) => {
                    self.batch = None;
                    self.finish_copy(output);
                    return;
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.batch = None;
                    self.set_status(StatusKind::Error, "Batch worker stopped unexpectedly.");
                    return;
                }
            }
        }
    }

    fn finish_copy(&mut self, output: AggregateOutput) {
        if output.file_count == 0 {
            self.set_status(
                StatusKind::Warning,
                "No eligible files found, or all files were unreadable.",
            );
            return;
        }
        match clipboard::copy_text_to_clipboard(output.blob) {
            Ok(()) => {
                let mut message = format!(
                    "Copied content from {} files, totaling {} characters.",
                    output.file_count, output.char_count
                );
                if !output.warnings.is_empty() {
                    message.push_str(&format!(" ({} skipped)", output.warnings.len()));
                }
                log::info!("{message}");
                self.set_status(StatusKind::Info, message);
            }
            Err(e) => {
                log::error!("Failed to copy content to clipboard: {e}");
                self.set_status(StatusKind::Error, format!("Failed to copy to clipboard: {e}"));
            }
        }
    }

    fn start_copy(&mut self) {
        if self.batch_active() {
            self.set_status(StatusKind::Warning, "A batch is already running.");
            return;
        }
        let files = self.tree.selected_files();
        if files.is_empty() {
            self.set_status(StatusKind::Error, "Please select files or folders to copy.");
            return;
        }
        let options = AggregateOptions {
            xml_format: self.settings.xml_format,
            filepath: self.settings.filepath,
        };
        log::info!("Starting processing of {} files.", files.len());
        let rx = worker::spawn_copy_batch(files, options);
        self.batch = Some(BatchState {
            rx,
            kind: BatchKind::Copy,
            added: 0,
        });
        self.set_status(StatusKind::Info, "Processing files...");
    }

    fn remove_selected(&mut self) {
        if self.batch_active() {
            self.set_status(StatusKind::Warning, "A batch is already running.");
            return;
        }
        let ids = self.tree.selected_node_ids();
        if ids.is_empty() {
            self.set_status(StatusKind::Warning, "No items selected for removal.");
            return;
        }
        for id in ids {
            // Ids may go stale mid-batch when removals share ancestors;
            // remove_subtree shrugs those off.
            self.tree.remove_subtree(id);
        }
        self.clamp_cursor();
        self.set_status(StatusKind::Info, "Selected items removed.");
        log::info!("Removed selected items");
    }

    fn clear_all(&mut self) {
        let roots: Vec<NodeId> = self
            .tree
            .visible_rows()
            .iter()
            .filter(|(_, depth)| *depth == 0)
            .map(|(id, _)| *id)
            .collect();
        for id in roots {
            self.tree.remove_subtree(id);
        }
        self.cursor = 0;
        self.scroll_offset = 0;
        self.set_status(StatusKind::Info, "All items cleared.");
        log::info!("All items cleared from the list.");
    }

    fn toggle_xml_format(&mut self) {
        self.settings.xml_format = !self.settings.xml_format;
        let message = if self.settings.xml_format {
            "XML format enabled."
        } else {
            "XML format disabled."
        };
        log::info!("{message}");
        self.set_status(StatusKind::Info, message);
        self.settings.save();
    }

    fn toggle_filepath(&mut self) {
        self.settings.filepath = !self.settings.filepath;
        let message = if self.settings.filepath {
            "Filepath enabled."
        } else {
            "Filepath disabled."
        };
        log::info!("{message}");
        self.set_status(StatusKind::Info, message);
        self.settings.save();
    }

    fn toggle_current_selection(&mut self) {
        let rows = self.tree.visible_rows();
        let Some(&(id, _)) = rows.get(self.cursor) else {
            return;
        };
        let Some(entry) = self.tree.node(id) else {
            return;
        };
        let target = if entry.is_dir() {
            // A folder toggles to "all selected" unless it already is.
            let (_, all) = self.tree.folder_selection(id);
            !all
        } else {
            !entry.selected
        };
        self.tree.set_selected_subtree(id, target);
    }

    fn toggle_current_expansion(&mut self) {
        let rows = self.tree.visible_rows();
        if let Some(&(id, _)) = rows.get(self.cursor) {
            self.tree.toggle_expanded(id);
            self.clamp_cursor();
        }
    }

    pub(super) fn clamp_cursor(&mut self) {
        let len = self.tree.visible_rows().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        let len = self.tree.visible_rows().len();
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as i32 + delta).rem_euclid(len as i32) as usize;
    }

    pub(super) fn ensure_cursor_in_viewport(&mut self) {
        if self.list_viewport_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + self.list_viewport_height {
            self.scroll_offset = self.cursor - self.list_viewport_height + 1;
        }
        let len = self.tree.visible_rows().len();
        if len <= self.list_viewport_height {
            self.scroll_offset = 0;
        } else {
            self.scroll_offset = self.scroll_offset.min(len - self.list_viewport_height);
        }
    }

    pub(super) fn handle_normal_mode_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current_selection(),
            KeyCode::Char('o') | KeyCode::Tab => self.toggle_current_expansion(),
            KeyCode::Char('c') => self.start_copy(),
            KeyCode::Char('d') => self.remove_selected(),
            KeyCode::Char('C') => {
                if self.batch_active() {
                    self.set_status(StatusKind::Warning, "A batch is already running.");
                } else if !self.tree.is_empty() {
                    self.mode = AppMode::ConfirmClear;
                }
            }
            KeyCode::Char('x') => self.toggle_xml_format(),
            KeyCode::Char('f') => self.toggle_filepath(),
            KeyCode::Char('t') => {
                if self.batch_active() {
                    self.set_status(StatusKind::Warning, "A batch is already running.");
                } else {
                    self.mode = AppMode::ManageTypes { cursor: 0 };
                }
            }
            _ => {}
        }
    }

    /// Allowed-file-types manager: navigate the allow-list, remove the
    /// entry under the cursor, or reset the whole list to the built-in
    /// defaults. Every change is saved immediately.
    pub(super) fn handle_manage_types_input(&mut self, key_event: KeyEvent) {
        let cursor = match self.mode {
            AppMode::ManageTypes { cursor } => cursor,
            _ => return,
        };
        let len = self.settings.allowed_file_types.len();
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Char('t') | KeyCode::Esc => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.mode = AppMode::ManageTypes {
                    cursor: (cursor + 1) % len,
                };
            }
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                self.mode = AppMode::ManageTypes {
                    cursor: (cursor + len - 1) % len,
                };
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let Some(entry) = self.settings.allowed_file_types.iter().nth(cursor).cloned()
                else {
                    return;
                };
                self.settings.allowed_file_types.remove(&entry);
                self.settings.save();
                let len = self.settings.allowed_file_types.len();
                self.mode = AppMode::ManageTypes {
                    cursor: if len == 0 { 0 } else { cursor.min(len - 1) },
                };
                log::info!("Removed allowed file type {entry}");
                self.set_status(
                    StatusKind::Info,
                    format!("Removed {entry} from allowed file types."),
                );
            }
            KeyCode::Char('r') => {
                self.settings.allowed_file_types = default_file_types();
                self.settings.save();
                self.mode = AppMode::ManageTypes { cursor: 0 };
                log::info!("Allowed file types reset to defaults");
                self.set_status(StatusKind::Info, "Allowed file types reset to defaults.");
            }
            _ => {}
        }
    }

    pub(super) fn handle_confirm_clear_input(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.mode = AppMode::Normal;
                self.clear_all();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = AppMode::Normal;
            }
            _ => {}
        }
    }

    pub(super) fn handle_ask_extension_input(&mut self, key_event: KeyEvent) {
        let verdict = match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        let mode = std::mem::replace(&mut self.mode, AppMode::Normal);
        if let AppMode::AskExtension { extension, reply } = mode {
            if verdict {
                self.settings.allowed_file_types.insert(extension.clone());
                self.settings.save();
                log::info!("Added new file type: {extension}");
            }
            // The worker falls back to deny if the send fails.
            let _ = reply.send(verdict);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> TuiApp {
        TuiApp::new(Settings::default())
    }

    #[test]
    fn manage_types_removes_entry_under_cursor() {
        let mut app = app();
        app.handle_normal_mode_input(key(KeyCode::Char('t')));
        assert!(matches!(app.mode, AppMode::ManageTypes { cursor: 0 }));

        // BTreeSet ordering puts ".css" first in the default list.
        app.handle_manage_types_input(key(KeyCode::Char('d')));
        assert!(!app.settings.allowed_file_types.contains(".css"));
        assert_eq!(
            app.settings.allowed_file_types.len(),
            default_file_types().len() - 1
        );
        assert!(matches!(app.mode, AppMode::ManageTypes { .. }));
    }

    #[test]
    fn manage_types_reset_restores_defaults() {
        let mut app = app();
        app.mode = AppMode::ManageTypes { cursor: 2 };
        app.handle_manage_types_input(key(KeyCode::Char('d')));
        assert_ne!(app.settings.allowed_file_types, default_file_types());

        app.handle_manage_types_input(key(KeyCode::Char('r')));
        assert_eq!(app.settings.allowed_file_types, default_file_types());
        assert!(matches!(app.mode, AppMode::ManageTypes { cursor: 0 }));
    }

    #[test]
    fn manage_types_cursor_wraps_and_exits() {
        let mut app = app();
        app.mode = AppMode::ManageTypes { cursor: 0 };
        app.handle_manage_types_input(key(KeyCode::Up));
        let len = app.settings.allowed_file_types.len();
        assert!(matches!(app.mode, AppMode::ManageTypes { cursor } if cursor == len - 1));

        app.handle_manage_types_input(key(KeyCode::Esc));
        assert!(matches!(app.mode, AppMode::Normal));
    }

    #[test]
    fn manage_types_unavailable_during_batch() {
        let mut app = app();
        let (_tx, rx) = mpsc::channel();
        app.batch = Some(BatchState {
            rx,
            kind: BatchKind::Scan,
            added: 0,
        });
        app.handle_normal_mode_input(key(KeyCode::Char('t')));
        assert!(matches!(app.mode, AppMode::Normal));
    }
}
