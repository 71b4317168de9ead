use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::category::FileCategory;

/// Stable handle to a tree node. Ids are never reused within a session,
/// so a stale id after a removal simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File(FileCategory),
}

/// One tracked file or folder.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub selected: bool,
    pub is_expanded: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Name shown in the list; the filesystem root keeps its separator.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    pub fn symbol(&self) -> &'static str {
        match self.kind {
            EntryKind::Folder => "📁",
            EntryKind::File(category) => category.symbol(),
        }
    }
}

/// Hierarchical view over a set of flat absolute paths.
///
/// Nodes live in an id-keyed arena; a parallel `path -> id` map keeps
/// the two views consistent. Inserting a file creates any missing
/// ancestor folders; removing a subtree prunes ancestors that end up
/// childless, so the tree never shows an empty folder between batches.
pub struct FileTree {
    nodes: HashMap<NodeId, Entry>,
    by_path: HashMap<PathBuf, NodeId>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl FileTree {
    pub fn new() -> Self {
        FileTree {
            nodes: HashMap::new(),
            by_path: HashMap::new(),
            roots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.id_of(path).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Entry> {
        self.nodes.get(&id)
    }

    pub fn id_of(&self, path: &Path) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn file_count(&self) -> usize {
        self.nodes.values().filter(|e| !e.is_dir()).count()
    }

    fn alloc(&mut self, entry: Entry) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.by_path.insert(entry.path.clone(), id);
        self.nodes.insert(id, entry);
        id
    }

    /// Keep a parent's children ordered case-insensitively by name, the
    /// same ordering the walker guarantees for its output.
    fn attach_child(&mut self, parent: Option<NodeId>, child: NodeId) {
        let name_key = |tree: &Self, id: NodeId| {
            tree.nodes
                .get(&id)
                .map(|e| e.display_name().to_lowercase())
                .unwrap_or_default()
        };
        let child_key = name_key(self, child);
        let siblings: Vec<NodeId> = match parent {
            Some(pid) => self
                .nodes
                .get(&pid)
                .map(|e| e.children.clone())
                .unwrap_or_default(),
            None => self.roots.clone(),
        };
        let pos = siblings
            .iter()
            .position(|&sid| name_key(self, sid) > child_key)
            .unwrap_or(siblings.len());
        match parent {
            Some(pid) => {
                if let Some(entry) = self.nodes.get_mut(&pid) {
                    entry.children.insert(pos, child);
                }
            }
            None => self.roots.insert(pos, child),
        }
    }

    /// Insert a file path, creating any missing ancestor folders along
    /// the way. No-op when the path is already tracked; returns the node
    /// id of the final component either way.
    pub fn insert(&mut self, path: &Path) -> NodeId {
        if let Some(&id) = self.by_path.get(path) {
            return id;
        }

        let mut parent: Option<NodeId> = None;
        let mut prefix = PathBuf::new();
        let components: Vec<_> = path.components().collect();
        for (i, component) in components.iter().enumerate() {
            prefix.push(component);
            let is_last = i == components.len() - 1;
            if let Some(&existing) = self.by_path.get(&prefix) {
                parent = Some(existing);
                continue;
            }
            let kind = if is_last {
                EntryKind::File(FileCategory::from_path(path))
            } else {
                EntryKind::Folder
            };
            let id = self.alloc(Entry {
                path: prefix.clone(),
                kind,
                selected: true,
                is_expanded: true,
                parent,
                children: Vec::new(),
            });
            self.attach_child(parent, id);
            parent = Some(id);
        }
        parent.expect("a path always has at least one component")
    }

    fn detach_from_parent(&mut self, id: NodeId) {
        let parent = self.nodes.get(&id).and_then(|e| e.parent);
        match parent {
            Some(pid) => {
                if let Some(entry) = self.nodes.get_mut(&pid) {
                    entry.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
    }

    /// Remove a node and all its descendants from both indexes, then
    /// prune upward any ancestor folder left without children. Safe to
    /// call again with the same (now stale) id; that is a no-op.
    pub fn remove_subtree(&mut self, id: NodeId) {
        let Some(entry) = self.nodes.get(&id) else {
            return;
        };
        let parent = entry.parent;
        self.detach_from_parent(id);

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                self.by_path.remove(&entry.path);
                stack.extend(entry.children);
            }
        }

        // Upward pruning. An ancestor may already be gone when several
        // removals in one batch share a chain.
        let mut cursor = parent;
        while let Some(pid) = cursor {
            let Some(entry) = self.nodes.get(&pid) else {
                break;
            };
            if !entry.is_dir() || !entry.children.is_empty() {
                break;
            }
            let next = entry.parent;
            self.detach_from_parent(pid);
            if let Some(removed) = self.nodes.remove(&pid) {
                self.by_path.remove(&removed.path);
            }
            cursor = next;
        }
    }

    /// Set the selection flag on a node and its whole subtree.
    pub fn set_selected_subtree(&mut self, id: NodeId, selected: bool) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.get_mut(&current) {
                entry.selected = selected;
                stack.extend(entry.children.iter().copied());
            }
        }
    }

    pub fn toggle_expanded(&mut self, id: NodeId) {
        if let Some(entry) = self.nodes.get_mut(&id) {
            if entry.is_dir() {
                entry.is_expanded = !entry.is_expanded;
            }
        }
    }

    /// Display tri-state for a folder: (any descendant file selected,
    /// all descendant files selected). A childless result means "none".
    pub fn folder_selection(&self, id: NodeId) -> (bool, bool) {
        let mut any = false;
        let mut all = true;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.get(&current) {
                if entry.is_dir() {
                    stack.extend(entry.children.iter().copied());
                } else if entry.selected {
                    any = true;
                } else {
                    all = false;
                }
            }
        }
        (any, any && all)
    }

    /// Rows for the list view: depth-first over the forest, skipping the
    /// contents of collapsed folders.
    pub fn visible_rows(&self) -> Vec<(NodeId, usize)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, 0))
            .collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(entry) = self.nodes.get(&id) else {
                continue;
            };
            rows.push((id, depth));
            if entry.is_dir() && entry.is_expanded {
                stack.extend(entry.children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        rows
    }

    /// All selected files with their categories, sorted
    /// case-insensitively by full path, the order the aggregator
    /// expects its input in.
    pub fn selected_files(&self) -> Vec<(PathBuf, FileCategory)> {
        let mut files: Vec<(PathBuf, FileCategory)> = self
            .nodes
            .values()
            .filter_map(|entry| match entry.kind {
                EntryKind::File(category) if entry.selected => {
                    Some((entry.path.clone(), category))
                }
                _ => None,
            })
            .collect();
        files.sort_by_key(|(path, _)| path.to_string_lossy().to_lowercase());
        files
    }

    /// Ids of all currently selected file nodes, used by
    /// remove-selected. Folders are never returned; upward pruning
    /// takes care of any folder emptied by the removals.
    pub fn selected_node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, entry)| !entry.is_dir() && entry.selected)
            .map(|(&id, _)| id)
            .collect();
        // Stable order keeps batch removals deterministic.
        ids.sort_by_key(|id| {
            self.nodes
                .get(id)
                .map(|e| e.path.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        });
        ids
    }
}
