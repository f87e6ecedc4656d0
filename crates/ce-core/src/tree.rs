// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Persistent directory tree
//!
//! Nodes are immutable and shared through `Arc`. Every change produces a new
//! root whose untouched subtrees are the very same allocations as before, so
//! consumers can detect changes with [`Arc::ptr_eq`].

use ce_domain_types::DirectoryEntry;
use std::cmp::Ordering;
use std::sync::Arc;

/// File or directory; symlinks and submodules are leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

/// One entry of the cached tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Slash-separated, `""` for the root
    pub path: String,
    pub kind: NodeKind,
    /// Unset until the directory has been listed
    pub children: Option<Vec<Arc<TreeNode>>>,
    pub loaded: bool,
    pub expanded: bool,
    /// A listing is in flight
    pub loading: bool,
}

impl TreeNode {
    /// Fresh, unloaded repository root
    pub fn root() -> Self {
        Self::directory("", "")
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            children: None,
            loaded: false,
            expanded: false,
            loading: false,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::File,
            ..Self::directory(name, path)
        }
    }

    pub fn from_entry(entry: &DirectoryEntry) -> Self {
        if entry.kind.is_dir() {
            Self::directory(&entry.name, &entry.path)
        } else {
            Self::file(&entry.name, &entry.path)
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn children(&self) -> &[Arc<TreeNode>] {
        self.children.as_deref().unwrap_or_default()
    }

    /// True when `path` is this node or lies below it
    fn contains_path(&self, path: &str) -> bool {
        if self.path.is_empty() {
            return true;
        }
        match path.strip_prefix(self.path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Display order: directories first, then by name
pub fn display_order(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Turn a listing into sorted child nodes
pub fn children_from_listing(entries: &[DirectoryEntry]) -> Vec<Arc<TreeNode>> {
    let mut nodes: Vec<TreeNode> = entries.iter().map(TreeNode::from_entry).collect();
    nodes.sort_by(display_order);
    nodes.into_iter().map(Arc::new).collect()
}

/// Partial update of a node; `None` fields keep their old value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub children: Option<Option<Vec<Arc<TreeNode>>>>,
    pub loaded: Option<bool>,
    pub expanded: Option<bool>,
    pub loading: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(mut self, children: Vec<Arc<TreeNode>>) -> Self {
        self.children = Some(Some(children));
        self
    }

    pub fn loaded(mut self, loaded: bool) -> Self {
        self.loaded = Some(loaded);
        self
    }

    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    fn merge_into(&self, node: &TreeNode) -> TreeNode {
        TreeNode {
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            children: self.children.clone().unwrap_or_else(|| node.children.clone()),
            loaded: self.loaded.unwrap_or(node.loaded),
            expanded: self.expanded.unwrap_or(node.expanded),
            loading: self.loading.unwrap_or(node.loading),
        }
    }
}

/// Replace the node at `target` by its merge with `patch`
///
/// Ancestors of the target are rebuilt, every other node is shared with the
/// input. An unknown `target` returns `root` itself.
pub fn apply_patch(root: &Arc<TreeNode>, target: &str, patch: &NodePatch) -> Arc<TreeNode> {
    patch_node(root, target, patch).unwrap_or_else(|| Arc::clone(root))
}

fn patch_node(node: &Arc<TreeNode>, target: &str, patch: &NodePatch) -> Option<Arc<TreeNode>> {
    if node.path == target {
        return Some(Arc::new(patch.merge_into(node)));
    }

    let children = node.children.as_ref()?;
    let (index, replaced) = children
        .iter()
        .enumerate()
        .filter(|(_, child)| child.contains_path(target))
        .find_map(|(i, child)| patch_node(child, target, patch).map(|n| (i, n)))?;

    let mut new_children = children.clone();
    new_children[index] = replaced;
    Some(Arc::new(TreeNode {
        children: Some(new_children),
        ..TreeNode::clone(node)
    }))
}

/// Find the node at `path`
pub fn find<'a>(root: &'a Arc<TreeNode>, path: &str) -> Option<&'a Arc<TreeNode>> {
    let mut cur = root;
    while cur.path != path {
        cur = cur.children().iter().find(|c| c.contains_path(path))?;
    }
    Some(cur)
}

/// Case-insensitive substring filter over a deep copy of the tree
///
/// Files are kept when their name matches; directories when their name
/// matches or a descendant is kept. Kept directories are forced open. The
/// root is always kept. A blank query yields an unmodified copy.
pub fn filter(root: &TreeNode, query: &str) -> TreeNode {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return deep_copy(root);
    }

    let children = root
        .children
        .as_ref()
        .map(|children| children.iter().filter_map(|c| filter_node(c, &query)).collect());
    TreeNode {
        children,
        expanded: true,
        ..shallow(root)
    }
}

fn filter_node(node: &TreeNode, query: &str) -> Option<Arc<TreeNode>> {
    let matches = node.name.to_lowercase().contains(query);
    if !node.is_dir() {
        return matches.then(|| Arc::new(shallow(node)));
    }

    let kept: Vec<Arc<TreeNode>> = node
        .children()
        .iter()
        .filter_map(|c| filter_node(c, query))
        .collect();
    if !matches && kept.is_empty() {
        return None;
    }

    Some(Arc::new(TreeNode {
        children: node.children.as_ref().map(|_| kept),
        expanded: true,
        ..shallow(node)
    }))
}

/// Copy of the node's own fields without its children
fn shallow(node: &TreeNode) -> TreeNode {
    TreeNode {
        name: node.name.clone(),
        path: node.path.clone(),
        kind: node.kind,
        children: None,
        loaded: node.loaded,
        expanded: node.expanded,
        loading: node.loading,
    }
}

fn deep_copy(node: &TreeNode) -> TreeNode {
    TreeNode {
        children: node
            .children
            .as_ref()
            .map(|children| children.iter().map(|c| Arc::new(deep_copy(c))).collect()),
        ..shallow(node)
    }
}

/// Loaded file paths in display order
pub fn flatten(root: &TreeNode) -> Vec<String> {
    let mut files = Vec::new();
    let mut stack: Vec<&TreeNode> = vec![root];

    while let Some(node) = stack.pop() {
        if !node.is_dir() {
            files.push(node.path.clone());
            continue;
        }
        // Reverse so the first child is visited first
        stack.extend(node.children().iter().rev().map(|c| c.as_ref()));
    }

    files
}
