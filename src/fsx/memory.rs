//! In-memory [`FileSystem`] used by unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{EntryKind, FileSystem};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    denied: BTreeSet<PathBuf>,
}

/// A file tree held in a `BTreeMap`, keyed by normalized path.
///
/// Paths are normalized through [`Path::components`], so `/a/b/` and `/a/b`
/// name the same node. Ancestors are created implicitly by the `add_*`
/// helpers.
#[derive(Debug, Default)]
pub struct MemFs {
    state: Mutex<State>,
}

fn key(path: &Path) -> PathBuf {
    path.components().collect()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file or directory", path.display()))
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a file with `contents`, creating missing ancestors.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = key(path.as_ref());
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            insert_dirs(&mut state.nodes, parent);
        }
        state.nodes.insert(path, Node::File(contents.into()));
    }

    /// Adds a directory and its missing ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        insert_dirs(&mut self.lock().nodes, &key(path.as_ref()));
    }

    /// Makes `metadata` fail with `PermissionDenied` for this path.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.lock().denied.insert(key(path.as_ref()));
    }

    /// Contents of a file, `None` for directories and missing paths.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.lock().nodes.get(&key(path.as_ref())) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }
}

fn insert_dirs(nodes: &mut BTreeMap<PathBuf, Node>, dir: &Path) {
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
    }
}

impl FileSystem for MemFs {
    fn exists(&self, path: &Path) -> bool {
        self.lock().nodes.contains_key(&key(path))
    }

    fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let path = key(path);
        let state = self.lock();
        if state.denied.contains(&path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        match state.nodes.get(&path) {
            Some(Node::Dir) => Ok(EntryKind::Dir),
            Some(Node::File(_)) => Ok(EntryKind::File),
            None => Err(not_found(&path)),
        }
    }

    fn find(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let root = key(root);
        let state = self.lock();
        if !state.nodes.contains_key(&root) {
            return Ok(Vec::new());
        }
        Ok(state
            .nodes
            .range(root.clone()..)
            .map(|(path, _)| path)
            .take_while(|path| path.starts_with(&root))
            .cloned()
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = key(path);
        let mut state = self.lock();
        for ancestor in path.ancestors() {
            if let Some(Node::File(_)) = state.nodes.get(ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} is a file", ancestor.display()),
                ));
            }
        }
        insert_dirs(&mut state.nodes, &path);
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (from, to) = (key(from), key(to));
        let mut state = self.lock();
        let data = match state.nodes.get(&from) {
            Some(Node::File(data)) => data.clone(),
            _ => return Err(not_found(&from)),
        };
        match to.parent().and_then(|p| state.nodes.get(p)) {
            Some(Node::Dir) => {}
            _ => return Err(not_found(&to)),
        }
        state.nodes.insert(to, Node::File(data));
        Ok(())
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        let path = key(path);
        let mut state = self.lock();
        if !state.nodes.contains_key(&path) {
            return Err(not_found(&path));
        }
        state.nodes.retain(|p, _| !p.starts_with(&path));
        Ok(())
    }
}
