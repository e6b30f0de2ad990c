use log::{debug, warn};
use thiserror::Error;

use crate::alloc::Arena;
use crate::limits::{Limits, Usage};
use crate::node::{Children, Entry, EntryId, EntryKind, EntryTable, Name, MAX_NAME_LEN};
use crate::path;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("no such file or directory: {0}")]
    NotFound(String),
    #[error("an entry named {0} already exists")]
    AlreadyExists(String),
    #[error("name is longer than {max} bytes: {name}")]
    NameTooLong { name: String, max: usize },
    #[error("no free entries left (capacity {capacity})")]
    TableFull { capacity: usize },
    #[error("not enough space: {requested} bytes requested, {remaining} left")]
    ArenaExhausted { requested: usize, remaining: usize },
    #[error("file size {size} exceeds the {max} byte limit")]
    SizeTooLarge { size: usize, max: usize },
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Checks a name given for creation or lookup. Names that could never be
/// reached as a single path token are refused up front.
fn checked_name(name: &str) -> Result<Name, FsError> {
    match name {
        "" => return Err(FsError::InvalidArgument("empty name".to_string())),
        "." | ".." => {
            return Err(FsError::InvalidArgument(format!(
                "{} is a reserved name",
                name
            )))
        }
        n if n.contains('/') => {
            return Err(FsError::InvalidArgument(format!(
                "{} contains a path separator",
                name
            )))
        }
        _ => {}
    }
    Name::new(name).ok_or_else(|| FsError::NameTooLong {
        name: name.to_string(),
        max: MAX_NAME_LEN,
    })
}

/// One row of a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry<'a> {
    pub name: &'a str,
    pub kind: EntryKind,
    pub size: usize,
}

impl<'a> DirEntry<'a> {
    fn from_entry(entry: &'a Entry) -> Self {
        Self {
            name: entry.name(),
            kind: entry.kind(),
            size: entry.size(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Lazily enumerates one directory's children in insertion order. Clone it
/// to walk the same listing again.
#[derive(Clone)]
pub struct Listing<'a> {
    children: Children<'a>,
}

impl<'a> Iterator for Listing<'a> {
    type Item = DirEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.children
            .next()
            .map(|(_, entry)| DirEntry::from_entry(entry))
    }
}

/// An in-memory hierarchical file store: a fixed table of entries threaded
/// into a directory tree, with file contents bump-allocated from one arena.
///
/// Every name-based operation is scoped to the current directory.
pub struct MemFs {
    limits: Limits,
    entries: EntryTable,
    arena: Arena,
    cwd: EntryId,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl MemFs {
    /// Creates an empty filesystem holding just the root directory.
    pub fn new(limits: Limits) -> Self {
        debug!(
            "initializing filesystem: {} entries, {} byte arena",
            limits.max_entries(),
            limits.arena_capacity()
        );
        Self {
            entries: EntryTable::new(limits.max_entries()),
            arena: Arena::new(limits.arena_capacity()),
            cwd: EntryId::ROOT,
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Read access to the underlying table, for callers that walk the tree.
    pub fn entries(&self) -> &EntryTable {
        &self.entries
    }

    pub fn create_file(&mut self, name: &str) -> Result<EntryId, FsError> {
        self.create(name, EntryKind::File)
    }

    pub fn create_directory(&mut self, name: &str) -> Result<EntryId, FsError> {
        self.create(name, EntryKind::Directory)
    }

    fn create(&mut self, name: &str, kind: EntryKind) -> Result<EntryId, FsError> {
        let checked = checked_name(name)?;
        if self.entries.find_child(self.cwd, name).is_some() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }

        let id = self
            .entries
            .claim(self.cwd, checked, kind, self.arena.used())
            .ok_or_else(|| {
                warn!("entry table full, cannot create {}", name);
                FsError::TableFull {
                    capacity: self.entries.capacity(),
                }
            })?;
        debug!("created {:?} {} as {}", kind, name, id);
        Ok(id)
    }

    /// Finds a live file (not directory) in the current directory.
    fn find_file(&self, name: &str) -> Result<EntryId, FsError> {
        checked_name(name)?;
        match self.entries.find_child(self.cwd, name) {
            Some((id, entry)) if !entry.is_dir() => Ok(id),
            _ => Err(FsError::NotFound(name.to_string())),
        }
    }

    /// Replaces the contents of an existing file and returns the bytes
    /// written.
    ///
    /// A non-empty write always takes a fresh range at the arena's bump
    /// offset; the range the file held before is retired. An empty write
    /// only resets the size. Nothing changes when an error is returned.
    pub fn write_file(&mut self, name: &str, data: &[u8]) -> Result<usize, FsError> {
        let id = self.find_file(name)?;
        let max = self.limits.max_file_size();
        if data.len() > max {
            return Err(FsError::SizeTooLarge {
                size: data.len(),
                max,
            });
        }
        if data.is_empty() {
            let entry = self.entries.get_mut(id);
            let offset = entry.data_range().start;
            entry.set_contents(offset, 0);
            debug!("truncated {}", name);
            return Ok(0);
        }

        let range = self.arena.alloc(data.len()).map_err(|err| {
            warn!("cannot write {} bytes to {}: {}", data.len(), name, err);
            err
        })?;
        self.arena.slice_mut(range.clone()).copy_from_slice(data);
        self.entries
            .get_mut(id)
            .set_contents(range.start, data.len());
        debug!("wrote {} bytes to {} at offset {}", data.len(), name, range.start);
        Ok(data.len())
    }

    /// Borrows the current contents of a file.
    pub fn read_file(&self, name: &str) -> Result<&[u8], FsError> {
        let id = self.find_file(name)?;
        let entry = self.entries.get(id);
        if entry.size() == 0 {
            return Ok(&[]);
        }
        Ok(self.arena.slice(entry.data_range()))
    }

    /// Copies as much of a file as fits into `buf` and returns the count.
    pub fn read_into(&self, name: &str, buf: &mut [u8]) -> Result<usize, FsError> {
        let data = self.read_file(name)?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    /// Removes a file from the current directory. Its arena bytes are
    /// retired, not reclaimed.
    pub fn delete_file(&mut self, name: &str) -> Result<(), FsError> {
        let id = self.find_file(name)?;
        self.entries.release(id);
        debug!("deleted file {}", name);
        Ok(())
    }

    /// Removes an empty directory from the current directory.
    pub fn remove_directory(&mut self, name: &str) -> Result<(), FsError> {
        checked_name(name)?;
        let (id, entry) = self
            .entries
            .find_child(self.cwd, name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        if !entry.is_dir() {
            return Err(FsError::NotADirectory(name.to_string()));
        }
        if entry.first_child().is_some() {
            return Err(FsError::DirectoryNotEmpty(name.to_string()));
        }

        self.entries.release(id);
        debug!("removed directory {}", name);
        Ok(())
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.find_file(name).is_ok()
    }

    /// Size of a file in the current directory, or 0 if there is none.
    pub fn get_file_size(&self, name: &str) -> usize {
        self.find_file(name)
            .map(|id| self.entries.get(id).size())
            .unwrap_or(0)
    }

    /// Resolves one path token against the current directory.
    pub fn resolve(&self, token: &str) -> Result<EntryId, FsError> {
        path::resolve(&self.entries, self.cwd, token)
    }

    /// Moves the cursor. On failure the cursor stays where it was.
    pub fn change_directory(&mut self, token: &str) -> Result<EntryId, FsError> {
        let target = self.resolve(token)?;
        self.cwd = target;
        debug!("changed directory to {}", path::render(&self.entries, target));
        Ok(target)
    }

    pub fn current_directory(&self) -> EntryId {
        self.cwd
    }

    /// Absolute path of the current directory, cut to the configured maximum
    /// path length.
    pub fn current_path(&self) -> String {
        let mut rendered = path::render(&self.entries, self.cwd);
        path::truncate(&mut rendered, self.limits.max_path_len());
        rendered
    }

    /// Writes the current path into `buf`, truncating to fit, and returns the
    /// number of bytes written.
    pub fn write_current_path(&self, buf: &mut [u8]) -> usize {
        let rendered = self.current_path();
        let n = rendered.len().min(buf.len());
        buf[..n].copy_from_slice(&rendered.as_bytes()[..n]);
        n
    }

    /// Enumerates the children of the current directory.
    pub fn list_children(&self) -> Listing<'_> {
        Listing {
            children: self.entries.children(self.cwd),
        }
    }

    pub fn usage(&self) -> Usage {
        let mut usage = Usage {
            entries_used: 0,
            entry_capacity: self.entries.capacity(),
            directories: 0,
            files: 0,
            bytes_stored: 0,
            arena_used: self.arena.used(),
            arena_capacity: self.arena.capacity(),
        };
        for (_, entry) in self.entries.live() {
            usage.entries_used += 1;
            if entry.is_dir() {
                usage.directories += 1;
            } else {
                usage.files += 1;
                usage.bytes_stored += entry.size();
            }
        }
        usage
    }
}
