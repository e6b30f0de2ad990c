use std::fmt;

/// Longest entry name in bytes. Matches a 32 byte name buffer with one byte
/// left over for a terminator.
pub const MAX_NAME_LEN: usize = 31;

/// Identifies a slot in the entry table. The slot index doubles as the tree
/// node identity, and ids are only minted by the table itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

impl EntryId {
    /// The reserved root directory slot.
    pub const ROOT: EntryId = EntryId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A bounded entry name stored inline so the table never allocates per entry.
#[derive(Clone, Copy)]
pub struct Name {
    bytes: [u8; MAX_NAME_LEN],
    len: u8,
}

impl Name {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; MAX_NAME_LEN],
            len: 0,
        }
    }

    /// Copies `name` into a fixed buffer. Returns `None` if it does not fit.
    pub fn new(name: &str) -> Option<Self> {
        let raw = name.as_bytes();
        if raw.len() > MAX_NAME_LEN {
            return None;
        }
        let mut bytes = [0; MAX_NAME_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self {
            bytes,
            len: raw.len() as u8,
        })
    }

    pub fn as_str(&self) -> &str {
        // Only ever filled from a &str, so the bytes are valid UTF-8.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

/// One record of the entry table. Files and directories share this shape;
/// the link fields thread the directory tree through the table.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    name: Name,
    kind: EntryKind,
    used: bool,
    /// Valid bytes, always 0 for directories.
    size: usize,
    /// Start of the file's range in the arena. Meaningless while `size` is 0.
    data_offset: usize,
    parent: Option<EntryId>,
    first_child: Option<EntryId>,
    next_sibling: Option<EntryId>,
}

impl Entry {
    fn vacant() -> Self {
        Self {
            name: Name::empty(),
            kind: EntryKind::File,
            used: false,
            size: 0,
            data_offset: 0,
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    fn root() -> Self {
        Self {
            name: Name::new("/").unwrap_or_else(Name::empty),
            kind: EntryKind::Directory,
            used: true,
            ..Self::vacant()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<EntryId> {
        self.first_child
    }

    pub fn next_sibling(&self) -> Option<EntryId> {
        self.next_sibling
    }

    /// The arena range currently holding this file's bytes.
    pub(crate) fn data_range(&self) -> std::ops::Range<usize> {
        self.data_offset..self.data_offset + self.size
    }

    pub(crate) fn set_contents(&mut self, offset: usize, size: usize) {
        self.data_offset = offset;
        self.size = size;
    }
}

/// Fixed-capacity pool of entries. Slot 0 always holds the root directory.
///
/// Outside the crate the table is read-only: ids come from the filesystem
/// and every link change goes through [`MemFs`](crate::MemFs).
pub struct EntryTable {
    entries: Box<[Entry]>,
}

impl EntryTable {
    /// Builds a table of `capacity` slots with the root directory claimed.
    pub(crate) fn new(capacity: usize) -> Self {
        let mut entries = vec![Entry::vacant(); capacity.max(1)].into_boxed_slice();
        entries[EntryId::ROOT.0] = Entry::root();
        Self { entries }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.entries[id.0]
    }

    /// Returns the live entry at `id`, or `None` for a vacant slot or an id
    /// minted by a larger table.
    pub fn lookup(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0).filter(|entry| entry.used)
    }

    pub fn live(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.used)
            .map(|(i, entry)| (EntryId(i), entry))
    }

    fn free_slot(&self) -> Option<EntryId> {
        self.entries
            .iter()
            .position(|entry| !entry.used)
            .map(EntryId)
    }

    /// Claims the first unused slot and links it as the last child of
    /// `parent`. Returns `None` when every slot is taken.
    pub(crate) fn claim(
        &mut self,
        parent: EntryId,
        name: Name,
        kind: EntryKind,
        data_offset: usize,
    ) -> Option<EntryId> {
        let id = self.free_slot()?;
        self.entries[id.0] = Entry {
            name,
            kind,
            used: true,
            data_offset,
            ..Entry::vacant()
        };
        self.add_child(parent, id);
        Some(id)
    }

    /// Unlinks `id` from its parent and returns the slot to the pool. The
    /// root slot is never released.
    pub(crate) fn release(&mut self, id: EntryId) {
        if id == EntryId::ROOT {
            return;
        }
        if let Some(parent) = self.entries[id.0].parent {
            self.remove_child(parent, id);
        }
        self.entries[id.0] = Entry::vacant();
    }

    /// Appends `child` to the tail of `parent`'s sibling chain, unlinking it
    /// from any chain it is already in.
    pub(crate) fn add_child(&mut self, parent: EntryId, child: EntryId) {
        if child == EntryId::ROOT {
            return;
        }
        if let Some(old) = self.entries[child.0].parent {
            self.remove_child(old, child);
        }
        self.entries[child.0].next_sibling = None;
        let tail = self.children(parent).last().map(|(id, _)| id);
        match tail {
            None => self.entries[parent.0].first_child = Some(child),
            Some(tail) => self.entries[tail.0].next_sibling = Some(child),
        }
        self.entries[child.0].parent = Some(parent);
        log::trace!("linked {} under {}", child, parent);
    }

    /// Splices `child` out of `parent`'s sibling chain. Does nothing if the
    /// child is not in the chain.
    pub(crate) fn remove_child(&mut self, parent: EntryId, child: EntryId) {
        let after = self.entries[child.0].next_sibling;
        if self.entries[parent.0].first_child == Some(child) {
            self.entries[parent.0].first_child = after;
        } else {
            let before = self
                .children(parent)
                .find(|(_, entry)| entry.next_sibling == Some(child))
                .map(|(id, _)| id);
            match before {
                Some(before) => self.entries[before.0].next_sibling = after,
                None => return,
            }
        }
        self.entries[child.0].next_sibling = None;
        self.entries[child.0].parent = None;
        log::trace!("unlinked {} from {}", child, parent);
    }

    /// Walks the sibling chain of `dir` in insertion order. An id outside the
    /// table has no children.
    pub fn children(&self, dir: EntryId) -> Children<'_> {
        Children {
            table: self,
            next: self.entries.get(dir.0).and_then(|entry| entry.first_child),
            remaining: self.entries.len(),
        }
    }

    /// Finds the live child of `dir` called `name`, of either kind.
    pub fn find_child(&self, dir: EntryId, name: &str) -> Option<(EntryId, &Entry)> {
        self.children(dir).find(|(_, entry)| entry.name == *name)
    }
}

/// Iterator over a directory's sibling chain. A clone continues from the
/// same position independently.
#[derive(Clone)]
pub struct Children<'a> {
    table: &'a EntryTable,
    next: Option<EntryId>,
    /// Chains are acyclic, but the walk is still capped at table capacity.
    remaining: usize,
}

impl<'a> Iterator for Children<'a> {
    type Item = (EntryId, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        self.remaining -= 1;
        let entry = self.table.get(id);
        self.next = entry.next_sibling;
        Some((id, entry))
    }
}
