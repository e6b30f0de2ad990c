//! An in-memory hierarchical file store for a small single address space
//! system. A fixed table of entries is threaded into a directory tree by
//! index links, and file contents are bump-allocated from one flat arena
//! that is never compacted.
//!
//! ```
//! use arenafs::MemFs;
//!
//! let mut fs = MemFs::default();
//! fs.create_directory("docs").unwrap();
//! fs.change_directory("docs").unwrap();
//! fs.create_file("todo").unwrap();
//! fs.write_file("todo", b"write more tests").unwrap();
//!
//! assert_eq!(fs.current_path(), "/docs");
//! assert_eq!(fs.read_file("todo").unwrap(), b"write more tests");
//! ```
mod alloc;
mod fs;
mod limits;
mod node;
pub mod path;

pub use crate::alloc::Arena;
pub use crate::fs::{DirEntry, FsError, Listing, MemFs};
pub use crate::limits::{
    Limits, LimitsBuilder, LimitsError, Usage, DEFAULT_ARENA_CAPACITY, DEFAULT_MAX_ENTRIES,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_PATH_LEN,
};
pub use crate::node::{Children, Entry, EntryId, EntryKind, EntryTable, Name, MAX_NAME_LEN};
