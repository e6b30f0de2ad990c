use thiserror::Error;

pub const DEFAULT_MAX_ENTRIES: usize = 32;
pub const DEFAULT_MAX_FILE_SIZE: usize = 1024;
pub const DEFAULT_ARENA_CAPACITY: usize = DEFAULT_MAX_ENTRIES * DEFAULT_MAX_FILE_SIZE;
pub const DEFAULT_MAX_PATH_LEN: usize = 256;

/// Resource bounds fixed when a filesystem instance is created.
///
/// The entry count bounds how many files and directories can exist at once,
/// root included. The arena capacity bounds the total bytes ever written,
/// since space retired by overwrites and deletes is not reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_entries: usize,
    max_file_size: usize,
    arena_capacity: usize,
    max_path_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

impl Limits {
    pub fn builder() -> LimitsBuilder {
        LimitsBuilder::default()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn arena_capacity(&self) -> usize {
        self.arena_capacity
    }

    pub fn max_path_len(&self) -> usize {
        self.max_path_len
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LimitsError {
    #[error("need room for the root and at least one entry, got {0} entries")]
    TooFewEntries(usize),
    #[error("arena capacity must be non-zero")]
    EmptyArena,
    #[error("max file size {max_file_size} exceeds arena capacity {arena_capacity}")]
    FileLargerThanArena {
        max_file_size: usize,
        arena_capacity: usize,
    },
    #[error("max path length must be at least 1")]
    ZeroPathLength,
}

/// Starts from the default limits and overrides them one at a time.
#[derive(Debug, Default)]
pub struct LimitsBuilder {
    limits: Limits,
}

impl LimitsBuilder {
    /// Sets the number of slots in the entry table, root included.
    pub fn with_max_entries(mut self, entries: usize) -> Self {
        self.limits.max_entries = entries;
        self
    }

    /// Sets the largest payload a single write may carry.
    pub fn with_max_file_size(mut self, bytes: usize) -> Self {
        self.limits.max_file_size = bytes;
        self
    }

    pub fn with_arena_capacity(mut self, bytes: usize) -> Self {
        self.limits.arena_capacity = bytes;
        self
    }

    pub fn with_max_path_len(mut self, bytes: usize) -> Self {
        self.limits.max_path_len = bytes;
        self
    }

    pub fn build(self) -> Result<Limits, LimitsError> {
        let limits = self.limits;
        if limits.max_entries < 2 {
            return Err(LimitsError::TooFewEntries(limits.max_entries));
        }
        if limits.arena_capacity == 0 {
            return Err(LimitsError::EmptyArena);
        }
        if limits.max_file_size > limits.arena_capacity {
            return Err(LimitsError::FileLargerThanArena {
                max_file_size: limits.max_file_size,
                arena_capacity: limits.arena_capacity,
            });
        }
        if limits.max_path_len == 0 {
            return Err(LimitsError::ZeroPathLength);
        }
        Ok(limits)
    }
}

/// A point-in-time report of how much of each bounded resource is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Live entries, root included.
    pub entries_used: usize,
    pub entry_capacity: usize,
    /// Live directories, root included.
    pub directories: usize,
    pub files: usize,
    /// Bytes held by live files.
    pub bytes_stored: usize,
    /// Arena bytes handed out so far, retired ranges included.
    pub arena_used: usize,
    pub arena_capacity: usize,
}

impl Usage {
    pub fn free_entries(&self) -> usize {
        self.entry_capacity - self.entries_used
    }

    pub fn arena_remaining(&self) -> usize {
        self.arena_capacity - self.arena_used
    }

    /// Arena bytes no live file refers to any more.
    pub fn bytes_retired(&self) -> usize {
        self.arena_used - self.bytes_stored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let limits = Limits::default();

        assert_eq!(limits.max_entries(), 32);
        assert_eq!(limits.max_file_size(), 1024);
        assert_eq!(limits.arena_capacity(), 32 * 1024);
        assert_eq!(limits.max_path_len(), 256);
        assert_eq!(Limits::builder().build(), Ok(limits));
    }

    #[test]
    fn builder_overrides_each_limit() {
        let limits = Limits::builder()
            .with_max_entries(4)
            .with_max_file_size(16)
            .with_arena_capacity(64)
            .with_max_path_len(12)
            .build()
            .unwrap();

        assert_eq!(limits.max_entries(), 4);
        assert_eq!(limits.max_file_size(), 16);
        assert_eq!(limits.arena_capacity(), 64);
        assert_eq!(limits.max_path_len(), 12);
    }

    #[test]
    fn builder_rejects_unusable_limits() {
        assert_eq!(
            Limits::builder().with_max_entries(1).build(),
            Err(LimitsError::TooFewEntries(1))
        );
        assert_eq!(
            Limits::builder().with_arena_capacity(0).build(),
            Err(LimitsError::EmptyArena)
        );
        assert_eq!(
            Limits::builder()
                .with_max_file_size(100)
                .with_arena_capacity(50)
                .build(),
            Err(LimitsError::FileLargerThanArena {
                max_file_size: 100,
                arena_capacity: 50,
            })
        );
        assert_eq!(
            Limits::builder().with_max_path_len(0).build(),
            Err(LimitsError::ZeroPathLength)
        );
    }

    #[test]
    fn usage_derives_remaining_counts() {
        let usage = Usage {
            entries_used: 3,
            entry_capacity: 8,
            directories: 2,
            files: 1,
            bytes_stored: 10,
            arena_used: 25,
            arena_capacity: 100,
        };

        assert_eq!(usage.free_entries(), 5);
        assert_eq!(usage.arena_remaining(), 75);
        assert_eq!(usage.bytes_retired(), 15);
    }
}
