use crate::fs::FsError;
use crate::node::{EntryId, EntryTable};

/// One navigation step. Tokens are never split on `/`; a token that starts
/// with `/` names the root no matter what follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Root,
    Current,
    Parent,
    Child(&'a str),
}

impl<'a> Token<'a> {
    pub fn parse(token: &'a str) -> Result<Self, FsError> {
        if token.is_empty() {
            return Err(FsError::InvalidArgument("empty path".to_string()));
        }
        Ok(match token {
            t if t.starts_with('/') => Token::Root,
            "." => Token::Current,
            ".." => Token::Parent,
            name => Token::Child(name),
        })
    }
}

/// Maps `token` to a directory, relative to `dir`. The root's parent is the
/// root itself.
pub fn resolve(table: &EntryTable, dir: EntryId, token: &str) -> Result<EntryId, FsError> {
    match Token::parse(token)? {
        Token::Root => Ok(EntryId::ROOT),
        Token::Current => Ok(dir),
        Token::Parent => Ok(table.get(dir).parent().unwrap_or(EntryId::ROOT)),
        Token::Child(name) => table
            .children(dir)
            .find(|(_, entry)| entry.is_dir() && entry.name() == name)
            .map(|(id, _)| id)
            .ok_or_else(|| FsError::NotFound(name.to_string())),
    }
}

/// Renders the absolute path of `dir` by following parent links up to the
/// root. The walk gives up after `table.capacity()` steps.
pub fn render(table: &EntryTable, dir: EntryId) -> String {
    let mut components = Vec::new();
    let mut cursor = dir;
    for _ in 0..table.capacity() {
        if cursor == EntryId::ROOT {
            break;
        }
        let entry = table.get(cursor);
        components.push(entry.name());
        match entry.parent() {
            Some(parent) => cursor = parent,
            None => break,
        }
    }

    if components.is_empty() {
        return String::from("/");
    }
    let mut path = String::new();
    for component in components.iter().rev() {
        path.push('/');
        path.push_str(component);
    }
    path
}

/// Cuts `path` down to at most `max` bytes without splitting a character.
pub fn truncate(path: &mut String, max: usize) {
    if path.len() <= max {
        return;
    }
    let mut end = max;
    while !path.is_char_boundary(end) {
        end -= 1;
    }
    path.truncate(end);
}
