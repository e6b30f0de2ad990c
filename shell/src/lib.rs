//! A line oriented command shell over [`arenafs::MemFs`]. The shell owns all
//! text formatting; the filesystem only hands back results and byte spans.
use std::io::{self, BufRead, Write};

use arenafs::{FsError, MemFs};
use log::debug;

/// Width of the name column in listings.
const NAME_COLUMN: usize = 20;

const HELP: &str = "\
Available commands:
File Operations:
  create <file>        - Create a new empty file
  read <file>          - Display file contents
  cat <file>           - Alias for read
  write <file> <text>  - Replace file contents, creating the file if needed
  edit <file> <text>   - Alias for write
  delete <file>        - Delete a file
  rm <file>            - Alias for delete

Directory Operations:
  mkdir <dir>          - Create a new directory
  rmdir <dir>          - Remove an empty directory
  cd [path]            - Change directory (/, .., ., name); no path goes to /
  pwd                  - Show current directory
  list, ls             - List directory contents

System Operations:
  info                 - Show file system usage
  help                 - Show this help message
  exit, quit           - Leave the shell
";

/// Whether the read loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W: Write> {
    fs: MemFs,
    out: W,
}

/// Splits off the first whitespace-delimited word, returning it and the rest
/// with leading whitespace removed.
fn split_word(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], line[end..].trim_start()),
        None => (line, ""),
    }
}

impl<W: Write> Shell<W> {
    pub fn new(fs: MemFs, out: W) -> Self {
        Self { fs, out }
    }

    pub fn fs(&self) -> &MemFs {
        &self.fs
    }

    /// Hands back the output sink, e.g. to inspect what a script printed.
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn prompt(&self) -> String {
        format!("arenafs:{}$ ", self.fs.current_path())
    }

    /// Reads commands until end of input or `exit`. Prompts are printed only
    /// when `interactive` is set.
    pub fn run<R: BufRead>(&mut self, input: R, interactive: bool) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            if interactive {
                let prompt = self.prompt();
                write!(self.out, "{}", prompt)?;
                self.out.flush()?;
            }
            let line = match lines.next() {
                Some(line) => line?,
                None => return Ok(()),
            };
            if self.execute(&line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Runs a single command line. Filesystem errors are reported on the
    /// output and never end the session; only I/O errors are returned.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let (command, rest) = split_word(line);
        if command.is_empty() {
            return Ok(Flow::Continue);
        }
        debug!("executing {:?}", line.trim());
        let (arg, tail) = split_word(rest);

        let result = match command {
            "help" => {
                write!(self.out, "{}", HELP)?;
                Ok(())
            }
            "exit" | "quit" => return Ok(Flow::Exit),
            "create" => self.with_arg("create <filename>", arg, Self::create),
            "read" | "cat" => self.with_arg("read <filename>", arg, Self::read),
            "write" | "edit" => {
                if arg.is_empty() {
                    self.usage("write <filename> <text>")
                } else {
                    self.write(arg, tail)
                }
            }
            "delete" | "rm" => self.with_arg("delete <filename>", arg, Self::delete),
            "mkdir" => self.with_arg("mkdir <dirname>", arg, Self::mkdir),
            "rmdir" => self.with_arg("rmdir <dirname>", arg, Self::rmdir),
            "cd" => self.cd(if arg.is_empty() { "/" } else { arg }),
            "pwd" => {
                let path = self.fs.current_path();
                writeln!(self.out, "{}", path)?;
                Ok(())
            }
            "list" | "ls" => self.list(),
            "info" => self.info(),
            _ => {
                writeln!(self.out, "Unknown command: {}", command)?;
                writeln!(self.out, "Type 'help' for available commands.")?;
                Ok(())
            }
        };

        match result {
            Ok(()) => Ok(Flow::Continue),
            Err(ShellError::Io(err)) => Err(err),
            Err(ShellError::Fs(err)) => {
                writeln!(self.out, "Error: {}", describe(&err))?;
                Ok(Flow::Continue)
            }
        }
    }

    fn with_arg(
        &mut self,
        usage: &str,
        arg: &str,
        command: fn(&mut Self, &str) -> Result<(), ShellError>,
    ) -> Result<(), ShellError> {
        if arg.is_empty() {
            return self.usage(usage);
        }
        command(self, arg)
    }

    fn usage(&mut self, usage: &str) -> Result<(), ShellError> {
        writeln!(self.out, "Usage: {}", usage)?;
        Ok(())
    }

    fn create(&mut self, name: &str) -> Result<(), ShellError> {
        self.fs.create_file(name)?;
        writeln!(self.out, "File '{}' created.", name)?;
        Ok(())
    }

    fn read(&mut self, name: &str) -> Result<(), ShellError> {
        let data = self.fs.read_file(name)?;
        if data.is_empty() {
            writeln!(self.out, "File '{}' is empty.", name)?;
            return Ok(());
        }
        let text = String::from_utf8_lossy(data).into_owned();
        writeln!(self.out, "{}", text.trim_end_matches('\n'))?;
        Ok(())
    }

    fn write(&mut self, name: &str, text: &str) -> Result<(), ShellError> {
        if !self.fs.file_exists(name) {
            self.fs.create_file(name)?;
        }
        let written = self.fs.write_file(name, text.as_bytes())?;
        writeln!(self.out, "Wrote {} bytes to '{}'.", written, name)?;
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), ShellError> {
        self.fs.delete_file(name)?;
        writeln!(self.out, "File '{}' deleted.", name)?;
        Ok(())
    }

    fn mkdir(&mut self, name: &str) -> Result<(), ShellError> {
        self.fs.create_directory(name)?;
        writeln!(self.out, "Directory '{}' created.", name)?;
        Ok(())
    }

    fn rmdir(&mut self, name: &str) -> Result<(), ShellError> {
        self.fs.remove_directory(name)?;
        writeln!(self.out, "Directory '{}' removed.", name)?;
        Ok(())
    }

    fn cd(&mut self, token: &str) -> Result<(), ShellError> {
        self.fs.change_directory(token)?;
        let path = self.fs.current_path();
        writeln!(self.out, "Changed to {}", path)?;
        Ok(())
    }

    fn list(&mut self) -> Result<(), ShellError> {
        let fs = &self.fs;
        let out = &mut self.out;
        writeln!(out, "Contents of {}:", fs.current_path())?;
        writeln!(out, "Type Name{:pad$} Size (bytes)", "", pad = NAME_COLUMN - 4)?;
        writeln!(out, "{}", "-".repeat(NAME_COLUMN + 20))?;

        let mut count = 0;
        for entry in fs.list_children() {
            if entry.is_dir() {
                writeln!(out, "DIR  {:<width$} <DIR>", entry.name, width = NAME_COLUMN)?;
            } else {
                writeln!(
                    out,
                    "FILE {:<width$} {}",
                    entry.name,
                    entry.size,
                    width = NAME_COLUMN
                )?;
            }
            count += 1;
        }

        if count == 0 {
            writeln!(out, "Directory is empty.")?;
        } else {
            writeln!(out)?;
            writeln!(out, "Total: {} items", count)?;
        }
        Ok(())
    }

    fn info(&mut self) -> Result<(), ShellError> {
        let usage = self.fs.usage();
        let path = self.fs.current_path();
        let max_file_size = self.fs.limits().max_file_size();
        let out = &mut self.out;
        writeln!(out, "File System Information:")?;
        writeln!(out, "Current Directory: {}", path)?;
        writeln!(out, "Total entries: {}/{}", usage.entries_used, usage.entry_capacity)?;
        writeln!(out, "Free entries: {}", usage.free_entries())?;
        writeln!(out, "Directories: {}, Files: {}", usage.directories, usage.files)?;
        writeln!(out, "Data stored: {} bytes", usage.bytes_stored)?;
        writeln!(
            out,
            "Arena used: {}/{} bytes ({} retired)",
            usage.arena_used,
            usage.arena_capacity,
            usage.bytes_retired()
        )?;
        writeln!(out, "Free space: {} bytes", usage.arena_remaining())?;
        writeln!(out, "Max file size: {} bytes", max_file_size)?;
        Ok(())
    }
}

enum ShellError {
    Fs(FsError),
    Io(io::Error),
}

impl From<FsError> for ShellError {
    fn from(err: FsError) -> Self {
        ShellError::Fs(err)
    }
}

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::Io(err)
    }
}

/// Human readable message for a filesystem error.
pub fn describe(err: &FsError) -> String {
    match err {
        FsError::NotFound(name) => format!("'{}' not found.", name),
        FsError::AlreadyExists(name) => format!("'{}' already exists.", name),
        FsError::NameTooLong { max, .. } => format!("Name too long (max {} bytes).", max),
        FsError::TableFull { .. } => "No free file entries available.".to_string(),
        FsError::ArenaExhausted { .. } => "Not enough space in file system.".to_string(),
        FsError::SizeTooLarge { max, .. } => format!("File size too large (max {} bytes).", max),
        FsError::NotADirectory(name) => format!("'{}' is not a directory.", name),
        FsError::DirectoryNotEmpty(name) => format!("Directory '{}' is not empty.", name),
        FsError::InvalidArgument(reason) => format!("Invalid name: {}.", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_lines(lines: &[&str]) -> (MemFs, String) {
        let mut shell = Shell::new(MemFs::default(), Vec::new());
        for line in lines {
            shell.execute(line).unwrap();
        }
        let out = String::from_utf8(shell.out).unwrap();
        (shell.fs, out)
    }

    #[test]
    fn splits_first_word() {
        assert_eq!(split_word("  write notes hello  world"), ("write", "notes hello  world"));
        assert_eq!(split_word("pwd"), ("pwd", ""));
        assert_eq!(split_word("   "), ("", ""));
    }

    #[test]
    fn write_creates_missing_file() {
        let (fs, out) = run_lines(&["write notes hello world"]);

        assert_eq!(fs.read_file("notes").unwrap(), b"hello world");
        assert!(out.contains("Wrote 11 bytes to 'notes'."));
    }

    #[test]
    fn errors_are_reported_and_session_continues() {
        let (fs, out) = run_lines(&["create a", "create a", "mkdir d"]);

        assert!(out.contains("Error: 'a' already exists."));
        assert!(fs.resolve("d").is_ok());
    }

    #[test]
    fn missing_arguments_print_usage() {
        let (_, out) = run_lines(&["create", "rmdir", "write"]);

        assert!(out.contains("Usage: create <filename>"));
        assert!(out.contains("Usage: rmdir <dirname>"));
        assert!(out.contains("Usage: write <filename> <text>"));
    }

    #[test]
    fn bare_cd_returns_to_root() {
        let (fs, _) = run_lines(&["mkdir a", "cd a", "cd"]);
        assert_eq!(fs.current_path(), "/");
    }

    #[test]
    fn exit_stops_the_loop() {
        let mut shell = Shell::new(MemFs::default(), Vec::new());
        assert_eq!(shell.execute("quit").unwrap(), Flow::Exit);
        assert_eq!(shell.execute("").unwrap(), Flow::Continue);
    }

    #[test]
    fn describes_every_error_kind() {
        assert_eq!(
            describe(&FsError::DirectoryNotEmpty("d".into())),
            "Directory 'd' is not empty."
        );
        assert_eq!(
            describe(&FsError::SizeTooLarge { size: 2000, max: 1024 }),
            "File size too large (max 1024 bytes)."
        );
        assert_eq!(
            describe(&FsError::TableFull { capacity: 32 }),
            "No free file entries available."
        );
    }
}
