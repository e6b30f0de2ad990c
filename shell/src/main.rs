use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use arenafs::{
    Limits, MemFs, DEFAULT_ARENA_CAPACITY, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_MAX_PATH_LEN,
};
use arenafs_shell::Shell;

/// fsh is a command shell over a fresh in-memory file store. Everything is
/// lost when it exits.
#[derive(Parser, Debug)]
struct Cli {
    /// Run commands from this file instead of reading standard input.
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Slots in the entry table, root directory included.
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES)]
    max_entries: usize,

    /// Largest payload a single write may carry, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_file_size: usize,

    /// Total bytes available for file contents over the session.
    #[arg(long, default_value_t = DEFAULT_ARENA_CAPACITY)]
    arena_capacity: usize,

    /// Longest current path the prompt and `pwd` will render.
    #[arg(long, default_value_t = DEFAULT_MAX_PATH_LEN)]
    max_path_len: usize,
}

fn main() {
    match main_result() {
        Ok(_) => {}
        Err(err) => eprintln!("{:?}", err),
    }
}

fn main_result() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let limits = Limits::builder()
        .with_max_entries(cli.max_entries)
        .with_max_file_size(cli.max_file_size)
        .with_arena_capacity(cli.arena_capacity)
        .with_max_path_len(cli.max_path_len)
        .build()
        .context("invalid filesystem limits")?;
    log::info!("starting shell with {:?}", limits);

    let stdout = io::stdout();
    let mut shell = Shell::new(MemFs::new(limits), stdout.lock());
    match cli.script {
        Some(path) => {
            let script = File::open(&path)
                .with_context(|| format!("cannot open script {}", path.display()))?;
            shell.run(BufReader::new(script), false)?;
        }
        None => {
            let stdin = io::stdin();
            shell.run(stdin.lock(), true)?;
        }
    }
    Ok(())
}
