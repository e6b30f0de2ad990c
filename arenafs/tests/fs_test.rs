use arenafs::{EntryId, EntryKind, FsError, Limits, MemFs};

fn listed(fs: &MemFs) -> Vec<String> {
    fs.list_children().map(|e| e.name.to_string()).collect()
}

#[test]
fn write_then_read_returns_same_bytes() {
    let mut fs = MemFs::default();
    let payloads: [&[u8]; 4] = [b"x", b"hello\nworld\n", &[0, 255, 7, 0], &[b'z'; 1024]];

    for (i, payload) in payloads.iter().enumerate() {
        let name = format!("file{}", i);
        fs.create_file(&name).unwrap();
        assert_eq!(fs.write_file(&name, payload).unwrap(), payload.len());
        assert_eq!(fs.read_file(&name).unwrap(), *payload);
        assert_eq!(fs.get_file_size(&name), payload.len());
    }
}

#[test]
fn duplicate_names_rejected_regardless_of_kind() {
    let mut fs = MemFs::default();

    assert!(fs.create_file("a").is_ok());
    assert_eq!(fs.create_file("a"), Err(FsError::AlreadyExists("a".into())));
    assert_eq!(fs.create_directory("a"), Err(FsError::AlreadyExists("a".into())));

    assert!(fs.create_directory("b").is_ok());
    assert_eq!(fs.create_file("b"), Err(FsError::AlreadyExists("b".into())));
}

#[test]
fn delete_removes_exactly_one_entry_from_listing() {
    let mut fs = MemFs::default();
    for name in &["one", "two", "three", "four"] {
        fs.create_file(name).unwrap();
    }
    fs.create_directory("dir").unwrap();
    let before = fs.list_children().count();

    fs.delete_file("two").unwrap();

    assert_eq!(fs.list_children().count(), before - 1);
    assert_eq!(listed(&fs), vec!["one", "three", "four", "dir"]);
}

#[test]
fn remove_directory_requires_empty_directory() {
    let mut fs = MemFs::default();
    fs.create_directory("d").unwrap();
    fs.change_directory("d").unwrap();
    fs.create_directory("child").unwrap();
    fs.change_directory("/").unwrap();

    assert_eq!(fs.remove_directory("d"), Err(FsError::DirectoryNotEmpty("d".into())));

    fs.change_directory("d").unwrap();
    fs.remove_directory("child").unwrap();
    fs.change_directory("..").unwrap();

    assert_eq!(fs.remove_directory("d"), Ok(()));
    assert_eq!(fs.list_children().count(), 0);
}

#[test]
fn parent_of_root_stays_at_root() {
    let mut fs = MemFs::default();

    assert_eq!(fs.change_directory(".."), Ok(EntryId::ROOT));
    assert_eq!(fs.current_path(), "/");
}

#[test]
fn slash_returns_to_root_from_any_depth() {
    let mut fs = MemFs::default();
    for level in &["a", "b", "c"] {
        fs.create_directory(level).unwrap();
        fs.change_directory(level).unwrap();
    }
    assert_eq!(fs.current_path(), "/a/b/c");

    assert_eq!(fs.change_directory("/"), Ok(EntryId::ROOT));
    assert_eq!(fs.current_path(), "/");
    assert_eq!(listed(&fs), vec!["a"]);
}

#[test]
fn entries_are_scoped_to_their_directory() {
    let mut fs = MemFs::default();
    fs.create_directory("docs").unwrap();
    fs.change_directory("docs").unwrap();
    fs.create_file("x").unwrap();

    assert_eq!(fs.current_path(), "/docs");
    assert_eq!(listed(&fs), vec!["x"]);

    fs.change_directory("/").unwrap();
    assert_eq!(listed(&fs), vec!["docs"]);
    assert!(!fs.file_exists("x"));

    // The same name may be reused in a different directory.
    fs.create_file("x").unwrap();
    assert!(fs.file_exists("x"));
}

#[test]
fn full_table_recovers_after_deletion() {
    let limits = Limits::builder().with_max_entries(5).build().unwrap();
    let mut fs = MemFs::new(limits);
    for name in &["a", "b", "c"] {
        fs.create_file(name).unwrap();
    }
    fs.create_directory("d").unwrap();

    assert_eq!(fs.create_file("e"), Err(FsError::TableFull { capacity: 5 }));
    assert_eq!(fs.create_directory("e"), Err(FsError::TableFull { capacity: 5 }));

    fs.delete_file("b").unwrap();

    assert!(fs.create_file("e").is_ok());
    assert_eq!(listed(&fs), vec!["a", "c", "d", "e"]);
}

#[test]
fn exhausted_arena_keeps_previous_contents() {
    let limits = Limits::builder()
        .with_max_file_size(64)
        .with_arena_capacity(100)
        .build()
        .unwrap();
    let mut fs = MemFs::new(limits);
    fs.create_file("keep").unwrap();
    fs.write_file("keep", &[1; 60]).unwrap();

    let err = fs.write_file("keep", &[2; 50]).unwrap_err();

    assert_eq!(
        err,
        FsError::ArenaExhausted {
            requested: 50,
            remaining: 40,
        }
    );
    assert_eq!(fs.get_file_size("keep"), 60);
    assert_eq!(fs.read_file("keep").unwrap(), &[1u8; 60][..]);
    assert_eq!(fs.usage().arena_used, 60);
}

#[test]
fn deleted_bytes_are_never_reclaimed() {
    let limits = Limits::builder()
        .with_max_file_size(10)
        .with_arena_capacity(20)
        .build()
        .unwrap();
    let mut fs = MemFs::new(limits);
    fs.create_file("a").unwrap();
    fs.write_file("a", b"0123456789").unwrap();
    fs.delete_file("a").unwrap();

    fs.create_file("b").unwrap();
    fs.write_file("b", b"0123456789").unwrap();
    fs.create_file("c").unwrap();

    assert!(matches!(
        fs.write_file("c", b"x"),
        Err(FsError::ArenaExhausted { .. })
    ));
    assert_eq!(fs.usage().bytes_retired(), 10);
}

#[test]
fn listing_reports_kind_and_size() {
    let mut fs = MemFs::default();
    fs.create_file("notes").unwrap();
    fs.write_file("notes", b"buy milk").unwrap();
    fs.create_directory("archive").unwrap();

    let rows: Vec<(String, EntryKind, usize)> = fs
        .list_children()
        .map(|e| (e.name.to_string(), e.kind, e.size))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("notes".to_string(), EntryKind::File, 8),
            ("archive".to_string(), EntryKind::Directory, 0),
        ]
    );
}

#[test]
fn tree_links_stay_consistent_through_churn() {
    let mut fs = MemFs::default();
    fs.create_directory("d").unwrap();
    fs.change_directory("d").unwrap();
    for i in 0..6 {
        fs.create_file(&format!("f{}", i)).unwrap();
    }
    for i in &[0, 3, 5] {
        fs.delete_file(&format!("f{}", i)).unwrap();
    }
    fs.create_file("g").unwrap();

    let table = fs.entries();
    let dir = fs.current_directory();
    let children: Vec<EntryId> = table.children(dir).map(|(id, _)| id).collect();

    assert_eq!(listed(&fs), vec!["f1", "f2", "f4", "g"]);
    for id in &children {
        assert_eq!(table.lookup(*id).unwrap().parent(), Some(dir));
    }
    let tail = table.lookup(*children.last().unwrap()).unwrap();
    assert_eq!(tail.next_sibling(), None);
    // Root, the directory and its four children.
    assert_eq!(table.live().count(), 6);
}

#[test]
fn ids_from_a_larger_table_are_rejected() {
    let mut big = MemFs::default();
    let mut last = EntryId::ROOT;
    for i in 0..10 {
        last = big.create_directory(&format!("d{}", i)).unwrap();
    }
    let small = MemFs::new(Limits::builder().with_max_entries(4).build().unwrap());
    let table = small.entries();

    assert!(table.lookup(last).is_none());
    assert_eq!(table.children(last).count(), 0);
    assert!(table.find_child(last, "anything").is_none());
    assert!(table.lookup(EntryId::ROOT).unwrap().is_dir());
}
