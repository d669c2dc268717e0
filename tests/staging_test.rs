//! End-to-end scenarios across `Repository`, `Index`, `ObjectStore`, and
//! the object types, exercising the library surface the way a caller
//! would rather than any single module in isolation.

use gitlet::{ErrorKind, Index, ObjectStore, Repository};
use std::fs;
use tempfile::tempdir;

fn init(root: &std::path::Path) -> (Repository, ObjectStore) {
    let repo = Repository::new(root);
    repo.init().unwrap();
    let store = ObjectStore::new(repo.objects_dir());
    (repo, store)
}

#[test]
fn init_creates_a_discoverable_repository_with_an_empty_index() {
    let dir = tempdir().unwrap();
    let (repo, _store) = init(dir.path());

    assert!(repo.is_initialized());
    let found = Repository::discover(dir.path()).unwrap();
    assert_eq!(found.root(), repo.root());

    let index = Index::load_or_create(repo.index_file());
    assert!(index.tracked().is_empty());
    assert!(index.added().is_empty());
}

#[test]
fn adding_a_file_persists_its_blob_at_the_expected_path() {
    let dir = tempdir().unwrap();
    let (repo, store) = init(dir.path());

    let file_path = dir.path().join("greeting.txt");
    fs::write(&file_path, b"Hello World!").unwrap();

    let mut index = Index::load_or_create(repo.index_file());
    index.add(&file_path, &store).unwrap();
    index.save(repo.index_file()).unwrap();

    let uid = index.added().values().next().unwrap();
    assert_eq!(uid, "c57eff55ebc0c54973903af5f72bac72762cf4f4");
    assert!(store.path_for(uid).is_file());
}

#[test]
fn adding_a_file_matching_head_unstages_it() {
    let dir = tempdir().unwrap();
    let (repo, store) = init(dir.path());
    let file_path = dir.path().join("a.txt");
    fs::write(&file_path, b"A").unwrap();

    let mut index = Index::load_or_create(repo.index_file());
    index.add(&file_path, &store).unwrap();

    // Simulate a commit having absorbed the staged file into `tracked`.
    let mut tracked = std::collections::HashMap::new();
    tracked.extend(index.added().clone());
    index.apply_head_snapshot(tracked);

    // Re-adding the unchanged file is a no-op on the stage area.
    index.add(&file_path, &store).unwrap();
    assert!(index.added().is_empty());
}

#[test]
fn adding_a_file_cancels_a_pending_removal() {
    let dir = tempdir().unwrap();
    let (repo, store) = init(dir.path());
    let file_path = dir.path().join("a.txt");
    fs::write(&file_path, b"A").unwrap();

    let mut index = Index::load_or_create(repo.index_file());
    index.add(&file_path, &store).unwrap();
    let mut tracked = std::collections::HashMap::new();
    tracked.extend(index.added().clone());
    index.apply_head_snapshot(tracked);

    index.remove(&file_path, repo.root(), true, false).unwrap();
    assert!(!index.removed().is_empty());

    index.add(&file_path, &store).unwrap();
    assert!(index.removed().is_empty());
}

#[test]
fn removing_a_modified_tracked_file_without_force_fails() {
    let dir = tempdir().unwrap();
    let (repo, store) = init(dir.path());
    let file_path = dir.path().join("a.txt");
    fs::write(&file_path, b"original").unwrap();

    let mut index = Index::load_or_create(repo.index_file());
    index.add(&file_path, &store).unwrap();
    let mut tracked = std::collections::HashMap::new();
    tracked.extend(index.added().clone());
    index.apply_head_snapshot(tracked);

    fs::write(&file_path, b"modified").unwrap();
    let err = index.remove(&file_path, repo.root(), true, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HasLocalModifications);
}

#[test]
fn tree_shape_groups_nested_files_under_their_directory() {
    let dir = tempdir().unwrap();
    let (repo, store) = init(dir.path());

    for (rel, content) in [
        ("README.md", "readme".as_bytes()),
        ("src/A.java", "class A {}".as_bytes()),
        ("src/util/B.java", "class B {}".as_bytes()),
    ] {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
    }

    let mut index = Index::load_or_create(repo.index_file());
    for rel in ["README.md", "src/A.java", "src/util/B.java"] {
        index.add(dir.path().join(rel), &store).unwrap();
    }

    let root = gitlet::objects::tree::build(&index, repo.root(), &store).unwrap();
    let names: Vec<_> = root.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["README.md", "src"]);
}

#[test]
fn index_round_trips_across_a_simulated_process_boundary() {
    let dir = tempdir().unwrap();
    let (repo, store) = init(dir.path());
    let file_path = dir.path().join("a.txt");
    fs::write(&file_path, b"A").unwrap();

    let mut index = Index::load_or_create(repo.index_file());
    index.add(&file_path, &store).unwrap();
    index.save(repo.index_file()).unwrap();

    // A fresh `Index` value, as a new process would construct, must see
    // exactly what the previous process staged.
    let reloaded = Index::load_or_create(repo.index_file());
    assert_eq!(reloaded.added(), index.added());
}

#[test]
fn a_corrupted_index_file_recovers_as_empty_rather_than_failing() {
    let dir = tempdir().unwrap();
    let (repo, _store) = init(dir.path());
    fs::write(repo.index_file(), b"this is not a gitlet index").unwrap();

    let index = Index::load_or_create(repo.index_file());
    assert!(index.tracked().is_empty());
    assert!(index.added().is_empty());
    assert!(index.removed().is_empty());
}
