// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use catnip_core::CachedWorktreeStatus;

fn worktree_at(path: &str) -> Worktree {
    Worktree::builder()
        .id(WorktreeId::new())
        .name(path.trim_start_matches('/'))
        .path(PathBuf::from(path))
        .build()
}

#[test]
fn insert_rejects_duplicate_path() {
    let store = WorktreeStore::new();
    let a = worktree_at("/workspace/w1");
    let b = worktree_at("/workspace/w1");
    store.insert_worktree(a).unwrap();

    let err = store.insert_worktree(b).unwrap_err();
    assert!(matches!(err, StoreError::PathInUse(_)));
    assert_eq!(store.list_worktrees().len(), 1);
}

#[test]
fn reinsert_same_worktree_is_upsert() {
    let store = WorktreeStore::new();
    let mut wt = worktree_at("/workspace/w1");
    store.insert_worktree(wt.clone()).unwrap();
    wt.is_dirty = true;
    store.insert_worktree(wt.clone()).unwrap();

    assert!(store.get_worktree(wt.id).unwrap().is_dirty);
}

#[test]
fn longest_path_match_prefers_deepest_ancestor() {
    let store = WorktreeStore::new();
    let shallow = worktree_at("/workspace/w1");
    let deep = worktree_at("/workspace/w1/vendor");
    let sibling = worktree_at("/workspace/w1-other");
    store.insert_worktree(shallow.clone()).unwrap();
    store.insert_worktree(deep.clone()).unwrap();
    store.insert_worktree(sibling.clone()).unwrap();

    let hit = store
        .worktree_containing(Path::new("/workspace/w1/vendor/sub/file.rs"))
        .unwrap();
    assert_eq!(hit.id, deep.id);

    let hit = store
        .worktree_containing(Path::new("/workspace/w1/src/main.rs"))
        .unwrap();
    assert_eq!(hit.id, shallow.id);

    // A sibling sharing the string prefix must not match.
    let hit = store
        .worktree_containing(Path::new("/workspace/w1-other/file"))
        .unwrap();
    assert_eq!(hit.id, sibling.id);
    assert!(store.worktree_containing(Path::new("/elsewhere")).is_none());
}

#[test]
fn mutate_returns_updated_clone() {
    let store = WorktreeStore::new();
    let wt = worktree_at("/workspace/w1");
    let id = wt.id;
    store.insert_worktree(wt).unwrap();

    let updated = store.mutate_worktree(id, |w| w.commit_count = 3).unwrap();
    assert_eq!(updated.commit_count, 3);
    assert_eq!(store.get_worktree(id).unwrap().commit_count, 3);
}

#[test]
fn delete_clears_status_slot() {
    let store = WorktreeStore::new();
    let wt = worktree_at("/workspace/w1");
    let id = wt.id;
    store.insert_worktree(wt).unwrap();
    store.update_status(id, CachedWorktreeStatus::default());
    assert_eq!(store.status(id).version, 1);

    store.delete_worktree(id).unwrap();
    assert_eq!(store.status(id).version, 0);
    assert!(matches!(
        store.delete_worktree(id),
        Err(StoreError::WorktreeNotFound(_))
    ));
}

#[test]
fn status_versions_are_monotonic_per_worktree() {
    let store = WorktreeStore::new();
    let wt = worktree_at("/workspace/w1");
    let id = wt.id;
    store.insert_worktree(wt).unwrap();

    for expected in 1..=4 {
        let status = store.update_status(id, CachedWorktreeStatus::default());
        assert_eq!(status.version, expected);
    }
}

#[test]
fn export_import_roundtrip() {
    let store = WorktreeStore::new();
    store.upsert_repository(Repository::builder().build());
    let wt = worktree_at("/workspace/w1");
    let id = wt.id;
    store.insert_worktree(wt).unwrap();
    store.update_status(id, CachedWorktreeStatus::default());

    let state = store.export();
    let restored = WorktreeStore::new();
    restored.import(state);

    assert_eq!(restored.list_repositories().len(), 1);
    assert_eq!(restored.list_worktrees().len(), 1);
    assert_eq!(restored.status(id).version, 1);
}

#[test]
fn create_delete_restores_prior_projection() {
    let store = WorktreeStore::new();
    store.upsert_repository(Repository::builder().build());
    let before = serde_json::to_value(normalized(&store.export())).unwrap();

    let wt = worktree_at("/workspace/w1");
    let id = wt.id;
    store.insert_worktree(wt).unwrap();
    store.delete_worktree(id).unwrap();

    let after = serde_json::to_value(normalized(&store.export())).unwrap();
    assert_eq!(before, after);
}

/// Projection with map iteration order pinned for comparison.
fn normalized(state: &StoreState) -> Vec<String> {
    let mut keys: Vec<String> = state
        .repositories
        .keys()
        .map(|k| format!("repo:{k}"))
        .chain(state.worktrees.keys().map(|k| format!("wt:{k}")))
        .collect();
    keys.sort();
    keys
}
