use media_catalog_core::storage::models::*;
use media_catalog_core::storage::{CatalogStore, SqliteStore, ROOT_FOLDER_PARAMETER};
use std::collections::BTreeSet;

fn folder(folder_id: i64, path: &str, parent: Option<i64>) -> FolderRecord {
    FolderRecord {
        folder_id,
        folder_path: path.to_string(),
        parent_folder_id: parent,
    }
}

fn file(folder_id: i64, folder_path: &str, name: &str, size_kb: i64) -> FileRecord {
    FileRecord {
        folder_id,
        file_name: name.to_string(),
        file_extension: format!(
            ".{}",
            name.rsplit('.').next().unwrap_or_default().to_lowercase()
        ),
        file_size_kb: size_kb,
        folder_path: folder_path.to_string(),
    }
}

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.seed_media_types(std::iter::empty()).unwrap();
    let folders = vec![
        folder(1, "/media", None),
        folder(2, "/media/pics", Some(1)),
        folder(3, "/media/pics/2023", Some(2)),
        folder(4, "/media/video", Some(1)),
    ];
    let files = vec![
        file(2, "/media/pics", "x.jpg", 2),
        file(3, "/media/pics/2023", "y.png", 4),
        file(4, "/media/video", "clip.mp4", 1024),
    ];
    store.upsert(&folders, &files).unwrap();
    store
}

#[test]
fn test_upsert_and_read_back_ordered() {
    let store = seeded_store();

    let folders = store.get_folders().unwrap();
    let paths: Vec<&str> = folders.iter().map(|f| f.folder_path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/media", "/media/pics", "/media/pics/2023", "/media/video"]
    );
    assert_eq!(folders[2].parent_folder_id, Some(2));

    let files = store.get_files().unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["x.jpg", "y.png", "clip.mp4"]);
}

#[test]
fn test_upsert_is_idempotent_and_updates_in_place() {
    let store = seeded_store();
    store
        .upsert(
            &[folder(2, "/media/pics", Some(1))],
            &[file(2, "/media/pics", "x.jpg", 9)],
        )
        .unwrap();

    assert_eq!(store.get_folders().unwrap().len(), 4);
    let files = store.get_files().unwrap();
    assert_eq!(files.len(), 3);
    let x = files.iter().find(|f| f.file_name == "x.jpg").unwrap();
    assert_eq!(x.file_size_kb, 9);
}

#[test]
fn test_delete_by_folder_ids_removes_files_then_folders() {
    let store = seeded_store();
    store
        .delete_by_folder_ids(&BTreeSet::from([2, 3]))
        .unwrap();

    let folder_ids: Vec<i64> = store.get_folders().unwrap().iter().map(|f| f.folder_id).collect();
    assert_eq!(folder_ids, vec![1, 4]);
    let files = store.get_files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "clip.mp4");
}

#[test]
fn test_delete_with_empty_ids_is_noop() {
    let store = seeded_store();
    store.delete_by_folder_ids(&BTreeSet::new()).unwrap();
    assert_eq!(store.get_folders().unwrap().len(), 4);
}

#[test]
fn test_rollback_without_open_transaction_is_ok() {
    let store = seeded_store();
    store.rollback().unwrap();
    assert_eq!(store.get_files().unwrap().len(), 3);
}

#[test]
fn test_type_mappings_from_seeded_defaults() {
    let store = seeded_store();
    let registry = store.load_type_mappings().unwrap();
    assert!(registry.is_valid(".jpg"));
    assert_eq!(registry.media_type_for(".mp4"), "video");
    assert!(!registry.is_valid(".txt"));
}

#[test]
fn test_parameters_round_trip() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.get_parameter(ROOT_FOLDER_PARAMETER).unwrap(), None);

    store.set_parameter(ROOT_FOLDER_PARAMETER, "/media").unwrap();
    store.set_parameter(ROOT_FOLDER_PARAMETER, "/library").unwrap();
    assert_eq!(
        store.get_parameter(ROOT_FOLDER_PARAMETER).unwrap().as_deref(),
        Some("/library")
    );

    store.set_parameter(ROOT_FOLDER_PARAMETER, "").unwrap();
    assert_eq!(store.get_parameter(ROOT_FOLDER_PARAMETER).unwrap(), None);
}

#[test]
fn test_clear_catalog_keeps_types_and_parameters() {
    let store = seeded_store();
    store.set_parameter(ROOT_FOLDER_PARAMETER, "/media").unwrap();
    store.clear_catalog().unwrap();

    assert!(store.get_folders().unwrap().is_empty());
    assert!(store.get_files().unwrap().is_empty());
    assert!(!store.load_type_mappings().unwrap().is_empty());
    assert!(store.get_parameter(ROOT_FOLDER_PARAMETER).unwrap().is_some());
}

#[test]
fn test_collections_lifecycle() {
    let store = seeded_store();
    let holiday = store.create_collection("holiday").unwrap();
    let other = store.create_collection("other").unwrap();
    assert!(holiday.collection_id > 0);
    assert_ne!(holiday.collection_id, other.collection_id);
    assert!(store.create_collection("holiday").is_err());

    store.add_to_collection(holiday.collection_id, 3, "y.png").unwrap();
    store.add_to_collection(holiday.collection_id, 2, "x.jpg").unwrap();
    store.add_to_collection(holiday.collection_id, 2, "x.jpg").unwrap();
    assert_eq!(
        store.get_collection_members(holiday.collection_id).unwrap(),
        vec![(3, "y.png".to_string()), (2, "x.jpg".to_string())]
    );

    let names: Vec<String> = store
        .get_collections()
        .unwrap()
        .into_iter()
        .map(|c| c.collection_name)
        .collect();
    assert_eq!(names, vec!["holiday", "other"]);

    assert!(store.delete_collection(holiday.collection_id).unwrap());
    assert!(!store.delete_collection(holiday.collection_id).unwrap());
    assert!(store
        .get_collection_members(holiday.collection_id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_deleting_folder_drops_collection_membership() {
    let store = seeded_store();
    let c = store.create_collection("pics").unwrap();
    store.add_to_collection(c.collection_id, 2, "x.jpg").unwrap();
    store.add_to_collection(c.collection_id, 4, "clip.mp4").unwrap();

    store.delete_by_folder_ids(&BTreeSet::from([2])).unwrap();
    assert_eq!(
        store.get_collection_members(c.collection_id).unwrap(),
        vec![(4, "clip.mp4".to_string())]
    );
}

#[test]
fn test_store_reopens_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    {
        let store = SqliteStore::open(&db_path).unwrap();
        store
            .upsert(&[folder(1, "/media", None)], &[file(1, "/media", "a.gif", 1)])
            .unwrap();
    }
    let store = SqliteStore::open(&db_path).unwrap();
    assert_eq!(store.get_folders().unwrap().len(), 1);
    assert_eq!(store.get_files().unwrap()[0].file_name, "a.gif");
}

#[test]
fn test_last_folder_id_only_rises() {
    let store = seeded_store();
    assert_eq!(store.last_folder_id().unwrap(), 4);

    store
        .upsert(&[folder(2, "/media/pics", Some(1))], &[])
        .unwrap();
    store.delete_by_folder_ids(&BTreeSet::from([4])).unwrap();
    assert_eq!(store.last_folder_id().unwrap(), 4);

    store.upsert(&[folder(9, "/media/new", Some(1))], &[]).unwrap();
    assert_eq!(store.last_folder_id().unwrap(), 9);

    store.clear_catalog().unwrap();
    assert_eq!(store.last_folder_id().unwrap(), 9);
}

