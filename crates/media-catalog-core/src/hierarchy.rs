use crate::storage::models::{Folder, MediaFile};
use ahash::AHashMap;
use tracing::warn;

/// Lookup indices produced by [`rebuild`]; values are positions in the folder slice.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderIndex {
    pub by_id: AHashMap<i64, usize>,
    pub by_path: AHashMap<String, usize>,
}

/// Recomputes every folder's `parent`, `subfolders` and `files` from the flat
/// `parent_folder_id` / `folder_id` columns.
///
/// Not incremental: callers re-run it over the full collections after any
/// insert or delete. A folder whose parent is missing stays a root; a file
/// whose folder is missing belongs to no folder. A parent link that would
/// close a cycle is dropped, making that folder a root. All three are logged,
/// never returned as errors. Child order follows input order.
pub fn rebuild(folders: &mut [Folder], files: &[MediaFile]) -> FolderIndex {
    for folder in folders.iter_mut() {
        folder.parent = None;
        folder.subfolders.clear();
        folder.files.clear();
    }

    let mut index = FolderIndex::default();
    for (pos, folder) in folders.iter().enumerate() {
        index.by_id.insert(folder.folder_id, pos);
        index.by_path.insert(folder.folder_path.clone(), pos);
    }

    let mut stale_parents = 0usize;
    let mut cyclic_parents = 0usize;
    for pos in 0..folders.len() {
        let Some(parent_id) = folders[pos].parent_folder_id else {
            continue;
        };
        match index.by_id.get(&parent_id) {
            Some(&parent_pos) if reaches(folders, parent_pos, pos) => cyclic_parents += 1,
            Some(&parent_pos) => {
                folders[pos].parent = Some(parent_pos);
                folders[parent_pos].subfolders.push(pos);
            }
            None => stale_parents += 1,
        }
    }

    let mut orphan_files = 0usize;
    for (file_pos, file) in files.iter().enumerate() {
        match index.by_id.get(&file.folder_id) {
            Some(&folder_pos) => folders[folder_pos].files.push(file_pos),
            None => orphan_files += 1,
        }
    }

    if stale_parents > 0 {
        warn!("{} folders reference a missing parent and are treated as roots", stale_parents);
    }
    if cyclic_parents > 0 {
        warn!("{} folders close a parent cycle and are treated as roots", cyclic_parents);
    }
    if orphan_files > 0 {
        warn!("{} files reference a missing folder and were left out of the tree", orphan_files);
    }

    index
}

/// Whether `target` is `from` or one of its linked ancestors. Links made so far
/// form a forest, so the walk always ends.
fn reaches(folders: &[Folder], from: usize, target: usize) -> bool {
    let mut current = Some(from);
    while let Some(pos) = current {
        if pos == target {
            return true;
        }
        current = folders[pos].parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::FileRecord;

    fn file(folder_id: i64, name: &str) -> MediaFile {
        MediaFile::from_record(
            FileRecord {
                folder_id,
                file_name: name.to_string(),
                file_extension: ".jpg".to_string(),
                file_size_kb: 1,
                folder_path: String::new(),
            },
            "image",
        )
    }

    fn sample() -> (Vec<Folder>, Vec<MediaFile>) {
        let folders = vec![
            Folder::new(1, "/media", None),
            Folder::new(2, "/media/pics", Some(1)),
            Folder::new(3, "/media/pics/2023", Some(2)),
            Folder::new(4, "/media/video", Some(1)),
        ];
        let files = vec![file(2, "a.jpg"), file(3, "b.jpg"), file(2, "c.jpg")];
        (folders, files)
    }

    #[test]
    fn test_links_parents_children_and_files() {
        let (mut folders, files) = sample();
        let index = rebuild(&mut folders, &files);

        assert_eq!(index.by_id[&3], 2);
        assert_eq!(index.by_path["/media/video"], 3);
        assert_eq!(folders[0].parent, None);
        assert_eq!(folders[0].subfolders, vec![1, 3]);
        assert_eq!(folders[1].parent, Some(0));
        assert_eq!(folders[1].subfolders, vec![2]);
        assert_eq!(folders[1].files, vec![0, 2]);
        assert_eq!(folders[2].files, vec![1]);
        assert!(folders[3].files.is_empty());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let (mut folders, files) = sample();
        let first_index = rebuild(&mut folders, &files);
        let first = folders.clone();
        let second_index = rebuild(&mut folders, &files);
        assert_eq!(first, folders);
        assert_eq!(first_index, second_index);
    }

    #[test]
    fn test_orphan_file_belongs_to_no_folder() {
        let (mut folders, mut files) = sample();
        files.push(file(99, "lost.jpg"));
        rebuild(&mut folders, &files);
        let lost = files.len() - 1;
        assert!(folders.iter().all(|f| !f.files.contains(&lost)));
    }

    #[test]
    fn test_stale_parent_becomes_root() {
        let (mut folders, files) = sample();
        folders.push(Folder::new(5, "/elsewhere", Some(42)));
        rebuild(&mut folders, &files);
        assert_eq!(folders[4].parent, None);
        assert!(folders.iter().all(|f| !f.subfolders.contains(&4)));
    }

    #[test]
    fn test_rebuild_after_removal_drops_stale_links() {
        let (mut folders, files) = sample();
        rebuild(&mut folders, &files);
        folders.retain(|f| f.folder_id != 2 && f.folder_id != 3);
        let index = rebuild(&mut folders, &files);
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].subfolders, vec![1]);
        assert!(index.by_id.get(&2).is_none());
        assert!(folders.iter().all(|f| f.files.is_empty()));
    }

    #[test]
    fn test_parent_cycle_is_broken() {
        let mut folders = vec![
            Folder::new(1, "/a", Some(2)),
            Folder::new(2, "/b", Some(1)),
            Folder::new(3, "/self", Some(3)),
        ];
        let files = vec![file(1, "x.jpg"), file(2, "y.jpg")];
        rebuild(&mut folders, &files);

        assert_eq!(folders[0].parent, Some(1));
        assert_eq!(folders[1].parent, None);
        assert_eq!(folders[1].subfolders, vec![0]);
        assert_eq!(folders[2].parent, None);
        assert!(folders[2].subfolders.is_empty());
    }
}
