use crate::hierarchy::{self, FolderIndex};
use crate::registry::ExtensionRegistry;
use crate::storage::models::{FileRecord, Folder, FolderRecord, MediaFile, MediaRef};
use std::collections::BTreeSet;
use std::path::Path;

/// The canonical in-memory catalog: folders, files and the derived indices.
///
/// Every mutating method finishes with a full hierarchy rebuild, so the
/// indices and derived folder fields always match the two lists.
#[derive(Debug, Default)]
pub struct Catalog {
    folders: Vec<Folder>,
    files: Vec<MediaFile>,
    index: FolderIndex,
}

/// One row of the depth-first tree outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineRow {
    pub depth: usize,
    pub item: MediaRef,
    pub name: String,
    pub media_type: Option<String>,
    pub size_kb: Option<i64>,
    pub path: String,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends flat rows, resolving each file's media type. Identifiers are
    /// taken as given and never reassigned.
    pub fn add_records(
        &mut self,
        folders: Vec<FolderRecord>,
        files: Vec<FileRecord>,
        registry: &ExtensionRegistry,
    ) {
        self.folders.extend(folders.into_iter().map(Folder::from));
        self.files.extend(files.into_iter().map(|record| {
            let media_type = registry.media_type_for(&record.file_extension).to_string();
            MediaFile::from_record(record, media_type)
        }));
        self.rebuild();
    }

    /// Drops every folder in `folder_ids` and every file that lives in one.
    pub fn remove_folders(&mut self, folder_ids: &BTreeSet<i64>) {
        self.folders.retain(|f| !folder_ids.contains(&f.folder_id));
        self.files.retain(|f| !folder_ids.contains(&f.folder_id));
        self.rebuild();
    }

    pub fn clear(&mut self) {
        self.folders.clear();
        self.files.clear();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.index = hierarchy::rebuild(&mut self.folders, &self.files);
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn max_folder_id(&self) -> i64 {
        self.folders.iter().map(|f| f.folder_id).max().unwrap_or(0)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn get_folder_by_id(&self, folder_id: i64) -> Option<&Folder> {
        self.index.by_id.get(&folder_id).map(|&pos| &self.folders[pos])
    }

    pub fn get_folder_by_path(&self, folder_path: &str) -> Option<&Folder> {
        self.index.by_path.get(folder_path).map(|&pos| &self.folders[pos])
    }

    /// Folders with no parent id, or whose parent is not in the catalog.
    pub fn get_root_folders(&self) -> Vec<&Folder> {
        self.folders.iter().filter(|f| f.parent.is_none()).collect()
    }

    pub fn get_all_files(&self) -> &[MediaFile] {
        &self.files
    }

    /// Resolves the index carried by [`MediaRef::File`].
    pub fn get_file(&self, index: usize) -> Option<&MediaFile> {
        self.files.get(index)
    }

    pub fn get_file_by_name(&self, folder_id: i64, file_name: &str) -> Option<&MediaFile> {
        self.get_folder_by_id(folder_id)?
            .files
            .iter()
            .map(|&pos| &self.files[pos])
            .find(|f| f.file_name == file_name)
    }

    pub fn get_files_by_extension(&self, extension: &str) -> Vec<&MediaFile> {
        self.files
            .iter()
            .filter(|f| f.file_extension.eq_ignore_ascii_case(extension))
            .collect()
    }

    pub fn get_files_by_type(&self, media_type: &str) -> Vec<&MediaFile> {
        self.files
            .iter()
            .filter(|f| f.media_type.to_lowercase() == media_type.to_lowercase())
            .collect()
    }

    // ── Navigation ───────────────────────────────────────────────

    pub fn parent(&self, folder: &Folder) -> Option<&Folder> {
        folder.parent.map(|pos| &self.folders[pos])
    }

    pub fn subfolders<'a>(&'a self, folder: &'a Folder) -> impl Iterator<Item = &'a Folder> + 'a {
        folder.subfolders.iter().map(move |&pos| &self.folders[pos])
    }

    pub fn files_in<'a>(&'a self, folder: &'a Folder) -> impl Iterator<Item = &'a MediaFile> + 'a {
        folder.files.iter().map(move |&pos| &self.files[pos])
    }

    /// The folder's own files, then each subfolder's files recursively.
    pub fn files_recursive<'a>(&'a self, folder: &'a Folder) -> Vec<&'a MediaFile> {
        let mut out: Vec<&MediaFile> = self.files_in(folder).collect();
        for sub in self.subfolders(folder) {
            out.extend(self.files_recursive(sub));
        }
        out
    }

    /// A root folder that contains `path` or lies under it. Scanning such a
    /// path again would give already-catalogued directories a second id.
    pub fn overlapping_root(&self, path: &Path) -> Option<&Folder> {
        self.get_root_folders().into_iter().find(|root| {
            let root_path = Path::new(&root.folder_path);
            path.starts_with(root_path) || root_path.starts_with(path)
        })
    }

    /// `folder_id` plus every folder reachable through `subfolders`.
    /// Empty when `folder_id` is not in the catalog.
    pub fn descendant_ids(&self, folder_id: i64) -> BTreeSet<i64> {
        let mut ids = BTreeSet::new();
        let Some(&start) = self.index.by_id.get(&folder_id) else {
            return ids;
        };
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            let folder = &self.folders[pos];
            if ids.insert(folder.folder_id) {
                stack.extend(folder.subfolders.iter().copied());
            }
        }
        ids
    }

    /// Depth-first listing for tree views: each root, then its subfolders
    /// recursively, then its files.
    pub fn outline(&self) -> Vec<OutlineRow> {
        let mut rows = Vec::with_capacity(self.folders.len() + self.files.len());
        for root in self.get_root_folders() {
            self.outline_folder(root, 0, &mut rows);
        }
        rows
    }

    fn outline_folder(&self, folder: &Folder, depth: usize, rows: &mut Vec<OutlineRow>) {
        rows.push(OutlineRow {
            depth,
            item: MediaRef::Folder(folder.folder_id),
            name: folder.name().to_string(),
            media_type: None,
            size_kb: None,
            path: folder.folder_path.clone(),
        });
        for sub in self.subfolders(folder) {
            self.outline_folder(sub, depth + 1, rows);
        }
        for &pos in &folder.files {
            let file = &self.files[pos];
            rows.push(OutlineRow {
                depth: depth + 1,
                item: MediaRef::File(pos),
                name: file.file_name.clone(),
                media_type: Some(file.media_type.clone()),
                size_kb: Some(file.file_size_kb),
                path: file.folder_path.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(id: i64, path: &str, parent: Option<i64>) -> FolderRecord {
        FolderRecord {
            folder_id: id,
            folder_path: path.to_string(),
            parent_folder_id: parent,
        }
    }

    fn file(folder_id: i64, name: &str, ext: &str, folder_path: &str) -> FileRecord {
        FileRecord {
            folder_id,
            file_name: name.to_string(),
            file_extension: ext.to_string(),
            file_size_kb: 10,
            folder_path: folder_path.to_string(),
        }
    }

    fn sample() -> Catalog {
        let registry = ExtensionRegistry::from_mappings([(".jpg", "Image"), (".mp4", "video")]);
        let mut catalog = Catalog::new();
        catalog.add_records(
            vec![
                folder(1, "/media", None),
                folder(2, "/media/pics", Some(1)),
                folder(3, "/media/pics/old", Some(2)),
                folder(4, "/media/clips", Some(1)),
                folder(7, "/detached", Some(6)),
            ],
            vec![
                file(1, "cover.JPG", ".jpg", "/media"),
                file(2, "a.jpg", ".jpg", "/media/pics"),
                file(3, "b.jpg", ".jpg", "/media/pics/old"),
                file(4, "c.mp4", ".mp4", "/media/clips"),
                file(4, "d.txt", ".txt", "/media/clips"),
                file(9, "orphan.jpg", ".jpg", "/gone"),
            ],
            &registry,
        );
        catalog
    }

    #[test]
    fn test_media_types_resolved_on_add() {
        let catalog = sample();
        let c = catalog.get_file_by_name(4, "c.mp4").unwrap();
        assert_eq!(c.media_type, "video");
        let d = catalog.get_file_by_name(4, "d.txt").unwrap();
        assert_eq!(d.media_type, "unknown");
    }

    #[test]
    fn test_root_folders_include_detached() {
        let catalog = sample();
        let roots: Vec<i64> = catalog.get_root_folders().iter().map(|f| f.folder_id).collect();
        assert_eq!(roots, vec![1, 7]);
    }

    #[test]
    fn test_lookup_by_id_and_path() {
        let catalog = sample();
        assert_eq!(catalog.get_folder_by_path("/media/pics/old").unwrap().folder_id, 3);
        assert_eq!(catalog.get_folder_by_id(4).unwrap().folder_path, "/media/clips");
        assert!(catalog.get_folder_by_id(5).is_none());
        assert_eq!(catalog.max_folder_id(), 7);
    }

    #[test]
    fn test_files_by_extension_and_type_ignore_case() {
        let catalog = sample();
        assert_eq!(catalog.get_files_by_extension(".JPG").len(), 4);
        assert_eq!(catalog.get_files_by_type("image").len(), 4);
        assert_eq!(catalog.get_files_by_type("VIDEO").len(), 1);
        assert!(catalog.get_files_by_type("ima").is_empty());
    }

    #[test]
    fn test_files_recursive_order() {
        let catalog = sample();
        let media = catalog.get_folder_by_id(1).unwrap();
        let names: Vec<&str> = catalog
            .files_recursive(media)
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["cover.JPG", "a.jpg", "b.jpg", "c.mp4", "d.txt"]);
    }

    #[test]
    fn test_descendant_ids_closure() {
        let catalog = sample();
        assert_eq!(catalog.descendant_ids(2), BTreeSet::from([2, 3]));
        assert_eq!(catalog.descendant_ids(1), BTreeSet::from([1, 2, 3, 4]));
        assert!(catalog.descendant_ids(42).is_empty());
    }

    #[test]
    fn test_overlapping_root() {
        let catalog = sample();
        assert_eq!(catalog.overlapping_root(Path::new("/media/pics")).unwrap().folder_id, 1);
        assert_eq!(catalog.overlapping_root(Path::new("/")).unwrap().folder_id, 1);
        assert!(catalog.overlapping_root(Path::new("/media2")).is_none());
        assert!(catalog.overlapping_root(Path::new("/srv/media")).is_none());
    }

    #[test]
    fn test_remove_folders_drops_their_files() {
        let mut catalog = sample();
        let ids = catalog.descendant_ids(2);
        catalog.remove_folders(&ids);
        assert!(catalog.get_folder_by_id(2).is_none());
        assert!(catalog.get_folder_by_path("/media/pics/old").is_none());
        assert!(catalog.get_all_files().iter().all(|f| !ids.contains(&f.folder_id)));
        let media = catalog.get_folder_by_id(1).unwrap();
        let subs: Vec<i64> = catalog.subfolders(media).map(|f| f.folder_id).collect();
        assert_eq!(subs, vec![4]);
    }

    #[test]
    fn test_outline_lists_subfolders_before_files() {
        let catalog = sample();
        let rows = catalog.outline();
        let names: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (0, "media"),
                (1, "pics"),
                (2, "old"),
                (3, "b.jpg"),
                (2, "a.jpg"),
                (1, "clips"),
                (2, "c.mp4"),
                (2, "d.txt"),
                (1, "cover.JPG"),
                (0, "detached"),
            ]
        );
        assert_eq!(rows[0].item, MediaRef::Folder(1));
        assert!(matches!(rows[3].item, MediaRef::File(_)));
        assert_eq!(rows[6].media_type.as_deref(), Some("video"));
    }

    #[test]
    fn test_parent_cycle_still_has_a_root() {
        let registry = ExtensionRegistry::from_mappings([(".jpg", "image")]);
        let mut catalog = Catalog::new();
        catalog.add_records(
            vec![folder(1, "/a", Some(2)), folder(2, "/b", Some(1))],
            vec![file(1, "x.jpg", ".jpg", "/a"), file(2, "y.jpg", ".jpg", "/b")],
            &registry,
        );

        let roots: Vec<i64> = catalog.get_root_folders().iter().map(|f| f.folder_id).collect();
        assert_eq!(roots, vec![2]);
        let b = catalog.get_folder_by_id(2).unwrap();
        let names: Vec<&str> = catalog
            .files_recursive(b)
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["y.jpg", "x.jpg"]);
        assert_eq!(catalog.outline().len(), 4);
    }
}
