use std::path::{Path, PathBuf};

/// Flat folder row as scanned or stored: `(folder_id, folder_path, parent_folder_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRecord {
    pub folder_id: i64,
    pub folder_path: String,
    pub parent_folder_id: Option<i64>,
}

/// Flat file row: `(folder_id, file_name, extension, size_kb, folder_path)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub folder_id: i64,
    pub file_name: String,
    pub file_extension: String,
    pub file_size_kb: i64,
    pub folder_path: String,
}

/// A catalogued folder. `parent`, `subfolders` and `files` are indices into the
/// owning catalog's vectors and are only written by the hierarchy builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub folder_id: i64,
    pub folder_path: String,
    pub parent_folder_id: Option<i64>,
    pub(crate) parent: Option<usize>,
    pub(crate) subfolders: Vec<usize>,
    pub(crate) files: Vec<usize>,
}

impl Folder {
    pub fn new(folder_id: i64, folder_path: impl Into<String>, parent_folder_id: Option<i64>) -> Self {
        Self {
            folder_id,
            folder_path: folder_path.into(),
            parent_folder_id,
            parent: None,
            subfolders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Last path component, or the whole path for a filesystem root.
    pub fn name(&self) -> &str {
        Path::new(&self.folder_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.folder_path)
    }
}

impl From<FolderRecord> for Folder {
    fn from(record: FolderRecord) -> Self {
        Folder::new(record.folder_id, record.folder_path, record.parent_folder_id)
    }
}

/// A catalogued media file, identified by `(folder_id, file_name)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub folder_id: i64,
    pub file_name: String,
    pub file_extension: String,
    pub file_size_kb: i64,
    pub folder_path: String,
    pub media_type: String,
}

impl MediaFile {
    pub fn from_record(record: FileRecord, media_type: impl Into<String>) -> Self {
        Self {
            folder_id: record.folder_id,
            file_name: record.file_name,
            file_extension: record.file_extension,
            file_size_kb: record.file_size_kb,
            folder_path: record.folder_path,
            media_type: media_type.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        Path::new(&self.folder_path).join(&self.file_name)
    }
}

/// Either side of the catalog tree: a folder by id, or a file by its index in
/// the catalog's file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaRef {
    Folder(i64),
    File(usize),
}

/// A named, user-curated set of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub collection_id: i64,
    pub collection_name: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_name_is_last_component() {
        let folder = Folder::new(1, "/media/pics", None);
        assert_eq!(folder.name(), "pics");
        let root = Folder::new(2, "/", None);
        assert_eq!(root.name(), "/");
    }

    #[test]
    fn test_media_file_path_joins_folder_and_name() {
        let record = FileRecord {
            folder_id: 2,
            file_name: "x.jpg".into(),
            file_extension: ".jpg".into(),
            file_size_kb: 3,
            folder_path: "/media/pics".into(),
        };
        let file = MediaFile::from_record(record, "image");
        assert_eq!(file.path(), PathBuf::from("/media/pics/x.jpg"));
        assert_eq!(file.media_type, "image");
    }
}
