use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "media-catalog")]
#[command(about = "Catalog the media files under a library folder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load the catalog, offering to scan the library root when it is empty
    Load,
    /// Scan a folder and add it to the catalog as a new root
    Scan { path: PathBuf },
    /// Print the folder tree with its media files
    Tree,
    /// List root folders
    Roots,
    /// List media files, optionally filtered by extension or media type
    Files {
        #[arg(long)]
        ext: Option<String>,
        #[arg(long = "type")]
        media_type: Option<String>,
    },
    /// Delete a folder and everything below it from the catalog
    DeleteFolder { folder_id: i64 },
    /// Replace the catalog with a fresh scan of a new library root
    ChangeRoot { path: PathBuf },
    /// Manage named collections of media files
    Collection {
        #[command(subcommand)]
        action: CollectionCommands,
    },
    /// Print configuration values
    PrintConfig,
    /// Remove every folder and file from the catalog database
    TruncateDb,
}

#[derive(Debug, Subcommand)]
pub enum CollectionCommands {
    Create { name: String },
    Delete { collection_id: i64 },
    Add {
        collection_id: i64,
        folder_id: i64,
        file_name: String,
    },
    List,
    Show { collection_id: i64 },
}
