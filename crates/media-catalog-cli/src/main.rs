mod commands;
mod logging;
mod progress;
mod prompt;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, CollectionCommands, Commands};
use dotenv::dotenv;
use media_catalog_core::registry::normalize_extension;
use media_catalog_core::storage::MediaRef;
use media_catalog_core::{AppConfig, CatalogCoordinator, CatalogState, SqliteStore};
use progress::CliReporter;
use prompt::{prompt_confirm, StdinPrompt};
use tracing::{error, info};

type Coordinator = CatalogCoordinator<SqliteStore>;

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match media_catalog_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();
    let Some(command) = args.command else {
        let _ = Cli::command().print_long_help();
        return;
    };

    if let Err(err) = run(command, config) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::PrintConfig => {
            println!("Configuration: {:#?}", config);
            return Ok(());
        }
        Commands::TruncateDb => {
            if prompt_confirm(
                "Are you SURE you want to remove every folder and file from the catalog?",
                Some(false),
            )? {
                open_store(&config)?.truncate_all()?;
                println!("All catalog tables truncated");
            }
            return Ok(());
        }
        _ => {}
    }

    let mut coordinator = open_coordinator(config)?;
    let state = match command {
        Commands::Load => coordinator.load(&StdinPrompt)?,
        _ => coordinator.load(&|_: &str| false)?,
    };

    match command {
        Commands::Load => {
            if state == CatalogState::Ready {
                info!(
                    "{} folders, {} media files",
                    format!("{}", coordinator.catalog().folders().len()).cyan(),
                    format!("{}", coordinator.catalog().file_count()).cyan(),
                );
            } else {
                info!("Catalog is empty");
            }
        }
        Commands::Scan { path } => run_scan(&mut coordinator, &path)?,
        Commands::Tree => print_tree(&coordinator),
        Commands::Roots => {
            for root in coordinator.get_root_folders() {
                println!("{:>6}  {}", root.folder_id, root.folder_path.bold());
            }
        }
        Commands::Files { ext, media_type } => {
            let files: Vec<_> = match (ext.as_deref(), media_type.as_deref()) {
                (Some(ext), media_type) => coordinator
                    .get_files_by_extension(&normalize_extension(ext))
                    .into_iter()
                    .filter(|f| media_type.map_or(true, |t| f.media_type.eq_ignore_ascii_case(t)))
                    .collect(),
                (None, Some(media_type)) => coordinator.get_files_by_type(media_type),
                (None, None) => coordinator.get_all_files().iter().collect(),
            };
            for file in &files {
                println!(
                    "{:<8} {:>10} KB  {}",
                    file.media_type,
                    file.file_size_kb,
                    file.path().display()
                );
            }
            info!("{} files", format!("{}", files.len()).cyan());
        }
        Commands::DeleteFolder { folder_id } => {
            let folder = coordinator
                .get_folder_by_id(folder_id)
                .map(|f| f.folder_path.clone())
                .with_context(|| format!("Folder {} not found", folder_id))?;
            if prompt_confirm(&format!("Delete {} from the catalog?", folder), Some(false))? {
                let deleted = coordinator.delete_folder(folder_id)?;
                info!("Deleted {} folders", format!("{}", deleted.len()).red());
            }
        }
        Commands::ChangeRoot { path } => {
            if prompt_confirm(
                "Changing the root folder clears the current catalog. Continue?",
                Some(false),
            )? {
                let summary = coordinator.change_root_folder(&path)?;
                info!(
                    "New root {}: {} folders, {} media files",
                    summary.root.display().to_string().bold(),
                    format!("{}", summary.folders_added).green(),
                    format!("{}", summary.files_added).green(),
                );
            }
        }
        Commands::Collection { action } => run_collection(&coordinator, action)?,
        Commands::PrintConfig | Commands::TruncateDb => {}
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Opening database {}", config.database_path))?;
    store.seed_media_types(
        config
            .media_types
            .iter()
            .map(|(ext, label)| (ext.as_str(), label.as_str())),
    )?;
    Ok(store)
}

fn open_coordinator(config: AppConfig) -> Result<Coordinator> {
    let store = open_store(&config)?;
    Ok(CatalogCoordinator::new(
        store,
        config,
        Box::new(CliReporter::new()),
    ))
}

fn run_scan(coordinator: &mut Coordinator, path: &Path) -> Result<()> {
    let summary = coordinator.scan_folder(path)?;
    println!();
    info!(
        "{}: {} folders, {} media files of {} files processed",
        summary.root.display().to_string().bold(),
        format!("{}", summary.folders_added).green(),
        format!("{}", summary.files_added).green(),
        summary.files_processed,
    );
    Ok(())
}

fn print_tree(coordinator: &Coordinator) {
    for row in coordinator.outline() {
        let indent = "  ".repeat(row.depth);
        match row.item {
            MediaRef::Folder(folder_id) => {
                println!("{}{} {}", indent, row.name.blue().bold(), format!("[{}]", folder_id).dimmed());
            }
            MediaRef::File(_) => {
                println!(
                    "{}{} {}",
                    indent,
                    row.name,
                    format!(
                        "({}, {} KB)",
                        row.media_type.unwrap_or_default(),
                        row.size_kb.unwrap_or_default()
                    )
                    .dimmed()
                );
            }
        }
    }
}

fn run_collection(coordinator: &Coordinator, action: CollectionCommands) -> Result<()> {
    match action {
        CollectionCommands::Create { name } => {
            let collection = coordinator.create_collection(&name)?;
            info!("Created collection {} ({})", collection.collection_name.bold(), collection.collection_id);
        }
        CollectionCommands::Delete { collection_id } => {
            coordinator.delete_collection(collection_id)?;
            info!("Deleted collection {}", collection_id);
        }
        CollectionCommands::Add {
            collection_id,
            folder_id,
            file_name,
        } => {
            coordinator.add_to_collection(collection_id, folder_id, &file_name)?;
            info!("Added {} to collection {}", file_name, collection_id);
        }
        CollectionCommands::List => {
            for collection in coordinator.get_collections()? {
                println!(
                    "{:>6}  {}  {}",
                    collection.collection_id,
                    collection.collection_name.bold(),
                    collection.created_at.dimmed()
                );
            }
        }
        CollectionCommands::Show { collection_id } => {
            for file in coordinator.get_collection_files(collection_id)? {
                println!("{:<8} {}", file.media_type, file.path().display());
            }
        }
    }
    Ok(())
}
