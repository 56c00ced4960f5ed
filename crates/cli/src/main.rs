use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rxgate_core::{
    constants::{DEFAULT_DATA_DIR, DEFAULT_PAGE_SIZE, DEFAULT_REGISTRY_FILENAME},
    validity_window_from_env_value, CoreConfig, FileRecordStore, FileRegistry, PageRequest,
    PlainTextOcr, PrescriptionService, RecordFilter, ShardableUuid, ValidationState,
};
use rxgate_files::FilesService;

#[derive(Parser)]
#[command(name = "rxgate")]
#[command(about = "RxGate prescription validation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a prescription document
    Submit {
        /// Path to the document file
        file: PathBuf,
    },
    /// Validate a pending prescription against its stored document
    Validate {
        /// Record identifier (32 lowercase hex characters)
        id: String,
    },
    /// Show one prescription record
    Get {
        /// Record identifier
        id: String,
    },
    /// List prescription records, newest first
    List {
        /// Filter by patient identifier
        #[arg(long)]
        patient_id: Option<String>,
        /// Filter by prescriber registration code
        #[arg(long)]
        prescriber_code: Option<String>,
        /// Filter by state: pending or validated
        #[arg(long)]
        state: Option<String>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size, clamped to [1, 100]
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
    /// Delete a prescription record and its stored document
    Delete {
        /// Record identifier
        id: String,
    },
}

/// Wires the prescription service from the same environment variables the
/// REST server uses.
fn build_service() -> Result<PrescriptionService, Box<dyn std::error::Error>> {
    let data_dir = std::env::var("RXGATE_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let data_path = PathBuf::from(&data_dir);
    std::fs::create_dir_all(&data_path)?;

    let registry_file = std::env::var("RXGATE_REGISTRY_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_path.join(DEFAULT_REGISTRY_FILENAME));

    let validity_window =
        validity_window_from_env_value(std::env::var("RXGATE_VALIDITY_DAYS").ok())?;

    let cfg = CoreConfig::new(data_path, registry_file, validity_window)?;

    let registry = if cfg.registry_file().is_file() {
        FileRegistry::load(cfg.registry_file())?
    } else {
        FileRegistry::default()
    };

    Ok(PrescriptionService::new(
        &cfg,
        Arc::new(PlainTextOcr::new()),
        Arc::new(FilesService::new(&cfg.documents_dir())?),
        Arc::new(registry),
        Arc::new(FileRecordStore::new(cfg.records_dir())),
    ))
}

fn parse_id(id: &str) -> Result<ShardableUuid, Box<dyn std::error::Error>> {
    Ok(ShardableUuid::parse(id)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Submit { file }) => {
            let bytes = std::fs::read(&file)?;
            let service = build_service()?;
            match service.submit(&bytes) {
                Ok(record) => {
                    println!("Submitted prescription {} (pending)", record.id);
                    println!("{}", serde_json::to_string_pretty(&record)?);
                }
                Err(e) => eprintln!("Submission rejected: {}", e),
            }
        }
        Some(Commands::Validate { id }) => {
            let id = parse_id(&id)?;
            let service = build_service()?;
            match service.validate_by_id(&id) {
                Ok(record) => println!("Prescription {} validated", record.id),
                Err(e) => eprintln!("Validation failed: {}", e),
            }
        }
        Some(Commands::Get { id }) => {
            let id = parse_id(&id)?;
            let service = build_service()?;
            let (record, download_url) = service.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            if let Some(url) = download_url {
                println!("Document: {}", url);
            }
        }
        Some(Commands::List {
            patient_id,
            prescriber_code,
            state,
            page,
            page_size,
        }) => {
            let state = match state.as_deref() {
                None => None,
                Some(raw) => match ValidationState::parse(raw) {
                    Some(parsed) => Some(parsed),
                    None => {
                        eprintln!("Unknown state '{}': expected pending or validated", raw);
                        return Ok(());
                    }
                },
            };

            let service = build_service()?;
            let result = service.list(
                &RecordFilter {
                    patient_id,
                    prescriber_code,
                    state,
                },
                PageRequest::new(page, page_size),
            )?;

            if result.items.is_empty() {
                println!("No prescriptions found.");
            } else {
                println!(
                    "Page {} of {} record(s) total:",
                    result.page, result.total
                );
                for record in &result.items {
                    println!(
                        "{}  patient {}  prescriber {}  issued {}  [{}]",
                        record.id,
                        record.patient_id,
                        record.prescriber_code,
                        record.issue_date,
                        record.validation_state
                    );
                }
            }
        }
        Some(Commands::Delete { id }) => {
            let id = parse_id(&id)?;
            let service = build_service()?;
            service.delete(&id)?;
            println!("Deleted prescription {}", id);
        }
        None => {
            println!("Use 'rxgate --help' for commands");
        }
    }

    Ok(())
}
