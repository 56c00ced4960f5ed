//! Constants used throughout the RxGate core crate.
//!
//! This module contains all path, marker and default-value constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Default directory for prescription data storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "rx_data";

/// Directory name for prescription record storage.
pub const RECORDS_DIR_NAME: &str = "records";

/// Directory name for stored prescription documents.
pub const DOCUMENTS_DIR_NAME: &str = "documents";

/// Filename for prescription record JSON files.
pub const RECORD_JSON_FILENAME: &str = "record.json";

/// Default filename for the prescriber registry, relative to the data directory.
pub const DEFAULT_REGISTRY_FILENAME: &str = "prescribers.yaml";

/// Default validity window for a prescription, in days after issuance.
pub const DEFAULT_VALIDITY_WINDOW_DAYS: i64 = 30;

/// Literal section marker that opens the line-item block on a prescription document.
pub const PRODUCTS_MARKER: &str = "Productos:";

/// Literal section marker that terminates the line-item block.
pub const OBSERVATIONS_MARKER: &str = "Observaciones:";

/// Milliseconds in one 24-hour period, used by the elapsed-days rule.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Smallest accepted page size for record listings.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Largest accepted page size for record listings.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size applied when a listing request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
