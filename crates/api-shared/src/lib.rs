//! # API Shared
//!
//! Shared utilities and definitions for the RxGate API surface.
//!
//! Contains:
//! - Request/response DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI for common functionality.

pub mod dto;
pub mod health;

pub use dto::{
    DeleteRes, ErrorRes, GetRes, LineItemDto, ListRes, PrescriptionDto, SubmitRes, ValidateRes,
};
pub use health::{HealthRes, HealthService};
