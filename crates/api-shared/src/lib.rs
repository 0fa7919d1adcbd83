//! # API Shared
//!
//! Shared utilities and definitions for Axiom APIs.
//!
//! Contains:
//! - JSON request/response types with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `axiom` CLI so every surface emits the same shapes.

pub mod dto;
pub mod health;

pub use dto::{ErrorBody, ErrorDetail, GenerateReportReq, GenerateReportRes, HealthRes};
pub use health::HealthService;
