//! AgriGenius application layer
//!
//! Wires configuration into services and exposes one model per workflow:
//! soil scanning, disease detection, chat and the environment dashboard.

pub mod error;
mod error_mapping;
pub mod models;
pub mod services;

pub use error::WorkflowError;
pub use models::{
    ChatModel, CropCard, DashboardModel, DiseaseDetectorModel, DiseaseScan, SoilAnalysis,
    SoilScannerModel,
};
pub use services::{AppServices, HistoryLastScan};
