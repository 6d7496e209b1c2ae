//! Workflow models behind each screen.

pub mod chat_model;
pub mod dashboard_model;
pub mod disease_model;
pub mod soil_scanner_model;

pub use chat_model::ChatModel;
pub use dashboard_model::{render as render_dashboard, DashboardModel};
pub use disease_model::{DiseaseDetectorModel, DiseaseScan};
pub use soil_scanner_model::{parse_crop_list, CropCard, SoilAnalysis, SoilScannerModel};
