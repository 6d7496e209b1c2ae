//! Soil scanner: crop recommendations for a soil photo, with planting guides.

use std::sync::Arc;

use agri_imagery::{normalize_crop_name, CropImageResolution, CropImageResolver, ImageAttempt};
use agri_services::prompts::{planting_guide_prompt, NOT_SOIL_REPLY, SOIL_ANALYSIS_PROMPT};
use agri_services::{GeminiClient, InlineImage};
use tracing::instrument;

use crate::error::{WorkflowError, PLANTING_GUIDE_FAILED, SOIL_ANALYSIS_FAILED};

#[derive(Debug, Clone, PartialEq)]
pub struct CropCard {
    pub name: String,
    pub image: CropImageResolution,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SoilAnalysis {
    NotSoil,
    Crops(Vec<CropCard>),
}

/// Crop names from the model reply, or `None` when it says the image is not soil.
///
/// Blank lines and lines mentioning "soil" or "analysis" are commentary, not crops.
pub fn parse_crop_list(reply: &str) -> Option<Vec<String>> {
    if reply.trim() == NOT_SOIL_REPLY {
        return None;
    }
    Some(
        reply
            .lines()
            .filter(|line| {
                !line.trim().is_empty() && !line.contains("soil") && !line.contains("analysis")
            })
            .map(|line| line.trim().to_string())
            .collect(),
    )
}

pub struct SoilScannerModel {
    gemini: GeminiClient,
    images: Arc<CropImageResolver>,
    analysis: Option<SoilAnalysis>,
    error: Option<String>,
}

impl SoilScannerModel {
    pub fn new(gemini: GeminiClient, images: Arc<CropImageResolver>) -> Self {
        Self {
            gemini,
            images,
            analysis: None,
            error: None,
        }
    }

    #[instrument(skip_all, fields(mime = %image.mime_type))]
    pub async fn analyze(&mut self, image: &InlineImage) -> Result<SoilAnalysis, WorkflowError> {
        self.reset();

        let reply = match self
            .gemini
            .generate_content_with_image(SOIL_ANALYSIS_PROMPT, image)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                self.error = Some(SOIL_ANALYSIS_FAILED.to_string());
                return Err(WorkflowError::SoilAnalysis(e));
            }
        };

        let analysis = match parse_crop_list(&reply) {
            None => {
                tracing::info!("Image is not soil");
                SoilAnalysis::NotSoil
            }
            Some(crops) => {
                tracing::info!(count = crops.len(), "Crops recommended: {:?}", crops);
                self.images.preload(&crops);
                SoilAnalysis::Crops(
                    crops
                        .into_iter()
                        .map(|name| CropCard {
                            image: CropImageResolution::new(&self.images, &name),
                            name,
                        })
                        .collect(),
                )
            }
        };

        self.analysis = Some(analysis.clone());
        Ok(analysis)
    }

    /// An image for `crop` failed to load at `attempt`; returns what to show next.
    pub fn report_image_failure(&mut self, crop: &str, attempt: usize) -> Option<ImageAttempt> {
        let key = normalize_crop_name(crop);
        match self.analysis.as_mut()? {
            SoilAnalysis::Crops(cards) => cards
                .iter_mut()
                .find(|card| normalize_crop_name(&card.name) == key)
                .map(|card| card.image.report_failure(attempt)),
            SoilAnalysis::NotSoil => None,
        }
    }

    pub async fn try_planting_guide(&self, crop: &str) -> Result<String, WorkflowError> {
        self.gemini
            .generate_content(&planting_guide_prompt(crop))
            .await
            .map_err(WorkflowError::PlantingGuide)
    }

    /// Planting guide text, or the failure message in its place.
    pub async fn planting_guide(&self, crop: &str) -> String {
        match self.try_planting_guide(crop).await {
            Ok(guide) => guide,
            Err(e) => {
                tracing::error!("Error fetching crop guide: {}", e);
                PLANTING_GUIDE_FAILED.to_string()
            }
        }
    }

    pub fn analysis(&self) -> Option<&SoilAnalysis> {
        self.analysis.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn reset(&mut self) {
        self.analysis = None;
        self.error = None;
    }
}
