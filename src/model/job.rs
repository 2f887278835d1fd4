use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    model::slide::{IconPosition, Quality, SlideSpec},
    storage::StoredObject,
};

/// Largest batch accepted by one submission.
pub const MAX_BATCH_SLIDES: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

/// Outcome of one slide, reported in submission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideResult {
    pub slide_number: usize,
    pub ok: bool,
    pub url: Option<String>,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl SlideResult {
    pub fn from_result(slide_number: usize, result: CarouselResult<StoredObject>) -> Self {
        match result {
            Ok(obj) => Self {
                slide_number,
                ok: true,
                url: Some(obj.url),
                filename: Some(obj.filename),
                error: None,
            },
            Err(err) => Self {
                slide_number,
                ok: false,
                url: None,
                filename: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Progress record of one batch.
///
/// Only the job's own generation loop mutates it; terminal states reject further changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    /// Twelve hex characters, unique per process.
    pub id: String,
    /// Id of the brand the batch was rendered for.
    pub brand: String,
    /// Number of slides in the batch.
    pub total: usize,
    /// Slides with a recorded result, successful or not. Never decreases.
    pub completed: usize,
    /// 1-based number of the slide being produced, 0 before the first starts.
    pub current: usize,
    /// Per-slide outcomes in slide order.
    pub slides: Vec<SlideResult>,
    pub status: JobStatus,
    /// Why the whole job failed. Slide failures stay on their `SlideResult`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RenderJob {
    pub fn new(id: impl Into<String>, brand: impl Into<String>, total: usize) -> Self {
        Self {
            id: id.into(),
            brand: brand.into(),
            total,
            completed: 0,
            current: 0,
            slides: Vec::with_capacity(total),
            status: JobStatus::Running,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != JobStatus::Running
    }

    fn ensure_running(&self) -> CarouselResult<()> {
        if self.is_terminal() {
            return Err(CarouselError::validation(format!(
                "job {} is already {:?}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn begin_slide(&mut self, slide_number: usize) -> CarouselResult<()> {
        self.ensure_running()?;
        if slide_number != self.slides.len() + 1 || slide_number > self.total {
            return Err(CarouselError::validation(format!(
                "job {} cannot start slide {slide_number} after {} results",
                self.id,
                self.slides.len()
            )));
        }
        self.current = slide_number;
        Ok(())
    }

    /// Append the next result; results must arrive in slide order.
    pub fn record(&mut self, result: SlideResult) -> CarouselResult<()> {
        self.ensure_running()?;
        if result.slide_number != self.slides.len() + 1 || result.slide_number > self.total {
            return Err(CarouselError::validation(format!(
                "job {} got result for slide {} after {} results",
                self.id,
                result.slide_number,
                self.slides.len()
            )));
        }
        self.slides.push(result);
        self.completed = self.slides.len();
        Ok(())
    }

    pub fn finish(&mut self) -> CarouselResult<()> {
        self.ensure_running()?;
        if self.slides.len() != self.total {
            return Err(CarouselError::validation(format!(
                "job {} finished with {} of {} results",
                self.id,
                self.slides.len(),
                self.total
            )));
        }
        self.status = JobStatus::Done;
        Ok(())
    }

    /// Move a running job to `error`. Returns false if it was already terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = JobStatus::Error;
        self.error = Some(message.into());
        true
    }

    pub fn succeeded(&self) -> usize {
        self.slides.iter().filter(|s| s.ok).count()
    }
}

fn default_true() -> bool {
    true
}

/// Client request for a batch of slides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub slides: Vec<SlideSpec>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, alias = "includeOwl")]
    pub include_icon: bool,
    #[serde(default, alias = "owlPosition")]
    pub icon_position: IconPosition,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub image_model: Option<String>,
    #[serde(default)]
    pub text_model: Option<String>,
    #[serde(default)]
    pub video_model: Option<String>,
    /// Run prompts through the text model before image generation.
    #[serde(default = "default_true")]
    pub refine_prompts: bool,
}

impl BatchRequest {
    pub fn new(slides: Vec<SlideSpec>) -> Self {
        Self {
            slides,
            brand: None,
            include_icon: false,
            icon_position: IconPosition::default(),
            quality: Quality::default(),
            image_model: None,
            text_model: None,
            video_model: None,
            refine_prompts: true,
        }
    }

    pub fn validate(&self) -> CarouselResult<()> {
        if self.slides.is_empty() || self.slides.len() > MAX_BATCH_SLIDES {
            return Err(CarouselError::validation(format!(
                "batch must contain 1..={MAX_BATCH_SLIDES} slides, got {}",
                self.slides.len()
            )));
        }
        for (idx, slide) in self.slides.iter().enumerate() {
            slide
                .validate()
                .map_err(|e| CarouselError::validation(format!("slide {}: {e}", idx + 1)))?;
        }
        Ok(())
    }
}

/// Returned immediately by a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    pub job_id: String,
    pub total: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/model/job.rs"]
mod tests;
