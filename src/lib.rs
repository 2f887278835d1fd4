//! Branded carousel slides: deterministic mockup rendering, AI generation adapters, and a
//! background batch orchestrator with pollable progress.
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod generate;
pub mod jobs;
pub mod layout;
pub mod model;
pub mod render;
pub mod storage;

pub use assets::store::{AssetResolver, DirAssetResolver, InMemoryAssets};
pub use config::StudioConfig;
pub use foundation::core::{Point, Rect, Rgb8, Rgba8Premul, Vec2};
pub use foundation::error::{CarouselError, CarouselResult};
pub use generate::{GenerationProvider, ImageModel, ProviderRouter, TextModel, VideoModel};
pub use jobs::{
    InMemoryJobRegistry, JobRegistry, Orchestrator, OrchestratorOpts, PollOpts, SlideWorker,
    StudioWorker, poll_until_terminal,
};
pub use layout::canvas::{AspectRatio, CanvasSpec};
pub use model::{
    brand::Brand,
    job::{BatchRequest, JobStatus, JobTicket, RenderJob, SlideResult},
    outline::{ContentIdeas, OutlineSlide},
    slide::SlideSpec,
};
pub use render::{Rasterizer, Surface, Theme, render_mockup};
pub use storage::{LocalDirStore, ObjectStore, StoredObject};
