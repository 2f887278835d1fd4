//! Text, image and video generation behind one provider trait.

pub mod anthropic;
pub mod fal;
pub mod freeform;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod prompt;
pub mod provider;
pub mod router;

pub use freeform::{FreeformCarousel, freeform_carousel};
pub use provider::{
    GeneratedVideo, GenerationProvider, ImageModel, ImageRequest, ProviderCredentials,
    ProviderEndpoints, TextModel, TextRequest, VideoModel, VideoRequest,
};
pub use router::ProviderRouter;
