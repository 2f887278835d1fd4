//! Slide rasterization: surfaces, compositing and the mockup layout engine.

pub mod blur;
pub mod composite;
pub mod layers;
pub mod raster;
pub mod slide;
pub mod surface;
pub mod theme;

pub use raster::Rasterizer;
pub use slide::{IconStamp, RenderPlan, SlideInputs, plan_slide, render_mockup, render_slide};
pub use surface::Surface;
pub use theme::Theme;
