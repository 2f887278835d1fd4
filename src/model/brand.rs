use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;

pub const DEFAULT_BRAND_ID: &str = "athlete-mindset";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: Rgb8,
    pub accent: Rgb8,
    pub white: Rgb8,
    pub secondary: Rgb8,
    /// Reserved for call-to-action elements.
    pub cta: Rgb8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub website: String,
    pub colors: BrandColors,
    pub default_micro_label: String,
    pub default_background: String,
    /// Caption drawn under the icon watermark.
    pub icon_caption: Option<String>,
    pub system_prompt: String,
}

impl Brand {
    pub fn builtins() -> Vec<Brand> {
        vec![athlete_mindset(), trackspeed()]
    }

    pub fn builtin(id: &str) -> Option<Brand> {
        Self::builtins().into_iter().find(|b| b.id == id)
    }

    /// Built-in brand for `id`, falling back to the default brand.
    pub fn resolve(id: Option<&str>) -> Brand {
        let id = id.map(str::trim).filter(|id| !id.is_empty());
        match id.and_then(Self::builtin) {
            Some(brand) => brand,
            None => {
                if let Some(id) = id {
                    tracing::warn!(brand = id, "unknown brand, using {DEFAULT_BRAND_ID}");
                }
                athlete_mindset()
            }
        }
    }

    /// Asset ids tried in order for the brand icon.
    pub fn icon_asset_ids(&self) -> Vec<String> {
        vec![
            format!("brands/{}/app-icon.png", self.id),
            format!("brands/{}/assets/app-icon.png", self.id),
            "app-icon.png".to_string(),
        ]
    }

    /// Asset ids tried in order for a brand-supplied phone frame.
    pub fn frame_asset_ids(&self) -> Vec<String> {
        vec![
            format!("brands/{}/phone-frame.png", self.id),
            format!("brands/{}/assets/phone-frame.png", self.id),
        ]
    }
}

fn athlete_mindset() -> Brand {
    Brand {
        id: "athlete-mindset".into(),
        name: "Athlete Mindset".into(),
        website: "athletemindset.app".into(),
        colors: BrandColors {
            primary: Rgb8::new(0x07, 0x2f, 0x57),
            accent: Rgb8::new(0x73, 0xa6, 0xd1),
            white: Rgb8::new(0xff, 0xff, 0xff),
            secondary: Rgb8::new(0xd9, 0xd0, 0xc2),
            cta: Rgb8::new(0x43, 0xaa, 0x32),
        },
        default_micro_label: "ATHLETE MINDSET".into(),
        default_background: "dark premium navy/near-black with very subtle grain".into(),
        icon_caption: Some("athletemindset.app".into()),
        system_prompt: "You are a visual designer and prompt engineer for Athlete Mindset, a \
            mental performance training app for athletes built on visualization, breathwork \
            and AI voice coaching. Palette: navy #072F57 backgrounds, cyan #73A6D1 accents, \
            white #FFFFFF text, beige #D9D0C2 warm alternates, green #43AA32 for CTA only."
            .into(),
    }
}

fn trackspeed() -> Brand {
    Brand {
        id: "trackspeed".into(),
        name: "TrackSpeed".into(),
        website: "trackspeed.app".into(),
        colors: BrandColors {
            primary: Rgb8::new(0x19, 0x19, 0x19),
            accent: Rgb8::new(0x5c, 0x8d, 0xb8),
            white: Rgb8::new(0xfd, 0xfd, 0xfd),
            secondary: Rgb8::new(0x2b, 0x2e, 0x32),
            cta: Rgb8::new(0x22, 0xc5, 0x5e),
        },
        default_micro_label: "TRACKSPEED".into(),
        default_background: "deep charcoal #191919 with subtle noise texture".into(),
        icon_caption: Some("trackspeed.app".into()),
        system_prompt: "You are a visual designer and prompt engineer for TrackSpeed, a sprint \
            timing app that turns an iPhone camera into a photo-finish gate. Tone: technical, \
            data-driven, confident. Palette: charcoal #191919, surface #2B2E32, accent blue \
            #5C8DB8, white #FDFDFD text, green #22C55E for PR callouts. Sprint times are \
            large, monospace and high contrast."
            .into(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/brand.rs"]
mod tests;
