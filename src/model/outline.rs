//! Carousel outlines: slide descriptors written by people or a text model, and the markdown
//! content-ideas catalog each brand keeps.

use serde::{Deserialize, Serialize};

use crate::model::{
    brand::Brand,
    slide::{PhotoSlide, SlideCopy, SlideSpec, TextSlide, lenient},
};

keyword_enum! {
    /// Which generated slide type an outline entry becomes.
    pub enum OutlineKind {
        Text => "text",
        Photo => "photo",
    }
    default = Text;
}

/// One slide of an outline, before it is turned into a [`SlideSpec`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutlineSlide {
    #[serde(deserialize_with = "lenient::count")]
    pub number: u32,
    /// Role in the carousel, e.g. "Hook" or "CTA".
    pub label: String,
    #[serde(rename = "type")]
    pub kind: OutlineKind,
    pub micro_label: String,
    pub headline: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl OutlineSlide {
    /// Slide spec for this entry. A blank micro label takes the brand default.
    pub fn to_spec(&self, brand: &Brand) -> SlideSpec {
        let micro_label = match self.micro_label.trim() {
            "" => brand.default_micro_label.clone(),
            label => label.to_string(),
        };
        let copy = SlideCopy {
            micro_label,
            headline: self.headline.trim().to_string(),
            body: self.body.trim().to_string(),
            highlight_phrase: non_blank(&self.highlight),
        };
        match self.kind {
            OutlineKind::Photo => SlideSpec::Photo(PhotoSlide {
                copy,
                sport: non_blank(&self.sport),
                setting: non_blank(&self.setting),
                action: non_blank(&self.action),
                mood: non_blank(&self.mood),
                ..PhotoSlide::default()
            }),
            OutlineKind::Text => SlideSpec::Text(TextSlide {
                copy,
                citation: non_blank(&self.citation),
                ..TextSlide::default()
            }),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ContentIdea {
    /// Dotted number from the heading, e.g. "1.2".
    pub id: String,
    pub title: String,
    pub sources: Vec<String>,
    pub slides: Vec<OutlineSlide>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IdeaCategory {
    pub name: String,
    pub ideas: Vec<ContentIdea>,
}

/// A brand's parsed `content-ideas.md`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ContentIdeas {
    pub id: String,
    pub name: String,
    pub categories: Vec<IdeaCategory>,
}

impl ContentIdeas {
    /// Asset id of the catalog for `brand`.
    pub fn asset_id(brand: &Brand) -> String {
        format!("brands/{}/content-ideas.md", brand.id)
    }

    pub fn parse(markdown: &str, brand: &Brand) -> Self {
        Self {
            id: brand.id.clone(),
            name: brand.name.clone(),
            categories: parse_content_ideas(markdown),
        }
    }
}

/// Parse the catalog markdown.
///
/// ```text
/// ## Category 1: Mental Toughness
/// ### 1.1 — "Pressure is a privilege"
/// **Sources:** Jones 2002, Gucciardi 2009
/// **Slide 1** — Hook (photo)
/// - Micro-label: MINDSET
/// - Headline: Pressure is a privilege
/// ---
/// ```
///
/// A slide's fields run until the next slide, a `---` rule or a `##` heading. Ideas without
/// slides and categories without ideas are dropped, as are malformed headings and everything
/// before the first category.
pub fn parse_content_ideas(markdown: &str) -> Vec<IdeaCategory> {
    let mut parser = IdeasParser::default();
    for line in markdown.lines() {
        parser.line(line.trim_end());
    }
    parser.finish()
}

/// Where the scanner is: `None` at a level means lines there are skipped.
#[derive(Default)]
struct IdeasParser {
    done: Vec<IdeaCategory>,
    category: Option<IdeaCategory>,
    idea: Option<ContentIdea>,
    slide: Option<OutlineSlide>,
}

impl IdeasParser {
    fn line(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("## Category ") {
            self.close_category();
            self.category = category_name(rest).map(|name| IdeaCategory {
                name,
                ideas: Vec::new(),
            });
        } else if let Some(rest) = line.strip_prefix("### ")
            && idea_number(rest).is_some()
        {
            self.close_idea();
            self.idea = self.category.as_ref().and_then(|_| idea_heading(rest));
        } else if line.starts_with("##") {
            self.close_slide();
        } else if let Some(rest) = line.strip_prefix("**Sources:** ") {
            if let Some(idea) = self.idea.as_mut().filter(|i| i.sources.is_empty()) {
                idea.sources = rest
                    .split(',')
                    .map(str::trim)
                    .map(str::to_string)
                    .collect();
            }
        } else if let Some(rest) = line.trim_start().strip_prefix("**Slide ") {
            self.close_slide();
            if self.idea.is_some() {
                self.slide = slide_heading(rest);
            }
        } else if line.starts_with("---") {
            self.close_slide();
        } else if let Some(slide) = self.slide.as_mut() {
            apply_field(slide, line);
        }
    }

    fn close_slide(&mut self) {
        if let (Some(slide), Some(idea)) = (self.slide.take(), self.idea.as_mut()) {
            idea.slides.push(slide);
        }
    }

    fn close_idea(&mut self) {
        self.close_slide();
        if let Some(idea) = self.idea.take().filter(|i| !i.slides.is_empty())
            && let Some(category) = self.category.as_mut()
        {
            category.ideas.push(idea);
        }
    }

    fn close_category(&mut self) {
        self.close_idea();
        if let Some(category) = self.category.take().filter(|c| !c.ideas.is_empty()) {
            self.done.push(category);
        }
    }

    fn finish(mut self) -> Vec<IdeaCategory> {
        self.close_category();
        self.done
    }
}

/// `"3: Recovery"` → `"Recovery"`.
fn category_name(rest: &str) -> Option<String> {
    let (number, name) = rest.split_once(": ")?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Leading `N.M` of an idea heading.
fn idea_number(rest: &str) -> Option<&str> {
    let digits = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let major = digits(rest);
    if major == 0 || rest.as_bytes().get(major) != Some(&b'.') {
        return None;
    }
    let minor = digits(&rest[major + 1..]);
    (minor > 0).then(|| &rest[..major + 1 + minor])
}

/// `1.2 — "Title"`.
fn idea_heading(rest: &str) -> Option<ContentIdea> {
    let id = idea_number(rest)?;
    let title = rest[id.len()..]
        .strip_prefix(" — \"")?
        .strip_suffix('"')
        .filter(|t| !t.is_empty())?;
    Some(ContentIdea {
        id: id.to_string(),
        title: title.to_string(),
        ..ContentIdea::default()
    })
}

/// `3** — Label (type)`, the part after `**Slide `.
fn slide_heading(rest: &str) -> Option<OutlineSlide> {
    let (number, rest) = rest.split_once("** — ")?;
    let number = number.parse::<u32>().ok()?;
    let (label, kind) = rest.trim_end().strip_suffix(')')?.rsplit_once(" (")?;
    if label.is_empty() || kind.is_empty() || !kind.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(OutlineSlide {
        number,
        label: label.to_string(),
        kind: OutlineKind::parse(kind),
        ..OutlineSlide::default()
    })
}

/// `- Headline: value` and the other recognized field lines. Anything else is ignored.
fn apply_field(slide: &mut OutlineSlide, line: &str) {
    let Some((field, value)) = line.strip_prefix("- ").and_then(|l| l.split_once(": ")) else {
        return;
    };
    if value.is_empty() {
        return;
    }
    let value = value.to_string();
    match field {
        "Micro-label" => slide.micro_label = value,
        "Headline" => slide.headline = value,
        "Body" => slide.body = value,
        "Highlight" => slide.highlight = Some(value),
        "Citation" => slide.citation = Some(value),
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/outline.rs"]
mod tests;
