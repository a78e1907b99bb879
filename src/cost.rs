//! Credit pricing for billable actions and their audit labels.

/// Number of prompt characters kept in an action description.
pub const PROMPT_EXCERPT_CHARS: usize = 50;

/// Hard cap on a description sent to the ledger.
pub const MAX_DESCRIPTION_CHARS: usize = 120;

/// Settings that determine the price of a generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSettings {
    pub width: u32,
    pub height: u32,
    pub quality: String,
    pub style: String,
}

impl ImageSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            quality: "standard".to_string(),
            style: String::new(),
        }
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// Credits charged for one image.
///
/// 2 credits base, 3 from 512x512 pixels, 5 from 1024x1024 pixels, and 2 more
/// for premium quality or photorealistic style.
pub fn image_cost(settings: &ImageSettings) -> u64 {
    let pixels = u64::from(settings.width) * u64::from(settings.height);

    let mut cost = if pixels >= 1024 * 1024 {
        5
    } else if pixels >= 512 * 512 {
        3
    } else {
        2
    };

    if settings.quality.eq_ignore_ascii_case("premium")
        || settings.style.eq_ignore_ascii_case("photorealistic")
    {
        cost += 2;
    }

    cost
}

/// Credits charged for generating `page_count` pages. Never less than one.
pub fn page_cost(page_count: u32) -> u64 {
    u64::from(page_count.max(1))
}

/// What kind of billable action a description is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Pages(u32),
    Image,
}

/// Audit label for an action, e.g. `"3 Page(s): A story about..."`.
pub fn action_description(kind: ActionKind, prompt: &str) -> String {
    let excerpt = excerpt(prompt.trim(), PROMPT_EXCERPT_CHARS);
    match kind {
        ActionKind::Pages(count) => format!("{} Page(s): {}...", count.max(1), excerpt),
        ActionKind::Image => format!("Image: {}...", excerpt),
    }
}

/// Cut a description down to what the ledger accepts, on a char boundary.
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description.to_string();
    }
    let mut cut = excerpt(description, MAX_DESCRIPTION_CHARS - 3);
    cut.push_str("...");
    cut
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
