use scraper::{Html, Selector};
use url::Url;

use super::ExtractorSettings;
use crate::models::LinkMetadata;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_DESCRIPTION: &str = "No description";
pub const DEGRADED_DESCRIPTION: &str = "Error fetching description";
pub const ELLIPSIS: &str = "...";

/// Fallback order for each field. The first non-blank value wins.
const TITLE_KEYS: [&str; 2] = ["og:title", "twitter:title"];
const DESCRIPTION_KEYS: [&str; 2] = ["og:description", "twitter:description"];
const IMAGE_KEYS: [&str; 2] = ["og:image", "twitter:image"];

/// Parse `html` fetched from `page_url` and resolve title, description and
/// image through the Open Graph → Twitter Card → document fallbacks.
///
/// The returned record is always fully populated: blank fields get the
/// defaults from `settings`.
pub fn parse_metadata(html: &str, page_url: &str, settings: &ExtractorSettings) -> LinkMetadata {
    let document = Html::parse_document(html);

    let title = first_meta(&document, &TITLE_KEYS)
        .or_else(|| get_title_tag(&document))
        .unwrap_or_else(|| page_url.to_string());
    let description = first_meta(&document, &DESCRIPTION_KEYS).unwrap_or_default();
    let image = first_meta(&document, &IMAGE_KEYS).unwrap_or_default();

    finalize(page_url, title, description, image, settings)
}

/// The placeholder record used when a page could not be fetched or parsed.
pub fn degraded_metadata(page_url: &str, settings: &ExtractorSettings) -> LinkMetadata {
    LinkMetadata {
        title: page_url.to_string(),
        description: DEGRADED_DESCRIPTION.to_string(),
        image: settings.placeholder_image_url.clone(),
    }
}

fn finalize(
    page_url: &str,
    title: String,
    description: String,
    image: String,
    settings: &ExtractorSettings,
) -> LinkMetadata {
    let title = non_blank(title).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let description = non_blank(description)
        .map(|d| truncate_description(&d, settings.max_description_len))
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let image = resolve_image(page_url, &image)
        .unwrap_or_else(|| settings.placeholder_image_url.clone());

    LinkMetadata {
        title,
        description,
        image,
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Return `raw` unchanged when it is already an absolute http(s) URL,
/// otherwise join it against `page_url`. `None` when the reference is blank
/// or cannot be turned into an http(s) URL.
pub fn resolve_image(page_url: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let resolved = Url::parse(page_url).ok()?.join(raw).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Cut `text` to `max` characters and append [`ELLIPSIS`]. Text at or under
/// the limit is returned unchanged.
pub fn truncate_description(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str(ELLIPSIS);
    cut
}

fn first_meta(doc: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| get_meta(doc, key))
}

/// Look up `<meta>` content keyed by either `property` or `name`; pages use
/// both forms for OG and Twitter tags.
fn get_meta(doc: &Html, key: &str) -> Option<String> {
    let selector =
        Selector::parse(&format!(r#"meta[property="{key}"], meta[name="{key}"]"#)).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

fn get_title_tag(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    doc.select(&selector)
        .next()
        .map(|el| {
            el.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
}

// ── Unit tests ─────────────────────────────────────────────────────────────
