//! Share and embed links for restaurant pages.
//!
//! Every builder goes through [`Url`] so query values are percent-encoded
//! (Arabic text included).

use serde::Serialize;
use url::Url;

/// Social share targets for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    /// Facebook sharer
    pub facebook: String,
    /// X (Twitter) intent
    pub x: String,
    /// Telegram share
    pub telegram: String,
    /// WhatsApp message with the link
    pub whatsapp: String,
}

fn with_query(base: &str, pairs: &[(&str, &str)]) -> String {
    match Url::parse_with_params(base, pairs) {
        Ok(url) => url.into(),
        Err(_) => base.to_string(),
    }
}

/// Keeps the digits of a phone number, dropping `+`, spaces and dashes.
/// A leading `00` international prefix is removed.
#[must_use]
pub fn phone_digits(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    digits
        .strip_prefix("00")
        .map_or_else(|| digits.clone(), str::to_string)
}

/// WhatsApp click-to-chat link, or `None` when the number has no digits.
#[must_use]
pub fn whatsapp_chat_url(phone: &str, message: Option<&str>) -> Option<String> {
    let digits = phone_digits(phone);
    if digits.is_empty() {
        return None;
    }
    let base = format!("https://wa.me/{digits}");
    Some(match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(text) => with_query(&base, &[("text", text)]),
        None => base,
    })
}

/// Share links for `page_url` with `title` as the accompanying text.
#[must_use]
pub fn share_links(page_url: &str, title: &str) -> ShareLinks {
    let text_and_url = format!("{title} {page_url}");
    ShareLinks {
        facebook: with_query("https://www.facebook.com/sharer/sharer.php", &[("u", page_url)]),
        x: with_query(
            "https://twitter.com/intent/tweet",
            &[("url", page_url), ("text", title)],
        ),
        telegram: with_query("https://t.me/share/url", &[("url", page_url), ("text", title)]),
        whatsapp: with_query("https://wa.me/", &[("text", text_and_url.as_str())]),
    }
}

/// Google Maps embed for a free-text address.
#[must_use]
pub fn maps_embed_url(address: &str) -> String {
    with_query(
        "https://www.google.com/maps",
        &[("q", address.trim()), ("output", "embed")],
    )
}

/// YouTube iframe source for a video id.
#[must_use]
pub fn youtube_embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}")
}

/// Thumbnail image for a video id.
#[must_use]
pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
}
