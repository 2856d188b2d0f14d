//! Form-field helpers: trimming, length limits and HTML-to-text for excerpts.

use crate::errors::{Error, Result};
use url::Url;

/// Trims `value` and rejects it when empty or longer than `max_chars`.
pub fn required(field: &'static str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, "هذا الحقل مطلوب"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(Error::validation(
            field,
            format!("يجب ألا يتجاوز {max_chars} حرفاً"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims `value`, mapping blank input to `None`, and enforces `max_chars`.
pub fn optional(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) if v.chars().count() > max_chars => Err(Error::validation(
            field,
            format!("يجب ألا يتجاوز {max_chars} حرفاً"),
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Accepts blank input or an absolute `http(s)` URL with a host.
pub fn optional_url(field: &'static str, value: Option<&str>) -> Result<Option<String>> {
    let url = optional(field, value, 2048)?;
    if let Some(u) = &url {
        let valid = Url::parse(u).is_ok_and(|parsed| {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.host_str().is_some_and(|host| !host.is_empty())
        });
        if !valid {
            return Err(Error::validation(field, "الرابط غير صالح"));
        }
    }
    Ok(url)
}

/// Like [`optional_url`] but the URL must be present.
pub fn required_url(field: &'static str, value: &str) -> Result<String> {
    optional_url(field, Some(value))?.ok_or_else(|| Error::validation(field, "هذا الحقل مطلوب"))
}

/// Drops HTML tags and collapses whitespace.
///
/// Only used for deriving plain-text excerpts; it is not a sanitizer.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of the text content of `html`, with an
/// ellipsis when truncated.
#[must_use]
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let text = strip_html(html);
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Falafel  ", 50).unwrap(), "Falafel");
        assert!(matches!(
            required("name", "   ", 50),
            Err(Error::Validation { field: "name", .. })
        ));
        assert!(required("name", "abcdef", 5).is_err());
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional("notes", Some("  "), 10).unwrap(), None);
        assert_eq!(optional("notes", None, 10).unwrap(), None);
        assert_eq!(
            optional("notes", Some(" spicy "), 10).unwrap().as_deref(),
            Some("spicy")
        );
    }

    #[test]
    fn test_optional_url_requires_scheme() {
        assert!(optional_url("logo_url", Some("ftp://x")).is_err());
        assert!(optional_url("logo_url", Some("https://")).is_err());
        assert!(optional_url("logo_url", Some("https://exa mple")).is_err());
        assert!(optional_url("logo_url", Some("cdn.example/logo.png")).is_err());
        assert!(optional_url("logo_url", Some("https://cdn.example/logo.png")).is_ok());
        assert!(required_url("image_url", "").is_err());
    }

    #[test]
    fn test_strip_html_and_excerpt() {
        let html = "<h1>Grand&nbsp;opening</h1><p>Come   <b>taste</b> our new menu</p>";
        assert_eq!(strip_html(html), "Grand opening Come taste our new menu");
        assert_eq!(excerpt(html, 13), "Grand opening…");
        assert_eq!(excerpt("<p>short</p>", 100), "short");
    }
}
