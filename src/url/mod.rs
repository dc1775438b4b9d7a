//! URL handling module for Catalog-Harvest
//!
//! Catalog pages are addressed by a URL template carrying a `{page}`
//! placeholder. This module renders that template and resolves the
//! `href` of a page's "next page" link against the page it was found on.

use crate::{UrlError, UrlResult};
use url::Url;

/// Placeholder replaced by the page number in a page URL template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Renders the URL of catalog page `page`
///
/// # Arguments
///
/// * `template` - URL template containing at least one `{page}` placeholder
/// * `page` - The 1-based page number
///
/// # Returns
///
/// * `Ok(Url)` - The absolute HTTP(S) URL of the page
/// * `Err(UrlError)` - The template lacks a placeholder or does not render to an HTTP(S) URL
///
/// # Example
///
/// ```
/// use catalog_harvest::url::render_page_url;
///
/// let url = render_page_url("https://shop.example.com/list?p={page}", 3).unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/list?p=3");
/// ```
pub fn render_page_url(template: &str, page: u32) -> UrlResult<Url> {
    if !template.contains(PAGE_PLACEHOLDER) {
        return Err(UrlError::MissingPlaceholder(template.to_string()));
    }

    let rendered = template.replace(PAGE_PLACEHOLDER, &page.to_string());
    let url = Url::parse(&rendered).map_err(|e| UrlError::Parse(format!("{}: {}", rendered, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that do not resolve to an HTTP(S) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
