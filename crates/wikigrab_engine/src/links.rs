use scraper::{Html, Selector};
use url::Url;

/// Which attribute of which element a reference is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Hyperlink,
    Image,
}

impl LinkKind {
    fn selector(self) -> &'static str {
        match self {
            LinkKind::Hyperlink => "a[href]",
            LinkKind::Image => "img[src]",
        }
    }

    fn attribute(self) -> &'static str {
        match self {
            LinkKind::Hyperlink => "href",
            LinkKind::Image => "src",
        }
    }
}

/// Collect every reference of `kind` in document order, resolved against
/// `base`. Unresolvable and non-http(s) references are dropped; duplicates
/// are kept.
pub fn collect_links(html: &str, base: &Url, kind: LinkKind) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(kind.selector()) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(kind.attribute()))
        .filter_map(|raw| resolve_reference(raw, base))
        .collect()
}

/// Resolve a raw attribute value to an absolute http(s) URL.
///
/// Bare query links (`?PageName`) are kept: Pukiwiki uses them for pages.
pub fn resolve_reference(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("data:")
    {
        return None;
    }
    let url = base.join(trimmed).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
