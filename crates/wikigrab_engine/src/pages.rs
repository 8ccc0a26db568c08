use std::collections::HashSet;

use engine_logging::{engine_debug, engine_warn};
use url::Url;

use crate::decode::decode_html;
use crate::fetch::{FetchRequest, Fetcher};
use crate::links::{collect_links, LinkKind};
use crate::rules::PAGE_QUERY_MARKERS;
use crate::{FailureKind, FetchError};

/// Fetch the listing page and return the distinct candidate content pages
/// linked from it, in first-seen order.
pub async fn list_pages(fetcher: &dyn Fetcher, base_url: &str) -> Result<Vec<Url>, FetchError> {
    let base = Url::parse(base_url.trim())
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    let output = fetcher.fetch(&FetchRequest::page(base.clone())).await?;
    let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
    if decoded.had_errors {
        engine_warn!(
            "Listing page {} did not decode cleanly as {}",
            base,
            decoded.encoding_label
        );
    }

    let pages = candidate_pages(&decoded.html, &base);
    engine_debug!("{} candidate pages on {}", pages.len(), base);
    Ok(pages)
}

/// All hyperlinks in `html` that look like wiki pages, de-duplicated by their
/// normalized absolute form.
pub fn candidate_pages(html: &str, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    collect_links(html, base, LinkKind::Hyperlink)
        .into_iter()
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .filter(is_candidate_page)
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// A link is a page candidate when its query names a page/command, or when it
/// carries exactly one `?` (the undecorated `?PageName` form).
///
/// The single-`?` fallback also admits any other link with a query string.
pub fn is_candidate_page(url: &Url) -> bool {
    let Some(query) = url.query() else {
        return false;
    };
    PAGE_QUERY_MARKERS.iter().any(|marker| query.contains(marker))
        || url.as_str().matches('?').count() == 1
}
