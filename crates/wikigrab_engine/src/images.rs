use std::sync::LazyLock;

use engine_logging::{engine_debug, engine_trace};
use regex::Regex;
use url::Url;

use crate::decode::decode_html;
use crate::fetch::{FetchRequest, Fetcher};
use crate::links::{collect_links, LinkKind};
use crate::rules::{ImageRule, IMAGE_RULES};
use crate::FetchError;

static COMPILED_RULES: LazyLock<Vec<(ImageRule, Vec<Regex>)>> = LazyLock::new(|| {
    IMAGE_RULES
        .iter()
        .map(|(rule, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("hardcoded regex pattern is valid"))
                .collect();
            (*rule, compiled)
        })
        .collect()
});

/// Fetch `page_url` and return the image references on it, in page order.
pub async fn extract_images(fetcher: &dyn Fetcher, page_url: &Url) -> Result<Vec<Url>, FetchError> {
    let output = fetcher.fetch(&FetchRequest::page(page_url.clone())).await?;
    let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
    let images = image_references(&decoded.html, page_url);
    engine_debug!("{} image references on {}", images.len(), page_url);
    Ok(images)
}

/// `img` sources in `html` that pass [`classify_image_url`].
pub fn image_references(html: &str, page_url: &Url) -> Vec<Url> {
    collect_links(html, page_url, LinkKind::Image)
        .into_iter()
        .filter(|url| match classify_image_url(url.as_str()) {
            Some(rule) => {
                engine_trace!("{url} accepted by {rule:?}");
                true
            }
            None => false,
        })
        .collect()
}

/// First rule from [`IMAGE_RULES`] that recognises `url` as an image.
pub fn classify_image_url(url: &str) -> Option<ImageRule> {
    COMPILED_RULES
        .iter()
        .find(|(_, patterns)| patterns.iter().all(|re| re.is_match(url)))
        .map(|(rule, _)| *rule)
}
