use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use crate::error::StructureError;

static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static A_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Borough page links from the root directory page.
///
/// The content region's first paragraph is an introduction; the second holds
/// one anchor per borough. Order and duplicates are preserved.
pub fn discover_links(doc: &Html, base: &Url, region_id: &str) -> Result<Vec<Url>, StructureError> {
    let region = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().id() == Some(region_id))
        .ok_or_else(|| StructureError::MissingRegion {
            id: region_id.to_string(),
        })?;

    let paragraphs: Vec<_> = region.select(&P_SEL).collect();
    let list = paragraphs.get(1).ok_or_else(|| StructureError::MissingLinkList {
        id: region_id.to_string(),
        found: paragraphs.len(),
    })?;

    let mut links = Vec::new();
    for a in list.select(&A_SEL) {
        let Some(href) = a.value().attr("href") else {
            warn!("Anchor without href in link list: {:?}", a.text().collect::<String>());
            continue;
        };
        match base.join(href.trim()) {
            Ok(url) => links.push(url),
            Err(e) => warn!("Skipping unresolvable link {:?}: {}", href, e),
        }
    }
    Ok(links)
}
