use super::element_text;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use url::Url;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static CARD_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3").expect("valid selector"));
static LOT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/lot/\d[\d-]*(?:[/?#]|$)").expect("valid regex"));
static YEAR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(?:\s|$)").expect("valid regex"));
static NON_CAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:motorcycles?|motorbikes?|motor bikes?|quad[- ]?bikes?|atvs?|scooters?|dirt bikes?)\b",
    )
    .expect("valid regex")
});

/// Rules deciding which links on a search page are vehicle lots
#[derive(Debug, Clone)]
pub struct LinkRules {
    /// Origin that relative links are resolved against
    pub origin: Url,
    /// Element id prefix accepted when no link passes the year rule
    pub id_prefix: String,
    /// Whole-word pattern marking a lot as something other than a car or truck
    pub excluded: Regex,
}

impl LinkRules {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            id_prefix: "LOT_".to_string(),
            excluded: NON_CAR.clone(),
        }
    }

    fn is_excluded(&self, text: &str) -> bool {
        self.excluded.is_match(text)
    }

    fn absolutize(&self, href: &str) -> Option<String> {
        match self.origin.join(href) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!("Skipping unparseable lot link {}: {}", href, e);
                None
            }
        }
    }
}

/// Card title when the anchor wraps one, otherwise the anchor text
fn visible_text(anchor: ElementRef<'_>) -> String {
    anchor
        .select(&CARD_TITLE)
        .next()
        .map(element_text)
        .unwrap_or_else(|| element_text(anchor))
}

/// Collect absolute, deduplicated vehicle lot URLs from a search results page.
///
/// A lot link is accepted when its text starts with a model year. If no link
/// qualifies that way, links whose element id carries the lot prefix are
/// accepted instead. Motorcycles and quads are dropped in both passes.
pub fn collect_lot_links(document: &Html, rules: &LinkRules) -> BTreeSet<String> {
    let candidates: Vec<(ElementRef<'_>, &str, String)> = document
        .select(&ANCHORS)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            LOT_PATH.is_match(href).then(|| (a, href, visible_text(a)))
        })
        .filter(|(_, href, text)| {
            let excluded = rules.is_excluded(text);
            if excluded {
                debug!("Skipping non-car lot {}: {}", href, text);
            }
            !excluded
        })
        .collect();

    let mut links = BTreeSet::new();
    for (_, href, text) in &candidates {
        if YEAR_PREFIX.is_match(text) {
            if let Some(url) = rules.absolutize(href) {
                debug!("Found vehicle: {}", text.chars().take(50).collect::<String>());
                links.insert(url);
            }
        }
    }

    if links.is_empty() {
        warn!("No lot titles start with a year, falling back to lot element ids...");
        for (anchor, href, _) in &candidates {
            let by_id = anchor
                .value()
                .id()
                .is_some_and(|id| id.starts_with(&rules.id_prefix));
            if by_id {
                if let Some(url) = rules.absolutize(href) {
                    links.insert(url);
                }
            }
        }
    }

    info!("Total unique vehicle links found: {}", links.len());
    links
}
