use crate::scraper::links::resolve;
use crate::scraper::models::*;
use crate::scraper::navigator::MARKER_WAIT;
use crate::scraper::{BrowserSession, ScraperError};
use ::scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// The listing page is considered loaded once its title is on screen.
pub const TITLE_MARKER: &str = r#"h1[data-marker="item-view/title-info"]"#;

const SELLER_MARKER: &str = r#"a[data-marker="seller-link/link"]"#;

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Price,
    Description,
    Address,
    PublishedDate,
    ViewCount,
    SellerName,
    SellerProfileUrl,
}

#[derive(Debug, Clone, Copy)]
enum TextMode {
    /// Trimmed text nodes glued together.
    Stripped,
    /// Trimmed text nodes, one per line.
    Lines,
    /// The `href` attribute, resolved against the site origin.
    Href,
}

struct FieldRule {
    field: Field,
    locators: &'static [&'static str],
    mode: TextMode,
    fallback: &'static str,
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Title,
        locators: &[TITLE_MARKER],
        mode: TextMode::Stripped,
        fallback: NO_TITLE,
    },
    FieldRule {
        field: Field::Price,
        locators: &[r#"span[data-marker="item-price"]"#],
        mode: TextMode::Stripped,
        fallback: NO_PRICE,
    },
    FieldRule {
        field: Field::Description,
        locators: &[r#"div[data-marker="item-view/item-description"]"#],
        mode: TextMode::Lines,
        fallback: NO_DESCRIPTION,
    },
    FieldRule {
        field: Field::Address,
        locators: &[
            r#"span[data-marker="item-view/item-address"]"#,
            r#"span[itemprop="address"]"#,
        ],
        mode: TextMode::Stripped,
        fallback: NO_ADDRESS,
    },
    FieldRule {
        field: Field::PublishedDate,
        locators: &[r#"span[data-marker="item-view/item-date"]"#],
        mode: TextMode::Stripped,
        fallback: NO_DATE,
    },
    FieldRule {
        field: Field::ViewCount,
        locators: &[r#"span[data-marker="item-view/total-views"]"#],
        mode: TextMode::Stripped,
        fallback: NO_VIEWS,
    },
    FieldRule {
        field: Field::SellerName,
        locators: &[SELLER_MARKER],
        mode: TextMode::Stripped,
        fallback: NO_SELLER_NAME,
    },
    FieldRule {
        field: Field::SellerProfileUrl,
        locators: &[SELLER_MARKER],
        mode: TextMode::Href,
        fallback: NO_SELLER_LINK,
    },
];

/// Build a `Listing` from a detail page. Each field is looked up on its own;
/// a missing marker only affects that field.
pub fn parse_listing(html: &str, url: &str, origin: &Url) -> Listing {
    let document = Html::parse_document(html);
    let mut listing = Listing::blank(url);

    for rule in FIELD_RULES {
        let value = lookup(&document, rule, origin).unwrap_or_else(|| rule.fallback.to_string());
        let slot = match rule.field {
            Field::Title => &mut listing.title,
            Field::Price => &mut listing.price,
            Field::Description => &mut listing.description,
            Field::Address => &mut listing.address,
            Field::PublishedDate => &mut listing.published_date,
            Field::ViewCount => &mut listing.view_count,
            Field::SellerName => &mut listing.seller_name,
            Field::SellerProfileUrl => &mut listing.seller_profile_url,
        };
        *slot = value;
    }

    listing
}

fn lookup(document: &Html, rule: &FieldRule, origin: &Url) -> Option<String> {
    rule.locators.iter().find_map(|locator| {
        let selector = match Selector::parse(locator) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("{}: {e}", ScraperError::Selector(locator.to_string()));
                return None;
            }
        };
        let element = document.select(&selector).next()?;
        let value = match rule.mode {
            TextMode::Stripped => stripped_text(element, ""),
            TextMode::Lines => stripped_text(element, "\n"),
            TextMode::Href => resolve(origin, element.value().attr("href")?)?,
        };
        (!value.is_empty()).then_some(value)
    })
}

fn stripped_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Opens listing pages in the shared session and parses them.
pub struct DetailExtractor {
    origin: Url,
    wait: Duration,
}

impl DetailExtractor {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            wait: MARKER_WAIT,
        }
    }

    #[cfg(test)]
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// `Ok(None)` when the title never appears or the page fails to load.
    /// Only a lost session is an error.
    pub fn load_listing<B: BrowserSession>(
        &self,
        session: &mut B,
        url: &str,
    ) -> Result<Option<Listing>, ScraperError> {
        tracing::info!(%url, "extracting listing");

        let html = match Self::try_load(session, url, self.wait) {
            Ok(html) => html,
            Err(e) if e.is_session_lost() => return Err(e),
            Err(ScraperError::Timeout(_)) => {
                tracing::warn!(
                    "{}",
                    ScraperError::ListingLoadTimeout {
                        url: url.to_string()
                    }
                );
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(%url, "failed to load listing: {e}");
                return Ok(None);
            }
        };

        let listing = parse_listing(&html, url, &self.origin);
        tracing::info!(title = %listing.title, "listing extracted");
        Ok(Some(listing))
    }

    fn try_load<B: BrowserSession>(
        session: &mut B,
        url: &str,
        wait: Duration,
    ) -> Result<String, ScraperError> {
        session.navigate(url)?;
        session.wait_for(TITLE_MARKER, wait)?;
        session.page_source()
    }
}
