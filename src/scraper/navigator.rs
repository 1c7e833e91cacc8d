use crate::scraper::{BrowserSession, ScraperError};
use std::time::Duration;
use url::Url;

/// Search result cards; at least one must show up before the page counts as loaded.
pub const ITEM_MARKER: &str = r#"div[data-marker="item"]"#;

pub const MARKER_WAIT: Duration = Duration::from_secs(10);

/// Loads numbered search-result pages for one search.
pub struct Navigator {
    base_url: Url,
    wait: Duration,
}

impl Navigator {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            wait: MARKER_WAIT,
        }
    }

    /// `base_url` with `p=<page>`, replacing any page number already there.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "p")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("p", &page.to_string());
        url
    }

    /// Returns the page markup, or an empty string when the page never showed
    /// any items. Only a lost session is reported as an error.
    pub fn load_search_page<B: BrowserSession>(
        &self,
        session: &mut B,
        page: u32,
    ) -> Result<String, ScraperError> {
        let url = self.page_url(page);
        tracing::info!(page, %url, "loading search page");

        match self.try_load(session, url.as_str()) {
            Ok(html) => Ok(html),
            Err(e) if e.is_session_lost() => Err(e),
            Err(ScraperError::Timeout(_)) => {
                tracing::warn!("{}", ScraperError::PageLoadTimeout { page });
                Ok(String::new())
            }
            Err(e) => {
                tracing::error!(page, "failed to load search page: {e}");
                Ok(String::new())
            }
        }
    }

    fn try_load<B: BrowserSession>(&self, session: &mut B, url: &str) -> Result<String, ScraperError> {
        session.navigate(url)?;
        session.wait_for(ITEM_MARKER, self.wait)?;
        session.page_source()
    }
}
