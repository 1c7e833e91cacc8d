// crawler.rs
use crate::scraper::detail::DetailExtractor;
use crate::scraper::links::extract_links;
use crate::scraper::models::Listing;
use crate::scraper::navigator::Navigator;
use crate::scraper::{BrowserSession, ScraperError};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Everything a finished run hands back, including partial results after an abort.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub state: CrawlState,
    pub listings: Vec<Listing>,
    pub pages_visited: u32,
    pub skipped: usize,
    pub cap_reached: bool,
    pub abort_reason: Option<String>,
}

pub struct CrawlSettings {
    pub base_url: Url,
    pub pages: u32,
    pub max_ads: usize,
    pub request_delay: Duration,
}

/// Walks search pages in order and collects at most `max_ads` listings.
pub struct Crawler<B: BrowserSession> {
    session: B,
    navigator: Navigator,
    details: DetailExtractor,
    settings: CrawlSettings,
    state: CrawlState,
    listings: Vec<Listing>,
    pages_visited: u32,
    skipped: usize,
    cap_reached: bool,
}

impl<B: BrowserSession> Crawler<B> {
    pub fn new(session: B, settings: CrawlSettings) -> Self {
        let origin = Url::parse(&settings.base_url.origin().ascii_serialization())
            .unwrap_or_else(|_| settings.base_url.clone());

        Self {
            session,
            navigator: Navigator::new(settings.base_url.clone()),
            details: DetailExtractor::new(origin),
            settings,
            state: CrawlState::Idle,
            listings: Vec::new(),
            pages_visited: 0,
            skipped: 0,
            cap_reached: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Run to completion. The session is closed before this returns, whether
    /// the crawl completed or aborted.
    pub fn run(mut self) -> CrawlOutcome {
        tracing::info!(
            base_url = %self.settings.base_url,
            pages = self.settings.pages,
            max_ads = self.settings.max_ads,
            "crawl started"
        );
        self.state = CrawlState::Running;

        let abort_reason = match self.crawl_pages() {
            Ok(()) => {
                self.state = CrawlState::Completed;
                None
            }
            Err(e) => {
                tracing::error!("crawl aborted: {e}");
                self.state = CrawlState::Aborted;
                Some(e.to_string())
            }
        };

        if let Err(e) = self.session.close() {
            tracing::warn!("failed to close browser session: {e}");
        }

        tracing::info!(
            state = ?self.state,
            collected = self.listings.len(),
            skipped = self.skipped,
            pages_visited = self.pages_visited,
            "crawl finished"
        );

        CrawlOutcome {
            state: self.state,
            listings: self.listings,
            pages_visited: self.pages_visited,
            skipped: self.skipped,
            cap_reached: self.cap_reached,
            abort_reason,
        }
    }

    fn crawl_pages(&mut self) -> Result<(), ScraperError> {
        for page in 1..=self.settings.pages {
            self.pages_visited = page;

            let html = self.navigator.load_search_page(&mut self.session, page)?;
            let links = extract_links(&html, self.details.origin());
            tracing::info!(page, found = links.len(), "listing links found");

            for link in links {
                if self.cap_hit() {
                    return Ok(());
                }

                match self.details.load_listing(&mut self.session, &link)? {
                    Some(listing) => self.listings.push(listing),
                    None => self.skipped += 1,
                }

                if !self.settings.request_delay.is_zero() {
                    std::thread::sleep(self.settings.request_delay);
                }
            }

            if self.cap_hit() {
                return Ok(());
            }
        }
        Ok(())
    }

    fn cap_hit(&mut self) -> bool {
        if self.listings.len() < self.settings.max_ads {
            return false;
        }
        self.cap_reached = true;
        tracing::info!(max_ads = self.settings.max_ads, "maximum number of ads reached");
        true
    }
}
