pub mod crawler;
pub mod detail;
pub mod links;
pub mod models;
pub mod navigator;
mod scraper_error;
pub mod webdriver;

pub use crawler::{CrawlOutcome, CrawlSettings, CrawlState, Crawler};
pub use models::Listing;
pub use scraper_error::ScraperError;
pub use webdriver::{BrowserSession, WebDriverSession};
