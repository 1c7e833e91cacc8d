use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser session could not be started: {0}")]
    DriverInit(String),

    #[error("no listing items appeared on page {page} in time")]
    PageLoadTimeout { page: u32 },

    #[error("listing title did not appear in time: {url}")]
    ListingLoadTimeout { url: String },

    #[error("timed out waiting for `{0}`")]
    Timeout(String),

    #[error("browser session lost: {0}")]
    SessionLost(String),

    #[error("webdriver error {name}: {message}")]
    WebDriver { name: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid selector `{0}`")]
    Selector(String),
}

impl ScraperError {
    /// Faults that leave the session unusable. Everything else only costs the
    /// current page or listing.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, ScraperError::SessionLost(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_page() {
        let err = ScraperError::PageLoadTimeout { page: 3 };
        assert_eq!(err.to_string(), "no listing items appeared on page 3 in time");
    }

    #[test]
    fn only_session_loss_is_fatal() {
        assert!(ScraperError::SessionLost("gone".into()).is_session_lost());
        assert!(!ScraperError::Timeout("h1".into()).is_session_lost());
        assert!(!ScraperError::Network("reset".into()).is_session_lost());
    }
}
