use crate::db::Database;
use crate::scraper::navigator::Navigator;
use crate::scraper::{BrowserSession, CrawlSettings, Listing, ScraperError};
use ::scraper::{Html, Selector};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

pub const BASE_URL: &str = "https://www.avito.ru/moskva/telefony?q=iphone";
pub const ORIGIN: &str = "https://www.avito.ru";

/// How a scripted page behaves when the crawler opens it.
#[derive(Clone)]
pub enum FakePage {
    Ready(String),
    /// Loads, but the awaited marker never shows up.
    Timeout,
    /// Navigation itself fails.
    LoadError,
}

#[derive(Default)]
pub struct FakeLog {
    pub visited: Vec<String>,
    pub closes: usize,
}

/// In-memory browser. Unknown URLs behave like `FakePage::Timeout`.
pub struct FakeBrowser {
    pages: HashMap<String, FakePage>,
    current: Option<FakePage>,
    lose_session_after: Option<usize>,
    pub log: Rc<RefCell<FakeLog>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current: None,
            lose_session_after: None,
            log: Rc::new(RefCell::new(FakeLog::default())),
        }
    }

    pub fn page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Search page `n` of `BASE_URL` listing `links`.
    pub fn search_page(self, n: u32, links: &[impl AsRef<str>]) -> Self {
        self.page(search_url(n), FakePage::Ready(search_html(links)))
    }

    pub fn listing(self, url: &str) -> Self {
        let html = detail_html(&title_for(url), Some("1 000 ₽"));
        self.page(url, FakePage::Ready(html))
    }

    /// Every navigation after the first `n` fails as if the driver died.
    pub fn lose_session_after(mut self, n: usize) -> Self {
        self.lose_session_after = Some(n);
        self
    }
}

impl BrowserSession for FakeBrowser {
    fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        let mut log = self.log.borrow_mut();
        if let Some(limit) = self.lose_session_after {
            if log.visited.len() >= limit {
                return Err(ScraperError::SessionLost("chromedriver went away".into()));
            }
        }
        log.visited.push(url.to_string());

        let page = self.pages.get(url).cloned().unwrap_or(FakePage::Timeout);
        if let FakePage::LoadError = page {
            self.current = None;
            return Err(ScraperError::WebDriver {
                name: "unknown error".into(),
                message: "net::ERR_CONNECTION_RESET".into(),
            });
        }
        self.current = Some(page);
        Ok(())
    }

    fn wait_for(&mut self, css: &str, _timeout: Duration) -> Result<(), ScraperError> {
        match &self.current {
            Some(FakePage::Ready(html)) => {
                let selector = Selector::parse(css).map_err(|_| ScraperError::Selector(css.into()))?;
                if Html::parse_document(html).select(&selector).next().is_some() {
                    Ok(())
                } else {
                    Err(ScraperError::Timeout(css.to_string()))
                }
            }
            _ => Err(ScraperError::Timeout(css.to_string())),
        }
    }

    fn page_source(&mut self) -> Result<String, ScraperError> {
        match &self.current {
            Some(FakePage::Ready(html)) => Ok(html.clone()),
            _ => Ok(String::new()),
        }
    }

    fn close(&mut self) -> Result<(), ScraperError> {
        self.log.borrow_mut().closes += 1;
        Ok(())
    }
}

pub fn search_url(n: u32) -> String {
    Navigator::new(Url::parse(BASE_URL).unwrap())
        .page_url(n)
        .to_string()
}

pub fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub fn settings(pages: u32, max_ads: usize) -> CrawlSettings {
    CrawlSettings {
        base_url: Url::parse(BASE_URL).unwrap(),
        pages,
        max_ads,
        request_delay: Duration::ZERO,
    }
}

pub fn listing_url(id: &str) -> String {
    format!("{ORIGIN}/moskva/telefony/iphone_{id}")
}

pub fn title_for(url: &str) -> String {
    format!("Phone at {}", url.rsplit('/').next().unwrap_or(url))
}

/// A results page with one card per link; hrefs are site-relative.
pub fn search_html(links: &[impl AsRef<str>]) -> String {
    let cards: String = links
        .iter()
        .map(|link| {
            let link = link.as_ref();
            let href = link.strip_prefix(ORIGIN).unwrap_or(link);
            format!(r#"<div data-marker="item"><a href="{href}">ad</a></div>"#)
        })
        .collect();
    format!("<html><body><div class=\"items\">{cards}</div></body></html>")
}

pub fn detail_html(title: &str, price: Option<&str>) -> String {
    let price = price
        .map(|p| format!(r#"<span data-marker="item-price">{p}</span>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <h1 data-marker="item-view/title-info">{title}</h1>
            {price}
            <div data-marker="item-view/item-description"><p>Line one</p><p>Line two</p></div>
            <span data-marker="item-view/item-address">Moscow, Tverskaya 1</span>
            <span data-marker="item-view/item-date">· 12 March 10:15</span>
            <span data-marker="item-view/total-views">42 views</span>
            <a data-marker="seller-link/link" href="/user/abc/profile">Ivan</a>
        </body></html>"#
    )
}

pub fn full_listing(id: &str) -> Listing {
    Listing {
        title: format!("iPhone 13, 128 GB \"like new\" #{id}"),
        url: listing_url(id),
        price: "55 000 ₽".into(),
        description: "Boxed, receipt included.\nNo scratches, battery 91%".into(),
        address: "Москва, Тверская ул., 1".into(),
        published_date: "12 March 10:15".into(),
        view_count: "42 views".into(),
        seller_name: "Ivan".into(),
        seller_profile_url: format!("{ORIGIN}/user/abc/profile"),
        phone: "hidden".into(),
    }
}

/// Unique path under the system temp dir.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "avito_scraper_{}_{}_{name}",
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

pub fn temp_db(name: &str) -> Database {
    Database::new(temp_path(name))
}

/// Cell text of the first sheet of an `.xlsx`, row by row. Every cell is
/// expected to be a shared string, which is all the Excel sink writes.
pub fn xlsx_rows(path: &Path) -> Vec<Vec<String>> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let shared = zip_entry(&mut archive, "xl/sharedStrings.xml");
    let sheet = zip_entry(&mut archive, "xl/worksheets/sheet1.xml");

    let strings: Vec<String> = shared
        .split("<si>")
        .skip(1)
        .map(|si| {
            let t = &si[si.find("<t").unwrap()..];
            let body = &t[t.find('>').unwrap() + 1..t.find("</t>").unwrap()];
            xml_text(body)
        })
        .collect();

    sheet
        .split("<row ")
        .skip(1)
        .map(|row| {
            row.split("<c ")
                .skip(1)
                .map(|cell| {
                    let v = &cell[cell.find("<v>").unwrap() + 3..cell.find("</v>").unwrap()];
                    strings[v.parse::<usize>().unwrap()].clone()
                })
                .collect()
        })
        .collect()
}

/// The `ref` of the sheet's `<dimension>`, e.g. `A1:J2`.
pub fn xlsx_dimension(path: &Path) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let sheet = zip_entry(&mut archive, "xl/worksheets/sheet1.xml");
    let start = sheet.find("<dimension ref=\"").unwrap() + "<dimension ref=\"".len();
    let len = sheet[start..].find('"').unwrap();
    sheet[start..start + len].to_string()
}

fn zip_entry<R: Read + Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> String {
    let mut text = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
    text
}

fn xml_text(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
