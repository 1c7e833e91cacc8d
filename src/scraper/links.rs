use crate::scraper::navigator::ITEM_MARKER;
use ::scraper::{Html, Selector};
use url::Url;

/// Canonical listing URLs from one search-results page, in page order.
///
/// Cards without an anchor are skipped. Relative hrefs are resolved against
/// `origin`.
pub fn extract_links(html: &str, origin: &Url) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let (Ok(card), Ok(anchor)) = (Selector::parse(ITEM_MARKER), Selector::parse("a[href]")) else {
        return Vec::new();
    };

    document
        .select(&card)
        .filter_map(|item| item.select(&anchor).next())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve(origin, href))
        .collect()
}

/// Absolute form of `href` as seen from `origin`. Only http(s) targets count;
/// `javascript:`, `mailto:` and the like yield `None`.
pub fn resolve(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let url = origin.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://www.avito.ru").unwrap()
    }

    #[test]
    fn resolves_relative_and_keeps_absolute() {
        let html = r#"
            <div data-marker="item"><a href="/moskva/telefony/iphone_1">one</a></div>
            <div data-marker="item"><a href="https://www.avito.ru/moskva/telefony/iphone_2">two</a></div>
        "#;
        assert_eq!(
            extract_links(html, &origin()),
            vec![
                "https://www.avito.ru/moskva/telefony/iphone_1",
                "https://www.avito.ru/moskva/telefony/iphone_2",
            ]
        );
    }

    #[test]
    fn skips_cards_without_anchor() {
        let html = r#"
            <div data-marker="item"><span>sold out</span></div>
            <div data-marker="item"><a>no href</a></div>
            <div data-marker="item"><a href="/a_3">three</a></div>
        "#;
        assert_eq!(extract_links(html, &origin()), vec!["https://www.avito.ru/a_3"]);
    }

    #[test]
    fn takes_first_anchor_per_card_and_ignores_other_links() {
        let html = r#"
            <a href="/not-a-card">nav</a>
            <div data-marker="item">
                <a href="/a_1">photo</a>
                <a href="/a_1#title">title</a>
            </div>
        "#;
        assert_eq!(extract_links(html, &origin()), vec!["https://www.avito.ru/a_1"]);
    }

    #[test]
    fn skips_non_http_hrefs() {
        let html = r#"
            <div data-marker="item"><a href="javascript:void(0)">menu</a></div>
            <div data-marker="item"><a href="mailto:a@b.c">mail</a></div>
            <div data-marker="item"><a href="tel:+70000000000">call</a></div>
            <div data-marker="item"><a href="/a_4">four</a></div>
        "#;
        assert_eq!(extract_links(html, &origin()), vec!["https://www.avito.ru/a_4"]);
    }

    #[test]
    fn empty_markup_has_no_links() {
        assert!(extract_links("", &origin()).is_empty());
    }
}
