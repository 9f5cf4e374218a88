//! Pull the tab itself out of a tab page, leaving navigation and ads behind.

use crate::error::{ExtractError, ParseError};
use crate::playlist::{collapse, parse};
use crate::util;
use regex::Regex;
use scraper::Html;

/// Title, artist and tab metadata.
pub const HEADER: &str = "body > div:nth-of-type(1) > div:nth-of-type(3) > main > \
    div:nth-of-type(2) > article:nth-of-type(1) > section:nth-of-type(1) > header";
/// The tab body.
pub const CONTENT: &str = "body > div:nth-of-type(1) > div:nth-of-type(3) > main > \
    div:nth-of-type(2) > article:nth-of-type(1) > section:nth-of-type(2) > article > div";
/// A tab page counts as loaded once its body exists, or once it is known to
/// be a pro tab, which never renders one.
pub const TAB_READY: &str = "body > div:nth-of-type(1) > div:nth-of-type(3) > main > \
    div:nth-of-type(2) > article:nth-of-type(1) > section:nth-of-type(2) > article > div, \
    link[rel='canonical'][href*='guitar-pro'], link[rel='canonical'][href*='/pro/'], \
    meta[property='og:url'][content*='guitar-pro'], meta[property='og:url'][content*='/pro/']";

const CANONICAL: &str = "link[rel='canonical'], meta[property='og:url']";
const PAGE_TITLE: &str = "head > title";
const PRO_URL: &str = r"(?i)/pro/|guitar-pro";
const PRO_TITLE: &str = r"(?i)\bguitar\s+pro\b";

#[derive(Clone, Debug, PartialEq)]
pub struct TabContent {
    /// Filesystem-safe, used as the file stem.
    pub title: String,
    pub header_html: String,
    pub body_html: String,
}

impl TabContent {
    /// Header and body markup, in page order.
    pub fn html(&self) -> String {
        format!("{}{}", self.header_html, self.body_html)
    }
}

pub fn extract(html: &str) -> Result<TabContent, ExtractError> {
    let document = Html::parse_document(html);

    if let Some(reason) = pro_marker(&document)? {
        return Err(ExtractError::Unsupported(reason));
    }

    let header_selector = parse(HEADER)?;
    let content_selector = parse(CONTENT)?;

    let header = document
        .select(&header_selector)
        .next()
        .ok_or(ParseError::Structure("tab header"))?;
    let body = document
        .select(&content_selector)
        .next()
        .ok_or(ParseError::Structure("tab content"))?;

    let title = util::sanitize(&collapse(&header.text().collect::<Vec<_>>().join(" ")));
    if title.is_empty() {
        return Err(ParseError::MissingTitle.into());
    }

    Ok(TabContent {
        title,
        header_html: header.html(),
        body_html: body.html(),
    })
}

/// Pro tabs are interactive players without a text body. Returns why the page
/// looks like one, if it does.
fn pro_marker(document: &Html) -> Result<Option<String>, ParseError> {
    let pro_url = Regex::new(PRO_URL).map_err(|_| ParseError::Pattern(PRO_URL))?;
    let pro_title = Regex::new(PRO_TITLE).map_err(|_| ParseError::Pattern(PRO_TITLE))?;

    for element in document.select(&parse(CANONICAL)?) {
        let url = element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("content"));
        if let Some(url) = url.filter(|u| pro_url.is_match(u)) {
            return Ok(Some(format!("pro tab ({})", url)));
        }
    }

    if let Some(title) = document.select(&parse(PAGE_TITLE)?).next() {
        let title = collapse(&title.text().collect::<String>());
        if pro_title.is_match(&title) {
            return Ok(Some(format!("pro tab ({})", title)));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(head: &str, header: &str, body: &str) -> String {
        format!(
            "<html><head>{head}</head><body>\
             <div><div>nav</div><div>ads</div><div><main>\
             <div>breadcrumbs</div>\
             <div><article>\
             <section><header>{header}</header></section>\
             <section><article><div>{body}</div></article></section>\
             </article></div>\
             </main></div></div>\
             </body></html>"
        )
    }

    #[test]
    fn extracts_header_and_body() {
        let html = page(
            "<title>Wonderwall Chords by Oasis</title>",
            "<h1>Wonderwall Chords</h1><a>Oasis</a>",
            "<pre>Em7   G\nToday is gonna be the day</pre>",
        );
        let content = extract(&html).unwrap();
        assert_eq!(content.title, "Wonderwall Chords Oasis");
        assert!(content.header_html.starts_with("<header>"));
        assert!(content.body_html.contains("Em7   G"));
        assert!(!content.html().contains("ads"));
    }

    #[test]
    fn sanitizes_title() {
        let html = page("", "<h1>AC/DC: Back In Black</h1>", "<pre>E</pre>");
        assert_eq!(extract(&html).unwrap().title, "AC_DC_ Back In Black");
    }

    #[test]
    fn fails_without_title() {
        let html = page("", "   ", "<pre>E</pre>");
        assert!(matches!(
            extract(&html),
            Err(ExtractError::Parse(ParseError::MissingTitle))
        ));
    }

    #[test]
    fn fails_on_other_markup() {
        let html = "<html><body><main><pre>E A D</pre></main></body></html>";
        assert!(matches!(
            extract(html),
            Err(ExtractError::Parse(ParseError::Structure(_)))
        ));
    }

    #[test]
    fn detects_pro_tabs_by_url() {
        let html = page(
            r#"<link rel="canonical" href="https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-guitar-pro-1">"#,
            "<h1>Wonderwall</h1>",
            "<div class=\"player\"></div>",
        );
        assert!(matches!(extract(&html), Err(ExtractError::Unsupported(_))));
    }

    #[test]
    fn detects_pro_tabs_by_title() {
        let html = page(
            "<title>Wonderwall (Guitar Pro) by Oasis</title>",
            "<h1>Wonderwall</h1>",
            "",
        );
        assert!(matches!(extract(&html), Err(ExtractError::Unsupported(_))));
    }

    #[test]
    fn ready_on_content_or_pro_marker() {
        let ready = parse(TAB_READY).unwrap();
        let regular = page(
            r#"<link rel="canonical" href="https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-1">"#,
            "<h1>Wonderwall</h1>",
            "<pre>E</pre>",
        );
        assert!(Html::parse_document(&regular).select(&ready).next().is_some());

        let player = r#"<html><head><link rel="canonical" href="https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-guitar-pro-1"></head>
            <body><main><section><div class="player"></div></section></main></body></html>"#;
        assert!(Html::parse_document(player).select(&ready).next().is_some());

        let loading = r#"<html><head><link rel="canonical" href="https://tabs.ultimate-guitar.com/tab/oasis/wonderwall-chords-1"></head>
            <body><main></main></body></html>"#;
        assert!(Html::parse_document(loading).select(&ready).next().is_none());
    }

    #[test]
    fn pro_detection_wins_over_missing_content() {
        let html = r#"<html><head><meta property="og:url" content="https://www.ultimate-guitar.com/pro/123"></head><body></body></html>"#;
        assert!(matches!(extract(html), Err(ExtractError::Unsupported(_))));
    }
}
