//! Find the tabs listed on a playlist page.

use crate::error::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Wraps the content of every page on the site, playlists included.
pub const PLAYLIST_CONTAINER: &str = "main";
/// Only playlists have these inside `main`: the tab table, or the notice
/// shown in its place while the playlist has no tabs.
pub const PLAYLIST_MARKER: &str = "table, .playlist-empty";
/// The playlist is rendered client-side, links show up once it is done.
pub const PLAYLIST_READY: &str = LINKS;
const LINKS: &str = "a[href]";
const TAB_HOST: &str = "tabs.ultimate-guitar.com";
const TAB_PATHS: [&str; 2] = ["/tab/", "/user/tab/"];

#[derive(Clone, Debug, PartialEq)]
pub struct ItemRef {
    pub url: String,
    /// Link text as shown on the playlist, may be empty.
    pub title: String,
}

impl ItemRef {
    /// How the item is named in log output.
    pub fn label(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// List the tab links of a playlist page in document order.
///
/// `Ok` with an empty list means the playlist has no tabs. A page that has
/// neither tab links nor a playlist marker is a [`ParseError::Structure`]
/// instead, since every page on the site has a `main`.
pub fn enumerate(html: &str, base: &Url) -> Result<Vec<ItemRef>, ParseError> {
    let document = Html::parse_document(html);
    let container = parse(PLAYLIST_CONTAINER)?;
    let marker = parse(PLAYLIST_MARKER)?;
    let links = parse(LINKS)?;

    let container = document
        .select(&container)
        .next()
        .ok_or(ParseError::Structure(PLAYLIST_CONTAINER))?;

    let items = container
        .select(&links)
        .filter_map(|link| {
            let url = base.join(link.value().attr("href")?).ok()?;
            if !is_tab(&url) {
                return None;
            }
            let title = link.text().collect::<Vec<_>>().join(" ");
            Some(ItemRef {
                url: url.to_string(),
                title: collapse(&title),
            })
        })
        .collect::<Vec<_>>();

    if items.is_empty() && container.select(&marker).next().is_none() {
        return Err(ParseError::Structure("playlist table"));
    }

    Ok(items)
}

fn is_tab(url: &Url) -> bool {
    url.host_str() == Some(TAB_HOST) && TAB_PATHS.iter().any(|p| url.path().starts_with(p))
}

pub(crate) fn parse(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}

pub(crate) fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
