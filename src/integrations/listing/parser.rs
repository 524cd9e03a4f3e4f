// src/integrations/listing/parser.rs
//
// Site-specific listing parsers.
//
// Markup changes on the listing site should only ever require changes here:
// the fetcher deals with pages and HTTP, the parser with HTML.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domain::RawListingEntry;
use crate::integrations::error::FetchError;

pub trait ListingParser: Send + Sync {
    /// Extract entries from one listing page.
    /// An empty result means "no entries on this page", not an error.
    fn parse(&self, html: &str, page: u32) -> Result<Vec<RawListingEntry>, FetchError>;
}

/// Parser for Cuevana movie grids:
///
/// ```text
/// <ul class="MovieList">
///   <li><div class="TPost">
///     <a href="/pelicula/inception"><img data-src="…"><h2 class="Title">Inception</h2></a>
///     <span class="Year">2010</span>
///     <div class="Description"><p>…</p></div>
///   </div></li>
/// </ul>
/// ```
pub struct CuevanaParser {
    base_url: String,
    item: Selector,
    title: Selector,
    link: Selector,
    image: Selector,
    year: Selector,
    overview: Selector,
    year_pattern: Regex,
}

impl CuevanaParser {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            item: selector(".MovieList li .TPost")?,
            title: selector(".Title")?,
            link: selector("a[href]")?,
            image: selector("img")?,
            year: selector(".Year")?,
            overview: selector(".Description p")?,
            year_pattern: Regex::new(r"\b(19|20)\d{2}\b")
                .map_err(|e| FetchError::Parser(e.to_string()))?,
        })
    }

    fn parse_item(&self, item: ElementRef<'_>, page: u32) -> Option<RawListingEntry> {
        let title = item
            .select(&self.title)
            .next()
            .map(|el| collapse_text(el))
            .filter(|t| !t.is_empty())?;

        let href = item
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|h| !h.is_empty() && !h.starts_with('#'))?;

        let poster = item.select(&self.image).next().and_then(|img| {
            img.value()
                .attr("data-src")
                .or_else(|| img.value().attr("src"))
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.starts_with("data:"))
                .map(|s| self.absolute(s))
        });

        let overview = item
            .select(&self.overview)
            .next()
            .map(|el| collapse_text(el))
            .filter(|t| !t.is_empty());

        let year = item
            .select(&self.year)
            .next()
            .map(|el| collapse_text(el))
            .and_then(|text| {
                self.year_pattern
                    .find(&text)
                    .and_then(|m| m.as_str().parse::<i32>().ok())
            });

        Some(RawListingEntry {
            title,
            link: self.absolute(href),
            poster,
            overview,
            year,
            page,
        })
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if let Some(rest) = href.strip_prefix("//") {
            format!("https://{}", rest)
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}

impl ListingParser for CuevanaParser {
    fn parse(&self, html: &str, page: u32) -> Result<Vec<RawListingEntry>, FetchError> {
        let doc = Html::parse_document(html);

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for item in doc.select(&self.item) {
            match self.parse_item(item, page) {
                Some(entry) => entries.push(entry),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("Listing page {}: skipped {} cards without title or link", page, skipped);
        }

        Ok(entries)
    }
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parser(format!("{}: {}", css, e)))
}

fn collapse_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
