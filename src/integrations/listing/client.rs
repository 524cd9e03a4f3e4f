// src/integrations/listing/client.rs
//
// HTTP listing fetcher.
//
// PAGE POLICY:
// - Pages are read sequentially from 1 up to `max_pages`
// - Page 1 failing (transport, status, or zero parsed entries) fails the fetch
// - A later page failing is logged, counted, and skipped
// - A later page answering 404, or with zero entries, ends pagination
// - Entries are deduplicated across pages by natural key; first sighting wins

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Url};

use super::parser::ListingParser;
use crate::domain::{NaturalKey, RawListingEntry};
use crate::error::{AppError, AppResult};
use crate::integrations::error::FetchError;
use crate::integrations::traits::{FetchedListing, ListingFetcher};

const PAGE_PLACEHOLDER: &str = "{page}";

pub struct HttpListingFetcher {
    http_client: Client,
    url_template: String,
    max_pages: u32,
    parser: Arc<dyn ListingParser>,
}

impl HttpListingFetcher {
    pub fn new(
        url_template: impl Into<String>,
        max_pages: u32,
        user_agent: &str,
        timeout: Duration,
        parser: Arc<dyn ListingParser>,
    ) -> AppResult<Self> {
        let url_template = url_template.into();
        if !url_template.contains(PAGE_PLACEHOLDER) {
            return Err(AppError::Config(format!(
                "Listing URL template must contain {}: {}",
                PAGE_PLACEHOLDER, url_template
            )));
        }
        if max_pages == 0 {
            return Err(AppError::Config("listing.max_pages must be at least 1".to_string()));
        }

        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            url_template,
            max_pages,
            parser,
        })
    }

    pub fn page_url(&self, page: u32) -> String {
        self.url_template.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<RawListingEntry>, FetchError> {
        let url = self.page_url(page);

        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| FetchError::Unreachable {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Unreachable {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        self.parser.parse(&body, page)
    }
}

/// Scheme and host of a listing URL template, used to absolutize relative links.
pub fn base_url_of(url_template: &str) -> AppResult<String> {
    let sample = url_template.replace(PAGE_PLACEHOLDER, "1");
    let url = Url::parse(&sample)
        .map_err(|e| AppError::Config(format!("Invalid listing URL {}: {}", sample, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| AppError::Config(format!("Listing URL has no host: {}", sample)))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

#[async_trait]
impl ListingFetcher for HttpListingFetcher {
    async fn fetch(&self) -> Result<FetchedListing, FetchError> {
        let mut listing = FetchedListing::default();
        let mut seen = HashSet::new();

        for page in 1..=self.max_pages {
            let entries = match self.fetch_page(page).await {
                Ok(entries) => entries,
                Err(e) if page == 1 => return Err(e),
                Err(FetchError::Status { status: 404, .. }) => {
                    log::debug!("Listing page {} not found; stopping", page);
                    break;
                }
                Err(e) => {
                    log::warn!("Skipping listing page {}: {}", page, e);
                    listing.pages_failed += 1;
                    continue;
                }
            };

            if entries.is_empty() {
                if page == 1 {
                    return Err(FetchError::UnexpectedLayout {
                        url: self.page_url(page),
                    });
                }
                log::debug!("Listing page {} is empty; stopping", page);
                break;
            }

            listing.pages_fetched += 1;
            let before = listing.entries.len();
            merge_page(&mut listing.entries, &mut seen, entries);
            log::debug!(
                "Listing page {}: {} new entries",
                page,
                listing.entries.len() - before
            );
        }

        log::info!(
            "Fetched {} listing entries from {} pages ({} failed)",
            listing.entries.len(),
            listing.pages_fetched,
            listing.pages_failed
        );

        Ok(listing)
    }
}

fn merge_page(
    entries: &mut Vec<RawListingEntry>,
    seen: &mut HashSet<NaturalKey>,
    page_entries: Vec<RawListingEntry>,
) {
    for entry in page_entries {
        if seen.insert(entry.natural_key()) {
            entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::listing::parser::CuevanaParser;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fetcher(template: &str, max_pages: u32) -> AppResult<HttpListingFetcher> {
        let parser = Arc::new(CuevanaParser::new("https://cuevana.biz").unwrap());
        HttpListingFetcher::new(template, max_pages, "kuhaku-test", Duration::from_secs(5), parser)
    }

    #[test]
    fn test_page_url_substitutes_placeholder() {
        let f = fetcher("https://cuevana.biz/peliculas/page/{page}", 3).unwrap();
        assert_eq!(f.page_url(2), "https://cuevana.biz/peliculas/page/2");
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        assert!(matches!(
            fetcher("https://cuevana.biz/peliculas", 3),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            fetcher("https://cuevana.biz/peliculas/page/{page}", 0),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_base_url_of_template() {
        assert_eq!(
            base_url_of("https://cuevana.biz/peliculas/page/{page}").unwrap(),
            "https://cuevana.biz"
        );
        assert_eq!(
            base_url_of("http://localhost:8080/list?p={page}").unwrap(),
            "http://localhost:8080"
        );
        assert!(base_url_of("not a url {page}").is_err());
    }

    #[test]
    fn test_merge_keeps_first_sighting_across_pages() {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        let mut first = RawListingEntry::new("Up", "https://cuevana.biz/pelicula/up");
        first.page = 1;
        merge_page(&mut entries, &mut seen, vec![first]);

        let mut again = RawListingEntry::new(" UP ", "https://cuevana.biz/pelicula/up/");
        again.page = 2;
        let other = RawListingEntry::new("Inception", "https://cuevana.biz/pelicula/inception");
        merge_page(&mut entries, &mut seen, vec![again, other]);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Up");
        assert_eq!(entries[0].page, 1);
        assert_eq!(entries[1].title, "Inception");
    }

    // Local listing site: `pages[n - 1]` answers /page/n, anything else is 404.
    async fn serve_pages(pages: Vec<(u16, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let pages = Arc::new(pages);

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let pages = Arc::clone(&pages);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let page = path
                        .rsplit('/')
                        .next()
                        .and_then(|n| n.parse::<usize>().ok())
                        .filter(|n| *n >= 1);
                    let (status, body) = page
                        .and_then(|n| pages.get(n - 1).cloned())
                        .unwrap_or((404, String::new()));

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}/page/{{page}}", addr)
    }

    fn cards(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|t| {
                format!(
                    r#"<li><div class="TPost"><a href="/pelicula/{0}"><h2 class="Title">{0}</h2></a></div></li>"#,
                    t
                )
            })
            .collect();
        format!(r#"<html><body><ul class="MovieList">{}</ul></body></html>"#, items)
    }

    fn stub_fetcher(template: &str, max_pages: u32) -> HttpListingFetcher {
        let parser = CuevanaParser::new(base_url_of(template).unwrap()).unwrap();
        HttpListingFetcher::new(
            template,
            max_pages,
            "kuhaku-test",
            Duration::from_secs(5),
            Arc::new(parser),
        )
        .unwrap()
    }

    fn titles(listing: &FetchedListing) -> Vec<&str> {
        listing.entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_skips_failed_page_and_stops_at_not_found() {
        let template = serve_pages(vec![
            (200, cards(&["A"])),
            (500, String::new()),
            (200, cards(&["C"])),
        ])
        .await;

        let listing = stub_fetcher(&template, 5).fetch().await.unwrap();

        assert_eq!(titles(&listing), vec!["A", "C"]);
        assert_eq!(listing.pages_fetched, 2);
        assert_eq!(listing.pages_failed, 1);
        assert_eq!(listing.entries[1].page, 3);
    }

    #[tokio::test]
    async fn test_fetch_stops_at_empty_page() {
        let template = serve_pages(vec![
            (200, cards(&["A", "B"])),
            (200, cards(&[])),
            (200, cards(&["C"])),
        ])
        .await;

        let listing = stub_fetcher(&template, 5).fetch().await.unwrap();

        assert_eq!(titles(&listing), vec!["A", "B"]);
        assert_eq!(listing.pages_fetched, 1);
        assert_eq!(listing.pages_failed, 0);
    }

    #[tokio::test]
    async fn test_fetch_respects_max_pages_and_dedups() {
        let template = serve_pages(vec![
            (200, cards(&["A", "B"])),
            (200, cards(&["B", "C"])),
            (200, cards(&["D"])),
        ])
        .await;

        let listing = stub_fetcher(&template, 2).fetch().await.unwrap();

        assert_eq!(titles(&listing), vec!["A", "B", "C"]);
        assert_eq!(listing.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_first_page_failure_aborts_fetch() {
        let template = serve_pages(vec![(503, String::new())]).await;
        let err = stub_fetcher(&template, 5).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));

        let template = serve_pages(vec![]).await;
        let err = stub_fetcher(&template, 5).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        let template = serve_pages(vec![(200, "<html><p>maintenance</p></html>".to_string())]).await;
        let err = stub_fetcher(&template, 5).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedLayout { .. }));
    }
}
