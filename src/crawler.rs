// Same-host crawler for csrfprobe
// Breadth-first discovery of pages and the forms they contain

use std::collections::HashSet;
use std::sync::Arc;

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use crate::config::RequestConfig;
use crate::engine::Requester;
use crate::errors::AuditResult;
use crate::forms::parse_forms;
use crate::models::{CrawlResult, HttpReply};

lazy_static! {
    static ref LINK_SEL: Selector = Selector::parse("a[href]").unwrap();
}

pub struct Crawler {
    /// Number of page levels to fetch; the start page is level one.
    pub levels: usize,
    /// Simultaneous requests per batch.
    pub threads: usize,
}

impl Crawler {
    pub fn new(levels: usize, threads: usize) -> Self {
        Self {
            levels: levels.max(1),
            threads: threads.max(1),
        }
    }

    /// Crawl from `start`, staying on its host.
    ///
    /// Pages that fail to load are logged and skipped.
    pub async fn crawl(
        &self,
        requester: Arc<dyn Requester>,
        start: &str,
        config: &RequestConfig,
    ) -> AuditResult<CrawlResult> {
        let start_url = Url::parse(start)?;
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier = vec![start_url.clone()];
        let mut result = CrawlResult::default();

        for level in 0..self.levels {
            let batch: Vec<Url> = frontier
                .drain(..)
                .filter(|u| visited.insert(u.to_string()))
                .collect();
            if batch.is_empty() {
                break;
            }
            debug!(level, pages = batch.len(), "crawling level");

            let mut next = Vec::new();
            for chunk in batch.chunks(self.threads) {
                for (url, fetched) in fetch_all(&requester, chunk, config).await {
                    let reply = match fetched {
                        Ok(reply) => reply,
                        Err(e) => {
                            warn!(url = %url, error = %e, "skipping page");
                            continue;
                        }
                    };

                    let forms = parse_forms(url.as_str(), &reply.body);
                    if !forms.is_empty() {
                        result.forms_by_url.push((url.to_string(), forms));
                    }
                    next.extend(
                        extract_links(&url, &reply.body)
                            .into_iter()
                            .filter(|link| link.host_str() == start_url.host_str())
                            .filter(|link| !visited.contains(link.as_str())),
                    );
                }
            }
            frontier = next;
        }

        result.urls_visited = visited.len();
        Ok(result)
    }
}

/// Fetch a chunk concurrently, returning replies in request order.
async fn fetch_all(
    requester: &Arc<dyn Requester>,
    urls: &[Url],
    config: &RequestConfig,
) -> Vec<(Url, AuditResult<HttpReply>)> {
    let mut tasks = JoinSet::new();
    for (index, url) in urls.iter().cloned().enumerate() {
        let requester = Arc::clone(requester);
        let config = config.clone();
        tasks.spawn(async move {
            let reply = requester
                .request(url.as_str(), &Default::default(), &config, true)
                .await;
            (index, url, reply)
        });
    }

    let mut fetched = Vec::with_capacity(urls.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(entry) => fetched.push(entry),
            Err(e) => warn!(error = %e, "crawl task aborted"),
        }
    }
    fetched.sort_by_key(|(index, _, _)| *index);
    fetched.into_iter().map(|(_, url, reply)| (url, reply)).collect()
}

/// Absolute http(s) links of a page, fragments stripped.
pub fn extract_links(page: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    document
        .select(&LINK_SEL)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page.join(href).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .map(|mut u| {
            u.set_fragment(None);
            u
        })
        .collect()
}
