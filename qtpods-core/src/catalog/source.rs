//! Fetching pod list documents

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::parse_pod_list;
use crate::pod::Pod;

/// Where pod list documents come from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Whether requests can be attempted at all
    fn is_reachable(&self) -> bool;

    /// Fetch the document published at `url`
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Pods listed by every source in `sources`, in source order.
///
/// A source that cannot be fetched or parsed contributes nothing; the others
/// are still consulted. When the catalog reports itself unreachable no
/// request is made.
pub async fn available_pods(catalog: &dyn CatalogSource, sources: &[String]) -> Vec<Pod> {
    if !catalog.is_reachable() {
        info!("No network connection available");
        return Vec::new();
    }

    let mut pods = Vec::new();
    for url in sources {
        let document = match catalog.fetch(url).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to fetch pod list from {}: {:#}", url, e);
                continue;
            }
        };

        match parse_pod_list(&document) {
            Ok(found) => {
                debug!("{} pods listed by {}", found.len(), url);
                pods.extend(found);
            }
            Err(e) => warn!("Ignoring pod list from {}: {:#}", url, e),
        }
    }

    pods
}

/// A catalog that never reaches the network
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCatalogSource;

#[async_trait]
impl CatalogSource for OfflineCatalogSource {
    fn is_reachable(&self) -> bool {
        false
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        anyhow::bail!("Offline: not fetching {}", url)
    }
}

/// Fetches pod lists over HTTP(S)
#[cfg(feature = "catalog")]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    offline: bool,
}

#[cfg(feature = "catalog")]
impl HttpCatalogSource {
    /// Each request is bounded by `timeout`
    pub fn new(timeout: std::time::Duration, offline: bool) -> Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .user_agent(concat!("qtpods/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, offline })
    }
}

#[cfg(feature = "catalog")]
#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn is_reachable(&self) -> bool {
        !self.offline
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        use anyhow::Context;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {} from {}", response.status(), url);
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned documents; unknown URLs fail like a dead host
    struct Canned {
        reachable: bool,
        documents: HashMap<&'static str, &'static str>,
        requests: AtomicUsize,
    }

    impl Canned {
        fn new(reachable: bool, documents: &[(&'static str, &'static str)]) -> Self {
            Self {
                reachable,
                documents: documents.iter().copied().collect(),
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for Canned {
        fn is_reachable(&self) -> bool {
            self.reachable
        }

        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.documents.get(url) {
                Some(doc) => Ok(doc.to_string()),
                None => anyhow::bail!("connection refused"),
            }
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unreachable_network_makes_no_requests() {
        let catalog = Canned::new(false, &[("https://a/pods.json", r#"{"foo": "u"}"#)]);

        let pods = available_pods(&catalog, &urls(&["https://a/pods.json"])).await;

        assert!(pods.is_empty());
        assert_eq!(catalog.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_sources_are_skipped() {
        let catalog = Canned::new(
            true,
            &[
                ("https://a/pods.json", r#"{"foo": "https://x/foo.git"}"#),
                ("https://b/pods.json", "not json"),
                ("https://d/pods.json", r#"{"bar": {"url": "https://x/bar.git"}}"#),
            ],
        );

        let pods = available_pods(
            &catalog,
            &urls(&[
                "https://a/pods.json",
                "https://b/pods.json",
                "https://c/pods.json",
                "https://d/pods.json",
            ]),
        )
        .await;

        let names: Vec<_> = pods.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["foo", "bar"]);
        assert_eq!(catalog.requests.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_offline_source_yields_nothing() {
        let pods = available_pods(&OfflineCatalogSource, &urls(&["https://a/pods.json"])).await;
        assert!(pods.is_empty());
    }
}
