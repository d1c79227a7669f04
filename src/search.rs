use crate::constants::SHODAN_API_BASE;
use crate::errors::ScanError;
use crate::model::{fold_into_hosts, CameraType, Host, SourceRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Upstream search provider boundary: one result page per call
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_page(
        &self,
        term: &str,
        country: Option<&str>,
        port: Option<u16>,
        page: u32,
    ) -> Result<Vec<SourceRecord>, ScanError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<SourceRecord>,
}

/// Shodan host/search client
pub struct ShodanSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ShodanSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ScanError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            api_key: api_key.into(),
            base_url: SHODAN_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root (tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for ShodanSearch {
    async fn search_page(
        &self,
        term: &str,
        country: Option<&str>,
        port: Option<u16>,
        page: u32,
    ) -> Result<Vec<SourceRecord>, ScanError> {
        let mut query = term.to_lowercase();
        if let Some(port) = port {
            query.push_str(&format!(" port:{}", port));
        }
        if let Some(country) = country {
            query.push_str(&format!(" country:{}", country));
        }

        let url = format!("{}/shodan/host/search", self.base_url);
        let page_param = page.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("query", query.as_str()),
                ("page", page_param.as_str()),
                ("minify", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScanError::Search(format!(
                "search API returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.matches)
    }
}

/// Gather hosts from the provider: page through each configured port (or
/// one unported query when no port list is set). A failing page truncates
/// further paging for that port only; everything gathered so far is kept.
pub async fn gather_hosts(
    provider: &dyn SearchProvider,
    camera_type: &Arc<CameraType>,
    country: Option<&str>,
    ports: Option<&[u16]>,
    pages: u32,
) -> Vec<Host> {
    let mut records = Vec::new();

    let port_slots: Vec<Option<u16>> = match ports {
        Some(list) if !list.is_empty() => list.iter().copied().map(Some).collect(),
        _ => vec![None],
    };

    for port in port_slots {
        for page in 1..=pages.max(1) {
            match provider
                .search_page(&camera_type.search_term, country, port, page)
                .await
            {
                Ok(batch) => records.extend(batch),
                Err(err) => {
                    match port {
                        Some(port) => eprintln!(
                            "Warning: search page {} for port {} failed, stopping that port: {}",
                            page, port, err
                        ),
                        None => eprintln!(
                            "Warning: search page {} failed, stopping paging: {}",
                            page, err
                        ),
                    }
                    break;
                }
            }
        }
    }

    fold_into_hosts(records, camera_type)
}
