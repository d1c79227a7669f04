use async_trait::async_trait;
use camscout::errors::ScanError;
use camscout::model::{SourceLocation, SourceRecord};
use camscout::search::{gather_hosts, SearchProvider, ShodanSearch};
use std::sync::atomic::{AtomicUsize, Ordering};
use test_utils::{create_test_type, spawn_http_server, CannedResponse};


/// Provider returning one synthetic record per page, with one scripted
/// failing (port, page) slot
struct ScriptedProvider {
    fail_port: Option<u16>,
    fail_page: u32,
    calls: AtomicUsize,
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    async fn search_page(
        &self,
        _term: &str,
        _country: Option<&str>,
        port: Option<u16>,
        page: u32,
    ) -> Result<Vec<SourceRecord>, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if port == self.fail_port && page == self.fail_page {
            return Err(ScanError::Search("page fetch failed".to_string()));
        }

        Ok(vec![SourceRecord {
            ip_str: format!("10.{}.0.{}", port.map_or(0, |p| p % 250), page),
            port: port.unwrap_or(80),
            location: SourceLocation {
                city: Some("Testville".to_string()),
                country_code: Some("US".to_string()),
            },
        }])
    }
}

#[tokio::test]
async fn page_failure_truncates_only_that_port() {
    let provider = ScriptedProvider {
        fail_port: Some(80),
        fail_page: 2,
        calls: AtomicUsize::new(0),
    };

    let hosts = gather_hosts(
        &provider,
        &create_test_type(),
        Some("US"),
        Some(&[80, 81]),
        3,
    )
    .await;

    // Port 80 kept page 1; port 81 paged all the way through
    assert_eq!(hosts.len(), 4);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn no_port_list_pages_a_single_query() {
    let provider = ScriptedProvider {
        fail_port: None,
        fail_page: u32::MAX,
        calls: AtomicUsize::new(0),
    };

    let hosts = gather_hosts(&provider, &create_test_type(), None, None, 2).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(hosts.len(), 2);
}

/// Provider that keeps reporting the same host on different ports
struct SameHostProvider;

#[async_trait]
impl SearchProvider for SameHostProvider {
    async fn search_page(
        &self,
        _term: &str,
        _country: Option<&str>,
        _port: Option<u16>,
        page: u32,
    ) -> Result<Vec<SourceRecord>, ScanError> {
        Ok(vec![SourceRecord {
            ip_str: "10.0.0.9".to_string(),
            port: 79 + page as u16,
            location: SourceLocation::default(),
        }])
    }
}

#[tokio::test]
async fn results_sharing_an_ip_fold_into_one_host() {
    let hosts = gather_hosts(&SameHostProvider, &create_test_type(), None, None, 2).await;

    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].cameras.len(), 2);
    assert!(hosts[0].has_port(80) && hosts[0].has_port(81));
}

#[tokio::test]
async fn shodan_client_decodes_the_search_endpoint() {
    let server = spawn_http_server(|path| {
        if path.starts_with("/shodan/host/search") {
            Some(CannedResponse::status(200).with_header("Content-Type", "application/json").with_body(
                "{\"matches\":[{\"ip_str\":\"203.0.113.7\",\"port\":8080,\
                 \"location\":{\"city\":\"Sydney\",\"country_code\":\"AU\"},\
                 \"org\":\"Example\"}],\"total\":1}",
            ))
        } else {
            Some(CannedResponse::status(404))
        }
    })
    .await;

    let client = ShodanSearch::new("test-key")
        .unwrap()
        .with_base_url(format!("http://{}", server.addr));

    let records = client
        .search_page("netwave ip camera", Some("AU"), Some(8080), 1)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ip_str, "203.0.113.7");
    assert_eq!(records[0].port, 8080);
    assert_eq!(records[0].location.country_code.as_deref(), Some("AU"));
}

#[tokio::test]
async fn shodan_error_status_is_a_search_error() {
    let server = spawn_http_server(|_| Some(CannedResponse::status(401))).await;

    let client = ShodanSearch::new("bad-key")
        .unwrap()
        .with_base_url(format!("http://{}", server.addr));

    let result = client.search_page("netwave ip camera", None, None, 1).await;
    assert!(matches!(result, Err(ScanError::Search(_))));
}
