use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{info, instrument};

use crate::dto::hh_dto::ListingPage;
use crate::error::{Error, Result};

/// Pages requested per employer. Listings past `MAX_PAGES * PER_PAGE` are
/// not fetched, even when the service reports more matches.
pub const MAX_PAGES: u32 = 5;
pub const PER_PAGE: u32 = 100;
pub const MAX_LISTINGS: u32 = MAX_PAGES * PER_PAGE;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// All raw listing records of one employer, in page order.
    async fn fetch_all_pages(&self, employer_id: u32) -> Result<Vec<JsonValue>>;
}

#[derive(Clone)]
pub struct HhService {
    client: Client,
    base_url: url::Url,
}

impl HhService {
    pub fn new(client: Client, base_url: url::Url) -> Self {
        Self { client, base_url }
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.hh_user_agent.clone())
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        Ok(Self::new(client, config.hh_api_url.clone()))
    }

    pub async fn fetch_page(&self, employer_id: u32, page: u32) -> Result<Vec<JsonValue>> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&page_query(employer_id, page))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TransportStatus {
                status,
                url: response.url().to_string(),
            });
        }

        let page = response.json::<ListingPage>().await?;
        Ok(page.items)
    }
}

#[async_trait]
impl ListingSource for HhService {
    #[instrument(skip(self))]
    async fn fetch_all_pages(&self, employer_id: u32) -> Result<Vec<JsonValue>> {
        if employer_id == 0 {
            return Err(Error::InvalidInput(
                "employer id must be a positive integer".to_string(),
            ));
        }

        let mut records = Vec::new();
        for page in 0..MAX_PAGES {
            let items = self.fetch_page(employer_id, page).await?;
            info!(employer_id, page = page + 1, found = items.len(), "Fetched listing page");
            records.extend(items);
        }
        Ok(records)
    }
}

fn page_query(employer_id: u32, page: u32) -> [(&'static str, String); 3] {
    [
        ("employer_id", employer_id.to_string()),
        ("page", page.to_string()),
        ("per_page", PER_PAGE.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers each request with two items tagged with the requested page,
    /// or 503 for `fail_on`. Returns the base URL and the request lines seen.
    async fn serve_pages(fail_on: Option<u32>) -> (url::Url, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/vacancies", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap();
                    read += n;
                    if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]).to_string();
                let request_line = request.lines().next().unwrap_or_default().to_string();
                let page: u32 = request_line
                    .split(['?', '&', ' '])
                    .find_map(|part| part.strip_prefix("page="))
                    .and_then(|v| v.parse().ok())
                    .unwrap();
                seen.lock().unwrap().push(request_line);

                let (status, body) = if fail_on == Some(page) {
                    ("503 Service Unavailable", "{}".to_string())
                } else {
                    ("200 OK", format!(r#"{{"items":[{{"p":{0}}},{{"p":{0}}}]}}"#, page))
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });

        (url::Url::parse(&base).unwrap(), requests)
    }

    fn service(base: &str) -> HhService {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        HhService::new(client, url::Url::parse(base).unwrap())
    }

    #[test]
    fn scan_is_bounded_to_five_hundred_listings() {
        assert_eq!(MAX_LISTINGS, 500);
    }

    #[test]
    fn page_query_uses_service_parameter_names() {
        let query = page_query(3776, 4);
        assert_eq!(query[0], ("employer_id", "3776".to_string()));
        assert_eq!(query[1], ("page", "4".to_string()));
        assert_eq!(query[2], ("per_page", "100".to_string()));
    }

    #[tokio::test]
    async fn zero_employer_id_is_rejected_before_any_request() {
        let err = service("http://127.0.0.1:9/vacancies")
            .fetch_all_pages(0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let err = service("http://127.0.0.1:9/vacancies")
            .fetch_all_pages(3776)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn fetches_five_pages_in_order() {
        let (base, requests) = serve_pages(None).await;

        let records = HhService::new(Client::new(), base)
            .fetch_all_pages(3776)
            .await
            .unwrap();

        let pages: Vec<u64> = records.iter().map(|r| r["p"].as_u64().unwrap()).collect();
        assert_eq!(pages, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 5);
        for (page, line) in requests.iter().enumerate() {
            assert!(line.starts_with("GET /vacancies?"));
            assert!(line.contains("employer_id=3776"));
            assert!(line.contains(&format!("&page={}&", page)));
            assert!(line.contains("per_page=100"));
        }
    }

    #[tokio::test]
    async fn failing_page_fails_the_whole_employer() {
        let (base, requests) = serve_pages(Some(2)).await;

        let err = HhService::new(Client::new(), base)
            .fetch_all_pages(3776)
            .await
            .unwrap_err();

        match err {
            Error::TransportStatus { status, .. } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("expected a status error, got {:?}", other),
        }
        assert_eq!(requests.lock().unwrap().len(), 3);
    }
}
