use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Transport;
use crate::error::ProbeFailure;
use crate::probe::{ClientFactory, ClientHandle, EndpointClient};

/// 생존 확인에 쓰는 잘 알려진 경로
pub const NETWORK_PATH: &str = "/network";

fn network_url(base: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), NETWORK_PATH)
}

fn classify(err: reqwest::Error, timeout: Duration) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::TimedOut(timeout)
    } else if err.is_builder() {
        ProbeFailure::InvalidUrl(err.to_string())
    } else {
        ProbeFailure::Unreachable(err.to_string())
    }
}

/// HTTP 엔드포인트 클라이언트
#[derive(Debug, Clone)]
pub struct HttpClient {
    url: String,
    client: reqwest::Client,
}

impl HttpClient {
    /// `/network` 응답 본문 (JSON)
    pub async fn network(&self) -> anyhow::Result<serde_json::Value> {
        let response = self
            .client
            .get(network_url(&self.url))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl EndpointClient for HttpClient {
    fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self) -> Transport {
        Transport::Http
    }

    async fn ping(&self) -> anyhow::Result<bool> {
        let response = self.client.get(network_url(&self.url)).send().await?;
        Ok(response.status().is_success())
    }

    async fn close(&self) {
        // 요청마다 연결을 쓰는 방식이라 닫을 소켓이 없음
        debug!("HTTP 클라이언트 해제: {}", self.url);
    }
}

/// HTTP 클라이언트 팩토리
///
/// 연결이 완료된 응답이면 상태 코드와 무관하게 성공으로 본다.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    timeout: Duration,
}

impl HttpClientFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 생존 확인 후 구체 타입 클라이언트 반환
    pub async fn open(&self, url: &str, network_version: &str) -> Result<HttpClient, ProbeFailure> {
        url::Url::parse(url).map_err(|e| ProbeFailure::InvalidUrl(format!("{}: {}", url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProbeFailure::Unreachable(e.to_string()))?;

        let response = client
            .get(network_url(url))
            .send()
            .await
            .map_err(|e| classify(e, self.timeout))?;

        info!(
            "HTTP 엔드포인트 응답: {} ({}, version {})",
            url,
            response.status(),
            network_version
        );

        Ok(HttpClient {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl ClientFactory for HttpClientFactory {
    fn transport(&self) -> Transport {
        Transport::Http
    }

    async fn connect(&self, url: &str, network_version: &str) -> Result<ClientHandle, ProbeFailure> {
        Ok(Box::new(self.open(url, network_version).await?))
    }
}
