use futures::future::join_all;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Transport;
use crate::error::{LaunchError, ProbeFailure};
use crate::probe::{ClientHandle, ClientRegistry};

/// 프로브 결과를 어떻게 쓸지
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// 연결을 클라이언트 핸들로 유지
    Retain,
    /// 생존 여부만 확인하고 즉시 닫음
    Discard,
}

/// 디스크립터 하나의 프로브 결과
#[derive(Debug)]
pub enum ProbeOutcome {
    Reachable(Option<ClientHandle>),
    Unreachable(ProbeFailure),
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable(_))
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            ProbeOutcome::Unreachable(f) => Some(f),
            ProbeOutcome::Reachable(_) => None,
        }
    }

    pub fn into_client(self) -> Option<ClientHandle> {
        match self {
            ProbeOutcome::Reachable(client) => client,
            ProbeOutcome::Unreachable(_) => None,
        }
    }
}

/// 전송별 생존 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Availability {
    pub http: bool,
    pub ws: bool,
}

/// 엔드포인트 프로버
///
/// 모든 시도는 타임아웃으로 제한되며 어떤 실패도 `Err`로 올라가지 않는다.
/// 예외는 취소뿐이다.
#[derive(Debug, Clone)]
pub struct Prober {
    clients: ClientRegistry,
    timeout: Duration,
}

impl Prober {
    pub fn new(clients: ClientRegistry, timeout: Duration) -> Self {
        Self { clients, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 단일 URL 프로브
    pub async fn probe(
        &self,
        transport: Transport,
        url: &str,
        network_version: &str,
        mode: ProbeMode,
    ) -> ProbeOutcome {
        let Some(factory) = self.clients.get(transport) else {
            warn!("{} 클라이언트 팩토리 미등록, 프로브 생략: {}", transport, url);
            return ProbeOutcome::Unreachable(ProbeFailure::Unreachable(format!(
                "no client factory registered for {}",
                transport
            )));
        };

        let attempt = tokio::time::timeout(self.timeout, factory.connect(url, network_version)).await;

        let outcome = match attempt {
            Ok(Ok(client)) => match mode {
                ProbeMode::Retain => ProbeOutcome::Reachable(Some(client)),
                ProbeMode::Discard => {
                    if tokio::time::timeout(self.timeout, client.close()).await.is_err() {
                        warn!("프로브 연결 종료 타임아웃: {}", url);
                    }
                    ProbeOutcome::Reachable(None)
                }
            },
            Ok(Err(failure)) => ProbeOutcome::Unreachable(failure),
            Err(_) => ProbeOutcome::Unreachable(ProbeFailure::TimedOut(self.timeout)),
        };

        match outcome.failure() {
            None => info!("✅ {} 엔드포인트 도달: {}", transport, url),
            Some(failure) if matches!(failure, ProbeFailure::ProtocolMismatch(_)) => {
                warn!("{} 엔드포인트 {} 버전 불일치 [{}]: {}", transport, url, failure.kind(), failure)
            }
            Some(failure) => {
                debug!("{} 엔드포인트 {} 도달 불가 [{}]: {}", transport, url, failure.kind(), failure)
            }
        }

        outcome
    }

    /// 생존 여부만 확인 (연결은 남기지 않음)
    pub async fn is_live(&self, transport: Transport, url: &str, network_version: &str) -> bool {
        self.probe(transport, url, network_version, ProbeMode::Discard)
            .await
            .is_reachable()
    }

    /// HTTP/웹소켓 엔드포인트 쌍을 동시에 확인
    pub async fn has_client(&self, http_url: &str, ws_url: &str, network_version: &str) -> Availability {
        let (ws, http) = tokio::join!(
            self.is_live(Transport::Ws, ws_url, network_version),
            self.is_live(Transport::Http, http_url, network_version),
        );
        Availability { http, ws }
    }

    /// URL 목록을 병렬로 프로브 (결과는 입력 순서 유지)
    ///
    /// 취소 토큰이 발동하면 진행 중인 프로브를 버리고 `Cancelled`를 돌려준다.
    pub async fn probe_all(
        &self,
        transport: Transport,
        urls: &[String],
        network_version: &str,
        mode: ProbeMode,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, ProbeOutcome)>, LaunchError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let probes = urls.iter().map(|url| async move {
            let outcome = self.probe(transport, url, network_version, mode).await;
            (url.clone(), outcome)
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("{} 프로브 취소됨 ({}개 대기 중)", transport, urls.len());
                Err(LaunchError::Cancelled)
            }
            outcomes = join_all(probes) => Ok(outcomes),
        }
    }
}
