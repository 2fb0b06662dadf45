//! Endpoint Probing
//!
//! 원격 엔드포인트가 살아 있고 기대한 네트워크 버전을 쓰는지 확인한다.
//! 실패는 절대 호출자에게 던지지 않고 `ProbeOutcome::Unreachable`로만 표현된다.
//!
//! ## 모듈 구조
//! - `http`: 요청/응답 방식 클라이언트 (`/network` 생존 확인)
//! - `ws`: 지속 연결 클라이언트 (네트워크 버전 = 서브프로토콜)
//! - `prober`: 타임아웃, 병렬 팬아웃, 취소 처리

pub mod http;
pub mod prober;
pub mod ws;

pub use http::{HttpClient, HttpClientFactory};
pub use prober::{Availability, ProbeMode, ProbeOutcome, Prober};
pub use ws::{WsClient, WsClientFactory};

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Transport;
use crate::error::ProbeFailure;

/// 하나의 URL/전송에 묶인 클라이언트 핸들
///
/// 반환된 뒤에는 호출자 소유이며, 열린 소켓을 닫는 것도 호출자 책임이다.
#[async_trait]
pub trait EndpointClient: Send + Sync + fmt::Debug {
    fn url(&self) -> &str;

    fn transport(&self) -> Transport;

    /// 생존/네트워크 정보 왕복 확인
    async fn ping(&self) -> anyhow::Result<bool>;

    async fn close(&self);
}

pub type ClientHandle = Box<dyn EndpointClient>;

/// 전송별 클라이언트 생성기
#[async_trait]
pub trait ClientFactory: Send + Sync {
    fn transport(&self) -> Transport;

    async fn connect(&self, url: &str, network_version: &str) -> Result<ClientHandle, ProbeFailure>;
}

/// 전송 → 클라이언트 팩토리 맵 (생성 시점에 채워짐)
#[derive(Clone, Default)]
pub struct ClientRegistry {
    factories: HashMap<Transport, Arc<dyn ClientFactory>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTTP + 웹소켓 기본 팩토리 등록
    pub fn with_defaults(timeout: Duration) -> Self {
        Self::new()
            .with(Arc::new(HttpClientFactory::new(timeout)))
            .with(Arc::new(WsClientFactory::new(timeout)))
    }

    /// 팩토리 등록 (같은 전송이면 교체)
    pub fn with(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factories.insert(factory.transport(), factory);
        self
    }

    pub fn get(&self, transport: Transport) -> Option<Arc<dyn ClientFactory>> {
        self.factories.get(&transport).cloned()
    }

    pub fn transports(&self) -> Vec<Transport> {
        Transport::ALL
            .into_iter()
            .filter(|t| self.factories.contains_key(t))
            .collect()
    }
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("transports", &self.transports())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_both_transports() {
        let registry = ClientRegistry::with_defaults(Duration::from_secs(1));
        assert_eq!(registry.transports(), vec![Transport::Ws, Transport::Http]);
        assert!(registry.get(Transport::Http).is_some());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ClientRegistry::new();
        assert!(registry.get(Transport::Ws).is_none());
        assert!(registry.transports().is_empty());
    }
}
