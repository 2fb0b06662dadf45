//! 런치 결과 조합

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LaunchMode, Transport};
use crate::node::ChainRef;
use crate::probe::ClientHandle;

/// 전송별 도달 가능한 URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub http: Vec<String>,
    pub ws: Vec<String>,
}

impl Endpoints {
    pub fn get(&self, transport: Transport) -> &[String] {
        match transport {
            Transport::Http => &self.http,
            Transport::Ws => &self.ws,
        }
    }

    fn get_mut(&mut self, transport: Transport) -> &mut Vec<String> {
        match transport {
            Transport::Http => &mut self.http,
            Transport::Ws => &mut self.ws,
        }
    }

    pub fn len(&self) -> usize {
        self.http.len() + self.ws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 전송별 클라이언트 핸들 (호출자 소유)
#[derive(Debug, Default)]
pub struct Clients {
    pub http: Vec<ClientHandle>,
    pub ws: Vec<ClientHandle>,
}

impl Clients {
    pub fn get(&self, transport: Transport) -> &[ClientHandle] {
        match transport {
            Transport::Http => &self.http,
            Transport::Ws => &self.ws,
        }
    }

    fn get_mut(&mut self, transport: Transport) -> &mut Vec<ClientHandle> {
        match transport {
            Transport::Http => &mut self.http,
            Transport::Ws => &mut self.ws,
        }
    }

    pub fn len(&self) -> usize {
        self.http.len() + self.ws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 모든 핸들을 닫고 비움
    pub async fn close_all(&mut self) {
        for client in self.ws.drain(..).chain(self.http.drain(..)) {
            client.close().await;
        }
    }
}

/// 원격 프로브 또는 로컬 부트스트랩이 쌓아 가는 중간 결과
#[derive(Debug, Default)]
pub struct Reached {
    endpoints: Endpoints,
    clients: Clients,
}

impl Reached {
    pub fn push(&mut self, transport: Transport, url: String, client: Option<ClientHandle>) {
        self.endpoints.get_mut(transport).push(url);
        if let Some(client) = client {
            self.clients.get_mut(transport).push(client);
        }
    }

    /// 도달한 엔드포인트 수
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// 쌓인 클라이언트 연결을 모두 닫음 (중단 경로용)
    pub async fn close_clients(&mut self) {
        self.clients.close_all().await;
    }
}

/// 런치 최종 결과
///
/// `chain`은 모드가 direct/server일 때만 존재한다.
#[derive(Debug)]
pub struct LaunchResult {
    pub chain: Option<ChainRef>,
    pub mode: LaunchMode,
    pub endpoints: Endpoints,
    pub clients: Clients,
}

impl LaunchResult {
    pub fn is_remote(&self) -> bool {
        self.mode == LaunchMode::Remote
    }

    /// 보유한 모든 클라이언트 연결을 닫고 비움
    pub async fn close_clients(&mut self) {
        self.clients.close_all().await;
    }
}

/// 모드/체인/중간 결과를 최종 결과로 합침 (I/O 없음)
pub fn compose(mode: LaunchMode, chain: Option<ChainRef>, reached: Reached) -> LaunchResult {
    debug_assert_eq!(
        chain.is_some(),
        mode.is_local(),
        "chain must be present exactly for local modes"
    );

    debug!(
        "런치 결과 조합: mode={} ws={} http={} clients={}",
        mode,
        reached.endpoints.ws.len(),
        reached.endpoints.http.len(),
        reached.clients.len()
    );

    LaunchResult {
        chain,
        mode,
        endpoints: reached.endpoints,
        clients: reached.clients,
    }
}
