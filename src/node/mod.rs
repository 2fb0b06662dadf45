//! 로컬 노드/체인/서버 협력자 인터페이스
//!
//! 실제 P2P 노드, 체인 엔진, 전송 서버 구현은 이 크레이트 밖에 있다.
//! 오케스트레이터는 여기 정의된 트레이트만 호출하고 준비 완료를 기다린다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{LaunchConfig, NetworkIdentifier, Transport};

/// 노드 및 노드 설정 저장소에 넘기는 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub network: String,
    pub stars: Vec<String>,
    pub network_version: String,
}

impl From<&LaunchConfig> for NodeConfig {
    fn from(config: &LaunchConfig) -> Self {
        Self {
            network: config.network().network.clone(),
            stars: config.stars().to_vec(),
            network_version: config.network_version().to_string(),
        }
    }
}

/// 노드에 그대로 전달되는 비밀값 (로그에 노출되지 않음)
#[derive(Clone, Default)]
pub struct NodeSecret(String);

impl NodeSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for NodeSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeSecret(***)")
    }
}

/// 로컬 체인 인스턴스
pub trait Chain: Send + Sync + fmt::Debug {
    fn network(&self) -> &NetworkIdentifier;
}

pub type ChainRef = Arc<dyn Chain>;

/// P2P 노드 생성기 - 반환 시점이 준비 완료 시점
#[async_trait]
pub trait NodeFactory: Send + Sync {
    async fn start(&self, config: &NodeConfig, secret: &NodeSecret) -> anyhow::Result<()>;
}

/// 노드 레벨 설정 영속화
#[async_trait]
pub trait NodeConfigStore: Send + Sync {
    async fn persist(&self, config: &NodeConfig) -> anyhow::Result<()>;
}

/// 체인 생성기 - 반환 시점이 준비 완료 시점
#[async_trait]
pub trait ChainFactory: Send + Sync {
    async fn open(&self, network: &NetworkIdentifier) -> anyhow::Result<ChainRef>;
}

/// 전송 서버 생성기 - 리스닝 시작 후 반환
#[async_trait]
pub trait ServerFactory: Send + Sync {
    fn transport(&self) -> Transport;

    async fn serve(&self, chain: ChainRef, port: u16, network_version: &str) -> anyhow::Result<()>;
}

/// 전송 → 서버 팩토리 맵 (프로세스 시작 시 등록)
#[derive(Clone, Default)]
pub struct ServerRegistry {
    factories: HashMap<Transport, Arc<dyn ServerFactory>>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factory: Arc<dyn ServerFactory>) -> Self {
        self.factories.insert(factory.transport(), factory);
        self
    }

    pub fn get(&self, transport: Transport) -> Option<Arc<dyn ServerFactory>> {
        self.factories.get(&transport).cloned()
    }

    pub fn transports(&self) -> Vec<Transport> {
        Transport::ALL
            .into_iter()
            .filter(|t| self.factories.contains_key(t))
            .collect()
    }
}

impl fmt::Debug for ServerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRegistry")
            .field("transports", &self.transports())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchOptions;

    #[test]
    fn test_node_config_from_launch_config() {
        let config = LaunchConfig::build(LaunchOptions {
            stars: Some(vec!["wss://star.example".to_string()]),
            ..Default::default()
        })
        .unwrap();

        let node = NodeConfig::from(&config);
        assert_eq!(node.network, "leofcoin:peach");
        assert_eq!(node.network_version, "peach");
        assert_eq!(node.stars, vec!["wss://star.example".to_string()]);
    }

    #[test]
    fn test_secret_is_redacted() {
        let secret = NodeSecret::new("hunter2");
        assert_eq!(format!("{:?}", secret), "NodeSecret(***)");
        assert_eq!(secret.expose(), "hunter2");
    }
}
