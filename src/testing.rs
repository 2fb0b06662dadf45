//! 테스트용 협력자 페이크

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{NetworkIdentifier, Transport};
use crate::error::ProbeFailure;
use crate::node::{Chain, ChainFactory, ChainRef, NodeConfig, NodeConfigStore, NodeFactory, NodeSecret, ServerFactory};
use crate::probe::{ClientFactory, ClientHandle, EndpointClient};

/// 현재 응답하는 URL 집합 (서버 페이크가 시작 시 추가)
#[derive(Debug, Clone, Default)]
pub struct Liveness(Arc<Mutex<HashSet<String>>>);

impl Liveness {
    pub fn with(urls: &[&str]) -> Self {
        let live = Self::default();
        for url in urls {
            live.add(url);
        }
        live
    }

    pub fn add(&self, url: &str) {
        self.0.lock().unwrap().insert(url.to_string());
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.lock().unwrap().contains(url)
    }
}

#[derive(Debug)]
pub struct FakeClient {
    url: String,
    transport: Transport,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl EndpointClient for FakeClient {
    fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self) -> Transport {
        self.transport
    }

    async fn ping(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeClientFactory {
    transport: Transport,
    live: Liveness,
    delay: Option<Duration>,
    url_delays: HashMap<String, Duration>,
    closed: Arc<AtomicUsize>,
    attempts: Arc<Mutex<Vec<String>>>,
}

impl FakeClientFactory {
    pub fn new(transport: Transport, live: Liveness) -> Self {
        Self {
            transport,
            live,
            delay: None,
            url_delays: HashMap::new(),
            closed: Arc::new(AtomicUsize::new(0)),
            attempts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_url_delay(mut self, url: &str, delay: Duration) -> Self {
        self.url_delays.insert(url.to_string(), delay);
        self
    }

    pub fn closed_counter(&self) -> Arc<AtomicUsize> {
        self.closed.clone()
    }

    pub fn attempts(&self) -> Arc<Mutex<Vec<String>>> {
        self.attempts.clone()
    }
}

#[async_trait]
impl ClientFactory for FakeClientFactory {
    fn transport(&self) -> Transport {
        self.transport
    }

    async fn connect(&self, url: &str, _network_version: &str) -> Result<ClientHandle, ProbeFailure> {
        self.attempts.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.url_delays.get(url).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        if !self.live.contains(url) {
            return Err(ProbeFailure::Unreachable(format!("connection refused: {}", url)));
        }

        Ok(Box::new(FakeClient {
            url: url.to_string(),
            transport: self.transport,
            closed: self.closed.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct FakeChain {
    network: NetworkIdentifier,
}

impl Chain for FakeChain {
    fn network(&self) -> &NetworkIdentifier {
        &self.network
    }
}

/// 노드/설정 저장소/체인을 한데 묶은 페이크 (호출 순서 기록)
#[derive(Clone, Default)]
pub struct FakeLocal {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub node_configs: Arc<Mutex<Vec<NodeConfig>>>,
    pub secrets: Arc<Mutex<Vec<String>>>,
    pub fail_node: bool,
    pub fail_chain: bool,
    pub chain_delay: Option<Duration>,
}

impl FakeLocal {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NodeFactory for FakeLocal {
    async fn start(&self, config: &NodeConfig, secret: &NodeSecret) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push("node".to_string());
        if self.fail_node {
            anyhow::bail!("peer overlay refused to start");
        }
        self.node_configs.lock().unwrap().push(config.clone());
        self.secrets.lock().unwrap().push(secret.expose().to_string());
        Ok(())
    }
}

#[async_trait]
impl NodeConfigStore for FakeLocal {
    async fn persist(&self, config: &NodeConfig) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push("node-config".to_string());
        self.node_configs.lock().unwrap().push(config.clone());
        Ok(())
    }
}

#[async_trait]
impl ChainFactory for FakeLocal {
    async fn open(&self, network: &NetworkIdentifier) -> anyhow::Result<ChainRef> {
        self.calls.lock().unwrap().push("chain".to_string());
        if let Some(delay) = self.chain_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_chain {
            anyhow::bail!("chain database locked");
        }
        Ok(Arc::new(FakeChain {
            network: network.clone(),
        }))
    }
}

/// 시작하면 `{scheme}://localhost:{port}`를 살아 있는 URL로 등록하는 서버 페이크
pub struct FakeServerFactory {
    transport: Transport,
    live: Liveness,
    fail_ports: HashSet<u16>,
    started: Arc<Mutex<Vec<u16>>>,
    calls: Option<Arc<Mutex<Vec<String>>>>,
}

impl FakeServerFactory {
    pub fn new(transport: Transport, live: Liveness) -> Self {
        Self {
            transport,
            live,
            fail_ports: HashSet::new(),
            started: Arc::new(Mutex::new(Vec::new())),
            calls: None,
        }
    }

    pub fn failing_on(mut self, port: u16) -> Self {
        self.fail_ports.insert(port);
        self
    }

    /// 호출 순서를 공유 로그에 기록
    pub fn recording(mut self, calls: Arc<Mutex<Vec<String>>>) -> Self {
        self.calls = Some(calls);
        self
    }

    pub fn started(&self) -> Arc<Mutex<Vec<u16>>> {
        self.started.clone()
    }
}

#[async_trait]
impl ServerFactory for FakeServerFactory {
    fn transport(&self) -> Transport {
        self.transport
    }

    async fn serve(&self, _chain: ChainRef, port: u16, _network_version: &str) -> anyhow::Result<()> {
        if let Some(calls) = &self.calls {
            calls.lock().unwrap().push(format!("{}:{}", self.transport, port));
        }
        if self.fail_ports.contains(&port) {
            anyhow::bail!("address already in use: {}", port);
        }
        self.started.lock().unwrap().push(port);
        self.live
            .add(&format!("{}://localhost:{}", self.transport.scheme(), port));
        Ok(())
    }
}
