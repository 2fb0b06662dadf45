//! Launch Orchestrator
//!
//! 원격 인스턴스에 붙을지(remote), 로컬 노드를 띄워 직접 노출할지(direct/server)
//! 결정하고 하나의 결과 핸들로 돌려준다.
//!
//! 흐름: URL 해석 → 전송별 프로브 → 모드 선택 → (로컬이면) 부트스트랩 → 결과 조합

pub mod local;
pub mod result;
pub mod selector;


pub use local::LocalBootstrap;
pub use result::{compose, Clients, Endpoints, LaunchResult, Reached};
pub use selector::{select_mode, should_probe, ModeDecision};

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{LaunchConfig, LaunchMode, LaunchOptions, Transport};
use crate::error::LaunchError;
use crate::node::{ChainFactory, NodeConfigStore, NodeFactory, NodeSecret, ServerFactory, ServerRegistry};
use crate::probe::{ClientRegistry, ProbeMode, Prober};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(30);

/// 런처 - 레지스트리와 협력자를 들고 런치 호출을 처리
pub struct Launcher {
    prober: Prober,
    servers: ServerRegistry,
    node: Option<Arc<dyn NodeFactory>>,
    node_config: Option<Arc<dyn NodeConfigStore>>,
    chain: Option<Arc<dyn ChainFactory>>,
    bootstrap_timeout: Duration,
}

impl Launcher {
    pub fn builder() -> LauncherBuilder {
        LauncherBuilder::default()
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    /// 오버라이드를 기본값에 병합한 뒤 런치
    pub async fn launch_with(
        &self,
        options: LaunchOptions,
        secret: NodeSecret,
        cancel: &CancellationToken,
    ) -> Result<LaunchResult, LaunchError> {
        let config = LaunchConfig::build(options)?;
        self.launch(&config, &secret, cancel).await
    }

    pub async fn launch(
        &self,
        config: &LaunchConfig,
        secret: &NodeSecret,
        cancel: &CancellationToken,
    ) -> Result<LaunchResult, LaunchError> {
        let hint = config.mode();
        info!(
            "🚀 런치 시작: network={} version={} mode={}",
            config.network().network,
            config.network_version(),
            hint.map(|m| m.to_string()).unwrap_or_else(|| "auto".to_string())
        );

        let reached = if should_probe(hint) {
            self.probe_remotes(config, cancel).await?
        } else {
            info!("명시적 로컬 모드, 원격 프로브 생략");
            Reached::default()
        };

        match select_mode(hint, config.force_remote(), reached.len()) {
            ModeDecision::Remote => {
                info!("🔗 원격 모드: {}개 엔드포인트 연결됨", reached.len());
                Ok(compose(LaunchMode::Remote, None, reached))
            }
            ModeDecision::Fail(err) => {
                error!("런치 실패: {}", err);
                Err(err)
            }
            ModeDecision::Local(mode) => {
                if hint.is_none() {
                    warn!("도달 가능한 원격 없음, 로컬 {} 모드로 전환", mode);
                }
                let bootstrap = self.local_bootstrap()?;
                let (chain, served) = bootstrap.run(config, secret, mode, cancel).await?;
                info!("🎉 로컬 {} 모드 준비 완료: {}개 엔드포인트", mode, served.len());
                Ok(compose(mode, Some(chain), served))
            }
        }
    }

    /// 설정된 모든 원격 엔드포인트 프로브 (전송끼리도 동시에)
    async fn probe_remotes(&self, config: &LaunchConfig, cancel: &CancellationToken) -> Result<Reached, LaunchError> {
        let version = config.network_version();
        let ws_urls = config.urls(Transport::Ws);
        let http_urls = config.urls(Transport::Http);

        let (ws, http) = tokio::try_join!(
            self.prober
                .probe_all(Transport::Ws, &ws_urls, version, ProbeMode::Retain, cancel),
            self.prober
                .probe_all(Transport::Http, &http_urls, version, ProbeMode::Retain, cancel),
        )?;

        let mut reached = Reached::default();
        for (transport, outcomes) in [(Transport::Ws, ws), (Transport::Http, http)] {
            for (url, outcome) in outcomes {
                if outcome.is_reachable() {
                    reached.push(transport, url, outcome.into_client());
                }
            }
        }

        Ok(reached)
    }

    fn local_bootstrap(&self) -> Result<LocalBootstrap<'_>, LaunchError> {
        let missing = |what: &str| LaunchError::config(format!("local bootstrap requires a {}", what));

        Ok(LocalBootstrap {
            node: self.node.as_deref().ok_or_else(|| missing("node factory"))?,
            node_config: self
                .node_config
                .as_deref()
                .ok_or_else(|| missing("node config store"))?,
            chain: self.chain.as_deref().ok_or_else(|| missing("chain factory"))?,
            servers: &self.servers,
            prober: &self.prober,
            timeout: self.bootstrap_timeout,
        })
    }
}

/// 런처 빌더
pub struct LauncherBuilder {
    clients: Option<ClientRegistry>,
    servers: ServerRegistry,
    node: Option<Arc<dyn NodeFactory>>,
    node_config: Option<Arc<dyn NodeConfigStore>>,
    chain: Option<Arc<dyn ChainFactory>>,
    probe_timeout: Duration,
    bootstrap_timeout: Duration,
}

impl Default for LauncherBuilder {
    fn default() -> Self {
        Self {
            clients: None,
            servers: ServerRegistry::new(),
            node: None,
            node_config: None,
            chain: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            bootstrap_timeout: DEFAULT_BOOTSTRAP_TIMEOUT,
        }
    }
}

impl LauncherBuilder {
    /// 클라이언트 팩토리 교체 (기본: HTTP + 웹소켓)
    pub fn clients(mut self, clients: ClientRegistry) -> Self {
        self.clients = Some(clients);
        self
    }

    pub fn server(mut self, factory: Arc<dyn ServerFactory>) -> Self {
        self.servers = self.servers.with(factory);
        self
    }

    pub fn node(mut self, node: Arc<dyn NodeFactory>) -> Self {
        self.node = Some(node);
        self
    }

    pub fn node_config(mut self, store: Arc<dyn NodeConfigStore>) -> Self {
        self.node_config = Some(store);
        self
    }

    pub fn chain(mut self, chain: Arc<dyn ChainFactory>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn bootstrap_timeout(mut self, timeout: Duration) -> Self {
        self.bootstrap_timeout = timeout;
        self
    }

    pub fn build(self) -> Launcher {
        let clients = self
            .clients
            .unwrap_or_else(|| ClientRegistry::with_defaults(self.probe_timeout));

        Launcher {
            prober: Prober::new(clients, self.probe_timeout),
            servers: self.servers,
            node: self.node,
            node_config: self.node_config,
            chain: self.chain,
            bootstrap_timeout: self.bootstrap_timeout,
        }
    }
}
