//! 로컬 부트스트랩
//!
//! 노드 → 노드 설정 → 체인 → 전송별 서버 순으로 띄운다. 어느 단계든
//! 실패하면 남은 단계는 중단되고 오류가 그대로 올라간다.
//!
//! 중단 시 이미 연결한 셀프 프로브 클라이언트는 닫는다. 이미 리스닝 중인
//! 서버의 정리는 서버 팩토리(협력자) 몫이다.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{resolve_url, LaunchConfig, LaunchMode, Transport};
use crate::error::{BootstrapStage, LaunchError};
use crate::launch::result::Reached;
use crate::node::{ChainFactory, ChainRef, NodeConfig, NodeConfigStore, NodeFactory, NodeSecret, ServerRegistry};
use crate::probe::{ClientHandle, ProbeMode, ProbeOutcome, Prober};

pub struct LocalBootstrap<'a> {
    pub node: &'a dyn NodeFactory,
    pub node_config: &'a dyn NodeConfigStore,
    pub chain: &'a dyn ChainFactory,
    pub servers: &'a ServerRegistry,
    pub prober: &'a Prober,
    pub timeout: Duration,
}

impl LocalBootstrap<'_> {
    /// 단계 하나를 타임아웃/취소와 경합시켜 실행
    async fn step<T, F>(&self, stage: BootstrapStage, cancel: &CancellationToken, fut: F) -> Result<T, LaunchError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("부트스트랩 취소됨 ({} 단계)", stage);
                Err(LaunchError::Cancelled)
            }
            result = tokio::time::timeout(self.timeout, fut) => match result {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(LaunchError::bootstrap(stage, e)),
                Err(_) => Err(LaunchError::Timeout {
                    stage,
                    after: self.timeout,
                }),
            },
        }
    }

    pub async fn run(
        &self,
        config: &LaunchConfig,
        secret: &NodeSecret,
        mode: LaunchMode,
        cancel: &CancellationToken,
    ) -> Result<(ChainRef, Reached), LaunchError> {
        if !mode.is_local() {
            return Err(LaunchError::config(format!(
                "local bootstrap requested for non-local mode {}",
                mode
            )));
        }

        let network_version = config.network_version();
        let node_config = NodeConfig::from(config);

        info!("🚀 로컬 노드 시작 중: {} ({})", node_config.network, network_version);

        self.step(BootstrapStage::Node, cancel, self.node.start(&node_config, secret))
            .await?;
        self.step(BootstrapStage::NodeConfig, cancel, self.node_config.persist(&node_config))
            .await?;
        let chain = self
            .step(BootstrapStage::Chain, cancel, self.chain.open(config.network()))
            .await?;

        info!("✅ 노드 및 체인 준비 완료");

        let mut reached = Reached::default();
        if let Err(e) = self.serve_all(config, &chain, mode, cancel, &mut reached).await {
            if reached.client_count() > 0 {
                warn!("부트스트랩 중단, 열린 클라이언트 {}개 정리", reached.client_count());
            }
            reached.close_clients().await;
            return Err(e);
        }

        Ok((chain, reached))
    }

    /// 전송별로 모든 디스크립터의 서버를 띄움 (ws 먼저)
    async fn serve_all(
        &self,
        config: &LaunchConfig,
        chain: &ChainRef,
        mode: LaunchMode,
        cancel: &CancellationToken,
        reached: &mut Reached,
    ) -> Result<(), LaunchError> {
        let network_version = config.network_version();

        for transport in Transport::ALL {
            let descriptors = config.descriptors(transport);
            if descriptors.is_empty() {
                continue;
            }

            let server = self.servers.get(transport).ok_or_else(|| {
                LaunchError::config(format!("no server factory registered for {}", transport))
            })?;

            for descriptor in descriptors {
                let url = resolve_url(descriptor, transport)?;
                let port = descriptor.bind_port(transport)?;

                self.step(
                    BootstrapStage::Server,
                    cancel,
                    server.serve(chain.clone(), port, network_version),
                )
                .await?;

                info!("✅ {} 서버 시작됨: 포트 {} ({})", transport, port, url);

                let client = match mode {
                    LaunchMode::Direct => Some(self.self_probe(transport, &url, network_version, cancel).await?),
                    _ => None,
                };

                reached.push(transport, url, client);
            }
        }

        Ok(())
    }

    /// 방금 띄운 엔드포인트에 클라이언트로 연결
    async fn self_probe(
        &self,
        transport: Transport,
        url: &str,
        network_version: &str,
        cancel: &CancellationToken,
    ) -> Result<ClientHandle, LaunchError> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LaunchError::Cancelled),
            outcome = self.prober.probe(transport, url, network_version, ProbeMode::Retain) => outcome,
        };

        match outcome {
            ProbeOutcome::Reachable(Some(client)) => Ok(client),
            ProbeOutcome::Reachable(None) => Err(LaunchError::bootstrap(
                BootstrapStage::SelfProbe,
                anyhow::anyhow!("{} endpoint {} yielded no client", transport, url),
            )),
            ProbeOutcome::Unreachable(failure) => Err(LaunchError::bootstrap(
                BootstrapStage::SelfProbe,
                anyhow::anyhow!("{} endpoint {} did not answer after start: {}", transport, url, failure),
            )),
        }
    }
}
