//! Chain Launch
//!
//! P2P 체인 참여자의 부트스트랩 오케스트레이터.
//! 후보 엔드포인트와 네트워크 식별자를 받아, 이미 실행 중인 인스턴스에 붙을지
//! (remote) 로컬 노드를 띄워 직접 노출할지(direct/server) 결정하고
//! 하나의 `LaunchResult`로 돌려준다.
//!
//! ## 모듈 구조
//! - `config`: 네트워크 식별자, 엔드포인트 디스크립터, 기본값 병합
//! - `probe`: HTTP/웹소켓 엔드포인트 프로브 및 클라이언트 핸들
//! - `node`: 노드/체인/서버 협력자 인터페이스
//! - `launch`: 모드 선택, 로컬 부트스트랩, 결과 조합
//!
//! ```rust,no_run
//! use chain_launch::{LaunchOptions, Launcher, NodeSecret};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let launcher = Launcher::builder().build();
//! let result = launcher
//!     .launch_with(LaunchOptions::from_env()?, NodeSecret::new("password"), &CancellationToken::new())
//!     .await?;
//! println!("{} {:?}", result.mode, result.endpoints);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod launch;
pub mod logging;
pub mod node;
pub mod probe;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{
    resolve_url, EndpointDescriptor, LaunchConfig, LaunchMode, LaunchOptions, NetworkIdentifier, Transport,
};
pub use error::{BootstrapStage, LaunchError, ProbeFailure};
pub use launch::{Clients, Endpoints, LaunchResult, Launcher, LauncherBuilder};
pub use node::{
    Chain, ChainFactory, ChainRef, NodeConfig, NodeConfigStore, NodeFactory, NodeSecret, ServerFactory,
    ServerRegistry,
};
pub use probe::{ClientFactory, ClientHandle, ClientRegistry, EndpointClient, ProbeMode, ProbeOutcome, Prober};
