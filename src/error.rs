//! 런치 오류 분류
//!
//! - 설정 오류 / 원격 없음 / 부트스트랩 실패 / 취소: 호출자에게 전달되는 치명적 오류
//! - `ProbeFailure`: 개별 프로브 실패. 절대 밖으로 던지지 않고 "도달 불가"로만 표현됨

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// 로컬 부트스트랩 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Node,
    NodeConfig,
    Chain,
    Server,
    SelfProbe,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapStage::Node => write!(f, "node"),
            BootstrapStage::NodeConfig => write!(f, "node-config"),
            BootstrapStage::Chain => write!(f, "chain"),
            BootstrapStage::Server => write!(f, "server"),
            BootstrapStage::SelfProbe => write!(f, "self-probe"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no remotes connected")]
    NoRemotes,

    #[error("forceRemote was set but no remotes connected")]
    ForceRemote,

    #[error("bootstrap failed at {stage}: {source}")]
    Bootstrap {
        stage: BootstrapStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("bootstrap timed out at {stage} after {after:?}")]
    Timeout {
        stage: BootstrapStage,
        after: Duration,
    },

    #[error("launch cancelled")]
    Cancelled,
}

impl LaunchError {
    pub fn config(msg: impl Into<String>) -> Self {
        LaunchError::Configuration(msg.into())
    }

    pub fn bootstrap(stage: BootstrapStage, source: impl Into<anyhow::Error>) -> Self {
        LaunchError::Bootstrap {
            stage,
            source: source.into(),
        }
    }

    /// 설정 오류 여부 (원격 없음 포함)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LaunchError::Configuration(_) | LaunchError::NoRemotes | LaunchError::ForceRemote
        )
    }

    pub fn is_bootstrap(&self) -> bool {
        matches!(self, LaunchError::Bootstrap { .. } | LaunchError::Timeout { .. })
    }
}

/// 프로브 실패 원인 (관측용 - 외부에는 모두 "도달 불가")
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),
}

impl ProbeFailure {
    /// 로그에 쓰는 짧은 분류명
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::InvalidUrl(_) => "invalid-url",
            ProbeFailure::Unreachable(_) => "unreachable",
            ProbeFailure::TimedOut(_) => "timeout",
            ProbeFailure::ProtocolMismatch(_) => "protocol-mismatch",
        }
    }
}
