//! 엔드포인트 디스크립터 및 URL 해석

use crate::error::LaunchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 전송 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// 요청/응답 방식
    Http,
    /// 지속 연결 소켓
    Ws,
}

impl Transport {
    pub const ALL: [Transport; 2] = [Transport::Ws, Transport::Http];

    pub fn scheme(&self) -> &'static str {
        match self {
            Transport::Http => "http",
            Transport::Ws => "ws",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for Transport {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Transport::Http),
            "ws" => Ok(Transport::Ws),
            other => Err(LaunchError::config(format!("unknown transport: {}", other))),
        }
    }
}

/// 한 전송에 대한 엔드포인트 설정 (포트 및/또는 URL)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EndpointDescriptor {
    pub fn with_port(port: u16) -> Self {
        Self {
            port: Some(port),
            url: None,
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            port: None,
            url: Some(url.into()),
        }
    }

    /// URL을 채워 넣고 반환 (디스크립터에 허용된 유일한 변경)
    pub fn resolve(&mut self, transport: Transport) -> Result<&str, LaunchError> {
        let url = resolve_url(self, transport)?;
        Ok(self.url.insert(url).as_str())
    }

    /// 로컬 서버가 바인딩할 포트
    ///
    /// 명시된 `port`가 우선이고, 없으면 URL의 포트(또는 스킴 기본 포트)를 쓴다.
    pub fn bind_port(&self, transport: Transport) -> Result<u16, LaunchError> {
        if let Some(port) = self.port {
            return Ok(port);
        }

        let raw = self.url.as_deref().ok_or_else(|| {
            LaunchError::config(format!("{} endpoint has neither url nor port", transport))
        })?;

        let parsed = url::Url::parse(raw)
            .map_err(|e| LaunchError::config(format!("invalid {} url {}: {}", transport, raw, e)))?;

        parsed.port_or_known_default().ok_or_else(|| {
            LaunchError::config(format!("cannot determine a port to bind for {}", raw))
        })
    }
}

/// 디스크립터의 구체 URL 도출
///
/// `url`이 있으면 그대로, 없으면 `{scheme}://localhost:{port}`.
/// 둘 다 없으면 설정 오류. 순수 함수이며 멱등.
pub fn resolve_url(descriptor: &EndpointDescriptor, transport: Transport) -> Result<String, LaunchError> {
    match (&descriptor.url, descriptor.port) {
        (Some(url), _) => Ok(url.clone()),
        (None, Some(port)) => Ok(format!("{}://localhost:{}", transport.scheme(), port)),
        (None, None) => Err(LaunchError::config(format!(
            "{} endpoint has neither url nor port",
            transport
        ))),
    }
}
