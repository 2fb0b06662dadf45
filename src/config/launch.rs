//! 런치 설정 - 기본값과 호출자 오버라이드를 한 번에 병합

use crate::config::endpoint::{EndpointDescriptor, Transport};
use crate::error::LaunchError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_NETWORK: &str = "leofcoin:peach";
pub const DEFAULT_NETWORK_VERSION: &str = "peach";
pub const DEFAULT_STAR: &str = "wss://peach.leofcoin.org";
pub const DEFAULT_WS_PORT: u16 = 4040;
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// 네트워크 식별자
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkIdentifier {
    pub network: String,
    pub network_version: String,
}

impl NetworkIdentifier {
    /// `version`이 없으면 네트워크 이름의 첫 `:`를 `-`로 바꿔 도출
    pub fn new(network: impl Into<String>, version: Option<String>) -> Self {
        let network = network.into();
        let network_version = version.unwrap_or_else(|| derive_network_version(&network));
        Self {
            network,
            network_version,
        }
    }
}

pub fn derive_network_version(network: &str) -> String {
    network.replacen(':', "-", 1)
}

/// 런치 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchMode {
    /// 이미 실행 중인 인스턴스에 클라이언트로 연결
    Remote,
    /// 로컬 노드/체인을 띄우고 자체 엔드포인트에 클라이언트 연결
    Direct,
    /// direct와 같지만 자체 엔드포인트를 셀프 프로브하지 않음
    Server,
}

impl LaunchMode {
    pub fn is_local(&self) -> bool {
        matches!(self, LaunchMode::Direct | LaunchMode::Server)
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchMode::Remote => write!(f, "remote"),
            LaunchMode::Direct => write!(f, "direct"),
            LaunchMode::Server => write!(f, "server"),
        }
    }
}

impl FromStr for LaunchMode {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(LaunchMode::Remote),
            "direct" => Ok(LaunchMode::Direct),
            "server" => Ok(LaunchMode::Server),
            other => Err(LaunchError::config(format!("unknown launch mode: {}", other))),
        }
    }
}

/// 호출자 오버라이드 (모든 필드 선택)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub network_version: Option<String>,
    #[serde(default)]
    pub stars: Option<Vec<String>>,
    #[serde(default)]
    pub force_remote: Option<bool>,
    #[serde(default)]
    pub mode: Option<LaunchMode>,
    #[serde(default)]
    pub ws: Option<Vec<EndpointDescriptor>>,
    #[serde(default)]
    pub http: Option<Vec<EndpointDescriptor>>,
}

impl LaunchOptions {
    /// 환경 변수에서 오버라이드 로드
    ///
    /// 설정되지 않은 변수는 `None`으로 남아 기본값이 적용된다.
    pub fn from_env() -> Result<Self, LaunchError> {
        let force_remote = match env::var("LAUNCH_FORCE_REMOTE") {
            Ok(v) => Some(v.trim().parse::<bool>().map_err(|e| {
                LaunchError::config(format!("invalid LAUNCH_FORCE_REMOTE {:?}: {}", v, e))
            })?),
            Err(_) => None,
        };

        let mode = match env::var("LAUNCH_MODE") {
            Ok(v) => Some(v.parse()?),
            Err(_) => None,
        };

        Ok(Self {
            network: env::var("LAUNCH_NETWORK").ok(),
            network_version: env::var("LAUNCH_NETWORK_VERSION").ok(),
            stars: env::var("LAUNCH_STARS").ok().map(|v| split_list(&v)),
            force_remote,
            mode,
            ws: env_ports("LAUNCH_WS_PORTS")?,
            http: env_ports("LAUNCH_HTTP_PORTS")?,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_ports(key: &str) -> Result<Option<Vec<EndpointDescriptor>>, LaunchError> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };

    split_list(&raw)
        .into_iter()
        .map(|p| {
            p.parse::<u16>()
                .map(EndpointDescriptor::with_port)
                .map_err(|e| LaunchError::config(format!("invalid port {:?} in {}: {}", p, key, e)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// 병합/검증이 끝난 불변 런치 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    network: NetworkIdentifier,
    stars: Vec<String>,
    force_remote: bool,
    mode: Option<LaunchMode>,
    ws: Vec<EndpointDescriptor>,
    http: Vec<EndpointDescriptor>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl LaunchConfig {
    /// 이름 붙은 기본값 (매 호출마다 새 값)
    pub fn defaults() -> Self {
        Self {
            network: NetworkIdentifier {
                network: DEFAULT_NETWORK.to_string(),
                network_version: DEFAULT_NETWORK_VERSION.to_string(),
            },
            stars: vec![DEFAULT_STAR.to_string()],
            force_remote: false,
            mode: None,
            ws: vec![EndpointDescriptor::with_port(DEFAULT_WS_PORT)],
            http: vec![EndpointDescriptor::with_port(DEFAULT_HTTP_PORT)],
        }
    }

    /// 기본값 위에 오버라이드를 얹고 URL을 해석한 뒤 검증
    ///
    /// `networkVersion`은 명시값 > 오버라이드된 `network`에서 도출 > 기본값 순.
    pub fn build(options: LaunchOptions) -> Result<Self, LaunchError> {
        let defaults = Self::defaults();

        let network = match (options.network, options.network_version) {
            (Some(network), version) => NetworkIdentifier::new(network, version),
            (None, Some(version)) => NetworkIdentifier {
                network: defaults.network.network,
                network_version: version,
            },
            (None, None) => defaults.network,
        };

        let mut config = Self {
            network,
            stars: options.stars.unwrap_or(defaults.stars),
            force_remote: options.force_remote.unwrap_or(defaults.force_remote),
            mode: options.mode,
            ws: options.ws.unwrap_or(defaults.ws),
            http: options.http.unwrap_or(defaults.http),
        };

        for transport in Transport::ALL {
            for descriptor in config.descriptors_mut(transport) {
                descriptor.resolve(transport)?;
            }
        }

        config.validate()?;

        debug!(
            "런치 설정 병합 완료: network={} version={} mode={:?} ws={} http={}",
            config.network.network,
            config.network.network_version,
            config.mode,
            config.ws.len(),
            config.http.len()
        );

        Ok(config)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<(), LaunchError> {
        if self.network.network.trim().is_empty() {
            return Err(LaunchError::config("network must not be empty"));
        }
        if self.network.network_version.trim().is_empty() {
            return Err(LaunchError::config("networkVersion must not be empty"));
        }
        // 서브프로토콜 헤더로 전송되므로 토큰 문자만 허용
        if self
            .network
            .network_version
            .chars()
            .any(|c| c.is_whitespace() || c == ',' || c.is_control())
        {
            return Err(LaunchError::config(format!(
                "networkVersion {:?} is not a valid protocol token",
                self.network.network_version
            )));
        }

        if let Some(mode) = self.mode.filter(|m| self.force_remote && m.is_local()) {
            return Err(LaunchError::config(format!(
                "forceRemote cannot be combined with mode {}",
                mode
            )));
        }

        for transport in Transport::ALL {
            for descriptor in self.descriptors(transport) {
                if descriptor.url.is_none() {
                    return Err(LaunchError::config(format!(
                        "{} endpoint was not resolved",
                        transport
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn network(&self) -> &NetworkIdentifier {
        &self.network
    }

    pub fn network_version(&self) -> &str {
        &self.network.network_version
    }

    pub fn stars(&self) -> &[String] {
        &self.stars
    }

    pub fn force_remote(&self) -> bool {
        self.force_remote
    }

    pub fn mode(&self) -> Option<LaunchMode> {
        self.mode
    }

    pub fn descriptors(&self, transport: Transport) -> &[EndpointDescriptor] {
        match transport {
            Transport::Http => &self.http,
            Transport::Ws => &self.ws,
        }
    }

    fn descriptors_mut(&mut self, transport: Transport) -> &mut [EndpointDescriptor] {
        match transport {
            Transport::Http => &mut self.http,
            Transport::Ws => &mut self.ws,
        }
    }

    /// 해석된 URL 목록 (입력 순서 유지)
    pub fn urls(&self, transport: Transport) -> Vec<String> {
        self.descriptors(transport)
            .iter()
            .filter_map(|d| d.url.clone())
            .collect()
    }

    pub fn has_endpoints(&self) -> bool {
        !self.ws.is_empty() || !self.http.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve() {
        let config = LaunchConfig::build(LaunchOptions::default()).unwrap();

        assert_eq!(config.network().network, "leofcoin:peach");
        assert_eq!(config.network_version(), "peach");
        assert_eq!(config.stars(), &["wss://peach.leofcoin.org".to_string()]);
        assert!(!config.force_remote());
        assert_eq!(config.mode(), None);
        assert_eq!(config.urls(Transport::Ws), vec!["ws://localhost:4040"]);
        assert_eq!(config.urls(Transport::Http), vec!["http://localhost:8080"]);
    }

    #[test]
    fn test_network_version_derived_from_override() {
        let config = LaunchConfig::build(LaunchOptions {
            network: Some("leofcoin:peach:beta".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.network_version(), "leofcoin-peach:beta");
    }

    #[test]
    fn test_explicit_network_version_kept() {
        let config = LaunchConfig::build(LaunchOptions {
            network: Some("leofcoin:peach".to_string()),
            network_version: Some("peach".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.network_version(), "peach");
    }

    #[test]
    fn test_overrides_replace_lists() {
        let config = LaunchConfig::build(LaunchOptions {
            mode: Some(LaunchMode::Remote),
            ws: Some(vec![EndpointDescriptor::with_url("wss://a")]),
            http: Some(vec![]),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.mode(), Some(LaunchMode::Remote));
        assert_eq!(config.urls(Transport::Ws), vec!["wss://a"]);
        assert!(config.urls(Transport::Http).is_empty());
    }

    #[test]
    fn test_defaults_not_shared_between_builds() {
        let first = LaunchConfig::build(LaunchOptions {
            ws: Some(vec![EndpointDescriptor::with_port(5000)]),
            ..Default::default()
        })
        .unwrap();
        let second = LaunchConfig::build(LaunchOptions::default()).unwrap();

        assert_eq!(first.urls(Transport::Ws), vec!["ws://localhost:5000"]);
        assert_eq!(second.urls(Transport::Ws), vec!["ws://localhost:4040"]);
    }

    #[test]
    fn test_descriptor_without_url_or_port_rejected() {
        let err = LaunchConfig::build(LaunchOptions {
            http: Some(vec![EndpointDescriptor::default()]),
            ..Default::default()
        })
        .unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_network_version_rejected() {
        let err = LaunchConfig::build(LaunchOptions {
            network_version: Some("bad version".to_string()),
            ..Default::default()
        })
        .unwrap_err();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_force_remote_with_local_mode_rejected() {
        for mode in [LaunchMode::Direct, LaunchMode::Server] {
            let err = LaunchConfig::build(LaunchOptions {
                force_remote: Some(true),
                mode: Some(mode),
                ..Default::default()
            })
            .unwrap_err();

            assert!(err.is_configuration());
            assert!(err.to_string().contains("forceRemote"));
        }

        let config = LaunchConfig::build(LaunchOptions {
            force_remote: Some(true),
            mode: Some(LaunchMode::Remote),
            ..Default::default()
        })
        .unwrap();
        assert!(config.force_remote());
    }

    #[test]
    fn test_has_endpoints() {
        assert!(LaunchConfig::defaults().has_endpoints());

        let config = LaunchConfig::build(LaunchOptions {
            ws: Some(vec![]),
            http: Some(vec![]),
            ..Default::default()
        })
        .unwrap();
        assert!(!config.has_endpoints());
    }

    #[test]
    fn test_options_from_json() {
        let options: LaunchOptions = serde_json::from_str(
            r#"{"network":"leofcoin:peach","networkVersion":"peach","forceRemote":true,"mode":"server","ws":[{"port":4041}]}"#,
        )
        .unwrap();

        assert_eq!(options.force_remote, Some(true));
        assert_eq!(options.mode, Some(LaunchMode::Server));
        assert_eq!(options.ws, Some(vec![EndpointDescriptor::with_port(4041)]));
        assert!(options.http.is_none());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Direct".parse::<LaunchMode>().unwrap(), LaunchMode::Direct);
        assert!("hybrid".parse::<LaunchMode>().is_err());
        assert!(LaunchMode::Server.is_local());
        assert!(!LaunchMode::Remote.is_local());
    }

    #[test]
    fn test_options_from_env() {
        std::env::set_var("LAUNCH_NETWORK", "leofcoin:peach");
        std::env::set_var("LAUNCH_MODE", "direct");
        std::env::set_var("LAUNCH_WS_PORTS", "4040, 4041");
        std::env::set_var("LAUNCH_STARS", "wss://a.example,wss://b.example");

        let options = LaunchOptions::from_env().unwrap();

        assert_eq!(options.network.as_deref(), Some("leofcoin:peach"));
        assert_eq!(options.mode, Some(LaunchMode::Direct));
        assert_eq!(
            options.ws,
            Some(vec![
                EndpointDescriptor::with_port(4040),
                EndpointDescriptor::with_port(4041)
            ])
        );
        assert_eq!(options.stars.map(|s| s.len()), Some(2));

        std::env::remove_var("LAUNCH_NETWORK");
        std::env::remove_var("LAUNCH_MODE");
        std::env::remove_var("LAUNCH_WS_PORTS");
        std::env::remove_var("LAUNCH_STARS");
    }
}
