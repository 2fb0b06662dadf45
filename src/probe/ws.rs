use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::config::Transport;
use crate::error::ProbeFailure;
use crate::probe::{ClientFactory, ClientHandle, EndpointClient};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn classify(err: WsError) -> ProbeFailure {
    match err {
        WsError::Url(e) => ProbeFailure::InvalidUrl(e.to_string()),
        WsError::Http(response) => {
            ProbeFailure::ProtocolMismatch(format!("handshake rejected with {}", response.status()))
        }
        WsError::Protocol(e) => ProbeFailure::ProtocolMismatch(e.to_string()),
        other => ProbeFailure::Unreachable(other.to_string()),
    }
}

/// 웹소켓 엔드포인트 클라이언트 (열린 연결 보유)
pub struct WsClient {
    url: String,
    protocol: String,
    timeout: Duration,
    socket: Mutex<Option<Socket>>,
}

impl fmt::Debug for WsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsClient")
            .field("url", &self.url)
            .field("protocol", &self.protocol)
            .finish()
    }
}

impl WsClient {
    /// 협상된 서브프로토콜 (네트워크 버전)
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub async fn is_open(&self) -> bool {
        self.socket.lock().await.is_some()
    }

    /// 텍스트 프레임 전송 (메시지 형식은 호출자 몫)
    pub async fn send_text(&self, text: impl Into<String>) -> anyhow::Result<()> {
        let mut guard = self.socket.lock().await;
        let socket = guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("connection to {} is closed", self.url))?;
        socket.send(Message::Text(text.into())).await?;
        Ok(())
    }
}

#[async_trait]
impl EndpointClient for WsClient {
    fn url(&self) -> &str {
        &self.url
    }

    fn transport(&self) -> Transport {
        Transport::Ws
    }

    async fn ping(&self) -> anyhow::Result<bool> {
        let mut guard = self.socket.lock().await;
        let Some(socket) = guard.as_mut() else {
            return Ok(false);
        };

        socket.send(Message::Ping(Default::default())).await?;

        let pong = tokio::time::timeout(self.timeout, async {
            while let Some(message) = socket.next().await {
                match message? {
                    Message::Pong(_) => return Ok::<bool, WsError>(true),
                    Message::Close(_) => return Ok(false),
                    _ => continue,
                }
            }
            Ok(false)
        })
        .await;

        match pong {
            Ok(result) => Ok(result?),
            Err(_) => Ok(false),
        }
    }

    async fn close(&self) {
        if let Some(mut socket) = self.socket.lock().await.take() {
            if let Err(e) = socket.close(None).await {
                debug!("웹소켓 종료 중 오류 {}: {}", self.url, e);
            }
        }
    }
}

/// 웹소켓 클라이언트 팩토리
///
/// 네트워크 버전을 서브프로토콜로 실어 핸드셰이크하고, 서버가 같은
/// 서브프로토콜을 수락해야 성공이다.
#[derive(Debug, Clone)]
pub struct WsClientFactory {
    timeout: Duration,
}

impl WsClientFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 핸드셰이크 후 구체 타입 클라이언트 반환
    pub async fn open(&self, url: &str, network_version: &str) -> Result<WsClient, ProbeFailure> {
        let parsed = url::Url::parse(url).map_err(|e| ProbeFailure::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ProbeFailure::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                url,
                parsed.scheme()
            )));
        }

        let mut request = url
            .into_client_request()
            .map_err(|e| ProbeFailure::InvalidUrl(format!("{}: {}", url, e)))?;

        let protocol = HeaderValue::from_str(network_version).map_err(|e| {
            ProbeFailure::InvalidUrl(format!("network version {:?}: {}", network_version, e))
        })?;
        request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, protocol);

        let (mut socket, response) = connect_async(request).await.map_err(classify)?;

        let accepted = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if accepted.as_deref() != Some(network_version) {
            let _ = socket.close(None).await;
            return Err(ProbeFailure::ProtocolMismatch(format!(
                "expected subprotocol {}, server answered {:?}",
                network_version, accepted
            )));
        }

        info!("웹소켓 연결 열림: {} (protocol {})", url, network_version);

        Ok(WsClient {
            url: url.to_string(),
            protocol: network_version.to_string(),
            timeout: self.timeout,
            socket: Mutex::new(Some(socket)),
        })
    }
}

#[async_trait]
impl ClientFactory for WsClientFactory {
    fn transport(&self) -> Transport {
        Transport::Ws
    }

    async fn connect(&self, url: &str, network_version: &str) -> Result<ClientHandle, ProbeFailure> {
        Ok(Box::new(self.open(url, network_version).await?))
    }
}
