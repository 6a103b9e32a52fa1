//! 로그 전송 계층
//!
//! [`LogSender`]는 러너가 사용하는 전송 추상화입니다. 러너와 디스패처는
//! `Arc<dyn LogSender>`로 공유하므로 object-safe 형태로 정의합니다.
//! 테스트에서는 전송 내용을 캡처하는 목 구현으로 교체합니다.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::debug;

use logcaster_core::store::BoxFuture;
use logcaster_core::types::Protocol;

use crate::error::EngineError;

/// 로그 라인 전송 추상화
///
/// 한 번의 호출이 한 라인의 전송입니다. 구현은 호출마다 독립적으로
/// 연결을 맺고 닫아도 되고, 내부에서 재사용해도 됩니다.
pub trait LogSender: Send + Sync {
    /// 페이로드 한 라인을 대상으로 전송합니다.
    fn send<'a>(
        &'a self,
        protocol: Protocol,
        destination: &'a str,
        payload: &'a str,
    ) -> BoxFuture<'a, Result<(), EngineError>>;
}

/// TCP/UDP 실전송 구현
///
/// - TCP: 전송마다 연결을 맺고 페이로드 + 개행을 쓴 뒤 정상 종료합니다.
/// - UDP: 임시 소켓을 바인드하고 단일 데이터그램으로 전송합니다.
pub struct NetSender {
    connect_timeout: Duration,
}

impl NetSender {
    /// 연결 타임아웃을 지정하여 생성합니다.
    pub fn new(connect_timeout_secs: u64) -> Self {
        Self {
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        }
    }

    async fn send_tcp(&self, destination: &str, payload: &str) -> Result<(), EngineError> {
        let mut stream = timeout(self.connect_timeout, TcpStream::connect(destination))
            .await
            .map_err(|_| EngineError::ConnectTimeout {
                destination: destination.to_owned(),
                timeout_secs: self.connect_timeout.as_secs(),
            })?
            .map_err(|e| EngineError::Transport {
                protocol: Protocol::Tcp.to_string(),
                destination: destination.to_owned(),
                reason: format!("connect failed: {e}"),
            })?;

        stream
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| EngineError::Transport {
                protocol: Protocol::Tcp.to_string(),
                destination: destination.to_owned(),
                reason: format!("write failed: {e}"),
            })?;
        stream
            .write_all(b"\n")
            .await
            .map_err(|e| EngineError::Transport {
                protocol: Protocol::Tcp.to_string(),
                destination: destination.to_owned(),
                reason: format!("write failed: {e}"),
            })?;
        stream
            .shutdown()
            .await
            .map_err(|e| EngineError::Transport {
                protocol: Protocol::Tcp.to_string(),
                destination: destination.to_owned(),
                reason: format!("shutdown failed: {e}"),
            })?;

        debug!(destination, bytes = payload.len() + 1, "tcp line sent");
        Ok(())
    }

    async fn send_udp(&self, destination: &str, payload: &str) -> Result<(), EngineError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| EngineError::Transport {
                protocol: Protocol::Udp.to_string(),
                destination: destination.to_owned(),
                reason: format!("bind failed: {e}"),
            })?;

        let mut datagram = payload.as_bytes().to_vec();
        datagram.push(b'\n');

        socket
            .send_to(&datagram, destination)
            .await
            .map_err(|e| EngineError::Transport {
                protocol: Protocol::Udp.to_string(),
                destination: destination.to_owned(),
                reason: format!("send_to failed: {e}"),
            })?;

        debug!(destination, bytes = datagram.len(), "udp datagram sent");
        Ok(())
    }
}

impl LogSender for NetSender {
    fn send<'a>(
        &'a self,
        protocol: Protocol,
        destination: &'a str,
        payload: &'a str,
    ) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(async move {
            match protocol {
                Protocol::Tcp => self.send_tcp(destination, payload).await,
                Protocol::Udp => self.send_udp(destination, payload).await,
            }
        })
    }
}
