//! 제어 리스너 — TCP 라인 기반 명령 수신
//!
//! `START:<job_id>` / `STOP:<job_id>` 형태의 라인을 TCP로 수신하여
//! 디스패처 명령 채널로 전달합니다. 파싱은 수신 지점에서 수행하고,
//! 잘못된 라인은 `ERR` 응답 후 버립니다. 유효한 명령은 채널 전달
//! 직후 `OK`로 응답합니다 (전달 확인이지 실행 확인이 아닙니다).
//!
//! 각 연결은 별도 태스크에서 처리되며 취소 토큰으로 함께 종료됩니다.

use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logcaster_core::command::Command;
use logcaster_core::metrics as m;

use crate::error::EngineError;

/// 최대 동시 제어 연결 수
const MAX_CONTROL_CONNECTIONS: usize = 32;

/// 명령 라인 최대 길이 (바이트)
const MAX_LINE_LENGTH: usize = 4096;

/// TCP 제어 리스너
pub struct ControlListener {
    bind_addr: String,
    command_tx: mpsc::Sender<Command>,
    cancel_token: CancellationToken,
}

impl ControlListener {
    /// 새 제어 리스너를 생성합니다.
    pub fn new(
        bind_addr: impl Into<String>,
        command_tx: mpsc::Sender<Command>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            command_tx,
            cancel_token,
        }
    }

    /// 바인드 주소를 반환합니다.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// 리스너를 시작합니다.
    ///
    /// 바인드 후 연결 수락 루프를 실행하며, 취소 토큰이 취소되면
    /// 종료합니다.
    pub async fn run(self) -> Result<(), EngineError> {
        let listener =
            TcpListener::bind(&self.bind_addr)
                .await
                .map_err(|e| EngineError::Control {
                    reason: format!("failed to bind to {}: {e}", self.bind_addr),
                })?;

        info!("control listener on {}", self.bind_addr);

        let semaphore = Arc::new(Semaphore::new(MAX_CONTROL_CONNECTIONS));

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, addr) = result.map_err(|e| EngineError::Control {
                        reason: format!("accept error: {e}"),
                    })?;

                    let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                        warn!(%addr, "max control connections reached, rejecting");
                        continue;
                    };

                    debug!(%addr, "control connection accepted");
                    let command_tx = self.command_tx.clone();
                    let cancel = self.cancel_token.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, command_tx, cancel).await {
                            warn!(%addr, error = %e, "control connection error");
                        }
                        drop(permit);
                    });
                }
                _ = self.cancel_token.cancelled() => {
                    info!("control listener shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// 단일 제어 연결을 처리합니다.
async fn handle_connection(
    stream: TcpStream,
    command_tx: mpsc::Sender<Command>,
    cancel: CancellationToken,
) -> Result<(), EngineError> {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_owned());
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();

        tokio::select! {
            result = reader.read_line(&mut line) => {
                match result {
                    Ok(0) => {
                        debug!(peer, "control connection closed by peer");
                        break;
                    }
                    Ok(_) => {
                        if line.len() > MAX_LINE_LENGTH {
                            warn!(peer, len = line.len(), "control line too long, closing");
                            break;
                        }
                        if line.trim().is_empty() {
                            continue;
                        }

                        metrics::counter!(m::CONTROL_LINES_TOTAL).increment(1);

                        match Command::from_str(&line) {
                            Ok(command) => {
                                debug!(peer, %command, "control command accepted");
                                if command_tx.send(command).await.is_err() {
                                    // 디스패처 종료: 연결도 닫는다
                                    return Err(EngineError::Channel(
                                        "command channel closed".to_owned(),
                                    ));
                                }
                                reply(&mut reader, "OK\n").await;
                            }
                            Err(e) => {
                                warn!(peer, error = %e, "malformed control line dropped");
                                metrics::counter!(m::CONTROL_LINES_REJECTED_TOTAL).increment(1);
                                reply(&mut reader, &format!("ERR: {e}\n")).await;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(peer, error = %e, "control read error");
                        break;
                    }
                }
            }
            _ = cancel.cancelled() => {
                debug!(peer, "control connection cancelled");
                break;
            }
        }
    }

    Ok(())
}

/// 응답 라인을 씁니다. 쓰기 실패는 연결 상태 문제이므로 무시합니다.
async fn reply(reader: &mut BufReader<TcpStream>, text: &str) {
    let _ = reader.get_mut().write_all(text.as_bytes()).await;
}
