//! 엔진 에러 타입

use thiserror::Error;

use logcaster_core::error::StoreError;

/// 엔진 계층 에러
///
/// 전송 실패와 잡 수명주기 에러를 포괄합니다. 러너의 전송 실패는
/// 재시도 없이 잡을 실패 상태로 전이시킵니다.
#[derive(Error, Debug)]
pub enum EngineError {
    /// 대상 연결 또는 전송 실패
    #[error("transport error to {destination} ({protocol}): {reason}")]
    Transport {
        protocol: String,
        destination: String,
        reason: String,
    },

    /// 연결 타임아웃
    #[error("connect to {destination} timed out after {timeout_secs}s")]
    ConnectTimeout {
        destination: String,
        timeout_secs: u64,
    },

    /// 잡 시작 거부 (활성 잡 한도 초과 등)
    #[error("job '{id}' rejected: {reason}")]
    JobRejected { id: String, reason: String },

    /// 잡 정의가 유효하지 않음
    #[error("job '{id}' is invalid: {reason}")]
    InvalidJob { id: String, reason: String },

    /// 스토어 접근 실패
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 제어 리스너 에러
    #[error("control listener error: {reason}")]
    Control { reason: String },

    /// 내부 채널 에러
    #[error("channel error: {0}")]
    Channel(String),
}
