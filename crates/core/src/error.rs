//! 에러 타입 — 도메인별 에러 정의

/// Logcaster 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogcasterError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 명령 처리 에러
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// 잡 스토어 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 잡 레코드 검증 에러
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 명령 처리 에러
///
/// 명령 채널에서 수신한 메시지가 프로토콜에 맞지 않을 때 발생합니다.
/// 디스패처는 이 에러를 로깅 후 폐기하며, 치명적으로 다루지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// 알 수 없는 명령 동사
    #[error("unknown command verb: {verb}")]
    UnknownVerb { verb: String },

    /// 잡 ID 누락
    #[error("missing job id in command: {raw}")]
    MissingJobId { raw: String },

    /// 구분자 없는 형식
    #[error("malformed command (expected VERB:job_id): {raw}")]
    Malformed { raw: String },
}

/// 잡 스토어 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 잡 레코드를 찾을 수 없음
    #[error("job not found: {id}")]
    JobNotFound { id: String },

    /// 템플릿 레코드를 찾을 수 없음
    #[error("template not found: {id}")]
    TemplateNotFound { id: String },

    /// 상태 기록 실패
    #[error("status write failed for job {id}: {reason}")]
    WriteFailed { id: String, reason: String },
}

/// 잡 레코드 검증 에러
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// 유효하지 않은 필드 값
    #[error("invalid job field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}
