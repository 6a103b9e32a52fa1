//! 설정 관리 — logcaster.toml 파싱 및 런타임 설정
//!
//! [`LogcasterConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGCASTER_CONTROL_BIND=0.0.0.0:7700` 형식)
//! 3. 설정 파일 (`logcaster.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logcaster_core::error::LogcasterError> {
//! use logcaster_core::config::LogcasterConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogcasterConfig::load("logcaster.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogcasterConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogcasterError};

/// Logcaster 통합 설정
///
/// `logcaster.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 구성 요소는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogcasterConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 명령 수신 설정
    #[serde(default)]
    pub control: ControlConfig,
    /// 전송 엔진 설정
    #[serde(default)]
    pub engine: EngineConfig,
    /// 시드 데이터 설정
    #[serde(default)]
    pub seed: SeedConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl LogcasterConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogcasterError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogcasterError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogcasterError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogcasterError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogcasterError> {
        toml::from_str(toml_str).map_err(|e| {
            LogcasterError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGCASTER_{SECTION}_{FIELD}`
    /// 예: `LOGCASTER_CONTROL_BIND=0.0.0.0:7700`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGCASTER_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGCASTER_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.pid_file, "LOGCASTER_GENERAL_PID_FILE");

        // Control
        override_string(&mut self.control.bind, "LOGCASTER_CONTROL_BIND");
        override_usize(
            &mut self.control.channel_capacity,
            "LOGCASTER_CONTROL_CHANNEL_CAPACITY",
        );

        // Engine
        override_u64(
            &mut self.engine.connect_timeout_secs,
            "LOGCASTER_ENGINE_CONNECT_TIMEOUT_SECS",
        );
        override_usize(
            &mut self.engine.max_active_jobs,
            "LOGCASTER_ENGINE_MAX_ACTIVE_JOBS",
        );

        // Seed
        override_string(
            &mut self.seed.templates_file,
            "LOGCASTER_SEED_TEMPLATES_FILE",
        );
        override_string(&mut self.seed.jobs_file, "LOGCASTER_SEED_JOBS_FILE");

        // Metrics
        override_bool(&mut self.metrics.enabled, "LOGCASTER_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "LOGCASTER_METRICS_LISTEN_ADDR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogcasterError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 명령 수신 주소 검증
        if self.control.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "control.bind".to_owned(),
                reason: format!("invalid socket address: {}", self.control.bind),
            }
            .into());
        }

        if self.control.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "control.channel_capacity".to_owned(),
                reason: "must be >= 1".to_owned(),
            }
            .into());
        }

        if self.engine.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.connect_timeout_secs".to_owned(),
                reason: "must be >= 1".to_owned(),
            }
            .into());
        }

        if self.engine.max_active_jobs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_active_jobs".to_owned(),
                reason: "must be >= 1".to_owned(),
            }
            .into());
        }

        // 메트릭 수신 주소 검증
        if self.metrics.enabled
            && self.metrics.listen_addr.parse::<std::net::SocketAddr>().is_err()
        {
            return Err(ConfigError::InvalidValue {
                field: "metrics.listen_addr".to_owned(),
                reason: format!("invalid socket address: {}", self.metrics.listen_addr),
            }
            .into());
        }

        Ok(())
    }
}

// Default는 derive 매크로로 자동 생성 (각 필드가 Default를 구현하므로)

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// PID 파일 경로
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: "/var/run/logcaster.pid".to_owned(),
        }
    }
}

/// 명령 수신 설정
///
/// 디스패처로 향하는 단일 명령 채널의 수신 지점을 정의합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// 명령 수신 TCP 주소
    pub bind: String,
    /// 명령 채널 버퍼 크기
    pub channel_capacity: usize,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7700".to_owned(),
            channel_capacity: 64,
        }
    }
}

/// 전송 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// TCP 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 동시 실행 가능한 잡 수 상한
    pub max_active_jobs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            max_active_jobs: 256,
        }
    }
}

/// 시드 데이터 설정
///
/// 데몬 시작 시 인메모리 스토어에 적재할 템플릿/잡 정의 파일입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// 템플릿 정의 TOML 경로 (빈 문자열이면 미사용)
    pub templates_file: String,
    /// 잡 정의 TOML 경로 (빈 문자열이면 미사용)
    pub jobs_file: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            templates_file: String::new(),
            jobs_file: String::new(),
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus 익스포터 활성화 여부
    pub enabled: bool,
    /// 익스포터 수신 주소
    pub listen_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1:9300".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
