//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 잡/템플릿 레코드와 상태 열거형을 정의합니다.
//! 엔진, 데몬, CLI가 모두 이 타입들을 통해 데이터를 교환합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// 전송 프로토콜
///
/// 와이어 표기는 대문자(`TCP`, `UDP`)이며 파싱은 대소문자를 구분하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// TCP — 연결, 전송, 종료를 한 줄 단위로 수행
    Tcp,
    /// UDP — 단일 데이터그램, 응답 없음
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

impl FromStr for Protocol {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Self::Tcp),
            "UDP" => Ok(Self::Udp),
            other => Err(JobError::InvalidField {
                field: "protocol".to_owned(),
                reason: format!("unknown protocol: {other}"),
            }),
        }
    }
}

/// 잡 상태
///
/// 상태 전환:
/// - `Idle` → `Running` (START 명령)
/// - `Running` → `Stopped` (완료 또는 STOP 명령)
/// - `Running` → `Error` (전송/스토어 실패)
///
/// `Running` 중의 전환은 해당 잡의 러너만 기록합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// 대기 — 아직 시작되지 않음
    #[default]
    Idle,
    /// 실행 중 — 러너가 전송 루프를 돌고 있음
    Running,
    /// 정지 — 정상 완료 또는 취소
    Stopped,
    /// 오류 — 전송 또는 스토어 실패로 중단
    Error,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 로그 템플릿 레코드
///
/// `content_format`은 `{dotted.path}` 또는 `<name>` 플레이스홀더를 포함하는
/// 자유 텍스트입니다. 플레이스홀더 집합은 텍스트만으로 도출 가능합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// 템플릿 ID
    pub id: String,
    /// 템플릿 본문
    pub content_format: String,
    /// 기본 제공 템플릿 여부 (엔진 경계에서는 읽기 전용)
    #[serde(default)]
    pub is_predefined: bool,
}

impl fmt::Display for TemplateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.content_format)
    }
}

/// 기본 전송 간격 (밀리초)
pub const DEFAULT_SEND_INTERVAL_MS: u64 = 1000;

fn default_send_interval_ms() -> u64 {
    DEFAULT_SEND_INTERVAL_MS
}

/// 잡 레코드
///
/// 하나의 반복 전송 단위를 구성합니다. 러너는 시작 시점에 레코드를
/// 스냅샷하며, 실행 중의 레코드 수정은 반영되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// 잡 ID
    pub id: String,
    /// 참조하는 템플릿 ID
    pub template_id: String,
    /// 전송 프로토콜
    pub protocol: Protocol,
    /// 목적지 호스트
    pub destination_host: String,
    /// 목적지 포트 (1-65535)
    pub destination_port: u16,
    /// 현재 상태
    #[serde(default)]
    pub status: JobStatus,
    /// 시작 시각 — 미래이면 러너가 해당 시점까지 대기
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// 종료 시각 — 도달 시 전송 중단
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// 총 전송 횟수 제한 (1 이상)
    #[serde(default)]
    pub send_count: Option<u64>,
    /// 전송 간격 (밀리초, 기본 1000)
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
    /// 마지막 실패 사유 — 상태가 `Error`일 때 채워짐
    #[serde(default)]
    pub last_error: Option<String>,
}

impl JobRecord {
    /// 잡 레코드의 불변식을 검증합니다.
    ///
    /// 러너 생성 전에 호출되며, 실패한 잡은 `Running`에 도달하지 않습니다.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.id.is_empty() {
            return Err(JobError::InvalidField {
                field: "id".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.template_id.is_empty() {
            return Err(JobError::InvalidField {
                field: "template_id".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.destination_host.is_empty() {
            return Err(JobError::InvalidField {
                field: "destination_host".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }
        if self.destination_port == 0 {
            return Err(JobError::InvalidField {
                field: "destination_port".to_owned(),
                reason: "must be in range 1-65535".to_owned(),
            });
        }
        if self.send_count == Some(0) {
            return Err(JobError::InvalidField {
                field: "send_count".to_owned(),
                reason: "must be >= 1 when set".to_owned(),
            });
        }
        if self.send_interval_ms == 0 {
            return Err(JobError::InvalidField {
                field: "send_interval_ms".to_owned(),
                reason: "must be >= 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} -> {}:{} interval={}ms",
            self.id,
            self.status,
            self.protocol,
            self.destination_host,
            self.destination_port,
            self.send_interval_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> JobRecord {
        JobRecord {
            id: "job-1".to_owned(),
            template_id: "tpl-1".to_owned(),
            protocol: Protocol::Udp,
            destination_host: "127.0.0.1".to_owned(),
            destination_port: 5514,
            status: JobStatus::Idle,
            start_time: None,
            end_time: None,
            send_count: None,
            send_interval_ms: 1000,
            last_error: None,
        }
    }

    #[test]
    fn protocol_display() {
        assert_eq!(Protocol::Tcp.to_string(), "TCP");
        assert_eq!(Protocol::Udp.to_string(), "UDP");
    }

    #[test]
    fn protocol_from_str_case_insensitive() {
        assert_eq!("TCP".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("udp".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert_eq!("Tcp".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert!("sctp".parse::<Protocol>().is_err());
    }

    #[test]
    fn protocol_serialize_uppercase() {
        let json = serde_json::to_string(&Protocol::Tcp).unwrap();
        assert_eq!(json, "\"TCP\"");
        let parsed: Protocol = serde_json::from_str("\"UDP\"").unwrap();
        assert_eq!(parsed, Protocol::Udp);
    }

    #[test]
    fn job_status_default_is_idle() {
        assert_eq!(JobStatus::default(), JobStatus::Idle);
    }

    #[test]
    fn job_status_display() {
        assert_eq!(JobStatus::Idle.to_string(), "IDLE");
        assert_eq!(JobStatus::Running.to_string(), "RUNNING");
        assert_eq!(JobStatus::Stopped.to_string(), "STOPPED");
        assert_eq!(JobStatus::Error.to_string(), "ERROR");
    }

    #[test]
    fn job_status_serialize_screaming_case() {
        let json = serde_json::to_string(&JobStatus::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
        let parsed: JobStatus = serde_json::from_str("\"STOPPED\"").unwrap();
        assert_eq!(parsed, JobStatus::Stopped);
    }

    #[test]
    fn job_validate_accepts_sane_record() {
        sample_job().validate().unwrap();
    }

    #[test]
    fn job_validate_rejects_zero_port() {
        let mut job = sample_job();
        job.destination_port = 0;
        let err = job.validate().unwrap_err();
        assert!(err.to_string().contains("destination_port"));
    }

    #[test]
    fn job_validate_rejects_zero_send_count() {
        let mut job = sample_job();
        job.send_count = Some(0);
        let err = job.validate().unwrap_err();
        assert!(err.to_string().contains("send_count"));
    }

    #[test]
    fn job_validate_accepts_send_count_one() {
        let mut job = sample_job();
        job.send_count = Some(1);
        job.validate().unwrap();
    }

    #[test]
    fn job_validate_rejects_zero_interval() {
        let mut job = sample_job();
        job.send_interval_ms = 0;
        let err = job.validate().unwrap_err();
        assert!(err.to_string().contains("send_interval_ms"));
    }

    #[test]
    fn job_validate_rejects_empty_host() {
        let mut job = sample_job();
        job.destination_host = String::new();
        let err = job.validate().unwrap_err();
        assert!(err.to_string().contains("destination_host"));
    }

    #[test]
    fn job_deserialize_defaults_interval() {
        let json = r#"{
            "id": "j",
            "template_id": "t",
            "protocol": "TCP",
            "destination_host": "10.0.0.1",
            "destination_port": 514
        }"#;
        let job: JobRecord = serde_json::from_str(json).unwrap();
        assert_eq!(job.send_interval_ms, DEFAULT_SEND_INTERVAL_MS);
        assert_eq!(job.status, JobStatus::Idle);
        assert!(job.send_count.is_none());
        assert!(job.last_error.is_none());
    }

    #[test]
    fn job_serialize_roundtrip() {
        let mut job = sample_job();
        job.start_time = Some("2026-08-01T00:00:00Z".parse().unwrap());
        job.send_count = Some(10);
        let json = serde_json::to_string(&job).unwrap();
        let parsed: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, job.id);
        assert_eq!(parsed.start_time, job.start_time);
        assert_eq!(parsed.send_count, Some(10));
    }

    #[test]
    fn job_display() {
        let job = sample_job();
        let display = job.to_string();
        assert!(display.contains("job-1"));
        assert!(display.contains("IDLE"));
        assert!(display.contains("127.0.0.1:5514"));
    }

    #[test]
    fn template_display() {
        let tpl = TemplateRecord {
            id: "tpl-1".to_owned(),
            content_format: "srcip={source.ip}".to_owned(),
            is_predefined: true,
        };
        let display = tpl.to_string();
        assert!(display.contains("tpl-1"));
        assert!(display.contains("{source.ip}"));
    }
}
