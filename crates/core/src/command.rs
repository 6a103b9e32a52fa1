//! 제어 명령 — 와이어 텍스트를 타입으로 변환
//!
//! 명령 채널은 `START:<job_id>` / `STOP:<job_id>` 형식의 UTF-8 텍스트를
//! 운반합니다. 경계에서 즉시 [`Command`]로 파싱하며, 내부에서는 문자열
//! 명령을 다루지 않습니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// 잡 제어 명령
///
/// 최소 1회 전달이 가정되므로 처리 측은 멱등이어야 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// 잡 시작
    Start { job_id: String },
    /// 잡 정지
    Stop { job_id: String },
}

impl Command {
    /// 명령이 대상으로 하는 잡 ID를 반환합니다.
    pub fn job_id(&self) -> &str {
        match self {
            Self::Start { job_id } | Self::Stop { job_id } => job_id,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start { job_id } => write!(f, "START:{job_id}"),
            Self::Stop { job_id } => write!(f, "STOP:{job_id}"),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    /// `VERB:job_id` 형식을 파싱합니다.
    ///
    /// 첫 콜론에서 한 번만 분리하므로 잡 ID 자체는 콜론을 포함할 수 있습니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let Some((verb, job_id)) = raw.split_once(':') else {
            return Err(CommandError::Malformed {
                raw: raw.to_owned(),
            });
        };
        if job_id.is_empty() {
            return Err(CommandError::MissingJobId {
                raw: raw.to_owned(),
            });
        }
        match verb {
            "START" => Ok(Self::Start {
                job_id: job_id.to_owned(),
            }),
            "STOP" => Ok(Self::Stop {
                job_id: job_id.to_owned(),
            }),
            other => Err(CommandError::UnknownVerb {
                verb: other.to_owned(),
            }),
        }
    }
}
