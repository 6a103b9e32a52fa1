//! Logcaster 공통 타입, trait, 에러, 설정
//!
//! 엔진, 템플릿, 데몬, CLI가 공유하는 기반 크레이트입니다.
//! 도메인 타입([`JobRecord`], [`TemplateRecord`]), 제어 명령([`Command`]),
//! 잡 스토어 trait([`JobStore`])과 에러 타입을 제공합니다.

pub mod command;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{CommandError, ConfigError, JobError, LogcasterError, StoreError};

// 설정
pub use config::LogcasterConfig;

// 명령
pub use command::Command;

// 스토어
pub use store::{BoxFuture, DynJobStore, JobStore, MemoryStore};

// 도메인 타입
pub use types::{DEFAULT_SEND_INTERVAL_MS, JobRecord, JobStatus, Protocol, TemplateRecord};
