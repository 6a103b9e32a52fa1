//! Logcaster 엔진
//!
//! 잡 디스패치와 전송 루프 런타임입니다.
//!
//! - [`Dispatcher`]: 명령 채널을 순차 처리하며 잡 러너를 띄우고 거둡니다.
//! - [`JobRunner`]: 단일 잡의 전송 루프 (예약 대기, 종료 조건, 취소).
//! - [`LogSender`] / [`NetSender`]: TCP/UDP 전송 추상화와 실구현.
//! - [`ControlListener`]: `START:`/`STOP:` 라인을 받는 TCP 제어 서버.

pub mod control;
pub mod dispatcher;
pub mod error;
pub mod runner;
pub mod transport;

pub use control::ControlListener;
pub use dispatcher::{DEFAULT_COMMAND_CAPACITY, Dispatcher, DispatcherBuilder};
pub use error::EngineError;
pub use runner::{JobRunner, RunOutcome};
pub use transport::{LogSender, NetSender};
