//! Logcaster 템플릿 엔진
//!
//! 순수 텍스트 변환 계층입니다. I/O 없이 두 방향의 변환을 제공합니다:
//!
//! - **생성**: [`LogGenerator`]가 `{dotted.path}` / `<name>` 플레이스홀더를
//!   합성 값으로 치환하여 로그 라인을 만듭니다.
//! - **파싱**: [`TemplatePattern`]이 같은 문법의 템플릿을 정규식으로
//!   컴파일하여 로그 라인에서 중첩 필드를 복원합니다.
//!
//! 두 방향은 동일한 플레이스홀더 문법을 공유합니다. 공백 없는 값만
//! 생성하는 템플릿이면 `parse(render(t))`는 항상 매칭됩니다.

pub mod error;
pub mod fields;
pub mod generator;
pub mod pattern;

pub use error::TemplateError;
pub use generator::{GeneratorFn, LogGenerator};
pub use pattern::{ParseOutcome, TemplatePattern, parse_line};
