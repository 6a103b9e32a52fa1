//! 템플릿 엔진 에러 타입

/// 템플릿 컴파일/파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// 동일 플레이스홀더가 한 템플릿에 두 번 등장
    #[error("duplicate placeholder: {{{path}}}")]
    DuplicatePlaceholder { path: String },

    /// 경로 접두 충돌 — `a`와 `a.b`가 함께 사용되면 중첩 구조가 모호해짐
    #[error("ambiguous template: '{shorter}' is a path prefix of '{longer}'")]
    AmbiguousTemplate { shorter: String, longer: String },

    /// 서로 다른 경로가 같은 캡처 그룹 이름으로 정규화됨
    #[error("placeholders '{first}' and '{second}' collide on capture name '{sanitized}'")]
    SanitizedCollision {
        first: String,
        second: String,
        sanitized: String,
    },

    /// 정규식 컴파일 실패
    #[error("pattern compilation failed: {reason}")]
    CompileFailed { reason: String },
}
