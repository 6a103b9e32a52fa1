//! 로그 라인 생성 — 플레이스홀더 치환
//!
//! [`LogGenerator`]는 플레이스홀더 이름 → 값 생성 함수의 레지스트리를
//! 소유하는 명시적 인스턴스입니다. 전역 싱글턴이 아니므로 테스트와
//! 구성 요소별로 독립적인 레지스트리를 쓸 수 있습니다.
//!
//! # 치환 규칙
//! 1. `{dotted.path}` 형태를 먼저 모두 치환
//! 2. 그 결과에서 `<name>` 레거시 형태를 치환
//! 3. 레지스트리에 없는 이름은 원문 그대로 유지 (에러 아님)
//!
//! 값은 호출마다 새로 생성되며 캐싱하지 않습니다.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::fields;

/// 플레이스홀더 값 생성 함수
pub type GeneratorFn = Box<dyn Fn() -> String + Send + Sync>;

/// `{dotted.path}` 플레이스홀더 (점 표기, `@` 허용)
static BRACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_.@]+)\}").expect("brace placeholder regex is valid")
});

/// `<name>` 레거시 플레이스홀더
static ANGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z0-9_]+)>").expect("angle placeholder regex is valid"));

/// 플레이스홀더 레지스트리를 소유하는 로그 생성기
pub struct LogGenerator {
    registry: HashMap<String, GeneratorFn>,
}

impl LogGenerator {
    /// 기본 제공 필드가 등록된 생성기를 만듭니다.
    pub fn new() -> Self {
        fields::default_generator()
    }

    /// 빈 레지스트리의 생성기를 만듭니다.
    pub fn empty() -> Self {
        Self {
            registry: HashMap::new(),
        }
    }

    /// 플레이스홀더를 등록합니다. 같은 이름이 있으면 교체합니다.
    ///
    /// 런타임 확장 지점입니다. 치환 알고리즘은 등록 내용과 무관하게
    /// 동일하게 동작합니다.
    pub fn register(&mut self, name: impl Into<String>, f: GeneratorFn) {
        self.registry.insert(name.into(), f);
    }

    /// 등록된 플레이스홀더 이름 목록을 정렬하여 반환합니다.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 이름이 등록되어 있는지 확인합니다.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// 템플릿 텍스트의 플레이스홀더를 값으로 치환합니다.
    ///
    /// 미등록 플레이스홀더는 원문 그대로 남습니다.
    pub fn render(&self, template_text: &str) -> String {
        let pass_one = BRACE_RE.replace_all(template_text, |caps: &Captures<'_>| {
            self.substitute(&caps[1], &caps[0])
        });
        ANGLE_RE
            .replace_all(&pass_one, |caps: &Captures<'_>| {
                self.substitute(&caps[1], &caps[0])
            })
            .into_owned()
    }

    fn substitute(&self, name: &str, original: &str) -> String {
        match self.registry.get(name) {
            Some(f) => f(),
            None => original.to_owned(),
        }
    }
}

impl Default for LogGenerator {
    fn default() -> Self {
        Self::new()
    }
}
