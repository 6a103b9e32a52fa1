//! 역방향 파싱 — 템플릿을 정규식으로 컴파일하고 로그 라인에서 필드 복원
//!
//! 생성 방향의 구조적 역연산입니다. `{dotted.path}` 플레이스홀더를
//! 명명 캡처 그룹으로 바꾸고, 나머지 리터럴은 이스케이프하여 원문 그대로
//! 매칭합니다. 매칭 성공 시 점 경로를 분해해 중첩 JSON 객체를 만듭니다.
//!
//! # 컴파일 단계
//! 1. `{dotted.path}` 추출, 등장 순서대로 위치 토큰 부여
//! 2. 토큰 치환 후 리터럴 전체를 `regex::escape`
//! 3. 토큰을 `(?P<name>[^\s]+)` 캡처 그룹으로 치환
//!    (그룹 이름은 경로의 비영숫자를 `_`로 정규화)
//! 4. 행 시작(`^`)에 앵커 — 접두 매칭 허용, 뒤따르는 텍스트는 무시
//!
//! 캡처는 공백 아닌 문자 1개 이상(`[^\s]+`)입니다. 필드 값이 공백을
//! 포함하지 않는 한 다음 리터럴 또는 행 끝까지 정확히 캡처됩니다.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TemplateError;

/// `{dotted.path}` 플레이스홀더 (생성기와 동일한 문법)
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_.@]+)\}").expect("placeholder regex is valid")
});

/// 파싱 결과
///
/// 매칭 실패 시 `fields`는 항상 `None`입니다 (부분 필드 없음).
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// 라인이 템플릿 패턴에 매칭되었는지 여부
    pub matched: bool,
    /// 복원된 중첩 필드 (매칭 성공 시)
    pub fields: Option<Value>,
    /// 매칭 실패 사유 (매칭 실패 시)
    pub reason: Option<String>,
}

impl ParseOutcome {
    fn matched(fields: Value) -> Self {
        Self {
            matched: true,
            fields: Some(fields),
            reason: None,
        }
    }

    fn unmatched(reason: impl Into<String>) -> Self {
        Self {
            matched: false,
            fields: None,
            reason: Some(reason.into()),
        }
    }
}

/// 컴파일된 템플릿 패턴
///
/// 한 번 컴파일하여 여러 라인에 반복 적용할 수 있습니다.
#[derive(Debug)]
pub struct TemplatePattern {
    regex: Regex,
    /// (정규화된 캡처 이름, 원본 점 경로) — 등장 순서 보존
    groups: Vec<(String, String)>,
}

impl TemplatePattern {
    /// 템플릿 텍스트를 패턴으로 컴파일합니다.
    ///
    /// 중복 경로, 경로 접두 충돌(`a`와 `a.b` 동시 사용), 정규화 후
    /// 이름이 겹치는 경로는 모호한 템플릿으로 거부됩니다.
    pub fn compile(template_text: &str) -> Result<Self, TemplateError> {
        let paths: Vec<String> = PLACEHOLDER_RE
            .captures_iter(template_text)
            .map(|caps| caps[1].to_owned())
            .collect();

        let mut seen = HashSet::new();
        for path in &paths {
            if !seen.insert(path.as_str()) {
                return Err(TemplateError::DuplicatePlaceholder { path: path.clone() });
            }
        }
        for a in &paths {
            for b in &paths {
                if b.len() > a.len() && b.starts_with(a.as_str()) && b.as_bytes()[a.len()] == b'.' {
                    return Err(TemplateError::AmbiguousTemplate {
                        shorter: a.clone(),
                        longer: b.clone(),
                    });
                }
            }
        }

        let mut groups: Vec<(String, String)> = Vec::with_capacity(paths.len());
        for path in &paths {
            let sanitized = sanitize_group_name(path);
            if let Some((_, prior)) = groups.iter().find(|(name, _)| *name == sanitized) {
                return Err(TemplateError::SanitizedCollision {
                    first: prior.clone(),
                    second: path.clone(),
                    sanitized,
                });
            }
            groups.push((sanitized, path.clone()));
        }

        // 위치 토큰으로 치환한 뒤 전체를 이스케이프한다.
        // 토큰은 워드 문자만 포함하므로 이스케이프의 영향을 받지 않는다.
        let mut index = 0usize;
        let tokenized = PLACEHOLDER_RE.replace_all(template_text, |_: &regex::Captures<'_>| {
            let token = format!("__PLACEHOLDER_{index}__");
            index += 1;
            token
        });
        let mut pattern = regex::escape(&tokenized);
        for (i, (sanitized, _)) in groups.iter().enumerate() {
            let token = format!("__PLACEHOLDER_{i}__");
            let group = format!(r"(?P<{sanitized}>[^\s]+)");
            pattern = pattern.replacen(&token, &group, 1);
        }

        let anchored = format!("^{pattern}");
        let regex = Regex::new(&anchored).map_err(|e| TemplateError::CompileFailed {
            reason: e.to_string(),
        })?;

        Ok(Self { regex, groups })
    }

    /// 템플릿의 플레이스홀더 경로를 등장 순서대로 반환합니다.
    pub fn paths(&self) -> Vec<&str> {
        self.groups.iter().map(|(_, path)| path.as_str()).collect()
    }

    /// 컴파일된 정규식 문자열을 반환합니다.
    pub fn as_regex_str(&self) -> &str {
        self.regex.as_str()
    }

    /// 로그 라인을 패턴에 대입해 필드를 복원합니다.
    ///
    /// 접두 매칭이면 성공입니다. 라인 뒤에 템플릿에 없는 텍스트가
    /// 남아 있어도 에러가 아닙니다.
    pub fn parse(&self, line: &str) -> ParseOutcome {
        let Some(caps) = self.regex.captures(line) else {
            return ParseOutcome::unmatched("line does not match template pattern");
        };

        let mut root = Map::new();
        for (sanitized, path) in &self.groups {
            if let Some(m) = caps.name(sanitized) {
                insert_nested(&mut root, path, m.as_str().to_owned());
            }
        }
        ParseOutcome::matched(Value::Object(root))
    }
}

/// 템플릿 컴파일과 파싱을 한 번에 수행하는 편의 함수
pub fn parse_line(template_text: &str, line: &str) -> Result<ParseOutcome, TemplateError> {
    Ok(TemplatePattern::compile(template_text)?.parse(line))
}

/// 점 경로를 캡처 그룹 이름으로 정규화합니다 (비영숫자 → `_`).
///
/// 정규식 문법상 그룹 이름이 숫자로 시작할 수 없으므로 그 경우 `_`를
/// 앞에 붙입니다.
fn sanitize_group_name(path: &str) -> String {
    let mut name: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// 점 경로를 분해하여 중첩 객체에 리프 값을 삽입합니다.
///
/// 경로 접두 충돌은 컴파일 시점에 거부되므로 중간 노드는 항상 객체입니다.
fn insert_nested(root: &mut Map<String, Value>, path: &str, value: String) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_owned(), Value::String(value));
            return;
        }
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(map) => current = map,
            // 컴파일 검증을 통과한 경로에서는 도달 불가
            _ => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn two_field_firewall_line_parses_to_nested_fields() {
        let pattern = TemplatePattern::compile("srcip={source.ip} dstip={dest.ip}").unwrap();
        let outcome = pattern.parse("srcip=1.2.3.4 dstip=5.6.7.8");

        assert!(outcome.matched);
        assert!(outcome.reason.is_none());
        assert_eq!(
            outcome.fields.unwrap(),
            json!({"source": {"ip": "1.2.3.4"}, "dest": {"ip": "5.6.7.8"}})
        );
    }

    #[test]
    fn unrelated_line_does_not_match() {
        let pattern = TemplatePattern::compile("srcip={source.ip}").unwrap();
        let outcome = pattern.parse("different format entirely");

        assert!(!outcome.matched);
        assert!(outcome.fields.is_none(), "no partial fields on failure");
        assert!(outcome.reason.is_some());
    }

    #[test]
    fn prefix_match_ignores_trailing_text() {
        let pattern = TemplatePattern::compile("user={user.name}").unwrap();
        let outcome = pattern.parse("user=alice logged in from 10.0.0.1");

        assert!(outcome.matched);
        assert_eq!(outcome.fields.unwrap(), json!({"user": {"name": "alice"}}));
    }

    #[test]
    fn match_is_anchored_at_line_start() {
        let pattern = TemplatePattern::compile("user={user.name}").unwrap();
        let outcome = pattern.parse("prefix user=alice");
        assert!(!outcome.matched);
    }

    #[test]
    fn literal_regex_metacharacters_are_escaped() {
        let pattern = TemplatePattern::compile("cnt[1] (a+b) val={metric.value}").unwrap();
        let outcome = pattern.parse("cnt[1] (a+b) val=42");

        assert!(outcome.matched);
        assert_eq!(outcome.fields.unwrap(), json!({"metric": {"value": "42"}}));
    }

    #[test]
    fn deep_path_builds_multiple_levels() {
        let pattern =
            TemplatePattern::compile("method={http.request.method} code={http.response.status_code}")
                .unwrap();
        let outcome = pattern.parse("method=GET code=200");

        assert_eq!(
            outcome.fields.unwrap(),
            json!({"http": {"request": {"method": "GET"}, "response": {"status_code": "200"}}})
        );
    }

    #[test]
    fn at_prefixed_path_is_sanitized() {
        let pattern = TemplatePattern::compile("ts={@timestamp}").unwrap();
        let outcome = pattern.parse("ts=2026-08-23T10:00:00.000Z");

        assert!(outcome.matched);
        assert_eq!(
            outcome.fields.unwrap(),
            json!({"@timestamp": "2026-08-23T10:00:00.000Z"})
        );
    }

    #[test]
    fn capture_stops_at_whitespace() {
        let pattern = TemplatePattern::compile("ip={source.ip} rest").unwrap();
        let outcome = pattern.parse("ip=1.2.3.4 rest");
        assert_eq!(outcome.fields.unwrap(), json!({"source": {"ip": "1.2.3.4"}}));

        // 값에 공백이 들어가면 다음 리터럴과 맞지 않아 실패
        let outcome = pattern.parse("ip=1.2 3.4 rest");
        assert!(!outcome.matched);
    }

    #[test]
    fn template_without_placeholders_matches_literally() {
        let pattern = TemplatePattern::compile("heartbeat ok").unwrap();

        let outcome = pattern.parse("heartbeat ok");
        assert!(outcome.matched);
        assert_eq!(outcome.fields.unwrap(), json!({}));

        assert!(!pattern.parse("heartbeat fail").matched);
    }

    #[test]
    fn duplicate_placeholder_is_rejected() {
        let err = TemplatePattern::compile("a={x.y} b={x.y}").unwrap_err();
        assert!(matches!(err, TemplateError::DuplicatePlaceholder { .. }));
    }

    #[test]
    fn path_prefix_collision_is_rejected() {
        let err = TemplatePattern::compile("a={a} b={a.b}").unwrap_err();
        match err {
            TemplateError::AmbiguousTemplate { shorter, longer } => {
                assert_eq!(shorter, "a");
                assert_eq!(longer, "a.b");
            }
            other => panic!("expected AmbiguousTemplate, got {other:?}"),
        }
    }

    #[test]
    fn shared_segment_prefix_is_not_a_collision() {
        // "ab"는 "a.b"의 경로 접두가 아님 (세그먼트 경계 기준)
        TemplatePattern::compile("x={ab} y={a.b}").unwrap();
    }

    #[test]
    fn sanitized_name_collision_is_rejected() {
        let err = TemplatePattern::compile("x={a.b} y={a_b}").unwrap_err();
        assert!(matches!(err, TemplateError::SanitizedCollision { .. }));
    }

    #[test]
    fn sanitize_maps_non_alphanumerics_to_underscore() {
        assert_eq!(sanitize_group_name("source.ip"), "source_ip");
        assert_eq!(sanitize_group_name("@timestamp"), "_timestamp");
        assert_eq!(sanitize_group_name("user_agent.original"), "user_agent_original");
    }

    #[test]
    fn sanitize_guards_leading_digit() {
        assert_eq!(sanitize_group_name("0field"), "_0field");
    }

    #[test]
    fn paths_preserve_template_order() {
        let pattern = TemplatePattern::compile("{b.x} {a.y} {c.z}").unwrap();
        assert_eq!(pattern.paths(), vec!["b.x", "a.y", "c.z"]);
    }

    #[test]
    fn parse_line_convenience_compiles_and_parses() {
        let outcome = parse_line("srcip={source.ip}", "srcip=9.9.9.9").unwrap();
        assert!(outcome.matched);

        let err = parse_line("a={a} {a.b}", "whatever").unwrap_err();
        assert!(matches!(err, TemplateError::AmbiguousTemplate { .. }));
    }

    #[test]
    fn outcome_serializes_for_structured_output() {
        let outcome = parse_line("k={a.b}", "k=v").unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["matched"], json!(true));
        assert_eq!(json["fields"]["a"]["b"], json!("v"));
    }
}
