//! 기본 제공 플레이스홀더 — ECS 점 표기 필드와 레거시 별칭
//!
//! 각 필드는 호출마다 새 임의 값을 합성하는 zero-argument 생성 함수입니다.
//! `user_agent.original`을 제외한 모든 값은 공백을 포함하지 않으므로
//! 역방향 파싱 패턴(`[^\s]+`)과 안전하게 왕복됩니다.

use chrono::Utc;
use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;

use crate::generator::{GeneratorFn, LogGenerator};

const ACTIONS: &[&str] = &["allow", "deny", "drop", "accept", "reset"];
const OUTCOMES: &[&str] = &["success", "failure", "unknown"];
const TRANSPORTS: &[&str] = &["tcp", "udp", "icmp"];
const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "HEAD", "PATCH"];
const HTTP_STATUS_CODES: &[&str] = &[
    "200", "201", "204", "301", "302", "400", "401", "403", "404", "500", "502", "503",
];
const URL_PATHS: &[&str] = &[
    "/",
    "/index.html",
    "/login",
    "/logout",
    "/admin",
    "/api/v1/users",
    "/api/v1/orders",
    "/static/app.js",
    "/health",
];
const USER_NAMES: &[&str] = &["admin", "root", "alice", "bob", "carol", "svc_backup", "guest"];
const HOST_NAMES: &[&str] = &["web-01", "web-02", "app-01", "db-01", "proxy-01", "bastion"];
const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARN", "ERROR"];
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/126.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) Safari/605.1.15",
    "curl/8.5.0",
];

fn pick(values: &'static [&'static str]) -> String {
    let mut rng = rand::rng();
    values.choose(&mut rng).copied().unwrap_or("").to_owned()
}

fn random_ipv4() -> String {
    let mut rng = rand::rng();
    format!(
        "{}.{}.{}.{}",
        rng.random_range(1..=223u16),
        rng.random_range(0..=255u16),
        rng.random_range(0..=255u16),
        rng.random_range(1..=254u16),
    )
}

fn random_port() -> String {
    let mut rng = rand::rng();
    rng.random_range(1024..=65535u32).to_string()
}

fn random_pid() -> String {
    let mut rng = rand::rng();
    rng.random_range(100..=65535u32).to_string()
}

/// ISO 8601 UTC 타임스탬프 (공백 없음)
fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// 기본 레지스트리 엔트리를 반환합니다.
///
/// ECS 점 표기 이름이 정식 이름이며, 꺾쇠 템플릿에서 쓰이던 짧은 이름은
/// 별칭으로 함께 등록됩니다.
pub(crate) fn builtin_entries() -> Vec<(&'static str, GeneratorFn)> {
    vec![
        // ECS 필드
        ("source.ip", Box::new(random_ipv4) as GeneratorFn),
        ("source.port", Box::new(random_port)),
        ("destination.ip", Box::new(random_ipv4)),
        ("destination.port", Box::new(random_port)),
        // 점 표기 변형 — 방화벽류 템플릿은 dest 축약을 사용
        ("dest.ip", Box::new(random_ipv4)),
        ("dest.port", Box::new(random_port)),
        ("event.action", Box::new(|| pick(ACTIONS))),
        ("event.outcome", Box::new(|| pick(OUTCOMES))),
        ("event.id", Box::new(|| Uuid::new_v4().to_string())),
        ("network.transport", Box::new(|| pick(TRANSPORTS))),
        ("http.request.method", Box::new(|| pick(HTTP_METHODS))),
        ("http.response.status_code", Box::new(|| pick(HTTP_STATUS_CODES))),
        ("url.path", Box::new(|| pick(URL_PATHS))),
        ("user.name", Box::new(|| pick(USER_NAMES))),
        ("user_agent.original", Box::new(|| pick(USER_AGENTS))),
        ("host.name", Box::new(|| pick(HOST_NAMES))),
        ("log.level", Box::new(|| pick(LOG_LEVELS))),
        ("process.pid", Box::new(random_pid)),
        ("@timestamp", Box::new(iso_timestamp)),
        // 레거시 별칭 — <srcip> 형태의 구형 템플릿 지원
        ("srcip", Box::new(random_ipv4)),
        ("dstip", Box::new(random_ipv4)),
        ("srcport", Box::new(random_port)),
        ("dstport", Box::new(random_port)),
        ("proto", Box::new(|| pick(TRANSPORTS))),
        ("action", Box::new(|| pick(ACTIONS))),
        ("username", Box::new(|| pick(USER_NAMES))),
        ("hostname", Box::new(|| pick(HOST_NAMES))),
        ("loglevel", Box::new(|| pick(LOG_LEVELS))),
        ("pid", Box::new(random_pid)),
        ("timestamp", Box::new(iso_timestamp)),
    ]
}

/// 기본 레지스트리로 초기화된 생성기를 만듭니다.
pub fn default_generator() -> LogGenerator {
    let mut generator = LogGenerator::empty();
    for (name, f) in builtin_entries() {
        generator.register(name, f);
    }
    generator
}
