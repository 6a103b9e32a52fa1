//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 구성 요소는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::gauge!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logcaster_`
//! - 구성 요소: `runner_`, `dispatcher_`, `control_`, `daemon_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logcaster_core::metrics::RUNNER_SENDS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 프로토콜 레이블 키 (TCP, UDP)
pub const LABEL_PROTOCOL: &str = "protocol";

/// 잡 ID 레이블 키
pub const LABEL_JOB_ID: &str = "job_id";

// ─── Runner 메트릭 ──────────────────────────────────────────────────

/// Runner: 전송된 로그 라인 수 (counter, label: protocol)
pub const RUNNER_SENDS_TOTAL: &str = "logcaster_runner_sends_total";

/// Runner: 전송 실패 수 (counter, label: protocol)
pub const RUNNER_SEND_FAILURES_TOTAL: &str = "logcaster_runner_send_failures_total";

/// Runner: 현재 실행 중인 러너 수 (gauge)
pub const RUNNER_ACTIVE: &str = "logcaster_runner_active";

/// Runner: 정상 완료된 실행 수 (counter)
pub const RUNNER_COMPLETED_TOTAL: &str = "logcaster_runner_completed_total";

/// Runner: 오류로 종료된 실행 수 (counter)
pub const RUNNER_FAILED_TOTAL: &str = "logcaster_runner_failed_total";

// ─── Dispatcher 메트릭 ──────────────────────────────────────────────

/// Dispatcher: 처리된 명령 수 (counter)
pub const DISPATCHER_COMMANDS_TOTAL: &str = "logcaster_dispatcher_commands_total";

/// Dispatcher: 중복/무대상으로 무시된 명령 수 (counter)
pub const DISPATCHER_COMMANDS_IGNORED_TOTAL: &str = "logcaster_dispatcher_commands_ignored_total";

// ─── Control 메트릭 ─────────────────────────────────────────────────

/// Control: 수신된 명령 라인 수 (counter)
pub const CONTROL_LINES_TOTAL: &str = "logcaster_control_lines_total";

/// Control: 파싱 실패로 폐기된 라인 수 (counter)
pub const CONTROL_LINES_REJECTED_TOTAL: &str = "logcaster_control_lines_rejected_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "logcaster_daemon_uptime_seconds";

/// Daemon: 시드로 적재된 잡 수 (gauge)
pub const DAEMON_SEEDED_JOBS: &str = "logcaster_daemon_seeded_jobs";

/// Daemon: 빌드 정보 (gauge, 항상 1, labels: version)
pub const DAEMON_BUILD_INFO: &str = "logcaster_daemon_build_info";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_gauge!()`를 호출하여
/// Prometheus HELP 텍스트를 설정합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `logcaster-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    // Runner
    describe_counter!(
        RUNNER_SENDS_TOTAL,
        "Total number of log lines sent by job runners"
    );
    describe_counter!(
        RUNNER_SEND_FAILURES_TOTAL,
        "Total number of transport send failures"
    );
    describe_gauge!(RUNNER_ACTIVE, "Number of job runners currently executing");
    describe_counter!(
        RUNNER_COMPLETED_TOTAL,
        "Total number of job runs that completed or were cancelled"
    );
    describe_counter!(
        RUNNER_FAILED_TOTAL,
        "Total number of job runs that ended in error"
    );

    // Dispatcher
    describe_counter!(
        DISPATCHER_COMMANDS_TOTAL,
        "Total number of start/stop commands processed by the dispatcher"
    );
    describe_counter!(
        DISPATCHER_COMMANDS_IGNORED_TOTAL,
        "Total number of commands ignored as duplicate start or stop without a runner"
    );

    // Control
    describe_counter!(
        CONTROL_LINES_TOTAL,
        "Total number of command lines received on the control listener"
    );
    describe_counter!(
        CONTROL_LINES_REJECTED_TOTAL,
        "Total number of malformed command lines dropped at ingress"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Logcaster daemon uptime in seconds");
    describe_gauge!(
        DAEMON_SEEDED_JOBS,
        "Number of job records loaded from seed files"
    );
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
