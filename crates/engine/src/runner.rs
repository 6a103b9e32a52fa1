//! 잡 러너 — 단일 잡의 전송 루프
//!
//! [`JobRunner`]는 시작 시점에 잡과 템플릿 정의를 스냅샷으로 받아
//! 전송 루프를 수행합니다. 루프 중 스토어의 정의 변경은 반영하지
//! 않습니다. 상태 전이는 다음과 같습니다:
//!
//! ```text
//! ScheduledWait -> Sending -> Completed | Cancelled | Failed
//! ```
//!
//! 전송 실패는 재시도 없이 즉시 Failed로 전이합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logcaster_core::metrics as m;
use logcaster_core::types::{JobRecord, TemplateRecord};
use logcaster_template::LogGenerator;

use crate::error::EngineError;
use crate::transport::LogSender;

/// 러너 종료 결과
#[derive(Debug)]
pub enum RunOutcome {
    /// 종료 조건(횟수 또는 종료 시각) 도달
    Completed { sent: u64 },
    /// 취소 신호로 중단
    Cancelled { sent: u64 },
    /// 전송 실패로 중단
    Failed { sent: u64, error: EngineError },
}

impl RunOutcome {
    /// 종료까지 전송한 라인 수
    pub fn sent(&self) -> u64 {
        match self {
            Self::Completed { sent } | Self::Cancelled { sent } | Self::Failed { sent, .. } => {
                *sent
            }
        }
    }
}

/// 단일 잡의 전송 루프를 수행하는 러너
pub struct JobRunner {
    job: JobRecord,
    template: TemplateRecord,
    sender: Arc<dyn LogSender>,
    generator: Arc<LogGenerator>,
}

impl JobRunner {
    /// 잡과 템플릿 스냅샷으로 러너를 생성합니다.
    pub fn new(
        job: JobRecord,
        template: TemplateRecord,
        sender: Arc<dyn LogSender>,
        generator: Arc<LogGenerator>,
    ) -> Self {
        Self {
            job,
            template,
            sender,
            generator,
        }
    }

    /// 전송 루프를 실행합니다.
    ///
    /// `token`이 취소되면 현재 대기를 중단하고 즉시 반환합니다.
    /// 전송 도중의 취소는 해당 전송이 끝난 뒤 반영됩니다.
    pub async fn run(self, token: CancellationToken) -> RunOutcome {
        let job_id = self.job.id.clone();
        let destination = format!("{}:{}", self.job.destination_host, self.job.destination_port);
        let interval = Duration::from_millis(self.job.send_interval_ms);
        let mut sent: u64 = 0;

        // 예약 시작: start_time이 미래이면 취소 가능하게 대기
        if let Some(start) = self.job.start_time {
            let now = Utc::now();
            if start > now {
                let wait = (start - now).to_std().unwrap_or(Duration::ZERO);
                debug!(job_id, wait_secs = wait.as_secs(), "waiting for scheduled start");
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = token.cancelled() => {
                        info!(job_id, "cancelled before scheduled start");
                        return RunOutcome::Cancelled { sent };
                    }
                }
            }
        }

        info!(
            job_id,
            destination,
            protocol = %self.job.protocol,
            interval_ms = self.job.send_interval_ms,
            "send loop started"
        );

        loop {
            // 종료 조건은 전송 전에 검사한다
            if let Some(end) = self.job.end_time
                && Utc::now() >= end
            {
                debug!(job_id, sent, "end time reached");
                break;
            }
            if let Some(limit) = self.job.send_count
                && sent >= limit
            {
                debug!(job_id, sent, "send count reached");
                break;
            }

            let line = self.generator.render(&self.template.content_format);

            if let Err(e) = self
                .sender
                .send(self.job.protocol, &destination, &line)
                .await
            {
                warn!(job_id, error = %e, sent, "send failed, stopping job");
                metrics::counter!(
                    m::RUNNER_SEND_FAILURES_TOTAL,
                    m::LABEL_JOB_ID => job_id.clone(),
                )
                .increment(1);
                metrics::counter!(m::RUNNER_FAILED_TOTAL).increment(1);
                return RunOutcome::Failed { sent, error: e };
            }

            sent += 1;
            metrics::counter!(
                m::RUNNER_SENDS_TOTAL,
                m::LABEL_JOB_ID => job_id.clone(),
                m::LABEL_PROTOCOL => self.job.protocol.to_string(),
            )
            .increment(1);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = token.cancelled() => {
                    info!(job_id, sent, "send loop cancelled");
                    return RunOutcome::Cancelled { sent };
                }
            }
        }

        info!(job_id, sent, "send loop completed");
        metrics::counter!(m::RUNNER_COMPLETED_TOTAL).increment(1);
        RunOutcome::Completed { sent }
    }
}
