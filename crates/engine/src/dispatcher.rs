//! 디스패처 — 명령 기반 잡 수명주기 관리
//!
//! [`Dispatcher`]는 단일 태스크에서 명령 채널을 순차 처리하는 액터입니다.
//! 잡 맵([`RunnerHandle`])을 배타적으로 소유하므로 START/STOP 경쟁이
//! 구조적으로 발생하지 않습니다. STOP이 START보다 먼저 도착하면 단순
//! no-op입니다.
//!
//! # 명령 처리 규칙
//! - START: 이미 실행 중이면 무시(멱등). 잡/템플릿 조회나 검증이
//!   실패하면 잡을 ERROR로 기록하고 러너를 띄우지 않습니다.
//! - STOP: 러너 취소 후 종료를 기다립니다. 모르는 잡이면 무시합니다.
//!
//! 러너 종료 시 스토어 상태 갱신은 러너 태스크 쪽에서 수행하고,
//! 디스패처는 완료 채널로 통지받아 맵에서 핸들을 거둡니다.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use logcaster_core::command::Command;
use logcaster_core::metrics as m;
use logcaster_core::store::DynJobStore;
use logcaster_core::types::JobStatus;
use logcaster_template::LogGenerator;

use crate::error::EngineError;
use crate::runner::{JobRunner, RunOutcome};
use crate::transport::LogSender;

/// 기본 명령 채널 용량
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

/// 실행 중인 러너의 핸들
struct RunnerHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// 명령 채널을 순차 처리하는 잡 디스패처
pub struct Dispatcher {
    store: Arc<dyn DynJobStore>,
    sender: Arc<dyn LogSender>,
    generator: Arc<LogGenerator>,
    max_active_jobs: usize,
    command_rx: mpsc::Receiver<Command>,
    completion_tx: mpsc::UnboundedSender<String>,
    completion_rx: mpsc::UnboundedReceiver<String>,
    handles: HashMap<String, RunnerHandle>,
}

impl Dispatcher {
    /// 빌더를 반환합니다.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// 메인 루프를 실행합니다.
    ///
    /// 명령 채널이 닫히면 모든 러너를 취소하고 종료합니다.
    pub async fn run(mut self) {
        info!(max_active_jobs = self.max_active_jobs, "dispatcher started");

        loop {
            tokio::select! {
                // 완료 통지를 명령보다 먼저 처리해 맵을 최신으로 유지한다
                biased;
                Some(job_id) = self.completion_rx.recv() => {
                    self.reap(&job_id);
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(command) => self.handle(command).await,
                        None => break,
                    }
                }
            }
        }

        info!("command channel closed, shutting down dispatcher");
        self.shutdown().await;
    }

    async fn handle(&mut self, command: Command) {
        metrics::counter!(m::DISPATCHER_COMMANDS_TOTAL).increment(1);
        debug!(%command, "dispatching command");

        match command {
            Command::Start { job_id } => self.handle_start(&job_id).await,
            Command::Stop { job_id } => self.handle_stop(&job_id).await,
        }
    }

    /// 완료 채널로 통지된 러너를 맵에서 제거합니다.
    ///
    /// STOP 처리에서 이미 제거된 잡의 통지는 무시합니다.
    fn reap(&mut self, job_id: &str) {
        if self.handles.remove(job_id).is_some() {
            metrics::gauge!(m::RUNNER_ACTIVE).decrement(1.0);
            debug!(job_id, "runner reaped");
        }
    }

    async fn handle_start(&mut self, job_id: &str) {
        if let Some(handle) = self.handles.get(job_id) {
            if !handle.join.is_finished() {
                warn!(job_id, "start ignored: job already running");
                metrics::counter!(m::DISPATCHER_COMMANDS_IGNORED_TOTAL).increment(1);
                return;
            }
            // 완료 통지보다 먼저 도착한 START는 직접 거둔다
            self.reap(job_id);
        }

        if self.handles.len() >= self.max_active_jobs {
            warn!(
                job_id,
                limit = self.max_active_jobs,
                "start rejected: active job limit reached"
            );
            let reason = EngineError::JobRejected {
                id: job_id.to_owned(),
                reason: format!("active job limit ({}) reached", self.max_active_jobs),
            };
            self.record_start_failure(job_id, &reason).await;
            return;
        }

        let job = match self.store.get_job(job_id).await {
            Ok(job) => job,
            Err(e) => {
                warn!(job_id, error = %e, "start ignored: job lookup failed");
                metrics::counter!(m::DISPATCHER_COMMANDS_IGNORED_TOTAL).increment(1);
                return;
            }
        };

        if let Err(e) = job.validate() {
            let reason = EngineError::InvalidJob {
                id: job_id.to_owned(),
                reason: e.to_string(),
            };
            self.record_start_failure(job_id, &reason).await;
            return;
        }

        let template = match self.store.get_template(&job.template_id).await {
            Ok(template) => template,
            Err(e) => {
                let reason = EngineError::Store(e);
                self.record_start_failure(job_id, &reason).await;
                return;
            }
        };

        if let Err(e) = self.store.set_status(job_id, JobStatus::Running).await {
            warn!(job_id, error = %e, "failed to mark job running");
            return;
        }

        let token = CancellationToken::new();
        let runner = JobRunner::new(
            job,
            template,
            Arc::clone(&self.sender),
            Arc::clone(&self.generator),
        );

        let store = Arc::clone(&self.store);
        let completion_tx = self.completion_tx.clone();
        let runner_token = token.clone();
        let id = job_id.to_owned();

        let join = tokio::spawn(async move {
            let outcome = runner.run(runner_token).await;
            finalize_job(store.as_ref(), &id, outcome).await;
            let _ = completion_tx.send(id);
        });

        self.handles
            .insert(job_id.to_owned(), RunnerHandle { token, join });
        metrics::gauge!(m::RUNNER_ACTIVE).increment(1.0);
        info!(job_id, active = self.handles.len(), "job started");
    }

    async fn handle_stop(&mut self, job_id: &str) {
        let Some(handle) = self.handles.remove(job_id) else {
            debug!(job_id, "stop ignored: job not running");
            metrics::counter!(m::DISPATCHER_COMMANDS_IGNORED_TOTAL).increment(1);
            return;
        };

        handle.token.cancel();
        if let Err(e) = handle.join.await {
            warn!(job_id, error = %e, "runner task join failed");
        }
        metrics::gauge!(m::RUNNER_ACTIVE).decrement(1.0);
        info!(job_id, "job stopped");
    }

    /// 시작 실패를 스토어에 ERROR로 기록합니다. 러너는 생성되지 않습니다.
    async fn record_start_failure(&self, job_id: &str, reason: &EngineError) {
        warn!(job_id, error = %reason, "job start failed");
        if let Err(e) = self.store.set_error(job_id, &reason.to_string()).await {
            warn!(job_id, error = %e, "failed to record job error");
        }
    }

    /// 모든 러너를 취소하고 종료를 기다립니다.
    async fn shutdown(&mut self) {
        let handles: Vec<(String, RunnerHandle)> = self.handles.drain().collect();
        for (_, handle) in &handles {
            handle.token.cancel();
        }
        for (job_id, handle) in handles {
            if let Err(e) = handle.join.await {
                warn!(job_id, error = %e, "runner task join failed during shutdown");
            }
            metrics::gauge!(m::RUNNER_ACTIVE).decrement(1.0);
        }
        info!("all runners stopped");
    }
}

/// 러너 종료 결과를 스토어 상태로 반영합니다.
async fn finalize_job(store: &dyn DynJobStore, job_id: &str, outcome: RunOutcome) {
    let result = match outcome {
        RunOutcome::Completed { sent } => {
            debug!(job_id, sent, "job completed");
            store.set_status(job_id, JobStatus::Stopped).await
        }
        RunOutcome::Cancelled { sent } => {
            debug!(job_id, sent, "job cancelled");
            store.set_status(job_id, JobStatus::Stopped).await
        }
        RunOutcome::Failed { sent, error } => {
            debug!(job_id, sent, "job failed");
            store.set_error(job_id, &error.to_string()).await
        }
    };
    if let Err(e) = result {
        warn!(job_id, error = %e, "failed to record final job status");
    }
}

/// 디스패처 빌더
///
/// 스토어와 전송기를 연결하고 명령 채널을 생성합니다.
pub struct DispatcherBuilder {
    store: Option<Arc<dyn DynJobStore>>,
    sender: Option<Arc<dyn LogSender>>,
    generator: Option<Arc<LogGenerator>>,
    max_active_jobs: usize,
    command_capacity: usize,
}

impl DispatcherBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            store: None,
            sender: None,
            generator: None,
            max_active_jobs: 256,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }

    /// 잡 스토어를 지정합니다.
    pub fn store(mut self, store: Arc<dyn DynJobStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 전송기를 지정합니다.
    pub fn sender(mut self, sender: Arc<dyn LogSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// 생성기를 지정합니다. 지정하지 않으면 기본 레지스트리를 사용합니다.
    pub fn generator(mut self, generator: Arc<LogGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// 동시 활성 잡 한도를 지정합니다.
    pub fn max_active_jobs(mut self, limit: usize) -> Self {
        self.max_active_jobs = limit;
        self
    }

    /// 명령 채널 용량을 지정합니다.
    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    /// 디스패처와 명령 송신 채널을 빌드합니다.
    ///
    /// # Errors
    /// 스토어 또는 전송기가 지정되지 않으면 실패합니다.
    pub fn build(self) -> Result<(Dispatcher, mpsc::Sender<Command>), EngineError> {
        let store = self.store.ok_or_else(|| EngineError::Channel(
            "dispatcher requires a job store".to_owned(),
        ))?;
        let sender = self.sender.ok_or_else(|| EngineError::Channel(
            "dispatcher requires a log sender".to_owned(),
        ))?;
        let generator = self
            .generator
            .unwrap_or_else(|| Arc::new(LogGenerator::new()));

        let (command_tx, command_rx) = mpsc::channel(self.command_capacity);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher {
            store,
            sender,
            generator,
            max_active_jobs: self.max_active_jobs,
            command_rx,
            completion_tx,
            completion_rx,
            handles: HashMap::new(),
        };

        Ok((dispatcher, command_tx))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
