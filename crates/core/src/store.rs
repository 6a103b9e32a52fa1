//! 잡 스토어 — 잡/템플릿 레코드 조회와 상태 기록
//!
//! [`JobStore`] trait은 엔진이 요구하는 최소 연산만 정의합니다:
//! 단건 조회(`get_job`, `get_template`)와 상태 기록(`set_status`,
//! `set_error`). 스키마 마이그레이션이나 다건 질의는 다루지 않습니다.
//!
//! 상태 기록은 건당 원자적입니다. 러너는 전송 간격 동안 트랜잭션을
//! 유지하지 않습니다.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::types::{JobRecord, JobStatus, TemplateRecord};

/// dyn-compatible future 타입
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ─── JobStore Trait ──────────────────────────────────────────────────

/// 잡 스토어 trait
///
/// RPITIT를 사용하므로 정적 디스패치에 적합합니다.
/// `dyn` 사용이 필요하면 [`DynJobStore`]를 참조하십시오.
pub trait JobStore: Send + Sync {
    /// 잡 레코드를 조회합니다.
    fn get_job(&self, id: &str)
    -> impl Future<Output = Result<JobRecord, StoreError>> + Send;

    /// 템플릿 레코드를 조회합니다.
    fn get_template(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<TemplateRecord, StoreError>> + Send;

    /// 잡 상태를 기록합니다.
    fn set_status(
        &self,
        id: &str,
        status: JobStatus,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 잡을 `Error` 상태로 전환하고 실패 사유를 함께 기록합니다.
    fn set_error(
        &self,
        id: &str,
        reason: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// ─── DynJobStore Trait ───────────────────────────────────────────────

/// dyn-compatible 잡 스토어 trait
///
/// `JobStore`는 RPITIT라서 `dyn JobStore`가 불가합니다.
/// `DynJobStore`는 `BoxFuture`를 반환하여 `Arc<dyn DynJobStore>`로
/// 러너와 디스패처가 스토어를 공유할 수 있게 합니다.
pub trait DynJobStore: Send + Sync {
    /// 잡 레코드를 조회합니다.
    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<JobRecord, StoreError>>;

    /// 템플릿 레코드를 조회합니다.
    fn get_template<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<TemplateRecord, StoreError>>;

    /// 잡 상태를 기록합니다.
    fn set_status<'a>(
        &'a self,
        id: &'a str,
        status: JobStatus,
    ) -> BoxFuture<'a, Result<(), StoreError>>;

    /// 잡을 `Error` 상태로 전환하고 실패 사유를 기록합니다.
    fn set_error<'a>(
        &'a self,
        id: &'a str,
        reason: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// JobStore를 구현한 타입은 자동으로 DynJobStore도 구현됩니다.
impl<T: JobStore> DynJobStore for T {
    fn get_job<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<JobRecord, StoreError>> {
        Box::pin(JobStore::get_job(self, id))
    }

    fn get_template<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<TemplateRecord, StoreError>> {
        Box::pin(JobStore::get_template(self, id))
    }

    fn set_status<'a>(
        &'a self,
        id: &'a str,
        status: JobStatus,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(JobStore::set_status(self, id, status))
    }

    fn set_error<'a>(
        &'a self,
        id: &'a str,
        reason: &'a str,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(JobStore::set_error(self, id, reason))
    }
}

// ─── MemoryStore ─────────────────────────────────────────────────────

/// 인메모리 잡 스토어
///
/// 데몬의 시드 데이터와 테스트에서 사용합니다.
/// 내부적으로 `RwLock`으로 보호되며 clone 시 같은 저장소를 공유합니다.
#[derive(Clone, Default)]
pub struct MemoryStore {
    jobs: Arc<RwLock<HashMap<String, JobRecord>>>,
    templates: Arc<RwLock<HashMap<String, TemplateRecord>>>,
}

impl MemoryStore {
    /// 빈 스토어를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 잡 레코드를 삽입하거나 교체합니다.
    pub async fn insert_job(&self, job: JobRecord) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    /// 템플릿 레코드를 삽입하거나 교체합니다.
    pub async fn insert_template(&self, template: TemplateRecord) {
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template);
    }

    /// 저장된 잡 수를 반환합니다.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// 저장된 템플릿 수를 반환합니다.
    pub async fn template_count(&self) -> usize {
        self.templates.read().await.len()
    }
}

impl JobStore for MemoryStore {
    async fn get_job(&self, id: &str) -> Result<JobRecord, StoreError> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::JobNotFound { id: id.to_owned() })
    }

    async fn get_template(&self, id: &str) -> Result<TemplateRecord, StoreError> {
        self.templates
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::TemplateNotFound { id: id.to_owned() })
    }

    async fn set_status(&self, id: &str, status: JobStatus) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound { id: id.to_owned() })?;
        job.status = status;
        if status != JobStatus::Error {
            job.last_error = None;
        }
        Ok(())
    }

    async fn set_error(&self, id: &str, reason: &str) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::JobNotFound { id: id.to_owned() })?;
        job.status = JobStatus::Error;
        job.last_error = Some(reason.to_owned());
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
