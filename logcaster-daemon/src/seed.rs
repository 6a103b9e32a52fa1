//! Seed file loading.
//!
//! The daemon is state-free across restarts: template and job
//! definitions are loaded from TOML seed files at startup and held in
//! the in-memory store. Jobs always start in IDLE regardless of the
//! status recorded in the file.
//!
//! # File format
//!
//! ```toml
//! # templates.toml
//! [[templates]]
//! id = "firewall-accept"
//! content_format = "srcip={source.ip} dstip={dest.ip} action={event.action}"
//! is_predefined = true
//!
//! # jobs.toml
//! [[jobs]]
//! id = "burst-100"
//! template_id = "firewall-accept"
//! protocol = "UDP"
//! destination_host = "127.0.0.1"
//! destination_port = 5514
//! send_count = 100
//! send_interval_ms = 50
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use logcaster_core::config::SeedConfig;
use logcaster_core::metrics as m;
use logcaster_core::store::{JobStore, MemoryStore};
use logcaster_core::types::{JobRecord, JobStatus, TemplateRecord};

#[derive(Debug, Deserialize)]
struct TemplateSeedFile {
    #[serde(default)]
    templates: Vec<TemplateRecord>,
}

#[derive(Debug, Deserialize)]
struct JobSeedFile {
    #[serde(default)]
    jobs: Vec<JobRecord>,
}

/// Load seed files into the store.
///
/// Missing file paths (empty strings in config) are skipped; a job
/// referencing an unknown template is rejected at load time rather
/// than at START.
///
/// Returns `(template_count, job_count)`.
pub async fn load_seed(config: &SeedConfig, store: &MemoryStore) -> Result<(usize, usize)> {
    let mut template_count = 0;
    let mut job_count = 0;

    if !config.templates_file.is_empty() {
        let templates = load_templates(Path::new(&config.templates_file)).await?;
        template_count = templates.len();
        for template in templates {
            store.insert_template(template).await;
        }
    }

    if !config.jobs_file.is_empty() {
        let jobs = load_jobs(Path::new(&config.jobs_file)).await?;
        job_count = jobs.len();
        for job in jobs {
            if store.get_template(&job.template_id).await.is_err() {
                anyhow::bail!(
                    "job '{}' references unknown template '{}'",
                    job.id,
                    job.template_id
                );
            }
            store.insert_job(job).await;
        }
    }

    metrics::gauge!(m::DAEMON_SEEDED_JOBS).set(job_count as f64);
    tracing::info!(
        templates = template_count,
        jobs = job_count,
        "seed files loaded"
    );

    Ok((template_count, job_count))
}

/// Parse a template seed file.
async fn load_templates(path: &Path) -> Result<Vec<TemplateRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read template seed file {}", path.display()))?;
    let file: TemplateSeedFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse template seed file {}", path.display()))?;

    for template in &file.templates {
        if template.id.is_empty() {
            anyhow::bail!("template with empty id in {}", path.display());
        }
        if template.content_format.is_empty() {
            anyhow::bail!("template '{}' has empty content_format", template.id);
        }
    }

    Ok(file.templates)
}

/// Parse a job seed file. Every job is validated and reset to IDLE.
async fn load_jobs(path: &Path) -> Result<Vec<JobRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read job seed file {}", path.display()))?;
    let file: JobSeedFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse job seed file {}", path.display()))?;

    let mut jobs = file.jobs;
    for job in &mut jobs {
        job.validate()
            .with_context(|| format!("invalid job '{}' in {}", job.id, path.display()))?;
        job.status = JobStatus::Idle;
        job.last_error = None;
    }

    Ok(jobs)
}
