//! Background batch execution with pollable progress.

use std::{sync::Arc, time::Duration};

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    jobs::{
        registry::JobRegistry,
        worker::{BatchContext, SlideWorker},
    },
    model::job::{BatchRequest, JobTicket, RenderJob, SlideResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrchestratorOpts {
    /// How long a terminal job stays queryable.
    pub retention: Duration,
}

impl Default for OrchestratorOpts {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(30 * 60),
        }
    }
}

/// Accepts batches, runs them slide by slide in the background, and answers status queries.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<dyn JobRegistry>,
    worker: Arc<dyn SlideWorker>,
    opts: OrchestratorOpts,
}

fn new_job_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

impl Orchestrator {
    pub fn new(
        registry: Arc<dyn JobRegistry>,
        worker: Arc<dyn SlideWorker>,
        opts: OrchestratorOpts,
    ) -> Self {
        Self {
            registry,
            worker,
            opts,
        }
    }

    /// Validate, register and start a batch. Returns before any slide is produced.
    ///
    /// Outside a tokio runtime this is a `Validation` error and nothing is registered.
    #[tracing::instrument(skip_all, fields(slides = request.slides.len()))]
    pub fn submit(&self, request: BatchRequest) -> CarouselResult<JobTicket> {
        request.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| CarouselError::validation("batch submission needs a tokio runtime"))?;

        let job_id = new_job_id();
        let total = request.slides.len();
        let ctx = BatchContext::from_request(&job_id, &request);
        self.registry
            .create(RenderJob::new(&job_id, &ctx.brand.id, total))?;
        tracing::info!(job = %job_id, total, brand = %ctx.brand.id, "batch accepted");

        let registry = Arc::clone(&self.registry);
        let worker = Arc::clone(&self.worker);
        let retention = self.opts.retention;
        let id = job_id.clone();
        let inner = runtime.clone();
        runtime.spawn(async move {
            let run = inner.spawn(drive(
                Arc::clone(&registry),
                worker,
                ctx,
                request,
            ))
            .await;
            let failure = match run {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(join) if join.is_panic() => Some("generation loop panicked".to_string()),
                Err(join) => Some(format!("generation loop aborted: {join}")),
            };
            if let Some(message) = failure {
                tracing::error!(job = %id, error = %message, "batch failed");
                if let Err(err) = registry.update(&id, &mut |job| {
                    job.fail(message.clone());
                    Ok(())
                }) {
                    tracing::warn!(job = %id, error = %err, "could not mark job as failed");
                }
            }

            tokio::time::sleep(retention).await;
            registry.evict(&id);
            tracing::debug!(job = %id, "job evicted");
        });

        Ok(JobTicket { job_id, total })
    }

    /// Snapshot of a job's progress.
    pub fn status(&self, job_id: &str) -> CarouselResult<RenderJob> {
        self.registry
            .get(job_id)
            .ok_or_else(|| CarouselError::not_found(format!("job '{job_id}'")))
    }
}

#[tracing::instrument(skip_all, fields(job = %ctx.job_id))]
async fn drive(
    registry: Arc<dyn JobRegistry>,
    worker: Arc<dyn SlideWorker>,
    ctx: BatchContext,
    request: BatchRequest,
) -> CarouselResult<()> {
    for (idx, slide) in request.slides.iter().enumerate() {
        let slide_number = idx + 1;
        registry.update(&ctx.job_id, &mut |job| job.begin_slide(slide_number))?;

        let result = worker.produce(&ctx, slide_number, slide).await;
        if let Err(err) = &result {
            tracing::warn!(job = %ctx.job_id, slide = slide_number, error = %err, "slide failed");
        }
        let mut record = Some(SlideResult::from_result(slide_number, result));
        registry.update(&ctx.job_id, &mut |job| match record.take() {
            Some(r) => job.record(r),
            None => Ok(()),
        })?;
    }
    registry.update(&ctx.job_id, &mut |job| job.finish())?;
    tracing::info!("batch done");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/orchestrator.rs"]
mod tests;
