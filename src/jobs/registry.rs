use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    model::job::RenderJob,
};

/// Shared store of job records. Each record is mutated only by its own generation loop.
pub trait JobRegistry: Send + Sync {
    /// Insert a new job; an existing id is rejected.
    fn create(&self, job: RenderJob) -> CarouselResult<()>;

    /// Snapshot of a job.
    fn get(&self, id: &str) -> Option<RenderJob>;

    fn update(
        &self,
        id: &str,
        f: &mut dyn FnMut(&mut RenderJob) -> CarouselResult<()>,
    ) -> CarouselResult<()>;

    fn evict(&self, id: &str) -> Option<RenderJob>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJobRegistry {
    jobs: DashMap<String, RenderJob>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobRegistry for InMemoryJobRegistry {
    fn create(&self, job: RenderJob) -> CarouselResult<()> {
        match self.jobs.entry(job.id.clone()) {
            Entry::Occupied(_) => Err(CarouselError::validation(format!(
                "job {} already exists",
                job.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Option<RenderJob> {
        self.jobs.get(id).map(|job| job.clone())
    }

    fn update(
        &self,
        id: &str,
        f: &mut dyn FnMut(&mut RenderJob) -> CarouselResult<()>,
    ) -> CarouselResult<()> {
        let mut job = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| CarouselError::not_found(format!("job {id}")))?;
        f(job.value_mut())
    }

    fn evict(&self, id: &str) -> Option<RenderJob> {
        self.jobs.remove(id).map(|(_, job)| job)
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/registry.rs"]
mod tests;
