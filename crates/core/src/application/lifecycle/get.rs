// Get Use Case

use crate::domain::{Job, JobId};
use crate::error::{AppError, Result};
use crate::port::JobStore;

pub async fn execute(store: &dyn JobStore, id: &JobId) -> Result<Job> {
    store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("job {id} not found")))
}
