// List Use Case

use crate::domain::Job;
use crate::error::Result;
use crate::port::{JobListFilter, JobStore};

pub async fn execute(store: &dyn JobStore, filter: &JobListFilter) -> Result<Vec<Job>> {
    store.list(filter).await
}
