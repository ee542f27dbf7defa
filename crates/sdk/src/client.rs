//! jobkeeper Client Implementation

use std::time::Duration;

use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;

use crate::error::{Result, SdkError};
use crate::types::{
    CompleteRequest, CompleteResponse, FailRequest, FailResponse, HealthRequest, HealthResponse,
    LeaseRequest, LeaseResponse, ListRequest, ListResponse, ReconcileRequest, ReconcileResponse,
    RequeueReadyRequest, RequeueReadyResponse, StartRequest, StartResponse, SubmitRequest,
    SubmitResponse,
};

/// High-level client for a jobkeeper daemon's JSON-RPC surface.
///
/// # Example
///
/// ```no_run
/// use jobkeeper_sdk::JobkeeperClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = JobkeeperClient::connect("http://127.0.0.1:7527").await?;
/// # Ok(())
/// # }
/// ```
pub struct JobkeeperClient {
    client: HttpClient,
}

impl JobkeeperClient {
    /// Connect to a jobkeeper daemon's RPC endpoint, e.g. `http://127.0.0.1:7527`.
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url.as_ref())
            .map_err(|e| SdkError::Connection(format!("failed to create client: {e}")))?;

        Ok(Self { client })
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let params = rpc_params![HealthRequest {}];
        Ok(self.client.request("jobs.health.v1", params).await?)
    }

    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse> {
        let params = rpc_params![request];
        Ok(self.client.request("jobs.submit.v1", params).await?)
    }

    pub async fn list(&self, request: ListRequest) -> Result<ListResponse> {
        let params = rpc_params![request];
        Ok(self.client.request("jobs.list.v1", params).await?)
    }

    pub async fn lease(
        &self,
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
        lease_seconds: i64,
    ) -> Result<LeaseResponse> {
        let params = rpc_params![LeaseRequest {
            job_id: job_id.into(),
            worker_id: worker_id.into(),
            lease_seconds,
        }];
        Ok(self.client.request("jobs.lease.v1", params).await?)
    }

    pub async fn start(&self, job_id: impl Into<String>, worker_id: impl Into<String>) -> Result<StartResponse> {
        let params = rpc_params![StartRequest {
            job_id: job_id.into(),
            worker_id: worker_id.into(),
        }];
        Ok(self.client.request("jobs.start.v1", params).await?)
    }

    pub async fn complete(
        &self,
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
    ) -> Result<CompleteResponse> {
        let params = rpc_params![CompleteRequest {
            job_id: job_id.into(),
            worker_id: worker_id.into(),
        }];
        Ok(self.client.request("jobs.complete.v1", params).await?)
    }

    pub async fn fail(
        &self,
        job_id: impl Into<String>,
        worker_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Result<FailResponse> {
        let params = rpc_params![FailRequest {
            job_id: job_id.into(),
            worker_id: worker_id.into(),
            error: error.into(),
        }];
        Ok(self.client.request("jobs.fail.v1", params).await?)
    }

    pub async fn requeue_ready(&self, limit: i64) -> Result<RequeueReadyResponse> {
        let params = rpc_params![RequeueReadyRequest { limit }];
        Ok(self.client.request("jobs.requeue_ready.v1", params).await?)
    }

    pub async fn reconcile(&self, limit: i64) -> Result<ReconcileResponse> {
        let params = rpc_params![ReconcileRequest { limit }];
        Ok(self.client.request("jobs.reconcile.v1", params).await?)
    }
}
