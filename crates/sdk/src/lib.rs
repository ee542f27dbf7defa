//! jobkeeper SDK - Rust Client Library
//!
//! A thin JSON-RPC client plus a reference `Worker` poll loop for binaries
//! that want to actually execute leased jobs.
//!
//! # Example
//!
//! ```no_run
//! use jobkeeper_sdk::{JobkeeperClient, SubmitRequest};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JobkeeperClient::connect("http://127.0.0.1:7527").await?;
//!
//!     let response = client.submit(SubmitRequest {
//!         job_type: "send_email".to_string(),
//!         payload: json!({"to": "user@example.com"}),
//!         priority: 5,
//!         max_attempts: 5,
//!     }).await?;
//!
//!     println!("job submitted: {}", response.job.id);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod shutdown;
mod types;
mod worker;

pub use client::JobkeeperClient;
pub use error::{Result, SdkError};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use types::{
    CompleteRequest, CompleteResponse, FailRequest, FailResponse, HealthRequest, HealthResponse,
    JobDto, LeaseRequest, LeaseResponse, ListRequest, ListResponse, ReconcileRequest,
    ReconcileResponse, RequeueReadyRequest, RequeueReadyResponse, StartRequest, StartResponse,
    SubmitRequest, SubmitResponse,
};
pub use worker::{handler, JobHandler, Worker};
