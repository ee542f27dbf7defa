//! Simple SDK Example
//!
//! Demonstrates basic usage of the jobkeeper SDK.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package jobkeeper-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple
//!    ```

use jobkeeper_sdk::{JobkeeperClient, SubmitRequest};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("jobkeeper SDK - Simple Example");
    println!("================================\n");

    println!("1. Connecting to daemon...");
    let client = JobkeeperClient::connect("http://127.0.0.1:7527").await?;
    println!("   ✓ Connected\n");

    println!("2. Submitting a job...");
    let submit_response = client
        .submit(SubmitRequest {
            job_type: "send_email".to_string(),
            priority: 5,
            max_attempts: 3,
            payload: json!({
                "to": "user@example.com",
                "subject": "welcome"
            }),
        })
        .await?;

    println!("   ✓ Job submitted:");
    println!("     - ID: {}", submit_response.job.id);
    println!("     - Status: {}\n", submit_response.job.status);

    println!("3. Leasing and running the job...");
    let worker_id = "example-worker-1";
    match client.lease(submit_response.job.id.clone(), worker_id, 60).await {
        Ok(leased) => {
            let started = client.start(leased.job.id.clone(), worker_id).await?.job;
            println!("   ✓ Started job {}", started.id);

            let completed = client.complete(started.id.clone(), worker_id).await?.job;
            println!("   ✓ Completed job {} (status: {})\n", completed.id, completed.status);
        }
        Err(e) => println!("   ⚠ Could not lease job: {e}\n"),
    }

    println!("4. Listing recent jobs...");
    let list_response = client.list(Default::default()).await?;
    for job in &list_response.jobs {
        println!("     - {} [{}] attempts={}", job.id, job.status, job.attempts);
    }

    println!("\n✓ Example completed successfully!");

    Ok(())
}
