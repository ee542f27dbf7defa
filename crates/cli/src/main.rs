//! jobkeeper CLI - Command-line interface for the jobkeeper daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use tabled::{Table, Tabled};

use jobkeeper_sdk::{handler, shutdown_channel, JobDto, JobkeeperClient, ListRequest, SubmitRequest, Worker};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:7527";

#[derive(Parser)]
#[command(name = "jobkeeper")]
#[command(about = "jobkeeper durable job scheduler CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "JOBKEEPER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new job
    Submit {
        /// Job type (dispatch label, e.g. send_email)
        #[arg(short = 't', long)]
        job_type: String,

        /// Priority in [1,10], higher runs first
        #[arg(short, long, default_value = "5")]
        priority: i32,

        /// Max delivery attempts before the job is marked dead
        #[arg(short, long, default_value = "3")]
        max_attempts: i32,

        /// Payload as a JSON string
        #[arg(long, default_value = "{}")]
        payload: String,
    },

    /// List jobs
    List {
        /// Filter by status: QUEUED, RUNNING, COMPLETED, DEAD
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by job type
        #[arg(short = 't', long)]
        job_type: Option<String>,

        /// Max rows to return
        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// Lease a specific job by id
    Lease {
        job_id: String,

        /// Identifies the caller in subsequent start/complete/fail calls
        #[arg(short, long)]
        worker_id: String,

        /// Lease duration in seconds
        #[arg(short, long, default_value = "60")]
        lease_seconds: i64,
    },

    /// Commit a held lease: queued -> running
    Start {
        job_id: String,
        #[arg(short, long)]
        worker_id: String,
    },

    /// Mark a running job completed
    Complete {
        job_id: String,
        #[arg(short, long)]
        worker_id: String,
    },

    /// Mark a running job failed (retried or dead, by attempts)
    Fail {
        job_id: String,
        #[arg(short, long)]
        worker_id: String,
        #[arg(short, long)]
        error: String,
    },

    /// Re-seed the ready-queue hint for jobs whose backoff has elapsed
    RequeueReady {
        /// Max jobs to scan
        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// Sweep jobs whose lease expired back to queued or dead
    Reconcile {
        /// Max jobs to scan
        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// Check daemon health
    Health,

    /// Run a worker that echoes each job's payload back as its result
    RunWorker {
        #[arg(short, long, default_value = "cli-worker")]
        worker_id: String,
        #[arg(short, long, default_value = "60")]
        lease_seconds: i64,
    },
}

#[derive(Tabled)]
struct JobRow {
    id: String,
    job_type: String,
    status: String,
    priority: i32,
    attempts: String,
}

impl From<&JobDto> for JobRow {
    fn from(job: &JobDto) -> Self {
        Self {
            id: job.id.clone(),
            job_type: job.job_type.clone(),
            status: job.status.clone(),
            priority: job.priority,
            attempts: format!("{}/{}", job.attempts, job.max_attempts),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("jobkeeper=info").init();

    let cli = Cli::parse();
    let client = JobkeeperClient::connect(&cli.rpc_url)
        .await
        .context("failed to connect to jobkeeper daemon")?;

    match cli.command {
        Commands::Submit {
            job_type,
            priority,
            max_attempts,
            payload,
        } => {
            let payload_json: serde_json::Value =
                serde_json::from_str(&payload).context("invalid JSON payload")?;

            let response = client
                .submit(SubmitRequest {
                    job_type,
                    priority,
                    max_attempts,
                    payload: payload_json,
                })
                .await?;

            println!("{}", "✓ job submitted".green().bold());
            println!("{}", Table::new(vec![JobRow::from(&response.job)]));
        }

        Commands::List { status, job_type, limit } => {
            let response = client
                .list(ListRequest {
                    status,
                    job_type,
                    limit,
                    offset: 0,
                })
                .await?;

            if response.jobs.is_empty() {
                println!("{}", "no jobs found".yellow());
            } else {
                let rows: Vec<JobRow> = response.jobs.iter().map(JobRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Lease {
            job_id,
            worker_id,
            lease_seconds,
        } => {
            let response = client.lease(job_id, worker_id, lease_seconds).await?;
            println!("{}", "✓ leased job".green().bold());
            println!("{}", Table::new(vec![JobRow::from(&response.job)]));
        }

        Commands::Start { job_id, worker_id } => {
            let response = client.start(job_id, worker_id).await?;
            println!("{}", format!("✓ started job {}", response.job.id).green().bold());
        }

        Commands::Complete { job_id, worker_id } => {
            let response = client.complete(job_id, worker_id).await?;
            println!("{}", format!("✓ completed job {}", response.job.id).green().bold());
        }

        Commands::Fail { job_id, worker_id, error } => {
            let response = client.fail(job_id, worker_id, error).await?;
            println!(
                "{}",
                format!("job {} -> {}", response.job.id, response.job.status)
                    .yellow()
                    .bold()
            );
        }

        Commands::RequeueReady { limit } => {
            let response = client.requeue_ready(limit).await?;
            println!("{}", format!("✓ requeued {} job(s)", response.requeued).green().bold());
        }

        Commands::Reconcile { limit } => {
            let response = client.reconcile(limit).await?;
            println!(
                "{}",
                format!(
                    "✓ reconciled: {} recovered, {} dead, {} requeued",
                    response.recovered, response.dead, response.requeued
                )
                .green()
                .bold()
            );
        }

        Commands::Health => {
            let response = client.health().await?;
            println!("{} {}", "status:".bold(), response.status.green());
            println!("{} {}", "version:".bold(), response.version);
            println!("{} {}s", "uptime:".bold(), response.uptime_seconds);
        }

        Commands::RunWorker { worker_id, lease_seconds } => {
            println!("{}", format!("starting worker {worker_id} (echo handler)...").cyan().bold());
            println!("press Ctrl+C to stop");

            let client = std::sync::Arc::new(client);
            let echo_handler = handler(|job| async move {
                println!("echoing job {}: {}", job.id, job.payload.unwrap_or(json!({})));
                Ok(())
            });

            let w = Worker::new(client, worker_id, lease_seconds, echo_handler);
            let (shutdown_tx, shutdown_rx) = shutdown_channel();

            tokio::select! {
                result = w.run(shutdown_rx) => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    shutdown_tx.shutdown();
                }
            }
        }
    }

    Ok(())
}
