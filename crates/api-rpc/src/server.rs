//! JSON-RPC Server
//!
//! Serves the `jobs.*.v1` method family over TCP on localhost. jsonrpsee
//! has no Unix-socket transport (a hyper limitation), so we bind
//! 127.0.0.1 only rather than opening the port to the network.

use std::sync::Arc;

use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use tracing::info;

use jobkeeper_core::application::RetryPolicy;
use jobkeeper_core::port::{IdProvider, JobStore, ReadyQueueHint, TimeProvider};

use crate::handler::RpcHandler;
use crate::types::{
    CompleteRequest, FailRequest, HealthRequest, LeaseRequest, ListRequest, ReconcileRequest,
    RequeueReadyRequest, StartRequest, SubmitRequest,
};

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 7527;

pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        let port = std::env::var("JOBKEEPER_RPC_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RPC_PORT);

        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port,
        }
    }
}

pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        store: Arc<dyn JobStore>,
        hint: Arc<dyn ReadyQueueHint>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(store, hint, id_provider, time_provider, retry_policy)),
        }
    }

    pub async fn start(self) -> Result<ServerHandle, String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(host = %self.config.host, port = %self.config.port, "starting JSON-RPC server on TCP (localhost only)");

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("failed to build server on {addr}: {e}"))?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.health.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: HealthRequest = params.parse()?;
                    handler.health(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.submit.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: SubmitRequest = params.parse()?;
                    handler.submit(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.list.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ListRequest = params.parse()?;
                    handler.list(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.lease.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: LeaseRequest = params.parse()?;
                    handler.lease(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.start.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StartRequest = params.parse()?;
                    handler.start(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.complete.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CompleteRequest = params.parse()?;
                    handler.complete(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.fail.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: FailRequest = params.parse()?;
                    handler.fail(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.requeue_ready.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RequeueReadyRequest = params.parse()?;
                    handler.requeue_ready(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("jobs.reconcile.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ReconcileRequest = params.parse()?;
                    handler.reconcile(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok(handle)
    }
}
