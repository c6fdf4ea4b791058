//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    ListAdaptersResponse, StartRequest, StartResponse, StopResponse, TailLogsRequest,
    TailLogsResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use netguard_core::application::{MonitorService, MonitorStatus};
use netguard_core::error::AppError;
use netguard_infra_system::{AdapterInventory, LogHistory};
use std::sync::Arc;
use tracing::info;

/// Upper bound for `logs.tail.v1`
const MAX_TAIL_LINES: usize = 1000;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    monitor: Arc<MonitorService>,
    history: LogHistory,
    inventory: Arc<AdapterInventory>,
}

impl RpcHandler {
    pub fn new(
        monitor: Arc<MonitorService>,
        history: LogHistory,
        inventory: Arc<AdapterInventory>,
    ) -> Self {
        Self {
            monitor,
            history,
            inventory,
        }
    }

    /// monitor.start.v1
    pub async fn start(&self, params: StartRequest) -> Result<StartResponse, ErrorObjectOwned> {
        let session = self
            .monitor
            .start(&params.adapter)
            .await
            .map_err(to_rpc_error)?;

        info!(session_id = %session.session_id, adapter = %session.adapter, "Monitoring started via RPC");

        Ok(StartResponse {
            session_id: session.session_id,
            adapter: session.adapter.to_string(),
            started_at: session.started_at,
        })
    }

    /// monitor.stop.v1
    pub async fn stop(&self) -> Result<StopResponse, ErrorObjectOwned> {
        let stopped = self.monitor.stop().await.map_err(to_rpc_error)?;
        Ok(StopResponse { stopped })
    }

    /// monitor.status.v1
    pub async fn status(&self) -> Result<MonitorStatus, ErrorObjectOwned> {
        Ok(self.monitor.status().await)
    }

    /// logs.tail.v1
    pub async fn tail_logs(
        &self,
        params: TailLogsRequest,
    ) -> Result<TailLogsResponse, ErrorObjectOwned> {
        if params.lines > MAX_TAIL_LINES {
            return Err(to_rpc_error(AppError::Validation(format!(
                "lines must be at most {}",
                MAX_TAIL_LINES
            ))));
        }
        Ok(TailLogsResponse {
            lines: self.history.tail(params.lines),
        })
    }

    /// adapters.list.v1
    pub async fn list_adapters(&self) -> Result<ListAdaptersResponse, ErrorObjectOwned> {
        // sysinfo refresh reads the OS tables synchronously
        let inventory = Arc::clone(&self.inventory);
        let adapters = tokio::task::spawn_blocking(move || inventory.list())
            .await
            .map_err(|e| to_rpc_error(AppError::Internal(e.to_string())))?;

        Ok(ListAdaptersResponse {
            adapters: adapters.into_iter().map(Into::into).collect(),
        })
    }
}
