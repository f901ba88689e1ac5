use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::app_error::AppResult;

#[async_trait]
pub trait DependencyProbe: Send + Sync {
    fn name(&self) -> &'static str;
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyStatus {
    pub name: &'static str,
    pub healthy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub dependencies: Vec<DependencyStatus>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.dependencies.iter().all(|d| d.healthy)
    }
}

#[derive(Clone)]
pub struct HealthUseCases {
    probes: Vec<Arc<dyn DependencyProbe>>,
}

impl HealthUseCases {
    pub fn new(probes: Vec<Arc<dyn DependencyProbe>>) -> Self {
        Self { probes }
    }

    pub async fn check(&self) -> HealthReport {
        let mut dependencies = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let healthy = match probe.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(dependency = probe.name(), error = %e, "Health probe failed");
                    false
                }
            };
            dependencies.push(DependencyStatus {
                name: probe.name(),
                healthy,
            });
        }

        let status = if dependencies.iter().all(|d| d.healthy) {
            "ok"
        } else {
            "degraded"
        };
        HealthReport {
            status,
            dependencies,
        }
    }
}
