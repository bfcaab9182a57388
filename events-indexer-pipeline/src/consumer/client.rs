//! Kubernetes client construction.

use std::path::Path;

use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use kube::Client;
use tracing::info;

use crate::errors::PipelineError;

/// Build a Kubernetes client.
///
/// Uses the kubeconfig file at `kubeconfig` when given, otherwise the
/// in-cluster service account identity. The two sources are exclusive.
///
/// The client read timeout is disabled: the watch is expected to sit idle
/// on quiet clusters.
///
/// # Returns
///
/// * `Ok(Client)` - A client ready to issue requests
/// * `Err(PipelineError::ConfigurationError)` - If the configuration can't be built
/// * `Err(PipelineError::ConnectionError)` - If the client can't be constructed
pub async fn build_client(kubeconfig: Option<&Path>) -> Result<Client, PipelineError> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                PipelineError::configuration(format!("Kubeconfig file error: {}", e))
            })?;
            let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    PipelineError::configuration(format!("Kubeconfig file error: {}", e))
                })?;

            info!(path = %path.display(), cluster_url = %config.cluster_url, "Loaded kubeconfig");
            config
        }
        None => {
            let config = Config::incluster().map_err(|e| {
                PipelineError::configuration(format!("Kubeconfig in cluster error: {}", e))
            })?;

            info!(cluster_url = %config.cluster_url, "Loaded in-cluster config");
            config
        }
    };

    config.read_timeout = None;

    Client::try_from(config)
        .map_err(|e| PipelineError::connection(format!("Kubernetes client error: {}", e)))
}
