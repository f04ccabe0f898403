use crate::common::error::{
    InferKubeConfig, K8sClientGeneration, LoadKubeConfig, ReadKubeConfig, Result,
};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use snafu::ResultExt;
use std::path::PathBuf;
use tracing::debug;

/// Generate a new kube::Client. The configuration is inferred from the environment (in-cluster
/// service account, $KUBECONFIG or ~/.kube/config), unless a kubeconfig file or a context is
/// asked for explicitly.
pub async fn client(kubeconfig: Option<PathBuf>, context: Option<String>) -> Result<Client> {
    let config = match (kubeconfig, context) {
        (None, None) => Config::infer().await.context(InferKubeConfig)?,
        (kubeconfig, context) => {
            let kubeconfig = match kubeconfig {
                Some(filepath) => {
                    debug!(kubeconfig = %filepath.display(), "Reading kubeconfig file");
                    Kubeconfig::read_from(filepath.as_path())
                        .context(ReadKubeConfig { filepath })?
                }
                None => Kubeconfig::read().context(LoadKubeConfig {
                    context: context.clone().unwrap_or_default(),
                })?,
            };
            let options = KubeConfigOptions {
                context: context.clone(),
                ..Default::default()
            };
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context(LoadKubeConfig {
                    context: context.unwrap_or_default(),
                })?
        }
    };

    debug!(
        cluster_url = %config.cluster_url,
        default_namespace = %config.default_namespace,
        "Generated kubernetes client configuration"
    );
    Client::try_from(config).context(K8sClientGeneration)
}
