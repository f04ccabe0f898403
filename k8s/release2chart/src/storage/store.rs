use crate::{
    common::{
        constants::{
            HELM_RELEASE_SECRET_TYPE, KUBE_API_PAGE_SIZE, RELEASE_DATA_KEY, STATUS_LABEL_KEY,
            VERSION_LABEL_KEY,
        },
        error::{
            ListConfigMapsWithLabelAndField, ListSecretsWithLabelAndField, MissingReleasePayload,
            Result,
        },
    },
    storage::driver::StorageDriver,
};
use async_trait::async_trait;
use k8s_openapi::{
    api::core::v1::{ConfigMap, Secret},
    ByteString,
};
use kube::{
    api::{Api, ListParams},
    Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use snafu::{ErrorCompat, IntoError, OptionExt, ResultExt};
use std::collections::BTreeMap;
use tracing::debug;

/// A Helm storage object reduced to what is needed to find and read a release record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRelease {
    name: String,
    labels: BTreeMap<String, String>,
    payload: Vec<u8>,
}

impl StoredRelease {
    pub fn new(name: String, labels: BTreeMap<String, String>, payload: Vec<u8>) -> Self {
        Self {
            name,
            labels,
            payload,
        }
    }

    /// This is the name of the Secret/ConfigMap, e.g. sh.helm.release.v1.<release>.v<revision>.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// These are the labels of the storage object.
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// This is the Helm encoded release record.
    pub fn payload(&self) -> &[u8] {
        self.payload.as_slice()
    }

    /// The revision from the 'version' label. None if it's missing or not a number.
    pub fn revision(&self) -> Option<u32> {
        self.labels.get(VERSION_LABEL_KEY)?.parse().ok()
    }

    /// The release status from the 'status' label.
    pub fn status(&self) -> Option<&str> {
        self.labels.get(STATUS_LABEL_KEY).map(String::as_str)
    }

    /// Reads a release storage Secret. The Kubernetes client has already taken off the
    /// base64 layer the API server adds to Secret data, what is left is Helm's encoding.
    pub fn from_secret(secret: Secret, namespace: &str) -> Result<Self> {
        let name = secret.name_any();
        let labels = secret.labels().clone();
        let payload = secret
            .data
            .and_then(|mut data| data.remove(RELEASE_DATA_KEY))
            .map(|ByteString(bytes)| bytes)
            .context(MissingReleasePayload {
                kind: StorageDriver::Secret.kind(),
                name: name.as_str(),
                namespace,
            })?;

        Ok(Self::new(name, labels, payload))
    }

    /// Reads a release storage ConfigMap.
    pub fn from_configmap(configmap: ConfigMap, namespace: &str) -> Result<Self> {
        let name = configmap.name_any();
        let labels = configmap.labels().clone();
        let payload = configmap
            .data
            .and_then(|mut data| data.remove(RELEASE_DATA_KEY))
            .map(String::into_bytes)
            .context(MissingReleasePayload {
                kind: StorageDriver::ConfigMap.kind(),
                name: name.as_str(),
                namespace,
            })?;

        Ok(Self::new(name, labels, payload))
    }
}

/// A source of Helm release records.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Lists the release records in a namespace which match a label selector.
    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<StoredRelease>>;
}

/// Reads release records from the Kubernetes API, from the kind of objects the storage driver
/// puts them in.
#[derive(Clone)]
pub struct KubeReleaseStore {
    client: Client,
    driver: StorageDriver,
}

impl KubeReleaseStore {
    pub fn new(client: Client, driver: StorageDriver) -> Self {
        Self { client, driver }
    }

    /// This returns a list of Helm release Secrets based on a label selector.
    async fn list_secrets(&self, namespace: &str, label_selector: &str) -> Result<Vec<Secret>> {
        let field_selector = format!("type={HELM_RELEASE_SECRET_TYPE}");
        let list_params = ListParams::default()
            .labels(label_selector)
            .fields(field_selector.as_str());

        let secrets_api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let list_secrets_error = ListSecretsWithLabelAndField {
            label: label_selector,
            field: field_selector.as_str(),
            namespace,
        };

        paginated_list(&secrets_api, list_params, list_secrets_error).await
    }

    /// This returns a list of Helm release ConfigMaps based on a label selector.
    async fn list_configmaps(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<ConfigMap>> {
        let list_params = ListParams::default().labels(label_selector);

        let configmaps_api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);

        let list_configmaps_error = ListConfigMapsWithLabelAndField {
            label: label_selector,
            field: "",
            namespace,
        };

        paginated_list(&configmaps_api, list_params, list_configmaps_error).await
    }
}

#[async_trait]
impl ReleaseStore for KubeReleaseStore {
    async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<StoredRelease>> {
        debug!(
            driver = %self.driver,
            %namespace,
            %label_selector,
            "Listing Helm release records"
        );

        match self.driver {
            StorageDriver::Secret => self
                .list_secrets(namespace, label_selector)
                .await?
                .into_iter()
                .map(|secret| StoredRelease::from_secret(secret, namespace))
                .collect(),
            StorageDriver::ConfigMap => self
                .list_configmaps(namespace, label_selector)
                .await?
                .into_iter()
                .map(|configmap| StoredRelease::from_configmap(configmap, namespace))
                .collect(),
        }
    }
}

/// Lists every object which matches the list parameters, one page of KUBE_API_PAGE_SIZE objects
/// at a time.
async fn paginated_list<K, C, E2>(
    resource_api: &Api<K>,
    list_params: ListParams,
    list_err_ctx: C,
) -> Result<Vec<K>>
where
    K: Resource + Clone + DeserializeOwned + std::fmt::Debug,
    C: IntoError<E2, Source = kube::Error> + Clone,
    E2: std::error::Error + ErrorCompat,
    crate::common::error::Error: From<E2>,
{
    let mut resources: Vec<K> = Vec::new();
    let mut list_params = list_params.limit(KUBE_API_PAGE_SIZE);

    for page in 1.. {
        let resource_list = resource_api
            .list(&list_params)
            .await
            .context(list_err_ctx.clone())?;
        let continue_token = resource_list.metadata.continue_.clone();
        debug!(page, objects = resource_list.items.len(), "Listed page");
        resources.extend(resource_list);

        // The API server sends an empty token, not a missing one, on the last page.
        match continue_token {
            Some(token) if !token.is_empty() => {
                list_params = list_params.continue_token(token.as_str());
            }
            _ => break,
        }
    }

    Ok(resources)
}

/// An in-memory release store for tests.
#[cfg(test)]
pub(crate) mod test_utils {
    use super::{ReleaseStore, StoredRelease};
    use crate::common::error::Result;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    /// Holds release records per namespace, and matches equality-based label selectors the way
    /// the API server does.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        records: BTreeMap<String, Vec<StoredRelease>>,
    }

    impl MemoryStore {
        pub(crate) fn with(mut self, namespace: &str, record: StoredRelease) -> Self {
            self.records
                .entry(namespace.to_string())
                .or_default()
                .push(record);
            self
        }
    }

    #[async_trait]
    impl ReleaseStore for MemoryStore {
        async fn list(&self, namespace: &str, label_selector: &str) -> Result<Vec<StoredRelease>> {
            let requirements: Vec<(&str, &str)> = label_selector
                .split(',')
                .filter_map(|requirement| requirement.split_once('='))
                .collect();

            Ok(self
                .records
                .get(namespace)
                .into_iter()
                .flatten()
                .filter(|record| {
                    requirements.iter().all(|(key, value)| {
                        record.labels().get(*key).map(String::as_str) == Some(*value)
                    })
                })
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoredRelease;
    use crate::common::error::Error;
    use k8s_openapi::{
        api::core::v1::{ConfigMap, Secret},
        apimachinery::pkg::apis::meta::v1::ObjectMeta,
        ByteString,
    };
    use maplit::btreemap;

    fn meta() -> ObjectMeta {
        ObjectMeta {
            name: Some("sh.helm.release.v1.web.v2".to_string()),
            labels: Some(btreemap! {
                "name".to_string() => "web".to_string(),
                "owner".to_string() => "helm".to_string(),
                "status".to_string() => "deployed".to_string(),
                "version".to_string() => "2".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn secret_payload_is_read() {
        let secret = Secret {
            metadata: meta(),
            data: Some(btreemap! {
                "release".to_string() => ByteString(b"H4sIAAAA".to_vec()),
            }),
            type_: Some("helm.sh/release.v1".to_string()),
            ..Default::default()
        };

        let record = StoredRelease::from_secret(secret, "apps").unwrap();
        assert_eq!(record.name(), "sh.helm.release.v1.web.v2");
        assert_eq!(record.payload(), b"H4sIAAAA");
        assert_eq!(record.revision(), Some(2));
        assert_eq!(record.status(), Some("deployed"));
    }

    #[test]
    fn configmap_payload_is_read() {
        let configmap = ConfigMap {
            metadata: meta(),
            data: Some(btreemap! {
                "release".to_string() => "H4sIAAAA".to_string(),
            }),
            ..Default::default()
        };

        let record = StoredRelease::from_configmap(configmap, "apps").unwrap();
        assert_eq!(record.payload(), b"H4sIAAAA");
        assert_eq!(record.revision(), Some(2));
    }

    #[test]
    fn missing_payload_fails() {
        let secret = Secret {
            metadata: meta(),
            ..Default::default()
        };

        let result = StoredRelease::from_secret(secret, "apps");
        assert!(matches!(result, Err(Error::MissingReleasePayload { .. })));
    }

    #[test]
    fn non_numeric_revision_label_is_none() {
        let mut metadata = meta();
        metadata
            .labels
            .as_mut()
            .unwrap()
            .insert("version".to_string(), "two".to_string());
        let configmap = ConfigMap {
            metadata,
            data: Some(btreemap! { "release".to_string() => String::new() }),
            ..Default::default()
        };

        let record = StoredRelease::from_configmap(configmap, "apps").unwrap();
        assert_eq!(record.revision(), None);
    }
}
