use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// This is the helm values tree, as it is stored in a release record.
pub type Values = Map<String, Value>;

/// This struct is used to deserialize a Helm release record, i.e. the document Helm stores
/// (compressed and encoded) in its release Secrets and ConfigMaps.
/// Ref: https://github.com/helm/helm/blob/v3.13.2/pkg/release/release.go
#[derive(Clone, Debug, Deserialize)]
pub struct Release {
    /// This is the name of the release.
    name: String,
    /// This is the namespace the release was installed into.
    #[serde(default, deserialize_with = "null_as_default")]
    namespace: String,
    /// This is the revision of the release.
    #[serde(default)]
    version: u32,
    /// This carries the deployment status of the release.
    #[serde(default)]
    info: Option<Info>,
    /// This is the chart which was installed by the release.
    #[serde(default)]
    chart: Option<Chart>,
    /// These are the values the user supplied on top of the chart's defaults.
    #[serde(default, deserialize_with = "null_as_default")]
    config: Values,
    /// This is the rendered manifest of the release.
    #[serde(default, deserialize_with = "null_as_default")]
    manifest: String,
}

impl Release {
    /// This is a getter for the release name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// This is a getter for the release namespace.
    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// This is a getter for the release revision.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// This is a getter for the deployment information of the release.
    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    /// This is a getter for the release status, e.g. deployed, superseded, failed.
    pub fn status(&self) -> Option<&str> {
        self.info().and_then(Info::status)
    }

    /// This is a getter for the chart of the release.
    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    /// This is a getter for the user-supplied values of the release.
    pub fn config(&self) -> &Values {
        &self.config
    }

    /// This is a getter for the rendered manifest.
    pub fn manifest(&self) -> &str {
        self.manifest.as_str()
    }
}

/// Deployment information of a release.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    first_deployed: Option<String>,
    #[serde(default)]
    last_deployed: Option<String>,
}

impl Info {
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn first_deployed(&self) -> Option<&str> {
        self.first_deployed.as_deref()
    }

    pub fn last_deployed(&self) -> Option<&str> {
        self.last_deployed.as_deref()
    }
}

/// This is the chart as it was loaded by Helm at install/upgrade time. Sub-charts are not a part
/// of the serialized form.
/// Ref: https://github.com/helm/helm/blob/v3.13.2/pkg/chart/chart.go
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Chart {
    /// The contents of Chart.yaml.
    #[serde(default)]
    metadata: Option<Metadata>,
    /// The contents of Chart.lock.
    #[serde(default)]
    lock: Option<Lock>,
    /// The files in the templates/ directory.
    #[serde(default, deserialize_with = "null_as_default")]
    templates: Vec<File>,
    /// The contents of values.yaml.
    #[serde(default, deserialize_with = "null_as_default")]
    values: Values,
    /// The contents of values.schema.json.
    #[serde(default, deserialize_with = "base64_bytes::deserialize")]
    schema: Vec<u8>,
    /// Every other file of the chart, e.g. README.md, crds/, .helmignore.
    #[serde(default, deserialize_with = "null_as_default")]
    files: Vec<File>,
}

impl Chart {
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn lock(&self) -> Option<&Lock> {
        self.lock.as_ref()
    }

    pub fn templates(&self) -> &[File] {
        self.templates.as_slice()
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn schema(&self) -> &[u8] {
        self.schema.as_slice()
    }

    pub fn files(&self) -> &[File] {
        self.files.as_slice()
    }
}

/// A file of a chart, with its path relative to the chart root.
#[derive(Clone, Debug, Deserialize)]
pub struct File {
    name: String,
    #[serde(default, deserialize_with = "base64_bytes::deserialize")]
    data: Vec<u8>,
}

impl File {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }
}

/// This is used to (de)serialize Chart.yaml. Fields are kept in lexical order of their keys,
/// because Helm writes Chart.yaml with sorted keys.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    app_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    condition: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "is_false")]
    deprecated: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    home: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    icon: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    kube_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    maintainers: Vec<Maintainer>,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sources: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    tags: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    chart_type: String,
    #[serde(default)]
    version: String,
}

impl Metadata {
    /// This is a getter for the helm chart name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// This is a getter for the helm chart version.
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    /// This is a getter for the chart's declared dependencies.
    pub fn dependencies(&self) -> &[Dependency] {
        self.dependencies.as_slice()
    }
}

/// A chart dependency, as declared in Chart.yaml and recorded in Chart.lock.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    alias: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    condition: String,
    #[serde(default, skip_serializing_if = "is_false")]
    enabled: bool,
    #[serde(
        default,
        rename = "import-values",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    import_values: Vec<Value>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    repository: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    version: String,
}

impl Dependency {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// A chart maintainer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Maintainer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    url: String,
}

/// This is used to (de)serialize Chart.lock.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Lock {
    #[serde(default, deserialize_with = "null_as_default")]
    dependencies: Vec<Dependency>,
    #[serde(default)]
    digest: String,
    #[serde(default)]
    generated: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Go serializes nil maps and slices as `null`, these are read in as empty values.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Go serializes byte slices as standard base64 strings.
mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de::Error, Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(D::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
