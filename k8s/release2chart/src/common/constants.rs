/// This is the value of the 'owner' label Helm sets on its release storage objects.
pub const HELM_OWNER: &str = "helm";

/// This is the Secret type Helm uses for release storage Secrets.
pub const HELM_RELEASE_SECRET_TYPE: &str = "helm.sh/release.v1";

/// This is the key of the release record in a storage object's data.
pub const RELEASE_DATA_KEY: &str = "release";

/// Label key carrying the release name.
pub const NAME_LABEL_KEY: &str = "name";

/// Label key carrying the storage object owner.
pub const OWNER_LABEL_KEY: &str = "owner";

/// Label key carrying the release revision.
pub const VERSION_LABEL_KEY: &str = "version";

/// Label key carrying the release status.
pub const STATUS_LABEL_KEY: &str = "status";

/// Limit for the number of objects fetched in a single Kubernetes list request.
pub const KUBE_API_PAGE_SIZE: u32 = 500;

/// Prefix of the temporary directory the chart tree is written to.
pub const RELEASE_DIR_PREFIX: &str = "helm-release-";

/// File names of the chart documents which are generated from the release record.
pub const CHART_YAML: &str = "Chart.yaml";
pub const CHART_LOCK: &str = "Chart.lock";
pub const VALUES_YAML: &str = "values.yaml";
pub const VALUES_SCHEMA_JSON: &str = "values.schema.json";

/// Extension of packaged chart archives.
pub const CHART_ARCHIVE_EXTENSION: &str = "tgz";

/// The first bytes of a gzip stream, as checked by Helm when reading a release record.
pub const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// The helm binary.
pub const HELM_COMMAND: &str = "helm";

/// Prefix of the line `helm package` prints after writing the archive.
pub const HELM_PACKAGE_SAVED_PREFIX: &str = "Successfully packaged chart and saved it to:";

/// Environment variable for reproducible archive timestamps.
pub const SOURCE_DATE_EPOCH_ENV: &str = "SOURCE_DATE_EPOCH";
