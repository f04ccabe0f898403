use crate::common::constants::{CHART_YAML, RELEASE_DATA_KEY};
use snafu::Snafu;
use std::path::PathBuf;

/// For use with multiple fallible operations which may fail for different reasons, but are
/// defined withing the same scope and must return to the outer scope (calling scope) using
/// the try operator -- '?'.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Error for when Kubernetes API client generation fails.
    #[snafu(display("Failed to generate kubernetes client: {}", source))]
    K8sClientGeneration { source: kube::Error },

    /// Error for when the kubernetes client configuration can't be inferred from the environment.
    #[snafu(display("Failed to infer kubernetes client configuration: {}", source))]
    InferKubeConfig {
        source: kube::config::InferConfigError,
    },

    /// Error for when a kubeconfig file can't be read.
    #[snafu(display("Failed to read kubeconfig file {}: {}", filepath.display(), source))]
    ReadKubeConfig {
        source: kube::config::KubeconfigError,
        filepath: PathBuf,
    },

    /// Error for when a kubeconfig can't be turned into a client configuration.
    #[snafu(display("Failed to load kubeconfig context '{}': {}", context, source))]
    LoadKubeConfig {
        source: kube::config::KubeconfigError,
        context: String,
    },

    /// Error for when a Kubernetes API request for GET-ing a list of Secrets filtered by label(s)
    /// and field(s) fails.
    #[snafu(display(
        "Failed to list Secrets with label '{}', and field '{}' in namespace {}: {}",
        label,
        field,
        namespace,
        source
    ))]
    ListSecretsWithLabelAndField {
        source: kube::Error,
        label: String,
        field: String,
        namespace: String,
    },

    /// Error for when a Kubernetes API request for GET-ing a list of ConfigMaps filtered by
    /// label(s) and field(s) fails.
    #[snafu(display(
        "Failed to list ConfigMaps with label '{}', and field '{}' in namespace {}: {}",
        label,
        field,
        namespace,
        source
    ))]
    ListConfigMapsWithLabelAndField {
        source: kube::Error,
        label: String,
        field: String,
        namespace: String,
    },

    /// Error for when the Helm storage driver has no records in the cluster.
    #[snafu(display(
        "Helm storage driver '{}' is not supported, use 'secret' or 'configmap'",
        driver
    ))]
    UnsupportedStorageDriver { driver: String },

    /// Error for when a Helm storage object has no release record.
    #[snafu(display(
        "{} {} in namespace {} has no '{}' data entry",
        kind,
        name,
        namespace,
        RELEASE_DATA_KEY
    ))]
    MissingReleasePayload {
        kind: String,
        name: String,
        namespace: String,
    },

    /// Error for when no revision could be found for a release.
    #[snafu(display(
        "No revisions found for Helm release {} in namespace {}",
        release_name,
        namespace
    ))]
    NoReleaseRevisions {
        release_name: String,
        namespace: String,
    },

    /// Error for when the number of release records for a revision is not exactly one.
    #[snafu(display(
        "Found {} matching records for revision {} of Helm release {} in namespace {}, expected \
        exactly one",
        count,
        revision,
        release_name,
        namespace
    ))]
    InvalidNoOfReleaseRecords {
        release_name: String,
        namespace: String,
        revision: u32,
        count: usize,
    },

    /// Error for when a release record is not valid base64.
    #[snafu(display("Failed to base64-decode release record: {}", source))]
    ReleaseBase64Decode { source: base64::DecodeError },

    /// Error for when a release record can't be gunzipped.
    #[snafu(display("Failed to decompress release record: {}", source))]
    ReleaseDecompress { source: std::io::Error },

    /// Error for when a release record isn't a valid release document.
    #[snafu(display("Failed to deserialize release record: {}", source))]
    ReleaseDeserialize { source: serde_json::Error },

    /// Error for when a release record does not contain a chart.
    #[snafu(display("Helm release {} revision {} carries no chart", release_name, revision))]
    ReleaseWithoutChart { release_name: String, revision: u32 },

    /// Error for when the chart in a release record has no metadata.
    #[snafu(display("Chart has no metadata, can't write {}", CHART_YAML))]
    ChartWithoutMetadata,

    /// Error for when a chart file name would land outside of the chart directory.
    #[snafu(display("Chart file name '{}' is not a safe relative path", name))]
    UnsafeChartFilePath { name: String },

    /// Error for when a yaml document can't be generated.
    #[snafu(display("Failed to serialize {} to YAML: {}", document, source))]
    YamlSerialize {
        source: serde_yaml::Error,
        document: String,
    },

    /// Error for when yaml could not be parsed from a file.
    #[snafu(display("Failed to parse YAML at {}: {}", filepath.display(), source))]
    YamlParseFromFile {
        source: serde_yaml::Error,
        filepath: PathBuf,
    },

    /// Error for when a directory can't be created.
    #[snafu(display("Failed to create directory {}: {}", path.display(), source))]
    CreateDirectory {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when a file can't be written.
    #[snafu(display("Failed to write file {}: {}", filepath.display(), source))]
    WriteFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when a file can't be read.
    #[snafu(display("Failed to read file {}: {}", filepath.display(), source))]
    ReadingFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when the contents of a directory can't be listed.
    #[snafu(display("Failed to read contents of directory {}: {}", path.display(), source))]
    ReadingDirectoryContents {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when the temporary chart directory can't be created.
    #[snafu(display("Failed to create temporary directory: {}", source))]
    TempDirCreation { source: std::io::Error },

    /// Error for when the path to a directory cannot be validated.
    #[snafu(display("Failed to validate directory path {}: {}", path.display(), source))]
    ValidateDirPath {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when the path is not that of a directory.
    #[snafu(display("{} is not a directory", path.display()))]
    NotADirectory { path: PathBuf },

    /// Error for when the chart name can't be used as an archive name.
    #[snafu(display("Chart name '{}' is not valid for packaging", name))]
    InvalidChartName { name: String },

    /// Error for when the chart version is not a semantic version.
    #[snafu(display("Chart version '{}' is not a valid semantic version: {}", version, source))]
    InvalidChartVersion {
        source: semver::Error,
        version: String,
    },

    /// Error for when writing the chart archive fails.
    #[snafu(display("Failed to write chart archive {}: {}", filepath.display(), source))]
    WriteArchive {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when a Helm command fails.
    #[snafu(display(
        "Failed to run Helm command,\ncommand: {},\nargs: {:?},\ncommand_error: {}",
        command,
        args,
        source
    ))]
    HelmCommand {
        source: std::io::Error,
        command: String,
        args: Vec<String>,
    },

    /// Error for when the `helm package` command exits with a failure.
    #[snafu(display(
        "Helm package command failed,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmPackageCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when the `helm version` command exits with a failure.
    #[snafu(display(
        "Helm version command failed,\ncommand: {},\nargs: {:?},\nstd_err: {}",
        command,
        args,
        std_err,
    ))]
    HelmVersionCommand {
        command: String,
        args: Vec<String>,
        std_err: String,
    },

    /// Error for when Helm v3.x.y is not present in $PATH.
    #[snafu(display("Helm version {} does not start with 'v3.x.y'", version))]
    HelmVersion { version: String },

    /// Error for when the archive path can't be found in the `helm package` output.
    #[snafu(display("Failed to find the chart archive path in helm output: {}", std_out))]
    HelmPackageOutput { std_out: String },

    /// Error for when a byte slice cannot be converted to a &str.
    #[snafu(display("Failed to convert Vec<u8> to UTF-8 formatted String: {}", source))]
    U8VectorToString { source: std::str::Utf8Error },
}

/// A wrapper type to remove repeated Result<T, Error> returns.
pub type Result<T, E = Error> = std::result::Result<T, E>;

