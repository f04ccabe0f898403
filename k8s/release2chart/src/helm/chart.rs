use crate::{
    common::{
        constants::{CHART_LOCK, CHART_YAML, VALUES_SCHEMA_JSON, VALUES_YAML},
        error::{
            ChartWithoutMetadata, CreateDirectory, Result, UnsafeChartFilePath, WriteFile,
            YamlSerialize,
        },
    },
    helm::release::Chart,
};
use serde::Serialize;
use snafu::{ensure, OptionExt, ResultExt};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, warn};

/// Writes the files of a chart from a release record into `dir`, laid out the way `helm create`
/// and `helm package` expect a chart directory to be. Static files and templates are written
/// byte-for-byte; Chart.yaml, values.yaml, values.schema.json and Chart.lock are regenerated from
/// the parsed documents. Returns the chart-relative paths of the written files.
pub fn write_chart_files<P>(chart: &Chart, dir: P) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let metadata = chart.metadata().context(ChartWithoutMetadata)?;
    if !metadata.dependencies().is_empty() {
        let names: Vec<&str> = metadata.dependencies().iter().map(|d| d.name()).collect();
        warn!(
            chart = metadata.name(),
            dependencies = ?names,
            "Sub-charts are not kept in release records, the charts/ directory will be absent"
        );
    }

    let mut entries: Vec<(String, Vec<u8>)> = chart
        .files()
        .iter()
        .chain(chart.templates())
        .map(|file| (file.name().to_string(), file.data().to_vec()))
        .collect();

    entries.push((CHART_YAML.to_string(), to_yaml(metadata, CHART_YAML)?));
    entries.push((VALUES_YAML.to_string(), to_yaml(chart.values(), VALUES_YAML)?));

    if !chart.schema().is_empty() {
        entries.push((VALUES_SCHEMA_JSON.to_string(), chart.schema().to_vec()));
    }
    if let Some(lock) = chart.lock() {
        entries.push((CHART_LOCK.to_string(), to_yaml(lock, CHART_LOCK)?));
    }

    let mut written = Vec::with_capacity(entries.len());
    for (name, data) in entries {
        let relative_path = chart_relative_path(name.as_str())?;
        let filepath = dir.as_ref().join(relative_path.as_path());

        if let Some(parent) = filepath.parent() {
            fs::create_dir_all(parent).context(CreateDirectory {
                path: parent.to_path_buf(),
            })?;
        }
        fs::write(filepath.as_path(), data.as_slice()).context(WriteFile {
            filepath: filepath.clone(),
        })?;
        debug!(file = %relative_path.display(), size = data.len(), "Wrote chart file");

        written.push(relative_path);
    }

    Ok(written)
}

/// Serializes a document for the chart directory.
pub(crate) fn to_yaml<T>(document: &T, name: &str) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    serde_yaml::to_string(document)
        .map(String::into_bytes)
        .context(YamlSerialize {
            document: name.to_string(),
        })
}

/// Release records come from the cluster, a file name must not be able to climb out of the chart
/// directory.
fn chart_relative_path(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    let has_file_name = path
        .components()
        .any(|component| matches!(component, Component::Normal(_)));
    let stays_inside = path
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

    ensure!(
        has_file_name && stays_inside,
        UnsafeChartFilePath {
            name: name.to_string()
        }
    );

    Ok(path.components().collect())
}
