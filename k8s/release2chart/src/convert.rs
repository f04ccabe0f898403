use crate::{
    common::{
        constants::{RELEASE_DIR_PREFIX, VALUES_YAML},
        error::{ReleaseWithoutChart, Result, TempDirCreation, WriteFile},
    },
    helm::{
        chart::{to_yaml, write_chart_files},
        package::Packager,
    },
    storage::{revision::fetch_release, store::ReleaseStore},
    vec_to_strings,
};
use snafu::{OptionExt, ResultExt};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// The inputs of a conversion.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// This is the Kubernetes Namespace of the Helm release.
    pub namespace: String,
    /// This is the name of the Helm release.
    pub release_name: String,
    /// This is the revision of the release to convert.
    pub revision: u32,
    /// This is the directory the chart archive and values file are written to.
    pub destination: PathBuf,
}

/// The files a conversion produced, as paths the user can reach from the working directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    chart_file: PathBuf,
    values_file: Option<PathBuf>,
}

impl Conversion {
    /// This is the chart archive.
    pub fn chart_file(&self) -> &Path {
        self.chart_file.as_path()
    }

    /// This is the values file with the release's user-supplied values, if it had any.
    pub fn values_file(&self) -> Option<&Path> {
        self.values_file.as_deref()
    }

    /// The `helm install` command which recreates the release from the produced files.
    pub fn install_command(&self, release_name: &str, namespace: &str) -> Vec<String> {
        let mut command: Vec<String> = vec_to_strings![
            "helm",
            "install",
            release_name,
            self.chart_file.display()
        ];
        if let Some(values_file) = self.values_file.as_ref() {
            command.extend(vec_to_strings!["--values", values_file.display()]);
        }
        command.extend(vec_to_strings!["--namespace", namespace]);
        command
    }
}

/// Converts a release revision into a chart archive (and a values file, if the release was
/// installed or upgraded with values of its own). The chart tree is written to a temporary
/// directory which is removed before this returns.
pub async fn convert_release(
    store: &dyn ReleaseStore,
    packager: &dyn Packager,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let release = fetch_release(
        store,
        options.namespace.as_str(),
        options.release_name.as_str(),
        options.revision,
    )
    .await?;
    let chart = release.chart().context(ReleaseWithoutChart {
        release_name: options.release_name.as_str(),
        revision: options.revision,
    })?;

    let release_dir = tempfile::Builder::new()
        .prefix(RELEASE_DIR_PREFIX)
        .tempdir()
        .context(TempDirCreation)?;

    let written = write_chart_files(chart, release_dir.path())?;
    info!(
        dir = %release_dir.path().display(),
        files = written.len(),
        "Wrote chart files"
    );

    let archive = packager.package(release_dir.path(), options.destination.as_path())?;
    let chart_file = output_path(options.destination.as_path(), archive.as_path());

    let values_file = if release.config().is_empty() {
        None
    } else {
        let filepath = options.destination.join(VALUES_YAML);
        if filepath.exists() {
            warn!(file = %filepath.display(), "Overwriting existing values file");
        }
        let buf = to_yaml(release.config(), VALUES_YAML)?;
        fs::write(filepath.as_path(), buf.as_slice()).context(WriteFile {
            filepath: filepath.clone(),
        })?;
        info!(file = %filepath.display(), "Wrote release values");
        Some(output_path(options.destination.as_path(), filepath.as_path()))
    };

    Ok(Conversion {
        chart_file,
        values_file,
    })
}

/// Output files are named by their base name when written to the working directory, and
/// under the destination directory otherwise.
fn output_path(destination: &Path, path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf());
    if destination == Path::new(".") {
        file_name
    } else {
        destination.join(file_name)
    }
}
