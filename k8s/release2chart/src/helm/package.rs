use crate::{
    common::{
        constants::{
            CHART_ARCHIVE_EXTENSION, CHART_YAML, HELM_COMMAND, HELM_PACKAGE_SAVED_PREFIX,
            SOURCE_DATE_EPOCH_ENV,
        },
        error::{
            HelmCommand, HelmPackageCommand, HelmPackageOutput, InvalidChartName,
            InvalidChartVersion, ReadingDirectoryContents, ReadingFile, Result, U8VectorToString,
            WriteArchive, YamlParseFromFile,
        },
    },
    helm::release::Metadata,
    vec_to_strings,
};
use clap::ValueEnum;
use flate2::{write::GzEncoder, Compression};
use semver::Version;
use snafu::{ensure, OptionExt, ResultExt};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
    str,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info};

/// Turns a chart directory into a chart archive.
pub trait Packager {
    /// Packages the chart in `chart_dir` into the `destination` directory, and returns the path
    /// to the archive.
    fn package(&self, chart_dir: &Path, destination: &Path) -> Result<PathBuf>;
}

/// The packagers which can be picked from the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PackagerKind {
    /// Write the archive in-process.
    #[default]
    Native,
    /// Run `helm package`, requires helm v3 in $PATH.
    Helm,
}

impl PackagerKind {
    /// Creates the packager of this kind.
    pub fn packager(self) -> Box<dyn Packager> {
        match self {
            Self::Native => Box::new(ArchivePackager::new()),
            Self::Helm => Box::new(HelmCliPackager::new()),
        }
    }
}

/// Writes `<name>-<version>.tgz` archives the way Helm's chartutil.Save lays them out: every
/// file under a top-level directory named after the chart, Chart.yaml first.
#[derive(Clone, Debug)]
pub struct ArchivePackager {
    mtime: u64,
}

impl ArchivePackager {
    /// Entries get their mtime from $SOURCE_DATE_EPOCH if it's set, from the clock otherwise.
    pub fn new() -> Self {
        let mtime = std::env::var(SOURCE_DATE_EPOCH_ENV)
            .ok()
            .and_then(|epoch| epoch.parse::<u64>().ok())
            .unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|elapsed| elapsed.as_secs())
                    .unwrap_or_default()
            });
        Self::with_mtime(mtime)
    }

    /// Entries get the given mtime (seconds since the epoch).
    pub fn with_mtime(mtime: u64) -> Self {
        Self { mtime }
    }
}

impl Default for ArchivePackager {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager for ArchivePackager {
    fn package(&self, chart_dir: &Path, destination: &Path) -> Result<PathBuf> {
        let chart_yaml = chart_dir.join(CHART_YAML);
        let buf = fs::read(chart_yaml.as_path()).context(ReadingFile {
            filepath: chart_yaml.clone(),
        })?;
        let metadata: Metadata = serde_yaml::from_slice(buf.as_slice())
            .context(YamlParseFromFile {
                filepath: chart_yaml,
            })?;

        let name = metadata.name();
        ensure!(
            !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\']),
            InvalidChartName { name }
        );
        let version = metadata.version();
        let parsed = chart_version(version).context(InvalidChartVersion {
            version: version.to_string(),
        })?;
        debug!(%version, %parsed, "Validated chart version");

        let mut files = Vec::new();
        collect_files(chart_dir, PathBuf::new(), &mut files)?;
        // Chart.yaml leads, as Helm reads the archive's metadata before anything else.
        files.sort_by_key(|path| (path.as_path() != Path::new(CHART_YAML), path.clone()));

        let entries = files
            .into_iter()
            .map(|relative_path| {
                let source = chart_dir.join(relative_path.as_path());
                fs::read(source.as_path())
                    .context(ReadingFile { filepath: source })
                    .map(|data| (relative_path, data))
            })
            .collect::<Result<Vec<(PathBuf, Vec<u8>)>>>()?;

        let filepath = destination.join(format!("{name}-{version}.{CHART_ARCHIVE_EXTENSION}"));
        // The archive only takes its final name once it is complete.
        let archive_file = tempfile::Builder::new()
            .prefix(format!(".{name}-").as_str())
            .suffix(".tgz.part")
            .tempfile_in(destination)
            .context(WriteArchive {
                filepath: filepath.clone(),
            })?;
        let mut archive = tar::Builder::new(GzEncoder::new(archive_file, Compression::default()));

        for (relative_path, data) in entries {
            let entry_path = relative_path
                .components()
                .fold(name.to_string(), |entry, component| {
                    format!("{entry}/{}", component.as_os_str().to_string_lossy())
                });

            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
            header.set_mtime(self.mtime);

            archive
                .append_data(&mut header, entry_path.as_str(), data.as_slice())
                .context(WriteArchive {
                    filepath: filepath.clone(),
                })?;
            debug!(entry = %entry_path, "Added chart archive entry");
        }

        archive
            .into_inner()
            .and_then(GzEncoder::finish)
            .and_then(|archive_file| {
                set_archive_permissions(archive_file.as_file())?;
                archive_file
                    .persist(filepath.as_path())
                    .map_err(|error| error.error)
            })
            .context(WriteArchive {
                filepath: filepath.clone(),
            })?;

        info!(archive = %filepath.display(), "Packaged chart");
        Ok(filepath)
    }
}

#[cfg(unix)]
fn set_archive_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_archive_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// Parses a chart version as leniently as Helm does: a leading 'v' is allowed, and missing
/// minor and patch numbers count as 0, e.g. `v2` is 2.0.0 and `1.0` is 1.0.0.
fn chart_version(version: &str) -> std::result::Result<Version, semver::Error> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let (core, suffix) = version.split_at(version.find(['-', '+']).unwrap_or(version.len()));
    let padding = match core.split('.').count() {
        1 => ".0.0",
        2 => ".0",
        _ => "",
    };
    Version::parse(format!("{core}{padding}{suffix}").as_str())
}

/// Collects the paths of the regular files under `dir`, relative to the chart root.
fn collect_files(dir: &Path, relative_dir: PathBuf, files: &mut Vec<PathBuf>) -> Result<()> {
    let path = dir.join(relative_dir.as_path());
    let entries = fs::read_dir(path.as_path()).context(ReadingDirectoryContents {
        path: path.clone(),
    })?;

    for entry in entries {
        let entry = entry.context(ReadingDirectoryContents { path: path.clone() })?;
        let file_type = entry
            .file_type()
            .context(ReadingDirectoryContents { path: path.clone() })?;
        let relative_path = relative_dir.join(entry.file_name());

        if file_type.is_dir() {
            collect_files(dir, relative_path, files)?;
        } else if file_type.is_file() {
            files.push(relative_path);
        }
    }

    Ok(())
}

/// Packages charts by running `helm package`.
#[derive(Clone, Debug)]
pub struct HelmCliPackager {
    command: String,
}

impl HelmCliPackager {
    /// Runs the `helm` found in $PATH.
    pub fn new() -> Self {
        Self::with_command(HELM_COMMAND)
    }

    /// Runs the given helm executable.
    pub fn with_command<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for HelmCliPackager {
    fn default() -> Self {
        Self::new()
    }
}

impl Packager for HelmCliPackager {
    /// Runs command `helm package <chart_dir> --destination <destination>`.
    fn package(&self, chart_dir: &Path, destination: &Path) -> Result<PathBuf> {
        let command: &str = self.command.as_str();
        let args: Vec<String> = vec_to_strings![
            "package",
            chart_dir.to_string_lossy(),
            "--destination",
            destination.to_string_lossy()
        ];

        debug!(%command, ?args, "Helm package command");
        let output = Command::new(command)
            .args(args.clone())
            .output()
            .context(HelmCommand {
                command: command.to_string(),
                args: args.clone(),
            })?;

        let stdout_str = str::from_utf8(output.stdout.as_slice()).context(U8VectorToString)?;
        debug!(stdout=%stdout_str, "Helm package command standard output");
        ensure!(
            output.status.success(),
            HelmPackageCommand {
                command: command.to_string(),
                args,
                std_err: str::from_utf8(output.stderr.as_slice())
                    .context(U8VectorToString)?
                    .to_string()
            }
        );

        let filepath = saved_archive_path(stdout_str)?;
        info!(archive = %filepath.display(), "Packaged chart");
        Ok(filepath)
    }
}

/// Picks the archive path out of the `helm package` output.
fn saved_archive_path(std_out: &str) -> Result<PathBuf> {
    std_out
        .lines()
        .find_map(|line| line.trim().strip_prefix(HELM_PACKAGE_SAVED_PREFIX))
        .map(|path| PathBuf::from(path.trim()))
        .filter(|path| !path.as_os_str().is_empty())
        .context(HelmPackageOutput {
            std_out: std_out.to_string(),
        })
}
