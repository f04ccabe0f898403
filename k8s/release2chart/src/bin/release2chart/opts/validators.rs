use release2chart::{
    common::{
        constants::HELM_COMMAND,
        error::{
            HelmCommand, HelmVersion, HelmVersionCommand, NotADirectory, Result, U8VectorToString,
            ValidateDirPath,
        },
    },
    storage::driver::StorageDriver,
    vec_to_strings,
};
use semver::Version;
use snafu::{ensure, ResultExt};
use std::{fs, path::PathBuf, process::Command, str};
use tracing::debug;

/// Validate the helm storage driver, and pick the matching StorageDriver.
pub(crate) fn validate_storage_driver(driver: String) -> Result<StorageDriver> {
    driver.parse()
}

/// Validate that the output directory exists.
pub(crate) fn validate_destination_dir(dir_path: PathBuf) -> Result<()> {
    let is_dir = fs::metadata(dir_path.as_path())
        .map(|m| m.is_dir())
        .context(ValidateDirPath {
            path: dir_path.clone(),
        })?;

    ensure!(is_dir, NotADirectory { path: dir_path });

    Ok(())
}

/// Validate that the helm v3 binary is present in the shell's $PATH.
pub(crate) fn validate_helmv3_in_path() -> Result<()> {
    let command: &str = HELM_COMMAND;
    let args: Vec<String> = vec_to_strings!["version", "--short"];

    debug!(%command, ?args, "Helm version command");

    // Execute `helm version` to verify if the binary exists.
    let output = Command::new(command)
        .args(args.clone())
        .output()
        .context(HelmCommand {
            command: command.to_string(),
            args: args.clone(),
        })?;

    let stdout_str = str::from_utf8(output.stdout.as_slice()).context(U8VectorToString)?;
    debug!(stdout=%stdout_str, "Helm version command standard output");
    ensure!(
        output.status.success(),
        HelmVersionCommand {
            command: command.to_string(),
            args,
            std_err: str::from_utf8(output.stderr.as_slice())
                .context(U8VectorToString)?
                .to_string()
        }
    );

    ensure!(
        is_helm_v3(stdout_str),
        HelmVersion {
            version: stdout_str.trim()
        }
    );

    Ok(())
}

/// Checks `helm version --short` output, e.g. v3.13.2+g2a2fb3b.
fn is_helm_v3(version: &str) -> bool {
    version
        .trim()
        .strip_prefix('v')
        .and_then(|version| Version::parse(version).ok())
        .is_some_and(|version| version.major == 3)
}
