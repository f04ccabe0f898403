use clap::Parser;
use release2chart::helm::package::PackagerKind;
use std::path::PathBuf;

/// Validate input whose validation depends on the environment or on other inputs.
pub(crate) mod validators;

/// These are the supported cli configuration options for release2chart.
#[derive(Parser)]
#[command(name = "release2chart", version)]
#[command(about = "Convert a Helm release to a Helm chart", long_about = None)]
pub(crate) struct CliArgs {
    /// This is the name of the Helm release to convert.
    #[arg(value_name = "RELEASE")]
    release_name: String,

    /// This is the release revision to convert. The latest revision is used if not set.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    revision: Option<u32>,

    /// This is the Kubernetes Namespace for the Helm release. Defaults to the namespace of the
    /// kubeconfig context.
    #[arg(short, long, env = "HELM_NAMESPACE")]
    namespace: Option<String>,

    /// Path to the kubeconfig file.
    #[arg(long, value_name = "FILE_PATH")]
    kubeconfig: Option<PathBuf>,

    /// Name of the kubeconfig context to use.
    #[arg(long)]
    kube_context: Option<String>,

    /// This is the helm storage driver, e.g. secret, configmap.
    #[arg(long = "storage-driver", env = "HELM_DRIVER", default_value = "")]
    helm_storage_driver: String,

    /// The directory the chart archive and the values file are written to.
    #[arg(short, long, default_value = ".", value_name = "DIR_PATH")]
    destination: PathBuf,

    /// The tool which produces the chart archive.
    #[arg(long, value_enum, default_value_t = PackagerKind::Native)]
    packager: PackagerKind,

    /// Print console messages without ANSI colors.
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

impl CliArgs {
    /// This returns the Helm release name.
    pub(crate) fn release_name(&self) -> String {
        self.release_name.clone()
    }

    /// This returns the revision, if one was asked for.
    pub(crate) fn revision(&self) -> Option<u32> {
        self.revision
    }

    /// This returns the Kubernetes Namespace for the Helm release, if one was set.
    pub(crate) fn namespace(&self) -> Option<String> {
        self.namespace.clone()
    }

    /// This returns the kubeconfig filepath.
    pub(crate) fn kubeconfig(&self) -> Option<PathBuf> {
        self.kubeconfig.clone()
    }

    /// This returns the kubeconfig context.
    pub(crate) fn kube_context(&self) -> Option<String> {
        self.kube_context.clone()
    }

    /// This is the helm storage driver, e.g.: secret, secrets, configmap, configmaps.
    pub(crate) fn helm_storage_driver(&self) -> String {
        self.helm_storage_driver.clone()
    }

    /// This returns the output directory.
    pub(crate) fn destination(&self) -> PathBuf {
        self.destination.clone()
    }

    /// This returns the packager choice.
    pub(crate) fn packager(&self) -> PackagerKind {
        self.packager
    }

    /// This returns ansi_colours arg.
    pub(crate) fn ansi_colours(&self) -> bool {
        !self.no_color
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::{CommandFactory, Parser};
    use release2chart::helm::package::PackagerKind;
    use std::path::PathBuf;

    #[test]
    fn cli_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let opts = CliArgs::try_parse_from(["release2chart", "web"]).unwrap();
        assert_eq!(opts.release_name(), "web");
        assert_eq!(opts.revision(), None);
        assert_eq!(opts.destination(), PathBuf::from("."));
        assert_eq!(opts.packager(), PackagerKind::Native);
        assert!(opts.ansi_colours());
    }

    #[test]
    fn explicit_options() {
        let opts = CliArgs::try_parse_from([
            "release2chart",
            "web",
            "--revision",
            "4",
            "-n",
            "apps",
            "--storage-driver",
            "configmap",
            "-d",
            "out",
            "--packager",
            "helm",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(opts.revision(), Some(4));
        assert_eq!(opts.namespace(), Some("apps".to_string()));
        assert_eq!(opts.helm_storage_driver(), "configmap");
        assert_eq!(opts.destination(), PathBuf::from("out"));
        assert_eq!(opts.packager(), PackagerKind::Helm);
        assert!(!opts.ansi_colours());
    }

    #[test]
    fn release_name_is_required() {
        assert!(CliArgs::try_parse_from(["release2chart"]).is_err());
    }

    #[test]
    fn revision_must_be_positive() {
        assert!(CliArgs::try_parse_from(["release2chart", "web", "--revision", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["release2chart", "web", "--revision", "x"]).is_err());
    }
}
