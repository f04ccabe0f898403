use crate::opts::{
    validators::{validate_destination_dir, validate_helmv3_in_path, validate_storage_driver},
    CliArgs,
};
use clap::Parser;
use console_logger::Console;
use release2chart::{
    common::{error::Result, kube_client},
    convert::{convert_release, ConvertOptions},
    helm::package::PackagerKind,
    storage::{revision::find_latest_revision, store::KubeReleaseStore},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod opts;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let opts = CliArgs::parse();
    let console = Console::new(opts.ansi_colours());

    if let Err(error) = run(&opts, &console).await {
        error!(%error, "Failed to convert Helm release {}", opts.release_name());
        console.error("Failed to convert release:", error.to_string().as_str());
        std::process::exit(1);
    }
}

/// Initialize logging components -- tracing. Logs go to stderr, stdout is kept for the
/// install instructions.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

async fn run(opts: &CliArgs, console: &Console) -> Result<()> {
    let driver = validate_storage_driver(opts.helm_storage_driver())?;
    validate_destination_dir(opts.destination())?;
    if opts.packager() == PackagerKind::Helm {
        validate_helmv3_in_path()?;
    }
    info!("Validated all inputs");

    let client = kube_client::client(opts.kubeconfig(), opts.kube_context()).await?;
    let namespace = opts
        .namespace()
        .unwrap_or_else(|| client.default_namespace().to_string());
    let release_name = opts.release_name();
    let store = KubeReleaseStore::new(client, driver);

    let revision = match opts.revision() {
        Some(revision) => revision,
        None => find_latest_revision(&store, namespace.as_str(), release_name.as_str()).await?,
    };

    let packager = opts.packager().packager();
    let conversion = convert_release(
        &store,
        packager.as_ref(),
        &ConvertOptions {
            namespace: namespace.clone(),
            release_name: release_name.clone(),
            revision,
            destination: opts.destination(),
        },
    )
    .await?;

    let saved = format!("Chart has been saved to {}", conversion.chart_file().display());
    console.info(saved.as_str());
    console.info("To install the chart, run the following command:");
    console.command(&conversion.install_command(release_name.as_str(), namespace.as_str()));

    Ok(())
}
