use crate::{
    common::{
        constants::{HELM_OWNER, NAME_LABEL_KEY, OWNER_LABEL_KEY, VERSION_LABEL_KEY},
        error::{InvalidNoOfReleaseRecords, NoReleaseRevisions, Result},
    },
    helm::{
        codec::decode_release,
        release::{Info, Release},
    },
    storage::store::ReleaseStore,
};
use maplit::btreemap;
use snafu::{ensure, OptionExt};
use tracing::{debug, info, warn};

/// Builds the label selector for the storage objects of a release, or of one of its revisions.
pub fn release_selector(release_name: &str, revision: Option<u32>) -> String {
    let mut labels = btreemap! {
        OWNER_LABEL_KEY => HELM_OWNER.to_string(),
        NAME_LABEL_KEY => release_name.to_string(),
    };
    if let Some(revision) = revision {
        labels.insert(VERSION_LABEL_KEY, revision.to_string());
    }

    labels
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join(",")
}

/// Returns the highest revision amongst the stored records of a release. Records whose
/// 'version' label is missing or isn't a number are skipped.
pub async fn find_latest_revision(
    store: &dyn ReleaseStore,
    namespace: &str,
    release_name: &str,
) -> Result<u32> {
    let records = store
        .list(namespace, release_selector(release_name, None).as_str())
        .await?;

    let latest = records
        .iter()
        .filter_map(|record| {
            let revision = record.revision();
            if revision.is_none() {
                debug!(
                    record = record.name(),
                    "Skipping release record without a numeric revision label"
                );
            }
            revision
        })
        .max()
        .context(NoReleaseRevisions {
            release_name,
            namespace,
        })?;

    info!(
        release = release_name,
        %namespace,
        revision = latest,
        records = records.len(),
        "Found latest release revision"
    );
    Ok(latest)
}

/// Fetches and decodes the record of a release revision. Exactly one record must match, the
/// revision is never guessed.
pub async fn fetch_release(
    store: &dyn ReleaseStore,
    namespace: &str,
    release_name: &str,
    revision: u32,
) -> Result<Release> {
    let records = store
        .list(
            namespace,
            release_selector(release_name, Some(revision)).as_str(),
        )
        .await?;

    ensure!(
        records.len() == 1,
        InvalidNoOfReleaseRecords {
            release_name,
            namespace,
            revision,
            count: records.len(),
        }
    );
    let record = &records[0];

    let release = decode_release(record.payload())?;
    if !release.namespace().is_empty() && release.namespace() != namespace {
        warn!(
            record = record.name(),
            release_namespace = release.namespace(),
            %namespace,
            "Release record names another namespace"
        );
    }
    let info = release.info();
    info!(
        record = record.name(),
        status = record.status().or(release.status()).unwrap_or_default(),
        description = info.and_then(Info::description).unwrap_or_default(),
        first_deployed = info.and_then(Info::first_deployed).unwrap_or_default(),
        last_deployed = info.and_then(Info::last_deployed).unwrap_or_default(),
        manifest_bytes = release.manifest().len(),
        "Decoded release record"
    );
    Ok(release)
}

#[cfg(test)]
mod tests {
    use super::{fetch_release, find_latest_revision, release_selector};
    use crate::{
        common::error::Error,
        helm::codec::test_utils::{encode_release, sample_release},
        storage::store::{test_utils::MemoryStore, StoredRelease},
    };
    use maplit::btreemap;

    fn record(release_name: &str, version: &str, status: &str) -> StoredRelease {
        let payload = match version.parse::<u32>() {
            Ok(revision) => encode_release(&sample_release(release_name, revision), true),
            Err(_) => Vec::new(),
        };
        StoredRelease::new(
            format!("sh.helm.release.v1.{release_name}.v{version}"),
            btreemap! {
                "name".to_string() => release_name.to_string(),
                "owner".to_string() => "helm".to_string(),
                "status".to_string() => status.to_string(),
                "version".to_string() => version.to_string(),
            },
            payload,
        )
    }

    #[test]
    fn selector_has_sorted_equality_requirements() {
        assert_eq!(release_selector("web", None), "name=web,owner=helm");
        assert_eq!(
            release_selector("web", Some(7)),
            "name=web,owner=helm,version=7"
        );
    }

    #[tokio::test]
    async fn latest_revision_is_the_highest_label() {
        let store = MemoryStore::default()
            .with("apps", record("web", "2", "superseded"))
            .with("apps", record("web", "10", "deployed"))
            .with("apps", record("web", "9", "superseded"))
            .with("apps", record("web", "oops", "unknown"))
            .with("apps", record("api", "11", "deployed"))
            .with("other", record("web", "12", "deployed"));

        assert_eq!(find_latest_revision(&store, "apps", "web").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn no_revisions_is_an_error() {
        let store = MemoryStore::default().with("apps", record("web", "oops", "unknown"));

        let result = find_latest_revision(&store, "apps", "web").await;
        assert!(matches!(result, Err(Error::NoReleaseRevisions { .. })));

        let result = find_latest_revision(&store, "apps", "missing").await;
        assert!(matches!(result, Err(Error::NoReleaseRevisions { .. })));
    }

    #[tokio::test]
    async fn single_match_is_decoded() {
        let store = MemoryStore::default()
            .with("apps", record("web", "1", "superseded"))
            .with("apps", record("web", "2", "deployed"));

        let release = fetch_release(&store, "apps", "web", 1).await.unwrap();
        assert_eq!(release.name(), "web");
        assert_eq!(release.version(), 1);
    }

    #[tokio::test]
    async fn record_naming_another_namespace_is_still_decoded() {
        let store = MemoryStore::default().with("moved", record("web", "5", "deployed"));

        let release = fetch_release(&store, "moved", "web", 5).await.unwrap();
        assert_eq!(release.namespace(), "apps");
        assert_eq!(release.version(), 5);
    }

    #[tokio::test]
    async fn zero_matches_fail() {
        let store = MemoryStore::default().with("apps", record("web", "1", "deployed"));

        let result = fetch_release(&store, "apps", "web", 2).await;
        assert!(matches!(
            result,
            Err(Error::InvalidNoOfReleaseRecords { count: 0, .. })
        ));
    }

    #[tokio::test]
    async fn multiple_matches_fail() {
        let store = MemoryStore::default()
            .with("apps", record("web", "3", "deployed"))
            .with("apps", record("web", "3", "failed"));

        let result = fetch_release(&store, "apps", "web", 3).await;
        assert!(matches!(
            result,
            Err(Error::InvalidNoOfReleaseRecords { count: 2, .. })
        ));
    }
}
