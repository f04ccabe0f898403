use crate::common::error::{Error, UnsupportedStorageDriver};
use std::{fmt, str::FromStr};

/// This is the kind of Kubernetes object Helm keeps its release records in. It follows the values
/// Helm accepts in $HELM_DRIVER; only the drivers which keep their records in the cluster are
/// usable here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageDriver {
    #[default]
    Secret,
    ConfigMap,
}

impl StorageDriver {
    /// The Kubernetes kind of the storage objects.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Secret => "Secret",
            Self::ConfigMap => "ConfigMap",
        }
    }
}

impl FromStr for StorageDriver {
    type Err = Error;

    fn from_str(driver: &str) -> Result<Self, Self::Err> {
        match driver.trim().to_lowercase().as_str() {
            "" | "secret" | "secrets" => Ok(Self::Secret),
            "configmap" | "configmaps" => Ok(Self::ConfigMap),
            _ => UnsupportedStorageDriver {
                driver: driver.to_string(),
            }
            .fail(),
        }
    }
}

impl fmt::Display for StorageDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secret => write!(f, "secret"),
            Self::ConfigMap => write!(f, "configmap"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StorageDriver;
    use crate::common::error::Error;

    #[test]
    fn helm_driver_values() {
        for (input, expected) in [
            ("", StorageDriver::Secret),
            ("secret", StorageDriver::Secret),
            ("Secrets", StorageDriver::Secret),
            ("configmap", StorageDriver::ConfigMap),
            ("configmaps", StorageDriver::ConfigMap),
        ] {
            assert_eq!(input.parse::<StorageDriver>().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn drivers_without_cluster_records_are_rejected() {
        for input in ["memory", "sql", "etcd"] {
            assert!(matches!(
                input.parse::<StorageDriver>(),
                Err(Error::UnsupportedStorageDriver { .. })
            ));
        }
    }
}
