/// Contains the Helm storage driver selection.
pub mod driver;

/// Contains revision lookup over a release store.
pub mod revision;

/// Contains the release store abstraction and its Kubernetes implementation.
pub mod store;
