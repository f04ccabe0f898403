/// Module for shared constants, errors and macros.
pub mod common;
/// Module which drives a release-to-chart conversion end to end.
pub mod convert;
/// Module for Helm release records, chart trees and chart archives.
pub mod helm;
/// Module for Helm's release storage in Kubernetes.
pub mod storage;
