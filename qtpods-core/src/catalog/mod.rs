//! Pod catalogs
//!
//! Two lists of pods are resolved here:
//!
//! - installed pods, read from the repository's `.gitmodules` and enriched
//!   with `.podinfo` metadata;
//! - available pods, parsed from the pod list documents published at the
//!   configured source URLs.
//!
//! ```text
//!   source URLs ──► CatalogSource::fetch ──► parse_pod_list ──► Vec<Pod>
//!   .gitmodules ──► read_submodules ──► PodInfoStore::read ──► Vec<Pod>
//! ```

mod index;
mod installed;
mod source;

pub use index::parse_pod_list;
pub use installed::{installed_pods, read_submodules, GITMODULES_FILE};
#[cfg(feature = "catalog")]
pub use source::HttpCatalogSource;
pub use source::{available_pods, CatalogSource, OfflineCatalogSource};
