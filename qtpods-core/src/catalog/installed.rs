//! Installed pod listing from `.gitmodules`

use ini::{Ini, ParseOption};
use std::path::Path;
use tracing::{debug, warn};

use crate::pod::Pod;
use crate::podinfo::PodInfoStore;

/// git's submodule manifest
pub const GITMODULES_FILE: &str = ".gitmodules";

/// Manifest sections describing submodules start with this marker,
/// e.g. `[submodule "qtcurl"]`
const SUBMODULE_MARKER: &str = "submodule";

/// Submodules registered in `repository`, in manifest order, with only
/// name and URL filled in.
///
/// A missing or unparsable manifest yields an empty list.
pub fn read_submodules(repository: &Path) -> Vec<Pod> {
    let path = repository.join(GITMODULES_FILE);
    if !path.exists() {
        debug!("No {} in {}", GITMODULES_FILE, repository.display());
        return Vec::new();
    }

    // git writes URLs and paths verbatim; backslashes are not escapes here
    let options = ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    };
    let manifest = match Ini::load_from_file_opt(&path, options) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("Failed to parse {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    manifest
        .iter()
        .filter_map(|(section, properties)| {
            let section = section?;
            if !section.starts_with(SUBMODULE_MARKER) {
                return None;
            }

            let Some(name) = properties.get("path") else {
                warn!("Skipping [{}] without a path", section);
                return None;
            };
            Some(Pod::new(name, properties.get("url").unwrap_or_default()))
        })
        .collect()
}

/// Installed pods of `repository` with their `.podinfo` metadata
pub fn installed_pods(repository: &Path) -> Vec<Pod> {
    let store = PodInfoStore::for_repository(repository);

    read_submodules(repository)
        .into_iter()
        .map(|mut pod| {
            store.read(&mut pod);
            pod
        })
        .collect()
}
