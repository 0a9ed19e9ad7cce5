//! qmake project file generation
//!
//! Three files are derived from the installed pod list:
//!
//! - `pods.pri` includes every pod's `<name>/<name>.pri`; application projects
//!   include it with `include(../pods.pri)`.
//! - `pods-subdirs.pri` lists every pod in `SUBDIRS`.
//! - `<repository>.pro` is a subdirs project including `pods-subdirs.pri`. It
//!   is only created when missing so hand edits survive.
//!
//! Rendering is pure and deterministic: the same pod list always renders
//! the same bytes. Writing truncates whatever was there before.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PodError, PodResult};
use crate::pod::Pod;

pub const PODS_PRI: &str = "pods.pri";
pub const PODS_SUBDIRS_PRI: &str = "pods-subdirs.pri";

const PODS_PRI_HEADER: &str = "# Auto-generated by qt-pods. Do not edit.\n\
# Include this to your application project file with:\n\
# include(../pods.pri)\n\
# This file should be put under version control.\n";

const PODS_SUBDIRS_PRI_HEADER: &str = "# Auto-generated by qt-pods. Do not edit.\n\
# Include this to your subdirs project file with:\n\
# include(pods-subdirs.pri)\n\
# This file should be put under version control.\n";

const SUBDIRS_PRO: &str = "# Auto-generated by qt-pods.\n\
# This file should be put under version control.\n\
TEMPLATE = subdirs\n\
SUBDIRS =\n\
include(pods-subdirs.pri)\n";

/// Contents of `pods.pri` for `pods`
pub fn render_pods_pri(pods: &[Pod]) -> String {
    let includes: String = pods
        .iter()
        .map(|pod| format!("include({0}/{0}.pri)\n", pod.name))
        .collect();

    format!("{PODS_PRI_HEADER}\n{includes}\n")
}

/// Contents of `pods-subdirs.pri` for `pods`
pub fn render_pods_subdirs_pri(pods: &[Pod]) -> String {
    let mut subdirs = String::from("SUBDIRS += ");
    for pod in pods {
        subdirs.push_str(&format!("\\\n\t{} ", pod.name));
    }

    format!("{PODS_SUBDIRS_PRI_HEADER}\n{subdirs}\n\n")
}

/// Contents of a freshly created subdirs project
pub fn render_subdirs_pro() -> &'static str {
    SUBDIRS_PRO
}

/// File name of the subdirs project: the repository directory's own name.
pub fn subdirs_pro_name(repository: &Path) -> String {
    let resolved = repository
        .canonicalize()
        .unwrap_or_else(|_| repository.to_path_buf());

    let stem = resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    format!("{stem}.pro")
}

/// Overwrite `pods.pri`
pub fn write_pods_pri(repository: &Path, pods: &[Pod]) -> PodResult<PathBuf> {
    write_file(repository.join(PODS_PRI), &render_pods_pri(pods))
}

/// Overwrite `pods-subdirs.pri`
pub fn write_pods_subdirs_pri(repository: &Path, pods: &[Pod]) -> PodResult<PathBuf> {
    write_file(
        repository.join(PODS_SUBDIRS_PRI),
        &render_pods_subdirs_pri(pods),
    )
}

/// Create the subdirs project unless one exists. Returns its path and
/// whether it was created by this call.
pub fn write_subdirs_pro(repository: &Path) -> PodResult<(PathBuf, bool)> {
    let path = repository.join(subdirs_pro_name(repository));
    if path.exists() {
        debug!("Keeping existing {}", path.display());
        return Ok((path, false));
    }

    let path = write_file(path, render_subdirs_pro())?;
    Ok((path, true))
}

fn write_file(path: PathBuf, content: &str) -> PodResult<PathBuf> {
    std::fs::write(&path, content).map_err(|e| PodError::io(&path, e))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}
