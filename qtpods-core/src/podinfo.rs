//! Pod metadata store (`.podinfo`)
//!
//! `.gitmodules` only records a submodule's path and URL. Author, description,
//! license and website live next to it in `.podinfo`, one INI group per pod:
//!
//! ```ini
//! [qtcurl]
//! author=Jane Doe
//! description=libcurl bindings
//! license=MIT
//! website=https://example.com/qtcurl
//! ```
//!
//! A group exists exactly while the pod is installed. Every write goes
//! straight to disk; nothing is buffered between calls. Values are free
//! text: quotes are literal, surrounding whitespace is not kept.

use ini::{EscapePolicy, Ini, ParseOption};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PodError, PodResult};
use crate::pod::Pod;

/// File name of the metadata store inside a repository
pub const PODINFO_FILE: &str = ".podinfo";

const KEY_AUTHOR: &str = "author";
const KEY_DESCRIPTION: &str = "description";
const KEY_LICENSE: &str = "license";
const KEY_WEBSITE: &str = "website";

/// Handle on the `.podinfo` file of one repository
#[derive(Debug, Clone)]
pub struct PodInfoStore {
    path: PathBuf,
}

impl PodInfoStore {
    pub fn for_repository(repository: &Path) -> Self {
        Self {
            path: repository.join(PODINFO_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace the group for `pod`
    pub fn write(&self, pod: &Pod) -> PodResult<()> {
        let mut ini = self.load()?;
        ini.with_section(Some(pod.name.as_str()))
            .set(KEY_AUTHOR, pod.author.trim())
            .set(KEY_DESCRIPTION, pod.description.trim())
            .set(KEY_LICENSE, pod.license.trim())
            .set(KEY_WEBSITE, pod.website.trim());
        self.save(&ini)?;

        debug!("Wrote pod info for '{}'", pod.name);
        Ok(())
    }

    /// Remove the group for `name`. Returns whether a group existed.
    pub fn purge(&self, name: &str) -> PodResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        let mut ini = self.load()?;
        let existed = ini.delete(Some(name)).is_some();
        if existed {
            self.save(&ini)?;
            debug!("Purged pod info for '{}'", name);
        }
        Ok(existed)
    }

    /// Fill `pod`'s metadata from its group.
    ///
    /// Fields stay untouched when there is no group, and an unreadable store
    /// reads as empty.
    pub fn read(&self, pod: &mut Pod) {
        let ini = match self.load() {
            Ok(ini) => ini,
            Err(e) => {
                warn!("Ignoring unreadable {}: {}", self.path.display(), e);
                return;
            }
        };

        if let Some(section) = ini.section(Some(pod.name.as_str())) {
            let field = |key: &str| section.get(key).unwrap_or_default().to_string();
            pod.author = field(KEY_AUTHOR);
            pod.description = field(KEY_DESCRIPTION);
            pod.license = field(KEY_LICENSE);
            pod.website = field(KEY_WEBSITE);
        }
    }

    /// Whether a group for `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.load()
            .map(|ini| ini.section(Some(name)).is_some())
            .unwrap_or(false)
    }

    fn load(&self) -> PodResult<Ini> {
        if !self.path.exists() {
            return Ok(Ini::new());
        }

        let options = ParseOption {
            enabled_quote: false,
            ..ParseOption::default()
        };
        Ini::load_from_file_opt(&self.path, options).map_err(|source| PodError::Metadata {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, ini: &Ini) -> PodResult<()> {
        ini.write_to_file_policy(&self.path, EscapePolicy::Reserved)
            .map_err(|e| PodError::io(&self.path, e))
    }
}
