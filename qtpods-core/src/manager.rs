//! Pod lifecycle orchestration
//!
//! [`PodManager`] is the entry point for every pod operation. Mutating
//! operations follow the same shape:
//!
//! 1. refuse to touch anything unless the target is a git repository;
//! 2. run the submodule protocol through the gateway;
//! 3. on success, bring `.podinfo` in line and regenerate the qmake files.
//!
//! Generated files are only regenerated after a fully successful mutation.
//! Partial failures are not rolled back; whatever the completed steps did
//! stays on disk. All operations block until done and none of them change
//! the process working directory, but two mutations of the same repository
//! must still not overlap.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::{self, CatalogSource};
use crate::command::{CommandRunner, SystemRunner};
use crate::config::GitSettings;
use crate::error::{PodError, PodResult};
use crate::generator;
use crate::pod::Pod;
use crate::podinfo::{PodInfoStore, PODINFO_FILE};
use crate::submodule::SubmoduleGateway;
use crate::validator;

/// Outcome of a finished operation, carrying the operation's inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    InstallPod {
        repository: PathBuf,
        pod: Pod,
        success: bool,
    },
    InstallPods {
        repository: PathBuf,
        pods: Vec<Pod>,
        success: bool,
    },
    RemovePod {
        repository: PathBuf,
        name: String,
        success: bool,
    },
    RemovePods {
        repository: PathBuf,
        names: Vec<String>,
        success: bool,
    },
    UpdatePod {
        repository: PathBuf,
        name: String,
        success: bool,
    },
    UpdatePods {
        repository: PathBuf,
        names: Vec<String>,
        success: bool,
    },
    UpdateAllPods {
        repository: PathBuf,
        success: bool,
    },
    GenerateFile {
        repository: PathBuf,
        file: String,
        success: bool,
    },
    CreateProject {
        repository: PathBuf,
        success: bool,
    },
}

impl Completion {
    pub fn success(&self) -> bool {
        match self {
            Completion::InstallPod { success, .. }
            | Completion::InstallPods { success, .. }
            | Completion::RemovePod { success, .. }
            | Completion::RemovePods { success, .. }
            | Completion::UpdatePod { success, .. }
            | Completion::UpdatePods { success, .. }
            | Completion::UpdateAllPods { success, .. }
            | Completion::GenerateFile { success, .. }
            | Completion::CreateProject { success, .. } => *success,
        }
    }
}

/// Callback invoked once per finished mutating operation
pub type CompletionHook = Box<dyn Fn(&Completion) + Send + Sync>;

/// Central type for performing pod operations
pub struct PodManager {
    gateway: SubmoduleGateway,
    on_complete: Option<CompletionHook>,
}

impl PodManager {
    pub fn new(runner: Arc<dyn CommandRunner>, git: GitSettings) -> Self {
        Self {
            gateway: SubmoduleGateway::new(runner, git),
            on_complete: None,
        }
    }

    /// A manager that runs the real git binary
    pub fn with_system_git(git: GitSettings) -> Self {
        Self::new(Arc::new(SystemRunner), git)
    }

    /// Register a callback for completion events
    pub fn on_complete(mut self, hook: impl Fn(&Completion) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }

    pub fn is_git_repository(&self, repository: &Path) -> bool {
        SubmoduleGateway::is_repository(repository)
    }

    /// Add `pod` as a submodule and record its metadata
    pub fn install_pod(&self, repository: &Path, pod: &Pod) -> PodResult<()> {
        let result = self.ensure_repository(repository).and_then(|_| {
            self.gateway.add(repository, pod)?;
            self.write_pod_info(repository, pod)?;
            self.regenerate(repository)
        });

        self.finish(result, |success| Completion::InstallPod {
            repository: repository.to_path_buf(),
            pod: pod.clone(),
            success,
        })
    }

    /// Add several pods. Metadata is written for every pod that was added;
    /// the qmake files are regenerated only if all of them were.
    pub fn install_pods(&self, repository: &Path, pods: &[Pod]) -> PodResult<()> {
        let result = self.ensure_repository(repository).and_then(|_| {
            let mut failed = Vec::new();
            for pod in pods {
                let outcome = self
                    .gateway
                    .add(repository, pod)
                    .and_then(|_| self.write_pod_info(repository, pod));
                if log_item_failure("install", &pod.name, outcome) {
                    failed.push(pod.name.clone());
                }
            }

            batch_result(failed)?;
            self.regenerate(repository)
        });

        self.finish(result, |success| Completion::InstallPods {
            repository: repository.to_path_buf(),
            pods: pods.to_vec(),
            success,
        })
    }

    /// Remove a pod's submodule and its metadata
    pub fn remove_pod(&self, repository: &Path, name: &str) -> PodResult<()> {
        let result = self.ensure_repository(repository).and_then(|_| {
            self.gateway.remove(repository, name)?;
            self.purge_pod_info(repository, name)?;
            self.regenerate(repository)
        });

        self.finish(result, |success| Completion::RemovePod {
            repository: repository.to_path_buf(),
            name: name.to_string(),
            success,
        })
    }

    /// Remove several pods. Each pod's metadata is purged as soon as its own
    /// removal succeeds; the qmake files are regenerated only if every
    /// removal succeeded.
    pub fn remove_pods(&self, repository: &Path, names: &[String]) -> PodResult<()> {
        let result = self.ensure_repository(repository).and_then(|_| {
            let mut failed = Vec::new();
            for name in names {
                let outcome = self
                    .gateway
                    .remove(repository, name)
                    .and_then(|_| self.purge_pod_info(repository, name));
                if log_item_failure("remove", name, outcome) {
                    failed.push(name.clone());
                }
            }

            batch_result(failed)?;
            self.regenerate(repository)
        });

        self.finish(result, |success| Completion::RemovePods {
            repository: repository.to_path_buf(),
            names: names.to_vec(),
            success,
        })
    }

    /// Stash, check out the primary branch and pull inside one pod
    pub fn update_pod(&self, repository: &Path, name: &str) -> PodResult<()> {
        let result = self
            .ensure_repository(repository)
            .and_then(|_| self.gateway.update(repository, name));

        self.finish(result, |success| Completion::UpdatePod {
            repository: repository.to_path_buf(),
            name: name.to_string(),
            success,
        })
    }

    /// Update several pods. A failing pod does not stop the others; the
    /// operation succeeds only if every update did.
    pub fn update_pods(&self, repository: &Path, names: &[String]) -> PodResult<()> {
        let result = self
            .ensure_repository(repository)
            .and_then(|_| self.update_each(repository, names));

        self.finish(result, |success| Completion::UpdatePods {
            repository: repository.to_path_buf(),
            names: names.to_vec(),
            success,
        })
    }

    /// Update every installed pod, then regenerate the qmake files if all
    /// updates succeeded
    pub fn update_all_pods(&self, repository: &Path) -> PodResult<()> {
        let result = self.ensure_repository(repository).and_then(|_| {
            let names: Vec<String> = catalog::read_submodules(repository)
                .into_iter()
                .map(|pod| pod.name)
                .collect();
            self.update_each(repository, &names)?;
            self.regenerate(repository)
        });

        self.finish(result, |success| Completion::UpdateAllPods {
            repository: repository.to_path_buf(),
            success,
        })
    }

    /// Installed pods with their metadata, in `.gitmodules` order
    pub fn installed_pods(&self, repository: &Path) -> Vec<Pod> {
        catalog::installed_pods(repository)
    }

    /// Pods offered by `sources`
    pub async fn available_pods(
        &self,
        catalog: &dyn CatalogSource,
        sources: &[String],
    ) -> Vec<Pod> {
        catalog::available_pods(catalog, sources).await
    }

    /// Rewrite `pods.pri` from the installed pods
    pub fn generate_pods_pri(&self, repository: &Path) -> PodResult<()> {
        let result = self.write_pods_pri(repository);
        self.finish(result, |success| Completion::GenerateFile {
            repository: repository.to_path_buf(),
            file: generator::PODS_PRI.to_string(),
            success,
        })
    }

    /// Rewrite `pods-subdirs.pri` from the installed pods
    pub fn generate_pods_subdirs_pri(&self, repository: &Path) -> PodResult<()> {
        let result = self.write_pods_subdirs_pri(repository);
        self.finish(result, |success| Completion::GenerateFile {
            repository: repository.to_path_buf(),
            file: generator::PODS_SUBDIRS_PRI.to_string(),
            success,
        })
    }

    /// Create the subdirs project named after the repository, if missing
    pub fn generate_subdirs_pro(&self, repository: &Path) -> PodResult<()> {
        let result = self.write_subdirs_pro(repository);
        self.finish(result, |success| Completion::GenerateFile {
            repository: repository.to_path_buf(),
            file: generator::subdirs_pro_name(repository),
            success,
        })
    }

    /// Whether `name` is a well-formed pod inside `repository`
    pub fn check_pod(&self, repository: &Path, name: &str) -> bool {
        validator::check_pod(repository, name)
    }

    /// Turn `repository` into an empty pods project: create the directory,
    /// initialise git if needed and write the qmake files
    pub fn create_project(&self, repository: &Path) -> PodResult<()> {
        let result = self.setup_project(repository);
        self.finish(result, |success| Completion::CreateProject {
            repository: repository.to_path_buf(),
            success,
        })
    }

    fn setup_project(&self, repository: &Path) -> PodResult<()> {
        std::fs::create_dir_all(repository).map_err(|e| PodError::io(repository, e))?;

        if !self.is_git_repository(repository) {
            self.gateway.init(repository)?;
        }
        if !self.is_git_repository(repository) {
            return Err(PodError::ProjectSetup {
                repository: repository.to_path_buf(),
            });
        }

        self.regenerate(repository)
    }

    fn ensure_repository(&self, repository: &Path) -> PodResult<()> {
        if self.is_git_repository(repository) {
            Ok(())
        } else {
            Err(PodError::NotARepository {
                repository: repository.to_path_buf(),
            })
        }
    }

    fn update_each(&self, repository: &Path, names: &[String]) -> PodResult<()> {
        let mut failed = Vec::new();
        for name in names {
            let outcome = self.gateway.update(repository, name);
            if log_item_failure("update", name, outcome) {
                failed.push(name.clone());
            }
        }

        batch_result(failed)
    }

    fn write_pod_info(&self, repository: &Path, pod: &Pod) -> PodResult<()> {
        PodInfoStore::for_repository(repository).write(pod)?;
        self.gateway.stage(repository, PODINFO_FILE);
        Ok(())
    }

    fn purge_pod_info(&self, repository: &Path, name: &str) -> PodResult<()> {
        let store = PodInfoStore::for_repository(repository);
        store.purge(name)?;
        if store.path().exists() {
            self.gateway.stage(repository, PODINFO_FILE);
        }
        Ok(())
    }

    /// Regenerate all three qmake files
    fn regenerate(&self, repository: &Path) -> PodResult<()> {
        self.write_pods_pri(repository)?;
        self.write_pods_subdirs_pri(repository)?;
        self.write_subdirs_pro(repository)
    }

    fn write_pods_pri(&self, repository: &Path) -> PodResult<()> {
        let pods = catalog::installed_pods(repository);
        generator::write_pods_pri(repository, &pods)?;
        self.gateway.stage(repository, generator::PODS_PRI);
        Ok(())
    }

    fn write_pods_subdirs_pri(&self, repository: &Path) -> PodResult<()> {
        let pods = catalog::installed_pods(repository);
        generator::write_pods_subdirs_pri(repository, &pods)?;
        self.gateway.stage(repository, generator::PODS_SUBDIRS_PRI);
        Ok(())
    }

    fn write_subdirs_pro(&self, repository: &Path) -> PodResult<()> {
        generator::write_subdirs_pro(repository)?;
        self.gateway
            .stage(repository, &generator::subdirs_pro_name(repository));
        Ok(())
    }

    fn finish<T>(
        &self,
        result: PodResult<T>,
        completion: impl FnOnce(bool) -> Completion,
    ) -> PodResult<T> {
        let completion = completion(result.is_ok());

        match &result {
            Ok(_) => info!(?completion, "Pod operation finished"),
            Err(e) => warn!(?completion, "Pod operation failed: {}", e),
        }

        if let Some(hook) = &self.on_complete {
            hook(&completion);
        }

        result
    }
}

/// Logs a failed batch item; returns true if it failed
fn log_item_failure(action: &str, name: &str, outcome: PodResult<()>) -> bool {
    match outcome {
        Ok(()) => false,
        Err(e) => {
            warn!("Failed to {} pod '{}': {}", action, name, e);
            true
        }
    }
}

fn batch_result(failed: Vec<String>) -> PodResult<()> {
    if failed.is_empty() {
        Ok(())
    } else {
        Err(PodError::BatchFailed { failed })
    }
}
