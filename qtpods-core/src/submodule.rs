//! Git submodule gateway
//!
//! Each operation is a fixed sequence of git invocations where every step
//! only runs if the previous one exited with status zero. Nothing is rolled
//! back: a failed add may leave a submodule without metadata and a failed
//! removal may leave a half deinitialised submodule behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::command::{Command, CommandRunner};
use crate::config::GitSettings;
use crate::error::{PodError, PodResult};
use crate::pod::Pod;

/// Issues git commands against repositories
#[derive(Clone)]
pub struct SubmoduleGateway {
    runner: Arc<dyn CommandRunner>,
    git: GitSettings,
}

impl SubmoduleGateway {
    pub fn new(runner: Arc<dyn CommandRunner>, git: GitSettings) -> Self {
        Self { runner, git }
    }

    /// Whether `repository` is the root of a git working tree.
    ///
    /// `.git` may be a directory or, for worktrees and nested submodules, a file.
    pub fn is_repository(repository: &Path) -> bool {
        repository.join(".git").exists()
    }

    /// `git submodule add <url> <name>`
    pub fn add(&self, repository: &Path, pod: &Pod) -> PodResult<()> {
        self.exec(
            self.git(repository)
                .args(["submodule", "add"])
                .arg(pod.url.as_str())
                .arg(pod.name.as_str()),
        )
    }

    /// Deinit the submodule, remove its working tree and drop git's internal
    /// state for it. Succeeds only if all three steps do.
    pub fn remove(&self, repository: &Path, name: &str) -> PodResult<()> {
        self.exec(
            self.git(repository)
                .args(["submodule", "deinit", "-f"])
                .arg(name),
        )?;

        self.exec(self.git(repository).args(["rm", "-rf"]).arg(name))?;

        let module_dir = module_state_dir(repository, name);
        if !module_dir.exists() {
            debug!("No module state at {}", module_dir.display());
            return Ok(());
        }
        match std::fs::remove_dir_all(&module_dir) {
            Ok(()) => debug!("Removed {}", module_dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(PodError::io(module_dir, e)),
        }

        Ok(())
    }

    /// Stash local changes, check out the primary branch and pull, inside
    /// the pod's own directory.
    pub fn update(&self, repository: &Path, name: &str) -> PodResult<()> {
        let pod_dir = repository.join(name);

        self.exec(self.git(&pod_dir).arg("stash"))?;
        self.exec(
            self.git(&pod_dir)
                .arg("checkout")
                .arg(self.git.primary_branch.as_str()),
        )?;
        self.exec(self.git(&pod_dir).arg("pull"))
    }

    /// `git init`
    pub fn init(&self, repository: &Path) -> PodResult<()> {
        self.exec(self.git(repository).arg("init"))
    }

    /// Stage `file` for the next commit.
    ///
    /// Staging is best effort; failures are logged and otherwise ignored.
    pub fn stage(&self, repository: &Path, file: &str) {
        if let Err(e) = self.exec(self.git(repository).arg("add").arg(file)) {
            warn!("Could not stage {}: {}", file, e);
        }
    }

    fn git(&self, working_dir: &Path) -> Command {
        Command::new(self.git.program.as_str(), working_dir)
    }

    fn exec(&self, command: Command) -> PodResult<()> {
        self.runner.run_checked(&command).map(|_| ())
    }
}

/// Directory holding the repository's git data.
///
/// `.git` is either that directory or, in worktrees and nested submodules, a
/// file containing `gitdir: <path>` relative to the repository.
pub fn git_dir(repository: &Path) -> PathBuf {
    let dot_git = repository.join(".git");
    if !dot_git.is_file() {
        return dot_git;
    }

    let target = std::fs::read_to_string(&dot_git).ok().and_then(|content| {
        content
            .lines()
            .find_map(|line| line.strip_prefix("gitdir:"))
            .map(|path| path.trim().to_string())
    });

    match target {
        Some(path) => repository.join(path),
        None => {
            warn!("Unrecognised {}", dot_git.display());
            dot_git
        }
    }
}

/// Where git keeps a submodule's repository data
pub fn module_state_dir(repository: &Path, name: &str) -> PathBuf {
    git_dir(repository).join("modules").join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records commands and fails the first one whose text contains `fail_on`
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<Command>>,
        fail_on: Option<&'static str>,
    }

    impl CommandRunner for Recorder {
        fn run(&self, command: &Command) -> PodResult<CommandOutput> {
            self.calls.lock().unwrap().push(command.clone());
            let failed = self
                .fail_on
                .is_some_and(|needle| command.to_string().contains(needle));
            Ok(CommandOutput {
                status: if failed { 1 } else { 0 },
                ..Default::default()
            })
        }
    }

    fn gateway(recorder: Arc<Recorder>) -> SubmoduleGateway {
        SubmoduleGateway::new(recorder, GitSettings::default())
    }

    fn lines(recorder: &Recorder) -> Vec<String> {
        recorder
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_add_passes_url_and_name_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder::default());
        let pod = Pod::new("QtCurl", "https://example.com/qtcurl.git");

        gateway(recorder.clone()).add(temp_dir.path(), &pod).unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            ["submodule", "add", "https://example.com/qtcurl.git", "QtCurl"]
        );
        assert_eq!(calls[0].working_dir, temp_dir.path());
    }

    #[test]
    fn test_remove_runs_all_steps_and_drops_module_state() {
        let temp_dir = TempDir::new().unwrap();
        let state = module_state_dir(temp_dir.path(), "qtcurl");
        std::fs::create_dir_all(&state).unwrap();
        let recorder = Arc::new(Recorder::default());

        gateway(recorder.clone())
            .remove(temp_dir.path(), "qtcurl")
            .unwrap();

        assert_eq!(
            lines(&recorder),
            ["git submodule deinit -f qtcurl", "git rm -rf qtcurl"]
        );
        assert!(!state.exists());
    }

    #[test]
    fn test_module_state_follows_gitdir_file() {
        let temp_dir = TempDir::new().unwrap();
        let repo = temp_dir.path().join("nested");
        std::fs::create_dir(&repo).unwrap();
        std::fs::write(repo.join(".git"), "gitdir: ../.git/modules/nested\n").unwrap();

        assert_eq!(
            module_state_dir(&repo, "qtcurl"),
            repo.join("../.git/modules/nested")
                .join("modules")
                .join("qtcurl")
        );
    }

    #[test]
    fn test_remove_with_gitdir_file_and_no_module_state() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(".git"), "gitdir: /nonexistent/wt\n").unwrap();
        let recorder = Arc::new(Recorder::default());

        gateway(recorder.clone())
            .remove(temp_dir.path(), "qtcurl")
            .unwrap();

        assert_eq!(
            lines(&recorder),
            ["git submodule deinit -f qtcurl", "git rm -rf qtcurl"]
        );
    }

    #[test]
    fn test_remove_stops_after_failed_deinit() {
        let temp_dir = TempDir::new().unwrap();
        let state = module_state_dir(temp_dir.path(), "qtcurl");
        std::fs::create_dir_all(&state).unwrap();
        let recorder = Arc::new(Recorder {
            fail_on: Some("deinit"),
            ..Default::default()
        });

        let err = gateway(recorder.clone())
            .remove(temp_dir.path(), "qtcurl")
            .unwrap_err();

        assert!(matches!(err, PodError::CommandFailed { status: 1, .. }));
        assert_eq!(lines(&recorder), ["git submodule deinit -f qtcurl"]);
        assert!(state.exists());
    }

    #[test]
    fn test_update_runs_inside_pod_directory() {
        let temp_dir = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder::default());

        gateway(recorder.clone())
            .update(temp_dir.path(), "qtcurl")
            .unwrap();

        assert_eq!(
            lines(&recorder),
            ["git stash", "git checkout master", "git pull"]
        );
        let calls = recorder.calls.lock().unwrap();
        assert!(calls
            .iter()
            .all(|c| c.working_dir == temp_dir.path().join("qtcurl")));
    }

    #[test]
    fn test_update_uses_configured_branch() {
        let temp_dir = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder {
            fail_on: Some("pull"),
            ..Default::default()
        });
        let git = GitSettings {
            primary_branch: "main".to_string(),
            ..GitSettings::default()
        };

        let result =
            SubmoduleGateway::new(recorder.clone(), git).update(temp_dir.path(), "qtcurl");

        assert!(result.is_err());
        assert_eq!(
            lines(&recorder),
            ["git stash", "git checkout main", "git pull"]
        );
    }

    #[test]
    fn test_stage_failure_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        let recorder = Arc::new(Recorder {
            fail_on: Some("add"),
            ..Default::default()
        });

        gateway(recorder.clone()).stage(temp_dir.path(), "pods.pri");
        assert_eq!(lines(&recorder), ["git add pods.pri"]);
    }
}
