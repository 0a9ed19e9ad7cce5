//! Shared helpers for qtpods-core integration tests

use qtpods_core::command::{Command, CommandOutput, CommandRunner};
use qtpods_core::catalog::GITMODULES_FILE;
use qtpods_core::PodResult;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
#[allow(dead_code)]
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Stands in for git.
///
/// Records every command and mimics what git does to `.gitmodules` and the
/// working tree for `submodule add`, `rm -rf` and `init`. A command whose
/// text contains one of `fail_on` exits with status 1 and changes nothing.
#[derive(Default)]
pub struct FakeGit {
    pub calls: Mutex<Vec<Command>>,
    pub fail_on: Vec<String>,
}

#[allow(dead_code)]
impl FakeGit {
    pub fn failing_on(patterns: &[&str]) -> Self {
        Self {
            fail_on: patterns.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Every command line run so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn simulate(&self, command: &Command) {
        let dir = &command.working_dir;
        let args: Vec<&str> = command.args.iter().map(String::as_str).collect();

        match args.as_slice() {
            ["submodule", "add", url, name] => {
                let entry = format!("[submodule \"{name}\"]\n\tpath = {name}\n\turl = {url}\n");
                let manifest = dir.join(GITMODULES_FILE);
                let mut content = fs::read_to_string(&manifest).unwrap_or_default();
                content.push_str(&entry);
                fs::write(manifest, content).unwrap();
                fs::create_dir_all(dir.join(name)).unwrap();
            }
            ["rm", "-rf", name] => {
                remove_manifest_entry(dir, name);
                let _ = fs::remove_dir_all(dir.join(name));
            }
            ["init"] => fs::create_dir_all(dir.join(".git")).unwrap(),
            _ => {}
        }
    }
}

impl CommandRunner for FakeGit {
    fn run(&self, command: &Command) -> PodResult<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());

        let line = command.to_string();
        if self.fail_on.iter().any(|p| line.contains(p.as_str())) {
            return Ok(CommandOutput {
                status: 1,
                stderr: format!("fatal: scripted failure of `{line}`"),
                ..Default::default()
            });
        }

        self.simulate(command);
        Ok(CommandOutput::default())
    }
}

fn remove_manifest_entry(repository: &Path, name: &str) {
    let manifest = repository.join(GITMODULES_FILE);
    let Ok(content) = fs::read_to_string(&manifest) else {
        return;
    };

    let header = format!("[submodule \"{name}\"]");
    let mut kept = String::new();
    let mut skipping = false;
    for line in content.lines() {
        if line.starts_with('[') {
            skipping = line == header;
        }
        if !skipping {
            kept.push_str(line);
            kept.push('\n');
        }
    }
    fs::write(manifest, kept).unwrap();
}

/// A directory that looks like a git repository
#[allow(dead_code)]
pub fn fake_repository(root: &Path, name: &str) -> std::path::PathBuf {
    let repo = root.join(name);
    fs::create_dir_all(repo.join(".git")).unwrap();
    repo
}
