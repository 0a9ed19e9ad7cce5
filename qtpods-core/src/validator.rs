//! Pod layout validation
//!
//! A well-formed pod lives in `<repository>/<name>` with a lowercase name and
//! ships a license, a readme and a qmake project/include pair named after
//! itself.

use std::fmt;
use std::path::Path;

use crate::pod::is_valid_name;

pub const LICENSE_FILE: &str = "LICENSE";
pub const README_FILE: &str = "README.md";

/// A requirement a pod directory does not meet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodIssue {
    NameNotLowercase,
    MissingDirectory,
    MissingFile(String),
}

impl fmt::Display for PodIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PodIssue::NameNotLowercase => write!(f, "pod name must be all lowercase"),
            PodIssue::MissingDirectory => write!(f, "pod directory does not exist"),
            PodIssue::MissingFile(file) => write!(f, "missing {file}"),
        }
    }
}

/// List every requirement `name` violates inside `repository`
pub fn diagnose(repository: &Path, name: &str) -> Vec<PodIssue> {
    let mut issues = Vec::new();

    if !is_valid_name(name) {
        issues.push(PodIssue::NameNotLowercase);
    }

    let pod_dir = repository.join(name);
    if !pod_dir.is_dir() {
        issues.push(PodIssue::MissingDirectory);
        return issues;
    }

    let required = [
        LICENSE_FILE.to_string(),
        README_FILE.to_string(),
        format!("{name}.pri"),
        format!("{name}.pro"),
    ];
    for file in required {
        if !pod_dir.join(&file).exists() {
            issues.push(PodIssue::MissingFile(file));
        }
    }

    issues
}

/// Whether `name` is a valid pod inside `repository`
pub fn check_pod(repository: &Path, name: &str) -> bool {
    diagnose(repository, name).is_empty()
}
