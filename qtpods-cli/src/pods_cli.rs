//! Pod commands
//!
//! Everything that reads or changes the pods of one repository.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::warn;

use qtpods_core::catalog::CatalogSource;
use qtpods_core::config::PodsConfig;
use qtpods_core::validator;
use qtpods_core::{Pod, PodManager};

/// Where to look for available pods
#[derive(Args, Debug, Default)]
pub struct CatalogArgs {
    /// Pod list URL to use instead of the configured sources (repeatable)
    #[clap(long = "source")]
    pub sources: Vec<String>,

    /// Do not fetch any pod list
    #[clap(long)]
    pub offline: bool,
}

#[derive(Subcommand, Debug)]
pub enum PodsCommand {
    /// Create a pods project (git repository plus generated qmake files)
    Init {
        /// Project directory (defaults to --repo)
        path: Option<PathBuf>,
    },

    /// Install pods as git submodules
    Install {
        /// Pod names
        #[clap(required = true)]
        names: Vec<String>,

        /// Install from this git URL instead of looking the pod up
        #[clap(long)]
        url: Option<String>,

        #[clap(long, requires = "url")]
        author: Option<String>,

        #[clap(long, requires = "url")]
        description: Option<String>,

        #[clap(long, requires = "url")]
        license: Option<String>,

        #[clap(long, requires = "url")]
        website: Option<String>,

        #[clap(flatten)]
        catalog: CatalogArgs,
    },

    /// Remove installed pods
    Remove {
        /// Pod names
        #[clap(required = true)]
        names: Vec<String>,
    },

    /// Update pods to the latest primary branch (all pods if none given)
    Update {
        /// Pod names
        names: Vec<String>,
    },

    /// List installed pods
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Search the pod lists of the catalog sources
    Search {
        /// Matched against name and description
        query: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,

        #[clap(flatten)]
        catalog: CatalogArgs,
    },

    /// Check that pods are laid out correctly
    Check {
        /// Pod names
        #[clap(required = true)]
        names: Vec<String>,
    },

    /// Regenerate pods.pri, pods-subdirs.pri and the subdirs project
    Generate,
}

impl PodsCommand {
    pub async fn execute(self, repository: &Path, config: &PodsConfig) -> Result<()> {
        let manager = PodManager::with_system_git(config.git.clone());

        match self {
            PodsCommand::Init { path } => {
                let target = path.as_deref().unwrap_or(repository);
                execute_init(&manager, target)
            }
            PodsCommand::Install {
                names,
                url,
                author,
                description,
                license,
                website,
                catalog,
            } => {
                let pods = match url {
                    Some(url) => {
                        let [name] = names.as_slice() else {
                            anyhow::bail!("--url installs exactly one pod");
                        };
                        vec![Pod {
                            name: name.clone(),
                            url,
                            author: author.unwrap_or_default(),
                            description: description.unwrap_or_default(),
                            license: license.unwrap_or_default(),
                            website: website.unwrap_or_default(),
                        }]
                    }
                    None => resolve_from_catalog(&manager, config, &catalog, &names).await?,
                };
                execute_install(&manager, repository, &pods)
            }
            PodsCommand::Remove { names } => execute_remove(&manager, repository, &names),
            PodsCommand::Update { names } => execute_update(&manager, repository, &names),
            PodsCommand::List { json } => execute_list(&manager, repository, json),
            PodsCommand::Search {
                query,
                json,
                catalog,
            } => execute_search(&manager, config, &catalog, query.as_deref(), json).await,
            PodsCommand::Check { names } => execute_check(repository, &names),
            PodsCommand::Generate => execute_generate(&manager, repository),
        }
    }
}

fn execute_init(manager: &PodManager, repository: &Path) -> Result<()> {
    manager
        .create_project(repository)
        .with_context(|| format!("Failed to create project in {}", repository.display()))?;

    println!("Created pods project in {}", repository.display());
    Ok(())
}

fn execute_install(manager: &PodManager, repository: &Path, pods: &[Pod]) -> Result<()> {
    for pod in pods.iter().filter(|pod| !pod.has_valid_name()) {
        warn!("Pod name '{}' is not lowercase and will fail 'qtpods check'", pod.name);
    }

    match pods {
        [pod] => manager.install_pod(repository, pod)?,
        _ => manager.install_pods(repository, pods)?,
    }

    for pod in pods {
        println!("Installed {} from {}", pod.name, pod.url);
    }
    Ok(())
}

fn execute_remove(manager: &PodManager, repository: &Path, names: &[String]) -> Result<()> {
    match names {
        [name] => manager.remove_pod(repository, name)?,
        _ => manager.remove_pods(repository, names)?,
    }

    for name in names {
        println!("Removed {name}");
    }
    Ok(())
}

fn execute_update(manager: &PodManager, repository: &Path, names: &[String]) -> Result<()> {
    match names {
        [] => {
            manager.update_all_pods(repository)?;
            println!("Updated all pods");
        }
        [name] => {
            manager.update_pod(repository, name)?;
            println!("Updated {name}");
        }
        _ => {
            manager.update_pods(repository, names)?;
            println!("Updated {}", names.join(", "));
        }
    }
    Ok(())
}

fn execute_generate(manager: &PodManager, repository: &Path) -> Result<()> {
    manager.generate_pods_pri(repository)?;
    manager.generate_pods_subdirs_pri(repository)?;
    manager.generate_subdirs_pro(repository)?;

    println!("Generated qmake files in {}", repository.display());
    Ok(())
}

fn execute_check(repository: &Path, names: &[String]) -> Result<()> {
    let mut invalid = 0;

    for name in names {
        let issues = validator::diagnose(repository, name);
        if issues.is_empty() {
            println!("{name}: ok");
            continue;
        }

        invalid += 1;
        println!("{name}:");
        for issue in issues {
            println!("  - {issue}");
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} pod(s) failed validation", invalid, names.len());
    }
    Ok(())
}

/// Table row for installed pods
#[derive(Tabled)]
struct InstalledRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "License")]
    license: String,
    #[tabled(rename = "Valid")]
    valid: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn execute_list(manager: &PodManager, repository: &Path, json_output: bool) -> Result<()> {
    if !manager.is_git_repository(repository) {
        anyhow::bail!("{} is not a git repository", repository.display());
    }

    let pods = manager.installed_pods(repository);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&pods)?);
        return Ok(());
    }

    if pods.is_empty() {
        println!("No pods installed.");
        println!("\nRun 'qtpods search' to find available pods.");
        return Ok(());
    }

    let table_rows: Vec<InstalledRow> = pods
        .iter()
        .map(|pod| InstalledRow {
            name: pod.name.clone(),
            author: pod.author.clone(),
            license: pod.license.clone(),
            valid: if manager.check_pod(repository, &pod.name) {
                "yes".to_string()
            } else {
                "no".to_string()
            },
            description: truncate(pod.short_description(), 50),
        })
        .collect();

    println!("{}", render_table(&table_rows));
    Ok(())
}

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "URL")]
    url: String,
}

async fn execute_search(
    manager: &PodManager,
    config: &PodsConfig,
    catalog: &CatalogArgs,
    query: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let mut results = fetch_available(manager, config, catalog).await?;

    if let Some(query) = query {
        results.retain(|pod| matches_query(pod, query));
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No pods found.");
        return Ok(());
    }

    println!("Found {} pod(s):\n", results.len());

    let table_rows: Vec<SearchResultRow> = results
        .iter()
        .map(|pod| SearchResultRow {
            name: pod.name.clone(),
            description: truncate(pod.short_description(), 50),
            url: pod.url.clone(),
        })
        .collect();

    println!("{}", render_table(&table_rows));
    Ok(())
}

/// Look every name up in the catalog; the first source listing a name wins
async fn resolve_from_catalog(
    manager: &PodManager,
    config: &PodsConfig,
    catalog: &CatalogArgs,
    names: &[String],
) -> Result<Vec<Pod>> {
    let available = fetch_available(manager, config, catalog).await?;

    names
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|pod| &pod.name == name)
                .cloned()
                .with_context(|| {
                    format!("Pod '{name}' is not listed by any source (use --url to install directly)")
                })
        })
        .collect()
}

async fn fetch_available(
    manager: &PodManager,
    config: &PodsConfig,
    catalog: &CatalogArgs,
) -> Result<Vec<Pod>> {
    let sources = if catalog.sources.is_empty() {
        &config.sources
    } else {
        &catalog.sources
    };

    if sources.is_empty() {
        warn!("No catalog sources configured; add one with 'qtpods source add <URL>'");
    }

    let source = catalog_source(config, catalog.offline || config.offline)?;
    Ok(manager.available_pods(source.as_ref(), sources).await)
}

#[cfg(feature = "catalog")]
fn catalog_source(config: &PodsConfig, offline: bool) -> Result<Box<dyn CatalogSource>> {
    let source = qtpods_core::catalog::HttpCatalogSource::new(config.fetch_timeout(), offline)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "catalog"))]
fn catalog_source(_config: &PodsConfig, _offline: bool) -> Result<Box<dyn CatalogSource>> {
    Ok(Box::new(qtpods_core::catalog::OfflineCatalogSource))
}

fn matches_query(pod: &Pod, query: &str) -> bool {
    let query = query.to_lowercase();
    pod.name.to_lowercase().contains(&query) || pod.description.to_lowercase().contains(&query)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}
