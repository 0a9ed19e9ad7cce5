//! Catalog source configuration commands

use anyhow::Result;
use clap::Subcommand;

use qtpods_core::config::ConfigStore;

#[derive(Subcommand, Debug)]
pub enum SourceCommand {
    /// Add a pod list URL
    Add {
        /// URL of a pod list document (http or https)
        url: String,
    },

    /// List configured pod list URLs
    List,

    /// Remove a pod list URL
    Remove {
        /// URL as shown by 'qtpods source list'
        url: String,
    },
}

impl SourceCommand {
    pub fn execute(self, mut store: ConfigStore) -> Result<()> {
        match self {
            SourceCommand::Add { url } => {
                store.config_mut().add_source(&url)?;
                store.save()?;
                println!("Added source {url}");
            }
            SourceCommand::List => {
                let sources = &store.config().sources;
                if sources.is_empty() {
                    println!("No sources configured.");
                    println!("\nRun 'qtpods source add <URL>' to add one.");
                } else {
                    println!("Configured sources ({}):\n", store.path().display());
                    for url in sources {
                        println!("  {url}");
                    }
                }
            }
            SourceCommand::Remove { url } => {
                store.config_mut().remove_source(&url)?;
                store.save()?;
                println!("Removed source {url}");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_then_remove_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let url = "https://example.com/pods.json".to_string();

        let store = ConfigStore::load_from_path(path.clone()).unwrap();
        SourceCommand::Add { url: url.clone() }.execute(store).unwrap();
        let store = ConfigStore::load_from_path(path.clone()).unwrap();
        assert_eq!(store.config().sources, [url.clone()]);

        SourceCommand::Remove { url }.execute(store).unwrap();
        let store = ConfigStore::load_from_path(path).unwrap();
        assert!(store.config().sources.is_empty());
    }

    #[test]
    fn test_duplicate_source_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        let url = "https://example.com/pods.json".to_string();

        let store = ConfigStore::load_from_path(path.clone()).unwrap();
        SourceCommand::Add { url: url.clone() }.execute(store).unwrap();
        let store = ConfigStore::load_from_path(path).unwrap();
        assert!(SourceCommand::Add { url }.execute(store).is_err());
    }
}
