use contact_index::{AdapterConfig, SectionAlphabet, SectionConfig, DEFAULT_FALLBACK_LABEL};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    pub database: Option<String>,
    pub alphabet_headers: bool,
    pub full_alphabet: bool,
    pub fallback_label: String,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            database: None,
            alphabet_headers: true,
            full_alphabet: false,
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
        }
    }
}

impl ContactsConfig {
    pub fn adapter_config(&self) -> AdapterConfig {
        let fallback_label = if self.fallback_label.trim().is_empty() {
            DEFAULT_FALLBACK_LABEL.to_string()
        } else {
            self.fallback_label.clone()
        };
        AdapterConfig {
            alphabet_headers: self.alphabet_headers,
            sections: SectionConfig {
                fallback_label,
                alphabet: if self.full_alphabet {
                    SectionAlphabet::Full
                } else {
                    SectionAlphabet::Observed
                },
            },
        }
    }

    pub fn database_path(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        if let Some(path) = self.database.as_deref().filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(path);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contacts/contacts.db")
    }
}

pub fn load_config(path: &Path) -> io::Result<ContactsConfig> {
    if !path.exists() {
        return Ok(ContactsConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config: ContactsConfig = toml::from_str(&contents).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "ignoring unreadable config");
        ContactsConfig::default()
    });
    Ok(config)
}

pub fn config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var("CONTACTS_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contacts/config.toml")
}
