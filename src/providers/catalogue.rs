use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("failed to parse provider catalogue: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
    #[error("domain '{domain}' appears in more than one provider category")]
    DuplicateDomain { domain: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    Enterprise,
    Hosting,
    Webmail,
    Security,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub name: String,
    pub category: ProviderCategory,
}

/// Known email providers keyed by registrable domain. Loaded once at
/// startup and shared read-only across validations.
#[derive(Debug, Clone, Default)]
pub struct ProviderCatalogue {
    by_domain: HashMap<String, ProviderEntry>,
}

#[derive(Deserialize)]
struct CatalogueFile {
    enterprise: CategoryTable,
    hosting: CategoryTable,
    webmail: CategoryTable,
    security: CategoryTable,
}

#[derive(Deserialize)]
struct CategoryTable {
    domains: Vec<(String, String)>,
}

impl ProviderCatalogue {
    /// Parse the four-category TOML table, rejecting domains that appear
    /// in more than one category.
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = toml::from_str(text)?;
        let mut by_domain = HashMap::new();

        let tables = [
            (ProviderCategory::Enterprise, file.enterprise),
            (ProviderCategory::Hosting, file.hosting),
            (ProviderCategory::Webmail, file.webmail),
            (ProviderCategory::Security, file.security),
        ];
        for (category, table) in tables {
            for (domain, name) in table.domains {
                let domain = domain.to_ascii_lowercase();
                let entry = ProviderEntry {
                    name,
                    category,
                };
                if by_domain.insert(domain.clone(), entry).is_some() {
                    return Err(CatalogueError::DuplicateDomain { domain });
                }
            }
        }

        Ok(Self { by_domain })
    }

    /// The catalogue shipped with the crate.
    pub fn bundled() -> Result<Self, CatalogueError> {
        Self::from_toml_str(include_str!("../../data/known_email_providers.toml"))
    }

    pub fn lookup(&self, domain: &str) -> Option<&ProviderEntry> {
        self.by_domain.get(domain)
    }

    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }
}
