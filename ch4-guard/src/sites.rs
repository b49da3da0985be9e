//! Registry of monitored sites.

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::model::Site;

/// Ordered list of sites, unique by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteRegistry {
    sites: Vec<Site>,
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self {
            sites: vec![
                Site {
                    name: "Hassi R'mel".to_string(),
                    latitude: 32.93,
                    longitude: 3.30,
                },
                Site {
                    name: "Other site".to_string(),
                    latitude: 32.50,
                    longitude: 3.20,
                },
            ],
        }
    }
}

impl SiteRegistry {
    /// Creates a registry, rejecting invalid coordinates and duplicate names.
    pub fn new(sites: Vec<Site>) -> Result<Self> {
        let registry = Self { sites };
        registry.validate()?;
        Ok(registry)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, site) in self.sites.iter().enumerate() {
            site.validate()?;
            if self.sites[..i].iter().any(|s| s.name == site.name) {
                return Err(GuardError::invalid_config(format!(
                    "duplicate site name '{}'",
                    site.name
                )));
            }
        }
        Ok(())
    }

    /// Looks a site up by exact name.
    pub fn get(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name == name)
    }

    /// Looks a site up by name, failing with a helpful message.
    pub fn require(&self, name: &str) -> Result<&Site> {
        self.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.names().collect();
            GuardError::invalid_config(format!(
                "unknown site '{name}' (known sites: {})",
                known.join(", ")
            ))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sites.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
