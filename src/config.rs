//! Contact directory configuration.
//!
//! One injected mapping of contractor name to contact info, loaded from a
//! JSON file and passed to the commands that need it. This replaces the
//! per-module phone-number literals the dashboard grew over time, which had
//! drifted out of agreement with each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Contact details for one contractor or stakeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
}

/// Name-to-contact directory. Lookup is case-insensitive and tolerant of
/// composite owner strings ("Imran + Sandeep").
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    entries: BTreeMap<String, (String, Contact)>,
}

impl ContactDirectory {
    /// Load from a JSON file of shape `{ "<name>": { "phone", "role" } }`.
    ///
    /// A missing or unparseable file yields an empty directory; `explicit`
    /// controls whether that is worth a warning (it is when the user named
    /// the path themselves).
    pub fn load(path: &Path, explicit: bool) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                if explicit {
                    warn!(path = %path.display(), error = %e, "contacts file unreadable, directory is empty");
                }
                return ContactDirectory::default();
            }
        };
        match serde_json::from_str::<BTreeMap<String, Contact>>(&text) {
            Ok(map) => ContactDirectory::from_map(map),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "contacts file unparseable, directory is empty");
                ContactDirectory::default()
            }
        }
    }

    pub fn from_map(map: BTreeMap<String, Contact>) -> Self {
        let entries = map
            .into_iter()
            .map(|(name, contact)| (name.trim().to_lowercase(), (name, contact)))
            .collect();
        ContactDirectory { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a single name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Contact> {
        self.entries
            .get(&name.trim().to_lowercase())
            .map(|(_, c)| c)
    }

    /// Resolve every person named in a composite owner string.
    pub fn resolve_owner(&self, owner: &str) -> Vec<(String, Contact)> {
        owner
            .split(['+', '&', ','])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| {
                self.entries
                    .get(&part.to_lowercase())
                    .map(|(name, c)| (name.clone(), c.clone()))
            })
            .collect()
    }

    /// Iterate entries in display-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Contact)> {
        self.entries.values().map(|(name, c)| (name, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ContactDirectory {
        let mut map = BTreeMap::new();
        map.insert(
            "Vishal".to_string(),
            Contact {
                phone: "+91 98200 11111".into(),
                role: "Plumbing contractor".into(),
            },
        );
        map.insert(
            "Sandeep".to_string(),
            Contact {
                phone: "+91 98200 22222".into(),
                role: "Kitchen vendor".into(),
            },
        );
        ContactDirectory::from_map(map)
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let dir = directory();
        assert!(dir.get("vishal").is_some());
        assert!(dir.get("  VISHAL ").is_some());
        assert!(dir.get("nobody").is_none());
    }

    #[test]
    fn composite_owner_resolves_each_known_name() {
        let dir = directory();
        let found = dir.resolve_owner("Imran + Sandeep, vishal");
        let names: Vec<&str> = found.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Sandeep", "Vishal"]);
    }

    #[test]
    fn missing_file_yields_empty_directory() {
        let dir = ContactDirectory::load(Path::new("/nonexistent/contacts.json"), false);
        assert!(dir.is_empty());
    }
}
