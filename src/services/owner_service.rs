//! Owner-kind registry.
//!
//! Owner kinds (users, groups, ...) are a closed enumeration built at
//! startup: one provider per kind, resolved through `OwnerRegistry`.

use crate::error::AppError;
use crate::models::share_types::Owner;
use serde::Serialize;

/// One kind of principal eligible to hold permissions.
pub trait OwnerProvider: Send + Sync {
    /// The kind tag used in the `kind:name` string form, e.g. `user`.
    fn kind(&self) -> &str;

    /// Display name for the kind, used to head its group in the manage UI.
    fn label(&self) -> &str;

    /// Natural keys of every known instance, in display order.
    fn list(&self) -> Vec<String>;
}

/// A provider over a fixed set of names, for deployments that configure
/// their principals statically and for tests.
pub struct StaticOwnerProvider {
    kind: String,
    label: String,
    names: Vec<String>,
}

impl StaticOwnerProvider {
    pub fn new(kind: &str, label: &str, mut names: Vec<String>) -> Self {
        names.sort();
        Self {
            kind: kind.to_string(),
            label: label.to_string(),
            names,
        }
    }
}

impl OwnerProvider for StaticOwnerProvider {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn list(&self) -> Vec<String> {
        self.names.clone()
    }
}

/// Owners of one kind, grouped for the manage UI.
#[derive(Debug, Serialize, Clone)]
pub struct OwnerGroup {
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Default)]
pub struct OwnerRegistry {
    providers: Vec<Box<dyn OwnerProvider>>,
}

impl OwnerRegistry {
    pub fn new(providers: Vec<Box<dyn OwnerProvider>>) -> Self {
        Self { providers }
    }

    /// Every known owner of the given kind, in the provider's order.
    pub fn list_owners(&self, kind: &str) -> Vec<Owner> {
        self.providers
            .iter()
            .filter(|p| p.kind() == kind)
            .flat_map(|p| {
                let kind = p.kind().to_string();
                p.list()
                    .into_iter()
                    .map(move |name| Owner { kind: kind.clone(), name })
            })
            .collect()
    }

    /// All owners grouped by kind, for populating the manage UI. Kinds
    /// with no instances are omitted.
    pub fn grouped(&self) -> Vec<OwnerGroup> {
        self.providers
            .iter()
            .filter_map(|p| {
                let options: Vec<String> = p
                    .list()
                    .into_iter()
                    .map(|name| format!("{}:{}", p.kind(), name))
                    .collect();
                if options.is_empty() {
                    None
                } else {
                    Some(OwnerGroup {
                        name: p.label().to_string(),
                        options,
                    })
                }
            })
            .collect()
    }

    /// Parses a `kind:name` string back into an `Owner`. The kind must be
    /// registered and the name non-empty.
    pub fn parse(&self, raw: &str) -> Result<Owner, AppError> {
        let (kind, name) = raw
            .split_once(':')
            .ok_or_else(|| AppError::Validation(format!("malformed owner {:?}", raw)))?;
        if name.is_empty() || !self.providers.iter().any(|p| p.kind() == kind) {
            return Err(AppError::Validation(format!("unknown owner {:?}", raw)));
        }
        Ok(Owner::new(kind, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> OwnerRegistry {
        OwnerRegistry::new(vec![
            Box::new(StaticOwnerProvider::new(
                "user",
                "User",
                vec!["bob".into(), "alice".into()],
            )),
            Box::new(StaticOwnerProvider::new("group", "Group", vec![])),
        ])
    }

    #[test]
    fn lists_owners_sorted() {
        let owners = registry().list_owners("user");
        let names: Vec<&str> = owners.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["alice", "bob"]);
    }

    #[test]
    fn grouped_omits_empty_kinds() {
        let groups = registry().grouped();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "User");
        assert_eq!(groups[0].options, ["user:alice", "user:bob"]);
    }

    #[test]
    fn parses_known_kinds_only() {
        let reg = registry();
        assert_eq!(reg.parse("user:alice").unwrap(), Owner::new("user", "alice"));
        assert!(matches!(reg.parse("robot:r2"), Err(AppError::Validation(_))));
        assert!(matches!(reg.parse("alice"), Err(AppError::Validation(_))));
        assert!(matches!(reg.parse("user:"), Err(AppError::Validation(_))));
    }
}
