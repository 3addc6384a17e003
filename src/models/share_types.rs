use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The closed permission enumeration.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    #[serde(rename = "can_read")]
    Read,
    #[serde(rename = "can_write")]
    Write,
    #[serde(rename = "can_manage")]
    Manage,
}

impl Permission {
    pub const ALL: [Permission; 3] = [Permission::Read, Permission::Write, Permission::Manage];

    /// Stable internal key, used in persisted records and submitted forms.
    pub fn key(&self) -> &'static str {
        match self {
            Permission::Read => "can_read",
            Permission::Write => "can_write",
            Permission::Manage => "can_manage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Permission::Read => "Can read",
            Permission::Write => "Can write",
            Permission::Manage => "Can manage",
        }
    }
}

/// A principal or principal group eligible to hold permissions,
/// e.g. `user:alice` or `group:staff`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Owner {
    pub kind: String,
    pub name: String,
}

impl Owner {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// One ACL grant. An entry with an empty permission set is meaningless and
/// is never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub owner: Owner,
    pub permissions: BTreeSet<Permission>,
}

impl AclEntry {
    pub fn has(&self, perm: Permission) -> bool {
        self.permissions.contains(&perm)
    }
}

/// The access-control and metadata record governing one top-level folder.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Share {
    /// Top-level folder name. Immutable after creation.
    pub path: String,
    /// Display name shown in place of the folder name when set.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub acl: Vec<AclEntry>,
    /// False for the transient empty-ACL sentinel returned when no record
    /// exists for a folder. Never serialized.
    #[serde(skip, default)]
    pub persisted: bool,
}

impl Share {
    /// The sentinel share for a folder with no stored record: empty ACL,
    /// so nobody holds an explicit permission.
    pub fn transient(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: String::new(),
            acl: Vec::new(),
            persisted: false,
        }
    }
}

/// The resolved identity of a requester: the identities it matches, i.e.
/// the user itself plus every group it belongs to.
#[derive(Debug, Clone, Default)]
pub struct OwnerContext {
    pub owners: Vec<Owner>,
}

impl OwnerContext {
    pub fn new(owners: Vec<Owner>) -> Self {
        Self { owners }
    }

    pub fn matches(&self, owner: &Owner) -> bool {
        self.owners.contains(owner)
    }
}

/// One submitted row of the manage form: an owner in `kind:name` string
/// form (possibly empty) plus one flag per permission.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccessRow {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_write: bool,
    #[serde(default)]
    pub can_manage: bool,
}

impl AccessRow {
    pub fn granted(&self, perm: Permission) -> bool {
        match perm {
            Permission::Read => self.can_read,
            Permission::Write => self.can_write,
            Permission::Manage => self.can_manage,
        }
    }
}
