//! Role and permission records exchanged with the backend and the UI

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ui::UiPermissions;

/// Object of a raw permission: HTTP verb and endpoint for HTTP actions,
/// resource type and name for custom ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Raw (legacy) permission as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPermission {
    pub action: String,
    pub object: PermissionObject,
}

impl RawPermission {
    pub fn new(action: &str, kind: &str, value: &str) -> Self {
        RawPermission {
            action: action.to_string(),
            object: PermissionObject { kind: kind.to_string(), value: value.to_string() },
        }
    }
}

/// Resource scope of a permission set assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(rename = "type")]
    pub scope_type: String,
    #[serde(default)]
    pub value: Vec<String>,
}

/// Permission set assigned to a role, optionally scoped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedPermissionSet {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

impl ScopedPermissionSet {
    pub fn unscoped(name: &str) -> Self {
        ScopedPermissionSet { name: name.to_string(), scope: None }
    }

    pub fn scoped(name: &str, scope_type: &str, value: Vec<String>) -> Self {
        ScopedPermissionSet {
            name: name.to_string(),
            scope: Some(Scope { scope_type: scope_type.to_string(), value }),
        }
    }
}

/// Role as returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<RawPermission>,
    #[serde(default)]
    pub permission_sets_with_scope: Vec<ScopedPermissionSet>,
}

impl RoleRecord {
    /// Parse the backend role list
    pub fn list_from_json(json: &str) -> Result<Vec<RoleRecord>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Role as sent to the backend on create/update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleWrite {
    pub name: String,
    pub description: String,
    pub permission_sets_with_scope: Vec<ScopedPermissionSet>,
}

impl From<RoleWrite> for RoleRecord {
    fn from(write: RoleWrite) -> Self {
        RoleRecord {
            name: write.name,
            description: write.description,
            permissions: Vec::new(),
            permission_sets_with_scope: write.permission_sets_with_scope,
        }
    }
}

/// Normalized role consumed by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub editable: bool,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub permissions: Vec<RawPermission>,
    #[serde(default)]
    pub ui_permissions: UiPermissions,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Role {
            name: name.to_string(),
            description: String::new(),
            editable: true,
            is_custom: false,
            permissions: Vec::new(),
            ui_permissions: UiPermissions::default(),
        }
    }
}
