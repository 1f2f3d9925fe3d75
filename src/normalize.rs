//! Role normalization: backend role records to UI roles

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::constants::is_builtin_role;
use crate::legacy::map_legacy_permission;
use crate::merge::derive_ui;
use crate::permission_set::{resolve_scope, PermissionSetCatalog};
use crate::role::{RawPermission, Role, RoleRecord, ScopedPermissionSet};
use crate::ui::UiPermissions;

/// Accumulated UI permissions of a role's backend permissions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPermissions {
    /// Set when any raw (legacy) permission had to be classified
    pub is_custom: bool,
    pub ui_permissions: UiPermissions,
}

impl ParsedPermissions {
    fn absorb(self, ui: &UiPermissions) -> Self {
        ParsedPermissions { is_custom: self.is_custom, ui_permissions: self.ui_permissions.merge(ui) }
    }

    fn absorb_legacy(self, permission: &RawPermission) -> Self {
        let ui = derive_ui(&map_legacy_permission(permission));
        ParsedPermissions { is_custom: true, ..self.absorb(&ui) }
    }

    fn absorb_permission_set(self, entry: &ScopedPermissionSet, catalog: &PermissionSetCatalog) -> Self {
        let Some(set) = catalog.get(&entry.name) else {
            debug!(set = %entry.name, "permission set not in catalog, skipping");
            return self;
        };

        match &entry.scope {
            Some(scope) => match resolve_scope(&set.name, scope) {
                Some((area, resolved)) => {
                    trace!(set = %set.name, %area, resources = scope.value.len(), "scoped permission set");
                    self.absorb(&UiPermissions::with_scoped(area, resolved))
                }
                None => {
                    debug!(set = %set.name, scope_type = %scope.scope_type, "unknown scope type, skipping");
                    self
                }
            },
            None if !set.result.is_empty() => self.absorb(&set.result),
            None if set.is_custom() => {
                trace!(set = %set.name, raw = set.permissions.len(), "custom permission set");
                let marked = ParsedPermissions { is_custom: true, ..self };
                set.permissions.iter().fold(marked, Self::absorb_legacy)
            }
            None => self,
        }
    }
}

/// Fold a role's permission sets and raw permissions into one structure.
///
/// Entries that cannot be classified contribute nothing.
pub fn parse_role_permissions(role: &RoleRecord, catalog: &PermissionSetCatalog) -> ParsedPermissions {
    let from_sets = role
        .permission_sets_with_scope
        .iter()
        .fold(ParsedPermissions::default(), |acc, entry| acc.absorb_permission_set(entry, catalog));
    role.permissions.iter().fold(from_sets, ParsedPermissions::absorb_legacy)
}

/// Normalize a single backend role.
///
/// A role already known locally keeps its UI permissions, editability and
/// description; the backend record is not re-parsed.
pub fn normalize_role(role: &RoleRecord, known: Option<&Role>, catalog: &PermissionSetCatalog) -> Role {
    let (ui_permissions, is_custom, prior_editable, prior_description) = match known {
        Some(prior) => {
            trace!(role = %role.name, "reusing known role");
            (prior.ui_permissions.clone(), prior.is_custom, prior.editable, prior.description.as_str())
        }
        None => {
            let parsed = parse_role_permissions(role, catalog);
            (parsed.ui_permissions, parsed.is_custom, true, "")
        }
    };

    let description = if prior_description.is_empty() { role.description.as_str() } else { prior_description };
    Role {
        name: role.name.clone(),
        description: description.to_string(),
        editable: !is_builtin_role(&role.name) && !is_custom && prior_editable,
        is_custom,
        permissions: role.permissions.clone(),
        ui_permissions,
    }
}

/// Normalize backend roles against the previously known roles, keyed by name
pub fn normalize_roles(
    roles: &[RoleRecord],
    known: &BTreeMap<String, Role>,
    catalog: &PermissionSetCatalog,
) -> BTreeMap<String, Role> {
    roles
        .iter()
        .map(|role| (role.name.clone(), normalize_role(role, known.get(&role.name), catalog)))
        .collect()
}
