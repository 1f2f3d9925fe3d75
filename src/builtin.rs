//! Built-in roles
//!
//! The backend ships these roles on every tenant. Their permissions are known
//! up front, so they seed the known-roles map handed to the normalizer.

use std::collections::BTreeMap;

use crate::catalog::{Area, Permission};
use crate::constants::*;
use crate::role::Role;
use crate::ui::{PermissionList, ScopedPermissions, UiPermissions};

fn everywhere(area: Area, permissions: &[Permission]) -> ScopedPermissions {
    let mut scoped = ScopedPermissions::new();
    if let Some(scope) = area.scope() {
        scoped.insert(scope.all_resources.to_string(), permissions.iter().copied().collect());
    }
    scoped
}

fn builtin(name: &str, description: &str, ui_permissions: UiPermissions) -> Role {
    Role {
        name: name.to_string(),
        description: description.to_string(),
        editable: false,
        is_custom: false,
        permissions: Vec::new(),
        ui_permissions,
    }
}

/// The built-in role table keyed by role name
pub fn builtin_roles() -> BTreeMap<String, Role> {
    use Permission::*;

    let observer = UiPermissions {
        deployments: PermissionList::from([Read]),
        groups: everywhere(Area::Groups, &[Read]),
        releases: everywhere(Area::Releases, &[Read]),
        ..Default::default()
    };
    let ci = UiPermissions {
        releases: everywhere(Area::Releases, &[Read, Manage, Upload]),
        ..Default::default()
    };
    let deployments_manager = UiPermissions {
        deployments: PermissionList::from([Read, Manage, Deploy]),
        groups: everywhere(Area::Groups, &[Read, Deploy]),
        releases: everywhere(Area::Releases, &[Read]),
        ..Default::default()
    };
    let remote_terminal = UiPermissions {
        groups: everywhere(Area::Groups, &[Read, Connect]),
        ..Default::default()
    };

    [
        builtin(ROLE_PERMIT_ALL, "Full access", UiPermissions::full()),
        builtin(
            ROLE_OBSERVER,
            "Can see all devices, releases and deployment reports but not make any changes.",
            observer,
        ),
        builtin(
            ROLE_CI,
            "Intended for automation accounts building software: can manage and upload artifacts only.",
            ci,
        ),
        builtin(
            ROLE_DEPLOYMENTS_MANAGER,
            "Can create and abort deployments to any device.",
            deployments_manager,
        ),
        builtin(
            ROLE_REMOTE_TERMINAL,
            "Access to the troubleshooting features: remote terminal, file transfer, port forwarding.",
            remote_terminal,
        ),
    ]
    .into_iter()
    .map(|role| (role.name.clone(), role))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_builtin_names() {
        let roles = builtin_roles();
        assert_eq!(roles.len(), BUILTIN_ROLES.len());
        for name in BUILTIN_ROLES {
            let role = &roles[*name];
            assert!(!role.editable);
            assert!(is_builtin_role(&role.name));
        }
    }

    #[test]
    fn test_remote_terminal_connects_everywhere() {
        let roles = builtin_roles();
        let ui = &roles[ROLE_REMOTE_TERMINAL].ui_permissions;
        assert!(ui.allows(Area::Groups, Some("lab"), Permission::Connect));
        assert!(!ui.allows(Area::Groups, Some("lab"), Permission::Manage));
    }
}
