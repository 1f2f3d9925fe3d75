//! The UI permission structure exchanged with permission editors

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{Area, Permission};

/// Permissions of a flat area, or of one resource in a scoped area
pub type PermissionList = BTreeSet<Permission>;

/// Resource identifier (or "all resources" key) to permissions
pub type ScopedPermissions = BTreeMap<String, PermissionList>;

/// Per-area permission matrix of a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPermissions {
    pub auditlog: PermissionList,
    pub deployments: PermissionList,
    pub groups: ScopedPermissions,
    pub releases: ScopedPermissions,
    pub tenant_management: PermissionList,
    pub user_management: PermissionList,
}

/// Borrowed view of one area of a [`UiPermissions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaPermissions<'a> {
    Flat(&'a PermissionList),
    Scoped(&'a ScopedPermissions),
}

impl AreaPermissions<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            AreaPermissions::Flat(list) => list.is_empty(),
            AreaPermissions::Scoped(map) => map.is_empty(),
        }
    }
}

impl UiPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every permission of every area, scoped areas keyed by their sentinel
    pub fn full() -> Self {
        let mut ui = Self::new();
        for area in Area::ALL {
            let all: PermissionList = area.permissions().iter().copied().collect();
            match area.scope() {
                Some(scope) => {
                    if let Some(map) = ui.scoped_mut(area) {
                        map.insert(scope.all_resources.to_string(), all);
                    }
                }
                None => {
                    if let Some(list) = ui.flat_mut(area) {
                        *list = all;
                    }
                }
            }
        }
        ui
    }

    pub fn area(&self, area: Area) -> AreaPermissions<'_> {
        match area {
            Area::AuditLog => AreaPermissions::Flat(&self.auditlog),
            Area::Deployments => AreaPermissions::Flat(&self.deployments),
            Area::Groups => AreaPermissions::Scoped(&self.groups),
            Area::Releases => AreaPermissions::Scoped(&self.releases),
            Area::TenantManagement => AreaPermissions::Flat(&self.tenant_management),
            Area::UserManagement => AreaPermissions::Flat(&self.user_management),
        }
    }

    /// Mutable list of a flat area, `None` for scoped areas
    pub(crate) fn flat_mut(&mut self, area: Area) -> Option<&mut PermissionList> {
        match area {
            Area::AuditLog => Some(&mut self.auditlog),
            Area::Deployments => Some(&mut self.deployments),
            Area::TenantManagement => Some(&mut self.tenant_management),
            Area::UserManagement => Some(&mut self.user_management),
            Area::Groups | Area::Releases => None,
        }
    }

    /// Mutable map of a scoped area, `None` for flat areas
    pub(crate) fn scoped_mut(&mut self, area: Area) -> Option<&mut ScopedPermissions> {
        match area {
            Area::Groups => Some(&mut self.groups),
            Area::Releases => Some(&mut self.releases),
            _ => None,
        }
    }

    /// Single-area structure holding `permissions` for a flat area
    pub fn with_flat(area: Area, permissions: PermissionList) -> Self {
        let mut ui = Self::new();
        if let Some(list) = ui.flat_mut(area) {
            *list = permissions;
        }
        ui
    }

    /// Single-area structure holding `permissions` for a scoped area
    pub fn with_scoped(area: Area, permissions: ScopedPermissions) -> Self {
        let mut ui = Self::new();
        if let Some(map) = ui.scoped_mut(area) {
            *map = permissions;
        }
        ui
    }

    pub fn is_empty(&self) -> bool {
        Area::ALL.into_iter().all(|area| self.area(area).is_empty())
    }

    /// Check whether `permission` is granted in a flat area, or on `resource`
    /// (or the area's "all resources" key) in a scoped one.
    pub fn allows(&self, area: Area, resource: Option<&str>, permission: Permission) -> bool {
        match self.area(area) {
            AreaPermissions::Flat(list) => list.contains(&permission),
            AreaPermissions::Scoped(map) => {
                let all = area.scope().map(|s| s.all_resources);
                [resource, all]
                    .into_iter()
                    .flatten()
                    .any(|key| map.get(key).is_some_and(|list| list.contains(&permission)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ALL_DEVICES, ALL_RELEASES};
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let mut ui = UiPermissions::new();
        ui.user_management.insert(Permission::Read);
        ui.groups.insert("g1".into(), PermissionList::from([Permission::Read, Permission::Manage]));

        let value = serde_json::to_value(&ui).unwrap();
        assert_eq!(
            value,
            json!({
                "auditlog": [],
                "deployments": [],
                "groups": { "g1": ["read", "manage"] },
                "releases": {},
                "tenantManagement": [],
                "userManagement": ["read"],
            })
        );
        let back: UiPermissions = serde_json::from_value(value).unwrap();
        assert_eq!(back, ui);
    }

    #[test]
    fn test_missing_areas_default_to_empty() {
        let ui: UiPermissions = serde_json::from_value(json!({ "auditlog": ["read"] })).unwrap();
        assert!(ui.auditlog.contains(&Permission::Read));
        assert!(ui.groups.is_empty());
    }

    #[test]
    fn test_full() {
        let ui = UiPermissions::full();
        assert_eq!(ui.groups[ALL_DEVICES].len(), 5);
        assert_eq!(ui.releases[ALL_RELEASES].len(), 3);
        assert!(ui.allows(Area::Groups, Some("anything"), Permission::Connect));
        assert!(!ui.allows(Area::AuditLog, None, Permission::Manage));
    }

    #[test]
    fn test_allows_scoped_resource() {
        let mut groups = ScopedPermissions::new();
        groups.insert("g1".to_string(), PermissionList::from([Permission::Read]));
        let ui = UiPermissions::with_scoped(Area::Groups, groups);
        assert!(ui.allows(Area::Groups, Some("g1"), Permission::Read));
        assert!(!ui.allows(Area::Groups, Some("g2"), Permission::Read));
        assert!(!ui.allows(Area::Groups, None, Permission::Read));
    }

    #[test]
    fn test_single_area_constructors_ignore_wrong_kind() {
        assert!(UiPermissions::with_flat(Area::Groups, PermissionList::from([Permission::Read])).is_empty());
        assert!(UiPermissions::with_scoped(Area::AuditLog, ScopedPermissions::new()).is_empty());

        let mut groups = ScopedPermissions::new();
        groups.insert("g1".to_string(), PermissionList::from([Permission::Read]));
        assert!(UiPermissions::with_scoped(Area::UserManagement, groups).is_empty());
    }

    #[test]
    fn test_accessors_match_area_kind() {
        let mut ui = UiPermissions::new();
        for area in Area::ALL {
            assert_eq!(ui.flat_mut(area).is_some(), !area.is_scoped(), "{area}");
            assert_eq!(ui.scoped_mut(area).is_some(), area.is_scoped(), "{area}");
        }
    }
}
