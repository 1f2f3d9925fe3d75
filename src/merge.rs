//! Implication and merge of permission structures
//!
//! Merging is a join: flat lists are unioned, scoped maps are unioned per
//! resource key. The empty structure is the identity, so anything that fails
//! to classify upstream can contribute it without special casing.

use crate::catalog::{implied_permissions, Area, Permission};
use crate::ui::{AreaPermissions, PermissionList, ScopedPermissions, UiPermissions};

/// Implied permissions of `area` for a grant set (shared implication rule)
#[inline]
pub fn derive<I>(area: Area, granted: I, exclude: &[Permission]) -> PermissionList
where
    I: IntoIterator<Item = Permission>,
{
    implied_permissions(area, granted, exclude)
}

/// Implied permissions of each resource of a scoped area, derived per
/// resource with that resource's exclusions applied
pub fn derive_scoped(area: Area, permissions: &ScopedPermissions) -> ScopedPermissions {
    permissions
        .iter()
        .map(|(resource, granted)| {
            let implied = derive(area, granted.iter().copied(), area.excluded_for(resource));
            (resource.clone(), implied)
        })
        .collect()
}

/// Close every area of `ui` under implication
pub fn derive_ui(ui: &UiPermissions) -> UiPermissions {
    Area::ALL.into_iter().fold(UiPermissions::default(), |acc, area| {
        let implied = match ui.area(area) {
            AreaPermissions::Flat(list) => UiPermissions::with_flat(area, derive(area, list.iter().copied(), &[])),
            AreaPermissions::Scoped(map) => UiPermissions::with_scoped(area, derive_scoped(area, map)),
        };
        acc.merge(&implied)
    })
}

pub fn merge_lists(a: &PermissionList, b: &PermissionList) -> PermissionList {
    a.union(b).copied().collect()
}

pub fn merge_scoped(a: &ScopedPermissions, b: &ScopedPermissions) -> ScopedPermissions {
    let mut merged = a.clone();
    for (resource, permissions) in b {
        merged
            .entry(resource.clone())
            .and_modify(|existing| existing.extend(permissions.iter().copied()))
            .or_insert_with(|| permissions.clone());
    }
    merged
}

/// Merge two structures, treating an absent side as empty
pub fn merge(a: Option<&UiPermissions>, b: Option<&UiPermissions>) -> UiPermissions {
    match (a, b) {
        (Some(a), Some(b)) => a.merge(b),
        (Some(x), None) | (None, Some(x)) => x.clone(),
        (None, None) => UiPermissions::default(),
    }
}

impl UiPermissions {
    /// Join of `self` and `other`
    pub fn merge(&self, other: &UiPermissions) -> UiPermissions {
        UiPermissions {
            auditlog: merge_lists(&self.auditlog, &other.auditlog),
            deployments: merge_lists(&self.deployments, &other.deployments),
            groups: merge_scoped(&self.groups, &other.groups),
            releases: merge_scoped(&self.releases, &other.releases),
            tenant_management: merge_lists(&self.tenant_management, &other.tenant_management),
            user_management: merge_lists(&self.user_management, &other.user_management),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ALL_RELEASES;
    use Permission::*;

    fn scoped(entries: &[(&str, &[Permission])]) -> ScopedPermissions {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_merge_scoped_keys() {
        let a = scoped(&[("g1", &[Read]), ("g2", &[Read])]);
        let b = scoped(&[("g2", &[Manage]), ("g3", &[Connect])]);
        assert_eq!(
            merge_scoped(&a, &b),
            scoped(&[("g1", &[Read]), ("g2", &[Read, Manage]), ("g3", &[Connect])])
        );
    }

    #[test]
    fn test_merge_absent_side() {
        let mut x = UiPermissions::new();
        x.auditlog.insert(Read);
        assert_eq!(merge(Some(&x), None), x);
        assert_eq!(merge(None, Some(&x)), x);
        assert!(merge(None, None).is_empty());
    }

    #[test]
    fn test_derive_scoped_applies_release_exclusion() {
        let grants = scoped(&[("v1", &[Manage]), (ALL_RELEASES, &[Manage])]);
        let derived = derive_scoped(Area::Releases, &grants);
        assert_eq!(derived["v1"], PermissionList::from([Read, Manage]));
        assert_eq!(derived[ALL_RELEASES], PermissionList::from([Read, Manage, Upload]));
    }

    #[test]
    fn test_derive_scoped_does_not_leak_between_resources() {
        let grants = scoped(&[("g1", &[Manage]), ("g2", &[Connect])]);
        let derived = derive_scoped(Area::Groups, &grants);
        assert!(!derived["g2"].contains(&Manage));
        assert!(!derived["g1"].contains(&Connect));
    }

    #[test]
    fn test_derive_ui_closes_every_area() {
        let mut ui = UiPermissions::new();
        ui.user_management.insert(Manage);
        ui.groups = scoped(&[("g1", &[Deploy])]);
        ui.releases = scoped(&[("v1", &[Manage])]);

        let derived = derive_ui(&ui);
        assert_eq!(derived.user_management, PermissionList::from([Read, Manage]));
        assert_eq!(derived.groups["g1"], PermissionList::from([Read, Deploy]));
        assert_eq!(derived.releases["v1"], PermissionList::from([Read, Manage]));
        assert!(derived.auditlog.is_empty());
        assert_eq!(derive_ui(&derived), derived);
    }
}
