//! Role serialization: UI permissions to backend permission sets

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::catalog::{Area, Permission, ScopeDef};
use crate::constants::BASIC;
use crate::merge::{derive, derive_scoped};
use crate::permission_set::resolve_scope;
use crate::role::{Role, RoleWrite, ScopedPermissionSet};
use crate::ui::{AreaPermissions, PermissionList, ScopedPermissions, UiPermissions};

/// UI permissions covering any subset of areas; omitted areas are kept from
/// the previous state of the role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPermissionsPatch {
    pub auditlog: Option<PermissionList>,
    pub deployments: Option<PermissionList>,
    pub groups: Option<ScopedPermissions>,
    pub releases: Option<ScopedPermissions>,
    pub tenant_management: Option<PermissionList>,
    pub user_management: Option<PermissionList>,
}

impl UiPermissionsPatch {
    /// Fill omitted areas from `previous`, then from the empty structure
    pub fn resolve(&self, previous: Option<&UiPermissions>) -> UiPermissions {
        let base = previous.cloned().unwrap_or_default();
        UiPermissions {
            auditlog: self.auditlog.clone().unwrap_or(base.auditlog),
            deployments: self.deployments.clone().unwrap_or(base.deployments),
            groups: self.groups.clone().unwrap_or(base.groups),
            releases: self.releases.clone().unwrap_or(base.releases),
            tenant_management: self.tenant_management.clone().unwrap_or(base.tenant_management),
            user_management: self.user_management.clone().unwrap_or(base.user_management),
        }
    }
}

impl From<UiPermissions> for UiPermissionsPatch {
    fn from(ui: UiPermissions) -> Self {
        UiPermissionsPatch {
            auditlog: Some(ui.auditlog),
            deployments: Some(ui.deployments),
            groups: Some(ui.groups),
            releases: Some(ui.releases),
            tenant_management: Some(ui.tenant_management),
            user_management: Some(ui.user_management),
        }
    }
}

/// Resources currently known to exist, per scoped area
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnownResources {
    pub groups: BTreeSet<String>,
    pub releases: BTreeSet<String>,
}

impl KnownResources {
    pub fn for_area(&self, area: Area) -> Option<&BTreeSet<String>> {
        match area {
            Area::Groups => Some(&self.groups),
            Area::Releases => Some(&self.releases),
            _ => None,
        }
    }
}

/// Role as edited in the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ui_permissions: UiPermissionsPatch,
}

/// Serialized role: the UI state to keep and the record to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRole {
    pub role: Role,
    pub payload: RoleWrite,
}

/// Serialize an edited role into the permission sets the backend stores.
///
/// The base permission set always comes first, followed by flat areas and
/// then scoped areas. The returned role holds what the payload grants, after
/// any collapse to the "all resources" key.
pub fn serialize_role(draft: &RoleDraft, previous: Option<&Role>, known: &KnownResources) -> SerializedRole {
    let granted = draft.ui_permissions.resolve(previous.map(|r| &r.ui_permissions));
    let mut sets = vec![ScopedPermissionSet::unscoped(BASIC)];
    let mut ui = UiPermissions::default();

    for area in Area::ALL {
        match granted.area(area) {
            AreaPermissions::Flat(permissions) => {
                let implied = derive(area, permissions.iter().copied(), &[]);
                for name in area_sets(area, &implied) {
                    if !sets.iter().any(|s| s.name == name && s.scope.is_none()) {
                        sets.push(ScopedPermissionSet::unscoped(name));
                    }
                }
                ui = ui.merge(&UiPermissions::with_flat(area, implied));
            }
            AreaPermissions::Scoped(permissions) => {
                let implied: ScopedPermissions = derive_scoped(area, permissions)
                    .into_iter()
                    .filter(|(_, p)| !p.is_empty())
                    .collect();
                let emitted = scoped_permission_sets(area, &implied, known.for_area(area));
                ui = emitted.iter().fold(ui, |ui, entry| ui.merge(&stored_grant(entry)));
                sets.extend(emitted);
            }
        }
    }

    let description = match previous {
        Some(prior) if draft.description.is_empty() => prior.description.clone(),
        _ => draft.description.clone(),
    };
    trace!(role = %draft.name, sets = sets.len(), "serialized role");

    SerializedRole {
        role: Role {
            name: draft.name.clone(),
            description: description.clone(),
            editable: true,
            is_custom: false,
            permissions: Vec::new(),
            ui_permissions: ui,
        },
        payload: RoleWrite { name: draft.name.clone(), description, permission_sets_with_scope: sets },
    }
}

/// UI permissions the backend will grant for a scoped entry
fn stored_grant(entry: &ScopedPermissionSet) -> UiPermissions {
    entry
        .scope
        .as_ref()
        .and_then(|scope| resolve_scope(&entry.name, scope))
        .map(|(area, resolved)| UiPermissions::with_scoped(area, resolved))
        .unwrap_or_default()
}

fn area_sets(area: Area, permissions: &PermissionList) -> impl Iterator<Item = &'static str> + '_ {
    permissions.iter().filter_map(move |p| p.permission_set(area))
}

/// Group the resources of a scoped area by the permission set each implied
/// permission maps to.
///
/// A set's resource list collapses to the area's "all resources" key when it
/// already contains that key, or when it covers every known resource and the
/// collapse grants nothing beyond what the listed resources had.
pub fn scoped_permission_sets(
    area: Area,
    implied: &ScopedPermissions,
    known: Option<&BTreeSet<String>>,
) -> Vec<ScopedPermissionSet> {
    let Some(scope) = area.scope() else {
        return Vec::new();
    };

    let mut by_set: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for (resource, permissions) in implied {
        for name in area_sets(area, permissions) {
            by_set.entry(name).or_default().push(resource.clone());
        }
    }

    by_set
        .into_iter()
        .map(|(name, resources)| {
            let value = collapse(area, scope, name, resources, known);
            ScopedPermissionSet::scoped(name, scope.scope_type, value)
        })
        .collect()
}

fn collapse(
    area: Area,
    scope: &ScopeDef,
    name: &str,
    resources: Vec<String>,
    known: Option<&BTreeSet<String>>,
) -> Vec<String> {
    let all = vec![scope.all_resources.to_string()];
    if resources.iter().any(|r| area.is_all_resources(r)) {
        return all;
    }
    let covers_known = known.is_some_and(|k| !k.is_empty() && k.iter().all(|r| resources.contains(r)));
    if covers_known && !widens_on_all(area, name, &resources) {
        return all;
    }
    resources
}

/// Check whether granting `name` on every resource implies more than granting
/// it on the listed ones
fn widens_on_all(area: Area, name: &str, resources: &[String]) -> bool {
    let Some(permission) = Permission::for_permission_set(area, name) else {
        return true;
    };
    let on_all = derive(area, [permission], &[]);
    resources
        .iter()
        .any(|r| derive(area, [permission], area.excluded_for(r)) != on_all)
}
