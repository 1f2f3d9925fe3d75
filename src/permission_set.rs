//! Backend permission-set catalog and the permission-set resolver

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Area, Permission};
use crate::constants::{BASIC, SUPER_USER};
use crate::error::Result;
use crate::merge::derive;
use crate::role::{RawPermission, Scope};
use crate::ui::{ScopedPermissions, UiPermissions};

/// Permission set as listed by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSetRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: Vec<RawPermission>,
    #[serde(default)]
    pub supported_scope_types: Vec<String>,
}

/// Catalog entry with its precomputed UI permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet {
    pub name: String,
    pub description: String,
    /// Raw permissions, consulted only when `result` is empty
    pub permissions: Vec<RawPermission>,
    /// Scoped areas this set may be scoped to
    pub scopes: Vec<Area>,
    /// UI permissions granted by the unscoped set
    pub result: UiPermissions,
    /// Known to the permission catalog (including the base and super user sets)
    pub builtin: bool,
}

impl PermissionSet {
    pub fn from_record(record: PermissionSetRecord) -> Self {
        let result = unscoped_result(&record.name);
        let builtin = is_builtin_set(&record.name);
        let scopes = Area::SCOPED
            .into_iter()
            .filter(|area| record.supported_scope_types.iter().any(|t| Area::from_scope_type(t) == Some(*area)))
            .collect();
        PermissionSet {
            name: record.name,
            description: record.description,
            permissions: record.permissions,
            scopes,
            result,
            builtin,
        }
    }

    /// Set whose UI permissions can only be recovered from its raw permissions
    pub fn is_custom(&self) -> bool {
        !self.builtin && self.result.is_empty()
    }
}

fn is_builtin_set(name: &str) -> bool {
    name == BASIC
        || name == SUPER_USER
        || Permission::ALL.into_iter().any(|p| p.areas().any(|(_, set)| set == name))
}

/// UI permissions granted by a permission set assigned without a scope.
///
/// Flat areas take precedence: a set realizing any flat area grants only
/// those. A set realizing scoped areas alone grants them on every resource.
fn unscoped_result(name: &str) -> UiPermissions {
    if name == SUPER_USER {
        return UiPermissions::full();
    }

    let flat = realized_in(name, Area::ALL.into_iter().filter(|a| !a.is_scoped()));
    if !flat.is_empty() {
        return flat.into_iter().fold(UiPermissions::default(), |ui, (area, p)| {
            ui.merge(&UiPermissions::with_flat(area, derive(area, [p], &[])))
        });
    }

    realized_in(name, Area::SCOPED.into_iter())
        .into_iter()
        .fold(UiPermissions::default(), |ui, (area, _)| {
            let resources: Vec<String> = area.scope().map(|s| s.all_resources.to_string()).into_iter().collect();
            ui.merge(&UiPermissions::with_scoped(area, resolve_permission_set(name, area, &resources)))
        })
}

fn realized_in<I>(name: &str, areas: I) -> Vec<(Area, Permission)>
where
    I: Iterator<Item = Area>,
{
    areas
        .filter_map(|area| Permission::for_permission_set(area, name).map(|p| (area, p)))
        .collect()
}

/// Permission sets known for this session, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSetCatalog {
    sets: BTreeMap<String, PermissionSet>,
}

impl PermissionSetCatalog {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PermissionSetRecord>,
    {
        let sets = records
            .into_iter()
            .map(|record| {
                let set = PermissionSet::from_record(record);
                (set.name.clone(), set)
            })
            .collect();
        PermissionSetCatalog { sets }
    }

    /// Parse the backend permission-set list
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<PermissionSetRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Catalog of every set the permission catalog knows, without raw permissions
    pub fn builtin() -> Self {
        let mut names: Vec<&str> = vec![BASIC, SUPER_USER];
        for p in Permission::ALL {
            names.extend(p.areas().map(|(_, name)| name));
        }
        names.sort_unstable();
        names.dedup();

        Self::from_records(names.into_iter().map(|name| PermissionSetRecord {
            name: name.to_string(),
            supported_scope_types: Area::SCOPED
                .into_iter()
                .filter(|area| Permission::for_permission_set(*area, name).is_some())
                .filter_map(|area| area.scope().map(|s| s.scope_type.to_string()))
                .collect(),
            ..Default::default()
        }))
    }

    pub fn get(&self, name: &str) -> Option<&PermissionSet> {
        self.sets.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Resolve a permission set scoped to `resources` of a scoped area.
///
/// Each resource receives the single permission the set realizes in `area`,
/// expanded to its implied permissions per resource. Unknown names resolve to
/// the empty map.
pub fn resolve_permission_set(name: &str, area: Area, resources: &[String]) -> ScopedPermissions {
    let Some(permission) = Permission::for_permission_set(area, name) else {
        debug!(set = name, %area, "permission set realizes nothing in area");
        return ScopedPermissions::new();
    };
    resources
        .iter()
        .map(|resource| (resource.clone(), derive(area, [permission], area.excluded_for(resource))))
        .collect()
}

/// Resolve a scoped assignment, returning the area its scope type maps to
pub fn resolve_scope(name: &str, scope: &Scope) -> Option<(Area, ScopedPermissions)> {
    let area = Area::from_scope_type(&scope.scope_type)?;
    Some((area, resolve_permission_set(name, area, &scope.value)))
}
