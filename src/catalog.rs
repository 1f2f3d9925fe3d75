//! Permission catalog: functional areas, permissions and their levels
//!
//! Everything here is static. Permissions within one area are ordered by
//! level; a granted permission implies every permission of its area with a
//! strictly lower level. Permissions sharing a level are peers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Level assumed when nothing is granted; nothing sits below it.
const BASE_LEVEL: u8 = 1;

/// A UI permission identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Manage,
    Deploy,
    Configure,
    Connect,
    Upload,
}

impl Permission {
    pub const ALL: [Permission; 6] = [
        Permission::Read,
        Permission::Manage,
        Permission::Deploy,
        Permission::Configure,
        Permission::Connect,
        Permission::Upload,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Manage => "manage",
            Permission::Deploy => "deploy",
            Permission::Configure => "configure",
            Permission::Connect => "connect",
            Permission::Upload => "upload",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }

    pub fn level(self) -> u8 {
        match self {
            Permission::Read | Permission::Upload => 1,
            Permission::Manage | Permission::Deploy | Permission::Configure | Permission::Connect => 2,
        }
    }

    /// HTTP methods this permission corresponds to (legacy matching only)
    pub fn verbs(self) -> &'static [HttpVerb] {
        use HttpVerb::*;
        match self {
            Permission::Read => &[Get],
            Permission::Manage => &[Post, Put, Patch, Delete],
            Permission::Deploy => &[Post],
            Permission::Configure => &[Put, Post, Patch],
            Permission::Connect => &[Get],
            Permission::Upload => &[Post],
        }
    }

    /// Backend permission set realizing this permission in `area`
    pub fn permission_set(self, area: Area) -> Option<&'static str> {
        use Area::*;
        use Permission::*;
        let name = match (self, area) {
            (Read, AuditLog) => READ_AUDIT_LOGS,
            (Read, Deployments) => READ_DEPLOYMENTS,
            (Manage, Deployments) => MANAGE_DEPLOYMENTS,
            (Deploy, Deployments) => DEPLOY_TO_DEVICES,
            (Read, Groups) => READ_DEVICES,
            (Manage, Groups) => MANAGE_DEVICES,
            (Deploy, Groups) => DEPLOY_TO_DEVICES,
            (Configure, Groups) => CONFIGURE_DEVICES,
            (Connect, Groups) => CONNECT_TO_DEVICES,
            (Read, Releases) => READ_RELEASES,
            (Manage, Releases) => MANAGE_RELEASES,
            (Upload, Releases) => UPLOAD_ARTIFACTS,
            (Read, TenantManagement) => READ_TENANTS,
            (Manage, TenantManagement) => MANAGE_TENANTS,
            (Read, UserManagement) => READ_USERS,
            (Manage, UserManagement) => MANAGE_USERS,
            _ => return None,
        };
        Some(name)
    }

    /// All (area, permission set) pairs this permission is defined for
    pub fn areas(self) -> impl Iterator<Item = (Area, &'static str)> {
        Area::ALL
            .into_iter()
            .filter_map(move |area| self.permission_set(area).map(|name| (area, name)))
    }

    /// The permission a set name realizes in `area`, if any.
    ///
    /// The catalog maps a set name to at most one permission per area.
    pub fn for_permission_set(area: Area, name: &str) -> Option<Self> {
        area.permissions()
            .iter()
            .copied()
            .find(|p| p.permission_set(area) == Some(name))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Functional area of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "auditlog")]
    AuditLog,
    #[serde(rename = "deployments")]
    Deployments,
    #[serde(rename = "groups")]
    Groups,
    #[serde(rename = "releases")]
    Releases,
    #[serde(rename = "tenantManagement")]
    TenantManagement,
    #[serde(rename = "userManagement")]
    UserManagement,
}

/// Scope definition of a scoped area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeDef {
    /// Backend scope type name
    pub scope_type: &'static str,
    /// Resource key meaning "every resource of this type"
    pub all_resources: &'static str,
}

const GROUPS_SCOPE: ScopeDef = ScopeDef { scope_type: SCOPE_DEVICE_GROUPS, all_resources: ALL_DEVICES };
const RELEASES_SCOPE: ScopeDef = ScopeDef { scope_type: SCOPE_RELEASE_TAGS, all_resources: ALL_RELEASES };

impl Area {
    pub const ALL: [Area; 6] = [
        Area::AuditLog,
        Area::Deployments,
        Area::Groups,
        Area::Releases,
        Area::TenantManagement,
        Area::UserManagement,
    ];

    pub const SCOPED: [Area; 2] = [Area::Groups, Area::Releases];

    pub fn key(self) -> &'static str {
        match self {
            Area::AuditLog => "auditlog",
            Area::Deployments => "deployments",
            Area::Groups => "groups",
            Area::Releases => "releases",
            Area::TenantManagement => "tenantManagement",
            Area::UserManagement => "userManagement",
        }
    }

    /// Permissions defined for this area, lowest level first
    pub fn permissions(self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Area::AuditLog => &[Read],
            Area::Deployments => &[Read, Manage, Deploy],
            Area::Groups => &[Read, Manage, Deploy, Configure, Connect],
            Area::Releases => &[Read, Manage, Upload],
            Area::TenantManagement => &[Read, Manage],
            Area::UserManagement => &[Read, Manage],
        }
    }

    pub fn scope(self) -> Option<&'static ScopeDef> {
        match self {
            Area::Groups => Some(&GROUPS_SCOPE),
            Area::Releases => Some(&RELEASES_SCOPE),
            _ => None,
        }
    }

    #[inline]
    pub fn is_scoped(self) -> bool {
        self.scope().is_some()
    }

    /// Scoped area whose backend scope type (or key) is `value`
    pub fn from_scope_type(value: &str) -> Option<Self> {
        Self::SCOPED.into_iter().find(|area| {
            area.key() == value || area.scope().is_some_and(|s| s.scope_type == value)
        })
    }

    /// Check whether `resource` is this area's "all resources" key
    pub fn is_all_resources(self, resource: &str) -> bool {
        self.scope().is_some_and(|s| s.all_resources == resource)
    }

    /// Permissions that may never be implied for `resource` in this area.
    ///
    /// Uploads cannot be scoped to a single release tag.
    pub fn excluded_for(self, resource: &str) -> &'static [Permission] {
        match self {
            Area::Releases if !self.is_all_resources(resource) => &[Permission::Upload],
            _ => &[],
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// HTTP method of a legacy permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Any,
}

impl HttpVerb {
    pub fn parse(value: &str) -> Option<Self> {
        let verb = match value.to_ascii_uppercase().as_str() {
            "GET" => HttpVerb::Get,
            "POST" => HttpVerb::Post,
            "PUT" => HttpVerb::Put,
            "PATCH" => HttpVerb::Patch,
            "DELETE" => HttpVerb::Delete,
            "ANY" => HttpVerb::Any,
            _ => return None,
        };
        Some(verb)
    }
}

/// Compute the implied permissions of an area.
///
/// Returns every permission of `area` below the highest granted level, plus
/// the granted ones themselves, minus `exclude`. Permissions not defined for
/// the area are ignored.
pub fn implied_permissions<I>(area: Area, granted: I, exclude: &[Permission]) -> BTreeSet<Permission>
where
    I: IntoIterator<Item = Permission>,
{
    let defined = area.permissions();
    let granted: BTreeSet<Permission> = granted.into_iter().filter(|p| defined.contains(p)).collect();
    let highest = granted.iter().map(|p| p.level()).max().unwrap_or(BASE_LEVEL);

    defined
        .iter()
        .copied()
        .filter(|p| p.level() < highest || granted.contains(p))
        .filter(|p| !exclude.contains(p))
        .collect()
}
