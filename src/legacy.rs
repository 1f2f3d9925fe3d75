//! Legacy permission matching
//!
//! Tenants without named permission sets store raw `{action, object}`
//! permissions. These are classified against a fixed endpoint table, best
//! effort: anything unrecognized maps to the empty structure.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, error};

use crate::catalog::{Area, HttpVerb, Permission};
use crate::constants::{ANY, API_ROOT, DEVICE_GROUP_TYPE};
use crate::error::{RbacError, Result};
use crate::role::{PermissionObject, RawPermission};
use crate::ui::{PermissionList, ScopedPermissions, UiPermissions};

/// Endpoint pattern and the UI permissions it declares
struct Endpoint {
    area: Area,
    pattern: &'static str,
    verbs: &'static [HttpVerb],
    permissions: &'static [Permission],
}

const WRITE_VERBS: &[HttpVerb] = &[HttpVerb::Post, HttpVerb::Put, HttpVerb::Patch, HttpVerb::Delete];

#[rustfmt::skip]
const ENDPOINTS: &[Endpoint] = &[
    // Audit log
    Endpoint { area: Area::AuditLog, pattern: r"(?i)^/api/management/v\d+/auditlogs/logs", verbs: &[HttpVerb::Get], permissions: &[Permission::Read] },
    // Deployments
    Endpoint { area: Area::Deployments, pattern: r"(?i)^/api/management/v\d+/deployments/deployments", verbs: &[HttpVerb::Get], permissions: &[Permission::Read] },
    Endpoint { area: Area::Deployments, pattern: r"(?i)^/api/management/v\d+/deployments/deployments(/group/[^/]+)?/?$", verbs: &[HttpVerb::Post], permissions: &[Permission::Deploy] },
    Endpoint { area: Area::Deployments, pattern: r"(?i)^/api/management/v\d+/deployments/(deployments/[^/]+/status|config)", verbs: WRITE_VERBS, permissions: &[Permission::Manage] },
    // Device groups
    Endpoint { area: Area::Groups, pattern: r"(?i)^/api/management/v\d+/(inventory/(devices|groups)|devauth/devices|deviceconfig/configurations/device)", verbs: &[HttpVerb::Get], permissions: &[Permission::Read] },
    Endpoint { area: Area::Groups, pattern: r"(?i)^/api/management/v\d+/(inventory/(devices|groups)|devauth/devices)", verbs: WRITE_VERBS, permissions: &[Permission::Manage] },
    Endpoint { area: Area::Groups, pattern: r"(?i)^/api/management/v\d+/deviceconfig/configurations/device/", verbs: &[HttpVerb::Put, HttpVerb::Post, HttpVerb::Patch], permissions: &[Permission::Configure] },
    Endpoint { area: Area::Groups, pattern: r"(?i)^/api/management/v\d+/deviceconnect/devices/[^/]+/(connect|download|upload)", verbs: &[HttpVerb::Get], permissions: &[Permission::Connect] },
    Endpoint { area: Area::Groups, pattern: r"(?i)^/api/management/v\d+/deployments/deployments(/group/[^/]+)?/?$", verbs: &[HttpVerb::Post], permissions: &[Permission::Deploy] },
    // Releases
    Endpoint { area: Area::Releases, pattern: r"(?i)^/api/management/v\d+/deployments/(artifacts|deployments/releases)", verbs: &[HttpVerb::Get], permissions: &[Permission::Read] },
    Endpoint { area: Area::Releases, pattern: r"(?i)^/api/management/v\d+/deployments/(artifacts|deployments/releases)/[^/]+", verbs: &[HttpVerb::Put, HttpVerb::Patch, HttpVerb::Delete], permissions: &[Permission::Manage] },
    Endpoint { area: Area::Releases, pattern: r"(?i)^/api/management/v\d+/deployments/artifacts(/generate)?/?$", verbs: &[HttpVerb::Post], permissions: &[Permission::Upload] },
    // Tenant management
    Endpoint { area: Area::TenantManagement, pattern: r"(?i)^/api/management/v\d+/tenantadm/tenants", verbs: &[HttpVerb::Get], permissions: &[Permission::Read] },
    Endpoint { area: Area::TenantManagement, pattern: r"(?i)^/api/management/v\d+/tenantadm/tenants", verbs: WRITE_VERBS, permissions: &[Permission::Manage] },
    // User management
    Endpoint { area: Area::UserManagement, pattern: r"(?i)^/api/management/v\d+/useradm/(users|roles|permission_sets)", verbs: &[HttpVerb::Get], permissions: &[Permission::Read] },
    Endpoint { area: Area::UserManagement, pattern: r"(?i)^/api/management/v\d+/useradm/(users|roles)", verbs: WRITE_VERBS, permissions: &[Permission::Manage] },
];

struct CompiledEndpoint {
    area: Area,
    regex: Regex,
    verbs: &'static [HttpVerb],
    permissions: &'static [Permission],
}

static COMPILED: OnceLock<Vec<CompiledEndpoint>> = OnceLock::new();

fn compile_endpoints() -> Result<Vec<CompiledEndpoint>> {
    ENDPOINTS
        .iter()
        .map(|e| {
            let regex = Regex::new(e.pattern).map_err(|source| RbacError::Pattern { pattern: e.pattern, source })?;
            Ok(CompiledEndpoint { area: e.area, regex, verbs: e.verbs, permissions: e.permissions })
        })
        .collect()
}

fn endpoints() -> &'static [CompiledEndpoint] {
    COMPILED.get_or_init(|| {
        compile_endpoints().unwrap_or_else(|e| {
            error!(error = %e, "legacy endpoint table failed to compile");
            Vec::new()
        })
    })
}

/// Action of a raw permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Http,
    Any,
    CreateDeployment,
    RemoteTerminal,
    ViewDevice,
    Unknown,
}

impl ActionKind {
    pub fn parse(action: &str) -> Self {
        match action {
            "http" => ActionKind::Http,
            "any" => ActionKind::Any,
            "CREATE_DEPLOYMENT" => ActionKind::CreateDeployment,
            "REMOTE_TERMINAL" => ActionKind::RemoteTerminal,
            "VIEW_DEVICE" => ActionKind::ViewDevice,
            _ => ActionKind::Unknown,
        }
    }
}

/// Classify a raw permission into UI permissions.
///
/// Never fails; unrecognized permissions yield the empty structure.
pub fn map_legacy_permission(permission: &RawPermission) -> UiPermissions {
    let object = &permission.object;
    let ui = match ActionKind::parse(&permission.action) {
        ActionKind::Http | ActionKind::Any => map_http_permission(object),
        ActionKind::CreateDeployment => device_group_grant(object, |group| {
            let mut ui = group_grant(group, Permission::Deploy);
            ui.deployments.insert(Permission::Deploy);
            ui
        }),
        ActionKind::RemoteTerminal => device_group_grant(object, |group| group_grant(group, Permission::Connect)),
        ActionKind::ViewDevice => device_group_grant(object, |group| group_grant(group, Permission::Read)),
        ActionKind::Unknown => UiPermissions::default(),
    };
    if ui.is_empty() {
        debug!(action = %permission.action, kind = %object.kind, value = %object.value, "legacy permission not classified");
    }
    ui
}

fn device_group_grant<F>(object: &PermissionObject, grant: F) -> UiPermissions
where
    F: FnOnce(&str) -> UiPermissions,
{
    if object.kind == DEVICE_GROUP_TYPE {
        grant(&object.value)
    } else {
        UiPermissions::default()
    }
}

fn group_grant(group: &str, permission: Permission) -> UiPermissions {
    let mut groups = ScopedPermissions::new();
    groups.insert(group.to_string(), PermissionList::from([permission]));
    UiPermissions::with_scoped(Area::Groups, groups)
}

/// Permissions implied by an HTTP verb on an endpoint path
fn map_http_permission(object: &PermissionObject) -> UiPermissions {
    let Some(verb) = HttpVerb::parse(&object.kind) else {
        debug!(verb = %object.kind, "unknown HTTP verb in legacy permission");
        return UiPermissions::default();
    };
    let path = object.value.as_str();
    if path != ANY && !path.to_ascii_lowercase().contains(API_ROOT) {
        return UiPermissions::default();
    }

    Area::ALL.into_iter().fold(UiPermissions::default(), |ui, area| {
        let collected = area_permissions_for(area, verb, path);
        if collected.is_empty() {
            return ui;
        }
        let contribution = match area.scope() {
            Some(scope) => {
                let mut scoped = ScopedPermissions::new();
                scoped.insert(scope.all_resources.to_string(), collected);
                UiPermissions::with_scoped(area, scoped)
            }
            None => UiPermissions::with_flat(area, collected),
        };
        ui.merge(&contribution)
    })
}

fn area_permissions_for(area: Area, verb: HttpVerb, path: &str) -> BTreeSet<Permission> {
    let verb_allows = |p: &Permission| verb == HttpVerb::Any || p.verbs().contains(&verb);

    if path == ANY {
        return area.permissions().iter().copied().filter(verb_allows).collect();
    }
    endpoints()
        .iter()
        .filter(|e| e.area == area && e.regex.is_match(path))
        .filter(|e| verb == HttpVerb::Any || e.verbs.contains(&verb))
        .flat_map(|e| e.permissions.iter().copied())
        .filter(verb_allows)
        .collect()
}
