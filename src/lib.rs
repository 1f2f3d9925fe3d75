//! Permscope - Scoped RBAC permission sets mapped to per-area UI permissions
//!
//! Backend roles carry named permission sets, optionally scoped to device
//! groups or release tags, and sometimes raw legacy HTTP permissions. The UI
//! edits a matrix of per-area permissions. [`normalize_roles`] maps the former
//! to the latter and [`serialize_role`] maps an edited matrix back.

pub mod builtin;
pub mod catalog;
pub mod constants;
pub mod error;
pub mod legacy;
pub mod merge;
pub mod normalize;
pub mod permission_set;
pub mod role;
pub mod serialize;
pub mod ui;

pub use builtin::builtin_roles;
pub use catalog::{implied_permissions, Area, HttpVerb, Permission, ScopeDef};
pub use error::{RbacError, Result};
pub use legacy::map_legacy_permission;
pub use merge::{derive, derive_scoped, derive_ui, merge, merge_lists, merge_scoped};
pub use normalize::{normalize_role, normalize_roles, parse_role_permissions, ParsedPermissions};
pub use permission_set::{
    resolve_permission_set, resolve_scope, PermissionSet, PermissionSetCatalog, PermissionSetRecord,
};
pub use role::{PermissionObject, RawPermission, Role, RoleRecord, RoleWrite, Scope, ScopedPermissionSet};
pub use serialize::{
    scoped_permission_sets, serialize_role, KnownResources, RoleDraft, SerializedRole, UiPermissionsPatch,
};
pub use ui::{AreaPermissions, PermissionList, ScopedPermissions, UiPermissions};
