//! Role normalization tests
//!
//! Backend role payloads in, per-area UI permissions out.

use std::collections::BTreeMap;

use permscope::constants::*;
use permscope::{
    builtin_roles, normalize_roles, Area, Permission, PermissionList, PermissionSetCatalog, Role, RoleRecord,
};
use serde_json::json;

fn records(value: serde_json::Value) -> Vec<RoleRecord> {
    RoleRecord::list_from_json(&value.to_string()).unwrap()
}

fn normalize(value: serde_json::Value) -> BTreeMap<String, Role> {
    normalize_roles(&records(value), &BTreeMap::new(), &PermissionSetCatalog::builtin())
}

// ============================================================================
// Scoped Permission Sets
// ============================================================================

/// Verify a device-group scoped set resolves per group with implied read
#[test]
fn scoped_manage_devices_resolves_per_group() {
    let roles = normalize(json!([{
        "name": "R",
        "permission_sets_with_scope": [
            {"name": "ManageDevices", "scope": {"type": "DeviceGroups", "value": ["g1"]}}
        ]
    }]));

    let role = &roles["R"];
    assert_eq!(role.ui_permissions.groups.len(), 1);
    assert_eq!(role.ui_permissions.groups["g1"], PermissionList::from([Permission::Read, Permission::Manage]));
    assert!(role.ui_permissions.deployments.is_empty());
    assert!(role.editable);
    assert!(!role.is_custom);
}

/// Verify release tags never receive upload, while all releases does
#[test]
fn release_tags_exclude_upload() {
    let roles = normalize(json!([{
        "name": "R",
        "permission_sets_with_scope": [
            {"name": "ManageReleases", "scope": {"type": "ReleaseTags", "value": ["stable", "All releases"]}}
        ]
    }]));

    let releases = &roles["R"].ui_permissions.releases;
    assert_eq!(releases["stable"], PermissionList::from([Permission::Read, Permission::Manage]));
    assert!(releases[ALL_RELEASES].contains(&Permission::Upload));
}

/// Verify unscoped device sets grant on every device
#[test]
fn unscoped_device_set_covers_all_devices() {
    let roles = normalize(json!([{
        "name": "R",
        "permission_sets_with_scope": [{"name": "Basic"}, {"name": "ConnectToDevices"}]
    }]));

    let ui = &roles["R"].ui_permissions;
    assert!(ui.allows(Area::Groups, Some("anything"), Permission::Connect));
    assert!(ui.allows(Area::Groups, Some("anything"), Permission::Read));
    assert!(!ui.allows(Area::Groups, Some("anything"), Permission::Manage));
}

/// Verify super user grants the full structure
#[test]
fn super_user_is_full() {
    let roles = normalize(json!([{"name": "admin", "permission_sets_with_scope": [{"name": "SuperUser"}]}]));
    assert_eq!(roles["admin"].ui_permissions, permscope::UiPermissions::full());
}

// ============================================================================
// Legacy and Unknown Input
// ============================================================================

/// Verify a raw GET on users yields read and marks the role custom
#[test]
fn legacy_http_permission_marks_custom() {
    let roles = normalize(json!([{
        "name": "R2",
        "permissions": [
            {"action": "http", "object": {"type": "GET", "value": "/api/management/v1/useradm/users"}}
        ]
    }]));

    let role = &roles["R2"];
    assert_eq!(role.ui_permissions.user_management, PermissionList::from([Permission::Read]));
    assert!(role.is_custom);
    assert!(!role.editable);
    assert_eq!(role.permissions.len(), 1);
}

/// Verify a raw write permission also grants the reads it implies
#[test]
fn legacy_write_permission_implies_read() {
    let roles = normalize(json!([{
        "name": "R3",
        "permissions": [
            {"action": "http", "object": {"type": "POST", "value": "/api/management/v1/useradm/users"}},
            {"action": "http", "object": {"type": "PUT", "value": "/api/management/v1/inventory/groups/lab"}}
        ]
    }]));

    let ui = &roles["R3"].ui_permissions;
    assert_eq!(ui.user_management, PermissionList::from([Permission::Read, Permission::Manage]));
    assert_eq!(ui.groups[ALL_DEVICES], PermissionList::from([Permission::Read, Permission::Manage]));
    assert!(ui.allows(Area::UserManagement, None, Permission::Read));
    assert!(roles["R3"].is_custom);
}

/// Verify a custom permission set falls back to its raw permissions
#[test]
fn custom_set_uses_raw_permissions() {
    let catalog = PermissionSetCatalog::from_json(
        &json!([{
            "name": "AuditOnly",
            "permissions": [
                {"action": "http", "object": {"type": "GET", "value": "/api/management/v1/auditlogs/logs"}}
            ]
        }])
        .to_string(),
    )
    .unwrap();
    let input = records(json!([{"name": "auditors", "permission_sets_with_scope": [{"name": "AuditOnly"}]}]));

    let roles = normalize_roles(&input, &BTreeMap::new(), &catalog);
    let role = &roles["auditors"];
    assert_eq!(role.ui_permissions.auditlog, PermissionList::from([Permission::Read]));
    assert!(role.is_custom);
    assert!(!role.editable);
}

/// Verify unknown set names contribute nothing and do not fail
#[test]
fn unknown_permission_set_contributes_nothing() {
    let roles = normalize(json!([{
        "name": "R",
        "permission_sets_with_scope": [{"name": "DoesNotExist"}, {"name": "ReadUsers"}]
    }]));

    let ui = &roles["R"].ui_permissions;
    assert_eq!(ui.user_management, PermissionList::from([Permission::Read]));
    assert!(ui.groups.is_empty());
    assert!(!roles["R"].is_custom);
}

/// Verify malformed role payloads surface as errors
#[test]
fn malformed_payload_is_an_error() {
    assert!(RoleRecord::list_from_json("{\"name\": 3}").is_err());
    assert!(RoleRecord::list_from_json("[]").unwrap().is_empty());
}

// ============================================================================
// Known Roles
// ============================================================================

/// Verify built-in roles keep their local definition and stay read-only
#[test]
fn builtin_roles_are_not_editable() {
    let input = records(json!([
        {"name": ROLE_OBSERVER, "permission_sets_with_scope": [{"name": "ReadDevices"}]},
        {"name": ROLE_PERMIT_ALL, "permission_sets_with_scope": [{"name": "SuperUser"}]}
    ]));
    let known = builtin_roles();

    let roles = normalize_roles(&input, &known, &PermissionSetCatalog::builtin());
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[ROLE_OBSERVER].ui_permissions, known[ROLE_OBSERVER].ui_permissions);
    assert!(!roles[ROLE_OBSERVER].editable);
    assert!(!roles[ROLE_PERMIT_ALL].editable);
}

/// Verify output contains exactly the input roles
#[test]
fn output_is_keyed_by_input_roles() {
    let roles = normalize_roles(
        &records(json!([{"name": "a"}, {"name": "b"}])),
        &builtin_roles(),
        &PermissionSetCatalog::builtin(),
    );
    assert_eq!(roles.keys().map(String::as_str).collect::<Vec<_>>(), vec!["a", "b"]);
}

/// Verify the normalized role serializes with camelCase keys
#[test]
fn role_json_shape() {
    let roles = normalize(json!([{"name": "R", "permission_sets_with_scope": [{"name": "ReadAuditLogs"}]}]));
    let value = serde_json::to_value(&roles["R"]).unwrap();
    assert_eq!(value["isCustom"], json!(false));
    assert_eq!(value["uiPermissions"]["auditlog"], json!(["read"]));
    assert_eq!(value["uiPermissions"]["userManagement"], json!([]));
}
