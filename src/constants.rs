//! Backend identifiers and fixed values

// Scoped areas
pub const ALL_DEVICES: &str = "All devices";
pub const ALL_RELEASES: &str = "All releases";
pub const SCOPE_DEVICE_GROUPS: &str = "DeviceGroups";
pub const SCOPE_RELEASE_TAGS: &str = "ReleaseTags";

// Legacy permission objects
pub const API_ROOT: &str = "/api/management/";
pub const ANY: &str = "any";
pub const DEVICE_GROUP_TYPE: &str = "DEVICE_GROUP";

// Permission sets without a single area mapping
pub const BASIC: &str = "Basic";
pub const SUPER_USER: &str = "SuperUser";

// Permission sets realizing one permission per area
pub const READ_AUDIT_LOGS: &str = "ReadAuditLogs";
pub const READ_DEPLOYMENTS: &str = "ReadDeployments";
pub const MANAGE_DEPLOYMENTS: &str = "ManageDeployments";
pub const DEPLOY_TO_DEVICES: &str = "DeployToDevices";
pub const READ_DEVICES: &str = "ReadDevices";
pub const MANAGE_DEVICES: &str = "ManageDevices";
pub const CONFIGURE_DEVICES: &str = "ConfigureDevices";
pub const CONNECT_TO_DEVICES: &str = "ConnectToDevices";
pub const READ_RELEASES: &str = "ReadReleases";
pub const MANAGE_RELEASES: &str = "ManageReleases";
pub const UPLOAD_ARTIFACTS: &str = "UploadArtifacts";
pub const READ_TENANTS: &str = "ReadTenants";
pub const MANAGE_TENANTS: &str = "ManageTenants";
pub const READ_USERS: &str = "ReadUsers";
pub const MANAGE_USERS: &str = "ManageUsers";

// Built-in roles (never editable)
pub const ROLE_PERMIT_ALL: &str = "RBAC_ROLE_PERMIT_ALL";
pub const ROLE_OBSERVER: &str = "RBAC_ROLE_OBSERVER";
pub const ROLE_CI: &str = "RBAC_ROLE_CI";
pub const ROLE_DEPLOYMENTS_MANAGER: &str = "RBAC_ROLE_DEPLOYMENTS_MANAGER";
pub const ROLE_REMOTE_TERMINAL: &str = "RBAC_ROLE_REMOTE_TERMINAL";

pub const BUILTIN_ROLES: &[&str] = &[
    ROLE_PERMIT_ALL,
    ROLE_OBSERVER,
    ROLE_CI,
    ROLE_DEPLOYMENTS_MANAGER,
    ROLE_REMOTE_TERMINAL,
];

/// Check whether a role name belongs to the built-in role table
pub fn is_builtin_role(name: &str) -> bool {
    BUILTIN_ROLES.contains(&name)
}
