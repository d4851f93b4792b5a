//! # Access Control
//!
//! Effective-permission evaluation for employees.
//!
//! ## Model
//! An employee holds zero-or-more roles and zero-or-more direct
//! permission grants. The effective set is the union of the role-derived
//! permissions and the direct grants — unless the employee holds the
//! role named `custom`, which disables role inheritance entirely and
//! leaves only the direct grants.
//!
//! This module is pure set logic; the employee repository loads the
//! grants and asks it for a verdict.

use std::collections::HashSet;

/// The role name that disables role-derived permissions.
pub const CUSTOM_ROLE: &str = "custom";

/// A role together with the permission names it grants.
#[derive(Debug, Clone)]
pub struct RoleGrant {
    pub role_name: String,
    pub permissions: Vec<String>,
}

/// Computes the effective permission set.
///
/// ## Rules
/// - Union of every non-custom role's permissions plus direct grants.
/// - If any held role is named `custom`, role permissions are ignored
///   and only direct grants apply.
pub fn effective_permissions(
    roles: &[RoleGrant],
    direct: impl IntoIterator<Item = String>,
) -> HashSet<String> {
    let mut set: HashSet<String> = direct.into_iter().collect();

    let is_custom = roles.iter().any(|r| r.role_name == CUSTOM_ROLE);
    if is_custom {
        return set;
    }

    for role in roles {
        set.extend(role.permissions.iter().cloned());
    }
    set
}

/// Checks one permission against the employee's grants.
pub fn has_permission(
    roles: &[RoleGrant],
    direct: impl IntoIterator<Item = String>,
    permission: &str,
) -> bool {
    effective_permissions(roles, direct).contains(permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_role() -> RoleGrant {
        RoleGrant {
            role_name: "manager".into(),
            permissions: vec!["Manage Employees".into(), "Process Payments".into()],
        }
    }

    #[test]
    fn test_role_permissions_apply() {
        assert!(has_permission(
            &[manager_role()],
            std::iter::empty(),
            "Manage Employees"
        ));
    }

    #[test]
    fn test_direct_grants_apply() {
        assert!(has_permission(
            &[],
            ["Process Payments".to_string()],
            "Process Payments"
        ));
    }

    #[test]
    fn test_union_of_roles_and_direct() {
        let set = effective_permissions(&[manager_role()], ["View Reports".to_string()]);
        assert!(set.contains("Manage Employees"));
        assert!(set.contains("View Reports"));
    }

    #[test]
    fn test_custom_role_masks_role_grants() {
        let roles = vec![
            manager_role(),
            RoleGrant {
                role_name: CUSTOM_ROLE.into(),
                permissions: vec![],
            },
        ];
        let set = effective_permissions(&roles, ["View Reports".to_string()]);

        // Only the direct grant survives
        assert!(!set.contains("Manage Employees"));
        assert!(set.contains("View Reports"));
    }

    #[test]
    fn test_missing_permission_denied() {
        assert!(!has_permission(
            &[manager_role()],
            std::iter::empty(),
            "Delete Everything"
        ));
    }
}
