//! # Employee Repository
//!
//! Employee accounts plus the role/permission model.
//!
//! ## Access Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  employees ──┬── employee_roles ──► roles ──► role_permissions         │
//! │              │                                      │                   │
//! │              └── employee_permissions ──────────────┴──► permissions    │
//! │                                                                         │
//! │  Effective set = role permissions ∪ direct grants                      │
//! │  EXCEPT: holding the 'custom' role drops the role-derived half.        │
//! │  (Evaluation lives in pressline-core::access; this repo only loads.)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use pressline_core::access::{self, RoleGrant};
use pressline_core::{Employee, Permission, Role};

/// Fields for creating an employee. The password arrives pre-hashed;
/// hashing is the API layer's job.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub employee_name: String,
    pub password_hash: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

/// Fields for updating an employee account.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEmployee {
    pub employee_name: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    /// When present, replaces the stored hash.
    pub password_hash: Option<String>,
}

const EMPLOYEE_COLUMNS: &str =
    "id, employee_name, password_hash, display_name, phone_number, email, created_at";

/// Repository for employee accounts and access control.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Inserts an employee. Login names are unique; duplicates surface
    /// as `DbError::UniqueViolation`.
    pub async fn create(&self, new: &NewEmployee) -> DbResult<Employee> {
        let now = Utc::now();
        debug!(employee_name = %new.employee_name, "Creating employee");

        let result = sqlx::query(
            r#"
            INSERT INTO employees (employee_name, password_hash, display_name, phone_number, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&new.employee_name)
        .bind(&new.password_hash)
        .bind(&new.display_name)
        .bind(&new.phone_number)
        .bind(&new.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DbError::not_found("Employee", result.last_insert_rowid()))
    }

    /// Gets an employee by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Gets an employee by login name (normalized lowercase).
    pub async fn get_by_name(&self, employee_name: &str) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_name = ?1"
        ))
        .bind(employee_name.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Lists all employees.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY display_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    /// Updates account fields; the password hash only when provided.
    pub async fn update(&self, id: i64, update: &UpdateEmployee) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET employee_name = ?2,
                display_name = ?3,
                phone_number = ?4,
                email = ?5,
                password_hash = COALESCE(?6, password_hash)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.employee_name)
        .bind(&update.display_name)
        .bind(&update.phone_number)
        .bind(&update.email)
        .bind(&update.password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        Ok(())
    }

    /// Deletes an employee.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        Ok(())
    }

    // =========================================================================
    // Roles & Permissions
    // =========================================================================

    /// Lists all roles.
    pub async fn list_roles(&self) -> DbResult<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lists all permissions.
    pub async fn list_permissions(&self) -> DbResult<Vec<Permission>> {
        Ok(
            sqlx::query_as::<_, Permission>("SELECT id, name FROM permissions ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Replaces an employee's role set by role name.
    pub async fn set_roles(&self, employee_id: i64, role_names: &[String]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM employee_roles WHERE employee_id = ?1")
            .bind(employee_id)
            .execute(&mut *tx)
            .await?;

        for name in role_names {
            let result = sqlx::query(
                r#"
                INSERT INTO employee_roles (employee_id, role_id)
                SELECT ?1, id FROM roles WHERE name = ?2
                "#,
            )
            .bind(employee_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Role", name));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Replaces an employee's direct permission grants.
    pub async fn set_permissions(&self, employee_id: i64, permission_ids: &[i64]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM employee_permissions WHERE employee_id = ?1")
            .bind(employee_id)
            .execute(&mut *tx)
            .await?;

        for permission_id in permission_ids {
            sqlx::query(
                "INSERT INTO employee_permissions (employee_id, permission_id) VALUES (?1, ?2)",
            )
            .bind(employee_id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads the employee's roles with their granted permission names.
    pub async fn role_grants(&self, employee_id: i64) -> DbResult<Vec<RoleGrant>> {
        let roles: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN employee_roles er ON r.id = er.role_id
            WHERE er.employee_id = ?1
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        let mut grants = Vec::with_capacity(roles.len());
        for (role_id, role_name) in roles {
            let permissions: Vec<String> = sqlx::query_scalar(
                r#"
                SELECT p.name
                FROM permissions p
                JOIN role_permissions rp ON p.id = rp.permission_id
                WHERE rp.role_id = ?1
                "#,
            )
            .bind(role_id)
            .fetch_all(&self.pool)
            .await?;

            grants.push(RoleGrant {
                role_name,
                permissions,
            });
        }

        Ok(grants)
    }

    /// Loads the employee's direct permission grants.
    pub async fn direct_permissions(&self, employee_id: i64) -> DbResult<Vec<String>> {
        let permissions: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT p.name
            FROM permissions p
            JOIN employee_permissions ep ON p.id = ep.permission_id
            WHERE ep.employee_id = ?1
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    /// Checks one permission for an employee.
    ///
    /// Loads the grants and delegates the verdict to the pure
    /// evaluation in pressline-core.
    pub async fn has_permission(&self, employee_id: i64, permission: &str) -> DbResult<bool> {
        let roles = self.role_grants(employee_id).await?;
        let direct = self.direct_permissions(employee_id).await?;
        Ok(access::has_permission(&roles, direct, permission))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn clerk(name: &str) -> NewEmployee {
        NewEmployee {
            employee_name: name.into(),
            password_hash: "argon2-hash".into(),
            display_name: "Test Clerk".into(),
            phone_number: None,
            email: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let db = test_db().await;
        let created = db.employees().create(&clerk("maria")).await.unwrap();

        let by_name = db
            .employees()
            .get_by_name("  MARIA ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        db.employees().create(&clerk("maria")).await.unwrap();

        let err = db.employees().create(&clerk("maria")).await;
        assert!(matches!(err, Err(DbError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_role_permissions_grant_access() {
        let db = test_db().await;
        let employee = db.employees().create(&clerk("maria")).await.unwrap();

        db.employees()
            .set_roles(employee.id, &["manager".to_string()])
            .await
            .unwrap();

        assert!(db
            .employees()
            .has_permission(employee.id, "Manage Employees")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_clerk_cannot_manage_employees() {
        let db = test_db().await;
        let employee = db.employees().create(&clerk("maria")).await.unwrap();

        db.employees()
            .set_roles(employee.id, &["clerk".to_string()])
            .await
            .unwrap();

        assert!(db
            .employees()
            .has_permission(employee.id, "Process Payments")
            .await
            .unwrap());
        assert!(!db
            .employees()
            .has_permission(employee.id, "Manage Employees")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_custom_role_uses_direct_grants_only() {
        let db = test_db().await;
        let employee = db.employees().create(&clerk("maria")).await.unwrap();

        // custom + manager: the custom role masks manager's grants
        db.employees()
            .set_roles(employee.id, &["manager".to_string(), "custom".to_string()])
            .await
            .unwrap();

        assert!(!db
            .employees()
            .has_permission(employee.id, "Manage Employees")
            .await
            .unwrap());

        // Direct grant still works
        let permissions = db.employees().list_permissions().await.unwrap();
        let view_reports = permissions
            .iter()
            .find(|p| p.name == "View Reports")
            .unwrap();
        db.employees()
            .set_permissions(employee.id, &[view_reports.id])
            .await
            .unwrap();

        assert!(db
            .employees()
            .has_permission(employee.id, "View Reports")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_keeps_password_when_absent() {
        let db = test_db().await;
        let employee = db.employees().create(&clerk("maria")).await.unwrap();

        db.employees()
            .update(
                employee.id,
                &UpdateEmployee {
                    employee_name: "maria".into(),
                    display_name: "Maria G.".into(),
                    phone_number: Some("555-0100".into()),
                    email: None,
                    password_hash: None,
                },
            )
            .await
            .unwrap();

        let fetched = db.employees().get_by_id(employee.id).await.unwrap().unwrap();
        assert_eq!(fetched.display_name, "Maria G.");
        assert_eq!(fetched.password_hash, "argon2-hash");
    }
}
