use std::fmt;

use chrono::{DateTime, Utc};
use derive_more::{From, Into};
use serde::{Deserialize, Serialize};

use crate::db::activity::{push_activity, EventKind, NewActivity, Scope, Severity};
use crate::db::Snapshot;
use crate::error::AppError;
use crate::AppState;

/// Username of the bootstrap account created at startup.
pub const SEED_ADMIN_USERNAME: &str = "admin";
const SEED_ADMIN_EMAIL: &str = "admin@gamecloud.local";
const SEED_ADMIN_PASSWORD: &str = "admin123";

id_struct!(UserId, User);

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Employee,
    Manager,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Employee => "employee",
            Role::Manager => "manager",
        }
    }

    /// Role name in title case, for directory listings.
    pub fn title_case(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Employee => "Employee",
            Role::Manager => "Manager",
        }
    }

    /// Staff roles may perform tournament and user administration.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Employee | Role::Manager)
    }

    /// Strict parse, ignoring case.
    pub fn from_name(name: &str) -> Option<Role> {
        match name.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "employee" => Some(Role::Employee),
            "manager" => Some(Role::Manager),
            _ => None,
        }
    }

    /// Lenient parse; unrecognized names fall back to `user`.
    pub fn from_name_or_user(name: &str) -> Role {
        Role::from_name(name).unwrap_or(Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff a caller-supplied actor role names a staff role. This is the
/// gate in front of every staff-only mutation.
pub fn is_staff_role(role: &str) -> bool {
    matches!(role, "employee" | "manager")
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Banned,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Banned => "Banned",
        }
    }

    pub fn from_name(name: &str) -> Option<UserStatus> {
        match name {
            "Active" => Some(UserStatus::Active),
            "Banned" => Some(UserStatus::Banned),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    // TODO: store an argon2 hash here instead of the plain secret; doing so
    // changes the login contract (timing, error detail) so it is not slipped
    // in silently
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// User view with the password omitted. The only user representation that
/// leaves the server.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

fn email_taken(db: &Snapshot, email: &str) -> bool {
    let needle = email.to_lowercase();
    db.users.iter().any(|user| user.email.to_lowercase() == needle)
}

impl AppState {
    /// Creates the bootstrap manager account unless one named "admin"
    /// already exists. Runs once at startup; idempotent.
    pub fn ensure_seed_data(&self) -> Result<(), AppError> {
        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        if db.user_by_username(SEED_ADMIN_USERNAME).is_none() {
            db.users.push(User {
                id: UserId::random(),
                username: SEED_ADMIN_USERNAME.to_string(),
                email: SEED_ADMIN_EMAIL.to_string(),
                password: SEED_ADMIN_PASSWORD.to_string(),
                role: Role::Manager,
                status: UserStatus::Active,
                created_at: Utc::now(),
            });
            self.store.save(&db)?;
            tracing::info!("seeded bootstrap manager account");
        }
        Ok(())
    }

    pub fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<PublicUser, AppError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "username, email, and password are required".to_string(),
            ));
        }

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        if db.user_by_username(username).is_some() {
            return Err(AppError::Conflict("username already exists".to_string()));
        }
        if email_taken(&db, email) {
            return Err(AppError::Conflict("email already exists".to_string()));
        }

        let user = User {
            id: UserId::random(),
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
            role: role.map(Role::from_name_or_user).unwrap_or(Role::User),
            status: UserStatus::Active,
            created_at: Utc::now(),
        };
        let public = user.to_public();
        db.users.push(user);
        self.store.save(&db)?;
        Ok(public)
    }

    /// Authenticates a user. Failed or blocked staff attempts leave a
    /// security-scoped audit entry behind; ordinary mismatches do not.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        role_hint: Option<&str>,
    ) -> Result<PublicUser, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "username and password are required".to_string(),
            ));
        }
        // an empty hint means no role was requested
        let role_hint = role_hint.filter(|hint| !hint.is_empty());

        let _guard = self.store.lock();
        let mut db = self.store.load()?;

        let needle = username.to_lowercase();
        let matched = db
            .users
            .iter()
            .find(|user| user.username.to_lowercase() == needle && user.password == password)
            .cloned();

        let Some(user) = matched else {
            // the credentials were wrong; treat it as a blocked staff attempt
            // when the caller asked for the staff portal or the username
            // belongs to a staff account
            let known_role = db.user_by_username(username).map(|user| user.role);
            let staff_username = known_role.is_some_and(Role::is_staff);
            if role_hint == Some("employee") || staff_username {
                let actor_role = match known_role {
                    Some(role) if staff_username => role.to_string(),
                    _ => "unknown".to_string(),
                };
                push_activity(
                    &mut db,
                    NewActivity::new(
                        Scope::Security,
                        EventKind::UnauthorizedStaffLogin,
                        format!(
                            "Unauthorized staff login attempt for \"{username}\" (invalid credentials)."
                        ),
                    )
                    .actor_role(actor_role)
                    .actor(username)
                    .severity(Severity::Warn),
                );
                self.store.save(&db)?;
            }
            return Err(AppError::InvalidCredentials);
        };

        if user.status == UserStatus::Banned {
            return Err(AppError::Forbidden("user is banned".to_string()));
        }

        let staff_login = role_hint == Some("employee");
        let role_mismatch = if staff_login {
            !user.role.is_staff()
        } else {
            role_hint.is_some_and(|hint| user.role.as_str() != hint)
        };
        if role_mismatch {
            if staff_login {
                push_activity(
                    &mut db,
                    NewActivity::new(
                        Scope::Security,
                        EventKind::UnauthorizedStaffLogin,
                        format!(
                            "Unauthorized staff portal login blocked for \"{}\" (registered as {}).",
                            user.username, user.role
                        ),
                    )
                    .actor_role(user.role.as_str())
                    .actor(&user.username)
                    .severity(Severity::Warn),
                );
                self.store.save(&db)?;
            }
            return Err(AppError::Forbidden(format!(
                "this account is registered as {}",
                user.role
            )));
        }

        if user.role == Role::User {
            push_activity(
                &mut db,
                NewActivity::new(
                    Scope::Gamer,
                    EventKind::UserLogin,
                    format!("User \"{}\" logged in.", user.username),
                )
                .actor_role("user")
                .actor(&user.username),
            );
            self.store.save(&db)?;
        }

        Ok(user.to_public())
    }

    pub fn set_user_status(
        &self,
        id: UserId,
        status: UserStatus,
        actor: &str,
        actor_role: &str,
    ) -> Result<PublicUser, AppError> {
        if !is_staff_role(actor_role) {
            return Err(AppError::Forbidden(
                "only employee or manager can change user status".to_string(),
            ));
        }

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let user = db
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        user.status = status;
        let username = user.username.clone();
        let public = user.to_public();

        let severity = match status {
            UserStatus::Banned => Severity::Warn,
            UserStatus::Active => Severity::Info,
        };
        push_activity(
            &mut db,
            NewActivity::new(
                Scope::StaffManagement,
                EventKind::StaffStatusChanged,
                format!("{actor} changed status of \"{username}\" to {status}."),
            )
            .actor_role(actor_role)
            .actor(actor)
            .severity(severity),
        );
        self.store.save(&db)?;
        Ok(public)
    }

    pub fn set_user_role(
        &self,
        id: UserId,
        role: Role,
        actor: &str,
        actor_role: &str,
    ) -> Result<PublicUser, AppError> {
        if !is_staff_role(actor_role) {
            return Err(AppError::Forbidden(
                "only employee or manager can change user roles".to_string(),
            ));
        }

        let _guard = self.store.lock();
        let mut db = self.store.load()?;
        let user = db
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        user.role = role;
        let username = user.username.clone();
        let public = user.to_public();

        push_activity(
            &mut db,
            NewActivity::new(
                Scope::StaffManagement,
                EventKind::StaffRoleChanged,
                format!("{actor} changed role of \"{username}\" to {role}."),
            )
            .actor_role(actor_role)
            .actor(actor),
        );
        self.store.save(&db)?;
        Ok(public)
    }

    pub fn list_users(&self) -> Result<Vec<User>, AppError> {
        let _guard = self.store.lock();
        Ok(self.store.load()?.users)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Store;

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState {
            store: Arc::new(Store::new(dir.path().join("db.json"))),
        };
        (state, dir)
    }

    #[test]
    fn register_and_login() {
        let (state, _dir) = test_state();

        let user = state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");
        assert_eq!(user.username, "nova");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Active);

        let logged_in = state.login("nova", "pw123", None).expect("login");
        assert_eq!(logged_in.id, user.id);
    }

    #[test]
    fn duplicate_username_any_case_conflicts() {
        let (state, _dir) = test_state();

        state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");
        let err = state
            .register_user("Nova", "other@x.io", "pw456", None)
            .expect_err("duplicate");
        assert!(matches!(err, AppError::Conflict(_)));

        let err = state
            .register_user("nova2", "NOVA@X.IO", "pw456", None)
            .expect_err("duplicate email");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn register_clamps_unknown_roles() {
        let (state, _dir) = test_state();

        let user = state
            .register_user("nova", "nova@x.io", "pw123", Some("wizard"))
            .expect("register");
        assert_eq!(user.role, Role::User);

        let staff = state
            .register_user("lin", "lin@x.io", "pw123", Some("employee"))
            .expect("register");
        assert_eq!(staff.role, Role::Employee);
    }

    #[test]
    fn register_requires_all_fields() {
        let (state, _dir) = test_state();
        let err = state
            .register_user("nova", "", "pw123", None)
            .expect_err("missing email");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn login_records_gamer_activity_for_users_only() {
        let (state, _dir) = test_state();
        state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");
        state
            .register_user("boss", "boss@x.io", "pw123", Some("manager"))
            .expect("register");

        state.login("nova", "pw123", None).expect("login");
        state.login("boss", "pw123", None).expect("login");

        let db = state.store.load().expect("load");
        let logins: Vec<_> = db
            .activities
            .iter()
            .filter(|entry| entry.kind == EventKind::UserLogin)
            .collect();
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].actor, "nova");
        assert_eq!(logins[0].scope, Scope::Gamer);
    }

    #[test]
    fn failed_staff_login_is_audited() {
        let (state, _dir) = test_state();
        state.ensure_seed_data().expect("seed");

        let err = state
            .login("admin", "wrong-password", Some("employee"))
            .expect_err("bad credentials");
        assert!(matches!(err, AppError::InvalidCredentials));

        let db = state.store.load().expect("load");
        let entry = db
            .activities
            .iter()
            .find(|entry| entry.kind == EventKind::UnauthorizedStaffLogin)
            .expect("audit entry");
        assert_eq!(entry.scope, Scope::Security);
        assert_eq!(entry.severity, Severity::Warn);
        assert_eq!(entry.actor_role, "manager");
    }

    #[test]
    fn failed_login_for_unknown_staff_username_is_audited_as_unknown() {
        let (state, _dir) = test_state();

        let err = state
            .login("ghost", "nope", Some("employee"))
            .expect_err("bad credentials");
        assert!(matches!(err, AppError::InvalidCredentials));

        let db = state.store.load().expect("load");
        let entry = db
            .activities
            .iter()
            .find(|entry| entry.kind == EventKind::UnauthorizedStaffLogin)
            .expect("audit entry");
        assert_eq!(entry.actor_role, "unknown");
    }

    #[test]
    fn failed_login_without_staff_signals_is_not_audited() {
        let (state, _dir) = test_state();
        state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");

        let err = state.login("nova", "wrong", None).expect_err("bad login");
        assert!(matches!(err, AppError::InvalidCredentials));

        let db = state.store.load().expect("load");
        assert!(db.activities.is_empty());
    }

    #[test]
    fn staff_portal_blocks_plain_users_and_audits() {
        let (state, _dir) = test_state();
        state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");

        let err = state
            .login("nova", "pw123", Some("employee"))
            .expect_err("blocked");
        assert!(matches!(err, AppError::Forbidden(_)));

        let db = state.store.load().expect("load");
        let entry = db
            .activities
            .iter()
            .find(|entry| entry.kind == EventKind::UnauthorizedStaffLogin)
            .expect("audit entry");
        assert_eq!(entry.actor_role, "user");
        assert_eq!(entry.actor, "nova");
    }

    #[test]
    fn managers_may_use_the_staff_portal() {
        let (state, _dir) = test_state();
        state
            .register_user("boss", "boss@x.io", "pw123", Some("manager"))
            .expect("register");

        let user = state
            .login("boss", "pw123", Some("employee"))
            .expect("staff login");
        assert_eq!(user.role, Role::Manager);
    }

    #[test]
    fn non_staff_role_mismatch_rejects_without_audit() {
        let (state, _dir) = test_state();
        state
            .register_user("boss", "boss@x.io", "pw123", Some("manager"))
            .expect("register");

        let err = state
            .login("boss", "pw123", Some("user"))
            .expect_err("mismatch");
        assert!(matches!(err, AppError::Forbidden(_)));

        let db = state.store.load().expect("load");
        assert!(db.activities.is_empty());
    }

    #[test]
    fn banned_users_cannot_login() {
        let (state, _dir) = test_state();
        let user = state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");
        state
            .set_user_status(user.id, UserStatus::Banned, "root", "manager")
            .expect("ban");

        let err = state.login("nova", "pw123", None).expect_err("banned");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn status_change_requires_staff_and_is_audited() {
        let (state, _dir) = test_state();
        let user = state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");

        let err = state
            .set_user_status(user.id, UserStatus::Banned, "nova", "user")
            .expect_err("not staff");
        assert!(matches!(err, AppError::Forbidden(_)));

        state
            .set_user_status(user.id, UserStatus::Banned, "root", "manager")
            .expect("ban");
        let db = state.store.load().expect("load");
        let entry = db
            .activities
            .iter()
            .find(|entry| entry.kind == EventKind::StaffStatusChanged)
            .expect("audit entry");
        assert_eq!(entry.scope, Scope::StaffManagement);
        assert_eq!(entry.severity, Severity::Warn);

        // lifting the ban is routine, not warn-worthy
        state
            .set_user_status(user.id, UserStatus::Active, "root", "manager")
            .expect("unban");
        let db = state.store.load().expect("load");
        let entry = db
            .activities
            .iter()
            .filter(|entry| entry.kind == EventKind::StaffStatusChanged)
            .last()
            .expect("audit entry");
        assert_eq!(entry.severity, Severity::Info);
    }

    #[test]
    fn role_change_requires_staff_and_is_audited() {
        let (state, _dir) = test_state();
        let user = state
            .register_user("nova", "nova@x.io", "pw123", None)
            .expect("register");

        let err = state
            .set_user_role(user.id, Role::Manager, "nova", "user")
            .expect_err("not staff");
        assert!(matches!(err, AppError::Forbidden(_)));

        let updated = state
            .set_user_role(user.id, Role::Employee, "root", "manager")
            .expect("promote");
        assert_eq!(updated.role, Role::Employee);

        let db = state.store.load().expect("load");
        assert!(db
            .activities
            .iter()
            .any(|entry| entry.kind == EventKind::StaffRoleChanged));
    }

    #[test]
    fn seed_is_idempotent() {
        let (state, _dir) = test_state();
        state.ensure_seed_data().expect("seed");
        state.ensure_seed_data().expect("seed again");

        let db = state.store.load().expect("load");
        let admins: Vec<_> = db
            .users
            .iter()
            .filter(|user| user.username == SEED_ADMIN_USERNAME)
            .collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].role, Role::Manager);
    }
}
