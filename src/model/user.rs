//! Requesting user as supplied by the upstream authentication layer.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Anything other than exactly `admin` is an ordinary user.
    pub fn parse(s: &str) -> Role {
        if s.trim() == "admin" {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of the resource, or an admin.
    pub fn may_modify(&self, owner: &str) -> bool {
        self.is_admin() || self.id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owner_or_admin_may_modify() {
        let alice = User { id: "alice".into(), role: Role::User };
        let root = User { id: "root".into(), role: Role::parse("admin") };
        assert!(alice.may_modify("alice"));
        assert!(!alice.may_modify("bob"));
        assert!(root.may_modify("bob"));
    }

    #[test]
    fn only_the_exact_admin_role_is_admin() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("Admin"), Role::User);
        assert_eq!(Role::parse("ADMIN"), Role::User);
        assert_eq!(Role::parse("superuser"), Role::User);
    }
}
