use serde::{Serialize, Deserialize};

/// identity provider group whose members are shown as admins
pub const ADMIN_GROUP: &str = "Admin-Group";

/// name of the sign up attribute carrying the requested role
pub const ROLE_ATTRIBUTE: &str = "custom:role";

/// advisory label derived from group membership. nothing on the client is
/// gated by it, the gateway makes the real decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn from_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for group in groups {
            if group.as_ref() == ADMIN_GROUP {
                return Role::Admin;
            }
        }

        Role::User
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// role asked for when signing up. an admin request is not activated until
/// someone approves it on the identity provider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedRole {
    User,
    Admin,
}

impl RequestedRole {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            RequestedRole::Admin
        } else {
            RequestedRole::User
        }
    }

    pub fn attribute_value(&self) -> &'static str {
        match self {
            RequestedRole::User => "user",
            RequestedRole::Admin => "admin",
        }
    }
}

/// the groups claim shows up either as a proper list or, when passed through
/// some authorizers, as a single bracketed string like "[A, B]"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupsClaim {
    List(Vec<String>),
    Text(String),
}

impl GroupsClaim {
    pub fn into_groups(self) -> Vec<String> {
        match self {
            GroupsClaim::List(list) => list,
            GroupsClaim::Text(text) => {
                let inner = text.trim()
                    .trim_start_matches('[')
                    .trim_end_matches(']');

                inner.split(',')
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_owned())
                    .collect()
            }
        }
    }
}
