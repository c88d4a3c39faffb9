use serde::{Deserialize, Serialize};

string_id!(
    /// Identifier issued by the auth provider.
    UserId
);

/// The two actors of the platform. Fixed at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Applicant,
    Hr,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Hr => "hr",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Applicant => "Applicant",
            Role::Hr => "HR Manager",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "applicant" => Ok(Role::Applicant),
            "hr" => Ok(Role::Hr),
            other => Err(format!("unknown role '{other}' (expected 'applicant' or 'hr')")),
        }
    }
}

/// An authenticated identity.
///
/// The role has no setter: a user keeps the role chosen at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserPayload")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    role: Role,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_hr(&self) -> bool {
        self.role == Role::Hr
    }

    /// Name for greetings; falls back to the email local part.
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            return &self.name;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Accepts both the flat persisted shape and the auth provider's
/// `{ id, email, user_metadata: { name, role } }` shape.
#[derive(Deserialize)]
struct UserPayload {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<Role>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        let metadata = payload.user_metadata.unwrap_or_default();
        User {
            id: payload.id,
            email: payload.email.unwrap_or_default(),
            name: payload.name.or(metadata.name).unwrap_or_default(),
            role: payload.role.or(metadata.role).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_shape_round_trips() {
        let user = User::new(UserId::new("u-1"), "ada@example.com", "Ada", Role::Hr);
        let text = serde_json::to_string(&user).unwrap();
        let restored: User = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn test_metadata_shape_is_accepted() {
        let user: User = serde_json::from_value(json!({
            "id": "u-2",
            "email": "grace@example.com",
            "user_metadata": { "name": "Grace", "role": "hr" }
        }))
        .unwrap();
        assert_eq!(user.name, "Grace");
        assert!(user.is_hr());
    }

    #[test]
    fn test_missing_role_defaults_to_applicant() {
        let user: User = serde_json::from_value(json!({ "id": "u-3" })).unwrap();
        assert_eq!(user.role(), Role::Applicant);
        assert_eq!(user.email, "");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = User::new(UserId::new("u-4"), "linus@example.com", " ", Role::Applicant);
        assert_eq!(user.display_name(), "linus");
    }

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert!("admin".parse::<Role>().is_err());
    }
}
