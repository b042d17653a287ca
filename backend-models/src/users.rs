use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Access level; the backend sends it as a number or a numeric string.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub level: Option<i64>,
}

/// `PUT /users/{id}`. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.level.is_none()
    }
}

/// A single user, bare or wrapped in `{ "user": ... }` / `{ "data": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserEnvelope {
    Wrapped { user: User },
    Data { data: User },
    Bare(User),
}

impl UserEnvelope {
    pub fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Data { data: user } | Self::Bare(user) => user,
        }
    }
}

/// A user list, bare or wrapped in `{ "users": [...] }` / `{ "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UsersEnvelope {
    Wrapped { users: Vec<User> },
    Data { data: Vec<User> },
    Bare(Vec<User>),
}

impl UsersEnvelope {
    pub fn into_users(self) -> Vec<User> {
        match self {
            Self::Wrapped { users } | Self::Data { data: users } | Self::Bare(users) => users,
        }
    }
}

/// Error body of a non-success response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    /// Validation errors per field.
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiErrorBody {
    /// The message plus the first validation error, if any.
    pub fn summary(&self) -> Option<String> {
        let detail = self
            .errors
            .iter()
            .find_map(|(field, messages)| messages.first().map(|m| format!("{field}: {m}")));
        match (&self.message, detail) {
            (Some(message), Some(detail)) => Some(format!("{message} ({detail})")),
            (Some(message), None) => Some(message.clone()),
            (None, detail) => detail,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn envelopes_accept_every_shape() {
        let user = r#"{ "id": 1, "name": "Ana", "email": "ana@example.com", "level": "2" }"#;
        for body in [
            user.to_string(),
            format!(r#"{{ "user": {user} }}"#),
            format!(r#"{{ "data": {user} }}"#),
        ] {
            let parsed: UserEnvelope = serde_json::from_str(&body).unwrap();
            assert_eq!(parsed.into_user().level, Some(2));
        }

        let list: UsersEnvelope =
            serde_json::from_str(&format!(r#"{{ "data": [{user}] }}"#)).unwrap();
        assert_eq!(list.into_users().len(), 1);
    }

    #[test]
    fn error_summary_includes_first_validation_error() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{ "message": "The given data was invalid.", "errors": { "email": ["taken"] } }"#,
        )
        .unwrap();
        assert_eq!(
            body.summary().as_deref(),
            Some("The given data was invalid. (email: taken)")
        );
        assert_eq!(ApiErrorBody::default().summary(), None);
    }

    #[test]
    fn empty_update_serializes_to_an_empty_object() {
        let update = UserUpdate::default();
        assert!(update.is_empty());
        assert_eq!(serde_json::to_string(&update).unwrap(), "{}");
    }
}
