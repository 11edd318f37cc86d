use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    entities::customer::join_names,
    utils::date_format::{wave_date_format_option, wave_datetime_format_option},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEmail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(with = "wave_date_format_option", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Date>,
}

/// A business the user has access to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The user the access token belongs to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_created: Option<OffsetDateTime>,
    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<OffsetDateTime>,
    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<UserEmail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub businesses: Vec<BusinessReference>,
}

impl User {
    /// `"First Last"`, or whichever of the two is set.
    #[must_use]
    pub fn full_name(&self) -> String {
        join_names(self.first_name.as_deref(), self.last_name.as_deref()).unwrap_or_default()
    }

    /// The address marked as default, if any.
    #[must_use]
    pub fn default_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.is_default == Some(true))
            .and_then(|e| e.email.as_deref())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    const USER_JSON: &str = r#"{
        "id": "9c9956e5-e995-4779-97ac-3d220b56152e",
        "url": "https://api.example.com/user/",
        "first_name": "Jane",
        "last_name": "Smith",
        "emails": [{"email": "jane@example.com", "is_verified": false, "is_default": true}],
        "profile": {"date_of_birth": "1981-02-17"},
        "businesses": [
            {"id": "c2731e5c-5001-4fe3-87ae-477f9a48dfcc", "url": "https://api.example.com/businesses/c2731e5c-5001-4fe3-87ae-477f9a48dfcc/"},
            {"id": "f99948d3-a16e-4082-8f3c-824f8cba6377", "url": "https://api.example.com/businesses/f99948d3-a16e-4082-8f3c-824f8cba6377/"}
        ],
        "date_created": "2013-11-28T15:58:02+00:00",
        "date_modified": "2013-11-28T15:58:02+00:00",
        "last_login": "2013-11-28T15:58:03+00:00"
    }"#;

    #[test]
    fn decodes_every_field() {
        let user: User = serde_json::from_str(USER_JSON).unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Jane"));
        assert_eq!(user.last_name.as_deref(), Some("Smith"));
        assert_eq!(user.default_email(), Some("jane@example.com"));
        assert_eq!(user.profile.as_ref().and_then(|p| p.date_of_birth), Some(date!(1981-02-17)));
        assert_eq!(user.businesses.len(), 2);
        assert_eq!(user.last_login, Some(datetime!(2013-11-28 15:58:03 UTC)));

        let expected: serde_json::Value = serde_json::from_str(USER_JSON).unwrap();
        assert_eq!(serde_json::to_value(&user).unwrap(), expected);
    }

    fn named(first: Option<&str>, last: Option<&str>) -> User {
        User {
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn full_name() {
        assert_eq!(named(None, Some("Bar")).full_name(), "Bar");
        assert_eq!(named(Some("Foo"), None).full_name(), "Foo");
        assert_eq!(named(Some("Foo"), Some("Bar")).full_name(), "Foo Bar");
        assert_eq!(named(Some("Foo"), Some("Bar")).to_string(), "Foo Bar");
        assert_eq!(named(None, None).to_string(), "");
    }
}
