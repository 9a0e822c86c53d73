use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Profile gender. Stored as lowercase text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Raw `users` row as returned by Postgres.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub gender: String,
    pub dob: Option<Date>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub profile_image_path: Option<String>,
    pub gallery_images: Vec<String>,
    pub notes: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: Option<String>,
    pub email: String,           // lowercased, trimmed
    pub password_hash: String,   // Argon2 PHC string
    pub gender: Gender,
    pub dob: Option<Date>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub profile_image_path: Option<String>,
    pub gallery_images: Vec<String>,
    pub notes: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            // the column has a CHECK constraint; anything else is legacy data
            gender: r.gender.parse().unwrap_or_default(),
            dob: r.dob,
            location: r.location,
            about: r.about,
            profile_image_path: r.profile_image_path,
            gallery_images: r.gallery_images,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Validated, normalized input for a single insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub gender: Gender,
    pub dob: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gender: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "A".into(),
            username: None,
            email: "a@x.com".into(),
            password_hash: "$argon2id$stub".into(),
            gender: gender.into(),
            dob: None,
            location: None,
            about: None,
            profile_image_path: None,
            gallery_images: vec![],
            notes: vec![],
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("Male".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!(" female ".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("OTHER".parse::<Gender>(), Ok(Gender::Other));
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn gender_defaults_to_other() {
        assert_eq!(Gender::default(), Gender::Other);
    }

    #[test]
    fn row_conversion_keeps_gender_and_falls_back() {
        assert_eq!(User::from(row("female")).gender, Gender::Female);
        assert_eq!(User::from(row("unknown")).gender, Gender::Other);
    }
}
