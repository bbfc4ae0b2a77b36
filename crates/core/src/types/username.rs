//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::Email;

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input is empty after trimming.
    #[error("username cannot be empty")]
    Empty,
    /// The input is shorter than the minimum.
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input is longer than the maximum.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9._@+-]`.
    #[error("username contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A login name, unique per user.
///
/// Stored lowercase so that uniqueness is case-insensitive. Most email
/// addresses are valid usernames; registration falls back to the email when
/// no username is given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length in characters, wide enough for any [`Email`].
    pub const MAX_LENGTH: usize = Email::MAX_LENGTH;

    /// Parse and normalize a `Username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, outside the length
    /// bounds, or contains characters other than ASCII letters, digits and
    /// `. _ @ + -`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim().to_lowercase();

        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        let len = s.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '+' | '-')))
        {
            return Err(UsernameError::InvalidCharacter(bad));
        }

        Ok(Self(s))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&Email> for Username {
    type Error = UsernameError;

    fn try_from(email: &Email) -> Result<Self, Self::Error> {
        Self::parse(email.as_str())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Username {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Username {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases_and_trims() {
        let name = Username::parse("  Ana_Lopez ").unwrap();
        assert_eq!(name.as_str(), "ana_lopez");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Username::parse("  "), Err(UsernameError::Empty));
        assert_eq!(Username::parse("ab"), Err(UsernameError::TooShort { min: 3 }));
        assert!(matches!(
            Username::parse(&"a".repeat(255)),
            Err(UsernameError::TooLong { .. })
        ));
        assert_eq!(
            Username::parse("ana lopez"),
            Err(UsernameError::InvalidCharacter(' '))
        );
        assert_eq!(
            Username::parse("ana/lopez"),
            Err(UsernameError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_try_from_email() {
        let email = Email::parse("Ana.Lopez+compras@example.com").unwrap();
        let username = Username::try_from(&email).unwrap();
        assert_eq!(username.as_str(), "ana.lopez+compras@example.com");

        let odd = Email::parse("o'brien@example.com").unwrap();
        assert_eq!(
            Username::try_from(&odd),
            Err(UsernameError::InvalidCharacter('\''))
        );
    }
}
