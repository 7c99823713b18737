//! Typed builder for User.

use crate::model::User;

/// [`User`] builder. `id` and `email` are required.
#[derive(Debug, Clone)]
pub struct UserBuilder<Id, Email> {
    id: Id,
    email: Email,
    full_name: String,
    password: String,
}

/// Value is missing on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Missing;

/// Value is present on [`UserBuilder`].
#[derive(Debug, Clone)]
pub struct Present<T>(pub T);

impl UserBuilder<Missing, Missing> {
    /// Create a new [`UserBuilder`].
    pub fn new() -> Self {
        Self {
            id: Missing,
            email: Missing,
            full_name: String::default(),
            password: String::default(),
        }
    }
}

impl Default for UserBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Email> UserBuilder<Missing, Email> {
    /// Update `id` field on [`UserBuilder`].
    pub fn id(self, id: impl Into<String>) -> UserBuilder<Present<String>, Email> {
        UserBuilder {
            id: Present(id.into()),
            email: self.email,
            full_name: self.full_name,
            password: self.password,
        }
    }
}

impl<Id> UserBuilder<Id, Missing> {
    /// Update `email` field on [`UserBuilder`].
    pub fn email(self, email: impl Into<String>) -> UserBuilder<Id, Present<String>> {
        UserBuilder {
            id: self.id,
            email: Present(email.into()),
            full_name: self.full_name,
            password: self.password,
        }
    }
}

impl<Id, Email> UserBuilder<Id, Email> {
    /// Update `full_name` field on [`UserBuilder`].
    pub fn full_name(mut self, full_name: impl ToString) -> Self {
        self.full_name = full_name.to_string();
        self
    }

    /// Update `password` field on [`UserBuilder`].
    pub fn password(mut self, password: impl ToString) -> Self {
        self.password = password.to_string();
        self
    }
}

impl UserBuilder<Present<String>, Present<String>> {
    /// Build a fresh [`User`] with no subscription nor enrollment.
    pub fn build(self) -> User {
        User {
            id: self.id.0,
            email: self.email.0,
            full_name: self.full_name,
            password: self.password,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_user() {
        let user = UserBuilder::new()
            .email("ada@example.com")
            .full_name("Ada Lovelace")
            .id("ada42")
            .build();

        assert_eq!(user.id, "ada42");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.full_name, "Ada Lovelace");
        assert!(user.enrolled_courses.is_empty());
        assert!(user.last_updated.is_none());
    }
}
