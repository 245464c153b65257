//! Set of usernames permitted past the gate

use std::collections::HashSet;

/// Immutable membership set built once from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    users: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list, ignoring blanks and surrounding spaces
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim).filter(|u| !u.is_empty()))
    }

    pub fn contains(&self, user: &str) -> bool {
        self.users.contains(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
