use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use oauth2::Scope as OAuth2Scope;

/// A set of Wave OAuth 2 scopes, written space-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    scopes: Vec<OAuth2Scope>,
}

impl Scope {
    /// The `basic` scope, enough to read the user and their businesses.
    #[must_use]
    pub fn basic() -> Self {
        Self::from_string("basic")
    }

    /// Parses a space-separated scope list such as `"basic user.read"`.
    #[must_use]
    pub fn from_string(scope: &str) -> Self {
        Self {
            scopes: scope.split_whitespace().map(|s| OAuth2Scope::new(s.to_string())).collect(),
        }
    }

    #[must_use]
    pub fn add(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(OAuth2Scope::new(scope.into()));
        self
    }

    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        self.scopes.extend(other.scopes);
        self
    }

    #[must_use]
    pub fn into_oauth2_scopes(self) -> Vec<OAuth2Scope> {
        self.scopes
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::basic()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scopes: Vec<&str> = self.scopes.iter().map(|s| s.as_str()).collect();
        f.write_str(&scopes.join(" "))
    }
}

impl FromStr for Scope {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

impl From<&str> for Scope {
    fn from(scope: &str) -> Self {
        Self::from_string(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        let scope = Scope::from_string("basic  user.read\tbusiness.read");
        assert_eq!(scope.clone().into_oauth2_scopes().len(), 3);
        assert_eq!(scope.to_string(), "basic user.read business.read");
    }

    #[test]
    fn builds_up_scopes() {
        let scope = Scope::basic().add("user.write").combine("product.read".into());
        assert_eq!(scope.to_string(), "basic user.write product.read");
        assert_eq!(Scope::default(), Scope::basic());
    }
}
