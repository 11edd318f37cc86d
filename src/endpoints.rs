use std::fmt;
use url::Url;

use crate::error::{Error, Result};

pub const BASE_URL: &str = "https://api.waveapps.com/";

/// A typed representation of Wave API endpoints.
///
/// Identifiers are interpolated into the path as given. Paths are relative
/// (no leading `/`) and are resolved against the client's base URL with
/// [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveEndpoint {
    Businesses,
    Business(String),
    Accounts(String),
    Account(String, u64),
    Customers(String),
    Customer(String, u64),
    Products(String),
    Product(String, u64),
    Currencies,
    Currency(String),
    Countries,
    Country(String),
    Provinces(String),
    User,
}

impl WaveEndpoint {
    /// The path of this endpoint relative to the API base URL.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Businesses => "businesses".to_string(),
            Self::Business(id) => format!("businesses/{id}"),
            Self::Accounts(business_id) => format!("businesses/{business_id}/accounts"),
            Self::Account(business_id, id) => format!("businesses/{business_id}/accounts/{id}"),
            Self::Customers(business_id) => format!("businesses/{business_id}/customers"),
            Self::Customer(business_id, id) => format!("businesses/{business_id}/customers/{id}"),
            Self::Products(business_id) => format!("businesses/{business_id}/products"),
            Self::Product(business_id, id) => format!("businesses/{business_id}/products/{id}"),
            Self::Currencies => "currencies".to_string(),
            Self::Currency(code) => format!("currencies/{code}"),
            Self::Countries => "countries".to_string(),
            Self::Country(code) => format!("countries/{code}"),
            Self::Provinces(code) => format!("countries/{code}/provinces"),
            Self::User => "user".to_string(),
        }
    }

    /// Resolves the endpoint against `base`.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        resolve(base, &self.path())
    }
}

impl fmt::Display for WaveEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Resolves a relative reference against `base`.
///
/// The reference must be syntactically valid on its own: every `%` has to
/// start a two-digit hex escape and control characters are not allowed.
/// Anything else is rejected here, before a request is built.
pub fn resolve(base: &Url, path: &str) -> Result<Url> {
    validate_reference(path)?;
    base.join(path).map_err(|e| Error::invalid_endpoint(path, e))
}

fn validate_reference(path: &str) -> Result<()> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = bytes.get(i + 1..i + 3);
                if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
                    let end = (i + 3).min(bytes.len());
                    return Err(Error::invalid_endpoint(
                        path,
                        format!("invalid URL escape {:?}", String::from_utf8_lossy(&bytes[i..end])),
                    ));
                }
                i += 3;
            }
            b if b < 0x20 || b == 0x7f => {
                return Err(Error::invalid_endpoint(path, "invalid control character in URL"));
            }
            _ => i += 1,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(BASE_URL).unwrap()
    }

    #[test]
    fn builds_nested_paths() {
        assert_eq!(WaveEndpoint::Businesses.path(), "businesses");
        assert_eq!(WaveEndpoint::Account("b1".into(), 7).path(), "businesses/b1/accounts/7");
        assert_eq!(WaveEndpoint::Provinces("CA".into()).path(), "countries/CA/provinces");
        assert_eq!(WaveEndpoint::User.path(), "user");
    }

    #[test]
    fn resolves_against_base() {
        let url = WaveEndpoint::Currency("CAD".into()).to_url(&base()).unwrap();
        assert_eq!(url.as_str(), "https://api.waveapps.com/currencies/CAD");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let base = Url::parse("http://localhost:8080/api/v1/").unwrap();
        let url = resolve(&base, "businesses/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/businesses/1");
    }

    #[test]
    fn accepts_valid_escapes() {
        let url = resolve(&base(), "businesses/a%20b").unwrap();
        assert_eq!(url.path(), "/businesses/a%20b");
    }

    #[test]
    fn rejects_bare_percent() {
        for path in ["businesses/%", "businesses/%/accounts", "%gh&%ij", "currencies/%4"] {
            let err = resolve(&base(), path).unwrap_err();
            assert!(matches!(err, Error::InvalidEndpoint { .. }), "{path}: {err:?}");
        }
    }

    #[test]
    fn rejects_control_characters() {
        let err = resolve(&base(), "businesses/a\nb").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
    }
}
