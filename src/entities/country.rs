use std::fmt;

use serde::{Deserialize, Serialize};

/// A subdivision of a country.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Province {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}

/// A country, identified by its ISO 3166-1 alpha-2 code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// Only populated when fetching a single country
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provinces: Vec<Province>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name.as_deref().unwrap_or_default(),
            self.country_code.as_deref().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTRY_JSON: &str = r#"{"name":"Canada","country_code":"CA","currency_code":"CAD","provinces":[{"name":"Ontario","slug":"ontario"}],"url":"url"}"#;

    #[test]
    fn encodes_to_the_same_json() {
        let country = Country {
            name: Some("Canada".into()),
            country_code: Some("CA".into()),
            currency_code: Some("CAD".into()),
            provinces: vec![Province {
                name: Some("Ontario".into()),
                slug: Some("ontario".into()),
            }],
            url: Some("url".into()),
        };
        assert_eq!(serde_json::to_string(&country).unwrap(), COUNTRY_JSON);
        assert_eq!(serde_json::from_str::<Country>(COUNTRY_JSON).unwrap(), country);
    }

    #[test]
    fn display() {
        let country: Country = serde_json::from_str(COUNTRY_JSON).unwrap();
        assert_eq!(country.to_string(), "Canada (CA)");
        assert_eq!(country.provinces[0].to_string(), "Ontario");
        assert_eq!(Province::default().to_string(), "");
    }
}
