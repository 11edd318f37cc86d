use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{entities::account::Account, utils::date_format::wave_datetime_format_option};

/// Something a business sells or buys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Default unit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sold: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_bought: Option<bool>,

    /// Account credited on sale. Only `id` and `url` are returned unless
    /// accounts are embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_account: Option<Account>,

    /// Account debited on purchase. Only `id` and `url` are returned unless
    /// accounts are embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_account: Option<Account>,

    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_created: Option<OffsetDateTime>,

    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<OffsetDateTime>,
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}

/// Response wrapper for listing products
#[derive(Deserialize)]
pub(crate) struct ProductList {
    pub results: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::optional;

    #[test]
    fn null_account_decodes_as_absent() {
        let product: Product = serde_json::from_str(
            r#"{"id":3,"name":"Product","price":13.37,"income_account":null,"expense_account":{"id":27}}"#,
        )
        .unwrap();
        assert_eq!(product.id, Some(3));
        assert_eq!(product.price, Some(13.37));
        assert_eq!(product.income_account, None);
        assert_eq!(product.expense_account.and_then(|a| a.id), Some(27));
    }

    #[test]
    fn zero_values_are_sent() {
        let product = Product {
            name: optional::string(""),
            price: optional::float(0.0),
            is_sold: optional::boolean(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&product).unwrap(),
            r#"{"name":"","price":0.0,"is_sold":false}"#
        );
    }

    #[test]
    fn display() {
        let product = Product {
            name: optional::string("Widgets"),
            ..Default::default()
        };
        assert_eq!(product.to_string(), "Widgets");
    }
}
