use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{entities::currency::Currency, utils::date_format::wave_datetime_format_option};

/// An account in a business's chart of accounts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Account type, such as `asset` or `expense`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,

    /// Account class, such as `bank` or `expense` (read-only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_class: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_account_number: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_template_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<i64>,

    /// Whether payments can be recorded against this account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_payment: Option<bool>,

    /// Whether the API will accept a delete for this account (read-only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_delete: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_currency_editable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_name_editable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_payment_editable: Option<bool>,

    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_created: Option<OffsetDateTime>,

    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<OffsetDateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (type={}, payment={})",
            self.name.as_deref().unwrap_or_default(),
            self.account_type.as_deref().unwrap_or_default(),
            self.is_payment.unwrap_or_default()
        )
    }
}
