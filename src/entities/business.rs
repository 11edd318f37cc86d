use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    entities::country::{Country, Province},
    utils::date_format::wave_datetime_format_option,
};

/// A Wave business.
///
/// Address fields are stored flat on the business rather than in an
/// [`Address`](crate::Address).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Business {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// ISO 4217 code of the currency the books are kept in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_subtype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizational_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<Province>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toll_free_phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_personal_business: Option<bool>,
    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_created: Option<OffsetDateTime>,
    #[serde(with = "wave_datetime_format_option", skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<OffsetDateTime>,
}

impl fmt::Display for Business {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id={}, personal={})",
            self.company_name.as_deref().unwrap_or_default(),
            self.id.as_deref().unwrap_or_default(),
            self.is_personal_business.unwrap_or_default()
        )
    }
}
