//! Query options accepted by list and get operations.
//!
//! Unset fields add nothing to the URL. Set fields are appended in
//! alphabetical order of their query key.

use url::Url;

fn append_query(url: &mut Url, pairs: &[(&str, Option<String>)]) {
    let mut present = pairs.iter().filter_map(|(key, value)| value.as_ref().map(|v| (*key, v))).peekable();
    if present.peek().is_none() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in present {
        query.append_pair(key, value);
    }
}

/// Paging for businesses and customers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ListOptions {
    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn apply_to_url(&self, url: &mut Url) {
        append_query(
            url,
            &[
                ("page", self.page.map(|v| v.to_string())),
                ("page_size", self.page_size.map(|v| v.to_string())),
            ],
        );
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProductListOptions {
    /// Only return products that are not archived.
    pub active_only: Option<bool>,
    /// Expand `income_account` and `expense_account` into full records.
    pub embed_accounts: Option<bool>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ProductListOptions {
    #[must_use]
    pub fn active_only(mut self, active_only: bool) -> Self {
        self.active_only = Some(active_only);
        self
    }

    #[must_use]
    pub fn embed_accounts(mut self, embed_accounts: bool) -> Self {
        self.embed_accounts = Some(embed_accounts);
        self
    }

    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn apply_to_url(&self, url: &mut Url) {
        append_query(
            url,
            &[
                ("active_only", self.active_only.map(|v| v.to_string())),
                ("embed_accounts", self.embed_accounts.map(|v| v.to_string())),
                ("page", self.page.map(|v| v.to_string())),
                ("page_size", self.page_size.map(|v| v.to_string())),
            ],
        );
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProductGetOptions {
    pub embed_accounts: Option<bool>,
}

impl ProductGetOptions {
    #[must_use]
    pub fn embed_accounts(mut self, embed_accounts: bool) -> Self {
        self.embed_accounts = Some(embed_accounts);
        self
    }

    pub fn apply_to_url(&self, url: &mut Url) {
        append_query(url, &[("embed_accounts", self.embed_accounts.map(|v| v.to_string()))]);
    }
}
