use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::{Error, Result};

/// The cursor fields of a paginated list body.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct PageEnvelope {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_count: u64,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Page numbers derived from a list response's cursors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u64,
    /// Page number of the `next` cursor, or 0 if there is none.
    pub next_page: u64,
    /// Page number of the `previous` cursor, or 0 if there is none.
    pub previous_page: u64,
    pub total_count: u64,
}

impl Pagination {
    /// Derives page numbers from `envelope`.
    ///
    /// Cursors are resolved against `request_url`, so both absolute and
    /// relative cursors are accepted. A cursor without a numeric `page`
    /// query parameter counts as page 0.
    ///
    /// When both cursors are present the page after `previous` is taken as
    /// the current page.
    pub fn from_envelope(envelope: &PageEnvelope, request_url: &Url) -> Result<Self> {
        let next = envelope
            .next
            .as_deref()
            .map(|cursor| cursor_page(cursor, request_url))
            .transpose()?;
        let previous = envelope
            .previous
            .as_deref()
            .map(|cursor| cursor_page(cursor, request_url))
            .transpose()?;

        let current_page = match (previous, next) {
            (None, None) => 1,
            (Some(previous), None) => previous.saturating_add(1),
            (None, Some(next)) => next.saturating_sub(1),
            (Some(previous), Some(next)) => {
                let current = previous.saturating_add(1);
                if next.checked_sub(1) != Some(current) {
                    warn!(previous, next, "pagination cursors disagree; using previous + 1");
                }
                current
            }
        };

        Ok(Self {
            current_page,
            next_page: next.unwrap_or_default(),
            previous_page: previous.unwrap_or_default(),
            total_count: envelope.total_count,
        })
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next_page > 0
    }
}

fn cursor_page(cursor: &str, request_url: &Url) -> Result<u64> {
    let url = request_url.join(cursor).map_err(|source| Error::InvalidCursor {
        cursor: cursor.to_string(),
        source,
    })?;

    Ok(url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_url() -> Url {
        Url::parse("https://api.waveapps.com/businesses/1/products").unwrap()
    }

    fn envelope(next: Option<&str>, previous: Option<&str>) -> PageEnvelope {
        PageEnvelope {
            next: next.map(String::from),
            previous: previous.map(String::from),
            total_count: 13,
        }
    }

    #[test]
    fn single_page() {
        let pagination = Pagination::from_envelope(&envelope(None, None), &request_url()).unwrap();
        assert_eq!(
            pagination,
            Pagination {
                current_page: 1,
                next_page: 0,
                previous_page: 0,
                total_count: 13,
            }
        );
        assert!(!pagination.has_next());
    }

    #[test]
    fn last_page() {
        let pagination = Pagination::from_envelope(
            &envelope(None, Some("https://api.waveapps.com/businesses/1/products?page=3")),
            &request_url(),
        )
        .unwrap();
        assert_eq!(pagination.previous_page, 3);
        assert_eq!(pagination.current_page, 4);
    }

    #[test]
    fn first_page() {
        let pagination = Pagination::from_envelope(
            &envelope(Some("https://api.waveapps.com/businesses/1/products?page=2"), None),
            &request_url(),
        )
        .unwrap();
        assert_eq!(pagination.next_page, 2);
        assert_eq!(pagination.current_page, 1);
        assert!(pagination.has_next());
    }

    #[test]
    fn middle_page_uses_previous_cursor() {
        let pagination = Pagination::from_envelope(
            &envelope(Some("/businesses/1/products?page=4"), Some("/businesses/1/products?page=2")),
            &request_url(),
        )
        .unwrap();
        assert_eq!(pagination.current_page, 3);
        assert_eq!(pagination.next_page, 4);
        assert_eq!(pagination.previous_page, 2);
    }

    #[test]
    fn disagreeing_cursors_prefer_previous() {
        let pagination =
            Pagination::from_envelope(&envelope(Some("?page=9"), Some("?page=2")), &request_url()).unwrap();
        assert_eq!(pagination.current_page, 3);
    }

    #[test]
    fn missing_or_non_numeric_page_is_zero() {
        let pagination = Pagination::from_envelope(
            &envelope(Some("?page=abc"), Some("/businesses/1/products")),
            &request_url(),
        )
        .unwrap();
        assert_eq!(pagination.next_page, 0);
        assert_eq!(pagination.previous_page, 0);
        assert_eq!(pagination.current_page, 1);
    }

    #[test]
    fn unparseable_cursor_is_an_error() {
        let err = Pagination::from_envelope(&envelope(Some("http://[::1"), None), &request_url()).unwrap_err();
        assert!(matches!(err, Error::InvalidCursor { .. }));
    }

    #[test]
    fn decodes_envelope_with_nulls() {
        let envelope: PageEnvelope =
            serde_json::from_str(r#"{"next":null,"previous":null,"results":[]}"#).unwrap();
        assert_eq!(envelope, PageEnvelope::default());
    }

    #[test]
    fn null_total_count_is_zero() {
        let envelope: PageEnvelope =
            serde_json::from_str(r#"{"next":null,"previous":null,"total_count":null,"results":[]}"#).unwrap();
        assert_eq!(envelope.total_count, 0);

        let envelope: PageEnvelope = serde_json::from_str(r#"{"total_count":7}"#).unwrap();
        assert_eq!(envelope.total_count, 7);
    }

    #[test]
    fn huge_previous_page_saturates() {
        let last = "?page=18446744073709551615";
        let pagination = Pagination::from_envelope(&envelope(None, Some(last)), &request_url()).unwrap();
        assert_eq!(pagination.previous_page, u64::MAX);
        assert_eq!(pagination.current_page, u64::MAX);

        let pagination = Pagination::from_envelope(&envelope(Some(last), Some(last)), &request_url()).unwrap();
        assert_eq!(pagination.current_page, u64::MAX);
    }
}
