use std::ops::Deref;

use reqwest::{
    Method, Request,
    header::{ACCEPT, CONTENT_TYPE, HeaderValue, USER_AGENT},
};
use serde::{
    Serialize,
    de::{DeserializeOwned, IgnoredAny},
};
use url::Url;

use crate::endpoints::{self, BASE_URL, WaveEndpoint};
use crate::entities::{
    account::Account,
    business::Business,
    country::{Country, Province},
    currency::Currency,
    customer::Customer,
    product::{Product, ProductList},
    user::User,
};
use crate::error::{Error, ErrorResponse, Result};
use crate::options::{ListOptions, ProductGetOptions, ProductListOptions};
use crate::pagination::{PageEnvelope, Pagination};
use crate::transport::{HttpResponse, Transport};

const APPLICATION_JSON: &str = "application/json";
const NO_BODY: Option<&()> = None;

fn default_user_agent() -> String {
    format!(
        "wave-rs/{} (Rust; {}/{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// How [`Client::send`] treats a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
    /// Decode the body into the target type.
    Body,
    /// Decode the body, then read its pagination cursors.
    Paginated,
    /// Leave the body alone. Used for deletes.
    None,
}

/// A successful API response.
///
/// Derefs to the buffered [`HttpResponse`], so the status, headers and raw
/// body stay available after decoding.
#[derive(Debug, Clone)]
pub struct Response {
    raw: HttpResponse,
    pagination: Option<Pagination>,
}

impl Response {
    /// Page numbers, for paginated list calls.
    #[must_use]
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    #[must_use]
    pub fn into_inner(self) -> HttpResponse {
        self.raw
    }
}

impl Deref for Response {
    type Target = HttpResponse;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// The client used to talk to the Wave API.
///
/// It holds no credentials itself: requests are authenticated by the
/// [`Transport`] it sends them through.
#[derive(Debug, Clone)]
pub struct Client<T: Transport = reqwest::Client> {
    base_url: Url,
    user_agent: String,
    transport: T,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl Client {
    /// Creates a client that sends `access_token` as a bearer token.
    pub fn with_access_token(access_token: &str) -> Result<Self> {
        Ok(Self::new(crate::oauth::authorized_http_client(access_token)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            base_url: Url::parse(BASE_URL).unwrap_or_else(|_| unreachable!("BASE_URL is a valid URL")),
            user_agent: default_user_agent(),
            transport,
        }
    }

    /// Points the client at another API root.
    ///
    /// A trailing `/` is added to the path if missing, so relative resource
    /// paths resolve beneath it.
    #[must_use]
    pub fn with_base_url(mut self, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Builds a request for `path`, resolved against the base URL.
    ///
    /// `path` must be relative, without a leading `/`. A `body`, if given, is
    /// encoded as JSON.
    pub fn new_request<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request> {
        let url = endpoints::resolve(&self.base_url, path)?;

        let mut request = Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

        if let Some(body) = body {
            let json = serde_json::to_vec(body).map_err(Error::Serialization)?;
            trace!(body = %String::from_utf8_lossy(&json), "encoded request body");
            *request.body_mut() = Some(json.into());
        }

        Ok(request)
    }

    fn endpoint_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &WaveEndpoint,
        body: Option<&B>,
    ) -> Result<Request> {
        self.new_request(method, &endpoint.path(), body)
    }

    /// Sends `request` and decodes the response as `decode` asks.
    ///
    /// Non-2xx responses become [`Error::Api`]. The body is decoded first and
    /// the pagination cursors second; a failure at either step fails the call.
    pub async fn send<R: DeserializeOwned>(&self, request: Request, decode: Decode) -> Result<(Option<R>, Response)> {
        let raw = self.round_trip(request).await?;
        let (value, pagination) = match decode {
            Decode::None => (None, None),
            Decode::Body => (Some(decode_body(&raw)?), None),
            Decode::Paginated => {
                let value = decode_body(&raw)?;
                (Some(value), Some(decode_pagination(&raw)?))
            }
        };
        Ok((value, Response { raw, pagination }))
    }

    pub(crate) async fn fetch<R: DeserializeOwned>(&self, request: Request) -> Result<(R, Response)> {
        let (Some(value), response) = self.send(request, Decode::Body).await? else {
            unreachable!("Decode::Body always yields a value")
        };
        Ok((value, response))
    }

    pub(crate) async fn fetch_page<R: DeserializeOwned>(&self, request: Request) -> Result<(R, Response)> {
        let (Some(value), response) = self.send(request, Decode::Paginated).await? else {
            unreachable!("Decode::Paginated always yields a value")
        };
        debug!(pagination = ?response.pagination(), "decoded pagination");
        Ok((value, response))
    }

    pub(crate) async fn execute(&self, request: Request) -> Result<Response> {
        let (_, response) = self.send::<IgnoredAny>(request, Decode::None).await?;
        Ok(response)
    }

    async fn round_trip(&self, request: Request) -> Result<HttpResponse> {
        trace!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.transport.execute(request).await?;

        debug!(
            method = %response.method(),
            url = %response.url(),
            status = %response.status(),
            bytes = response.body().len(),
            "received response"
        );

        if !response.is_success() {
            let error = ErrorResponse::from_response(response);
            error!(%error, "API returned an error");
            return Err(error.into());
        }

        trace!("Response text:\n{}", response.text().unwrap_or_default());
        Ok(response)
    }

    /// Access the accounts API
    #[must_use]
    pub fn accounts(&self) -> AccountsApi<'_, T> {
        AccountsApi { client: self }
    }

    /// Access the businesses API
    #[must_use]
    pub fn businesses(&self) -> BusinessesApi<'_, T> {
        BusinessesApi { client: self }
    }

    /// Access the countries API
    #[must_use]
    pub fn countries(&self) -> CountriesApi<'_, T> {
        CountriesApi { client: self }
    }

    /// Access the currencies API
    #[must_use]
    pub fn currencies(&self) -> CurrenciesApi<'_, T> {
        CurrenciesApi { client: self }
    }

    /// Access the customers API
    #[must_use]
    pub fn customers(&self) -> CustomersApi<'_, T> {
        CustomersApi { client: self }
    }

    /// Access the products API
    #[must_use]
    pub fn products(&self) -> ProductsApi<'_, T> {
        ProductsApi { client: self }
    }

    /// Access the user API
    #[must_use]
    pub fn users(&self) -> UsersApi<'_, T> {
        UsersApi { client: self }
    }
}

fn decode_body<R: DeserializeOwned>(response: &HttpResponse) -> Result<R> {
    response.json().map_err(|e| {
        let text = response.text().map(String::from);
        error!(
            "Deserialization error: {}, near position: {} - response text around that position: {}",
            e,
            e.column(),
            text.as_deref()
                .unwrap_or_default()
                .chars()
                .skip(e.column().saturating_sub(30))
                .take(100)
                .collect::<String>()
        );
        Error::DeserializationError(e, text)
    })
}

fn decode_pagination(response: &HttpResponse) -> Result<Pagination> {
    let envelope: PageEnvelope = decode_body(response)?;
    Pagination::from_envelope(&envelope, response.url())
}

/// API handler for Accounts endpoints
#[derive(Debug)]
pub struct AccountsApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> AccountsApi<'_, T> {
    /// List the chart of accounts of a business.
    #[instrument(skip(self))]
    pub async fn list(&self, business_id: &str) -> Result<(Vec<Account>, Response)> {
        let endpoint = WaveEndpoint::Accounts(business_id.to_string());
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, business_id: &str, account_id: u64) -> Result<(Account, Response)> {
        let endpoint = WaveEndpoint::Account(business_id.to_string(), account_id);
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, account))]
    pub async fn create(&self, business_id: &str, account: &Account) -> Result<(Account, Response)> {
        let endpoint = WaveEndpoint::Accounts(business_id.to_string());
        let request = self.client.endpoint_request(Method::POST, &endpoint, Some(account))?;
        self.client.fetch(request).await
    }

    /// Replace an account with a full record (`PUT`).
    #[instrument(skip(self, account))]
    pub async fn replace(&self, business_id: &str, account_id: u64, account: &Account) -> Result<(Account, Response)> {
        let endpoint = WaveEndpoint::Account(business_id.to_string(), account_id);
        let request = self.client.endpoint_request(Method::PUT, &endpoint, Some(account))?;
        self.client.fetch(request).await
    }

    /// Update the fields set on `account` (`PATCH`).
    #[instrument(skip(self, account))]
    pub async fn update(&self, business_id: &str, account_id: u64, account: &Account) -> Result<(Account, Response)> {
        let endpoint = WaveEndpoint::Account(business_id.to_string(), account_id);
        let request = self.client.endpoint_request(Method::PATCH, &endpoint, Some(account))?;
        self.client.fetch(request).await
    }

    /// Delete an account. The API refuses accounts whose `can_delete` is false.
    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: &str, account_id: u64) -> Result<Response> {
        let endpoint = WaveEndpoint::Account(business_id.to_string(), account_id);
        let request = self.client.endpoint_request(Method::DELETE, &endpoint, NO_BODY)?;
        self.client.execute(request).await
    }
}

/// API handler for Businesses endpoints
#[derive(Debug)]
pub struct BusinessesApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> BusinessesApi<'_, T> {
    /// List the businesses the authorized user can access.
    #[instrument(skip(self))]
    pub async fn list(&self, options: Option<ListOptions>) -> Result<(Vec<Business>, Response)> {
        let mut request = self.client.endpoint_request(Method::GET, &WaveEndpoint::Businesses, NO_BODY)?;
        if let Some(options) = options {
            options.apply_to_url(request.url_mut());
        }
        self.client.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, business_id: &str) -> Result<(Business, Response)> {
        let endpoint = WaveEndpoint::Business(business_id.to_string());
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, business))]
    pub async fn create(&self, business: &Business) -> Result<(Business, Response)> {
        let request = self.client.endpoint_request(Method::POST, &WaveEndpoint::Businesses, Some(business))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, business))]
    pub async fn replace(&self, business_id: &str, business: &Business) -> Result<(Business, Response)> {
        let endpoint = WaveEndpoint::Business(business_id.to_string());
        let request = self.client.endpoint_request(Method::PUT, &endpoint, Some(business))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, business))]
    pub async fn update(&self, business_id: &str, business: &Business) -> Result<(Business, Response)> {
        let endpoint = WaveEndpoint::Business(business_id.to_string());
        let request = self.client.endpoint_request(Method::PATCH, &endpoint, Some(business))?;
        self.client.fetch(request).await
    }
}

/// API handler for Countries endpoints
#[derive(Debug)]
pub struct CountriesApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> CountriesApi<'_, T> {
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<(Vec<Country>, Response)> {
        let request = self.client.endpoint_request(Method::GET, &WaveEndpoint::Countries, NO_BODY)?;
        self.client.fetch(request).await
    }

    /// Get a country by its ISO 3166 code.
    #[instrument(skip(self))]
    pub async fn get(&self, country_code: &str) -> Result<(Country, Response)> {
        let endpoint = WaveEndpoint::Country(country_code.to_string());
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn provinces(&self, country_code: &str) -> Result<(Vec<Province>, Response)> {
        let endpoint = WaveEndpoint::Provinces(country_code.to_string());
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }
}

/// API handler for Currencies endpoints
#[derive(Debug)]
pub struct CurrenciesApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> CurrenciesApi<'_, T> {
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<(Vec<Currency>, Response)> {
        let request = self.client.endpoint_request(Method::GET, &WaveEndpoint::Currencies, NO_BODY)?;
        self.client.fetch(request).await
    }

    /// Get a currency by its ISO 4217 code.
    #[instrument(skip(self))]
    pub async fn get(&self, code: &str) -> Result<(Currency, Response)> {
        let endpoint = WaveEndpoint::Currency(code.to_string());
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }
}

/// API handler for Customers endpoints
#[derive(Debug)]
pub struct CustomersApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> CustomersApi<'_, T> {
    #[instrument(skip(self))]
    pub async fn list(&self, business_id: &str, options: Option<ListOptions>) -> Result<(Vec<Customer>, Response)> {
        let endpoint = WaveEndpoint::Customers(business_id.to_string());
        let mut request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        if let Some(options) = options {
            options.apply_to_url(request.url_mut());
        }
        self.client.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, business_id: &str, customer_id: u64) -> Result<(Customer, Response)> {
        let endpoint = WaveEndpoint::Customer(business_id.to_string(), customer_id);
        let request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, customer))]
    pub async fn create(&self, business_id: &str, customer: &Customer) -> Result<(Customer, Response)> {
        let endpoint = WaveEndpoint::Customers(business_id.to_string());
        let request = self.client.endpoint_request(Method::POST, &endpoint, Some(customer))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, customer))]
    pub async fn replace(
        &self,
        business_id: &str,
        customer_id: u64,
        customer: &Customer,
    ) -> Result<(Customer, Response)> {
        let endpoint = WaveEndpoint::Customer(business_id.to_string(), customer_id);
        let request = self.client.endpoint_request(Method::PUT, &endpoint, Some(customer))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, customer))]
    pub async fn update(
        &self,
        business_id: &str,
        customer_id: u64,
        customer: &Customer,
    ) -> Result<(Customer, Response)> {
        let endpoint = WaveEndpoint::Customer(business_id.to_string(), customer_id);
        let request = self.client.endpoint_request(Method::PATCH, &endpoint, Some(customer))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: &str, customer_id: u64) -> Result<Response> {
        let endpoint = WaveEndpoint::Customer(business_id.to_string(), customer_id);
        let request = self.client.endpoint_request(Method::DELETE, &endpoint, NO_BODY)?;
        self.client.execute(request).await
    }
}

/// API handler for Products endpoints
///
/// Product lists are paginated: the returned [`Response`] carries the page
/// numbers derived from the `next`/`previous` cursors.
#[derive(Debug)]
pub struct ProductsApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> ProductsApi<'_, T> {
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        business_id: &str,
        options: Option<ProductListOptions>,
    ) -> Result<(Vec<Product>, Response)> {
        let endpoint = WaveEndpoint::Products(business_id.to_string());
        let mut request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        if let Some(options) = options {
            options.apply_to_url(request.url_mut());
        }
        let (list, response): (ProductList, _) = self.client.fetch_page(request).await?;
        Ok((list.results, response))
    }

    #[instrument(skip(self))]
    pub async fn get(
        &self,
        business_id: &str,
        product_id: u64,
        options: Option<ProductGetOptions>,
    ) -> Result<(Product, Response)> {
        let endpoint = WaveEndpoint::Product(business_id.to_string(), product_id);
        let mut request = self.client.endpoint_request(Method::GET, &endpoint, NO_BODY)?;
        if let Some(options) = options {
            options.apply_to_url(request.url_mut());
        }
        self.client.fetch(request).await
    }

    #[instrument(skip(self, product))]
    pub async fn create(&self, business_id: &str, product: &Product) -> Result<(Product, Response)> {
        let endpoint = WaveEndpoint::Products(business_id.to_string());
        let request = self.client.endpoint_request(Method::POST, &endpoint, Some(product))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, product))]
    pub async fn replace(&self, business_id: &str, product_id: u64, product: &Product) -> Result<(Product, Response)> {
        let endpoint = WaveEndpoint::Product(business_id.to_string(), product_id);
        let request = self.client.endpoint_request(Method::PUT, &endpoint, Some(product))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, product))]
    pub async fn update(&self, business_id: &str, product_id: u64, product: &Product) -> Result<(Product, Response)> {
        let endpoint = WaveEndpoint::Product(business_id.to_string(), product_id);
        let request = self.client.endpoint_request(Method::PATCH, &endpoint, Some(product))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, business_id: &str, product_id: u64) -> Result<Response> {
        let endpoint = WaveEndpoint::Product(business_id.to_string(), product_id);
        let request = self.client.endpoint_request(Method::DELETE, &endpoint, NO_BODY)?;
        self.client.execute(request).await
    }
}

/// API handler for the authorized user
#[derive(Debug)]
pub struct UsersApi<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> UsersApi<'_, T> {
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<(User, Response)> {
        let request = self.client.endpoint_request(Method::GET, &WaveEndpoint::User, NO_BODY)?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, user))]
    pub async fn replace(&self, user: &User) -> Result<(User, Response)> {
        let request = self.client.endpoint_request(Method::PUT, &WaveEndpoint::User, Some(user))?;
        self.client.fetch(request).await
    }

    #[instrument(skip(self, user))]
    pub async fn update(&self, user: &User) -> Result<(User, Response)> {
        let request = self.client.endpoint_request(Method::PATCH, &WaveEndpoint::User, Some(user))?;
        self.client.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use time::{OffsetDateTime, macros::datetime};

    use super::*;
    use crate::utils::date_format::wave_datetime_format;

    fn client() -> Client {
        Client::default()
    }

    #[test]
    fn defaults() {
        let client = client();
        assert_eq!(client.base_url().as_str(), "https://api.waveapps.com/");
        assert!(client.user_agent().starts_with(concat!("wave-rs/", env!("CARGO_PKG_VERSION"), " (Rust; ")));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = client().with_base_url(Url::parse("http://localhost:9000/api").unwrap());
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/api/");
    }

    #[test]
    fn new_request_resolves_relative_path() {
        let request = client().new_request(Method::GET, "foo", NO_BODY).unwrap();
        assert_eq!(request.url().as_str(), "https://api.waveapps.com/foo");
        assert_eq!(request.method(), Method::GET);
        assert!(request.body().is_none());
    }

    #[test]
    fn new_request_sets_headers() {
        let client = client().with_user_agent("test-agent/1.0");
        let request = client.new_request(Method::GET, "foo", NO_BODY).unwrap();
        assert_eq!(request.headers()[USER_AGENT], "test-agent/1.0");
        assert_eq!(request.headers()[CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(request.headers()[ACCEPT], APPLICATION_JSON);
    }

    #[derive(Serialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn new_request_encodes_json_body() {
        let body = Named { name: "l".to_string() };
        let request = client().new_request(Method::POST, "foo", Some(&body)).unwrap();
        let bytes = request.body().and_then(reqwest::Body::as_bytes).unwrap();
        assert_eq!(bytes, br#"{"name":"l"}"#);
    }

    #[test]
    fn new_request_rejects_bad_path() {
        let err = client().new_request(Method::GET, "%gh&%ij", NO_BODY).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
    }

    #[derive(Serialize)]
    struct Stamped {
        #[serde(with = "wave_datetime_format")]
        when: OffsetDateTime,
    }

    #[test]
    fn new_request_reports_unencodable_body() {
        let body = Stamped {
            when: datetime!(2009-11-10 23:04:20 UTC).replace_year(-5).unwrap(),
        };
        let err = client().new_request(Method::POST, "foo", Some(&body)).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn endpoint_request_uses_endpoint_path() {
        let client = client();
        let request = client
            .endpoint_request(Method::DELETE, &WaveEndpoint::Product("b".into(), 2), NO_BODY)
            .unwrap();
        assert_eq!(request.url().as_str(), "https://api.waveapps.com/businesses/b/products/2");
    }
}
