//! Countries, provinces and currencies.

mod test_utils;

use anyhow::Result;
use serde_json::json;
use test_utils::{assert_no_requests, mock_client};
use wave_rs::Error;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

fn canada() -> serde_json::Value {
    json!({
        "name": "Canada",
        "country_code": "CA",
        "currency_code": "CAD",
        "provinces": [
            {"name": "Ontario", "slug": "ontario"},
            {"name": "Quebec", "slug": "quebec"}
        ],
        "url": "https://api.example.com/countries/CA/"
    })
}

#[tokio::test]
async fn list_and_get_countries() -> Result<()> {
    let (server, client) = mock_client().await;
    Mock::given(method("GET"))
        .and(path("/countries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([canada()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/countries/CA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canada()))
        .mount(&server)
        .await;

    let (countries, _) = client.countries().list().await?;
    assert_eq!(countries.len(), 1);
    assert_eq!(countries[0].to_string(), "Canada (CA)");

    let (country, _) = client.countries().get("CA").await?;
    assert_eq!(country.currency_code.as_deref(), Some("CAD"));
    assert_eq!(country.provinces.len(), 2);
    assert_eq!(serde_json::to_value(&country)?, canada());
    Ok(())
}

#[tokio::test]
async fn list_provinces() -> Result<()> {
    let (server, client) = mock_client().await;
    Mock::given(method("GET"))
        .and(path("/countries/CA/provinces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canada()["provinces"].clone()))
        .expect(1)
        .mount(&server)
        .await;

    let (provinces, _) = client.countries().provinces("CA").await?;
    let names: Vec<String> = provinces.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["Ontario", "Quebec"]);
    Ok(())
}

#[tokio::test]
async fn get_currency() -> Result<()> {
    let (server, client) = mock_client().await;
    Mock::given(method("GET"))
        .and(path("/currencies/CAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"url":"u","code":"CAD","symbol":"$","name":"Canadian dollar"}"#),
        )
        .mount(&server)
        .await;

    let (currency, response) = client.currencies().get("CAD").await?;
    assert_eq!(currency.code.as_deref(), Some("CAD"));
    assert_eq!(currency.symbol.as_deref(), Some("$"));
    assert_eq!(response.text(), Some(r#"{"url":"u","code":"CAD","symbol":"$","name":"Canadian dollar"}"#));
    Ok(())
}

#[tokio::test]
async fn list_currencies() -> Result<()> {
    let (server, client) = mock_client().await;
    Mock::given(method("GET"))
        .and(path("/currencies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"code": "CAD", "symbol": "$", "name": "Canadian dollar"},
            {"code": "EUR", "symbol": "€", "name": "Euro"}
        ])))
        .mount(&server)
        .await;

    let (currencies, _) = client.currencies().list().await?;
    let codes: Vec<String> = currencies.iter().map(ToString::to_string).collect();
    assert_eq!(codes, ["CAD (Canadian dollar)", "EUR (Euro)"]);
    assert_eq!(currencies[1].url, None);
    Ok(())
}

#[tokio::test]
async fn invalid_codes_send_nothing() {
    let (server, client) = mock_client().await;

    let results = [
        client.countries().get("%").await.map(drop),
        client.countries().provinces("%").await.map(drop),
        client.currencies().get("%").await.map(drop),
    ];

    for result in results {
        assert!(matches!(result, Err(Error::InvalidEndpoint { .. })), "{result:?}");
    }
    assert_no_requests(&server).await;
}
