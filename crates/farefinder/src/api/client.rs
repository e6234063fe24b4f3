//! HTTP client for the RapidAPI-hosted flight data provider.
//!
//! The API key travels in the `X-RapidAPI-Key` header. The header value is
//! marked sensitive, so neither our `Debug` output nor reqwest's own logging
//! ever prints it.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use tracing::trace;

use super::response::{parse_airports_response, parse_flights_response};
use super::{AirportSearch, FlightSearch};
use crate::airport::AirportOption;
use crate::config::{Config, SearchConfig};
use crate::criteria::FlightQuery;
use crate::error::{Error, Result};
use crate::itinerary::Itinerary;

const KEY_HEADER: &str = "X-RapidAPI-Key";
const HOST_HEADER: &str = "X-RapidAPI-Host";

fn header_config_error(message: &str) -> Error {
    Error::ConfigValidation {
        message: message.to_string(),
    }
}

fn sensitive_header(key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(key)
        .map_err(|_| header_config_error("api.key contains characters not allowed in a header"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Fixed flight search parameters, serialized with the provider's names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FixedParams {
    cabin_class: String,
    sort_by: String,
    currency: String,
    market: String,
    country_code: String,
}

impl From<&SearchConfig> for FixedParams {
    fn from(search: &SearchConfig) -> Self {
        Self {
            cabin_class: search.cabin_class.clone(),
            sort_by: search.sort_by.clone(),
            currency: search.currency.clone(),
            market: search.market.clone(),
            country_code: search.country_code.clone(),
        }
    }
}

/// Flight and airport search over HTTP.
#[derive(Debug)]
pub struct SkyScrapperClient {
    client: Client,
    flights_url: String,
    airports_url: String,
    fixed: FixedParams,
    locale: String,
}

impl SkyScrapperClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] if no key is configured, or an error
    /// if the key or host cannot be used as header values or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or(Error::MissingApiKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(KEY_HEADER, sensitive_header(api_key)?);
        headers.insert(
            HOST_HEADER,
            HeaderValue::from_str(&config.api.host)
                .map_err(|_| header_config_error("api.host is not a valid header value"))?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            flights_url: config.api.flights_url.clone(),
            airports_url: config.api.airports_url.clone(),
            fixed: FixedParams::from(&config.search),
            locale: config.search.locale.clone(),
        })
    }

    /// Send `request` and return the body of a successful response.
    async fn get_text(
        &self,
        provider: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(Error::api(provider, Some(status.as_u16()), message));
        }
        Ok(body)
    }
}

#[async_trait]
impl FlightSearch for SkyScrapperClient {
    async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<Itinerary>> {
        trace!(
            from = %query.origin_sky_id,
            to = %query.destination_sky_id,
            date = %query.date,
            "searching flights"
        );
        let request = self
            .client
            .get(&self.flights_url)
            .query(query)
            .query(&self.fixed);
        let body = self.get_text("flights", request).await?;
        parse_flights_response(&body)
    }
}

#[async_trait]
impl AirportSearch for SkyScrapperClient {
    async fn search_airports(&self, query: &str) -> Result<Vec<AirportOption>> {
        trace!(query, "searching airports");
        let request = self
            .client
            .get(&self.airports_url)
            .query(&[("query", query), ("locale", self.locale.as_str())]);
        let body = self.get_text("airports", request).await?;
        parse_airports_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::flow::{FetchFailure, FetchOutcome};

    fn configured() -> Config {
        let mut config = Config::default();
        config.api.key = Some("test-key-123".to_string());
        config
    }

    #[test]
    fn test_from_config_requires_key() {
        let result = SkyScrapperClient::from_config(&Config::default());
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_from_config_rejects_unusable_key() {
        let mut config = configured();
        config.api.key = Some("bad\nkey".to_string());
        let err = SkyScrapperClient::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(err.to_string().contains("api.key"));
    }

    #[test]
    fn test_from_config_rejects_unusable_host() {
        let mut config = configured();
        config.api.host = "bad\rhost".to_string();
        let err = SkyScrapperClient::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
        assert!(!err.is_validation_error());
    }

    #[test]
    fn test_debug_hides_key() {
        let client = SkyScrapperClient::from_config(&configured()).unwrap();
        let debug_str = format!("{client:?}");
        assert!(!debug_str.contains("test-key-123"));
    }

    #[test]
    fn test_key_header_is_sensitive() {
        assert!(sensitive_header("abc").unwrap().is_sensitive());
    }

    #[test]
    fn test_flight_request_carries_all_params() {
        let client = SkyScrapperClient::from_config(&configured()).unwrap();
        let query = FlightQuery {
            origin_sky_id: "LOND".to_string(),
            destination_sky_id: "NYCA".to_string(),
            origin_entity_id: "95565050".to_string(),
            destination_entity_id: "95673372".to_string(),
            date: "2024-06-01".to_string(),
            adults: "1".to_string(),
        };

        let request = client
            .client
            .get(&client.flights_url)
            .query(&query)
            .query(&client.fixed)
            .build()
            .unwrap();

        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("originSkyId"), Some("LOND"));
        assert_eq!(get("originEntityId"), Some("95565050"));
        assert_eq!(get("destinationSkyId"), Some("NYCA"));
        assert_eq!(get("destinationEntityId"), Some("95673372"));
        assert_eq!(get("date"), Some("2024-06-01"));
        assert_eq!(get("adults"), Some("1"));
        assert_eq!(get("cabinClass"), Some("economy"));
        assert_eq!(get("sortBy"), Some("best"));
        assert_eq!(get("currency"), Some("USD"));
        assert_eq!(get("market"), Some("en-US"));
        assert_eq!(get("countryCode"), Some("US"));
    }

    #[test]
    fn test_fixed_params_follow_config() {
        let mut config = configured();
        config.search.currency = "GBP".to_string();
        let client = SkyScrapperClient::from_config(&config).unwrap();
        assert_eq!(client.fixed.currency, "GBP");
        assert_eq!(client.locale, "en-US");
    }

    fn query() -> FlightQuery {
        FlightQuery {
            origin_sky_id: "LOND".to_string(),
            destination_sky_id: "NYCA".to_string(),
            origin_entity_id: "95565050".to_string(),
            destination_entity_id: "95673372".to_string(),
            date: "2024-06-01".to_string(),
            adults: "1".to_string(),
        }
    }

    /// Answer a single request on a loopback port with `status_line` and
    /// `body`, returning the URL to send it to.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/flights/searchFlights")
    }

    fn client_for(url: String) -> SkyScrapperClient {
        let mut config = configured();
        config.api.flights_url = url;
        let mut client = SkyScrapperClient::from_config(&config).unwrap();
        // Loopback only; ignore any proxy set in the environment.
        client.client = Client::builder().no_proxy().build().unwrap();
        client
    }

    #[tokio::test]
    async fn test_error_status_uses_body_as_message() {
        let url = serve_once("429 Too Many Requests", "You have exceeded the rate limit").await;
        let client = client_for(url);

        let result = client.search_flights(&query()).await;
        match &result {
            Err(Error::Api {
                provider,
                status,
                message,
            }) => {
                assert_eq!(*provider, "flights");
                assert_eq!(*status, Some(429));
                assert_eq!(message, "You have exceeded the rate limit");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        assert!(matches!(
            FetchOutcome::from_result(result),
            FetchOutcome::Failed(FetchFailure::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_error_status_with_empty_body_uses_reason() {
        let url = serve_once("500 Internal Server Error", "").await;
        let client = client_for(url);

        let result = client.search_flights(&query()).await;
        let err = result.as_ref().unwrap_err();
        assert!(matches!(
            err,
            Error::Api {
                status: Some(500),
                ..
            }
        ));
        assert!(err.to_string().contains("Internal Server Error"));
        assert!(matches!(
            FetchOutcome::from_result(result),
            FetchOutcome::Failed(FetchFailure::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_refused_envelope_on_success_status() {
        let url = serve_once("200 OK", r#"{"status":false,"message":"Invalid API key"}"#).await;
        let client = client_for(url);

        let result = client.search_flights(&query()).await;
        let err = result.as_ref().unwrap_err();
        assert!(matches!(err, Error::Api { status: None, .. }));
        assert!(err.to_string().contains("Invalid API key"));
        assert!(matches!(
            FetchOutcome::from_result(result),
            FetchOutcome::Failed(FetchFailure::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_success_status_decodes_itineraries() {
        let url = serve_once("200 OK", r#"{"status":true,"data":{"itineraries":[]}}"#).await;
        let client = client_for(url);

        let itineraries = client.search_flights(&query()).await.unwrap();
        assert!(itineraries.is_empty());
    }
}
