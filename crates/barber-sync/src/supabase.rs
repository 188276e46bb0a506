//! # Supabase Client
//!
//! PostgREST client for the hosted barbershop backend.
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  barbershop_barbers          id, name                                   │
//! │  barbershop_services         id, name, default_price                    │
//! │  barbershop_visits           id, visit_time, total_amount,              │
//! │                              customer_id, phone                         │
//! │  barbershop_visit_services   visit_id, service_id, barber_id, amount    │
//! │  barbershop_daily_earnings   day, total_revenue, total_visits  (view)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Conventions
//! - Every request carries `apikey` and `Authorization: Bearer <key>`
//! - Amounts go out as decimal strings (`"35.00"`) so `numeric` columns never
//!   see a float; they come back as numbers or strings and both are accepted
//! - Ids come back as numbers or strings and are kept as strings
//! - Requests are bounded by the configured timeouts, so a stalled backend
//!   surfaces as `DeliveryError::Timeout` instead of hanging a sync pass

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use barber_core::{
    Barber, DailyEarnings, DayWindow, Money, NewVisit, RecordedVisit, Service, ServiceCatalog,
    ServiceLine,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;
use url::Url;

use crate::config::RemoteSettings;
use crate::error::{SyncError, SyncResult};
use crate::remote::{DeliveryError, RemoteVisitStore};

const VISITS_TABLE: &str = "barbershop_visits";
const VISIT_SERVICES_TABLE: &str = "barbershop_visit_services";
const BARBERS_TABLE: &str = "barbershop_barbers";
const SERVICES_TABLE: &str = "barbershop_services";
const DAILY_EARNINGS_TABLE: &str = "barbershop_daily_earnings";

// =============================================================================
// Client
// =============================================================================

/// Client for the backend's REST interface.
#[derive(Clone)]
pub struct SupabaseClient {
    rest_url: String,
    api_key: String,
    client: Client,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("rest_url", &self.rest_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl SupabaseClient {
    /// Creates a client for the project at `url`.
    ///
    /// ## Errors
    /// - `InvalidUrl` if `url` is not an http(s) URL
    /// - `InvalidConfig` if `api_key` is blank or the HTTP client can't be built
    pub fn new(
        url: &str,
        api_key: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> SyncResult<Self> {
        let rest_url = normalize_rest_url(url)?;
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(SyncError::InvalidConfig("API key must not be empty".into()));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(SupabaseClient {
            rest_url,
            api_key,
            client,
        })
    }

    /// Creates a client from the `[remote]` config section.
    pub fn from_settings(settings: &RemoteSettings) -> SyncResult<Self> {
        let (url, api_key) = settings.credentials()?;
        Self::new(
            url,
            api_key,
            Duration::from_secs(settings.request_timeout_secs),
            Duration::from_secs(settings.connect_timeout_secs),
        )
    }

    /// Base REST URL, e.g. `https://demo.supabase.co/rest/v1`.
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DeliveryError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(rejected(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| DeliveryError::invalid_response(e.to_string()))
    }

    async fn send_no_content(&self, request: RequestBuilder) -> Result<(), DeliveryError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejected(status, &body));
        }

        Ok(())
    }

    // =========================================================================
    // Reference Data
    // =========================================================================

    /// Fetches all barbers.
    pub async fn list_barbers(&self) -> Result<Vec<Barber>, DeliveryError> {
        let rows: Vec<BarberRow> = self
            .send_json(
                self.client
                    .get(self.table_url(BARBERS_TABLE))
                    .query(&[("select", "id,name"), ("order", "name")]),
            )
            .await?;

        debug!(count = rows.len(), "Fetched barbers");
        Ok(rows.into_iter().map(Barber::from).collect())
    }

    /// Fetches all services with their current prices.
    pub async fn list_services(&self) -> Result<Vec<Service>, DeliveryError> {
        let rows: Vec<ServiceRow> = self
            .send_json(
                self.client
                    .get(self.table_url(SERVICES_TABLE))
                    .query(&[("select", "id,name,default_price"), ("order", "name")]),
            )
            .await?;

        debug!(count = rows.len(), "Fetched services");
        Ok(rows.into_iter().map(Service::from).collect())
    }

    /// Fetches the services as a session price catalog.
    pub async fn service_catalog(&self) -> Result<ServiceCatalog, DeliveryError> {
        Ok(ServiceCatalog::new(self.list_services().await?))
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Fetches visits with `visit_time` in `[window.start, window.end)`,
    /// joined with their service lines, oldest first.
    pub async fn visits_in_window(&self, window: DayWindow) -> Result<Vec<RecordedVisit>, DeliveryError> {
        let visits: Vec<VisitRow> = self
            .send_json(self.client.get(self.table_url(VISITS_TABLE)).query(&[
                ("select", "id,visit_time,total_amount,phone".to_string()),
                ("visit_time", format!("gte.{}", timestamp_param(window.start))),
                ("visit_time", format!("lt.{}", timestamp_param(window.end))),
                ("order", "visit_time".to_string()),
            ]))
            .await?;

        if visits.is_empty() {
            return Ok(Vec::new());
        }

        let ids = visits
            .iter()
            .map(|v| v.id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let lines: Vec<VisitServiceRow> = self
            .send_json(self.client.get(self.table_url(VISIT_SERVICES_TABLE)).query(&[
                ("select", "visit_id,service_id,barber_id".to_string()),
                ("visit_id", format!("in.({ids})")),
            ]))
            .await?;

        debug!(visits = visits.len(), lines = lines.len(), "Fetched visits in window");
        Ok(join_visits(visits, lines))
    }

    /// Fetches daily earnings for `start..=end`, ordered by day.
    pub async fn daily_earnings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEarnings>, DeliveryError> {
        let rows: Vec<EarningsRow> = self
            .send_json(self.client.get(self.table_url(DAILY_EARNINGS_TABLE)).query(&[
                ("select", "day,total_revenue,total_visits".to_string()),
                ("day", format!("gte.{start}")),
                ("day", format!("lte.{end}")),
                ("order", "day".to_string()),
            ]))
            .await?;

        debug!(count = rows.len(), %start, %end, "Fetched daily earnings");
        Ok(rows.into_iter().map(DailyEarnings::from).collect())
    }
}

// =============================================================================
// RemoteVisitStore
// =============================================================================

#[async_trait]
impl RemoteVisitStore for SupabaseClient {
    async fn create_visit(&self, visit: &NewVisit) -> Result<String, DeliveryError> {
        let body = [VisitInsert::from(visit)];
        let inserted: Vec<InsertedRow> = self
            .send_json(
                self.client
                    .post(self.table_url(VISITS_TABLE))
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;

        let visit_id = inserted
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| DeliveryError::invalid_response("visit insert returned no rows"))?;

        debug!(%visit_id, "Created visit row");
        Ok(visit_id)
    }

    async fn create_visit_service_lines(&self, lines: &[ServiceLine]) -> Result<(), DeliveryError> {
        let body: Vec<ServiceLineInsert<'_>> = lines.iter().map(ServiceLineInsert::from).collect();

        self.send_no_content(
            self.client
                .post(self.table_url(VISIT_SERVICES_TABLE))
                .header("Prefer", "return=minimal")
                .json(&body),
        )
        .await?;

        debug!(count = lines.len(), "Created visit service lines");
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DeliveryError::Timeout
        } else if err.is_decode() {
            DeliveryError::invalid_response(err.to_string())
        } else if let Some(status) = err.status() {
            DeliveryError::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            DeliveryError::network(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
    code: Option<String>,
}

fn rejected(status: StatusCode, body: &str) -> DeliveryError {
    DeliveryError::Rejected {
        status: status.as_u16(),
        message: parse_api_error(body),
    }
}

fn parse_api_error(body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorResponse>(body) {
        if let Some(message) = payload.message {
            let mut text = message.trim().to_string();
            if let Some(code) = payload.code {
                text = format!("{text} [{code}]");
            }
            if let Some(details) = payload.details.or(payload.hint) {
                text = format!("{text}: {}", details.trim());
            }
            return text;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// URL Helpers
// =============================================================================

/// Turns a project URL into its REST base (`.../rest/v1`).
pub fn normalize_rest_url(url: &str) -> SyncResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SyncError::InvalidUrl("backend URL must not be empty".into()));
    }

    let parsed = Url::parse(trimmed)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SyncError::InvalidUrl(format!(
            "backend URL must use http:// or https://, got: {trimmed}"
        )));
    }

    if trimmed.ends_with("/rest/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/rest/v1"))
    }
}

fn timestamp_param(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// =============================================================================
// Wire Rows
// =============================================================================

#[derive(Debug, Serialize)]
struct VisitInsert<'a> {
    visit_time: String,
    total_amount: String,
    customer_id: Option<&'a str>,
    phone: Option<&'a str>,
}

impl<'a> From<&'a NewVisit> for VisitInsert<'a> {
    fn from(visit: &'a NewVisit) -> Self {
        VisitInsert {
            visit_time: visit.visit_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_amount: visit.total().to_decimal_string(),
            customer_id: None,
            phone: visit.phone.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ServiceLineInsert<'a> {
    visit_id: &'a str,
    service_id: &'a str,
    barber_id: Option<&'a str>,
    amount: String,
}

impl<'a> From<&'a ServiceLine> for ServiceLineInsert<'a> {
    fn from(line: &'a ServiceLine) -> Self {
        ServiceLineInsert {
            visit_id: &line.visit_id,
            service_id: &line.service_id,
            barber_id: line.barber_id.as_deref(),
            amount: line.amount().to_decimal_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct BarberRow {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
    name: String,
}

impl From<BarberRow> for Barber {
    fn from(row: BarberRow) -> Self {
        Barber {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceRow {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
    name: String,
    #[serde(default, deserialize_with = "flexible_amount")]
    default_price: Money,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service::new(row.id, row.name, row.default_price)
    }
}

#[derive(Debug, Deserialize)]
struct VisitRow {
    #[serde(deserialize_with = "flexible_id")]
    id: String,
    #[serde(deserialize_with = "flexible_timestamp")]
    visit_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "flexible_amount")]
    total_amount: Money,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisitServiceRow {
    #[serde(deserialize_with = "flexible_id")]
    visit_id: String,
    #[serde(deserialize_with = "flexible_id")]
    service_id: String,
    #[serde(default, deserialize_with = "flexible_optional_id")]
    barber_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EarningsRow {
    day: NaiveDate,
    #[serde(default, deserialize_with = "flexible_amount")]
    total_revenue: Money,
    #[serde(default)]
    total_visits: i64,
}

impl From<EarningsRow> for DailyEarnings {
    fn from(row: EarningsRow) -> Self {
        DailyEarnings {
            day: row.day,
            total_revenue_cents: row.total_revenue.cents(),
            total_visits: row.total_visits,
        }
    }
}

/// Attaches service lines to their visits, keeping visit order.
///
/// The barber of a visit is taken from its first line.
fn join_visits(visits: Vec<VisitRow>, lines: Vec<VisitServiceRow>) -> Vec<RecordedVisit> {
    let mut lines_by_visit: HashMap<String, Vec<VisitServiceRow>> = HashMap::new();
    for line in lines {
        lines_by_visit.entry(line.visit_id.clone()).or_default().push(line);
    }

    visits
        .into_iter()
        .map(|visit| {
            let lines = lines_by_visit.remove(&visit.id).unwrap_or_default();
            RecordedVisit {
                barber_id: lines.first().and_then(|l| l.barber_id.clone()),
                service_ids: lines.into_iter().map(|l| l.service_id).collect(),
                id: visit.id,
                visit_time: visit.visit_time,
                total_cents: visit.total_amount.cents(),
                phone: visit.phone,
            }
        })
        .collect()
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

impl From<IdRepr> for String {
    fn from(repr: IdRepr) -> Self {
        match repr {
            IdRepr::Int(n) => n.to_string(),
            IdRepr::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(IdRepr::deserialize(deserializer)?.into())
}

fn flexible_optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

/// Accepts `20`, `19.99` or `"19.99"`; `null` reads as zero.
fn flexible_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let amount = match Option::<AmountRepr>::deserialize(deserializer)? {
        None => return Ok(Money::zero()),
        Some(AmountRepr::Int(major)) => major
            .checked_mul(100)
            .map(Money::from_cents)
            .ok_or_else(|| D::Error::custom(format!("amount out of range: {major}")))?,
        Some(AmountRepr::Float(value)) => Money::parse_decimal(&value.to_string())
            .ok_or_else(|| D::Error::custom(format!("invalid amount: {value}")))?,
        Some(AmountRepr::Text(text)) => Money::parse_decimal(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid amount: {text:?}")))?,
    };
    Ok(amount)
}

/// Accepts RFC 3339 (`timestamptz`) or a bare `timestamp` taken as UTC.
fn flexible_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let text = String::deserialize(deserializer)?;

    if let Ok(instant) = DateTime::parse_from_rfc3339(&text) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| D::Error::custom(format!("invalid timestamp {text:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SupabaseClient {
        SupabaseClient::new(
            "https://demo.supabase.co",
            "anon-key",
            Duration::from_secs(15),
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_rest_url() {
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/rest/v1").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
        assert!(matches!(normalize_rest_url(""), Err(SyncError::InvalidUrl(_))));
        assert!(matches!(
            normalize_rest_url("ftp://demo.supabase.co"),
            Err(SyncError::InvalidUrl(_))
        ));
        assert!(normalize_rest_url("not a url").is_err());
    }

    #[test]
    fn test_client_rejects_blank_key() {
        let err = SupabaseClient::new(
            "https://demo.supabase.co",
            "   ",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("anon-key"));
        assert!(rendered.contains("[REDACTED]"));
        assert_eq!(client().table_url(VISITS_TABLE), "https://demo.supabase.co/rest/v1/barbershop_visits");
    }

    #[test]
    fn test_visit_insert_payload() {
        let visit = NewVisit {
            visit_time: DateTime::parse_from_rfc3339("2024-03-10T12:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            total_cents: 3500,
            phone: Some("555-1234".into()),
        };

        let json = serde_json::to_value([VisitInsert::from(&visit)]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "visit_time": "2024-03-10T12:30:00.000Z",
                "total_amount": "35.00",
                "customer_id": null,
                "phone": "555-1234"
            }])
        );
    }

    #[test]
    fn test_service_line_payload() {
        let line = ServiceLine {
            visit_id: "981".into(),
            service_id: "s2".into(),
            barber_id: None,
            amount_cents: 1550,
        };

        let json = serde_json::to_value(ServiceLineInsert::from(&line)).unwrap();
        assert_eq!(json["amount"], "15.50");
        assert_eq!(json["barber_id"], serde_json::Value::Null);
    }

    #[test]
    fn test_rows_accept_numbers_and_strings() {
        let services: Vec<ServiceRow> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Haircut", "default_price": 20},
                {"id": "2", "name": "Beard trim", "default_price": "15.50"},
                {"id": 3, "name": "Shave", "default_price": 12.99},
                {"id": 4, "name": "Consult", "default_price": null}
            ]"#,
        )
        .unwrap();

        let prices: Vec<_> = services.iter().map(|s| (s.id.as_str(), s.default_price.cents())).collect();
        assert_eq!(prices, vec![("1", 2000), ("2", 1550), ("3", 1299), ("4", 0)]);

        let inserted: Vec<InsertedRow> = serde_json::from_str(r#"[{"id": 981}]"#).unwrap();
        assert_eq!(inserted[0].id, "981");

        assert!(serde_json::from_str::<ServiceRow>(r#"{"id": 5, "name": "x", "default_price": "ten"}"#).is_err());
    }

    #[test]
    fn test_timestamps_with_and_without_offset() {
        let rows: Vec<VisitRow> = serde_json::from_str(
            r#"[
                {"id": 1, "visit_time": "2024-03-10T12:30:00.123456+00:00", "total_amount": "35.00", "phone": null},
                {"id": 2, "visit_time": "2024-03-10T14:00:00", "total_amount": 20}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows[0].visit_time.to_rfc3339_opts(SecondsFormat::Secs, true), "2024-03-10T12:30:00Z");
        assert_eq!(rows[1].visit_time.to_rfc3339_opts(SecondsFormat::Secs, true), "2024-03-10T14:00:00Z");
        assert_eq!(rows[1].phone, None);
    }

    #[test]
    fn test_join_visits_attaches_lines() {
        let visits: Vec<VisitRow> = serde_json::from_str(
            r#"[
                {"id": 1, "visit_time": "2024-03-10T09:00:00Z", "total_amount": "35.00", "phone": "555-1234"},
                {"id": 2, "visit_time": "2024-03-10T10:00:00Z", "total_amount": "0", "phone": null}
            ]"#,
        )
        .unwrap();
        let lines: Vec<VisitServiceRow> = serde_json::from_str(
            r#"[
                {"visit_id": 1, "service_id": 10, "barber_id": 7},
                {"visit_id": 1, "service_id": 11, "barber_id": 7}
            ]"#,
        )
        .unwrap();

        let joined = join_visits(visits, lines);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].service_ids, vec!["10", "11"]);
        assert_eq!(joined[0].barber_id.as_deref(), Some("7"));
        assert_eq!(joined[0].total_cents, 3500);
        assert!(joined[1].service_ids.is_empty());
        assert_eq!(joined[1].barber_id, None);
    }

    #[test]
    fn test_earnings_rows() {
        let rows: Vec<EarningsRow> = serde_json::from_str(
            r#"[{"day": "2024-03-10", "total_revenue": "120.50", "total_visits": 4}]"#,
        )
        .unwrap();

        let earnings: Vec<DailyEarnings> = rows.into_iter().map(DailyEarnings::from).collect();
        assert_eq!(earnings[0].total_revenue_cents, 12050);
        assert_eq!(earnings[0].total_visits, 4);
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"message":"invalid input syntax for type bigint","code":"22P02","details":null,"hint":null}"#;
        assert_eq!(
            parse_api_error(body),
            "invalid input syntax for type bigint [22P02]"
        );
        assert_eq!(parse_api_error("   "), "empty response body");
        assert_eq!(parse_api_error("Bad Gateway"), "Bad Gateway");

        let err = rejected(StatusCode::BAD_GATEWAY, "Bad Gateway");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_timestamp_param_uses_z_suffix() {
        let instant = DateTime::parse_from_rfc3339("2024-03-09T22:00:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp_param(instant), "2024-03-09T22:00:00Z");
    }
}
