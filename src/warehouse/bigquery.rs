//! BigQuery warehouse client.
//!
//! Runs queries through the `jobs.query` REST endpoint and pages through
//! `jobs.getQueryResults` until the job is complete and every row is loaded.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{ColumnInfo, QueryJobConfig, QueryResult, Row, Value, WarehouseClient};
use crate::config::WarehouseConfig;
use crate::error::{AgentError, Result};

/// Server-side wait per request before returning an incomplete job.
const POLL_TIMEOUT_MS: u64 = 10_000;

/// Environment variable holding an OAuth2 bearer token.
const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// BigQuery client configuration.
#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    /// Project that runs (and pays for) the jobs.
    pub project: String,
    /// OAuth2 access token.
    pub access_token: String,
    /// Processing location, if the dataset is not in the default region.
    pub location: Option<String>,
    /// REST API base URL.
    pub api_base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BigQueryConfig {
    /// Creates a new config with the given project and token.
    pub fn new(project: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let defaults = WarehouseConfig::default();
        Ok(Self {
            project: project.into(),
            access_token: access_token.into(),
            location: None,
            api_base_url: defaults.api_url()?,
            timeout_secs: defaults.timeout_secs,
        })
    }

    /// Sets the processing location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// BigQuery REST client.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    config: BigQueryConfig,
    client: Client,
}

impl BigQueryClient {
    /// Creates a new BigQuery client with the given configuration.
    pub fn new(config: BigQueryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Creates a client from warehouse settings.
    ///
    /// Reads `GOOGLE_OAUTH_ACCESS_TOKEN` for authentication, e.g. the output
    /// of `gcloud auth print-access-token`.
    pub fn from_config(warehouse: &WarehouseConfig) -> Result<Self> {
        let project = warehouse.project.clone().ok_or_else(|| {
            AgentError::config("No project configured. Set BQ_PROJECT or warehouse.project")
        })?;
        let access_token = std::env::var(ACCESS_TOKEN_ENV).map_err(|_| {
            AgentError::config(format!("{ACCESS_TOKEN_ENV} environment variable not set"))
        })?;

        Self::new(BigQueryConfig {
            project,
            access_token,
            location: warehouse.location.clone(),
            api_base_url: warehouse.api_url()?,
            timeout_secs: warehouse.timeout_secs,
        })
    }

    fn queries_url(&self) -> String {
        format!(
            "{}/projects/{}/queries",
            self.config.api_base_url.as_str().trim_end_matches('/'),
            self.config.project
        )
    }

    fn results_url(&self, job: &JobReference, page_token: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.queries_url(), job.job_id))
            .map_err(|e| AgentError::internal(format!("Invalid results URL: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("timeoutMs", &POLL_TIMEOUT_MS.to_string());
            pairs.append_pair("formatOptions.useInt64Timestamp", "true");
            if let Some(location) = job.location.as_deref().or(self.config.location.as_deref()) {
                pairs.append_pair("location", location);
            }
            if let Some(token) = page_token {
                pairs.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    /// Sends an authenticated request and decodes a query response page.
    async fn send(&self, request: RequestBuilder) -> Result<QueryResponse> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::execution("Request to BigQuery timed out")
                } else if e.is_connect() {
                    AgentError::execution("Failed to connect to BigQuery. Check your network.")
                } else {
                    AgentError::execution(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::execution(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(parse_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| AgentError::execution(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl WarehouseClient for BigQueryClient {
    async fn query(&self, sql: &str, config: &QueryJobConfig) -> Result<QueryResult> {
        let request = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            maximum_bytes_billed: config.maximum_bytes_billed.to_string(),
            timeout_ms: POLL_TIMEOUT_MS,
            location: self.config.location.as_deref(),
            format_options: FormatOptions {
                use_int64_timestamp: true,
            },
        };

        let first = self
            .send(self.client.post(self.queries_url()).json(&request))
            .await?;
        collect_job(first, self).await
    }
}

/// Source of follow-up `getQueryResults` pages for a submitted job.
#[async_trait]
trait PageSource: Send + Sync {
    async fn next_page(&self, job: &JobReference, page_token: Option<&str>)
        -> Result<QueryResponse>;
}

#[async_trait]
impl PageSource for BigQueryClient {
    async fn next_page(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse> {
        let url = self.results_url(job, page_token)?;
        self.send(self.client.get(url)).await
    }
}

/// Follows a job from its first response until it is complete and every
/// result page has been decoded, in order.
async fn collect_job(first: QueryResponse, pages: &dyn PageSource) -> Result<QueryResult> {
    let mut page = first;
    let job = page
        .job_reference
        .clone()
        .ok_or_else(|| AgentError::execution("BigQuery response is missing jobReference"))?;
    debug!(job_id = %job.job_id, "BigQuery job submitted");

    let mut result = QueryResult {
        job_id: Some(job.job_id.clone()),
        ..QueryResult::default()
    };
    let mut fields: Vec<FieldSchema> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        if page.job_complete {
            if fields.is_empty() {
                if let Some(schema) = page.schema.take() {
                    fields = schema.fields;
                }
            }
            if result.total_bytes_processed.is_none() {
                result.total_bytes_processed = page
                    .total_bytes_processed
                    .as_deref()
                    .and_then(|b| b.parse().ok());
            }
            for row in page.rows.take().unwrap_or_default() {
                result.rows.push(decode_row(&fields, row)?);
            }

            page_token = page.page_token.take();
            if page_token.is_none() {
                break;
            }
            debug!(job_id = %job.job_id, rows = result.rows.len(), "Fetching next result page");
        } else {
            debug!(job_id = %job.job_id, "BigQuery job still running");
        }

        page = pages.next_page(&job, page_token.as_deref()).await?;
    }

    result.columns = fields
        .into_iter()
        .map(|f| ColumnInfo::new(f.name, f.field_type))
        .collect();

    Ok(result)
}

/// Maps an API error response to an execution error.
fn parse_error(status: reqwest::StatusCode, body: &str) -> AgentError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return AgentError::execution(format!(
            "Authentication failed. Check your {ACCESS_TOKEN_ENV}."
        ));
    }

    if let Ok(error_response) = serde_json::from_str::<BigQueryErrorResponse>(body) {
        let error = error_response.error;
        let reason = error
            .errors
            .first()
            .and_then(|e| e.reason.as_deref())
            .or(error.status.as_deref());
        return match reason {
            Some(reason) => {
                AgentError::execution(format!("BigQuery error ({}): {}", reason, error.message))
            }
            None => AgentError::execution(format!("BigQuery error: {}", error.message)),
        };
    }

    AgentError::execution(format!("BigQuery API error ({}): {}", status, body))
}

fn decode_row(fields: &[FieldSchema], row: TableRow) -> Result<Row> {
    if row.f.len() != fields.len() {
        return Err(AgentError::execution(format!(
            "BigQuery row has {} cells but the schema has {} fields",
            row.f.len(),
            fields.len()
        )));
    }
    fields
        .iter()
        .zip(row.f)
        .map(|(field, cell)| decode_cell(field, cell.v))
        .collect()
}

/// Converts a wire cell into a scalar according to its column type.
///
/// BigQuery sends every scalar as a JSON string. NUMERIC and BIGNUMERIC stay
/// as their decimal text. Repeated and nested fields are kept as their JSON
/// text.
fn decode_cell(field: &FieldSchema, raw: serde_json::Value) -> Result<Value> {
    let text = match raw {
        serde_json::Value::Null => return Ok(Value::Null),
        serde_json::Value::String(s) if field.mode.as_deref() != Some("REPEATED") => s,
        other => return Ok(Value::String(other.to_string())),
    };

    let parsed = match field.field_type.as_str() {
        "INTEGER" | "INT64" => text.parse().map(Value::Int).ok(),
        "FLOAT" | "FLOAT64" => text.parse().map(Value::Float).ok(),
        "TIMESTAMP" => decode_timestamp(&text),
        "BOOLEAN" | "BOOL" => Some(Value::Bool(text.eq_ignore_ascii_case("true"))),
        "BYTES" => BASE64.decode(&text).map(Value::Bytes).ok(),
        _ => return Ok(Value::String(text)),
    };

    parsed.ok_or_else(|| {
        AgentError::execution(format!(
            "Invalid {} value {:?} in column {}",
            field.field_type, text, field.name
        ))
    })
}

/// Renders a TIMESTAMP cell as RFC 3339 UTC.
///
/// Accepts integer microseconds (`useInt64Timestamp`) and the legacy
/// float-seconds form such as `1.709251200E9`.
fn decode_timestamp(text: &str) -> Option<Value> {
    let micros = match text.parse::<i64>() {
        Ok(micros) => micros,
        Err(_) => {
            let seconds: f64 = text.parse().ok()?;
            if !seconds.is_finite() {
                return None;
            }
            (seconds * 1_000_000.0).round() as i64
        }
    };
    DateTime::from_timestamp_micros(micros)
        .map(|ts| Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
}

// BigQuery API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    /// int64 values travel as JSON strings.
    maximum_bytes_billed: String,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    format_options: FormatOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormatOptions {
    use_int64_timestamp: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    job_reference: Option<JobReference>,
    schema: Option<ResponseSchema>,
    rows: Option<Vec<TableRow>>,
    page_token: Option<String>,
    total_bytes_processed: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct BigQueryErrorResponse {
    error: BigQueryError,
}

#[derive(Debug, Deserialize)]
struct BigQueryError {
    message: String,
    status: Option<String>,
    #[serde(default)]
    errors: Vec<BigQueryErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct BigQueryErrorDetail {
    reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn field(name: &str, field_type: &str) -> FieldSchema {
        FieldSchema {
            name: name.to_string(),
            field_type: field_type.to_string(),
            mode: Some("NULLABLE".to_string()),
        }
    }

    fn test_client() -> BigQueryClient {
        let config = BigQueryConfig::new("acme", "token").unwrap().with_location("EU");
        BigQueryClient::new(config).unwrap()
    }

    #[test]
    fn test_config_new() {
        let config = BigQueryConfig::new("acme", "token").unwrap();
        assert_eq!(config.project, "acme");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.location.is_none());
    }

    #[test]
    fn test_config_with_timeout() {
        let config = BigQueryConfig::new("acme", "token").unwrap().with_timeout(5);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_queries_url() {
        assert_eq!(
            test_client().queries_url(),
            "https://bigquery.googleapis.com/bigquery/v2/projects/acme/queries"
        );
    }

    #[test]
    fn test_results_url_includes_location_and_token() {
        let job = JobReference {
            job_id: "job_123".to_string(),
            location: None,
        };
        let url = test_client().results_url(&job, Some("tok/en")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://bigquery.googleapis.com/bigquery/v2/projects/acme/queries/job_123\
             ?timeoutMs=10000&formatOptions.useInt64Timestamp=true&location=EU&pageToken=tok%2Fen"
        );
    }

    #[test]
    fn test_query_request_wire_format() {
        let request = QueryRequest {
            query: "SELECT 1",
            use_legacy_sql: false,
            maximum_bytes_billed: QueryJobConfig::safety_budget()
                .maximum_bytes_billed
                .to_string(),
            timeout_ms: POLL_TIMEOUT_MS,
            location: None,
            format_options: FormatOptions {
                use_int64_timestamp: true,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "SELECT 1",
                "useLegacySql": false,
                "maximumBytesBilled": "5368709120",
                "timeoutMs": 10000,
                "formatOptions": {"useInt64Timestamp": true}
            })
        );
    }

    #[test]
    fn test_decode_complete_response() {
        let body = r#"{
            "kind": "bigquery#queryResponse",
            "jobReference": {"projectId": "acme", "jobId": "job_1", "location": "US"},
            "jobComplete": true,
            "totalBytesProcessed": "2048",
            "schema": {"fields": [
                {"name": "region", "type": "STRING", "mode": "NULLABLE"},
                {"name": "total", "type": "FLOAT", "mode": "NULLABLE"},
                {"name": "orders", "type": "INTEGER", "mode": "NULLABLE"}
            ]},
            "rows": [
                {"f": [{"v": "EMEA"}, {"v": "1250.5"}, {"v": "12"}]},
                {"f": [{"v": "APAC"}, {"v": "980"}, {"v": null}]}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(response.job_complete);
        assert_eq!(response.total_bytes_processed.as_deref(), Some("2048"));

        let fields = response.schema.unwrap().fields;
        let rows: Vec<Row> = response
            .rows
            .unwrap()
            .into_iter()
            .map(|row| decode_row(&fields, row).unwrap())
            .collect();

        assert_eq!(
            rows,
            vec![
                vec![Value::from("EMEA"), Value::Float(1250.5), Value::Int(12)],
                vec![Value::from("APAC"), Value::Float(980.0), Value::Null],
            ]
        );
    }

    #[test]
    fn test_incomplete_response_defaults() {
        let body = r#"{"jobReference": {"projectId": "acme", "jobId": "job_2"}, "jobComplete": false}"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(!response.job_complete);
        assert!(response.rows.is_none());
        assert_eq!(response.job_reference.unwrap().job_id, "job_2");
    }

    #[test]
    fn test_decode_cell_types() {
        assert_eq!(
            decode_cell(&field("flag", "BOOLEAN"), serde_json::json!("true")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            decode_cell(&field("blob", "BYTES"), serde_json::json!("aGk=")).unwrap(),
            Value::Bytes(b"hi".to_vec())
        );
        assert_eq!(
            decode_cell(&field("day", "DATE"), serde_json::json!("2024-03-01")).unwrap(),
            Value::from("2024-03-01")
        );
        assert_eq!(
            decode_cell(&field("price", "NUMERIC"), serde_json::json!("19.99")).unwrap(),
            Value::from("19.99")
        );
    }

    #[test]
    fn test_decode_cell_decimals_keep_every_digit() {
        assert_eq!(
            decode_cell(
                &field("total", "NUMERIC"),
                serde_json::json!("12345678901234567890.123456789")
            )
            .unwrap(),
            Value::from("12345678901234567890.123456789")
        );
        assert_eq!(
            decode_cell(
                &field("big", "BIGNUMERIC"),
                serde_json::json!("578960446186580977117854925043439539266.3499")
            )
            .unwrap(),
            Value::from("578960446186580977117854925043439539266.3499")
        );
    }

    #[test]
    fn test_decode_cell_timestamp() {
        assert_eq!(
            decode_cell(&field("ts", "TIMESTAMP"), serde_json::json!("1709251200000000")).unwrap(),
            Value::from("2024-03-01T00:00:00Z")
        );
        assert_eq!(
            decode_cell(&field("ts", "TIMESTAMP"), serde_json::json!("1709251200123456")).unwrap(),
            Value::from("2024-03-01T00:00:00.123456Z")
        );
        assert_eq!(
            decode_cell(&field("ts", "TIMESTAMP"), serde_json::json!("1.709251200E9")).unwrap(),
            Value::from("2024-03-01T00:00:00Z")
        );

        let err = decode_cell(&field("ts", "TIMESTAMP"), serde_json::json!("soon")).unwrap_err();
        assert!(err.is_execution());
    }

    #[test]
    fn test_decode_row_rejects_width_mismatch() {
        let fields = vec![field("a", "STRING"), field("b", "STRING")];
        let row: TableRow = serde_json::from_value(serde_json::json!({"f": [{"v": "x"}]})).unwrap();

        let err = decode_row(&fields, row).unwrap_err();
        assert!(err.is_execution());
        assert!(err.to_string().contains("1 cells"));
    }

    /// Serves canned `getQueryResults` pages and records the tokens asked for.
    struct ScriptedPages {
        pages: Mutex<VecDeque<serde_json::Value>>,
        requested: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedPages {
        fn new(pages: Vec<serde_json::Value>) -> Self {
            Self {
                pages: Mutex::new(pages.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<Option<String>> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedPages {
        async fn next_page(
            &self,
            job: &JobReference,
            page_token: Option<&str>,
        ) -> Result<QueryResponse> {
            assert_eq!(job.job_id, "job_9");
            self.requested
                .lock()
                .unwrap()
                .push(page_token.map(str::to_string));
            let page = self
                .pages
                .lock()
                .unwrap()
                .pop_front()
                .expect("no more scripted pages");
            Ok(serde_json::from_value(page).unwrap())
        }
    }

    fn response(value: serde_json::Value) -> QueryResponse {
        serde_json::from_value(value).unwrap()
    }

    fn schema_json() -> serde_json::Value {
        serde_json::json!({"fields": [
            {"name": "region", "type": "STRING"},
            {"name": "orders", "type": "INTEGER"}
        ]})
    }

    #[tokio::test]
    async fn test_collect_job_polls_until_complete() {
        let first = response(serde_json::json!({
            "jobReference": {"jobId": "job_9", "location": "EU"},
            "jobComplete": false
        }));
        let pages = ScriptedPages::new(vec![
            serde_json::json!({"jobReference": {"jobId": "job_9"}, "jobComplete": false}),
            serde_json::json!({
                "jobReference": {"jobId": "job_9"},
                "jobComplete": true,
                "totalBytesProcessed": "4096",
                "schema": schema_json(),
                "rows": [{"f": [{"v": "EMEA"}, {"v": "3"}]}]
            }),
        ]);

        let result = collect_job(first, &pages).await.unwrap();

        assert_eq!(pages.requested(), vec![None, None]);
        assert_eq!(result.job_id.as_deref(), Some("job_9"));
        assert_eq!(result.total_bytes_processed, Some(4096));
        assert_eq!(
            result.columns,
            vec![
                ColumnInfo::new("region", "STRING"),
                ColumnInfo::new("orders", "INTEGER"),
            ]
        );
        assert_eq!(result.rows, vec![vec![Value::from("EMEA"), Value::Int(3)]]);
    }

    #[tokio::test]
    async fn test_collect_job_follows_page_tokens_in_order() {
        let first = response(serde_json::json!({
            "jobReference": {"jobId": "job_9"},
            "jobComplete": true,
            "schema": schema_json(),
            "rows": [{"f": [{"v": "EMEA"}, {"v": "3"}]}, {"f": [{"v": "APAC"}, {"v": "2"}]}],
            "pageToken": "page-2"
        }));
        let pages = ScriptedPages::new(vec![
            serde_json::json!({
                "jobReference": {"jobId": "job_9"},
                "jobComplete": true,
                "rows": [{"f": [{"v": "AMER"}, {"v": "1"}]}],
                "pageToken": "page-3"
            }),
            serde_json::json!({
                "jobReference": {"jobId": "job_9"},
                "jobComplete": true,
                "rows": [{"f": [{"v": "LATAM"}, {"v": null}]}]
            }),
        ]);

        let result = collect_job(first, &pages).await.unwrap();

        assert_eq!(
            pages.requested(),
            vec![Some("page-2".to_string()), Some("page-3".to_string())]
        );
        let regions: Vec<_> = result.rows.iter().map(|row| row[0].clone()).collect();
        assert_eq!(
            regions,
            vec![
                Value::from("EMEA"),
                Value::from("APAC"),
                Value::from("AMER"),
                Value::from("LATAM"),
            ]
        );
        assert_eq!(result.rows[3][1], Value::Null);
    }

    #[tokio::test]
    async fn test_collect_job_requires_job_reference() {
        let first = response(serde_json::json!({"jobComplete": true}));
        let pages = ScriptedPages::new(vec![]);

        let err = collect_job(first, &pages).await.unwrap_err();
        assert!(err.is_execution());
        assert!(pages.requested().is_empty());
    }

    #[test]
    fn test_decode_cell_repeated_kept_as_json() {
        let tags = FieldSchema {
            name: "tags".to_string(),
            field_type: "STRING".to_string(),
            mode: Some("REPEATED".to_string()),
        };
        let value = decode_cell(&tags, serde_json::json!([{"v": "a"}, {"v": "b"}])).unwrap();
        assert_eq!(value, Value::from(r#"[{"v":"a"},{"v":"b"}]"#));
    }

    #[test]
    fn test_decode_cell_invalid_integer() {
        let err = decode_cell(&field("n", "INT64"), serde_json::json!("abc")).unwrap_err();
        assert!(err.is_execution());
        assert!(err.to_string().contains("column n"));
    }

    #[test]
    fn test_parse_error_unauthorized() {
        let err = parse_error(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(err.is_execution());
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_parse_error_bytes_billed_limit() {
        let body = r#"{"error": {
            "code": 400,
            "message": "Query exceeded limit for bytes billed: 5368709120. 10485760000 or higher required.",
            "errors": [{"message": "...", "domain": "global", "reason": "bytesBilledLimitExceeded"}],
            "status": "INVALID_ARGUMENT"
        }}"#;
        let err = parse_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(err.is_execution());
        assert!(err
            .to_string()
            .contains("BigQuery error (bytesBilledLimitExceeded): Query exceeded limit"));
    }

    #[test]
    fn test_parse_error_unstructured_body() {
        let err = parse_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("upstream down"));
    }
}
