//! Upstream envelope acquisition
//!
//! CDD Principle: Infrastructure Layer - everything here is a collaborator of
//! the core transform, not part of it
//! - The core only requires "bytes in, matching the record field contract"
//! - A local JSON file and a live Information Service query produce the same
//!   envelope shape, so the decoder never knows which one ran
//! - Any timeout or retry policy belongs here, not in the transform

use crate::domain::records::{ReportError, ReportResult};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

/// Environment variable carrying the Information Service hostname
const ENV_HOSTNAME: &str = "solarwinds_hostname";
/// Environment variable carrying the query username
const ENV_USERNAME: &str = "solarwinds_username";
/// Environment variable carrying the query password
const ENV_PASSWORD: &str = "solarwinds_password";

/// Port and path of the SWIS JSON query endpoint
const SWIS_QUERY_PORT: u16 = 17778;
const SWIS_QUERY_PATH: &str = "/SolarWinds/InformationService/v3/Json/Query";

/// SWQL query selecting the cached policy results for each node's most
/// recent Running configuration, restricted to rows flagged as violations.
const VIOLATION_QUERY: &str = "\
SELECT DISTINCT
    NCM_Nodes.NodeID
    , NCM_Nodes.NodeCaption
    , CacheResults.XMLResults
    , CacheResults.RuleName
FROM Cirrus.Nodes AS NCM_Nodes
INNER JOIN Cirrus.ConfigArchive AS ConfigArchive ON NCM_Nodes.NodeID = ConfigArchive.NodeID
INNER JOIN Cirrus.PolicyCacheResults AS CacheResults ON ConfigArchive.ConfigID = CacheResults.ConfigID
INNER JOIN (
    SELECT
        ConfigArchive.NodeID
        , MAX(ConfigArchive.DownloadTime) AS MostRecentDownload
    FROM Cirrus.ConfigArchive AS ConfigArchive
    WHERE ConfigArchive.ConfigType = 'Running'
    GROUP BY ConfigArchive.NodeID
) tbl1 ON ConfigArchive.NodeID = tbl1.NodeID AND ConfigArchive.DownloadTime = tbl1.MostRecentDownload
WHERE NCM_Nodes.MachineType LIKE '%36xx%'
AND CacheResults.IsViolation = 'True'";

/// Read an envelope from a local JSON file.
pub fn read_envelope_file<P: AsRef<Path>>(path: P) -> ReportResult<Vec<u8>> {
    let bytes = std::fs::read(path.as_ref())?;

    tracing::debug!(path = %path.as_ref().display(), len = bytes.len(), "read envelope file");

    Ok(bytes)
}

/// Connection settings for the SolarWinds Information Service.
#[derive(Debug, Clone)]
pub struct SwisConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl SwisConfig {
    /// Load settings from the conventional environment variables.
    pub fn from_env() -> ReportResult<Self> {
        Ok(Self {
            hostname: require_env(ENV_HOSTNAME, "hostname")?,
            username: require_env(ENV_USERNAME, "username")?,
            password: require_env(ENV_PASSWORD, "password")?,
        })
    }
}

fn require_env(var: &str, what: &str) -> ReportResult<String> {
    std::env::var(var)
        .map_err(|_| ReportError::config(format!("You must provide a {what} (env: {var})")))
}

/// Shape of a SWIS JSON query response: the rows live under `results`.
#[derive(Debug, Deserialize)]
struct SwisResponse {
    results: Vec<JsonValue>,
}

/// Minimal blocking client for the SWIS JSON query endpoint.
pub struct SwisClient {
    config: SwisConfig,
    http: reqwest::blocking::Client,
}

impl SwisClient {
    /// Build a client for the given connection settings.
    ///
    /// Certificate verification is disabled: SWIS ships with a self-signed
    /// certificate on its query port.
    pub fn new(config: SwisConfig) -> ReportResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| ReportError::source(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// Query violation records, optionally restricted to a single rule name.
    ///
    /// The response's `results` array is re-serialized so the decoder always
    /// sees one uniform envelope shape regardless of the source.
    pub fn query_violations(&self, rule_name: Option<&str>) -> ReportResult<Vec<u8>> {
        let (query, parameters) = build_query(rule_name);

        let url = format!(
            "https://{}:{}{}",
            self.config.hostname, SWIS_QUERY_PORT, SWIS_QUERY_PATH
        );

        tracing::debug!(%url, rule = rule_name.unwrap_or("<all>"), "querying SWIS");

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&serde_json::json!({
                "query": query,
                "parameters": parameters,
            }))
            .send()
            .map_err(|e| ReportError::source(format!("query request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::source(format!(
                "query returned HTTP {status}"
            )));
        }

        let body: SwisResponse = response
            .json()
            .map_err(|e| ReportError::source(format!("malformed query response: {e}")))?;

        serde_json::to_vec(&body.results)
            .map_err(|e| ReportError::source(format!("failed to re-encode results: {e}")))
    }
}

/// Build the SWQL query text and its parameter map.
fn build_query(rule_name: Option<&str>) -> (String, HashMap<&'static str, String>) {
    let mut query = VIOLATION_QUERY.to_string();
    let mut parameters = HashMap::new();

    if let Some(rule) = rule_name {
        query.push_str("\nAND CacheResults.RuleName = @ruleName");
        parameters.insert("ruleName", rule.to_string());
    }

    (query, parameters)
}
