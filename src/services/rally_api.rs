use std::env;
use std::fs;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::services::data_source::{DataSourceError, Filter, ItemStore, Record, StoreQuery};

const API_KEY_HEADER: &str = "ZSESSIONID";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RallyConfig {
    pub base_url: String,
    pub workspace: Option<String>,
    pub leaf_type: String,
    pub state_field: String,
    pub page_size: usize,
}

impl Default for RallyConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            workspace: None,
            leaf_type: "HierarchicalRequirement".to_string(),
            state_field: "ScheduleState".to_string(),
            page_size: 200,
        }
    }
}

impl RallyConfig {
    pub fn from_yaml_file(filepath: &str) -> Result<Self, DataSourceError> {
        let contents = fs::read_to_string(filepath)
            .map_err(|err| DataSourceError::Other(format!("failed to read config: {err}")))?;
        serde_yaml::from_str(&contents).map_err(|_| DataSourceError::Parse)
    }
}

pub struct RallyConfigParser;

impl RallyConfigParser {
    pub fn parse(&self, filepath: &str) -> Result<RallyConfig, DataSourceError> {
        RallyConfig::from_yaml_file(filepath)
    }
}

#[derive(Debug, Clone)]
pub struct AuthData {
    pub api_key: String,
}

impl AuthData {
    pub fn from_env() -> Result<Self, DataSourceError> {
        match env::var("RALLY_API_KEY") {
            Ok(api_key) if !api_key.is_empty() => Ok(Self { api_key }),
            _ => Err(DataSourceError::Unauthorized),
        }
    }
}

pub struct RallyApiClient {
    config: RallyConfig,
    auth: AuthData,
    client: Client,
}

impl RallyApiClient {
    pub fn new(config: RallyConfig, auth: AuthData) -> Result<Self, DataSourceError> {
        if config.base_url.is_empty() {
            return Err(DataSourceError::Other(
                "rally config is missing base_url".to_string(),
            ));
        }
        if config.page_size == 0 {
            return Err(DataSourceError::Other(
                "rally config page_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            config,
            auth,
            client: Client::new(),
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            model.to_ascii_lowercase()
        )
    }

    async fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, DataSourceError> {
        debug!(url, "rally request");
        let response = self
            .client
            .get(url)
            .query(params)
            .header(API_KEY_HEADER, &self.auth.api_key)
            .send()
            .await
            .map_err(|_| DataSourceError::Connection)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(DataSourceError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(DataSourceError::NotFound);
        }
        if !status.is_success() {
            return Err(DataSourceError::Connection);
        }

        response
            .json::<Value>()
            .await
            .map_err(|_| DataSourceError::Parse)
    }

    /// Follows `start`/`pagesize` paging until `limit` or the result count is reached.
    async fn fetch_all_results(
        &self,
        url: &str,
        base_params: Vec<(&str, String)>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, DataSourceError> {
        let page_size = match limit {
            Some(limit) => limit.clamp(1, self.config.page_size),
            None => self.config.page_size,
        };
        let mut records = Vec::new();
        let mut start: usize = 1;

        loop {
            let mut params = base_params.clone();
            params.push(("start", start.to_string()));
            params.push(("pagesize", page_size.to_string()));

            let payload = self.fetch_json(url, &params).await?;
            let result = payload.get("QueryResult").ok_or(DataSourceError::Parse)?;
            check_errors(result)?;

            let page = result
                .get("Results")
                .and_then(Value::as_array)
                .ok_or(DataSourceError::Parse)?;
            for item in page {
                if let Some(object) = item.as_object() {
                    records.push(Record::new(object.clone()));
                }
            }

            if let Some(limit) = limit {
                if records.len() >= limit {
                    records.truncate(limit);
                    break;
                }
            }

            let total = result
                .get("TotalResultCount")
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;
            if page.is_empty() || start - 1 + page.len() >= total {
                break;
            }
            start += page.len();
        }

        Ok(records)
    }

    fn scope_params(&self, project_scoped: bool) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(workspace) = &self.config.workspace {
            params.push(("workspace", workspace.clone()));
        }
        if !project_scoped {
            params.push(("project", "null".to_string()));
        }
        params
    }

    fn query_params(&self, query: &StoreQuery) -> Vec<(&'static str, String)> {
        let mut params = self.scope_params(query.project_scoped);
        params.push(("fetch", query.fetch.join(",")));
        if let Some(query_string) = query.query_string() {
            params.push(("query", query_string));
        }
        params
    }
}

fn check_errors(result: &Value) -> Result<(), DataSourceError> {
    let errors: Vec<&str> = result
        .get("Errors")
        .and_then(Value::as_array)
        .map(|errors| errors.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DataSourceError::Other(errors.join("; ")))
    }
}

#[async_trait]
impl ItemStore for RallyApiClient {
    async fn load(
        &self,
        model: &str,
        object_id: u64,
        fetch: &[&str],
    ) -> Result<Option<Record>, DataSourceError> {
        let url = format!("{}/{object_id}", self.model_url(model));
        let mut params = self.scope_params(true);
        params.push(("fetch", fetch.join(",")));

        let payload = match self.fetch_json(&url, &params).await {
            Ok(payload) => payload,
            Err(DataSourceError::NotFound) => return Ok(None),
            Err(err) => return Err(err),
        };
        let object = payload.as_object().ok_or(DataSourceError::Parse)?;

        if let Some(found) = object
            .iter()
            .find(|(key, value)| key.as_str() != "OperationResult" && value.is_object())
            .and_then(|(_, value)| value.as_object())
        {
            return Ok(Some(Record::new(found.clone())));
        }

        match object.get("OperationResult") {
            Some(result) => match check_errors(result) {
                Err(DataSourceError::Other(message)) if message.contains("Cannot find") => Ok(None),
                Err(err) => Err(err),
                Ok(()) => Ok(None),
            },
            None => Err(DataSourceError::Parse),
        }
    }

    async fn query(&self, query: &StoreQuery) -> Result<Vec<Record>, DataSourceError> {
        let url = self.model_url(&query.model);
        let params = self.query_params(query);
        self.fetch_all_results(&url, params, query.limit).await
    }

    async fn allowed_values(
        &self,
        model: &str,
        field: &str,
    ) -> Result<Vec<String>, DataSourceError> {
        let type_query = StoreQuery::new("TypeDefinition", &["ObjectID"])
            .filter(Filter::equals("TypePath", model));
        let Some(type_definition) = self.query(&type_query).await?.into_iter().next() else {
            return Ok(Vec::new());
        };
        let type_id = type_definition.id().ok_or(DataSourceError::Parse)?;

        let attributes_url = format!("{}/{type_id}/attributes", self.model_url("TypeDefinition"));
        let attribute_params = vec![
            ("fetch", "ElementName,AllowedValues".to_string()),
            (
                "query",
                Filter::equals("ElementName", field).to_query_string(),
            ),
        ];
        let attributes = self
            .fetch_all_results(&attributes_url, attribute_params, Some(1))
            .await?;
        let Some(values_ref) = attributes
            .first()
            .and_then(|attribute| attribute.get_record("AllowedValues"))
            .and_then(|values| values.get_str("_ref").map(str::to_string))
        else {
            return Ok(Vec::new());
        };

        let values = self
            .fetch_all_results(&values_ref, vec![("fetch", "StringValue".to_string())], None)
            .await?;
        Ok(values
            .iter()
            .filter_map(|value| value.get_str("StringValue").map(str::to_string))
            .collect())
    }
}
