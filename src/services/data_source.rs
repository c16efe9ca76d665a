use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::reference::object_id_from_ref;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("resource not found")]
    NotFound,
    #[error("connection error")]
    Connection,
    #[error("parse error")]
    Parse,
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Contains,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::Contains => "contains",
        }
    }
}

/// A query predicate in the remote item store's filter language.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Property {
        property: String,
        operator: Operator,
        value: Value,
    },
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(property: &str, value: impl Into<Value>) -> Self {
        Filter::Property {
            property: property.to_string(),
            operator: Operator::Equals,
            value: value.into(),
        }
    }

    pub fn contains(property: &str, value: impl Into<Value>) -> Self {
        Filter::Property {
            property: property.to_string(),
            operator: Operator::Contains,
            value: value.into(),
        }
    }

    /// Renders the WSAPI query syntax, e.g. `((A = "x") AND (B = 0))`.
    pub fn to_query_string(&self) -> String {
        match self {
            Filter::Property {
                property,
                operator,
                value,
            } => format!("({property} {} {})", operator.as_str(), format_value(value)),
            Filter::And(filters) => {
                let mut rendered = filters.iter().map(Filter::to_query_string);
                let Some(first) = rendered.next() else {
                    return String::new();
                };
                rendered.fold(first, |acc, next| format!("({acc} AND {next})"))
            }
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("\"{}\"", text.replace('"', "\\\"")),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Describes a collection query against the remote item store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub model: String,
    pub fetch: Vec<String>,
    pub filters: Vec<Filter>,
    /// `None` requests every matching record.
    pub limit: Option<usize>,
    /// When false the query spans the whole workspace instead of the
    /// caller's default project.
    pub project_scoped: bool,
}

impl StoreQuery {
    pub fn new(model: &str, fetch: &[&str]) -> Self {
        Self {
            model: model.to_string(),
            fetch: fetch.iter().map(|field| field.to_string()).collect(),
            filters: Vec::new(),
            limit: None,
            project_scoped: true,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn workspace_wide(mut self) -> Self {
        self.project_scoped = false;
        self
    }

    /// All filters combined with AND, or `None` when unfiltered.
    pub fn query_string(&self) -> Option<String> {
        match self.filters.len() {
            0 => None,
            1 => Some(self.filters[0].to_query_string()),
            _ => Some(Filter::And(self.filters.clone()).to_query_string()),
        }
    }
}

/// One record returned by the item store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// `ObjectID` when present, otherwise the id encoded in `_ref`.
    pub fn id(&self) -> Option<u64> {
        id_of(self.get("ObjectID"), self.get_str("_ref"))
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.parse::<f64>().ok(),
            _ => None,
        })
    }

    pub fn get_date(&self, field: &str) -> Option<NaiveDate> {
        parse_date_opt(self.get_str(field))
    }

    pub fn get_record(&self, field: &str) -> Option<Record> {
        self.get(field)
            .and_then(Value::as_object)
            .map(|object| Record::new(object.clone()))
    }

    /// Display name of a nested object: `Name`, else `_refObjectName`.
    pub fn display_name(&self) -> Option<&str> {
        self.get_str("Name").or_else(|| self.get_str("_refObjectName"))
    }
}

fn id_of(object_id: Option<&Value>, reference: Option<&str>) -> Option<u64> {
    let from_object_id = object_id.and_then(|value| match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse::<u64>().ok(),
        _ => None,
    });
    from_object_id.or_else(|| reference.and_then(|text| object_id_from_ref(text).ok()))
}

pub fn parse_date_opt(value: Option<&str>) -> Option<NaiveDate> {
    let text = value?;
    let date = if let Some((date_part, _)) = text.split_once('T') {
        date_part
    } else {
        text
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Capabilities the pipeline needs from a remote work item store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Reads a single object; `Ok(None)` when it does not exist.
    async fn load(
        &self,
        model: &str,
        object_id: u64,
        fetch: &[&str],
    ) -> Result<Option<Record>, DataSourceError>;

    async fn query(&self, query: &StoreQuery) -> Result<Vec<Record>, DataSourceError>;

    /// Allowed values of `field` on `model`, in declared order.
    async fn allowed_values(&self, model: &str, field: &str)
    -> Result<Vec<String>, DataSourceError>;
}
