use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use tokio::sync::Notify;

use crate::domain::milestone::Milestone;
use crate::domain::portfolio_item::PortfolioItem;
use crate::domain::project::Project;
use crate::domain::scope::AggregatedScope;
use crate::services::data_source::{
    DataSourceError, Filter, ItemStore, Operator, Record, StoreQuery,
};

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn build_portfolio_item(
    id: u64,
    project_id: u64,
    project_name: &str,
    accepted_points: f64,
    total_points: f64,
) -> PortfolioItem {
    let mut item = PortfolioItem::new(id);
    item.name = Some(format!("Feature {id}"));
    item.project = Some(Project {
        id: project_id,
        name: project_name.to_string(),
    });
    item.accepted_points = accepted_points;
    item.total_points = total_points;
    item
}

/// Scope with one portfolio item per `(item_id, project_id)` pair.
pub fn build_scope(items: &[(u64, u64)]) -> AggregatedScope {
    AggregatedScope {
        milestone: Milestone::new(1),
        portfolio_item_type: Some("PortfolioItem/Feature".to_string()),
        portfolio_items: items
            .iter()
            .map(|(id, project_id)| {
                build_portfolio_item(*id, *project_id, &format!("Team {project_id}"), 0.0, 0.0)
            })
            .collect(),
        leaf_type: "HierarchicalRequirement".to_string(),
        state_field: "ScheduleState".to_string(),
        schedule_states: vec![
            "Defined".to_string(),
            "In-Progress".to_string(),
            "Completed".to_string(),
        ],
    }
}

/// Portfolio item as the item store returns it.
pub fn portfolio_item_record(
    id: u64,
    project_id: u64,
    project_name: &str,
    accepted_points: f64,
    total_points: f64,
    actual_start_date: Option<&str>,
) -> Map<String, Value> {
    json!({
        "ObjectID": id,
        "_ref": format!("/portfolioitem/feature/{id}"),
        "Name": format!("Feature {id}"),
        "Project": {
            "_ref": format!("/project/{project_id}"),
            "ObjectID": project_id,
            "Name": project_name
        },
        "ActualStartDate": actual_start_date,
        "PlannedEndDate": null,
        "AcceptedLeafStoryPlanEstimateTotal": accepted_points,
        "LeafStoryPlanEstimateTotal": total_points
    })
    .as_object()
    .cloned()
    .unwrap()
}

#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn total(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory item store that evaluates filters against stored records.
#[derive(Default)]
pub struct InMemoryStore {
    milestones: HashMap<u64, Record>,
    records: HashMap<String, Vec<Record>>,
    allowed_values: HashMap<(String, String), Vec<String>>,
    milestone_failures: HashMap<u64, DataSourceError>,
    query_failure: Option<DataSourceError>,
    allowed_values_failure: Option<DataSourceError>,
    gates: Mutex<HashMap<u64, Arc<Notify>>>,
    loads: Mutex<Vec<(String, u64, Vec<String>)>>,
    queries: Mutex<Vec<StoreQuery>>,
    calls: CallCounter,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_milestone(mut self, id: u64, target_date: Option<&str>) -> Self {
        let record = json!({"ObjectID": id, "TargetDate": target_date});
        self.milestones
            .insert(id, Record::new(record.as_object().cloned().unwrap()));
        self
    }

    pub fn with_portfolio_item_type(mut self, type_path: &str) -> Self {
        let record = json!({
            "TypePath": type_path,
            "Ordinal": 0,
            "Parent": {"Name": "Portfolio Item"}
        });
        self.records
            .entry("TypeDefinition".to_string())
            .or_default()
            .push(Record::new(record.as_object().cloned().unwrap()));
        self
    }

    pub fn with_portfolio_item(
        mut self,
        type_path: &str,
        milestone_ref: &str,
        mut record: Map<String, Value>,
    ) -> Self {
        record.insert("Milestones".to_string(), json!([milestone_ref]));
        self.records
            .entry(type_path.to_string())
            .or_default()
            .push(Record::new(record));
        self
    }

    pub fn with_schedule_states(mut self, model: &str, field: &str, states: &[&str]) -> Self {
        self.allowed_values.insert(
            (model.to_string(), field.to_string()),
            states.iter().map(|state| state.to_string()).collect(),
        );
        self
    }

    pub fn failing_milestone(mut self, id: u64, error: DataSourceError) -> Self {
        self.milestone_failures.insert(id, error);
        self
    }

    pub fn failing_queries(mut self, error: DataSourceError) -> Self {
        self.query_failure = Some(error);
        self
    }

    pub fn failing_allowed_values(mut self, error: DataSourceError) -> Self {
        self.allowed_values_failure = Some(error);
        self
    }

    /// Holds milestone `id` loads until the returned gate is notified.
    pub fn gate_milestone(&self, id: u64) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub fn loads(&self) -> Vec<(String, u64, Vec<String>)> {
        self.loads.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<StoreQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

fn lookup(record: &Record, path: &str) -> Option<Value> {
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?.clone();
    for part in parts {
        current = current.get(part)?.clone();
    }
    Some(current)
}

fn matches(record: &Record, filter: &Filter) -> bool {
    match filter {
        Filter::And(filters) => filters.iter().all(|inner| matches(record, inner)),
        Filter::Property {
            property,
            operator: Operator::Equals,
            value,
        } => lookup(record, property).as_ref() == Some(value),
        Filter::Property {
            property,
            operator: Operator::Contains,
            value,
        } => match lookup(record, property) {
            Some(Value::Array(values)) => values.contains(value),
            _ => false,
        },
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn load(
        &self,
        model: &str,
        object_id: u64,
        fetch: &[&str],
    ) -> Result<Option<Record>, DataSourceError> {
        self.calls.bump();
        self.loads.lock().unwrap().push((
            model.to_string(),
            object_id,
            fetch.iter().map(|field| field.to_string()).collect(),
        ));
        let gate = self.gates.lock().unwrap().get(&object_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(error) = self.milestone_failures.get(&object_id) {
            return Err(error.clone());
        }
        Ok(self.milestones.get(&object_id).cloned())
    }

    async fn query(&self, query: &StoreQuery) -> Result<Vec<Record>, DataSourceError> {
        self.calls.bump();
        self.queries.lock().unwrap().push(query.clone());
        if let Some(error) = &self.query_failure {
            return Err(error.clone());
        }
        let records = self.records.get(&query.model).cloned().unwrap_or_default();
        let mut matching: Vec<Record> = records
            .into_iter()
            .filter(|record| query.filters.iter().all(|filter| matches(record, filter)))
            .collect();
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn allowed_values(
        &self,
        model: &str,
        field: &str,
    ) -> Result<Vec<String>, DataSourceError> {
        self.calls.bump();
        if let Some(error) = &self.allowed_values_failure {
            return Err(error.clone());
        }
        Ok(self
            .allowed_values
            .get(&(model.to_string(), field.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
