use std::collections::HashMap;
use std::net::SocketAddr;

use assert_fs::prelude::*;
use serde_json::{Value, json};
use warp::Filter;
use warp::http::StatusCode;

type Params = HashMap<String, String>;

/// Knobs for the mock Rally server.
#[derive(Clone, Default)]
pub struct MockRally {
    pub failing_allowed_values: bool,
}

fn page(results: Vec<Value>, params: &Params) -> Value {
    let start: usize = params
        .get("start")
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);
    let page_size: usize = params
        .get("pagesize")
        .and_then(|value| value.parse().ok())
        .unwrap_or(200);
    let total = results.len();
    let slice: Vec<Value> = results
        .into_iter()
        .skip(start - 1)
        .take(page_size)
        .collect();
    json!({
        "QueryResult": {
            "Errors": [],
            "TotalResultCount": total,
            "StartIndex": start,
            "PageSize": page_size,
            "Results": slice
        }
    })
}

fn portfolio_items() -> Vec<Value> {
    vec![
        json!({
            "ObjectID": 21,
            "Name": "Checkout",
            "Project": {"_ref": "/project/10", "ObjectID": 10, "Name": "Team A"},
            "PreliminaryEstimate": {"_refObjectName": "M"},
            "ActualStartDate": "2024-01-15T08:00:00.000Z",
            "PlannedEndDate": "2024-06-01T08:00:00.000Z",
            "AcceptedLeafStoryPlanEstimateTotal": 5,
            "LeafStoryPlanEstimateTotal": 10
        }),
        json!({
            "ObjectID": 22,
            "Name": "Search",
            "Project": {"_ref": "/project/20", "ObjectID": 20, "Name": "Team B"},
            "PreliminaryEstimate": null,
            "ActualStartDate": null,
            "PlannedEndDate": null,
            "AcceptedLeafStoryPlanEstimateTotal": 10,
            "LeafStoryPlanEstimateTotal": 10
        }),
    ]
}

/// Serves milestone 12 (two features in two projects) and the
/// ScheduleState allowed values.
pub fn spawn_mock_rally(mock: MockRally) -> SocketAddr {
    let milestone = warp::path!("milestone" / u64).map(|id: u64| {
        if id == 12 {
            warp::reply::with_status(
                warp::reply::json(&json!({
                    "Milestone": {"ObjectID": 12, "TargetDate": "2024-06-30T06:00:00.000Z"}
                })),
                StatusCode::OK,
            )
        } else {
            warp::reply::with_status(warp::reply::json(&json!({})), StatusCode::NOT_FOUND)
        }
    });

    let type_definitions = warp::path!("typedefinition")
        .and(warp::query::<Params>())
        .map(|params: Params| {
            let query = params.get("query").cloned().unwrap_or_default();
            let results = if query.contains("Portfolio Item") && query.contains("Ordinal = 0") {
                vec![json!({"TypePath": "PortfolioItem/Feature"})]
            } else if query.contains("TypePath = \"HierarchicalRequirement\"") {
                vec![json!({"ObjectID": 555})]
            } else {
                vec![]
            };
            warp::reply::json(&page(results, &params))
        });

    let attributes = warp::path!("typedefinition" / u64 / "attributes")
        .and(warp::header::<String>("host"))
        .and(warp::query::<Params>())
        .map(|_type_id: u64, host: String, params: Params| {
            let results = vec![json!({
                "ElementName": "ScheduleState",
                "AllowedValues": {"_ref": format!("http://{host}/allowedattributevalues/777")}
            })];
            warp::reply::json(&page(results, &params))
        });

    let allowed_values = warp::path!("allowedattributevalues" / u64)
        .and(warp::query::<Params>())
        .map(move |_id: u64, params: Params| {
            if mock.failing_allowed_values {
                return warp::reply::with_status(
                    warp::reply::json(&json!({})),
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
            }
            let results = ["Defined", "In-Progress", "Completed", "Accepted"]
                .iter()
                .map(|value| json!({"StringValue": value}))
                .collect();
            warp::reply::with_status(warp::reply::json(&page(results, &params)), StatusCode::OK)
        });

    let features = warp::path!("portfolioitem" / "feature")
        .and(warp::query::<Params>())
        .map(|params: Params| {
            let query = params.get("query").cloned().unwrap_or_default();
            let results = if query == "(Milestones contains \"/milestone/12\")" {
                portfolio_items()
            } else {
                vec![]
            };
            warp::reply::json(&page(results, &params))
        });

    let routes = warp::get().and(
        milestone
            .or(type_definitions)
            .or(attributes)
            .or(allowed_values)
            .or(features),
    );
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// Writes a Rally config pointing at `addr`; page size 1 forces paging.
pub fn write_config(addr: SocketAddr) -> assert_fs::NamedTempFile {
    let config_yaml = format!(
        r#"
base_url: http://{addr}
workspace: /workspace/1
page_size: 1
"#
    );
    let config_file = assert_fs::NamedTempFile::new("rally_config.yaml").unwrap();
    config_file.write_str(&config_yaml).unwrap();
    config_file
}
