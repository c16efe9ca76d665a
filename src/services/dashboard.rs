use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, error, info};

use crate::domain::project::Project;
use crate::domain::scope::{ActiveProjectSelection, AggregatedScope};
use crate::services::chart_request::{ChartRequest, build_chart_request};
use crate::services::data_source::ItemStore;
use crate::services::filter_projector::project_projects;
use crate::services::orchestrator::{LoadError, LoadSettings, load_all};
use crate::services::summary_metrics::{Summary, compute_summary};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("no milestone scope has been loaded")]
    NoScopeLoaded,
    #[error("project {0} is not part of the loaded scope")]
    UnknownProject(u64),
    #[error("a milestone load is in progress")]
    LoadInFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Emitted once per successful load.
    ScopeReady {
        generation: u64,
        projects: Vec<Project>,
        chart: ChartRequest,
    },
    /// The project selection changed; only the query was rebuilt. Tagged
    /// with the generation of the scope the chart was built from.
    ChartRebuilt { generation: u64, chart: ChartRequest },
    LoadFailed { generation: u64, error: LoadError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Published { generation: u64 },
    /// A newer load started while this one was in flight; its result was dropped.
    Superseded { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadTicket {
    generation: u64,
}

#[derive(Debug, Default)]
struct DashboardState {
    /// Newest ticket handed out.
    generation: u64,
    /// Ticket that produced `scope`.
    published: u64,
    /// The newest ticket has not completed yet.
    loading: bool,
    scope: Option<AggregatedScope>,
    projects: Vec<Project>,
    selection: ActiveProjectSelection,
}

/// Owns the published milestone scope and the project selection.
///
/// Every load takes a generation ticket; a result is published only while
/// its ticket is still the newest, so a slow earlier load can never
/// overwrite a later one. Selection changes are refused while the newest
/// load is outstanding, since they would apply to a scope about to be
/// replaced.
pub struct Dashboard {
    store: Box<dyn ItemStore>,
    settings: LoadSettings,
    state: Mutex<DashboardState>,
    events: UnboundedSender<DashboardEvent>,
}

impl Dashboard {
    pub fn new(
        store: Box<dyn ItemStore>,
        settings: LoadSettings,
    ) -> (Self, UnboundedReceiver<DashboardEvent>) {
        let (events, receiver) = unbounded_channel();
        let dashboard = Self {
            store,
            settings,
            state: Mutex::new(DashboardState::default()),
            events,
        };
        (dashboard, receiver)
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: DashboardEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.events.send(event);
    }

    /// Handles a milestone `ready`/`select` event.
    pub async fn load(&self, milestone_ref: &str) -> Result<LoadOutcome, DashboardError> {
        let ticket = self.begin_load();
        let result = load_all(self.store.as_ref(), milestone_ref, &self.settings).await;
        self.complete_load(ticket, result)
    }

    fn begin_load(&self) -> LoadTicket {
        let mut state = self.state();
        state.generation += 1;
        state.loading = true;
        debug!(generation = state.generation, "load started");
        LoadTicket {
            generation: state.generation,
        }
    }

    fn complete_load(
        &self,
        ticket: LoadTicket,
        result: Result<AggregatedScope, LoadError>,
    ) -> Result<LoadOutcome, DashboardError> {
        let mut state = self.state();
        if state.generation != ticket.generation {
            info!(
                generation = ticket.generation,
                current = state.generation,
                "dropping stale load result"
            );
            return Ok(LoadOutcome::Superseded {
                generation: ticket.generation,
            });
        }
        state.loading = false;

        let scope = match result {
            Ok(scope) => scope,
            Err(err) => {
                error!(generation = ticket.generation, error = %err, "milestone load failed");
                self.emit(DashboardEvent::LoadFailed {
                    generation: ticket.generation,
                    error: err.clone(),
                });
                return Err(err.into());
            }
        };

        let projects = project_projects(&scope.portfolio_items);
        let selection = ActiveProjectSelection::all_of(&projects);
        let chart = build_chart_request(&scope, &selection);

        *state = DashboardState {
            generation: ticket.generation,
            published: ticket.generation,
            loading: false,
            scope: Some(scope),
            projects: projects.clone(),
            selection,
        };
        drop(state);

        info!(
            generation = ticket.generation,
            projects = projects.len(),
            "milestone scope ready"
        );
        self.emit(DashboardEvent::ScopeReady {
            generation: ticket.generation,
            projects,
            chart,
        });
        Ok(LoadOutcome::Published {
            generation: ticket.generation,
        })
    }

    /// Handles a single checkbox change.
    pub fn toggle_project(
        &self,
        project_id: u64,
        checked: bool,
    ) -> Result<ChartRequest, DashboardError> {
        self.update_selection(|projects, selection| {
            if !projects.iter().any(|project| project.id == project_id) {
                return Err(DashboardError::UnknownProject(project_id));
            }
            selection.set(project_id, checked);
            Ok(())
        })
    }

    /// Replaces the selection with the checkbox group's current checked set.
    pub fn set_active_projects<I: IntoIterator<Item = u64>>(
        &self,
        project_ids: I,
    ) -> Result<ChartRequest, DashboardError> {
        let requested = ActiveProjectSelection::from_ids(project_ids);
        self.update_selection(|projects, selection| {
            if let Some(unknown) = requested
                .ids()
                .into_iter()
                .find(|id| !projects.iter().any(|project| project.id == *id))
            {
                return Err(DashboardError::UnknownProject(unknown));
            }
            *selection = requested.clone();
            Ok(())
        })
    }

    fn update_selection<F>(&self, update: F) -> Result<ChartRequest, DashboardError>
    where
        F: FnOnce(&[Project], &mut ActiveProjectSelection) -> Result<(), DashboardError>,
    {
        let mut state = self.state();
        if state.loading {
            return Err(DashboardError::LoadInFlight);
        }
        let DashboardState {
            published,
            scope,
            projects,
            selection,
            ..
        } = &mut *state;
        let scope = scope.as_ref().ok_or(DashboardError::NoScopeLoaded)?;

        let mut updated = selection.clone();
        update(projects, &mut updated)?;
        *selection = updated;

        let chart = build_chart_request(scope, selection);
        let generation = *published;
        drop(state);

        debug!(generation, "project selection changed");
        self.emit(DashboardEvent::ChartRebuilt {
            generation,
            chart: chart.clone(),
        });
        Ok(chart)
    }

    pub fn scope(&self) -> Option<AggregatedScope> {
        self.state().scope.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state().projects.clone()
    }

    pub fn active_projects(&self) -> ActiveProjectSelection {
        self.state().selection.clone()
    }

    pub fn chart_request(&self) -> Option<ChartRequest> {
        let state = self.state();
        state
            .scope
            .as_ref()
            .map(|scope| build_chart_request(scope, &state.selection))
    }

    pub fn summary(&self) -> Option<Summary> {
        self.state()
            .scope
            .as_ref()
            .map(|scope| compute_summary(&scope.portfolio_items))
    }
}
