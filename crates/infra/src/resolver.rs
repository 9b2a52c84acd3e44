//! Employee search with last-request-wins semantics.
//!
//! Every search takes a token from a monotonically increasing counter. A
//! response is applied only if its token is still the latest when it
//! arrives; anything older is discarded, whatever order the directory
//! answers in.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use paydesk_deductions::Employee;

use crate::context::InstitutionContext;
use crate::gateway::{EmployeeDirectory, GatewayError};

pub const EMPTY_QUERY_MESSAGE: &str = "Enter a national ID or employee number to search";

/// What the UI shows for the search panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    /// Query whose results are displayed.
    pub query: String,
    pub results: Vec<Employee>,
    /// A non-empty query has completed at least once; separates
    /// "no matches" from "not searched yet".
    pub attempted: bool,
    pub in_flight: bool,
    pub validation_message: Option<String>,
    pub last_error: Option<GatewayError>,
}

impl SearchView {
    pub fn no_matches(&self) -> bool {
        self.attempted && self.results.is_empty() && self.last_error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied(Vec<Employee>),
    /// A newer search superseded this one; nothing was changed.
    Stale,
    /// Blank query: no call was made.
    EmptyQuery,
    /// The directory failed; previous results stay visible.
    Failed(GatewayError),
}

#[derive(Debug, Default)]
struct SearchState {
    latest_token: u64,
    view: SearchView,
}

#[derive(Clone)]
pub struct EmployeeResolver {
    context: InstitutionContext,
    directory: Arc<dyn EmployeeDirectory>,
    state: Arc<Mutex<SearchState>>,
}

impl EmployeeResolver {
    pub fn new(context: InstitutionContext, directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self {
            context,
            directory,
            state: Arc::new(Mutex::new(SearchState::default())),
        }
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();

        let token = {
            let mut state = self.lock();
            state.latest_token += 1;
            if query.is_empty() {
                state.view = SearchView {
                    validation_message: Some(EMPTY_QUERY_MESSAGE.to_string()),
                    ..SearchView::default()
                };
                return SearchOutcome::EmptyQuery;
            }
            state.view.validation_message = None;
            state.view.in_flight = true;
            state.latest_token
        };

        debug!(token, institution_id = %self.context.institution_id(), "searching employees");
        let result = self.directory.search(&self.context, query).await;

        let mut state = self.lock();
        if state.latest_token != token {
            debug!(token, latest = state.latest_token, "discarding stale employee search response");
            return SearchOutcome::Stale;
        }

        state.view.in_flight = false;
        state.view.attempted = true;
        match result {
            Ok(employees) => {
                debug!(token, matches = employees.len(), "employee search applied");
                state.view.query = query.to_string();
                state.view.results = employees.clone();
                state.view.last_error = None;
                SearchOutcome::Applied(employees)
            }
            Err(err) => {
                warn!(token, error = %err, "employee search failed");
                state.view.last_error = Some(err.clone());
                SearchOutcome::Failed(err)
            }
        }
    }

    pub fn view(&self) -> SearchView {
        self.lock().view.clone()
    }

    /// Drop the visible results; any search still in flight becomes stale.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.latest_token += 1;
        state.view = SearchView::default();
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
