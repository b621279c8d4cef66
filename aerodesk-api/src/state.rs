use std::sync::Arc;

use aerodesk_core::{CheckInAllocator, CheckInStore, QueryRepository, QueryService};

/// Shared handler state. Holds no per-request data; all coordination lives in
/// the store behind the two trait objects.
#[derive(Clone)]
pub struct AppState {
    pub check_in: Arc<CheckInAllocator>,
    pub queries: Arc<QueryService>,
}

impl AppState {
    pub fn new(check_in_store: Arc<dyn CheckInStore>, query_repo: Arc<dyn QueryRepository>) -> Self {
        Self {
            check_in: Arc::new(CheckInAllocator::new(check_in_store)),
            queries: Arc::new(QueryService::new(query_repo)),
        }
    }
}
