use std::sync::Arc;

use aerodesk_shared::{Airport, AirportSummary, InboundRoute, OutboundRoute};

use crate::repository::QueryRepository;
use crate::{CoreError, CoreResult};

/// Stateless read side. Keyed lookups that match nothing report `NotFound`;
/// plain listings return whatever is there, possibly nothing.
pub struct QueryService {
    repo: Arc<dyn QueryRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn QueryRepository>) -> Self {
        Self { repo }
    }

    pub async fn cities(&self) -> CoreResult<Vec<String>> {
        Ok(self.repo.list_cities().await?)
    }

    pub async fn airports(&self) -> CoreResult<Vec<Airport>> {
        Ok(self.repo.list_airports().await?)
    }

    pub async fn airports_in_city(&self, city: &str) -> CoreResult<Vec<AirportSummary>> {
        let airports = self.repo.airports_in_city(city).await?;
        non_empty(airports, || format!("no airports in city {}", city))
    }

    pub async fn outbound_routes(&self, airport_code: &str) -> CoreResult<Vec<OutboundRoute>> {
        let routes = self.repo.outbound_routes(airport_code).await?;
        non_empty(routes, || format!("no outbound routes from {}", airport_code))
    }

    pub async fn inbound_routes(&self, airport_code: &str) -> CoreResult<Vec<InboundRoute>> {
        let routes = self.repo.inbound_routes(airport_code).await?;
        non_empty(routes, || format!("no inbound routes to {}", airport_code))
    }
}

fn non_empty<T>(rows: Vec<T>, describe: impl FnOnce() -> String) -> CoreResult<Vec<T>> {
    if rows.is_empty() {
        Err(CoreError::NotFound(describe()))
    } else {
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::repository::StoreError;
    use async_trait::async_trait;

    struct FailingRepo;

    #[async_trait]
    impl QueryRepository for FailingRepo {
        async fn list_cities(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn list_airports(&self) -> Result<Vec<Airport>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn airports_in_city(&self, _city_pattern: &str) -> Result<Vec<AirportSummary>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn outbound_routes(&self, _airport_code: &str) -> Result<Vec<OutboundRoute>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
        async fn inbound_routes(&self, _airport_code: &str) -> Result<Vec<InboundRoute>, StoreError> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_keyed_lookup_is_not_found() {
        let service = QueryService::new(Arc::new(MemoryStore::new()));

        assert!(service.cities().await.unwrap().is_empty());
        assert!(matches!(service.airports_in_city("Moscow").await, Err(CoreError::NotFound(_))));
        assert!(matches!(service.outbound_routes("SVO").await, Err(CoreError::NotFound(_))));
        assert!(matches!(service.inbound_routes("SVO").await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_airports_in_city_found() {
        let store = MemoryStore::new();
        store.add_airport("VKO", "Vnukovo International Airport", "Moscow").await;
        store.add_airport("SVO", "Sheremetyevo International Airport", "Moscow").await;
        let service = QueryService::new(Arc::new(store));

        let airports = service.airports_in_city("Moscow").await.unwrap();
        let codes: Vec<&str> = airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["SVO", "VKO"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_not_found() {
        let service = QueryService::new(Arc::new(FailingRepo));
        assert!(matches!(service.cities().await, Err(CoreError::InternalError(_))));
        assert!(matches!(service.airports_in_city("Moscow").await, Err(CoreError::InternalError(_))));
    }
}
