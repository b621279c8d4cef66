use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Airport as exposed by the listing endpoint. Name and city are already
/// resolved to the configured language by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub city: String,
    pub code: String,
    pub name: String,
}

/// Airport row returned for a city lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportSummary {
    pub code: String,
    pub name: String,
}

impl From<Airport> for AirportSummary {
    fn from(airport: Airport) -> Self {
        Self {
            code: airport.code,
            name: airport.name,
        }
    }
}

/// A scheduled route leaving an airport. `days_of_week` holds ISO weekday
/// numbers (1 = Monday) in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRoute {
    pub flight_no: String,
    pub arrival_airport: String,
    pub departure_time: NaiveTime,
    pub days_of_week: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRoute {
    pub flight_no: String,
    pub departure_airport: String,
    pub arrival_time: NaiveTime,
    pub days_of_week: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_route_serialization() {
        let route = OutboundRoute {
            flight_no: "PG0403".to_string(),
            arrival_airport: "LED".to_string(),
            departure_time: NaiveTime::from_hms_opt(8, 25, 0).unwrap(),
            days_of_week: vec![1, 3, 5],
        };

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["flight_no"], "PG0403");
        assert_eq!(json["departure_time"], "08:25:00");
        assert_eq!(json["days_of_week"], serde_json::json!([1, 3, 5]));
    }
}
