use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightStatus {
    Scheduled,
    #[serde(rename = "On Time")]
    OnTime,
    Departed,
    Arrived,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::OnTime => "On Time",
            FlightStatus::Departed => "Departed",
            FlightStatus::Arrived => "Arrived",
            FlightStatus::Delayed => "Delayed",
            FlightStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(FlightStatus::Scheduled),
            "On Time" => Ok(FlightStatus::OnTime),
            "Departed" => Ok(FlightStatus::Departed),
            "Arrived" => Ok(FlightStatus::Arrived),
            "Delayed" => Ok(FlightStatus::Delayed),
            "Cancelled" => Ok(FlightStatus::Cancelled),
            other => Err(ModelError::UnknownFlightStatus(other.to_string())),
        }
    }
}

/// One physical flight instance. Its seat map comes from `aircraft_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: i32,
    pub flight_no: String,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub status: FlightStatus,
    pub aircraft_code: String,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
}

impl Flight {
    /// Arrival must come after departure, for the schedule and for actual
    /// times once both are known.
    pub fn validate_schedule(&self) -> Result<(), ModelError> {
        if self.scheduled_arrival <= self.scheduled_departure {
            return Err(ModelError::InvalidSchedule {
                flight_id: self.flight_id,
                reason: "scheduled arrival is not after scheduled departure".to_string(),
            });
        }

        if let (Some(departed), Some(arrived)) = (self.actual_departure, self.actual_arrival) {
            if arrived <= departed {
                return Err(ModelError::InvalidSchedule {
                    flight_id: self.flight_id,
                    reason: "actual arrival is not after actual departure".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn flight() -> Flight {
        let departure = Utc.with_ymd_and_hms(2017, 8, 15, 9, 0, 0).unwrap();
        Flight {
            flight_id: 123,
            flight_no: "PG0123".to_string(),
            scheduled_departure: departure,
            scheduled_arrival: departure + Duration::hours(2),
            departure_airport: "DME".to_string(),
            arrival_airport: "LED".to_string(),
            status: FlightStatus::Scheduled,
            aircraft_code: "319".to_string(),
            actual_departure: None,
            actual_arrival: None,
        }
    }

    #[test]
    fn test_valid_schedule() {
        assert!(flight().validate_schedule().is_ok());
    }

    #[test]
    fn test_arrival_before_departure_rejected() {
        let mut f = flight();
        f.scheduled_arrival = f.scheduled_departure;
        assert!(f.validate_schedule().is_err());

        let mut f = flight();
        f.actual_departure = Some(f.scheduled_departure);
        f.actual_arrival = Some(f.scheduled_departure - Duration::minutes(5));
        assert!(f.validate_schedule().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&FlightStatus::OnTime).unwrap(), "\"On Time\"");
        assert_eq!("On Time".parse::<FlightStatus>().unwrap(), FlightStatus::OnTime);
    }
}
