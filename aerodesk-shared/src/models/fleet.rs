use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Travel class attached to a seat or to a ticket segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FareConditions {
    Economy,
    Comfort,
    Business,
}

impl FareConditions {
    pub fn as_str(&self) -> &'static str {
        match self {
            FareConditions::Economy => "Economy",
            FareConditions::Comfort => "Comfort",
            FareConditions::Business => "Business",
        }
    }
}

impl fmt::Display for FareConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FareConditions {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Economy" => Ok(FareConditions::Economy),
            "Comfort" => Ok(FareConditions::Comfort),
            "Business" => Ok(FareConditions::Business),
            other => Err(ModelError::UnknownFareConditions(other.to_string())),
        }
    }
}

/// Aircraft model. Seat maps hang off the model, not off a physical airframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aircraft {
    pub aircraft_code: String,
    pub model: String,
    pub range_km: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub aircraft_code: String,
    pub seat_no: String,
    pub fare_conditions: FareConditions,
}

impl Seat {
    pub fn new(aircraft_code: &str, seat_no: &str, fare_conditions: FareConditions) -> Self {
        Self {
            aircraft_code: aircraft_code.to_string(),
            seat_no: seat_no.to_string(),
            fare_conditions,
        }
    }
}
