use std::sync::Arc;
use time::{Month, Weekday};

use crate::{AirportWeather, Airline, DepartureSlot, RouteRecord, RouteTable, AIRLINES, DEPARTURE_HOURS};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SchemaMismatch {
    #[error("{group} category {value} has no column in the feature schema")]
    UnknownCategory { group: &'static str, value: String },
    #[error("feature schema has {actual} columns, model expects {expected}")]
    ColumnCount { expected: usize, actual: usize },
    #[error("feature column {index} is {actual}, model expects {expected}")]
    ColumnName {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// Numeric columns, in model order: distance, then origin and destination weather
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "Fly Distance",
    "AWND",
    "PRCP",
    "SNOW",
    "AWND_des",
    "PRCP_des",
    "SNOW_des",
];

const MONTHS: usize = 12;
const WEEKDAYS: usize = 7;

/// Categorical inputs of a single prediction
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSelection {
    pub airline: Airline,
    pub origin: String,
    pub destination: String,
    pub month: Month,
    pub weekday: Weekday,
    pub departure: DepartureSlot,
}

/// Column layout the classifier was trained against.
///
/// Airline, month, weekday and hour groups are fixed; the origin and
/// destination groups come from the reference table in first-appearance order.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    origins: Vec<String>,
    destinations: Vec<String>,
    columns: Arc<[String]>,
}

impl FeatureSchema {
    pub fn new(origins: Vec<String>, destinations: Vec<String>) -> Self {
        let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(AIRLINES.iter().map(|a| format!("Airline_{}", a.code)));
        columns.extend(origins.iter().map(|code| format!("Origin_{}", code)));
        columns.extend(destinations.iter().map(|code| format!("Dest_{}", code)));
        columns.extend((1..=MONTHS).map(|m| format!("Month_{}", m)));
        columns.extend((1..=WEEKDAYS).map(|d| format!("DayOfWeek_{}", d)));
        columns.extend(DEPARTURE_HOURS.iter().map(|h| format!("Hour_{}", h)));

        FeatureSchema {
            origins,
            destinations,
            columns: columns.into(),
        }
    }

    pub fn from_route_table(routes: &RouteTable) -> Self {
        Self::new(
            routes.origin_codes().to_vec(),
            routes.destination_codes().to_vec(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn airline_offset(&self) -> usize {
        NUMERIC_COLUMNS.len()
    }

    fn origin_offset(&self) -> usize {
        self.airline_offset() + AIRLINES.len()
    }

    fn destination_offset(&self) -> usize {
        self.origin_offset() + self.origins.len()
    }

    fn month_offset(&self) -> usize {
        self.destination_offset() + self.destinations.len()
    }

    fn weekday_offset(&self) -> usize {
        self.month_offset() + MONTHS
    }

    fn hour_offset(&self) -> usize {
        self.weekday_offset() + WEEKDAYS
    }

    /// Model feature names must match our columns exactly, in order
    pub fn check_columns(&self, names: &[String]) -> Result<(), SchemaMismatch> {
        if names.len() != self.columns.len() {
            return Err(SchemaMismatch::ColumnCount {
                expected: names.len(),
                actual: self.columns.len(),
            });
        }
        for (index, (expected, actual)) in names.iter().zip(self.columns.iter()).enumerate() {
            if expected != actual {
                return Err(SchemaMismatch::ColumnName {
                    index,
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn build(
        &self,
        route: &RouteRecord,
        selection: &FlightSelection,
        origin_weather: &AirportWeather,
        destination_weather: &AirportWeather,
    ) -> Result<FeatureVector, SchemaMismatch> {
        let mut values = vec![0.0; self.columns.len()];

        values[0] = route.distance;
        values[1] = origin_weather.wind_speed.unwrap_or(0.0);
        values[2] = origin_weather.precipitation.unwrap_or(0.0);
        values[3] = origin_weather.snowfall.unwrap_or(0.0);
        values[4] = destination_weather.wind_speed.unwrap_or(0.0);
        values[5] = destination_weather.precipitation.unwrap_or(0.0);
        values[6] = destination_weather.snowfall.unwrap_or(0.0);

        let airline = AIRLINES
            .iter()
            .position(|a| a.code == selection.airline.code);
        set_one_hot(
            &mut values,
            self.airline_offset(),
            airline,
            "Airline",
            selection.airline.code,
        )?;

        let origin = self.origins.iter().position(|c| *c == selection.origin);
        set_one_hot(
            &mut values,
            self.origin_offset(),
            origin,
            "Origin",
            &selection.origin,
        )?;

        let destination = self
            .destinations
            .iter()
            .position(|c| *c == selection.destination);
        set_one_hot(
            &mut values,
            self.destination_offset(),
            destination,
            "Dest",
            &selection.destination,
        )?;

        // Month_1 is January
        let month = Some(u8::from(selection.month) as usize - 1);
        set_one_hot(
            &mut values,
            self.month_offset(),
            month,
            "Month",
            selection.month,
        )?;

        // DayOfWeek_1 is Monday
        let weekday = Some(selection.weekday.number_from_monday() as usize - 1);
        set_one_hot(
            &mut values,
            self.weekday_offset(),
            weekday,
            "DayOfWeek",
            selection.weekday,
        )?;

        let hour = DEPARTURE_HOURS
            .iter()
            .position(|h| *h == selection.departure.hour());
        set_one_hot(
            &mut values,
            self.hour_offset(),
            hour,
            "Hour",
            selection.departure,
        )?;

        Ok(FeatureVector {
            columns: Arc::clone(&self.columns),
            values,
        })
    }
}

fn set_one_hot(
    values: &mut [f64],
    offset: usize,
    index: Option<usize>,
    group: &'static str,
    value: impl ToString,
) -> Result<(), SchemaMismatch> {
    match index {
        Some(index) => {
            values[offset + index] = 1.0;
            Ok(())
        }
        None => Err(SchemaMismatch::UnknownCategory {
            group,
            value: value.to_string(),
        }),
    }
}

/// Single row handed to the classifier
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|index| self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Columns with a non-zero value
    pub fn active(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(_, value)| *value != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(
            vec![String::from("JFK"), String::from("LAX"), String::from("ORD")],
            vec![String::from("LAX"), String::from("JFK")],
        )
    }

    fn route() -> RouteRecord {
        RouteRecord {
            origin: String::from("JFK"),
            destination: String::from("LAX"),
            origin_latitude: 40.6398,
            origin_longitude: -73.7789,
            destination_latitude: 33.9425,
            destination_longitude: -118.4081,
            distance: 2475.0,
        }
    }

    fn selection() -> FlightSelection {
        FlightSelection {
            airline: AIRLINES[3],
            origin: String::from("JFK"),
            destination: String::from("LAX"),
            month: Month::June,
            weekday: Weekday::Monday,
            departure: DepartureSlot::new(8).unwrap(),
        }
    }

    fn group_sum(vector: &FeatureVector, prefix: &str) -> f64 {
        vector
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(_, value)| value)
            .sum()
    }

    #[test]
    fn column_layout_matches_training_order() {
        let schema = schema();
        // 7 numeric + 8 airlines + 3 origins + 2 destinations + 12 + 7 + 23
        assert_eq!(schema.len(), 62);

        let columns = schema.columns();
        assert_eq!(columns[0], "Fly Distance");
        assert_eq!(columns[6], "SNOW_des");
        assert_eq!(columns[7], "Airline_AA");
        assert_eq!(columns[14], "Airline_WN");
        assert_eq!(columns[15], "Origin_JFK");
        assert_eq!(columns[18], "Dest_LAX");
        assert_eq!(columns[20], "Month_1");
        assert_eq!(columns[32], "DayOfWeek_1");
        assert_eq!(columns[39], "Hour_0");
        assert_eq!(columns[42], "Hour_4");
        assert_eq!(columns[61], "Hour_23");
    }

    #[test]
    fn excluded_hour_column_never_appears() {
        let schema = schema();
        assert!(!schema.columns().iter().any(|c| c == "Hour_3"));

        let vector = schema
            .build(&route(), &selection(), &AirportWeather::default(), &AirportWeather::default())
            .unwrap();
        assert_eq!(vector.get("Hour_3"), None);
    }

    #[test]
    fn builds_scenario_vector() {
        let origin_weather = AirportWeather {
            precipitation: Some(0.0),
            wind_speed: Some(5.0),
            snowfall: None,
        };
        let destination_weather = AirportWeather {
            precipitation: Some(1.5),
            wind_speed: Some(7.0),
            snowfall: Some(0.2),
        };

        let vector = schema()
            .build(&route(), &selection(), &origin_weather, &destination_weather)
            .unwrap();

        assert_eq!(vector.get("Fly Distance"), Some(2475.0));
        assert_eq!(vector.get("AWND"), Some(5.0));
        assert_eq!(vector.get("PRCP"), Some(0.0));
        assert_eq!(vector.get("SNOW"), Some(0.0));
        assert_eq!(vector.get("AWND_des"), Some(7.0));
        assert_eq!(vector.get("PRCP_des"), Some(1.5));
        assert_eq!(vector.get("SNOW_des"), Some(0.2));
        assert_eq!(vector.get("Airline_DL"), Some(1.0));
        assert_eq!(vector.get("Origin_JFK"), Some(1.0));
        assert_eq!(vector.get("Dest_LAX"), Some(1.0));
        assert_eq!(vector.get("Month_6"), Some(1.0));
        assert_eq!(vector.get("DayOfWeek_1"), Some(1.0));
        assert_eq!(vector.get("Hour_8"), Some(1.0));
    }

    #[test]
    fn absent_weather_is_zero() {
        let vector = schema()
            .build(&route(), &selection(), &AirportWeather::default(), &AirportWeather::default())
            .unwrap();
        for column in &NUMERIC_COLUMNS[1..] {
            assert_eq!(vector.get(column), Some(0.0), "{}", column);
        }
    }

    #[test]
    fn exactly_one_hot_per_group_for_every_combination() {
        let schema = schema();
        let months: Vec<Month> =
            std::iter::successors(Some(Month::January), |m| Some(m.next()))
                .take(12)
                .collect();
        let weekdays: Vec<Weekday> =
            std::iter::successors(Some(Weekday::Monday), |d| Some(d.next()))
                .take(7)
                .collect();

        for airline in AIRLINES {
            for &month in &months {
                for &weekday in &weekdays {
                    for departure in DepartureSlot::all() {
                        let selection = FlightSelection {
                            airline,
                            origin: String::from("ORD"),
                            destination: String::from("JFK"),
                            month,
                            weekday,
                            departure,
                        };
                        let vector = schema
                            .build(
                                &route(),
                                &selection,
                                &AirportWeather::default(),
                                &AirportWeather::default(),
                            )
                            .unwrap();

                        for prefix in ["Airline_", "Origin_", "Dest_", "Month_", "DayOfWeek_", "Hour_"] {
                            assert_eq!(group_sum(&vector, prefix), 1.0, "{}", prefix);
                        }
                        assert_eq!(
                            vector.get(&format!("Hour_{}", departure.hour())),
                            Some(1.0)
                        );
                        assert_eq!(vector.get(&format!("Month_{}", month as u8)), Some(1.0));
                        assert_eq!(
                            vector.get(&format!("DayOfWeek_{}", weekday.number_from_monday())),
                            Some(1.0)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn unknown_origin_is_reported() {
        let mut selection = selection();
        selection.origin = String::from("SFO");
        let err = schema()
            .build(&route(), &selection, &AirportWeather::default(), &AirportWeather::default())
            .unwrap_err();
        assert_eq!(
            err,
            SchemaMismatch::UnknownCategory {
                group: "Origin",
                value: String::from("SFO"),
            }
        );
    }

    #[test]
    fn check_columns_detects_drift() {
        let schema = schema();
        let names = schema.columns().to_vec();
        assert!(schema.check_columns(&names).is_ok());

        assert!(matches!(
            schema.check_columns(&names[1..]),
            Err(SchemaMismatch::ColumnCount { .. })
        ));

        let mut swapped = names.clone();
        swapped.swap(1, 2);
        assert_eq!(
            schema.check_columns(&swapped),
            Err(SchemaMismatch::ColumnName {
                index: 1,
                expected: String::from("PRCP"),
                actual: String::from("AWND"),
            })
        );
    }

    #[test]
    fn active_lists_set_columns() {
        let vector = schema()
            .build(&route(), &selection(), &AirportWeather::default(), &AirportWeather::default())
            .unwrap();
        let active: Vec<&str> = vector.active().map(|(name, _)| name).collect();
        assert_eq!(
            active,
            [
                "Fly Distance",
                "Airline_DL",
                "Origin_JFK",
                "Dest_LAX",
                "Month_6",
                "DayOfWeek_1",
                "Hour_8"
            ]
        );
    }
}
