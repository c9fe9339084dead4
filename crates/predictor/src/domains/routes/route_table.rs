use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum RouteTableError {
    #[error("failed to open route table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode route table: {0}")]
    Csv(#[from] csv::Error),
    #[error("route {origin} -> {destination} appears more than once")]
    DuplicateRoute { origin: String, destination: String },
    #[error("route table has no rows")]
    Empty,
}

/// One row of the static reference table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteRecord {
    #[serde(rename = "Origin Airport Code")]
    pub origin: String,
    #[serde(rename = "Dest Airport Code")]
    pub destination: String,
    #[serde(rename = "Origin Latitude")]
    pub origin_latitude: f64,
    #[serde(rename = "Origin Longitude")]
    pub origin_longitude: f64,
    #[serde(rename = "Dest Latitude")]
    pub destination_latitude: f64,
    #[serde(rename = "Dest Longitude")]
    pub destination_longitude: f64,
    #[serde(rename = "Fly Distance")]
    pub distance: f64,
}

/// Read-only lookup of route attributes keyed by (origin, destination)
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<(String, String), RouteRecord>,
    origins: Vec<String>,
    destinations: Vec<String>,
}

impl RouteTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RouteTableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RouteTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RouteTableError> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let mut table = RouteTable::default();
        for row in rdr.deserialize() {
            let record: RouteRecord = row?;
            table.insert(record)?;
        }
        if table.routes.is_empty() {
            return Err(RouteTableError::Empty);
        }
        Ok(table)
    }

    fn insert(&mut self, record: RouteRecord) -> Result<(), RouteTableError> {
        let key = (record.origin.clone(), record.destination.clone());
        if self.routes.contains_key(&key) {
            return Err(RouteTableError::DuplicateRoute {
                origin: key.0,
                destination: key.1,
            });
        }
        // one-hot groups follow first-appearance order
        if !self.origins.contains(&record.origin) {
            self.origins.push(record.origin.clone());
        }
        if !self.destinations.contains(&record.destination) {
            self.destinations.push(record.destination.clone());
        }
        self.routes.insert(key, record);
        Ok(())
    }

    /// `None` means the route does not exist; callers report it to the user.
    pub fn resolve(&self, origin: &str, destination: &str) -> Option<&RouteRecord> {
        self.routes
            .get(&(origin.to_string(), destination.to_string()))
    }

    pub fn origin_codes(&self) -> &[String] {
        &self.origins
    }

    pub fn destination_codes(&self) -> &[String] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
