use std::fmt;
use std::str::FromStr;
use time::{macros::format_description, Date, Duration};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Unknown airline: {0}")]
    UnknownAirline(String),
    #[error("Departure time {0} is not offered, choose an hourly slot such as 08:00")]
    UnknownDeparture(String),
    #[error("Invalid date {0}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Date {date} is outside the booking window {first} to {last}")]
    DateOutOfWindow { date: Date, first: Date, last: Date },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Airline {
    pub code: &'static str,
    pub name: &'static str,
}

/// Carriers the classifier was trained on, in schema order
pub const AIRLINES: [Airline; 8] = [
    Airline { code: "AA", name: "American Airlines" },
    Airline { code: "AS", name: "Alaska Airlines" },
    Airline { code: "B6", name: "JetBlue Airways" },
    Airline { code: "DL", name: "Delta Air Lines" },
    Airline { code: "F9", name: "Frontier Airlines" },
    Airline { code: "NK", name: "Spirit Airlines" },
    Airline { code: "UA", name: "United Airlines" },
    Airline { code: "WN", name: "Southwest Airlines" },
];

impl Airline {
    /// Accepts the display name or the carrier code, ignoring case
    pub fn lookup(input: &str) -> Result<Airline, InputError> {
        let input = input.trim();
        AIRLINES
            .iter()
            .find(|airline| {
                airline.code.eq_ignore_ascii_case(input) || airline.name.eq_ignore_ascii_case(input)
            })
            .copied()
            .ok_or_else(|| InputError::UnknownAirline(input.to_string()))
    }
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// No flights in the training data depart in this hour
pub const EXCLUDED_HOUR: u8 = 3;

pub const DEPARTURE_HOURS: [u8; 23] = [
    0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23,
];

/// Whole-hour departure time; only the offered slots can be constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DepartureSlot(u8);

impl DepartureSlot {
    pub fn new(hour: u8) -> Result<Self, InputError> {
        if DEPARTURE_HOURS.contains(&hour) {
            Ok(DepartureSlot(hour))
        } else {
            Err(InputError::UnknownDeparture(format!("{:02}:00", hour)))
        }
    }

    pub fn all() -> impl Iterator<Item = DepartureSlot> {
        DEPARTURE_HOURS.iter().map(|hour| DepartureSlot(*hour))
    }

    pub fn hour(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DepartureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl FromStr for DepartureSlot {
    type Err = InputError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DepartureSlot::all()
            .find(|slot| slot.to_string() == s)
            .ok_or_else(|| InputError::UnknownDeparture(s.to_string()))
    }
}

/// Forecasts only reach a week out
pub const BOOKING_WINDOW_DAYS: i64 = 7;

/// First and last selectable travel dates
pub fn travel_date_window(today: Date) -> (Date, Date) {
    (today, today + Duration::days(BOOKING_WINDOW_DAYS))
}

pub fn parse_travel_date(input: &str, today: Date) -> Result<Date, InputError> {
    let date = Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| InputError::InvalidDate(input.trim().to_string()))?;
    let (first, last) = travel_date_window(today);
    if date < first || date > last {
        return Err(InputError::DateOutOfWindow { date, first, last });
    }
    Ok(date)
}
