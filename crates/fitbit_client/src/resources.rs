//! The fixed table of Fitbit resources that make up one daily record.

use chrono::NaiveDate;

/// Time resolution requested from a resource endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Minute,
    Second,
}

impl Granularity {
    pub fn path_suffix(self) -> &'static str {
        match self {
            Granularity::Day => "1d.json",
            Granularity::Minute => "1d/1min.json",
            Granularity::Second => "1d/1sec.json",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    MinutesSedentary,
    MinutesLightlyActive,
    MinutesFairlyActive,
    MinutesVeryActive,
    ActivityCalories,
    Calories,
    Steps,
    Distance,
    Floors,
    Elevation,
    Heart,
}

impl Resource {
    /// Daily tracker totals; one summary value each.
    pub const TRACKER: [Resource; 5] = [
        Resource::MinutesSedentary,
        Resource::MinutesLightlyActive,
        Resource::MinutesFairlyActive,
        Resource::MinutesVeryActive,
        Resource::ActivityCalories,
    ];

    /// Resources carrying a summary value plus an intraday series.
    pub const INTRADAY: [Resource; 6] = [
        Resource::Calories,
        Resource::Steps,
        Resource::Distance,
        Resource::Floors,
        Resource::Elevation,
        Resource::Heart,
    ];

    /// Fetch order for a daily record.
    pub const ALL: [Resource; 11] = [
        Resource::MinutesSedentary,
        Resource::MinutesLightlyActive,
        Resource::MinutesFairlyActive,
        Resource::MinutesVeryActive,
        Resource::ActivityCalories,
        Resource::Calories,
        Resource::Steps,
        Resource::Distance,
        Resource::Floors,
        Resource::Elevation,
        Resource::Heart,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Resource::MinutesSedentary => "activities/tracker/minutesSedentary",
            Resource::MinutesLightlyActive => "activities/tracker/minutesLightlyActive",
            Resource::MinutesFairlyActive => "activities/tracker/minutesFairlyActive",
            Resource::MinutesVeryActive => "activities/tracker/minutesVeryActive",
            Resource::ActivityCalories => "activities/tracker/activityCalories",
            Resource::Calories => "activities/calories",
            Resource::Steps => "activities/steps",
            Resource::Distance => "activities/distance",
            Resource::Floors => "activities/floors",
            Resource::Elevation => "activities/elevation",
            Resource::Heart => "activities/heart",
        }
    }

    /// Key of the summary array in the response body.
    pub fn summary_key(self) -> &'static str {
        match self {
            Resource::MinutesSedentary => "activities-tracker-minutesSedentary",
            Resource::MinutesLightlyActive => "activities-tracker-minutesLightlyActive",
            Resource::MinutesFairlyActive => "activities-tracker-minutesFairlyActive",
            Resource::MinutesVeryActive => "activities-tracker-minutesVeryActive",
            Resource::ActivityCalories => "activities-tracker-activityCalories",
            Resource::Calories => "activities-calories",
            Resource::Steps => "activities-steps",
            Resource::Distance => "activities-distance",
            Resource::Floors => "activities-floors",
            Resource::Elevation => "activities-elevation",
            Resource::Heart => "activities-heart",
        }
    }

    /// Key of the `{dataset}` object, for intraday resources only.
    pub fn intraday_key(self) -> Option<&'static str> {
        match self {
            Resource::Calories => Some("activities-calories-intraday"),
            Resource::Steps => Some("activities-steps-intraday"),
            Resource::Distance => Some("activities-distance-intraday"),
            Resource::Floors => Some("activities-floors-intraday"),
            Resource::Elevation => Some("activities-elevation-intraday"),
            Resource::Heart => Some("activities-heart-intraday"),
            _ => None,
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            Resource::Heart => Granularity::Second,
            r if r.intraday_key().is_some() => Granularity::Minute,
            _ => Granularity::Day,
        }
    }

    /// Name of the summary field in a serialized daily record.
    pub fn field(self) -> &'static str {
        match self {
            Resource::MinutesSedentary => "minutesSedentary",
            Resource::MinutesLightlyActive => "minutesLightlyActive",
            Resource::MinutesFairlyActive => "minutesFairlyActive",
            Resource::MinutesVeryActive => "minutesVeryActive",
            Resource::ActivityCalories => "activityCalories",
            Resource::Calories => "calories",
            Resource::Steps => "steps",
            Resource::Distance => "distance",
            Resource::Floors => "floors",
            Resource::Elevation => "elevation",
            Resource::Heart => "heart",
        }
    }

    /// Path below the API base URL, e.g.
    /// `/1/user/U/activities/steps/date/2024-03-01/1d/1min.json`.
    pub fn endpoint(self, user_id: &str, date: NaiveDate) -> String {
        format!(
            "/1/user/{}/{}/date/{}/{}",
            user_id,
            self.path(),
            date.format("%Y-%m-%d"),
            self.granularity().path_suffix()
        )
    }
}
