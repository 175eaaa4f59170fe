//! Flattened per-day record and the rules for pulling values out of
//! resource responses.

use crate::resources::Resource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder for a summary value the provider did not report.
pub const MISSING: &str = "-";

fn missing() -> Value {
    Value::String(MISSING.to_string())
}

/// One intraday point. Extra provider fields (`level`, `mets`, ...) are kept.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Every metric for one user and date. The key set is fixed: absent data is
/// `"-"` for summaries and an empty list for intraday series.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub minutes_sedentary: Value,
    pub minutes_lightly_active: Value,
    pub minutes_fairly_active: Value,
    pub minutes_very_active: Value,
    pub activity_calories: Value,
    pub calories: Value,
    #[serde(rename = "calories-intraday")]
    pub calories_intraday: Vec<Sample>,
    pub steps: Value,
    #[serde(rename = "steps-intraday")]
    pub steps_intraday: Vec<Sample>,
    pub distance: Value,
    #[serde(rename = "distance-intraday")]
    pub distance_intraday: Vec<Sample>,
    pub floors: Value,
    #[serde(rename = "floors-intraday")]
    pub floors_intraday: Vec<Sample>,
    pub elevation: Value,
    #[serde(rename = "elevation-intraday")]
    pub elevation_intraday: Vec<Sample>,
    pub heart: Value,
    #[serde(rename = "heart-intraday")]
    pub heart_intraday: Vec<Sample>,
}

impl DailyRecord {
    /// Record with every field at its absent-data default.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            minutes_sedentary: missing(),
            minutes_lightly_active: missing(),
            minutes_fairly_active: missing(),
            minutes_very_active: missing(),
            activity_calories: missing(),
            calories: missing(),
            calories_intraday: Vec::new(),
            steps: missing(),
            steps_intraday: Vec::new(),
            distance: missing(),
            distance_intraday: Vec::new(),
            floors: missing(),
            floors_intraday: Vec::new(),
            elevation: missing(),
            elevation_intraday: Vec::new(),
            heart: missing(),
            heart_intraday: Vec::new(),
        }
    }

    pub fn summary(&self, resource: Resource) -> &Value {
        match resource {
            Resource::MinutesSedentary => &self.minutes_sedentary,
            Resource::MinutesLightlyActive => &self.minutes_lightly_active,
            Resource::MinutesFairlyActive => &self.minutes_fairly_active,
            Resource::MinutesVeryActive => &self.minutes_very_active,
            Resource::ActivityCalories => &self.activity_calories,
            Resource::Calories => &self.calories,
            Resource::Steps => &self.steps,
            Resource::Distance => &self.distance,
            Resource::Floors => &self.floors,
            Resource::Elevation => &self.elevation,
            Resource::Heart => &self.heart,
        }
    }

    fn summary_mut(&mut self, resource: Resource) -> &mut Value {
        match resource {
            Resource::MinutesSedentary => &mut self.minutes_sedentary,
            Resource::MinutesLightlyActive => &mut self.minutes_lightly_active,
            Resource::MinutesFairlyActive => &mut self.minutes_fairly_active,
            Resource::MinutesVeryActive => &mut self.minutes_very_active,
            Resource::ActivityCalories => &mut self.activity_calories,
            Resource::Calories => &mut self.calories,
            Resource::Steps => &mut self.steps,
            Resource::Distance => &mut self.distance,
            Resource::Floors => &mut self.floors,
            Resource::Elevation => &mut self.elevation,
            Resource::Heart => &mut self.heart,
        }
    }

    /// Intraday series; `None` for tracker resources.
    pub fn intraday(&self, resource: Resource) -> Option<&[Sample]> {
        let series = match resource {
            Resource::Calories => &self.calories_intraday,
            Resource::Steps => &self.steps_intraday,
            Resource::Distance => &self.distance_intraday,
            Resource::Floors => &self.floors_intraday,
            Resource::Elevation => &self.elevation_intraday,
            Resource::Heart => &self.heart_intraday,
            _ => return None,
        };
        Some(series)
    }

    fn intraday_mut(&mut self, resource: Resource) -> Option<&mut Vec<Sample>> {
        match resource {
            Resource::Calories => Some(&mut self.calories_intraday),
            Resource::Steps => Some(&mut self.steps_intraday),
            Resource::Distance => Some(&mut self.distance_intraday),
            Resource::Floors => Some(&mut self.floors_intraday),
            Resource::Elevation => Some(&mut self.elevation_intraday),
            Resource::Heart => Some(&mut self.heart_intraday),
            _ => None,
        }
    }

    /// Fill the fields belonging to `resource` from its response body.
    pub fn apply(&mut self, resource: Resource, body: &Value) {
        *self.summary_mut(resource) = summary_value(body, resource.summary_key());
        if let (Some(key), Some(series)) = (resource.intraday_key(), self.intraday_mut(resource)) {
            *series = intraday_samples(body, key);
        }
    }
}

/// `value` of the last element of the array under `key`, or `"-"`.
pub fn summary_value(body: &Value, key: &str) -> Value {
    body.get(key)
        .and_then(Value::as_array)
        .and_then(|entries| entries.last())
        .and_then(|last| last.get("value"))
        .cloned()
        .unwrap_or_else(missing)
}

/// `dataset` under `key`, or an empty series. Points that are not objects
/// are dropped.
pub fn intraday_samples(body: &Value, key: &str) -> Vec<Sample> {
    let Some(dataset) = body
        .get(key)
        .and_then(|intraday| intraday.get("dataset"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    dataset
        .iter()
        .filter_map(|point| match Sample::deserialize(point) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::warn!(key, error = %e, "skipping malformed intraday point");
                None
            }
        })
        .collect()
}
