//! Wait Times Configuration Model

use serde::{Deserialize, Serialize};

use super::order::ServiceKind;

/// One day-of-week/time-range override slot
///
/// `day_of_week` follows the backend's convention: 0 = Sunday.
/// Times are `"HH:MM"` strings; the window is half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitTimeSchedule {
    pub day_of_week: u8,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dine_in_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub takeaway_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_minutes: Option<u32>,
}

impl WaitTimeSchedule {
    fn contains(&self, day_of_week: u8, time: &str) -> bool {
        // "HH:MM" compares correctly as a string; empty bounds never match
        self.day_of_week == day_of_week
            && !self.start.is_empty()
            && !self.end.is_empty()
            && self.start.as_str() <= time
            && time < self.end.as_str()
    }

    fn minutes_for(&self, method: ServiceKind) -> Option<u32> {
        match method {
            ServiceKind::DineIn => self.dine_in_minutes,
            ServiceKind::Takeaway => self.takeaway_minutes,
            ServiceKind::Delivery => self.delivery_minutes,
        }
    }
}

/// Base per-method estimates plus schedule overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitTimesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dine_in_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub takeaway_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_minutes: Option<u32>,
    #[serde(default)]
    pub schedules: Vec<WaitTimeSchedule>,
    /// Emergency override: when set, schedule entries are ignored entirely
    #[serde(default)]
    pub override_schedules: bool,
}

impl WaitTimesConfig {
    fn base_minutes(&self, method: ServiceKind) -> Option<u32> {
        match method {
            ServiceKind::DineIn => self.dine_in_minutes,
            ServiceKind::Takeaway => self.takeaway_minutes,
            ServiceKind::Delivery => self.delivery_minutes,
        }
    }

    /// Resolve the estimate for a method at a given local weekday/time.
    ///
    /// With `override_schedules` set, only base values apply. Otherwise the
    /// first matching schedule slot wins, falling back to base values when no
    /// slot matches or the slot has no value for this method.
    pub fn minutes_for(&self, method: ServiceKind, day_of_week: u8, time: &str) -> Option<u32> {
        if !self.override_schedules {
            for slot in &self.schedules {
                if slot.contains(day_of_week, time) {
                    if let Some(minutes) = slot.minutes_for(method) {
                        return Some(minutes);
                    }
                }
            }
        }
        self.base_minutes(method)
    }
}
