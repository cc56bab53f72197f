use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};

// Re-export UserRole and Permission from the permission module
pub use crate::domains::permission::{Permission, UserRole};

/// Closed set of flows that partition indicators, relations and action plans.
/// Stored as "faturamento" (revenue) and "cupom" (coupon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowCategory {
    #[serde(rename = "faturamento")]
    Revenue,
    #[serde(rename = "cupom")]
    Coupon,
}

impl FlowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowCategory::Revenue => "faturamento",
            FlowCategory::Coupon => "cupom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "faturamento" => Some(FlowCategory::Revenue),
            "cupom" => Some(FlowCategory::Coupon),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlowCategory::Revenue => "Faturamento",
            FlowCategory::Coupon => "Cupom",
        }
    }

    pub fn all() -> [FlowCategory; 2] {
        [FlowCategory::Revenue, FlowCategory::Coupon]
    }
}

impl Default for FlowCategory {
    fn default() -> Self {
        FlowCategory::Revenue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Média",
            Priority::Low => "Baixa",
        }
    }

    /// Sort rank, most urgent first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Active/inactive flag shared by users and pharmacies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(RecordStatus::Active),
            "inactive" => Some(RecordStatus::Inactive),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            RecordStatus::Active => RecordStatus::Inactive,
            RecordStatus::Inactive => RecordStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RecordStatus::Active)
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        RecordStatus::Active
    }
}

/// Explicit answer to a "are you sure?" prompt before a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// Fails with `ConfirmationRequired` unless the user confirmed `action`.
    pub fn require(self, action: &str) -> Result<(), ServiceError> {
        match self {
            Confirmation::Confirmed => Ok(()),
            Confirmation::Declined => Err(ServiceError::ConfirmationRequired(action.to_string())),
        }
    }
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Fixed-width RFC 3339 timestamps (millisecond precision, `Z` suffix) so that
/// stored values sort chronologically as plain strings.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::format;
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_str(&format(dt)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| Some(dt.with_timezone(&Utc)))
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_sort_as_strings() {
        use chrono::{TimeZone, Utc};
        let whole = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let later = whole + chrono::Duration::milliseconds(250);
        let a = timestamp::format(&whole);
        let b = timestamp::format(&later);
        assert_eq!(a, "2025-03-01T12:00:00.000Z");
        assert!(a < b);
    }

    #[test]
    fn test_flow_category_wire_names() {
        assert_eq!(
            serde_json::to_value(FlowCategory::Revenue).unwrap(),
            serde_json::json!("faturamento")
        );
        assert_eq!(
            serde_json::from_value::<FlowCategory>(serde_json::json!("cupom")).unwrap(),
            FlowCategory::Coupon
        );
        assert!(serde_json::from_value::<FlowCategory>(serde_json::json!("revenue")).is_err());
        for flow in FlowCategory::all() {
            assert_eq!(FlowCategory::from_str(flow.as_str()), Some(flow));
        }
    }

    #[test]
    fn test_priority_rank() {
        let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];
        priorities.sort_by_key(Priority::rank);
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn test_confirmation() {
        assert!(Confirmation::Confirmed.require("delete").is_ok());
        assert!(matches!(
            Confirmation::from(false).require("delete"),
            Err(ServiceError::ConfirmationRequired(_))
        ));
    }
}
