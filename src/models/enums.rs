use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same string form as storage.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(MedicineStatus {
    Pending => "pending",
    Taken => "taken",
    Skipped => "skipped",
});

impl Default for MedicineStatus {
    fn default() -> Self {
        Self::Pending
    }
}

str_enum!(RiskLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

impl RiskLevel {
    /// Classify a missed-dose count: 0 → Low, 1-2 → Medium, 3+ → High.
    pub fn from_missed(missed_doses: u64) -> Self {
        match missed_doses {
            0 => Self::Low,
            1..=2 => Self::Medium,
            _ => Self::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn medicine_status_round_trips_storage_form() {
        for status in [MedicineStatus::Pending, MedicineStatus::Taken, MedicineStatus::Skipped] {
            assert_eq!(MedicineStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn medicine_status_rejects_unknown() {
        let err = MedicineStatus::from_str("active").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn medicine_status_serializes_lowercase() {
        let json = serde_json::to_string(&MedicineStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
        let parsed: MedicineStatus = serde_json::from_str("\"taken\"").unwrap();
        assert_eq!(parsed, MedicineStatus::Taken);
    }

    #[test]
    fn risk_thresholds() {
        assert_eq!(RiskLevel::from_missed(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_missed(1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_missed(2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_missed(3), RiskLevel::High);
        assert_eq!(RiskLevel::from_missed(250), RiskLevel::High);
    }

    #[test]
    fn risk_level_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"Medium\"");
    }
}
