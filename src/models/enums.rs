//! Shared domain enums
//!
//! Every enum is stored as lowercase snake_case text in PostgreSQL and
//! serialized the same way over JSON.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Accept the dashed spelling used by older clients ("in-progress")
                match s.trim().to_lowercase().replace('-', "_").as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Operational state of a piece of equipment
    EquipmentStatus {
        Operational => "operational",
        Maintenance => "maintenance",
        Repair => "repair",
        Inactive => "inactive",
    }
}

text_enum! {
    /// Unit of the equipment wear counter
    WearUnit {
        Hours => "hours",
        Kilometers => "kilometers",
        Acres => "acres",
    }
}

text_enum! {
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

text_enum! {
    MaintenanceType {
        Preventive => "preventive",
        Corrective => "corrective",
        ConditionBased => "condition_based",
    }
}

text_enum! {
    /// Maintenance task lifecycle: scheduled -> in_progress -> completed
    TaskStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

text_enum! {
    MaintenanceFrequency {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
        Custom => "custom",
    }
}

text_enum! {
    /// Unit of a maintenance plan interval. `Hours` plans follow the wear counter.
    MaintenanceUnit {
        Days => "days",
        Weeks => "weeks",
        Months => "months",
        Hours => "hours",
    }
}

text_enum! {
    InterventionStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
        Canceled => "canceled",
    }
}

text_enum! {
    /// Time tracking session state
    TimeEntryStatus {
        Active => "active",
        Paused => "paused",
        Completed => "completed",
    }
}

text_enum! {
    TimeEntryTaskType {
        Maintenance => "maintenance",
        Repair => "repair",
        Inspection => "inspection",
        Operation => "operation",
        Other => "other",
    }
}

text_enum! {
    /// Urgency a field observer attaches to an observation
    UrgencyLevel {
        Urgent => "urgent",
        Watch => "watch",
        Normal => "normal",
    }
}

impl Priority {
    /// Rank used for ordering, higher is more pressing
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Critical => 3,
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }
}

impl From<UrgencyLevel> for Priority {
    fn from(level: UrgencyLevel) -> Self {
        match level {
            UrgencyLevel::Urgent => Priority::High,
            UrgencyLevel::Watch => Priority::Medium,
            UrgencyLevel::Normal => Priority::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_dashes_and_case() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("Operational".parse::<EquipmentStatus>(), Ok(EquipmentStatus::Operational));
        assert!("broken".parse::<EquipmentStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&MaintenanceType::ConditionBased).unwrap();
        assert_eq!(json, "\"condition_based\"");
        let back: MaintenanceType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MaintenanceType::ConditionBased);
    }

    #[test]
    fn test_urgency_to_priority() {
        assert_eq!(Priority::from(UrgencyLevel::Urgent), Priority::High);
        assert_eq!(Priority::from(UrgencyLevel::Watch), Priority::Medium);
        assert_eq!(Priority::from(UrgencyLevel::Normal), Priority::Low);
    }
}
