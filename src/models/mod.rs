//! Data models for OptiField

pub mod enums;
pub mod equipment;
pub mod fuel_log;
pub mod intervention;
pub mod location;
pub mod maintenance;
pub mod observation;
pub mod part;
pub mod qrcode;
pub mod realtime;
pub mod time_entry;
pub mod user;

// Re-export commonly used types
pub use enums::{
    EquipmentStatus, InterventionStatus, MaintenanceFrequency, MaintenanceType, MaintenanceUnit,
    Priority, TaskStatus, TimeEntryStatus, TimeEntryTaskType, UrgencyLevel, WearUnit,
};
pub use equipment::Equipment;
pub use fuel_log::FuelLog;
pub use intervention::{Coordinates, Intervention, PartUsage};
pub use location::StorageLocation;
pub use maintenance::{MaintenancePlan, MaintenanceTask};
pub use observation::FieldObservation;
pub use part::Part;
pub use qrcode::EquipmentQrCode;
pub use realtime::{ChangeEvent, ChangeKind, RowFilter, Table};
pub use time_entry::{TimeAction, TimeEntry};
pub use user::UserClaims;
