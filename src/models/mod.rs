pub mod catalog;
pub mod enums;
pub mod prescription;
pub mod scan;
pub mod tracking;
pub mod user;

pub use catalog::{Disease, Drug};
pub use prescription::{NewPrescription, Prescription};
pub use scan::{ScanCorrection, ScanDocument};
pub use tracking::{HealthLog, MedicationLog};
pub use user::User;
