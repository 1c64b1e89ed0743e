//! API endpoint handlers.
//!
//! `advisory` and `visual_insights` serve the analysis features; the rest
//! are the records API over the patient/doctor data model.

pub mod advisory;
pub mod appointments;
pub mod consents;
pub mod doctors;
pub mod goals;
pub mod health;
pub mod patients;
pub mod records;
pub mod vaccines;
pub mod visual_insights;
