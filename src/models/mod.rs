pub mod enums;

mod appointment;
mod consent;
mod doctor;
mod goal;
mod health_record;
mod patient;
mod vaccine;

pub use appointment::*;
pub use consent::*;
pub use doctor::*;
pub use goal::*;
pub use health_record::*;
pub use patient::*;
pub use vaccine::*;
