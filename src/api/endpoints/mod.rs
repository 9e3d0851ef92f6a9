pub mod extractions;
pub mod health;
pub mod payloads;
pub mod uploads;
