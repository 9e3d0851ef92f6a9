pub mod enums;
pub mod extraction;

pub use enums::{ExtractionStatus, InvalidEnumValue, QuoteType};
pub use extraction::{ExtractionRecord, NewExtraction};
