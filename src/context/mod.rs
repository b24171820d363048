pub mod event;
pub mod extract;

pub use event::{EventRecord, ImagingRecord, ImplantEntry, MedicalHistory, SymptomEntry, ViewCapture};
pub use extract::{extract_context, sides_from_location, Context};
