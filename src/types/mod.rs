// src/types/mod.rs
//! Value types shared by the decoder and encoder.
//!
//! - [`FlagSet`] - the format block's flags byte
//! - [`Timestamp`] / [`DateRecorded`] - the info block's recording date
//! - [`FieldValue`] - one decoded block field

mod flags;
mod timestamp;
mod value;

pub use flags::{FlagSet, MainsFrequency};
pub use timestamp::{format_date_recorded, parse_date_recorded, DateRecorded, Timestamp};
pub use value::{Annotation, FieldValue};
