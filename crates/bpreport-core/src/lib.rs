//! Job record model and decoder for `bpdbjobs -report -all_columns` lines.
//!
//! A line is a flat sequence of fields whose length depends on the file
//! list, the number of tries, the status lines of each try and the product
//! generation that produced it. [`decode`] rebuilds a [`JobRecord`] from it.

pub mod decode;
pub mod fields;
pub mod types;

pub use decode::{decode, DecodeError, DecodeFailure, Section};
pub use fields::{
    is_attempt_field, is_known_field, ATTEMPT_HEAD_FIELDS, ATTEMPT_TAIL_FIELDS, FIXED_FIELDS,
    MID_FIELDS, MODERN_FIELDS, TRY_COUNT_FIELD,
};
pub use types::{Attempt, Generation, JobRecord};
