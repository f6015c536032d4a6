//! Decoders from tagged bus values to the typed timer model

pub mod delta;
pub mod snapshot;

pub use delta::{decode_delta, ChangeEvent};
pub use snapshot::{decode_snapshot, DecodeError};
