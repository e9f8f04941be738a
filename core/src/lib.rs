#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of the DICOM pixel data codec subsystem,
//! containing the data structures shared by codecs and their consumers.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] holds the DICOM attribute tag type.
//! - [`tags`] and [`uids`] contain the constants
//!   of the attributes and unique identifiers
//!   that pixel data codecs read and write.
//! - [`value`] holds definitions for attribute values,
//!   including encapsulated pixel data fragment sequences.
//! - [`ops`] describes changes to attributes
//!   which codecs ask the caller to apply on a data set.
//! - [`dataset`] provides a simple in-memory data set
//!   to which these operations can be applied.
//!
//! [`dataset`]: ./dataset/index.html
//! [`header`]: ./header/index.html
//! [`ops`]: ./ops/index.html
//! [`tags`]: ./tags/index.html
//! [`uids`]: ./uids/index.html
//! [`value`]: ./value/index.html

pub mod dataset;
pub mod header;
pub mod ops;
pub mod tags;
pub mod uids;
pub mod value;

pub use dataset::InMemDataSet;
pub use header::Tag;
pub use value::{PixelFragmentSequence, PrimitiveValue, Value as DicomValue};

// re-export crates that are part of the public API
pub use smallvec;
