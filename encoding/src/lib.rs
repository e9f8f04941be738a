#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]
//! DICOM pixel data codec primitives.
//!
//! This crate provides the contract of pixel data codecs
//! ([`Codec`]), the parameter objects given to them,
//! and the building blocks shared by codec implementations:
//! mapping frames to the fragments of encapsulated pixel data,
//! building encapsulated pixel data with a basic offset table,
//! and converting native pixel data between layouts.
//!
//! The actual codecs and the registry through which they are selected
//! live in the `dicom-codec-registry` crate.
//!
//! [`Codec`]: ./codec/trait.Codec.html

pub mod codec;
pub mod encapsulation;
pub mod error;
pub mod fragments;
pub mod params;
pub mod pixel;
pub mod render;
pub mod transfer_syntax;
pub mod uid;

pub use codec::{Codec, CodecRole, DecodedFrame, DecodedImage, EncodeOutput, PixelDataObject};
pub use error::{CodecError, Result};
pub use params::{CodecParameter, RepresentationParameter};
pub use transfer_syntax::TransferSyntax;

// re-export crates that are part of the public API
pub use dicom_codec_core;
pub use snafu;
