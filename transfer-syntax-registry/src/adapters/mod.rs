//! Root module for pixel data codec adapters.
//!
//! Support for compressed transfer syntaxes
//! can be added via Cargo features.
//!
//! - [`jpegls`](jpegls) provides JPEG-LS decoding and encoding
//!   via the CharLS bindings,
//!   both lossless and near-lossless.
//!   Requires the `charls` feature,
//!   enabled by default through `jpegls`.
#[cfg(feature = "charls")]
pub mod jpegls;

/// **Note:** This module is a stub.
/// Enable the `charls` feature to use this module.
#[cfg(not(feature = "charls"))]
pub mod jpegls {}
