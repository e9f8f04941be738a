//! Module for the attribute operations API.
//!
//! Pixel data codecs do not modify the data set they work on.
//! Instead, they describe the changes which the caller
//! should make to the data set for it to remain consistent
//! with the newly produced pixel data
//! (new photometric interpretation, lossy compression flags, and so on),
//! as a list of [`AttributeOp`] values.
//! All data set types supporting this API
//! implement the [`ApplyOp`] trait.
//!
//! # Example
//!
//! ```
//! use dicom_codec_core::{tags, InMemDataSet};
//! use dicom_codec_core::ops::*;
//!
//! let mut obj = InMemDataSet::new();
//! // declare lossy compression
//! obj.apply(AttributeOp::new(
//!     tags::LOSSY_IMAGE_COMPRESSION,
//!     AttributeAction::SetStr("01".into()),
//! ))?;
//! assert_eq!(obj.element_str(tags::LOSSY_IMAGE_COMPRESSION).as_deref(), Some("01"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
use std::borrow::Cow;

use crate::{dataset::InMemDataSet, PrimitiveValue, Tag};

/// Descriptor for a single operation
/// to apply over a DICOM data set.
///
/// This type is purely descriptive.
/// Attribute operations only select attributes at the root of the data set.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeOp {
    /// the attribute to apply the action to
    pub tag: Tag,
    /// the effective action to apply
    pub action: AttributeAction,
}

impl AttributeOp {
    /// Construct an attribute operation.
    ///
    /// # Example
    ///
    /// ```
    /// # use dicom_codec_core::Tag;
    /// # use dicom_codec_core::ops::{AttributeAction, AttributeOp};
    /// let op = AttributeOp::new(
    ///     // ImageType
    ///     Tag(0x0008, 0x0008),
    ///     AttributeAction::SetStr("DERIVED\\PRIMARY".into()),
    /// );
    /// ```
    pub fn new(tag: impl Into<Tag>, action: AttributeAction) -> Self {
        AttributeOp {
            tag: tag.into(),
            action,
        }
    }
}

impl std::fmt::Display for AttributeOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            AttributeAction::Remove => write!(f, "remove {}", self.tag),
            AttributeAction::Set(value) | AttributeAction::SetIfMissing(value) => {
                write!(f, "set {} to {}", self.tag, value)
            }
            AttributeAction::SetStr(value) | AttributeAction::SetStrIfMissing(value) => {
                write!(f, "set {} to \"{}\"", self.tag, value)
            }
            AttributeAction::PushStr(value) => write!(f, "append \"{}\" to {}", value, self.tag),
            AttributeAction::PushItem(_) => write!(f, "append item to {}", self.tag),
        }
    }
}

/// Descriptor for the kind of action to apply over an attribute.
///
/// See the [module-level documentation](crate::ops)
/// for more details.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeAction {
    /// Remove the attribute if it exists.
    ///
    /// Do nothing otherwise.
    Remove,
    /// Fully reset the attribute with the given DICOM value,
    /// creating it if it does not exist yet.
    Set(PrimitiveValue),
    /// Fully reset a textual attribute with the given string,
    /// creating it if it does not exist yet.
    SetStr(Cow<'static, str>),
    /// Provide the attribute with the given DICOM value,
    /// if it does not exist yet.
    SetIfMissing(PrimitiveValue),
    /// Provide the textual attribute with the given string,
    /// if it does not exist yet.
    SetStrIfMissing(Cow<'static, str>),
    /// Append a string as an additional textual value,
    /// creating the attribute if it does not exist yet.
    ///
    /// New value items are recorded as separate text values,
    /// meaning that they are delimited by a backslash (`\`) at encoding time.
    PushStr(Cow<'static, str>),
    /// Append a data set item to a sequence attribute,
    /// creating the sequence if it does not exist yet.
    PushItem(InMemDataSet),
}

impl AttributeAction {
    /// Report whether this is considered a _constructive_ action,
    /// operations of which create new elements if they do not exist yet.
    pub fn is_constructive(&self) -> bool {
        !matches!(self, AttributeAction::Remove)
    }
}

/// Trait for applying DICOM attribute operations.
///
/// This is typically implemented by DICOM objects and other data set types
/// to serve as a common API for attribute manipulation.
pub trait ApplyOp {
    /// The operation error type
    type Err: std::error::Error + 'static;

    /// Apply the given attribute operation on the receiving object.
    ///
    /// If the action to apply is unsupported,
    /// or not possible for other reasons,
    /// an error is returned and no changes to the receiver are made.
    fn apply(&mut self, op: AttributeOp) -> Result<(), Self::Err>;

    /// Apply a list of attribute operations in order,
    /// stopping at the first failure.
    fn apply_all<I>(&mut self, ops: I) -> Result<(), Self::Err>
    where
        I: IntoIterator<Item = AttributeOp>,
        Self: Sized,
    {
        for op in ops {
            self.apply(op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags;

    #[test]
    fn display_ops() {
        let op = AttributeOp::new(tags::PLANAR_CONFIGURATION, AttributeAction::Set(1_u16.into()));
        assert_eq!(op.to_string(), "set (0028,0006) to 1");

        let op = AttributeOp::new(
            tags::LOSSY_IMAGE_COMPRESSION_METHOD,
            AttributeAction::PushStr("ISO_14495_1".into()),
        );
        assert_eq!(op.to_string(), "append \"ISO_14495_1\" to (0028,2114)");
        assert!(op.action.is_constructive());
        assert!(!AttributeAction::Remove.is_constructive());
    }
}
