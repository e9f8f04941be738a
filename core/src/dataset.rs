//! A simple in-memory DICOM data set.
//!
//! [`InMemDataSet`] keeps attributes in a sorted map by tag,
//! which is enough for codecs to read the image pixel module
//! and for callers to apply the attribute operations that codecs return.
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use num_traits::NumCast;
use snafu::{ensure, Snafu};

use crate::ops::{ApplyOp, AttributeAction, AttributeOp};
use crate::value::{PixelFragmentSequence, PrimitiveValue, Value, C};
use crate::Tag;

/// An error which may occur when applying an attribute operation
/// to an in-memory data set.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub), module)]
pub enum ApplyError {
    /// The existing attribute value is not of the kind required by the action
    #[snafu(display("Incompatible value kind in attribute {tag} for action {action}"))]
    IncompatibleTypes {
        /// the attribute which was targeted
        tag: Tag,
        /// a short name of the action
        action: &'static str,
    },
    /// Pixel data cannot be replaced through attribute operations
    #[snafu(display("Cannot apply {action} to the pixel data attribute"))]
    PixelData {
        /// a short name of the action
        action: &'static str,
    },
}

/// A DICOM data set held in memory,
/// mapping attribute tags to values.
///
/// # Example
///
/// ```
/// # use dicom_codec_core::{tags, InMemDataSet, PrimitiveValue};
/// let obj = InMemDataSet::from_element_iter([
///     (tags::ROWS, PrimitiveValue::from(256_u16)),
///     (tags::PHOTOMETRIC_INTERPRETATION, PrimitiveValue::from("MONOCHROME2 ")),
/// ]);
///
/// assert_eq!(obj.int::<u32>(tags::ROWS), Some(256));
/// assert_eq!(
///     obj.element_str(tags::PHOTOMETRIC_INTERPRETATION).as_deref(),
///     Some("MONOCHROME2"),
/// );
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InMemDataSet {
    entries: BTreeMap<Tag, Value>,
}

impl InMemDataSet {
    /// Create an empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a data set from a sequence of primitive attributes.
    pub fn from_element_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = (T, PrimitiveValue)>,
        T: Into<Tag>,
    {
        InMemDataSet {
            entries: iter
                .into_iter()
                .map(|(tag, value)| (tag.into(), Value::Primitive(value)))
                .collect(),
        }
    }

    /// The number of attributes in the data set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the data set has no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether the attribute is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Retrieve the value of an attribute.
    pub fn get(&self, tag: Tag) -> Option<&Value> {
        self.entries.get(&tag)
    }

    /// Retrieve the primitive value of an attribute.
    ///
    /// Returns `None` if the attribute is missing
    /// or is a sequence.
    pub fn primitive(&self, tag: Tag) -> Option<&PrimitiveValue> {
        self.get(tag).and_then(Value::primitive)
    }

    /// Retrieve the value of an attribute as a string without padding.
    pub fn element_str(&self, tag: Tag) -> Option<Cow<str>> {
        self.primitive(tag).map(PrimitiveValue::to_clean_str)
    }

    /// Retrieve the first value of an attribute as an integer.
    pub fn int<T>(&self, tag: Tag) -> Option<T>
    where
        T: NumCast + FromStr,
    {
        self.primitive(tag).and_then(PrimitiveValue::to_int)
    }

    /// Retrieve the items of a sequence attribute.
    pub fn items(&self, tag: Tag) -> Option<&[InMemDataSet]> {
        self.get(tag).and_then(Value::items)
    }

    /// Retrieve the encapsulated pixel data, if present.
    pub fn pixel_sequence(&self) -> Option<&PixelFragmentSequence<Vec<u8>>> {
        self.get(crate::tags::PIXEL_DATA)
            .and_then(Value::pixel_sequence)
    }

    /// Insert or replace an attribute,
    /// returning the previous value if there was one.
    pub fn put(&mut self, tag: Tag, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(tag, value.into())
    }

    /// Remove an attribute,
    /// returning its value if there was one.
    pub fn remove(&mut self, tag: Tag) -> Option<Value> {
        self.entries.remove(&tag)
    }

    /// Iterate over all attributes in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Value)> + '_ {
        self.entries.iter().map(|(tag, value)| (*tag, value))
    }
}

impl ApplyOp for InMemDataSet {
    type Err = ApplyError;

    fn apply(&mut self, op: AttributeOp) -> Result<(), Self::Err> {
        let AttributeOp { tag, action } = op;
        ensure!(
            tag != crate::tags::PIXEL_DATA || !action.is_constructive(),
            apply_error::PixelDataSnafu {
                action: "a constructive action"
            }
        );

        match action {
            AttributeAction::Remove => {
                self.remove(tag);
            }
            AttributeAction::Set(value) => {
                self.put(tag, value);
            }
            AttributeAction::SetStr(value) => {
                self.put(tag, PrimitiveValue::from(value.into_owned()));
            }
            AttributeAction::SetIfMissing(value) => {
                self.entries.entry(tag).or_insert(Value::Primitive(value));
            }
            AttributeAction::SetStrIfMissing(value) => {
                self.entries
                    .entry(tag)
                    .or_insert_with(|| Value::Primitive(value.into_owned().into()));
            }
            AttributeAction::PushStr(value) => {
                let new_value = match self.entries.get(&tag) {
                    None => PrimitiveValue::Strs(C::from_elem(value.into_owned(), 1)),
                    Some(Value::Primitive(PrimitiveValue::Empty)) => {
                        PrimitiveValue::Strs(C::from_elem(value.into_owned(), 1))
                    }
                    Some(Value::Primitive(prim)) => {
                        let mut values: C<String> = prim.to_multi_str().iter().cloned().collect();
                        values.push(value.into_owned());
                        PrimitiveValue::Strs(values)
                    }
                    Some(_) => {
                        return apply_error::IncompatibleTypesSnafu {
                            tag,
                            action: "push string",
                        }
                        .fail()
                    }
                };
                self.put(tag, new_value);
            }
            AttributeAction::PushItem(item) => match self.entries.get_mut(&tag) {
                None => {
                    self.put(tag, Value::Sequence(C::from_elem(item, 1)));
                }
                Some(Value::Sequence(items)) => items.push(item),
                Some(_) => {
                    return apply_error::IncompatibleTypesSnafu {
                        tag,
                        action: "push item",
                    }
                    .fail()
                }
            },
        }
        Ok(())
    }
}
