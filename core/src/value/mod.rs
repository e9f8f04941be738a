//! This module includes a high level abstraction over a DICOM data element's value.
//!
//! Besides [primitive values](PrimitiveValue),
//! a value may be a sequence of nested data set items
//! or an encapsulated pixel data fragment sequence.
use crate::dataset::InMemDataSet;

mod primitive;

pub use self::primitive::{PrimitiveValue, C};

/// An in-memory pixel data fragment.
pub type InMemFragment = Vec<u8>;

/// Representation of a full DICOM value,
/// which may be either primitive or another DICOM object.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Primitive value.
    Primitive(PrimitiveValue),
    /// A complex sequence of items.
    Sequence(C<InMemDataSet>),
    /// An encapsulated pixel data sequence.
    PixelSequence(PixelFragmentSequence<InMemFragment>),
}

impl Value {
    /// Obtain the number of individual values.
    /// In a primitive, this is the number of individual elements in the value.
    /// In a sequence item, this is the number of items.
    /// In a pixel sequence, this is the number of fragments.
    pub fn multiplicity(&self) -> u32 {
        match self {
            Value::Primitive(v) => v.multiplicity(),
            Value::Sequence(items) => items.len() as u32,
            Value::PixelSequence(seq) => seq.fragments().len() as u32,
        }
    }

    /// Gets a reference to the primitive value, if it is one.
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Gets a reference to the items of a sequence, if it is one.
    pub fn items(&self) -> Option<&[InMemDataSet]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Gets a reference to the encapsulated pixel data, if it is one.
    pub fn pixel_sequence(&self) -> Option<&PixelFragmentSequence<InMemFragment>> {
        match self {
            Value::PixelSequence(seq) => Some(seq),
            _ => None,
        }
    }
}

impl From<PrimitiveValue> for Value {
    fn from(value: PrimitiveValue) -> Self {
        Value::Primitive(value)
    }
}

impl From<PixelFragmentSequence<InMemFragment>> for Value {
    fn from(value: PixelFragmentSequence<InMemFragment>) -> Self {
        Value::PixelSequence(value)
    }
}

/// A sequence of pixel data fragments.
///
/// Each fragment (of data type `P`) is
/// an even-lengthed sequence of bytes
/// representing the encoded pixel data.
/// The first item of the sequence is interpreted as a basic offset table,
/// which is defined separately:
/// it is either empty
/// or holds the byte offset of each frame's first fragment item,
/// relative to the first byte of the first fragment item
/// (item headers of 8 bytes included).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFragmentSequence<P> {
    /// The value contents of the basic offset table.
    offset_table: C<u32>,
    /// The sequence of pixel data fragments.
    fragments: C<P>,
}

impl<P> PixelFragmentSequence<P> {
    /// Construct a DICOM pixel sequence sequence value
    /// from a basic offset table and a list of fragments.
    ///
    /// **Note:** This function does not validate the offset table
    /// against the given fragments.
    #[inline]
    pub fn new(offset_table: impl Into<C<u32>>, fragments: impl Into<C<P>>) -> Self {
        PixelFragmentSequence {
            offset_table: offset_table.into(),
            fragments: fragments.into(),
        }
    }

    /// Construct a DICOM pixel sequence sequence value
    /// from a list of fragments,
    /// with an empty basic offset table.
    #[inline]
    pub fn new_fragments(fragments: impl Into<C<P>>) -> Self {
        PixelFragmentSequence {
            offset_table: Default::default(),
            fragments: fragments.into(),
        }
    }

    /// Gets a reference to the pixel data fragments.
    ///
    /// This sequence does not include the offset table.
    #[inline]
    pub fn fragments(&self) -> &[P] {
        &self.fragments
    }

    /// Gets a mutable reference to the pixel data fragments.
    ///
    /// This sequence does not include the offset table.
    #[inline]
    pub fn fragments_mut(&mut self) -> &mut C<P> {
        &mut self.fragments
    }

    /// Decompose the sequence into its constituent parts:
    /// the basic offset table and the pixel data fragments.
    pub fn into_parts(self) -> (C<u32>, C<P>) {
        (self.offset_table, self.fragments)
    }

    /// Gets a reference to the encapsulated pixel data's offset table.
    pub fn offset_table(&self) -> &[u32] {
        &self.offset_table
    }

    /// Gets a mutable reference to the encapsulated pixel data's offset table.
    pub fn offset_table_mut(&mut self) -> &mut C<u32> {
        &mut self.offset_table
    }

    /// The number of items in the sequence,
    /// counting the basic offset table item.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.fragments.len() + 1
    }
}

impl<P> PixelFragmentSequence<P>
where
    P: AsRef<[u8]>,
{
    /// Get the value data's length in bytes,
    /// including the item headers of the offset table and of all fragments,
    /// but not the sequence delimitation item.
    pub fn length(&self) -> u64 {
        let table = 8 + 4 * self.offset_table.len() as u64;
        self.fragments
            .iter()
            .map(|f| 8 + f.as_ref().len() as u64)
            .sum::<u64>()
            + table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_sequence_basics() {
        let seq = PixelFragmentSequence::new(
            vec![0_u32, 18],
            vec![vec![0xFF_u8; 10], vec![0x00; 4]],
        );
        assert_eq!(seq.item_count(), 3);
        assert_eq!(seq.offset_table(), &[0, 18]);
        assert_eq!(seq.length(), (8 + 8) + (8 + 10) + (8 + 4));

        let value = Value::from(seq);
        assert_eq!(value.multiplicity(), 2);
        assert!(value.primitive().is_none());
    }
}
