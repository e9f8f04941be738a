//! This module contains the DICOM attribute tag type.
use std::fmt;

/// Type alias for a DICOM attribute's group number.
pub type GroupNumber = u16;
/// Type alias for a DICOM attribute's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags.
///
/// Since types will not have a monomorphized tag, and so will only support
/// a (group, element) pair. For this purpose, `Tag` also provides a method
/// for converting it to a tuple. Both `(u16, u16)` and `[u16; 2]` can be
/// efficiently converted to this type as well.
///
/// # Example
///
/// ```
/// # use dicom_codec_core::Tag;
/// let tag = Tag(0x0028, 0x0010);
/// assert_eq!(tag.to_string(), "(0028,0010)");
/// assert_eq!(tag, (0x0028, 0x0010));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Obtain the same attribute in another repeating group,
    /// such as one of the overlay planes in groups 6000-601E.
    #[inline]
    pub fn with_group(self, group: GroupNumber) -> Tag {
        Tag(group, self.1)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

#[cfg(test)]
mod tests {
    use super::Tag;

    #[test]
    fn tag_display_and_debug() {
        let tag = Tag(0x7FE0, 0x0010);
        assert_eq!(tag.to_string(), "(7FE0,0010)");
        assert_eq!(format!("{:?}", tag), "Tag(0x7FE0, 0x0010)");
        assert_eq!(Tag(0x6000, 0x3000).with_group(0x6002), Tag(0x6002, 0x3000));
    }
}
