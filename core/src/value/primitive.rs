//! Declaration and implementation of a DICOM primitive value.
//!
//! See [`PrimitiveValue`](./enum.PrimitiveValue.html).
use itertools::Itertools;
use num_traits::NumCast;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// An aggregation of one or more elements in a value.
pub type C<T> = SmallVec<[T; 2]>;

/// An enum representing a primitive value from a DICOM element.
///
/// Only the value kinds needed by pixel data codecs are represented:
/// textual values, integers of the widths used by the image pixel module,
/// raw bytes (such as overlay data) and decimal numbers.
///
/// Multiple elements are contained in a [`smallvec`] vector,
/// conveniently aliased to the type [`C`].
///
/// # Example
///
/// ```
/// # use dicom_codec_core::PrimitiveValue;
/// # use smallvec::smallvec;
/// let value = PrimitiveValue::from("MONOCHROME2");
/// assert_eq!(value, PrimitiveValue::Str("MONOCHROME2".to_string()));
/// assert_eq!(value.multiplicity(), 1);
///
/// let value = PrimitiveValue::from(512_u16);
/// assert_eq!(value, PrimitiveValue::U16(smallvec![512]));
/// assert_eq!(value.to_int::<u32>(), Some(512));
/// ```
///
/// [`smallvec`]: ../../smallvec/index.html
/// [`C`]: ./type.C.html
#[derive(Debug, PartialEq, Clone)]
pub enum PrimitiveValue {
    /// No data. Usually employed for zero-lengthed values.
    Empty,

    /// A sequence of strings.
    /// Used for CS, DS, IS, LO, SH and UI.
    Strs(C<String>),

    /// A single string.
    /// Used for ST, LT and UT, which are never multi-valued.
    Str(String),

    /// A sequence of bytes.
    /// Used for OB.
    U8(C<u8>),

    /// A sequence of signed 16-bit integers.
    /// Used for SS.
    I16(C<i16>),

    /// A sequence of unsigned 16-bit integers.
    /// Used for US and OW.
    U16(C<u16>),

    /// A sequence of signed 32-bit integers.
    /// Used for SL and IS.
    I32(C<i32>),

    /// A sequence of unsigned 32-bit integers.
    /// Used for UL.
    U32(C<u32>),

    /// A sequence of 64-bit floating point numbers.
    /// Used for FD and DS.
    F64(C<f64>),
}

/// A utility macro for implementing the conversion from a core type into a
/// DICOM primitive value with a single element.
macro_rules! impl_from_for_primitive {
    ($typ: ty, $variant: ident) => {
        impl From<$typ> for PrimitiveValue {
            fn from(value: $typ) -> Self {
                PrimitiveValue::$variant(C::from_elem(value, 1))
            }
        }
    };
}

impl_from_for_primitive!(i16, I16);
impl_from_for_primitive!(u16, U16);
impl_from_for_primitive!(i32, I32);
impl_from_for_primitive!(u32, U32);
impl_from_for_primitive!(f64, F64);

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::Str(value)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::Str(value.to_owned())
    }
}

impl From<Vec<u8>> for PrimitiveValue {
    fn from(value: Vec<u8>) -> Self {
        PrimitiveValue::U8(C::from_vec(value))
    }
}

impl PrimitiveValue {
    /// Obtain the number of individual elements. This number may not
    /// match the DICOM value multiplicity in some value representations.
    pub fn multiplicity(&self) -> u32 {
        use self::PrimitiveValue::*;
        match self {
            Empty => 0,
            Str(_) => 1,
            Strs(c) => c.len() as u32,
            U8(c) => c.len() as u32,
            I16(c) => c.len() as u32,
            U16(c) => c.len() as u32,
            I32(c) => c.len() as u32,
            U32(c) => c.len() as u32,
            F64(c) => c.len() as u32,
        }
    }

    /// Convert the primitive value into a string representation.
    ///
    /// String values already encoded with the `Str` and `Strs` variants
    /// are provided as is.
    /// In the case of `Strs`, the strings are first joined together
    /// with a backslash (`'\\'`).
    /// All other type variants are first converted to a string,
    /// then joined together with a backslash.
    ///
    /// Trailing whitespace and null characters are not removed;
    /// see [`to_clean_str`](Self::to_clean_str).
    pub fn to_str(&self) -> Cow<str> {
        match self {
            PrimitiveValue::Empty => Cow::from(""),
            PrimitiveValue::Str(value) => Cow::from(value.as_str()),
            PrimitiveValue::Strs(values) => {
                if values.len() == 1 {
                    Cow::from(&values[0])
                } else {
                    Cow::from(values.iter().join("\\"))
                }
            }
            prim => Cow::from(prim.to_string()),
        }
    }

    /// Convert the primitive value into a string,
    /// with the trailing padding (spaces and null characters)
    /// of the textual value removed.
    pub fn to_clean_str(&self) -> Cow<str> {
        match self.to_str() {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim_end_matches([' ', '\0'])),
            Cow::Owned(s) => Cow::Owned(s.trim_end_matches([' ', '\0']).to_string()),
        }
    }

    /// Convert the primitive value into a sequence of strings,
    /// one per value.
    ///
    /// Backslash-delimited text in a single string
    /// is split into its constituent values.
    pub fn to_multi_str(&self) -> Cow<[String]> {
        match self {
            PrimitiveValue::Empty => Cow::Owned(Vec::new()),
            PrimitiveValue::Strs(values) if values.iter().all(|v| !v.contains('\\')) => {
                Cow::Borrowed(&values[..])
            }
            PrimitiveValue::Strs(values) => Cow::Owned(
                values
                    .iter()
                    .flat_map(|v| v.split('\\'))
                    .map(str::to_string)
                    .collect(),
            ),
            PrimitiveValue::Str(value) => {
                Cow::Owned(value.split('\\').map(str::to_string).collect())
            }
            PrimitiveValue::U8(values) => Cow::Owned(values.iter().map(u8::to_string).collect()),
            PrimitiveValue::I16(values) => Cow::Owned(values.iter().map(i16::to_string).collect()),
            PrimitiveValue::U16(values) => Cow::Owned(values.iter().map(u16::to_string).collect()),
            PrimitiveValue::I32(values) => Cow::Owned(values.iter().map(i32::to_string).collect()),
            PrimitiveValue::U32(values) => Cow::Owned(values.iter().map(u32::to_string).collect()),
            PrimitiveValue::F64(values) => Cow::Owned(values.iter().map(f64::to_string).collect()),
        }
    }

    /// Retrieve the first value as an integer of type `T`.
    ///
    /// Textual values are parsed after trimming any padding.
    /// Returns `None` if the value is empty,
    /// cannot be parsed,
    /// or does not fit in `T`.
    pub fn to_int<T>(&self) -> Option<T>
    where
        T: NumCast + FromStr,
    {
        match self {
            PrimitiveValue::Empty => None,
            PrimitiveValue::Str(_) | PrimitiveValue::Strs(_) => {
                let values = self.to_multi_str();
                let first = values.first()?;
                first.trim_matches([' ', '\0']).parse().ok()
            }
            PrimitiveValue::U8(values) => values.first().and_then(|v| <T as NumCast>::from(*v)),
            PrimitiveValue::I16(values) => values.first().and_then(|v| <T as NumCast>::from(*v)),
            PrimitiveValue::U16(values) => values.first().and_then(|v| <T as NumCast>::from(*v)),
            PrimitiveValue::I32(values) => values.first().and_then(|v| <T as NumCast>::from(*v)),
            PrimitiveValue::U32(values) => values.first().and_then(|v| <T as NumCast>::from(*v)),
            PrimitiveValue::F64(values) => values.first().and_then(|v| <T as NumCast>::from(*v)),
        }
    }

    /// Retrieve the raw bytes of a byte value.
    ///
    /// Returns `None` if the value is not of the `U8` variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PrimitiveValue::U8(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
            write!(f, "{}", values.iter().format("\\"))
        }

        match self {
            PrimitiveValue::Empty => Ok(()),
            PrimitiveValue::Str(value) => f.write_str(value),
            PrimitiveValue::Strs(values) => join(f, values),
            PrimitiveValue::U8(values) => join(f, values),
            PrimitiveValue::I16(values) => join(f, values),
            PrimitiveValue::U16(values) => join(f, values),
            PrimitiveValue::I32(values) => join(f, values),
            PrimitiveValue::U32(values) => join(f, values),
            PrimitiveValue::F64(values) => join(f, values),
        }
    }
}
