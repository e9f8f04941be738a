//! Parameter objects given to codecs.
//!
//! A [`RepresentationParameter`] describes a specific compressed representation
//! (such as "near-lossless with a maximum deviation of 2"),
//! whereas a [`CodecParameter`] holds the static configuration of a codec
//! (thresholds, fragmentation policy, UID policy, ...).
//! Both are immutable value objects
//! which codecs downcast to their own concrete types.
use std::any::Any;
use std::fmt;

/// Base trait of all parameter objects,
/// providing type-erased access and equality.
///
/// It is implemented automatically for every type
/// which is `'static`, thread safe, comparable and debuggable.
pub trait ParameterObject: Any + Send + Sync + fmt::Debug {
    /// Obtain a reference to this object as [`Any`],
    /// for downcasting into the concrete parameter type.
    fn as_any(&self) -> &dyn Any;

    /// Check whether this object is equal to another one.
    ///
    /// Objects of different concrete types are never equal.
    fn eq_dyn(&self, other: &dyn Any) -> bool;
}

impl<T> ParameterObject for T
where
    T: Any + Send + Sync + fmt::Debug + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_dyn(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().map_or(false, |other| self == other)
    }
}

/// A codec specific description
/// of the source or target compressed representation.
pub trait RepresentationParameter: ParameterObject {
    /// Whether this representation is mathematically lossless.
    fn is_lossless(&self) -> bool;
}

impl PartialEq for dyn RepresentationParameter {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other.as_any())
    }
}

/// Codec specific configuration
/// controlling how compression and decompression is performed.
pub trait CodecParameter: ParameterObject {}

impl PartialEq for dyn CodecParameter {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other.as_any())
    }
}

/// Representation parameter for codecs without any parameter,
/// such as those of native transfer syntaxes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NoRepresentationParameter;

impl RepresentationParameter for NoRepresentationParameter {
    fn is_lossless(&self) -> bool {
        true
    }
}

/// Codec parameter for codecs without any configuration.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NoCodecParameter;

impl CodecParameter for NoCodecParameter {}

/// Downcast a representation parameter into its concrete type.
pub fn downcast_representation<T: RepresentationParameter>(
    param: &dyn RepresentationParameter,
) -> Option<&T> {
    param.as_any().downcast_ref::<T>()
}

/// Downcast a codec parameter into its concrete type.
pub fn downcast_codec<T: CodecParameter>(param: &dyn CodecParameter) -> Option<&T> {
    param.as_any().downcast_ref::<T>()
}
