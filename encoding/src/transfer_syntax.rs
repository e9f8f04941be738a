//! Module containing the DICOM transfer syntax descriptor.
//!
//! Codecs only need to know a few properties of a transfer syntax:
//! whether its pixel data is encapsulated,
//! the byte order of native pixel data,
//! and whether it implies a lossy compression process.
//! The known transfer syntaxes are listed
//! in the `dicom-codec-registry` crate.
use std::fmt;

pub use byteordered::Endianness;

/// A DICOM transfer syntax specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferSyntax {
    /// The unique identifier of the transfer syntax.
    uid: &'static str,
    /// The name of the transfer syntax.
    name: &'static str,
    /// The byte order of data.
    byte_order: Endianness,
    /// Whether the transfer syntax mandates an explicit value representation,
    /// or the VR is implicit.
    explicit_vr: bool,
    /// Whether pixel data is stored as a sequence of compressed fragments.
    encapsulated: bool,
    /// Whether the compression process may lose information.
    lossy: bool,
}

impl TransferSyntax {
    /// Create a new transfer syntax specifier for native pixel data.
    pub const fn new_native(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
    ) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order,
            explicit_vr,
            encapsulated: false,
            lossy: false,
        }
    }

    /// Create a new transfer syntax specifier for encapsulated pixel data,
    /// which is always in explicit VR little endian.
    pub const fn new_encapsulated(uid: &'static str, name: &'static str, lossy: bool) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order: Endianness::Little,
            explicit_vr: true,
            encapsulated: true,
            lossy,
        }
    }

    /// Obtain this transfer syntax' unique identifier.
    pub const fn uid(&self) -> &'static str {
        self.uid
    }

    /// Obtain the name of this transfer syntax.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Obtain this transfer syntax' expected endianness.
    pub const fn endianness(&self) -> Endianness {
        self.byte_order
    }

    /// Check whether this transfer syntax specifier
    /// mandates an explicit value representation.
    pub const fn is_explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    /// Check whether pixel data is encapsulated in this transfer syntax.
    pub const fn is_encapsulated(&self) -> bool {
        self.encapsulated
    }

    /// Check whether pixel data is native (not encapsulated)
    /// in this transfer syntax.
    pub const fn is_native(&self) -> bool {
        !self.encapsulated
    }

    /// Check whether this transfer syntax implies lossy compression.
    pub const fn is_lossy(&self) -> bool {
        self.lossy
    }

    /// Check whether this transfer syntax has the given UID,
    /// ignoring trailing null padding.
    pub fn matches_uid(&self, uid: &str) -> bool {
        self.uid == uid.trim_end_matches('\0')
    }
}

impl fmt::Display for TransferSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_properties() {
        const TS: TransferSyntax =
            TransferSyntax::new_encapsulated("1.2.840.10008.1.2.4.81", "JPEG-LS Lossy", true);
        assert!(TS.is_encapsulated());
        assert!(TS.is_lossy());
        assert_eq!(TS.endianness(), Endianness::Little);
        assert!(TS.matches_uid("1.2.840.10008.1.2.4.81\0"));
        assert!(!TS.matches_uid("1.2.840.10008.1.2.4.80"));

        const BE: TransferSyntax = TransferSyntax::new_native(
            "1.2.840.10008.1.2.2",
            "Explicit VR Big Endian",
            Endianness::Big,
            true,
        );
        assert!(BE.is_native());
        assert_eq!(BE.to_string(), "Explicit VR Big Endian (1.2.840.10008.1.2.2)");
    }
}
