use core::fmt;
use core::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hex::FromHex as _;

use crate::error::{Error, FormatError};

/// Byte width of an encoded [`Id`].
pub const ID_LEN: usize = 16;

/// Length of the hex string form (32 lowercase chars).
pub const HEX_LEN: usize = 2 * ID_LEN;

/// Length of the unpadded URL-safe base64 string form (22 chars).
pub const BASE64_LEN: usize = 22;

// Big-endian field offsets within the 16-byte layout.
const EPOCH_RANGE: core::ops::Range<usize> = 0..2;
const TIMESTAMP_RANGE: core::ops::Range<usize> = 2..10;
const REGION_RANGE: core::ops::Range<usize> = 10..12;
const NODE_RANGE: core::ops::Range<usize> = 12..14;
const SEQUENCE_RANGE: core::ops::Range<usize> = 14..16;

/// A 128-bit, time-ordered, decentralized identifier.
///
/// The raw form is 16 big-endian bytes, so the derived [`Ord`] (byte
/// lexicographic), the [`Id::to_u128`] numeric order, and generation
/// order all coincide.
///
/// `Id`s are minted by [`crate::Generator::next`] or reconstructed from an
/// external string with [`Id::parse`]; there is no public field-level
/// constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; ID_LEN]);

/// The five fields packed into an [`Id`], as returned by [`Id::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts {
    /// Generation counter, bumped on irrecoverable clock rollback.
    pub epoch: u16,
    /// Milliseconds since the generator's epoch (see
    /// [`crate::CUSTOM_EPOCH`]).
    pub timestamp: u64,
    /// Deployment region that minted the ID.
    pub region_id: u16,
    /// Node within the region that minted the ID.
    pub node_id: u16,
    /// Disambiguates IDs minted within the same millisecond.
    pub sequence: u16,
}

impl Id {
    /// Packs the five fields into the big-endian byte layout.
    ///
    /// Crate-internal: populated IDs only come out of a generator (or
    /// [`Id::parse`]), never from arbitrary caller-chosen fields.
    pub(crate) fn from_parts(
        epoch: u16,
        timestamp: u64,
        region_id: u16,
        node_id: u16,
        sequence: u16,
    ) -> Self {
        let mut bytes = [0u8; ID_LEN];
        bytes[EPOCH_RANGE].copy_from_slice(&epoch.to_be_bytes());
        bytes[TIMESTAMP_RANGE].copy_from_slice(&timestamp.to_be_bytes());
        bytes[REGION_RANGE].copy_from_slice(&region_id.to_be_bytes());
        bytes[NODE_RANGE].copy_from_slice(&node_id.to_be_bytes());
        bytes[SEQUENCE_RANGE].copy_from_slice(&sequence.to_be_bytes());
        Self(bytes)
    }

    pub(crate) fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 16-byte form, read-only.
    ///
    /// This is the canonical form for storage and transmission whenever
    /// byte-order-comparable sorting is wanted.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Returns the ID as its 128-bit numeric value.
    pub fn to_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Returns the 32-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the 22-character unpadded URL-safe base64 form.
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Parses an external string back into an [`Id`].
    ///
    /// The encoding is chosen by input byte length alone, a closed
    /// three-way dispatch:
    ///
    /// - 16 bytes: taken verbatim as the raw form. Only safe for strings
    ///   that round-tripped inside the program; a UTF-8 transcoding hop
    ///   will have damaged raw bytes.
    /// - 22 chars: unpadded URL-safe base64, must decode to 16 bytes.
    /// - 32 chars: hex, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for any other length, or when the
    /// length-implied decoding fails.
    ///
    /// # Example
    ///
    /// ```
    /// use lexid::{Generator, Id};
    ///
    /// let id = Generator::new(0, 0)?.next()?;
    /// assert_eq!(Id::parse(&id.to_hex())?, id);
    /// assert_eq!(Id::parse(&id.to_base64())?, id);
    /// # Ok::<(), lexid::Error>(())
    /// ```
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.len() {
            ID_LEN => {
                let mut bytes = [0u8; ID_LEN];
                bytes.copy_from_slice(s.as_bytes());
                Ok(Self(bytes))
            }
            BASE64_LEN => {
                let decoded = URL_SAFE_NO_PAD
                    .decode(s)
                    .map_err(FormatError::Base64)?;
                let bytes: [u8; ID_LEN] = decoded
                    .try_into()
                    .map_err(|v: Vec<u8>| FormatError::DecodedLength { len: v.len() })?;
                Ok(Self(bytes))
            }
            HEX_LEN => {
                let bytes = <[u8; ID_LEN]>::from_hex(s).map_err(FormatError::Hex)?;
                Ok(Self(bytes))
            }
            len => Err(FormatError::UnsupportedLength { len }.into()),
        }
    }

    /// Unpacks the five fields from their fixed big-endian offsets.
    ///
    /// Infallible: the fixed layout guarantees every 16-byte value is
    /// well-formed.
    pub fn decode(&self) -> IdParts {
        let be16 = |r: core::ops::Range<usize>| {
            u16::from_be_bytes(self.0[r].try_into().expect("2-byte slice"))
        };
        IdParts {
            epoch: be16(EPOCH_RANGE),
            timestamp: u64::from_be_bytes(
                self.0[TIMESTAMP_RANGE].try_into().expect("8-byte slice"),
            ),
            region_id: be16(REGION_RANGE),
            node_id: be16(NODE_RANGE),
            sequence: be16(SEQUENCE_RANGE),
        }
    }
}

impl fmt::Display for Id {
    /// The default string form is the hex encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[u8]> for Id {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Id {
        Id::from_parts(3, 0x0102_0304_0506_0708, 7, 42, 65535)
    }

    #[test]
    fn field_round_trip() {
        let parts = sample().decode();
        assert_eq!(
            parts,
            IdParts {
                epoch: 3,
                timestamp: 0x0102_0304_0506_0708,
                region_id: 7,
                node_id: 42,
                sequence: 65535,
            }
        );
    }

    #[test]
    fn layout_is_big_endian() {
        let id = Id::from_parts(0x0102, 0x0304_0506_0708_090a, 0x0b0c, 0x0d0e, 0x0f10);
        assert_eq!(
            id.as_bytes(),
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]
        );
        assert_eq!(id.to_u128(), 0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10);
    }

    #[test]
    fn hex_round_trip() {
        let id = sample();
        let hex = id.to_hex();
        assert_eq!(hex.len(), HEX_LEN);
        assert_eq!(hex, hex.to_lowercase());
        assert_eq!(Id::parse(&hex).unwrap(), id);
        // decode is case-insensitive
        assert_eq!(Id::parse(&hex.to_uppercase()).unwrap(), id);
    }

    #[test]
    fn base64_round_trip() {
        let id = sample();
        let b64 = id.to_base64();
        assert_eq!(b64.len(), BASE64_LEN);
        assert_eq!(Id::parse(&b64).unwrap(), id);
    }

    #[test]
    fn raw_bytes_round_trip() {
        // only valid for byte sequences that survive as a str unchanged
        let ascii = Id::from_bytes(*b"0123456789abcdef");
        let s = core::str::from_utf8(ascii.as_bytes()).unwrap();
        assert_eq!(Id::parse(s).unwrap(), ascii);
    }

    #[test]
    fn display_matches_hex() {
        let id = sample();
        assert_eq!(id.to_string(), id.to_hex());
        let back: Id = id.to_string().parse().unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parse_rejects_bad_lengths() {
        for input in ["", "abc", &"a".repeat(31), &"a".repeat(33)] {
            match Id::parse(input) {
                Err(Error::InvalidFormat(FormatError::UnsupportedLength { len })) => {
                    assert_eq!(len, input.len());
                }
                other => panic!("expected UnsupportedLength, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_rejects_bad_hex_digit() {
        let mut s = sample().to_hex();
        s.replace_range(0..1, "g");
        assert!(matches!(
            Id::parse(&s),
            Err(Error::InvalidFormat(FormatError::Hex(_)))
        ));
    }

    #[test]
    fn parse_rejects_bad_base64_alphabet() {
        // '/' is standard-alphabet only, not URL-safe
        let mut s = sample().to_base64();
        s.replace_range(0..1, "/");
        assert!(matches!(
            Id::parse(&s),
            Err(Error::InvalidFormat(FormatError::Base64(_)))
        ));
    }

    #[test]
    fn byte_order_matches_numeric_order() {
        let a = Id::from_parts(0, 100, 9, 9, 5);
        let b = Id::from_parts(0, 101, 0, 0, 0);
        let c = Id::from_parts(1, 0, 0, 0, 0);
        assert!(a < b && b < c);
        assert!(a.to_u128() < b.to_u128() && b.to_u128() < c.to_u128());
        assert!(a.as_bytes() < b.as_bytes() && b.as_bytes() < c.as_bytes());
    }
}
