//! Binary data parsing utilities.
//!
//! Structured storage files record their byte order in the header, so every
//! reader here is bound to a [`ByteOrder`] instead of assuming little-endian.
//! Reads never zero-fill: a slice that is too short is reported as
//! [`BinaryError::InsufficientData`].

use encoding_rs::{UTF_16BE, UTF_16LE};
use thiserror::Error;
use zerocopy::{BE, F32, F64, FromBytes, I16, I32, I64, LE, U16, U32, U64};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    #[error("Insufficient data: expected {expected}, got {available}")]
    InsufficientData { expected: usize, available: usize },
    /// Failed to parse the data
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

/// Byte order of the multi-byte fields in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Raw header bytes announcing a little-endian file.
    pub const LITTLE_ENDIAN_MARK: [u8; 2] = [0xFE, 0xFF];
    /// Raw header bytes announcing a big-endian file.
    pub const BIG_ENDIAN_MARK: [u8; 2] = [0xFF, 0xFE];

    /// Interpret the two raw byte-order bytes of a header.
    ///
    /// # Examples
    ///
    /// ```
    /// use olestorage::common::binary::ByteOrder;
    /// assert_eq!(ByteOrder::from_mark([0xFE, 0xFF]), Some(ByteOrder::Little));
    /// assert_eq!(ByteOrder::from_mark([0xFF, 0xFE]), Some(ByteOrder::Big));
    /// assert_eq!(ByteOrder::from_mark([0x00, 0x00]), None);
    /// ```
    pub fn from_mark(mark: [u8; 2]) -> Option<Self> {
        match mark {
            Self::LITTLE_ENDIAN_MARK => Some(ByteOrder::Little),
            Self::BIG_ENDIAN_MARK => Some(ByteOrder::Big),
            _ => None,
        }
    }

    /// The raw header bytes for this byte order.
    pub fn mark(self) -> [u8; 2] {
        match self {
            ByteOrder::Little => Self::LITTLE_ENDIAN_MARK,
            ByteOrder::Big => Self::BIG_ENDIAN_MARK,
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Little => f.write_str("little endian"),
            ByteOrder::Big => f.write_str("big endian"),
        }
    }
}

/// Borrow `len` bytes at `offset`, or report how many were missing.
#[inline]
fn field(data: &[u8], offset: usize, len: usize) -> BinaryResult<&[u8]> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| BinaryError::Parse("Field offset overflows".to_string()))?;
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        expected: end,
        available: data.len(),
    })
}

macro_rules! decode_field {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $wrapper:ident, $width:expr) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&self, data: &[u8], offset: usize) -> BinaryResult<$ty> {
            let bytes = field(data, offset, $width)?;
            let value = match self.order {
                ByteOrder::Little => $wrapper::<LE>::read_from_bytes(bytes)
                    .map(|v| v.get())
                    .map_err(|_| ()),
                ByteOrder::Big => $wrapper::<BE>::read_from_bytes(bytes)
                    .map(|v| v.get())
                    .map_err(|_| ()),
            };
            value.map_err(|_| {
                BinaryError::Parse(concat!("Failed to read ", stringify!($ty)).to_string())
            })
        }
    };
}

/// Decodes fixed-width fields in one byte order.
///
/// # Examples
///
/// ```
/// use olestorage::common::binary::{ByteOrder, FieldDecoder};
/// let data = [0x12, 0x34];
/// assert_eq!(FieldDecoder::new(ByteOrder::Little).read_u16(&data, 0).unwrap(), 0x3412);
/// assert_eq!(FieldDecoder::new(ByteOrder::Big).read_u16(&data, 0).unwrap(), 0x1234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecoder {
    order: ByteOrder,
}

impl FieldDecoder {
    pub const fn new(order: ByteOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    decode_field!(
        /// Read a u16 at the given offset.
        read_u16, u16, U16, 2
    );
    decode_field!(
        /// Read an i16 at the given offset.
        read_i16, i16, I16, 2
    );
    decode_field!(
        /// Read a u32 at the given offset.
        read_u32, u32, U32, 4
    );
    decode_field!(
        /// Read an i32 at the given offset.
        read_i32, i32, I32, 4
    );
    decode_field!(
        /// Read a u64 at the given offset.
        read_u64, u64, U64, 8
    );
    decode_field!(
        /// Read an i64 at the given offset.
        read_i64, i64, I64, 8
    );
    decode_field!(
        /// Read an IEEE-754 single at the given offset.
        read_f32, f32, F32, 4
    );
    decode_field!(
        /// Read an IEEE-754 double at the given offset.
        read_f64, f64, F64, 8
    );

    /// Decode `byte_len` bytes of UTF-16 text at `offset`.
    ///
    /// Trailing NUL padding is dropped and unpaired surrogates are replaced
    /// with U+FFFD. An odd byte count is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use olestorage::common::binary::{ByteOrder, FieldDecoder};
    /// let data = [0x48, 0x00, 0x69, 0x00, 0x00, 0x00];
    /// let text = FieldDecoder::new(ByteOrder::Little).read_utf16(&data, 0, 6).unwrap();
    /// assert_eq!(text, "Hi");
    /// ```
    pub fn read_utf16(&self, data: &[u8], offset: usize, byte_len: usize) -> BinaryResult<String> {
        if byte_len % 2 != 0 {
            return Err(BinaryError::Parse(format!(
                "UTF-16 text needs an even byte count, got {}",
                byte_len
            )));
        }
        let bytes = field(data, offset, byte_len)?;
        let encoding = match self.order {
            ByteOrder::Little => UTF_16LE,
            ByteOrder::Big => UTF_16BE,
        };
        let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
        Ok(text.trim_end_matches('\0').to_string())
    }

    /// Read a whole array of i32 values, as used by allocation tables.
    pub fn read_i32_array(&self, data: &[u8]) -> BinaryResult<Vec<i32>> {
        if data.len() % 4 != 0 {
            return Err(BinaryError::Parse(format!(
                "Table length {} is not a multiple of 4",
                data.len()
            )));
        }
        (0..data.len() / 4)
            .map(|i| self.read_i32(data, i * 4))
            .collect()
    }
}
