//! Header byte 2: pixel data format.
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! ┌───┬───────────────┬───────────┐
//! │ C │ type          │ size      │
//! └───┴───────────────┴───────────┘
//! ```
//!
//! Decoding never fails. Values without a name decode to the `Reserved`
//! variants and encode back to the same bits, so `PixelFormat` round-trips
//! every possible byte.

const VENDOR_BIT: u8 = 0x80;
const TYPE_SHIFT: u8 = 3;
const TYPE_MASK: u8 = 0x0F;
const SIZE_MASK: u8 = 0x07;

/// Color model of the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DataType {
    #[default]
    Undefined,
    Rgb,
    Hsl,
    Rgbw,
    Grayscale,
    /// Unassigned type value (5-15). Only produced by decoding.
    Reserved(u8),
}

impl DataType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & TYPE_MASK {
            0 => Self::Undefined,
            1 => Self::Rgb,
            2 => Self::Hsl,
            3 => Self::Rgbw,
            4 => Self::Grayscale,
            other => Self::Reserved(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Undefined => 0,
            Self::Rgb => 1,
            Self::Hsl => 2,
            Self::Rgbw => 3,
            Self::Grayscale => 4,
            Self::Reserved(bits) => bits & TYPE_MASK,
        }
    }

    /// Number of color channels per pixel, when the model defines one.
    pub fn channels(self) -> Option<usize> {
        match self {
            Self::Rgb | Self::Hsl => Some(3),
            Self::Rgbw => Some(4),
            Self::Grayscale => Some(1),
            Self::Undefined | Self::Reserved(_) => None,
        }
    }
}

/// Bit depth of one pixel element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DataSize {
    #[default]
    Undefined,
    Bits1,
    Bits4,
    Bits8,
    Bits16,
    Bits24,
    Bits32,
    /// Unassigned size value (7). Only produced by decoding.
    Reserved(u8),
}

impl DataSize {
    pub fn from_bits(bits: u8) -> Self {
        match bits & SIZE_MASK {
            0 => Self::Undefined,
            1 => Self::Bits1,
            2 => Self::Bits4,
            3 => Self::Bits8,
            4 => Self::Bits16,
            5 => Self::Bits24,
            6 => Self::Bits32,
            other => Self::Reserved(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Undefined => 0,
            Self::Bits1 => 1,
            Self::Bits4 => 2,
            Self::Bits8 => 3,
            Self::Bits16 => 4,
            Self::Bits24 => 5,
            Self::Bits32 => 6,
            Self::Reserved(bits) => bits & SIZE_MASK,
        }
    }

    /// Width in bits, for named sizes.
    pub fn width(self) -> Option<u32> {
        match self {
            Self::Bits1 => Some(1),
            Self::Bits4 => Some(4),
            Self::Bits8 => Some(8),
            Self::Bits16 => Some(16),
            Self::Bits24 => Some(24),
            Self::Bits32 => Some(32),
            Self::Undefined | Self::Reserved(_) => None,
        }
    }
}

/// Pixel format descriptor carried in every header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub data_type: DataType,
    pub data_size: DataSize,
    /// Vendor-defined ("customer") format; type and size are vendor specific.
    pub vendor_defined: bool,
}

impl PixelFormat {
    pub const fn new(data_type: DataType, data_size: DataSize) -> Self {
        Self {
            data_type,
            data_size,
            vendor_defined: false,
        }
    }

    /// RGB with 24-bit pixels, the protocol default.
    pub const fn rgb24() -> Self {
        Self::new(DataType::Rgb, DataSize::Bits24)
    }

    /// RGB with 8-bit elements.
    pub const fn rgb8() -> Self {
        Self::new(DataType::Rgb, DataSize::Bits8)
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        if self.vendor_defined {
            byte |= VENDOR_BIT;
        }
        byte |= self.data_type.bits() << TYPE_SHIFT;
        byte |= self.data_size.bits();
        byte
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            data_type: DataType::from_bits(byte >> TYPE_SHIFT),
            data_size: DataSize::from_bits(byte),
            vendor_defined: byte & VENDOR_BIT != 0,
        }
    }

    /// True when neither field holds a reserved value.
    pub fn is_known(self) -> bool {
        !matches!(self.data_type, DataType::Reserved(_))
            && !matches!(self.data_size, DataSize::Reserved(_))
    }
}

impl From<u8> for PixelFormat {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<PixelFormat> for u8 {
    fn from(format: PixelFormat) -> Self {
        format.to_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rgb_4bit() {
        let format = PixelFormat::from_byte(10);
        assert_eq!(format.data_type, DataType::Rgb);
        assert_eq!(format.data_size, DataSize::Bits4);
        assert!(!format.vendor_defined);
    }

    #[test]
    fn known_encodings() {
        assert_eq!(PixelFormat::rgb8().to_byte(), 0x0B);
        assert_eq!(PixelFormat::rgb24().to_byte(), 0x0D);
        assert_eq!(
            PixelFormat::new(DataType::Rgbw, DataSize::Bits32).to_byte(),
            0x1E
        );
        assert_eq!(
            PixelFormat::new(DataType::Grayscale, DataSize::Bits8).to_byte(),
            0x23
        );
        assert_eq!(PixelFormat::default().to_byte(), 0x00);
    }

    #[test]
    fn vendor_bit() {
        let format = PixelFormat {
            vendor_defined: true,
            ..PixelFormat::rgb8()
        };
        assert_eq!(format.to_byte(), 0x8B);
        assert!(PixelFormat::from_byte(0x8B).vendor_defined);
    }

    #[test]
    fn roundtrip_type_and_size_in_range() {
        for t in 0u8..8 {
            for s in 0u8..8 {
                for vendor in [false, true] {
                    let format = PixelFormat {
                        data_type: DataType::from_bits(t),
                        data_size: DataSize::from_bits(s),
                        vendor_defined: vendor,
                    };
                    assert_eq!(PixelFormat::from_byte(format.to_byte()), format);
                }
            }
        }
    }

    #[test]
    fn every_byte_survives_decode_encode() {
        for byte in 0u8..=255 {
            assert_eq!(PixelFormat::from_byte(byte).to_byte(), byte);
        }
    }

    #[test]
    fn reserved_values_are_not_errors() {
        let format = PixelFormat::from_byte(0x2F);
        assert_eq!(format.data_type, DataType::Reserved(5));
        assert_eq!(format.data_size, DataSize::Reserved(7));
        assert!(!format.is_known());
        assert!(PixelFormat::rgb24().is_known());
    }

    #[test]
    fn channel_counts() {
        assert_eq!(DataType::Rgb.channels(), Some(3));
        assert_eq!(DataType::Rgbw.channels(), Some(4));
        assert_eq!(DataType::Grayscale.channels(), Some(1));
        assert_eq!(DataType::Reserved(9).channels(), None);
        assert_eq!(DataSize::Bits24.width(), Some(24));
        assert_eq!(DataSize::Undefined.width(), None);
    }
}
