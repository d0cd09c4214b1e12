//! Header byte 0: protocol version and packet flags.
//!
//! ```text
//!  7   6   5   4   3   2   1   0
//! ┌───────┬───┬───┬───┬───┬───┬───┐
//! │ V V   │ - │ T │ S │ R │ Q │ P │
//! └───────┴───┴───┴───┴───┴───┴───┘
//! ```

/// Version 1 tag, always written on encode.
pub const VERSION_1: u8 = 0x40;

const PUSH: u8 = 0x01;
const QUERY: u8 = 0x02;
const REPLY: u8 = 0x04;
const STORAGE: u8 = 0x08;
const TIMECODE: u8 = 0x10;

/// The five DDP flag bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConfigFlags {
    /// A 32-bit timecode follows the length field.
    pub timecode: bool,
    /// Payload addresses persistent storage rather than the display buffer.
    pub storage: bool,
    /// Packet is a reply to a query.
    pub reply: bool,
    /// Packet requests data from the receiver.
    pub query: bool,
    /// Render buffered data now.
    pub push: bool,
}

impl ConfigFlags {
    /// Flags for a plain "display this now" frame.
    pub const fn push() -> Self {
        Self {
            timecode: false,
            storage: false,
            reply: false,
            query: false,
            push: true,
        }
    }

    /// Encode to the flags byte. The version bits are always `01`.
    pub fn to_byte(self) -> u8 {
        let mut byte = VERSION_1;
        if self.timecode {
            byte |= TIMECODE;
        }
        if self.storage {
            byte |= STORAGE;
        }
        if self.reply {
            byte |= REPLY;
        }
        if self.query {
            byte |= QUERY;
        }
        if self.push {
            byte |= PUSH;
        }
        byte
    }

    /// Decode a flags byte. Version and reserved bits are ignored.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            timecode: byte & TIMECODE != 0,
            storage: byte & STORAGE != 0,
            reply: byte & REPLY != 0,
            query: byte & QUERY != 0,
            push: byte & PUSH != 0,
        }
    }
}

impl From<u8> for ConfigFlags {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<ConfigFlags> for u8 {
    fn from(flags: ConfigFlags) -> Self {
        flags.to_byte()
    }
}
