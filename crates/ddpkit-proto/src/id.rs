//! Well-known destination IDs.
//!
//! Only [`RESERVED`] is enforced (by the controller); the rest are naming
//! conventions receivers are free to interpret.

/// Never addressed.
pub const RESERVED: u8 = 0;

/// Default output device.
pub const DEFAULT_DISPLAY: u8 = 1;

/// JSON control channel (read/write).
pub const CONTROL: u8 = 246;

/// JSON config channel (read/write).
pub const CONFIG: u8 = 250;

/// JSON status channel (read only).
pub const STATUS: u8 = 251;

/// DMX transit.
pub const DMX_TRANSIT: u8 = 254;

/// All devices.
pub const BROADCAST: u8 = 255;

/// Returns a human-readable name for a destination ID.
pub fn id_name(id: u8) -> &'static str {
    match id {
        RESERVED => "RESERVED",
        DEFAULT_DISPLAY => "DISPLAY",
        CONTROL => "CONTROL",
        CONFIG => "CONFIG",
        STATUS => "STATUS",
        DMX_TRANSIT => "DMX",
        BROADCAST => "BROADCAST",
        _ => "CUSTOM",
    }
}

/// Returns true for IDs a controller must not address.
pub fn is_reserved(id: u8) -> bool {
    id == RESERVED
}
