//! Header timecode values.
//!
//! DDP carries the middle 32 bits of a 64-bit NTP timestamp: the low 16
//! bits of the seconds count and the high 16 bits of the fraction. That gives
//! ~15 µs resolution and a horizon that wraps every 65536 s (~18 h).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds from the NTP epoch (1900-01-01) to the Unix epoch.
pub const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Timecode for a point in time.
pub fn from_system_time(t: SystemTime) -> u32 {
    let (unix_secs, nanos) = match t.duration_since(UNIX_EPOCH) {
        Ok(since) => (since.as_secs() as i64, since.subsec_nanos()),
        Err(err) => {
            let before = err.duration();
            let mut secs = -(before.as_secs() as i64);
            let mut nanos = before.subsec_nanos();
            if nanos > 0 {
                secs -= 1;
                nanos = NANOS_PER_SEC as u32 - nanos;
            }
            (secs, nanos)
        }
    };

    let ntp_secs = unix_secs.wrapping_add(NTP_UNIX_OFFSET) as u64;
    let ntp_frac = (u64::from(nanos) << 32) / NANOS_PER_SEC;
    let ntp = (ntp_secs << 32) | ntp_frac;

    (ntp >> 16) as u32
}

/// Timecode for `delay` from now.
///
/// Delays past the range of `SystemTime` wrap around the 16-bit seconds
/// field, as any timecode does.
pub fn from_delay(delay: Duration) -> u32 {
    let now = SystemTime::now();
    match now.checked_add(delay) {
        Some(at) => from_system_time(at),
        None => from_system_time(now).wrapping_add(ticks(delay)),
    }
}

/// `delay` in timecode units (1/65536 s), modulo the timecode horizon.
fn ticks(delay: Duration) -> u32 {
    let secs = (delay.as_secs() as u32) << 16;
    let frac = ((u64::from(delay.subsec_nanos()) << 16) / NANOS_PER_SEC) as u32;
    secs.wrapping_add(frac)
}
