//! Frame encoder for outgoing messages.
//!
//! All functions are pure: they only look at their arguments, so they can be
//! called from any context without touching a link instance.
//!
//! Fixed-size messages are returned as arrays. Sysex messages have a variable
//! length and are written into a caller-provided buffer.
//!
//! # Example
//!
//! ```
//! use firmata_proto::encoder::{encode_analog, encode_sysex, sysex_len};
//! use firmata_proto::command::{ANALOG_MESSAGE, START_SYSEX, END_SYSEX};
//!
//! assert_eq!(encode_analog(3, 1000), [ANALOG_MESSAGE | 3, 0x68, 0x07]);
//!
//! let mut buf = [0u8; 8];
//! let len = encode_sysex(0x01, &[10, 20, 30], &mut buf).unwrap();
//! assert_eq!(len, sysex_len(3));
//! assert_eq!(&buf[..len], &[START_SYSEX, 0x01, 10, 20, 30, END_SYSEX]);
//! ```

use crate::command::{
    ANALOG_MESSAGE, DIGITAL_MESSAGE, END_SYSEX, REPORT_ANALOG, REPORT_DIGITAL, REPORT_VERSION,
    SET_PIN_MODE, START_SYSEX, SYSTEM_RESET,
};
use crate::config::ProtocolVersion;

/// Error type for encoding into caller buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The output buffer is too small to hold the encoded message.
    BufferTooSmall,
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

/// Split a 14-bit value into its low and high 7-bit halves.
///
/// Bits above bit 13 are discarded.
#[inline]
#[must_use]
pub const fn split_14bit(value: u16) -> [u8; 2] {
    [(value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8]
}

/// Join two 7-bit halves (low first) into a 14-bit value.
#[inline]
#[must_use]
pub const fn join_14bit(lsb: u8, msb: u8) -> u16 {
    ((msb as u16 & 0x7F) << 7) | (lsb as u16 & 0x7F)
}

#[inline]
const fn channel_message(command: u8, channel: u8, value: u16) -> [u8; 3] {
    let [lsb, msb] = split_14bit(value);
    [command | (channel & 0x0F), lsb, msb]
}

/// Encode an analog value report for `pin` (0-15).
///
/// Layout: `[ANALOG_MESSAGE | pin, value & 0x7F, value >> 7]`.
#[inline]
#[must_use]
pub const fn encode_analog(pin: u8, value: u16) -> [u8; 3] {
    channel_message(ANALOG_MESSAGE, pin, value)
}

/// Encode up to 14 digital pins of `port` as a bitmask.
///
/// Bits 0-6 travel in the first data byte, bits 7-13 in the second.
#[inline]
#[must_use]
pub const fn encode_digital_port_pair(port: u8, value: u16) -> [u8; 3] {
    channel_message(DIGITAL_MESSAGE, port, value)
}

/// Encode a request to enable or disable analog reporting for `channel`.
#[inline]
#[must_use]
pub const fn encode_report_analog(channel: u8, enable: bool) -> [u8; 2] {
    [REPORT_ANALOG | (channel & 0x0F), enable as u8]
}

/// Encode a request to enable or disable digital reporting for `port`.
#[inline]
#[must_use]
pub const fn encode_report_digital(port: u8, enable: bool) -> [u8; 2] {
    [REPORT_DIGITAL | (port & 0x0F), enable as u8]
}

/// Encode a pin mode change. Both `pin` and `mode` are masked to 7 bits.
#[inline]
#[must_use]
pub const fn encode_set_pin_mode(pin: u8, mode: u8) -> [u8; 3] {
    [SET_PIN_MODE, pin & 0x7F, mode & 0x7F]
}

/// Encode the version announcement: marker, minor, major.
#[inline]
#[must_use]
pub const fn encode_version(version: ProtocolVersion) -> [u8; 3] {
    [REPORT_VERSION, version.minor & 0x7F, version.major & 0x7F]
}

/// Encode a version request.
#[inline]
#[must_use]
pub const fn encode_report_version() -> [u8; 1] {
    [REPORT_VERSION]
}

/// Encode a system reset.
#[inline]
#[must_use]
pub const fn encode_system_reset() -> [u8; 1] {
    [SYSTEM_RESET]
}

/// Encoded length of a sysex message carrying `payload_len` data bytes.
#[inline]
#[must_use]
pub const fn sysex_len(payload_len: usize) -> usize {
    payload_len + 3
}

/// Encode an extended command as `[START_SYSEX, command, payload.., END_SYSEX]`.
///
/// Payload bytes are copied as-is; keeping them below 128 is the caller's
/// responsibility.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if `buf` cannot hold the message.
pub fn encode_sysex(command: u8, payload: &[u8], buf: &mut [u8]) -> Result<usize, EncodeError> {
    let len = sysex_len(payload.len());
    if buf.len() < len {
        return Err(EncodeError::BufferTooSmall);
    }

    buf[0] = START_SYSEX;
    buf[1] = command;
    buf[2..2 + payload.len()].copy_from_slice(payload);
    buf[len - 1] = END_SYSEX;
    Ok(len)
}

/// Encode an extended command into a `heapless::Vec`.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if `N` is not large enough.
pub fn encode_sysex_vec<const N: usize>(
    command: u8,
    payload: &[u8],
) -> Result<heapless::Vec<u8, N>, EncodeError> {
    let mut vec = heapless::Vec::new();
    vec.resize(sysex_len(payload.len()), 0)
        .map_err(|_| EncodeError::BufferTooSmall)?;
    encode_sysex(command, payload, &mut vec)?;
    Ok(vec)
}

/// Copy a fixed message into `buf`, returning its length.
pub(crate) fn write_fixed(bytes: &[u8], buf: &mut [u8]) -> Result<usize, EncodeError> {
    let dst = buf
        .get_mut(..bytes.len())
        .ok_or(EncodeError::BufferTooSmall)?;
    dst.copy_from_slice(bytes);
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_analog_layout() {
        assert_eq!(encode_analog(0, 0), [0xE0, 0x00, 0x00]);
        assert_eq!(encode_analog(15, 0x3FFF), [0xEF, 0x7F, 0x7F]);
        assert_eq!(encode_analog(2, 200), [0xE2, 200 & 0x7F, 200 >> 7]);
    }

    #[test]
    fn test_encode_analog_masks_pin() {
        // Only the low nibble of the pin survives
        assert_eq!(encode_analog(0x13, 5), encode_analog(0x03, 5));
    }

    #[test]
    fn test_encode_digital_port_pair() {
        let bytes = encode_digital_port_pair(1, 0b10_0000_0000_0001);
        assert_eq!(bytes, [DIGITAL_MESSAGE | 1, 0x01, 0x40]);
    }

    #[test]
    fn test_split_discards_bits_above_14() {
        assert_eq!(split_14bit(0xFFFF), [0x7F, 0x7F]);
        assert_eq!(join_14bit(0x7F, 0x7F), 0x3FFF);
        assert_eq!(join_14bit(0x68, 0x07), 1000);
    }

    #[test]
    fn test_encode_sysex_boundaries() {
        let mut buf = [0u8; 16];
        let len = encode_sysex(0x01, &[10, 20, 30], &mut buf).unwrap();
        assert_eq!(&buf[..len], &[START_SYSEX, 0x01, 10, 20, 30, END_SYSEX]);
    }

    #[test]
    fn test_encode_sysex_empty_payload() {
        let mut buf = [0u8; 3];
        let len = encode_sysex(0x71, &[], &mut buf).unwrap();
        assert_eq!(&buf[..len], &[START_SYSEX, 0x71, END_SYSEX]);
    }

    #[test]
    fn test_encode_sysex_buffer_too_small() {
        let mut buf = [0u8; 5];
        assert_eq!(
            encode_sysex(0x01, &[1, 2, 3], &mut buf),
            Err(EncodeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_encode_sysex_vec() {
        let vec = encode_sysex_vec::<8>(0x02, &[1, 2]).unwrap();
        assert_eq!(vec.as_slice(), &[START_SYSEX, 0x02, 1, 2, END_SYSEX]);
        assert_eq!(
            encode_sysex_vec::<4>(0x02, &[1, 2]),
            Err(EncodeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_encode_control_messages() {
        assert_eq!(encode_report_analog(3, true), [REPORT_ANALOG | 3, 1]);
        assert_eq!(encode_report_digital(0, false), [REPORT_DIGITAL, 0]);
        assert_eq!(encode_set_pin_mode(13, 1), [SET_PIN_MODE, 13, 1]);
        assert_eq!(encode_system_reset(), [SYSTEM_RESET]);
        assert_eq!(encode_report_version(), [REPORT_VERSION]);
    }

    #[test]
    fn test_encode_version_order() {
        let version = ProtocolVersion { major: 2, minor: 1 };
        assert_eq!(encode_version(version), [REPORT_VERSION, 1, 2]);
    }

    #[test]
    fn test_write_fixed() {
        let mut buf = [0u8; 2];
        assert_eq!(write_fixed(&[1, 2], &mut buf), Ok(2));
        assert_eq!(write_fixed(&[1, 2, 3], &mut buf), Err(EncodeError::BufferTooSmall));
    }
}
