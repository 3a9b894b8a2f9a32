//! Wire constants and status byte classification.
//!
//! Every message starts with a status byte (high bit set). Status bytes below
//! `0xF0` are *channel commands*: the high nibble is the command and the low
//! nibble the channel, pin or port. Status bytes from `0xF0` up are *system
//! commands* and carry no channel.

/// Digital port pair report: 14-bit pin mask split over two data bytes.
pub const DIGITAL_MESSAGE: u8 = 0x90;

/// Enable/disable analog reporting for a channel (1 data byte).
pub const REPORT_ANALOG: u8 = 0xC0;

/// Enable/disable digital reporting for a port (1 data byte).
pub const REPORT_DIGITAL: u8 = 0xD0;

/// Analog value report: 14-bit value split over two data bytes.
pub const ANALOG_MESSAGE: u8 = 0xE0;

/// Start of a variable-length extended (sysex) message.
pub const START_SYSEX: u8 = 0xF0;

/// Set pin mode: pin and mode data bytes.
pub const SET_PIN_MODE: u8 = 0xF4;

/// End of a sysex message.
pub const END_SYSEX: u8 = 0xF7;

/// Request (inbound) or announce (outbound) the protocol version.
pub const REPORT_VERSION: u8 = 0xF9;

/// Clear all parser state.
pub const SYSTEM_RESET: u8 = 0xFF;

/// Capacity of the fixed payload buffer.
pub const MAX_DATA_BYTES: usize = 2;

/// Largest value representable in two 7-bit data bytes.
pub const MAX_14BIT: u16 = 0x3FFF;

/// Returns `true` for 7-bit clean data bytes.
#[inline]
#[must_use]
pub const fn is_data_byte(byte: u8) -> bool {
    byte < 0x80
}

/// A status byte split into its command and channel parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Channel command (`byte < 0xF0`).
    Channel {
        /// High nibble of the status byte.
        command: u8,
        /// Low nibble of the status byte.
        channel: u8,
    },
    /// System command (`byte >= 0xF0`), the full byte is the identifier.
    System(u8),
}

impl Status {
    /// Classify a status byte.
    ///
    /// ```
    /// use firmata_proto::command::{Status, ANALOG_MESSAGE};
    ///
    /// assert_eq!(
    ///     Status::from_byte(0xE5),
    ///     Status::Channel { command: ANALOG_MESSAGE, channel: 5 }
    /// );
    /// assert_eq!(Status::from_byte(0xFF), Status::System(0xFF));
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        if byte < 0xF0 {
            Self::Channel {
                command: byte & 0xF0,
                channel: byte & 0x0F,
            }
        } else {
            Self::System(byte)
        }
    }

    /// The command identifier with any channel stripped.
    #[inline]
    #[must_use]
    pub const fn command(self) -> u8 {
        match self {
            Self::Channel { command, .. } => command,
            Self::System(command) => command,
        }
    }

    /// The channel for channel commands, `None` for system commands.
    #[inline]
    #[must_use]
    pub const fn channel(self) -> Option<u8> {
        match self {
            Self::Channel { channel, .. } => Some(channel),
            Self::System(_) => None,
        }
    }
}

/// The closed set of fixed-payload command classes a handler can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandClass {
    /// Analog value report, handler receives `(channel, value)`.
    Analog,
    /// Digital port pair report, handler receives `(port, mask)`.
    Digital,
    /// Pin mode change, handler receives `(pin, mode)`.
    SetPinMode,
    /// Analog reporting toggle, handler receives `(channel, enable)`.
    ReportAnalog,
    /// Digital reporting toggle, handler receives `(port, enable)`.
    ReportDigital,
}

impl CommandClass {
    /// All classes, in registry slot order.
    pub const ALL: [CommandClass; 5] = [
        Self::Analog,
        Self::Digital,
        Self::SetPinMode,
        Self::ReportAnalog,
        Self::ReportDigital,
    ];

    /// Look up the class for a command identifier (channel already stripped).
    #[must_use]
    pub const fn from_command(command: u8) -> Option<Self> {
        match command {
            ANALOG_MESSAGE => Some(Self::Analog),
            DIGITAL_MESSAGE => Some(Self::Digital),
            SET_PIN_MODE => Some(Self::SetPinMode),
            REPORT_ANALOG => Some(Self::ReportAnalog),
            REPORT_DIGITAL => Some(Self::ReportDigital),
            _ => None,
        }
    }

    /// The command identifier of this class.
    #[must_use]
    pub const fn command(self) -> u8 {
        match self {
            Self::Analog => ANALOG_MESSAGE,
            Self::Digital => DIGITAL_MESSAGE,
            Self::SetPinMode => SET_PIN_MODE,
            Self::ReportAnalog => REPORT_ANALOG,
            Self::ReportDigital => REPORT_DIGITAL,
        }
    }

    /// Number of data bytes following the status byte.
    #[must_use]
    pub const fn payload_len(self) -> u8 {
        match self {
            Self::Analog | Self::Digital | Self::SetPinMode => 2,
            Self::ReportAnalog | Self::ReportDigital => 1,
        }
    }

    /// Registry slot index.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Pin modes carried by [`SET_PIN_MODE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinMode {
    Input = 0,
    Output = 1,
    Analog = 2,
    Pwm = 3,
    Servo = 4,
}

/// Error for mode bytes outside the known [`PinMode`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownPinMode(pub u8);

impl core::fmt::Display for UnknownPinMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown pin mode {}", self.0)
    }
}

impl TryFrom<u8> for PinMode {
    type Error = UnknownPinMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Input,
            1 => Self::Output,
            2 => Self::Analog,
            3 => Self::Pwm,
            4 => Self::Servo,
            other => return Err(UnknownPinMode(other)),
        })
    }
}

impl From<PinMode> for u8 {
    fn from(mode: PinMode) -> Self {
        mode as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_extraction_all_channels() {
        for class in CommandClass::ALL {
            let base = class.command();
            if base >= 0xF0 {
                continue;
            }
            for channel in 0..16u8 {
                let status = Status::from_byte(base | channel);
                assert_eq!(status.command(), base);
                assert_eq!(status.channel(), Some(channel));
            }
        }
    }

    #[test]
    fn test_system_commands_have_no_channel() {
        for byte in 0xF0..=0xFFu8 {
            let status = Status::from_byte(byte);
            assert_eq!(status, Status::System(byte));
            assert_eq!(status.channel(), None);
        }
    }

    #[test]
    fn test_command_class_lookup() {
        for class in CommandClass::ALL {
            assert_eq!(CommandClass::from_command(class.command()), Some(class));
        }
        assert_eq!(CommandClass::from_command(0xA0), None);
        assert_eq!(CommandClass::from_command(START_SYSEX), None);
        assert_eq!(CommandClass::from_command(SYSTEM_RESET), None);
    }

    #[test]
    fn test_payload_lengths() {
        assert_eq!(CommandClass::Analog.payload_len(), 2);
        assert_eq!(CommandClass::Digital.payload_len(), 2);
        assert_eq!(CommandClass::SetPinMode.payload_len(), 2);
        assert_eq!(CommandClass::ReportAnalog.payload_len(), 1);
        assert_eq!(CommandClass::ReportDigital.payload_len(), 1);
        for class in CommandClass::ALL {
            assert!(class.payload_len() as usize <= MAX_DATA_BYTES);
        }
    }

    #[test]
    fn test_slot_indices_are_distinct() {
        for (i, class) in CommandClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
    }

    #[test]
    fn test_pin_mode_conversion() {
        assert_eq!(PinMode::try_from(1), Ok(PinMode::Output));
        assert_eq!(PinMode::try_from(4), Ok(PinMode::Servo));
        assert_eq!(PinMode::try_from(9), Err(UnknownPinMode(9)));
        assert_eq!(u8::from(PinMode::Pwm), 3);
    }

    #[test]
    fn test_data_byte_boundary() {
        assert!(is_data_byte(0x00));
        assert!(is_data_byte(0x7F));
        assert!(!is_data_byte(0x80));
        assert!(!is_data_byte(0xFF));
    }
}
