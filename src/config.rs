//! Link configuration.

/// Protocol version announced on startup and on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    /// Version implemented by this crate.
    pub const CURRENT: Self = Self { major: 2, minor: 0 };
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl core::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Runtime options for a [`Firmata`](crate::Firmata) link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Version sent in announcements and replies.
    pub version: ProtocolVersion,
    /// Send the version announcement from [`Firmata::begin`](crate::Firmata::begin).
    pub announce_on_begin: bool,
}

/// Default link configuration.
pub const DEFAULT_CONFIG: Config = Config {
    version: ProtocolVersion::CURRENT,
    announce_on_begin: true,
};

impl Default for Config {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

/// Default serial baud rate for this protocol.
pub const BAUDRATE_DEFAULT: u32 = 115_200;
