//! Counters for bytes and messages the protocol drops silently.
//!
//! The wire protocol has no error channel, so these counters are the only way
//! to observe malformed input. They wrap on overflow and are not touched by a
//! wire-level system reset.

/// Drop and dispatch counters for one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Unknown command bytes and data bytes with no message in progress.
    pub unrecognized: u32,
    /// Messages abandoned because a status byte arrived mid-payload.
    pub aborted: u32,
    /// Sysex messages dropped because the payload exceeded the accumulator.
    pub sysex_overflow: u32,
    /// Sysex messages with no command byte.
    pub malformed_sysex: u32,
    /// Complete messages with no handler attached.
    pub unhandled: u32,
    /// Complete messages delivered to a handler.
    pub dispatched: u32,
}

impl Diagnostics {
    /// Total number of bytes or messages dropped for any reason.
    #[must_use]
    pub const fn total_dropped(&self) -> u32 {
        self.unrecognized
            .wrapping_add(self.aborted)
            .wrapping_add(self.sysex_overflow)
            .wrapping_add(self.malformed_sysex)
            .wrapping_add(self.unhandled)
    }
}

#[inline]
pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.wrapping_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_dropped_excludes_dispatched() {
        let diag = Diagnostics {
            unrecognized: 1,
            aborted: 2,
            sysex_overflow: 3,
            malformed_sysex: 4,
            unhandled: 5,
            dispatched: 100,
        };
        assert_eq!(diag.total_dropped(), 15);
    }

    #[test]
    fn test_bump_wraps() {
        let mut counter = u32::MAX;
        bump(&mut counter);
        assert_eq!(counter, 0);
    }
}
