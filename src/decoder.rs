//! Byte-at-a-time frame decoder.
//!
//! The decoder keeps its accumulation state between calls to
//! [`FrameDecoder::feed`] and returns a [`Message`] whenever one completes.
//! It never blocks and never allocates; a message that never completes simply
//! stays pending.
//!
//! # Resynchronization
//!
//! A status byte (high bit set) that arrives while a fixed-payload message is
//! still waiting for data aborts that message. The byte is then decoded as
//! the start of a new command, so the stream recovers on the next status byte.
//! Sysex accumulation is aborted the same way by any status byte other than
//! [`END_SYSEX`].
//!
//! # Example
//!
//! ```
//! use firmata_proto::{FrameDecoder, Message};
//!
//! let mut decoder = FrameDecoder::new();
//! assert_eq!(decoder.feed(0xE3), None);
//! assert_eq!(decoder.feed(0x68), None);
//! assert_eq!(
//!     decoder.feed(0x07),
//!     Some(Message::Analog { channel: 3, value: 1000 })
//! );
//! assert!(decoder.is_idle());
//! ```

use heapless::Vec;

use crate::command::{
    is_data_byte, CommandClass, Status, END_SYSEX, MAX_DATA_BYTES, REPORT_VERSION, START_SYSEX,
    SYSTEM_RESET,
};
use crate::diagnostics::{bump, Diagnostics};
use crate::encoder::join_14bit;
use crate::message::Message;

/// Default sysex payload capacity in bytes.
pub const DEFAULT_SYSEX_CAPACITY: usize = 32;

/// Accumulation state for fixed-payload messages.
///
/// `Default` is the initial form. `active` is `None` exactly when no message
/// is waiting for data, and `pending` never exceeds [`MAX_DATA_BYTES`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserState {
    pending: u8,
    active: Option<CommandClass>,
    channel: u8,
    buffer: [u8; MAX_DATA_BYTES],
}

impl ParserState {
    /// Data bytes still expected for the active message.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> u8 {
        self.pending
    }

    /// The message currently being accumulated.
    #[inline]
    #[must_use]
    pub const fn active(&self) -> Option<CommandClass> {
        self.active
    }

    /// Channel taken from the last channel command's status byte.
    #[inline]
    #[must_use]
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Raw payload buffer. Bytes fill from the end backward.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &[u8; MAX_DATA_BYTES] {
        &self.buffer
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SysexHeader {
    command: Option<u8>,
    overflowed: bool,
}

/// Frame decoder with a sysex accumulator of `N` bytes.
pub struct FrameDecoder<const N: usize = DEFAULT_SYSEX_CAPACITY> {
    state: ParserState,
    sysex: Option<SysexHeader>,
    sysex_buf: Vec<u8, N>,
    diagnostics: Diagnostics,
}

impl FrameDecoder {
    /// Create a decoder with the default sysex capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_sysex_capacity()
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameDecoder<N> {
    /// Create a decoder whose sysex capacity is set by the type parameter.
    #[must_use]
    pub const fn with_sysex_capacity() -> Self {
        Self {
            state: ParserState {
                pending: 0,
                active: None,
                channel: 0,
                buffer: [0; MAX_DATA_BYTES],
            },
            sysex: None,
            sysex_buf: Vec::new(),
            diagnostics: Diagnostics {
                unrecognized: 0,
                aborted: 0,
                sysex_overflow: 0,
                malformed_sysex: 0,
                unhandled: 0,
                dispatched: 0,
            },
        }
    }

    /// Current fixed-payload accumulation state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &ParserState {
        &self.state
    }

    /// `true` when no fixed-payload or sysex message is in progress.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state.active.is_none() && self.sysex.is_none()
    }

    /// Drop counters collected so far.
    #[inline]
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[inline]
    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Return all parser state to its initial form.
    ///
    /// Diagnostics are kept.
    pub fn reset(&mut self) {
        self.state = ParserState::default();
        self.sysex = None;
        self.sysex_buf.clear();
    }

    /// Feed one byte, returning a message if it completed one.
    pub fn feed(&mut self, byte: u8) -> Option<Message<'_>> {
        if is_data_byte(byte) {
            if self.state.pending > 0 {
                return self.accumulate(byte);
            }
            if self.sysex.is_some() {
                self.push_sysex(byte);
                return None;
            }
            trace!("ignoring data byte {:#x} outside a message", byte);
            bump(&mut self.diagnostics.unrecognized);
            return None;
        }

        if byte == SYSTEM_RESET {
            debug!("system reset");
            self.reset();
            return Some(Message::SystemReset);
        }

        if self.state.active.is_some() {
            debug!(
                "status byte {:#x} aborted a message waiting for {} byte(s)",
                byte, self.state.pending
            );
            bump(&mut self.diagnostics.aborted);
            self.state = ParserState::default();
        }

        if self.sysex.is_some() {
            if byte == END_SYSEX {
                return self.finish_sysex();
            }
            debug!("status byte {:#x} aborted a sysex message", byte);
            bump(&mut self.diagnostics.aborted);
            self.sysex = None;
        }

        self.start(byte)
    }

    /// Store one payload byte, completing the message when none remain.
    fn accumulate(&mut self, byte: u8) -> Option<Message<'_>> {
        self.state.pending -= 1;
        self.state.buffer[self.state.pending as usize] = byte;
        if self.state.pending > 0 {
            return None;
        }

        let Some(class) = self.state.active else {
            // pending without an active class cannot happen; recover quietly
            self.state = ParserState::default();
            return None;
        };
        let channel = self.state.channel;
        let buffer = self.state.buffer;
        self.state = ParserState::default();

        Some(match class {
            CommandClass::Analog | CommandClass::Digital => {
                Message::from_class(class, channel, join_14bit(buffer[1], buffer[0]))
            }
            CommandClass::SetPinMode => Message::from_class(class, buffer[1], buffer[0] as u16),
            CommandClass::ReportAnalog | CommandClass::ReportDigital => {
                Message::from_class(class, channel, buffer[0] as u16)
            }
        })
    }

    /// Interpret a status byte as the start of a new command.
    fn start(&mut self, byte: u8) -> Option<Message<'_>> {
        let status = Status::from_byte(byte);

        if let Some(class) = CommandClass::from_command(status.command()) {
            debug_assert!(class.payload_len() as usize <= MAX_DATA_BYTES);
            self.state.pending = class.payload_len();
            self.state.active = Some(class);
            self.state.channel = status.channel().unwrap_or(0);
            return None;
        }

        match byte {
            START_SYSEX => {
                self.sysex_buf.clear();
                self.sysex = Some(SysexHeader {
                    command: None,
                    overflowed: false,
                });
                None
            }
            REPORT_VERSION => Some(Message::ReportVersion),
            _ => {
                trace!("ignoring unrecognized command byte {:#x}", byte);
                bump(&mut self.diagnostics.unrecognized);
                None
            }
        }
    }

    fn push_sysex(&mut self, byte: u8) {
        let Some(header) = self.sysex.as_mut() else {
            return;
        };

        if header.command.is_none() {
            header.command = Some(byte);
        } else if !header.overflowed && self.sysex_buf.push(byte).is_err() {
            warn!("sysex payload exceeds {} bytes, dropping message", N);
            header.overflowed = true;
        }
    }

    fn finish_sysex(&mut self) -> Option<Message<'_>> {
        let header = self.sysex.take()?;

        match header.command {
            None => {
                debug!("dropping sysex message without a command byte");
                bump(&mut self.diagnostics.malformed_sysex);
                None
            }
            Some(_) if header.overflowed => {
                bump(&mut self.diagnostics.sysex_overflow);
                self.sysex_buf.clear();
                None
            }
            Some(command) => Some(Message::Sysex {
                command,
                payload: &self.sysex_buf,
            }),
        }
    }
}
