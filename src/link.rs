//! One protocol instance per serial link.
//!
//! [`Firmata`] owns the output half of a transport, a [`FrameDecoder`] and a
//! [`CallbackRegistry`]. Callers feed it received bytes one at a time (or let
//! it poll a [`ByteSource`]); completed messages are dispatched synchronously
//! before the call returns.
//!
//! # Example
//!
//! ```
//! use core::cell::Cell;
//! use firmata_proto::{CommandClass, Firmata, SliceSource};
//!
//! let mode = Cell::new(None);
//! let mut on_mode = |pin: u8, value: u16| mode.set(Some((pin, value)));
//!
//! let mut link = Firmata::new(heapless::Vec::<u8, 64>::new());
//! link.attach(CommandClass::SetPinMode, &mut on_mode);
//! link.begin().unwrap();
//!
//! let mut input = SliceSource::new(&[0xF4, 13, 1]);
//! link.process_available(&mut input).unwrap();
//!
//! assert_eq!(link.sink().as_slice(), &[0xF9, 0, 2]);
//! drop(link);
//! assert_eq!(mode.get(), Some((13, 1)));
//! ```

use crate::command::{CommandClass, END_SYSEX, START_SYSEX};
use crate::config::Config;
use crate::decoder::{FrameDecoder, ParserState, DEFAULT_SYSEX_CAPACITY};
use crate::diagnostics::{bump, Diagnostics};
use crate::encoder::{encode_analog, encode_digital_port_pair, encode_version};
use crate::message::Message;
use crate::registry::{Callback, CallbackRegistry, SysexCallback};
use crate::transport::{ByteSink, ByteSource};

/// Error type for polling a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<R, W> {
    /// Error from the byte source.
    Read(R),
    /// Error from the byte sink (version replies).
    Write(W),
}

impl<R: core::fmt::Display, W: core::fmt::Display> core::fmt::Display for LinkError<R, W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read error: {}", e),
            Self::Write(e) => write!(f, "write error: {}", e),
        }
    }
}

/// A protocol instance bound to one serial link.
pub struct Firmata<'a, W, const N: usize = DEFAULT_SYSEX_CAPACITY> {
    sink: W,
    decoder: FrameDecoder<N>,
    callbacks: CallbackRegistry<'a>,
    config: Config,
}

impl<'a, W: ByteSink> Firmata<'a, W> {
    /// Create a link with the default configuration and sysex capacity.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self::with_config(sink, Config::default())
    }

    /// Create a link with a custom configuration.
    #[must_use]
    pub fn with_config(sink: W, config: Config) -> Self {
        Self::with_sysex_capacity(sink, config)
    }
}

impl<'a, W: ByteSink, const N: usize> Firmata<'a, W, N> {
    /// Create a link whose sysex capacity is set by the type parameter.
    #[must_use]
    pub fn with_sysex_capacity(sink: W, config: Config) -> Self {
        Self {
            sink,
            decoder: FrameDecoder::with_sysex_capacity(),
            callbacks: CallbackRegistry::new(),
            config,
        }
    }

    /// Start the link: send the version announcement if configured.
    pub fn begin(&mut self) -> Result<(), W::Error> {
        info!(
            "link starting, protocol {}.{}",
            self.config.version.major, self.config.version.minor
        );
        if self.config.announce_on_begin {
            self.print_version()?;
        }
        Ok(())
    }

    /// Send the 3-byte version announcement.
    pub fn print_version(&mut self) -> Result<(), W::Error> {
        self.sink.write_all(&encode_version(self.config.version))
    }

    /// Feed one received byte.
    ///
    /// Completed messages are dispatched to their handler before this returns.
    /// The only error is a failed write while answering a version request.
    pub fn feed(&mut self, byte: u8) -> Result<(), W::Error> {
        let Some(message) = self.decoder.feed(byte) else {
            return Ok(());
        };

        match message {
            Message::ReportVersion => {
                debug!("version requested");
                return self.sink.write_all(&encode_version(self.config.version));
            }
            Message::SystemReset => return Ok(()),
            _ => {}
        }

        if self.callbacks.dispatch(&message) {
            bump(&mut self.decoder.diagnostics_mut().dispatched);
        } else {
            trace!("no handler attached, dropping message");
            bump(&mut self.decoder.diagnostics_mut().unhandled);
        }
        Ok(())
    }

    /// Read and feed at most one byte from `source`.
    ///
    /// Returns `Ok(false)` when no byte was available.
    pub fn process_input<R: ByteSource>(
        &mut self,
        source: &mut R,
    ) -> Result<bool, LinkError<R::Error, W::Error>> {
        match source.read_byte().map_err(LinkError::Read)? {
            Some(byte) => {
                self.feed(byte).map_err(LinkError::Write)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Feed every byte `source` currently has, returning how many were read.
    pub fn process_available<R: ByteSource>(
        &mut self,
        source: &mut R,
    ) -> Result<usize, LinkError<R::Error, W::Error>> {
        let mut count = 0;
        while self.process_input(source)? {
            count += 1;
        }
        Ok(count)
    }

    /// Send an analog value for `pin` (0-15).
    pub fn send_analog(&mut self, pin: u8, value: u16) -> Result<(), W::Error> {
        self.sink.write_all(&encode_analog(pin, value))
    }

    /// Send 14 digital pins of `port` as a bitmask.
    pub fn send_digital_port_pair(&mut self, port: u8, value: u16) -> Result<(), W::Error> {
        self.sink.write_all(&encode_digital_port_pair(port, value))
    }

    /// Send an extended command. Payload bytes must be below 128.
    pub fn send_sysex(&mut self, command: u8, payload: &[u8]) -> Result<(), W::Error> {
        self.sink.write_byte(START_SYSEX)?;
        self.sink.write_byte(command)?;
        self.sink.write_all(payload)?;
        self.sink.write_byte(END_SYSEX)
    }

    /// Attach `handler` to `class`, replacing any existing handler.
    pub fn attach(&mut self, class: CommandClass, handler: Callback<'a>) {
        self.callbacks.attach(class, handler);
    }

    /// Remove the handler for `class`.
    pub fn detach(&mut self, class: CommandClass) {
        self.callbacks.detach(class);
    }

    /// Attach the sysex handler.
    pub fn attach_sysex(&mut self, handler: SysexCallback<'a>) {
        self.callbacks.attach_sysex(handler);
    }

    /// Remove the sysex handler.
    pub fn detach_sysex(&mut self) {
        self.callbacks.detach_sysex();
    }

    /// Get a reference to the callback registry.
    pub fn callbacks(&self) -> &CallbackRegistry<'a> {
        &self.callbacks
    }

    /// Get a mutable reference to the callback registry.
    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry<'a> {
        &mut self.callbacks
    }

    /// Clear parser state locally, exactly like a received system reset.
    ///
    /// Handlers stay attached.
    pub fn reset(&mut self) {
        self.decoder.reset();
    }

    /// Current parser state.
    pub fn parser_state(&self) -> &ParserState {
        self.decoder.state()
    }

    /// `true` when no message is in progress.
    pub fn is_idle(&self) -> bool {
        self.decoder.is_idle()
    }

    /// Drop and dispatch counters.
    pub fn diagnostics(&self) -> &Diagnostics {
        self.decoder.diagnostics()
    }

    /// Zero all diagnostic counters.
    pub fn clear_diagnostics(&mut self) {
        *self.decoder.diagnostics_mut() = Diagnostics::default();
    }

    /// Link configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a reference to the byte sink.
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Get a mutable reference to the byte sink.
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Decompose the link, returning its byte sink.
    pub fn into_sink(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cell::RefCell;
    use std::vec;
    use std::vec::Vec;

    use super::*;
    use crate::command::{
        ANALOG_MESSAGE, DIGITAL_MESSAGE, REPORT_ANALOG, REPORT_VERSION, SET_PIN_MODE,
        SYSTEM_RESET,
    };
    use crate::config::ProtocolVersion;
    use crate::transport::{SinkError, SliceSource};

    type Sink = heapless::Vec<u8, 64>;

    fn feed_all<W: ByteSink, const N: usize>(link: &mut Firmata<'_, W, N>, bytes: &[u8])
    where
        W::Error: core::fmt::Debug,
    {
        for &b in bytes {
            link.feed(b).unwrap();
        }
    }

    #[test]
    fn test_begin_announces_version() {
        let mut link = Firmata::new(Sink::new());
        link.begin().unwrap();
        assert_eq!(link.sink().as_slice(), &[REPORT_VERSION, 0, 2]);
    }

    #[test]
    fn test_begin_without_announcement() {
        let config = Config {
            announce_on_begin: false,
            ..Config::default()
        };
        let mut link = Firmata::with_config(Sink::new(), config);
        link.begin().unwrap();
        assert!(link.sink().is_empty());
    }

    #[test]
    fn test_version_request_is_answered() {
        let config = Config {
            version: ProtocolVersion { major: 3, minor: 7 },
            ..Config::default()
        };
        let mut link = Firmata::with_config(Sink::new(), config);
        link.feed(REPORT_VERSION).unwrap();
        assert_eq!(link.sink().as_slice(), &[REPORT_VERSION, 7, 3]);
        assert!(link.is_idle());
    }

    #[test]
    fn test_analog_round_trip_through_link() {
        let seen = RefCell::new(Vec::new());
        let mut on_analog = |channel: u8, value: u16| seen.borrow_mut().push((channel, value));

        let mut link = Firmata::new(Sink::new());
        link.attach(CommandClass::Analog, &mut on_analog);
        for pin in 0..16u8 {
            for value in [0u16, 127, 128, 4095, 16383] {
                feed_all(&mut link, &encode_analog(pin, value));
            }
        }
        assert_eq!(link.diagnostics().dispatched, 80);
        drop(link);

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 80);
        assert_eq!(seen[0], (0, 0));
        assert_eq!(seen[79], (15, 16383));
    }

    #[test]
    fn test_no_handler_no_crash() {
        let mut link = Firmata::new(Sink::new());
        feed_all(&mut link, &[DIGITAL_MESSAGE | 3, 0x7F, 0x01]);
        assert_eq!(*link.parser_state(), ParserState::default());
        assert_eq!(link.diagnostics().unhandled, 1);
        assert_eq!(link.diagnostics().dispatched, 0);
        assert!(link.sink().is_empty());
    }

    #[test]
    fn test_partial_message_completes_in_later_poll() {
        let seen = RefCell::new(Vec::new());
        let mut on_digital = |port: u8, value: u16| seen.borrow_mut().push((port, value));

        let mut link = Firmata::new(Sink::new());
        link.attach(CommandClass::Digital, &mut on_digital);

        let first = [DIGITAL_MESSAGE | 1, 0x05];
        let mut input = SliceSource::new(&first);
        assert_eq!(link.process_available(&mut input), Ok(2));
        assert_eq!(link.parser_state().pending(), 1);

        let second = [0x01];
        let mut input = SliceSource::new(&second);
        assert_eq!(link.process_input(&mut input), Ok(true));
        assert_eq!(link.process_input(&mut input), Ok(false));
        drop(link);

        assert_eq!(seen.into_inner(), vec![(1, 0x05 | (0x01 << 7))]);
    }

    #[test]
    fn test_wire_reset_keeps_handlers() {
        let count = RefCell::new(0u32);
        let mut on_analog = |_: u8, _: u16| *count.borrow_mut() += 1;

        let mut link = Firmata::new(Sink::new());
        link.attach(CommandClass::Analog, &mut on_analog);
        feed_all(&mut link, &[ANALOG_MESSAGE, 0x01, SYSTEM_RESET]);
        assert_eq!(*link.parser_state(), ParserState::default());
        assert!(link.callbacks().is_attached(CommandClass::Analog));

        feed_all(&mut link, &[ANALOG_MESSAGE, 0x01, 0x00]);
        drop(link);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_sysex_dispatch() {
        let seen = RefCell::new(Vec::new());
        let mut on_sysex = |command: u8, payload: &[u8]| {
            seen.borrow_mut().push((command, payload.to_vec()));
        };

        let mut link = Firmata::new(Sink::new());
        link.attach_sysex(&mut on_sysex);
        feed_all(&mut link, &[START_SYSEX, 0x01, 10, 20, 30, END_SYSEX]);
        drop(link);

        assert_eq!(seen.into_inner(), vec![(0x01, vec![10, 20, 30])]);
    }

    #[test]
    fn test_detach_drops_messages() {
        let mut handler = |_: u8, _: u16| {};
        let mut link = Firmata::new(Sink::new());
        link.attach(CommandClass::ReportAnalog, &mut handler);
        link.detach(CommandClass::ReportAnalog);
        feed_all(&mut link, &[REPORT_ANALOG | 1, 1]);
        assert_eq!(link.diagnostics().unhandled, 1);
    }

    #[test]
    fn test_send_messages() {
        let mut link = Firmata::new(Sink::new());
        link.send_analog(2, 1000).unwrap();
        link.send_digital_port_pair(0, 0x81).unwrap();
        link.send_sysex(0x01, &[10, 20, 30]).unwrap();
        assert_eq!(
            link.sink().as_slice(),
            &[
                ANALOG_MESSAGE | 2,
                0x68,
                0x07,
                DIGITAL_MESSAGE,
                0x01,
                0x01,
                START_SYSEX,
                0x01,
                10,
                20,
                30,
                END_SYSEX
            ]
        );
    }

    #[test]
    fn test_loopback_between_two_links() {
        let seen = RefCell::new(Vec::new());
        let mut on_mode = |pin: u8, mode: u16| seen.borrow_mut().push((pin, mode));

        let mut host = Firmata::new(Sink::new());
        host.sink_mut()
            .write_all(&crate::encoder::encode_set_pin_mode(7, 1))
            .unwrap();
        let wire = host.into_sink();

        let mut device = Firmata::new(Sink::new());
        device.attach(CommandClass::SetPinMode, &mut on_mode);
        let mut input = SliceSource::new(&wire);
        device.process_available(&mut input).unwrap();
        drop(device);

        assert_eq!(seen.into_inner(), vec![(7, 1)]);
        assert_eq!(wire.as_slice(), &[SET_PIN_MODE, 7, 1]);
    }

    #[test]
    fn test_version_reply_write_error_is_reported() {
        let mut link = Firmata::new(heapless::Vec::<u8, 2>::new());
        assert_eq!(link.feed(REPORT_VERSION), Err(SinkError::BufferFull));

        let mut input = SliceSource::new(&[REPORT_VERSION]);
        assert_eq!(
            link.process_input(&mut input),
            Err(LinkError::Write(SinkError::BufferFull))
        );
    }

    #[test]
    fn test_clear_diagnostics() {
        let mut link = Firmata::new(Sink::new());
        feed_all(&mut link, &[0x01, 0x02]);
        assert_eq!(link.diagnostics().unrecognized, 2);
        link.clear_diagnostics();
        assert_eq!(*link.diagnostics(), Diagnostics::default());
    }

    #[test]
    fn test_local_reset() {
        let mut link = Firmata::new(Sink::new());
        feed_all(&mut link, &[ANALOG_MESSAGE | 4, 0x10]);
        assert!(!link.is_idle());
        link.reset();
        assert!(link.is_idle());
        assert_eq!(*link.parser_state(), ParserState::default());
    }
}
