//! Firmata-style host/device control protocol.
//!
//! A compact serial protocol for reading and driving the pins of a
//! microcontroller from a host. This crate holds the platform-independent
//! half: constants, a byte-at-a-time decoder, a callback registry, message
//! encoders and a link type that ties them to a transport. It has no
//! platform dependencies and runs the same on a device and on a host.
//!
//! # Overview
//!
//! - [`command`]: command constants, [`Status`] byte splitting, [`CommandClass`], [`PinMode`]
//! - [`decoder`]: incremental decoder ([`FrameDecoder`]) and its [`ParserState`]
//! - [`message`]: decoded messages ([`Message`])
//! - [`registry`]: per-class handler slots ([`CallbackRegistry`])
//! - [`encoder`]: outbound message encoding
//! - [`link`]: one protocol instance per serial link ([`Firmata`])
//! - [`transport`]: byte source and sink traits ([`ByteSource`], [`ByteSink`])
//! - [`config`]: protocol version and link configuration
//! - [`diagnostics`]: counters for silently dropped input
//!
//! # Protocol
//!
//! Bytes with the high bit set are status bytes; everything else is 7-bit
//! data. Channel commands carry the channel in the low nibble.
//!
//! ```text
//! ANALOG_MESSAGE   0xE0|ch  lsb  msb      14-bit value, LSB first
//! DIGITAL_MESSAGE  0x90|pt  lsb  msb      14 pins of a port
//! REPORT_ANALOG    0xC0|ch  enable
//! REPORT_DIGITAL   0xD0|pt  enable
//! SET_PIN_MODE     0xF4     pin  mode
//! START_SYSEX      0xF0     cmd  data...  0xF7
//! REPORT_VERSION   0xF9                   reply: 0xF9 minor major
//! SYSTEM_RESET     0xFF
//! ```
//!
//! # Example
//!
//! ```rust
//! use core::cell::Cell;
//! use firmata_proto::{encoder, CommandClass, Firmata};
//!
//! let level = Cell::new(0u16);
//! let mut on_analog = |_channel: u8, value: u16| level.set(value);
//!
//! let mut link = Firmata::new(heapless::Vec::<u8, 32>::new());
//! link.attach(CommandClass::Analog, &mut on_analog);
//!
//! for byte in encoder::encode_analog(3, 1023) {
//!     link.feed(byte).unwrap();
//! }
//! drop(link);
//! assert_eq!(level.get(), 1023);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (host tools, `Vec<u8>` sink)
//! - **`defmt`**: Log and format through defmt instead of `log`
//! - **`embedded-io`**: [`transport::IoTransport`] over `embedded-io` devices
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod command;
pub mod config;
pub mod decoder;
pub mod diagnostics;
pub mod encoder;
pub mod link;
pub mod message;
pub mod registry;
pub mod transport;

pub use command::{CommandClass, PinMode, Status, UnknownPinMode};
pub use config::{Config, ProtocolVersion};
pub use decoder::{FrameDecoder, ParserState, DEFAULT_SYSEX_CAPACITY};
pub use diagnostics::Diagnostics;
pub use encoder::EncodeError;
pub use link::{Firmata, LinkError};
pub use message::Message;
pub use registry::{Callback, CallbackRegistry, SysexCallback};
pub use transport::{ByteSink, ByteSource, SinkError, SliceSource};

#[cfg(feature = "embedded-io")]
pub use transport::IoTransport;
