//! UART transmit half as a protocol byte sink.
//!
//! # Pins
//!
//! Uses UART1 by default:
//! - GPIO 8: TX
//! - GPIO 10: CTS (optional, with `uart-flow-control` feature)

use embassy_rp::uart::{Async, Error as UartError, UartTx};
use firmata_proto::ByteSink;

/// Byte sink writing through the UART transmitter.
///
/// Writes block until the bytes are in the TX FIFO.
pub struct UartSink<'d> {
    tx: UartTx<'d, Async>,
}

impl<'d> UartSink<'d> {
    /// Create a new sink from the given UART transmitter.
    #[must_use]
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self { tx }
    }
}

impl ByteSink for UartSink<'_> {
    type Error = UartError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.tx.blocking_write(&[byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.tx.blocking_write(bytes)
    }
}
