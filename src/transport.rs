//! Byte transport traits and adapters.
//!
//! The protocol core never talks to a UART directly. Input arrives through a
//! [`ByteSource`] polled one byte at a time, and output leaves through a
//! [`ByteSink`]. Keeping the two halves separate lets firmware read with one
//! driver (for example an async UART receiver) while the link writes through
//! another.

/// Source of received bytes, polled without blocking.
pub trait ByteSource {
    /// Error type for read operations.
    type Error;

    /// Read the next byte if one is available.
    ///
    /// Returns `Ok(None)` when no byte is waiting.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Destination for transmitted bytes.
pub trait ByteSink {
    /// Error type for write operations.
    type Error;

    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write all bytes in order.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    type Error = T::Error;

    #[inline]
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }

    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_all(bytes)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    type Error = T::Error;

    #[inline]
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        (**self).read_byte()
    }
}

/// Error for fixed-capacity sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// The sink has no room left.
    BufferFull,
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferFull => write!(f, "buffer full"),
        }
    }
}

impl<const N: usize> ByteSink for heapless::Vec<u8, N> {
    type Error = SinkError;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.push(byte).map_err(|_| SinkError::BufferFull)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes)
            .map_err(|_| SinkError::BufferFull)
    }
}

#[cfg(feature = "std")]
impl ByteSink for std::vec::Vec<u8> {
    type Error = core::convert::Infallible;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.push(byte);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// A [`ByteSource`] that replays a byte slice.
///
/// Useful for tests and for feeding captured traffic through a link.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    type Error = core::convert::Infallible;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let byte = self.bytes.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }
}

/// Adapter over an `embedded-io` device (for example a buffered UART).
///
/// Reads only when [`embedded_io::ReadReady`] reports data, so polling never
/// blocks.
#[cfg(feature = "embedded-io")]
pub struct IoTransport<T> {
    io: T,
}

#[cfg(feature = "embedded-io")]
impl<T> IoTransport<T> {
    /// Wrap an I/O device.
    pub const fn new(io: T) -> Self {
        Self { io }
    }

    /// Get a mutable reference to the wrapped device.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.io
    }

    /// Unwrap the device.
    pub fn into_inner(self) -> T {
        self.io
    }
}

#[cfg(feature = "embedded-io")]
impl<T: embedded_io::Read + embedded_io::ReadReady> ByteSource for IoTransport<T> {
    type Error = T::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.io.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.io.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

#[cfg(feature = "embedded-io")]
impl<T: embedded_io::Write> ByteSink for IoTransport<T> {
    type Error = T::Error;

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.io.write_all(&[byte])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.io.write_all(bytes)
    }
}


#[cfg(all(test, feature = "embedded-io"))]
mod io_tests {
    use core::convert::Infallible;

    use super::*;

    /// In-memory UART: reads drain `rx`, writes append to `tx`.
    struct MockUart {
        rx: heapless::Vec<u8, 8>,
        tx: heapless::Vec<u8, 8>,
    }

    impl MockUart {
        fn new(rx: &[u8]) -> Self {
            let mut buf = heapless::Vec::new();
            buf.extend_from_slice(rx).unwrap();
            Self {
                rx: buf,
                tx: heapless::Vec::new(),
            }
        }
    }

    impl embedded_io::ErrorType for MockUart {
        type Error = Infallible;
    }

    impl embedded_io::ReadReady for MockUart {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.rx.is_empty())
        }
    }

    impl embedded_io::Read for MockUart {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            if buf.is_empty() || self.rx.is_empty() {
                return Ok(0);
            }
            buf[0] = self.rx.remove(0);
            Ok(1)
        }
    }

    impl embedded_io::Write for MockUart {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            let room = self.tx.capacity() - self.tx.len();
            let n = buf.len().min(room);
            let _ = self.tx.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_io_transport_reads_ready_bytes() {
        let mut transport = IoTransport::new(MockUart::new(&[0xE0, 0x05]));
        assert_eq!(transport.read_byte(), Ok(Some(0xE0)));
        assert_eq!(transport.read_byte(), Ok(Some(0x05)));
    }

    #[test]
    fn test_io_transport_without_data_returns_none() {
        let mut transport = IoTransport::new(MockUart::new(&[]));
        assert_eq!(transport.read_byte(), Ok(None));

        let mut transport = IoTransport::new(MockUart::new(&[0x01]));
        assert_eq!(transport.read_byte(), Ok(Some(0x01)));
        assert_eq!(transport.read_byte(), Ok(None));
    }

    #[test]
    fn test_io_transport_writes_through() {
        let mut transport = IoTransport::new(MockUart::new(&[]));
        transport.write_byte(0xF9).unwrap();
        ByteSink::write_all(&mut transport, &[0x00, 0x02]).unwrap();
        assert_eq!(transport.into_inner().tx.as_slice(), &[0xF9, 0x00, 0x02]);
    }
}
