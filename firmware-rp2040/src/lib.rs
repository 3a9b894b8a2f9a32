//! Firmata-style pin control firmware for RP2040.
//!
//! This crate provides the embedded half of the protocol: a UART byte sink
//! for [`firmata_proto::Firmata`] and a [`Board`] that applies decoded
//! commands to GPIO and ADC peripherals.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives protocol bytes over UART (115200 baud, 8N1)
//! 2. Decodes them and forwards pin modes, port writes and report flags to [`Board`]
//! 3. Samples enabled inputs on a fixed interval and reports changes back to the host
//!
//! # Hardware Configuration
//!
//! | Function     | GPIO        | Description |
//! |--------------|-------------|-------------|
//! | UART1 TX     | 8           | Serial transmit (reports, version) |
//! | UART1 RX     | 9           | Serial receive (host commands) |
//! | Digital 0-5  | 2-7         | Port 0, bits 0-5 |
//! | Digital 6-13 | 12-19       | Port 0, bits 6-13 |
//! | Analog 0-2   | 26-28       | ADC channels, pins 14-16 |
//!
//! # Architecture
//!
//! Two Embassy tasks share a byte channel:
//!
//! - **RX Task**: Reads the UART receiver and pushes bytes into the channel
//! - **Link Task**: Feeds bytes to the link and samples inputs on a ticker
//!
//! # Modules
//!
//! - [`board`]: Pin and ADC ownership ([`Board`], [`Report`])
//! - [`uart_sink`]: UART output half ([`UartSink`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`uart-flow-control`**: Enable hardware flow control (CTS/RTS on GPIO 10/11)

#![no_std]

use embassy_time::Duration;

pub use firmata_proto::{CommandClass, Config, Firmata, PinMode, ProtocolVersion};

pub mod board;
pub mod uart_sink;

pub use board::{Board, Report};
pub use uart_sink::UartSink;

/// UART baud rate.
pub const BAUDRATE: u32 = firmata_proto::config::BAUDRATE_DEFAULT;

/// Delay between boot and the version announcement.
pub const STARTUP_DELAY: Duration = Duration::from_millis(300);

/// Interval between input samples.
pub const SAMPLING_INTERVAL: Duration = Duration::from_millis(19);
