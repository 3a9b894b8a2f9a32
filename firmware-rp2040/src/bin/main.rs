#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Pull};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartRx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Ticker, Timer};
use firmata_rp2040::{
    Board, CommandClass, Firmata, Report, UartSink, BAUDRATE, SAMPLING_INTERVAL, STARTUP_DELAY,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Received bytes, from the RX task to the link task.
type ByteChannel = Channel<CriticalSectionRawMutex, u8, 64>;

static RX_BYTES: StaticCell<ByteChannel> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Firmata RP2040 starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let bytes = RX_BYTES.init(Channel::new());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUDRATE;

    #[cfg(not(feature = "uart-flow-control"))]
    let uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    #[cfg(feature = "uart-flow-control")]
    let uart = Uart::new_with_rtscts(
        p.UART1,
        p.PIN_8,  // TX
        p.PIN_9,  // RX
        p.PIN_11, // RTS
        p.PIN_10, // CTS
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        uart_config,
    );
    let (tx, rx) = uart.split();

    // --- Board Setup ---
    let pins = [
        Flex::new(p.PIN_2),
        Flex::new(p.PIN_3),
        Flex::new(p.PIN_4),
        Flex::new(p.PIN_5),
        Flex::new(p.PIN_6),
        Flex::new(p.PIN_7),
        Flex::new(p.PIN_12),
        Flex::new(p.PIN_13),
        Flex::new(p.PIN_14),
        Flex::new(p.PIN_15),
        Flex::new(p.PIN_16),
        Flex::new(p.PIN_17),
        Flex::new(p.PIN_18),
        Flex::new(p.PIN_19),
    ];
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let analog = [
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
        AdcChannel::new_pin(p.PIN_28, Pull::None),
    ];
    let board = Board::new(pins, adc, analog);

    spawner.spawn(rx_task(rx, bytes).unwrap());
    spawner.spawn(link_task(UartSink::new(tx), board, bytes).unwrap());

    info!("Firmata RP2040 initialized");
}

/// RX task - moves received UART bytes into the channel.
#[embassy_executor::task]
async fn rx_task(mut rx: UartRx<'static, Async>, bytes: &'static ByteChannel) {
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => bytes.send(byte[0]).await,
            Err(e) => error!("UART read error: {:?}", e),
        }
    }
}

/// Link task - feeds received bytes to the protocol and reports sampled inputs.
#[embassy_executor::task]
async fn link_task(sink: UartSink<'static>, board: Board<'static>, bytes: &'static ByteChannel) {
    let board = RefCell::new(board);

    let mut on_pin_mode = |pin: u8, mode: u16| {
        if let Err(e) = board.borrow_mut().set_pin_mode(pin, mode) {
            warn!("set pin mode rejected: {:?}", e);
        }
    };
    let mut on_digital = |port: u8, mask: u16| {
        if let Err(e) = board.borrow_mut().write_port(port, mask) {
            warn!("digital write rejected: {:?}", e);
        }
    };
    let mut on_report_analog = |channel: u8, enable: u16| {
        if let Err(e) = board.borrow_mut().set_report_analog(channel, enable) {
            warn!("report analog rejected: {:?}", e);
        }
    };
    let mut on_report_digital = |port: u8, enable: u16| {
        if let Err(e) = board.borrow_mut().set_report_digital(port, enable) {
            warn!("report digital rejected: {:?}", e);
        }
    };

    let mut link = Firmata::new(sink);
    link.attach(CommandClass::SetPinMode, &mut on_pin_mode);
    link.attach(CommandClass::Digital, &mut on_digital);
    link.attach(CommandClass::ReportAnalog, &mut on_report_analog);
    link.attach(CommandClass::ReportDigital, &mut on_report_digital);

    Timer::after(STARTUP_DELAY).await;
    if let Err(e) = link.begin() {
        error!("version announcement failed: {:?}", e);
    }
    info!("link ready, sampling every {} ms", SAMPLING_INTERVAL.as_millis());

    let mut ticker = Ticker::every(SAMPLING_INTERVAL);
    loop {
        let event = select(bytes.receive(), ticker.next()).await;
        match event {
            Either::First(byte) => {
                if let Err(e) = link.feed(byte) {
                    error!("UART write error: {:?}", e);
                }
            }
            Either::Second(()) => {
                let reports = board.borrow_mut().sample();
                for report in reports {
                    let result = match report {
                        Report::Analog { channel, value } => link.send_analog(channel, value),
                        Report::Digital { port, value } => {
                            link.send_digital_port_pair(port, value)
                        }
                    };
                    if let Err(e) = result {
                        error!("UART write error: {:?}", e);
                    }
                }
            }
        }
    }
}
