//! USB CDC-ACM serial
//!
//! Both boards talk to the host over a single CDC-ACM port. Status lines go
//! out as 64-byte packets; the host sees an ordinary serial port and reads
//! newline-terminated text.

use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{bind_interrupts, peripherals, usb, Peri};
use embassy_time::{with_timeout, Duration, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use linecheck_protocol::{Marker, Role};
use static_cell::StaticCell;

bind_interrupts!(pub struct Irqs {
    USBD => usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, HardwareVbusDetect>;
pub type SerialClass = CdcAcmClass<'static, UsbDriver>;
pub type SerialSender = Sender<'static, UsbDriver>;
pub type SerialReceiver = Receiver<'static, UsbDriver>;

/// pid.codes open-source test VID/PID
const USB_VID: u16 = 0x1209;
const USB_PID: u16 = 0x0001;

/// Full-speed bulk packet size
pub const MAX_PACKET_SIZE: u16 = 64;

/// How long a board waits for the host to open its port at boot
pub const HOST_WAIT: Duration = Duration::from_millis(3000);

/// Serial link failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Port not open / cable pulled
    Disconnected,
    /// Packet larger than the endpoint
    Overflow,
    /// Line did not fit the render buffer
    Format,
}

impl From<EndpointError> for SerialError {
    fn from(e: EndpointError) -> Self {
        match e {
            EndpointError::BufferOverflow => SerialError::Overflow,
            EndpointError::Disabled => SerialError::Disconnected,
        }
    }
}

/// Strings the host shows for this port
pub struct UsbIdentity {
    pub product: &'static str,
    pub serial_number: &'static str,
}

/// Bring up the USB device and its CDC-ACM class
///
/// Call once; the descriptor buffers are static.
pub fn init(
    usbd: Peri<'static, peripherals::USBD>,
    identity: UsbIdentity,
) -> (UsbDevice<'static, UsbDriver>, SerialClass) {
    static STATE: StaticCell<State> = StaticCell::new();
    static CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
    static MSOS_DESC: StaticCell<[u8; 128]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    let mut config = Config::new(USB_VID, USB_PID);
    config.manufacturer = Some("Linecheck");
    config.product = Some(identity.product);
    config.serial_number = Some(identity.serial_number);
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESC.init([0; 256]),
        BOS_DESC.init([0; 256]),
        MSOS_DESC.init([0; 128]),
        CONTROL_BUF.init([0; 64]),
    );

    let class = CdcAcmClass::new(&mut builder, STATE.init(State::new()), MAX_PACKET_SIZE);
    (builder.build(), class)
}

/// Run the USB device stack
#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// Wait until the host has the port open (DTR set), up to `timeout`
///
/// Returns false on timeout; the caller carries on either way.
pub async fn wait_for_host(sender: &mut SerialSender, timeout: Duration) -> bool {
    with_timeout(timeout, async {
        sender.wait_connection().await;
        while !sender.dtr() {
            Timer::after_millis(10).await;
        }
    })
    .await
    .is_ok()
}

/// Write one already-terminated line, split into endpoint-sized packets
pub async fn write_line(sender: &mut SerialSender, line: &[u8]) -> Result<(), SerialError> {
    let max = sender.max_packet_size() as usize;
    for chunk in line.chunks(max) {
        sender.write_packet(chunk).await?;
    }
    // A full last packet needs a zero-length packet to end the transfer
    if !line.is_empty() && line.len() % max == 0 {
        sender.write_packet(&[]).await?;
    }
    Ok(())
}

/// Render a marker for `role` and write it as one line
pub async fn write_marker(
    sender: &mut SerialSender,
    role: Role,
    marker: &Marker,
) -> Result<(), SerialError> {
    let line = marker.render(role).map_err(|_| SerialError::Format)?;
    write_line(sender, line.as_bytes()).await
}
