//! The physical device: MCP23008 keys, USB HID output, status LED on PD6,
//! and a millisecond clock kept by the busy-wait delay.

use avr_device::atmega32u4::Peripherals;
use c7k_keymap::{
    Clock, Device, InputSampler, Keycode, Millis, ModifierKind, OutputSink, Sample, Status,
    StatusDisplay,
};

use crate::hid::UsbHid;
use crate::i2c::Mcp23008;

/// Teensy on-board LED.
const LED_BIT: u8 = 1 << 6;

/// Samples between attempts to bring back a missing expander.
const REINIT_EVERY: u8 = 20;

pub struct Board {
    dp: Peripherals,
    keys: Mcp23008,
    usb: UsbHid,
    /// Only advanced by `delay_ms`; time spent outside it is not counted.
    millis: Millis,
    reinit_counter: u8,
}

impl Board {
    pub fn new(dp: Peripherals) -> Self {
        Self {
            dp,
            keys: Mcp23008::new(),
            usb: UsbHid::new(),
            millis: 0,
            reinit_counter: 0,
        }
    }

    pub fn init(&mut self) {
        // Disable clock prescaler (CLKPR)
        self.dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
        self.dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

        // PD6 output, LED off
        self.dp
            .PORTD
            .ddrd
            .modify(|r, w| unsafe { w.bits(r.bits() | LED_BIT) });
        self.set_led(false);

        self.keys.init(&self.dp.TWI);
        self.usb.init(&self.dp);
    }

    /// Blink forever. Used when the chord table is rejected at startup.
    pub fn halt(&mut self) -> ! {
        loop {
            self.set_led(true);
            busy_wait_ms(100);
            self.set_led(false);
            busy_wait_ms(100);
        }
    }

    fn set_led(&self, on: bool) {
        self.dp.PORTD.portd.modify(|r, w| unsafe {
            w.bits(if on { r.bits() | LED_BIT } else { r.bits() & !LED_BIT })
        });
    }

    fn toggle_led(&self) {
        self.dp
            .PORTD
            .portd
            .modify(|r, w| unsafe { w.bits(r.bits() ^ LED_BIT) });
    }
}

impl InputSampler for Board {
    fn sample(&mut self) -> Sample {
        if !self.keys.is_initialized() {
            self.reinit_counter = self.reinit_counter.wrapping_add(1);
            if self.reinit_counter % REINIT_EVERY == 0 {
                self.keys.try_reinit(&self.dp.TWI);
            }
        }
        self.keys.read_keys(&self.dp.TWI)
    }
}

impl OutputSink for Board {
    fn is_connected(&mut self) -> bool {
        self.usb.poll(&self.dp);
        self.usb.is_configured()
    }

    fn press_and_release_key(&mut self, key: Keycode) {
        self.usb.tap_key(&self.dp, 0, key.usage());
    }

    fn press_and_release_modified_key(&mut self, modifier: ModifierKind, key: Keycode) {
        self.usb.tap_key(&self.dp, modifier.report_bit(), key.usage());
    }

    fn move_cursor(&mut self, dx: i8, dy: i8) {
        self.usb.move_pointer(&self.dp, dx, dy);
    }
}

/// Single LED: steady on while linked, off while advertising or after a
/// drop, and a toggle for every dispatched action.
impl StatusDisplay for Board {
    fn set_status(&mut self, status: &Status) {
        match status {
            Status::Connected => self.set_led(true),
            Status::Advertising | Status::Disconnected => self.set_led(false),
            _ => self.toggle_led(),
        }
    }
}

impl Clock for Board {
    fn now(&self) -> Millis {
        self.millis
    }

    /// Keeps USB serviced while waiting.
    fn delay_ms(&mut self, ms: Millis) {
        for _ in 0..ms {
            self.usb.poll(&self.dp);
            busy_wait_ms(1);
            self.millis = self.millis.wrapping_add(1);
        }
    }
}

impl Device for Board {}

/// Busy-wait delay in milliseconds (approximate, at 16MHz).
fn busy_wait_ms(ms: u16) {
    for _ in 0..ms {
        // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
        for _ in 0..4000u16 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
