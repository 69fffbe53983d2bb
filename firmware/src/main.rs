//! c7k chord keyboard firmware for ATmega32U4 (Teensy 2.0).
//!
//! - Seven keys read through an MCP23008 on I2C
//! - Chord decoding with modifier and mouse layers (c7k-keymap)
//! - USB HID keyboard and mouse reports
//! - On-board LED as link and activity indicator

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod board;
mod hid;
mod i2c;

use avr_device::atmega32u4::Peripherals;
use c7k_keymap::{ChordEngine, ChordTable, Controller, Timing};

use board::Board;

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    let mut board = Board::new(dp);
    board.init();

    let table = match ChordTable::builtin() {
        Ok(table) => table,
        Err(_) => board.halt(),
    };

    let mut controller = Controller::new(ChordEngine::new(&table, Timing::DEFAULT), board);
    controller.run();

    // `run` only returns once the device reports power loss.
    loop {}
}
