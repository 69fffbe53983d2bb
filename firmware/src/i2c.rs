//! MCP23008 I2C driver for the seven chord keys.
//!
//! Keys are wired from GP0..GP6 to ground, so every pin is an input with
//! its internal pull-up enabled and a pressed key reads as 0.

use avr_device::atmega32u4::TWI;
use c7k_keymap::{Sample, KEY_COUNT};

/// MCP23008 I2C address (A0..A2 grounded).
const MCP23008_ADDR: u8 = 0x20;

// MCP23008 registers
const IODIR: u8 = 0x00; // I/O direction, 1 = input
const GPPU: u8 = 0x06; // Pull-up enable
const GPIO: u8 = 0x09; // Port value

/// Pins GP0..GP6.
const KEY_MASK: u8 = 0x7F;

/// TWI (I2C) clock prescaler and bit rate for ~100kHz at 16MHz CPU.
/// SCL freq = CPU_FREQ / (16 + 2 * TWBR * prescaler)
/// 100kHz = 16MHz / (16 + 2 * 72 * 1) => TWBR = 72
const TWBR_VALUE: u8 = 72;

/// TWI status codes
const TW_START: u8 = 0x08;
const TW_REP_START: u8 = 0x10;
const TW_MT_SLA_ACK: u8 = 0x18;
const TW_MT_DATA_ACK: u8 = 0x28;
const TW_MR_SLA_ACK: u8 = 0x40;
const TW_MR_DATA_NACK: u8 = 0x58;

/// Unexpected TWI status after a bus operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusError(pub u8);

pub struct Mcp23008 {
    initialized: bool,
}

impl Mcp23008 {
    pub const fn new() -> Self {
        Self { initialized: false }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize the TWI hardware and configure the MCP23008.
    pub fn init(&mut self, twi: &TWI) {
        twi.twbr.write(|w| unsafe { w.bits(TWBR_VALUE) });
        twi.twsr.write(|w| w.twps().prescaler_1());
        twi.twcr.write(|w| w.twen().set_bit());

        self.initialized = self.configure(twi).is_ok();
    }

    /// All key pins input with pull-up.
    fn configure(&self, twi: &TWI) -> Result<(), BusError> {
        self.write_register(twi, IODIR, 0xFF)?;
        self.write_register(twi, GPPU, KEY_MASK)?;
        Ok(())
    }

    /// Try to configure again if the expander was missing.
    pub fn try_reinit(&mut self, twi: &TWI) {
        if !self.initialized {
            self.initialized = self.configure(twi).is_ok();
        }
    }

    /// Read which keys are held. Reads as all released while the expander
    /// is not configured; a failed read marks it for re-initialization.
    pub fn read_keys(&mut self, twi: &TWI) -> Sample {
        let mut sample = [false; KEY_COUNT];
        if !self.initialized {
            return sample;
        }
        let port = match self.read_register(twi, GPIO) {
            Ok(port) => port,
            Err(_) => {
                self.initialized = false;
                return sample;
            }
        };
        for (key, pressed) in sample.iter_mut().enumerate() {
            *pressed = port & (1 << key) == 0;
        }
        sample
    }

    fn write_register(&self, twi: &TWI, reg: u8, value: u8) -> Result<(), BusError> {
        self.i2c_start(twi)?;
        self.i2c_write(twi, MCP23008_ADDR << 1)?;
        self.i2c_write(twi, reg)?;
        self.i2c_write(twi, value)?;
        self.i2c_stop(twi);
        Ok(())
    }

    fn read_register(&self, twi: &TWI, reg: u8) -> Result<u8, BusError> {
        self.i2c_start(twi)?;
        self.i2c_write(twi, MCP23008_ADDR << 1)?;
        self.i2c_write(twi, reg)?;

        // Repeated start for read
        self.i2c_start(twi)?;
        self.i2c_write(twi, (MCP23008_ADDR << 1) | 1)?;
        let data = self.i2c_read_nack(twi)?;
        self.i2c_stop(twi);
        Ok(data)
    }

    fn i2c_start(&self, twi: &TWI) -> Result<(), BusError> {
        twi.twcr
            .write(|w| w.twint().set_bit().twsta().set_bit().twen().set_bit());
        self.wait_twint(twi);
        match twi.twsr.read().tws().bits() {
            TW_START | TW_REP_START => Ok(()),
            status => Err(BusError(status)),
        }
    }

    fn i2c_write(&self, twi: &TWI, data: u8) -> Result<(), BusError> {
        twi.twdr.write(|w| unsafe { w.bits(data) });
        twi.twcr.write(|w| w.twint().set_bit().twen().set_bit());
        self.wait_twint(twi);
        match twi.twsr.read().tws().bits() {
            TW_MT_SLA_ACK | TW_MT_DATA_ACK | TW_MR_SLA_ACK => Ok(()),
            status => {
                self.i2c_stop(twi);
                Err(BusError(status))
            }
        }
    }

    fn i2c_read_nack(&self, twi: &TWI) -> Result<u8, BusError> {
        twi.twcr.write(|w| w.twint().set_bit().twen().set_bit());
        self.wait_twint(twi);
        match twi.twsr.read().tws().bits() {
            TW_MR_DATA_NACK => Ok(twi.twdr.read().bits()),
            status => {
                self.i2c_stop(twi);
                Err(BusError(status))
            }
        }
    }

    fn i2c_stop(&self, twi: &TWI) {
        twi.twcr
            .write(|w| w.twint().set_bit().twsto().set_bit().twen().set_bit());
    }

    fn wait_twint(&self, twi: &TWI) {
        let mut timeout: u16 = 0xFFFF;
        while twi.twcr.read().twint().bit_is_clear() {
            timeout = timeout.wrapping_sub(1);
            if timeout == 0 {
                return;
            }
        }
    }
}
