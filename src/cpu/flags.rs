//! 6502 processor status register (P).
//!
//! The CPU keeps the eight flags as independent booleans and only packs them into a byte
//! when the status is pushed or traced.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // Stored, never used by ADC/SBC on the 2A03
pub const FLAG_BREAK: u8 = 1 << 4; // Only meaningful in a pushed copy of P
pub const FLAG_RESERVED: u8 = 1 << 5; // Always reads as 1
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub negative: bool,
    pub overflow: bool,
    pub reserved: bool,
    pub brk: bool,
    pub decimal: bool,
    pub interrupt_disable: bool,
    pub zero: bool,
    pub carry: bool,
}

impl Default for Status {
    /// Power-up state: interrupts disabled, reserved bit set.
    fn default() -> Self {
        Self::from_byte(FLAG_INTERRUPT_DISABLE | FLAG_RESERVED)
    }
}

impl Status {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            negative: byte & FLAG_NEGATIVE != 0,
            overflow: byte & FLAG_OVERFLOW != 0,
            reserved: true,
            brk: byte & FLAG_BREAK != 0,
            decimal: byte & FLAG_DECIMAL != 0,
            interrupt_disable: byte & FLAG_INTERRUPT_DISABLE != 0,
            zero: byte & FLAG_ZERO != 0,
            carry: byte & FLAG_CARRY != 0,
        }
    }

    pub fn to_byte(self) -> u8 {
        [
            (self.carry, FLAG_CARRY),
            (self.zero, FLAG_ZERO),
            (self.interrupt_disable, FLAG_INTERRUPT_DISABLE),
            (self.decimal, FLAG_DECIMAL),
            (self.brk, FLAG_BREAK),
            (self.reserved, FLAG_RESERVED),
            (self.overflow, FLAG_OVERFLOW),
            (self.negative, FLAG_NEGATIVE),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(FLAG_RESERVED, |p, (_, bit)| p | bit)
    }

    /// Z and N from a freshly produced value.
    pub fn set_zero_and_negative(&mut self, value: u8) {
        self.zero = value == 0;
        self.negative = value & 0x80 != 0;
    }
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.to_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_round_trips_with_reserved_forced_high() {
        for byte in 0..=255u8 {
            assert_eq!(Status::from_byte(byte).to_byte(), byte | FLAG_RESERVED);
        }
    }

    #[test]
    fn zero_and_negative_follow_the_value() {
        let mut p = Status::default();
        p.set_zero_and_negative(0);
        assert!(p.zero && !p.negative);
        p.set_zero_and_negative(0x80);
        assert!(!p.zero && p.negative);
    }
}
