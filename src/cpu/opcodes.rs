//! Opcode decode table.
//!
//! Every one of the 256 opcodes maps to an [`Operation`], an [`AddressingMode`] and a base
//! cycle count. Undocumented opcodes decode to [`Operation::Nop`] with the addressing mode of
//! the real instruction so their operand bytes are still consumed.

/// How an instruction finds its operand. See [6502 addressing](https://www.nesdev.org/wiki/CPU_addressing_modes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
    Accumulator,
    Implied,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Accumulator | AddressingMode::Implied => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

/// The documented 6502 instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

impl Operation {
    /// Read instructions that take an extra cycle when indexing crosses a page.
    pub fn has_page_cross_penalty(self) -> bool {
        matches!(
            self,
            Operation::Lda
                | Operation::Ldx
                | Operation::Ldy
                | Operation::And
                | Operation::Ora
                | Operation::Eor
                | Operation::Adc
                | Operation::Sbc
                | Operation::Cmp
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Operation::Adc => "ADC",
            Operation::And => "AND",
            Operation::Asl => "ASL",
            Operation::Bcc => "BCC",
            Operation::Bcs => "BCS",
            Operation::Beq => "BEQ",
            Operation::Bit => "BIT",
            Operation::Bmi => "BMI",
            Operation::Bne => "BNE",
            Operation::Bpl => "BPL",
            Operation::Brk => "BRK",
            Operation::Bvc => "BVC",
            Operation::Bvs => "BVS",
            Operation::Clc => "CLC",
            Operation::Cld => "CLD",
            Operation::Cli => "CLI",
            Operation::Clv => "CLV",
            Operation::Cmp => "CMP",
            Operation::Cpx => "CPX",
            Operation::Cpy => "CPY",
            Operation::Dec => "DEC",
            Operation::Dex => "DEX",
            Operation::Dey => "DEY",
            Operation::Eor => "EOR",
            Operation::Inc => "INC",
            Operation::Inx => "INX",
            Operation::Iny => "INY",
            Operation::Jmp => "JMP",
            Operation::Jsr => "JSR",
            Operation::Lda => "LDA",
            Operation::Ldx => "LDX",
            Operation::Ldy => "LDY",
            Operation::Lsr => "LSR",
            Operation::Nop => "NOP",
            Operation::Ora => "ORA",
            Operation::Pha => "PHA",
            Operation::Php => "PHP",
            Operation::Pla => "PLA",
            Operation::Plp => "PLP",
            Operation::Rol => "ROL",
            Operation::Ror => "ROR",
            Operation::Rti => "RTI",
            Operation::Rts => "RTS",
            Operation::Sbc => "SBC",
            Operation::Sec => "SEC",
            Operation::Sed => "SED",
            Operation::Sei => "SEI",
            Operation::Sta => "STA",
            Operation::Stx => "STX",
            Operation::Sty => "STY",
            Operation::Tax => "TAX",
            Operation::Tay => "TAY",
            Operation::Tsx => "TSX",
            Operation::Txa => "TXA",
            Operation::Txs => "TXS",
            Operation::Tya => "TYA",
        }
    }
}

/// One decode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub operation: Operation,
    pub mode: AddressingMode,
    /// Cycles before page-crossing and DMA penalties.
    pub cycles: u8,
}

const fn op(operation: Operation, mode: AddressingMode, cycles: u8) -> Opcode {
    Opcode {
        operation,
        mode,
        cycles,
    }
}

/// Decode table indexed by opcode byte.
#[rustfmt::skip]
pub static OPCODES: [Opcode; 256] = {
    use AddressingMode::*;
    use Operation::*;
    [
        /* 0x00 */ op(Brk, Implied, 7),
        /* 0x01 */ op(Ora, IndirectX, 6),
        /* 0x02 */ op(Nop, Implied, 2),
        /* 0x03 */ op(Nop, IndirectX, 8),
        /* 0x04 */ op(Nop, ZeroPage, 3),
        /* 0x05 */ op(Ora, ZeroPage, 3),
        /* 0x06 */ op(Asl, ZeroPage, 5),
        /* 0x07 */ op(Nop, ZeroPage, 5),
        /* 0x08 */ op(Php, Implied, 3),
        /* 0x09 */ op(Ora, Immediate, 2),
        /* 0x0A */ op(Asl, Accumulator, 2),
        /* 0x0B */ op(Nop, Immediate, 2),
        /* 0x0C */ op(Nop, Absolute, 4),
        /* 0x0D */ op(Ora, Absolute, 4),
        /* 0x0E */ op(Asl, Absolute, 6),
        /* 0x0F */ op(Nop, Absolute, 6),
        /* 0x10 */ op(Bpl, Relative, 2),
        /* 0x11 */ op(Ora, IndirectY, 5),
        /* 0x12 */ op(Nop, Implied, 2),
        /* 0x13 */ op(Nop, IndirectY, 8),
        /* 0x14 */ op(Nop, ZeroPageX, 4),
        /* 0x15 */ op(Ora, ZeroPageX, 4),
        /* 0x16 */ op(Asl, ZeroPageX, 6),
        /* 0x17 */ op(Nop, ZeroPageX, 6),
        /* 0x18 */ op(Clc, Implied, 2),
        /* 0x19 */ op(Ora, AbsoluteY, 4),
        /* 0x1A */ op(Nop, Implied, 2),
        /* 0x1B */ op(Nop, AbsoluteY, 7),
        /* 0x1C */ op(Nop, AbsoluteX, 4),
        /* 0x1D */ op(Ora, AbsoluteX, 4),
        /* 0x1E */ op(Asl, AbsoluteX, 6),
        /* 0x1F */ op(Nop, AbsoluteX, 7),
        /* 0x20 */ op(Jsr, Absolute, 6),
        /* 0x21 */ op(And, IndirectX, 6),
        /* 0x22 */ op(Nop, Implied, 2),
        /* 0x23 */ op(Nop, IndirectX, 8),
        /* 0x24 */ op(Bit, ZeroPage, 3),
        /* 0x25 */ op(And, ZeroPage, 3),
        /* 0x26 */ op(Rol, ZeroPage, 5),
        /* 0x27 */ op(Nop, ZeroPage, 5),
        /* 0x28 */ op(Plp, Implied, 4),
        /* 0x29 */ op(And, Immediate, 2),
        /* 0x2A */ op(Rol, Accumulator, 2),
        /* 0x2B */ op(Nop, Immediate, 2),
        /* 0x2C */ op(Bit, Absolute, 4),
        /* 0x2D */ op(And, Absolute, 4),
        /* 0x2E */ op(Rol, Absolute, 6),
        /* 0x2F */ op(Nop, Absolute, 6),
        /* 0x30 */ op(Bmi, Relative, 2),
        /* 0x31 */ op(And, IndirectY, 5),
        /* 0x32 */ op(Nop, Implied, 2),
        /* 0x33 */ op(Nop, IndirectY, 8),
        /* 0x34 */ op(Nop, ZeroPageX, 4),
        /* 0x35 */ op(And, ZeroPageX, 4),
        /* 0x36 */ op(Rol, ZeroPageX, 6),
        /* 0x37 */ op(Nop, ZeroPageX, 6),
        /* 0x38 */ op(Sec, Implied, 2),
        /* 0x39 */ op(And, AbsoluteY, 4),
        /* 0x3A */ op(Nop, Implied, 2),
        /* 0x3B */ op(Nop, AbsoluteY, 7),
        /* 0x3C */ op(Nop, AbsoluteX, 4),
        /* 0x3D */ op(And, AbsoluteX, 4),
        /* 0x3E */ op(Rol, AbsoluteX, 6),
        /* 0x3F */ op(Nop, AbsoluteX, 7),
        /* 0x40 */ op(Rti, Implied, 6),
        /* 0x41 */ op(Eor, IndirectX, 6),
        /* 0x42 */ op(Nop, Implied, 2),
        /* 0x43 */ op(Nop, IndirectX, 8),
        /* 0x44 */ op(Nop, ZeroPage, 3),
        /* 0x45 */ op(Eor, ZeroPage, 3),
        /* 0x46 */ op(Lsr, ZeroPage, 5),
        /* 0x47 */ op(Nop, ZeroPage, 5),
        /* 0x48 */ op(Pha, Implied, 3),
        /* 0x49 */ op(Eor, Immediate, 2),
        /* 0x4A */ op(Lsr, Accumulator, 2),
        /* 0x4B */ op(Nop, Immediate, 2),
        /* 0x4C */ op(Jmp, Absolute, 3),
        /* 0x4D */ op(Eor, Absolute, 4),
        /* 0x4E */ op(Lsr, Absolute, 6),
        /* 0x4F */ op(Nop, Absolute, 6),
        /* 0x50 */ op(Bvc, Relative, 2),
        /* 0x51 */ op(Eor, IndirectY, 5),
        /* 0x52 */ op(Nop, Implied, 2),
        /* 0x53 */ op(Nop, IndirectY, 8),
        /* 0x54 */ op(Nop, ZeroPageX, 4),
        /* 0x55 */ op(Eor, ZeroPageX, 4),
        /* 0x56 */ op(Lsr, ZeroPageX, 6),
        /* 0x57 */ op(Nop, ZeroPageX, 6),
        /* 0x58 */ op(Cli, Implied, 2),
        /* 0x59 */ op(Eor, AbsoluteY, 4),
        /* 0x5A */ op(Nop, Implied, 2),
        /* 0x5B */ op(Nop, AbsoluteY, 7),
        /* 0x5C */ op(Nop, AbsoluteX, 4),
        /* 0x5D */ op(Eor, AbsoluteX, 4),
        /* 0x5E */ op(Lsr, AbsoluteX, 6),
        /* 0x5F */ op(Nop, AbsoluteX, 7),
        /* 0x60 */ op(Rts, Implied, 6),
        /* 0x61 */ op(Adc, IndirectX, 6),
        /* 0x62 */ op(Nop, Implied, 2),
        /* 0x63 */ op(Nop, IndirectX, 8),
        /* 0x64 */ op(Nop, ZeroPage, 3),
        /* 0x65 */ op(Adc, ZeroPage, 3),
        /* 0x66 */ op(Ror, ZeroPage, 5),
        /* 0x67 */ op(Nop, ZeroPage, 5),
        /* 0x68 */ op(Pla, Implied, 4),
        /* 0x69 */ op(Adc, Immediate, 2),
        /* 0x6A */ op(Ror, Accumulator, 2),
        /* 0x6B */ op(Nop, Immediate, 2),
        /* 0x6C */ op(Jmp, Indirect, 5),
        /* 0x6D */ op(Adc, Absolute, 4),
        /* 0x6E */ op(Ror, Absolute, 6),
        /* 0x6F */ op(Nop, Absolute, 6),
        /* 0x70 */ op(Bvs, Relative, 2),
        /* 0x71 */ op(Adc, IndirectY, 5),
        /* 0x72 */ op(Nop, Implied, 2),
        /* 0x73 */ op(Nop, IndirectY, 8),
        /* 0x74 */ op(Nop, ZeroPageX, 4),
        /* 0x75 */ op(Adc, ZeroPageX, 4),
        /* 0x76 */ op(Ror, ZeroPageX, 6),
        /* 0x77 */ op(Nop, ZeroPageX, 6),
        /* 0x78 */ op(Sei, Implied, 2),
        /* 0x79 */ op(Adc, AbsoluteY, 4),
        /* 0x7A */ op(Nop, Implied, 2),
        /* 0x7B */ op(Nop, AbsoluteY, 7),
        /* 0x7C */ op(Nop, AbsoluteX, 4),
        /* 0x7D */ op(Adc, AbsoluteX, 4),
        /* 0x7E */ op(Ror, AbsoluteX, 6),
        /* 0x7F */ op(Nop, AbsoluteX, 7),
        /* 0x80 */ op(Nop, Immediate, 2),
        /* 0x81 */ op(Sta, IndirectX, 6),
        /* 0x82 */ op(Nop, Immediate, 2),
        /* 0x83 */ op(Nop, IndirectX, 6),
        /* 0x84 */ op(Sty, ZeroPage, 3),
        /* 0x85 */ op(Sta, ZeroPage, 3),
        /* 0x86 */ op(Stx, ZeroPage, 3),
        /* 0x87 */ op(Nop, ZeroPage, 3),
        /* 0x88 */ op(Dey, Implied, 2),
        /* 0x89 */ op(Nop, Immediate, 2),
        /* 0x8A */ op(Txa, Implied, 2),
        /* 0x8B */ op(Nop, Immediate, 2),
        /* 0x8C */ op(Sty, Absolute, 4),
        /* 0x8D */ op(Sta, Absolute, 4),
        /* 0x8E */ op(Stx, Absolute, 4),
        /* 0x8F */ op(Nop, Absolute, 4),
        /* 0x90 */ op(Bcc, Relative, 2),
        /* 0x91 */ op(Sta, IndirectY, 6),
        /* 0x92 */ op(Nop, Implied, 2),
        /* 0x93 */ op(Nop, IndirectY, 6),
        /* 0x94 */ op(Sty, ZeroPageX, 4),
        /* 0x95 */ op(Sta, ZeroPageX, 4),
        /* 0x96 */ op(Stx, ZeroPageY, 4),
        /* 0x97 */ op(Nop, ZeroPageY, 4),
        /* 0x98 */ op(Tya, Implied, 2),
        /* 0x99 */ op(Sta, AbsoluteY, 4),
        /* 0x9A */ op(Txs, Implied, 2),
        /* 0x9B */ op(Nop, AbsoluteY, 5),
        /* 0x9C */ op(Nop, AbsoluteX, 5),
        /* 0x9D */ op(Sta, AbsoluteX, 4),
        /* 0x9E */ op(Nop, AbsoluteY, 5),
        /* 0x9F */ op(Nop, AbsoluteY, 5),
        /* 0xA0 */ op(Ldy, Immediate, 2),
        /* 0xA1 */ op(Lda, IndirectX, 6),
        /* 0xA2 */ op(Ldx, Immediate, 2),
        /* 0xA3 */ op(Nop, IndirectX, 6),
        /* 0xA4 */ op(Ldy, ZeroPage, 3),
        /* 0xA5 */ op(Lda, ZeroPage, 3),
        /* 0xA6 */ op(Ldx, ZeroPage, 3),
        /* 0xA7 */ op(Nop, ZeroPage, 3),
        /* 0xA8 */ op(Tay, Implied, 2),
        /* 0xA9 */ op(Lda, Immediate, 2),
        /* 0xAA */ op(Tax, Implied, 2),
        /* 0xAB */ op(Nop, Immediate, 2),
        /* 0xAC */ op(Ldy, Absolute, 4),
        /* 0xAD */ op(Lda, Absolute, 4),
        /* 0xAE */ op(Ldx, Absolute, 4),
        /* 0xAF */ op(Nop, Absolute, 4),
        /* 0xB0 */ op(Bcs, Relative, 2),
        /* 0xB1 */ op(Lda, IndirectY, 5),
        /* 0xB2 */ op(Nop, Implied, 2),
        /* 0xB3 */ op(Nop, IndirectY, 5),
        /* 0xB4 */ op(Ldy, ZeroPageX, 4),
        /* 0xB5 */ op(Lda, ZeroPageX, 4),
        /* 0xB6 */ op(Ldx, ZeroPageY, 4),
        /* 0xB7 */ op(Nop, ZeroPageY, 4),
        /* 0xB8 */ op(Clv, Implied, 2),
        /* 0xB9 */ op(Lda, AbsoluteY, 4),
        /* 0xBA */ op(Tsx, Implied, 2),
        /* 0xBB */ op(Nop, AbsoluteY, 4),
        /* 0xBC */ op(Ldy, AbsoluteX, 4),
        /* 0xBD */ op(Lda, AbsoluteX, 4),
        /* 0xBE */ op(Ldx, AbsoluteY, 4),
        /* 0xBF */ op(Nop, AbsoluteY, 4),
        /* 0xC0 */ op(Cpy, Immediate, 2),
        /* 0xC1 */ op(Cmp, IndirectX, 6),
        /* 0xC2 */ op(Nop, Immediate, 2),
        /* 0xC3 */ op(Nop, IndirectX, 8),
        /* 0xC4 */ op(Cpy, ZeroPage, 3),
        /* 0xC5 */ op(Cmp, ZeroPage, 3),
        /* 0xC6 */ op(Dec, ZeroPage, 5),
        /* 0xC7 */ op(Nop, ZeroPage, 5),
        /* 0xC8 */ op(Iny, Implied, 2),
        /* 0xC9 */ op(Cmp, Immediate, 2),
        /* 0xCA */ op(Dex, Implied, 2),
        /* 0xCB */ op(Nop, Immediate, 2),
        /* 0xCC */ op(Cpy, Absolute, 4),
        /* 0xCD */ op(Cmp, Absolute, 4),
        /* 0xCE */ op(Dec, Absolute, 6),
        /* 0xCF */ op(Nop, Absolute, 6),
        /* 0xD0 */ op(Bne, Relative, 2),
        /* 0xD1 */ op(Cmp, IndirectY, 5),
        /* 0xD2 */ op(Nop, Implied, 2),
        /* 0xD3 */ op(Nop, IndirectY, 8),
        /* 0xD4 */ op(Nop, ZeroPageX, 4),
        /* 0xD5 */ op(Cmp, ZeroPageX, 4),
        /* 0xD6 */ op(Dec, ZeroPageX, 6),
        /* 0xD7 */ op(Nop, ZeroPageX, 6),
        /* 0xD8 */ op(Cld, Implied, 2),
        /* 0xD9 */ op(Cmp, AbsoluteY, 4),
        /* 0xDA */ op(Nop, Implied, 2),
        /* 0xDB */ op(Nop, AbsoluteY, 7),
        /* 0xDC */ op(Nop, AbsoluteX, 4),
        /* 0xDD */ op(Cmp, AbsoluteX, 4),
        /* 0xDE */ op(Dec, AbsoluteX, 7),
        /* 0xDF */ op(Nop, AbsoluteX, 7),
        /* 0xE0 */ op(Cpx, Immediate, 2),
        /* 0xE1 */ op(Sbc, IndirectX, 6),
        /* 0xE2 */ op(Nop, Immediate, 3),
        /* 0xE3 */ op(Nop, IndirectX, 8),
        /* 0xE4 */ op(Cpx, ZeroPage, 3),
        /* 0xE5 */ op(Sbc, ZeroPage, 3),
        /* 0xE6 */ op(Inc, ZeroPage, 5),
        /* 0xE7 */ op(Nop, ZeroPage, 5),
        /* 0xE8 */ op(Inx, Implied, 2),
        /* 0xE9 */ op(Sbc, Immediate, 2),
        /* 0xEA */ op(Nop, Implied, 2),
        /* 0xEB */ op(Nop, Immediate, 2),
        /* 0xEC */ op(Cpx, Absolute, 4),
        /* 0xED */ op(Sbc, Absolute, 4),
        /* 0xEE */ op(Inc, Absolute, 6),
        /* 0xEF */ op(Nop, Absolute, 6),
        /* 0xF0 */ op(Beq, Relative, 2),
        /* 0xF1 */ op(Sbc, IndirectY, 5),
        /* 0xF2 */ op(Nop, Implied, 2),
        /* 0xF3 */ op(Nop, IndirectY, 8),
        /* 0xF4 */ op(Nop, ZeroPageX, 4),
        /* 0xF5 */ op(Sbc, ZeroPageX, 4),
        /* 0xF6 */ op(Inc, ZeroPageX, 6),
        /* 0xF7 */ op(Nop, ZeroPageX, 6),
        /* 0xF8 */ op(Sed, Implied, 2),
        /* 0xF9 */ op(Sbc, AbsoluteY, 4),
        /* 0xFA */ op(Nop, Implied, 2),
        /* 0xFB */ op(Nop, AbsoluteY, 7),
        /* 0xFC */ op(Nop, AbsoluteX, 4),
        /* 0xFD */ op(Sbc, AbsoluteX, 4),
        /* 0xFE */ op(Inc, AbsoluteX, 7),
        /* 0xFF */ op(Nop, AbsoluteX, 7),
    ]
};
