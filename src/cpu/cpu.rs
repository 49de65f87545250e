use log::{Level, log_enabled, trace};

use crate::{
    bus::Bus,
    cpu::{
        flags::{FLAG_BREAK, Status},
        opcodes::{AddressingMode, OPCODES, Opcode, Operation},
    },
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles spent entering an interrupt handler (and after RESET).
pub const INTERRUPT_CYCLES: usize = 7;

const STACK_PAGE: u16 = 0x0100;

/// Where an instruction's operand lives once its addressing mode is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Implied,
    Accumulator,
    Memory(u16),
}

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: Status,
    /// Cycles executed since power-on; only used for tracing.
    pub cycles: usize,
    pub bus: B,
}

impl<B: Bus> CPU<B> {
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: Status::default(),
            cycles: 0,
            bus,
        }
    }

    pub fn reset(&mut self) {
        self.pc = self.read_word(RESET_VECTOR);

        self.sp = 0xFD;
        self.status = Status::default();

        self.a = 0;
        self.x = 0;
        self.y = 0;

        self.cycles = INTERRUPT_CYCLES;
    }

    /// Execute one instruction, or enter the NMI handler if one is pending.
    /// Returns the cycles consumed, including page-crossing and DMA penalties.
    pub fn step(&mut self) -> usize {
        if self.bus.poll_nmi() {
            self.bus.acknowledge_nmi();
            self.nmi();
            self.cycles += INTERRUPT_CYCLES;
            return INTERRUPT_CYCLES;
        }

        let pc = self.pc;
        let opcode = self.fetch_byte();
        let entry = OPCODES[opcode as usize];
        if log_enabled!(Level::Trace) {
            self.trace(pc, opcode, entry);
        }

        let (operand, page_crossed) = self.resolve(entry.mode);
        let mut cycles = entry.cycles as usize;
        if page_crossed && entry.operation.has_page_cross_penalty() {
            cycles += 1;
        }
        cycles += self.execute(entry.operation, operand);
        cycles += self.bus.take_stall_cycles();

        self.cycles += cycles;
        cycles
    }

    /// Non-maskable interrupt: always taken, pushes status with B clear.
    pub fn nmi(&mut self) {
        self.interrupt(NMI_VECTOR, false);
    }

    /// Maskable interrupt. Returns false when ignored because I is set.
    pub fn irq(&mut self) -> bool {
        if self.status.interrupt_disable {
            return false;
        }
        self.interrupt(IRQ_VECTOR, false);
        true
    }

    /// B exists only in the pushed copy of P; the live status is left alone.
    fn interrupt(&mut self, vector: u16, brk: bool) {
        self.push_word(self.pc);
        let pushed = self.status.to_byte() & !FLAG_BREAK;
        self.push(if brk { pushed | FLAG_BREAK } else { pushed });
        self.status.interrupt_disable = true;
        self.pc = self.read_word(vector);
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr) as u16;
        let hi = self.bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Pointer read for `JMP ($xxFF)`: the high byte comes from the start of the same page.
    fn read_word_in_page(&mut self, ptr: u16) -> u16 {
        let lo = self.bus.read(ptr) as u16;
        let hi = self.bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
        (hi << 8) | lo
    }

    fn read_zero_page_word(&mut self, ptr: u8) -> u16 {
        let lo = self.bus.read(ptr as u16) as u16;
        let hi = self.bus.read(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    fn trace(&self, pc: u16, opcode: u8, entry: Opcode) {
        trace!("{}", self.trace_line(pc, opcode, entry));
    }

    /// Plain-text register dump for one instruction; log sinks may be files.
    pub(crate) fn trace_line(&self, pc: u16, opcode: u8, entry: Opcode) -> String {
        format!(
            "{:04X}  {:02X}  {}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            opcode,
            entry.operation.mnemonic(),
            self.a,
            self.x,
            self.y,
            self.status.to_byte(),
            self.sp,
            self.cycles
        )
    }

    /// Consume operand bytes and compute the effective address. The flag reports whether
    /// indexing moved the address onto another page.
    fn resolve(&mut self, mode: AddressingMode) -> (Operand, bool) {
        match mode {
            AddressingMode::Implied => (Operand::Implied, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (Operand::Memory(addr), false)
            }
            AddressingMode::ZeroPage => (Operand::Memory(self.fetch_byte() as u16), false),
            AddressingMode::ZeroPageX => {
                let addr = self.fetch_byte().wrapping_add(self.x);
                (Operand::Memory(addr as u16), false)
            }
            AddressingMode::ZeroPageY => {
                let addr = self.fetch_byte().wrapping_add(self.y);
                (Operand::Memory(addr as u16), false)
            }
            AddressingMode::Absolute => (Operand::Memory(self.fetch_word()), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word();
                indexed(base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word();
                indexed(base, self.y)
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word();
                (Operand::Memory(self.read_word_in_page(ptr)), false)
            }
            AddressingMode::IndirectX => {
                let ptr = self.fetch_byte().wrapping_add(self.x);
                (Operand::Memory(self.read_zero_page_word(ptr)), false)
            }
            AddressingMode::IndirectY => {
                let ptr = self.fetch_byte();
                let base = self.read_zero_page_word(ptr);
                indexed(base, self.y)
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte() as i8;
                (Operand::Memory(self.pc.wrapping_add(offset as u16)), false)
            }
        }
    }

    fn load(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Accumulator => self.a,
            Operand::Memory(addr) => self.bus.read(addr),
            Operand::Implied => unreachable!("implied operand has no value"),
        }
    }

    fn store(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Accumulator => self.a = value,
            Operand::Memory(addr) => self.bus.write(addr, value),
            Operand::Implied => unreachable!("implied operand has no location"),
        }
    }

    fn address(operand: Operand) -> u16 {
        match operand {
            Operand::Memory(addr) => addr,
            _ => unreachable!("{operand:?} is not an address"),
        }
    }

    /// Read-modify-write on the accumulator or memory. Z and N follow the result.
    fn modify(&mut self, operand: Operand, f: impl FnOnce(&mut Status, u8) -> u8) {
        let value = self.load(operand);
        let result = f(&mut self.status, value);
        self.status.set_zero_and_negative(result);
        self.store(operand, result);
    }

    /// Run `operation`; returns cycles beyond the table's base count.
    fn execute(&mut self, operation: Operation, operand: Operand) -> usize {
        match operation {
            Operation::Lda => {
                self.a = self.load(operand);
                self.status.set_zero_and_negative(self.a);
            }
            Operation::Ldx => {
                self.x = self.load(operand);
                self.status.set_zero_and_negative(self.x);
            }
            Operation::Ldy => {
                self.y = self.load(operand);
                self.status.set_zero_and_negative(self.y);
            }
            Operation::Sta => self.store(operand, self.a),
            Operation::Stx => self.store(operand, self.x),
            Operation::Sty => self.store(operand, self.y),

            Operation::Tax => {
                self.x = self.a;
                self.status.set_zero_and_negative(self.x);
            }
            Operation::Tay => {
                self.y = self.a;
                self.status.set_zero_and_negative(self.y);
            }
            Operation::Tsx => {
                self.x = self.sp;
                self.status.set_zero_and_negative(self.x);
            }
            Operation::Txa => {
                self.a = self.x;
                self.status.set_zero_and_negative(self.a);
            }
            Operation::Txs => self.sp = self.x,
            Operation::Tya => {
                self.a = self.y;
                self.status.set_zero_and_negative(self.a);
            }

            Operation::Adc => {
                let value = self.load(operand);
                self.add_with_carry(value);
            }
            Operation::Sbc => {
                let value = self.load(operand);
                self.add_with_carry(!value);
            }
            Operation::And => {
                self.a &= self.load(operand);
                self.status.set_zero_and_negative(self.a);
            }
            Operation::Ora => {
                self.a |= self.load(operand);
                self.status.set_zero_and_negative(self.a);
            }
            Operation::Eor => {
                self.a ^= self.load(operand);
                self.status.set_zero_and_negative(self.a);
            }
            Operation::Cmp => {
                let value = self.load(operand);
                self.compare(self.a, value);
            }
            Operation::Cpx => {
                let value = self.load(operand);
                self.compare(self.x, value);
            }
            Operation::Cpy => {
                let value = self.load(operand);
                self.compare(self.y, value);
            }
            Operation::Bit => {
                let value = self.load(operand);
                self.status.zero = self.a & value == 0;
                self.status.negative = value & 0x80 != 0;
                self.status.overflow = value & 0x40 != 0;
            }

            Operation::Asl => self.modify(operand, |p, v| {
                p.carry = v & 0x80 != 0;
                v << 1
            }),
            Operation::Lsr => self.modify(operand, |p, v| {
                p.carry = v & 0x01 != 0;
                v >> 1
            }),
            Operation::Rol => self.modify(operand, |p, v| {
                let carry_in = p.carry as u8;
                p.carry = v & 0x80 != 0;
                (v << 1) | carry_in
            }),
            Operation::Ror => self.modify(operand, |p, v| {
                let carry_in = (p.carry as u8) << 7;
                p.carry = v & 0x01 != 0;
                (v >> 1) | carry_in
            }),
            Operation::Inc => self.modify(operand, |_, v| v.wrapping_add(1)),
            Operation::Dec => self.modify(operand, |_, v| v.wrapping_sub(1)),
            Operation::Inx => {
                self.x = self.x.wrapping_add(1);
                self.status.set_zero_and_negative(self.x);
            }
            Operation::Iny => {
                self.y = self.y.wrapping_add(1);
                self.status.set_zero_and_negative(self.y);
            }
            Operation::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.status.set_zero_and_negative(self.x);
            }
            Operation::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.status.set_zero_and_negative(self.y);
            }

            Operation::Bcc => return self.branch(!self.status.carry, operand),
            Operation::Bcs => return self.branch(self.status.carry, operand),
            Operation::Bne => return self.branch(!self.status.zero, operand),
            Operation::Beq => return self.branch(self.status.zero, operand),
            Operation::Bpl => return self.branch(!self.status.negative, operand),
            Operation::Bmi => return self.branch(self.status.negative, operand),
            Operation::Bvc => return self.branch(!self.status.overflow, operand),
            Operation::Bvs => return self.branch(self.status.overflow, operand),

            Operation::Jmp => self.pc = Self::address(operand),
            Operation::Jsr => {
                self.push_word(self.pc.wrapping_sub(1));
                self.pc = Self::address(operand);
            }
            Operation::Rts => self.pc = self.pop_word().wrapping_add(1),
            Operation::Rti => {
                self.status = Status::from_byte(self.pop());
                self.pc = self.pop_word();
            }
            Operation::Brk => self.brk(),

            Operation::Pha => self.push(self.a),
            Operation::Php => self.push(self.status.to_byte() | FLAG_BREAK),
            Operation::Pla => {
                self.a = self.pop();
                self.status.set_zero_and_negative(self.a);
            }
            Operation::Plp => self.status = Status::from_byte(self.pop()),

            Operation::Clc => self.status.carry = false,
            Operation::Sec => self.status.carry = true,
            Operation::Cli => self.status.interrupt_disable = false,
            Operation::Sei => self.status.interrupt_disable = true,
            Operation::Cld => self.status.decimal = false,
            Operation::Sed => self.status.decimal = true,
            Operation::Clv => self.status.overflow = false,

            Operation::Nop => {}
        }
        0
    }

    /// Binary add with carry; SBC feeds the complemented operand through here.
    fn add_with_carry(&mut self, value: u8) {
        let sum = self.a as u16 + value as u16 + self.status.carry as u16;
        let result = sum as u8;

        self.status.carry = sum > 0xFF;
        self.status.overflow = (!(self.a ^ value) & (self.a ^ result)) & 0x80 != 0;

        self.a = result;
        self.status.set_zero_and_negative(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.status.carry = register >= value;
        self.status.set_zero_and_negative(register.wrapping_sub(value));
    }

    /// Taken branches that land on another page cost one extra cycle.
    fn branch(&mut self, condition: bool, operand: Operand) -> usize {
        if !condition {
            return 0;
        }
        let target = Self::address(operand);
        let crossed = (self.pc & 0xFF00) != (target & 0xFF00);
        self.pc = target;
        usize::from(crossed)
    }

    /// BRK is masked by I like IRQ; when taken it skips its padding byte.
    fn brk(&mut self) {
        if self.status.interrupt_disable {
            return;
        }
        self.pc = self.pc.wrapping_add(1);
        self.interrupt(IRQ_VECTOR, true);
    }

    pub(crate) fn push(&mut self, value: u8) {
        let addr = STACK_PAGE | self.sp as u16;
        self.bus.write(addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = STACK_PAGE | self.sp as u16;
        self.bus.read(addr)
    }

    fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }
}

fn indexed(base: u16, index: u8) -> (Operand, bool) {
    let addr = base.wrapping_add(index as u16);
    (Operand::Memory(addr), (base & 0xFF00) != (addr & 0xFF00))
}
