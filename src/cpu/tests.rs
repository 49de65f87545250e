use proptest::prelude::*;

use crate::{
    bus::Bus,
    cpu::{
        cpu::{CPU, INTERRUPT_CYCLES},
        flags::{FLAG_BREAK, FLAG_RESERVED, Status},
        opcodes::OPCODES,
    },
};

const OAM_DMA_PENALTY: usize = 514;

struct TestBus {
    mem: [u8; 65536],
    nmi: bool,
    stall: usize,
}

impl TestBus {
    fn new() -> Self {
        let mut mem = [0; 65536];
        // Reset vector -> $8000
        mem[0xFFFC] = 0x00;
        mem[0xFFFD] = 0x80;
        Self {
            mem,
            nmi: false,
            stall: 0,
        }
    }

    fn load(&mut self, addr: u16, program: &[u8]) {
        let start = addr as usize;
        self.mem[start..start + program.len()].copy_from_slice(program);
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        if addr == 0x4014 {
            self.stall += OAM_DMA_PENALTY;
        }
        self.mem[addr as usize] = data;
    }

    fn take_stall_cycles(&mut self) -> usize {
        std::mem::take(&mut self.stall)
    }

    fn poll_nmi(&self) -> bool {
        self.nmi
    }

    fn acknowledge_nmi(&mut self) {
        self.nmi = false;
    }
}

fn cpu_with_program(program: &[u8]) -> CPU<TestBus> {
    let mut bus = TestBus::new();
    bus.load(0x8000, program);
    let mut cpu = CPU::new(bus);
    cpu.reset();
    cpu
}

#[test]
fn reset_loads_vector_and_masks_interrupts() {
    let cpu = cpu_with_program(&[]);
    assert_eq!(cpu.pc, 0x8000);
    assert_eq!(cpu.sp, 0xFD);
    assert!(cpu.status.interrupt_disable);
    assert_eq!(cpu.status.to_byte(), 0x24);
}

#[test]
fn lda_immediate_loads_value() {
    let mut cpu = cpu_with_program(&[0xA9, 0x42]); // LDA #$42
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x8002);
}

#[test]
fn lda_sets_zero_flag() {
    let mut cpu = cpu_with_program(&[0xA9, 0x00]); // LDA #$00
    cpu.step();
    assert!(cpu.status.zero);
    assert!(!cpu.status.negative);
}

#[test]
fn lda_sets_negative_flag() {
    let mut cpu = cpu_with_program(&[0xA9, 0x80]); // LDA #$80
    cpu.step();
    assert!(cpu.status.negative);
    assert!(!cpu.status.zero);
}

#[test]
fn every_opcode_costs_its_base_cycles_without_penalties() {
    for opcode in 0..=255u8 {
        let mut cpu = cpu_with_program(&[opcode]);
        let cycles = cpu.step();
        assert_eq!(
            cycles, OPCODES[opcode as usize].cycles as usize,
            "opcode ${opcode:02X}"
        );
    }
}

#[test]
fn indexed_read_across_page_costs_one_more_cycle() {
    let mut cpu = cpu_with_program(&[0xBD, 0xFF, 0x02]); // LDA $02FF,X
    cpu.x = 1;
    cpu.bus.mem[0x0300] = 0x99;
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.a, 0x99);
}

#[test]
fn indexed_store_across_page_costs_base_cycles() {
    let mut cpu = cpu_with_program(&[0x9D, 0xFF, 0x02]); // STA $02FF,X
    cpu.x = 1;
    cpu.a = 0x11;
    assert_eq!(cpu.step(), OPCODES[0x9D].cycles as usize);
    assert_eq!(cpu.bus.mem[0x0300], 0x11);
}

#[test]
fn indirect_indexed_read_across_page() {
    let mut cpu = cpu_with_program(&[0xB1, 0x10]); // LDA ($10),Y
    cpu.bus.mem[0x10] = 0xF0;
    cpu.bus.mem[0x11] = 0x03;
    cpu.bus.mem[0x0400] = 0x5A;
    cpu.y = 0x10;
    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.a, 0x5A);
}

#[test]
fn branch_costs_extra_only_when_target_is_on_another_page() {
    let mut cpu = cpu_with_program(&[]);
    cpu.bus.load(0x80FD, &[0xD0, 0x01]); // BNE +1 -> $8100
    cpu.pc = 0x80FD;
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.pc, 0x8100);

    let mut cpu = cpu_with_program(&[0xD0, 0x02]); // BNE +2, same page
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.pc, 0x8004);

    let mut cpu = cpu_with_program(&[0xF0, 0x02]); // BEQ not taken
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.pc, 0x8002);
}

#[test]
fn backward_branch_uses_signed_offset() {
    let mut cpu = cpu_with_program(&[0xEA, 0xD0, 0xFD]); // NOP; BNE -3
    cpu.step();
    cpu.step();
    assert_eq!(cpu.pc, 0x8000);
}

#[test]
fn oam_dma_write_charges_stall_cycles_to_the_step() {
    let mut cpu = cpu_with_program(&[0x8D, 0x14, 0x40, 0xEA]); // STA $4014; NOP
    assert_eq!(cpu.step(), 4 + OAM_DMA_PENALTY);
    assert_eq!(cpu.step(), 2);
}

fn reference_adc(a: u8, m: u8, carry: bool) -> (u8, bool, bool) {
    let unsigned = a as u16 + m as u16 + carry as u16;
    let signed = a as i8 as i16 + m as i8 as i16 + carry as i16;
    (unsigned as u8, unsigned > 0xFF, !(-128..=127).contains(&signed))
}

fn reference_sbc(a: u8, m: u8, carry: bool) -> (u8, bool, bool) {
    let borrow = !carry as i16;
    let unsigned = a as i16 - m as i16 - borrow;
    let signed = a as i8 as i16 - m as i8 as i16 - borrow;
    (unsigned as u8, unsigned >= 0, !(-128..=127).contains(&signed))
}

fn run_immediate(opcode: u8, a: u8, m: u8, carry: bool) -> CPU<TestBus> {
    let mut cpu = cpu_with_program(&[opcode, m]);
    cpu.a = a;
    cpu.status.carry = carry;
    cpu.step();
    cpu
}

proptest! {
    #[test]
    fn adc_matches_reference(a in any::<u8>(), m in any::<u8>(), carry in any::<bool>()) {
        let cpu = run_immediate(0x69, a, m, carry);
        let (result, carry_out, overflow) = reference_adc(a, m, carry);
        prop_assert_eq!(cpu.a, result);
        prop_assert_eq!(cpu.status.carry, carry_out);
        prop_assert_eq!(cpu.status.overflow, overflow);
        prop_assert_eq!(cpu.status.zero, result == 0);
        prop_assert_eq!(cpu.status.negative, result & 0x80 != 0);
    }

    #[test]
    fn sbc_matches_reference(a in any::<u8>(), m in any::<u8>(), carry in any::<bool>()) {
        let cpu = run_immediate(0xE9, a, m, carry);
        let (result, carry_out, overflow) = reference_sbc(a, m, carry);
        prop_assert_eq!(cpu.a, result);
        prop_assert_eq!(cpu.status.carry, carry_out);
        prop_assert_eq!(cpu.status.overflow, overflow);
        prop_assert_eq!(cpu.status.zero, result == 0);
        prop_assert_eq!(cpu.status.negative, result & 0x80 != 0);
    }

    #[test]
    fn cmp_sets_flags_without_touching_a(a in any::<u8>(), m in any::<u8>()) {
        let cpu = run_immediate(0xC9, a, m, false);
        prop_assert_eq!(cpu.a, a);
        prop_assert_eq!(cpu.status.carry, a >= m);
        prop_assert_eq!(cpu.status.zero, a == m);
        prop_assert_eq!(cpu.status.negative, a.wrapping_sub(m) & 0x80 != 0);
    }

    #[test]
    fn push_then_pop_round_trips(sp in any::<u8>(), value in any::<u8>()) {
        let mut cpu = cpu_with_program(&[]);
        cpu.sp = sp;
        cpu.push(value);
        prop_assert_eq!(cpu.bus.mem[0x0100 | sp as usize], value);
        prop_assert_eq!(cpu.pop(), value);
        prop_assert_eq!(cpu.sp, sp);
    }
}

#[test]
fn stack_pointer_wraps_within_page_one() {
    let mut cpu = cpu_with_program(&[]);
    cpu.sp = 0x00;
    cpu.push(0xAB);
    assert_eq!(cpu.sp, 0xFF);
    assert_eq!(cpu.bus.mem[0x0100], 0xAB);
    assert_eq!(cpu.pop(), 0xAB);
    assert_eq!(cpu.sp, 0x00);
}

#[test]
fn nmi_jumps_through_vector_and_pushes_status_with_break_low() {
    let mut cpu = cpu_with_program(&[]);
    cpu.bus.mem[0xFFFA] = 0x34;
    cpu.bus.mem[0xFFFB] = 0x12;
    cpu.pc = 0x8123;
    cpu.status = Status::from_byte(0b1101_0011); // N V B Z C, I clear
    let before = cpu.status;

    cpu.nmi();

    assert_eq!(cpu.pc, 0x1234);
    assert!(cpu.status.interrupt_disable);
    assert_eq!(cpu.bus.mem[0x01FD], 0x81);
    assert_eq!(cpu.bus.mem[0x01FC], 0x23);
    let pushed = Status::from_byte(cpu.bus.mem[0x01FB]);
    assert_eq!(pushed, Status { brk: false, ..before });
}

#[test]
fn nmi_is_taken_even_with_interrupts_disabled() {
    let mut cpu = cpu_with_program(&[0xEA]);
    cpu.bus.mem[0xFFFA] = 0x00;
    cpu.bus.mem[0xFFFB] = 0x90;
    cpu.bus.nmi = true;
    assert!(cpu.status.interrupt_disable);

    assert_eq!(cpu.step(), INTERRUPT_CYCLES);
    assert_eq!(cpu.pc, 0x9000);
    assert!(!cpu.bus.nmi, "request must be acknowledged");

    // The next step executes the handler, not a second NMI.
    cpu.bus.mem[0x9000] = 0xEA;
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.pc, 0x9001);
}

#[test]
fn brk_pushes_return_address_and_status_with_break_high() {
    let mut cpu = cpu_with_program(&[0x58, 0x00]); // CLI; BRK
    cpu.bus.mem[0xFFFE] = 0x00;
    cpu.bus.mem[0xFFFF] = 0x90;
    cpu.step();
    cpu.status.carry = true;
    let before = cpu.status;

    assert_eq!(cpu.step(), 7);

    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(cpu.bus.mem[0x01FD], 0x80);
    assert_eq!(cpu.bus.mem[0x01FC], 0x03);
    let pushed = Status::from_byte(cpu.bus.mem[0x01FB]);
    assert_eq!(pushed, Status { brk: true, ..before });
    assert!(cpu.status.interrupt_disable);
    assert!(!cpu.status.brk, "B is only set in the pushed copy");
}

#[test]
fn brk_and_irq_are_ignored_while_interrupts_are_disabled() {
    let mut cpu = cpu_with_program(&[0x00]);
    cpu.step();
    assert_eq!(cpu.pc, 0x8001);
    assert_eq!(cpu.sp, 0xFD);
    assert!(!cpu.irq());
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn irq_uses_the_irq_vector() {
    let mut cpu = cpu_with_program(&[]);
    cpu.bus.mem[0xFFFE] = 0x00;
    cpu.bus.mem[0xFFFF] = 0xA0;
    cpu.status.interrupt_disable = false;
    assert!(cpu.irq());
    assert_eq!(cpu.pc, 0xA000);
    assert_eq!(cpu.bus.mem[0x01FB] & FLAG_BREAK, 0);
}

#[test]
fn rti_restores_status_and_pc() {
    let mut cpu = cpu_with_program(&[0xEA]);
    cpu.bus.mem[0xFFFA] = 0x00;
    cpu.bus.mem[0xFFFB] = 0x90;
    cpu.bus.mem[0x9000] = 0x40; // RTI
    cpu.status.carry = true;
    cpu.status.interrupt_disable = false;
    let before = cpu.status;

    cpu.bus.nmi = true;
    cpu.step();
    cpu.step();

    assert_eq!(cpu.pc, 0x8000);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.status, before);
}

#[test]
fn jsr_and_rts_round_trip() {
    let mut cpu = cpu_with_program(&[0x20, 0x00, 0x90]); // JSR $9000
    cpu.bus.mem[0x9000] = 0x60; // RTS
    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(cpu.bus.mem[0x01FD], 0x80);
    assert_eq!(cpu.bus.mem[0x01FC], 0x02);
    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0x8003);
}

#[test]
fn php_pushes_break_and_reserved() {
    let mut cpu = cpu_with_program(&[0x08]); // PHP
    cpu.step();
    assert_eq!(cpu.bus.mem[0x01FD], 0x24 | FLAG_BREAK | FLAG_RESERVED);
}

#[test]
fn jmp_indirect_wraps_within_pointer_page() {
    let mut cpu = cpu_with_program(&[0x6C, 0xFF, 0x02]); // JMP ($02FF)
    cpu.bus.mem[0x02FF] = 0x00;
    cpu.bus.mem[0x0200] = 0x90;
    cpu.bus.mem[0x0300] = 0x50;
    cpu.step();
    assert_eq!(cpu.pc, 0x9000);
}

#[test]
fn zero_page_indexing_wraps() {
    let mut cpu = cpu_with_program(&[0xB5, 0xFF]); // LDA $FF,X
    cpu.x = 2;
    cpu.bus.mem[0x0001] = 0x77;
    cpu.bus.mem[0x0101] = 0x11;
    cpu.step();
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn indexed_indirect_pointer_wraps_in_zero_page() {
    let mut cpu = cpu_with_program(&[0xA1, 0xFE]); // LDA ($FE,X)
    cpu.x = 1;
    cpu.bus.mem[0x00FF] = 0x34;
    cpu.bus.mem[0x0000] = 0x12;
    cpu.bus.mem[0x1234] = 0xCD;
    cpu.step();
    assert_eq!(cpu.a, 0xCD);
}

#[test]
fn bit_sets_zero_from_and_and_copies_high_bits() {
    let mut cpu = cpu_with_program(&[0x24, 0x10]); // BIT $10
    cpu.a = 0x01;
    cpu.bus.mem[0x10] = 0xC0;
    cpu.step();
    assert!(cpu.status.zero);
    assert!(cpu.status.negative);
    assert!(cpu.status.overflow);

    let mut cpu = cpu_with_program(&[0x24, 0x10]);
    cpu.a = 0x01;
    cpu.bus.mem[0x10] = 0x01;
    cpu.step();
    assert!(!cpu.status.zero);
}

#[test]
fn rotates_move_carry_through_memory() {
    let mut cpu = cpu_with_program(&[0x26, 0x10, 0x66, 0x11]); // ROL $10; ROR $11
    cpu.status.carry = true;
    cpu.bus.mem[0x10] = 0x80;
    cpu.bus.mem[0x11] = 0x02;
    cpu.step();
    assert_eq!(cpu.bus.mem[0x10], 0x01);
    assert!(cpu.status.carry);
    cpu.step();
    assert_eq!(cpu.bus.mem[0x11], 0x81);
    assert!(!cpu.status.carry);
    assert_eq!(cpu.a, 0, "memory-mode shifts leave A alone");
}

#[test]
fn accumulator_shifts_act_on_a() {
    let mut cpu = cpu_with_program(&[0x0A, 0x4A]); // ASL A; LSR A
    cpu.a = 0x81;
    cpu.step();
    assert_eq!(cpu.a, 0x02);
    assert!(cpu.status.carry);
    cpu.step();
    assert_eq!(cpu.a, 0x01);
    assert!(!cpu.status.carry);
}

#[test]
fn inc_and_dec_wrap_memory() {
    let mut cpu = cpu_with_program(&[0xE6, 0x10, 0xC6, 0x11]); // INC $10; DEC $11
    cpu.bus.mem[0x10] = 0xFF;
    cpu.step();
    assert_eq!(cpu.bus.mem[0x10], 0x00);
    assert!(cpu.status.zero);
    cpu.step();
    assert_eq!(cpu.bus.mem[0x11], 0xFF);
    assert!(cpu.status.negative);
}

#[test]
fn undocumented_nop_skips_its_operands() {
    let mut cpu = cpu_with_program(&[0x0C, 0x34, 0x12, 0xA9, 0x07]); // NOP $1234; LDA #$07
    cpu.step();
    assert_eq!(cpu.pc, 0x8003);
    cpu.step();
    assert_eq!(cpu.a, 0x07);
}

#[test]
fn trace_line_is_plain_text() {
    let cpu = cpu_with_program(&[0xA9, 0x42]);
    let line = cpu.trace_line(0x8000, 0xA9, OPCODES[0xA9]);
    assert!(line.starts_with("8000  A9  LDA  A:00 X:00 Y:00"), "{line}");
    assert!(line.ends_with("SP:FD CYC:7"), "{line}");
    assert!(!line.contains('\x1b'));
}
