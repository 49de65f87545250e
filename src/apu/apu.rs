//! Sound channel generators.
//!
//! Register file of the [APU](https://www.nesdev.org/wiki/APU) at $4000–$4013, $4015 and $4017,
//! reduced to what a tone synthesiser needs: two pulse channels, the triangle, and a noise
//! channel that keeps its counters but outputs silence. Instead of producing samples the APU
//! exposes one [`Voice`] per channel (frequency, waveform, volume) for the host to render.
//!
//! ## Timing
//!
//! - Frequencies follow the NTSC timer formulas: pulse `f = CPU / (16 * (t + 1))`, triangle
//!   `f = CPU / (32 * (t + 1))`.
//! - A half-frame clock every 14915 CPU cycles decrements length counters and clocks sweeps.
//!
//! ## References
//!
//! - [APU Pulse](https://www.nesdev.org/wiki/APU_Pulse), [APU Triangle](https://www.nesdev.org/wiki/APU_Triangle)
//! - [APU Sweep](https://www.nesdev.org/wiki/APU_Sweep), [APU Length Counter](https://www.nesdev.org/wiki/APU_Length_Counter)

use log::trace;

/// NTSC CPU clock in Hz.
pub const CPU_CLOCK_HZ: f32 = 1_789_773.0;

/// CPU cycles between half-frame clocks (half of the 4-step sequence length).
pub const HALF_FRAME_CYCLES: usize = 29830 / 2;

/// Length counter lookup table: 5-bit index from register → count. APU_Length_Counter.
const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Noise channel period table (NTSC): 4-bit index from $400E → period in CPU cycles. APU_Noise.
const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Timer periods outside this range mute a pulse channel.
const PULSE_MIN_PERIOD: u16 = 8;
const PULSE_MAX_PERIOD: u16 = 0x7FF;

const STATUS_REGISTER: u16 = 0x4015;
const FRAME_COUNTER_REGISTER: u16 = 0x4017;

fn length_for(data: u8) -> u8 {
    LENGTH_TABLE[(data >> 3) as usize & 0x1F]
}

// -----------------------------------------------------------------------------
// Voice output: what the host synthesiser plays for each channel
// -----------------------------------------------------------------------------

/// Pulse duty cycle selected by bits 6–7 of $4000/$4004.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Duty {
    #[default]
    Eighth,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Duty {
    fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Duty::Eighth,
            1 => Duty::Quarter,
            2 => Duty::Half,
            _ => Duty::ThreeQuarters,
        }
    }

    /// Fraction of the period spent high.
    pub fn fraction(self) -> f32 {
        match self {
            Duty::Eighth => 0.125,
            Duty::Quarter => 0.25,
            Duty::Half => 0.5,
            Duty::ThreeQuarters => 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Pulse(Duty),
    Triangle,
    Noise,
}

impl Waveform {
    /// Amplitude in -1.0..=1.0 at `phase` (in periods; only the fractional part matters).
    pub fn sample(self, phase: f32) -> f32 {
        let phase = phase.rem_euclid(1.0);
        match self {
            Waveform::Pulse(duty) => {
                if phase < duty.fraction() {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Noise => 0.0,
        }
    }
}

/// One channel as seen by the synthesiser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub frequency: f32,
    pub waveform: Waveform,
    pub active: bool,
    /// 0.0–1.0.
    pub volume: f32,
    /// Length counter value.
    pub remaining: u8,
}

impl Voice {
    pub const SILENT: Voice = Voice {
        frequency: 0.0,
        waveform: Waveform::Noise,
        active: false,
        volume: 0.0,
        remaining: 0,
    };
}

impl Default for Voice {
    fn default() -> Self {
        Self::SILENT
    }
}

// -----------------------------------------------------------------------------
// Pulse channel ($4000–$4003 = pulse 1, $4004–$4007 = pulse 2)
// Duty, constant volume, sweep, length counter, 11-bit timer period.
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Pulse {
    enabled: bool,
    duty: Duty,
    length_halt: bool,
    constant_volume: bool,
    volume: u8,
    sweep_enable: bool,
    sweep_rate: u8,
    sweep_negate: bool,
    sweep_shift: u8,
    sweep_divider: u8,
    period: u16,
    length_counter: u8,
}

impl Pulse {
    /// $4000/$4004: duty, length halt, constant volume, volume.
    fn write_4000(&mut self, data: u8) {
        self.duty = Duty::from_bits(data >> 6);
        self.length_halt = data & 0x20 != 0;
        self.constant_volume = data & 0x10 != 0;
        self.volume = data & 0x0F;
    }

    /// $4001/$4005: sweep enable, rate, negate, shift.
    fn write_4001(&mut self, data: u8) {
        self.sweep_enable = data & 0x80 != 0;
        self.sweep_rate = (data >> 4) & 7;
        self.sweep_negate = data & 0x08 != 0;
        self.sweep_shift = data & 7;
        self.sweep_divider = self.sweep_rate;
    }

    /// $4002/$4006: timer low 8 bits.
    fn write_4002(&mut self, data: u8) {
        self.period = (self.period & 0x0700) | data as u16;
    }

    /// $4003/$4007: timer high 3 bits, length counter load.
    fn write_4003(&mut self, data: u8) {
        self.period = (self.period & 0x00FF) | ((data & 7) as u16) << 8;
        if self.enabled {
            self.length_counter = length_for(data);
        }
    }

    fn clock_length(&mut self) {
        if !self.length_halt && self.length_counter > 0 {
            self.length_counter -= 1;
        }
    }

    fn clock_sweep(&mut self) {
        if self.sweep_divider > 0 {
            self.sweep_divider -= 1;
            return;
        }
        self.sweep_divider = self.sweep_rate;
        if self.sweep_enable && self.sweep_shift > 0 {
            let delta = self.period >> self.sweep_shift;
            self.period = if self.sweep_negate {
                self.period.saturating_sub(delta)
            } else {
                self.period.saturating_add(delta)
            };
        }
    }

    fn muted(&self) -> bool {
        !(PULSE_MIN_PERIOD..=PULSE_MAX_PERIOD).contains(&self.period)
    }

    fn frequency(&self) -> f32 {
        CPU_CLOCK_HZ / (16.0 * (self.period as f32 + 1.0))
    }

    fn voice(&self) -> Voice {
        Voice {
            frequency: self.frequency(),
            waveform: Waveform::Pulse(self.duty),
            active: self.enabled && self.length_counter > 0 && !self.muted(),
            volume: volume_level(self.constant_volume, self.volume),
            remaining: self.length_counter,
        }
    }
}

/// Constant-volume channels play at `volume / 15`; envelope mode plays at full level.
fn volume_level(constant_volume: bool, volume: u8) -> f32 {
    if constant_volume {
        volume as f32 / 15.0
    } else {
        1.0
    }
}

// -----------------------------------------------------------------------------
// Triangle channel ($4008–$400B): length counter, 11-bit period, one octave below pulse
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Triangle {
    enabled: bool,
    length_halt: bool,
    period: u16,
    length_counter: u8,
}

impl Triangle {
    /// $4008: length halt (bit 7). The linear counter load is latched but unused.
    fn write_4008(&mut self, data: u8) {
        self.length_halt = data & 0x80 != 0;
    }

    /// $400A: timer low 8 bits.
    fn write_400a(&mut self, data: u8) {
        self.period = (self.period & 0x0700) | data as u16;
    }

    /// $400B: timer high 3 bits, length counter load.
    fn write_400b(&mut self, data: u8) {
        self.period = (self.period & 0x00FF) | ((data & 7) as u16) << 8;
        if self.enabled {
            self.length_counter = length_for(data);
        }
    }

    fn clock_length(&mut self) {
        if !self.length_halt && self.length_counter > 0 {
            self.length_counter -= 1;
        }
    }

    fn voice(&self) -> Voice {
        Voice {
            frequency: CPU_CLOCK_HZ / (32.0 * (self.period as f32 + 1.0)),
            waveform: Waveform::Triangle,
            active: self.enabled && self.length_counter > 0,
            volume: 1.0,
            remaining: self.length_counter,
        }
    }
}

// -----------------------------------------------------------------------------
// Noise channel ($400C–$400F): counters only, the waveform is silent
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Noise {
    enabled: bool,
    length_halt: bool,
    constant_volume: bool,
    volume: u8,
    period_index: u8,
    length_counter: u8,
}

impl Noise {
    /// $400C: length halt, constant volume, volume.
    fn write_400c(&mut self, data: u8) {
        self.length_halt = data & 0x20 != 0;
        self.constant_volume = data & 0x10 != 0;
        self.volume = data & 0x0F;
    }

    /// $400E: period index (bits 0–3).
    fn write_400e(&mut self, data: u8) {
        self.period_index = data & 0x0F;
    }

    /// $400F: length counter load.
    fn write_400f(&mut self, data: u8) {
        if self.enabled {
            self.length_counter = length_for(data);
        }
    }

    fn clock_length(&mut self) {
        if !self.length_halt && self.length_counter > 0 {
            self.length_counter -= 1;
        }
    }

    fn voice(&self) -> Voice {
        let period = NOISE_PERIOD_TABLE[self.period_index as usize];
        Voice {
            frequency: CPU_CLOCK_HZ / period as f32,
            waveform: Waveform::Noise,
            active: self.enabled && self.length_counter > 0,
            volume: volume_level(self.constant_volume, self.volume),
            remaining: self.length_counter,
        }
    }
}

// -----------------------------------------------------------------------------
// APU: register dispatch, half-frame clock, voice snapshot
// -----------------------------------------------------------------------------

pub struct APU {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    /// Last value written to each register, for read-back.
    registers: [u8; 0x18],
    frame_cycles: usize,
}

impl Default for APU {
    fn default() -> Self {
        Self::new()
    }
}

impl APU {
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::default(),
            pulse2: Pulse::default(),
            triangle: Triangle::default(),
            noise: Noise::default(),
            registers: [0; 0x18],
            frame_cycles: 0,
        }
    }

    /// Write to APU registers. $4000–$4013 = channel regs; $4015 = channel enables; $4017 is
    /// latched only.
    pub fn write(&mut self, addr: u16, data: u8) {
        if let Some(latch) = self.registers.get_mut(addr.wrapping_sub(0x4000) as usize) {
            *latch = data;
        }
        match addr {
            0x4000 => self.pulse1.write_4000(data),
            0x4001 => self.pulse1.write_4001(data),
            0x4002 => self.pulse1.write_4002(data),
            0x4003 => self.pulse1.write_4003(data),
            0x4004 => self.pulse2.write_4000(data),
            0x4005 => self.pulse2.write_4001(data),
            0x4006 => self.pulse2.write_4002(data),
            0x4007 => self.pulse2.write_4003(data),
            0x4008 => self.triangle.write_4008(data),
            0x400A => self.triangle.write_400a(data),
            0x400B => self.triangle.write_400b(data),
            0x400C => self.noise.write_400c(data),
            0x400E => self.noise.write_400e(data),
            0x400F => self.noise.write_400f(data),
            STATUS_REGISTER => self.write_status(data),
            FRAME_COUNTER_REGISTER => trace!("frame counter mode ${data:02X} latched"),
            _ => trace!("write ${data:02X} to unmodelled APU register ${addr:04X}"),
        }
    }

    /// $4015 write: bits 0–3 enable pulse1, pulse2, triangle, noise. Disabling a channel
    /// clears its length counter.
    fn write_status(&mut self, data: u8) {
        self.pulse1.enabled = data & 1 != 0;
        self.pulse2.enabled = data & 2 != 0;
        self.triangle.enabled = data & 4 != 0;
        self.noise.enabled = data & 8 != 0;
        if !self.pulse1.enabled {
            self.pulse1.length_counter = 0;
        }
        if !self.pulse2.enabled {
            self.pulse2.length_counter = 0;
        }
        if !self.triangle.enabled {
            self.triangle.length_counter = 0;
        }
        if !self.noise.enabled {
            self.noise.length_counter = 0;
        }
    }

    /// $4015 reports which length counters are non-zero; any other register returns the
    /// last value written to it.
    pub fn read(&self, addr: u16) -> u8 {
        if addr == STATUS_REGISTER {
            return self.read_status();
        }
        self.registers
            .get(addr.wrapping_sub(0x4000) as usize)
            .copied()
            .unwrap_or(0)
    }

    fn read_status(&self) -> u8 {
        [
            self.pulse1.length_counter,
            self.pulse2.length_counter,
            self.triangle.length_counter,
            self.noise.length_counter,
        ]
        .iter()
        .enumerate()
        .filter(|(_, length)| **length > 0)
        .fold(0, |status, (bit, _)| status | 1u8 << bit)
    }

    /// Advance by `cycles` CPU cycles, clocking a half frame every [`HALF_FRAME_CYCLES`].
    pub fn run(&mut self, cycles: usize) {
        self.frame_cycles += cycles;
        while self.frame_cycles >= HALF_FRAME_CYCLES {
            self.frame_cycles -= HALF_FRAME_CYCLES;
            self.clock_half_frame();
        }
    }

    /// Half-frame: clock length counters and sweep units.
    fn clock_half_frame(&mut self) {
        self.pulse1.clock_length();
        self.pulse2.clock_length();
        self.triangle.clock_length();
        self.noise.clock_length();
        self.pulse1.clock_sweep();
        self.pulse2.clock_sweep();
    }

    /// Snapshot of pulse 1, pulse 2, triangle and noise.
    pub fn voices(&self) -> [Voice; 4] {
        [
            self.pulse1.voice(),
            self.pulse2.voice(),
            self.triangle.voice(),
            self.noise.voice(),
        ]
    }
}
