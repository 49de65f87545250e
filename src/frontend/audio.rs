//! Tone synthesiser for the APU voices, played through rodio.
//!
//! The emulation thread stores a fresh `[Voice; 4]` once per frame; [`Synth`] runs on the audio
//! thread and renders those voices as interleaved stereo `f32` samples.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rodio::Source;

use crate::apu::apu::Voice;

pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNELS: u16 = 2;

/// Voice snapshot shared between the emulation loop and the audio thread.
pub type SharedVoices = Arc<Mutex<[Voice; 4]>>;

/// Frames rendered between re-reads of the shared voices.
const REFRESH_FRAMES: usize = 256;

pub fn shared_voices() -> SharedVoices {
    Arc::new(Mutex::new([Voice::SILENT; 4]))
}

/// Endless rodio source mixing the shared voices.
pub struct Synth {
    voices: SharedVoices,
    snapshot: [Voice; 4],
    phases: [f32; 4],
    gain: f32,
    /// Right-channel copy of the frame whose left sample was just emitted.
    pending: Option<f32>,
    until_refresh: usize,
}

impl Synth {
    pub fn new(voices: SharedVoices, gain: f32) -> Self {
        Self {
            voices,
            snapshot: [Voice::SILENT; 4],
            phases: [0.0; 4],
            gain: gain.clamp(0.0, 1.0),
            pending: None,
            until_refresh: 0,
        }
    }

    fn refresh(&mut self) {
        // A poisoned lock keeps the previous snapshot.
        if let Ok(voices) = self.voices.lock() {
            self.snapshot = *voices;
        }
        self.until_refresh = REFRESH_FRAMES;
    }

    /// Next mono frame, in -gain..=gain.
    fn next_frame(&mut self) -> f32 {
        if self.until_refresh == 0 {
            self.refresh();
        }
        self.until_refresh -= 1;

        let mut mix = 0.0;
        for (voice, phase) in self.snapshot.iter().zip(self.phases.iter_mut()) {
            if !voice.active {
                continue;
            }
            mix += voice.waveform.sample(*phase) * voice.volume;
            *phase = (*phase + voice.frequency / SAMPLE_RATE as f32).fract();
        }
        mix / self.snapshot.len() as f32 * self.gain
    }
}

impl Iterator for Synth {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if let Some(right) = self.pending.take() {
            return Some(right);
        }
        let frame = self.next_frame();
        self.pending = Some(frame);
        Some(frame)
    }
}

impl Source for Synth {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
