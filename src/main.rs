//! NES emulator entry point.
//!
//! Loads a cartridge and runs it in a window with audio.
//! Usage: famicore [--scale N] [--volume V] [--mute] [--trace] path/to/game.nes
//! P pauses and resumes, Escape quits.

use ansi_term::Colour::Red;
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, info};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use rodio::{OutputStream, OutputStreamHandle, Sink};

use famicore::{
    Cartridge, Nes,
    apu::apu::Voice,
    config::Config,
    frontend::{
        audio::{SharedVoices, Synth, shared_voices},
        input::{self, Pause},
        video,
    },
    ppu::layer::{HEIGHT, WIDTH},
};

fn main() {
    let config = Config::parse();
    init_logging(&config);

    if let Err(err) = run(&config) {
        eprintln!("{} {err:#}", Red.bold().paint("error:"));
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if config.trace {
        builder.filter_module("famicore::cpu", LevelFilter::Trace);
    }
    builder.init();
}

/// Keeps the output stream alive for as long as the sink plays.
struct Audio {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
}

fn start_audio(voices: &SharedVoices, volume: f32) -> Result<Audio> {
    let (stream, handle) = OutputStream::try_default().context("no audio output device")?;
    let sink = Sink::try_new(&handle).context("cannot create audio sink")?;
    sink.append(Synth::new(voices.clone(), volume));
    Ok(Audio {
        _stream: stream,
        _handle: handle,
        sink,
    })
}

fn run(config: &Config) -> Result<()> {
    let cart = Cartridge::load(&config.rom)
        .with_context(|| format!("cannot load {}", config.rom.display()))?;
    let mut nes = Nes::new(cart);

    let mut window = Window::new(
        "Famicore",
        WIDTH,
        HEIGHT,
        WindowOptions {
            scale: config.scale.into(),
            ..WindowOptions::default()
        },
    )
    .map_err(|e| anyhow!("cannot open window: {e}"))?;
    window.set_target_fps(config.fps);

    let voices = shared_voices();
    let audio = if config.mute {
        None
    } else {
        Some(start_audio(&voices, config.volume)?)
    };

    let mut buffer = vec![0u32; WIDTH * HEIGHT];
    let mut pause = Pause::default();
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let was_paused = pause.is_paused();
        if pause.update(&window.get_keys_pressed(KeyRepeat::No)) {
            if !was_paused {
                info!("paused at frame {}", nes.frame_count());
                if let Ok(mut shared) = voices.lock() {
                    *shared = [Voice::SILENT; 4];
                }
            }
            window.update();
            continue;
        }

        nes.set_buttons(input::buttons(&window));
        nes.run_frame();

        let (background, sprites) = nes.layers();
        video::compose(background, sprites, &mut buffer);
        window
            .update_with_buffer(&buffer, WIDTH, HEIGHT)
            .map_err(|e| anyhow!("cannot update window: {e}"))?;

        if let Ok(mut shared) = voices.lock() {
            *shared = nes.voices();
        }
    }

    if let Some(audio) = audio {
        audio.sink.stop();
    }
    info!("stopped after {} frames", nes.frame_count());
    Ok(())
}
