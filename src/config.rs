//! Command-line configuration for the desktop frontend.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Integer window scale applied to the 256×240 picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WindowScale {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
    #[value(name = "8")]
    X8,
}

impl From<WindowScale> for minifb::Scale {
    fn from(scale: WindowScale) -> Self {
        match scale {
            WindowScale::X1 => minifb::Scale::X1,
            WindowScale::X2 => minifb::Scale::X2,
            WindowScale::X4 => minifb::Scale::X4,
            WindowScale::X8 => minifb::Scale::X8,
        }
    }
}

/// NES-style console emulator
#[derive(Parser, Debug, Clone)]
#[command(name = "famicore", version)]
#[command(about = "Runs an iNES mapper-0 cartridge in a window", long_about = None)]
pub struct Config {
    /// Path to the iNES ROM file
    pub rom: PathBuf,

    /// Window scale factor
    #[arg(short, long, value_enum, default_value = "2")]
    pub scale: WindowScale,

    /// Master volume (0.0-1.0)
    #[arg(short, long, default_value_t = 0.25, value_parser = parse_volume)]
    pub volume: f32,

    /// Disable audio output
    #[arg(short, long)]
    pub mute: bool,

    /// Log every CPU instruction (very slow)
    #[arg(short, long)]
    pub trace: bool,

    /// Frame rate limit
    #[arg(long, default_value_t = 60)]
    pub fps: usize,
}

fn parse_volume(s: &str) -> Result<f32, String> {
    let volume: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err(format!("{volume} is outside 0.0-1.0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["famicore", "game.nes"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("game.nes"));
        assert_eq!(config.scale, WindowScale::X2);
        assert_eq!(config.volume, 0.25);
        assert!(!config.mute);
        assert!(!config.trace);
        assert_eq!(config.fps, 60);
    }

    #[test]
    fn flags() {
        let config = Config::try_parse_from([
            "famicore", "--scale", "4", "--volume", "0.5", "--mute", "--trace", "--fps", "30",
            "game.nes",
        ])
        .unwrap();
        assert_eq!(config.scale, WindowScale::X4);
        assert_eq!(config.volume, 0.5);
        assert!(config.mute);
        assert!(config.trace);
        assert_eq!(config.fps, 30);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::try_parse_from(["famicore"]).is_err());
        assert!(Config::try_parse_from(["famicore", "-s", "3", "game.nes"]).is_err());
        assert!(Config::try_parse_from(["famicore", "-v", "1.5", "game.nes"]).is_err());
    }
}
