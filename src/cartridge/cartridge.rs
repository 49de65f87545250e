//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) format: 16-byte header (magic "NES\x1A",
//! PRG size in 16 KiB units, CHR size in 8 KiB units, flags 6–7 for mirroring, trainer and
//! mapper), an optional 512-byte trainer, then PRG ROM, then CHR ROM. Only mapper 0 boards are
//! emulated; other mapper numbers load with a warning.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::cartridge::Mirroring;

const HEADER_LEN: usize = 16;
const TRAINER_LEN: usize = 512;
const PRG_BANK_LEN: usize = 16 * 1024;
const CHR_BANK_LEN: usize = 8 * 1024;
const MAGIC: [u8; 4] = *b"NES\x1A";

const FLAG6_VERTICAL: u8 = 0x01;
const FLAG6_TRAINER: u8 = 0x04;

/// Error returned when a cartridge image cannot be loaded.
#[derive(Debug)]
pub enum CartridgeError {
    /// The file could not be read.
    Io(std::io::Error),
    /// Fewer bytes than the 16-byte header.
    TooShort(usize),
    /// The first four bytes are not `NES\x1A`.
    BadMagic([u8; 4]),
    /// The header declares zero PRG banks.
    NoProgramRom,
    /// The header declares more PRG/CHR data than the image holds.
    Truncated {
        /// Bytes the header requires
        expected: usize,
        /// Bytes actually present
        actual: usize,
    },
}

impl std::fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CartridgeError::Io(err) => write!(f, "cannot read cartridge: {err}"),
            CartridgeError::TooShort(len) => {
                write!(f, "cartridge is {len} bytes, shorter than the {HEADER_LEN}-byte header")
            }
            CartridgeError::BadMagic(magic) => {
                write!(f, "not an iNES image (magic {magic:02X?})")
            }
            CartridgeError::NoProgramRom => write!(f, "header declares no PRG ROM"),
            CartridgeError::Truncated { expected, actual } => write!(
                f,
                "cartridge truncated: header requires {expected} bytes, image has {actual}"
            ),
        }
    }
}

impl std::error::Error for CartridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CartridgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CartridgeError {
    fn from(err: std::io::Error) -> Self {
        CartridgeError::Io(err)
    }
}

/// Parsed cartridge: PRG ROM for the CPU, CHR data for the PPU pattern tables.
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub prg_rom: Vec<u8>,
    /// Pattern data; 8 KiB of zeroed RAM when the image has no CHR banks.
    pub chr: Vec<u8>,
    pub chr_is_ram: bool,
    pub mirroring: Mirroring,
    /// Mapper number from flags 6–7 (only 0 is emulated).
    pub mapper: u8,
}

impl Cartridge {
    /// Load a cartridge from an iNES file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        info!("loading {} ({} bytes)", path.display(), data.len());
        Self::from_bytes(&data)
    }

    /// Parse an iNES image. Header bytes 4–5 = PRG/CHR size; byte 6 bit 0 = vertical
    /// mirroring, bit 2 = trainer present; mapper number = high nibbles of bytes 6 and 7.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::TooShort(data.len()));
        }
        let magic = [data[0], data[1], data[2], data[3]];
        if magic != MAGIC {
            return Err(CartridgeError::BadMagic(magic));
        }

        let prg_banks = data[4] as usize;
        let chr_banks = data[5] as usize;
        if prg_banks == 0 {
            return Err(CartridgeError::NoProgramRom);
        }

        let flags6 = data[6];
        let mapper = (flags6 >> 4) | (data[7] & 0xF0);
        if mapper != 0 {
            warn!("mapper {mapper} is not supported, loading as NROM");
        }
        let mirroring = if flags6 & FLAG6_VERTICAL != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let prg_start = HEADER_LEN
            + if flags6 & FLAG6_TRAINER != 0 {
                TRAINER_LEN
            } else {
                0
            };
        let prg_end = prg_start + prg_banks * PRG_BANK_LEN;
        let chr_end = prg_end + chr_banks * CHR_BANK_LEN;
        if data.len() < chr_end {
            return Err(CartridgeError::Truncated {
                expected: chr_end,
                actual: data.len(),
            });
        }

        let prg_rom = data[prg_start..prg_end].to_vec();
        let chr_is_ram = chr_banks == 0;
        let chr = if chr_is_ram {
            vec![0; CHR_BANK_LEN]
        } else {
            data[prg_end..chr_end].to_vec()
        };

        info!(
            "cartridge: {} KiB PRG, {} KiB CHR {}, {:?} mirroring",
            prg_rom.len() / 1024,
            chr.len() / 1024,
            if chr_is_ram { "RAM" } else { "ROM" },
            mirroring
        );

        Ok(Self {
            prg_rom,
            chr,
            chr_is_ram,
            mirroring,
            mapper,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prg_banks: u8, chr_banks: u8, flags6: u8) -> Vec<u8> {
        let mut data = vec![b'N', b'E', b'S', 0x1A, prg_banks, chr_banks, flags6];
        data.resize(HEADER_LEN, 0);
        if flags6 & FLAG6_TRAINER != 0 {
            data.extend(std::iter::repeat_n(0xEE, TRAINER_LEN));
        }
        data.extend(std::iter::repeat_n(0xAA, prg_banks as usize * PRG_BANK_LEN));
        data.extend(std::iter::repeat_n(0xCC, chr_banks as usize * CHR_BANK_LEN));
        data
    }

    #[test]
    fn parses_prg_and_chr_rom() {
        let cart = Cartridge::from_bytes(&image(2, 1, 0x01)).unwrap();
        assert_eq!(cart.prg_rom.len(), 2 * PRG_BANK_LEN);
        assert_eq!(cart.chr.len(), CHR_BANK_LEN);
        assert!(cart.chr.iter().all(|b| *b == 0xCC));
        assert!(!cart.chr_is_ram);
        assert_eq!(cart.mirroring, Mirroring::Vertical);
        assert_eq!(cart.mapper, 0);
    }

    #[test]
    fn zero_chr_banks_gives_chr_ram() {
        let cart = Cartridge::from_bytes(&image(1, 0, 0x00)).unwrap();
        assert!(cart.chr_is_ram);
        assert_eq!(cart.chr, vec![0; CHR_BANK_LEN]);
        assert_eq!(cart.mirroring, Mirroring::Horizontal);
    }

    #[test]
    fn trainer_is_skipped() {
        let cart = Cartridge::from_bytes(&image(1, 1, FLAG6_TRAINER)).unwrap();
        assert!(cart.prg_rom.iter().all(|b| *b == 0xAA));
    }

    #[test]
    fn unsupported_mapper_still_loads() {
        let cart = Cartridge::from_bytes(&image(1, 1, 0x10)).unwrap();
        assert_eq!(cart.mapper, 1);
    }

    #[test]
    fn rejects_bad_images() {
        assert!(matches!(
            Cartridge::from_bytes(b"NES\x1A"),
            Err(CartridgeError::TooShort(4))
        ));

        let mut bad = image(1, 0, 0);
        bad[3] = 0;
        assert!(matches!(
            Cartridge::from_bytes(&bad),
            Err(CartridgeError::BadMagic([b'N', b'E', b'S', 0]))
        ));

        assert!(matches!(
            Cartridge::from_bytes(&image(0, 1, 0)),
            Err(CartridgeError::NoProgramRom)
        ));

        let mut short = image(1, 1, 0);
        short.truncate(short.len() - 1);
        let err = Cartridge::from_bytes(&short).unwrap_err();
        assert!(matches!(
            err,
            CartridgeError::Truncated { expected, actual } if expected == actual + 1
        ));
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Cartridge::load("/nonexistent/famicore/rom.nes").unwrap_err();
        assert!(matches!(err, CartridgeError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
