//! ROM container signatures

use crate::header::{HeaderSignature, SignatureKind};
use ox_core::config::RomFormat;

/// iNES header magic ("NES" + MS-DOS EOF)
pub const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// First bytes of the Nintendo logo in a Game Boy cartridge header
pub const GB_LOGO_PREFIX: [u8; 4] = [0xCE, 0xED, 0x66, 0x66];
pub const GB_LOGO_OFFSET: u64 = 0x104;

/// Fixed value in a Game Boy Advance cartridge header
pub const GBA_FIXED_BYTE: [u8; 1] = [0x96];
pub const GBA_FIXED_OFFSET: u64 = 0xB2;

pub const fn signature(format: RomFormat) -> HeaderSignature {
    let kind = SignatureKind::Rom(format);
    match format {
        RomFormat::Ines => HeaderSignature {
            kind,
            magic: &INES_MAGIC,
            offset: 0,
            length: INES_MAGIC.len(),
        },
        RomFormat::GameBoy => HeaderSignature {
            kind,
            magic: &GB_LOGO_PREFIX,
            offset: GB_LOGO_OFFSET,
            length: GB_LOGO_PREFIX.len(),
        },
        RomFormat::GameBoyAdvance => HeaderSignature {
            kind,
            magic: &GBA_FIXED_BYTE,
            offset: GBA_FIXED_OFFSET,
            length: GBA_FIXED_BYTE.len(),
        },
    }
}

/// File extension conventionally used for the format
pub fn extension(format: RomFormat) -> &'static str {
    match format {
        RomFormat::Ines => "nes",
        RomFormat::GameBoy => "gb",
        RomFormat::GameBoyAdvance => "gba",
    }
}
