use std::io::{self, Read, Write};

use tracing::warn;

use crate::error::{ProjectError, Result};
use crate::family::Family;
use crate::reader::LittleEndianReader;
use crate::writer::LittleEndianWriter;

use super::types::{
    ASM_PATH_LEN, Block, BlockPlatform, BlockType, FONT_GLYPHS, GLYPH_LEN, Header, KEY_COUNT,
    Keys, LIVES_SCORE_LEN, LivesScore, Map, Object, ObjectPlatform, PALETTE_LEN, Palette,
    SPRITE_INFO_END, Screen, Sprite, SpriteInfo, SpritePlatform, Window,
};

fn count_byte(family: Family, count: usize) -> Result<u8> {
    u8::try_from(count).map_err(|_| ProjectError::TooManyRecords { family, count })
}

// --- Section 1: Header (magic + version) ---

pub fn read_header<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Header> {
    let magic = r.read_array::<4>()?;
    let version = r.read_u32()?;
    Ok(Header { magic, version })
}

pub fn write_header<W: Write>(w: &mut LittleEndianWriter<W>, header: &Header) -> io::Result<()> {
    w.write_bytes(&header.magic)?;
    w.write_u32(header.version)
}

// --- Section 2: Window ---

pub fn read_window<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Window> {
    let [top, left, height, width] = r.read_array::<4>()?;
    Ok(Window {
        top,
        left,
        height,
        width,
    })
}

pub fn write_window<W: Write>(w: &mut LittleEndianWriter<W>, window: &Window) -> io::Result<()> {
    w.write_bytes(&[window.top, window.left, window.height, window.width])
}

// --- Section 3: Lives/score layout (10 bytes) ---

pub fn read_lives_score<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<LivesScore> {
    Ok(LivesScore {
        positions: r.read_array::<LIVES_SCORE_LEN>()?,
    })
}

pub fn write_lives_score<W: Write>(
    w: &mut LittleEndianWriter<W>,
    lives_score: &LivesScore,
) -> io::Result<()> {
    w.write_bytes(&lives_score.positions)
}

// --- Section 4: Keys (11 bytes) ---

pub fn read_keys<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Keys> {
    Ok(Keys {
        codes: r.read_bytes(KEY_COUNT)?,
    })
}

pub fn write_keys<W: Write>(w: &mut LittleEndianWriter<W>, keys: &Keys) -> io::Result<()> {
    w.write_fixed(&keys.codes, KEY_COUNT)
}

// --- Section 5: Blocks (count, type run, then one run per platform) ---

pub fn read_blocks<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Vec<Block>> {
    let count = r.read_u8()? as usize;
    let kinds = r.read_bytes(count)?;
    let mut blocks: Vec<Block> = kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| Block {
            id: i as u8,
            kind: BlockType::from_raw(kind),
            platforms: Vec::with_capacity(BlockPlatform::ALL.len()),
        })
        .collect();

    for platform in BlockPlatform::ALL {
        for block in &mut blocks {
            block.platforms.push(r.read_bytes(platform.size())?);
        }
    }
    Ok(blocks)
}

pub fn write_blocks<W: Write>(w: &mut LittleEndianWriter<W>, blocks: &[Block]) -> Result<()> {
    w.write_u8(count_byte(Family::Blocks, blocks.len())?)?;
    for block in blocks {
        w.write_u8(block.kind.raw())?;
    }
    for (p, platform) in BlockPlatform::ALL.iter().enumerate() {
        for block in blocks {
            let data = block.platforms.get(p).map(Vec::as_slice).unwrap_or(&[]);
            w.write_fixed(data, platform.size())?;
        }
    }
    Ok(())
}

// --- Section 6: Sprites (count, offset/frames run, then one run per platform) ---

pub fn read_sprites<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Vec<Sprite>> {
    let count = r.read_u8()? as usize;
    let mut sprites = Vec::with_capacity(count);
    for i in 0..count {
        let [offset, frames] = r.read_array::<2>()?;
        sprites.push(Sprite {
            id: i as u8,
            offset,
            frames,
            platforms: Vec::with_capacity(SpritePlatform::ALL.len()),
        });
    }

    for platform in SpritePlatform::ALL {
        for sprite in &mut sprites {
            let mut frames = Vec::with_capacity(sprite.frames as usize);
            for _ in 0..sprite.frames {
                frames.push(r.read_bytes(platform.frame_size())?);
            }
            sprite.platforms.push(frames);
        }
    }
    Ok(sprites)
}

/// Offsets are written cumulatively from the frame counts, whatever the
/// in-memory `offset` fields hold.
pub fn write_sprites<W: Write>(w: &mut LittleEndianWriter<W>, sprites: &[Sprite]) -> Result<()> {
    w.write_u8(count_byte(Family::Sprites, sprites.len())?)?;
    let mut offset = 0u8;
    for sprite in sprites {
        w.write_u8(offset)?;
        w.write_u8(sprite.frames)?;
        offset = offset.wrapping_add(sprite.frames);
    }

    for (p, platform) in SpritePlatform::ALL.iter().enumerate() {
        for sprite in sprites {
            let frames = sprite.platforms.get(p).map(Vec::as_slice).unwrap_or(&[]);
            for f in 0..sprite.frames as usize {
                let data = frames.get(f).map(Vec::as_slice).unwrap_or(&[]);
                w.write_fixed(data, platform.frame_size())?;
            }
        }
    }
    Ok(())
}

// --- Section 7: Objects (count, then one run per platform; no id run) ---

pub fn read_objects<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Vec<Object>> {
    let count = r.read_u8()? as usize;
    let mut objects: Vec<Object> = (0..count)
        .map(|i| Object {
            id: i as u8,
            platforms: Vec::with_capacity(ObjectPlatform::ALL.len()),
        })
        .collect();

    for platform in ObjectPlatform::ALL {
        for object in &mut objects {
            object.platforms.push(r.read_bytes(platform.size())?);
        }
    }
    Ok(objects)
}

pub fn write_objects<W: Write>(w: &mut LittleEndianWriter<W>, objects: &[Object]) -> Result<()> {
    w.write_u8(count_byte(Family::Objects, objects.len())?)?;
    for (p, platform) in ObjectPlatform::ALL.iter().enumerate() {
        for object in objects {
            let data = object.platforms.get(p).map(Vec::as_slice).unwrap_or(&[]);
            w.write_fixed(data, platform.size())?;
        }
    }
    Ok(())
}

// --- Section 8: Screens (count, then window-sized grids) ---

pub fn read_screens<R: Read>(
    r: &mut LittleEndianReader<R>,
    window: &Window,
) -> io::Result<Vec<Screen>> {
    let count = r.read_u8()? as usize;
    let mut screens = Vec::with_capacity(count);
    for i in 0..count {
        screens.push(Screen {
            id: i as u8,
            rows: r.read_grid(window.height as usize, window.width as usize)?,
        });
    }
    Ok(screens)
}

pub fn write_screens<W: Write>(
    w: &mut LittleEndianWriter<W>,
    screens: &[Screen],
    window: &Window,
) -> Result<()> {
    w.write_u8(count_byte(Family::Screens, screens.len())?)?;
    for screen in screens {
        w.write_grid(&screen.rows, window.height as usize, window.width as usize)?;
    }
    Ok(())
}

// --- Section 9: Map ---

pub fn read_map<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Map> {
    let [height, width, start_row, start_col] = r.read_array::<4>()?;
    let grid = r.read_grid(height as usize, width as usize)?;
    let mut map = Map {
        height,
        width,
        start_row,
        start_col,
        start_screen: 0,
        grid,
    };
    map.start_screen = map
        .cell(start_row as usize, start_col as usize)
        .unwrap_or(0);
    Ok(map)
}

pub fn write_map<W: Write>(w: &mut LittleEndianWriter<W>, map: &Map) -> io::Result<()> {
    w.write_bytes(&[map.height, map.width, map.start_row, map.start_col])?;
    w.write_grid(&map.grid, map.height as usize, map.width as usize)
}

// --- Section 10: Sprite placements (per screen, 0xFF terminated) ---

pub fn read_sprite_info<R: Read>(
    r: &mut LittleEndianReader<R>,
    screen_count: usize,
) -> io::Result<Vec<SpriteInfo>> {
    let mut placements = Vec::new();
    for screen in 0..screen_count {
        loop {
            let kind = r.read_u8()?;
            if kind == SPRITE_INFO_END {
                break;
            }
            let [image, unknown, x, y] = r.read_array::<4>()?;
            placements.push(SpriteInfo {
                kind,
                image,
                unknown,
                screen: screen as u8,
                x,
                y,
            });
        }
    }
    Ok(placements)
}

/// Placements are grouped per screen in screen order; entries naming a
/// screen that does not exist are dropped.
pub fn write_sprite_info<W: Write>(
    w: &mut LittleEndianWriter<W>,
    placements: &[SpriteInfo],
    screen_count: usize,
) -> io::Result<()> {
    let orphans = placements
        .iter()
        .filter(|p| p.screen as usize >= screen_count)
        .count();
    if orphans > 0 {
        warn!(orphans, screen_count, "dropping sprite placements for missing screens");
    }

    for screen in 0..screen_count {
        for p in placements.iter().filter(|p| p.screen as usize == screen) {
            w.write_bytes(&[p.kind, p.image, p.unknown, p.x, p.y])?;
        }
        w.write_u8(SPRITE_INFO_END)?;
    }
    Ok(())
}

// --- Section 11: Font (96 glyphs x 8 bytes) ---

pub fn read_font<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Vec<[u8; GLYPH_LEN]>> {
    let mut glyphs = Vec::with_capacity(FONT_GLYPHS);
    for _ in 0..FONT_GLYPHS {
        glyphs.push(r.read_array::<GLYPH_LEN>()?);
    }
    Ok(glyphs)
}

pub fn write_font<W: Write>(
    w: &mut LittleEndianWriter<W>,
    glyphs: &[[u8; GLYPH_LEN]],
) -> io::Result<()> {
    for i in 0..FONT_GLYPHS {
        let glyph = glyphs.get(i).copied().unwrap_or([0u8; GLYPH_LEN]);
        w.write_bytes(&glyph)?;
    }
    Ok(())
}

// --- Section 12: ULA palette (16 bytes) ---

pub fn read_palette<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Palette> {
    Ok(Palette {
        colors: r.read_array::<PALETTE_LEN>()?,
    })
}

pub fn write_palette<W: Write>(w: &mut LittleEndianWriter<W>, palette: &Palette) -> io::Result<()> {
    w.write_bytes(&palette.colors)
}

// --- Sections 13-14: Enterprise bias, asm path ---

pub fn read_enterprise_bias<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<u8> {
    r.read_u8()
}

pub fn write_enterprise_bias<W: Write>(w: &mut LittleEndianWriter<W>, bias: u8) -> io::Result<()> {
    w.write_u8(bias)
}

pub fn read_asm_path<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Vec<u8>> {
    r.read_padded(ASM_PATH_LEN)
}

pub fn write_asm_path<W: Write>(w: &mut LittleEndianWriter<W>, path: &[u8]) -> io::Result<()> {
    w.write_fixed(path, ASM_PATH_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_with<F>(f: F) -> Vec<u8>
    where
        F: FnOnce(&mut LittleEndianWriter<&mut Vec<u8>>),
    {
        let mut out = Vec::new();
        let mut w = LittleEndianWriter::new(&mut out);
        f(&mut w);
        out
    }

    #[test]
    fn blocks_are_platform_grouped() {
        let mut a = Block::new(0, BlockType::Wall);
        let mut b = Block::new(1, BlockType::Ladder);
        a.platforms[0] = vec![0xA0; 9];
        b.platforms[0] = vec![0xB0; 9];
        a.platforms[1] = vec![0xA1; 16];
        b.platforms[1] = vec![0xB1; 16];

        let bytes = encode_with(|w| write_blocks(w, &[a.clone(), b.clone()]).unwrap());
        assert_eq!(&bytes[..3], &[2, 2, 3]);
        assert_eq!(&bytes[3..12], &[0xA0; 9]);
        assert_eq!(&bytes[12..21], &[0xB0; 9]);
        assert_eq!(&bytes[21..37], &[0xA1; 16]);
        assert_eq!(&bytes[37..53], &[0xB1; 16]);
        assert_eq!(bytes.len(), 3 + 2 * (9 + 16 + 24 + 8 + 16 + 8));

        let decoded = read_blocks(&mut LittleEndianReader::new(&bytes[..])).unwrap();
        assert_eq!(decoded, vec![a, b]);
    }

    #[test]
    fn short_platform_arrays_are_zero_padded() {
        let mut block = Block::new(0, BlockType::Empty);
        block.platforms[0] = vec![1, 2, 3];
        block.platforms.truncate(1);
        let bytes = encode_with(|w| write_blocks(w, &[block]).unwrap());
        assert_eq!(bytes.len(), 2 + 81);
        assert_eq!(&bytes[2..11], &[1, 2, 3, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn sprite_offsets_are_rewritten_cumulatively() {
        let mut a = Sprite::new(0, 2);
        a.offset = 99;
        let b = Sprite::new(1, 3);
        let bytes = encode_with(|w| write_sprites(w, &[a, b]).unwrap());
        assert_eq!(&bytes[..5], &[2, 0, 2, 2, 3]);
        assert_eq!(bytes.len(), 5 + 5 * (32 + 32 + 80 + 32 + 32 + 16));
    }

    #[test]
    fn objects_have_no_id_run() {
        let bytes = encode_with(|w| write_objects(w, &[Object::new(0)]).unwrap());
        assert_eq!(bytes.len(), 1 + 36 + 35 + 67 + 35 + 67 + 35 + 19);
    }

    #[test]
    fn too_many_records_is_a_capacity_error() {
        let blocks: Vec<Block> = (0..256).map(|_| Block::new(0, BlockType::Empty)).collect();
        let mut out = Vec::new();
        let err = write_blocks(&mut LittleEndianWriter::new(&mut out), &blocks).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::TooManyRecords {
                family: Family::Blocks,
                count: 256
            }
        ));
    }

    #[test]
    fn sprite_info_terminates_every_screen() {
        let placements = [
            SpriteInfo {
                kind: 1,
                image: 2,
                unknown: 15,
                screen: 1,
                x: 8,
                y: 16,
            },
            SpriteInfo {
                kind: 3,
                image: 0,
                unknown: 15,
                screen: 5,
                x: 0,
                y: 0,
            },
        ];
        let bytes = encode_with(|w| write_sprite_info(w, &placements, 3).unwrap());
        assert_eq!(bytes, vec![0xFF, 1, 2, 15, 8, 16, 0xFF, 0xFF]);

        let decoded = read_sprite_info(&mut LittleEndianReader::new(&bytes[..]), 3).unwrap();
        assert_eq!(decoded, vec![placements[0]]);
    }

    #[test]
    fn map_start_screen_is_derived_from_grid() {
        let mut map = Map::blank();
        map.grid[4][7] = 3;
        let bytes = encode_with(|w| write_map(w, &map).unwrap());
        assert_eq!(bytes.len(), 4 + 160);

        let decoded = read_map(&mut LittleEndianReader::new(&bytes[..])).unwrap();
        assert_eq!(decoded.start_screen, 3);
        assert_eq!(decoded.grid, map.grid);
    }

    #[test]
    fn asm_path_is_padded_to_256() {
        let bytes = encode_with(|w| write_asm_path(w, b"C:\\agd\\game.asm").unwrap());
        assert_eq!(bytes.len(), ASM_PATH_LEN);
        let decoded = read_asm_path(&mut LittleEndianReader::new(&bytes[..])).unwrap();
        assert_eq!(decoded, b"C:\\agd\\game.asm".to_vec());
    }
}
