use tracing::warn;

use crate::error::{ProjectError, Result};
use crate::family::Family;
use crate::project::types::{
    Block, BlockPlatform, BlockType, GLYPH_LEN, Keys, Map, NO_SCREEN, Object, ObjectPlatform,
    PALETTE_LEN, Screen, Sprite, SpriteInfo, SpritePlatform, Window,
};
use crate::project::Project;

const MAX_RECORDS: usize = u8::MAX as usize;
const OBJECT_HEADER_LEN: usize = 4;

/// Decimal byte token. Non-numeric tokens read as 0; out-of-range values wrap.
pub fn parse_byte(token: &str) -> u8 {
    token.parse::<i64>().map_or(0, |v| v as u8)
}

fn bytes_of<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<u8> {
    lines
        .into_iter()
        .flat_map(str::split_whitespace)
        .map(parse_byte)
        .collect()
}

/// Tokens following `keyword` on a directive line.
fn args_after<'a>(line: &'a str, keyword: &str) -> Vec<&'a str> {
    match line.find(keyword) {
        Some(at) => line[at + keyword.len()..].split_whitespace().collect(),
        None => Vec::new(),
    }
}

fn next_id(family: Family, len: usize) -> Result<u8> {
    if len >= MAX_RECORDS {
        return Err(ProjectError::TooManyRecords {
            family,
            count: len + 1,
        });
    }
    Ok(len as u8)
}

// --- Single-line directives ---

/// `DEFINEWINDOW top left height width`. A well-formed line also clears
/// screens and their placements.
pub fn import_window(project: &mut Project, line: &str) -> bool {
    let args = args_after(line, "DEFINEWINDOW");
    let [top, left, height, width] = args.as_slice() else {
        warn!(line, "malformed window directive");
        return false;
    };
    project.window = Window {
        top: parse_byte(top),
        left: parse_byte(left),
        height: parse_byte(height),
        width: parse_byte(width),
    };
    project.screens.clear();
    project.sprite_info.clear();
    project.state.window = true;
    true
}

/// `DEFINECONTROLS` followed by numbers or quoted single characters.
pub fn import_keys(project: &mut Project, line: &str) {
    let rest = line
        .find("DEFINECONTROLS")
        .map_or(line, |at| &line[at + "DEFINECONTROLS".len()..]);

    let mut codes = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            let quoted: String = chars.by_ref().take_while(|&q| q != '\'').collect();
            if let Some(first) = quoted.chars().next() {
                codes.push(first as u32 as u8);
            }
        } else if c.is_ascii_digit() {
            let mut number = String::from(c);
            while let Some(&d) = chars.peek() {
                if !d.is_ascii_digit() {
                    break;
                }
                number.push(d);
                chars.next();
            }
            codes.push(parse_byte(&number));
        }
    }

    project.keys = Keys { codes };
    project.state.keys = true;
}

// --- Buffered directives ---

/// `DEFINEBLOCK <TYPENAME>` then 8 pixel rows and the attribute.
pub fn import_block(project: &mut Project, lines: &[String]) -> Result<()> {
    let Some((header, body)) = lines.split_first() else {
        return Ok(());
    };
    let kind = args_after(header, "DEFINEBLOCK")
        .first()
        .map_or(BlockType::Empty, |name| BlockType::from_name(name));

    let mut spectrum = bytes_of(body.iter().map(String::as_str));
    spectrum.resize(BlockPlatform::Spectrum.size(), 0);

    let id = next_id(Family::Blocks, project.blocks.len())?;
    let mut block = Block::new(id, kind);
    block.set_spectrum(spectrum);
    project.blocks.push(block);
    project.state.blocks = true;
    Ok(())
}

/// `DEFINESPRITE <frames>` then 32 bytes per frame. Frame data is fitted
/// to the declared frame count.
pub fn import_sprite(project: &mut Project, lines: &[String]) -> Result<()> {
    let Some((header, body)) = lines.split_first() else {
        return Ok(());
    };
    let frames = args_after(header, "DEFINESPRITE")
        .first()
        .map_or(1, |n| parse_byte(n));

    let data = bytes_of(body.iter().map(String::as_str));
    let frame_len = SpritePlatform::Spectrum.frame_size();
    let id = next_id(Family::Sprites, project.sprites.len())?;
    let mut sprite = Sprite::new(id, frames);
    for (frame, chunk) in sprite
        .spectrum_frames_mut()
        .iter_mut()
        .zip(data.chunks(frame_len))
    {
        frame[..chunk.len()].copy_from_slice(chunk);
    }
    project.sprites.push(sprite);
    project.state.sprites = true;
    Ok(())
}

/// `DEFINEOBJECT a b c d` then 32 image bytes; the primary array is the
/// four header bytes followed by the image.
pub fn import_object(project: &mut Project, lines: &[String]) -> Result<()> {
    let Some((header, body)) = lines.split_first() else {
        return Ok(());
    };
    let mut spectrum: Vec<u8> = args_after(header, "DEFINEOBJECT")
        .into_iter()
        .take(OBJECT_HEADER_LEN)
        .map(parse_byte)
        .collect();
    spectrum.resize(OBJECT_HEADER_LEN, 0);
    spectrum.extend(bytes_of(body.iter().map(String::as_str)));
    spectrum.resize(ObjectPlatform::Spectrum.size(), 0);

    let id = next_id(Family::Objects, project.objects.len())?;
    let mut object = Object::new(id);
    object.platforms[0] = spectrum;
    project.objects.push(object);
    project.state.objects = true;
    Ok(())
}

/// `DEFINESCREEN` then grid rows and `SPRITEPOSITION type image x y` lines.
/// Returns the new screen's index.
pub fn import_screen(project: &mut Project, lines: &[String]) -> Result<usize> {
    let index = project.screens.len();
    let id = next_id(Family::Screens, index)?;

    let mut rows = Vec::new();
    let mut placements = Vec::new();
    for line in lines {
        if line.contains("SPRITEPOSITION") {
            let args: Vec<u8> = args_after(line, "SPRITEPOSITION")
                .into_iter()
                .map(parse_byte)
                .collect();
            let &[kind, image, x, y] = args.as_slice() else {
                warn!(line = %line, "malformed sprite position");
                continue;
            };
            placements.push(SpriteInfo {
                kind,
                image,
                unknown: SpriteInfo::IMPORTED_UNKNOWN,
                screen: id,
                x,
                y,
            });
            continue;
        }
        let line = line.replace("DEFINESCREEN", "");
        if line.trim().is_empty() {
            continue;
        }
        rows.push(bytes_of([line.as_str()]));
    }

    project.screens.push(Screen { id, rows });
    project.sprite_info.extend(placements);
    project.state.screens = true;
    Ok(index)
}

/// Shift every non-empty cell of one screen by `offset`.
pub fn offset_screen_blocks(screen: &mut Screen, offset: u8) {
    for cell in screen.rows.iter_mut().flatten() {
        if *cell != 0 {
            *cell = cell.wrapping_add(offset);
        }
    }
}

/// `MAP` / `WIDTH n` / `STARTSCREEN n` / rows / `ENDMAP`. Replaces the map.
pub fn import_map(project: &mut Project, lines: &[String]) {
    let mut width = None;
    let mut start_screen = 0u8;
    let mut grid: Vec<Vec<u8>> = Vec::new();

    for line in lines {
        let line = line.trim();
        let line = line.strip_prefix("MAP").map_or(line, str::trim);
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("WIDTH") {
            width = rest.split_whitespace().next().map(parse_byte);
        } else if let Some(rest) = line.strip_prefix("STARTSCREEN") {
            start_screen = rest.split_whitespace().next().map_or(0, parse_byte);
        } else if line.starts_with("ENDMAP") {
            break;
        } else {
            grid.push(bytes_of([line]));
        }
    }

    let width = width.unwrap_or_else(|| grid.iter().map(Vec::len).max().unwrap_or(0) as u8);
    for row in &mut grid {
        row.resize(width as usize, NO_SCREEN);
    }

    let mut map = Map {
        height: grid.len() as u8,
        width,
        start_row: 0,
        start_col: 0,
        start_screen,
        grid,
    };
    if let Some((row, col)) = map.locate(start_screen) {
        map.start_row = row;
        map.start_col = col;
    } else {
        warn!(start_screen, "start screen not found on map");
    }
    project.map = map;
    project.state.map = true;
}

/// `DEFINEFONT` then one glyph per line, written from glyph 0.
pub fn import_font(project: &mut Project, lines: &[String]) {
    let mut glyph = 0;
    for line in lines {
        let line = line.replace("DEFINEFONT", "");
        let data = bytes_of([line.as_str()]);
        if data.is_empty() {
            continue;
        }
        let Some(slot) = project.font.glyphs.get_mut(glyph) else {
            warn!(glyph, "font has more glyphs than the table holds");
            break;
        };
        let take = data.len().min(GLYPH_LEN);
        *slot = [0u8; GLYPH_LEN];
        slot[..take].copy_from_slice(&data[..take]);
        glyph += 1;
    }
    project.state.font = true;
}

/// `DEFINEPALETTE` then up to 16 colours written from colour 0.
pub fn import_palette(project: &mut Project, lines: &[String]) {
    let values = bytes_of(lines.iter().map(|l| l.as_str()).map(|l| {
        l.find("DEFINEPALETTE")
            .map_or(l, |at| &l[at + "DEFINEPALETTE".len()..])
    }));
    for (slot, value) in project.palette.colors.iter_mut().zip(values).take(PALETTE_LEN) {
        *slot = value;
    }
    project.state.palette = true;
}
