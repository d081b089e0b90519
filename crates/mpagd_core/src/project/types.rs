use std::fmt;

use serde::{Deserialize, Serialize};

use crate::family::Family;

pub const MAGIC: [u8; 4] = [65, 71, 68, 42];
pub const DEFAULT_VERSION: u32 = 10;

pub const LIVES_SCORE_LEN: usize = 10;
pub const KEY_COUNT: usize = 11;
pub const FONT_GLYPHS: usize = 96;
pub const GLYPH_LEN: usize = 8;
pub const PALETTE_LEN: usize = 16;
pub const ASM_PATH_LEN: usize = 256;

/// Terminates the placement run of each screen.
pub const SPRITE_INFO_END: u8 = 0xFF;
/// Map cell with no screen.
pub const NO_SCREEN: u8 = 255;

/// Platform variants carried by every block, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPlatform {
    Spectrum,
    Timex,
    Cpc,
    Atom,
    Msx,
    AtomColour,
}

impl BlockPlatform {
    pub const ALL: [BlockPlatform; 6] = [
        Self::Spectrum,
        Self::Timex,
        Self::Cpc,
        Self::Atom,
        Self::Msx,
        Self::AtomColour,
    ];

    pub fn size(self) -> usize {
        match self {
            Self::Spectrum => 9,
            Self::Timex => 16,
            Self::Cpc => 24,
            Self::Atom => 8,
            Self::Msx => 16,
            Self::AtomColour => 8,
        }
    }
}

/// Platform variants carried by every sprite frame, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpritePlatform {
    Spectrum,
    Timex,
    Cpc,
    Atom,
    AtomColour,
    VzColour,
}

impl SpritePlatform {
    pub const ALL: [SpritePlatform; 6] = [
        Self::Spectrum,
        Self::Timex,
        Self::Cpc,
        Self::Atom,
        Self::AtomColour,
        Self::VzColour,
    ];

    pub fn frame_size(self) -> usize {
        match self {
            Self::Spectrum | Self::Timex | Self::Atom | Self::AtomColour => 32,
            Self::Cpc => 80,
            Self::VzColour => 16,
        }
    }
}

/// Platform variants carried by every object, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectPlatform {
    Spectrum,
    Timex,
    Cpc,
    Atom,
    Msx,
    AtomColour,
    VzColour,
}

impl ObjectPlatform {
    pub const ALL: [ObjectPlatform; 7] = [
        Self::Spectrum,
        Self::Timex,
        Self::Cpc,
        Self::Atom,
        Self::Msx,
        Self::AtomColour,
        Self::VzColour,
    ];

    pub fn size(self) -> usize {
        match self {
            Self::Spectrum => 36,
            Self::Timex | Self::Atom | Self::AtomColour => 35,
            Self::Cpc | Self::Msx => 67,
            Self::VzColour => 19,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    #[default]
    Empty,
    Platform,
    Wall,
    Ladder,
    Fodder,
    Deadly,
    Unknown(u8),
}

impl BlockType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Empty,
            1 => Self::Platform,
            2 => Self::Wall,
            3 => Self::Ladder,
            4 => Self::Fodder,
            5 => Self::Deadly,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::Empty => 0,
            Self::Platform => 1,
            Self::Wall => 2,
            Self::Ladder => 3,
            Self::Fodder => 4,
            Self::Deadly => 5,
            Self::Unknown(other) => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Empty => "EMPTYBLOCK",
            Self::Platform => "PLATFORMBLOCK",
            Self::Wall => "WALLBLOCK",
            Self::Ladder => "LADDERBLOCK",
            Self::Fodder => "FODDERBLOCK",
            Self::Deadly => "DEADLYBLOCK",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Unrecognised names map to `Empty`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "PLATFORMBLOCK" => Self::Platform,
            "WALLBLOCK" => Self::Wall,
            "LADDERBLOCK" => Self::Ladder,
            "FODDERBLOCK" => Self::Fodder,
            "DEADLYBLOCK" => Self::Deadly,
            _ => Self::Empty,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "UNKNOWN ({})", v),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: DEFAULT_VERSION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub top: u8,
    pub left: u8,
    pub height: u8,
    pub width: u8,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            top: 1,
            left: 2,
            height: 22,
            width: 22,
        }
    }
}

impl Window {
    pub fn blank_grid(&self) -> Vec<Vec<u8>> {
        vec![vec![0u8; self.width as usize]; self.height as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivesScore {
    pub positions: [u8; LIVES_SCORE_LEN],
}

impl Default for LivesScore {
    fn default() -> Self {
        Self {
            positions: [2, 25, 6, 25, 10, 25, 25, 25, 237, 25],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keys {
    pub codes: Vec<u8>,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            codes: vec![87, 83, 65, 68, 32, 74, 72, 49, 50, 51, 52],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: u8,
    pub kind: BlockType,
    /// One array per `BlockPlatform`, in `BlockPlatform::ALL` order.
    pub platforms: Vec<Vec<u8>>,
}

impl Block {
    pub fn new(id: u8, kind: BlockType) -> Self {
        Self {
            id,
            kind,
            platforms: BlockPlatform::ALL.iter().map(|p| vec![0u8; p.size()]).collect(),
        }
    }

    pub fn spectrum(&self) -> &[u8] {
        self.platforms.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_spectrum(&mut self, data: Vec<u8>) {
        if self.platforms.is_empty() {
            self.platforms.push(data);
        } else {
            self.platforms[0] = data;
        }
    }

    /// Colour attribute: last byte of the primary platform array.
    pub fn attribute(&self) -> u8 {
        self.spectrum()
            .get(BlockPlatform::Spectrum.size() - 1)
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub id: u8,
    /// Cumulative frame offset; recomputed on encode.
    pub offset: u8,
    pub frames: u8,
    /// For each `SpritePlatform`, one byte array per frame.
    pub platforms: Vec<Vec<Vec<u8>>>,
}

impl Sprite {
    pub fn new(id: u8, frames: u8) -> Self {
        Self {
            id,
            offset: 0,
            frames,
            platforms: SpritePlatform::ALL
                .iter()
                .map(|p| vec![vec![0u8; p.frame_size()]; frames as usize])
                .collect(),
        }
    }

    pub fn spectrum_frames(&self) -> &[Vec<u8>] {
        self.platforms.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn spectrum_frames_mut(&mut self) -> &mut Vec<Vec<u8>> {
        if self.platforms.is_empty() {
            self.platforms.push(Vec::new());
        }
        &mut self.platforms[0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: u8,
    /// One array per `ObjectPlatform`, in `ObjectPlatform::ALL` order.
    pub platforms: Vec<Vec<u8>>,
}

impl Object {
    pub fn new(id: u8) -> Self {
        Self {
            id,
            platforms: ObjectPlatform::ALL.iter().map(|p| vec![0u8; p.size()]).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub id: u8,
    /// Block indices, `window.height` rows of `window.width` cells.
    pub rows: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub height: u8,
    pub width: u8,
    pub start_row: u8,
    pub start_col: u8,
    /// Not stored on disk; derived from the grid at the start cell.
    pub start_screen: u8,
    pub grid: Vec<Vec<u8>>,
}

impl Map {
    pub const DEFAULT_HEIGHT: u8 = 10;
    pub const DEFAULT_WIDTH: u8 = 16;

    pub fn empty() -> Self {
        Self {
            height: 0,
            width: 0,
            start_row: 0,
            start_col: 0,
            start_screen: 0,
            grid: Vec::new(),
        }
    }

    /// Default layout with screen 0 at the start cell.
    pub fn blank() -> Self {
        let mut grid =
            vec![vec![NO_SCREEN; Self::DEFAULT_WIDTH as usize]; Self::DEFAULT_HEIGHT as usize];
        grid[4][7] = 0;
        Self {
            height: Self::DEFAULT_HEIGHT,
            width: Self::DEFAULT_WIDTH,
            start_row: 4,
            start_col: 7,
            start_screen: 0,
            grid,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<u8> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }

    /// First row-major cell holding `screen`.
    pub fn locate(&self, screen: u8) -> Option<(u8, u8)> {
        self.grid.iter().enumerate().find_map(|(r, row)| {
            row.iter()
                .position(|&cell| cell == screen)
                .map(|c| (r as u8, c as u8))
        })
    }

    pub fn screen_count(&self) -> usize {
        self.grid
            .iter()
            .flatten()
            .filter(|&&cell| cell != NO_SCREEN)
            .count()
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteInfo {
    pub kind: u8,
    pub image: u8,
    pub unknown: u8,
    pub screen: u8,
    pub x: u8,
    pub y: u8,
}

impl SpriteInfo {
    /// Value of the unused byte for placements created from source text.
    pub const IMPORTED_UNKNOWN: u8 = 15;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    pub glyphs: Vec<[u8; GLYPH_LEN]>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            glyphs: vec![[0u8; GLYPH_LEN]; FONT_GLYPHS],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: [u8; PALETTE_LEN],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: [
                0, 66, 24, 146, 195, 152, 252, 109, 0, 44, 156, 15, 195, 131, 190, 253,
            ],
        }
    }
}

/// Families populated during the current decode/import session. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub window: bool,
    pub keys: bool,
    pub blocks: bool,
    pub sprites: bool,
    pub objects: bool,
    pub screens: bool,
    pub map: bool,
    pub font: bool,
    pub palette: bool,
}

impl State {
    pub fn all() -> Self {
        Self {
            window: true,
            keys: true,
            blocks: true,
            sprites: true,
            objects: true,
            screens: true,
            map: true,
            font: true,
            palette: true,
        }
    }

    pub fn get(&self, family: Family) -> bool {
        match family {
            Family::Window => self.window,
            Family::Keys => self.keys,
            Family::Blocks => self.blocks,
            Family::Sprites => self.sprites,
            Family::Objects => self.objects,
            Family::Screens => self.screens,
            Family::Map => self.map,
            Family::Font => self.font,
            Family::Palette => self.palette,
        }
    }

    pub fn set(&mut self, family: Family, value: bool) {
        let slot = match family {
            Family::Window => &mut self.window,
            Family::Keys => &mut self.keys,
            Family::Blocks => &mut self.blocks,
            Family::Sprites => &mut self.sprites,
            Family::Objects => &mut self.objects,
            Family::Screens => &mut self.screens,
            Family::Map => &mut self.map,
            Family::Font => &mut self.font,
            Family::Palette => &mut self.palette,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_type_names_and_tags_agree() {
        for raw in 0..=5u8 {
            let kind = BlockType::from_raw(raw);
            assert_eq!(kind.raw(), raw);
            assert_eq!(BlockType::from_name(kind.as_str()), kind);
        }
        assert_eq!(BlockType::from_raw(9).as_str(), "UNKNOWN");
        assert_eq!(BlockType::from_name("LAVA"), BlockType::Empty);
    }

    #[test]
    fn new_records_carry_every_platform_at_full_size() {
        let block = Block::new(0, BlockType::Wall);
        let sizes: Vec<usize> = block.platforms.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![9, 16, 24, 8, 16, 8]);

        let sprite = Sprite::new(0, 2);
        let sizes: Vec<usize> = sprite.platforms.iter().map(|p| p[1].len()).collect();
        assert_eq!(sizes, vec![32, 32, 80, 32, 32, 16]);

        let object = Object::new(0);
        let sizes: Vec<usize> = object.platforms.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![36, 35, 67, 35, 67, 35, 19]);
    }

    #[test]
    fn map_locates_first_row_major_cell() {
        let mut map = Map::blank();
        map.grid[3][9] = 2;
        map.grid[5][1] = 2;
        assert_eq!(map.locate(2), Some((3, 9)));
        assert_eq!(map.locate(7), None);
        assert_eq!(map.screen_count(), 3);
    }
}
