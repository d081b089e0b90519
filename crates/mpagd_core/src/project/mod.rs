pub mod compare;
pub mod sections;
pub mod types;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::family::Family;
use crate::reader::LittleEndianReader;
use crate::writer::LittleEndianWriter;

pub use compare::{Section, SectionDiff};
pub use types::{
    Block, BlockPlatform, BlockType, Font, Header, Keys, LivesScore, Map, Object, ObjectPlatform,
    Palette, Screen, Sprite, SpriteInfo, SpritePlatform, State, Window,
};

/// Attribute byte of the block created when a project has none.
pub const DEFAULT_BLOCK_ATTRIBUTE: u8 = 71;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub header: Header,
    pub window: Window,
    pub lives_score: LivesScore,
    pub keys: Keys,
    pub blocks: Vec<Block>,
    pub sprites: Vec<Sprite>,
    pub objects: Vec<Object>,
    pub screens: Vec<Screen>,
    pub map: Map,
    pub sprite_info: Vec<SpriteInfo>,
    pub font: Font,
    pub palette: Palette,
    pub enterprise_bias: u8,
    pub asm_path: Vec<u8>,
    #[serde(skip)]
    pub state: State,
}

/// Session state is not part of a project's content.
impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
            && self.window == other.window
            && self.lives_score == other.lives_score
            && self.keys == other.keys
            && self.blocks == other.blocks
            && self.sprites == other.sprites
            && self.objects == other.objects
            && self.screens == other.screens
            && self.map == other.map
            && self.sprite_info == other.sprite_info
            && self.font == other.font
            && self.palette == other.palette
            && self.enterprise_bias == other.enterprise_bias
            && self.asm_path == other.asm_path
    }
}

impl Eq for Project {}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Empty collections with default scalar sections; nothing is populated.
    pub fn new() -> Self {
        Self {
            header: Header::default(),
            window: Window::default(),
            lives_score: LivesScore::default(),
            keys: Keys::default(),
            blocks: Vec::new(),
            sprites: Vec::new(),
            objects: Vec::new(),
            screens: Vec::new(),
            map: Map::empty(),
            sprite_info: Vec::new(),
            font: Font::default(),
            palette: Palette::default(),
            enterprise_bias: 0,
            asm_path: Vec::new(),
            state: State::default(),
        }
    }

    /// A project ready to save: every family holds its default content.
    pub fn blank() -> Self {
        let mut project = Self::new();
        project.populate_defaults();
        project
    }

    pub fn decode<R: Read>(reader: R) -> Result<Self> {
        let mut r = LittleEndianReader::new(reader);

        // Section 1: Header (8 bytes)
        let header = sections::read_header(&mut r)?;
        // Section 2: Window (4 bytes); drives screen dimensions below
        let window = sections::read_window(&mut r)?;
        // Section 3: Lives/score layout (10 bytes)
        let lives_score = sections::read_lives_score(&mut r)?;
        // Section 4: Keys (11 bytes)
        let keys = sections::read_keys(&mut r)?;
        // Section 5: Blocks
        let blocks = sections::read_blocks(&mut r)?;
        // Section 6: Sprites
        let sprites = sections::read_sprites(&mut r)?;
        // Section 7: Objects
        let objects = sections::read_objects(&mut r)?;
        // Section 8: Screens
        let screens = sections::read_screens(&mut r, &window)?;
        // Section 9: Map
        let map = sections::read_map(&mut r)?;
        // Section 10: Sprite placements; one run per decoded screen
        let sprite_info = sections::read_sprite_info(&mut r, screens.len())?;
        // Section 11: Font (768 bytes)
        let glyphs = sections::read_font(&mut r)?;
        // Section 12: ULA palette (16 bytes)
        let palette = sections::read_palette(&mut r)?;
        // Section 13: Enterprise bias (1 byte)
        let enterprise_bias = sections::read_enterprise_bias(&mut r)?;
        // Section 14: Asm path (256 bytes)
        let asm_path = sections::read_asm_path(&mut r)?;

        debug!(
            bytes = r.consumed(),
            blocks = blocks.len(),
            sprites = sprites.len(),
            objects = objects.len(),
            screens = screens.len(),
            placements = sprite_info.len(),
            "decoded project"
        );

        Ok(Self {
            header,
            window,
            lives_score,
            keys,
            blocks,
            sprites,
            objects,
            screens,
            map,
            sprite_info,
            font: Font { glyphs },
            palette,
            enterprise_bias,
            asm_path,
            state: State::all(),
        })
    }

    pub fn encode<W: Write>(&self, writer: W) -> Result<()> {
        let mut w = LittleEndianWriter::new(writer);

        sections::write_header(&mut w, &self.header)?;
        sections::write_window(&mut w, &self.window)?;
        sections::write_lives_score(&mut w, &self.lives_score)?;
        sections::write_keys(&mut w, &self.keys)?;
        sections::write_blocks(&mut w, &self.blocks)?;
        sections::write_sprites(&mut w, &self.sprites)?;
        sections::write_objects(&mut w, &self.objects)?;
        sections::write_screens(&mut w, &self.screens, &self.window)?;
        sections::write_map(&mut w, &self.map)?;
        sections::write_sprite_info(&mut w, &self.sprite_info, self.screens.len())?;
        sections::write_font(&mut w, &self.font.glyphs)?;
        sections::write_palette(&mut w, &self.palette)?;
        sections::write_enterprise_bias(&mut w, self.enterprise_bias)?;
        sections::write_asm_path(&mut w, &self.asm_path)?;
        w.flush()?;

        debug!(bytes = w.written(), "encoded project");
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(&mut out)?;
        Ok(out)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let project = Self::decode(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded project");
        Ok(project)
    }

    /// A failed encode leaves an existing file untouched.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(&bytes)?;
        out.flush()?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved project");
        Ok(())
    }

    /// Load `path` for merging. Any load failure yields a blank project; the
    /// flag reports whether an existing project was read.
    pub fn open_or_blank(path: impl AsRef<Path>) -> (Self, bool) {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(project) => (project, true),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "starting from a blank project");
                (Self::new(), false)
            }
        }
    }

    /// Fill every family that is still unpopulated and empty, then
    /// recompute sprite offsets.
    pub fn populate_defaults(&mut self) {
        if self.needs_default(Family::Screens, self.screens.is_empty()) {
            self.screens.push(Screen {
                id: 0,
                rows: self.window.blank_grid(),
            });
        }
        if self.needs_default(Family::Map, self.map.grid.is_empty()) {
            self.map = Map::blank();
        }
        if self.needs_default(Family::Font, self.font.glyphs.is_empty()) {
            self.font = Font::default();
        }
        if self.needs_default(Family::Objects, self.objects.is_empty()) {
            self.objects.push(Object::new(0));
        }
        if self.needs_default(Family::Sprites, self.sprites.is_empty()) {
            self.sprites.push(Sprite::new(0, 1));
        }
        if self.needs_default(Family::Blocks, self.blocks.is_empty()) {
            let mut block = Block::new(0, BlockType::Empty);
            let mut spectrum = vec![0u8; BlockPlatform::Spectrum.size()];
            spectrum[BlockPlatform::Spectrum.size() - 1] = DEFAULT_BLOCK_ATTRIBUTE;
            block.set_spectrum(spectrum);
            self.blocks.push(block);
        }
        self.recalc_sprite_offsets();
    }

    fn needs_default(&self, family: Family, empty: bool) -> bool {
        empty && !self.state.get(family)
    }

    pub fn recalc_sprite_offsets(&mut self) {
        let mut offset = 0u8;
        for sprite in &mut self.sprites {
            sprite.offset = offset;
            offset = offset.wrapping_add(sprite.frames);
        }
    }

    pub fn renumber_ids(&mut self) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.id = i as u8;
        }
        for (i, sprite) in self.sprites.iter_mut().enumerate() {
            sprite.id = i as u8;
        }
        for (i, object) in self.objects.iter_mut().enumerate() {
            object.id = i as u8;
        }
        for (i, screen) in self.screens.iter_mut().enumerate() {
            screen.id = i as u8;
        }
    }

    pub fn asm_path_lossy(&self) -> String {
        String::from_utf8_lossy(&self.asm_path).into_owned()
    }
}
