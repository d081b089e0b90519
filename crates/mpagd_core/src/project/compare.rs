use std::fmt;

use serde::{Deserialize, Serialize};

use super::Project;

/// One stored section of a project file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Header,
    Window,
    LivesScore,
    Keys,
    Blocks,
    Sprites,
    Objects,
    Screens,
    Map,
    SpritePositions,
    Font,
    Palette,
    EnterpriseBias,
    AsmPath,
}

impl Section {
    pub const ALL: [Section; 14] = [
        Section::Header,
        Section::Window,
        Section::LivesScore,
        Section::Keys,
        Section::Blocks,
        Section::Sprites,
        Section::Objects,
        Section::Screens,
        Section::Map,
        Section::SpritePositions,
        Section::Font,
        Section::Palette,
        Section::EnterpriseBias,
        Section::AsmPath,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Window => "window",
            Self::LivesScore => "lives_score",
            Self::Keys => "keys",
            Self::Blocks => "blocks",
            Self::Sprites => "sprites",
            Self::Objects => "objects",
            Self::Screens => "screens",
            Self::Map => "map",
            Self::SpritePositions => "sprite_positions",
            Self::Font => "font",
            Self::Palette => "palette",
            Self::EnterpriseBias => "enterprise_bias",
            Self::AsmPath => "asm_path",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section that differs between two projects, with the record counts
/// on each side for the collection sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDiff {
    pub section: Section,
    pub counts: Option<(usize, usize)>,
}

impl Project {
    /// Sections whose stored content differs from `other`, in file order.
    /// Session state is not compared.
    pub fn compare(&self, other: &Project) -> Vec<SectionDiff> {
        Section::ALL
            .into_iter()
            .filter_map(|section| {
                let (same, counts) = match section {
                    Section::Header => (self.header == other.header, None),
                    Section::Window => (self.window == other.window, None),
                    Section::LivesScore => (self.lives_score == other.lives_score, None),
                    Section::Keys => (self.keys == other.keys, None),
                    Section::Blocks => (
                        self.blocks == other.blocks,
                        Some((self.blocks.len(), other.blocks.len())),
                    ),
                    Section::Sprites => (
                        self.sprites == other.sprites,
                        Some((self.sprites.len(), other.sprites.len())),
                    ),
                    Section::Objects => (
                        self.objects == other.objects,
                        Some((self.objects.len(), other.objects.len())),
                    ),
                    Section::Screens => (
                        self.screens == other.screens,
                        Some((self.screens.len(), other.screens.len())),
                    ),
                    Section::Map => (self.map == other.map, None),
                    Section::SpritePositions => (
                        self.sprite_info == other.sprite_info,
                        Some((self.sprite_info.len(), other.sprite_info.len())),
                    ),
                    Section::Font => (self.font == other.font, None),
                    Section::Palette => (self.palette == other.palette, None),
                    Section::EnterpriseBias => {
                        (self.enterprise_bias == other.enterprise_bias, None)
                    }
                    Section::AsmPath => (self.asm_path == other.asm_path, None),
                };
                (!same).then_some(SectionDiff { section, counts })
            })
            .collect()
    }
}
