pub mod reorder;
pub mod rotate;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProjectError, Result};
use crate::family::Family;
use crate::project::types::NO_SCREEN;
use crate::project::{Block, Project, Sprite};

pub use reorder::{Reordered, reorder};
pub use rotate::{Rotation, rotate_sprite_frame, rotate_tile};

const MAX_RECORDS: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateMode {
    /// Rewrite the record at its own index.
    InPlace,
    /// Append a rotated copy and leave the source untouched.
    RetainAndAppend,
}

fn check_index(family: Family, index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(ProjectError::IndexOutOfRange { family, index, len });
    }
    Ok(())
}

fn check_room(family: Family, len: usize) -> Result<()> {
    if len >= MAX_RECORDS {
        return Err(ProjectError::TooManyRecords {
            family,
            count: len + 1,
        });
    }
    Ok(())
}

impl Project {
    // --- Reordering ---

    /// Permuted copy of the blocks with ids renumbered; the project is unchanged.
    pub fn reordered_blocks(&self, order: &[usize], offset: usize) -> Result<Vec<Block>> {
        let mut blocks = reorder(Family::Blocks, &self.blocks, order, offset)?.items;
        for (i, block) in blocks.iter_mut().enumerate() {
            block.id = i as u8;
        }
        Ok(blocks)
    }

    /// Permuted copy of the sprites with ids and offsets recomputed.
    pub fn reordered_sprites(&self, order: &[usize], offset: usize) -> Result<Vec<Sprite>> {
        let mut sprites = reorder(Family::Sprites, &self.sprites, order, offset)?.items;
        renumber_sprites(&mut sprites);
        Ok(sprites)
    }

    /// Reorder blocks and rewrite every screen cell to the block's new index.
    /// Sprites and objects are untouched.
    pub fn reorder_blocks(&mut self, order: &[usize], offset: usize) -> Result<Vec<usize>> {
        let r = reorder(Family::Blocks, &self.blocks, order, offset)?;
        for screen in &mut self.screens {
            for cell in screen.rows.iter_mut().flatten() {
                *cell = r.remap_byte(*cell);
            }
        }
        self.blocks = r.items;
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.id = i as u8;
        }
        debug!(order = ?order, offset, "reordered blocks");
        Ok(r.mapping)
    }

    /// Reorder sprites and rewrite each placement's image exactly once.
    pub fn reorder_sprites(&mut self, order: &[usize], offset: usize) -> Result<Vec<usize>> {
        let r = reorder(Family::Sprites, &self.sprites, order, offset)?;
        for placement in &mut self.sprite_info {
            placement.image = r.remap_byte(placement.image);
        }
        self.sprites = r.items;
        renumber_sprites(&mut self.sprites);
        debug!(order = ?order, offset, "reordered sprites");
        Ok(r.mapping)
    }

    /// Reorder screens, rewriting map cells, the start screen and placement
    /// screens; placements are then regrouped by screen.
    pub fn reorder_screens(&mut self, order: &[usize], offset: usize) -> Result<Vec<usize>> {
        let r = reorder(Family::Screens, &self.screens, order, offset)?;
        for cell in self.map.grid.iter_mut().flatten() {
            if *cell != NO_SCREEN {
                *cell = r.remap_byte(*cell);
            }
        }
        self.map.start_screen = r.remap_byte(self.map.start_screen);
        for placement in &mut self.sprite_info {
            placement.screen = r.remap_byte(placement.screen);
        }
        self.sprite_info.sort_by_key(|p| p.screen);

        self.screens = r.items;
        for (i, screen) in self.screens.iter_mut().enumerate() {
            screen.id = i as u8;
        }
        debug!(order = ?order, offset, "reordered screens");
        Ok(r.mapping)
    }

    // --- Rotation ---

    /// Rotate a block's primary pixel data. Returns the index of the rotated block.
    pub fn rotate_block(
        &mut self,
        index: usize,
        rotation: Rotation,
        mode: RotateMode,
    ) -> Result<usize> {
        check_index(Family::Blocks, index, self.blocks.len())?;
        let source = &self.blocks[index];
        let rotated = rotate_tile(rotate::to_fixed(source.spectrum()), rotation).to_vec();

        let target = match mode {
            RotateMode::InPlace => {
                self.blocks[index].set_spectrum(rotated);
                index
            }
            RotateMode::RetainAndAppend => {
                check_room(Family::Blocks, self.blocks.len())?;
                let new_index = self.blocks.len();
                let mut block = Block::new(new_index as u8, source.kind);
                block.set_spectrum(rotated);
                self.blocks.push(block);
                new_index
            }
        };
        debug!(index, target, ?rotation, ?mode, "rotated block");
        Ok(target)
    }

    /// Rotate every frame of a sprite's primary pixel data.
    pub fn rotate_sprite(
        &mut self,
        index: usize,
        rotation: Rotation,
        mode: RotateMode,
    ) -> Result<usize> {
        check_index(Family::Sprites, index, self.sprites.len())?;
        let source = &self.sprites[index];
        let rotated: Vec<Vec<u8>> = source
            .spectrum_frames()
            .iter()
            .map(|frame| rotate_sprite_frame(rotate::to_fixed(frame), rotation).to_vec())
            .collect();

        let target = match mode {
            RotateMode::InPlace => {
                *self.sprites[index].spectrum_frames_mut() = rotated;
                index
            }
            RotateMode::RetainAndAppend => {
                check_room(Family::Sprites, self.sprites.len())?;
                let new_index = self.sprites.len();
                let mut sprite = Sprite::new(new_index as u8, source.frames);
                *sprite.spectrum_frames_mut() = rotated;
                self.sprites.push(sprite);
                self.recalc_sprite_offsets();
                new_index
            }
        };
        debug!(index, target, ?rotation, ?mode, "rotated sprite");
        Ok(target)
    }
}

fn renumber_sprites(sprites: &mut [Sprite]) {
    let mut offset = 0u8;
    for (i, sprite) in sprites.iter_mut().enumerate() {
        sprite.id = i as u8;
        sprite.offset = offset;
        offset = offset.wrapping_add(sprite.frames);
    }
}
