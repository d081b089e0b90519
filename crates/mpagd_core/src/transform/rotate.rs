use serde::{Deserialize, Serialize};

pub const TILE_LEN: usize = 9;
pub const SPRITE_FRAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn inverse(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Rotate an 8x8 tile. Bytes 0..8 are rows (MSB = leftmost pixel); the
/// attribute byte passes through.
pub fn rotate_tile(tile: [u8; TILE_LEN], rotation: Rotation) -> [u8; TILE_LEN] {
    let mut out = [0u8; TILE_LEN];
    rotate_square(&tile[..8], &mut out[..8], 8, rotation);
    out[8] = tile[8];
    out
}

/// Rotate a 16x16 sprite frame stored as two bytes per row.
pub fn rotate_sprite_frame(
    frame: [u8; SPRITE_FRAME_LEN],
    rotation: Rotation,
) -> [u8; SPRITE_FRAME_LEN] {
    let mut out = [0u8; SPRITE_FRAME_LEN];
    rotate_square(&frame, &mut out, 16, rotation);
    out
}

/// Copy `src` into a fixed array, zero-padding or truncating.
pub fn to_fixed<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let take = src.len().min(N);
    out[..take].copy_from_slice(&src[..take]);
    out
}

fn pixel(bytes: &[u8], size: usize, row: usize, col: usize) -> bool {
    let stride = size / 8;
    (bytes[row * stride + col / 8] >> (7 - col % 8)) & 1 == 1
}

fn set_pixel(bytes: &mut [u8], size: usize, row: usize, col: usize) {
    let stride = size / 8;
    bytes[row * stride + col / 8] |= 1 << (7 - col % 8);
}

fn rotate_square(src: &[u8], dst: &mut [u8], size: usize, rotation: Rotation) {
    let last = size - 1;
    for y in 0..size {
        for x in 0..size {
            if !pixel(src, size, y, x) {
                continue;
            }
            let (row, col) = match rotation {
                Rotation::CounterClockwise => (last - x, y),
                Rotation::Clockwise => (x, last - y),
            };
            set_pixel(dst, size, row, col);
        }
    }
}
