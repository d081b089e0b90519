use mpagd_core::project::types::{BlockType, NO_SCREEN, SpriteInfo};
use mpagd_core::project::{Block, Map, Screen, Sprite};
use mpagd_core::transform::{RotateMode, Rotation, rotate_tile};
use mpagd_core::{ErrorCode, Project};

fn marked_block(marker: u8) -> Block {
    let mut block = Block::new(marker, BlockType::Platform);
    block.platforms[0][0] = marker;
    block
}

fn project_with(blocks: usize, screens: usize, sprites: usize) -> Project {
    let mut project = Project::new();
    project.window.height = 2;
    project.window.width = blocks as u8;
    project.blocks = (0..blocks as u8).map(marked_block).collect();
    project.screens = (0..screens as u8)
        .map(|id| Screen {
            id,
            rows: vec![(0..blocks as u8).collect(), (0..blocks as u8).rev().collect()],
        })
        .collect();
    project.sprites = (0..sprites as u8).map(|id| Sprite::new(id, id % 3 + 1)).collect();
    project.recalc_sprite_offsets();
    project.map = Map::blank();
    for s in 0..screens {
        project.map.grid[0][s] = s as u8;
    }
    project.sprite_info = (0..screens as u8)
        .flat_map(|screen| {
            (0..sprites as u8).map(move |image| SpriteInfo {
                kind: image,
                image,
                unknown: 15,
                screen,
                x: image * 8,
                y: screen * 8,
            })
        })
        .collect();
    project
}

/// Every permutation of `0..n`, built by insertion.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new()];
    for item in 0..n {
        out = out
            .into_iter()
            .flat_map(|p| {
                (0..=p.len()).map(move |at| {
                    let mut next = p.clone();
                    next.insert(at, item);
                    next
                })
            })
            .collect();
    }
    out
}

#[test]
fn reorder_three_blocks_example() {
    let mut project = project_with(3, 1, 0);
    project.screens[0].rows = vec![vec![1, 1, 1], vec![0, 2, 1]];

    project.reorder_blocks(&[2, 0], 0).expect("reorder");

    let markers: Vec<u8> = project.blocks.iter().map(|b| b.platforms[0][0]).collect();
    assert_eq!(markers, vec![2, 0, 1]);
    let ids: Vec<u8> = project.blocks.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(project.screens[0].rows[0], vec![2, 2, 2]);
    assert_eq!(project.screens[0].rows[1], vec![1, 0, 2]);
}

#[test]
fn identity_reorder_leaves_everything_unchanged() {
    for n in 1..5 {
        let original = project_with(n, 2, n);
        let identity: Vec<usize> = (0..n).collect();

        let mut project = original.clone();
        project.reorder_blocks(&identity, 0).expect("blocks");
        project.reorder_sprites(&identity, 0).expect("sprites");
        project.reorder_screens(&[0, 1], 0).expect("screens");
        assert_eq!(project, original);
    }
}

#[test]
fn block_reorder_closure_over_all_permutations_and_offsets() {
    let n = 4;
    let original = project_with(n, 2, 0);
    for offset in 0..=n {
        for order in permutations(n - offset) {
            for take in [order.len(), order.len() / 2] {
                let order = &order[..take];
                let mut project = original.clone();
                let mapping = project.reorder_blocks(order, offset).expect("reorder");

                for (s, screen) in original.screens.iter().enumerate() {
                    for (r, row) in screen.rows.iter().enumerate() {
                        for (c, &old) in row.iter().enumerate() {
                            let new = project.screens[s].rows[r][c];
                            assert_eq!(new as usize, mapping[old as usize]);
                            // The block now at `new` is the one that was at `old`.
                            assert_eq!(project.blocks[new as usize].platforms[0][0], old);
                        }
                    }
                }
                for i in 0..offset {
                    assert_eq!(mapping[i], i);
                }
            }
        }
    }
}

#[test]
fn block_reorder_never_touches_sprites_or_objects() {
    let mut project = project_with(3, 1, 3);
    project.objects.push(mpagd_core::project::Object::new(0));
    let sprites = project.sprites.clone();
    let objects = project.objects.clone();
    let placements = project.sprite_info.clone();
    project.reorder_blocks(&[1, 2, 0], 0).expect("reorder");
    assert_eq!(project.sprites, sprites);
    assert_eq!(project.objects, objects);
    assert_eq!(project.sprite_info, placements);
}

#[test]
fn sprite_reorder_keeps_placements_pointing_at_the_same_sprite() {
    let original = project_with(1, 2, 4);
    for order in permutations(3) {
        let mut project = original.clone();
        project.reorder_sprites(&order, 1).expect("reorder");
        for (before, after) in original.sprite_info.iter().zip(&project.sprite_info) {
            let old = &original.sprites[before.image as usize];
            let new = &project.sprites[after.image as usize];
            assert_eq!(old.frames, new.frames);
            assert_eq!(after.kind, before.kind);
        }
        assert_eq!(project.sprites[0], original.sprites[0]);
        let offsets: Vec<u8> = project.sprites.iter().map(|s| s.offset).collect();
        let mut expected = Vec::new();
        let mut acc = 0;
        for s in &project.sprites {
            expected.push(acc);
            acc += s.frames;
        }
        assert_eq!(offsets, expected);
    }
}

#[test]
fn screen_reorder_rewrites_map_and_regroups_placements() {
    let mut project = project_with(2, 3, 2);
    project.map.start_screen = 1;

    project.reorder_screens(&[2, 0, 1], 0).expect("reorder");

    assert_eq!(&project.map.grid[0][..4], &[1, 2, 0, NO_SCREEN]);
    assert_eq!(project.map.grid[1], vec![NO_SCREEN; 16]);
    assert_eq!(project.map.start_screen, 2);
    let screens: Vec<u8> = project.sprite_info.iter().map(|p| p.screen).collect();
    assert_eq!(screens, vec![0, 0, 1, 1, 2, 2]);
    // y was stamped from the original screen
    let ys: Vec<u8> = project.sprite_info.iter().map(|p| p.y).collect();
    assert_eq!(ys, vec![16, 16, 0, 0, 8, 8]);

    let bytes = project.to_bytes().expect("encode");
    let decoded = Project::decode(&bytes[..]).expect("decode");
    assert_eq!(decoded.sprite_info, project.sprite_info);
}

#[test]
fn bad_orders_are_range_errors_and_leave_the_project_alone() {
    let original = project_with(3, 2, 3);
    let mut project = original.clone();
    let cases: [(Vec<usize>, usize); 5] = [
        (vec![3], 0),
        (vec![0, 0], 0),
        (vec![0, 1, 2, 0], 0),
        (vec![2], 1),
        (vec![], 4),
    ];
    for (order, offset) in cases {
        let err = project.reorder_blocks(&order, offset).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Range);
        let err = project.reorder_sprites(&order, offset).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Range);
    }
    assert!(project.reorder_screens(&[2], 0).is_err());
    assert_eq!(project, original);
}

#[test]
fn tile_rotation_is_a_group_of_order_four() {
    let tiles: Vec<[u8; 9]> = (0u8..32)
        .map(|seed| {
            std::array::from_fn(|i| seed.wrapping_mul(29).wrapping_add((i as u8).wrapping_mul(53)))
        })
        .collect();
    for tile in tiles {
        let mut cw = tile;
        let mut ccw = tile;
        for _ in 0..4 {
            cw = rotate_tile(cw, Rotation::Clockwise);
            ccw = rotate_tile(ccw, Rotation::CounterClockwise);
        }
        assert_eq!(cw, tile);
        assert_eq!(ccw, tile);
        let there = rotate_tile(tile, Rotation::Clockwise);
        assert_eq!(rotate_tile(there, Rotation::Clockwise.inverse()), tile);
    }
}

#[test]
fn chained_retained_rotations_build_all_four_orientations() {
    let mut project = project_with(1, 0, 0);
    project.blocks[0].platforms[0] = vec![0xF0, 0x80, 0x80, 0x80, 0, 0, 0, 0, 0x45];

    let mut index = 0;
    for _ in 0..3 {
        index = project
            .rotate_block(index, Rotation::Clockwise, RotateMode::RetainAndAppend)
            .expect("rotate");
    }
    assert_eq!(index, 3);
    assert_eq!(project.blocks.len(), 4);

    let last = project
        .rotate_block(3, Rotation::Clockwise, RotateMode::InPlace)
        .expect("rotate");
    assert_eq!(last, 3);
    assert_eq!(project.blocks[3].platforms[0], project.blocks[0].platforms[0]);
    assert!(project.blocks.iter().all(|b| b.attribute() == 0x45));
}

#[test]
fn rotated_sprite_zeroes_other_platforms() {
    let mut project = project_with(1, 0, 1);
    project.sprites[0].platforms[0][0][0] = 0xFF;
    project.sprites[0].platforms[1][0][0] = 0xFF;
    let index = project
        .rotate_sprite(0, Rotation::CounterClockwise, RotateMode::RetainAndAppend)
        .expect("rotate");
    let copy = &project.sprites[index];
    assert!(copy.platforms[1].iter().flatten().all(|&b| b == 0));
    // Top row, left half, turned counter-clockwise lands in column 0 of rows 8..16.
    for row in 8..16 {
        assert_eq!(copy.platforms[0][0][row * 2], 0x80);
        assert_eq!(copy.platforms[0][0][row * 2 + 1], 0);
    }
}
