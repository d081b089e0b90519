use std::io;

use mpagd_core::project::types::{BlockType, SpriteInfo};
use mpagd_core::{ErrorCode, Project, ProjectError};

fn minimal_project_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"AGD*");
    bytes.extend_from_slice(&10u32.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 10, 16]);
    bytes.extend_from_slice(&[2, 25, 6, 25, 10, 25, 25, 25, 237, 25]);
    bytes.extend_from_slice(&[87, 83, 65, 68, 32, 74, 72, 49, 50, 51, 52]);
    // one block: type run then six platform runs
    bytes.push(1);
    bytes.push(0);
    let mut spectrum = [0u8; 9];
    spectrum[8] = 71;
    bytes.extend_from_slice(&spectrum);
    bytes.extend_from_slice(&[0u8; 16 + 24 + 8 + 16 + 8]);
    // no sprites, no objects
    bytes.push(0);
    bytes.push(0);
    // one 10x16 screen
    bytes.push(1);
    bytes.extend_from_slice(&[0u8; 160]);
    // empty map
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    // no placements on screen 0
    bytes.push(0xFF);
    bytes.extend_from_slice(&[0u8; 96 * 8]);
    bytes.extend_from_slice(&[0u8; 16]);
    bytes.push(0);
    bytes.extend_from_slice(&[0u8; 256]);
    bytes
}

fn busy_project() -> Project {
    let mut project = Project::blank();
    project.header.version = 11;
    project.window.height = 4;
    project.window.width = 5;
    project.screens[0].rows = vec![vec![0, 1, 1, 0, 2]; 4];
    project.screens.push(mpagd_core::project::Screen {
        id: 1,
        rows: vec![vec![2; 5]; 4],
    });
    for i in 1..3u8 {
        let mut block = mpagd_core::project::Block::new(i, BlockType::from_raw(i));
        block.platforms[0] = (0..9).map(|b| b * i).collect();
        block.platforms[5] = vec![i; 8];
        project.blocks.push(block);
    }
    let mut sprite = mpagd_core::project::Sprite::new(1, 3);
    sprite.platforms[2][2] = vec![0xAB; 80];
    project.sprites.push(sprite);
    project.recalc_sprite_offsets();
    project.objects[0].platforms[6] = vec![3; 19];
    project.map.grid[4][7] = 0;
    project.map.grid[4][8] = 1;
    project.sprite_info = vec![
        SpriteInfo {
            kind: 0,
            image: 0,
            unknown: 15,
            screen: 0,
            x: 64,
            y: 100,
        },
        SpriteInfo {
            kind: 2,
            image: 1,
            unknown: 15,
            screen: 1,
            x: 8,
            y: 8,
        },
        SpriteInfo {
            kind: 3,
            image: 1,
            unknown: 0,
            screen: 1,
            x: 16,
            y: 24,
        },
    ];
    project.font.glyphs[33] = [1, 2, 3, 4, 5, 6, 7, 8];
    project.palette.colors[15] = 1;
    project.enterprise_bias = 3;
    project.asm_path = b"C:\\games\\demo.asm".to_vec();
    project
}

#[test]
fn minimal_project_reencodes_byte_identical() {
    let bytes = minimal_project_bytes();
    let project = Project::decode(&bytes[..]).expect("decode minimal project");

    assert_eq!(project.window.height, 10);
    assert_eq!(project.window.width, 16);
    assert_eq!(project.blocks.len(), 1);
    assert_eq!(project.blocks[0].attribute(), 71);
    assert_eq!(project.screens.len(), 1);
    assert_eq!(project.screens[0].rows, vec![vec![0u8; 16]; 10]);
    assert!(project.sprites.is_empty());
    assert!(project.objects.is_empty());
    assert!(project.sprite_info.is_empty());

    let reencoded = project.to_bytes().expect("encode minimal project");
    assert_eq!(reencoded, bytes);
}

#[test]
fn decode_encode_decode_is_structurally_equal() {
    let project = busy_project();
    let bytes = project.to_bytes().expect("encode");
    let decoded = Project::decode(&bytes[..]).expect("decode");
    assert_eq!(decoded, project);
    assert_eq!(decoded.to_bytes().expect("re-encode"), bytes);
}

#[test]
fn placements_decode_grouped_by_screen() {
    let mut project = busy_project();
    project.sprite_info.reverse();
    let bytes = project.to_bytes().expect("encode");
    let decoded = Project::decode(&bytes[..]).expect("decode");
    let screens: Vec<u8> = decoded.sprite_info.iter().map(|p| p.screen).collect();
    assert_eq!(screens, vec![0, 1, 1]);
}

#[test]
fn section_order_is_fixed_whatever_was_edited_last() {
    let mut a = busy_project();
    let mut b = busy_project();
    a.palette.colors[0] = 9;
    a.window.top = 3;
    b.window.top = 3;
    b.palette.colors[0] = 9;
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());

    let bytes = a.to_bytes().unwrap();
    assert_eq!(&bytes[..4], b"AGD*");
    assert_eq!(bytes[8], 3);
}

#[test]
fn map_start_screen_survives_round_trip() {
    let project = busy_project();
    let decoded = Project::decode(&project.to_bytes().unwrap()[..]).unwrap();
    assert_eq!(decoded.map.start_row, 4);
    assert_eq!(decoded.map.start_col, 7);
    assert_eq!(decoded.map.start_screen, 0);
}

#[test]
fn truncated_file_is_an_io_error() {
    let bytes = minimal_project_bytes();
    for cut in [0, 3, 40, bytes.len() - 1] {
        let err = Project::decode(&bytes[..cut]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Io);
        match err {
            ProjectError::Io(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn save_then_load_through_the_filesystem() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("game.apj");
    let project = busy_project();
    project.save(&path).expect("save");
    let loaded = Project::load(&path).expect("load");
    assert_eq!(loaded, project);
}

#[test]
fn open_or_blank_tolerates_missing_and_broken_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.apj");
    let (project, existed) = Project::open_or_blank(&missing);
    assert!(!existed);
    assert!(project.blocks.is_empty());

    let broken = dir.path().join("broken.apj");
    std::fs::write(&broken, b"AGD*").expect("write");
    let (_, existed) = Project::open_or_blank(&broken);
    assert!(!existed);

    assert!(Project::load(&missing).is_err());
}

#[test]
fn model_serializes_to_json() {
    let project = busy_project();
    let value = serde_json::to_value(&project).expect("serialize");
    assert_eq!(value["window"]["height"], 4);
    assert_eq!(value["blocks"].as_array().map(Vec::len), Some(3));
    assert!(value.get("state").is_none());
}
