use std::collections::BTreeMap;

use mpagd_core::Project;
use mpagd_core::project::types::{Block, BlockType, NO_SCREEN, Screen, Sprite};
use serde_json::{Map as JsonMap, Value as JsonValue};

const MISSING_BLOCK: &str = "MISSING";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRenderOptions {
    /// List every block, sprite and screen after the totals.
    pub verbose: bool,
}

/// Spectrum attribute byte split into its colour fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub ink: u8,
    pub paper: u8,
    pub bright: bool,
    pub flash: bool,
}

impl Attribute {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            ink: byte & 0x07,
            paper: (byte >> 3) & 0x07,
            bright: byte & 0x40 != 0,
            flash: byte & 0x80 != 0,
        }
    }
}

/// How many cells of a screen use each block type, keyed by label.
/// Cells naming a block that does not exist count as `MISSING`.
pub fn screen_block_usage(project: &Project, screen: &Screen) -> BTreeMap<String, usize> {
    let mut by_raw: BTreeMap<Option<u8>, usize> = BTreeMap::new();
    for &cell in screen.rows.iter().flatten() {
        let key = project.blocks.get(cell as usize).map(|b| b.kind.raw());
        *by_raw.entry(key).or_default() += 1;
    }
    by_raw
        .into_iter()
        .map(|(raw, count)| {
            let label = match raw {
                Some(raw) => BlockType::from_raw(raw).to_string(),
                None => MISSING_BLOCK.to_string(),
            };
            (label, count)
        })
        .collect()
}

pub fn placements_on(project: &Project, screen: u8) -> usize {
    project
        .sprite_info
        .iter()
        .filter(|p| p.screen == screen)
        .count()
}

pub fn render_stats(project: &Project) -> String {
    render_stats_with_options(project, TextRenderOptions::default())
}

pub fn render_stats_with_options(project: &Project, options: TextRenderOptions) -> String {
    let mut lines = vec![
        "Project Statistics:".to_string(),
        format!("Blocks: {}", project.blocks.len()),
        format!("Sprites: {}", project.sprites.len()),
        format!("Screens: {}", project.screens.len()),
        format!("Objects: {}", project.objects.len()),
        format!("Maps: {}", project.map.grid.len()),
        format!("Fonts: {}", project.font.glyphs.len()),
    ];

    if options.verbose {
        lines.push(String::new());
        lines.push(format!(
            "Window: top {} left {} height {} width {}",
            project.window.top, project.window.left, project.window.height, project.window.width
        ));
        lines.push(format!(
            "Map: {}x{} start {},{} (screen {}), {} screens placed",
            project.map.height,
            project.map.width,
            project.map.start_row,
            project.map.start_col,
            project.map.start_screen,
            project.map.screen_count()
        ));
        lines.push(format!("Sprite positions: {}", project.sprite_info.len()));

        lines.push(String::new());
        lines.push("Blocks:".to_string());
        lines.extend(project.blocks.iter().map(block_line));

        lines.push(String::new());
        lines.push("Sprites:".to_string());
        lines.extend(project.sprites.iter().map(sprite_line));

        lines.push(String::new());
        lines.push("Screens:".to_string());
        lines.extend(
            project
                .screens
                .iter()
                .map(|screen| screen_line(project, screen)),
        );
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn block_line(block: &Block) -> String {
    let attr = Attribute::from_byte(block.attribute());
    let mut line = format!(
        "  {:>3}  {:<14} ink {} paper {}",
        block.id,
        block.kind.to_string(),
        attr.ink,
        attr.paper
    );
    if attr.bright {
        line.push_str(" bright");
    }
    if attr.flash {
        line.push_str(" flash");
    }
    line
}

fn sprite_line(sprite: &Sprite) -> String {
    format!(
        "  {:>3}  frames {} offset {}",
        sprite.id, sprite.frames, sprite.offset
    )
}

fn screen_line(project: &Project, screen: &Screen) -> String {
    let usage = screen_block_usage(project, screen)
        .into_iter()
        .map(|(label, count)| format!("{label}={count}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "  {:>3}  placements {}  {}",
        screen.id,
        placements_on(project, screen.id),
        usage
    )
    .trim_end()
    .to_string()
}

pub fn render_json_summary(project: &Project, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(summary_json(project)),
    }
}

fn summary_json(project: &Project) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert(
        "version".to_string(),
        JsonValue::from(project.header.version),
    );
    out.insert("window".to_string(), window_to_json(project));
    out.insert("counts".to_string(), counts_to_json(project));
    out.insert("map".to_string(), map_to_json(project));
    out.insert(
        "blocks".to_string(),
        JsonValue::Array(project.blocks.iter().map(block_to_json).collect()),
    );
    out.insert(
        "sprites".to_string(),
        JsonValue::Array(project.sprites.iter().map(sprite_to_json).collect()),
    );
    out.insert(
        "screens".to_string(),
        JsonValue::Array(
            project
                .screens
                .iter()
                .map(|screen| screen_to_json(project, screen))
                .collect(),
        ),
    );
    out.insert(
        "palette".to_string(),
        JsonValue::Array(
            project
                .palette
                .colors
                .iter()
                .map(|&c| JsonValue::from(c))
                .collect(),
        ),
    );
    out.insert(
        "enterprise_bias".to_string(),
        JsonValue::from(project.enterprise_bias),
    );
    out.insert(
        "asm_path".to_string(),
        JsonValue::String(project.asm_path_lossy()),
    );
    out
}

fn window_to_json(project: &Project) -> JsonValue {
    let w = &project.window;
    let mut m = JsonMap::new();
    m.insert("top".to_string(), JsonValue::from(w.top));
    m.insert("left".to_string(), JsonValue::from(w.left));
    m.insert("height".to_string(), JsonValue::from(w.height));
    m.insert("width".to_string(), JsonValue::from(w.width));
    JsonValue::Object(m)
}

fn counts_to_json(project: &Project) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("blocks".to_string(), JsonValue::from(project.blocks.len()));
    m.insert("sprites".to_string(), JsonValue::from(project.sprites.len()));
    m.insert(
        "sprite_frames".to_string(),
        JsonValue::from(
            project
                .sprites
                .iter()
                .map(|s| usize::from(s.frames))
                .sum::<usize>(),
        ),
    );
    m.insert("objects".to_string(), JsonValue::from(project.objects.len()));
    m.insert("screens".to_string(), JsonValue::from(project.screens.len()));
    m.insert(
        "sprite_positions".to_string(),
        JsonValue::from(project.sprite_info.len()),
    );
    m.insert("map_rows".to_string(), JsonValue::from(project.map.grid.len()));
    m.insert(
        "font_glyphs".to_string(),
        JsonValue::from(project.font.glyphs.len()),
    );
    JsonValue::Object(m)
}

fn map_to_json(project: &Project) -> JsonValue {
    let map = &project.map;
    let mut m = JsonMap::new();
    m.insert("height".to_string(), JsonValue::from(map.height));
    m.insert("width".to_string(), JsonValue::from(map.width));
    m.insert("start_row".to_string(), JsonValue::from(map.start_row));
    m.insert("start_col".to_string(), JsonValue::from(map.start_col));
    m.insert("start_screen".to_string(), JsonValue::from(map.start_screen));
    m.insert(
        "screens_placed".to_string(),
        JsonValue::from(map.screen_count()),
    );
    m.insert(
        "grid".to_string(),
        JsonValue::Array(
            map.grid
                .iter()
                .map(|row| {
                    JsonValue::Array(
                        row.iter()
                            .map(|&cell| {
                                if cell == NO_SCREEN {
                                    JsonValue::Null
                                } else {
                                    JsonValue::from(cell)
                                }
                            })
                            .collect(),
                    )
                })
                .collect(),
        ),
    );
    JsonValue::Object(m)
}

fn block_to_json(block: &Block) -> JsonValue {
    let attr = Attribute::from_byte(block.attribute());
    let mut m = JsonMap::new();
    m.insert("id".to_string(), JsonValue::from(block.id));
    m.insert("type".to_string(), JsonValue::String(block.kind.to_string()));
    m.insert("ink".to_string(), JsonValue::from(attr.ink));
    m.insert("paper".to_string(), JsonValue::from(attr.paper));
    m.insert("bright".to_string(), JsonValue::Bool(attr.bright));
    m.insert("flash".to_string(), JsonValue::Bool(attr.flash));
    JsonValue::Object(m)
}

fn sprite_to_json(sprite: &Sprite) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("id".to_string(), JsonValue::from(sprite.id));
    m.insert("frames".to_string(), JsonValue::from(sprite.frames));
    m.insert("offset".to_string(), JsonValue::from(sprite.offset));
    JsonValue::Object(m)
}

fn screen_to_json(project: &Project, screen: &Screen) -> JsonValue {
    let usage: JsonMap<String, JsonValue> = screen_block_usage(project, screen)
        .into_iter()
        .map(|(label, count)| (label, JsonValue::from(count)))
        .collect();
    let mut m = JsonMap::new();
    m.insert("id".to_string(), JsonValue::from(screen.id));
    m.insert(
        "placements".to_string(),
        JsonValue::from(placements_on(project, screen.id)),
    );
    m.insert("block_usage".to_string(), JsonValue::Object(usage));
    JsonValue::Object(m)
}
