pub mod records;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::family::{Family, ImportOptions};
use crate::project::types::{Font, Keys, Map, Palette, Window};
use crate::project::Project;

/// What a source line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// A definition block for one family.
    Open(Family),
    /// `DEFINEMESSAGES` / `EVENT`: ends any tracked definition.
    SectionEnd,
}

impl Directive {
    pub fn detect(line: &str) -> Option<Self> {
        let open = |family| Some(Self::Open(family));
        if line.contains("DEFINEWINDOW") {
            open(Family::Window)
        } else if line.contains("DEFINECONTROLS") {
            open(Family::Keys)
        } else if line.contains("DEFINEBLOCK") {
            open(Family::Blocks)
        } else if line.contains("DEFINESPRITE") {
            open(Family::Sprites)
        } else if line.contains("DEFINEOBJECT") {
            open(Family::Objects)
        } else if line.contains("DEFINESCREEN") {
            open(Family::Screens)
        } else if line.starts_with("MAP") {
            open(Family::Map)
        } else if line.starts_with("DEFINEFONT") {
            open(Family::Font)
        } else if line.starts_with("DEFINEPALETTE") {
            open(Family::Palette)
        } else if line.starts_with("DEFINEMESSAGES") || line.starts_with("EVENT") {
            Some(Self::SectionEnd)
        } else {
            None
        }
    }
}

/// Window and controls apply on their own line; everything else buffers.
fn is_single_line(family: Family) -> bool {
    matches!(family, Family::Window | Family::Keys)
}

/// Keyword lines carried inside map and screen definitions.
const BODY_KEYWORDS: [&str; 4] = ["SPRITEPOSITION", "WIDTH", "STARTSCREEN", "ENDMAP"];

/// A definition body line starts with a decimal number or a body keyword.
fn is_body_line(line: &str) -> bool {
    let Some(first) = line.split_whitespace().next() else {
        return false;
    };
    first.parse::<i64>().is_ok() || BODY_KEYWORDS.iter().any(|k| first.starts_with(k))
}

/// Lines outside `Buffering` are dropped.
#[derive(Debug, Default)]
enum ParseState {
    #[default]
    Idle,
    Buffering(Family, Vec<String>),
    /// Inside an ignored definition.
    Skipping(Family),
}

/// Counts of records merged by one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub records: [usize; Family::COUNT],
    /// Added to block cells of every screen imported in this run.
    pub block_offset: u8,
}

impl ImportSummary {
    pub fn count(&self, family: Family) -> usize {
        self.records[family.index()]
    }

    pub fn total(&self) -> usize {
        self.records.iter().sum()
    }
}

struct Importer<'a> {
    project: &'a mut Project,
    options: &'a ImportOptions,
    touched: [bool; Family::COUNT],
    summary: ImportSummary,
    state: ParseState,
}

impl<'a> Importer<'a> {
    fn new(project: &'a mut Project, options: &'a ImportOptions) -> Self {
        Self {
            project,
            options,
            touched: [false; Family::COUNT],
            summary: ImportSummary::default(),
            state: ParseState::Idle,
        }
    }

    fn line(&mut self, raw: &str) -> Result<()> {
        let line = raw.trim();
        match Directive::detect(line) {
            Some(Directive::SectionEnd) => self.flush(),
            Some(Directive::Open(family)) if self.options.ignores(family) => {
                self.flush()?;
                self.state = ParseState::Skipping(family);
                Ok(())
            }
            Some(Directive::Open(family)) if is_single_line(family) => {
                self.flush()?;
                self.first_touch(family);
                self.apply_single(family, line);
                Ok(())
            }
            Some(Directive::Open(family)) => {
                self.flush()?;
                self.first_touch(family);
                self.state = ParseState::Buffering(family, vec![line.to_string()]);
                Ok(())
            }
            None if line.is_empty() => self.flush(),
            None => {
                if let ParseState::Buffering(family, lines) = &mut self.state {
                    if is_body_line(line) {
                        lines.push(line.to_string());
                    } else {
                        debug!(%family, line, "skipped non-numeric line");
                    }
                }
                Ok(())
            }
        }
    }

    /// Clear the family on its first appearance when overwriting; record
    /// the block offset when appending.
    fn first_touch(&mut self, family: Family) {
        if std::mem::replace(&mut self.touched[family.index()], true) {
            return;
        }
        let overwrite = self.options.overwrites(family);
        let project = &mut *self.project;
        if overwrite {
            debug!(%family, "replacing existing records");
            match family {
                Family::Window => project.window = Window::default(),
                Family::Keys => project.keys = Keys::default(),
                Family::Blocks => project.blocks.clear(),
                Family::Sprites => project.sprites.clear(),
                Family::Objects => project.objects.clear(),
                Family::Screens => {
                    project.screens.clear();
                    project.sprite_info.clear();
                }
                Family::Map => project.map = Map::empty(),
                Family::Font => project.font = Font::default(),
                Family::Palette => project.palette = Palette::default(),
            }
        } else if family == Family::Blocks {
            let existing = project.blocks.len();
            self.summary.block_offset = u8::try_from(existing).unwrap_or_else(|_| {
                warn!(existing, "block offset does not fit in a byte");
                u8::MAX
            });
        }
    }

    fn apply_single(&mut self, family: Family, line: &str) {
        let applied = match family {
            Family::Window => records::import_window(self.project, line),
            Family::Keys => {
                records::import_keys(self.project, line);
                true
            }
            _ => false,
        };
        if applied {
            self.summary.records[family.index()] += 1;
        }
    }

    fn flush(&mut self) -> Result<()> {
        let (family, lines) = match std::mem::take(&mut self.state) {
            ParseState::Buffering(family, lines) => (family, lines),
            ParseState::Skipping(family) => {
                debug!(%family, "skipped ignored definition");
                return Ok(());
            }
            ParseState::Idle => return Ok(()),
        };
        let project = &mut *self.project;
        match family {
            Family::Blocks => records::import_block(project, &lines)?,
            Family::Sprites => records::import_sprite(project, &lines)?,
            Family::Objects => records::import_object(project, &lines)?,
            Family::Screens => {
                let index = records::import_screen(project, &lines)?;
                let offset = self.summary.block_offset;
                if offset > 0 {
                    records::offset_screen_blocks(&mut project.screens[index], offset);
                }
            }
            Family::Map => records::import_map(project, &lines),
            Family::Font => records::import_font(project, &lines),
            Family::Palette => records::import_palette(project, &lines),
            Family::Window | Family::Keys => return Ok(()),
        }
        self.summary.records[family.index()] += 1;
        Ok(())
    }
}

impl Project {
    /// Merge source definitions into this project, then fill any family
    /// that is still empty with its defaults.
    pub fn import_source<R: BufRead>(
        &mut self,
        reader: R,
        options: &ImportOptions,
    ) -> Result<ImportSummary> {
        let mut importer = Importer::new(self, options);
        for line in reader.lines() {
            importer.line(&line?)?;
        }
        importer.flush()?;
        let summary = importer.summary;

        self.populate_defaults();
        info!(
            records = summary.total(),
            blocks = summary.count(Family::Blocks),
            sprites = summary.count(Family::Sprites),
            objects = summary.count(Family::Objects),
            screens = summary.count(Family::Screens),
            block_offset = summary.block_offset,
            "imported source definitions"
        );
        Ok(summary)
    }

    pub fn import_source_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &ImportOptions,
    ) -> Result<ImportSummary> {
        let path = path.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "reading source definitions");
        self.import_source(BufReader::new(file), options)
    }
}
