use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use mpagd_core::transform::{RotateMode, Rotation};
use mpagd_core::{Family, ImportOptions, Project, ProjectError};
use mpagd_render::{JsonStyle, TextRenderOptions, render_json_summary, render_stats_with_options};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mpagd-util", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print record counts for a project file.
    Stats {
        #[arg(value_name = "PROJECT.apj")]
        project: PathBuf,
        #[arg(long, short)]
        verbose: bool,
    },
    /// Describe blocks, sprites and screens of a project file.
    Info {
        #[arg(value_name = "PROJECT.apj")]
        project: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Merge every definition from an AGD source file into a project.
    Import(ImportArgs),
    /// Merge only the selected definition families.
    ImportSelective {
        #[command(flatten)]
        import: ImportArgs,
        #[command(flatten)]
        families: FamilyFlags,
    },
    /// Rotate or reorder blocks.
    Blocks {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Rotate or reorder sprites.
    Sprites {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Reorder screens.
    Screens {
        #[command(subcommand)]
        action: ScreenAction,
    },
    /// List the sections that differ between two project files.
    Compare {
        #[arg(value_name = "FIRST.apj")]
        first: PathBuf,
        #[arg(value_name = "SECOND.apj")]
        second: PathBuf,
    },
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Created when missing.
    #[arg(value_name = "PROJECT.apj")]
    project: PathBuf,
    #[arg(value_name = "SOURCE.agd")]
    source: PathBuf,
    /// Replace each imported family instead of appending to it.
    #[arg(long)]
    replace: bool,
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FamilyFlags {
    #[arg(long)]
    window: bool,
    #[arg(long)]
    keys: bool,
    #[arg(long)]
    blocks: bool,
    #[arg(long)]
    sprites: bool,
    #[arg(long)]
    objects: bool,
    #[arg(long)]
    screens: bool,
    #[arg(long)]
    map: bool,
    #[arg(long)]
    font: bool,
    #[arg(long)]
    palette: bool,
}

impl FamilyFlags {
    fn selected(&self) -> Vec<Family> {
        [
            (Family::Window, self.window),
            (Family::Keys, self.keys),
            (Family::Blocks, self.blocks),
            (Family::Sprites, self.sprites),
            (Family::Objects, self.objects),
            (Family::Screens, self.screens),
            (Family::Map, self.map),
            (Family::Font, self.font),
            (Family::Palette, self.palette),
        ]
        .into_iter()
        .filter_map(|(family, on)| on.then_some(family))
        .collect()
    }
}

#[derive(Debug, Subcommand)]
enum RecordAction {
    /// Rotate by 90 degrees, counter-clockwise unless --clockwise.
    Rotate(RotateArgs),
    /// Move the listed records to the front, after --offset fixed ones.
    Reorder(ReorderArgs),
}

#[derive(Debug, Subcommand)]
enum ScreenAction {
    Reorder(ReorderArgs),
}

#[derive(Debug, Args)]
struct RotateArgs {
    #[arg(value_name = "PROJECT.apj")]
    project: PathBuf,
    #[arg(required_unless_present = "start")]
    index: Option<usize>,
    #[arg(long)]
    clockwise: bool,
    #[arg(long, short, default_value_t = 1)]
    repeat: usize,
    /// Keep the original and append each rotated copy.
    #[arg(long, short)]
    add: bool,
    /// First record of a range; the range excludes --end.
    #[arg(long, short, requires = "end")]
    start: Option<usize>,
    #[arg(long, short, requires = "start")]
    end: Option<usize>,
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReorderArgs {
    #[arg(value_name = "PROJECT.apj")]
    project: PathBuf,
    /// Comma-separated indices, e.g. 3,0,2.
    #[arg(value_name = "ORDER", value_parser = parse_order)]
    order: OrderList,
    #[arg(long, default_value_t = 0)]
    offset: usize,
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct OrderList(Vec<usize>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Records {
    Blocks,
    Sprites,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), ProjectError> {
    match command {
        Command::Stats { project, verbose } => {
            let project = Project::load(&project)?;
            print!(
                "{}",
                render_stats_with_options(&project, TextRenderOptions { verbose })
            );
            Ok(())
        }
        Command::Info { project, json } => {
            let project = Project::load(&project)?;
            if json {
                let value = render_json_summary(&project, JsonStyle::CanonicalV1);
                let rendered = serde_json::to_string_pretty(&value).unwrap_or_else(|e| {
                    eprintln!("Error rendering JSON output: {e}");
                    process::exit(1);
                });
                println!("{rendered}");
            } else {
                print!(
                    "{}",
                    render_stats_with_options(&project, TextRenderOptions { verbose: true })
                );
            }
            Ok(())
        }
        Command::Import(args) => import(&args, ImportOptions::all()),
        Command::ImportSelective { import: args, families } => {
            let selected = families.selected();
            if selected.is_empty() {
                eprintln!("import-selective needs at least one family flag");
                process::exit(2);
            }
            import(&args, ImportOptions::only(&selected))
        }
        Command::Blocks { action } => record_action(Records::Blocks, action),
        Command::Sprites { action } => record_action(Records::Sprites, action),
        Command::Screens {
            action: ScreenAction::Reorder(args),
        } => {
            let mut project = Project::load(&args.project)?;
            let mapping = project.reorder_screens(&args.order.0, args.offset)?;
            info!(?mapping, "screens reordered");
            save(&project, &args.project, args.output.as_deref())
        }
        Command::Compare { first, second } => {
            let diffs = Project::load(&first)?.compare(&Project::load(&second)?);
            if diffs.is_empty() {
                println!("identical");
            }
            for diff in diffs {
                match diff.counts {
                    Some((a, b)) => println!("{}: {a} vs {b}", diff.section),
                    None => println!("{}: differs", diff.section),
                }
            }
            Ok(())
        }
    }
}

fn import(args: &ImportArgs, options: ImportOptions) -> Result<(), ProjectError> {
    let options = options.with_overwrite_all(args.replace);
    let (mut project, _) = Project::open_or_blank(&args.project);
    let summary = project.import_source_file(&args.source, &options)?;
    for family in Family::ALL {
        let count = summary.count(family);
        if count > 0 {
            println!("{family}: {count}");
        }
    }
    save(&project, &args.project, args.output.as_deref())
}

fn record_action(records: Records, action: RecordAction) -> Result<(), ProjectError> {
    match action {
        RecordAction::Rotate(args) => {
            let (start, end) = match (args.start, args.end) {
                (Some(start), Some(end)) if start < end => (start, end),
                (Some(_), Some(_)) => {
                    eprintln!("--start must be below --end");
                    process::exit(2);
                }
                _ => {
                    let index = args.index.unwrap_or_default();
                    (index, index + 1)
                }
            };
            let mut project = Project::load(&args.project)?;
            let rotation = if args.clockwise {
                Rotation::Clockwise
            } else {
                Rotation::CounterClockwise
            };
            let mode = if args.add {
                RotateMode::RetainAndAppend
            } else {
                RotateMode::InPlace
            };
            for first in start..end {
                let mut current = first;
                for _ in 0..args.repeat {
                    current = match records {
                        Records::Blocks => project.rotate_block(current, rotation, mode)?,
                        Records::Sprites => project.rotate_sprite(current, rotation, mode)?,
                    };
                    if args.add {
                        info!(index = current, "appended rotated copy");
                    }
                }
            }
            save(&project, &args.project, args.output.as_deref())
        }
        RecordAction::Reorder(args) => {
            let mut project = Project::load(&args.project)?;
            let mapping = match records {
                Records::Blocks => project.reorder_blocks(&args.order.0, args.offset)?,
                Records::Sprites => project.reorder_sprites(&args.order.0, args.offset)?,
            };
            info!(?mapping, "reordered");
            save(&project, &args.project, args.output.as_deref())
        }
    }
}

/// Writes back to the input unless an output path was given.
fn save(project: &Project, input: &Path, output: Option<&Path>) -> Result<(), ProjectError> {
    let target = output.unwrap_or(input);
    project.save(target)?;
    info!(path = %target.display(), "project written");
    Ok(())
}

fn parse_order(value: &str) -> Result<OrderList, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| format!("invalid index '{part}' in order '{value}'"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(OrderList)
}
