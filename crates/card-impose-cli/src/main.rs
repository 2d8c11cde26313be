mod logger;
mod manifest;

use anyhow::Result;
use card_impose::constants::pt_to_mm;
use card_impose::{BatchReport, ImposeError, ImpositionOptions};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use logger::CliLogger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cimp", about = "Impose business-card PDFs onto print sheets", version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Warn,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Impose every card in a batch manifest onto print sheets
    Impose {
        /// JSON manifest: array of {"id", "label", "pdf_base64"}
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output PDF file
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Directory for the output, named impression-batch-<date>.pdf
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show sheet usage and card placements for a page count, without any PDF
    Plan {
        /// Number of card pages (fronts and backs)
        #[arg(short, long)]
        pages: usize,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON options file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Output orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Card rows per sheet
    #[arg(long)]
    rows: Option<usize>,

    /// Card columns per sheet
    #[arg(long)]
    cols: Option<usize>,

    /// Card width in mm
    #[arg(long)]
    card_width: Option<f32>,

    /// Card height in mm
    #[arg(long)]
    card_height: Option<f32>,

    /// Left margin in mm
    #[arg(long)]
    margin_x: Option<f32>,

    /// Top margin in mm
    #[arg(long)]
    margin_y: Option<f32>,

    /// Horizontal gap between cards in mm
    #[arg(long)]
    gap_x: Option<f32>,

    /// Vertical gap between cards in mm
    #[arg(long)]
    gap_y: Option<f32>,

    /// How pages that do not match the card box are fitted
    #[arg(long, value_enum)]
    aspect: Option<AspectArg>,

    /// Add crop marks around each card
    #[arg(long)]
    crop_marks: bool,
}

impl LayoutArgs {
    async fn resolve(&self) -> Result<ImpositionOptions> {
        let mut options = match &self.config {
            Some(path) => ImpositionOptions::load(path).await?,
            None => ImpositionOptions::default(),
        };

        if let Some(paper) = self.paper {
            options.sheet_size = paper.into();
        }
        if let Some(orientation) = self.orientation {
            options.orientation = orientation.into();
        }
        if let Some(rows) = self.rows {
            options.rows = rows;
        }
        if let Some(cols) = self.cols {
            options.cols = cols;
        }
        let lengths = [
            (self.card_width, &mut options.card_width_mm),
            (self.card_height, &mut options.card_height_mm),
            (self.margin_x, &mut options.margin_x_mm),
            (self.margin_y, &mut options.margin_y_mm),
            (self.gap_x, &mut options.gap_x_mm),
            (self.gap_y, &mut options.gap_y_mm),
        ];
        for (flag, field) in lengths {
            if let Some(mm) = flag {
                *field = mm;
            }
        }
        if let Some(aspect) = self.aspect {
            options.aspect_policy = aspect.into();
        }
        options.crop_marks |= self.crop_marks;

        options.validate()?;
        Ok(options)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum AspectArg {
    Stretch,
    Fit,
    Exact,
}

impl From<PaperArg> for card_impose::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for card_impose::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<AspectArg> for card_impose::AspectPolicy {
    fn from(arg: AspectArg) -> Self {
        match arg {
            AspectArg::Stretch => Self::Stretch,
            AspectArg::Fit => Self::Fit,
            AspectArg::Exact => Self::AssumeExact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(cli.log_level()).init()?;

    match cli.command {
        Commands::Impose {
            manifest,
            output,
            output_dir,
            layout,
        } => {
            let options = layout.resolve().await?;
            let items = manifest::load(&manifest).await?;

            let batch = match card_impose::impose_batch(items, &options).await {
                Ok(batch) => batch,
                Err(ImposeError::NoEmbeddablePages { failures }) => {
                    for failure in &failures {
                        println!(
                            "  Skipped {} ({}): {}",
                            failure.item_id, failure.label, failure.error
                        );
                    }
                    anyhow::bail!("None of the {} item(s) could be embedded", failures.len());
                }
                Err(e) => return Err(e.into()),
            };

            print_report(&batch.report);

            let path = match output {
                Some(path) => {
                    card_impose::save_batch(&batch, &path).await?;
                    path
                }
                None => {
                    let dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
                    card_impose::save_batch_in(&batch, &dir).await?
                }
            };
            println!("Imposed → {} ({})", path.display(), batch.content_type());
        }

        Commands::Plan { pages, layout } => {
            let options = layout.resolve().await?;
            let grid = options.grid();

            let stats = card_impose::calculate_statistics(pages, &grid);
            println!("Sheet Plan:");
            println!("  Card pages: {}", stats.pages);
            println!("  Cards per sheet: {}", stats.capacity);
            println!("  Output sheets: {}", stats.sheets);
            println!("  Empty card boxes: {}", stats.empty_slots);

            if pages > 0 {
                println!();
                println!("  page  sheet  row  col   x (mm)   y (mm)");
                for (index, slot) in card_impose::plan(pages, &grid).iter().enumerate() {
                    println!(
                        "  {:>4}  {:>5}  {:>3}  {:>3}  {:>7.1}  {:>7.1}",
                        index + 1,
                        slot.sheet_index + 1,
                        slot.row,
                        slot.col,
                        pt_to_mm(slot.x),
                        pt_to_mm(slot.y)
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    let stats = &report.statistics;
    println!("Imposition Report:");
    println!("  Items embedded: {}", report.embedded.len());
    println!("  Items skipped: {}", report.failures.len());
    println!("  Card pages: {}", stats.pages);
    println!("  Output sheets: {}", stats.sheets);
    println!(
        "  Last sheet: {}/{} card boxes used",
        stats.slots_used_on_last_sheet, stats.capacity
    );

    for failure in &report.failures {
        println!(
            "  Skipped {} ({}): {}",
            failure.item_id, failure.label, failure.error
        );
    }
}
