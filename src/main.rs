use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use chef_notebook::config::Settings;
use chef_notebook::db;
use chef_notebook::parser::{self, DetectorConfig, ExtractedRecipe, ScoreReport};

#[derive(Parser)]
#[command(name = "chef_notebook", about = "Recipe text detection and recipe library")]
struct Cli {
    /// SQLite library path (overrides NOTEBOOK_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect recipes in a text file ("-" reads stdin)
    Detect {
        input: PathBuf,
        /// Print recipes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect recipes and print their quality scores
    Score { input: PathBuf },
    /// Detect recipes in files and save them to the library
    Import {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Skip recipes scoring below this
        #[arg(long)]
        min_score: Option<u8>,
    },
    /// Stored recipes overview table
    List {
        /// Filter by category (e.g. "Soups")
        #[arg(short, long)]
        category: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Print a stored recipe as JSON
    Show { id: i64 },
    /// Library statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(path) = cli.db {
        settings.db_path = path;
    }
    let detector = settings.detector;

    let result = match cli.command {
        Commands::Detect { input, json } => {
            let text = read_input(&input)?;
            let recipes = parser::detect_recipes_with(&text, &detector);
            if json {
                println!("{}", serde_json::to_string_pretty(&recipes)?);
            } else if recipes.is_empty() {
                println!("No recipes found.");
            } else {
                print_recipe_table(&recipes, &detector);
            }
            Ok(())
        }
        Commands::Score { input } => {
            let text = read_input(&input)?;
            let recipes = parser::detect_recipes_with(&text, &detector);
            if recipes.is_empty() {
                println!("No recipes found.");
                return Ok(());
            }
            for r in &recipes {
                let report = parser::score_recipe_with(r, &detector);
                print_report(r, &report);
            }
            Ok(())
        }
        Commands::Import { inputs, min_score } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let counts = import_files(&conn, &inputs, &detector, min_score)?;
            counts.print();
            Ok(())
        }
        Commands::List { category, limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, category.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No recipes stored.");
                return Ok(());
            }

            println!(
                "{:>5} | {:<32} | {:<12} | {:>4} | {:>5} | {:>5} | {:>5} | {:<20}",
                "id", "Title", "Category", "Ingr", "Steps", "Time", "Score", "Source"
            );
            println!("{}", "-".repeat(108));
            for r in &rows {
                let time = r.total_time_minutes.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{:>5} | {:<32} | {:<12} | {:>4} | {:>5} | {:>5} | {:>5} | {:<20}",
                    r.id,
                    truncate(&r.title, 32),
                    truncate(&r.category, 12),
                    r.ingredient_count,
                    r.step_count,
                    time,
                    r.score,
                    truncate(&r.source, 20)
                );
            }
            println!("\n{} recipes", rows.len());
            Ok(())
        }
        Commands::Show { id } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            match db::fetch_recipe(&conn, id)? {
                Some(recipe) => println!("{}", serde_json::to_string_pretty(&recipe)?),
                None => println!("No recipe with id {}.", id),
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Recipes:      {}", s.recipes);
            println!("Complete:     {}", s.complete);
            println!("Good quality: {}", s.good_quality);
            println!("Import runs:  {}", s.runs);
            if !s.by_category.is_empty() {
                println!("\n--- Categories ---");
                for (category, count) in &s.by_category {
                    println!("  {:<16} {}", category, count);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_recipe_table(recipes: &[ExtractedRecipe], detector: &DetectorConfig) {
    println!(
        "{:>3} | {:<32} | {:<12} | {:>4} | {:>5} | {:>5} | {:>5} | {}",
        "#", "Title", "Category", "Ingr", "Steps", "Time", "Score", "Tags"
    );
    println!("{}", "-".repeat(100));
    for (i, r) in recipes.iter().enumerate() {
        let report = parser::score_recipe_with(r, detector);
        let time = r.total_time_minutes.map(|t| t.to_string()).unwrap_or_else(|| "-".into());
        let title = if r.title.is_empty() { "(untitled)" } else { r.title.as_str() };
        println!(
            "{:>3} | {:<32} | {:<12} | {:>4} | {:>5} | {:>5} | {:>5} | {}",
            i + 1,
            truncate(title, 32),
            truncate(&r.category, 12),
            r.ingredients.len(),
            r.instructions.len(),
            time,
            report.score,
            r.tags.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }
    println!("\n{} recipes", recipes.len());
}

fn print_report(recipe: &ExtractedRecipe, report: &ScoreReport) {
    let title = if recipe.title.is_empty() { "(untitled)" } else { recipe.title.as_str() };
    let verdict = if report.is_good_quality { "good" } else { "needs review" };
    println!("{} - {}/100 ({})", title, report.score, verdict);
    for issue in &report.issues {
        println!("  - {}", issue);
    }
}

struct ImportCounts {
    files: usize,
    unreadable: usize,
    detected: usize,
    saved: usize,
    rejected: usize,
}

impl ImportCounts {
    fn print(&self) {
        println!(
            "Read {} files ({} unreadable). Detected {} recipes, saved {}, rejected {}.",
            self.files, self.unreadable, self.detected, self.saved, self.rejected,
        );
    }
}

fn import_files(
    conn: &rusqlite::Connection,
    inputs: &[PathBuf],
    detector: &DetectorConfig,
    min_score: Option<u8>,
) -> Result<ImportCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let mut counts = ImportCounts {
        files: inputs.len(),
        unreadable: 0,
        detected: 0,
        saved: 0,
        rejected: 0,
    };

    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        match read_input(path) {
            Ok(text) => sources.push((path.display().to_string(), text)),
            Err(e) => {
                warn!("skipping {}: {:#}", path.display(), e);
                counts.unreadable += 1;
            }
        }
    }
    if sources.is_empty() {
        return Ok(counts);
    }

    let run_id = db::start_run(conn, sources.len())?;
    info!(run_id = %run_id, files = sources.len(), "import started");

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    for chunk in sources.chunks(200) {
        let results: Vec<(String, Vec<(ExtractedRecipe, ScoreReport)>)> = chunk
            .par_iter()
            .map(|(source, text)| {
                let scored = parser::detect_recipes_with(text, detector)
                    .into_iter()
                    .map(|r| {
                        let report = parser::score_recipe_with(&r, detector);
                        (r, report)
                    })
                    .collect();
                (source.clone(), scored)
            })
            .collect();

        let mut rows = Vec::new();
        for (source, scored) in &results {
            counts.detected += scored.len();
            for (recipe, report) in scored {
                if min_score.is_some_and(|min| report.score < min) {
                    warn!(
                        source = %source,
                        title = %recipe.title,
                        score = report.score,
                        "recipe below minimum score, not saved"
                    );
                    counts.rejected += 1;
                    continue;
                }
                rows.push(db::RecipeRow {
                    source: source.clone(),
                    recipe,
                    report,
                });
            }
        }

        counts.saved += db::save_recipes(conn, &run_id, &rows)?.len();
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(run_id = %run_id, saved = counts.saved, rejected = counts.rejected, "import finished");
    Ok(counts)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
