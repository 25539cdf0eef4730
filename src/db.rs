use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::parser::{ExtractedRecipe, ParsedIngredient, ParsedInstruction, ScoreReport};

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("opening {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("setting connection pragmas")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS import_runs (
            id           TEXT PRIMARY KEY,
            source_count INTEGER NOT NULL,
            started_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id                 INTEGER PRIMARY KEY,
            run_id             TEXT NOT NULL REFERENCES import_runs(id),
            detected_id        TEXT NOT NULL,
            source             TEXT NOT NULL,
            title              TEXT NOT NULL,
            description        TEXT,
            category           TEXT NOT NULL,
            servings           INTEGER,
            prep_time_minutes  INTEGER,
            cook_time_minutes  INTEGER,
            total_time_minutes INTEGER,
            notes              TEXT NOT NULL DEFAULT '',
            is_complete        BOOLEAN NOT NULL,
            score              INTEGER NOT NULL,
            is_good_quality    BOOLEAN NOT NULL,
            source_raw_text    TEXT NOT NULL,
            created_at         TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_recipes_category ON recipes(category);
        CREATE INDEX IF NOT EXISTS idx_recipes_run ON recipes(run_id);

        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            id               INTEGER PRIMARY KEY,
            recipe_id        INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            position         INTEGER NOT NULL,
            raw_text         TEXT NOT NULL,
            quantity         TEXT,
            unit             TEXT,
            name             TEXT NOT NULL,
            preparation_note TEXT,
            UNIQUE(recipe_id, position)
        );

        CREATE TABLE IF NOT EXISTS recipe_instructions (
            id          INTEGER PRIMARY KEY,
            recipe_id   INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            step_number INTEGER NOT NULL,
            text        TEXT NOT NULL,
            UNIQUE(recipe_id, step_number)
        );

        CREATE TABLE IF NOT EXISTS recipe_tags (
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            tag       TEXT NOT NULL,
            UNIQUE(recipe_id, tag)
        );
        CREATE INDEX IF NOT EXISTS idx_tags_tag ON recipe_tags(tag);
        ",
    )
    .context("creating schema")?;
    Ok(())
}

// ── Import runs ──

/// Record a new import run. The id is the UTC start time plus the run's
/// sequence number.
pub fn start_run(conn: &Connection, source_count: usize) -> Result<String> {
    let now = chrono::Utc::now();
    let previous: i64 = conn
        .query_row("SELECT COUNT(*) FROM import_runs", [], |r| r.get(0))
        .context("counting import runs")?;
    let run_id = format!("{}-{}", now.format("%Y%m%dT%H%M%SZ"), previous + 1);
    conn.execute(
        "INSERT INTO import_runs (id, source_count, started_at) VALUES (?1, ?2, ?3)",
        params![run_id, source_count, now.to_rfc3339()],
    )
    .with_context(|| format!("recording import run {}", run_id))?;
    Ok(run_id)
}

// ── Recipes ──

pub struct RecipeRow<'a> {
    pub source: String,
    pub recipe: &'a ExtractedRecipe,
    pub report: &'a ScoreReport,
}

/// Save recipes with their ingredients, steps and tags in one transaction.
/// Returns the storage ids in input order.
pub fn save_recipes(conn: &Connection, run_id: &str, rows: &[RecipeRow<'_>]) -> Result<Vec<i64>> {
    let tx = conn.unchecked_transaction().context("starting recipe transaction")?;
    let mut ids = Vec::with_capacity(rows.len());
    {
        let mut r_stmt = tx.prepare(
            "INSERT INTO recipes
             (run_id, detected_id, source, title, description, category, servings,
              prep_time_minutes, cook_time_minutes, total_time_minutes, notes,
              is_complete, score, is_good_quality, source_raw_text)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
        )
        .context("preparing recipe insert")?;
        let mut i_stmt = tx.prepare(
            "INSERT INTO recipe_ingredients
             (recipe_id, position, raw_text, quantity, unit, name, preparation_note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .context("preparing ingredient insert")?;
        let mut s_stmt = tx.prepare(
            "INSERT INTO recipe_instructions (recipe_id, step_number, text) VALUES (?1, ?2, ?3)",
        )
        .context("preparing instruction insert")?;
        let mut t_stmt = tx
            .prepare("INSERT OR IGNORE INTO recipe_tags (recipe_id, tag) VALUES (?1, ?2)")
            .context("preparing tag insert")?;

        for row in rows {
            let r = row.recipe;
            let id = r_stmt.insert(params![
                run_id, r.id, row.source, r.title, r.description, r.category, r.servings,
                r.prep_time_minutes, r.cook_time_minutes, r.total_time_minutes, r.notes,
                r.is_complete, row.report.score, row.report.is_good_quality, r.source_raw_text,
            ])
            .with_context(|| format!("saving recipe {:?} from {}", r.title, row.source))?;
            for ing in &r.ingredients {
                i_stmt.execute(params![
                    id, ing.order, ing.raw_text, ing.quantity, ing.unit,
                    ing.ingredient_name, ing.preparation_note,
                ])
                .with_context(|| format!("saving ingredient {:?}", ing.raw_text))?;
            }
            for step in &r.instructions {
                s_stmt
                    .execute(params![id, step.step_number, step.text])
                    .with_context(|| format!("saving step {} of recipe {}", step.step_number, id))?;
            }
            for tag in &r.tags {
                t_stmt
                    .execute(params![id, tag])
                    .with_context(|| format!("saving tag {:?}", tag))?;
            }
            ids.push(id);
        }
    }
    tx.commit().context("committing recipes")?;
    Ok(ids)
}

/// Rebuild a stored recipe. `id` becomes the storage id.
pub fn fetch_recipe(conn: &Connection, id: i64) -> Result<Option<ExtractedRecipe>> {
    let recipe = conn
        .query_row(
            "SELECT title, description, category, servings, prep_time_minutes,
                    cook_time_minutes, total_time_minutes, notes, is_complete, source_raw_text
             FROM recipes WHERE id = ?1",
            [id],
            |row| {
                Ok(ExtractedRecipe {
                    id: id.to_string(),
                    title: row.get(0)?,
                    description: row.get(1)?,
                    ingredients: Vec::new(),
                    instructions: Vec::new(),
                    servings: row.get(3)?,
                    prep_time_minutes: row.get(4)?,
                    cook_time_minutes: row.get(5)?,
                    total_time_minutes: row.get(6)?,
                    category: row.get(2)?,
                    tags: BTreeSet::new(),
                    notes: row.get(7)?,
                    is_complete: row.get(8)?,
                    source_raw_text: row.get(9)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("loading recipe {}", id))?;

    let Some(mut recipe) = recipe else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT raw_text, quantity, unit, name, preparation_note, position
         FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position",
    )
    .context("preparing ingredient query")?;
    recipe.ingredients = stmt
        .query_map([id], |row| {
            Ok(ParsedIngredient {
                raw_text: row.get(0)?,
                quantity: row.get(1)?,
                unit: row.get(2)?,
                ingredient_name: row.get(3)?,
                preparation_note: row.get(4)?,
                order: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("loading ingredients of recipe {}", id))?;

    let mut stmt = conn.prepare(
        "SELECT text, step_number FROM recipe_instructions
         WHERE recipe_id = ?1 ORDER BY step_number",
    )
    .context("preparing instruction query")?;
    recipe.instructions = stmt
        .query_map([id], |row| {
            Ok(ParsedInstruction {
                text: row.get(0)?,
                step_number: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("loading steps of recipe {}", id))?;

    let mut stmt = conn
        .prepare("SELECT tag FROM recipe_tags WHERE recipe_id = ?1")
        .context("preparing tag query")?;
    recipe.tags = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<Result<BTreeSet<String>, _>>()
        .with_context(|| format!("loading tags of recipe {}", id))?;

    Ok(Some(recipe))
}

// ── Overview ──

#[derive(Debug)]
pub struct OverviewRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub ingredient_count: usize,
    pub step_count: usize,
    pub total_time_minutes: Option<u32>,
    pub score: u8,
    pub source: String,
}

pub fn fetch_overview(
    conn: &Connection,
    category: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let where_clause = if category.is_some() { " WHERE r.category = ?1" } else { "" };
    let sql = format!(
        "SELECT r.id, r.title, r.category,
                (SELECT COUNT(*) FROM recipe_ingredients i WHERE i.recipe_id = r.id),
                (SELECT COUNT(*) FROM recipe_instructions s WHERE s.recipe_id = r.id),
                r.total_time_minutes, r.score, r.source
         FROM recipes r{}
         ORDER BY r.score DESC, r.id
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql).context("preparing overview query")?;
    let rows = match category {
        Some(c) => stmt.query_map([c], overview_row)?.collect::<Result<Vec<_>, _>>(),
        None => stmt.query_map([], overview_row)?.collect::<Result<Vec<_>, _>>(),
    };
    rows.context("loading recipe overview")
}

fn overview_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OverviewRow> {
    Ok(OverviewRow {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        ingredient_count: row.get(3)?,
        step_count: row.get(4)?,
        total_time_minutes: row.get(5)?,
        score: row.get(6)?,
        source: row.get(7)?,
    })
}

// ── Stats ──

#[derive(Debug)]
pub struct Stats {
    pub recipes: usize,
    pub complete: usize,
    pub good_quality: usize,
    pub runs: usize,
    pub by_category: Vec<(String, usize)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> {
        conn.query_row(sql, [], |r| r.get(0))
            .with_context(|| format!("running {}", sql))
    };
    let recipes = count("SELECT COUNT(*) FROM recipes")?;
    let complete = count("SELECT COUNT(*) FROM recipes WHERE is_complete = 1")?;
    let good_quality = count("SELECT COUNT(*) FROM recipes WHERE is_good_quality = 1")?;
    let runs = count("SELECT COUNT(*) FROM import_runs")?;

    let mut stmt = conn
        .prepare(
            "SELECT category, COUNT(*) FROM recipes GROUP BY category ORDER BY COUNT(*) DESC, category",
        )
        .context("preparing category counts")?;
    let by_category = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()
        .context("counting recipes per category")?;

    Ok(Stats {
        recipes,
        complete,
        good_quality,
        runs,
        by_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{detect_recipes, score_recipe};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn import_fixture(conn: &Connection, name: &str) -> (Vec<ExtractedRecipe>, Vec<i64>) {
        let text = std::fs::read_to_string(format!("tests/fixtures/{}.txt", name)).unwrap();
        let recipes = detect_recipes(&text);
        let reports: Vec<ScoreReport> = recipes.iter().map(score_recipe).collect();
        let rows: Vec<RecipeRow<'_>> = recipes
            .iter()
            .zip(&reports)
            .map(|(recipe, report)| RecipeRow {
                source: format!("{}.txt", name),
                recipe,
                report,
            })
            .collect();
        let run_id = start_run(conn, 1).unwrap();
        let ids = save_recipes(conn, &run_id, &rows).unwrap();
        (recipes, ids)
    }

    #[test]
    fn save_and_fetch_round_trip() {
        let conn = memory_db();
        let (recipes, ids) = import_fixture(&conn, "two_recipes");
        assert_eq!(ids.len(), 2);

        let stored = fetch_recipe(&conn, ids[1]).unwrap().unwrap();
        let original = &recipes[1];
        assert_eq!(stored.id, ids[1].to_string());
        assert_eq!(stored.title, original.title);
        assert_eq!(stored.ingredients, original.ingredients);
        assert_eq!(stored.instructions, original.instructions);
        assert_eq!(stored.tags, original.tags);
        assert_eq!(stored.total_time_minutes, original.total_time_minutes);
        assert!(stored.is_complete);
    }

    #[test]
    fn errors_name_the_failed_query() {
        let conn = Connection::open_in_memory().unwrap();
        let err = get_stats(&conn).unwrap_err();
        assert!(format!("{:#}", err).contains("SELECT COUNT(*) FROM recipes"));

        let err = fetch_recipe(&conn, 1).unwrap_err();
        assert!(format!("{:#}", err).contains("loading recipe 1"));

        let err = start_run(&conn, 1).unwrap_err();
        assert!(format!("{:#}", err).contains("counting import runs"));
    }

    #[test]
    fn missing_recipe() {
        let conn = memory_db();
        assert!(fetch_recipe(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn overview_filters_by_category() {
        let conn = memory_db();
        import_fixture(&conn, "two_recipes");
        import_fixture(&conn, "tomato_soup");

        let all = fetch_overview(&conn, None, 10).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));

        let soups = fetch_overview(&conn, Some("Soups"), 10).unwrap();
        assert_eq!(soups.len(), 1);
        assert_eq!(soups[0].title, "Tomato Soup");
        assert_eq!(soups[0].ingredient_count, 3);
        assert_eq!(soups[0].step_count, 3);

        assert_eq!(fetch_overview(&conn, None, 1).unwrap().len(), 1);
    }

    #[test]
    fn stats_count_runs_and_categories() {
        let conn = memory_db();
        import_fixture(&conn, "two_recipes");
        import_fixture(&conn, "cookbook");

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.recipes, 4);
        assert_eq!(stats.complete, 4);
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.by_category.iter().map(|(_, n)| n).sum::<usize>(), 4);
        assert!(stats.by_category.iter().any(|(c, _)| c == "Breakfast"));
    }
}
