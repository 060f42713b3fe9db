//! Discovery entry persistence
//!
//! Entries are insert-only; nothing in this module mutates an existing row.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::models::{ConservationStatus, DiscoveryEntry, GeoLocation, Rarity, SpeciesType};

const ENTRY_COLUMNS: &str = "id, user_id, name, scientific_name, description, species_type, \
     rarity, habitat, region, image, original_image, stats, abilities, fun_facts, \
     conservation_status, experience_points, latitude, longitude, address, discovered_at, \
     is_first_discovery";

/// Listing filters and pagination (newest first)
#[derive(Debug, Clone)]
pub struct EntryFilter {
    pub species_type: Option<SpeciesType>,
    pub rarity: Option<Rarity>,
    /// 1-based page number
    pub page: i64,
    pub limit: i64,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self {
            species_type: None,
            rarity: None,
            page: 1,
            limit: 10,
        }
    }
}

/// Slim projection for the stats endpoint's recent-discoveries list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDiscovery {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub species_type: SpeciesType,
    pub rarity: Rarity,
    pub discovered_at: DateTime<Utc>,
    pub image: String,
}

/// Insert a new discovery entry (callable inside a transaction)
pub async fn insert_entry(conn: &mut SqliteConnection, entry: &DiscoveryEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO discoveries (
            id, user_id, name, scientific_name, description, species_type, rarity,
            habitat, region, image, original_image, stats, abilities, fun_facts,
            conservation_status, experience_points, latitude, longitude, address,
            discovered_at, is_first_discovery
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(entry.user_id.to_string())
    .bind(&entry.name)
    .bind(&entry.scientific_name)
    .bind(&entry.description)
    .bind(entry.species_type.as_str())
    .bind(entry.rarity.as_str())
    .bind(&entry.habitat)
    .bind(&entry.region)
    .bind(&entry.image)
    .bind(&entry.original_image)
    .bind(serde_json::to_string(&entry.stats)?)
    .bind(serde_json::to_string(&entry.abilities)?)
    .bind(serde_json::to_string(&entry.fun_facts)?)
    .bind(entry.conservation_status.as_str())
    .bind(entry.experience_points)
    .bind(entry.location.latitude)
    .bind(entry.location.longitude)
    .bind(entry.location.address.as_deref())
    .bind(entry.discovered_at.to_rfc3339())
    .bind(entry.is_first_discovery as i64)
    .execute(conn)
    .await?;

    Ok(())
}

/// Novelty check: does this user already have an entry for this scientific name?
pub async fn find_by_user_and_species(
    conn: &mut SqliteConnection,
    user_id: Uuid,
    scientific_name: &str,
) -> Result<Option<DiscoveryEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM discoveries
         WHERE user_id = ? AND scientific_name = ?
         ORDER BY discovered_at ASC
         LIMIT 1"
    ))
    .bind(user_id.to_string())
    .bind(scientific_name)
    .fetch_optional(conn)
    .await?;

    row.map(row_to_entry).transpose()
}

/// Load a single entry scoped to its owner
pub async fn find_by_id(
    pool: &SqlitePool,
    user_id: Uuid,
    entry_id: Uuid,
) -> Result<Option<DiscoveryEntry>> {
    let row = sqlx::query(&format!(
        "SELECT {ENTRY_COLUMNS} FROM discoveries WHERE id = ? AND user_id = ?"
    ))
    .bind(entry_id.to_string())
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(row_to_entry).transpose()
}

/// List a user's entries newest first with optional type/rarity filters.
/// Returns the page plus the total count matching the filters.
pub async fn list_entries(
    pool: &SqlitePool,
    user_id: Uuid,
    filter: &EntryFilter,
) -> Result<(Vec<DiscoveryEntry>, i64)> {
    let mut where_clause = String::from("WHERE user_id = ?");
    if filter.species_type.is_some() {
        where_clause.push_str(" AND species_type = ?");
    }
    if filter.rarity.is_some() {
        where_clause.push_str(" AND rarity = ?");
    }

    let page = filter.page.max(1);
    let limit = filter.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM discoveries {where_clause}
         ORDER BY discovered_at DESC
         LIMIT ? OFFSET ?"
    );
    let mut query = sqlx::query(&sql).bind(user_id.to_string());
    if let Some(t) = filter.species_type {
        query = query.bind(t.as_str());
    }
    if let Some(r) = filter.rarity {
        query = query.bind(r.as_str());
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    let entries = rows
        .into_iter()
        .map(row_to_entry)
        .collect::<Result<Vec<_>>>()?;

    let count_sql = format!("SELECT COUNT(*) AS n FROM discoveries {where_clause}");
    let mut count_query = sqlx::query(&count_sql).bind(user_id.to_string());
    if let Some(t) = filter.species_type {
        count_query = count_query.bind(t.as_str());
    }
    if let Some(r) = filter.rarity {
        count_query = count_query.bind(r.as_str());
    }
    let total: i64 = count_query.fetch_one(pool).await?.get("n");

    Ok((entries, total))
}

/// Total number of entries for a user
pub async fn count_entries(pool: &SqlitePool, user_id: Uuid) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM discoveries WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(row.get("n"))
}

/// Per-value counts over one of the discrete columns (species_type or rarity)
async fn counts_by_column(
    pool: &SqlitePool,
    user_id: Uuid,
    column: &str,
) -> Result<Vec<(String, i64)>> {
    let sql = format!(
        "SELECT {column} AS label, COUNT(*) AS n FROM discoveries
         WHERE user_id = ? GROUP BY {column}"
    );
    let rows = sqlx::query(&sql)
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| (r.get::<String, _>("label"), r.get::<i64, _>("n")))
        .collect())
}

pub async fn counts_by_type(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<(String, i64)>> {
    counts_by_column(pool, user_id, "species_type").await
}

pub async fn counts_by_rarity(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<(String, i64)>> {
    counts_by_column(pool, user_id, "rarity").await
}

/// Most recent discoveries, slim projection for the stats endpoint
pub async fn recent_entries(
    pool: &SqlitePool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<RecentDiscovery>> {
    let rows = sqlx::query(
        "SELECT id, name, species_type, rarity, discovered_at, image FROM discoveries
         WHERE user_id = ?
         ORDER BY discovered_at DESC
         LIMIT ?",
    )
    .bind(user_id.to_string())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(RecentDiscovery {
                id: parse_uuid(&row, "id")?,
                name: row.get("name"),
                species_type: parse_species_type(row.get("species_type"))?,
                rarity: parse_rarity(row.get("rarity"))?,
                discovered_at: parse_timestamp(&row, "discovered_at")?,
                image: row.get("image"),
            })
        })
        .collect()
}

fn parse_uuid(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let s: String = row.get(column);
    Ok(Uuid::parse_str(&s)?)
}

fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let s: String = row.get(column);
    Ok(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc))
}

fn parse_species_type(s: String) -> Result<SpeciesType> {
    SpeciesType::parse(&s).ok_or_else(|| anyhow!("unknown species type in database: {s}"))
}

fn parse_rarity(s: String) -> Result<Rarity> {
    Rarity::parse(&s).ok_or_else(|| anyhow!("unknown rarity in database: {s}"))
}

fn row_to_entry(row: SqliteRow) -> Result<DiscoveryEntry> {
    let stats_json: String = row.get("stats");
    let abilities_json: String = row.get("abilities");
    let fun_facts_json: String = row.get("fun_facts");
    let status: String = row.get("conservation_status");

    Ok(DiscoveryEntry {
        id: parse_uuid(&row, "id")?,
        user_id: parse_uuid(&row, "user_id")?,
        name: row.get("name"),
        scientific_name: row.get("scientific_name"),
        description: row.get("description"),
        species_type: parse_species_type(row.get("species_type"))?,
        rarity: parse_rarity(row.get("rarity"))?,
        habitat: row.get("habitat"),
        region: row.get("region"),
        image: row.get("image"),
        original_image: row.get("original_image"),
        stats: serde_json::from_str(&stats_json)?,
        abilities: serde_json::from_str(&abilities_json)?,
        fun_facts: serde_json::from_str(&fun_facts_json)?,
        conservation_status: ConservationStatus::parse(&status),
        experience_points: row.get("experience_points"),
        location: GeoLocation {
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
            address: row.get("address"),
        },
        discovered_at: parse_timestamp(&row, "discovered_at")?,
        is_first_discovery: row.get::<i64, _>("is_first_discovery") != 0,
    })
}
