//! Discovery ledger integration tests
//!
//! Exercise novelty detection, XP accounting and level recomputation
//! against a real temporary SQLite database.

use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use ecodex_server::db;
use ecodex_server::models::{GeoLocation, Rarity, SpeciesDescription};
use ecodex_server::services::image_normalizer::NormalizedImage;
use ecodex_server::services::DiscoveryLedger;

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = db::init_database_pool(&dir.path().join("test.db"))
        .await
        .unwrap();
    (dir, pool)
}

fn sample_species(scientific_name: &str) -> SpeciesDescription {
    let json = format!(
        r#"{{
            "name": "Jaguar",
            "scientificName": "{scientific_name}",
            "type": "animal",
            "description": "A powerful spotted cat.",
            "habitat": "Rainforest",
            "region": "South America",
            "funFacts": ["Strong swimmer"],
            "conservationStatus": "near_threatened",
            "commonality": "rare",
            "confidence": "High"
        }}"#
    );
    serde_json::from_str(&json).unwrap()
}

fn sample_media() -> NormalizedImage {
    NormalizedImage {
        image_base64: "bm9ybWFsaXplZA==".to_string(),
        original_base64: "b3JpZ2luYWw=".to_string(),
        width: 400,
        height: 300,
    }
}

#[tokio::test]
async fn first_discovery_doubles_xp_and_sets_flag() {
    let (_dir, pool) = test_pool().await;
    let ledger = DiscoveryLedger::new(pool.clone());
    let user = Uuid::new_v4();

    // near_threatened maps to rare, 50 XP base
    let first = ledger
        .record_discovery(
            user,
            &sample_species("Panthera onca"),
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        )
        .await
        .unwrap();

    assert!(first.is_first_discovery);
    assert!(first.entry.is_first_discovery);
    assert_eq!(first.entry.experience_points, 50);
    assert_eq!(first.xp_gained, 100);
    assert_eq!(first.total_experience, 100);
    assert_eq!(first.new_level, 2);

    let second = ledger
        .record_discovery(
            user,
            &sample_species("Panthera onca"),
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        )
        .await
        .unwrap();

    assert!(!second.is_first_discovery);
    assert_eq!(second.xp_gained, 50);
    assert_eq!(second.total_experience, 150);
    assert_eq!(second.new_level, 2);
}

#[tokio::test]
async fn novelty_is_per_user() {
    let (_dir, pool) = test_pool().await;
    let ledger = DiscoveryLedger::new(pool.clone());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let a = ledger
        .record_discovery(
            alice,
            &sample_species("Panthera onca"),
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        )
        .await
        .unwrap();
    let b = ledger
        .record_discovery(
            bob,
            &sample_species("Panthera onca"),
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        )
        .await
        .unwrap();

    // Each user's first sighting of the species counts as first discovery
    assert!(a.is_first_discovery);
    assert!(b.is_first_discovery);
}

#[tokio::test]
async fn level_crossing_scenario() {
    // User at 90 XP, level 1 submits a rare first discovery:
    // xp_gained = 100, experience = 190, level = 190/100 + 1 = 2
    let (_dir, pool) = test_pool().await;
    let ledger = DiscoveryLedger::new(pool.clone());
    let user = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, experience, level, created_at) VALUES (?, 90, 1, ?)")
        .bind(user.to_string())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&pool)
        .await
        .unwrap();

    let outcome = ledger
        .record_discovery(
            user,
            &sample_species("Panthera onca"),
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.xp_gained, 100);
    assert_eq!(outcome.total_experience, 190);
    assert_eq!(outcome.new_level, 2);

    let progress = db::users::load_progress(&pool, user).await.unwrap();
    assert_eq!(progress.experience, 190);
    assert_eq!(progress.level, 2);
    assert_eq!(progress.discoveries, vec![outcome.entry.id]);
}

#[tokio::test]
async fn entry_is_persisted_with_assigned_xp() {
    let (_dir, pool) = test_pool().await;
    let ledger = DiscoveryLedger::new(pool.clone());
    let user = Uuid::new_v4();

    let outcome = ledger
        .record_discovery(
            user,
            &sample_species("Quercus robur"),
            Rarity::Legendary,
            sample_media(),
            GeoLocation {
                latitude: Some(51.5),
                longitude: Some(-0.1),
                address: Some("Hyde Park".to_string()),
            },
        )
        .await
        .unwrap();

    let stored = db::discoveries::find_by_id(&pool, user, outcome.entry.id)
        .await
        .unwrap()
        .expect("entry should be persisted");

    assert_eq!(stored.experience_points, 200);
    assert_eq!(stored.rarity, Rarity::Legendary);
    assert_eq!(stored.scientific_name, "Quercus robur");
    assert!(stored.is_first_discovery);
    assert_eq!(stored.location.address.as_deref(), Some("Hyde Park"));
    assert_eq!(stored.image, "bm9ybWFsaXplZA==");
    assert_eq!(stored.fun_facts, vec!["Strong swimmer".to_string()]);
}

#[tokio::test]
async fn level_never_drifts_from_experience() {
    let (_dir, pool) = test_pool().await;
    let ledger = DiscoveryLedger::new(pool.clone());
    let user = Uuid::new_v4();

    let rarities = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Epic,
        Rarity::Common,
        Rarity::Legendary,
    ];
    for (i, rarity) in rarities.iter().enumerate() {
        ledger
            .record_discovery(
                user,
                &sample_species(&format!("Species number{i}")),
                *rarity,
                sample_media(),
                GeoLocation::default(),
            )
            .await
            .unwrap();

        let progress = db::users::load_progress(&pool, user).await.unwrap();
        assert_eq!(progress.level, progress.experience / 100 + 1);
    }
}

#[tokio::test]
async fn concurrent_same_species_submissions_yield_one_first_discovery() {
    let (_dir, pool) = test_pool().await;
    let ledger = DiscoveryLedger::new(pool.clone());
    let user = Uuid::new_v4();

    let species = sample_species("Panthera onca");
    let (a, b) = tokio::join!(
        ledger.record_discovery(
            user,
            &species,
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        ),
        ledger.record_discovery(
            user,
            &species,
            Rarity::Rare,
            sample_media(),
            GeoLocation::default(),
        ),
    );

    let a = a.unwrap();
    let b = b.unwrap();

    // Per-user serialization: exactly one run observes novelty
    assert_eq!(
        a.is_first_discovery as u8 + b.is_first_discovery as u8,
        1,
        "exactly one of two concurrent submissions may be a first discovery"
    );

    let progress = db::users::load_progress(&pool, user).await.unwrap();
    // 100 XP for the first, 50 for the repeat
    assert_eq!(progress.experience, 150);
    assert_eq!(progress.discoveries.len(), 2);
}
