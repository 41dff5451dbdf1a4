//! Database module - SQLite storage for profiles, exercise pools and history

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, warn};

use crate::exercises::{Difficulty, Exercise};
use crate::history::HistoryEntry;
use crate::profile::{ActivityLevel, DogProfile};

const STAMPS_KEY: &str = "stamps";
const SELECTED_PROFILE_KEY: &str = "selected_profile_id";

/// Which per-profile exercise list a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// Imported from the recommendation generator
    Fetched,
    /// Written by the user
    Custom,
}

impl PoolKind {
    fn as_str(&self) -> &'static str {
        match self {
            PoolKind::Fetched => "fetched",
            PoolKind::Custom => "custom",
        }
    }
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening database {path}"))?;
        let db = Self { conn };
        db.init_schema()?;
        debug!("Database ready at {}", path);
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS dog_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                age_months INTEGER NOT NULL,
                sex TEXT NOT NULL,
                breed TEXT NOT NULL,
                weight_kg REAL NOT NULL,
                activity_level TEXT NOT NULL,
                health_issues TEXT NOT NULL,
                health_values TEXT NOT NULL,
                performance_values TEXT NOT NULL,
                equipment TEXT NOT NULL,
                preferred_activities TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS exercises (
                profile_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                exercise_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (profile_id, kind, exercise_id)
            );
            CREATE TABLE IF NOT EXISTS exercise_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile_id INTEGER NOT NULL,
                exercise_name TEXT NOT NULL,
                date TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                is_custom INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                dog_name TEXT NOT NULL,
                equipment_used TEXT NOT NULL,
                benefits TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert a new profile or update the one with the same id
    pub fn save_profile(&self, profile: &DogProfile) -> Result<i64> {
        let issues = serde_json::to_string(&profile.health_issues)?;
        let health = serde_json::to_string(&profile.health_values)?;
        let performance = serde_json::to_string(&profile.performance_values)?;
        let equipment = serde_json::to_string(&profile.equipment)?;
        let activities = serde_json::to_string(&profile.preferred_activities)?;

        match profile.id {
            Some(id) => {
                let updated = self.conn.execute(
                    "UPDATE dog_profiles SET name = ?1, age_months = ?2, sex = ?3, breed = ?4,
                        weight_kg = ?5, activity_level = ?6, health_issues = ?7, health_values = ?8,
                        performance_values = ?9, equipment = ?10, preferred_activities = ?11
                     WHERE id = ?12",
                    params![
                        profile.name,
                        profile.age_months,
                        profile.sex,
                        profile.breed,
                        profile.weight_kg,
                        profile.activity_level.label(),
                        issues,
                        health,
                        performance,
                        equipment,
                        activities,
                        id,
                    ],
                )?;
                anyhow::ensure!(updated == 1, "profile {id} does not exist");
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO dog_profiles (name, age_months, sex, breed, weight_kg, activity_level,
                        health_issues, health_values, performance_values, equipment, preferred_activities)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        profile.name,
                        profile.age_months,
                        profile.sex,
                        profile.breed,
                        profile.weight_kg,
                        profile.activity_level.label(),
                        issues,
                        health,
                        performance,
                        equipment,
                        activities,
                    ],
                )?;
                let id = self.conn.last_insert_rowid();
                info!("Created profile {} ({})", id, profile.name);
                Ok(id)
            }
        }
    }

    pub fn get_profile(&self, id: i64) -> Result<Option<DogProfile>> {
        Ok(self.query_profiles("WHERE id = ?1", params![id])?.into_iter().next())
    }

    pub fn list_profiles(&self) -> Result<Vec<DogProfile>> {
        self.query_profiles("ORDER BY id", params![])
    }

    fn query_profiles(&self, clause: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<DogProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, name, age_months, sex, breed, weight_kg, activity_level, health_issues,
                health_values, performance_values, equipment, preferred_activities
             FROM dog_profiles {clause}"
        ))?;

        let rows = stmt
            .query_map(args, |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, String>(6)?,
                    [
                        row.get::<_, String>(7)?,
                        row.get::<_, String>(8)?,
                        row.get::<_, String>(9)?,
                        row.get::<_, String>(10)?,
                        row.get::<_, String>(11)?,
                    ],
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, age_months, sex, breed, weight_kg, level, json)| -> Result<DogProfile> {
                let [issues, health, performance, equipment, activities] = json;
                Ok(DogProfile {
                    id: Some(id),
                    name,
                    age_months,
                    sex,
                    breed,
                    weight_kg,
                    activity_level: level
                        .parse::<ActivityLevel>()
                        .map_err(anyhow::Error::msg)
                        .with_context(|| format!("profile {id} has a bad activity level"))?,
                    health_issues: serde_json::from_str(&issues)?,
                    health_values: serde_json::from_str(&health)?,
                    performance_values: serde_json::from_str(&performance)?,
                    equipment: serde_json::from_str(&equipment)?,
                    preferred_activities: serde_json::from_str(&activities)?,
                })
            })
            .collect()
    }

    /// Delete a profile with its exercises and history
    pub fn delete_profile(&self, id: i64) -> Result<bool> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM exercises WHERE profile_id = ?1", params![id])?;
        tx.execute("DELETE FROM exercise_history WHERE profile_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM dog_profiles WHERE id = ?1", params![id])?;
        tx.commit()?;

        if self.selected_profile()? == Some(id) {
            self.set_selected_profile(None)?;
        }
        Ok(deleted == 1)
    }

    /// Replace the fetched pool wholesale. Of repeated ids only the first is kept.
    pub fn replace_recommendations(&self, profile_id: i64, exercises: &[Exercise]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM exercises WHERE profile_id = ?1 AND kind = ?2",
            params![profile_id, PoolKind::Fetched.as_str()],
        )?;
        let mut seen = HashSet::new();
        for (position, exercise) in exercises.iter().enumerate() {
            if !seen.insert(exercise.id.as_str()) {
                warn!("skipping repeated exercise id {} at position {}", exercise.id, position);
                continue;
            }
            tx.execute(
                "INSERT OR REPLACE INTO exercises (profile_id, kind, exercise_id, position, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    profile_id,
                    PoolKind::Fetched.as_str(),
                    exercise.id,
                    position as i64,
                    serde_json::to_string(exercise)?,
                ],
            )?;
        }
        tx.commit()?;
        info!("Stored {} recommendations for profile {}", seen.len(), profile_id);
        Ok(seen.len())
    }

    pub fn get_recommendations(&self, profile_id: i64) -> Result<Vec<Exercise>> {
        self.get_pool(profile_id, PoolKind::Fetched)
    }

    /// Add or overwrite a custom exercise; it is always marked custom
    pub fn add_custom_exercise(&self, profile_id: i64, exercise: &Exercise) -> Result<()> {
        let mut exercise = exercise.clone();
        exercise.is_custom = true;

        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM exercises WHERE profile_id = ?1 AND kind = ?2",
            params![profile_id, PoolKind::Custom.as_str()],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT OR REPLACE INTO exercises (profile_id, kind, exercise_id, position, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                profile_id,
                PoolKind::Custom.as_str(),
                exercise.id,
                position,
                serde_json::to_string(&exercise)?,
            ],
        )?;
        Ok(())
    }

    pub fn get_custom_exercises(&self, profile_id: i64) -> Result<Vec<Exercise>> {
        self.get_pool(profile_id, PoolKind::Custom)
    }

    /// Only custom exercises can be deleted; returns false when nothing matched
    pub fn delete_custom_exercise(&self, profile_id: i64, exercise_id: &str) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM exercises WHERE profile_id = ?1 AND kind = ?2 AND exercise_id = ?3",
            params![profile_id, PoolKind::Custom.as_str(), exercise_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_pool(&self, profile_id: i64, kind: PoolKind) -> Result<Vec<Exercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM exercises WHERE profile_id = ?1 AND kind = ?2 ORDER BY position",
        )?;
        let payloads = stmt
            .query_map(params![profile_id, kind.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|p| serde_json::from_str::<Exercise>(p).context("stored exercise is not valid JSON"))
            .collect()
    }

    /// Add new history record
    pub fn add_history(&self, entry: &HistoryEntry) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercise_history (profile_id, exercise_name, date, duration_minutes, is_custom,
                difficulty, dog_name, equipment_used, benefits)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.profile_id,
                entry.exercise_name,
                entry.date.to_rfc3339(),
                entry.duration_minutes,
                entry.is_custom,
                entry.difficulty.label(),
                entry.dog_name,
                serde_json::to_string(&entry.equipment_used)?,
                serde_json::to_string(&entry.benefits)?,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// History of one profile, newest first
    pub fn get_history(&self, profile_id: i64) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, profile_id, exercise_name, date, duration_minutes, is_custom, difficulty,
                dog_name, equipment_used, benefits
             FROM exercise_history WHERE profile_id = ?1 ORDER BY date DESC, id DESC",
        )?;

        let rows = stmt
            .query_map(params![profile_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, u32>(4)?,
                    row.get::<_, bool>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, profile_id, exercise_name, date, minutes, is_custom, difficulty, dog_name, equipment, benefits)| -> Result<HistoryEntry> {
                Ok(HistoryEntry {
                    id: Some(id),
                    profile_id,
                    exercise_name,
                    date: DateTime::parse_from_rfc3339(&date)
                        .map(|d| d.with_timezone(&Utc))
                        .with_context(|| format!("history entry {id} has a bad date {date:?}"))?,
                    duration_minutes: minutes,
                    is_custom,
                    difficulty: difficulty
                        .parse::<Difficulty>()
                        .map_err(anyhow::Error::msg)?,
                    dog_name,
                    equipment_used: serde_json::from_str(&equipment)?,
                    benefits: serde_json::from_str(&benefits)?,
                })
            })
            .collect()
    }

    /// Add one stamp and return the new total
    pub fn add_stamp(&self) -> Result<u32> {
        let count = self.get_stamps()? + 1;
        self.set_setting(STAMPS_KEY, &count.to_string())?;
        Ok(count)
    }

    pub fn get_stamps(&self) -> Result<u32> {
        Ok(self
            .get_setting(STAMPS_KEY)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub fn set_selected_profile(&self, id: Option<i64>) -> Result<()> {
        match id {
            Some(id) => self.set_setting(SELECTED_PROFILE_KEY, &id.to_string()),
            None => {
                self.conn
                    .execute("DELETE FROM settings WHERE key = ?1", params![SELECTED_PROFILE_KEY])?;
                Ok(())
            }
        }
    }

    pub fn selected_profile(&self) -> Result<Option<i64>> {
        Ok(self
            .get_setting(SELECTED_PROFILE_KEY)?
            .and_then(|v| v.parse().ok()))
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
