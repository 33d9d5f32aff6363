use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::*;
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};
use tracing::{debug, warn};

use super::auth::MelodaiHasher;

const NOW: &str = "cast(strftime('%s','now') as int)";

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_login", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_email", "email")],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};
const USER_PASSWORD_CREDENTIALS_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[],
};

/// V 1
/// Adds user preferences and the generation history.
const USER_TABLE_V_1: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_login", &SqlType::Integer),
        sqlite_column!(
            "preferences",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'{}'")
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_email", "email")],
};
const GENERATION_HISTORY_TABLE_V_1: Table = Table {
    name: "generation_history",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("input_text", &SqlType::Text, non_null = true),
        sqlite_column!("mood", &SqlType::Text, non_null = true),
        sqlite_column!("mood_profile", &SqlType::Text, non_null = true),
        sqlite_column!("music_parameters", &SqlType::Text, non_null = true),
        sqlite_column!("audio", &SqlType::Blob, non_null = true),
        sqlite_column!("generation_secs", &SqlType::Real, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "favorite",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "play_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("last_played", &SqlType::Integer),
        sqlite_column!(
            "tags",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
    ],
    unique_constraints: &[],
    indices: &[
        ("idx_generation_history_user", "user_id"),
        ("idx_generation_history_created", "created"),
    ],
};

/// V 2
/// Keeps a lower-cased copy of the input text for searching.
const GENERATION_HISTORY_TABLE_V_2: Table = Table {
    name: "generation_history",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("input_text", &SqlType::Text, non_null = true),
        sqlite_column!("mood", &SqlType::Text, non_null = true),
        sqlite_column!("mood_profile", &SqlType::Text, non_null = true),
        sqlite_column!("music_parameters", &SqlType::Text, non_null = true),
        sqlite_column!("audio", &SqlType::Blob, non_null = true),
        sqlite_column!("generation_secs", &SqlType::Real, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "favorite",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "play_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("last_played", &SqlType::Integer),
        sqlite_column!(
            "tags",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'[]'")
        ),
        sqlite_column!(
            "search_text",
            &SqlType::Text,
            non_null = true,
            default_value = Some("''")
        ),
    ],
    unique_constraints: &[],
    indices: &[
        ("idx_generation_history_user", "user_id"),
        ("idx_generation_history_created", "created"),
    ],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            USER_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_V_0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_1,
            AUTH_TOKEN_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_V_0,
            GENERATION_HISTORY_TABLE_V_1,
        ],
        migration: Some(|conn: &Connection| {
            conn.execute(
                "ALTER TABLE user ADD COLUMN preferences TEXT NOT NULL DEFAULT '{}'",
                [],
            )?;
            GENERATION_HISTORY_TABLE_V_1.create(conn)?;
            Ok(())
        }),
    },
    VersionedSchema {
        version: 2,
        tables: &[
            USER_TABLE_V_1,
            AUTH_TOKEN_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_V_0,
            GENERATION_HISTORY_TABLE_V_2,
        ],
        migration: Some(|conn: &Connection| {
            conn.execute(
                "ALTER TABLE generation_history ADD COLUMN search_text TEXT NOT NULL DEFAULT ''",
                [],
            )?;
            let mut stmt = conn.prepare("SELECT id, input_text FROM generation_history")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<usize, i64>(0)?, row.get::<usize, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (id, input_text) in rows {
                conn.execute(
                    "UPDATE generation_history SET search_text = ?1 WHERE id = ?2",
                    params![input_text.to_lowercase(), id],
                )?;
            }
            Ok(())
        }),
    },
];

const HISTORY_ENTRY_COLUMNS: &str = "id, user_id, input_text, mood_profile, music_parameters, \
     generation_secs, length(audio), created, favorite, play_count, last_played, tags";

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), VERSIONED_SCHEMAS)?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    })
}

fn auth_token_from_row(row: &Row) -> rusqlite::Result<AuthToken> {
    Ok(AuthToken {
        user_id: row.get(0)?,
        value: AuthTokenValue(row.get(1)?),
        created: system_time_from_column_result(row.get(2)?),
        last_used: row
            .get::<usize, Option<i64>>(3)?
            .map(system_time_from_column_result),
    })
}

fn history_entry_from_row(row: &Row) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        input_text: row.get(2)?,
        mood_profile: json_column(row, 3)?,
        music_parameters: json_column(row, 4)?,
        generation_secs: row.get(5)?,
        audio_size: row.get(6)?,
        created: row.get(7)?,
        favorite: row.get::<usize, i64>(8)? != 0,
        play_count: row.get(9)?,
        last_played: row.get(10)?,
        tags: json_column(row, 11)?,
    })
}

/// Escapes LIKE wildcards, `\` is the escape character.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Trims tags, drops blanks and duplicates, keeping first occurrences.
fn merge_tags(existing: Vec<String>, new_tags: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + new_tags.len());
    for tag in existing.iter().chain(new_tags.iter()) {
        let tag = tag.trim();
        if !tag.is_empty() && !merged.iter().any(|t| t == tag) {
            merged.push(tag.to_string());
        }
    }
    merged
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, email: &str, name: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT INTO user (email, name) VALUES (?1, ?2) ON CONFLICT(email) DO NOTHING",
                params![email, name],
            )
            .with_context(|| format!("Failed to create user {}", email))?;
        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid() as usize))
    }

    fn get_user_id(&self, email: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id FROM user WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_user_profile(&self, user_id: usize) -> Result<Option<UserProfile>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, email, name, created, last_login, preferences FROM user WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        created: row.get(3)?,
                        last_login: row.get(4)?,
                        preferences: json_column(row, 5)?,
                    })
                },
            )
            .optional()?)
    }

    fn update_user_profile(
        &self,
        user_id: usize,
        name: Option<&str>,
        preferences: Option<&serde_json::Value>,
    ) -> Result<bool> {
        let preferences = preferences.map(serde_json::to_string).transpose()?;
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE user SET name = coalesce(?1, name), preferences = coalesce(?2, preferences) \
             WHERE id = ?3",
            params![name, preferences, user_id],
        )?;
        Ok(updated > 0)
    }

    fn update_user_last_login(&self, user_id: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("UPDATE user SET last_login = {} WHERE id = ?1", NOW),
            params![user_id],
        )?;
        Ok(())
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                auth_token_from_row,
            )
            .optional()?)
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let Some(token) = self.get_user_auth_token(token)? else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM auth_token WHERE value = ?1",
            params![token.value.0],
        )?;
        Ok(Some(token))
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("UPDATE auth_token SET last_used = {} WHERE value = ?1", NOW),
            params![token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (value, user_id) VALUES (?1, ?2)",
            params![token.value.0, token.user_id],
        )?;
        Ok(())
    }

    fn get_all_user_auth_tokens(&self, user_id: usize) -> Result<Vec<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id, value, created, last_used FROM auth_token WHERE user_id = ?1",
        )?;
        let tokens = stmt
            .query_map(params![user_id], auth_token_from_row)?
            .collect::<Result<Vec<AuthToken>, _>>()?;
        Ok(tokens)
    }

    fn delete_other_user_auth_tokens(
        &self,
        user_id: usize,
        keep: &AuthTokenValue,
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.execute(
            "DELETE FROM auth_token WHERE user_id = ?1 AND value != ?2",
            params![user_id, keep.0],
        )?)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_auth_credentials(&self, user_id: usize) -> Result<Option<UserAuthCredentials>> {
        let conn = self.conn.lock().unwrap();
        let user_exists = conn
            .query_row("SELECT 1 FROM user WHERE id = ?1", params![user_id], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        if !user_exists {
            return Ok(None);
        }

        let password = conn
            .query_row(
                "SELECT user_id, salt, hash, hasher, created, last_tried, last_used \
                 FROM user_password_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let hasher_name: String = row.get(3)?;
                    let hasher = MelodaiHasher::from_str(&hasher_name).map_err(|err| {
                        warn!("Invalid hasher for user {}: {}", user_id, err);
                        rusqlite::Error::InvalidQuery
                    })?;
                    Ok(PasswordCredentials {
                        user_id: row.get(0)?,
                        salt: row.get(1)?,
                        hash: row.get(2)?,
                        hasher,
                        created: system_time_from_column_result(row.get(4)?),
                        last_tried: row
                            .get::<usize, Option<i64>>(5)?
                            .map(system_time_from_column_result),
                        last_used: row
                            .get::<usize, Option<i64>>(6)?
                            .map(system_time_from_column_result),
                    })
                },
            )
            .optional()?;

        Ok(Some(UserAuthCredentials { user_id, password }))
    }

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let user_id = credentials.user_id;
        match credentials.password.as_ref() {
            Some(password_credentials) => {
                let updated = conn.execute(
                    "UPDATE user_password_credentials SET salt = ?1, hash = ?2, hasher = ?3 \
                     WHERE user_id = ?4",
                    params![
                        password_credentials.salt,
                        password_credentials.hash,
                        password_credentials.hasher.to_string(),
                        user_id
                    ],
                )?;
                if updated == 0 {
                    conn.execute(
                        "INSERT INTO user_password_credentials (salt, hash, hasher, user_id) \
                         VALUES (?1, ?2, ?3, ?4)",
                        params![
                            password_credentials.salt,
                            password_credentials.hash,
                            password_credentials.hasher.to_string(),
                            user_id
                        ],
                    )?;
                }
            }
            None => {
                conn.execute(
                    "DELETE FROM user_password_credentials WHERE user_id = ?1",
                    params![user_id],
                )?;
            }
        };
        Ok(())
    }

    fn update_password_last_used(&self, user_id: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE user_password_credentials SET last_used = {now}, last_tried = {now} \
                 WHERE user_id = ?1",
                now = NOW
            ),
            params![user_id],
        )?;
        Ok(())
    }
}

impl UserHistoryStore for SqliteUserStore {
    fn add_history_entry(&self, user_id: usize, entry: NewHistoryEntry) -> Result<usize> {
        let mood_profile = serde_json::to_string(&entry.mood_profile)?;
        let music_parameters = serde_json::to_string(&entry.music_parameters)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO generation_history \
             (user_id, input_text, search_text, mood, mood_profile, music_parameters, audio, \
             generation_secs) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                entry.input_text,
                entry.input_text.to_lowercase(),
                entry.mood_profile.mood.as_str(),
                mood_profile,
                music_parameters,
                entry.audio,
                entry.generation_secs
            ],
        )
        .with_context(|| format!("Failed to store generation for user {}", user_id))?;
        let id = conn.last_insert_rowid() as usize;
        debug!("Stored generation {} for user {}", id, user_id);
        Ok(id)
    }

    fn get_history(&self, user_id: usize, query: &HistoryQuery) -> Result<HistoryPage> {
        let mut conditions = vec!["user_id = ?".to_string()];
        let mut values = vec![Value::Integer(user_id as i64)];
        if let Some(search) = query.search.as_deref() {
            conditions.push(
                "(search_text LIKE ? ESCAPE '\\' OR mood LIKE ? ESCAPE '\\')"
                    .to_string(),
            );
            let pattern = like_pattern(&search.to_lowercase());
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }
        if let Some(mood) = query.mood {
            conditions.push("mood = ?".to_string());
            values.push(Value::Text(mood.as_str().to_string()));
        }
        if query.favorites_only {
            conditions.push("favorite = 1".to_string());
        }
        let where_clause = conditions.join(" AND ");
        let order = match query.sort {
            HistorySort::Newest => "DESC",
            HistorySort::Oldest => "ASC",
        };

        let conn = self.conn.lock().unwrap();
        let total: usize = conn.query_row(
            &format!("SELECT count(*) FROM generation_history WHERE {}", where_clause),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let mut page_values = values;
        page_values.push(Value::Integer(
            i64::try_from(query.limit).unwrap_or(i64::MAX),
        ));
        page_values.push(Value::Integer(
            i64::try_from(query.offset).unwrap_or(i64::MAX),
        ));
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM generation_history WHERE {} \
             ORDER BY created {order}, id {order} LIMIT ? OFFSET ?",
            HISTORY_ENTRY_COLUMNS,
            where_clause,
            order = order
        ))?;
        let entries = stmt
            .query_map(params_from_iter(page_values.iter()), history_entry_from_row)?
            .collect::<Result<Vec<HistoryEntry>, _>>()?;

        Ok(HistoryPage { total, entries })
    }

    fn get_history_entry(&self, user_id: usize, entry_id: usize) -> Result<Option<HistoryEntry>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {} FROM generation_history WHERE id = ?1 AND user_id = ?2",
                    HISTORY_ENTRY_COLUMNS
                ),
                params![entry_id, user_id],
                history_entry_from_row,
            )
            .optional()?)
    }

    fn get_history_audio(&self, user_id: usize, entry_id: usize) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT audio FROM generation_history WHERE id = ?1 AND user_id = ?2",
                params![entry_id, user_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn delete_history_entry(&self, user_id: usize, entry_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM generation_history WHERE id = ?1 AND user_id = ?2",
            params![entry_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn set_history_favorite(
        &self,
        user_id: usize,
        entry_id: usize,
        favorite: bool,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE generation_history SET favorite = ?1 WHERE id = ?2 AND user_id = ?3",
            params![favorite as i64, entry_id, user_id],
        )?;
        Ok(updated > 0)
    }

    fn record_history_play(&self, user_id: usize, entry_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE generation_history SET play_count = play_count + 1, last_played = {} \
                 WHERE id = ?1 AND user_id = ?2",
                NOW
            ),
            params![entry_id, user_id],
        )?;
        Ok(updated > 0)
    }

    fn add_history_tags(
        &self,
        user_id: usize,
        entry_id: usize,
        tags: &[String],
    ) -> Result<Option<Vec<String>>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT tags FROM generation_history WHERE id = ?1 AND user_id = ?2",
                params![entry_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let existing: Vec<String> = serde_json::from_str(&existing)
            .with_context(|| format!("Corrupted tags for generation {}", entry_id))?;
        let merged = merge_tags(existing, tags);
        tx.execute(
            "UPDATE generation_history SET tags = ?1 WHERE id = ?2",
            params![serde_json::to_string(&merged)?, entry_id],
        )?;
        tx.commit()?;
        Ok(Some(merged))
    }
}
