//! Table definitions and the migration runner.
//!
//! Every table is SCHEMAFULL and record ids are UUID strings. The
//! uniqueness guarantees the services lean on (external subject id,
//! username, the `(user, group)` membership pair) live in UNIQUE
//! indexes so that concurrent writers cannot race past a
//! service-level read.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD subject_id ON TABLE user TYPE string;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD avatar_url ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_subject ON TABLE user \
    COLUMNS subject_id UNIQUE;
DEFINE INDEX idx_user_username ON TABLE user \
    COLUMNS username UNIQUE;

-- =======================================================================
-- Study groups
-- =======================================================================
DEFINE TABLE study_group SCHEMAFULL;
DEFINE FIELD name ON TABLE study_group TYPE string;
DEFINE FIELD bio ON TABLE study_group TYPE option<string>;
DEFINE FIELD subjects ON TABLE study_group TYPE array;
DEFINE FIELD subjects.* ON TABLE study_group TYPE string;
DEFINE FIELD scheduling_link ON TABLE study_group TYPE option<string>;
DEFINE FIELD session_dates ON TABLE study_group TYPE array;
DEFINE FIELD session_dates.* ON TABLE study_group TYPE string;
DEFINE FIELD session_time ON TABLE study_group TYPE string;
DEFINE FIELD location ON TABLE study_group TYPE string;
DEFINE FIELD status ON TABLE study_group TYPE string \
    ASSERT $value IN ['active'];
DEFINE FIELD owner_id ON TABLE study_group TYPE string;
DEFINE FIELD created_at ON TABLE study_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_owner ON TABLE study_group COLUMNS owner_id;

-- =======================================================================
-- Memberships
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD group_id ON TABLE membership TYPE string;
DEFINE FIELD username ON TABLE membership TYPE string;
DEFINE FIELD joined_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_pair ON TABLE membership \
    COLUMNS user_id, group_id UNIQUE;
DEFINE INDEX idx_membership_group ON TABLE membership \
    COLUMNS group_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the store up to the latest schema version.
///
/// Sets up the `_migration` tracking table on first run, then applies
/// every migration past the highest recorded version. DEFINE
/// statements are idempotent, so calling this on every boot is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "applying schema migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "recording migration v{} failed: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "schema migration applied");
        }
    }

    Ok(())
}

/// The raw v1 DDL, for tests that want to apply the schema without
/// going through the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
