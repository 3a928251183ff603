//! Ordered schema history of the `chat` settings table.
//!
//! The current head is kept in `schema_version`, a single-row table. Every
//! migration runs in its own transaction together with the version bump.

use libsql::Connection;

use super::StorageError;

pub struct Migration {
    pub revision: &'static str,
    pub description: &'static str,
    pub up: &'static str,
    pub down: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        revision: "2de57fa5e865",
        description: "Create table user",
        up: r#"
            CREATE TABLE "user" (
                id INTEGER NOT NULL PRIMARY KEY,
                full_name TEXT,
                nick_name TEXT,
                last_link TEXT,
                tw_orig INTEGER NOT NULL DEFAULT 0,
                tt_orig INTEGER NOT NULL DEFAULT 0,
                in_orig INTEGER NOT NULL DEFAULT 0
            );
        "#,
        down: r#"DROP TABLE "user";"#,
    },
    Migration {
        revision: "c71fb599b92b",
        description: "Add include_link column",
        up: r#"ALTER TABLE "user" ADD COLUMN include_link INTEGER NOT NULL DEFAULT 0;"#,
        down: r#"ALTER TABLE "user" DROP COLUMN include_link;"#,
    },
    Migration {
        revision: "5a23d7a2aed3",
        description: "Rename columns",
        up: r#"
            ALTER TABLE "user" RENAME COLUMN full_name TO name;
            ALTER TABLE "user" RENAME COLUMN nick_name TO chat_link;
        "#,
        down: r#"
            ALTER TABLE "user" RENAME COLUMN name TO full_name;
            ALTER TABLE "user" RENAME COLUMN chat_link TO nick_name;
        "#,
    },
    Migration {
        revision: "0bdf085f57f6",
        description: "Rename user table to chat",
        up: r#"ALTER TABLE "user" RENAME TO chat;"#,
        down: r#"ALTER TABLE chat RENAME TO "user";"#,
    },
    Migration {
        revision: "08cccf6bbe79",
        description: "Add type column",
        up: r#"ALTER TABLE chat ADD COLUMN type TEXT NOT NULL DEFAULT 'private';"#,
        down: r#"ALTER TABLE chat DROP COLUMN type;"#,
    },
    Migration {
        revision: "d461dd6281a5",
        description: "Rename last_link to last_info",
        up: r#"ALTER TABLE chat RENAME COLUMN last_link TO last_info;"#,
        down: r#"ALTER TABLE chat RENAME COLUMN last_info TO last_link;"#,
    },
    Migration {
        revision: "b5115239219d",
        description: "Add tw_style column",
        up: r#"ALTER TABLE chat ADD COLUMN tw_style INTEGER NOT NULL DEFAULT 0;"#,
        down: r#"ALTER TABLE chat DROP COLUMN tw_style;"#,
    },
];

async fn ensure_version_table(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version TEXT NOT NULL)",
        (),
    )
    .await?;
    Ok(())
}

pub async fn current_revision(conn: &Connection) -> Result<Option<String>, StorageError> {
    ensure_version_table(conn).await?;

    let mut rows = conn.query("SELECT version FROM schema_version LIMIT 1", ()).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

fn position(revision: &str) -> Result<usize, StorageError> {
    MIGRATIONS
        .iter()
        .position(|m| m.revision == revision)
        .ok_or_else(|| StorageError::Migration(format!("Unknown revision: {}", revision)))
}

async fn set_revision(conn: &Connection, revision: Option<&str>) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", ()).await?;
    if let Some(revision) = revision {
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [revision])
            .await?;
    }
    Ok(())
}

/// Applies every pending migration, returns how many ran.
pub async fn migrate_up(conn: &Connection) -> Result<usize, StorageError> {
    let start = match current_revision(conn).await? {
        Some(revision) => position(&revision)? + 1,
        None => 0,
    };

    for migration in &MIGRATIONS[start..] {
        info!("Applying migration {}: {}", migration.revision, migration.description);
        let tx = conn.transaction().await?;
        tx.execute_batch(migration.up).await?;
        set_revision(&tx, Some(migration.revision)).await?;
        tx.commit().await?;
    }

    Ok(MIGRATIONS.len() - start)
}

/// Reverts migrations down to `target` (kept applied), or everything when `None`.
pub async fn migrate_down(conn: &Connection, target: Option<&str>) -> Result<usize, StorageError> {
    let stop = match target {
        Some(revision) => position(revision)? + 1,
        None => 0,
    };

    let current = match current_revision(conn).await? {
        Some(revision) => position(&revision)? + 1,
        None => 0,
    };

    if stop > current {
        return Err(StorageError::Migration(format!(
            "Target revision is ahead of the database: {}",
            target.unwrap_or("base")
        )));
    }

    for index in (stop..current).rev() {
        let migration = &MIGRATIONS[index];
        info!("Reverting migration {}: {}", migration.revision, migration.description);
        let previous = index.checked_sub(1).map(|i| MIGRATIONS[i].revision);
        let tx = conn.transaction().await?;
        tx.execute_batch(migration.down).await?;
        set_revision(&tx, previous).await?;
        tx.commit().await?;
    }

    Ok(current - stop)
}
