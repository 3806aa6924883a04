//! Database schema and migrations for twok.
//!
//! Migrations are applied in order when the database is opened; the
//! `schema_version` table records which ones have already run.

/// Database migrations (SQLite).
#[cfg(feature = "sqlite")]
pub const MIGRATIONS: &[&str] = &[
    // v1: Boards and posts
    r#"
CREATE TABLE boards (
    board_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

-- parent_id forms the reply tree; latest_reply_date is only maintained on roots
CREATE TABLE posts (
    post_id             INTEGER PRIMARY KEY AUTOINCREMENT,
    board_id            INTEGER NOT NULL REFERENCES boards(board_id) ON DELETE CASCADE,
    parent_id           INTEGER REFERENCES posts(post_id) ON DELETE CASCADE,
    title               TEXT NOT NULL,
    message             TEXT,
    date                TEXT NOT NULL,
    latest_reply_date   TEXT
);

CREATE INDEX idx_posts_parent_id ON posts(parent_id);
CREATE INDEX idx_posts_board_latest ON posts(board_id, latest_reply_date);
"#,
    // v2: Requester ledger for post admission
    r#"
CREATE TABLE requesters (
    ip_address      TEXT PRIMARY KEY,
    last_post_time  TEXT NOT NULL
);
"#,
    // v3: File attachments
    r#"
CREATE TABLE files (
    file_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name     TEXT NOT NULL,
    stored_name   TEXT NOT NULL UNIQUE,
    file_hash     TEXT NOT NULL,
    content_type  TEXT NOT NULL,
    size          INTEGER NOT NULL,
    post_id       INTEGER REFERENCES posts(post_id) ON DELETE SET NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX idx_files_post_id ON files(post_id);
CREATE INDEX idx_files_hash ON files(file_hash);
"#,
    // v4: Case-folded search keys, filled in by the application on insert
    r#"
ALTER TABLE boards ADD COLUMN search_name TEXT NOT NULL DEFAULT '';
ALTER TABLE posts ADD COLUMN search_title TEXT NOT NULL DEFAULT '';
UPDATE boards SET search_name = LOWER(name);
UPDATE posts SET search_title = LOWER(title);
"#,
];

/// Database migrations (PostgreSQL).
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub const MIGRATIONS: &[&str] = &[
    // v1: Boards and posts
    r#"
CREATE TABLE boards (
    board_id    BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE posts (
    post_id             BIGSERIAL PRIMARY KEY,
    board_id            BIGINT NOT NULL REFERENCES boards(board_id) ON DELETE CASCADE,
    parent_id           BIGINT REFERENCES posts(post_id) ON DELETE CASCADE,
    title               TEXT NOT NULL,
    message             TEXT,
    date                TIMESTAMPTZ NOT NULL,
    latest_reply_date   TIMESTAMPTZ
);

CREATE INDEX idx_posts_parent_id ON posts(parent_id);
CREATE INDEX idx_posts_board_latest ON posts(board_id, latest_reply_date);
"#,
    // v2: Requester ledger for post admission
    r#"
CREATE TABLE requesters (
    ip_address      TEXT PRIMARY KEY,
    last_post_time  TIMESTAMPTZ NOT NULL
);
"#,
    // v3: File attachments
    r#"
CREATE TABLE files (
    file_id       BIGSERIAL PRIMARY KEY,
    file_name     TEXT NOT NULL,
    stored_name   TEXT NOT NULL UNIQUE,
    file_hash     TEXT NOT NULL,
    content_type  TEXT NOT NULL,
    size          BIGINT NOT NULL,
    post_id       BIGINT REFERENCES posts(post_id) ON DELETE SET NULL,
    created_at    TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_files_post_id ON files(post_id);
CREATE INDEX idx_files_hash ON files(file_hash);
"#,
    // v4: Case-folded search keys, filled in by the application on insert
    r#"
ALTER TABLE boards ADD COLUMN search_name TEXT NOT NULL DEFAULT '';
ALTER TABLE posts ADD COLUMN search_title TEXT NOT NULL DEFAULT '';
UPDATE boards SET search_name = LOWER(name);
UPDATE posts SET search_title = LOWER(title);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_every_migration_changes_schema() {
        for migration in MIGRATIONS {
            assert!(migration.contains("CREATE TABLE") || migration.contains("ALTER TABLE"));
        }
    }

    #[test]
    fn test_search_keys_added_last() {
        let last = MIGRATIONS.last().unwrap();
        assert!(last.contains("search_name"));
        assert!(last.contains("search_title"));
    }

    #[test]
    fn test_requesters_keyed_by_ip() {
        assert!(MIGRATIONS
            .iter()
            .any(|m| m.contains("ip_address      TEXT PRIMARY KEY")));
    }
}
