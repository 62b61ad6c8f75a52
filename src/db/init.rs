/// Database schema initialization.
/// Sets up SQLite pragmas, creates tables and seeds the reference data on startup.
use rusqlite::{params, Connection, Result as SqliteResult};

/// MPA ratings seeded into a fresh database, by id
pub const MPA_RATINGS: [(i64, &str); 5] = [(1, "G"), (2, "PG"), (3, "PG-13"), (4, "R"), (5, "NC-17")];

/// Rating given to a film created without one (G)
pub const DEFAULT_MPA_ID: i64 = 1;

/// Genres seeded into a fresh database, by id
pub const GENRES: [(i64, &str); 6] = [
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

/// Initialize database connection with WAL mode, foreign keys and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // Enable WAL mode (for file-based DB only, ignore error for in-memory)
    let _ = conn.execute_batch("PRAGMA journal_mode = WAL");
    let _ = conn.execute_batch("PRAGMA synchronous = NORMAL");
    conn.execute_batch("PRAGMA foreign_keys = ON")?;

    create_schema(conn)?;
    seed_reference_data(conn)?;

    Ok(())
}

/// Create all database tables
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS mpa_ratings (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS genres (
            id INTEGER PRIMARY KEY,
            name TEXT UNIQUE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS films (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            release_date TEXT NOT NULL,
            duration INTEGER NOT NULL,
            mpa_id INTEGER,
            FOREIGN KEY(mpa_id) REFERENCES mpa_ratings(id)
        );

        CREATE TABLE IF NOT EXISTS film_genres (
            film_id INTEGER NOT NULL,
            genre_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (film_id, genre_id),
            FOREIGN KEY(film_id) REFERENCES films(id) ON DELETE CASCADE,
            FOREIGN KEY(genre_id) REFERENCES genres(id)
        );

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            login TEXT NOT NULL,
            name TEXT NOT NULL,
            birthday TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS film_likes (
            film_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            PRIMARY KEY (film_id, user_id),
            FOREIGN KEY(film_id) REFERENCES films(id) ON DELETE CASCADE,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS friendships (
            user_id INTEGER NOT NULL,
            friend_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, friend_id),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY(friend_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_film_likes_film ON film_likes(film_id);
        CREATE INDEX IF NOT EXISTS idx_film_likes_user ON film_likes(user_id);
        CREATE INDEX IF NOT EXISTS idx_film_genres_film ON film_genres(film_id);
        CREATE INDEX IF NOT EXISTS idx_friendships_friend ON friendships(friend_id);
        "#,
    )?;

    Ok(())
}

/// Insert the fixed MPA and genre vocabularies, leaving existing rows alone
fn seed_reference_data(conn: &Connection) -> SqliteResult<()> {
    let mut mpa_stmt = conn.prepare("INSERT OR IGNORE INTO mpa_ratings (id, name) VALUES (?1, ?2)")?;
    for (id, name) in MPA_RATINGS {
        mpa_stmt.execute(params![id, name])?;
    }

    let mut genre_stmt = conn.prepare("INSERT OR IGNORE INTO genres (id, name) VALUES (?1, ?2)")?;
    for (id, name) in GENRES {
        genre_stmt.execute(params![id, name])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_in_memory_database() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        // Verify tables exist
        let tables: Vec<String> = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            )
            .expect("Query failed")
            .query_map([], |row| row.get(0))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed");

        for table in ["films", "users", "genres", "mpa_ratings", "film_genres", "film_likes", "friendships"] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_films_table_schema() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let mut stmt = conn
            .prepare("PRAGMA table_info(films)")
            .expect("Query failed");
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("Mapping failed")
            .collect::<Result<Vec<_>, _>>()
            .expect("Collection failed");

        for column in ["id", "name", "description", "release_date", "duration", "mpa_id"] {
            assert!(columns.contains(&column.to_string()), "missing column {column}");
        }
    }

    #[test]
    fn test_reference_data_seeded_once() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");
        initialize_database(&conn).expect("Re-initialization should be idempotent");

        let mpa_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM mpa_ratings", [], |row| row.get(0))
            .expect("Query failed");
        let genre_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM genres", [], |row| row.get(0))
            .expect("Query failed");

        assert_eq!(mpa_count, MPA_RATINGS.len() as i64);
        assert_eq!(genre_count, GENRES.len() as i64);

        let pg13: String = conn
            .query_row("SELECT name FROM mpa_ratings WHERE id = 3", [], |row| row.get(0))
            .expect("Query failed");
        assert_eq!(pg13, "PG-13");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        initialize_database(&conn).expect("Failed to initialize DB");

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .expect("Query failed");
        assert_eq!(enabled, 1);
    }
}
