mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::*;
use crate::repository::GameRepository;

/// SQLite-backed game storage.
///
/// A game is spread over three tables (games, rounds, estimations) with
/// explicit positions so round and estimation order survive a reload. Every
/// repository call holds the connection for its whole duration, which keeps
/// `get` and `update` atomic per game.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "estimo")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("estimo.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }
}

impl GameRepository for Database {
    fn add(&self, game: &Game) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO games (id, owner, created_at) VALUES (?, ?, ?)",
            (
                game.id.to_string(),
                &game.owner,
                game.created_at.to_rfc3339(),
            ),
        )?;
        insert_rounds(&tx, game)?;

        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Game>> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let game = {
            let mut stmt = conn.prepare("SELECT owner, created_at FROM games WHERE id = ?")?;
            let mut rows = stmt.query([id.to_string()])?;
            match rows.next()? {
                Some(row) => Game {
                    id,
                    owner: row.get(0)?,
                    rounds: Vec::new(),
                    created_at: parse_datetime(row.get::<_, String>(1)?),
                },
                None => return Ok(None),
            }
        };

        let rounds = load_rounds(&conn, id)?;
        Ok(Some(Game { rounds, ..game }))
    }

    fn update(&self, game: &Game) -> Result<()> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE games SET owner = ? WHERE id = ?",
            (&game.owner, game.id.to_string()),
        )?;
        if rows == 0 {
            anyhow::bail!("Game {} not found", game.id);
        }

        tx.execute(
            "DELETE FROM estimations WHERE game_id = ?",
            [game.id.to_string()],
        )?;
        tx.execute("DELETE FROM rounds WHERE game_id = ?", [game.id.to_string()])?;
        insert_rounds(&tx, game)?;

        tx.commit()?;
        Ok(())
    }

    fn ids(&self) -> Result<Vec<Uuid>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id FROM games ORDER BY created_at, id")?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids.into_iter().map(parse_uuid).collect())
    }
}

fn insert_rounds(conn: &Connection, game: &Game) -> Result<()> {
    let game_id = game.id.to_string();

    let mut round_stmt = conn.prepare(
        "INSERT INTO rounds (game_id, position, subject, consensus) VALUES (?, ?, ?, ?)",
    )?;
    let mut estimation_stmt = conn.prepare(
        "INSERT INTO estimations (game_id, round_position, position, player, value)
         VALUES (?, ?, ?, ?, ?)",
    )?;

    for (round_position, round) in game.rounds.iter().enumerate() {
        round_stmt.execute((
            &game_id,
            round_position as i64,
            &round.subject,
            round.consensus.map(|c| c.as_str()),
        ))?;

        for (position, estimation) in round.estimations.iter().enumerate() {
            estimation_stmt.execute((
                &game_id,
                round_position as i64,
                position as i64,
                &estimation.player,
                estimation.value.as_str(),
            ))?;
        }
    }

    Ok(())
}

fn load_rounds(conn: &Connection, game_id: Uuid) -> Result<Vec<Round>> {
    let mut stmt = conn.prepare(
        "SELECT subject, consensus FROM rounds WHERE game_id = ? ORDER BY position",
    )?;
    let rows = stmt
        .query_map([game_id.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut rounds = rows
        .into_iter()
        .map(|(subject, consensus)| -> Result<Round> {
            Ok(Round {
                subject,
                estimations: Vec::new(),
                consensus: consensus.map(|c| c.parse()).transpose()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT round_position, player, value FROM estimations
         WHERE game_id = ? ORDER BY round_position, position",
    )?;
    let rows = stmt
        .query_map([game_id.to_string()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (round_position, player, value) in rows {
        let round = usize::try_from(round_position)
            .ok()
            .and_then(|p| rounds.get_mut(p))
            .ok_or_else(|| {
                anyhow::anyhow!("Estimation references missing round {}", round_position)
            })?;
        round.estimations.push(Estimation {
            player,
            value: value.parse()?,
        });
    }

    Ok(rounds)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
