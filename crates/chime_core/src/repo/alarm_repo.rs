//! Alarm repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the persistence operations the scheduling core consumes:
//!   create, load-all, and update-due-time.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Due times are stored in the fixed `YYYY-MM-DD HH:MM` text form.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};

use crate::clock;
use crate::db::{migrations, DbError};
use crate::model::alarm::{Alarm, AlarmId, Recurrence};

const ALARM_SELECT_SQL: &str = "SELECT id, description, due_at, recurrence FROM alarms";

const REQUIRED_COLUMNS: &[&str] = &["id", "description", "due_at", "recurrence"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error taxonomy for alarm storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(AlarmId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "alarm not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted alarm data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection has schema version {actual_version}, expected {expected_version}; apply migrations first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence capability consumed by the scheduling core.
///
/// Kept minimal on purpose: these three operations are everything the
/// scheduler and submit path need, and test doubles implement them without
/// touching SQLite.
pub trait AlarmRepository {
    /// Persists a new alarm and returns its assigned id.
    fn create_alarm(
        &self,
        description: &str,
        due_at: NaiveDateTime,
        recurrence: Recurrence,
    ) -> RepoResult<AlarmId>;

    /// Loads every stored alarm, including ones whose due time has passed.
    fn load_alarms(&self) -> RepoResult<Vec<Alarm>>;

    /// Replaces the due time of an existing alarm.
    fn update_due_at(&self, id: AlarmId, due_at: NaiveDateTime) -> RepoResult<()>;
}

/// SQLite-backed alarm repository.
///
/// The connection sits behind a mutex so the scheduler thread and request
/// handlers can share one handle; clones share the same connection.
#[derive(Clone)]
pub struct SqliteAlarmRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAlarmRepository {
    /// Wraps a migrated connection, verifying schema version and shape.
    ///
    /// # Errors
    /// Rejects connections whose migrations have not run or whose `alarms`
    /// table is missing required columns.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        check_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl AlarmRepository for SqliteAlarmRepository {
    fn create_alarm(
        &self,
        description: &str,
        due_at: NaiveDateTime,
        recurrence: Recurrence,
    ) -> RepoResult<AlarmId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO alarms (description, due_at, recurrence)
             VALUES (?1, ?2, ?3);",
            params![
                description,
                clock::format_datetime(due_at),
                recurrence_to_db(recurrence),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn load_alarms(&self) -> RepoResult<Vec<Alarm>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{ALARM_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut alarms = Vec::new();

        while let Some(row) = rows.next()? {
            alarms.push(parse_alarm_row(row)?);
        }

        Ok(alarms)
    }

    fn update_due_at(&self, id: AlarmId, due_at: NaiveDateTime) -> RepoResult<()> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE alarms
             SET
                due_at = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![clock::format_datetime(due_at), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn check_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'alarms';",
        [],
        |row| row.get(0),
    )?;
    if table_count == 0 {
        return Err(RepoError::MissingRequiredTable("alarms"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(alarms);")?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>("name")?);
    }

    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "alarms",
                column,
            });
        }
    }

    Ok(())
}

fn parse_alarm_row(row: &Row<'_>) -> RepoResult<Alarm> {
    let due_at_text: String = row.get("due_at")?;
    let due_at = clock::parse_datetime(&due_at_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid due time `{due_at_text}` in alarms.due_at"))
    })?;

    let recurrence_text: String = row.get("recurrence")?;
    let recurrence = parse_recurrence(&recurrence_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid recurrence `{recurrence_text}` in alarms.recurrence"
        ))
    })?;

    Ok(Alarm {
        id: row.get("id")?,
        description: row.get("description")?,
        due_at,
        recurrence,
    })
}

fn recurrence_to_db(kind: Recurrence) -> &'static str {
    match kind {
        Recurrence::None => "none",
        Recurrence::Daily => "daily",
        Recurrence::Weekly => "weekly",
        Recurrence::Monthly => "monthly",
        Recurrence::Yearly => "yearly",
    }
}

fn parse_recurrence(value: &str) -> Option<Recurrence> {
    match value {
        "none" => Some(Recurrence::None),
        "daily" => Some(Recurrence::Daily),
        "weekly" => Some(Recurrence::Weekly),
        "monthly" => Some(Recurrence::Monthly),
        "yearly" => Some(Recurrence::Yearly),
        _ => None,
    }
}
