use anyhow::{Context as _, anyhow};
use rusqlite::{Connection, OptionalExtension as _, params};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use waypoint_domain::{ConfigValue, KeyValueStore};

const LATEST_SCHEMA_VERSION: u32 = 1;

const MIGRATIONS: &[(u32, &str)] = &[(
    1,
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/migrations/0001_init.sql"
    )),
)];

/// Durable key-value storage backed by sqlite.
///
/// All statements run on a dedicated worker thread; handles are cheap to
/// clone and commands are applied in the order they were sent.
#[derive(Clone)]
pub struct SqliteStore {
    tx: mpsc::Sender<DbCommand>,
}

enum DbCommand {
    GetValue {
        key: String,
        reply: mpsc::Sender<anyhow::Result<ConfigValue>>,
    },
    SetValue {
        key: String,
        value: ConfigValue,
        reply: mpsc::Sender<anyhow::Result<()>>,
    },
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<DbCommand>();

        std::thread::Builder::new()
            .name("waypoint-sqlite".to_owned())
            .spawn(move || {
                let mut db = SqliteDatabase::open(&db_path);
                while let Ok(cmd) = rx.recv() {
                    match (&mut db, cmd) {
                        (Ok(db), DbCommand::GetValue { key, reply }) => {
                            let _ = reply.send(db.get_value(&key));
                        }
                        (Ok(db), DbCommand::SetValue { key, value, reply }) => {
                            let _ = reply.send(db.set_value(&key, &value));
                        }
                        (Err(err), cmd) => respond_db_open_error(err, cmd),
                    }
                }
            })
            .context("failed to spawn sqlite worker")?;

        Ok(Self { tx })
    }

    pub fn get(&self, key: impl Into<String>) -> anyhow::Result<ConfigValue> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(DbCommand::GetValue {
                key: key.into(),
                reply: reply_tx,
            })
            .context("sqlite worker is not running")?;
        reply_rx.recv().context("sqlite worker terminated")?
    }

    pub fn set(&self, key: impl Into<String>, value: ConfigValue) -> anyhow::Result<()> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(DbCommand::SetValue {
                key: key.into(),
                value,
                reply: reply_tx,
            })
            .context("sqlite worker is not running")?;
        reply_rx.recv().context("sqlite worker terminated")?
    }
}

impl KeyValueStore for SqliteStore {
    fn get_value(&self, key: &str) -> Result<ConfigValue, String> {
        self.get(key).map_err(|e| format!("{e:#}"))
    }

    fn set_value(&self, key: &str, value: ConfigValue) -> Result<(), String> {
        self.set(key, value).map_err(|e| format!("{e:#}"))
    }
}

fn respond_db_open_error(err: &anyhow::Error, cmd: DbCommand) {
    let message = format!("failed to open sqlite db: {err:#}");
    match cmd {
        DbCommand::GetValue { reply, .. } => {
            let _ = reply.send(Err(anyhow!(message)));
        }
        DbCommand::SetValue { reply, .. } => {
            let _ = reply.send(Err(anyhow!(message)));
        }
    }
}

struct SqliteDatabase {
    conn: Connection,
}

impl SqliteDatabase {
    fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut conn = Connection::open(db_path)
            .with_context(|| format!("failed to open sqlite db {}", db_path.display()))?;

        configure_connection(&mut conn).context("failed to configure sqlite connection")?;
        apply_migrations(&mut conn).context("failed to apply sqlite migrations")?;

        Ok(Self { conn })
    }

    fn get_value(&mut self, key: &str) -> anyhow::Result<ConfigValue> {
        let row = self
            .conn
            .query_row(
                "SELECT is_null, value FROM config_values WHERE key = ?1",
                params![key],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .with_context(|| format!("failed to load config value {key}"))?;

        Ok(match row {
            Some((is_null, s)) => ConfigValue {
                is_null: is_null != 0,
                s,
            },
            None => ConfigValue::null(),
        })
    }

    fn set_value(&mut self, key: &str, value: &ConfigValue) -> anyhow::Result<()> {
        let now = now_unix_seconds();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO config_values (key, is_null, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, COALESCE((SELECT created_at FROM config_values WHERE key = ?1), ?4), ?4)
             ON CONFLICT(key) DO UPDATE SET
               is_null = excluded.is_null,
               value = excluded.value,
               updated_at = excluded.updated_at",
            params![key, i64::from(value.is_null), value.s, now],
        )
        .with_context(|| format!("failed to store config value {key}"))?;
        tx.commit()?;
        Ok(())
    }
}

fn configure_connection(conn: &mut Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )
    .context("failed to apply sqlite PRAGMAs")?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> anyhow::Result<()> {
    let current: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .context("failed to read user_version")? as u32;

    if current > LATEST_SCHEMA_VERSION {
        return Err(anyhow!(
            "sqlite schema version is newer than this build: db={}, app={}",
            current,
            LATEST_SCHEMA_VERSION
        ));
    }

    if current == LATEST_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to begin migration transaction")?;
    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        tx.execute_batch(sql)
            .with_context(|| format!("failed to apply migration v{version:04}"))?;
        tx.pragma_update(None, "user_version", *version)
            .with_context(|| format!("failed to bump user_version to {version}"))?;
    }
    tx.commit().context("failed to commit migrations")?;
    Ok(())
}

fn now_unix_seconds() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
