//! Database types and global state

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Utc};
use heed::types::{Bytes, Str, Unit, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::error::{err, Result, WidgetError};
use crate::model::ResourceKind;

// Database type aliases
pub type Rows = Database<Bytes, Bytes>;
pub type Index = Database<Bytes, Unit>;
pub type Counters = Database<Str, U64<byteorder::BigEndian>>;
pub type Tokens = Database<Str, Bytes>;

pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Create a 32-byte key from two ids
#[inline]
pub fn key(a: &Uuid, b: &Uuid) -> [u8; 32] {
    let mut k = [0u8; 32];
    k[..16].copy_from_slice(a.as_bytes());
    k[16..].copy_from_slice(b.as_bytes());
    k
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(err)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(err)
}

#[inline]
pub fn get_row<T: DeserializeOwned>(db: &Rows, tx: &RoTxn, id: &Uuid) -> Result<Option<T>> {
    match db.get(tx, id.as_bytes()).map_err(err)? {
        Some(bytes) => decode(bytes).map(Some),
        None => Ok(None),
    }
}

#[inline]
pub fn put_row<T: Serialize>(db: &Rows, tx: &mut RwTxn, id: &Uuid, value: &T) -> Result<()> {
    db.put(tx, id.as_bytes(), &encode(value)?).map_err(err)
}

/// Partner-owned table: rows[id] and by_partner[partner, id] stay in sync
pub struct OwnedTable {
    pub rows: Rows,
    pub by_partner: Index,
}

impl OwnedTable {
    #[inline]
    pub fn get<T: DeserializeOwned>(&self, tx: &RoTxn, id: &Uuid) -> Result<Option<T>> {
        get_row(&self.rows, tx, id)
    }

    #[inline]
    pub fn put<T: Serialize>(&self, tx: &mut RwTxn, partner: &Uuid, id: &Uuid, value: &T) -> Result<()> {
        put_row(&self.rows, tx, id, value)?;
        self.by_partner.put(tx, &key(partner, id), &()).map_err(err)
    }

    #[inline]
    pub fn del(&self, tx: &mut RwTxn, partner: &Uuid, id: &Uuid) -> Result<bool> {
        let r = self.rows.delete(tx, id.as_bytes()).map_err(err)?;
        self.by_partner.delete(tx, &key(partner, id)).map_err(err)?;
        Ok(r)
    }

    /// Ids owned by a partner, via the ownership index
    pub fn ids_for(&self, tx: &RoTxn, partner: &Uuid) -> Result<Vec<Uuid>> {
        let mut r = Vec::new();
        for item in self.by_partner.prefix_iter(tx, partner.as_bytes()).map_err(err)? {
            let (k, _) = item.map_err(err)?;
            if k.len() == 32 {
                r.push(Uuid::from_slice(&k[16..32]).map_err(err)?);
            }
        }
        Ok(r)
    }

    pub fn list_for<T: DeserializeOwned>(&self, tx: &RoTxn, partner: &Uuid) -> Result<Vec<T>> {
        let mut r = Vec::new();
        for id in self.ids_for(tx, partner)? {
            if let Some(v) = self.get(tx, &id)? {
                r.push(v);
            }
        }
        Ok(r)
    }

    fn clear(&self, tx: &mut RwTxn) -> Result<()> {
        self.rows.clear(tx).map_err(err)?;
        self.by_partner.clear(tx).map_err(err)
    }
}

/// All database handles
pub struct Dbs {
    pub users: Rows,
    pub partners: Rows,
    /// user id -> partner id
    pub members: Rows,
    pub images: Rows,
    pub banners: OwnedTable,
    pub widget_apps: OwnedTable,
    pub widgets: OwnedTable,
    /// sha256(token) -> user id
    pub tokens: Tokens,
    pub meta: Counters,
}

impl Dbs {
    #[inline]
    pub fn owned(&self, kind: ResourceKind) -> &OwnedTable {
        match kind {
            ResourceKind::Banner => &self.banners,
            ResourceKind::WidgetApp => &self.widget_apps,
            ResourceKind::Widget => &self.widgets,
        }
    }
}

// Global state
pub static ENV: OnceLock<Env> = OnceLock::new();
pub static DBS: OnceLock<Dbs> = OnceLock::new();
pub static TEST_LOCK: Mutex<()> = Mutex::new(());
pub static INIT_PATH: OnceLock<String> = OnceLock::new();
pub static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

/// Get the database handles, or error if not initialized
#[inline]
pub fn dbs() -> Result<&'static Dbs> {
    DBS.get().ok_or_else(|| WidgetError::Storage("Not initialized".into()))
}

/// Get the environment, or error if not initialized
#[inline]
pub fn env() -> Result<&'static Env> {
    ENV.get().ok_or_else(|| WidgetError::Storage("Not initialized".into()))
}

/// Get the notification dispatcher, or error if not initialized
#[inline]
pub fn dispatcher() -> Result<&'static Dispatcher> {
    DISPATCHER.get().ok_or_else(|| WidgetError::Storage("Not initialized".into()))
}

/// Execute a read-only operation
#[inline]
pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(f: F) -> Result<T> {
    f(dbs()?, &env()?.read_txn().map_err(err)?)
}

/// Initialize the database with the default map size
pub fn init(path: &str) -> Result<()> {
    init_with(path, DEFAULT_MAP_SIZE)
}

/// Initialize the database. Idempotent for the same path.
pub fn init_with(path: &str, map_size: usize) -> Result<()> {
    if let Some(p) = INIT_PATH.get() {
        return if p == path {
            Ok(())
        } else {
            Err(WidgetError::Storage(format!("Already init at {}", p)))
        };
    }
    std::fs::create_dir_all(path).map_err(err)?;
    // SAFETY: LMDB requires no other processes access this path concurrently during open.
    let e = unsafe {
        EnvOpenOptions::new()
            .map_size(map_size)
            .max_dbs(12)
            .open(Path::new(path))
            .map_err(err)?
    };
    let mut tx = e.write_txn().map_err(err)?;
    let d = Dbs {
        users: e.create_database(&mut tx, Some("users")).map_err(err)?,
        partners: e.create_database(&mut tx, Some("partners")).map_err(err)?,
        members: e.create_database(&mut tx, Some("members")).map_err(err)?,
        images: e.create_database(&mut tx, Some("images")).map_err(err)?,
        banners: OwnedTable {
            rows: e.create_database(&mut tx, Some("banners")).map_err(err)?,
            by_partner: e.create_database(&mut tx, Some("banners_by_partner")).map_err(err)?,
        },
        widget_apps: OwnedTable {
            rows: e.create_database(&mut tx, Some("widget_apps")).map_err(err)?,
            by_partner: e.create_database(&mut tx, Some("widget_apps_by_partner")).map_err(err)?,
        },
        widgets: OwnedTable {
            rows: e.create_database(&mut tx, Some("widgets")).map_err(err)?,
            by_partner: e.create_database(&mut tx, Some("widgets_by_partner")).map_err(err)?,
        },
        tokens: e.create_database(&mut tx, Some("tokens")).map_err(err)?,
        meta: e.create_database(&mut tx, Some("meta")).map_err(err)?,
    };
    tx.commit().map_err(err)?;
    let _ = (ENV.set(e), DBS.set(d), INIT_PATH.set(path.to_string()));
    let _ = DISPATCHER.set(Dispatcher::new());
    info!(path, map_size, "storage initialized");
    Ok(())
}

/// Clear all databases (for testing)
pub fn clear_all() -> Result<()> {
    crate::tx::transact(|tx| {
        let d = tx.dbs();
        d.users.clear(tx.tx()).map_err(err)?;
        d.partners.clear(tx.tx()).map_err(err)?;
        d.members.clear(tx.tx()).map_err(err)?;
        d.images.clear(tx.tx()).map_err(err)?;
        d.banners.clear(tx.tx())?;
        d.widget_apps.clear(tx.tx())?;
        d.widgets.clear(tx.tx())?;
        d.tokens.clear(tx.tx()).map_err(err)?;
        d.meta.clear(tx.tx()).map_err(err)
    })
}

/// Rewrite a record's creation time (for testing date filters and ordering)
pub fn backdate(kind: ResourceKind, id: &Uuid, created_at: DateTime<Utc>) -> Result<bool> {
    crate::tx::transact(|tx| match kind {
        ResourceKind::Widget => match tx.widget(id)? {
            Some(mut w) => {
                w.created_at = created_at;
                tx.put_widget(&w)?;
                Ok(true)
            }
            None => Ok(false),
        },
        _ => match tx.linked(kind, id)? {
            Some(mut r) => {
                r.created_at = created_at;
                tx.put_linked(kind, &r)?;
                Ok(true)
            }
            None => Ok(false),
        },
    })
}

/// Get the test lock (for single-threaded tests)
pub fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}
