//! Lead repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and pipeline updates over `leads` and `listings` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Lead::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Loads order by `created_at ASC, uuid ASC` so columns read chronologically.

use crate::board::store::LeadBoard;
use crate::db::DbError;
use crate::model::lead::{Lead, LeadId, LeadStatus, LeadValidationError, LinkedListing};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const LEAD_SELECT_SQL: &str = "SELECT
    leads.uuid,
    leads.status,
    leads.name,
    leads.company,
    leads.email,
    leads.phone,
    leads.message,
    leads.listing_id,
    listings.title AS listing_title,
    listings.price_cents AS listing_price_cents,
    leads.created_at,
    leads.notes,
    leads.is_read
FROM leads
LEFT JOIN listings ON listings.id = leads.listing_id";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for lead persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(LeadValidationError),
    Db(DbError),
    NotFound(LeadId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "lead not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted lead data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<LeadValidationError> for RepoError {
    fn from(value: LeadValidationError) -> Self {
        Self::Validation(value)
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

/// Query options for listing leads.
#[derive(Debug, Clone, Default)]
pub struct LeadListQuery {
    pub status: Option<LeadStatus>,
    pub listing_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for lead persistence.
pub trait LeadRepository {
    /// Inserts or refreshes a listing referenced by leads.
    fn upsert_listing(&self, listing: &LinkedListing) -> RepoResult<()>;
    /// Inserts a lead; its linked listing is upserted first.
    fn create_lead(&self, lead: &Lead) -> RepoResult<LeadId>;
    fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>>;
    fn list_leads(&self, query: &LeadListQuery) -> RepoResult<Vec<Lead>>;
    fn update_status(&self, id: LeadId, status: LeadStatus) -> RepoResult<()>;
    fn update_notes(&self, id: LeadId, notes: Option<&str>) -> RepoResult<()>;
    fn mark_read(&self, id: LeadId) -> RepoResult<()>;
    /// Loads every lead partitioned into board columns.
    fn load_board(&self) -> RepoResult<LeadBoard> {
        Ok(LeadBoard::from_leads(
            self.list_leads(&LeadListQuery::default())?,
        ))
    }
}

/// SQLite-backed lead repository.
pub struct SqliteLeadRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLeadRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn touch(&self, id: LeadId, sql: &str, value: Value) -> RepoResult<()> {
        let changed = self.conn.execute(sql, params![value, id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl LeadRepository for SqliteLeadRepository<'_> {
    fn upsert_listing(&self, listing: &LinkedListing) -> RepoResult<()> {
        if listing.title.trim().is_empty() {
            return Err(LeadValidationError::BlankListingTitle(listing.id.clone()).into());
        }
        self.conn.execute(
            "INSERT INTO listings (id, title, price_cents) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                price_cents = excluded.price_cents;",
            params![listing.id, listing.title, listing.price_cents],
        )?;
        Ok(())
    }

    fn create_lead(&self, lead: &Lead) -> RepoResult<LeadId> {
        lead.validate()?;
        if let Some(listing) = &lead.listing {
            self.upsert_listing(listing)?;
        }

        self.conn.execute(
            "INSERT INTO leads (
                uuid,
                status,
                name,
                company,
                email,
                phone,
                message,
                listing_id,
                created_at,
                notes,
                is_read
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                lead.id.to_string(),
                lead.status.as_str(),
                lead.name,
                lead.company,
                lead.email,
                lead.phone,
                lead.message,
                lead.listing_id(),
                lead.created_at_ms,
                lead.notes,
                i64::from(lead.is_read),
            ],
        )?;

        Ok(lead.id)
    }

    fn get_lead(&self, id: LeadId) -> RepoResult<Option<Lead>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LEAD_SELECT_SQL} WHERE leads.uuid = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| Ok(parse_lead_row(row)))
            .optional()?;
        row.transpose()
    }

    fn list_leads(&self, query: &LeadListQuery) -> RepoResult<Vec<Lead>> {
        let mut sql = format!("{LEAD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND leads.status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(listing_id) = &query.listing_id {
            sql.push_str(" AND leads.listing_id = ?");
            bind_values.push(Value::Text(listing_id.clone()));
        }

        sql.push_str(" ORDER BY leads.created_at ASC, leads.uuid ASC");

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(parse_lead_row(row)?);
        }
        Ok(leads)
    }

    fn update_status(&self, id: LeadId, status: LeadStatus) -> RepoResult<()> {
        self.touch(
            id,
            "UPDATE leads
             SET status = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            Value::Text(status.as_str().to_string()),
        )
    }

    fn update_notes(&self, id: LeadId, notes: Option<&str>) -> RepoResult<()> {
        let value = notes.map_or(Value::Null, |text| Value::Text(text.to_string()));
        self.touch(
            id,
            "UPDATE leads
             SET notes = ?1, updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            value,
        )
    }

    fn mark_read(&self, id: LeadId) -> RepoResult<()> {
        self.touch(
            id,
            "UPDATE leads SET is_read = ?1 WHERE uuid = ?2;",
            Value::Integer(1),
        )
    }
}

fn parse_lead_row(row: &Row<'_>) -> RepoResult<Lead> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in leads.uuid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = status_text
        .parse::<LeadStatus>()
        .map_err(|_| RepoError::InvalidData(format!("invalid status `{status_text}` in leads.status")))?;

    let listing = match row.get::<_, Option<String>>("listing_id")? {
        Some(listing_id) => {
            let title: Option<String> = row.get("listing_title")?;
            let title = title.ok_or_else(|| {
                RepoError::InvalidData(format!("lead references missing listing `{listing_id}`"))
            })?;
            Some(LinkedListing {
                id: listing_id,
                title,
                price_cents: row.get("listing_price_cents")?,
            })
        }
        None => None,
    };

    let is_read = match row.get::<_, i64>("is_read")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_read value `{other}` in leads.is_read"
            )));
        }
    };

    let lead = Lead {
        id,
        status,
        name: row.get("name")?,
        company: row.get("company")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        message: row.get("message")?,
        listing,
        created_at_ms: row.get("created_at")?,
        notes: row.get("notes")?,
        is_read,
    };
    lead.validate()?;
    Ok(lead)
}
