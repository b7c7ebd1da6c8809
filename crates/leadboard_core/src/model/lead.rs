//! Lead domain model.
//!
//! # Responsibility
//! - Define the canonical inquiry record tracked by the pipeline board.
//! - Define the closed set of pipeline stages a lead can sit in.
//!
//! # Invariants
//! - `id` is stable and never reused for another lead.
//! - `status` is the only field a bucket transition changes.
//! - `created_at_ms` is a non-negative Unix epoch millisecond value.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a lead.
pub type LeadId = Uuid;

/// Pipeline stage of a lead.
///
/// Variant order is the kanban column order (left to right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Inquiry received, nobody has reacted yet.
    New,
    /// Seller reached out to the buyer.
    Contacted,
    /// A price offer is on the table.
    OfferSent,
    /// Deal closed.
    Won,
    /// Deal did not happen.
    Lost,
}

impl LeadStatus {
    /// All stages in display order.
    pub const ALL: [LeadStatus; 5] = [
        Self::New,
        Self::Contacted,
        Self::OfferSent,
        Self::Won,
        Self::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::OfferSent => "offer_sent",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl Display for LeadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "offer_sent" | "offer-sent" => Ok(Self::OfferSent),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!(
                "invalid lead status `{other}`; expected new|contacted|offer_sent|won|lost"
            )),
        }
    }
}

/// Listing the inquiry was sent for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedListing {
    pub id: String,
    pub title: String,
    /// Asking price in minor currency units, when the seller published one.
    pub price_cents: Option<i64>,
}

/// Inquiry record shown on the pipeline board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub status: LeadStatus,
    /// Contact person.
    pub name: String,
    pub company: Option<String>,
    /// May be empty for phone-only inquiries.
    pub email: String,
    pub phone: Option<String>,
    /// Original inquiry text.
    pub message: Option<String>,
    pub listing: Option<LinkedListing>,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    /// Seller-private notes edited from the detail view.
    pub notes: Option<String>,
    /// Set the first time the detail view is opened.
    pub is_read: bool,
}

/// Validation failures for lead records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadValidationError {
    BlankName,
    InvalidEmail(String),
    NegativeCreatedAt(i64),
    BlankListingTitle(String),
}

impl Display for LeadValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "lead name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid lead email `{value}`"),
            Self::NegativeCreatedAt(value) => {
                write!(f, "created_at must be non-negative, got {value}")
            }
            Self::BlankListingTitle(id) => {
                write!(f, "linked listing `{id}` must have a non-blank title")
            }
        }
    }
}

impl Error for LeadValidationError {}

impl Lead {
    /// Creates a new lead in `LeadStatus::New` with a generated ID.
    pub fn new(name: impl Into<String>, email: impl Into<String>, created_at_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), name, email, created_at_ms)
    }

    /// Creates a lead with a caller-provided ID.
    ///
    /// Used by load paths where identity already exists in storage.
    pub fn with_id(
        id: LeadId,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id,
            status: LeadStatus::New,
            name: name.into(),
            company: None,
            email: email.into(),
            phone: None,
            message: None,
            listing: None,
            created_at_ms,
            notes: None,
            is_read: false,
        }
    }

    /// Builder-style status override.
    pub fn in_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder-style company override.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Builder-style linked listing override.
    pub fn with_listing(mut self, listing: LinkedListing) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn listing_id(&self) -> Option<&str> {
        self.listing.as_ref().map(|listing| listing.id.as_str())
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), LeadValidationError> {
        if self.name.trim().is_empty() {
            return Err(LeadValidationError::BlankName);
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(LeadValidationError::InvalidEmail(self.email.clone()));
        }
        if self.created_at_ms < 0 {
            return Err(LeadValidationError::NegativeCreatedAt(self.created_at_ms));
        }
        if let Some(listing) = &self.listing {
            if listing.title.trim().is_empty() {
                return Err(LeadValidationError::BlankListingTitle(listing.id.clone()));
            }
        }
        Ok(())
    }
}
