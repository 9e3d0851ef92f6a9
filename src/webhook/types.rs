//! Typed, fully-normalized webhook payload.
//!
//! Values of these types only come out of validation (or are built
//! directly in code), so every `WebhookPayload` in memory already
//! satisfies the submission contract. Section presence is carried by
//! `Coverage`, and `quoteType` on the wire is derived from it.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::models::enums::str_enum;
use crate::models::QuoteType;

static CURRENCY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$(?:\d{1,3}(?:,\d{3})+|\d+)$").unwrap());

// ═══════════════════════════════════════════════════════════════════════════
// Constrained value types
// ═══════════════════════════════════════════════════════════════════════════

/// A display-formatted dollar amount such as `"$450,000"`.
///
/// Kept as text: the receiver requires the exact formatting, so the value
/// is never converted to a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        CURRENCY_PATTERN
            .is_match(trimmed)
            .then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sequence with at least one element.
#[derive(Debug, Clone, PartialEq)]
pub struct NonEmpty<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> NonEmpty<T> {
    pub fn new(head: T) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    pub fn from_vec(items: Vec<T>) -> Option<Self> {
        let mut iter = items.into_iter();
        let head = iter.next()?;
        Some(Self {
            head,
            tail: iter.collect(),
        })
    }

    pub fn push(&mut self, item: T) {
        self.tail.push(item);
    }

    pub fn first(&self) -> &T {
        &self.head
    }

    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }
}

impl<T: Serialize> Serialize for NonEmpty<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Enumerations
// ═══════════════════════════════════════════════════════════════════════════

str_enum!(MaritalStatus {
    Single => "single",
    Married => "married",
    Divorced => "divorced",
    Widowed => "widowed",
    Separated => "separated",
    DomesticPartner => "domestic_partner",
});

str_enum!(DwellingType {
    SingleFamily => "single_family",
    Condo => "condo",
    Townhouse => "townhouse",
    MultiFamily => "multi_family",
    Mobile => "mobile",
});

str_enum!(ConstructionType {
    Frame => "frame",
    Masonry => "masonry",
    MasonryVeneer => "masonry_veneer",
    Steel => "steel",
    Other => "other",
});

str_enum!(Occupancy {
    Primary => "primary",
    Secondary => "secondary",
    Rental => "rental",
    Vacant => "vacant",
});

str_enum!(DriverRelationship {
    Named => "self",
    Spouse => "spouse",
    Child => "child",
    Other => "other",
});

str_enum!(VehicleUsage {
    Commute => "commute",
    Pleasure => "pleasure",
    Business => "business",
});

str_enum!(VehicleOwnership {
    Owned => "owned",
    Financed => "financed",
    Leased => "leased",
});

str_enum!(IncidentKind {
    Accident => "accident",
    Violation => "violation",
    Claim => "claim",
});

// ═══════════════════════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub quote_id: String,
    pub extraction_id: Uuid,
    pub user_id: String,
    pub filename: String,
    pub submitted_at: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub city: String,
    /// Two-letter uppercase state code.
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spouse {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Personal {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    /// Digits only, ten of them.
    pub phone: String,
    pub email: String,
    pub marital_status: MaritalStatus,
    /// Normalized to `###-##-####`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<Spouse>,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_at_address: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub dwelling_type: DwellingType,
    pub year_built: u16,
    pub square_feet: u32,
    pub stories: u8,
    pub construction_type: ConstructionType,
    pub roof_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyFeatures {
    pub smoke_detectors: bool,
    pub fire_extinguisher: bool,
    pub deadbolts: bool,
    pub burglar_alarm: bool,
    pub fire_alarm: bool,
    pub sprinklers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeCoverage {
    pub dwelling: Currency,
    pub personal_property: Currency,
    pub liability: Currency,
    pub medical_payments: Currency,
    pub deductible: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledValuable {
    pub description: String,
    pub value: Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItems {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jewelry: Option<Currency>,
    pub other_valuables: Vec<ScheduledValuable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorInsurance {
    pub carrier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_with_carrier: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lienholder {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub property: Property,
    pub occupancy: Occupancy,
    pub safety: SafetyFeatures,
    pub coverage: HomeCoverage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_items: Option<ScheduledItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_insurance: Option<PriorInsurance>,
    pub claims_last_five_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lienholder: Option<Lienholder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub license_number: String,
    pub license_state: String,
    pub relationship: DriverRelationship,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_licensed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub year: u16,
    pub make: String,
    pub model: String,
    /// 17 characters, uppercase.
    pub vin: String,
    pub usage: VehicleUsage,
    pub ownership: VehicleOwnership,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_mileage: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCoverage {
    pub bodily_injury_per_person: Currency,
    pub bodily_injury_per_accident: Currency,
    pub property_damage: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uninsured_motorist: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comprehensive_deductible: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collision_deductible: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub date: NaiveDate,
    pub kind: IncidentKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_fault: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Auto {
    pub effective_date: NaiveDate,
    /// Resolved even when `garaging_same_as_mailing` is set.
    pub garaging_address: Address,
    pub garaging_same_as_mailing: bool,
    pub rideshare: bool,
    pub delivery: bool,
    pub drivers: NonEmpty<Driver>,
    pub vehicles: NonEmpty<Vehicle>,
    pub coverage: AutoCoverage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_insurance: Option<PriorInsurance>,
    pub incidents: Vec<Incident>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Payload
// ═══════════════════════════════════════════════════════════════════════════

/// Which coverage sections a quote carries. Exactly one of these shapes,
/// so a quote with neither section (or a mislabelled one) cannot exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Coverage {
    Home(Home),
    Auto(Auto),
    Both { home: Home, auto: Auto },
}

impl Coverage {
    pub fn quote_type(&self) -> QuoteType {
        match self {
            Self::Home(_) => QuoteType::Home,
            Self::Auto(_) => QuoteType::Auto,
            Self::Both { .. } => QuoteType::Both,
        }
    }

    pub fn home(&self) -> Option<&Home> {
        match self {
            Self::Home(home) | Self::Both { home, .. } => Some(home),
            Self::Auto(_) => None,
        }
    }

    pub fn auto(&self) -> Option<&Auto> {
        match self {
            Self::Auto(auto) | Self::Both { auto, .. } => Some(auto),
            Self::Home(_) => None,
        }
    }
}

/// One quote submission, ready to send to the RPA receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    pub metadata: Metadata,
    pub personal: Personal,
    pub coverage: Coverage,
}

impl WebhookPayload {
    pub fn quote_type(&self) -> QuoteType {
        self.coverage.quote_type()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata<'a> {
    #[serde(flatten)]
    base: &'a Metadata,
    quote_type: QuoteType,
}

#[derive(Serialize)]
struct WirePayload<'a> {
    metadata: WireMetadata<'a>,
    personal: &'a Personal,
    #[serde(skip_serializing_if = "Option::is_none")]
    home: Option<&'a Home>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto: Option<&'a Auto>,
}

impl Serialize for WebhookPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WirePayload {
            metadata: WireMetadata {
                base: &self.metadata,
                quote_type: self.quote_type(),
            },
            personal: &self.personal,
            home: self.coverage.home(),
            auto: self.coverage.auto(),
        }
        .serialize(serializer)
    }
}
