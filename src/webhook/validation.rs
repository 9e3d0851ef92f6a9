//! Draft → typed payload conversion.
//!
//! Every check runs; failures are collected as `"<path>: <problem>"`
//! strings (paths use the camelCase wire names) and returned together.
//! Section builders return `None` only after recording at least one error.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use uuid::Uuid;

use super::draft::*;
use super::types::*;
use crate::config::PAYLOAD_SCHEMA_VERSION;
use crate::models::QuoteType;

static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static SSN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{3})-?(\d{2})-?(\d{4})$").unwrap());
static STATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());
static ZIP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(?:-\d{4})?$").unwrap());
static VIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").unwrap());

/// Validate and normalize a draft into a submittable payload.
pub fn validate(draft: &PayloadDraft) -> Result<WebhookPayload, Vec<String>> {
    let mut c = Collector::default();
    let payload = payload(&mut c, draft);
    match payload {
        Some(payload) if c.errors.is_empty() => Ok(payload),
        _ => {
            if c.errors.is_empty() {
                c.fail("payload", "is invalid");
            }
            Err(c.errors)
        }
    }
}

/// Re-check a typed payload, e.g. one assembled or edited in code rather
/// than produced by `validate`.
///
/// The payload goes back through the draft rules, so every constrained
/// field meets the same checks and gets the same normalization. The
/// returned copy is the one to send.
pub fn validate_payload(payload: &WebhookPayload) -> Result<WebhookPayload, Vec<String>> {
    let draft = serde_json::to_value(payload)
        .and_then(serde_json::from_value::<PayloadDraft>)
        .map_err(|e| vec![format!("payload: cannot be re-read as a draft: {e}")])?;
    validate(&draft)
}

#[derive(Default)]
struct Collector {
    errors: Vec<String>,
}

fn at(base: &str, field: &str) -> String {
    format!("{base}.{field}")
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn this_year() -> i64 {
    i64::from(Utc::now().year())
}

impl Collector {
    fn fail(&mut self, path: &str, problem: impl Display) {
        self.errors.push(format!("{path}: {problem}"));
    }

    fn required<T>(&mut self, path: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.fail(path, "is required");
        }
        value
    }

    fn text(&mut self, path: &str, value: Option<&String>) -> Option<String> {
        self.required(path, trimmed(value))
    }

    fn parse_date(&mut self, path: &str, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let parsed = DATE_SHAPE
            .is_match(raw)
            .then(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .flatten();
        if parsed.is_none() {
            self.fail(path, format!("'{raw}' is not a calendar date in YYYY-MM-DD format"));
        }
        parsed
    }

    fn date(&mut self, path: &str, value: Option<&String>) -> Option<NaiveDate> {
        let raw = self.text(path, value)?;
        self.parse_date(path, &raw)
    }

    fn optional_date(&mut self, path: &str, value: Option<&String>) -> Option<NaiveDate> {
        let raw = trimmed(value)?;
        self.parse_date(path, &raw)
    }

    fn birth_date(&mut self, path: &str, value: Option<&String>) -> Option<NaiveDate> {
        let date = self.date(path, value)?;
        if date > Utc::now().date_naive() {
            self.fail(path, "must not be in the future");
            return None;
        }
        Some(date)
    }

    fn parse_currency(&mut self, path: &str, raw: &str) -> Option<Currency> {
        let parsed = Currency::parse(raw);
        if parsed.is_none() {
            self.fail(path, format!("'{raw}' is not a dollar amount such as \"$450,000\""));
        }
        parsed
    }

    fn currency(&mut self, path: &str, value: Option<&String>) -> Option<Currency> {
        let raw = self.text(path, value)?;
        self.parse_currency(path, &raw)
    }

    fn optional_currency(&mut self, path: &str, value: Option<&String>) -> Option<Currency> {
        let raw = trimmed(value)?;
        self.parse_currency(path, &raw)
    }

    fn choice<T: Copy + Display>(
        &mut self,
        path: &str,
        value: Option<&String>,
        all: &[T],
    ) -> Option<T> {
        let raw = self.text(path, value)?.to_lowercase();
        let found = all.iter().copied().find(|v| v.to_string() == raw);
        if found.is_none() {
            let options: Vec<String> = all.iter().map(ToString::to_string).collect();
            self.fail(
                path,
                format!("'{raw}' is not one of {}", options.join(", ")),
            );
        }
        found
    }

    fn parse_int<T: TryFrom<i64>>(
        &mut self,
        path: &str,
        n: i64,
        range: RangeInclusive<i64>,
    ) -> Option<T> {
        let converted = range
            .contains(&n)
            .then(|| T::try_from(n).ok())
            .flatten();
        if converted.is_none() {
            self.fail(
                path,
                format!("{n} is outside {}..={}", range.start(), range.end()),
            );
        }
        converted
    }

    fn int<T: TryFrom<i64>>(
        &mut self,
        path: &str,
        value: Option<i64>,
        range: RangeInclusive<i64>,
    ) -> Option<T> {
        let n = self.required(path, value)?;
        self.parse_int(path, n, range)
    }

    fn optional_int<T: TryFrom<i64>>(
        &mut self,
        path: &str,
        value: Option<i64>,
        range: RangeInclusive<i64>,
    ) -> Option<T> {
        self.parse_int(path, value?, range)
    }

    fn matching(
        &mut self,
        path: &str,
        value: Option<String>,
        pattern: &Regex,
        expected: &str,
    ) -> Option<String> {
        let value = value?;
        if pattern.is_match(&value) {
            Some(value)
        } else {
            self.fail(path, format!("'{value}' must be {expected}"));
            None
        }
    }

    fn state_code(&mut self, path: &str, value: Option<&String>) -> Option<String> {
        let upper = self.text(path, value).map(|s| s.to_uppercase());
        self.matching(path, upper, &STATE, "a two-letter state code")
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════════════════════

fn payload(c: &mut Collector, draft: &PayloadDraft) -> Option<WebhookPayload> {
    let metadata_draft = c.required("metadata", draft.metadata.as_ref());
    let quote_type = metadata_draft.and_then(|m| {
        c.choice("metadata.quoteType", m.quote_type.as_ref(), QuoteType::ALL)
    });
    let metadata = metadata_draft.and_then(|m| metadata(c, m));

    let personal_draft = c.required("personal", draft.personal.as_ref());
    let personal = personal_draft.and_then(|p| personal(c, p));

    let home = draft.home.as_ref().and_then(|h| home(c, h));
    let mailing = personal.as_ref().map(|p| &p.address);
    let auto = draft.auto.as_ref().and_then(|a| auto(c, a, mailing));

    let coverage = coverage(c, quote_type, draft, home, auto);

    Some(WebhookPayload {
        metadata: metadata?,
        personal: personal?,
        coverage: coverage?,
    })
}

/// Pair the declared quote type with the sections actually present.
fn coverage(
    c: &mut Collector,
    quote_type: Option<QuoteType>,
    draft: &PayloadDraft,
    home: Option<Home>,
    auto: Option<Auto>,
) -> Option<Coverage> {
    let has_home = draft.home.is_some();
    let has_auto = draft.auto.is_some();

    let Some(quote_type) = quote_type else {
        if !has_home && !has_auto {
            c.fail("home", "at least one of home or auto is required");
        }
        return None;
    };

    let mut consistent = true;
    if quote_type.includes_home() && !has_home {
        c.fail("home", format!("is required when quoteType is {quote_type}"));
        consistent = false;
    }
    if !quote_type.includes_home() && has_home {
        c.fail("home", format!("must be absent when quoteType is {quote_type}"));
        consistent = false;
    }
    if quote_type.includes_auto() && !has_auto {
        c.fail("auto", format!("is required when quoteType is {quote_type}"));
        consistent = false;
    }
    if !quote_type.includes_auto() && has_auto {
        c.fail("auto", format!("must be absent when quoteType is {quote_type}"));
        consistent = false;
    }
    if !consistent {
        return None;
    }

    match quote_type {
        QuoteType::Home => Some(Coverage::Home(home?)),
        QuoteType::Auto => Some(Coverage::Auto(auto?)),
        QuoteType::Both => Some(Coverage::Both {
            home: home?,
            auto: auto?,
        }),
    }
}

fn metadata(c: &mut Collector, d: &MetadataDraft) -> Option<Metadata> {
    let quote_id = c.text("metadata.quoteId", d.quote_id.as_ref());
    let extraction_id = c
        .text("metadata.extractionId", d.extraction_id.as_ref())
        .and_then(|raw| match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                c.fail("metadata.extractionId", format!("'{raw}' is not a valid id"));
                None
            }
        });
    let user_id = c.text("metadata.userId", d.user_id.as_ref());
    let filename = c.text("metadata.filename", d.filename.as_ref());
    let submitted_at = c
        .text("metadata.submittedAt", d.submitted_at.as_ref())
        .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                c.fail(
                    "metadata.submittedAt",
                    format!("'{raw}' is not an ISO-8601 timestamp"),
                );
                None
            }
        });
    // Absent version means the current one.
    let version = trimmed(d.version.as_ref()).unwrap_or_else(|| PAYLOAD_SCHEMA_VERSION.into());
    let version = if version == PAYLOAD_SCHEMA_VERSION {
        Some(version)
    } else {
        c.fail(
            "metadata.version",
            format!("unsupported schema version '{version}', expected {PAYLOAD_SCHEMA_VERSION}"),
        );
        None
    };

    Some(Metadata {
        quote_id: quote_id?,
        extraction_id: extraction_id?,
        user_id: user_id?,
        filename: filename?,
        submitted_at: submitted_at?,
        version: version?,
    })
}

fn address(c: &mut Collector, path: &str, d: &AddressDraft) -> Option<Address> {
    let street = c.text(&at(path, "street"), d.street.as_ref());
    let city = c.text(&at(path, "city"), d.city.as_ref());
    let state = c.state_code(&at(path, "state"), d.state.as_ref());
    let zip_path = at(path, "zip");
    let zip = c.text(&zip_path, d.zip.as_ref());
    let zip = c.matching(&zip_path, zip, &ZIP, "a 5 or 9 digit ZIP code");

    Some(Address {
        street: street?,
        unit: trimmed(d.unit.as_ref()),
        city: city?,
        state: state?,
        zip: zip?,
    })
}

fn required_address(c: &mut Collector, path: &str, d: Option<&AddressDraft>) -> Option<Address> {
    let d = c.required(path, d)?;
    address(c, path, d)
}

fn phone(c: &mut Collector, path: &str, value: Option<&String>) -> Option<String> {
    let raw = c.text(path, value)?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    };
    let punctuation_only = raw
        .chars()
        .all(|ch| ch.is_ascii_digit() || " ()-.+".contains(ch));
    if digits.len() == 10 && punctuation_only {
        Some(digits)
    } else {
        c.fail(path, format!("'{raw}' is not a 10-digit phone number"));
        None
    }
}

fn personal(c: &mut Collector, d: &PersonalDraft) -> Option<Personal> {
    let first_name = c.text("personal.firstName", d.first_name.as_ref());
    let last_name = c.text("personal.lastName", d.last_name.as_ref());
    let date_of_birth = c.birth_date("personal.dateOfBirth", d.date_of_birth.as_ref());
    let phone = phone(c, "personal.phone", d.phone.as_ref());
    let email = c.text("personal.email", d.email.as_ref()).map(|e| e.to_lowercase());
    let email = c.matching("personal.email", email, &EMAIL, "a valid email address");
    let marital_status = c.choice(
        "personal.maritalStatus",
        d.marital_status.as_ref(),
        MaritalStatus::ALL,
    );

    let ssn = trimmed(d.ssn.as_ref()).and_then(|raw| match SSN.captures(&raw) {
        Some(caps) => Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3])),
        None => {
            c.fail("personal.ssn", "must be nine digits as ###-##-####");
            None
        }
    });

    let spouse = d.spouse.as_ref().and_then(|s| {
        let first_name = c.text("personal.spouse.firstName", s.first_name.as_ref());
        let last_name = c.text("personal.spouse.lastName", s.last_name.as_ref());
        let date_of_birth = trimmed(s.date_of_birth.as_ref())
            .and_then(|_| c.birth_date("personal.spouse.dateOfBirth", s.date_of_birth.as_ref()));
        Some(Spouse {
            first_name: first_name?,
            last_name: last_name?,
            date_of_birth,
            occupation: trimmed(s.occupation.as_ref()),
        })
    });

    let mailing = required_address(c, "personal.address", d.address.as_ref());
    let prior_address = d
        .prior_address
        .as_ref()
        .and_then(|a| address(c, "personal.priorAddress", a));
    let years_at_address = c.optional_int("personal.yearsAtAddress", d.years_at_address, 0..=100);

    Some(Personal {
        first_name: first_name?,
        last_name: last_name?,
        date_of_birth: date_of_birth?,
        phone: phone?,
        email: email?,
        marital_status: marital_status?,
        ssn,
        occupation: trimmed(d.occupation.as_ref()),
        spouse,
        address: mailing?,
        prior_address,
        years_at_address,
    })
}

fn prior_insurance(c: &mut Collector, path: &str, d: &PriorInsuranceDraft) -> Option<PriorInsurance> {
    let carrier = c.text(&at(path, "carrier"), d.carrier.as_ref());
    let years_with_carrier = c.optional_int(&at(path, "yearsWithCarrier"), d.years_with_carrier, 0..=100);
    let expiration_date = c.optional_date(&at(path, "expirationDate"), d.expiration_date.as_ref());
    Some(PriorInsurance {
        carrier: carrier?,
        years_with_carrier,
        expiration_date,
    })
}

fn home(c: &mut Collector, d: &HomeDraft) -> Option<Home> {
    let next_year = this_year() + 1;

    let property = c.required("home.property", d.property.as_ref()).and_then(|p| {
        let dwelling_type = c.choice(
            "home.property.dwellingType",
            p.dwelling_type.as_ref(),
            DwellingType::ALL,
        );
        let year_built = c.int("home.property.yearBuilt", p.year_built, 1700..=next_year);
        let square_feet = c.int("home.property.squareFeet", p.square_feet, 1..=100_000);
        let stories = c.int("home.property.stories", p.stories, 1..=10);
        let construction_type = c.choice(
            "home.property.constructionType",
            p.construction_type.as_ref(),
            ConstructionType::ALL,
        );
        let roof_type = c.text("home.property.roofType", p.roof_type.as_ref());
        let roof_year = c.optional_int("home.property.roofYear", p.roof_year, 1700..=next_year);
        Some(Property {
            dwelling_type: dwelling_type?,
            year_built: year_built?,
            square_feet: square_feet?,
            stories: stories?,
            construction_type: construction_type?,
            roof_type: roof_type?,
            roof_year,
        })
    });

    let occupancy = c.choice("home.occupancy", d.occupancy.as_ref(), Occupancy::ALL);

    let safety = d.safety.clone().unwrap_or_default();
    let safety = SafetyFeatures {
        smoke_detectors: safety.smoke_detectors.unwrap_or(false),
        fire_extinguisher: safety.fire_extinguisher.unwrap_or(false),
        deadbolts: safety.deadbolts.unwrap_or(false),
        burglar_alarm: safety.burglar_alarm.unwrap_or(false),
        fire_alarm: safety.fire_alarm.unwrap_or(false),
        sprinklers: safety.sprinklers.unwrap_or(false),
    };

    let coverage = c.required("home.coverage", d.coverage.as_ref()).and_then(|cov| {
        let dwelling = c.currency("home.coverage.dwelling", cov.dwelling.as_ref());
        let personal_property =
            c.currency("home.coverage.personalProperty", cov.personal_property.as_ref());
        let liability = c.currency("home.coverage.liability", cov.liability.as_ref());
        let medical_payments =
            c.currency("home.coverage.medicalPayments", cov.medical_payments.as_ref());
        let deductible = c.currency("home.coverage.deductible", cov.deductible.as_ref());
        Some(HomeCoverage {
            dwelling: dwelling?,
            personal_property: personal_property?,
            liability: liability?,
            medical_payments: medical_payments?,
            deductible: deductible?,
        })
    });

    let scheduled_items = d.scheduled_items.as_ref().map(|s| {
        let jewelry = c.optional_currency("home.scheduledItems.jewelry", s.jewelry.as_ref());
        let other_valuables = s
            .other_valuables
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let path = format!("home.scheduledItems.otherValuables[{i}]");
                let description = c.text(&at(&path, "description"), item.description.as_ref());
                let value = c.currency(&at(&path, "value"), item.value.as_ref());
                Some(ScheduledValuable {
                    description: description?,
                    value: value?,
                })
            })
            .collect();
        ScheduledItems {
            jewelry,
            other_valuables,
        }
    });

    let prior = d
        .prior_insurance
        .as_ref()
        .and_then(|p| prior_insurance(c, "home.priorInsurance", p));
    let claims = c
        .optional_int("home.claimsLastFiveYears", d.claims_last_five_years, 0..=50)
        .unwrap_or(0);

    let lienholder = d.lienholder.as_ref().and_then(|l| {
        let name = c.text("home.lienholder.name", l.name.as_ref());
        let address = l
            .address
            .as_ref()
            .and_then(|a| address(c, "home.lienholder.address", a));
        Some(Lienholder {
            name: name?,
            address,
            loan_number: trimmed(l.loan_number.as_ref()),
        })
    });

    Some(Home {
        property: property?,
        occupancy: occupancy?,
        safety,
        coverage: coverage?,
        scheduled_items,
        prior_insurance: prior,
        claims_last_five_years: claims,
        lienholder,
    })
}

fn driver(c: &mut Collector, path: &str, d: &DriverDraft) -> Option<Driver> {
    let first_name = c.text(&at(path, "firstName"), d.first_name.as_ref());
    let last_name = c.text(&at(path, "lastName"), d.last_name.as_ref());
    let date_of_birth = c.birth_date(&at(path, "dateOfBirth"), d.date_of_birth.as_ref());
    let license_number = c
        .text(&at(path, "licenseNumber"), d.license_number.as_ref())
        .map(|n| n.to_uppercase());
    let license_state = c.state_code(&at(path, "licenseState"), d.license_state.as_ref());
    let relationship = c.choice(
        &at(path, "relationship"),
        d.relationship.as_ref(),
        DriverRelationship::ALL,
    );
    let years_licensed = c.optional_int(&at(path, "yearsLicensed"), d.years_licensed, 0..=80);
    Some(Driver {
        first_name: first_name?,
        last_name: last_name?,
        date_of_birth: date_of_birth?,
        license_number: license_number?,
        license_state: license_state?,
        relationship: relationship?,
        years_licensed,
    })
}

fn vehicle(c: &mut Collector, path: &str, d: &VehicleDraft) -> Option<Vehicle> {
    let year = c.int(&at(path, "year"), d.year, 1900..=this_year() + 2);
    let make = c.text(&at(path, "make"), d.make.as_ref());
    let model = c.text(&at(path, "model"), d.model.as_ref());
    let vin_path = at(path, "vin");
    let vin = c.text(&vin_path, d.vin.as_ref()).map(|v| v.to_uppercase());
    let vin = c.matching(&vin_path, vin, &VIN, "17 characters (no I, O or Q)");
    let usage = c.choice(&at(path, "usage"), d.usage.as_ref(), VehicleUsage::ALL);
    let ownership = c.choice(&at(path, "ownership"), d.ownership.as_ref(), VehicleOwnership::ALL);
    let annual_mileage = c.optional_int(&at(path, "annualMileage"), d.annual_mileage, 0..=200_000);
    Some(Vehicle {
        year: year?,
        make: make?,
        model: model?,
        vin: vin?,
        usage: usage?,
        ownership: ownership?,
        annual_mileage,
    })
}

fn incident(c: &mut Collector, path: &str, d: &IncidentDraft) -> Option<Incident> {
    let date = c.date(&at(path, "date"), d.date.as_ref());
    let kind = c.choice(&at(path, "kind"), d.kind.as_ref(), IncidentKind::ALL);
    let description = c.text(&at(path, "description"), d.description.as_ref());
    Some(Incident {
        date: date?,
        kind: kind?,
        description: description?,
        at_fault: d.at_fault,
    })
}

/// Validate every element; `None` if any element failed.
fn each<D, T>(
    c: &mut Collector,
    base: &str,
    items: &[D],
    mut f: impl FnMut(&mut Collector, &str, &D) -> Option<T>,
) -> Option<Vec<T>> {
    let results: Vec<Option<T>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| f(c, &format!("{base}[{i}]"), item))
        .collect();
    results.into_iter().collect()
}

fn auto(c: &mut Collector, d: &AutoDraft, mailing: Option<&Address>) -> Option<Auto> {
    let effective_date = c.date("auto.effectiveDate", d.effective_date.as_ref());

    let same_as_mailing = d.garaging_same_as_mailing.unwrap_or(false);
    let garaging_address = if same_as_mailing {
        // An invalid mailing address has already been reported.
        mailing.cloned()
    } else {
        match d.garaging_address.as_ref() {
            Some(a) => address(c, "auto.garagingAddress", a),
            None => {
                c.fail(
                    "auto.garagingAddress",
                    "is required unless garagingSameAsMailing is true",
                );
                None
            }
        }
    };

    let drivers = each(c, "auto.drivers", &d.drivers, driver);
    if d.drivers.is_empty() {
        c.fail("auto.drivers", "at least one driver is required");
    }
    let vehicles = each(c, "auto.vehicles", &d.vehicles, vehicle);
    if d.vehicles.is_empty() {
        c.fail("auto.vehicles", "at least one vehicle is required");
    }

    let coverage = c.required("auto.coverage", d.coverage.as_ref()).and_then(|cov| {
        let per_person = c.currency(
            "auto.coverage.bodilyInjuryPerPerson",
            cov.bodily_injury_per_person.as_ref(),
        );
        let per_accident = c.currency(
            "auto.coverage.bodilyInjuryPerAccident",
            cov.bodily_injury_per_accident.as_ref(),
        );
        let property_damage =
            c.currency("auto.coverage.propertyDamage", cov.property_damage.as_ref());
        let uninsured_motorist =
            c.optional_currency("auto.coverage.uninsuredMotorist", cov.uninsured_motorist.as_ref());
        let comprehensive_deductible = c.optional_currency(
            "auto.coverage.comprehensiveDeductible",
            cov.comprehensive_deductible.as_ref(),
        );
        let collision_deductible = c.optional_currency(
            "auto.coverage.collisionDeductible",
            cov.collision_deductible.as_ref(),
        );
        Some(AutoCoverage {
            bodily_injury_per_person: per_person?,
            bodily_injury_per_accident: per_accident?,
            property_damage: property_damage?,
            uninsured_motorist,
            comprehensive_deductible,
            collision_deductible,
        })
    });

    let prior = d
        .prior_insurance
        .as_ref()
        .and_then(|p| prior_insurance(c, "auto.priorInsurance", p));
    let incidents = each(c, "auto.incidents", &d.incidents, incident);

    Some(Auto {
        effective_date: effective_date?,
        garaging_address: garaging_address?,
        garaging_same_as_mailing: same_as_mailing,
        rideshare: d.rideshare.unwrap_or(false),
        delivery: d.delivery.unwrap_or(false),
        drivers: NonEmpty::from_vec(drivers?)?,
        vehicles: NonEmpty::from_vec(vehicles?)?,
        coverage: coverage?,
        prior_insurance: prior,
        incidents: incidents?,
    })
}
