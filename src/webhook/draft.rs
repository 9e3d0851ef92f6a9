//! Loose wire shape of a payload as produced by extraction or review.
//!
//! Every field is optional so a half-filled document still deserializes;
//! `validation::validate` then reports every gap in one pass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadDraft {
    pub metadata: Option<MetadataDraft>,
    pub personal: Option<PersonalDraft>,
    pub home: Option<HomeDraft>,
    pub auto: Option<AutoDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDraft {
    pub quote_id: Option<String>,
    pub extraction_id: Option<String>,
    pub user_id: Option<String>,
    pub filename: Option<String>,
    pub submitted_at: Option<String>,
    pub quote_type: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub street: Option<String>,
    pub unit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub marital_status: Option<String>,
    pub ssn: Option<String>,
    pub occupation: Option<String>,
    pub spouse: Option<SpouseDraft>,
    pub address: Option<AddressDraft>,
    pub prior_address: Option<AddressDraft>,
    pub years_at_address: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub dwelling_type: Option<String>,
    pub year_built: Option<i64>,
    pub square_feet: Option<i64>,
    pub stories: Option<i64>,
    pub construction_type: Option<String>,
    pub roof_type: Option<String>,
    pub roof_year: Option<i64>,
}

/// Missing flags read as `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDraft {
    pub smoke_detectors: Option<bool>,
    pub fire_extinguisher: Option<bool>,
    pub deadbolts: Option<bool>,
    pub burglar_alarm: Option<bool>,
    pub fire_alarm: Option<bool>,
    pub sprinklers: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeCoverageDraft {
    pub dwelling: Option<String>,
    pub personal_property: Option<String>,
    pub liability: Option<String>,
    pub medical_payments: Option<String>,
    pub deductible: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledValuableDraft {
    pub description: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItemsDraft {
    pub jewelry: Option<String>,
    #[serde(default)]
    pub other_valuables: Vec<ScheduledValuableDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorInsuranceDraft {
    pub carrier: Option<String>,
    pub years_with_carrier: Option<i64>,
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LienholderDraft {
    pub name: Option<String>,
    pub address: Option<AddressDraft>,
    pub loan_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeDraft {
    pub property: Option<PropertyDraft>,
    pub occupancy: Option<String>,
    pub safety: Option<SafetyDraft>,
    pub coverage: Option<HomeCoverageDraft>,
    pub scheduled_items: Option<ScheduledItemsDraft>,
    pub prior_insurance: Option<PriorInsuranceDraft>,
    pub claims_last_five_years: Option<i64>,
    pub lienholder: Option<LienholderDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    pub relationship: Option<String>,
    pub years_licensed: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDraft {
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub vin: Option<String>,
    pub usage: Option<String>,
    pub ownership: Option<String>,
    pub annual_mileage: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoCoverageDraft {
    pub bodily_injury_per_person: Option<String>,
    pub bodily_injury_per_accident: Option<String>,
    pub property_damage: Option<String>,
    pub uninsured_motorist: Option<String>,
    pub comprehensive_deductible: Option<String>,
    pub collision_deductible: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDraft {
    pub date: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub at_fault: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDraft {
    pub effective_date: Option<String>,
    pub garaging_address: Option<AddressDraft>,
    pub garaging_same_as_mailing: Option<bool>,
    pub rideshare: Option<bool>,
    pub delivery: Option<bool>,
    #[serde(default)]
    pub drivers: Vec<DriverDraft>,
    #[serde(default)]
    pub vehicles: Vec<VehicleDraft>,
    pub coverage: Option<AutoCoverageDraft>,
    pub prior_insurance: Option<PriorInsuranceDraft>,
    #[serde(default)]
    pub incidents: Vec<IncidentDraft>,
}
