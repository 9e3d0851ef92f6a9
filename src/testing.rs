//! In-memory capability doubles shared by unit tests across modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{AuthError, Credentials, Identity, IdentityProvider};
use crate::db::{DatabaseError, RecordStore};
use crate::models::{ExtractionRecord, ExtractionStatus, NewExtraction};
use crate::pipeline::import::Clock;
use crate::storage::{validate_object_path, BlobError, BlobStore};

/// A PDF-signed byte buffer of exactly `len` bytes (at least the signature).
pub fn minimal_pdf(len: usize) -> Vec<u8> {
    let header = b"%PDF-1.4\n";
    let mut bytes = header.to_vec();
    bytes.resize(len.max(header.len()), b' ');
    bytes
}

pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Accepts any bearer token as one fixed user, or rejects everything.
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
        }
    }

    pub fn rejecting() -> Self {
        Self { user_id: None }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        if credentials.bearer_token.is_none() {
            return Err(AuthError::MissingCredentials);
        }
        match &self.user_id {
            Some(user_id) => Ok(Identity {
                user_id: user_id.clone(),
            }),
            None => Err(AuthError::InvalidCredentials),
        }
    }
}

/// Blob store that keeps objects in a map and counts calls.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    puts: AtomicUsize,
    removes: AtomicUsize,
    fail_puts: bool,
    fail_removes: bool,
    put_delay: Option<Duration>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    pub fn failing_removes(mut self) -> Self {
        self.fail_removes = true;
        self
    }

    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects.lock().unwrap().get(path).map(|(_, ct)| ct.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        overwrite: bool,
    ) -> Result<(), BlobError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        validate_object_path(path)?;
        if self.fail_puts {
            return Err(BlobError::Io(std::io::Error::other("injected put failure")));
        }
        let mut objects = self.objects.lock().unwrap();
        if !overwrite && objects.contains_key(path) {
            return Err(BlobError::AlreadyExists(path.to_string()));
        }
        objects.insert(path.to_string(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), BlobError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        if self.fail_removes {
            return Err(BlobError::Io(std::io::Error::other("injected remove failure")));
        }
        match self.objects.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound(path.to_string())),
        }
    }
}

/// Record store whose every call fails, optionally only after a delay.
#[derive(Default)]
pub struct FailingRecordStore {
    insert_delay: Option<Duration>,
}

impl FailingRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts hang for `delay` before failing.
    pub fn after(delay: Duration) -> Self {
        Self {
            insert_delay: Some(delay),
        }
    }
}

fn injected() -> DatabaseError {
    DatabaseError::TaskFailed("injected record failure".into())
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn insert_before(
        &self,
        _record: NewExtraction,
        _deadline: Instant,
    ) -> Result<ExtractionRecord, DatabaseError> {
        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }
        Err(injected())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<ExtractionRecord>, DatabaseError> {
        Err(injected())
    }

    async fn list_for_user(&self, _user_id: &str) -> Result<Vec<ExtractionRecord>, DatabaseError> {
        Err(injected())
    }

    async fn update_status(
        &self,
        _id: Uuid,
        _status: ExtractionStatus,
    ) -> Result<ExtractionRecord, DatabaseError> {
        Err(injected())
    }
}

/// Poll `condition` until it holds, failing the test after two seconds.
/// For effects that land on detached tasks.
pub async fn eventually(condition: impl Fn() -> bool) {
    let give_up = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < give_up, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Payload fixtures
// ═══════════════════════════════════════════════════════════════════════════

pub fn home_section() -> Value {
    json!({
        "property": {
            "dwellingType": "single_family",
            "yearBuilt": 1998,
            "squareFeet": 2400,
            "stories": 2,
            "constructionType": "frame",
            "roofType": "asphalt shingle",
            "roofYear": 2015
        },
        "occupancy": "primary",
        "safety": { "smokeDetectors": true, "deadbolts": true },
        "coverage": {
            "dwelling": "$450,000",
            "personalProperty": "$225,000",
            "liability": "$300,000",
            "medicalPayments": "$5,000",
            "deductible": "$1,000"
        },
        "scheduledItems": {
            "jewelry": "$12,500",
            "otherValuables": [{ "description": "Watch collection", "value": "$8,000" }]
        },
        "priorInsurance": { "carrier": "Acme Mutual", "yearsWithCarrier": 6 },
        "claimsLastFiveYears": 0,
        "lienholder": { "name": "First Bank", "loanNumber": "LN-4471" }
    })
}

pub fn auto_section() -> Value {
    json!({
        "effectiveDate": "2024-01-15",
        "garagingSameAsMailing": true,
        "rideshare": false,
        "delivery": false,
        "drivers": [{
            "firstName": "Jane",
            "lastName": "Doe",
            "dateOfBirth": "1985-04-12",
            "licenseNumber": "d1234567",
            "licenseState": "tx",
            "relationship": "self",
            "yearsLicensed": 20
        }],
        "vehicles": [{
            "year": 2020,
            "make": "Toyota",
            "model": "Camry",
            "vin": "4t1b11hk5lu123456",
            "usage": "commute",
            "ownership": "financed",
            "annualMileage": 12000
        }],
        "coverage": {
            "bodilyInjuryPerPerson": "$100,000",
            "bodilyInjuryPerAccident": "$300,000",
            "propertyDamage": "$100,000",
            "collisionDeductible": "$500"
        },
        "incidents": []
    })
}

/// A complete payload whose sections match `quote_type`.
pub fn payload_json(quote_type: &str, extraction_id: Uuid, user_id: &str) -> Value {
    let mut payload = json!({
        "metadata": {
            "quoteId": "Q-1001",
            "extractionId": extraction_id.to_string(),
            "userId": user_id,
            "filename": "My Quote (final).pdf",
            "submittedAt": "2023-11-14T22:13:20Z",
            "quoteType": quote_type,
            "version": "1.0"
        },
        "personal": {
            "firstName": "Jane",
            "lastName": "Doe",
            "dateOfBirth": "1985-04-12",
            "phone": "(512) 555-0142",
            "email": "Jane.Doe@example.com",
            "maritalStatus": "married",
            "ssn": "123456789",
            "spouse": { "firstName": "John", "lastName": "Doe", "dateOfBirth": "1984-09-30" },
            "address": {
                "street": "100 Congress Ave",
                "city": "Austin",
                "state": "TX",
                "zip": "78701"
            },
            "yearsAtAddress": 4
        }
    });
    if quote_type == "home" || quote_type == "both" {
        payload["home"] = home_section();
    }
    if quote_type == "auto" || quote_type == "both" {
        payload["auto"] = auto_section();
    }
    payload
}

// ═══════════════════════════════════════════════════════════════════════════
// Mock RPA receiver
// ═══════════════════════════════════════════════════════════════════════════

/// Requests seen by a mock receiver: `(authorization header, JSON body)`.
#[derive(Clone, Default)]
pub struct Received {
    calls: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Received {
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call(&self, index: usize) -> (Option<String>, Value) {
        self.calls.lock().unwrap()[index].clone()
    }
}

async fn receive(
    State((received, status, reply)): State<(Received, StatusCode, &'static str)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    received.calls.lock().unwrap().push((auth, body));
    (status, [("content-type", "application/json")], reply)
}

/// Spawn a receiver on an ephemeral port that answers every POST the same
/// way. Returns its URL and the log of received requests.
pub async fn spawn_receiver(status: StatusCode, reply: &'static str) -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/hook", post(receive))
        .with_state((received.clone(), status, reply));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/hook"), received)
}
