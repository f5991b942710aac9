// src/services/appointments.rs
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{OpenOptions, read_to_string};
use tokio::io::AsyncWriteExt;

pub const TIME_SLOTS: [&str; 13] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "14:00", "14:30", "15:00", "15:30",
    "16:00", "16:30", "17:00",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegalService {
    Consultation,
    Civil,
    Commercial,
    Criminal,
    Family,
    Labor,
    Administrative,
    RealEstate,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub service: LegalService,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: AppointmentRequest,
}

/// Field name -> problem, for every field that failed.
pub fn validate(req: &AppointmentRequest) -> Vec<(&'static str, &'static str)> {
    validate_as_of(req, Utc::now().date_naive())
}

/// [`validate`] against an explicit current date.
pub fn validate_as_of(req: &AppointmentRequest, today: NaiveDate) -> Vec<(&'static str, &'static str)> {
    let mut errors = Vec::new();

    if req.name.trim().is_empty() {
        errors.push(("name", "required"));
    }

    let email = req.email.trim();
    if email.is_empty() {
        errors.push(("email", "required"));
    } else if !looks_like_email(email) {
        errors.push(("email", "invalid"));
    }

    let phone = req.phone.trim();
    if phone.is_empty() {
        errors.push(("phone", "required"));
    } else if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        errors.push(("phone", "invalid"));
    }

    if req.date < today {
        errors.push(("date", "in the past"));
    }

    if !TIME_SLOTS.contains(&req.time.as_str()) {
        errors.push(("time", "not an available slot"));
    }

    errors
}

// Something, an @, something, a dot, something.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Append-only JSON-lines log of booking requests.
#[derive(Debug, Clone)]
pub struct AppointmentLog {
    path: PathBuf,
}

impl AppointmentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn record(&self, request: AppointmentRequest) -> std::io::Result<Appointment> {
        let appointment = Appointment {
            id: uuid::Uuid::new_v4().to_string(),
            received_at: Utc::now(),
            request,
        };
        let line = serde_json::to_string(&appointment)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(appointment)
    }

    pub async fn list(&self) -> Vec<Appointment> {
        let content = read_to_string(&self.path).await.unwrap_or_default();
        content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}
