use chrono::NaiveDate;
use thiserror::Error;

/// Which date rule a requested stay violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// Check-in lies before the current date.
    CheckInInPast,
    /// Check-out lies before check-in.
    CheckOutBeforeCheckIn,
    /// Check-out equals check-in (zero nights).
    CheckOutEqualsCheckIn,
}

impl DateRule {
    pub fn message(&self) -> &'static str {
        match self {
            Self::CheckInInPast => "check-in date cannot be before the current date",
            Self::CheckOutBeforeCheckIn => "check-out date cannot be before the check-in date",
            Self::CheckOutEqualsCheckIn => "check-out date cannot be equal to the check-in date",
        }
    }
}

impl std::fmt::Display for DateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid date range: {0}")]
    InvalidDateRange(DateRule),

    #[error("Room {room_id} is not available from {check_in} to {check_out}")]
    RoomUnavailable {
        room_id: i32,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Booking {reference} is already paid")]
    AlreadyPaid { reference: String },

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Could not generate a unique booking reference after {attempts} attempts")]
    ReferenceGenerationExhausted { attempts: u32 },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {message}")]
    Storage { message: String, transient: bool },
}

impl DomainError {
    /// Stable, machine-readable error kind reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            Self::RoomUnavailable { .. } => "ROOM_UNAVAILABLE",
            Self::AlreadyPaid { .. } => "ALREADY_PAID",
            Self::PaymentProvider(_) => "PAYMENT_PROVIDER_ERROR",
            Self::ReferenceGenerationExhausted { .. } => "REFERENCE_GENERATION_EXHAUSTED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Whether this error is likely transient (e.g. SQLite busy, pool exhausted)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { transient: true, .. })
    }

    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(err: sea_orm::DbErr) -> Self {
        let transient = match &err {
            sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => true,
            other => {
                let text = other.to_string().to_lowercase();
                text.contains("database is locked") || text.contains("busy")
            }
        };
        Self::Storage {
            message: err.to_string(),
            transient,
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
