//! Service request state machine and the pure rules around it: which status
//! moves are legal, how a quote is priced and how ratings aggregate.
//!
//! ```text
//! pending     -> accepted | rejected | cancelled
//! accepted    -> in-progress | completed | cancelled
//! in-progress -> completed | cancelled
//! ```
//!
//! `rejected`, `completed` and `cancelled` are terminal.

use std::{fmt, str::FromStr};

use crate::{entity::types::RequestStatus, error::AppError};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

impl RequestStatus {
    pub const ALL: [RequestStatus; 6] = [
        RequestStatus::Pending,
        RequestStatus::Accepted,
        RequestStatus::Rejected,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Rejected | RequestStatus::Completed | RequestStatus::Cancelled
        )
    }

    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted | Rejected | Cancelled)
                | (Accepted, InProgress | Completed | Cancelled)
                | (InProgress, Completed | Cancelled)
        )
    }

    pub fn is_provider_update(self) -> bool {
        matches!(
            self,
            RequestStatus::Accepted
                | RequestStatus::Rejected
                | RequestStatus::InProgress
                | RequestStatus::Cancelled
        )
    }

    pub fn completable() -> [RequestStatus; 2] {
        [RequestStatus::Accepted, RequestStatus::InProgress]
    }

    pub fn occupies_provider(self) -> bool {
        matches!(self, RequestStatus::Accepted | RequestStatus::InProgress)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {s}")))
    }
}

pub fn ensure_transition(current: RequestStatus, next: RequestStatus) -> Result<(), AppError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Cannot change request status from {current} to {next}"
        )))
    }
}

pub fn quote_total_price(estimated_hours: f64, hourly_rate: f64) -> Result<f64, AppError> {
    if !estimated_hours.is_finite() || estimated_hours <= 0.0 {
        return Err(AppError::BadRequest(
            "estimatedHours must be a positive number".into(),
        ));
    }
    let total = estimated_hours * hourly_rate;
    if !total.is_finite() {
        return Err(AppError::BadRequest("estimatedHours is too large".into()));
    }
    Ok(total)
}

pub fn validate_rating(rating: i32) -> Result<(), AppError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    sum as f64 / ratings.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestStatus::*;

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Rejected, Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in RequestStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Accepted.can_transition_to(InProgress));
        assert!(Accepted.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn backward_and_skipping_transitions_are_rejected() {
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Pending));
        assert!(ensure_transition(Completed, Pending).is_err());
    }

    #[test]
    fn completion_is_not_a_generic_status_update() {
        assert!(!Completed.is_provider_update());
        assert!(!Pending.is_provider_update());
        assert!(InProgress.is_provider_update());
    }

    #[test]
    fn status_names_round_trip_through_from_str() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert!("in_progress".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn price_is_hours_times_rate() {
        assert_eq!(quote_total_price(3.0, 200.0).unwrap(), 600.0);
        assert_eq!(quote_total_price(1.5, 250.0).unwrap(), 375.0);
        assert!(quote_total_price(0.0, 200.0).is_err());
        assert!(quote_total_price(-2.0, 200.0).is_err());
        assert!(quote_total_price(f64::NAN, 200.0).is_err());
    }

    #[test]
    fn overflowing_price_is_rejected() {
        let err = quote_total_price(f64::MAX, 200.0).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn average_of_ratings() {
        assert_eq!(average_rating(&[5, 3, 4]), 4.0);
        assert_eq!(average_rating(&[5]), 5.0);
        assert_eq!(average_rating(&[]), 0.0);
    }
}
