//! Validity-window alerting for registration records.
//!
//! A registration's alert state is always derived from its validity date and
//! the reference day. It is never stored.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days ahead of `today` that still counts as "expiring soon".
pub const EXPIRY_WINDOW_DAYS: i64 = 7;

/// Derived classification of a registration relative to a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    #[serde(rename = "Overdue")]
    Overdue,
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    #[serde(rename = "Valid")]
    Valid,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Overdue => "Overdue",
            AlertStatus::ExpiringSoon => "Expiring Soon",
            AlertStatus::Valid => "Valid",
        }
    }

    /// Whether records in this state show up in the alert listing
    pub fn is_alerting(&self) -> bool {
        !matches!(self, AlertStatus::Valid)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub status: AlertStatus,
    /// Signed day count from `today` to the validity date; negative once overdue.
    pub days_until_expiry: i64,
}

/// Last validity date that still falls inside the alert window for `today`.
pub fn alert_horizon(today: NaiveDate) -> NaiveDate {
    today + Duration::days(EXPIRY_WINDOW_DAYS)
}

/// Classify a validity date against `today`. Total over all inputs.
pub fn classify(validity_date: NaiveDate, today: NaiveDate) -> Alert {
    let status = if validity_date < today {
        AlertStatus::Overdue
    } else if validity_date <= alert_horizon(today) {
        AlertStatus::ExpiringSoon
    } else {
        AlertStatus::Valid
    };

    Alert {
        status,
        days_until_expiry: (validity_date - today).num_days(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn window_boundaries() {
        let today = day(2025, 3, 10);

        assert_eq!(classify(day(2025, 3, 9), today).status, AlertStatus::Overdue);
        assert_eq!(classify(today, today).status, AlertStatus::ExpiringSoon);
        assert_eq!(classify(day(2025, 3, 17), today).status, AlertStatus::ExpiringSoon);
        assert_eq!(classify(day(2025, 3, 18), today).status, AlertStatus::Valid);
    }

    #[test]
    fn days_until_expiry_is_signed_difference() {
        let today = day(2025, 3, 10);

        assert_eq!(classify(day(2025, 3, 9), today).days_until_expiry, -1);
        assert_eq!(classify(day(2025, 3, 13), today).days_until_expiry, 3);
        assert_eq!(classify(day(2024, 3, 10), today).days_until_expiry, -365);
        assert_eq!(classify(today, today).days_until_expiry, 0);
    }

    #[test]
    fn exactly_one_state_holds_across_a_range() {
        let today = day(2024, 2, 27); // crosses a leap day
        for offset in -40..=40 {
            let validity = today + Duration::days(offset);
            let alert = classify(validity, today);

            let overdue = validity < today;
            let expiring = today <= validity && validity <= today + Duration::days(7);
            let valid = validity > today + Duration::days(7);
            assert_eq!(
                [overdue, expiring, valid].iter().filter(|b| **b).count(),
                1,
                "offset {offset}"
            );

            let expected = if overdue {
                AlertStatus::Overdue
            } else if expiring {
                AlertStatus::ExpiringSoon
            } else {
                AlertStatus::Valid
            };
            assert_eq!(alert.status, expected, "offset {offset}");
            assert_eq!(alert.days_until_expiry, offset);
        }
    }

    #[test]
    fn horizon_is_seven_days_out() {
        assert_eq!(alert_horizon(day(2025, 12, 28)), day(2026, 1, 4));
    }

    #[test]
    fn status_serializes_with_display_labels() {
        assert_eq!(
            serde_json::to_value(AlertStatus::ExpiringSoon).unwrap(),
            serde_json::json!("Expiring Soon")
        );
        assert_eq!(AlertStatus::Overdue.to_string(), "Overdue");
        assert!(!AlertStatus::Valid.is_alerting());
    }
}
