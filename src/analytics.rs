// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Monthly registration report.
//!
//! Pure computation over user creation timestamps; the handler supplies the
//! timestamps and the current time.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of calendar months in the report.
pub const REPORT_MONTHS: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MonthlyRegistrations {
    /// Abbreviated month name ("Jan".."Dec")
    pub month: String,
    /// Users registered in the month
    pub users: u64,
    /// Percentage change from the previous month, one decimal
    pub growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserAnalytics {
    /// Oldest month first, ending with the current month
    pub monthly_registrations: Vec<MonthlyRegistrations>,
    pub total_users: u64,
    /// Users registered since the start of the current month
    pub current_month: u64,
    /// Growth of the current month
    pub growth_rate: f64,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn growth(users: u64, previous: Option<u64>) -> f64 {
    match previous {
        Some(prev) if prev > 0 => round1((users as f64 - prev as f64) * 100.0 / prev as f64),
        _ => 0.0,
    }
}

/// First day of the month `back` months before `(year, month)`.
fn months_back(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 - back as i32;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Build the report for `now` from every user's creation time.
pub fn user_analytics(created: &[DateTime<Utc>], now: DateTime<Utc>) -> UserAnalytics {
    let mut monthly = Vec::with_capacity(REPORT_MONTHS);
    let mut previous = None;

    for back in (0..REPORT_MONTHS as u32).rev() {
        let (year, month) = months_back(now.year(), now.month(), back);
        let users = created
            .iter()
            .filter(|at| at.year() == year && at.month() == month)
            .count() as u64;
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| d.format("%b").to_string())
            .unwrap_or_default();

        monthly.push(MonthlyRegistrations {
            month: label,
            users,
            growth: growth(users, previous),
        });
        previous = Some(users);
    }

    let month_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let current_month = created.iter().filter(|at| **at >= month_start).count() as u64;
    let growth_rate = monthly.last().map_or(0.0, |m| m.growth);

    UserAnalytics {
        monthly_registrations: monthly,
        total_users: created.len() as u64,
        current_month,
        growth_rate,
    }
}
