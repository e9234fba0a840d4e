use std::collections::BTreeMap;

use chrono::NaiveDate;

/// First and last fiscal years with configured windows.
pub const FIRST_KNOWN_FY: u16 = 2021;
pub const LAST_KNOWN_FY: u16 = 2026;

/// Inclusive date bounds of one federal fiscal year: October 1 of the prior
/// calendar year through September 30 of the named year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The hardcoded table of known fiscal-year windows, built once at startup
/// and passed around explicitly.
#[derive(Debug, Clone)]
pub struct FiscalCalendar {
    windows: BTreeMap<u16, FiscalWindow>,
}

impl Default for FiscalCalendar {
    fn default() -> Self {
        let mut windows = BTreeMap::new();
        for year in FIRST_KNOWN_FY..=LAST_KNOWN_FY {
            let start = NaiveDate::from_ymd_opt(i32::from(year) - 1, 10, 1)
                .expect("fiscal window start date");
            let end =
                NaiveDate::from_ymd_opt(i32::from(year), 9, 30).expect("fiscal window end date");
            windows.insert(year, FiscalWindow { start, end });
        }
        Self { windows }
    }
}

impl FiscalCalendar {
    pub fn window(&self, year: u16) -> Option<FiscalWindow> {
        self.windows.get(&year).copied()
    }

    pub fn contains(&self, year: u16) -> bool {
        self.windows.contains_key(&year)
    }

    /// Most recent configured fiscal year.
    pub fn latest(&self) -> u16 {
        // The table is never empty: Default always inserts the known range.
        *self
            .windows
            .keys()
            .next_back()
            .expect("fiscal calendar is never empty")
    }

    pub fn years_descending(&self) -> Vec<u16> {
        self.windows.keys().rev().copied().collect()
    }

    /// Applies the CLI selection rules to raw year tokens.
    ///
    /// No tokens selects only the latest year; an `all` token selects every
    /// configured year, newest first; numeric tokens select the recognized
    /// ones in the order given (unrecognized ones are dropped silently). An
    /// empty return means nothing usable was asked for; the caller prints
    /// usage and does no I/O.
    pub fn select_years(&self, args: &[String]) -> Vec<u16> {
        if args.is_empty() {
            return vec![self.latest()];
        }

        if args.iter().any(|a| a == "all") {
            return self.years_descending();
        }

        args.iter()
            .filter_map(|a| a.parse::<u16>().ok())
            .filter(|year| self.contains(*year))
            .collect()
    }
}
