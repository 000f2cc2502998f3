use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::types::{Prepayment, PrepaymentMode, RateChange};

/// scheduled event that alters a running amortization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEvent {
    RateChange(RateChange),
    Prepayment(Prepayment),
}

impl ScheduleEvent {
    pub fn date(&self) -> NaiveDate {
        match self {
            ScheduleEvent::RateChange(change) => change.effective_date,
            ScheduleEvent::Prepayment(prepayment) => prepayment.date,
        }
    }

    /// position within a single date: rates resolve before principal reductions
    fn sequence(&self) -> u8 {
        match self {
            ScheduleEvent::RateChange(_) => 0,
            ScheduleEvent::Prepayment(_) => 1,
        }
    }
}

impl Ord for ScheduleEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date()
            .cmp(&other.date())
            .then_with(|| self.sequence().cmp(&other.sequence()))
            .then_with(|| match (self, other) {
                (ScheduleEvent::RateChange(a), ScheduleEvent::RateChange(b)) => a.cmp(b),
                (ScheduleEvent::Prepayment(a), ScheduleEvent::Prepayment(b)) => a.cmp(b),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for ScheduleEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// what the timeline says about one period
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodEvents<'a> {
    /// annual rate in force for this period's interest
    pub annual_rate: Rate,
    pub prepayments: Vec<&'a Prepayment>,
}

impl PeriodEvents<'_> {
    /// total extra principal offered this period, in whole cents
    pub fn extra_principal(&self) -> Money {
        self.prepayments
            .iter()
            .map(|p| p.amount.round_cents())
            .sum()
    }

    pub fn reduces_emi(&self) -> bool {
        self.prepayments
            .iter()
            .any(|p| p.mode == PrepaymentMode::ReduceEmi)
    }
}

/// date-ordered prepayments and rate changes for one schedule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTimeline {
    events: Vec<ScheduleEvent>,
}

impl EventTimeline {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// validate and order the caller's prepayments and rate changes
    pub fn from_inputs(prepayments: &[Prepayment], rate_changes: &[RateChange]) -> Result<Self> {
        let mut timeline = Self::new();
        for change in rate_changes {
            change.validate()?;
            timeline.push(ScheduleEvent::RateChange(*change));
        }
        for prepayment in prepayments {
            prepayment.validate()?;
            timeline.push(ScheduleEvent::Prepayment(prepayment.clone()));
        }
        Ok(timeline)
    }

    /// insert keeping total order
    pub fn push(&mut self, event: ScheduleEvent) {
        let index = self.events.partition_point(|e| e <= &event);
        self.events.insert(index, event);
    }

    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// latest rate change effective on or before `date`, else `base_rate`
    pub fn active_rate(&self, date: NaiveDate, base_rate: Rate) -> Rate {
        self.events
            .iter()
            .take_while(|e| e.date() <= date)
            .filter_map(|e| match e {
                ScheduleEvent::RateChange(change) => Some(change.annual_rate),
                ScheduleEvent::Prepayment(_) => None,
            })
            .last()
            .unwrap_or(base_rate)
    }

    /// resolve the period dated `period_date`: rate first, then that month's prepayments
    pub fn resolve(&self, period_date: NaiveDate, base_rate: Rate) -> PeriodEvents<'_> {
        let prepayments = self
            .events
            .iter()
            .filter_map(|e| match e {
                ScheduleEvent::Prepayment(p) if p.applies_in(period_date) => Some(p),
                _ => None,
            })
            .collect();

        PeriodEvents {
            annual_rate: self.active_rate(period_date, base_rate),
            prepayments,
        }
    }
}
