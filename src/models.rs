//! Core domain types for the shift roster
//!
//! Workers, shifts and seats form a small closed world: seven staff members,
//! three daily shifts with two seats each. Everything else in the crate is built
//! on top of these types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::scheduler::error::{SchedulerError, SchedulerResult};

// ============================================================================
// Worker
// ============================================================================

/// One of the seven staff members
///
/// Six are regulars tied to a fixed shift; [`Worker::Alina`] floats and only
/// covers for whichever regular has the day off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Worker {
    Hugo,
    Moira,
    Brisa,
    Jere,
    Alina,
    Jony,
    Dianela,
}

impl Worker {
    /// The floating worker
    pub const FLOATER: Worker = Worker::Alina;

    /// All workers in roster order
    pub fn all() -> [Self; 7] {
        [
            Self::Hugo,
            Self::Moira,
            Self::Brisa,
            Self::Jere,
            Self::Alina,
            Self::Jony,
            Self::Dianela,
        ]
    }

    /// The six regulars, in rotation order
    pub fn regulars() -> [Self; 6] {
        [
            Self::Moira,
            Self::Brisa,
            Self::Jere,
            Self::Dianela,
            Self::Hugo,
            Self::Jony,
        ]
    }

    /// Display name, also used as the persisted token
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hugo => "Hugo",
            Self::Moira => "Moira",
            Self::Brisa => "Brisa",
            Self::Jere => "Jere",
            Self::Alina => "Alina",
            Self::Jony => "Jony",
            Self::Dianela => "Dianela",
        }
    }

    pub fn is_floater(&self) -> bool {
        *self == Self::FLOATER
    }

    /// The shift this worker is permanently assigned to (`None` for the floater)
    pub fn home_shift(&self) -> Option<ShiftKind> {
        ShiftKind::all()
            .into_iter()
            .find(|shift| shift.slot().holds_regular(*self))
    }

    /// Parse a worker name, case-insensitive
    pub fn from_name(name: &str) -> SchedulerResult<Self> {
        let needle = name.trim();
        Self::all()
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SchedulerError::invalid_worker(needle))
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Worker {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

// ============================================================================
// Shifts
// ============================================================================

/// The three daily shifts, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftKind {
    Morning,
    Afternoon,
    Night,
}

impl ShiftKind {
    /// All shifts in the fixed order every schedule is sorted by
    pub fn all() -> [Self; 3] {
        [Self::Morning, Self::Afternoon, Self::Night]
    }

    /// Position within a day (0 = morning)
    pub fn index(&self) -> usize {
        match self {
            Self::Morning => 0,
            Self::Afternoon => 1,
            Self::Night => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Morning),
            1 => Some(Self::Afternoon),
            2 => Some(Self::Night),
            _ => None,
        }
    }

    /// Stable identifier used in storage and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Night => "night",
        }
    }

    /// Spanish label used on the paper roster
    pub fn spanish_label(&self) -> &'static str {
        match self {
            Self::Morning => "Mañana",
            Self::Afternoon => "Tarde",
            Self::Night => "Noche",
        }
    }

    /// Parse from id or Spanish label
    pub fn from_id(id: &str) -> SchedulerResult<Self> {
        match id.trim().to_lowercase().as_str() {
            "morning" | "m" | "mañana" | "manana" => Ok(Self::Morning),
            "afternoon" | "a" | "tarde" => Ok(Self::Afternoon),
            "night" | "n" | "noche" => Ok(Self::Night),
            other => Err(SchedulerError::InvalidShift {
                name: other.to_string(),
            }),
        }
    }

    /// Static definition of this shift
    pub fn slot(&self) -> ShiftSlot {
        match self {
            Self::Morning => ShiftSlot {
                kind: *self,
                start_hour: 6,
                end_hour: 14,
                regulars: (Worker::Moira, Worker::Brisa),
            },
            Self::Afternoon => ShiftSlot {
                kind: *self,
                start_hour: 14,
                end_hour: 22,
                regulars: (Worker::Jere, Worker::Dianela),
            },
            Self::Night => ShiftSlot {
                kind: *self,
                start_hour: 22,
                end_hour: 6,
                regulars: (Worker::Hugo, Worker::Jony),
            },
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ShiftKind {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
    }
}

/// Immutable definition of a shift: hours and its two regular occupants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftSlot {
    pub kind: ShiftKind,
    /// Nominal start hour (local, 0-23)
    pub start_hour: u8,
    /// Nominal end hour; earlier than `start_hour` when the shift crosses midnight
    pub end_hour: u8,
    /// Regular occupants of seat A and seat B
    pub regulars: (Worker, Worker),
}

impl ShiftSlot {
    /// Whether the shift ends on the following calendar day
    pub fn ends_next_day(&self) -> bool {
        self.end_hour <= self.start_hour
    }

    /// Nominal length in hours
    pub fn hours(&self) -> u32 {
        (u32::from(self.end_hour) + 24 - u32::from(self.start_hour)) % 24
    }

    pub fn holds_regular(&self, worker: Worker) -> bool {
        self.regulars.0 == worker || self.regulars.1 == worker
    }

    /// Regular occupant of a seat
    pub fn regular(&self, seat: Seat) -> Worker {
        match seat {
            Seat::A => self.regulars.0,
            Seat::B => self.regulars.1,
        }
    }

    /// Human readable hours, e.g. `22:00–06:00 (+1)`
    pub fn hours_label(&self) -> String {
        let suffix = if self.ends_next_day() { " (+1)" } else { "" };
        format!("{:02}:00–{:02}:00{suffix}", self.start_hour, self.end_hour)
    }
}

// ============================================================================
// Seats and occupants
// ============================================================================

/// One of the two seats of a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    pub fn both() -> [Self; 2] {
        [Self::A, Self::B]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Seat {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            other => Err(SchedulerError::InvalidSeat {
                name: other.to_string(),
            }),
        }
    }
}

/// Whoever holds a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    Assigned(Worker),
    /// Nobody is available for the seat
    NeedsCoverage,
}

impl Occupant {
    /// Token written to storage for [`Occupant::NeedsCoverage`]
    pub const NEEDS_COVERAGE_TOKEN: &'static str = "NEEDS_COVERAGE";

    pub fn worker(&self) -> Option<Worker> {
        match self {
            Self::Assigned(worker) => Some(*worker),
            Self::NeedsCoverage => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    /// Persisted representation
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Assigned(worker) => worker.name(),
            Self::NeedsCoverage => Self::NEEDS_COVERAGE_TOKEN,
        }
    }

    /// Parse a persisted token or command line value
    pub fn from_token(token: &str) -> SchedulerResult<Self> {
        let trimmed = token.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "needs_coverage" | "needs-coverage" | "uncovered" | "-" => Ok(Self::NeedsCoverage),
            _ => Worker::from_name(trimmed)
                .map(Self::Assigned)
                .map_err(|_| SchedulerError::InvalidOccupant {
                    token: trimmed.to_string(),
                }),
        }
    }
}

impl From<Worker> for Occupant {
    fn from(worker: Worker) -> Self {
        Self::Assigned(worker)
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned(worker) => f.write_str(worker.name()),
            Self::NeedsCoverage => f.write_str("⚠ needs coverage"),
        }
    }
}

impl FromStr for Occupant {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

/// Occupants of both seats of one shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatPair {
    pub a: Occupant,
    pub b: Occupant,
}

impl SeatPair {
    pub fn new(a: impl Into<Occupant>, b: impl Into<Occupant>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn get(&self, seat: Seat) -> Occupant {
        match seat {
            Seat::A => self.a,
            Seat::B => self.b,
        }
    }

    pub fn set(&mut self, seat: Seat, occupant: Occupant) {
        match seat {
            Seat::A => self.a = occupant,
            Seat::B => self.b = occupant,
        }
    }

    /// Workers seated in this pair
    pub fn workers(&self) -> impl Iterator<Item = Worker> {
        [self.a.worker(), self.b.worker()].into_iter().flatten()
    }

    /// Same worker in both seats
    pub fn is_doubled(&self) -> bool {
        matches!((self.a, self.b), (Occupant::Assigned(a), Occupant::Assigned(b)) if a == b)
    }
}

// ============================================================================
// Schedule entries
// ============================================================================

/// One (date, shift) row of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub shift: ShiftKind,
    pub occupant_a: Occupant,
    pub occupant_b: Occupant,
    /// The worker whose day off it is
    pub free: Worker,
}

impl ScheduleEntry {
    pub fn key(&self) -> (NaiveDate, ShiftKind) {
        (self.date, self.shift)
    }

    pub fn seats(&self) -> SeatPair {
        SeatPair {
            a: self.occupant_a,
            b: self.occupant_b,
        }
    }

    pub fn seat(&self, seat: Seat) -> Occupant {
        self.seats().get(seat)
    }

    pub fn set_seats(&mut self, pair: SeatPair) {
        self.occupant_a = pair.a;
        self.occupant_b = pair.b;
    }

    pub fn slot(&self) -> ShiftSlot {
        self.shift.slot()
    }
}

/// Operator's final seat choices for all three shifts of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayChoices {
    pairs: [SeatPair; 3],
}

impl DayChoices {
    pub fn new(morning: SeatPair, afternoon: SeatPair, night: SeatPair) -> Self {
        Self {
            pairs: [morning, afternoon, night],
        }
    }

    /// Build from the three entries of a day (in shift order)
    pub fn from_entries(entries: &[ScheduleEntry]) -> Option<Self> {
        if entries.len() != 3 {
            return None;
        }
        let mut pairs = [entries[0].seats(); 3];
        for entry in entries {
            pairs[entry.shift.index()] = entry.seats();
        }
        Some(Self { pairs })
    }

    pub fn get(&self, shift: ShiftKind) -> SeatPair {
        self.pairs[shift.index()]
    }

    pub fn set(&mut self, shift: ShiftKind, pair: SeatPair) {
        self.pairs[shift.index()] = pair;
    }

    pub fn set_seat(&mut self, shift: ShiftKind, seat: Seat, occupant: Occupant) {
        self.pairs[shift.index()].set(seat, occupant);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShiftKind, SeatPair)> + '_ {
        ShiftKind::all().into_iter().map(|shift| (shift, self.get(shift)))
    }

    /// Everyone seated anywhere that day
    pub fn present_workers(&self) -> BTreeSet<Worker> {
        self.pairs.iter().flat_map(SeatPair::workers).collect()
    }
}

// ============================================================================
// Absence log
// ============================================================================

/// Reason code written for an operator-flagged absence
pub const ABSENCE_REASON: &str = "FALTA";

/// Logged absence of a worker from a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// Row id, `None` until persisted
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub shift: ShiftKind,
    pub seat: Seat,
    pub worker: Worker,
    pub reason: String,
    pub logged_at: NaiveDateTime,
}

impl AbsenceRecord {
    pub fn new(
        date: NaiveDate,
        shift: ShiftKind,
        seat: Seat,
        worker: Worker,
        logged_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            date,
            shift,
            seat,
            worker,
            reason: ABSENCE_REASON.to_string(),
            logged_at,
        }
    }
}
