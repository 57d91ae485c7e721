use serde::Deserialize;

/// Sex as encoded in the INSEE registry (`sexe` column: 1 = male, 2 = female).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

/// One raw registry row: usage count of a name for a year, sex and department.
#[derive(Debug, Clone)]
pub struct Record {
    pub year: i32,
    pub name: String,
    pub sex: Sex,
    pub department: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    pub year: i32,
    pub count: u64,
}

/// A name's yearly usage counts over a selected range: contiguous, strictly
/// ordered by year, zero-filled for years with no matching record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn max_count(&self) -> u64 {
        self.points.iter().map(|p| p.count).max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.count).sum()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A detected local-maximum year in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurgeEvent {
    pub year: i32,
    pub count: u64,
}

/// Everything known about one surging name: its peaks and the full series
/// they were detected in.
#[derive(Debug, Clone)]
pub struct PopularityProfile {
    pub name: String,
    pub events: Vec<SurgeEvent>,
    pub series: Series,
}

/// One external fact or event snippet returned by the correlation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationResult {
    pub headline: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextEvent {
    pub year: i32,
    pub label: String,
}

/// Curated background for a name, supplied externally as a JSON table.
#[derive(Debug, Clone, Deserialize)]
pub struct NameContext {
    pub summary: String,
    pub events: Vec<ContextEvent>,
}
