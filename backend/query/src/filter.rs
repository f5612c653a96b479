use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::records::{LoanStatus, MaterialCategory, NoKind, SignatureKind};

pub const ALL: &str = "todos";

/// `todos`, or one exact enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn admits(&self, value: Option<T>) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => value.as_ref() == Some(wanted),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }
}

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    /// Blank, `todos` and `all` mean no filtering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | ALL | "all" => Ok(Filter::All),
            value => value.parse().map(Filter::Only),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str(ALL),
            Filter::Only(value) => value.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "recente", alias = "newest")]
    NewestFirst,
    #[serde(rename = "antiga", alias = "oldest")]
    OldestFirst,
    #[serde(rename = "material", alias = "name")]
    NameAscending,
    #[serde(rename = "responsavel", alias = "responsible")]
    ResponsibleAscending,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::NewestFirst,
        SortKey::OldestFirst,
        SortKey::NameAscending,
        SortKey::ResponsibleAscending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::NewestFirst => "recente",
            SortKey::OldestFirst => "antiga",
            SortKey::NameAscending => "material",
            SortKey::ResponsibleAscending => "responsavel",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            SortKey::NewestFirst => "newest",
            SortKey::OldestFirst => "oldest",
            SortKey::NameAscending => "name",
            SortKey::ResponsibleAscending => "responsible",
        }
    }
}

impl FromStr for SortKey {
    type Err = crate::QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s || key.alias() == s)
            .ok_or_else(|| crate::QueryError::unknown("ordenacao", s))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the list controls hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery<S, K> {
    pub search: String,
    pub status: Filter<S>,
    pub kind: Filter<K>,
    pub sort: SortKey,
}

pub type LoanQuery = RecordQuery<LoanStatus, MaterialCategory>;

/// Signatures filter on event kind through the status axis and have no type axis.
pub type HistoryQuery = RecordQuery<SignatureKind, NoKind>;

impl<S, K> Default for RecordQuery<S, K> {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: Filter::All,
            kind: Filter::All,
            sort: SortKey::default(),
        }
    }
}

impl<S, K> RecordQuery<S, K> {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_status(mut self, status: Filter<S>) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: Filter<K>) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// True when the view may hide records, i.e. "showing X of Y" applies.
    pub fn is_filtering(&self) -> bool {
        !self.search.trim().is_empty()
            || matches!(self.status, Filter::Only(_))
            || matches!(self.kind, Filter::Only(_))
    }

    /// Resets search and filters. The sort key is kept.
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.status = Filter::All;
        self.kind = Filter::All;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!("todos".parse::<Filter<LoanStatus>>(), Ok(Filter::All));
        assert_eq!("".parse::<Filter<LoanStatus>>(), Ok(Filter::All));
        assert_eq!(
            "cautelado".parse::<Filter<LoanStatus>>(),
            Ok(Filter::Only(LoanStatus::CheckedOut))
        );
        assert!("Cautelado".parse::<Filter<LoanStatus>>().is_err());
        assert!("x".parse::<Filter<NoKind>>().is_err());
        assert_eq!("all".parse::<Filter<NoKind>>(), Ok(Filter::All));
    }

    #[test]
    fn test_filter_admits() {
        let only = Filter::Only(MaterialCategory::Durable);

        assert!(only.admits(Some(MaterialCategory::Durable)));
        assert!(!only.admits(Some(MaterialCategory::Consumable)));
        assert!(!only.admits(None));
        assert!(Filter::<MaterialCategory>::All.admits(None));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("recente".parse::<SortKey>(), Ok(SortKey::NewestFirst));
        assert_eq!("oldest".parse::<SortKey>(), Ok(SortKey::OldestFirst));
        assert_eq!(
            "responsavel".parse::<SortKey>(),
            Ok(SortKey::ResponsibleAscending)
        );
        assert!("alfabetica".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_key_serde() {
        assert_eq!(serde_json::to_string(&SortKey::NameAscending).unwrap(), "\"material\"");
        assert_eq!(
            serde_json::from_str::<SortKey>("\"newest\"").unwrap(),
            SortKey::NewestFirst
        );
    }

    #[test]
    fn test_is_filtering() {
        let query = LoanQuery::default();
        assert!(!query.is_filtering());

        assert!(!query.clone().with_search("   ").is_filtering());
        assert!(query.clone().with_search("dell").is_filtering());
        assert!(
            query
                .clone()
                .with_kind(Filter::Only(MaterialCategory::Consumable))
                .is_filtering()
        );
        assert!(!query.with_sort(SortKey::OldestFirst).is_filtering());
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut query = LoanQuery::default()
            .with_search("radio")
            .with_status(Filter::Only(LoanStatus::Pending))
            .with_kind(Filter::Only(MaterialCategory::Durable))
            .with_sort(SortKey::ResponsibleAscending);

        query.clear_filters();

        assert_eq!(query, LoanQuery::default().with_sort(SortKey::ResponsibleAscending));
    }
}
