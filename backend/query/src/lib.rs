//! # Record Query
//!
//! Search, filter and sort over a snapshot of cautela records.
//!
//! The admin list and the signature history both render a view derived from
//! whatever the backend returned last. That view is recomputed from scratch
//! on every keystroke, so everything here is synchronous and allocation-light.
//!
//!
//!
//! ## Pipeline
//!
//! 1. Normalize the search text and every searchable field (lowercase, strip
//!    accents, trim).
//! 2. Keep records where the needle is a substring of any searchable field.
//! 3. Keep records whose status matches the status filter.
//! 4. Keep records whose type matches the type filter.
//! 5. Stable sort by the chosen key.
//!
//! The output borrows from the input snapshot. Records are never copied,
//! merged or mutated.
//!
//!
//!
//! ## Malformed Records
//!
//! Nothing in this crate fails on bad data:
//! - missing or null text is treated as `""`
//! - unparseable timestamps are epoch zero
//! - unknown status/type spellings never match a specific filter
//!
//!
//!
//! ## Example
//!
//! ```
//! use query::{Filter, Loan, LoanQuery, SortKey, run};
//!
//! let loans: Vec<Loan> = serde_json::from_str(r#"[
//!     {"id": 1, "material": "Notebook", "status": "pendente", "data_criacao": 100},
//!     {"id": 2, "material": "Notebook Dell", "status": "cautelado", "data_criacao": 200}
//! ]"#).unwrap();
//!
//! let query = LoanQuery::default()
//!     .with_search("notebook")
//!     .with_status(Filter::All)
//!     .with_sort(SortKey::NewestFirst);
//!
//! let shown = run(&loans, &query);
//! assert_eq!(shown[0].material(), "Notebook Dell");
//! ```

pub mod collate;
pub mod error;
pub mod filter;
pub mod lenient;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod time;

pub use error::QueryError;
pub use filter::{Filter, HistoryQuery, LoanQuery, RecordQuery, SortKey};
pub use pipeline::{QueryView, Queryable, run, view};
pub use records::{
    History, Loan, LoanStatus, MaterialCategory, NoKind, RecordId, SignatureEvent, SignatureKind,
};
