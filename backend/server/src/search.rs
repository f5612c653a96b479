//! # Search
//!
//! Query-string side of the record pipeline.
//!
//! The list and history endpoints take the same controls the admin screen
//! has:
//! - `busca`: free text, accent and case insensitive
//! - `status`: `todos` or an exact status (event kind for history)
//! - `tipo`: `todos` or an exact material category (loans only)
//! - `ordenacao`: `recente`, `antiga`, `material` or `responsavel`
//!
//! Unknown filter or sort values are a `400`, never an empty list.
use std::str::FromStr;

use query::{Filter, History, Loan, QueryError, RecordQuery, SignatureEvent, SortKey, view};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub busca: String,
    pub status: Option<String>,
    pub tipo: Option<String>,
    pub ordenacao: Option<String>,
}

fn filter<T: FromStr<Err = QueryError>>(raw: Option<&str>) -> Result<Filter<T>, QueryError> {
    raw.map_or(Ok(Filter::All), str::parse)
}

impl SearchParams {
    pub fn to_query<S, K>(&self, default_sort: SortKey) -> Result<RecordQuery<S, K>, QueryError>
    where
        S: FromStr<Err = QueryError>,
        K: FromStr<Err = QueryError>,
    {
        let sort = match self.ordenacao.as_deref().map(str::trim) {
            None | Some("") => default_sort,
            Some(raw) => raw.parse()?,
        };

        Ok(RecordQuery::default()
            .with_search(self.busca.clone())
            .with_status(filter(self.status.as_deref())?)
            .with_kind(filter(self.tipo.as_deref())?)
            .with_sort(sort))
    }
}

#[derive(Debug, Serialize)]
pub struct LoanList<'a> {
    pub cautelas: Vec<&'a Loan>,
    pub total: usize,
    pub exibidas: usize,
    pub filtrando: bool,
}

impl<'a> LoanList<'a> {
    pub fn build(loans: &'a [Loan], params: &SearchParams) -> Result<Self, QueryError> {
        let query = params.to_query(SortKey::NewestFirst)?;
        let view = view(loans, &query);

        Ok(Self {
            exibidas: view.shown(),
            total: view.total,
            filtrando: view.filtering,
            cautelas: view.items,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryView<'a> {
    pub cautela: &'a Loan,
    pub assinaturas: Vec<&'a SignatureEvent>,
    pub total_assinaturas: u64,
    pub exibidas: usize,
    pub filtrando: bool,
}

impl<'a> HistoryView<'a> {
    /// History reads top to bottom in signing order unless asked otherwise.
    pub fn build(history: &'a History, params: &SearchParams) -> Result<Self, QueryError> {
        let query = params.to_query(SortKey::OldestFirst)?;
        let view = view(&history.assinaturas, &query);

        Ok(Self {
            cautela: &history.cautela,
            total_assinaturas: history.total(),
            exibidas: view.shown(),
            filtrando: view.filtering,
            assinaturas: view.items,
        })
    }
}
