use std::{borrow::Cow, cmp::Reverse};

use serde::Serialize;
use tracing::trace;

use crate::{
    collate::CollationKey,
    filter::{RecordQuery, SortKey},
    normalize::{fold, matches},
    records::{Loan, LoanStatus, MaterialCategory, NoKind, SignatureEvent, SignatureKind},
};

/// What the pipeline needs to know about a record.
pub trait Queryable {
    type Status: PartialEq;
    type Kind: PartialEq;

    /// Raw text the search box looks through.
    fn searchable(&self) -> impl Iterator<Item = Cow<'_, str>>;

    fn status(&self) -> Option<Self::Status>;

    fn kind(&self) -> Option<Self::Kind>;

    /// Epoch millis, `0` when missing.
    fn timestamp(&self) -> i64;

    fn name(&self) -> &str;

    fn responsible(&self) -> &str;
}

impl Queryable for Loan {
    type Status = LoanStatus;
    type Kind = MaterialCategory;

    fn searchable(&self) -> impl Iterator<Item = Cow<'_, str>> {
        [
            self.material.as_deref(),
            self.descricao.as_deref(),
            self.responsavel_nome.as_deref(),
            self.responsavel_email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(Cow::Borrowed)
        .chain(std::iter::once(self.quantity_text()))
    }

    fn status(&self) -> Option<LoanStatus> {
        Loan::status(self)
    }

    fn kind(&self) -> Option<MaterialCategory> {
        self.category()
    }

    fn timestamp(&self) -> i64 {
        self.created_at()
    }

    fn name(&self) -> &str {
        self.material()
    }

    fn responsible(&self) -> &str {
        Loan::responsible(self)
    }
}

impl Queryable for SignatureEvent {
    type Status = SignatureKind;
    type Kind = NoKind;

    fn searchable(&self) -> impl Iterator<Item = Cow<'_, str>> {
        [self.nome.as_deref(), self.cargo.as_deref()]
            .into_iter()
            .flatten()
            .map(Cow::Borrowed)
    }

    fn status(&self) -> Option<SignatureKind> {
        SignatureEvent::kind(self)
    }

    fn kind(&self) -> Option<NoKind> {
        None
    }

    fn timestamp(&self) -> i64 {
        self.signed_at()
    }

    fn name(&self) -> &str {
        SignatureEvent::name(self)
    }

    // the signer is the responsible party for their own event
    fn responsible(&self) -> &str {
        SignatureEvent::name(self)
    }
}

/// Filtered, sorted view over a snapshot.
pub fn run<'a, R: Queryable>(
    records: &'a [R],
    query: &RecordQuery<R::Status, R::Kind>,
) -> Vec<&'a R> {
    let needle = fold(&query.search);

    let mut shown: Vec<&R> = records
        .iter()
        .filter(|record| {
            needle.is_empty() || record.searchable().any(|field| matches(&field, &needle))
        })
        .filter(|record| query.status.admits(record.status()))
        .filter(|record| query.kind.admits(record.kind()))
        .collect();

    // sort_by_cached_key is stable
    match query.sort {
        SortKey::NewestFirst => shown.sort_by_cached_key(|record| Reverse(record.timestamp())),
        SortKey::OldestFirst => shown.sort_by_cached_key(|record| record.timestamp()),
        SortKey::NameAscending => shown.sort_by_cached_key(|record| CollationKey::new(record.name())),
        SortKey::ResponsibleAscending => {
            shown.sort_by_cached_key(|record| CollationKey::new(record.responsible()))
        }
    }

    trace!(
        total = records.len(),
        shown = shown.len(),
        sort = %query.sort,
        "Query pipeline pass"
    );

    shown
}

#[derive(Debug, Serialize)]
pub struct QueryView<'a, R> {
    pub items: Vec<&'a R>,
    pub total: usize,
    pub filtering: bool,
}

impl<R> QueryView<'_, R> {
    pub fn shown(&self) -> usize {
        self.items.len()
    }

    /// "Mostrando X de Y" footer, only while filters are active.
    pub fn summary(&self) -> Option<String> {
        self.filtering
            .then(|| format!("Mostrando {} de {} registro(s)", self.shown(), self.total))
    }
}

pub fn view<'a, R: Queryable>(
    records: &'a [R],
    query: &RecordQuery<R::Status, R::Kind>,
) -> QueryView<'a, R> {
    QueryView {
        items: run(records, query),
        total: records.len(),
        filtering: query.is_filtering(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Filter, HistoryQuery, LoanQuery};

    fn loans(value: serde_json::Value) -> Vec<Loan> {
        serde_json::from_value(value).unwrap()
    }

    fn materials<'a>(shown: &[&'a Loan]) -> Vec<&'a str> {
        shown.iter().map(|loan| loan.material()).collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let records = loans(json!([
            {"material": "Notebook", "status": "pendente", "data_criacao": 100},
            {"material": "Notebook Dell", "status": "cautelado", "data_criacao": 200}
        ]));

        let query = LoanQuery::default()
            .with_search("notebook")
            .with_sort(SortKey::NewestFirst);

        assert_eq!(materials(&run(&records, &query)), ["Notebook Dell", "Notebook"]);
    }

    #[test]
    fn test_accent_and_case_insensitive_search() {
        let records = loans(json!([
            {"material": "Câmera"},
            {"material": "Projetor"}
        ]));

        for search in ["camera", "CAMERA", "  Câm  "] {
            let query = LoanQuery::default().with_search(search);
            assert_eq!(materials(&run(&records, &query)), ["Câmera"], "{search}");
        }
    }

    #[test]
    fn test_search_covers_every_loan_field() {
        let records = loans(json!([
            {"id": 1, "material": "A", "descricao": "Lente zoom"},
            {"id": 2, "material": "B", "responsavel_nome": "João Zoológico"},
            {"id": 3, "material": "C", "responsavel_email": "zoom@exemplo.com"},
            {"id": 4, "material": "D", "quantidade": 15},
            {"id": 5, "material": "E"}
        ]));

        let by_text = LoanQuery::default()
            .with_search("zoo")
            .with_sort(SortKey::NameAscending);
        assert_eq!(materials(&run(&records, &by_text)), ["A", "B", "C"]);

        let by_quantity = LoanQuery::default().with_search("15");
        assert_eq!(materials(&run(&records, &by_quantity)), ["D"]);
    }

    #[test]
    fn test_status_and_type_filters_compose() {
        let records = loans(json!([
            {"material": "Rádio", "status": "cautelado", "tipo_material": "permanente"},
            {"material": "Pilha", "status": "cautelado", "tipo_material": "consumivel"},
            {"material": "GPS", "status": "pendente", "tipo_material": "permanente"},
            {"material": "Binóculo", "status": "Cautelado", "tipo_material": "permanente"}
        ]));

        let query = LoanQuery::default()
            .with_status(Filter::Only(LoanStatus::CheckedOut))
            .with_kind(Filter::Only(MaterialCategory::Durable));

        assert_eq!(materials(&run(&records, &query)), ["Rádio"]);
    }

    #[test]
    fn test_missing_timestamps_sort_as_oldest() {
        let records = loans(json!([
            {"material": "sem data"},
            {"material": "nova", "data_criacao": "2025-05-01T10:00:00Z"},
            {"material": "lixo", "data_criacao": "ontem"},
            {"material": "velha", "data_criacao": "2024-05-01T10:00:00Z"}
        ]));

        let newest = LoanQuery::default().with_sort(SortKey::NewestFirst);
        assert_eq!(
            materials(&run(&records, &newest)),
            ["nova", "velha", "sem data", "lixo"]
        );

        let oldest = LoanQuery::default().with_sort(SortKey::OldestFirst);
        assert_eq!(
            materials(&run(&records, &oldest)),
            ["sem data", "lixo", "velha", "nova"]
        );
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let records = loans(json!([
            {"material": "x1", "data_criacao": 50},
            {"material": "y", "data_criacao": 90},
            {"material": "x2", "data_criacao": 50}
        ]));

        let newest = LoanQuery::default().with_sort(SortKey::NewestFirst);
        assert_eq!(materials(&run(&records, &newest)), ["y", "x1", "x2"]);

        let oldest = LoanQuery::default().with_sort(SortKey::OldestFirst);
        assert_eq!(materials(&run(&records, &oldest)), ["x1", "x2", "y"]);
    }

    #[test]
    fn test_name_sorts_are_locale_aware() {
        let records = loans(json!([
            {"material": "bússola", "responsavel_nome": "Zeca"},
            {"material": "Álcool", "responsavel_nome": "érica"},
            {"material": "capa", "responsavel_nome": "Bruno"},
            {"responsavel_nome": "Ana"}
        ]));

        let by_name = LoanQuery::default().with_sort(SortKey::NameAscending);
        assert_eq!(materials(&run(&records, &by_name)), ["", "Álcool", "bússola", "capa"]);

        let by_responsible = LoanQuery::default().with_sort(SortKey::ResponsibleAscending);
        let responsible: Vec<&str> = run(&records, &by_responsible)
            .iter()
            .map(|loan| loan.responsible())
            .collect();
        assert_eq!(responsible, ["Ana", "Bruno", "érica", "Zeca"]);
    }

    #[test]
    fn test_identity_preserved() {
        let records = loans(json!([{"material": "a"}, {"material": "b"}]));
        let query = LoanQuery::default().with_sort(SortKey::NameAscending);

        let shown = run(&records, &query);

        assert!(std::ptr::eq(shown[0], &records[0]));
        assert!(std::ptr::eq(shown[1], &records[1]));
    }

    #[test]
    fn test_signature_history() {
        let events: Vec<SignatureEvent> = serde_json::from_value(json!([
            {"nome": "Sgt Lima", "cargo": "Almoxarife", "tipo_assinatura": "cautela", "data_assinatura": "2025-01-02T08:00:00Z"},
            {"nome": "Cap Souza", "cargo": "Comandante", "tipo_assinatura": "descautela", "data_assinatura": "2025-01-09T08:00:00Z"},
            {"nome": "Ten Álvares", "tipo_assinatura": "cautela", "data_assinatura": "2025-01-05T08:00:00Z"}
        ]))
        .unwrap();

        let chronological = HistoryQuery::default().with_sort(SortKey::OldestFirst);
        let names: Vec<&str> = run(&events, &chronological)
            .iter()
            .map(|event| event.name())
            .collect();
        assert_eq!(names, ["Sgt Lima", "Ten Álvares", "Cap Souza"]);

        let returns = HistoryQuery::default().with_status(Filter::Only(SignatureKind::CheckIn));
        assert_eq!(run(&events, &returns).len(), 1);

        let by_role = HistoryQuery::default().with_search("almox");
        assert_eq!(run(&events, &by_role)[0].name(), "Sgt Lima");
    }

    #[test]
    fn test_view_summary() {
        let records = loans(json!([
            {"material": "Notebook", "status": "pendente"},
            {"material": "Rádio", "status": "cautelado"}
        ]));

        let unfiltered = view(&records, &LoanQuery::default());
        assert_eq!(unfiltered.shown(), 2);
        assert_eq!(unfiltered.summary(), None);

        let filtered = view(
            &records,
            &LoanQuery::default().with_status(Filter::Only(LoanStatus::Pending)),
        );
        assert_eq!(filtered.total, 2);
        assert_eq!(
            filtered.summary().as_deref(),
            Some("Mostrando 1 de 2 registro(s)")
        );
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Loan> = Vec::new();
        let query = LoanQuery::default()
            .with_search("x")
            .with_status(Filter::Only(LoanStatus::Cancelled));

        assert!(run(&records, &query).is_empty());
    }
}
