//! # Records
//!
//! Wire shapes of the backend's loans (`cautelas`) and signature events
//! (`assinaturas`).
//!
//! Every field is optional and lenient. Unknown fields are carried in
//! `extra` so a record passes through the gateway unchanged.
use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::QueryError, lenient, time::epoch_millis};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Loan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "cautelado")]
    CheckedOut,
    #[serde(rename = "descautelado")]
    CheckedIn,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Pending,
        LoanStatus::CheckedOut,
        LoanStatus::CheckedIn,
        LoanStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Pending => "pendente",
            LoanStatus::CheckedOut => "cautelado",
            LoanStatus::CheckedIn => "descautelado",
            LoanStatus::Cancelled => "cancelado",
        }
    }
}

/// Durable material comes back; consumables do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialCategory {
    #[serde(rename = "permanente")]
    Durable,
    #[serde(rename = "consumivel")]
    Consumable,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 2] = [MaterialCategory::Durable, MaterialCategory::Consumable];

    pub fn as_str(self) -> &'static str {
        match self {
            MaterialCategory::Durable => "permanente",
            MaterialCategory::Consumable => "consumivel",
        }
    }
}

/// Whether a signature confirmed a checkout or a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureKind {
    #[serde(rename = "cautela")]
    Checkout,
    #[serde(rename = "descautela")]
    CheckIn,
}

impl SignatureKind {
    pub const ALL: [SignatureKind; 2] = [SignatureKind::Checkout, SignatureKind::CheckIn];

    pub fn as_str(self) -> &'static str {
        match self {
            SignatureKind::Checkout => "cautela",
            SignatureKind::CheckIn => "descautela",
        }
    }
}

/// Type axis for records that have none. Only `Filter::All` exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoKind {}

macro_rules! wire_enum {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = QueryError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|variant| variant.as_str() == s)
                    .ok_or_else(|| QueryError::unknown($field, s))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(LoanStatus, "status");
wire_enum!(MaterialCategory, "tipo_material");
wire_enum!(SignatureKind, "tipo_assinatura");

impl FromStr for NoKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Err(QueryError::unknown("tipo", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub tipo_material: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub quantidade: Value,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub responsavel_nome: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub responsavel_email: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub link_assinatura: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data_criacao: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data_retirada: Value,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data_devolucao: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Loan {
    pub fn material(&self) -> &str {
        self.material.as_deref().unwrap_or_default()
    }

    pub fn responsible(&self) -> &str {
        self.responsavel_nome.as_deref().unwrap_or_default()
    }

    pub fn status(&self) -> Option<LoanStatus> {
        self.status.as_deref()?.parse().ok()
    }

    pub fn category(&self) -> Option<MaterialCategory> {
        self.tipo_material.as_deref()?.parse().ok()
    }

    pub fn created_at(&self) -> i64 {
        epoch_millis(&self.data_criacao)
    }

    /// Quantity as the list shows it. Zero and blank both read as empty.
    pub fn quantity_text(&self) -> Cow<'_, str> {
        match &self.quantidade {
            Value::Number(n) if n.as_f64() == Some(0.0) => Cow::Borrowed(""),
            Value::String(s) => Cow::Borrowed(s.trim()),
            other => Cow::Owned(lenient::as_text(other).unwrap_or_default()),
        }
    }

    /// Only durable material that is currently checked out can be returned.
    pub fn can_check_in(&self) -> bool {
        self.category() == Some(MaterialCategory::Durable)
            && self.status() == Some(LoanStatus::CheckedOut)
    }

    pub fn awaiting_signature(&self) -> bool {
        self.status() == Some(LoanStatus::Pending)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureEvent {
    #[serde(default, deserialize_with = "lenient::id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub tipo_assinatura: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub assinatura_base64: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub foto_base64: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data_assinatura: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignatureEvent {
    pub fn name(&self) -> &str {
        self.nome.as_deref().unwrap_or_default()
    }

    pub fn kind(&self) -> Option<SignatureKind> {
        self.tipo_assinatura.as_deref()?.parse().ok()
    }

    pub fn signed_at(&self) -> i64 {
        epoch_millis(&self.data_assinatura)
    }
}

/// `GET /cautelas/{id}/historico` body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub cautela: Loan,

    #[serde(default, deserialize_with = "lenient::list")]
    pub assinaturas: Vec<SignatureEvent>,

    #[serde(default, deserialize_with = "lenient::count", skip_serializing_if = "Option::is_none")]
    pub total_assinaturas: Option<u64>,
}

impl History {
    pub fn total(&self) -> u64 {
        self.total_assinaturas
            .unwrap_or(self.assinaturas.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_loan_lenient_fields() {
        let loan: Loan = serde_json::from_value(json!({
            "id": "a1",
            "material": 42,
            "descricao": null,
            "quantidade": "3",
            "status": "cautelado",
            "tipo_material": "permanente",
            "data_criacao": "2025-01-01T00:00:00Z",
            "observacao": "kept"
        }))
        .unwrap();

        assert_eq!(loan.id, Some(RecordId::Text("a1".to_string())));
        assert_eq!(loan.material(), "42");
        assert_eq!(loan.descricao, None);
        assert_eq!(loan.quantity_text(), "3");
        assert_eq!(loan.status(), Some(LoanStatus::CheckedOut));
        assert_eq!(loan.extra.get("observacao"), Some(&json!("kept")));
        assert!(loan.can_check_in());
    }

    #[test]
    fn test_loan_passthrough() {
        let raw = json!({
            "id": 7,
            "material": "Rádio",
            "quantidade": 2,
            "data_criacao": 1000,
            "setor": "S4"
        });
        let loan: Loan = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(serde_json::to_value(&loan).unwrap(), raw);
    }

    #[test]
    fn test_unknown_status_is_none() {
        let loan: Loan = serde_json::from_value(json!({"status": "Cautelado"})).unwrap();

        assert_eq!(loan.status(), None);
        assert!(!loan.awaiting_signature());
    }

    #[test]
    fn test_consumable_cannot_check_in() {
        let loan: Loan = serde_json::from_value(json!({
            "status": "cautelado",
            "tipo_material": "consumivel"
        }))
        .unwrap();

        assert!(!loan.can_check_in());
    }

    #[test]
    fn test_quantity_text() {
        let zero: Loan = serde_json::from_value(json!({"quantidade": 0})).unwrap();
        let padded: Loan = serde_json::from_value(json!({"quantidade": " 12 "})).unwrap();
        let missing = Loan::default();

        assert_eq!(zero.quantity_text(), "");
        assert_eq!(padded.quantity_text(), "12");
        assert_eq!(missing.quantity_text(), "");
    }

    #[test]
    fn test_history_tolerates_bad_list() {
        let history: History = serde_json::from_value(json!({
            "cautela": {"id": 1},
            "assinaturas": null
        }))
        .unwrap();

        assert!(history.assinaturas.is_empty());
        assert_eq!(history.total(), 0);
    }

    #[test]
    fn test_enum_round_trip_strings() {
        assert_eq!("descautela".parse::<SignatureKind>(), Ok(SignatureKind::CheckIn));
        assert_eq!(
            "consumivel".parse::<MaterialCategory>(),
            Ok(MaterialCategory::Consumable)
        );
        assert!("Pendente".parse::<LoanStatus>().is_err());
        assert!("x".parse::<NoKind>().is_err());
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::Number(5).to_string(), "5");
        assert_eq!(RecordId::Text("abc".to_string()).to_string(), "abc");
    }
}
