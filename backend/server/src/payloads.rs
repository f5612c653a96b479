//! # Payloads
//!
//! Request bodies checked here before anything reaches the backend.
//!
//! ## Loans
//! - material and responsible name are required
//! - `tipo_material` is `permanente` or `consumivel`
//! - `quantidade` is a whole number of at least 1, as a number or a string
//! - responsible email must look like an email
//!
//! ## Signatures
//! Both the drawn signature and the photo are mandatory. Each must be a
//! `data:image/...;base64,` URL whose payload decodes to something.
//!
//! ## Users
//! Passwords have at least 8 characters. Updates may omit the password.
use std::sync::LazyLock;

use axum::body::Bytes;
use base64::{Engine, engine::general_purpose::STANDARD};
use query::MaterialCategory;
use regex::Regex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::AppError;

pub const MIN_PASSWORD_CHARS: usize = 8;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static IMAGE_DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|webp);base64,([A-Za-z0-9+/]+={0,2})$").unwrap()
});

static PATH_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

pub fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::MalformedPayload)
}

/// Ids and uuids end up in backend URLs, so only plain tokens pass.
pub fn path_id(id: &str) -> Result<&str, AppError> {
    if PATH_ID.is_match(id) {
        Ok(id)
    } else {
        Err(AppError::invalid(format!("Invalid id: {id}")))
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::invalid(format!("{field} is required")))
}

fn email(value: Option<String>) -> Result<String, AppError> {
    let value = required("email", value)?;

    if EMAIL.is_match(&value) {
        Ok(value)
    } else {
        Err(AppError::invalid(format!("Invalid email: {value}")))
    }
}

fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::invalid(format!(
            "Password must have at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    Ok(())
}

fn image(field: &str, value: Option<String>) -> Result<String, AppError> {
    let value = required(field, value)?;

    let encoded = IMAGE_DATA_URL
        .captures(&value)
        .and_then(|captures| captures.get(2))
        .map(|m| m.as_str())
        .ok_or_else(|| AppError::invalid(format!("{field} must be a base64 image data URL")))?;

    match STANDARD.decode(encoded) {
        Ok(bytes) if !bytes.is_empty() => Ok(value),
        _ => Err(AppError::invalid(format!("{field} is not valid base64"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct NewLoanRequest {
    material: Option<String>,
    descricao: Option<String>,
    tipo_material: Option<String>,
    #[serde(default)]
    quantidade: Value,
    responsavel_nome: Option<String>,
    responsavel_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLoan {
    pub material: String,
    pub descricao: String,
    pub tipo_material: MaterialCategory,
    pub quantidade: u32,
    pub responsavel_nome: String,
    pub responsavel_email: String,
}

impl NewLoanRequest {
    pub fn validate(self) -> Result<NewLoan, AppError> {
        let tipo_material = required("tipo_material", self.tipo_material)?.parse::<MaterialCategory>()?;

        let quantidade = match &self.quantidade {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n >= 1)
        .ok_or_else(|| AppError::invalid("quantidade must be a whole number of at least 1"))?;

        Ok(NewLoan {
            material: required("material", self.material)?,
            descricao: self.descricao.unwrap_or_default().trim().to_string(),
            tipo_material,
            quantidade,
            responsavel_nome: required("responsavel_nome", self.responsavel_nome)?,
            responsavel_email: email(self.responsavel_email)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    assinatura_base64: Option<String>,
    foto_base64: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub assinatura_base64: String,
    pub foto_base64: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl SignatureRequest {
    pub fn validate(self) -> Result<Signature, AppError> {
        Ok(Signature {
            assinatura_base64: image("assinatura_base64", self.assinatura_base64)?,
            foto_base64: image("foto_base64", self.foto_base64)?,
            rest: self.rest,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    nome_completo: Option<String>,
    #[serde(default)]
    role: Role,
    #[serde(default = "default_active")]
    ativo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub nome_completo: String,
    pub role: Role,
    pub ativo: bool,
}

impl UserRequest {
    /// New users need a password.
    pub fn validate_new(self) -> Result<User, AppError> {
        let pass = self
            .password
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::invalid("password is required"))?;
        password(&pass)?;

        self.into_user(Some(pass))
    }

    /// A blank password on update means "keep the current one".
    pub fn validate_update(self) -> Result<User, AppError> {
        let pass = self
            .password
            .clone()
            .filter(|p| !p.trim().is_empty());

        if let Some(pass) = &pass {
            password(pass)?;
        }

        self.into_user(pass)
    }

    fn into_user(self, password: Option<String>) -> Result<User, AppError> {
        Ok(User {
            username: required("username", self.username)?,
            email: email(self.email)?,
            password,
            nome_completo: self.nome_completo.unwrap_or_default().trim().to_string(),
            role: self.role,
            ativo: self.ativo,
        })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PasswordChange {
    pub password: String,
}

impl PasswordChange {
    pub fn validate(self) -> Result<Self, AppError> {
        password(&self.password)?;

        Ok(self)
    }
}
