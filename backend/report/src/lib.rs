//! # Loan Report
//!
//! Terminal version of the admin list.
//!
//! ## Sources
//! - Live: every loan from `GET /cautelas` on the backend, with a session token
//! - Snapshot: a JSON array of loans on disk (`--file`), e.g. one written by `tester`
//!
//! ## Output
//! One line per loan after the same search, filters and sort the admin
//! screen applies. While any filter is active a "Mostrando X de Y" footer
//! follows.
//!
//! With `--historico` each shown loan's signature history is fetched as
//! well, behind a progress bar, and its signature count is appended.
use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use query::{Loan, LoanQuery, RecordId, SortKey, lenient::snapshot, view};
use server::{
    config::DEFAULT_API_URL, error::AppError, payloads::path_id, search::SearchParams,
    session::Session, upstream::Upstream,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Backend base URL
    #[arg(long, env = "CAUTELA_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Session token for the backend
    #[arg(long, env = "CAUTELA_TOKEN")]
    pub token: Option<String>,

    /// Read loans from a JSON snapshot instead of the backend
    #[arg(long)]
    pub file: Option<String>,

    #[arg(long, default_value = "")]
    pub busca: String,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub tipo: Option<String>,

    #[arg(long)]
    pub ordenacao: Option<String>,

    /// Also fetch each shown loan's signature history
    #[arg(long)]
    pub historico: bool,

    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

impl Args {
    pub fn query(&self) -> Result<LoanQuery> {
        let params = SearchParams {
            busca: self.busca.clone(),
            status: self.status.clone(),
            tipo: self.tipo.clone(),
            ordenacao: self.ordenacao.clone(),
        };

        Ok(params.to_query(SortKey::NewestFirst)?)
    }

    fn session(&self) -> Result<Session> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Session::new(token)),
            _ => bail!("A session token is required (--token or CAUTELA_TOKEN)"),
        }
    }
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<Loan>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("Parsing {}", path.display()))?;

    Ok(snapshot(value))
}

pub fn format_line(loan: &Loan) -> String {
    let id = loan
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut line = format!(
        "#{id:<6} {:<12} {:<30} {:>4}  {}",
        loan.status.as_deref().unwrap_or("-"),
        loan.material(),
        loan.quantity_text(),
        loan.responsible(),
    );

    if loan.can_check_in() {
        line.push_str("  [descautelar]");
    } else if loan.awaiting_signature() {
        line.push_str("  [aguardando assinatura]");
    }

    line
}

pub fn render(loans: &[Loan], query: &LoanQuery) -> Vec<String> {
    let view = view(loans, query);

    let mut lines: Vec<String> = view.items.iter().map(|loan| format_line(loan)).collect();

    if view.items.is_empty() {
        lines.push("Nenhuma cautela encontrada".to_string());
    }

    if let Some(summary) = view.summary() {
        lines.push(summary);
    }

    lines
}

/// Backend ids pass the same path check the gateway applies.
pub async fn signature_count(
    upstream: &Upstream,
    id: &RecordId,
    session: &Session,
) -> Result<u64, AppError> {
    let id = id.to_string();
    let history = upstream.history(path_id(&id)?, session).await?;

    Ok(history.total())
}

pub async fn run(args: Args) -> Result<()> {
    let query = args.query()?;

    let upstream = Upstream::new(
        args.api_url.trim_end_matches('/'),
        Duration::from_millis(args.timeout_ms),
    )?;

    let loans = match &args.file {
        Some(path) => {
            info!("Reading snapshot {path}");
            load_snapshot(path)?
        }
        None => {
            info!("Fetching loans from {}", upstream.base_url());
            upstream.loans(&args.session()?).await?
        }
    };

    println!("Loaded Loans: {}\n", loans.len());

    if !args.historico {
        for line in render(&loans, &query) {
            println!("{line}");
        }

        return Ok(());
    }

    let session = args.session()?;
    let shown = view(&loans, &query);

    let pb = ProgressBar::new(shown.shown() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut lines = Vec::with_capacity(shown.shown());
    for loan in &shown.items {
        let line = format_line(loan);

        let Some(id) = &loan.id else {
            lines.push(format!("{line}  (sem id)"));
            pb.inc(1);
            continue;
        };

        pb.set_message(format!("Fetching history {id}"));

        match signature_count(&upstream, id, &session).await {
            Ok(count) => lines.push(format!("{line}  assinaturas: {count}")),
            Err(e) => {
                warn!("History for {id} failed: {e}");
                lines.push(format!("{line}  assinaturas: ?"));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    for line in lines {
        println!("{line}");
    }

    if let Some(summary) = shown.summary() {
        println!("{summary}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use query::{Filter, LoanStatus};
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["report"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn loans() -> Vec<Loan> {
        snapshot(json!([
            {"id": 1, "material": "Notebook", "status": "pendente", "tipo_material": "permanente", "quantidade": 1, "responsavel_nome": "Ana", "data_criacao": 100},
            {"id": 2, "material": "Notebook Dell", "status": "cautelado", "tipo_material": "permanente", "quantidade": 2, "responsavel_nome": "Bruno", "data_criacao": 200},
            {"id": 3, "material": "Pilhas", "status": "cautelado", "tipo_material": "consumivel", "quantidade": 0, "responsavel_nome": "Érica", "data_criacao": 300}
        ]))
    }

    #[test]
    fn test_query_from_flags() {
        let query = args(&["--busca", "dell", "--status", "cautelado"]).query().unwrap();

        assert_eq!(query.search, "dell");
        assert_eq!(query.status, Filter::Only(LoanStatus::CheckedOut));
        assert_eq!(query.sort, SortKey::NewestFirst);
    }

    #[test]
    fn test_query_rejects_unknown_sort() {
        assert!(args(&["--ordenacao", "z-a"]).query().is_err());
    }

    #[test]
    fn test_session_required() {
        assert!(args(&["--token", "  "]).session().is_err());
        assert_eq!(args(&["--token", "abc"]).session().unwrap().token(), "abc");
    }

    #[test]
    fn test_load_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!([{"id": 1, "material": "Rádio"}, 42, {"id": "x", "material": "GPS"}])
        )
        .unwrap();

        let loans = load_snapshot(file.path()).unwrap();

        assert_eq!(loans.len(), 2);
        assert_eq!(loans[1].material(), "GPS");
    }

    #[test]
    fn test_load_snapshot_errors() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(load_snapshot(file.path()).is_err());
        assert!(load_snapshot("/nonexistent/cautelas.json").is_err());
    }

    #[tokio::test]
    async fn test_signature_count_rejects_unsafe_ids() {
        let upstream = Upstream::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let session = Session::new("abc");

        let result =
            signature_count(&upstream, &RecordId::Text("../users".to_string()), &session).await;

        assert!(matches!(result, Err(AppError::Invalid(_))));
    }

    #[test]
    fn test_render_newest_first() {
        let lines = render(&loans(), &LoanQuery::default());

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Pilhas"));
        assert!(lines[2].contains("Notebook"));
    }

    #[test]
    fn test_render_summary_while_filtering() {
        let query = LoanQuery::default().with_search("notebook");
        let lines = render(&loans(), &query);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Notebook Dell"));
        assert_eq!(lines[2], "Mostrando 2 de 3 registro(s)");
    }

    #[test]
    fn test_render_empty() {
        let query = LoanQuery::default().with_search("câmera");
        let lines = render(&loans(), &query);

        assert_eq!(lines, ["Nenhuma cautela encontrada", "Mostrando 0 de 3 registro(s)"]);
    }

    #[test]
    fn test_line_markers() {
        let loans = loans();

        assert!(format_line(&loans[0]).ends_with("[aguardando assinatura]"));
        assert!(format_line(&loans[1]).ends_with("[descautelar]"));
        assert!(format_line(&loans[2]).ends_with("Érica"));
    }
}
