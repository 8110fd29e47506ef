// src/services/import_export.rs
//
// Importação/exportação em CSV separado por ';'. As colunas são posicionais;
// a primeira linha é o cabeçalho e é ignorada na importação.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{
        auth::AuthenticatedUser,
        company::{Company, CompanyInput},
    },
    services::company_service::CompanyWriter,
};

pub const CSV_HEADER: [&str; 18] = [
    "name",
    "email",
    "emailSecundario",
    "emailTerciario",
    "telefono1",
    "telefono2",
    "telefono3",
    "website",
    "description",
    "address",
    "categoriesIds",
    "certificateIds",
    "membershipTypeId",
    "membershipPeriodicidad",
    "metodoPagoMembresia",
    "fechaInicioMembresia",
    "fechaFinMembresia",
    "estado",
];

#[derive(Debug, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    /// Linha do arquivo (o cabeçalho é a linha 1)
    pub row: u64,
    pub error: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub successes: usize,
    pub errors: usize,
    pub failures: Vec<ImportFailure>,
}

// --- leitura de células ---

fn cell(record: &StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_ids(raw: Option<String>, column: &str) -> Result<Vec<i32>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<i32>().map_err(|_| format!("{}: '{}' não é um id", column, v)))
        .collect()
}

fn parse_id(raw: Option<String>, column: &str) -> Result<Option<i32>, String> {
    raw.map(|v| v.parse::<i32>().map_err(|_| format!("{}: '{}' não é um id", column, v)))
        .transpose()
}

fn parse_enum<T: DeserializeOwned>(raw: Option<String>, column: &str) -> Result<Option<T>, String> {
    raw.map(|v| {
        serde_json::from_value(serde_json::Value::String(v.to_lowercase()))
            .map_err(|_| format!("{}: valor desconhecido '{}'", column, v))
    })
    .transpose()
}

fn parse_date(raw: Option<String>, column: &str) -> Result<Option<NaiveDate>, String> {
    raw.map(|v| {
        NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map_err(|_| format!("{}: data '{}' fora do formato AAAA-MM-DD", column, v))
    })
    .transpose()
}

/// Converte uma linha do CSV na entrada de criação. Não valida regras de negócio.
pub fn row_to_input(record: &StringRecord) -> Result<CompanyInput, String> {
    let phones = (4..=6).filter_map(|i| cell(record, i)).collect();

    let mut input = CompanyInput {
        name: cell(record, 0).unwrap_or_default(),
        email: cell(record, 1).unwrap_or_default(),
        email_secundario: cell(record, 2),
        email_terciario: cell(record, 3),
        phones,
        website: cell(record, 7),
        description: cell(record, 8),
        address: cell(record, 9),
        categories_ids: parse_ids(cell(record, 10), CSV_HEADER[10])?,
        certificate_ids: parse_ids(cell(record, 11), CSV_HEADER[11])?,
        membership_type_id: parse_id(cell(record, 12), CSV_HEADER[12])?,
        membership_periodicidad: parse_enum(cell(record, 13), CSV_HEADER[13])?,
        metodo_pago_membresia: parse_enum(cell(record, 14), CSV_HEADER[14])?,
        fecha_inicio_membresia: parse_date(cell(record, 15), CSV_HEADER[15])?,
        fecha_fin_membresia: parse_date(cell(record, 16), CSV_HEADER[16])?,
        ..Default::default()
    };

    if let Some(estado) = parse_enum(cell(record, 17), CSV_HEADER[17])? {
        input.estado = estado;
    }

    Ok(input)
}

fn describe(err: &AppError) -> String {
    match err {
        AppError::ValidationError(errors) => errors.to_string(),
        other => other.to_string(),
    }
}

async fn import_row<W>(writer: &W, caller: AuthenticatedUser, record: &StringRecord) -> Result<(), String>
where
    W: CompanyWriter + ?Sized,
{
    let input = row_to_input(record)?;
    input.validate().map_err(|e| e.to_string())?;
    writer
        .create_company(caller, input)
        .await
        .map_err(|e| describe(&e))?;
    Ok(())
}

/// Processa as linhas em sequência, uma criação por linha.
/// Linha com problema conta como erro e a importação segue.
pub async fn import_companies<W>(
    writer: &W,
    caller: AuthenticatedUser,
    body: &str,
) -> Result<ImportReport, AppError>
where
    W: CompanyWriter + ?Sized,
{
    if body.trim().is_empty() {
        return Err(AppError::InvalidImportFile("arquivo vazio".into()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let header_len = reader
        .headers()
        .map_err(|e| AppError::InvalidImportFile(e.to_string()))?
        .len();
    if header_len < 2 {
        return Err(AppError::InvalidImportFile(
            "cabeçalho sem o separador ';'".into(),
        ));
    }

    let mut report = ImportReport::default();

    for (index, result) in reader.records().enumerate() {
        let mut row = index as u64 + 2;

        let outcome = match result {
            Err(e) => Err(e.to_string()),
            Ok(record) => {
                if let Some(position) = record.position() {
                    row = position.line();
                }
                import_row(writer, caller, &record).await
            }
        };

        match outcome {
            Ok(()) => report.successes += 1,
            Err(error) => {
                tracing::warn!("⚠️ Importação: linha {} rejeitada: {}", row, error);
                report.errors += 1;
                report.failures.push(ImportFailure { row, error });
            }
        }
    }

    tracing::info!(
        "📥 Importação concluída: {} criadas, {} com erro",
        report.successes,
        report.errors
    );
    Ok(report)
}

// Enum serializado no mesmo texto do JSON ("mensual", "activo"...)
fn enum_text<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter().map(i32::to_string).collect::<Vec<_>>().join(",")
}

fn company_row(c: &Company) -> Vec<String> {
    let phone = |i: usize| c.phones.get(i).cloned().unwrap_or_default();
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let date = |v: &Option<NaiveDate>| v.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    vec![
        c.name.clone(),
        c.email.clone(),
        text(&c.email_secundario),
        text(&c.email_terciario),
        phone(0),
        phone(1),
        phone(2),
        text(&c.website),
        text(&c.description),
        text(&c.address),
        join_ids(&c.categories_ids),
        join_ids(&c.certificate_ids),
        c.membership_type_id.map(|id| id.to_string()).unwrap_or_default(),
        c.membership_periodicidad.as_ref().map(enum_text).unwrap_or_default(),
        c.metodo_pago_membresia.as_ref().map(enum_text).unwrap_or_default(),
        date(&c.fecha_inicio_membresia),
        date(&c.fecha_fin_membresia),
        enum_text(&c.estado),
    ]
}

pub fn export_companies(companies: &[Company]) -> Result<String, AppError> {
    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(anyhow::Error::from)?;
    for company in companies {
        writer.write_record(company_row(company)).map_err(anyhow::Error::from)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("falha ao finalizar o CSV: {}", e))?;
    let csv = String::from_utf8(bytes).map_err(anyhow::Error::from)?;
    Ok(csv)
}
