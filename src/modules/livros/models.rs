use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Displayed in place of a missing publisher.
pub const EDITORA_AUSENTE: &str = "N/A";

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Livro {
    /// Identifier assigned by the store; never reused
    pub id: i64,
    /// Title of the book
    pub titulo: String,
    /// Author of the book
    pub autor: String,
    /// Price, always greater than zero
    pub preco: f64,
    /// Publication date (`YYYY-MM-DD`)
    pub data_publicacao: NaiveDate,
    /// Publisher, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editora: Option<String>,
}

impl Livro {
    pub fn from_novo(id: i64, novo: NovoLivro) -> Self {
        Self {
            id,
            titulo: novo.titulo,
            autor: novo.autor,
            preco: novo.preco,
            data_publicacao: novo.data_publicacao,
            editora: novo.editora,
        }
    }

    pub fn editora_ou_ausente(&self) -> &str {
        self.editora.as_deref().unwrap_or(EDITORA_AUSENTE)
    }
}

/// Validated book contents without an id; what create and update store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NovoLivro {
    pub titulo: String,
    pub autor: String,
    pub preco: f64,
    pub data_publicacao: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editora: Option<String>,
}

/// Raw request body for create and update. Every field may be missing;
/// [`NovoLivro::try_from`] decides whether the payload is complete.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LivroPayload {
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub autor: Option<String>,
    #[serde(default)]
    pub preco: Option<f64>,
    #[serde(default)]
    pub data_publicacao: Option<String>,
    #[serde(default)]
    pub editora: Option<String>,
}

/// A payload that cannot become a [`NovoLivro`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Dados incompletos")]
pub struct DadosIncompletos {
    /// Field that failed, for logs
    pub campo: &'static str,
}

impl TryFrom<LivroPayload> for NovoLivro {
    type Error = DadosIncompletos;

    fn try_from(payload: LivroPayload) -> Result<Self, Self::Error> {
        let titulo = required_text(payload.titulo, "titulo")?;
        let autor = required_text(payload.autor, "autor")?;

        let preco = payload
            .preco
            .filter(|preco| preco.is_finite() && *preco > 0.0)
            .ok_or(DadosIncompletos { campo: "preco" })?;

        let data_publicacao = payload
            .data_publicacao
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .ok_or(DadosIncompletos {
                campo: "data_publicacao",
            })?;

        let editora = payload.editora.filter(|editora| !editora.trim().is_empty());

        Ok(Self {
            titulo,
            autor,
            preco,
            data_publicacao,
            editora,
        })
    }
}

fn required_text(value: Option<String>, campo: &'static str) -> Result<String, DadosIncompletos> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or(DadosIncompletos { campo })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> LivroPayload {
        LivroPayload {
            titulo: Some("X".to_string()),
            autor: Some("Y".to_string()),
            preco: Some(9.99),
            data_publicacao: Some("2024-01-01".to_string()),
            editora: None,
        }
    }

    #[test]
    fn complete_payload_becomes_novo_livro() {
        let novo = NovoLivro::try_from(payload()).unwrap();
        assert_eq!(novo.titulo, "X");
        assert_eq!(novo.preco, 9.99);
        assert_eq!(
            novo.data_publicacao,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(novo.editora, None);
    }

    #[test]
    fn zero_and_negative_prices_are_rejected() {
        for preco in [0.0, -5.0, f64::NAN] {
            let mut raw = payload();
            raw.preco = Some(preco);
            assert_eq!(
                NovoLivro::try_from(raw).unwrap_err(),
                DadosIncompletos { campo: "preco" }
            );
        }
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let mut raw = payload();
        raw.titulo = Some("   ".to_string());
        assert_eq!(NovoLivro::try_from(raw).unwrap_err().campo, "titulo");

        let mut raw = payload();
        raw.autor = None;
        assert_eq!(NovoLivro::try_from(raw).unwrap_err().campo, "autor");

        let mut raw = payload();
        raw.data_publicacao = Some("01/01/2024".to_string());
        assert_eq!(
            NovoLivro::try_from(raw).unwrap_err().campo,
            "data_publicacao"
        );
    }

    #[test]
    fn blank_publisher_is_dropped() {
        let mut raw = payload();
        raw.editora = Some(" ".to_string());
        assert_eq!(NovoLivro::try_from(raw).unwrap().editora, None);
    }

    #[test]
    fn livro_serializes_date_as_iso_and_omits_missing_publisher() {
        let livro = Livro::from_novo(3, NovoLivro::try_from(payload()).unwrap());
        let json = serde_json::to_value(&livro).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "titulo": "X",
                "autor": "Y",
                "preco": 9.99,
                "data_publicacao": "2024-01-01"
            })
        );
        assert_eq!(livro.editora_ou_ausente(), "N/A");
    }
}
