//! Book form rules shared by the create and edit views.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::modules::livros::models::{Livro, NovoLivro};

/// A form field, keyed by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Titulo,
    Autor,
    Preco,
    DataPublicacao,
    Editora,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Titulo,
        Field::Autor,
        Field::Preco,
        Field::DataPublicacao,
        Field::Editora,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Titulo => "titulo",
            Field::Autor => "autor",
            Field::Preco => "preco",
            Field::DataPublicacao => "data_publicacao",
            Field::Editora => "editora",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == value)
            .ok_or_else(|| format!("unknown field '{value}'"))
    }
}

pub const MSG_TITULO: &str = "Título é obrigatório";
pub const MSG_AUTOR: &str = "Autor é obrigatório";
pub const MSG_PRECO: &str = "Preço deve ser maior que zero";
pub const MSG_DATA: &str = "Data de publicação é obrigatória";
pub const MSG_DATA_INVALIDA: &str = "Data de publicação inválida";
pub const MSG_EDITORA: &str = "Editora é obrigatória";

/// Text contents of the book form, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookForm {
    pub titulo: String,
    pub autor: String,
    pub preco: String,
    pub data_publicacao: String,
    pub editora: String,
}

impl BookForm {
    /// Prefill from a stored book; the price becomes editable text.
    pub fn from_livro(livro: &Livro) -> Self {
        Self {
            titulo: livro.titulo.clone(),
            autor: livro.autor.clone(),
            preco: livro.preco.to_string(),
            data_publicacao: livro.data_publicacao.format("%Y-%m-%d").to_string(),
            editora: livro.editora.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Titulo => &self.titulo,
            Field::Autor => &self.autor,
            Field::Preco => &self.preco,
            Field::DataPublicacao => &self.data_publicacao,
            Field::Editora => &self.editora,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Titulo => &mut self.titulo,
            Field::Autor => &mut self.autor,
            Field::Preco => &mut self.preco,
            Field::DataPublicacao => &mut self.data_publicacao,
            Field::Editora => &mut self.editora,
        }
    }

    /// Check every rule; on success the form converts into the request body.
    pub fn validate(&self) -> Result<NovoLivro, FormErrors> {
        let mut errors = FormErrors::default();

        if self.titulo.trim().is_empty() {
            errors.insert(Field::Titulo, MSG_TITULO);
        }
        if self.autor.trim().is_empty() {
            errors.insert(Field::Autor, MSG_AUTOR);
        }

        let preco = self
            .preco
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|preco| preco.is_finite() && *preco > 0.0);
        if preco.is_none() {
            errors.insert(Field::Preco, MSG_PRECO);
        }

        let data = if self.data_publicacao.trim().is_empty() {
            errors.insert(Field::DataPublicacao, MSG_DATA);
            None
        } else {
            let parsed = NaiveDate::parse_from_str(self.data_publicacao.trim(), "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.insert(Field::DataPublicacao, MSG_DATA_INVALIDA);
            }
            parsed
        };

        if self.editora.trim().is_empty() {
            errors.insert(Field::Editora, MSG_EDITORA);
        }

        match (preco, data) {
            (Some(preco), Some(data_publicacao)) if errors.is_empty() => Ok(NovoLivro {
                titulo: self.titulo.clone(),
                autor: self.autor.clone(),
                preco,
                data_publicacao,
                editora: Some(self.editora.clone()),
            }),
            _ => Err(errors),
        }
    }
}

/// One message per failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, &'static str>);

impl FormErrors {
    fn insert(&mut self, field: Field, message: &'static str) {
        self.0.insert(field, message);
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn clear_field(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Form contents plus the messages from the last validation.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    form: BookForm,
    errors: FormErrors,
}

impl FormState {
    pub fn new(form: BookForm) -> Self {
        Self {
            form,
            errors: FormErrors::default(),
        }
    }

    pub fn form(&self) -> &BookForm {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Edit one field. Only that field's message is cleared.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.form.slot(field) = value.into();
        self.errors.clear_field(field);
    }

    /// Validate, keeping the messages; `None` blocks submission.
    pub fn validate(&mut self) -> Option<NovoLivro> {
        match self.form.validate() {
            Ok(novo) => {
                self.errors = FormErrors::default();
                Some(novo)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
