//! List view state: the loaded catalog, search term, sort order, and the
//! two-step delete confirmation.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::api::{CatalogClient, ClientResult};
use crate::modules::livros::models::Livro;

pub const MSG_ERRO_CARREGAR: &str = "Erro ao carregar livros. Verifique a conexão com a API.";
pub const MSG_NENHUM_ENCONTRADO: &str = "Nenhum livro encontrado";
pub const MSG_NENHUM_CADASTRADO: &str = "Nenhum livro cadastrado";

/// How the visible list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Publication date, newest first
    #[default]
    Recent,
    /// Publication date, oldest first
    Oldest,
    /// Title A-Z, ignoring case and accents
    Title,
    /// Price, highest first
    Price,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Recent => "recente",
            SortOrder::Oldest => "antigo",
            SortOrder::Title => "nome",
            SortOrder::Price => "preco",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order '{0}'; expected recente, antigo, nome or preco")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "recente" => Ok(SortOrder::Recent),
            "antigo" => Ok(SortOrder::Oldest),
            "nome" => Ok(SortOrder::Title),
            "preco" => Ok(SortOrder::Price),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

/// Case-insensitive substring match on title, author, and publisher.
pub fn matches_search(livro: &Livro, term: &str) -> bool {
    let term = term.to_lowercase();
    livro.titulo.to_lowercase().contains(&term)
        || livro.autor.to_lowercase().contains(&term)
        || livro
            .editora
            .as_ref()
            .is_some_and(|editora| editora.to_lowercase().contains(&term))
}

/// Letters NFD leaves whole, spelled with their base letters.
fn fold_letter(c: char) -> Option<&'static str> {
    Some(match c {
        'ø' => "o",
        'Ø' => "O",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'đ' => "d",
        'Đ' => "D",
        'ł' => "l",
        'Ł' => "L",
        'þ' => "th",
        'Þ' => "TH",
        _ => return None,
    })
}

/// Base letters only: accents dropped, case folded.
fn primary_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match fold_letter(c) {
            Some(base) => key.extend(base.chars().flat_map(char::to_lowercase)),
            None => key.extend(c.to_lowercase()),
        }
    }
    key
}

/// Accents kept, case folded.
fn secondary_key(text: &str) -> String {
    text.nfd().flat_map(char::to_lowercase).collect()
}

/// Title ordering in three levels: base letters, then accents (unaccented
/// first), then case (lowercase first). The raw text settles what is left.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Stable sort of `livros` by `order`.
pub fn sort_livros(livros: &mut [&Livro], order: SortOrder) {
    match order {
        SortOrder::Recent => livros.sort_by(|a, b| b.data_publicacao.cmp(&a.data_publicacao)),
        SortOrder::Oldest => livros.sort_by(|a, b| a.data_publicacao.cmp(&b.data_publicacao)),
        SortOrder::Title => livros.sort_by(|a, b| compare_titles(&a.titulo, &b.titulo)),
        SortOrder::Price => livros.sort_by(|a, b| b.preco.total_cmp(&a.preco)),
    }
}

/// Figures over the whole loaded catalog, ignoring the search term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub total: usize,
    pub total_price: f64,
}

/// Delete awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: i64,
    pub titulo: String,
}

#[derive(Debug, Clone)]
pub struct ListView {
    livros: Vec<Livro>,
    loading: bool,
    load_error: bool,
    search: String,
    order: SortOrder,
    pending_delete: Option<PendingDelete>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListView {
    /// A view that has not loaded yet; it starts out loading.
    pub fn new() -> Self {
        Self {
            livros: Vec::new(),
            loading: true,
            load_error: false,
            search: String::new(),
            order: SortOrder::default(),
            pending_delete: None,
        }
    }

    /// Fetch the whole catalog.
    ///
    /// A failure sets the error flag and keeps whatever was loaded before.
    pub async fn load(&mut self, client: &CatalogClient) {
        self.loading = true;
        match client.list().await {
            Ok(livros) => self.loaded(livros),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load catalog");
                self.load_error = true;
                self.loading = false;
            }
        }
    }

    /// Replace the catalog with a successful load result.
    pub fn loaded(&mut self, livros: Vec<Livro>) {
        self.livros = livros;
        self.load_error = false;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_load_error(&self) -> bool {
        self.load_error
    }

    pub fn livros(&self) -> &[Livro] {
        &self.livros
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.order = order;
    }

    /// Filtered, then sorted.
    pub fn visible(&self) -> Vec<&Livro> {
        let mut visible: Vec<&Livro> = self
            .livros
            .iter()
            .filter(|livro| matches_search(livro, &self.search))
            .collect();
        sort_livros(&mut visible, self.order);
        visible
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.livros.len(),
            total_price: self.livros.iter().map(|livro| livro.preco).sum(),
        }
    }

    /// Message to show instead of an empty list, if the list is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.loading || !self.visible().is_empty() {
            return None;
        }
        if self.search.is_empty() {
            Some(MSG_NENHUM_CADASTRADO)
        } else {
            Some(MSG_NENHUM_ENCONTRADO)
        }
    }

    /// First step of a delete: remember what is about to go.
    pub fn request_delete(&mut self, livro: &Livro) {
        self.pending_delete = Some(PendingDelete {
            id: livro.id,
            titulo: livro.titulo.clone(),
        });
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// Drop the pending delete without touching the API.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step: delete on the server, then drop the record locally.
    ///
    /// Returns `Ok(false)` when nothing was pending. On error the
    /// confirmation stays open.
    pub async fn confirm_delete(&mut self, client: &CatalogClient) -> ClientResult<bool> {
        let Some(pending) = self.pending_delete.clone() else {
            return Ok(false);
        };

        client.delete(pending.id).await?;

        self.livros.retain(|livro| livro.id != pending.id);
        self.pending_delete = None;
        Ok(true)
    }
}
