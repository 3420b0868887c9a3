//! Client against a live server on an ephemeral port.

use std::sync::Arc;

use chrono::NaiveDate;
use livraria_app::bootstrap;
use livraria_app::client::{
    CatalogClient, ClientError, CreateView, EditView, Field, ListView, Phase, SortOrder,
    SubmitOutcome,
};
use livraria_app::modules::livros::store::MemoryLivroStore;
use livraria_app::NovoLivro;
use livraria_kernel::settings::Settings;
use tokio::net::TcpListener;

async fn spawn_server() -> CatalogClient {
    let app = bootstrap::app_router(Arc::new(MemoryLivroStore::new()), &Settings::default())
        .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(livraria_http::serve(listener, app, std::future::pending()));

    CatalogClient::new(format!("http://{addr}"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn crud_sequence_over_http() {
    let client = spawn_server().await;
    assert_eq!(
        client.status().await.unwrap(),
        "API da livraria está funcionando!"
    );

    let mut novo = NovoLivro {
        titulo: "Dom Casmurro".to_string(),
        autor: "Machado de Assis".to_string(),
        preco: 39.9,
        data_publicacao: date(1899, 1, 1),
        editora: None,
    };
    let id = client.create(&novo).await.unwrap().unwrap();

    let stored = client.get(id).await.unwrap();
    assert_eq!(stored.titulo, "Dom Casmurro");
    assert_eq!(stored.editora, None);

    novo.editora = Some("Garnier".to_string());
    client.update(id, &novo).await.unwrap();
    assert_eq!(
        client.get(id).await.unwrap().editora.as_deref(),
        Some("Garnier")
    );

    client.delete(id).await.unwrap();
    assert!(matches!(
        client.get(id).await.unwrap_err(),
        ClientError::NaoEncontrado
    ));
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_of_missing_book_is_not_found() {
    let client = spawn_server().await;
    let novo = NovoLivro {
        titulo: "Iracema".to_string(),
        autor: "José de Alencar".to_string(),
        preco: 15.0,
        data_publicacao: date(1865, 1, 1),
        editora: None,
    };
    assert!(matches!(
        client.update(999, &novo).await.unwrap_err(),
        ClientError::NaoEncontrado
    ));
}

#[tokio::test]
async fn views_drive_create_edit_and_delete() {
    let client = spawn_server().await;

    let mut create = CreateView::new();
    for (field, value) in [
        (Field::Titulo, "Memórias Póstumas de Brás Cubas"),
        (Field::Autor, "Machado de Assis"),
        (Field::Preco, "25.5"),
        (Field::DataPublicacao, "1881-01-01"),
        (Field::Editora, "Tipografia Nacional"),
    ] {
        create.set_field(field, value);
    }
    assert_eq!(create.submit(&client).await.unwrap(), SubmitOutcome::Saved);
    let id = create.created_id().unwrap();
    assert_eq!(create.form().form().titulo, "");

    let mut edit = EditView::new(id);
    edit.load(&client).await;
    assert_eq!(edit.phase(), Phase::Ready);
    assert_eq!(edit.form().form().preco, "25.5");

    edit.set_field(Field::Preco, "0");
    assert_eq!(edit.submit(&client).await.unwrap(), SubmitOutcome::Invalid);
    assert_eq!(client.get(id).await.unwrap().preco, 25.5);

    edit.set_field(Field::Preco, "30");
    assert_eq!(edit.submit(&client).await.unwrap(), SubmitOutcome::Saved);
    assert_eq!(edit.phase(), Phase::Ready);
    assert_eq!(client.get(id).await.unwrap().preco, 30.0);

    let mut list = ListView::new();
    list.load(&client).await;
    list.set_order(SortOrder::Title);
    assert!(!list.is_loading());
    assert_eq!(list.stats().total, 1);

    let livro = list.livros()[0].clone();
    list.request_delete(&livro);
    assert!(list.confirm_delete(&client).await.unwrap());
    assert!(list.livros().is_empty());
    assert!(list.pending_delete().is_none());
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_of_missing_book_ends_in_load_error() {
    let client = spawn_server().await;
    let mut edit = EditView::new(42);
    edit.load(&client).await;
    assert_eq!(edit.phase(), Phase::LoadError);
}
