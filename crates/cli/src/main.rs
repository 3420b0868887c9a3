//! `livraria`: run the catalog server or work with a running one.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use livraria_app::client::{
    list::MSG_ERRO_CARREGAR, CatalogClient, CreateView, EditView, Field, ListView, SortOrder,
    SubmitOutcome,
};
use livraria_app::utils::{format_date, format_price, livros_label};
use livraria_app::Livro;
use livraria_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "livraria", version, about = "Book catalog server and client")]
struct Cli {
    /// Base URL of the catalog API; overrides `client.api_url`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API until Ctrl-C.
    Serve,

    /// Apply pending database migrations and exit.
    Migrate,

    /// Check that the API answers.
    Status,

    /// List the catalog.
    List {
        /// Only books whose title, author or publisher contain this text.
        #[arg(long)]
        busca: Option<String>,

        /// recente, antigo, nome or preco.
        #[arg(long, default_value = "recente")]
        ordem: SortOrder,
    },

    /// Show one book.
    Show { id: i64 },

    /// Register a new book.
    Add(NewBookArgs),

    /// Replace a book; fields not given keep their current value.
    Edit {
        id: i64,

        #[command(flatten)]
        changes: BookChanges,
    },

    /// Delete a book, asking for confirmation first.
    Delete {
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve => "serve",
            Commands::Migrate => "migrate",
            Commands::Status => "status",
            Commands::List { .. } => "list",
            Commands::Show { .. } => "show",
            Commands::Add(_) => "add",
            Commands::Edit { .. } => "edit",
            Commands::Delete { .. } => "delete",
        }
    }
}

#[derive(Args)]
struct NewBookArgs {
    #[arg(long, default_value = "")]
    titulo: String,
    #[arg(long, default_value = "")]
    autor: String,
    #[arg(long, default_value = "")]
    preco: String,
    /// Publication date, YYYY-MM-DD.
    #[arg(long = "data", default_value = "")]
    data_publicacao: String,
    #[arg(long, default_value = "")]
    editora: String,
}

impl NewBookArgs {
    fn fields(self) -> [(Field, String); 5] {
        [
            (Field::Titulo, self.titulo),
            (Field::Autor, self.autor),
            (Field::Preco, self.preco),
            (Field::DataPublicacao, self.data_publicacao),
            (Field::Editora, self.editora),
        ]
    }
}

#[derive(Args)]
struct BookChanges {
    #[arg(long)]
    titulo: Option<String>,
    #[arg(long)]
    autor: Option<String>,
    #[arg(long)]
    preco: Option<String>,
    /// Publication date, YYYY-MM-DD.
    #[arg(long = "data")]
    data_publicacao: Option<String>,
    #[arg(long)]
    editora: Option<String>,
}

impl BookChanges {
    fn fields(self) -> impl Iterator<Item = (Field, String)> {
        [
            (Field::Titulo, self.titulo),
            (Field::Autor, self.autor),
            (Field::Preco, self.preco),
            (Field::DataPublicacao, self.data_publicacao),
            (Field::Editora, self.editora),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load livraria settings")?;
    if let Some(api_url) = cli.api_url {
        settings.client.api_url = api_url;
    }

    match cli.command {
        Commands::Serve => {
            livraria_telemetry::init(&settings.telemetry)?;
            livraria_app::bootstrap::run(settings).await
        }
        Commands::Migrate => {
            livraria_telemetry::init(&settings.telemetry)?;
            let applied = livraria_app::bootstrap::migrate(&settings)?;
            println!("{applied} migration(s) applied");
            Ok(())
        }
        command => {
            // Keep client output readable unless RUST_LOG asks for more
            settings.telemetry.level = "warn".to_string();
            livraria_telemetry::init(&settings.telemetry)?;

            let client = CatalogClient::from_settings(&settings.client);
            tracing::debug!(
                command = command.name(),
                api_url = client.base_url(),
                "running client command"
            );
            run_client(command, &client).await
        }
    }
}

async fn run_client(command: Commands, client: &CatalogClient) -> anyhow::Result<()> {
    match command {
        Commands::Status => {
            println!("{}", client.status().await?);
        }
        Commands::List { busca, ordem } => {
            let mut view = ListView::new();
            view.load(client).await;
            if view.has_load_error() {
                anyhow::bail!(MSG_ERRO_CARREGAR);
            }
            view.set_search(busca.unwrap_or_default());
            view.set_order(ordem);
            print_list(&view);
        }
        Commands::Show { id } => {
            let livro = client.get(id).await?;
            print_details(&livro);
        }
        Commands::Add(args) => {
            let mut view = CreateView::new();
            for (field, value) in args.fields() {
                view.set_field(field, value);
            }
            if view.submit(client).await? == SubmitOutcome::Invalid {
                anyhow::bail!("{}", view.form().errors());
            }
            match view.created_id() {
                Some(id) => println!("Livro criado (id {id})"),
                None => println!("Livro criado"),
            }
        }
        Commands::Edit { id, changes } => {
            let mut view = EditView::new(id);
            view.load(client).await;
            if let Some(message) = view.load_error() {
                anyhow::bail!(message);
            }
            for (field, value) in changes.fields() {
                view.set_field(field, value);
            }
            match view.submit(client).await? {
                SubmitOutcome::Saved => println!("Livro atualizado"),
                SubmitOutcome::Invalid => anyhow::bail!("{}", view.form().errors()),
                SubmitOutcome::NotReady => anyhow::bail!("livro {id} não está pronto para edição"),
            }
        }
        Commands::Delete { id, yes } => {
            let mut view = ListView::new();
            view.load(client).await;
            if view.has_load_error() {
                anyhow::bail!(MSG_ERRO_CARREGAR);
            }
            let Some(livro) = view.livros().iter().find(|livro| livro.id == id).cloned() else {
                anyhow::bail!("Livro não encontrado");
            };

            view.request_delete(&livro);
            if !yes && !confirm(&format!("Excluir \"{}\"? [s/N] ", livro.titulo))? {
                view.cancel_delete();
                println!("Exclusão cancelada");
                return Ok(());
            }

            view.confirm_delete(client).await?;
            println!("Livro deletado");
        }
        Commands::Serve | Commands::Migrate => anyhow::bail!("not a client command"),
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "s" | "S" | "sim"))
}

fn print_list(view: &ListView) {
    if let Some(message) = view.empty_message() {
        println!("{message}");
    }
    for livro in view.visible() {
        println!(
            "#{:<4} {} - {} | {} | {} | {}",
            livro.id,
            livro.titulo,
            livro.autor,
            livro.editora_ou_ausente(),
            format_date(livro.data_publicacao),
            format_price(livro.preco),
        );
    }

    println!("{}", summary_line(view));
}

fn summary_line(view: &ListView) -> String {
    let stats = view.stats();
    format!(
        "Resultados: {} | Total: {} | Valor total: {}",
        livros_label(view.visible().len()),
        livros_label(stats.total),
        format_price(stats.total_price)
    )
}

fn print_details(livro: &Livro) {
    println!("Título:     {}", livro.titulo);
    println!("Autor:      {}", livro.autor);
    println!("Editora:    {}", livro.editora_ou_ausente());
    println!("Publicação: {}", format_date(livro.data_publicacao));
    println!("Preço:      {}", format_price(livro.preco));
}
