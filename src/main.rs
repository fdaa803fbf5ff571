//! Postboard - Users & Posts Board
//!
//! Serve the in-memory service, or manage its lists from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Run the service with seed data
//! postboard serve --bind 127.0.0.1:3001
//!
//! # Browse
//! postboard posts list --search qui --page 1
//!
//! # Mutate
//! postboard users create --name "Ada" --username ada --email ada@example.com
//! postboard users delete 2 3 --yes
//! ```

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use postboard::config::{
    AppConfig, API_URL_DEFAULT, ENV_API_URL, ENV_BIND, ENV_TIMEOUT_MS,
    HTTP_BIND_ADDRESS_DEFAULT, HTTP_TIMEOUT_MS_DEFAULT,
};
use postboard::render::{render_list, Columns};
use postboard::{
    api, AppState, ListController, NewPost, NewUser, Post, PostPatch, RemoteClient, User,
    UserDirectory, UserPatch, APP_NAME, APP_VERSION,
};

// =============================================================================
// CLI
// =============================================================================

/// Users & posts board: in-memory CRUD service and list client
#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(about = "In-memory users/posts service with a list-management client")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Base URL of the service the client commands talk to
    #[arg(long, env = ENV_API_URL, default_value = API_URL_DEFAULT, global = true)]
    api_url: String,

    /// Overall timeout for one client request, in milliseconds
    #[arg(long, env = ENV_TIMEOUT_MS, default_value_t = HTTP_TIMEOUT_MS_DEFAULT, global = true)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service with seed data
    Serve {
        /// HTTP bind address
        #[arg(short, long, env = ENV_BIND, default_value = HTTP_BIND_ADDRESS_DEFAULT)]
        bind: String,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage posts
    Posts {
        #[command(subcommand)]
        action: PostAction,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    /// Show one page of users
    List(ListArgs),
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    /// Change some fields of a user
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete one user, or several as a bulk delete
    Delete(DeleteArgs),
}

#[derive(Subcommand, Debug)]
enum PostAction {
    /// Show one page of posts
    List(ListArgs),
    /// Create a post
    Create {
        /// Author's user id
        #[arg(long)]
        user_id: u64,
        #[arg(long)]
        title: String,
    },
    /// Retitle a post
    Update {
        id: u64,
        #[arg(long)]
        title: String,
    },
    /// Delete one post, or several as a bulk delete
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Case-insensitive search text
    #[arg(short, long, default_value = "")]
    search: String,

    /// Page to show, 1-based
    #[arg(short, long, default_value_t = 1)]
    page: usize,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    /// Ids to delete
    #[arg(required = true)]
    ids: Vec<u64>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "info,tower_http=debug",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let bind = match &cli.command {
        Commands::Serve { bind } => bind.as_str(),
        _ => HTTP_BIND_ADDRESS_DEFAULT,
    };
    let config = AppConfig::new(bind, &cli.api_url, cli.timeout_ms)?;

    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!("Postboard v{}", APP_VERSION);
            tracing::info!("Starting HTTP server on {}", config.bind);

            let listener = tokio::net::TcpListener::bind(config.bind).await?;
            api::serve(listener, AppState::seeded()).await?;
        }
        Commands::Users { action } => {
            let client = RemoteClient::with_timeout(&config.api_url, config.timeout)?;
            run_users(client, action).await?;
        }
        Commands::Posts { action } => {
            let client = RemoteClient::with_timeout(&config.api_url, config.timeout)?;
            run_posts(client, action).await?;
        }
    }

    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

async fn run_users(client: RemoteClient, action: UserAction) -> anyhow::Result<()> {
    let directory = UserDirectory::default();
    match action {
        UserAction::List(args) => list::<User>(client, directory, args).await,
        UserAction::Create {
            name,
            username,
            email,
        } => {
            let draft = NewUser {
                name,
                username,
                email,
            };
            let user = create::<User>(client, directory, draft).await?;
            println!("Created user {} (@{})", user.id, user.username);
            Ok(())
        }
        UserAction::Update {
            id,
            name,
            username,
            email,
        } => {
            let patch = UserPatch {
                name,
                username,
                email,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update: pass --name, --username or --email");
            }
            update::<User>(client, directory, id, patch).await?;
            Ok(())
        }
        UserAction::Delete(args) => delete::<User>(client, directory, args).await,
    }
}

async fn run_posts(client: RemoteClient, action: PostAction) -> anyhow::Result<()> {
    let directory = load_directory(&client).await;
    match action {
        PostAction::List(args) => list::<Post>(client, directory, args).await,
        PostAction::Create { user_id, title } => {
            let author = directory
                .option_label(user_id)
                .unwrap_or_else(|| directory.author_label(user_id).into_owned());
            let post = create::<Post>(client, directory, NewPost { user_id, title }).await?;
            println!("Created post {} by {}", post.id, author);
            Ok(())
        }
        PostAction::Update { id, title } => {
            let patch = PostPatch { title: Some(title) };
            update::<Post>(client, directory, id, patch).await?;
            Ok(())
        }
        PostAction::Delete(args) => delete::<Post>(client, directory, args).await,
    }
}

/// Users for author names; an unreachable user list degrades to id labels.
async fn load_directory(client: &RemoteClient) -> UserDirectory {
    match client.fetch::<User>().await {
        Ok(users) => UserDirectory::from_users(&users),
        Err(e) => {
            tracing::warn!(error = %e, "author names unavailable");
            UserDirectory::default()
        }
    }
}

async fn open_list<E: Columns>(
    client: RemoteClient,
    directory: UserDirectory,
) -> anyhow::Result<ListController<E, RemoteClient>> {
    let mut controller = ListController::new(client);
    controller.set_directory(directory);
    if let Err(e) = controller.refetch().await {
        eprint!("{}", render_list(&controller));
        return Err(e.into());
    }
    Ok(controller)
}

async fn list<E: Columns>(
    client: RemoteClient,
    directory: UserDirectory,
    args: ListArgs,
) -> anyhow::Result<()> {
    let mut controller = open_list::<E>(client, directory).await?;
    controller.set_search(args.search);
    controller.set_page(args.page);
    print!("{}", render_list(&controller));
    Ok(())
}

async fn create<E: Columns>(
    client: RemoteClient,
    directory: UserDirectory,
    draft: E::Draft,
) -> anyhow::Result<E> {
    let mut controller = open_list::<E>(client, directory).await?;
    let result = controller.create(draft).await;
    print!("{}", render_list(&controller));
    Ok(result?)
}

async fn update<E: Columns>(
    client: RemoteClient,
    directory: UserDirectory,
    id: u64,
    patch: E::Patch,
) -> anyhow::Result<E> {
    let mut controller = open_list::<E>(client, directory).await?;
    let result = controller.update(id, patch).await;
    print!("{}", render_list(&controller));
    Ok(result?)
}

async fn delete<E: Columns>(
    client: RemoteClient,
    directory: UserDirectory,
    args: DeleteArgs,
) -> anyhow::Result<()> {
    let mut controller = open_list::<E>(client, directory).await?;

    match args.ids.as_slice() {
        [id] => controller.request_delete(*id),
        ids => {
            for &id in ids {
                if !controller.is_selected(id) {
                    controller.toggle_selection(id);
                }
            }
            controller.request_bulk_delete();
        }
    }

    if !args.yes {
        if let Some(prompt) = controller.confirmation_prompt() {
            println!("{prompt} [y/N]");
        }
        if !confirmed().await? {
            controller.cancel_delete();
            println!("Cancelled.");
            return Ok(());
        }
    }

    let result = controller.confirm_delete().await;
    print!("{}", render_list(&controller));
    Ok(result?)
}

async fn confirmed() -> anyhow::Result<bool> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    let answer = line.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
