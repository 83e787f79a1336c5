use std::path::PathBuf;
use std::time::Duration;

use chefai::{
    ClientConfig, ClientError, ClientState, Collection, Entity, EntityKind, Gated, ToggleKind, ToggleOutcome,
    Verification, share_url,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("not logged in; run `chefai login` first")]
    NotLoggedIn,
    #[error("{0}")]
    Refused(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "chefai", about = "Recipe and meal-plan client")]
struct Cli {
    #[arg(long, env = "CHEFAI_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "CHEFAI_STORAGE_PATH")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CHEFAI_PASSWORD")]
        password: String,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CHEFAI_PASSWORD")]
        password: String,
    },
    Logout,
    /// Verify the stored session and print the user.
    Whoami,
    Like {
        kind: KindArg,
        id: String,
        /// Remove an existing like instead of adding one.
        #[arg(long)]
        unlike: bool,
    },
    Save {
        kind: KindArg,
        id: String,
        /// Remove from saved instead of saving.
        #[arg(long)]
        unsave: bool,
    },
    /// List saved recipes and meal plans.
    Saved,
    Delete {
        kind: KindArg,
        id: String,
    },
    Generate {
        #[arg(long, help = "Form fields as a JSON object")]
        data: String,
    },
    /// Suggest recipe titles for a form.
    Titles {
        #[arg(long, help = "Form fields as a JSON object; needs a \"query\"")]
        data: String,
    },
    /// Generate the full recipe for one suggested title.
    Recipe {
        #[arg(long, help = "Form fields as a JSON object; needs a \"query\"")]
        data: String,
        #[arg(long)]
        title: String,
    },
    /// List the public recipe catalog.
    Catalog,
    /// Print one catalog recipe.
    Show {
        id: String,
    },
    Share {
        id: String,
        #[arg(long, default_value = "http://localhost:5173")]
        origin: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Recipe,
    Generated,
    MealPlan,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Recipe => Self::Recipe,
            KindArg::Generated => Self::GeneratedRecipe,
            KindArg::MealPlan => Self::MealPlan,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = chefai::config::normalize_api_url(&api_url)?;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    // One-shot process: nothing is left running to perform delayed redirects.
    config.redirect_delay = Duration::ZERO;
    config.login_redirect_delay = Duration::ZERO;

    let state = ClientState::from_config(config)?;
    let result = run(&state, cli.command).await;
    for notice in state.notices.drain() {
        eprintln!("{}", notice.text);
    }
    result
}

async fn run(state: &ClientState, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let user = state.auth().login(&email, &password).await?;
            println!("logged in as {} <{}>", user.name, user.email);
            Ok(())
        }
        Command::Signup { name, email, password } => {
            state.auth().signup(&name, &email, &password).await?;
            Ok(())
        }
        Command::Logout => {
            state.auth().logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(state).await,
        Command::Like { kind, id, unlike } => {
            run_toggle(state, seeded(kind.into(), &id, ToggleKind::Like, unlike), &id, ToggleKind::Like).await
        }
        Command::Save { kind, id, unsave } => {
            run_toggle(state, seeded(kind.into(), &id, ToggleKind::Save, unsave), &id, ToggleKind::Save).await
        }
        Command::Saved => run_saved(state).await,
        Command::Delete { kind, id } => {
            let collection = Collection::new(kind.into(), vec![Entity::new(id.clone())]);
            gated(state.delete_saved(&collection, &id).await)??;
            Ok(())
        }
        Command::Generate { data } => {
            let form = serde_json::from_str::<serde_json::Value>(&data)?;
            let generated = gated(state.generate_meal_plan(&form).await)??;
            println!("{}", serde_json::to_string_pretty(&generated.plan)?);
            println!("meal plan id: {}", generated.id);
            Ok(())
        }
        Command::Titles { data } => {
            let form = serde_json::from_str::<serde_json::Value>(&data)?;
            for title in gated(state.suggest_recipes(&form).await)?? {
                println!("{title}");
            }
            Ok(())
        }
        Command::Recipe { data, title } => {
            let form = serde_json::from_str::<serde_json::Value>(&data)?;
            let generated = gated(state.generate_recipe(&form, &title).await)??;
            println!("{}", serde_json::to_string_pretty(&generated.recipe)?);
            println!("recipe id: {}", generated.id);
            Ok(())
        }
        Command::Catalog => {
            let recipes = state.load_catalog().await?;
            for entity in recipes.snapshot() {
                let title = entity.title.as_deref().unwrap_or("(untitled)");
                println!("  {}  {title}  likes={}", entity.id, entity.likes.unwrap_or(0));
            }
            Ok(())
        }
        Command::Show { id } => {
            let recipe = state.open_recipe(&id).await?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
            Ok(())
        }
        Command::Share { id, origin } => {
            println!("{}", share_url(&origin, &id));
            Ok(())
        }
    }
}

async fn run_whoami(state: &ClientState) -> Result<(), CliError> {
    match state.verifier().reconcile().await {
        Verification::Valid(Some(user)) => {
            println!("{} <{}>", user.name, user.email);
            println!("avatar: {}", user.avatar_url());
            Ok(())
        }
        Verification::Valid(None) => {
            println!("session valid");
            Ok(())
        }
        Verification::Invalid => Err(CliError::NotLoggedIn),
        Verification::NetworkError => Err(CliError::Refused("could not reach the server".to_owned())),
    }
}

/// The CLI has no list view; `--unlike`/`--unsave` state that the flag is
/// currently set, so the toggle asks the server to clear it.
fn seeded(entity: EntityKind, id: &str, kind: ToggleKind, current: bool) -> Collection {
    let mut seed = Entity::new(id);
    match kind {
        ToggleKind::Like => seed.liked = current,
        ToggleKind::Save => seed.saved = current,
    }
    Collection::new(entity, vec![seed])
}

async fn run_toggle(state: &ClientState, collection: Collection, id: &str, kind: ToggleKind) -> Result<(), CliError> {
    let entity = collection.kind();
    match gated(state.toggle(&collection, id, kind).await)? {
        ToggleOutcome::Resolved(value) => {
            println!("{} {id}: {}={value}", entity.label(), kind.label());
            Ok(())
        }
        ToggleOutcome::RolledBack(e) => Err(e.into()),
        ToggleOutcome::Ignored(reason) => Err(CliError::Refused(format!("toggle ignored: {reason:?}"))),
        ToggleOutcome::Discarded => Ok(()),
    }
}

async fn run_saved(state: &ClientState) -> Result<(), CliError> {
    let saved = gated(state.fetch_saved().await)??;
    for (label, collection) in [("recipes", &saved.recipes), ("meal plans", &saved.meal_plans)] {
        println!("saved {label} ({}):", collection.len());
        for entity in collection.snapshot() {
            let title = entity.title.as_deref().unwrap_or("(untitled)");
            println!("  {}  {title}", entity.id);
        }
    }
    Ok(())
}

fn gated<R>(outcome: Gated<R>) -> Result<R, CliError> {
    outcome.ran().ok_or(CliError::NotLoggedIn)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
