//! Subcommand implementations.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use owo_colors::{OwoColorize, Stream};
use verbnav_backend_client::{FileSessionStore, Session, VerbnavClient};
use verbnav_backend_models::{RegisterRequest, User, UserUpdate, VerbRecord};
use verbnav_core::{NavigationMode, Navigator, TaxonomyTree};

use crate::config::AppConfig;
use crate::{
    Cli, Command, LoginArgs, OutputArgs, RegisterArgs, TreeArgs, UpdateUserArgs, UsersAction,
    UsersArgs, VerbArgs,
};

/// Runs the parsed command line to completion.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
        config.validate().context("invalid --base-url")?;
    }

    let client = client(&config)?;
    match cli.command {
        Command::Login(args) => login(&client, args).await,
        Command::Register(args) => register(&client, args).await,
        Command::Logout => logout(&client).await,
        Command::Whoami(args) => whoami(&client, args).await,
        Command::Users(args) => users(&client, args).await,
        Command::Verb(args) => verb(&client, args).await,
        Command::Tree(args) => tree(client, &config, args).await,
    }
}

fn client(config: &AppConfig) -> Result<VerbnavClient> {
    let store_path = config.session.resolved_store_path();
    tracing::debug!(path = %store_path.display(), "using session store");
    let session = Session::new(
        Arc::new(FileSessionStore::new(store_path)),
        config.session.token_key.clone(),
    );
    VerbnavClient::new(&config.backend, session).context("creating backend client")
}

async fn login(client: &VerbnavClient, args: LoginArgs) -> Result<()> {
    client
        .login(&args.email, &args.password)
        .await
        .context("login failed")?;
    println!("Logged in as {}", args.email);
    Ok(())
}

async fn register(client: &VerbnavClient, args: RegisterArgs) -> Result<()> {
    let request = RegisterRequest::new(args.name, args.level, args.email, args.password);
    client
        .register(&request)
        .await
        .context("registration failed")?;
    println!("Registered and logged in as {}", request.email);
    Ok(())
}

async fn logout(client: &VerbnavClient) -> Result<()> {
    match client.logout().await {
        Ok(response) => println!("{}", response.message),
        Err(err) => {
            warn(&format!("backend logout failed: {err}"));
            println!("Logged out locally");
        }
    }
    Ok(())
}

async fn whoami(client: &VerbnavClient, args: OutputArgs) -> Result<()> {
    if !client.session().is_authenticated() {
        bail!("not logged in (run `verbnav login` first)");
    }
    let user = client.me().await.context("fetching current user")?;
    print_users(std::slice::from_ref(&user), args.json)
}

async fn users(client: &VerbnavClient, args: UsersArgs) -> Result<()> {
    if let Some(UsersAction::Update(update)) = args.action {
        return update_user(client, update).await;
    }
    let users = match args.id {
        Some(id) => vec![client.user(id).await.with_context(|| format!("fetching user {id}"))?],
        None => client.users().await.context("listing users")?,
    };
    print_users(&users, args.output.json)
}

async fn update_user(client: &VerbnavClient, args: UpdateUserArgs) -> Result<()> {
    let update = UserUpdate {
        name: args.name,
        email: args.email,
        level: args.level,
    };
    if update.is_empty() {
        bail!("nothing to update (pass --name, --email or --level)");
    }
    let user = client
        .update_user(args.id, &update)
        .await
        .with_context(|| format!("updating user {}", args.id))?;
    print_users(std::slice::from_ref(&user), args.output.json)
}

async fn verb(client: &VerbnavClient, args: VerbArgs) -> Result<()> {
    let verb = client
        .verb(args.id)
        .await
        .with_context(|| format!("fetching verb {}", args.id))?;
    print_verb(&verb, args.output.json)
}

fn print_verb(verb: &VerbRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(verb)?);
        return Ok(());
    }
    let id = match verb.id {
        Some(id) => id.to_string(),
        None => "-".to_string(),
    };
    println!("{id}\t{}", verb.display_name().unwrap_or("-"));
    if let Some(description) = verb.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    Ok(())
}

fn print_users(users: &[User], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
        return Ok(());
    }
    for user in users {
        let level = match user.level {
            Some(level) => level.to_string(),
            None => "-".to_string(),
        };
        println!("{}\t{}\t{}\tlevel {level}", user.id, user.name, user.email);
    }
    Ok(())
}

async fn tree(client: VerbnavClient, config: &AppConfig, args: TreeArgs) -> Result<()> {
    let mode = args.mode.unwrap_or(config.navigator.mode);
    match mode {
        NavigationMode::DrillDown if !args.expand.is_empty() => {
            bail!("--expand needs --mode selective")
        }
        NavigationMode::Selective if !args.select.is_empty() => {
            bail!("--select needs --mode drill-down")
        }
        NavigationMode::Overview if !args.select.is_empty() || !args.expand.is_empty() => {
            bail!("overview mode takes neither --select nor --expand")
        }
        _ => {}
    }

    let navigator = Navigator::new(
        Arc::new(client),
        config.navigator.clone().with_mode(mode),
    );
    navigator.load().await.context("loading groups")?;
    for key in args.select {
        navigator
            .select(key)
            .await
            .with_context(|| format!("selecting {key}"))?;
    }
    for key in args.expand {
        navigator
            .expand(key)
            .await
            .with_context(|| format!("expanding {key}"))?;
    }

    let tree = navigator.tree();
    report_warnings(&tree);
    let chart = match mode {
        NavigationMode::DrillDown => tree.focused_chart(),
        NavigationMode::Selective | NavigationMode::Overview => tree.chart(),
    };
    println!("{}", chart.to_json(args.pretty)?);
    Ok(())
}

fn report_warnings(tree: &TaxonomyTree) {
    for warning in tree.warnings() {
        warn(&warning.to_string());
    }
}

fn warn(message: &str) {
    eprintln!(
        "{} {message}",
        "warning:".if_supports_color(Stream::Stderr, |t| t.yellow())
    );
}
