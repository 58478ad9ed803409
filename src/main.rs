use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;

use pne_admin::{
    application::{Dashboard, ExportFormat, ResourceStore},
    domain::{DomainError, Filter, LoginRequest, Navigation, Resource, Route},
    infrastructure::{
        adapters::memory::fixtures,
        bootstrap,
        cli::{build_filter, format_table, Cli, Commands, ListArgs, ResourceKind},
        telemetry, AppConfig,
    },
};

/// Binds `$store` to the store for `$kind` and evaluates `$body` with it.
macro_rules! with_store {
    ($dashboard:expr, $kind:expr, |$store:ident| $body:expr) => {
        match $kind {
            ResourceKind::Locations => { let $store = &$dashboard.locations; $body }
            ResourceKind::Contacts => { let $store = &$dashboard.contacts; $body }
            ResourceKind::Feedback => { let $store = &$dashboard.feedback; $body }
            ResourceKind::Inquiries => { let $store = &$dashboard.inquiries; $body }
            ResourceKind::Users => { let $store = &$dashboard.users; $body }
            ResourceKind::Events => { let $store = &$dashboard.events; $body }
            ResourceKind::Gallery => { let $store = $dashboard.gallery.images(); $body }
            ResourceKind::Notifications => { let $store = &$dashboard.notifications; $body }
            ResourceKind::TeamMembers => { let $store = &$dashboard.team_members; $body }
            ResourceKind::Milestones => { let $store = &$dashboard.milestones; $body }
        }
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let mut config = AppConfig::from_env();
    if cli.offline {
        config.offline = true;
    }

    let dashboard = if config.offline {
        bootstrap::offline(&config)?
    } else {
        bootstrap::connect(&config)?
    };

    if let Err(e) = run(cli.command, &dashboard, config.offline).await {
        eprintln!("Error: {}", e);
        if matches!(e, DomainError::MissingCredential | DomainError::Unauthorized(_)) {
            eprintln!("Sign in with `pne-admin login --email <EMAIL> --password <PASSWORD>`");
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, dashboard: &Dashboard, offline: bool) -> Result<(), DomainError> {
    match command {
        Commands::Login { email, password } => {
            let user = dashboard.auth.login(LoginRequest::new(email, password)).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }

        Commands::Logout => {
            dashboard.auth.logout().await?;
            println!("Signed out");
        }

        Commands::Whoami => {
            if offline {
                sign_in_demo(dashboard).await?;
            }
            dashboard.auth.initialize().await?;
            match dashboard.auth.user() {
                Some(user) => {
                    println!("{} <{}>", user.name, user.email);
                    if let Some(role) = user.role {
                        println!("Role: {}", role);
                    }
                }
                None => println!("Not signed in"),
            }
        }

        Commands::List {
            resource,
            search,
            status,
            filter,
            sort_by,
            desc,
            page,
            per_page,
        } => {
            require_session(dashboard, resource.route(), offline).await?;
            let filter = build_filter(ListArgs {
                search,
                status,
                filter,
                sort_by,
                desc,
                page,
                per_page,
            })?;
            with_store!(dashboard, resource, |store| list(store, &filter).await)?;
        }

        Commands::Get { resource, id } => {
            require_session(dashboard, resource.route(), offline).await?;
            with_store!(dashboard, resource, |store| show(store, &id).await)?;
        }

        Commands::Delete { resource, id } => {
            require_session(dashboard, resource.route(), offline).await?;
            with_store!(dashboard, resource, |store| store.delete(&id).await)?;
            println!("Deleted {}", id);
        }

        Commands::Export { resource, format } => {
            let format: ExportFormat = format.parse()?;
            require_session(dashboard, resource.route(), offline).await?;
            let path = with_store!(dashboard, resource, |store| {
                export(dashboard, store, format).await
            })?;
            println!("Exported to {}", path.display());
        }

        Commands::Stats => {
            require_session(dashboard, "/", offline).await?;
            let summary = dashboard.refresh().await?;
            println!("Locations:      {} ({} active)", summary.locations, summary.active_locations);
            println!("Contacts:       {} ({} pending)", summary.contacts, summary.pending_contacts);
            println!("Feedback:       {} (average rating {:.1})", summary.feedback, summary.average_rating);
            println!("Inquiries:      {} ({} new)", summary.inquiries, summary.new_inquiries);
            println!("Users:          {}", summary.users);
            println!("Events:         {} ({} upcoming)", summary.events, summary.upcoming_events);
            println!("Gallery images: {}", summary.images);
            println!("Notifications:  {} unread", summary.unread_notifications);
            println!("Team members:   {}", summary.team_members);
            println!("Milestones:     {}", summary.milestones);
        }

        Commands::Settings => {
            let settings = dashboard.settings.load().await?;
            let text = serde_json::to_string_pretty(&settings)
                .map_err(|e| DomainError::Decode(e.to_string()))?;
            println!("{}", text);
        }
    }

    Ok(())
}

/// Offline data needs no real account, so the demo operator is signed in.
async fn sign_in_demo(dashboard: &Dashboard) -> Result<(), DomainError> {
    if !dashboard.auth.is_authenticated() {
        dashboard
            .auth
            .login(LoginRequest::new(fixtures::DEMO_EMAIL, fixtures::DEMO_PASSWORD))
            .await?;
    }
    Ok(())
}

async fn require_session(dashboard: &Dashboard, path: &str, offline: bool) -> Result<(), DomainError> {
    if offline {
        sign_in_demo(dashboard).await?;
    }
    match dashboard.auth.guard(&Route::protected(path)).await? {
        Navigation::RedirectToLogin { .. } => Err(DomainError::MissingCredential),
        _ => Ok(()),
    }
}

async fn list<R: Resource>(store: &ResourceStore<R>, filter: &Filter) -> Result<(), DomainError> {
    let items = store.fetch_all(filter).await?;
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            let mut row = vec![item.id().to_string()];
            row.extend(item.export_row());
            row
        })
        .collect();

    let mut headers = vec!["ID"];
    headers.extend_from_slice(R::export_headers());
    println!("{}", format_table(&headers, &rows));

    let meta = store.meta();
    println!(
        "\n{} {} (page {} of {}, {} total)",
        items.len(),
        R::NAME,
        meta.page,
        meta.total_pages.max(1),
        meta.total
    );
    Ok(())
}

async fn show<R: Resource>(store: &ResourceStore<R>, id: &str) -> Result<(), DomainError> {
    let item = store.fetch_by_id(id).await?;
    println!("ID: {}", item.id());
    for (header, value) in R::export_headers().iter().zip(item.export_row()) {
        println!("{}: {}", header, value);
    }
    Ok(())
}

async fn export<R: Resource>(
    dashboard: &Dashboard,
    store: &ResourceStore<R>,
    format: ExportFormat,
) -> Result<std::path::PathBuf, DomainError> {
    store.fetch_all(&Filter::new()).await?;
    dashboard.export(store, format).await
}
