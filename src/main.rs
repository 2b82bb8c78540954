use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Arg, ArgMatches, Command, value_parser};
use thiserror::Error;

use pushkind_catalog_admin::forms::draft::{DraftError, ProductDraft};
use pushkind_catalog_admin::forms::products::FormField;
use pushkind_catalog_admin::models::config::{AdminConfig, ConfigLoadError};
use pushkind_catalog_admin::repository::{
    GraphQlRepository, Pagination, ProductListQuery, RepositoryError,
};
use pushkind_catalog_admin::repository::cache::ProductListingCache;
use pushkind_catalog_admin::repository::image_host::HttpImageUploader;
use pushkind_catalog_admin::routes::{LogNavigator, LogNotifier};
use pushkind_catalog_admin::services::ServiceError;
use pushkind_catalog_admin::services::products::{
    self, ProductFormSession, SessionContext, SubmitOutcome,
};
use pushkind_catalog_admin::services::account;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("product was not created: {0}")]
    Rejected(String),
}

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .global(true)
        .value_parser(value_parser!(PathBuf))
        .help("Path to a YAML configuration file");

    Command::new("pushkind-catalog-admin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Product catalog administration client")
        .subcommand_required(true)
        .arg(config_arg)
        .subcommand(
            Command::new("add-product")
                .about("Create a product from a YAML draft")
                .arg(
                    Arg::new("draft")
                        .long("draft")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Draft file with product values and image paths"),
                ),
        )
        .subcommand(
            Command::new("list-products")
                .about("List products, newest first")
                .arg(
                    Arg::new("search")
                        .long("search")
                        .help("Only products whose name contains this text"),
                )
                .arg(
                    Arg::new("discount")
                        .long("discount")
                        .help("Discount range, for example 10-20"),
                )
                .arg(
                    Arg::new("page")
                        .long("page")
                        .default_value("1")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .default_value("20")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(Command::new("whoami").about("Show the signed-in operator"))
        .subcommand(Command::new("logout").about("End the current session"))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();
    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. Every command of an invocation shares one listing cache.
async fn run(matches: &ArgMatches) -> Result<(), CliError> {
    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let config = AdminConfig::load(config_path)?;
    let repo = Arc::new(GraphQlRepository::new(
        config.graphql_url.clone(),
        config.auth_token.clone(),
        config.request_timeout(),
    )?);
    let cache = ProductListingCache::new();

    match matches.subcommand() {
        Some(("add-product", args)) => {
            let Some(draft) = args.get_one::<PathBuf>("draft") else {
                return Err(CliError::Rejected("missing --draft".to_string()));
            };
            add_product(&config, repo, cache, draft).await
        }
        Some(("list-products", args)) => {
            let query = ProductListQuery {
                search: args.get_one::<String>("search").cloned(),
                discount: args.get_one::<String>("discount").cloned(),
                pagination: Some(Pagination {
                    page: args.get_one::<usize>("page").copied().unwrap_or(1),
                    per_page: args.get_one::<usize>("per-page").copied().unwrap_or(20),
                }),
            };
            let (total, listing) = products::search_products(repo.as_ref(), query).await?;
            for product in &listing {
                println!(
                    "{}\t{}\t{}\t{}% -> {}",
                    product.id, product.sku, product.name, product.discount, product.sale_price
                );
            }
            println!("{} of {total} product(s)", listing.len());
            Ok(())
        }
        Some(("whoami", _)) => {
            let user = account::current_user(repo.as_ref()).await?;
            match user.email {
                Some(email) => println!("{} <{email}>", user.name),
                None => println!("{}", user.name),
            }
            Ok(())
        }
        Some(("logout", _)) => {
            account::logout(repo.as_ref(), &cache).await?;
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn add_product(
    config: &AdminConfig,
    repo: Arc<GraphQlRepository>,
    cache: ProductListingCache,
    draft_path: &Path,
) -> Result<(), CliError> {
    let draft = ProductDraft::load(draft_path)?;
    let files = draft.read_images(draft_path.parent().unwrap_or(Path::new(".")))?;

    let uploader = Arc::new(HttpImageUploader::new(
        config.image_upload_url.clone(),
        config.image_upload_preset.clone(),
        config.upload_timeout(),
    )?);
    let ctx = SessionContext::from_config(
        config,
        repo.clone(),
        repo.clone(),
        uploader,
        cache,
        Arc::new(LogNotifier),
        Arc::new(LogNavigator),
    );
    let mut session = ProductFormSession::open(ctx, repo.as_ref()).await?;

    let fields = [
        (FormField::Name, draft.name.clone()),
        (FormField::Description, draft.description.clone()),
        (FormField::Price, draft.price.to_string()),
        (FormField::Discount, draft.discount.to_string()),
        (FormField::Sku, draft.sku.clone()),
        (FormField::Unit, draft.unit.clone()),
    ];
    for (field, value) in fields {
        session.change(field, &value)?;
        session.blur(field);
    }
    session.select_parent(&draft.parent_category).await?;
    session.select_child(&draft.child_category)?;

    if !files.is_empty() {
        session.drop_files(files);
        for preview in session.uploads().previews() {
            log::info!("Uploading {} ({} bytes)", preview.name, preview.len());
        }
        let progress = session.settle_uploads().await;
        log::info!("Uploads finished: {progress:?}");
    }

    match session.submit().await? {
        SubmitOutcome::Submitted(product) => {
            println!("{}", product.id);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in &errors {
                log::error!("{field}: {message}");
            }
            Err(CliError::Rejected(format!("{} invalid field(s)", errors.len())))
        }
        SubmitOutcome::Blocked { outstanding } => Err(CliError::Rejected(format!(
            "{outstanding} upload(s) still running"
        ))),
        SubmitOutcome::Ignored(e) => Err(CliError::Rejected(e.to_string())),
        SubmitOutcome::Failed(message) => Err(CliError::Rejected(message)),
    }
}
