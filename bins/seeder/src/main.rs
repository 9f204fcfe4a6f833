//! Database seeder for Remesa development and testing.
//!
//! Seeds an administrator and two funded retail users. Re-running is safe:
//! users that already exist are skipped.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use remesa_core::account::AccountService;
use remesa_core::auth::{AuthError, LockoutPolicy, LoginService};
use remesa_db::entities::accounts;
use remesa_db::{AccountRepository, UserRepository};
use remesa_shared::auth::Role;
use remesa_shared::config::LoggingConfig;
use remesa_shared::{AppConfig, JwtService};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo password shared by every seeded user.
const DEMO_PASSWORD: &str = "remesa-demo";

struct DemoUser {
    email: &'static str,
    role: Role,
    opening_balance: Option<i64>,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "admin@remesa.dev",
        role: Role::Admin,
        opening_balance: None,
    },
    DemoUser {
        email: "ana@remesa.dev",
        role: Role::Normal,
        opening_balance: Some(12_000),
    },
    DemoUser {
        email: "luis@remesa.dev",
        role: Role::Normal,
        opening_balance: Some(3_000),
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!("connecting to database");
    let db = remesa_db::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let logins = LoginService::new(
        Arc::new(UserRepository::new(db.clone())),
        Arc::new(JwtService::new(&config.jwt)),
        LockoutPolicy::from(&config.lockout),
    );
    let accounts = AccountService::new(Arc::new(AccountRepository::new(db.clone())));

    for demo in &DEMO_USERS {
        seed_user(&db, &logins, &accounts, demo).await?;
    }

    tracing::info!("seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn seed_user(
    db: &DatabaseConnection,
    logins: &LoginService<UserRepository, JwtService>,
    accounts: &AccountService<AccountRepository>,
    demo: &DemoUser,
) -> anyhow::Result<()> {
    let profile = match logins
        .register_user(demo.email, DEMO_PASSWORD, demo.role)
        .await
    {
        Ok(profile) => profile,
        Err(AuthError::EmailTaken(_)) => {
            tracing::info!(email = demo.email, "user already exists, skipping");
            return Ok(());
        }
        Err(e) => return Err(e).context("failed to register demo user"),
    };

    let Some(balance) = demo.opening_balance else {
        return Ok(());
    };

    let account = accounts
        .create_account(profile.id)
        .await
        .context("failed to open demo account")?;

    // Opening balances bypass the transfer engine; there is no funding source.
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        balance: Set(Decimal::from(balance)),
        ..Default::default()
    }
    .update(db)
    .await
    .context("failed to fund demo account")?;

    tracing::info!(
        email = demo.email,
        account_id = %account.id,
        balance,
        "seeded funded account"
    );
    Ok(())
}
