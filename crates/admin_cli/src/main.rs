//! Admin utilities for Moneta (bootstrap users without going through the
//! HTTP API).

use std::error::Error;

use clap::{Args, Parser, Subcommand};
use migration::MigratorTrait;
use sea_orm::{ActiveValue, Database, EntityTrait};

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "moneta_admin")]
#[command(about = "Admin utilities for Moneta (bootstrap users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./moneta.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => create_user(&db, args).await?,
        },
    }

    Ok(())
}

async fn create_user(
    db: &sea_orm::DatabaseConnection,
    args: UserCreateArgs,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let username = args.username.trim().to_string();
    if username.is_empty() {
        return Err("username must not be empty".into());
    }

    let exists = users::Entity::find_by_id(username.clone())
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(format!("user '{username}' already exists").into());
    }

    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        return Err("passwords do not match".into());
    }
    if password.is_empty() {
        return Err("password must not be empty".into());
    }

    let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    let user = users::ActiveModel {
        username: ActiveValue::Set(username.clone()),
        password: ActiveValue::Set(hash),
    };
    users::Entity::insert(user).exec(db).await?;

    println!("created user '{username}'");
    Ok(())
}
