// ABOUTME: Administrative setup utility for bootstrapping back-office accounts
// ABOUTME: Command-line interface that creates users and grants them admin roles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Bootstrap admins for the salon booking server. The first super admin has
//! to be created here; afterwards super admins can promote users over HTTP.
//!
//! Usage:
//! ```bash
//! # Create a super admin with a fresh account
//! cargo run --bin admin-setup -- create-admin-user --email admin@example.com --password s3cretpass
//!
//! # Promote an existing user to moderator
//! cargo run --bin admin-setup -- promote --email staff@example.com --role moderator
//! ```

use std::env;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use salon_booking_server::{
    auth::hash_password,
    constants::env_config,
    database::Database,
    models::{AdminRole, NewAdminUser, User},
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "admin-setup",
    about = "Salon Booking Server admin management",
    long_about = "Create back-office accounts for the Salon Booking Server. Admin roles gate statistics, moderation and bulk deletes."
)]
struct AdminSetupArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create a user (or reuse an existing one) and grant an admin role
    CreateAdminUser {
        /// Admin email
        #[arg(long)]
        email: String,

        /// Password for a new account, ignored when the user exists
        #[arg(long)]
        password: String,

        /// Display name for a new account
        #[arg(long, default_value = "Salon Admin")]
        name: String,

        /// Role to grant
        #[arg(long, default_value = "super_admin")]
        role: AdminRole,
    },

    /// Grant an admin role to an existing user
    Promote {
        /// Email of the user to promote
        #[arg(long)]
        email: String,

        /// Role to grant
        #[arg(long, default_value = "admin")]
        role: AdminRole,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminSetupArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file found or failed to load: {e}");
    }

    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(env_config::database_url);

    info!("Connecting to database: {database_url}");
    let database = Database::new(&database_url, 1).await?;

    match args.command {
        AdminCommand::CreateAdminUser {
            email,
            password,
            name,
            role,
        } => create_admin_user_command(&database, &email, &password, name, role).await,
        AdminCommand::Promote { email, role } => promote_command(&database, &email, role).await,
    }
}

async fn create_admin_user_command(
    database: &Database,
    email: &str,
    password: &str,
    name: String,
    role: AdminRole,
) -> Result<()> {
    let user = if let Some(existing) = database.users().get_by_email(email).await? {
        info!("User {} already exists, reusing account", existing.email);
        existing
    } else {
        if password.len() < 8 {
            return Err(anyhow!("Password must be at least 8 characters"));
        }
        let user = User::new(email, hash_password(password)?, Some(name));
        database.users().create(&user).await?;
        info!("Created user {} ({})", user.email, user.id);
        user
    };

    grant_role(database, &user, role).await
}

async fn promote_command(database: &Database, email: &str, role: AdminRole) -> Result<()> {
    let user = database
        .users()
        .get_by_email(email)
        .await?
        .ok_or_else(|| anyhow!("No user registered with email {email}"))?;

    grant_role(database, &user, role).await
}

async fn grant_role(database: &Database, user: &User, role: AdminRole) -> Result<()> {
    if let Some(admin) = database.admin().get_by_user(user.id).await? {
        warn!(
            "User {} is already an admin with role {}",
            user.email, admin.role
        );
        return Ok(());
    }

    let admin = database
        .admin()
        .create(NewAdminUser {
            user_id: user.id,
            role,
            permissions: Vec::new(),
        })
        .await?;

    info!("Granted role {} to {} (admin id {})", admin.role, user.email, admin.id);
    Ok(())
}
