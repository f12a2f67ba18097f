// ABOUTME: Shared server resources handed to every route group
// ABOUTME: Bundles the database handle, the auth manager and the loaded configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;

/// Resources shared across handlers, created once at startup
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Token issuing and validation
    pub auth_manager: AuthManager,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Bundle resources
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, config: ServerConfig) -> Self {
        Self {
            database,
            auth_manager,
            config: Arc::new(config),
        }
    }
}
