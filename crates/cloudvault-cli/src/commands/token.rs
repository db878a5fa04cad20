//! Development identity token command.

use chrono::Duration;
use clap::Args;
use uuid::Uuid;

use cloudvault_auth::{JwtIdentityProvider, VerifiedIdentity};
use cloudvault_core::config::AppConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::types::{TenantId, UserId};
use cloudvault_entity::principal::Role;

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Subject user ID; a new one is generated when omitted
    #[arg(long)]
    pub user: Option<Uuid>,

    /// Tenant ID
    #[arg(long)]
    pub tenant: Uuid,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Role claim
    #[arg(long, value_enum, default_value = "teammate")]
    pub role: RoleArg,

    /// Lifetime in hours
    #[arg(long, default_value_t = 12)]
    pub hours: i64,
}

/// Role accepted on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum RoleArg {
    /// Platform administrator
    PlatformAdmin,
    /// Tenant administrator
    TenantAdmin,
    /// Regular member acting through policies
    Teammate,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::PlatformAdmin => Role::PlatformAdmin,
            RoleArg::TenantAdmin => Role::TenantAdmin,
            RoleArg::Teammate => Role::Teammate,
        }
    }
}

/// Execute the token command
pub fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    if args.hours <= 0 {
        return Err(AppError::validation("--hours must be positive"));
    }
    let identity = VerifiedIdentity {
        id: args.user.map(UserId::from_uuid).unwrap_or_default(),
        email: args.email.clone(),
        role: args.role.into(),
        tenant_id: TenantId::from_uuid(args.tenant),
    };
    let provider = JwtIdentityProvider::new(&config.auth);
    let token = provider.issue(&identity, Duration::hours(args.hours))?;
    println!("{token}");
    Ok(())
}
