//! Subcommands and their rendering

use clap::{Args as ClapArgs, Subcommand};
use patotas_core::config::Config;
use patotas_core::core_identity::{IdentityError, IdentityProvider, LocalIdentityProvider, Session};
use patotas_core::core_patota::{
    Access, PatotaError, PatotaId, PatotaServices, PatotaSqlStore, Severity, UserNotice,
};
use patotas_core::storage::open_pool;
use secrecy::SecretString;
use std::fmt::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(ClapArgs, Clone)]
pub struct Credentials {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a new account
    SignUp {
        #[command(flatten)]
        credentials: Credentials,

        /// Name shown on rosters
        #[arg(long)]
        name: String,
    },

    /// Create a patota and print its invite code
    Create {
        #[command(flatten)]
        credentials: Credentials,

        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Join a patota with an invite code
    Join {
        #[command(flatten)]
        credentials: Credentials,

        code: String,
    },

    /// Show one patota
    Show {
        #[command(flatten)]
        credentials: Credentials,

        id: String,
    },

    /// List a patota's members, highest score first
    Members {
        #[command(flatten)]
        credentials: Credentials,

        id: String,
    },

    /// List the patotas you belong to
    List {
        #[command(flatten)]
        credentials: Credentials,
    },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Patota(#[from] PatotaError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Access denied")]
    AccessDenied,
}

impl CommandError {
    pub fn notice(&self) -> UserNotice {
        match self {
            CommandError::Patota(e) => UserNotice::from(e),
            CommandError::Identity(e) => UserNotice::from(e),
            CommandError::AccessDenied => UserNotice {
                severity: Severity::Error,
                title: "Access denied".to_string(),
                description: "You are not a member of this patota.".to_string(),
            },
        }
    }
}

/// One line per notice: `Title: description`
pub fn render_notice(notice: &UserNotice) -> String {
    format!("{}: {}", notice.title, notice.description)
}

/// Identity provider and services over the configured database
pub struct Context {
    identity: Arc<LocalIdentityProvider>,
    services: PatotaServices,
}

impl Context {
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let pool = open_pool(&config.store)?;
        let identity = Arc::new(LocalIdentityProvider::new(pool.clone(), &config.identity)?);
        let services =
            PatotaServices::new(Arc::new(PatotaSqlStore::new(pool)), identity.clone(), config);
        Ok(Self { identity, services })
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, CommandError> {
        let password = SecretString::new(credentials.password.clone());
        let session = self.identity.sign_in(&credentials.email, &password).await?;
        debug!(user_id = %session.user_id(), "Signed in for command");
        Ok(session)
    }

    async fn granted(&self, session: &Session, raw_id: &str) -> Result<Access, CommandError> {
        let id: PatotaId = raw_id
            .parse()
            .map_err(|_| PatotaError::unknown_patota(raw_id))?;
        match self.services.access.resolve_access(session, &id).await? {
            Access::Denied => Err(CommandError::AccessDenied),
            granted => Ok(granted),
        }
    }

    /// Run a command and return what should be printed
    pub async fn execute(&self, command: Command) -> Result<String, CommandError> {
        match command {
            Command::SignUp { credentials, name } => {
                let password = SecretString::new(credentials.password);
                let identity = self
                    .identity
                    .sign_up(&credentials.email, &password, &name)
                    .await?;
                Ok(format!(
                    "Account created for {} <{}>",
                    identity.display_name, identity.email
                ))
            }

            Command::Create {
                credentials,
                name,
                description,
            } => {
                let session = self.sign_in(&credentials).await?;
                let patota = self
                    .services
                    .membership
                    .create_patota(&session, &name, description.as_deref())
                    .await?;
                Ok(format!(
                    "{}\nid: {}",
                    render_notice(&UserNotice::created(&patota)),
                    patota.id
                ))
            }

            Command::Join { credentials, code } => {
                let session = self.sign_in(&credentials).await?;
                let outcome = self
                    .services
                    .membership
                    .redeem_invite_code(&session, &code)
                    .await?;
                Ok(format!(
                    "{}\nid: {}",
                    render_notice(&UserNotice::joined(&outcome)),
                    outcome.patota().id
                ))
            }

            Command::Show { credentials, id } => {
                let session = self.sign_in(&credentials).await?;
                let access = self.granted(&session, &id).await?;
                let show_code = access.can_view_invite_code();

                let mut out = String::new();
                if let Access::Granted { patota, role } = access {
                    let _ = writeln!(out, "{}", patota.name);
                    if let Some(description) = &patota.description {
                        let _ = writeln!(out, "{}", description);
                    }
                    let _ = writeln!(out, "role: {}", role);
                    if show_code {
                        let _ = writeln!(out, "invite code: {}", patota.invite_code);
                    }
                    let _ = write!(out, "id: {}", patota.id);
                }
                Ok(out)
            }

            Command::Members { credentials, id } => {
                let session = self.sign_in(&credentials).await?;
                let access = self.granted(&session, &id).await?;
                let Access::Granted { patota, .. } = access else {
                    return Err(CommandError::AccessDenied);
                };

                let roster = self.services.roster.list_members(&patota.id).await?;
                let lines: Vec<String> = roster
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        format!(
                            "{:>3}. {} ({}) {}",
                            i + 1,
                            entry.display_name,
                            entry.role,
                            entry.score
                        )
                    })
                    .collect();
                Ok(lines.join("\n"))
            }

            Command::List { credentials } => {
                let session = self.sign_in(&credentials).await?;
                let patotas = self.services.membership.list_my_patotas(&session).await?;
                if patotas.is_empty() {
                    return Ok("You are not in any patota yet.".to_string());
                }

                let lines: Vec<String> = patotas
                    .iter()
                    .map(|p| format!("{} [{}] {}", p.name, p.role, p.id))
                    .collect();
                Ok(lines.join("\n"))
            }
        }
    }
}
