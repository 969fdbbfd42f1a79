//! Backup client commands against a running server.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::io::ReaderStream;
use tracing::warn;

use asgard_api::dto::response::UploadResponse;
use asgard_core::error::{AppError, ErrorKind};
use asgard_core::types::ContentHash;
use asgard_storage::hasher::{HASH_BLOCK_SIZE, hash_stream};

use crate::output::{self, OutputFormat};
use crate::remote::{ApiClient, ClientState, DEFAULT_SERVER};

/// Arguments for the client command
#[derive(Debug, Args)]
pub struct ClientArgs {
    /// Server address, e.g. http://localhost:8000
    #[arg(long)]
    pub server: Option<String>,

    /// Client state file (defaults to ~/.asgard_client.json)
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Client subcommand
    #[command(subcommand)]
    pub command: ClientCommand,
}

/// Client subcommands
#[derive(Debug, Subcommand)]
pub enum ClientCommand {
    /// Obtain a token and remember it
    Login {
        /// Username (defaults to the OS user)
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Back up a file unless the server already has this content
    Upload {
        /// File to upload
        file: PathBuf,
    },
    /// List backed-up files and their versions
    List,
    /// Download a stored version
    Restore {
        /// Filename as listed by the server
        filename: String,
        /// Version id (defaults to the latest)
        #[arg(long)]
        version: Option<String>,
        /// Where to write the file (defaults to the filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// One row of `asgard client list`.
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Versions")]
    count: usize,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "All versions")]
    versions: String,
}

/// Username of the OS account running the client.
fn os_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// SHA-256 of a local file, read in blocks.
async fn hash_file(path: &Path) -> Result<ContentHash, AppError> {
    let file = tokio::fs::File::open(path).await?;
    hash_stream(Box::pin(ReaderStream::with_capacity(file, HASH_BLOCK_SIZE))).await
}

struct Session {
    api: ApiClient,
    server: String,
    token: String,
    username: String,
    state_path: PathBuf,
}

impl Session {
    /// Resolve server and token, logging in first when no token is stored.
    async fn open(args: &ClientArgs, state_path: &Path) -> Result<Self, AppError> {
        let state = ClientState::load(state_path).await?;
        let server = args
            .server
            .clone()
            .or_else(|| state.server.clone())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let mut session = Self {
            api: ApiClient::new(&server),
            server,
            token: state.token.clone().unwrap_or_default(),
            username: state.username.clone().unwrap_or_else(os_username),
            state_path: state_path.to_path_buf(),
        };
        if state.token.is_none() || state.username.is_none() {
            session.login().await?;
        }
        Ok(session)
    }

    /// Obtain a fresh token and persist it.
    async fn login(&mut self) -> Result<(), AppError> {
        self.token = self.api.login(&self.username).await?;
        ClientState {
            server: Some(self.server.clone()),
            token: Some(self.token.clone()),
            username: Some(self.username.clone()),
        }
        .save(&self.state_path)
        .await
    }

    /// Run `op` with the current token. A rejected token (the server
    /// restarted) triggers one login and a retry.
    async fn call<T, F, Fut>(&mut self, op: F) -> Result<T, AppError>
    where
        F: Fn(ApiClient, String) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        match op(self.api.clone(), self.token.clone()).await {
            Err(e) if e.is(ErrorKind::Unauthorized) => {
                warn!(user = %self.username, "Stored token rejected, logging in again");
                self.login().await?;
                op(self.api.clone(), self.token.clone()).await
            }
            other => other,
        }
    }
}

/// Execute client commands
pub async fn execute(args: &ClientArgs, format: OutputFormat) -> Result<(), AppError> {
    let state_path = args.state.clone().unwrap_or_else(ClientState::default_path);

    match &args.command {
        ClientCommand::Login { username } => {
            let server = match &args.server {
                Some(s) => s.clone(),
                None => ClientState::load(&state_path)
                    .await?
                    .server
                    .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            };
            let username = username.clone().unwrap_or_else(os_username);
            let token = ApiClient::new(&server).login(&username).await?;

            ClientState {
                server: Some(server.clone()),
                token: Some(token.clone()),
                username: Some(username.clone()),
            }
            .save(&state_path)
            .await?;

            output::print_success(&format!("Logged in to {} as '{}'", server, username));
            output::print_kv("Token", &token);
            output::print_kv("State file", &state_path.display().to_string());
        }
        ClientCommand::Upload { file } => {
            let metadata = tokio::fs::metadata(file).await.map_err(|_| {
                AppError::not_found(format!("File not found: {}", file.display()))
            })?;
            if !metadata.is_file() {
                return Err(AppError::validation(format!(
                    "Not a regular file: {}",
                    file.display()
                )));
            }
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| AppError::validation("File has no name"))?;

            let mut session = Session::open(args, &state_path).await?;
            let hash = hash_file(file).await?.to_hex();

            let exists = session
                .call(|api, token| {
                    let (filename, hash) = (filename.clone(), hash.clone());
                    async move { api.check(&token, &filename, &hash).await }
                })
                .await?;
            if exists {
                output::print_warning(&format!("'{}' is already backed up, skipping", filename));
                return Ok(());
            }

            let content = Bytes::from(tokio::fs::read(file).await?);
            let username = session.username.clone();
            let outcome = session
                .call(|api, token| {
                    let (username, filename) = (username.clone(), filename.clone());
                    let content = content.clone();
                    async move { api.upload(&token, &username, &filename, content).await }
                })
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&outcome),
                OutputFormat::Table => match outcome {
                    UploadResponse::Uploaded { version } => output::print_success(&format!(
                        "Uploaded '{}' as version {}",
                        filename, version
                    )),
                    UploadResponse::Duplicate => output::print_warning(&format!(
                        "'{}' matches a stored version, nothing uploaded",
                        filename
                    )),
                },
            }
        }
        ClientCommand::List => {
            let mut session = Session::open(args, &state_path).await?;
            let files = session
                .call(|api, token| async move { api.list(&token).await })
                .await?;

            match format {
                OutputFormat::Json => output::print_json(&files),
                OutputFormat::Table => {
                    let rows: Vec<FileRow> = files
                        .into_iter()
                        .map(|(file, versions)| FileRow {
                            count: versions.len(),
                            latest: versions.last().map(|v| v.to_string()).unwrap_or_default(),
                            versions: versions
                                .iter()
                                .map(|v| v.to_string())
                                .collect::<Vec<_>>()
                                .join(", "),
                            file,
                        })
                        .collect();
                    output::print_list(&rows, format);
                }
            }
        }
        ClientCommand::Restore {
            filename,
            version,
            output: target,
        } => {
            let mut session = Session::open(args, &state_path).await?;
            let data = session
                .call(|api, token| {
                    let (filename, version) = (filename.clone(), version.clone());
                    async move { api.restore(&token, &filename, version.as_deref()).await }
                })
                .await?;

            let target = target.clone().unwrap_or_else(|| {
                PathBuf::from(
                    Path::new(filename)
                        .file_name()
                        .map(|n| n.to_os_string())
                        .unwrap_or_else(|| filename.into()),
                )
            });
            tokio::fs::write(&target, &data).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write {}", target.display()),
                    e,
                )
            })?;

            output::print_success(&format!(
                "Restored {} bytes to {}",
                data.len(),
                target.display()
            ));
        }
    }

    Ok(())
}
