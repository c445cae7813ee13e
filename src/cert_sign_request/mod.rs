use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitStatus,
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use self::{
    dn::{EnvMap, DN},
    engine::{Engine, EngineInvocation, RequestPaths},
    san::DomainList,
};

pub mod dn;
pub mod engine;
pub mod request_config;
pub mod san;

#[derive(Debug, Error)]
pub enum CsrError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("domain #{} is not valid UTF-8: {lossy:?}", .index + 1)]
    Encoding { index: usize, lossy: String },
    #[error("no private key given, pass one with --key")]
    MissingKey,
    #[error("private key {0:?} does not exist")]
    KeyNotFound(PathBuf),
    #[error("temporary request config")]
    TempResource(#[source] io::Error),
    #[error("engine {program}")]
    EngineInvocationFailed {
        program: String,
        #[source]
        failure: EngineFailure,
    },
}

#[derive(Debug, Error)]
pub enum EngineFailure {
    #[error("could not be started")]
    Launch(#[source] io::Error),
    #[error("exited with {0}")]
    Exit(ExitStatus),
}

impl CsrError {
    /// Process exit code for this error, the engine's own code when it has one.
    pub fn exit_code(&self) -> i32 {
        match self {
            CsrError::EngineInvocationFailed {
                failure: EngineFailure::Exit(status),
                ..
            } => status.code().filter(|code| *code != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// One request to generate.
#[derive(Debug, Default)]
pub struct CsrRequest {
    pub key: Option<PathBuf>,
    pub domains: Vec<OsString>,
    pub batch: bool,
    pub out: Option<PathBuf>,
    /// Where the request config is written, the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

/// Generates a signing request for `request` with the engine.
///
/// The request config lives in a temporary file that is gone again when this
/// returns, whether or not the engine succeeded.
pub fn generate_csr(
    request: &CsrRequest,
    fields: &DN,
    env: &EnvMap,
    engine: &Engine,
) -> Result<(), CsrError> {
    let domains = DomainList::from_os_strings(request.domains.clone())?;
    fields.check_config_safe()?;
    let key = request.key.as_deref().ok_or(CsrError::MissingKey)?;
    if !key.exists() {
        return Err(CsrError::KeyNotFound(key.to_path_buf()));
    }
    info!(common_name = domains.common_name(), san = %domains.subject_alt_name(), "generating request");

    let mut builder = tempfile::Builder::new();
    builder.prefix("csrgen-").suffix(".cnf");
    let mut config = match &request.temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(CsrError::TempResource)?;
    write_config(&mut config, fields, &domains)
        .map_err(CsrError::TempResource)?;
    debug!(path = %config.path().display(), "wrote request config");

    let out_existed = request.out.as_deref().is_some_and(|out| out.exists());
    let invocation = EngineInvocation::new_request(
        engine,
        RequestPaths {
            key,
            config: config.path(),
            out: request.out.as_deref(),
        },
        request.batch,
        fields.engine_env(env),
    );
    let outcome = invocation.run();

    if outcome.is_err() && !out_existed {
        if let Some(out) = request.out.as_deref().filter(|out| out.exists()) {
            if let Err(err) = fs::remove_file(out) {
                warn!(path = %out.display(), %err, "can't remove partial request");
            }
        }
    }

    let closed = config.close().map_err(CsrError::TempResource);
    outcome?;
    closed
}

fn write_config(
    config: &mut NamedTempFile,
    fields: &DN,
    domains: &DomainList,
) -> io::Result<()> {
    let file = config.as_file_mut();
    request_config::write_request_config(file, fields, domains)?;
    file.flush()?;
    file.sync_all()
}
