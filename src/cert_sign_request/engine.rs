use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{dn::EnvMap, request_config::SAN_SECTION, CsrError, EngineFailure};

/// The program that signs requests, plus any arguments that go before ours.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Engine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            program: "openssl".into(),
            args: Vec::new(),
        }
    }
}

/// Everything needed to run the engine once.
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: EnvMap,
}

/// Where the engine gets its input and puts its output.
#[derive(Debug)]
pub struct RequestPaths<'a> {
    pub key: &'a Path,
    pub config: &'a Path,
    pub out: Option<&'a Path>,
}

impl EngineInvocation {
    pub fn new_request(
        engine: &Engine,
        paths: RequestPaths<'_>,
        batch: bool,
        env: EnvMap,
    ) -> Self {
        let mut args: Vec<OsString> =
            engine.args.iter().map(OsString::from).collect();
        args.extend(["req", "-new", "-sha256", "-key"].map(OsString::from));
        args.push(paths.key.into());
        args.extend(["-reqexts", SAN_SECTION, "-config"].map(OsString::from));
        args.push(paths.config.into());
        if let Some(out) = paths.out {
            args.push("-out".into());
            args.push(out.into());
        }
        if batch {
            args.push("-batch".into());
        }
        Self {
            program: engine.program.clone(),
            args,
            env,
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Runs the engine to completion with exactly `self.env` as environment.
    pub fn run(&self) -> Result<(), CsrError> {
        debug!(program = %self.program.display(), args = ?self.args, "running engine");
        let status = Command::new(&self.program)
            .args(&self.args)
            .env_clear()
            .envs(&self.env)
            .status()
            .map_err(|err| CsrError::EngineInvocationFailed {
                program: self.program_name(),
                failure: EngineFailure::Launch(err),
            })?;
        debug!(%status, "engine finished");
        if status.success() {
            Ok(())
        } else {
            Err(CsrError::EngineInvocationFailed {
                program: self.program_name(),
                failure: EngineFailure::Exit(status),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths<'a>(out: Option<&'a Path>) -> RequestPaths<'a> {
        RequestPaths {
            key: Path::new("/keys/private.key"),
            config: Path::new("/tmp/csrgen-x.cnf"),
            out,
        }
    }

    #[test]
    fn interactive_request_arguments() {
        let invocation = EngineInvocation::new_request(
            &Engine::default(),
            paths(None),
            false,
            EnvMap::new(),
        );
        assert_eq!(invocation.program, PathBuf::from("openssl"));
        assert_eq!(
            invocation.args,
            [
                "req",
                "-new",
                "-sha256",
                "-key",
                "/keys/private.key",
                "-reqexts",
                "SAN",
                "-config",
                "/tmp/csrgen-x.cnf",
            ]
            .map(OsString::from)
        );
        assert!(!invocation.args.iter().any(|arg| arg == "-batch"));
    }

    #[test]
    fn batch_output_and_leading_args() {
        let engine = Engine {
            program: "/usr/bin/env".into(),
            args: vec!["openssl".into()],
        };
        let mut env = EnvMap::new();
        env.insert("REQ_COUNTRY".into(), "DE".into());
        let invocation = EngineInvocation::new_request(
            &engine,
            paths(Some(Path::new("request.csr"))),
            true,
            env.clone(),
        );
        assert_eq!(invocation.args[0], "openssl");
        assert_eq!(invocation.args[1], "req");
        let tail = &invocation.args[invocation.args.len() - 3..];
        assert_eq!(tail, ["-out", "request.csr", "-batch"].map(OsString::from));
        assert_eq!(invocation.env, env);
    }

    #[test]
    fn missing_program_is_a_launch_failure() {
        let engine = Engine {
            program: "/nonexistent/csrgen-engine".into(),
            args: Vec::new(),
        };
        let err = EngineInvocation::new_request(&engine, paths(None), true, EnvMap::new())
            .run()
            .unwrap_err();
        assert!(matches!(
            err,
            CsrError::EngineInvocationFailed {
                failure: EngineFailure::Launch(_),
                ..
            }
        ));
        assert_eq!(err.exit_code(), 1);
    }
}
