//! Two-phase registry publishing
//!
//! A dry run validates packaging first; the real publish is issued only when
//! the dry run succeeded, and is never retried.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use semver::Version;
use thiserror::Error;

use crate::domain::{PublishAttempt, PublishPhase};
use crate::error::{ReleaseError, Result};
use crate::toolchain::{CommandOutput, CommandRunner};

/// Name used for the default registry in messages.
pub const DEFAULT_REGISTRY: &str = "crates-io";

/// Failure reported by a registry call, carrying the registry's diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RegistryFailure(pub String);

/// Package registry client
pub trait Registry {
    fn name(&self) -> &str;

    /// Confirm credentials for this registry are configured.
    fn check_auth(&self) -> std::result::Result<(), RegistryFailure>;

    /// Validate packaging without uploading anything.
    fn dry_run(&self, version: &Version) -> std::result::Result<(), RegistryFailure>;

    /// Upload the package. Irreversible.
    fn publish(&self, version: &Version) -> std::result::Result<(), RegistryFailure>;
}

/// Publishes with `cargo publish`
pub struct CargoRegistry<'a> {
    runner: &'a dyn CommandRunner,
    manifest_path: PathBuf,
    registry: Option<String>,
    cargo_home: Option<PathBuf>,
}

impl<'a> CargoRegistry<'a> {
    /// Publish the package whose manifest is at `manifest_path`.
    pub fn new(
        runner: &'a dyn CommandRunner,
        manifest_path: impl Into<PathBuf>,
        registry: Option<String>,
    ) -> Self {
        CargoRegistry {
            runner,
            manifest_path: manifest_path.into(),
            registry,
            cargo_home: None,
        }
    }

    /// Look for credential files here instead of `$CARGO_HOME` or `~/.cargo`.
    pub fn with_cargo_home(mut self, cargo_home: impl Into<PathBuf>) -> Self {
        self.cargo_home = Some(cargo_home.into());
        self
    }

    fn publish_args(&self, dry_run: bool) -> Vec<String> {
        let mut args = vec![
            "publish".to_string(),
            "--manifest-path".to_string(),
            self.manifest_path.display().to_string(),
        ];
        if dry_run {
            args.push("--dry-run".to_string());
        }
        if let Some(registry) = &self.registry {
            args.push("--registry".to_string());
            args.push(registry.clone());
        }
        args
    }

    fn run_cargo(&self, args: &[String]) -> std::result::Result<(), RegistryFailure> {
        let output: CommandOutput = self
            .runner
            .run("cargo", args)
            .map_err(|e| RegistryFailure(e.to_string()))?;

        if output.success {
            Ok(())
        } else {
            Err(RegistryFailure(output.diagnostic()))
        }
    }

    fn resolved_cargo_home(&self) -> Option<PathBuf> {
        self.cargo_home
            .clone()
            .or_else(|| env::var_os("CARGO_HOME").map(PathBuf::from))
            .or_else(|| dirs::home_dir().map(|home| home.join(".cargo")))
    }
}

impl Registry for CargoRegistry<'_> {
    fn name(&self) -> &str {
        self.registry.as_deref().unwrap_or(DEFAULT_REGISTRY)
    }

    fn check_auth(&self) -> std::result::Result<(), RegistryFailure> {
        let token_var = token_env_var(self.registry.as_deref());
        if env::var(&token_var).map(|t| !t.trim().is_empty()).unwrap_or(false) {
            debug!("registry token found in {}", token_var);
            return Ok(());
        }

        if let Some(cargo_home) = self.resolved_cargo_home() {
            if has_stored_token(&cargo_home, self.registry.as_deref()) {
                debug!("registry token found under {}", cargo_home.display());
                return Ok(());
            }
        }

        Err(RegistryFailure(format!(
            "no token for registry '{}'; run `cargo login` or set {}",
            self.name(),
            token_var
        )))
    }

    fn dry_run(&self, version: &Version) -> std::result::Result<(), RegistryFailure> {
        debug!("dry-run publish of {} to {}", version, self.name());
        self.run_cargo(&self.publish_args(true))
    }

    fn publish(&self, version: &Version) -> std::result::Result<(), RegistryFailure> {
        debug!("publishing {} to {}", version, self.name());
        self.run_cargo(&self.publish_args(false))
    }
}

/// Environment variable cargo reads the token from for this registry.
pub fn token_env_var(registry: Option<&str>) -> String {
    match registry {
        None => "CARGO_REGISTRY_TOKEN".to_string(),
        Some(name) => format!(
            "CARGO_REGISTRIES_{}_TOKEN",
            name.to_ascii_uppercase().replace('-', "_")
        ),
    }
}

/// Whether cargo's credential files under `cargo_home` hold a token.
///
/// Checks `credentials.toml` and the legacy extension-less `credentials`.
pub fn has_stored_token(cargo_home: &Path, registry: Option<&str>) -> bool {
    ["credentials.toml", "credentials"].iter().any(|file| {
        let Ok(content) = fs::read_to_string(cargo_home.join(file)) else {
            return false;
        };
        let Ok(table) = content.parse::<toml::Table>() else {
            return false;
        };

        let section = match registry {
            None => table.get("registry"),
            Some(name) => table
                .get("registries")
                .and_then(|registries| registries.get(name)),
        };

        section
            .and_then(|s| s.get("token"))
            .and_then(|token| token.as_str())
            .map(|token| !token.trim().is_empty())
            .unwrap_or(false)
    })
}

/// Runs the dry-run then the real publish against a [Registry].
pub struct Publisher<'a> {
    registry: &'a dyn Registry,
}

impl<'a> Publisher<'a> {
    pub fn new(registry: &'a dyn Registry) -> Self {
        Publisher { registry }
    }

    /// Publish `version`, recording each registry call in `attempts`.
    ///
    /// The real publish is only issued after a successful dry run.
    pub fn publish(&self, version: &Version, attempts: &mut Vec<PublishAttempt>) -> Result<()> {
        let dry_run = self.registry.dry_run(version);
        attempts.push(attempt(true, version, &dry_run));
        dry_run.map_err(|e| ReleaseError::publish(PublishPhase::DryRun, e.0))?;
        info!("dry-run publish of {} succeeded", version);

        let publish = self.registry.publish(version);
        attempts.push(attempt(false, version, &publish));
        publish.map_err(|e| ReleaseError::publish(PublishPhase::Publish, e.0))?;
        info!("published {} to {}", version, self.registry.name());

        Ok(())
    }
}

fn attempt(
    dry_run: bool,
    version: &Version,
    result: &std::result::Result<(), RegistryFailure>,
) -> PublishAttempt {
    PublishAttempt {
        dry_run,
        success: result.is_ok(),
        error: result.as_ref().err().map(|e| e.0.clone()),
        version: version.clone(),
    }
}
