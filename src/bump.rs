//! Version bumping
//!
//! The automated path delegates to `cargo set-version` (cargo-edit) and then
//! verifies the manifest. When that tool is missing the operator edits the
//! manifest by hand and confirms; the result is verified the same way.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use semver::Version;

use crate::domain::{BumpType, ReleaseContext, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::toolchain::CommandRunner;
use crate::ui::{self, Prompter};

/// Read `package.version` from a Cargo manifest.
pub fn read_manifest_version(path: &Path) -> Result<Version> {
    let content = fs::read_to_string(path)
        .map_err(|e| ReleaseError::manifest(format!("cannot read {}: {}", path.display(), e)))?;
    let manifest: toml::Table = content
        .parse()
        .map_err(|e| ReleaseError::manifest(format!("invalid TOML in {}: {}", path.display(), e)))?;

    let version = manifest
        .get("package")
        .and_then(|package| package.get("version"))
        .ok_or_else(|| {
            ReleaseError::manifest(format!("{} has no package.version", path.display()))
        })?;

    let version = version.as_str().ok_or_else(|| {
        ReleaseError::manifest(format!(
            "package.version in {} is not a literal string \
             (workspace-inherited versions are not supported)",
            path.display()
        ))
    })?;

    Version::parse(version).map_err(|e| {
        ReleaseError::manifest(format!(
            "invalid version '{}' in {}: {}",
            version,
            path.display(),
            e
        ))
    })
}

/// Tool that rewrites the manifest version in place
pub trait BumpTool {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Apply `bump` to the manifest.
    fn bump(&self, bump: BumpType) -> Result<()>;
}

/// `cargo set-version --bump <type>` from cargo-edit
pub struct CargoSetVersion<'a> {
    runner: &'a dyn CommandRunner,
    manifest_path: PathBuf,
}

impl<'a> CargoSetVersion<'a> {
    pub fn new(runner: &'a dyn CommandRunner, manifest_path: impl Into<PathBuf>) -> Self {
        CargoSetVersion {
            runner,
            manifest_path: manifest_path.into(),
        }
    }
}

impl BumpTool for CargoSetVersion<'_> {
    fn name(&self) -> &str {
        "cargo set-version"
    }

    fn is_available(&self) -> bool {
        self.runner.is_available("cargo-set-version")
    }

    fn bump(&self, bump: BumpType) -> Result<()> {
        let args = vec![
            "set-version".to_string(),
            "--manifest-path".to_string(),
            self.manifest_path.display().to_string(),
            "--bump".to_string(),
            bump.as_str().to_string(),
        ];

        let output = self.runner.run("cargo", &args)?;
        if !output.success {
            return Err(ReleaseError::bump(format!(
                "{} failed: {}",
                self.name(),
                output.diagnostic()
            )));
        }
        Ok(())
    }
}

/// Computes, applies and verifies the release version.
pub struct VersionBumper<'a> {
    tool: &'a dyn BumpTool,
    prompter: &'a dyn Prompter,
    manifest_path: &'a Path,
}

impl<'a> VersionBumper<'a> {
    pub fn new(
        tool: &'a dyn BumpTool,
        prompter: &'a dyn Prompter,
        manifest_path: &'a Path,
    ) -> Self {
        VersionBumper {
            tool,
            prompter,
            manifest_path,
        }
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    pub fn tool_available(&self) -> bool {
        self.tool.is_available()
    }

    /// Bump with the automated tool and record the result in `ctx`.
    pub fn bump_with_tool(
        &self,
        ctx: &mut ReleaseContext,
        bump_type: BumpType,
    ) -> Result<VersionBump> {
        let expected = VersionBump::compute(&ctx.current_version, bump_type)?;
        debug!("bumping with {}: {}", self.tool.name(), expected);

        self.tool.bump(bump_type)?;
        self.verify_manifest(&expected)?;

        ctx.record_bump(&expected);
        info!("manifest bumped to {}", expected.new);
        Ok(expected)
    }

    /// Ask the operator to edit the manifest, then verify and record the result.
    ///
    /// Blocks until the operator answers. Declining aborts the release.
    pub fn bump_manually(
        &self,
        ctx: &mut ReleaseContext,
        bump_type: BumpType,
    ) -> Result<VersionBump> {
        let expected = VersionBump::compute(&ctx.current_version, bump_type)?;

        ui::display_manual_version_edit(
            self.manifest_path,
            &expected.old.to_string(),
            &expected.new.to_string(),
        );

        let prompt = format!(
            "Have you set the version in {} to {}?",
            self.manifest_path.display(),
            expected.new
        );
        if !self.prompter.confirm(&prompt)? {
            return Err(ReleaseError::bump(
                "manual version edit was not confirmed by the operator",
            ));
        }

        self.verify_manifest(&expected)?;

        ctx.record_bump(&expected);
        info!("manual bump to {} confirmed", expected.new);
        Ok(expected)
    }

    /// The manifest must now hold exactly the computed version.
    fn verify_manifest(&self, expected: &VersionBump) -> Result<()> {
        let actual = read_manifest_version(self.manifest_path)?;

        if actual == expected.old {
            return Err(ReleaseError::bump(format!(
                "{} still has version {}",
                self.manifest_path.display(),
                actual
            )));
        }

        if actual != expected.new {
            return Err(ReleaseError::bump(format!(
                "{} has version {}, expected {} for a {} bump from {}",
                self.manifest_path.display(),
                actual,
                expected.new,
                expected.bump_type,
                expected.old
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::MockRunner;
    use crate::ui::ScriptedPrompter;
    use tempfile::TempDir;

    fn manifest(version: &Version) -> String {
        format!(
            r#"[package]
name = "demo"
version = "{}"
edition = "2021"

[dependencies]
serde = {{ version = "1.0" }}
"#,
            version
        )
    }

    fn manifest_dir() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, manifest(&Version::new(1, 2, 3))).unwrap();
        (dir, path)
    }

    fn context() -> ReleaseContext {
        ReleaseContext::new("main", vec![], Version::new(1, 2, 3), Some(BumpType::Patch))
    }

    /// Stands in for cargo set-version by rewriting the manifest.
    struct RewritingTool {
        manifest: PathBuf,
        result: Version,
    }

    impl BumpTool for RewritingTool {
        fn name(&self) -> &str {
            "rewriting"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn bump(&self, _bump: BumpType) -> Result<()> {
            fs::write(&self.manifest, manifest(&self.result))?;
            Ok(())
        }
    }

    #[test]
    fn test_read_manifest_version() {
        let (_dir, path) = manifest_dir();
        assert_eq!(read_manifest_version(&path).unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_read_manifest_without_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, "[package]\nname = \"demo\"\n").unwrap();
        let err = read_manifest_version(&path).unwrap_err();
        assert!(err.to_string().contains("no package.version"));
    }

    #[test]
    fn test_read_manifest_workspace_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, "[package]\nname = \"demo\"\nversion.workspace = true\n").unwrap();
        let err = read_manifest_version(&path).unwrap_err();
        assert!(err.to_string().contains("not a literal string"));
    }

    #[test]
    fn test_read_manifest_ignores_dependency_versions() {
        let (_dir, path) = manifest_dir();
        fs::write(&path, manifest(&Version::new(0, 4, 0))).unwrap();
        assert_eq!(read_manifest_version(&path).unwrap(), Version::new(0, 4, 0));
    }

    #[test]
    fn test_cargo_set_version_command() {
        let runner = MockRunner::new();
        let tool = CargoSetVersion::new(&runner, "/repo/Cargo.toml");
        tool.bump(BumpType::Minor).unwrap();
        assert_eq!(
            runner.calls(),
            vec!["cargo set-version --manifest-path /repo/Cargo.toml --bump minor"]
        );
    }

    #[test]
    fn test_cargo_set_version_availability() {
        let runner = MockRunner::new().without_program("cargo-set-version");
        let tool = CargoSetVersion::new(&runner, "Cargo.toml");
        assert!(!tool.is_available());
    }

    #[test]
    fn test_cargo_set_version_failure() {
        let runner = MockRunner::new().fail_when("set-version", "error: no such subcommand");
        let tool = CargoSetVersion::new(&runner, "Cargo.toml");
        let err = tool.bump(BumpType::Patch).unwrap_err();
        assert_eq!(err.category(), "BumpError");
    }

    #[test]
    fn test_bump_with_tool_records_context() {
        let (_dir, path) = manifest_dir();
        let tool = RewritingTool {
            manifest: path.clone(),
            result: Version::new(1, 2, 4),
        };
        let prompter = ScriptedPrompter::new(&[]);
        let bumper = VersionBumper::new(&tool, &prompter, &path);

        let mut ctx = context();
        let bump = bumper.bump_with_tool(&mut ctx, BumpType::Patch).unwrap();

        assert_eq!(bump.new, Version::new(1, 2, 4));
        assert_eq!(ctx.tag_name.as_deref(), Some("v1.2.4"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_bump_overflow_leaves_manifest_untouched() {
        let (_dir, path) = manifest_dir();
        let tool = RewritingTool {
            manifest: path.clone(),
            result: Version::new(0, 0, 0),
        };
        let prompter = ScriptedPrompter::new(&[]);
        let bumper = VersionBumper::new(&tool, &prompter, &path);

        let mut ctx = ReleaseContext::new(
            "main",
            vec![],
            Version::new(u64::MAX, 0, 0),
            Some(BumpType::Major),
        );
        let err = bumper.bump_with_tool(&mut ctx, BumpType::Major).unwrap_err();

        assert_eq!(err.category(), "BumpError");
        assert!(err.to_string().contains("overflows"));
        assert_eq!(read_manifest_version(&path).unwrap(), Version::new(1, 2, 3));
        assert_eq!(ctx.new_version, None);
    }

    #[test]
    fn test_bump_with_tool_rejects_unexpected_version() {
        let (_dir, path) = manifest_dir();
        let tool = RewritingTool {
            manifest: path.clone(),
            result: Version::new(1, 3, 0),
        };
        let prompter = ScriptedPrompter::new(&[]);
        let bumper = VersionBumper::new(&tool, &prompter, &path);

        let mut ctx = context();
        let err = bumper.bump_with_tool(&mut ctx, BumpType::Patch).unwrap_err();
        assert!(err.to_string().contains("expected 1.2.4"));
        assert_eq!(ctx.new_version, None);
    }

    #[test]
    fn test_manual_bump_declined() {
        let (_dir, path) = manifest_dir();
        let runner = MockRunner::new();
        let tool = CargoSetVersion::new(&runner, &path);
        let prompter = ScriptedPrompter::new(&[false]);
        let bumper = VersionBumper::new(&tool, &prompter, &path);

        let mut ctx = context();
        let err = bumper.bump_manually(&mut ctx, BumpType::Patch).unwrap_err();
        assert!(err.to_string().contains("not confirmed"));
        assert_eq!(prompter.asked().len(), 1);
    }

    #[test]
    fn test_manual_bump_confirmed_without_edit() {
        let (_dir, path) = manifest_dir();
        let runner = MockRunner::new();
        let tool = CargoSetVersion::new(&runner, &path);
        let prompter = ScriptedPrompter::new(&[true]);
        let bumper = VersionBumper::new(&tool, &prompter, &path);

        let mut ctx = context();
        let err = bumper.bump_manually(&mut ctx, BumpType::Patch).unwrap_err();
        assert!(err.to_string().contains("still has version 1.2.3"));
    }

    #[test]
    fn test_manual_bump_confirmed_after_edit() {
        let (_dir, path) = manifest_dir();
        fs::write(&path, manifest(&Version::new(2, 0, 0))).unwrap();

        let runner = MockRunner::new();
        let tool = CargoSetVersion::new(&runner, &path);
        let prompter = ScriptedPrompter::new(&[true]);
        let bumper = VersionBumper::new(&tool, &prompter, &path);

        let mut ctx = context();
        let bump = bumper.bump_manually(&mut ctx, BumpType::Major).unwrap();
        assert_eq!(bump.new, Version::new(2, 0, 0));
        assert_eq!(ctx.tag_name.as_deref(), Some("v2.0.0"));
        assert!(runner.calls().is_empty());
    }
}
