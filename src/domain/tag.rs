use semver::Version;
use std::fmt;
use std::path::PathBuf;

/// Prefix prepended to the manifest version to form the release tag.
pub const TAG_PREFIX: &str = "v";

/// Release tag name for a version (e.g., 1.2.4 -> "v1.2.4")
pub fn tag_name(version: &Version) -> String {
    format!("{}{}", TAG_PREFIX, version)
}

/// Expand a `{version}` message template.
pub fn render_template(template: &str, version: &Version) -> String {
    template.replace("{version}", &version.to_string())
}

/// Sub-steps of the tagging sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStage {
    Stage,
    Commit,
    Tag,
    PushBranch,
    PushTag,
}

impl TagStage {
    pub const ALL: [TagStage; 5] = [
        TagStage::Stage,
        TagStage::Commit,
        TagStage::Tag,
        TagStage::PushBranch,
        TagStage::PushTag,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TagStage::Stage => "stage",
            TagStage::Commit => "commit",
            TagStage::Tag => "tag",
            TagStage::PushBranch => "push-branch",
            TagStage::PushTag => "push-tag",
        }
    }
}

impl fmt::Display for TagStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Manual steps left after the tagging sequence stopped part way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecovery {
    pub completed: Vec<TagStage>,
    /// The manifest already holds the new version
    pub manifest_edited: bool,
    pub paths: Vec<PathBuf>,
    pub remote: String,
    pub branch: String,
    pub tag: String,
    pub commit_message: String,
    pub tag_message: String,
}

impl TagRecovery {
    /// Nothing changed on disk or in git; re-running is enough.
    pub fn is_clean(&self) -> bool {
        self.completed.is_empty() && !self.manifest_edited
    }

    /// Commands that finish the release, in order, skipping completed stages.
    pub fn remaining_commands(&self) -> Vec<String> {
        TagStage::ALL
            .iter()
            .filter(|stage| !self.completed.contains(stage))
            .map(|stage| self.command(*stage))
            .collect()
    }

    /// Command that puts the manifest back, if nothing was committed yet.
    pub fn restore_command(&self) -> Option<String> {
        if !self.manifest_edited || self.completed.contains(&TagStage::Commit) {
            return None;
        }
        Some(format!("git checkout -- {}", self.path_list()))
    }

    fn command(&self, stage: TagStage) -> String {
        match stage {
            TagStage::Stage => format!("git add {}", self.path_list()),
            TagStage::Commit => format!("git commit -m {}", shell_quote(&self.commit_message)),
            TagStage::Tag => format!(
                "git tag -a {} -m {}",
                self.tag,
                shell_quote(&self.tag_message)
            ),
            TagStage::PushBranch => format!("git push {} {}", self.remote, self.branch),
            TagStage::PushTag => format!("git push {} {}", self.remote, self.tag),
        }
    }

    fn path_list(&self) -> String {
        self.paths
            .iter()
            .map(|p| shell_quote(&p.display().to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Single-quote `value` for a POSIX shell.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recovery(completed: &[TagStage], manifest_edited: bool) -> TagRecovery {
        TagRecovery {
            completed: completed.to_vec(),
            manifest_edited,
            paths: vec![PathBuf::from("Cargo.toml"), PathBuf::from("Cargo.lock")],
            remote: "origin".to_string(),
            branch: "main".to_string(),
            tag: "v1.0.0".to_string(),
            commit_message: "chore: release v1.0.0".to_string(),
            tag_message: "Ship 1.0.0".to_string(),
        }
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name(&Version::new(1, 2, 4)), "v1.2.4");
    }

    #[test]
    fn test_tag_name_keeps_prerelease() {
        let version = Version::parse("2.0.0-rc.1").unwrap();
        assert_eq!(tag_name(&version), "v2.0.0-rc.1");
    }

    #[test]
    fn test_render_template() {
        let version = Version::new(0, 3, 0);
        assert_eq!(
            render_template("chore: release v{version}", &version),
            "chore: release v0.3.0"
        );
        assert_eq!(render_template("no placeholder", &version), "no placeholder");
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<_> = TagStage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["stage", "commit", "tag", "push-branch", "push-tag"]
        );
    }

    #[test]
    fn test_recovery_clean_only_when_nothing_changed() {
        assert!(recovery(&[], false).is_clean());
        assert!(!recovery(&[], true).is_clean());
        assert!(!recovery(&[TagStage::Stage], true).is_clean());
    }

    #[test]
    fn test_recovery_after_commit_lists_tag_and_both_pushes() {
        let commands = recovery(&[TagStage::Stage, TagStage::Commit], true).remaining_commands();
        assert_eq!(
            commands,
            vec![
                "git tag -a v1.0.0 -m 'Ship 1.0.0'",
                "git push origin main",
                "git push origin v1.0.0",
            ]
        );
    }

    #[test]
    fn test_recovery_after_stage_only() {
        let recovery = recovery(&[TagStage::Stage], true);
        let commands = recovery.remaining_commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], "git commit -m 'chore: release v1.0.0'");
        assert_eq!(
            recovery.restore_command().as_deref(),
            Some("git checkout -- 'Cargo.toml' 'Cargo.lock'")
        );
    }

    #[test]
    fn test_recovery_with_edited_manifest_and_nothing_staged() {
        let recovery = recovery(&[], true);
        assert_eq!(
            recovery.remaining_commands()[0],
            "git add 'Cargo.toml' 'Cargo.lock'"
        );
        assert!(recovery.restore_command().is_some());
    }

    #[test]
    fn test_no_restore_once_committed() {
        assert_eq!(
            recovery(&[TagStage::Stage, TagStage::Commit], true).restore_command(),
            None
        );
        assert_eq!(recovery(&[], false).restore_command(), None);
    }

    #[test]
    fn test_recovery_quotes_messages() {
        let mut recovery = recovery(&[TagStage::Stage], true);
        recovery.commit_message = "it's v1".to_string();
        assert_eq!(
            recovery.remaining_commands()[0],
            "git commit -m 'it'\\''s v1'"
        );
    }
}
