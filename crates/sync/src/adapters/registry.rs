//! Built-in target table.

use super::target::{CleanupPolicy, EnvelopeFormat, NamingStrategy, RenderTarget};
use beat_discovery::ArtifactKind;

use CleanupPolicy::{OwnedSubdirectory, PrefixMatch};
use EnvelopeFormat::{Frontmatter, Header, Mdc, Toml};
use NamingStrategy::{Flat, Nested};

const AGENTS_ONLY: &[ArtifactKind] = &[ArtifactKind::Agent];

struct Preset {
    name: &'static str,
    display_name: &'static str,
    root: &'static str,
    naming: NamingStrategy,
    envelope: EnvelopeFormat,
    extension: &'static str,
    cleanup: CleanupPolicy,
    kinds: &'static [ArtifactKind],
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "claude-code",
        display_name: "Claude Code",
        root: ".claude/commands",
        naming: Nested,
        envelope: EnvelopeFormat::None,
        extension: "md",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "cursor",
        display_name: "Cursor",
        root: ".cursor/rules",
        naming: Nested,
        envelope: Mdc,
        extension: "mdc",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "windsurf",
        display_name: "Windsurf",
        root: ".windsurf/workflows",
        naming: Flat,
        envelope: Frontmatter,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "gemini",
        display_name: "Gemini CLI",
        root: ".gemini/commands",
        naming: Flat,
        envelope: Toml,
        extension: "toml",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "qwen",
        display_name: "Qwen Code",
        root: ".qwen/commands",
        naming: Nested,
        envelope: Toml,
        extension: "toml",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "codex",
        display_name: "Codex",
        root: ".codex/prompts",
        naming: Flat,
        envelope: EnvelopeFormat::None,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "github-copilot",
        display_name: "GitHub Copilot",
        root: ".github/chatmodes",
        naming: Flat,
        envelope: Frontmatter,
        extension: "chatmode.md",
        cleanup: PrefixMatch,
        kinds: AGENTS_ONLY,
    },
    Preset {
        name: "cline",
        display_name: "Cline",
        root: ".clinerules/workflows",
        naming: Flat,
        envelope: Header,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "roo",
        display_name: "Roo Code",
        root: ".roo/commands",
        naming: Flat,
        envelope: Frontmatter,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "kilo",
        display_name: "Kilo Code",
        root: ".kilocode/workflows",
        naming: Flat,
        envelope: Header,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "crush",
        display_name: "Crush",
        root: ".crush/commands",
        naming: Nested,
        envelope: EnvelopeFormat::None,
        extension: "md",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "opencode",
        display_name: "OpenCode",
        root: ".opencode/command",
        naming: Flat,
        envelope: Frontmatter,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "trae",
        display_name: "Trae",
        root: ".trae/rules",
        naming: Flat,
        envelope: Header,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "auggie",
        display_name: "Auggie CLI",
        root: ".augment/commands",
        naming: Nested,
        envelope: Frontmatter,
        extension: "md",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "iflow",
        display_name: "iFlow CLI",
        root: ".iflow/commands",
        naming: Nested,
        envelope: EnvelopeFormat::None,
        extension: "md",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "antigravity",
        display_name: "Google Antigravity",
        root: ".agent/workflows",
        naming: Flat,
        envelope: Frontmatter,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "kiro",
        display_name: "Kiro",
        root: ".kiro/steering",
        naming: Nested,
        envelope: Frontmatter,
        extension: "md",
        cleanup: OwnedSubdirectory,
        kinds: &ArtifactKind::ALL,
    },
    Preset {
        name: "rovo-dev",
        display_name: "Rovo Dev",
        root: ".rovodev/subagents",
        naming: Flat,
        envelope: Frontmatter,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: AGENTS_ONLY,
    },
    Preset {
        name: "amp",
        display_name: "Amp",
        root: ".agents/commands",
        naming: Flat,
        envelope: Header,
        extension: "md",
        cleanup: PrefixMatch,
        kinds: &ArtifactKind::ALL,
    },
];

impl Preset {
    fn to_target(&self) -> RenderTarget {
        RenderTarget {
            name: self.name.to_string(),
            display_name: self.display_name.to_string(),
            root: self.root.into(),
            naming: self.naming,
            envelope: self.envelope,
            extension: self.extension.to_string(),
            cleanup: self.cleanup,
            kinds: self.kinds.to_vec(),
        }
    }
}

/// Every built-in target, in display order.
pub fn all_targets() -> Vec<RenderTarget> {
    PRESETS.iter().map(Preset::to_target).collect()
}

/// Selection keys of the built-in targets.
pub fn target_names() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.name).collect()
}

/// Looks up a built-in target by key (case-insensitive).
pub fn find_target(name: &str) -> Option<RenderTarget> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(Preset::to_target)
}
