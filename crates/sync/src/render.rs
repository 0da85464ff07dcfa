//! Generic renderer: maps an artifact and a target to a destination path and
//! file content.
//!
//! Title extraction is best effort. Probes run in a fixed order and the first
//! one that yields a non-empty value wins:
//!
//! 1. `title="..."` on an `<agent|task|tool|workflow>` tag
//! 2. `name="..."` on such a tag
//! 3. frontmatter `title`, `name`, then `description`
//! 4. the first `# ` heading
//! 5. the title-cased artifact name
//!
//! The last source cannot fail, so every artifact gets a title.

use crate::adapters::utils::{
    single_line, title_case, toml_multiline_escape, with_trailing_newline, yaml_quote,
};
use crate::adapters::{EnvelopeFormat, NamingStrategy, RenderTarget, OWNERSHIP_MARKER};
use beat_discovery::ArtifactRecord;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::LazyLock;

static TAG_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:agent|task|tool|workflow)\b[^>]*?\btitle="([^"]*)""#).expect("valid regex")
});

static TAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:agent|task|tool|workflow)\b[^>]*?\bname="([^"]*)""#).expect("valid regex")
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(\S[^\r\n]*)").expect("valid regex"));

const FRONTMATTER_TITLE_KEYS: [&str; 3] = ["title", "name", "description"];

/// Final file for one artifact under one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    /// Destination, relative to the project directory unless the target root
    /// is absolute.
    pub destination_path: PathBuf,
    pub content: String,
}

/// Splits content into frontmatter YAML and body.
///
/// Returns `(None, content)` when there is no complete `---` block at the top.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return (None, content);
    };
    if !after_open.starts_with(['\r', '\n']) {
        return (None, content);
    }

    let Some(end_pos) = after_open.find("\n---") else {
        return (None, content);
    };
    let yaml = after_open[..end_pos].trim_matches(['\r', '\n']);
    let rest = &after_open[end_pos + 4..];
    // The closing fence must end its line.
    let rest = match rest.find('\n') {
        Some(nl) if rest[..nl].trim().is_empty() => &rest[nl + 1..],
        None if rest.trim().is_empty() => "",
        _ => return (None, content),
    };
    (Some(yaml), rest.trim_start_matches(['\r', '\n']))
}

/// Returns the body with any leading frontmatter block removed.
pub fn strip_frontmatter(content: &str) -> &str {
    split_frontmatter(content).1
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| single_line(m.as_str()))
        .filter(|s| !s.is_empty())
}

fn frontmatter_title(artifact: &ArtifactRecord) -> Option<String> {
    let (yaml, _) = split_frontmatter(&artifact.raw_content);
    let yaml = yaml?;
    let value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(e) => {
            tracing::info!(
                artifact = %artifact.id(),
                error = %e,
                "Malformed frontmatter; falling back to other title sources"
            );
            return None;
        }
    };
    let mapping = value.as_mapping()?;
    FRONTMATTER_TITLE_KEYS.iter().find_map(|key| {
        mapping
            .get(*key)
            .and_then(|v| v.as_str())
            .map(single_line)
            .filter(|s| !s.is_empty())
    })
}

/// Extracts a display title; always returns a non-empty string.
pub fn extract_title(artifact: &ArtifactRecord) -> String {
    let content = &artifact.raw_content;
    capture(&TAG_TITLE, content)
        .or_else(|| capture(&TAG_NAME, content))
        .or_else(|| frontmatter_title(artifact))
        .or_else(|| capture(&HEADING, strip_frontmatter(content)))
        .unwrap_or_else(|| fallback_title(artifact))
}

fn fallback_title(artifact: &ArtifactRecord) -> String {
    let title = title_case(&artifact.name);
    if title.is_empty() {
        title_case(artifact.kind.label())
    } else {
        title
    }
}

/// Builds the destination path of an artifact under a target.
pub fn destination_path(artifact: &ArtifactRecord, target: &RenderTarget) -> PathBuf {
    match target.naming {
        NamingStrategy::Flat => target.root.join(format!(
            "{OWNERSHIP_MARKER}-{}-{}-{}.{}",
            artifact.module,
            artifact.kind.label(),
            artifact.name,
            target.extension
        )),
        NamingStrategy::Nested => target
            .root
            .join(OWNERSHIP_MARKER)
            .join(&artifact.module)
            .join(artifact.kind.dir_name())
            .join(format!("{}.{}", artifact.name, target.extension)),
    }
}

/// Wraps a body in an envelope. Pure string templating; `body` is not inspected.
pub fn apply_envelope(
    format: EnvelopeFormat,
    title: &str,
    module: &str,
    kind: &str,
    body: &str,
) -> String {
    match format {
        EnvelopeFormat::None => body.to_string(),
        EnvelopeFormat::Frontmatter => format!(
            "---\ndescription: {}\nmodule: {module}\nkind: {kind}\n---\n\n{}",
            yaml_quote(title),
            with_trailing_newline(body)
        ),
        EnvelopeFormat::Mdc => format!(
            "---\ndescription: {}\nglobs:\nalwaysApply: false\n---\n\n# {title}\n\n{}",
            yaml_quote(title),
            with_trailing_newline(body)
        ),
        EnvelopeFormat::Toml => format!(
            "description = {}\nprompt = \"\"\"\n{}\"\"\"\n",
            toml::Value::String(title.to_string()),
            with_trailing_newline(&toml_multiline_escape(body))
        ),
        EnvelopeFormat::Header => format!("# {title}\n\n{}", with_trailing_newline(body)),
    }
}

/// Renders an artifact for a target. No I/O.
pub fn render(artifact: &ArtifactRecord, target: &RenderTarget) -> RenderedFile {
    let content = match target.envelope {
        EnvelopeFormat::None => artifact.raw_content.clone(),
        envelope => apply_envelope(
            envelope,
            &extract_title(artifact),
            &artifact.module,
            artifact.kind.label(),
            strip_frontmatter(&artifact.raw_content),
        ),
    };
    RenderedFile {
        destination_path: destination_path(artifact, target),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{all_targets, find_target};
    use beat_discovery::ArtifactKind;

    fn artifact(module: &str, kind: ArtifactKind, name: &str, content: &str) -> ArtifactRecord {
        ArtifactRecord {
            module: module.into(),
            kind,
            name: name.into(),
            source_path: PathBuf::from(format!("/src/{module}/{}/{name}.md", kind.dir_name())),
            raw_content: content.into(),
            hash: String::new(),
        }
    }

    fn agent(name: &str, content: &str) -> ArtifactRecord {
        artifact("core", ArtifactKind::Agent, name, content)
    }

    #[test]
    fn title_from_tag_title_attribute_wins() {
        let a = agent(
            "dev",
            "---\nname: slug\n---\n# Heading\n<agent id=\"dev\" name=\"Amelia\" title=\"Developer Agent\">",
        );
        assert_eq!(extract_title(&a), "Developer Agent");
    }

    #[test]
    fn title_from_tag_name_when_no_title() {
        let a = agent("dev", "<task id=\"x\" name=\"Shard Document\">\n</task>");
        assert_eq!(extract_title(&a), "Shard Document");
    }

    #[test]
    fn title_attribute_may_span_lines() {
        let a = agent("dev", "<agent id=\"dev\"\n  title=\"Dev\n  Agent\">");
        assert_eq!(extract_title(&a), "Dev Agent");
    }

    #[test]
    fn title_from_frontmatter_fields_in_order() {
        let a = agent("x", "---\ndescription: Describes\nname: Named\n---\nbody");
        assert_eq!(extract_title(&a), "Named");
        let b = agent("x", "---\ndescription: Describes\n---\nbody");
        assert_eq!(extract_title(&b), "Describes");
        let c = agent("x", "---\ntitle: Titled\nname: Named\n---\nbody");
        assert_eq!(extract_title(&c), "Titled");
    }

    #[test]
    fn title_from_heading_after_frontmatter() {
        let a = agent("x", "---\nother: 1\n---\n\n# Review Checklist\n\ntext");
        assert_eq!(extract_title(&a), "Review Checklist");
    }

    #[test]
    fn malformed_frontmatter_falls_through() {
        let a = agent("x", "---\nname: [unclosed\n---\n# From Heading\n");
        assert_eq!(extract_title(&a), "From Heading");
    }

    #[test]
    fn malformed_frontmatter_is_reported_at_info() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);
        impl Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let a = agent("x", "---\nname: [unclosed\n---\n# From Heading\n");
        tracing::subscriber::with_default(subscriber, || extract_title(&a));

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Malformed frontmatter"), "{logged}");
        assert!(logged.contains("INFO"), "{logged}");
    }

    #[test]
    fn empty_attribute_is_not_a_title() {
        let a = agent("dev-story", "<workflow title=\"\">");
        assert_eq!(extract_title(&a), "Dev Story");
    }

    #[test]
    fn title_fallback_is_title_cased_name() {
        let a = artifact("bmm", ArtifactKind::Workflow, "dev-story", "plain text only");
        assert_eq!(extract_title(&a), "Dev Story");
    }

    #[test]
    fn title_fallback_is_total_for_degenerate_names() {
        let a = artifact("bmm", ArtifactKind::Tool, "--", "");
        assert_eq!(extract_title(&a), "Tool");
    }

    #[test]
    fn split_frontmatter_requires_closing_fence() {
        assert_eq!(split_frontmatter("---\nname: x\nbody"), (None, "---\nname: x\nbody"));
        assert_eq!(
            split_frontmatter("---\nname: x\n---\nbody"),
            (Some("name: x"), "body")
        );
        assert_eq!(split_frontmatter("----\nx\n---\n"), (None, "----\nx\n---\n"));
        assert_eq!(split_frontmatter("---\nx: 1\n---"), (Some("x: 1"), ""));
    }

    #[test]
    fn split_frontmatter_accepts_empty_block() {
        assert_eq!(split_frontmatter("---\n---\nbody"), (Some(""), "body"));
    }

    #[test]
    fn split_frontmatter_handles_crlf() {
        let (yaml, body) = split_frontmatter("---\r\nname: x\r\n---\r\nbody\r\n");
        assert_eq!(yaml, Some("name: x"));
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn flat_path_uses_marker_module_kind_name() {
        let target = find_target("windsurf").unwrap();
        let path = destination_path(&agent("dev", ""), &target);
        assert_eq!(path, PathBuf::from(".windsurf/workflows/beat-core-agent-dev.md"));
    }

    #[test]
    fn nested_path_uses_owned_directory() {
        let target = find_target("claude-code").unwrap();
        let a = artifact("bmm", ArtifactKind::Task, "review", "");
        assert_eq!(
            destination_path(&a, &target),
            PathBuf::from(".claude/commands/beat/bmm/tasks/review.md")
        );
    }

    #[test]
    fn none_envelope_copies_content_verbatim() {
        let target = find_target("claude-code").unwrap();
        let raw = "---\nname: dev\n---\nbody";
        assert_eq!(render(&agent("dev", raw), &target).content, raw);
    }

    #[test]
    fn frontmatter_envelope_replaces_existing_header() {
        let target = find_target("windsurf").unwrap();
        let rendered = render(&agent("dev", "---\ntitle: Developer\n---\nBody text"), &target);
        assert_eq!(
            rendered.content,
            "---\ndescription: \"Developer\"\nmodule: core\nkind: agent\n---\n\nBody text\n"
        );
        assert_eq!(rendered.content.matches("---").count(), 2);
    }

    #[test]
    fn mdc_envelope_has_cursor_fields() {
        let target = find_target("cursor").unwrap();
        let rendered = render(&agent("dev", "<agent title=\"Developer\">"), &target);
        assert!(rendered.content.starts_with("---\ndescription: \"Developer\"\nglobs:\nalwaysApply: false\n---\n\n# Developer\n"));
        assert!(rendered.destination_path.ends_with("beat/core/agents/dev.mdc"));
    }

    #[test]
    fn header_envelope_prefixes_heading() {
        let target = find_target("cline").unwrap();
        let rendered = render(&agent("dev", "text"), &target);
        assert_eq!(rendered.content, "# Dev\n\ntext\n");
    }

    #[test]
    fn toml_envelope_parses_back_to_body() {
        let target = find_target("gemini").unwrap();
        let body = "Use \"\"\"triple\"\"\" quotes and C:\\paths\n<agent title=\"Dev \\ \"Ops\"\">";
        let rendered = render(&agent("dev", body), &target);

        let table: toml::Table = toml::from_str(&rendered.content).unwrap();
        assert_eq!(table["prompt"].as_str().unwrap().trim_end(), body);
        assert_eq!(table["description"].as_str().unwrap(), "Dev \\");
        assert!(rendered
            .destination_path
            .ends_with("beat-core-agent-dev.toml"));
    }

    #[test]
    fn toml_envelope_escapes_control_characters() {
        let target = find_target("gemini").unwrap();
        let body = "Press Ctrl-L\u{0c} to clear\n\x1b[31mred\x1b[0m\rdone";
        let rendered = render(&agent("dev", body), &target);

        let table: toml::Table = toml::from_str(&rendered.content).unwrap();
        assert_eq!(table["prompt"].as_str().unwrap(), format!("{body}\n"));
    }

    #[test]
    fn every_target_renders_non_empty_content_for_titled_agent() {
        let a = agent("dev", "<agent title=\"Developer\">body</agent>");
        for target in all_targets() {
            let rendered = render(&a, &target);
            assert!(rendered.content.contains("Developer"), "{}", target.name);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        fn kind_strategy() -> impl Strategy<Value = ArtifactKind> {
            prop::sample::select(ArtifactKind::ALL.to_vec())
        }

        fn identity_strategy() -> impl Strategy<Value = (String, ArtifactKind, String)> {
            ("[a-z0-9_]{1,6}", kind_strategy(), "[a-z0-9_-]{1,10}")
        }

        proptest! {
            /// Rendering the same artifact twice is byte-identical.
            #[test]
            fn render_is_deterministic(
                (module, kind, name) in identity_strategy(),
                body in "\\PC{0,200}",
                target_idx in 0usize..19,
            ) {
                let targets = all_targets();
                let target = &targets[target_idx % targets.len()];
                let a = artifact(&module, kind, &name, &body);
                prop_assert_eq!(render(&a, target), render(&a, target));
            }

            /// Distinct identities never share a destination path.
            #[test]
            fn distinct_identities_never_collide(
                ids in prop::collection::hash_set(identity_strategy(), 1..40),
            ) {
                for target in all_targets() {
                    let mut paths = HashSet::new();
                    for (module, kind, name) in &ids {
                        let a = artifact(module, *kind, name, "");
                        prop_assert!(
                            paths.insert(destination_path(&a, &target)),
                            "collision under {}", target.name
                        );
                    }
                }
            }

            /// TOML output parses for any body, control characters included.
            #[test]
            fn toml_envelope_always_parses(
                chars in prop::collection::vec(
                    prop_oneof![
                        3 => any::<char>(),
                        1 => (0u32..0x20).prop_map(|c| char::from_u32(c).unwrap()),
                        1 => Just('\u{7f}'),
                        1 => Just('"'),
                        1 => Just('\\'),
                    ],
                    0..120,
                ),
            ) {
                let body: String = chars.into_iter().collect();
                let a = artifact("core", ArtifactKind::Task, "any", &body);
                for name in ["gemini", "qwen"] {
                    let target = find_target(name).unwrap();
                    let rendered = render(&a, &target);
                    let parsed = toml::from_str::<toml::Table>(&rendered.content);
                    prop_assert!(parsed.is_ok(), "{}: {:?}", name, parsed.err());
                }
            }

            /// Title extraction never yields an empty title.
            #[test]
            fn title_is_never_empty(
                name in "[a-z0-9_-]{0,10}",
                body in "\\PC{0,200}",
            ) {
                let a = artifact("core", ArtifactKind::Task, &name, &body);
                prop_assert!(!extract_title(&a).is_empty());
            }
        }
    }
}
