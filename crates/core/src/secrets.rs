//! Hardcoded secret detection for generated scripts.
//!
//! Templated references such as `{{ vault_password }}` are the sanctioned way
//! to keep credentials out of a script, so they are blanked out before any
//! detector runs. Blanking keeps byte offsets stable, which lets findings
//! point back into the caller's original text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{SecretFinding, SecretKind};

struct SecretRule {
    id: &'static str,
    kind: SecretKind,
    pattern: Regex,
}

impl SecretRule {
    fn new(id: &'static str, kind: SecretKind, pattern: &str) -> Self {
        Self {
            id,
            kind,
            pattern: Regex::new(pattern).expect("valid secret regex"),
        }
    }
}

// A reference never spans lines or contains another `{{`, so a stray opener
// cannot blank out literals that follow it.
static TEMPLATE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(?:[^{}\n]|\{[^{\n]|\}[^}\n])*?\}\}").expect("valid template regex")
});

static SECRET_RULES: Lazy<Vec<SecretRule>> = Lazy::new(|| {
    vec![
        SecretRule::new(
            "aws_access_key",
            SecretKind::AwsAccessKey,
            r"AKIA[0-9A-Z]{16}",
        ),
        SecretRule::new(
            "aws_session_key",
            SecretKind::AwsAccessKey,
            r"ASIA[0-9A-Z]{16}",
        ),
        // Keys that merely end in the keyword (`become_password_file=...`)
        // match too; placeholders such as `changeme` are not exempted.
        SecretRule::new(
            "password",
            SecretKind::Password,
            r#"(?i)password['":\s]*['"]?[^'"}\s]{8,}"#,
        ),
        SecretRule::new(
            "private_key",
            SecretKind::PrivateKey,
            r"-----BEGIN (?:RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----",
        ),
        SecretRule::new(
            "github_token",
            SecretKind::Token,
            r"gh[pousr]_[A-Za-z0-9]{36}",
        ),
        SecretRule::new(
            "gitlab_token",
            SecretKind::Token,
            r"glpat-[A-Za-z0-9_-]{20}",
        ),
        SecretRule::new(
            "slack_token",
            SecretKind::Token,
            r"xox[abprs]-[A-Za-z0-9-]{10,}",
        ),
    ]
});

const EXCERPT_PREFIX_CHARS: usize = 4;

/// Scans `text` for credential-like literals. Never fails; an empty result
/// means nothing matched.
pub fn find_secrets(text: &str) -> Vec<SecretFinding> {
    let inspectable = mask_template_references(text);
    let mut findings = Vec::new();

    for rule in SECRET_RULES.iter() {
        for found in rule.pattern.find_iter(&inspectable) {
            findings.push(SecretFinding {
                kind: rule.kind,
                rule: rule.id.to_string(),
                line: line_of(text, found.start()),
                start: found.start(),
                end: found.end(),
                excerpt: redact(found.as_str()),
            });
        }
    }

    findings
}

/// Replaces every `{{ ... }}` span with spaces of the same byte length.
pub fn mask_template_references(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in TEMPLATE_REFERENCE.find_iter(text) {
        masked.push_str(&text[cursor..span.start()]);
        masked.extend(std::iter::repeat(' ').take(span.len()));
        cursor = span.end();
    }

    masked.push_str(&text[cursor..]);
    masked
}

fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset]
        .iter()
        .filter(|byte| **byte == b'\n')
        .count()
        + 1
}

fn redact(matched: &str) -> String {
    let prefix: String = matched.chars().take(EXCERPT_PREFIX_CHARS).collect();
    format!("{prefix}***")
}
