use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Category, Environment, RequestContext, Requirement, Tag};

// Declaration order is precedence: the first category that matches wins.
static CATEGORY_RULES: Lazy<Vec<(Category, Regex)>> = Lazy::new(|| {
    vec![
        (
            Category::Kubernetes,
            word_pattern(&[
                "k8s",
                "kubernetes",
                "kubectl",
                "pods?",
                "deployments?",
                "helm",
                "kube",
            ]),
        ),
        (
            Category::Docker,
            word_pattern(&["docker", "containers?", "dockerfile", "compose", "swarm"]),
        ),
        (
            Category::Database,
            word_pattern(&[
                "databases?",
                "db",
                "mysql",
                "postgres",
                "postgresql",
                "mongodb",
                "redis",
                "sql",
            ]),
        ),
        (
            Category::Monitoring,
            word_pattern(&[
                "monitor(?:ing|s)?",
                "prometheus",
                "grafana",
                "nagios",
                "zabbix",
                "alert(?:s|ing)?",
                "metrics?",
            ]),
        ),
        (
            Category::Security,
            word_pattern(&[
                "security",
                "firewall",
                "ssl",
                "tls",
                "certificates?",
                "harden(?:ing)?",
                "selinux",
                "iptables",
            ]),
        ),
        (
            Category::Network,
            word_pattern(&[
                "network(?:s|ing)?",
                "dns",
                "dhcp",
                "router",
                "switch",
                "vlan",
                "subnet",
            ]),
        ),
        (
            Category::Cicd,
            word_pattern(&[
                "jenkins",
                "gitlab.?ci",
                "github.?actions",
                "pipeline",
                "cicd",
                "ci/cd",
            ]),
        ),
    ]
});

static ENVIRONMENT_RULES: Lazy<Vec<(Environment, Regex)>> = Lazy::new(|| {
    vec![
        (Environment::Production, word_pattern(&["prod", "production"])),
        (Environment::Staging, word_pattern(&["stag", "staging"])),
        (Environment::Development, word_pattern(&["dev", "development"])),
    ]
});

// Stems match any word that starts with them ("scal" covers "scalable").
static REQUIREMENT_RULES: Lazy<Vec<(Requirement, Regex)>> = Lazy::new(|| {
    vec![
        (
            Requirement::HighAvailability,
            word_pattern(&[
                "ha",
                r"high(?:ly)?[\s_-]?availab\w*",
                r"cluster\w*",
                r"redundan\w*",
            ]),
        ),
        (
            Requirement::Scalability,
            word_pattern(&[r"scal\w*", r"autoscal\w*", r"replica\w*"]),
        ),
        (
            Requirement::Security,
            word_pattern(&[r"secur\w*", r"harden\w*", r"encrypt\w*", "ssl", "tls"]),
        ),
        (
            Requirement::Monitoring,
            word_pattern(&[r"monitor\w*", r"alert\w*", r"metric\w*", "logs?", "logging"]),
        ),
        (
            Requirement::Backup,
            word_pattern(&[r"backup\w*", r"snapshot\w*", r"restor\w*", "recovery"]),
        ),
    ]
});

const TAG_KEYWORDS: &[(Tag, &[&str])] = &[
    (Tag::Install, &["install", "setup", "deploy"]),
    (Tag::Configure, &["config", "setup", "settings"]),
    (Tag::Security, &["secure", "harden", "firewall"]),
    (Tag::Update, &["update", "upgrade", "patch"]),
    (Tag::Backup, &["backup", "snapshot", "restore"]),
];

/// Classifies a free-text automation request.
///
/// Total over every input: anything without a recognised keyword falls back
/// to `System` in `Production` with no requirements and no tags.
pub fn classify(text: &str) -> RequestContext {
    let mut context = RequestContext::new(text);

    if let Some(category) = detect_category(text) {
        context.category = category;
    }

    if let Some(environment) = detect_environment(text) {
        context.environment = environment;
    }

    context.requirements = REQUIREMENT_RULES
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(requirement, _)| *requirement)
        .collect();

    context.tags = generate_tags(text);
    context
}

pub fn detect_category(text: &str) -> Option<Category> {
    first_match(&CATEGORY_RULES, text)
}

pub fn detect_environment(text: &str) -> Option<Environment> {
    first_match(&ENVIRONMENT_RULES, text)
}

pub fn generate_tags(text: &str) -> Vec<Tag> {
    let lower = text.to_lowercase();

    TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(tag, _)| *tag)
        .collect()
}

fn first_match<T: Copy>(rules: &[(T, Regex)], text: &str) -> Option<T> {
    rules
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(value, _)| *value)
}

fn word_pattern(alternatives: &[&str]) -> Regex {
    let source = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Regex::new(&source).expect("valid keyword regex")
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
