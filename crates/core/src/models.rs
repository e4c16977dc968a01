use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Kubernetes,
    Docker,
    #[default]
    System,
    Network,
    Database,
    Monitoring,
    Security,
    Cicd,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Docker => "docker",
            Self::System => "system",
            Self::Network => "network",
            Self::Database => "database",
            Self::Monitoring => "monitoring",
            Self::Security => "security",
            Self::Cicd => "cicd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Development,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    HighAvailability,
    Scalability,
    Security,
    Monitoring,
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Install,
    Configure,
    Security,
    Update,
    Backup,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Configure => "configure",
            Self::Security => "security",
            Self::Update => "update",
            Self::Backup => "backup",
        }
    }
}

/// Structured view of a free-text automation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub raw_text: String,
    pub category: Category,
    pub environment: Environment,
    pub requirements: BTreeSet<Requirement>,
    pub tags: Vec<Tag>,
}

impl RequestContext {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            category: Category::default(),
            environment: Environment::default(),
            requirements: BTreeSet::new(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretKind {
    AwsAccessKey,
    Password,
    PrivateKey,
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretFinding {
    pub kind: SecretKind,
    pub rule: String,
    /// 1-based line of the first matched byte.
    pub line: usize,
    pub start: usize,
    pub end: usize,
    /// Redacted form of the match; never the full secret.
    pub excerpt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRule {
    MissingBecome,
    MissingTags,
    DanglingNotify,
    MissingConditionals,
    IncompletePlay,
}

impl QualityRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingBecome => "missing_become",
            Self::MissingTags => "missing_tags",
            Self::DanglingNotify => "dangling_notify",
            Self::MissingConditionals => "missing_conditionals",
            Self::IncompletePlay => "incomplete_play",
        }
    }

    /// Rules that only run in strict mode.
    pub fn is_strict(self) -> bool {
        matches!(self, Self::MissingConditionals | Self::IncompletePlay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFinding {
    pub rule: QualityRule,
    pub note: String,
}

impl QualityFinding {
    pub fn new(rule: QualityRule, note: impl Into<String>) -> Self {
        Self {
            rule,
            note: note.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionPolicy {
    pub strict: bool,
    pub block_on_secrets: bool,
    pub block_on_quality: bool,
    pub disabled_rules: Vec<QualityRule>,
}

impl Default for InspectionPolicy {
    fn default() -> Self {
        Self {
            strict: false,
            block_on_secrets: true,
            block_on_quality: false,
            disabled_rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionReport {
    pub secrets: Vec<SecretFinding>,
    pub quality: Vec<QualityFinding>,
    pub blocked: bool,
    pub notes: Vec<String>,
}
