//! Authoring-quality checks for playbook text.
//!
//! Text is parsed into a [`Node`] tree first and lifted into [`Play`] and
//! [`Task`] values; every rule inspects that structure. Comments and string
//! literals that merely mention `become:` or `tags:` never influence a rule.

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::FormatError;
use crate::models::{QualityFinding, QualityRule};

const ESCALATION_KEYS: &[&str] = &["become", "become_user", "become_method"];
const CONDITIONAL_KEYS: &[&str] = &["when", "changed_when", "failed_when"];
const TASK_SECTIONS: &[&str] = &["pre_tasks", "tasks", "post_tasks"];
const BLOCK_SECTIONS: &[&str] = &["block", "rescue", "always"];

const TASK_KEYWORDS: &[&str] = &[
    "name",
    "when",
    "tags",
    "notify",
    "listen",
    "become",
    "become_user",
    "become_method",
    "become_flags",
    "register",
    "loop",
    "loop_control",
    "vars",
    "environment",
    "ignore_errors",
    "ignore_unreachable",
    "changed_when",
    "failed_when",
    "delegate_to",
    "delegate_facts",
    "run_once",
    "args",
    "no_log",
    "retries",
    "delay",
    "until",
    "check_mode",
    "diff",
    "async",
    "poll",
    "any_errors_fatal",
    "timeout",
    "throttle",
    "collections",
    "module_defaults",
    "debugger",
    "connection",
    "remote_user",
    "port",
];

const PRIVILEGED_MODULES: &[&str] = &[
    "apt",
    "apt_key",
    "apt_repository",
    "yum",
    "yum_repository",
    "dnf",
    "package",
    "zypper",
    "apk",
    "pacman",
    "snap",
    "service",
    "systemd",
    "systemd_service",
    "sysvinit",
    "user",
    "group",
    "mount",
    "sysctl",
    "firewalld",
    "ufw",
    "iptables",
    "selinux",
    "seboolean",
    "seport",
    "authorized_key",
    "hostname",
    "modprobe",
    "reboot",
    "timezone",
    "pam_limits",
    "filesystem",
    "lvg",
    "lvol",
];

const FILE_WRITING_MODULES: &[&str] = &[
    "copy",
    "template",
    "file",
    "lineinfile",
    "blockinfile",
    "replace",
    "unarchive",
    "get_url",
    "ini_file",
    "assemble",
];

const SYSTEM_PATH_PREFIXES: &[&str] = &[
    "/etc/", "/usr/", "/var/", "/opt/", "/root/", "/boot/", "/lib/", "/srv/",
];

/// Structural document tree produced from YAML text.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<(String, Node)>),
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Scalar(flag.to_string()),
            Value::Number(number) => Self::Scalar(number.to_string()),
            Value::String(text) => Self::Scalar(text),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key_text(key), Self::from(value)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

impl Node {
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Self::Mapping(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.has(key))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// A scalar or a sequence of scalars, flattened into owned strings.
    pub fn scalars(&self) -> Vec<String> {
        match self {
            Self::Scalar(text) => vec![text.clone()],
            Self::Sequence(items) => items
                .iter()
                .filter_map(|item| item.as_scalar().map(ToString::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

fn key_text(key: Value) -> String {
    match Node::from(key) {
        Node::Scalar(text) => text,
        _ => String::new(),
    }
}

/// A single executable step, with directives inherited from enclosing blocks
/// and the owning play already folded in.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: Option<String>,
    pub module: Option<String>,
    pub args: Node,
    pub escalated: bool,
    pub tagged: bool,
    pub conditional: bool,
    pub notify: Vec<String>,
    pub listen: Vec<String>,
}

impl Task {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("task '{name}'"),
            None => "unnamed task".to_string(),
        }
    }

    pub fn is_privileged(&self) -> bool {
        let Some(module) = self.module.as_deref() else {
            return false;
        };

        if PRIVILEGED_MODULES.contains(&module) {
            return true;
        }

        FILE_WRITING_MODULES.contains(&module)
            && ["dest", "path"].iter().any(|key| {
                argument(&self.args, key).is_some_and(|target| {
                    SYSTEM_PATH_PREFIXES
                        .iter()
                        .any(|prefix| target.starts_with(prefix))
                })
            })
    }
}

#[derive(Debug, Clone)]
pub struct Play {
    pub name: Option<String>,
    pub has_hosts: bool,
    pub imports_playbook: bool,
    pub has_roles: bool,
    pub tagged: bool,
    pub tasks: Vec<Task>,
    pub handlers: Vec<Task>,
}

impl Play {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("play '{name}'"),
            None => "unnamed play".to_string(),
        }
    }

    fn from_node(node: &Node) -> Result<Self, FormatError> {
        let escalated = node.has_any(ESCALATION_KEYS);
        let inherited = Inherited {
            escalated,
            tagged: false,
            conditional: false,
        };

        let mut tasks = Vec::new();
        for section in TASK_SECTIONS {
            if let Some(items) = node.get(section) {
                collect_tasks(items, inherited, &mut tasks)?;
            }
        }

        let mut handlers = Vec::new();
        if let Some(items) = node.get("handlers") {
            collect_tasks(items, inherited, &mut handlers)?;
        }

        let roles = node.get("roles");
        let roles_tagged = matches!(roles, Some(Node::Sequence(entries))
            if entries.iter().any(|entry| entry.has("tags")));

        Ok(Self {
            name: node.get("name").and_then(Node::as_scalar).map(ToString::to_string),
            has_hosts: node.has("hosts"),
            imports_playbook: node
                .has_any(&["import_playbook", "ansible.builtin.import_playbook"]),
            has_roles: matches!(roles, Some(Node::Sequence(entries)) if !entries.is_empty()),
            tagged: node.has("tags") || roles_tagged,
            tasks,
            handlers,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Inherited {
    escalated: bool,
    tagged: bool,
    conditional: bool,
}

fn collect_tasks(
    items: &Node,
    inherited: Inherited,
    out: &mut Vec<Task>,
) -> Result<(), FormatError> {
    let entries = match items {
        Node::Null => return Ok(()),
        Node::Sequence(entries) => entries,
        other => {
            return Err(FormatError::Structure(format!(
                "expected a list of tasks, found a {}",
                other.kind()
            )))
        }
    };

    for entry in entries {
        let Node::Mapping(fields) = entry else {
            return Err(FormatError::Structure(format!(
                "expected a task mapping, found a {}",
                entry.kind()
            )));
        };

        let scope = Inherited {
            escalated: inherited.escalated || entry.has_any(ESCALATION_KEYS),
            tagged: inherited.tagged || entry.has("tags"),
            conditional: inherited.conditional || entry.has_any(CONDITIONAL_KEYS),
        };

        let nested: Vec<&Node> = BLOCK_SECTIONS
            .iter()
            .filter_map(|section| entry.get(section))
            .collect();
        if !nested.is_empty() {
            for section in nested {
                collect_tasks(section, scope, out)?;
            }
            continue;
        }

        let (module, mut args) = module_of(fields);
        if let Some(Node::Mapping(extra)) = entry.get("args") {
            args = merge_args(args, extra);
        }

        out.push(Task {
            name: entry.get("name").and_then(Node::as_scalar).map(ToString::to_string),
            module,
            args,
            escalated: scope.escalated,
            tagged: scope.tagged,
            conditional: scope.conditional,
            notify: entry.get("notify").map(Node::scalars).unwrap_or_default(),
            listen: entry.get("listen").map(Node::scalars).unwrap_or_default(),
        });
    }

    Ok(())
}

fn module_of(fields: &[(String, Node)]) -> (Option<String>, Node) {
    let Some((key, value)) = fields
        .iter()
        .find(|(key, _)| !TASK_KEYWORDS.contains(&key.as_str()) && !key.starts_with("with_"))
    else {
        return (None, Node::Null);
    };

    if key == "action" || key == "local_action" {
        return match value {
            Node::Scalar(line) => {
                let mut parts = line.splitn(2, char::is_whitespace);
                let module = parts.next().map(short_module_name);
                let args = parts
                    .next()
                    .map(|rest| Node::Scalar(rest.trim().to_string()))
                    .unwrap_or(Node::Null);
                (module, args)
            }
            Node::Mapping(_) => (
                value
                    .get("module")
                    .and_then(Node::as_scalar)
                    .map(short_module_name),
                value.clone(),
            ),
            _ => (None, Node::Null),
        };
    }

    (Some(short_module_name(key)), value.clone())
}

fn short_module_name(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_string()
}

fn merge_args(args: Node, extra: &[(String, Node)]) -> Node {
    let mut merged = match args {
        Node::Mapping(entries) => entries,
        _ => Vec::new(),
    };
    merged.extend(extra.iter().cloned());
    Node::Mapping(merged)
}

/// Reads an argument from structured (`dest: /etc/x`) or free-form
/// (`dest=/etc/x`) module arguments.
fn argument(args: &Node, key: &str) -> Option<String> {
    match args {
        Node::Mapping(_) => args.get(key).and_then(Node::as_scalar).map(ToString::to_string),
        Node::Scalar(line) => line.split_whitespace().find_map(|token| {
            token
                .strip_prefix(key)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| value.trim_matches(|c: char| c == '"' || c == '\'').to_string())
        }),
        _ => None,
    }
}

/// Parses every YAML document in `text` and lifts the plays it contains.
pub fn parse_playbook(text: &str) -> Result<Vec<Play>, FormatError> {
    let mut plays = Vec::new();

    for document in serde_yaml::Deserializer::from_str(text) {
        let root = Node::from(Value::deserialize(document)?);
        match &root {
            Node::Null => {}
            Node::Sequence(items) => {
                for item in items {
                    if !matches!(item, Node::Mapping(_)) {
                        return Err(FormatError::Structure(format!(
                            "expected a play mapping, found a {}",
                            item.kind()
                        )));
                    }
                    plays.push(Play::from_node(item)?);
                }
            }
            other => {
                return Err(FormatError::Structure(format!(
                    "expected a list of plays, found a {}",
                    other.kind()
                )))
            }
        }
    }

    Ok(plays)
}

/// Runs the standard rule set: `missing_become`, `missing_tags` and
/// `dangling_notify`.
pub fn check_quality(text: &str) -> Result<Vec<QualityFinding>, FormatError> {
    check_quality_with(text, false)
}

/// Like [`check_quality`]; `strict` adds `missing_conditionals` and
/// `incomplete_play`.
pub fn check_quality_with(text: &str, strict: bool) -> Result<Vec<QualityFinding>, FormatError> {
    let plays = parse_playbook(text)?;
    let mut findings = Vec::new();

    findings.extend(missing_become(&plays));
    findings.extend(missing_tags(&plays));
    findings.extend(dangling_notify(&plays));

    if strict {
        findings.extend(missing_conditionals(&plays));
        findings.extend(incomplete_plays(&plays));
    }

    Ok(findings)
}

fn all_tasks(plays: &[Play]) -> impl Iterator<Item = &Task> {
    plays
        .iter()
        .flat_map(|play| play.tasks.iter().chain(play.handlers.iter()))
}

fn missing_become(plays: &[Play]) -> Vec<QualityFinding> {
    all_tasks(plays)
        .filter(|task| task.is_privileged() && !task.escalated)
        .map(|task| {
            QualityFinding::new(
                QualityRule::MissingBecome,
                format!(
                    "{} uses `{}` without a become directive",
                    task.label(),
                    task.module.as_deref().unwrap_or_default()
                ),
            )
        })
        .collect()
}

fn missing_tags(plays: &[Play]) -> Option<QualityFinding> {
    let has_steps = plays.iter().any(|play| !play.tasks.is_empty());
    let tagged = plays.iter().any(|play| play.tagged) || all_tasks(plays).any(|task| task.tagged);

    (has_steps && !tagged).then(|| {
        QualityFinding::new(
            QualityRule::MissingTags,
            "tasks are defined but nothing carries tags, so selective runs are impossible",
        )
    })
}

fn dangling_notify(plays: &[Play]) -> Vec<QualityFinding> {
    let mut findings = Vec::new();

    for play in plays {
        let mut missing: Vec<&str> = Vec::new();

        for name in play
            .tasks
            .iter()
            .chain(play.handlers.iter())
            .flat_map(|task| task.notify.iter())
        {
            if name.contains("{{") || missing.contains(&name.as_str()) {
                continue;
            }

            let handled = play.handlers.iter().any(|handler| {
                handler.name.as_deref() == Some(name.as_str()) || handler.listen.contains(name)
            });
            if !handled {
                missing.push(name);
            }
        }

        findings.extend(missing.into_iter().map(|name| {
            QualityFinding::new(
                QualityRule::DanglingNotify,
                format!("{} notifies '{name}' but no handler answers to it", play.label()),
            )
        }));
    }

    findings
}

fn missing_conditionals(plays: &[Play]) -> Option<QualityFinding> {
    let mut tasks = plays.iter().flat_map(|play| play.tasks.iter()).peekable();
    if tasks.peek().is_none() {
        return None;
    }

    (!tasks.any(|task| task.conditional)).then(|| {
        QualityFinding::new(
            QualityRule::MissingConditionals,
            "no task uses when, changed_when or failed_when",
        )
    })
}

fn incomplete_plays(plays: &[Play]) -> Vec<QualityFinding> {
    plays
        .iter()
        .filter(|play| !play.imports_playbook)
        .filter_map(|play| {
            let mut gaps = Vec::new();
            if !play.has_hosts {
                gaps.push("hosts");
            }
            if play.tasks.is_empty() && !play.has_roles {
                gaps.push("tasks or roles");
            }

            (!gaps.is_empty()).then(|| {
                QualityFinding::new(
                    QualityRule::IncompletePlay,
                    format!("{} is missing {}", play.label(), gaps.join(" and ")),
                )
            })
        })
        .collect()
}
