use std::collections::BTreeSet;

use playforge_core::{classify, Category, Environment, RequestContext, Requirement, Tag};

fn assert_category(prompts: &[&str], expected: Category) {
    for prompt in prompts {
        assert_eq!(classify(prompt).category, expected, "failed for: {prompt}");
    }
}

#[test]
fn detects_docker_requests() {
    assert_category(
        &[
            "Install Docker on Ubuntu servers",
            "Setup Docker Compose",
            "Build and push container image",
            "Configure Docker Swarm cluster",
        ],
        Category::Docker,
    );
}

#[test]
fn detects_database_requests() {
    assert_category(
        &[
            "Setup PostgreSQL database",
            "Install MySQL with replication",
            "Configure MongoDB cluster",
            "Deploy Redis cache",
        ],
        Category::Database,
    );
}

#[test]
fn detects_security_requests() {
    assert_category(
        &[
            "Harden server security",
            "Configure firewall rules",
            "Setup SSL certificates",
            "Enable SELinux",
        ],
        Category::Security,
    );
}

#[test]
fn detects_network_and_cicd_requests() {
    assert_category(&["Configure DNS and DHCP", "Create a VLAN"], Category::Network);
    assert_category(
        &["Install Jenkins", "Add a GitHub Actions pipeline"],
        Category::Cicd,
    );
}

#[test]
fn unmatched_requests_fall_back_to_system() {
    assert_category(&["Setup something on server", "", "🚀🚀"], Category::System);
}

#[test]
fn matching_ignores_case_and_unicode_noise() {
    assert_category(
        &[
            "Deploy to KUBERNETES",
            "deploy to kubernetes",
            "Deploy aplikáció to Kubernetes with émojis 🚀",
            "«kubectl»!!",
        ],
        Category::Kubernetes,
    );
}

#[test]
fn extracts_environments() {
    let cases = [
        ("Deploy to production environment", Environment::Production),
        ("Configure prod servers", Environment::Production),
        ("Deploy to staging environment", Environment::Staging),
        ("Configure dev servers", Environment::Development),
        ("Create development database", Environment::Development),
        ("Spin up a box", Environment::Production),
    ];

    for (prompt, expected) in cases {
        assert_eq!(classify(prompt).environment, expected, "failed for: {prompt}");
    }
}

#[test]
fn requirements_are_not_exclusive() {
    let context =
        classify("Deploy highly available, scalable and secure application with monitoring");

    for requirement in [
        Requirement::HighAvailability,
        Requirement::Scalability,
        Requirement::Security,
        Requirement::Monitoring,
    ] {
        assert!(context.requirements.contains(&requirement), "{requirement:?}");
    }
}

#[test]
fn backup_requirement_and_tag() {
    let context = classify("Nightly snapshot and restore drill");
    assert!(context.requirements.contains(&Requirement::Backup));
    assert_eq!(context.tags, vec![Tag::Backup]);
}

#[test]
fn generates_tags_in_table_order() {
    let context = classify("Install and configure secure web server with backup");
    assert_eq!(
        context.tags,
        vec![Tag::Install, Tag::Configure, Tag::Security, Tag::Backup]
    );
}

#[test]
fn empty_prompt_yields_exact_defaults() {
    let context = classify("");
    assert_eq!(
        context,
        RequestContext {
            raw_text: String::new(),
            category: Category::System,
            environment: Environment::Production,
            requirements: BTreeSet::new(),
            tags: Vec::new(),
        }
    );
}

#[test]
fn raw_text_is_preserved_verbatim() {
    let prompt = "  Deploy\tRedis  ";
    assert_eq!(classify(prompt).raw_text, prompt);
}

#[test]
fn context_serializes_with_snake_case_labels() {
    let json = serde_json::to_value(classify("Setup HA Redis in staging")).unwrap();
    assert_eq!(json["category"], "database");
    assert_eq!(json["environment"], "staging");
    assert_eq!(json["requirements"][0], "high_availability");
    assert_eq!(json["tags"], serde_json::json!(["install", "configure"]));
}
