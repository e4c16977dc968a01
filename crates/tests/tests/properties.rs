use playforge_core::{classify, find_secrets, Category, SecretKind};
use proptest::prelude::*;

const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("helm", Category::Kubernetes),
    ("dockerfile", Category::Docker),
    ("postgres", Category::Database),
    ("grafana", Category::Monitoring),
    ("iptables", Category::Security),
    ("subnet", Category::Network),
    ("jenkins", Category::Cicd),
];

proptest! {
    #[test]
    fn classify_is_total_and_deterministic(text in any::<String>()) {
        let first = classify(&text);
        let second = classify(&text);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.raw_text, text);
    }

    #[test]
    fn lone_keyword_wins_despite_noise(
        index in 0..CATEGORY_KEYWORDS.len(),
        upper in any::<bool>(),
        noise in "[ñçøéü🚀 ,.!?]{0,12}",
    ) {
        let (keyword, expected) = CATEGORY_KEYWORDS[index];
        let keyword = if upper { keyword.to_uppercase() } else { keyword.to_string() };
        let text = format!("{noise} {keyword} {noise}");
        prop_assert_eq!(classify(&text).category, expected);
    }

    #[test]
    fn keyword_free_text_is_system(text in "[xyzq ,.!?ñ🚀]{0,40}") {
        prop_assert_eq!(classify(&text).category, Category::System);
    }

    #[test]
    fn find_secrets_never_panics(text in any::<String>()) {
        for finding in find_secrets(&text) {
            prop_assert!(finding.start < finding.end);
            prop_assert!(text.is_char_boundary(finding.start));
            prop_assert!(finding.end <= text.len());
        }
    }

    #[test]
    fn templated_passwords_are_skipped(name in "[a-z_]{1,20}") {
        let text = format!("password: \"{{{{ {name} }}}}\"");
        let findings = find_secrets(&text);
        prop_assert!(findings.iter().all(|f| f.kind != SecretKind::Password));
    }
}
