//! End-to-end scenarios through the public entry points
//!
//! Each test drives `check_source` / `fix_source` with a configuration that
//! selects the rules under test, so unrelated rules do not interfere.

use stylefix::rules::{arrays, comments, conditions, line_breaks, whitespace};
use stylefix::{check_source, fix_source, Config, Outcome};

fn only(codes: &[&str]) -> Config {
    let mut config = Config::default();
    config.rules.select = codes.iter().map(|c| c.to_string()).collect();
    config
}

#[test]
fn test_one_blank_line_after_brace_before_return_is_compliant() {
    let config = only(&[line_breaks::EMPTY_LINE_BEFORE_RETURN]);
    let source = "<?php\n\nfunction f($a)\n{\n    if ($a) {\n        foo();\n    }\n\n    return false;\n}\n";
    let report = check_source(source, &config).unwrap();
    assert!(report.is_clean(), "{:?}", report.diagnostics);
}

#[test]
fn test_missing_blank_line_before_return_inserts_one_break() {
    let config = only(&[line_breaks::EMPTY_LINE_BEFORE_RETURN]);
    let source = "<?php\n\nfunction f($a)\n{\n    if ($a) {\n        foo();\n    }\n    return false;\n}\n";

    let report = check_source(source, &config).unwrap();
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].fixable);
    assert_eq!(report.diagnostics[0].line, 8);

    let outcome = fix_source(source, &config).unwrap();
    assert_eq!(
        outcome.text,
        "<?php\n\nfunction f($a)\n{\n    if ($a) {\n        foo();\n    }\n\n    return false;\n}\n"
    );
    assert!(outcome.report.is_clean());
}

#[test]
fn test_run_length_whitespace_around_assignment() {
    let config = only(&[whitespace::OPERATOR_SPACING]);
    let source = "<?php\n\n$a  =  5;\n";

    let report = check_source(source, &config).unwrap();
    assert_eq!(report.diagnostics.len(), 2);
    assert!(report.diagnostics.iter().all(|d| d.fixable));
    assert!(report.diagnostics[0].message.contains("before"));
    assert!(report.diagnostics[1].message.contains("after"));

    let outcome = fix_source(source, &config).unwrap();
    assert_eq!(outcome.text, "<?php\n\n$a = 5;\n");
    assert_eq!(outcome.fixes_applied, 2);
}

#[test]
fn test_tag_order_rewrites_segments() {
    let config = only(&[comments::TAG_ORDER]);
    let source = "<?php\n\n/**\n * Summary\n *\n * @return int\n * @param int $a The value\n * @throws \\RuntimeException\n */\nfunction f($a) {}\n";

    let report = check_source(source, &config).unwrap();
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0]
        .message
        .contains("expected @param, @return, @throws"));

    let outcome = fix_source(source, &config).unwrap();
    assert_eq!(
        outcome.text,
        "<?php\n\n/**\n * Summary\n *\n * @param int $a The value\n * @return int\n * @throws \\RuntimeException\n */\nfunction f($a) {}\n"
    );
}

#[test]
fn test_block_search_ceiling_is_an_internal_diagnostic() {
    let mut config = only(&[line_breaks::CONTROL_STRUCTURE_SPACING]);
    config.engine.block_search_limit = 3;
    let mut source = String::from("<?php\n\n$a = 1;\n\nif ($a) {\n}");
    for _ in 0..20 {
        source.push_str(" elseif ($a) {\n}");
    }
    source.push_str(" else {\n}\n");

    let report = check_source(&source, &config).unwrap();
    let internal: Vec<_> = report.internal_errors().collect();
    assert_eq!(internal.len(), 1);
    assert_eq!(internal[0].rule, line_breaks::CONTROL_STRUCTURE_SPACING);
    assert!(!internal[0].fixable);
    assert_eq!(report.violations().count(), 0);
}

#[test]
fn test_deep_chain_within_default_limit_is_judged() {
    let config = only(&[line_breaks::CONTROL_STRUCTURE_SPACING]);
    let mut source = String::from("<?php\n\n$a = 1;\nif ($a) {\n}");
    for _ in 0..20 {
        source.push_str(" elseif ($a) {\n}");
    }
    source.push_str("\n$b = 2;\n");

    let report = check_source(&source, &config).unwrap();
    assert_eq!(report.internal_errors().count(), 0);
    assert_eq!(report.violations().count(), 2);
}

#[test]
fn test_trailing_comma_single_line_is_the_inverse_of_multi_line() {
    let config = only(&[arrays::TRAILING_COMMA]);

    let single_with = check_source("<?php\n\n$a = [1, 2,];\n", &config).unwrap();
    assert_eq!(single_with.violations().count(), 1);
    let single_without = check_source("<?php\n\n$a = [1, 2];\n", &config).unwrap();
    assert!(single_without.is_clean());

    let multi_without = check_source("<?php\n\n$a = [\n    1,\n    2\n];\n", &config).unwrap();
    assert_eq!(multi_without.violations().count(), 1);
    let multi_with = check_source("<?php\n\n$a = [\n    1,\n    2,\n];\n", &config).unwrap();
    assert!(multi_with.is_clean());
}

#[test]
fn test_fixes_spread_over_passes() {
    let source = "<?php\n\n$a = array(\n    1,\n    2\n);\n";
    let outcome = fix_source(source, &Config::default()).unwrap();
    assert_eq!(outcome.text, "<?php\n\n$a = [\n    1,\n    2,\n];\n");
    assert_eq!(outcome.passes, 3);
    assert!(outcome.report.is_clean());
}

#[test]
fn test_report_only_rules_stay_reported() {
    let mut config = only(&[whitespace::OPERATOR_SPACING]);
    config.rules.report_only = vec![whitespace::OPERATOR_SPACING.to_string()];
    let source = "<?php\n\n$a  = 5;\n";

    let outcome = fix_source(source, &config).unwrap();
    assert_eq!(outcome.text, source);
    assert_eq!(outcome.report.count(Outcome::ReportedOnly), 1);
    assert!(outcome.report.diagnostics[0].fixable);
}

#[test]
fn test_condition_with_multi_line_string_is_left_alone() {
    let config = only(&[conditions::SINGLE_LINE]);
    let source = "<?php\n\nif ($a == 'x\ny') {\n}\n";

    let outcome = fix_source(source, &config).unwrap();
    assert_eq!(outcome.text, source);
    assert_eq!(outcome.fixes_applied, 0);
    assert_eq!(outcome.passes, 1);
    assert_eq!(outcome.report.diagnostics.len(), 1);
    assert_eq!(outcome.report.fixable_count(), 0);
    assert_eq!(outcome.report.count(Outcome::Fixed), 0);
}

#[test]
fn test_full_catalog_fix_is_stable() {
    let source = "<?php\n\nnamespace App;\n\n\n\nclass A\n{\n\n    /**\n     * @return int\n     * @param int    $a\n     * @author Someone\n     *\n     */\n    public function f($a)\n    {\n        $b  = array(1, 2,);\n        if ($a\n            && $b) {\n            $c = $a ;\n        }\n        return $b;\n    }\n}\n";
    let first = fix_source(source, &Config::default()).unwrap();
    assert!(first.fixes_applied > 0);
    assert_eq!(first.report.fixable_count(), 0, "{:?}", first.report.diagnostics);

    let second = fix_source(&first.text, &Config::default()).unwrap();
    assert_eq!(second.text, first.text);
    assert_eq!(second.fixes_applied, 0);
}
