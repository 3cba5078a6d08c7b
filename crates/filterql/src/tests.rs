//! Tests for the filter parser.

use super::*;
use chrono::{Duration, TimeZone, Utc};

fn parse_ok(input: &str) -> Filter {
    match parse(input) {
        Ok(filter) => filter,
        Err(err) => panic!("failed to parse {input:?}: {err}"),
    }
}

fn parse_err(input: &str) -> String {
    match parse(input) {
        Ok(filter) => panic!("expected {input:?} to fail, got {filter}"),
        Err(err) => err.to_string(),
    }
}

fn single(key: &str, comparator: Comparator, values: Vec<Value>) -> Filter {
    let composer = FilterComposer::new().with_key(key);
    match comparator {
        Comparator::Equal => composer.equals(values[0].clone()).done(),
        Comparator::NotEqual => composer.not_equals(values[0].clone()).done(),
        Comparator::Contain => composer.contains(values).done(),
        other => panic!("no helper for {other}"),
    }
}

// ==================== Simple Comparisons ====================

#[test]
fn test_parse_equal_string() {
    let filter = parse_ok(r#"name == "bob""#);
    assert_eq!(filter, single("name", Comparator::Equal, vec![Value::from("bob")]));
    assert_eq!(filter.to_string(), r#"name == "bob""#);
}

#[test]
fn test_parse_single_quotes() {
    assert_eq!(parse_ok("name == 'bob'").to_string(), r#"name == "bob""#);
}

#[test]
fn test_parse_quoted_value_keeps_whitespace() {
    let filter = parse_ok(r#"name == "hello   big world""#);
    assert_eq!(filter.to_string(), r#"name == "hello   big world""#);
}

#[test]
fn test_parse_quoted_value_with_operators_and_keywords() {
    let filter = parse_ok(r#"name == "a == b and (c)""#);
    assert_eq!(filter.to_string(), r#"name == "a == b and (c)""#);
}

#[test]
fn test_parse_bare_word_value() {
    let filter = parse_ok("name == bob");
    assert_eq!(filter, single("name", Comparator::Equal, vec![Value::from("bob")]));
}

#[test]
fn test_parse_operators_without_spaces() {
    assert_eq!(parse_ok("a==b").to_string(), r#"a == "b""#);
    assert_eq!(parse_ok("a!=b").to_string(), r#"a != "b""#);
    assert_eq!(parse_ok("a<=b").to_string(), r#"a <= "b""#);
    assert_eq!(parse_ok("a>=b").to_string(), r#"a >= "b""#);
    assert_eq!(parse_ok("a<b").to_string(), r#"a < "b""#);
    assert_eq!(parse_ok("a>b").to_string(), r#"a > "b""#);
}

#[test]
fn test_parse_quoted_key_and_value_with_equal_signs() {
    assert_eq!(
        parse_ok(r#""tag"=="@sys:image=nginx""#).to_string(),
        r#"tag == "@sys:image=nginx""#
    );
    assert_eq!(parse_ok(r#""=="=="==""#).to_string(), r#""==" == "==""#);
}

#[test]
fn test_parse_keywords_case_insensitive() {
    let lower = parse_ok("a == 1 and b contains [2]");
    let upper = parse_ok("a == 1 AND b CONTAINS [2]");
    assert_eq!(lower, upper);
}

#[test]
fn test_parse_escaped_value() {
    let filter = parse_ok(r"name == hello\ world");
    assert_eq!(filter.to_string(), r#"name == "hello world""#);

    let filter = parse_ok(r#"name == "say \"hi\"""#);
    assert_eq!(
        filter,
        single("name", Comparator::Equal, vec![Value::from(r#"say "hi""#)])
    );
    assert_eq!(filter.to_string(), r#"name == "say \"hi\"""#);
}

// ==================== Typed Values ====================

#[test]
fn test_parse_integers_and_floats() {
    let filter = parse_ok("value == 42");
    assert_eq!(filter, single("value", Comparator::Equal, vec![Value::Int(42)]));

    let filter = parse_ok("value == -7");
    assert_eq!(filter, single("value", Comparator::Equal, vec![Value::Int(-7)]));

    let filter = parse_ok("value == 38.9000");
    assert_eq!(filter, single("value", Comparator::Equal, vec![Value::Float(38.9)]));
    assert_eq!(filter.to_string(), "value == 38.900000");
}

#[test]
fn test_parse_booleans() {
    assert_eq!(
        parse_ok("a == true"),
        single("a", Comparator::Equal, vec![Value::Bool(true)])
    );
    assert_eq!(
        parse_ok("a != FALSE"),
        single("a", Comparator::NotEqual, vec![Value::Bool(false)])
    );
}

#[test]
fn test_parse_date_formats() {
    let midnight = Utc.with_ymd_and_hms(2018, 4, 26, 0, 0, 0).unwrap();
    let expected = single("d", Comparator::Equal, vec![Value::from(midnight)]);
    assert_eq!(parse_ok(r#"d == date("2018-04-26")"#), expected);
    assert_eq!(parse_ok("d == date(2018-04-26)"), expected);
    assert_eq!(parse_ok(r#"d == date("2018-04-26T00:00:00Z")"#), expected);

    let evening = Utc.with_ymd_and_hms(2018, 4, 26, 18, 30, 0).unwrap();
    assert_eq!(
        parse_ok(r#"d == date("2018-04-26 18:30")"#),
        single("d", Comparator::Equal, vec![Value::from(evening)])
    );
}

#[test]
fn test_parse_date_with_offset() {
    let filter = parse_ok(r#"d == date("2018-04-26T10:00:00+02:00")"#);
    assert_eq!(
        filter.to_string(),
        r#"d == date("2018-04-26T10:00:00+02:00")"#
    );
}

#[test]
fn test_parse_date_serializes_rfc3339() {
    let filter = parse_ok(r#"d == date("2018-04-26")"#);
    assert_eq!(filter.to_string(), r#"d == date("2018-04-26T00:00:00Z")"#);
}

#[test]
fn test_parse_durations() {
    assert_eq!(
        parse_ok(r#"d > now("-1h")"#).to_string(),
        r#"d > now("-1h0m0s")"#
    );
    assert_eq!(parse_ok("d > now()").to_string(), "d > now()");

    let filter = parse_ok(r#"d < now("1h30m")"#);
    let expected = FilterComposer::new()
        .with_key("d")
        .lesser_than(Duration::minutes(90))
        .done();
    assert_eq!(filter, expected);
}

#[test]
fn test_parse_date_and_now_as_bare_words() {
    assert_eq!(parse_ok("a == date").to_string(), r#"a == "date""#);
    assert_eq!(parse_ok("a == now and b == 1").len(), 1);
}

// ==================== Arrays ====================

#[test]
fn test_parse_contains_array() {
    let filter = parse_ok(r#"key contains ["value1", "value2"]"#);
    assert_eq!(
        filter,
        single(
            "key",
            Comparator::Contain,
            vec![Value::from("value1"), Value::from("value2")]
        )
    );
    assert_eq!(filter.to_string(), r#"key contains ["value1", "value2"]"#);
}

#[test]
fn test_parse_contains_single_value() {
    let filter = parse_ok(r#"key contains "1""#);
    assert_eq!(filter.to_string(), r#"key contains ["1"]"#);
}

#[test]
fn test_parse_mixed_and_nested_arrays() {
    let filter = parse_ok(r#"key in [1, 2.5, true, "x", bare, [a, b]]"#);
    assert_eq!(
        filter.to_string(),
        r#"key in [1, 2.500000, true, "x", "bare", ["a", "b"]]"#
    );
}

#[test]
fn test_parse_equal_array_is_single_value() {
    let filter = parse_ok(r#"key == ["a", "b"]"#);
    assert_eq!(
        filter,
        single("key", Comparator::Equal, vec![Value::from(vec!["a", "b"])])
    );
}

#[test]
fn test_parse_empty_array() {
    assert_eq!(parse_ok("key in []").to_string(), "key in []");
}

// ==================== Negations and Existence ====================

#[test]
fn test_parse_not_comparators() {
    assert_eq!(
        parse_ok(r#"a not contains ["x"]"#).to_string(),
        r#"a not contains ["x"]"#
    );
    assert_eq!(parse_ok("a NOT IN [1]").to_string(), "a not in [1]");
    assert_eq!(parse_ok("a not exists").to_string(), "a not exists");
}

#[test]
fn test_parse_exists() {
    let filter = parse_ok("a exists");
    assert_eq!(filter, FilterComposer::new().with_key("a").exists().done());
    assert_eq!(filter.to_string(), "a exists");
}

#[test]
fn test_parse_matches() {
    assert_eq!(
        parse_ok(r#"name matches "^a.*""#).to_string(),
        r#"name matches ["^a.*"]"#
    );
}

// ==================== Grouping and Precedence ====================

#[test]
fn test_parse_and() {
    let filter = parse_ok("a == 1 and b == 2");
    let expected = FilterComposer::new()
        .and([
            FilterComposer::new().with_key("a").equals(1).done(),
            FilterComposer::new().with_key("b").equals(2).done(),
        ])
        .done();
    assert_eq!(filter, expected);
    assert_eq!(filter.to_string(), "((a == 1) and (b == 2))");
}

#[test]
fn test_parse_and_then_or_collapses() {
    let filter = parse_ok("a == 1 and b == 2 or c == 3");
    let expected = FilterComposer::new()
        .or([
            FilterComposer::new()
                .and([
                    FilterComposer::new().with_key("a").equals(1).done(),
                    FilterComposer::new().with_key("b").equals(2).done(),
                ])
                .done(),
            FilterComposer::new().with_key("c").equals(3).done(),
        ])
        .done();
    assert_eq!(filter, expected);
}

#[test]
fn test_parse_or_then_and_collapses() {
    let filter = parse_ok("a == 1 or b == 2 and c == 3");
    let expected = FilterComposer::new()
        .and([
            FilterComposer::new()
                .or([
                    FilterComposer::new().with_key("a").equals(1).done(),
                    FilterComposer::new().with_key("b").equals(2).done(),
                ])
                .done(),
            FilterComposer::new().with_key("c").equals(3).done(),
        ])
        .done();
    assert_eq!(filter, expected);
}

#[test]
fn test_parse_parentheses() {
    let filter = parse_ok("a == 1 and (b == 2 or c == 3)");
    assert_eq!(
        filter.to_string(),
        "((a == 1) and (((b == 2) or (c == 3))))"
    );
}

#[test]
fn test_parse_single_parenthesised_clause() {
    assert_eq!(parse_ok("(a == 1)"), parse_ok("a == 1"));
}

#[test]
fn test_parse_repeated_and_trailing_conjunctions() {
    assert_eq!(parse_ok("a == 1 and and b == 2"), parse_ok("a == 1 and b == 2"));
    assert_eq!(parse_ok("a == 1 and"), parse_ok("a == 1"));
}

#[test]
fn test_parse_advanced_filter() {
    let input = r#""namespace" == "coucou" and "number" == 32.900000 and (("name" == "toto" and "value" == 1) and ("color" contains ["red", "green", "blue", 43] and "something" in ["stuff"] or (("size" matches [".*"]) or ("size" == "medium" and "fat" == false) or ("size" in [true, false]))))"#;

    let expected = FilterComposer::new()
        .and([
            FilterComposer::new().with_key("namespace").equals("coucou").done(),
            FilterComposer::new().with_key("number").equals(32.9).done(),
            FilterComposer::new()
                .and([
                    FilterComposer::new()
                        .and([
                            FilterComposer::new().with_key("name").equals("toto").done(),
                            FilterComposer::new().with_key("value").equals(1).done(),
                        ])
                        .done(),
                    FilterComposer::new()
                        .or([
                            FilterComposer::new()
                                .and([
                                    FilterComposer::new()
                                        .with_key("color")
                                        .contains([
                                            Value::from("red"),
                                            Value::from("green"),
                                            Value::from("blue"),
                                            Value::from(43),
                                        ])
                                        .done(),
                                    FilterComposer::new()
                                        .with_key("something")
                                        .in_values(["stuff"])
                                        .done(),
                                ])
                                .done(),
                            FilterComposer::new()
                                .or([
                                    FilterComposer::new().with_key("size").matches([".*"]).done(),
                                    FilterComposer::new()
                                        .and([
                                            FilterComposer::new()
                                                .with_key("size")
                                                .equals("medium")
                                                .done(),
                                            FilterComposer::new()
                                                .with_key("fat")
                                                .equals(false)
                                                .done(),
                                        ])
                                        .done(),
                                    FilterComposer::new()
                                        .with_key("size")
                                        .in_values([true, false])
                                        .done(),
                                ])
                                .done(),
                        ])
                        .done(),
                ])
                .done(),
        ])
        .done();

    let filter = parse_ok(input);
    assert_eq!(filter, expected);
    assert_eq!(filter.to_string(), expected.to_string());

    let reparsed = parse_ok(&filter.to_string());
    assert_eq!(reparsed.to_string(), filter.to_string());
}

// ==================== Errors ====================

#[test]
fn test_error_invalid_start() {
    assert_eq!(parse_err(""), "invalid start of expression. found EOF");
    assert_eq!(parse_err("   "), "invalid start of expression. found EOF");
    assert_eq!(parse_err("== a"), "invalid start of expression. found ==");
    assert_eq!(parse_err("()"), "invalid start of expression. found )");
}

#[test]
fn test_error_invalid_keyword_after_clause() {
    let err = parse_err(r#"name == 0 and toto contains "1" an contains "@hello=2""#);
    assert!(
        err.contains(r#"invalid keyword after toto contains ["1"]. found an"#),
        "{err}"
    );
    assert_eq!(
        parse_err(r#"key exists value""#),
        "invalid keyword after key exists. found value"
    );
}

#[test]
fn test_error_missing_quote_after() {
    assert_eq!(parse_err(r#""key == chris"#), "missing quote after key == chris");
    assert_eq!(parse_err(r#"key == 'hello""#), r#"missing quote after hello""#);
}

#[test]
fn test_error_invalid_operator() {
    assert_eq!(
        parse_err(r#"key" == chris"#),
        r#"invalid operator. found " instead of (==, !=, <, <=, >, >=, contains, in, matches, exists)"#
    );
    assert_eq!(
        parse_err("key and chris"),
        "invalid operator. found and instead of (==, !=, <, <=, >, >=, contains, in, matches, exists)"
    );
    assert_eq!(
        parse_err("key"),
        "invalid operator. found EOF instead of (==, !=, <, <=, >, >=, contains, in, matches, exists)"
    );
}

#[test]
fn test_error_invalid_not_usage() {
    assert_eq!(
        parse_err("key not == 1"),
        "invalid usage of operator NOT before =="
    );
}

#[test]
fn test_error_unprotected_value() {
    assert_eq!(
        parse_err("key == hello world"),
        "missing parenthese to protect value: hello world"
    );
}

#[test]
fn test_error_missing_quote_before() {
    assert_eq!(
        parse_err(r#"key == hello""#),
        "missing quote before the value: hello"
    );
}

#[test]
fn test_error_invalid_value() {
    assert_eq!(parse_err(r#"key == and""#), "invalid value. found and");
    assert_eq!(parse_err("key =="), "invalid value. found EOF");
}

#[test]
fn test_error_invalid_array_end() {
    assert_eq!(parse_err("key in [1, 2"), "invalid end of array. found EOF");
    assert_eq!(parse_err("key in [1, (2]"), "invalid end of array. found (");
}

#[test]
fn test_error_dates() {
    assert_eq!(
        parse_err(r#"key == date("invalid-date")"#),
        "unable to parse date format invalid-date"
    );
    assert_eq!(
        parse_err(r#"key == date(2012-24-2")"#),
        "unable to parse date format 2012-24-2"
    );
}

#[test]
fn test_error_durations() {
    assert_eq!(
        parse_err(r#"key == now("yesterday")"#),
        r#"unable to parse duration yesterday: invalid duration "yesterday""#
    );
}

#[test]
fn test_error_parameter_key() {
    assert_eq!(
        parse_err("$key == 1"),
        "could not start a parameter with $. Found $key"
    );
    assert_eq!(
        parse_err(r#""$key" == 1"#),
        "could not start a parameter with $. Found $key"
    );
}

#[test]
fn test_error_unbalanced_parentheses() {
    assert_eq!(
        parse_err("(a == 1 and b == 2"),
        "missing closing parenthesis. found EOF"
    );
    assert_eq!(
        parse_err("a == 1)"),
        "unexpected closing parenthesis. found )"
    );
}

#[test]
fn test_error_nesting_too_deep() {
    let input = format!("{}a == 1{}", "(".repeat(10_000), ")".repeat(10_000));
    assert_eq!(
        parse(&input),
        Err(ParseError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH
        })
    );
    assert_eq!(
        parse_err(&input),
        format!("max nesting depth exceeded. limit is {MAX_NESTING_DEPTH}")
    );

    let arrays = format!("a in {}1{}", "[".repeat(10_000), "]".repeat(10_000));
    assert!(matches!(
        parse(&arrays),
        Err(ParseError::NestingTooDeep { .. })
    ));
}

#[test]
fn test_nesting_at_limit() {
    let input = format!(
        "{}a == 1{}",
        "(".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );
    assert_eq!(parse_ok(&input).to_string(), "a == 1");

    let deeper = format!(
        "{}a == 1{}",
        "(".repeat(MAX_NESTING_DEPTH + 1),
        ")".repeat(MAX_NESTING_DEPTH + 1)
    );
    assert!(parse(&deeper).is_err());
}

#[test]
fn test_error_stray_token_after_conjunction() {
    assert_eq!(
        parse_err("a == 1 and , b == 2"),
        "invalid start of expression. found ,"
    );
}

#[test]
fn test_error_is_typed() {
    assert_eq!(
        parse("key == hello world").unwrap_err(),
        ParseError::UnprotectedValue {
            value: "hello".to_string(),
            next: "world".to_string(),
        }
    );
}

// ==================== Configuration ====================

#[test]
fn test_unsupported_comparators() {
    let config = ParserConfig::new()
        .with_unsupported_comparators([Comparator::Match, Comparator::NotContain]);

    let err = FilterParser::with_config(r#"a matches "x""#, config.clone())
        .parse()
        .unwrap_err();
    assert_eq!(err.to_string(), "unsupported comparator: matches");

    let err = FilterParser::with_config(r#"a not contains "x""#, config.clone())
        .parse()
        .unwrap_err();
    assert_eq!(err.to_string(), "unsupported comparator: not contains");

    assert!(FilterParser::with_config(r#"a contains "x""#, config)
        .parse()
        .is_ok());
}

#[test]
fn test_default_config_accepts_everything() {
    let config = ParserConfig::default();
    assert!(Comparator::ALL.iter().all(|c| config.is_supported(*c)));
    assert_eq!(config.unsupported_comparators().count(), 0);
}

#[test]
fn test_from_str() {
    let filter: Filter = "a == 1".parse().unwrap();
    assert_eq!(filter, FilterComposer::new().with_key("a").equals(1).done());
}

// ==================== Round Trips ====================

#[test]
fn test_null_value_reparses_as_string() {
    let composed = FilterComposer::new()
        .with_key("owner")
        .equals(Value::Null)
        .done();
    assert_eq!(composed.to_string(), "owner == null");

    let reparsed = parse_ok(&composed.to_string());
    assert_eq!(
        reparsed,
        single("owner", Comparator::Equal, vec![Value::from("null")])
    );
    assert_ne!(reparsed, composed);
}

#[test]
fn test_round_trip_stable() {
    let inputs = [
        r#"a == "x" and (b != 2 or c exists) and d not in [1, 2]"#,
        r#"name == "with \\ backslash" or "odd key" == 'v'"#,
        r#""and" == 1 and "a b" contains [date("2020-01-01"), now("-30m")]"#,
        "score >= 1.5 and tags contains [[a], [b]]",
    ];
    for input in inputs {
        let first = parse_ok(input).to_string();
        let second = parse_ok(&first).to_string();
        assert_eq!(first, second, "input: {input}");
    }
}
