use sqlsheet::Error;
use sqlsheet::parser::{Value, parse_script};
use sqlsheet::test_utils::{DIRECTIVE_TESTS_FILE, TestDirectiveData, options_from_toml};

#[test]
fn test_directives() {
    let directive_test_file =
        std::fs::read_to_string(DIRECTIVE_TESTS_FILE).expect("Cannot open directive test cases");
    let test_directive_data: TestDirectiveData =
        toml::from_str(&directive_test_file).expect("Cannot parse test cases defined in toml");

    for test in test_directive_data.tests {
        println!("Testing directives for script: {}", test.name);
        let configs = parse_script(&test.script)
            .unwrap_or_else(|err| panic!("Could not parse {} due to: {:?}", test.name, &err));

        assert_eq!(configs.len(), test.statements.len(), "{}", test.name);
        for (config, expected) in configs.iter().zip(&test.statements) {
            assert_eq!(config.sql, expected.sql, "{}", test.name);
            assert_eq!(config.target_sheet, expected.sheet, "{}", test.name);
            assert_eq!(config.export_requested, expected.export, "{}", test.name);
            if let Some(line) = expected.line {
                assert_eq!(config.line, line, "{}", test.name);
            }
            assert_eq!(
                config.options,
                options_from_toml(&expected.options),
                "{}",
                test.name
            );
        }
    }
}

#[test]
fn test_should_not_parse() {
    let scripts = [
        // Block comment never closes
        "select 1 /* reporting notes",
        // String never closes
        "select 'abc from t;",
        // Bracket list never closes
        "-- headings: [Region, Total\nselect region, total from t;",
        // Directive value missing
        "-- title:\nselect 1;",
        // Directive value missing after equals
        "-- width = \nselect 1;",
    ];
    for script in scripts {
        let configs = parse_script(script);
        if let Ok(configs) = &configs {
            panic!("Parsed {} statements from: {}", configs.len(), script);
        }
        assert!(matches!(configs, Err(Error::Syntax(_))), "{}", script);
    }
}

#[test]
fn test_directive_error_messages() {
    let err = parse_script("-- headings: [Region, Total\nselect region, total from t;")
        .expect_err("unterminated bracket list should not parse");
    assert_eq!(
        err.to_string(),
        "Syntax error: [line 1] Error at 'headings: [Region, Total': Expected `]`."
    );

    let err = parse_script("-- title:\nselect 1;").expect_err("empty value should not parse");
    assert_eq!(
        err.to_string(),
        "Syntax error: [line 1] Error at 'title:': Expected a value after `:`."
    );
}

#[test]
fn test_value_typing() {
    let configs = parse_script(
        "-- flag: TRUE, count = 42, ratio: 0.75, label: Q1 2024, ids: [1, 2, [3, 4]]\nselect 1;",
    )
    .expect("directive line should parse");
    let options = &configs[0].options;

    assert_eq!(options.get("flag"), Some(&Value::Bool(true)));
    assert_eq!(options.get("count"), Some(&Value::Int(42)));
    assert_eq!(options.get("ratio"), Some(&Value::Text("0.75".to_owned())));
    assert_eq!(
        options.get("label"),
        Some(&Value::Text("Q1 2024".to_owned()))
    );
    assert_eq!(
        options.get("ids"),
        Some(&Value::List(vec![
            Value::Int(1),
            Value::Int(2),
            Value::List(vec![Value::Int(3), Value::Int(4)]),
        ]))
    );

    assert_eq!(options.get("ratio").and_then(Value::as_f64), Some(0.75));
    assert_eq!(options.get("count").and_then(Value::as_f64), Some(42.0));
}

#[test]
fn test_repeated_keys_keep_their_first_position() {
    let configs = parse_script("-- title: First, chart: bar\n-- title: Second\nselect a from t;")
        .expect("directive lines should parse");
    let options = &configs[0].options;

    assert_eq!(options.get("title"), Some(&Value::Text("Second".to_owned())));
    assert_eq!(options.0.keys().collect::<Vec<_>>(), ["title", "chart"]);
}

#[test]
fn test_parsing_is_deterministic() {
    let script = "\
-- sheetname: Sales, chart: bar, headings: [Region, Total]
select region, total from sales;

-- chart
select month, amount from sales;
";
    let first = parse_script(script).expect("script should parse");
    let second = parse_script(script).expect("script should parse");
    assert_eq!(first, second);
}
