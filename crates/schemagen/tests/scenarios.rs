//! Behaviour of generated types across compositions, nested contexts,
//! settings and custom filters.

use schemagen::model::JsonKind;
use schemagen::{
    Diagnostic, DocumentSource, ErrorKind, Evaluator, FilterRegistry, Generator, GeneratorConfig,
    Mode, SchemaId, Settings,
};
use serde_json::{Value, json};

fn generate_with(config: GeneratorConfig, document: Value) -> (Generator, SchemaId) {
    let mut generator = Generator::new(config);
    let schema = generator
        .process_document(&DocumentSource::new("test.json", "App", "Test"), document)
        .unwrap();
    (generator, schema)
}

fn generate(document: Value) -> (Generator, SchemaId) {
    generate_with(GeneratorConfig::default(), document)
}

#[test]
fn one_of_with_object_branches_counts_matches() {
    let (generator, schema) = generate(json!({
        "type": "object",
        "properties": {
            "contact": {
                "type": "object",
                "oneOf": [
                    { "properties": { "email": { "type": "string" } } },
                    { "properties": { "phone": { "type": "string" } } }
                ]
            }
        }
    }));
    let evaluator = Evaluator::new(generator.graph(), Mode::CollectAll);

    let evaluation = evaluator.evaluate(schema, &json!({ "contact": {} }));
    let violation = &evaluation.report.for_property("contact")[0];
    assert_eq!(violation.message, "Invalid nested object for property contact");
    assert!(violation.all_messages().iter().any(|message| message.ends_with(
        "declined by composition constraint. Requires to match one composition element but matched 2 elements"
    )));

    let evaluation = evaluator.evaluate(schema, &json!({ "contact": { "email": 1 } }));
    assert!(evaluation.is_valid());
    assert_eq!(evaluation.model, json!({ "contact": { "email": null } }));
}

#[test]
fn multiple_of_zero() {
    let (generator, schema) = generate(json!({
        "type": "object",
        "properties": { "amount": { "type": "number", "multipleOf": 0 } }
    }));
    let evaluator = Evaluator::new(generator.graph(), Mode::CollectAll);

    assert!(evaluator.evaluate(schema, &json!({ "amount": 0 })).is_valid());
    let evaluation = evaluator.evaluate(schema, &json!({ "amount": 1.5 }));
    assert_eq!(
        evaluation.report.messages(),
        vec!["Value for amount must be a multiple of 0"]
    );
    assert_eq!(
        evaluation.report.iter().next().unwrap().kind,
        ErrorKind::RangeViolation
    );
}

#[test]
fn identical_definitions_collapse_across_namespaces() {
    let place = json!({
        "type": "object",
        "properties": { "city": { "type": "string" } },
        "required": ["city"]
    });
    let mut generator = Generator::default();
    let first = generator
        .process_document(
            &DocumentSource::new("a.json", "One", "A"),
            json!({
                "type": "object",
                "definitions": { "place": place.clone() },
                "properties": { "home": { "$ref": "#/definitions/place" } }
            }),
        )
        .unwrap();
    let second = generator
        .process_document(
            &DocumentSource::new("b.json", "Two", "B"),
            json!({
                "type": "object",
                "definitions": { "place": place },
                "properties": { "work": { "$ref": "#/definitions/place" } }
            }),
        )
        .unwrap();
    let graph = generator.graph();

    let home = graph.property(graph.find_property(first, "home").unwrap());
    let work = graph.property(graph.find_property(second, "work").unwrap());
    assert_eq!(home.nested_schema(), work.nested_schema());
    assert_eq!(
        generator.diagnostics(),
        &[Diagnostic::SchemaRedirected {
            from: "Two\\Place".to_string(),
            to: "One\\Place".to_string(),
        }]
    );
    assert_eq!(
        graph.used_types(second).into_iter().collect::<Vec<_>>(),
        vec!["One\\Place".to_string()]
    );
}

#[test]
fn nested_contexts_are_relaxed() {
    let (generator, schema) = generate(json!({
        "type": "object",
        "properties": {
            "people": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } },
                    "required": ["name"]
                }
            }
        },
        "required": ["people"]
    }));
    let graph = generator.graph();
    let people = graph.find_property(schema, "people").unwrap();
    let item = graph.property(graph.child_properties(people)[0]);
    assert_eq!(item.name(), "item of array people");
    assert!(!item.validators().has_required());

    let evaluation =
        Evaluator::new(graph, Mode::CollectAll).evaluate(schema, &json!({ "people": [{}] }));
    let violation = &evaluation.report.for_property("people")[0];
    assert_eq!(violation.message, "Invalid items in array people");
    assert_eq!(violation.details[0].label, "Invalid item #0");
    assert!(violation
        .all_messages()
        .contains(&"Missing required value for name".to_string()));
}

#[test]
fn settings_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".schemagen")).unwrap();
    std::fs::write(
        dir.path().join(".schemagen/config.toml"),
        "implicit_null = false\ncollect_errors = false\n",
    )
    .unwrap();

    let settings = Settings::load_or_default(dir.path()).unwrap();
    assert!(!settings.implicit_null);
    let mode = Mode::from_settings(&settings);
    assert_eq!(mode, Mode::FailFast);

    let (generator, schema) = generate_with(
        GeneratorConfig::new(settings),
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "integer" },
                "c": { "type": "integer" }
            },
            "required": ["a", "b"]
        }),
    );
    let evaluator = Evaluator::new(generator.graph(), mode);
    assert_eq!(
        evaluator.evaluate(schema, &json!({})).report.messages(),
        vec!["Missing required value for a"]
    );
    assert_eq!(
        evaluator
            .evaluate(schema, &json!({ "a": "x", "b": 1, "c": null }))
            .report
            .messages(),
        vec!["Invalid type for c. Requires integer, got null"]
    );
}

#[test]
fn missing_config_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(Settings::load_or_default(dir.path()).unwrap(), Settings::default());
}

#[test]
fn custom_filters_receive_their_options() {
    let mut filters = FilterRegistry::default();
    filters.register("clamp", [JsonKind::Integer], |value, options| {
        let max = options.get("max").and_then(Value::as_i64).unwrap_or(i64::MAX);
        match value.as_i64() {
            Some(n) if n > max => Ok(json!(max)),
            _ => Ok(value),
        }
    });
    filters.register("even", [JsonKind::Integer], |value, _| match value.as_i64() {
        Some(n) if n % 2 == 0 => Ok(value),
        _ => Err("value is odd".to_string()),
    });

    let (generator, schema) = generate_with(
        GeneratorConfig::default().with_filters(filters),
        json!({
            "type": "object",
            "properties": {
                "score": {
                    "type": "integer",
                    "filter": [{ "filter": "clamp", "max": 10 }, "even"]
                }
            }
        }),
    );
    let evaluator = Evaluator::new(generator.graph(), Mode::CollectAll);

    let evaluation = evaluator.evaluate(schema, &json!({ "score": 42 }));
    assert!(evaluation.is_valid());
    assert_eq!(evaluation.model, json!({ "score": 10 }));

    let evaluation = evaluator.evaluate(schema, &json!({ "score": 3 }));
    assert_eq!(
        evaluation.report.messages(),
        vec!["Filter even failed for score: value is odd"]
    );
}

#[test]
fn unknown_filter_is_rejected() {
    let mut generator = Generator::default();
    let err = generator
        .process_document(
            &DocumentSource::new("test.json", "App", "Test"),
            json!({
                "type": "object",
                "properties": { "name": { "type": "string", "filter": "shout" } }
            }),
        )
        .unwrap_err();
    assert!(err.to_string().contains("shout"));
}
