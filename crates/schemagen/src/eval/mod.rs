//! Reference evaluator for generated checks.
//!
//! Runs the validators of a finished schema against a JSON value the way
//! generated code is expected to: validators in priority order, checks
//! guarded by the kind of value they apply to, filters transforming the value
//! seen by later checks, and absent optional properties falling back to their
//! default.
//!
//! ```
//! use schemagen::{DocumentSource, Generator};
//! use schemagen::eval::{Evaluator, Mode};
//! use serde_json::json;
//!
//! let mut generator = Generator::default();
//! let schema = generator
//!     .process_document(
//!         &DocumentSource::new("user.json", "App", "User"),
//!         json!({
//!             "type": "object",
//!             "properties": { "age": { "type": "integer", "minimum": 0 } },
//!             "required": ["age"]
//!         }),
//!     )
//!     .unwrap();
//!
//! let evaluator = Evaluator::new(generator.graph(), Mode::CollectAll);
//! let evaluation = evaluator.evaluate(schema, &json!({ "age": -1 }));
//! assert_eq!(
//!     evaluation.report.messages(),
//!     vec!["Value for age must not be smaller than 0"]
//! );
//! ```

mod json;
mod report;

pub use json::{compare_numbers, is_multiple_of, json_equal};
pub use report::{Detail, ErrorReport, Violation};

use crate::config::Settings;
use crate::model::{Graph, JsonKind, PropertyId, SchemaId};
use crate::validator::{Check, CompositionBranch, CompositionKind, Validator};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;

/// Whether evaluation stops at the first violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    FailFast,
    #[default]
    CollectAll,
}

impl Mode {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.collect_errors {
            Mode::CollectAll
        } else {
            Mode::FailFast
        }
    }
}

/// The populated object and every violation found while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub model: Value,
    pub report: ErrorReport,
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        self.report.is_empty()
    }
}

/// Result of running one property's validators.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOutcome {
    /// The value after filters and nested transformations; `None` if absent.
    pub value: Option<Value>,
    pub violations: Vec<Violation>,
}

impl PropertyOutcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

enum Verdict {
    Pass,
    /// Accepted; later checks of the property are skipped.
    Settle,
    Fail(Failure),
}

#[derive(Default)]
struct Failure {
    runtime: Map<String, Value>,
    details: Vec<Detail>,
}

impl Failure {
    fn with(key: &str, value: Value) -> Self {
        let mut runtime = Map::new();
        runtime.insert(key.to_string(), value);
        Self {
            runtime,
            details: Vec::new(),
        }
    }

    fn details(details: Vec<Detail>) -> Self {
        Self {
            runtime: Map::new(),
            details,
        }
    }
}

fn verdict(passed: bool) -> Verdict {
    if passed {
        Verdict::Pass
    } else {
        Verdict::Fail(Failure::default())
    }
}

fn violation(validator: &Validator, property: &str, failure: Failure) -> Violation {
    let message = validator.message(property, &failure.runtime);
    let mut params = validator.params().clone();
    params.extend(failure.runtime);
    Violation {
        property: property.to_string(),
        kind: validator.kind(),
        message,
        params,
        details: failure.details,
    }
}

struct BranchResult {
    output: Option<Value>,
    violations: Vec<Violation>,
}

impl BranchResult {
    fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

fn composition_verdict(kind: CompositionKind, results: Vec<BranchResult>) -> Verdict {
    let matched = results.iter().filter(|result| result.passed()).count();
    if kind.is_satisfied(matched, results.len()) {
        return Verdict::Pass;
    }
    let details = results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            let passed = result.passed();
            Detail {
                label: format!(
                    "Composition element #{}: {}",
                    index + 1,
                    if passed { "Valid" } else { "Failed" }
                ),
                passed,
                violations: result.violations,
            }
        })
        .collect();
    let mut failure = Failure::details(details);
    failure.runtime.insert("matched".to_string(), json!(matched));
    Verdict::Fail(failure)
}

/// Interprets the validators of a [`Graph`].
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'g> {
    graph: &'g Graph,
    mode: Mode,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g Graph, mode: Mode) -> Self {
        Self { graph, mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Evaluate `input` against the type generated for `schema`.
    pub fn evaluate(&self, schema: SchemaId, input: &Value) -> Evaluation {
        let mut report = ErrorReport::default();
        let Value::Object(object) = input else {
            let class = &self.graph.schema(schema).identity.class_name;
            let validator = Validator::new(Check::Type {
                kinds: vec![JsonKind::Object],
                implicit_null: false,
            });
            let failure = Failure::with("actual", json!(JsonKind::of(input).keyword()));
            report.push(violation(&validator, class, failure));
            return Evaluation {
                model: input.clone(),
                report,
            };
        };

        let (model, violations) = self.evaluate_object(schema, object);
        report.extend(violations);
        Evaluation {
            model: Value::Object(model),
            report,
        }
    }

    /// Run the validators of one property against `value`.
    pub fn evaluate_property(&self, property: PropertyId, value: Option<Value>) -> PropertyOutcome {
        let entry = self.graph.property(property);
        let name = entry.name();
        let mut current = value;
        let mut violations = Vec::new();
        for validator in entry.validators().iter() {
            match self.run_check(validator.check(), &mut current) {
                Verdict::Pass => {}
                Verdict::Settle => break,
                Verdict::Fail(failure) => {
                    violations.push(violation(validator, name, failure));
                    if self.mode == Mode::FailFast {
                        break;
                    }
                }
            }
        }
        PropertyOutcome {
            value: current,
            violations,
        }
    }

    fn stop(&self, violations: &[Violation]) -> bool {
        self.mode == Mode::FailFast && !violations.is_empty()
    }

    fn evaluate_object(
        &self,
        schema: SchemaId,
        input: &Map<String, Value>,
    ) -> (Map<String, Value>, Vec<Violation>) {
        let schema = self.graph.schema(schema);
        let class = schema.identity.class_name.as_str();
        let mut model = input.clone();
        let mut violations = Vec::new();

        for &id in &schema.properties {
            let property = self.graph.property(id);
            let outcome = self.evaluate_property(id, input.get(property.name()).cloned());
            match outcome.value {
                Some(value) => {
                    model.insert(property.name().to_string(), value);
                }
                None => {
                    if let Some(default) = property.default_value() {
                        model.insert(property.name().to_string(), default.clone());
                    }
                }
            }
            violations.extend(outcome.violations);
            if self.stop(&violations) {
                return (model, violations);
            }
        }

        let object = Value::Object(input.clone());
        for validator in schema.base_validators.iter() {
            let verdict = match validator.check() {
                Check::Composition {
                    kind,
                    branches,
                    object_level: true,
                } => {
                    let results = self.run_branches(branches.iter().map(|b| b.property), &object);
                    populate(&mut model, branches, &results);
                    composition_verdict(*kind, results)
                }
                check => self.inspect(check, &object),
            };
            if let Verdict::Fail(failure) = verdict {
                violations.push(violation(validator, class, failure));
                if self.stop(&violations) {
                    break;
                }
            }
        }
        (model, violations)
    }

    fn run_branches(
        &self,
        branches: impl Iterator<Item = PropertyId>,
        value: &Value,
    ) -> Vec<BranchResult> {
        branches
            .map(|branch| {
                let outcome = self.evaluate_property(branch, Some(value.clone()));
                BranchResult {
                    output: outcome.value,
                    violations: outcome.violations,
                }
            })
            .collect()
    }

    /// Absent values only fail the presence check.
    fn run_check(&self, check: &Check, value: &mut Option<Value>) -> Verdict {
        match (check, value.take()) {
            (Check::Required, None) => Verdict::Fail(Failure::default()),
            (_, None) => Verdict::Pass,
            (check, Some(current)) => {
                let (verdict, current) = self.transform(check, current);
                *value = Some(current);
                verdict
            }
        }
    }

    /// Checks that may replace the value, then the read-only ones.
    fn transform(&self, check: &Check, value: Value) -> (Verdict, Value) {
        match (check, value) {
            (
                Check::Filter {
                    options,
                    accepts,
                    apply,
                    ..
                },
                value,
            ) if accepts.iter().any(|kind| kind.accepts(&value)) => {
                match apply.apply(value.clone(), options) {
                    Ok(filtered) => (Verdict::Pass, filtered),
                    Err(reason) => (Verdict::Fail(Failure::with("reason", json!(reason))), value),
                }
            }
            (Check::Items { item }, Value::Array(items)) => {
                let (items, details) = self.evaluate_elements(*item, items, 0, "Invalid item");
                (failed_with(details), Value::Array(items))
            }
            (Check::AdditionalItems { offset, item }, Value::Array(items)) => {
                let (items, details) =
                    self.evaluate_elements(*item, items, *offset, "Invalid additional item");
                (failed_with(details), Value::Array(items))
            }
            (Check::Tuple { items: positions }, Value::Array(mut items)) => {
                let mut details = Vec::new();
                for (index, &position) in positions.iter().enumerate() {
                    let outcome = self.evaluate_property(position, items.get(index).cloned());
                    if let (Some(slot), Some(value)) = (items.get_mut(index), outcome.value) {
                        *slot = value;
                    }
                    if !outcome.violations.is_empty() {
                        details.push(Detail::failed(
                            format!("Invalid tuple item #{}", index),
                            outcome.violations,
                        ));
                        if self.mode == Mode::FailFast {
                            break;
                        }
                    }
                }
                (failed_with(details), Value::Array(items))
            }
            (Check::NestedObject { schema }, Value::Object(object)) => {
                let (model, violations) = self.evaluate_object(*schema, &object);
                let details = if violations.is_empty() {
                    Vec::new()
                } else {
                    let class = &self.graph.schema(*schema).identity.class_name;
                    vec![Detail::failed(class.clone(), violations)]
                };
                (failed_with(details), Value::Object(model))
            }
            (check, value) => (self.inspect(check, &value), value),
        }
    }

    /// Evaluate array elements from `offset` on against `item`, replacing
    /// each with its output.
    fn evaluate_elements(
        &self,
        item: PropertyId,
        mut elements: Vec<Value>,
        offset: usize,
        label: &str,
    ) -> (Vec<Value>, Vec<Detail>) {
        let mut details = Vec::new();
        for (index, element) in elements.iter_mut().enumerate().skip(offset) {
            let outcome = self.evaluate_property(item, Some(element.clone()));
            if let Some(value) = outcome.value {
                *element = value;
            }
            if !outcome.violations.is_empty() {
                details.push(Detail::failed(
                    format!("{} #{}", label, index),
                    outcome.violations,
                ));
                if self.mode == Mode::FailFast {
                    break;
                }
            }
        }
        (elements, details)
    }

    /// Read-only checks, guarded by the kind of value they apply to.
    fn inspect(&self, check: &Check, value: &Value) -> Verdict {
        match (check, value) {
            (
                Check::Type {
                    implicit_null: true,
                    ..
                }
                | Check::Enum {
                    implicit_null: true,
                    ..
                }
                | Check::ImplicitNull { enabled: true },
                Value::Null,
            ) => Verdict::Settle,
            (Check::Type { kinds, .. }, value) => {
                if kinds.iter().any(|kind| kind.accepts(value)) {
                    Verdict::Pass
                } else {
                    Verdict::Fail(Failure::with("actual", json!(JsonKind::of(value).keyword())))
                }
            }
            (Check::Enum { values, .. }, value) => {
                verdict(values.iter().any(|allowed| json_equal(allowed, value)))
            }
            (Check::Const { value: expected }, value) => verdict(json_equal(expected, value)),
            (Check::Minimum { limit, exclusive }, Value::Number(n)) => {
                verdict(match compare_numbers(n, limit) {
                    Some(Ordering::Greater) => true,
                    Some(Ordering::Equal) => !exclusive,
                    _ => false,
                })
            }
            (Check::Maximum { limit, exclusive }, Value::Number(n)) => {
                verdict(match compare_numbers(n, limit) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => !exclusive,
                    _ => false,
                })
            }
            (Check::MultipleOf { divisor }, Value::Number(n)) => verdict(is_multiple_of(n, divisor)),
            (Check::Pattern(pattern), Value::String(s)) => verdict(pattern.is_match(s)),
            (Check::MinLength(min), Value::String(s)) => verdict(s.chars().count() >= *min),
            (Check::MaxLength(max), Value::String(s)) => verdict(s.chars().count() <= *max),
            (Check::MinItems(min), Value::Array(items)) => verdict(items.len() >= *min),
            (Check::MaxItems(max), Value::Array(items)) => verdict(items.len() <= *max),
            (Check::UniqueItems, Value::Array(items)) => verdict(
                items
                    .iter()
                    .enumerate()
                    .all(|(i, a)| items[i + 1..].iter().all(|b| !json_equal(a, b))),
            ),
            (Check::AdditionalItemsRejected { expected }, Value::Array(items)) => {
                if items.len() > *expected {
                    Verdict::Fail(Failure::with("actual", json!(items.len())))
                } else {
                    Verdict::Pass
                }
            }
            (Check::Contains { item }, Value::Array(items)) => verdict(
                items
                    .iter()
                    .any(|element| self.evaluate_property(*item, Some(element.clone())).is_valid()),
            ),
            (
                Check::AdditionalPropertiesRejected {
                    known, patterns, ..
                },
                Value::Object(object),
            ) => {
                let extra: Vec<Value> = object
                    .keys()
                    .filter(|key| is_additional(key, known, patterns))
                    .map(|key| json!(key))
                    .collect();
                if extra.is_empty() {
                    Verdict::Pass
                } else {
                    Verdict::Fail(Failure::with("properties", Value::Array(extra)))
                }
            }
            (
                Check::AdditionalProperties {
                    known,
                    patterns,
                    property,
                    ..
                },
                Value::Object(object),
            ) => self.evaluate_members(
                object.iter().filter(|(key, _)| is_additional(key, known, patterns)),
                *property,
                "Invalid additional property",
            ),
            (
                Check::PatternProperty {
                    pattern, property, ..
                },
                Value::Object(object),
            ) => self.evaluate_members(
                object.iter().filter(|(key, _)| pattern.is_match(key)),
                *property,
                "Invalid pattern property",
            ),
            (Check::PropertyNames { property, .. }, Value::Object(object)) => {
                let names: Vec<(String, Value)> = object
                    .keys()
                    .map(|key| (key.clone(), json!(key)))
                    .collect();
                self.evaluate_members(
                    names.iter().map(|(key, value)| (key, value)),
                    *property,
                    "Invalid property name",
                )
            }
            (Check::MinProperties(min), Value::Object(object)) => verdict(object.len() >= *min),
            (Check::MaxProperties(max), Value::Object(object)) => verdict(object.len() <= *max),
            (
                Check::PropertyDependency {
                    trigger,
                    dependants,
                },
                Value::Object(object),
            ) if object.contains_key(trigger) => {
                let missing: Vec<Value> = dependants
                    .iter()
                    .filter(|name| !object.contains_key(*name))
                    .map(|name| json!(name))
                    .collect();
                if missing.is_empty() {
                    Verdict::Pass
                } else {
                    Verdict::Fail(Failure::with("missing", Value::Array(missing)))
                }
            }
            (Check::SchemaDependency { trigger, property }, Value::Object(object))
                if object.contains_key(trigger) =>
            {
                let outcome = self.evaluate_property(*property, Some(value.clone()));
                failed_with(if outcome.is_valid() {
                    Vec::new()
                } else {
                    vec![Detail::failed(format!("Dependency of {}", trigger), outcome.violations)]
                })
            }
            (Check::Composition { kind, branches, .. }, value) => {
                let results = self.run_branches(branches.iter().map(|b| b.property), value);
                composition_verdict(*kind, results)
            }
            (
                Check::Conditional {
                    condition,
                    then,
                    otherwise,
                    ..
                },
                value,
            ) => {
                let condition = self.evaluate_property(*condition, Some(value.clone()));
                let matched = condition.is_valid();
                let (consequence, label) = if matched {
                    (*then, "Then")
                } else {
                    (*otherwise, "Else")
                };
                let Some(consequence) = consequence else {
                    return Verdict::Pass;
                };
                let outcome = self.evaluate_property(consequence, Some(value.clone()));
                if outcome.is_valid() {
                    return Verdict::Pass;
                }
                Verdict::Fail(Failure::details(vec![
                    Detail {
                        label: format!("If: {}", if matched { "Valid" } else { "Failed" }),
                        passed: matched,
                        violations: condition.violations,
                    },
                    Detail::failed(format!("{}: Failed", label), outcome.violations),
                ]))
            }
            (Check::Custom { predicate, .. }, value) => verdict(predicate.test(value)),
            _ => Verdict::Pass,
        }
    }

    /// Evaluate object members against `property`, one detail per invalid
    /// member.
    fn evaluate_members<'v>(
        &self,
        members: impl Iterator<Item = (&'v String, &'v Value)>,
        property: PropertyId,
        label: &str,
    ) -> Verdict {
        let mut details = Vec::new();
        for (key, value) in members {
            let outcome = self.evaluate_property(property, Some(value.clone()));
            if !outcome.is_valid() {
                details.push(Detail::failed(format!("{} {}", label, key), outcome.violations));
                if self.mode == Mode::FailFast {
                    break;
                }
            }
        }
        failed_with(details)
    }
}

fn failed_with(details: Vec<Detail>) -> Verdict {
    if details.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail(Failure::details(details))
    }
}

fn is_additional(key: &str, known: &[String], patterns: &[crate::validator::Pattern]) -> bool {
    !known.iter().any(|name| name == key) && !patterns.iter().any(|pattern| pattern.is_match(key))
}

/// Copy the names populated by passing object branches into the model and
/// reset names only failing branches would have populated.
fn populate(model: &mut Map<String, Value>, branches: &[CompositionBranch], results: &[BranchResult]) {
    let mut populated: Vec<&str> = Vec::new();
    for (branch, result) in branches.iter().zip(results) {
        if !result.passed() {
            continue;
        }
        let output = match &result.output {
            Some(Value::Object(output)) => Some(output),
            _ => None,
        };
        for name in &branch.affected {
            if let Some(value) = output.and_then(|output| output.get(name)) {
                model.insert(name.clone(), value.clone());
            }
            populated.push(name);
        }
    }
    for (branch, result) in branches.iter().zip(results) {
        if result.passed() {
            continue;
        }
        for name in &branch.affected {
            if !populated.contains(&name.as_str()) && model.contains_key(name) {
                model.insert(name.clone(), Value::Null);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::{DocumentSource, Generator};
    use crate::validator::ErrorKind;

    fn generate_with(settings: Settings, document: Value) -> (Generator, SchemaId) {
        let mut generator = Generator::new(GeneratorConfig::new(settings));
        let schema = generator
            .process_document(&DocumentSource::new("test.json", "App", "Test"), document)
            .unwrap();
        (generator, schema)
    }

    fn generate(document: Value) -> (Generator, SchemaId) {
        generate_with(Settings::default(), document)
    }

    fn evaluate(generator: &Generator, schema: SchemaId, input: Value) -> Evaluation {
        Evaluator::new(generator.graph(), Mode::CollectAll).evaluate(schema, &input)
    }

    #[test]
    fn all_of_reports_every_branch() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "x": { "type": "integer", "allOf": [{ "minimum": 2 }, { "minimum": 3 }] }
            },
            "required": ["x"]
        }));
        assert!(evaluate(&generator, schema, json!({ "x": 6 })).is_valid());

        let evaluation = evaluate(&generator, schema, json!({ "x": 1 }));
        assert_eq!(evaluation.report.len(), 1);
        let violation = &evaluation.report.for_property("x")[0];
        assert_eq!(violation.kind, ErrorKind::CompositionViolation);
        assert_eq!(
            violation.message,
            "Invalid value for x declined by composition constraint. Requires to match all composition elements but matched 0 elements"
        );
        let labels: Vec<&str> = violation.details.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Composition element #1: Failed", "Composition element #2: Failed"]
        );
        let messages = violation.all_messages();
        assert!(messages.contains(&"Value for x must not be smaller than 2".to_string()));
        assert!(messages.contains(&"Value for x must not be smaller than 3".to_string()));

        let evaluation = evaluate(&generator, schema, json!({ "x": 2 }));
        assert_eq!(evaluation.report.iter().next().unwrap().params["matched"], json!(1));
    }

    #[test]
    fn missing_required_value() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        }));
        let evaluation = evaluate(&generator, schema, json!({}));
        assert_eq!(evaluation.report.messages(), vec!["Missing required value for name"]);
        assert_eq!(evaluation.report.iter().next().unwrap().kind, ErrorKind::RequiredMissing);
    }

    #[test]
    fn implicit_null_follows_settings() {
        let document = json!({
            "type": "object",
            "properties": { "age": { "type": "integer", "minimum": 3 } }
        });
        let (generator, schema) = generate(document.clone());
        let evaluation = evaluate(&generator, schema, json!({ "age": null }));
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.model, json!({ "age": null }));

        let settings = Settings {
            implicit_null: false,
            ..Settings::default()
        };
        let (generator, schema) = generate_with(settings, document);
        let evaluation = evaluate(&generator, schema, json!({ "age": null }));
        assert_eq!(
            evaluation.report.messages(),
            vec!["Invalid type for age. Requires integer, got null"]
        );
    }

    #[test]
    fn absent_optional_values_take_their_default() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "role": { "type": "string", "default": "user" },
                "nickname": { "type": "string" }
            }
        }));
        let evaluation = evaluate(&generator, schema, json!({}));
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.model, json!({ "role": "user" }));
    }

    #[test]
    fn filters_transform_before_later_checks() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "name": { "type": "string", "filter": "trim", "minLength": 2 } }
        }));
        let evaluation = evaluate(&generator, schema, json!({ "name": "  ab " }));
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.model, json!({ "name": "ab" }));

        let evaluation = evaluate(&generator, schema, json!({ "name": " a " }));
        assert_eq!(
            evaluation.report.messages(),
            vec!["Value for name must not be shorter than 2"]
        );
    }

    #[test]
    fn fail_fast_stops_at_first_violation() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        }));
        let input = json!({});
        assert_eq!(evaluate(&generator, schema, input.clone()).report.len(), 2);

        let evaluation = Evaluator::new(generator.graph(), Mode::FailFast).evaluate(schema, &input);
        assert_eq!(evaluation.report.messages(), vec!["Missing required value for a"]);
        assert_eq!(Mode::from_settings(&Settings::default()), Mode::CollectAll);
    }

    #[test]
    fn one_of_counts_matching_object_branches() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "oneOf": [
                { "properties": { "a": { "type": "string" } } },
                { "properties": { "b": { "type": "string" } } }
            ]
        }));
        let evaluation = evaluate(&generator, schema, json!({}));
        assert_eq!(
            evaluation.report.messages(),
            vec!["Invalid value for Test declined by composition constraint. Requires to match one composition element but matched 2 elements"]
        );
    }

    #[test]
    fn failing_object_branches_reset_their_properties() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "oneOf": [
                {
                    "properties": { "email": { "type": "string", "pattern": "@" } },
                    "required": ["email"]
                },
                { "properties": { "phone": { "type": "string" } }, "required": ["phone"] }
            ]
        }));

        let evaluation = evaluate(&generator, schema, json!({ "id": 1, "email": "a@b" }));
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.model, json!({ "id": 1, "email": "a@b" }));

        let evaluation = evaluate(
            &generator,
            schema,
            json!({ "id": 1, "email": "nope", "phone": "123" }),
        );
        assert!(evaluation.is_valid());
        assert_eq!(
            evaluation.model,
            json!({ "id": 1, "email": null, "phone": "123" })
        );
    }

    #[test]
    fn invalid_items_are_listed() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "tags": { "type": "array", "items": { "type": "string" } } }
        }));
        let evaluation = evaluate(&generator, schema, json!({ "tags": ["a", 1] }));
        let violation = evaluation.report.iter().next().unwrap();
        assert_eq!(violation.message, "Invalid items in array tags");
        assert_eq!(violation.details[0].label, "Invalid item #1");
        assert_eq!(
            violation.details[0].violations[0].message,
            "Invalid type for item of array tags. Requires string, got integer"
        );
    }

    #[test]
    fn multiple_of_zero_only_accepts_zero() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "n": { "type": "integer", "multipleOf": 0 } }
        }));
        assert!(evaluate(&generator, schema, json!({ "n": 0 })).is_valid());
        assert_eq!(
            evaluate(&generator, schema, json!({ "n": 5 })).report.messages(),
            vec!["Value for n must be a multiple of 0"]
        );
    }

    #[test]
    fn nested_objects_are_evaluated_and_replaced() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "address": {
                    "type": "object",
                    "properties": {
                        "city": { "type": "string", "filter": "trim" },
                        "country": { "type": "string", "default": "NL" }
                    },
                    "required": ["city"]
                }
            }
        }));
        let evaluation = evaluate(&generator, schema, json!({ "address": { "city": " Delft " } }));
        assert!(evaluation.is_valid());
        assert_eq!(
            evaluation.model,
            json!({ "address": { "city": "Delft", "country": "NL" } })
        );

        let evaluation = evaluate(&generator, schema, json!({ "address": {} }));
        let violation = evaluation.report.iter().next().unwrap();
        assert_eq!(violation.message, "Invalid nested object for property address");
        assert_eq!(
            violation.all_messages()[1],
            "Missing required value for city"
        );
    }

    #[test]
    fn additional_properties_and_dependencies() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "card": { "type": "string" } },
            "additionalProperties": false,
            "dependencies": { "card": ["billing"] }
        }));
        let evaluation = evaluate(&generator, schema, json!({ "card": "x", "extra": 1 }));
        assert_eq!(
            evaluation.report.messages(),
            vec![
                "Provided JSON for Test contains not allowed additional properties [extra]",
                "Missing required attributes which are dependants of card: billing",
            ]
        );
    }

    #[test]
    fn conditional_applies_matching_consequence() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "if": { "pattern": "^x" },
                    "then": { "minLength": 3 },
                    "else": { "maxLength": 1 }
                }
            }
        }));
        assert!(evaluate(&generator, schema, json!({ "code": "xyz" })).is_valid());
        assert!(evaluate(&generator, schema, json!({ "code": "a" })).is_valid());

        let evaluation = evaluate(&generator, schema, json!({ "code": "ab" }));
        let violation = evaluation.report.iter().next().unwrap();
        assert_eq!(violation.kind, ErrorKind::ConditionalViolation);
        assert_eq!(violation.details[1].label, "Else: Failed");
    }

    #[test]
    fn explicit_null_settles_before_branches() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "v": { "oneOf": [{ "type": "string" }, { "type": "integer" }] },
                "w": { "not": { "type": "string" } },
                "n": { "type": "integer", "anyOf": [{ "minimum": 5 }, { "maximum": -5 }] }
            }
        }));
        let evaluation = evaluate(&generator, schema, json!({ "v": null, "w": null, "n": null }));
        assert!(evaluation.is_valid());
        assert_eq!(evaluation.model, json!({ "v": null, "w": null, "n": null }));

        assert!(evaluate(&generator, schema, json!({ "v": "a", "w": 5, "n": 7 })).is_valid());
        assert!(evaluate(&generator, schema, json!({ "v": 1 })).is_valid());
        assert_eq!(
            evaluate(&generator, schema, json!({ "v": 1.5, "w": "x" })).report.messages(),
            vec![
                "Invalid value for v declined by composition constraint. Requires to match one composition element but matched 0 elements",
                "Invalid value for w declined by composition constraint. Requires to match none of the composition elements but matched 1 elements",
            ]
        );
    }

    #[test]
    fn null_is_a_value_for_required_compositions() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "v": { "oneOf": [{ "type": "string" }, { "type": "integer" }] }
            },
            "required": ["v"]
        }));
        let evaluation = evaluate(&generator, schema, json!({ "v": null }));
        assert_eq!(
            evaluation.report.messages(),
            vec!["Invalid value for v declined by composition constraint. Requires to match one composition element but matched 0 elements"]
        );
    }

    #[test]
    fn branch_breakdown_lists_valid_and_failed_elements() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "oneOf": [{ "minLength": 1 }, { "maxLength": 5 }, { "pattern": "^z" }]
                }
            }
        }));
        let evaluation = evaluate(&generator, schema, json!({ "code": "ab" }));
        let violation = &evaluation.report.for_property("code")[0];
        assert_eq!(
            violation.message,
            "Invalid value for code declined by composition constraint. Requires to match one composition element but matched 2 elements"
        );
        let labels: Vec<&str> = violation.details.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Composition element #1: Valid",
                "Composition element #2: Valid",
                "Composition element #3: Failed",
            ]
        );
        assert!(violation.details[0].violations.is_empty());
        assert_eq!(
            violation.details[2].violations[0].message,
            "Value for code doesn't match pattern ^z"
        );
    }

    #[test]
    fn fail_fast_applies_inside_branches() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "anyOf": [{ "minLength": 5, "pattern": "^z" }, { "maxLength": 1 }]
                }
            }
        }));
        let input = json!({ "code": "ab" });

        let evaluation = evaluate(&generator, schema, input.clone());
        let violation = &evaluation.report.for_property("code")[0];
        assert_eq!(violation.details[0].violations.len(), 2);

        let evaluation = Evaluator::new(generator.graph(), Mode::FailFast).evaluate(schema, &input);
        let violation = &evaluation.report.for_property("code")[0];
        assert_eq!(
            violation.message,
            "Invalid value for code declined by composition constraint. Requires to match at least one composition element but matched 0 elements"
        );
        assert_eq!(violation.details[0].violations.len(), 1);
        assert_eq!(violation.details[1].label, "Composition element #2: Failed");
    }

    #[test]
    fn contains_needs_one_matching_item() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "scores": { "type": "array", "contains": { "type": "integer", "minimum": 5 } }
            }
        }));
        assert!(evaluate(&generator, schema, json!({ "scores": [1, "a", 7] })).is_valid());

        for scores in [json!([1, "a"]), json!([])] {
            let evaluation = evaluate(&generator, schema, json!({ "scores": scores }));
            assert_eq!(
                evaluation.report.messages(),
                vec!["No item in array scores matches contains constraint"]
            );
            assert_eq!(evaluation.report.iter().next().unwrap().kind, ErrorKind::ItemViolation);
        }
    }

    #[test]
    fn unique_items_compare_by_value() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "tags": { "type": "array", "uniqueItems": true } }
        }));
        assert!(evaluate(&generator, schema, json!({ "tags": [1, 2, "1", { "a": 1 }, { "a": 2 }] })).is_valid());

        for tags in [json!([1, 1.0]), json!([{ "a": 1 }, { "a": 1 }])] {
            assert_eq!(
                evaluate(&generator, schema, json!({ "tags": tags })).report.messages(),
                vec!["Items of array tags are not unique"]
            );
        }
    }

    #[test]
    fn property_names_are_evaluated() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "propertyNames": { "type": "string", "maxLength": 3 }
        }));
        assert!(evaluate(&generator, schema, json!({ "ab": 1, "abc": 2 })).is_valid());

        let evaluation = evaluate(&generator, schema, json!({ "ab": 1, "long": 2 }));
        let violation = evaluation.report.iter().next().unwrap();
        assert_eq!(violation.message, "Provided JSON for Test contains invalid property names");
        assert_eq!(violation.kind, ErrorKind::PropertyNameViolation);
        assert_eq!(violation.details.len(), 1);
        assert_eq!(violation.details[0].label, "Invalid property name long");
        assert_eq!(
            violation.details[0].violations[0].message,
            "Value for property name must not be longer than 3"
        );
    }

    #[test]
    fn pattern_property_values_are_evaluated() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "patternProperties": { "^n_": { "type": "integer" } }
        }));
        assert!(evaluate(&generator, schema, json!({ "n_a": 1, "other": "y" })).is_valid());

        let evaluation = evaluate(&generator, schema, json!({ "n_a": 1, "n_b": "x", "other": "y" }));
        let violation = evaluation.report.iter().next().unwrap();
        assert_eq!(
            violation.message,
            "Provided JSON for Test contains invalid pattern properties matching ^n_"
        );
        assert_eq!(violation.details.len(), 1);
        assert_eq!(violation.details[0].label, "Invalid pattern property n_b");
        assert_eq!(
            violation.details[0].violations[0].message,
            "Invalid type for pattern property ^n_. Requires integer, got string"
        );
    }

    #[test]
    fn additional_property_values_are_evaluated() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": { "id": { "type": "integer" } },
            "additionalProperties": { "type": "string" }
        }));
        assert!(evaluate(&generator, schema, json!({ "id": 1, "x": "a" })).is_valid());

        let evaluation = evaluate(&generator, schema, json!({ "id": 1, "x": "a", "y": 2 }));
        let violation = evaluation.report.iter().next().unwrap();
        assert_eq!(
            violation.message,
            "Provided JSON for Test contains invalid additional properties"
        );
        assert_eq!(violation.details.len(), 1);
        assert_eq!(violation.details[0].label, "Invalid additional property y");
        assert_eq!(
            violation.details[0].violations[0].message,
            "Invalid type for additional property. Requires string, got integer"
        );
    }

    #[test]
    fn object_conditional_picks_then_or_else() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "kind": { "type": "string" },
                "code": { "type": "string" },
                "reason": { "type": "string" }
            },
            "if": { "properties": { "kind": { "const": "a" } }, "required": ["kind"] },
            "then": { "required": ["code"] },
            "else": { "required": ["reason"] }
        }));
        assert!(evaluate(&generator, schema, json!({ "kind": "a", "code": "x" })).is_valid());
        assert!(evaluate(&generator, schema, json!({ "kind": "b", "reason": "y" })).is_valid());

        let evaluation = evaluate(&generator, schema, json!({ "kind": "a" }));
        let violation = &evaluation.report.for_property("Test")[0];
        assert_eq!(
            violation.message,
            "Invalid value for Test declined by conditional composition constraint"
        );
        assert_eq!(violation.kind, ErrorKind::ConditionalViolation);
        assert_eq!(violation.details[0].label, "If: Valid");
        assert_eq!(violation.details[1].label, "Then: Failed");
        assert!(violation
            .all_messages()
            .contains(&"Missing required value for code".to_string()));

        let evaluation = evaluate(&generator, schema, json!({ "kind": "b" }));
        let violation = &evaluation.report.for_property("Test")[0];
        assert_eq!(violation.details[0].label, "If: Failed");
        assert_eq!(violation.details[1].label, "Else: Failed");
        assert!(violation
            .all_messages()
            .contains(&"Missing required value for reason".to_string()));
    }

    #[test]
    fn union_with_object_member_reports_compositions_once() {
        let (generator, schema) = generate(json!({
            "type": "object",
            "properties": {
                "v": {
                    "type": ["object", "string"],
                    "anyOf": [
                        { "type": "object", "required": ["a"] },
                        { "type": "string", "minLength": 3 }
                    ]
                }
            }
        }));
        assert!(evaluate(&generator, schema, json!({ "v": { "a": 1 } })).is_valid());
        assert!(evaluate(&generator, schema, json!({ "v": "abc" })).is_valid());

        for v in [json!({}), json!("ab")] {
            assert_eq!(
                evaluate(&generator, schema, json!({ "v": v })).report.messages(),
                vec!["Invalid value for v declined by composition constraint. Requires to match at least one composition element but matched 0 elements"]
            );
        }
    }

    #[test]
    fn non_object_input_is_a_type_mismatch() {
        let (generator, schema) = generate(json!({ "type": "object" }));
        let evaluation = evaluate(&generator, schema, json!([1]));
        assert_eq!(
            evaluation.report.messages(),
            vec!["Invalid type for Test. Requires object, got array"]
        );
    }
}
