use super::{bool_keyword, count_keyword};
use crate::error::{DefinitionError, malformed};
use crate::generator::{Generator, Scope};
use crate::model::Property;
use crate::validator::{Check, Validator};
use serde_json::Value;

impl Generator {
    /// Item, tuple, contains, size and uniqueness checks of an array.
    ///
    /// Item properties live in a nested context: they never carry a presence
    /// check, whatever the array's own requiredness.
    pub(super) fn apply_array(
        &mut self,
        scope: &Scope,
        property: &mut Property,
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let name = property.name().to_string();

        if let Some(min) = count_keyword(&name, node, "minItems")? {
            property.add_validator(Validator::new(Check::MinItems(min)));
        }
        if let Some(max) = count_keyword(&name, node, "maxItems")? {
            property.add_validator(Validator::new(Check::MaxItems(max)));
        }
        if bool_keyword(&name, node, "uniqueItems")? {
            property.add_validator(Validator::new(Check::UniqueItems));
        }

        match node.get("items") {
            None => {}
            Some(Value::Array(tuple)) => self.apply_tuple(scope, property, &name, tuple, node)?,
            Some(items) => {
                let item =
                    self.build_nested_property(scope, &format!("item of array {}", name), items)?;
                property.add_validator(Validator::new(Check::Items { item }));
            }
        }

        if let Some(contains) = node.get("contains") {
            let item = self.build_nested_property(
                scope,
                &format!("contained item of array {}", name),
                contains,
            )?;
            property.add_validator(Validator::new(Check::Contains { item }));
        }
        Ok(())
    }

    fn apply_tuple(
        &mut self,
        scope: &Scope,
        property: &mut Property,
        name: &str,
        tuple: &[Value],
        node: &Value,
    ) -> Result<(), DefinitionError> {
        let mut items = Vec::with_capacity(tuple.len());
        for (index, item) in tuple.iter().enumerate() {
            items.push(self.build_nested_property(
                scope,
                &format!("tuple item #{} of array {}", index, name),
                item,
            )?);
        }
        let expected = items.len();
        property.add_validator(Validator::new(Check::Tuple { items }));

        match node.get("additionalItems") {
            None | Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => {
                property.add_validator(Validator::new(Check::AdditionalItemsRejected { expected }));
            }
            Some(additional @ Value::Object(_)) => {
                let item = self.build_nested_property(
                    scope,
                    &format!("additional item of array {}", name),
                    additional,
                )?;
                property.add_validator(Validator::new(Check::AdditionalItems {
                    offset: expected,
                    item,
                }));
            }
            Some(_) => {
                return Err(malformed(name, "additionalItems must be a boolean or a schema"));
            }
        }
        Ok(())
    }
}
