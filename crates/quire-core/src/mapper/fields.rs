use super::MappingPass;
use crate::contract::{RawField, RawSystem};
use crate::error::{QuireError, Result};
use crate::model::{
    string_value, AssetsField, CustomField, DateTimeField, FieldKind, FieldValue, Link,
    LinkedItemsField, MultipleChoiceField, NumberField, RichTextField, TaxonomyField, TextField,
    UrlSlugField,
};
use crate::variant::TypeShell;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

impl MappingPass<'_> {
    pub(super) fn map_fields(
        &mut self,
        system: &RawSystem,
        elements: &BTreeMap<String, RawField>,
        shell: &TypeShell,
    ) -> Result<HashMap<String, FieldValue>> {
        let mut fields = HashMap::with_capacity(elements.len());
        for (codename, field) in elements {
            let property = shell.property_name(codename);
            let value = self.map_field(system, codename, field, shell)?;
            fields.insert(property, value);
        }
        Ok(fields)
    }

    fn map_field(
        &mut self,
        system: &RawSystem,
        codename: &str,
        field: &RawField,
        shell: &TypeShell,
    ) -> Result<FieldValue> {
        let kind = FieldKind::parse(&field.field_type).ok_or_else(|| {
            QuireError::UnsupportedFieldType {
                field: codename.to_string(),
                field_type: field.field_type.clone(),
            }
        })?;

        let value = match kind {
            FieldKind::Text => FieldValue::Text(TextField::new(codename, &field.value)?),
            FieldKind::Number => FieldValue::Number(NumberField::new(codename, &field.value)),
            FieldKind::DateTime => FieldValue::DateTime(DateTimeField::new(codename, &field.value)),
            FieldKind::MultipleChoice => {
                FieldValue::MultipleChoice(MultipleChoiceField::new(codename, &field.value)?)
            }
            FieldKind::Asset => FieldValue::Asset(AssetsField::new(codename, &field.value)?),
            FieldKind::Taxonomy => FieldValue::Taxonomy(TaxonomyField::new(
                codename,
                &field.value,
                field.taxonomy_group.clone(),
            )?),
            FieldKind::UrlSlug => {
                FieldValue::UrlSlug(self.map_url_slug(system, codename, field, shell)?)
            }
            FieldKind::RichText => FieldValue::RichText(self.map_rich_text(codename, field)?),
            FieldKind::LinkedItems => {
                FieldValue::LinkedItems(self.map_linked_items(codename, field)?)
            }
            FieldKind::Custom => self.map_custom(system, codename, field),
        };
        Ok(value)
    }

    fn map_linked_items(&mut self, codename: &str, field: &RawField) -> Result<LinkedItemsField> {
        let value: Vec<String> = match &field.value {
            Value::Null => Vec::new(),
            other => serde_json::from_value(other.clone()).map_err(|e| {
                QuireError::MalformedInput(format!(
                    "linked items field '{}' must be a list of codenames: {}",
                    codename, e
                ))
            })?,
        };

        let mut items = Vec::with_capacity(value.len());
        for linked in &value {
            if let Some(node) = self.resolve_linked(linked, codename, field)? {
                items.push(node);
            }
        }

        Ok(LinkedItemsField {
            name: codename.to_string(),
            value,
            items,
        })
    }

    /// Embedded items are mapped now so that the deferred rewrite finds them.
    fn map_rich_text(&mut self, codename: &str, field: &RawField) -> Result<RichTextField> {
        let markup = string_value(codename, &field.value)?;

        let mut linked_items = Vec::with_capacity(field.modular_content.len());
        for linked in &field.modular_content {
            if let Some(node) = self.resolve_linked(linked, codename, field)? {
                linked_items.push(node);
            }
        }

        let links = field
            .links
            .iter()
            .map(|(item_id, raw)| Link::from_raw(item_id, raw))
            .collect();

        Ok(RichTextField::new(
            codename,
            markup,
            field.modular_content.clone(),
            linked_items,
            links,
            Arc::clone(&self.settings),
        ))
    }

    fn map_url_slug(
        &self,
        system: &RawSystem,
        codename: &str,
        field: &RawField,
        shell: &TypeShell,
    ) -> Result<UrlSlugField> {
        let slug = string_value(codename, &field.value)?;
        let link = Link {
            item_id: system.id.clone(),
            codename: system.codename.clone(),
            url_slug: slug.clone(),
            content_type: system.content_type.clone(),
        };
        let resolver = self
            .query
            .link_resolver
            .clone()
            .or_else(|| shell.link_resolver.clone());

        Ok(UrlSlugField::new(
            codename,
            slug,
            link,
            resolver,
            self.logging(),
        ))
    }

    fn map_custom(&self, system: &RawSystem, codename: &str, field: &RawField) -> FieldValue {
        self.config
            .field_resolver
            .as_ref()
            .and_then(|resolve| resolve(&system.content_type, codename, &field.value))
            .unwrap_or_else(|| FieldValue::Custom(CustomField::new(codename, field.value.clone())))
    }
}
