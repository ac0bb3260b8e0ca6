//! Subscription event types.

use crate::augment::Augmenter;
use crate::naming::{derived, shared as shared_names, suffix};
use crate::scalars;
use crate::shared;
use nodegql_model::Entity;
use nodegql_schema::{FieldDef, ObjectDef, SchemaBuildError, TypeDef, TypeRef};

impl Augmenter<'_> {
    /// Payload, created/updated/deleted events and the subscription filter
    /// of one concrete entity.
    pub(crate) fn entity_events(&mut self, entity: &Entity) -> Result<(), SchemaBuildError> {
        let name = entity.name.as_str();
        self.types.insert_shared(shared::event_type())?;

        let payload = derived(name, suffix::EVENT_PAYLOAD);
        let mut def = ObjectDef::new(&payload);
        for field in &entity.fields {
            def.add_field(
                FieldDef::new(&field.name, field.ty.clone())
                    .deprecated_if(field.deprecation.as_ref()),
            );
        }
        self.types.insert(TypeDef::Object(def))?;

        let header = |event: String| {
            ObjectDef::new(event)
                .field(FieldDef::new(
                    "event",
                    TypeRef::required(shared_names::EVENT_TYPE),
                ))
                .field(FieldDef::new("timestamp", TypeRef::required("Float")))
        };

        let created = header(derived(name, suffix::CREATED_EVENT)).field(FieldDef::new(
            format!("created{name}"),
            TypeRef::required(&payload),
        ));
        let updated = header(derived(name, suffix::UPDATED_EVENT))
            .field(FieldDef::new("previousState", TypeRef::required(&payload)))
            .field(FieldDef::new(
                format!("updated{name}"),
                TypeRef::required(&payload),
            ));
        let deleted = header(derived(name, suffix::DELETED_EVENT)).field(FieldDef::new(
            format!("deleted{name}"),
            TypeRef::required(&payload),
        ));
        for event in [created, updated, deleted] {
            self.types.insert(TypeDef::Object(event))?;
        }

        let mut filter = shared::logical_input(derived(name, suffix::SUBSCRIPTION_WHERE));
        for field in entity
            .fields
            .iter()
            .filter(|f| f.filterable.by_value && f.deprecation.is_none())
        {
            for op in scalars::filter_fields(field, false) {
                filter.add_field(op);
            }
        }
        self.types.insert(TypeDef::InputObject(filter))
    }
}
