//! Aggregation selections and aggregation filters.

use crate::augment::Augmenter;
use crate::naming::{self, derived, suffix};
use crate::plan::{RelationshipPlan, RelationshipType};
use crate::scalars;
use crate::shared;
use nodegql_model::{Entity, Field, Relationship};
use nodegql_schema::{
    FieldDef, InputFieldDef, ObjectDef, SchemaBuildError, TypeDef, TypeRef,
};

const COUNT_OPERATORS: &[&str] = &["EQ", "LT", "LTE", "GT", "GTE"];

impl Augmenter<'_> {
    /// `<E>AggregateSelection` of the root aggregate field.
    pub(crate) fn entity_aggregate_selection(
        &mut self,
        entity: &Entity,
    ) -> Result<(), SchemaBuildError> {
        let mut def = ObjectDef::new(derived(&entity.name, suffix::AGGREGATE_SELECTION))
            .field(FieldDef::new("count", TypeRef::required("Int")));
        self.add_selection_fields(&mut def, &entity.fields)?;
        self.types.insert(TypeDef::Object(def))
    }

    /// `fAggregate` selection and filter types of one relationship.
    pub(crate) fn relationship_aggregation(
        &mut self,
        entity: &Entity,
        rel: &Relationship,
        rel_plan: &RelationshipPlan,
    ) -> Result<(), SchemaBuildError> {
        let graph = self.graph;
        let Some(target) = graph.entity(rel.target.name()) else {
            return Ok(());
        };
        // Interface owners aggregate over the node only.
        let props = if entity.is_interface() {
            None
        } else {
            rel.properties().and_then(|p| graph.properties.get(p))
        };

        if rel_plan.has(RelationshipType::AggregationSelection) {
            let base = naming::aggregation_base(&entity.name, &target.name, &rel.field_name);
            let mut selection = ObjectDef::new(derived(&base, suffix::AGGREGATION_SELECTION))
                .field(FieldDef::new("count", TypeRef::required("Int")));

            let node_name = derived(&base, suffix::NODE_AGGREGATE_SELECTION);
            if let Some(node) = self.nested_selection(node_name, &target.fields)? {
                selection.add_field(FieldDef::new("node", TypeRef::named(node)));
            }
            if let Some(props) = props {
                let edge_name = derived(&base, suffix::EDGE_AGGREGATE_SELECTION);
                if let Some(edge) = self.nested_selection(edge_name, &props.fields)? {
                    selection.add_field(FieldDef::new("edge", TypeRef::named(edge)));
                }
            }
            self.types.insert(TypeDef::Object(selection))?;
        }

        if rel_plan.has(RelationshipType::AggregateInput) {
            let prefix = rel_plan.prefix.as_str();
            let mut input = shared::logical_input(derived(prefix, suffix::AGGREGATE_INPUT));
            if self.options.legacy_filters {
                input.add_field(
                    InputFieldDef::new("count", TypeRef::named("Int"))
                        .deprecated(Some(scalars::LEGACY_FILTER_REASON.into())),
                );
            }
            for op in COUNT_OPERATORS {
                input.add_field(InputFieldDef::new(
                    format!("count_{op}"),
                    TypeRef::named("Int"),
                ));
            }

            let node_name = derived(prefix, suffix::NODE_AGGREGATION_WHERE_INPUT);
            if let Some(node) = self.aggregation_where(node_name, &target.fields)? {
                input.add_field(InputFieldDef::new("node", TypeRef::named(node)));
            }
            if let Some(props) = props {
                let edge_name = derived(prefix, suffix::EDGE_AGGREGATION_WHERE_INPUT);
                if let Some(edge) = self.aggregation_where(edge_name, &props.fields)? {
                    input.add_field(InputFieldDef::new("edge", TypeRef::named(edge)));
                }
            }
            self.types.insert(TypeDef::InputObject(input))?;
        }

        Ok(())
    }

    fn add_selection_fields(
        &mut self,
        def: &mut ObjectDef,
        fields: &[Field],
    ) -> Result<(), SchemaBuildError> {
        for field in fields.iter().filter(|f| f.selectable.on_aggregate) {
            if let Some(selection) = scalars::aggregate_selection_type(field) {
                def.add_field(
                    FieldDef::new(&field.name, TypeRef::required(&selection.name))
                        .deprecated_if(field.deprecation.as_ref()),
                );
                self.types.insert_shared(TypeDef::Object(selection))?;
            }
        }
        Ok(())
    }

    /// Node or edge selection; `None` when no field aggregates.
    fn nested_selection(
        &mut self,
        name: String,
        fields: &[Field],
    ) -> Result<Option<String>, SchemaBuildError> {
        let mut def = ObjectDef::new(&name);
        self.add_selection_fields(&mut def, fields)?;
        if def.fields.is_empty() {
            return Ok(None);
        }
        self.types.insert(TypeDef::Object(def))?;
        Ok(Some(name))
    }

    /// Node or edge aggregation filter; `None` when no field qualifies.
    fn aggregation_where(
        &mut self,
        name: String,
        fields: &[Field],
    ) -> Result<Option<String>, SchemaBuildError> {
        let filters: Vec<InputFieldDef> = fields
            .iter()
            .filter(|f| f.filterable.by_aggregate)
            .flat_map(scalars::aggregation_filters)
            .collect();
        if filters.is_empty() {
            return Ok(None);
        }

        let mut input = shared::logical_input(&name);
        for filter in filters {
            input.add_field(filter);
        }
        self.types.insert(TypeDef::InputObject(input))?;
        Ok(Some(name))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{augmented, field_names};
    use crate::AugmentOptions;

    const MOVIES: &str = r#"
        type Movie {
            title: String!
            rating: Float
            actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
        }

        type Actor {
            name: String!
            born: Int
        }

        type ActedIn @relationshipProperties {
            screenTime: Int!
        }
    "#;

    #[test]
    fn test_entity_aggregate_selection() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        assert_eq!(
            field_names(&schema, "MovieAggregateSelection"),
            vec!["count", "title", "rating"]
        );
        let selection = schema.types.object("MovieAggregateSelection").unwrap();
        assert_eq!(
            selection.fields["title"].ty.to_string(),
            "StringAggregateSelection!"
        );
        assert_eq!(
            field_names(&schema, "FloatAggregateSelection"),
            vec!["min", "max", "average", "sum"]
        );
    }

    #[test]
    fn test_relationship_aggregation_selection() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        assert_eq!(
            field_names(&schema, "MovieActorActorsAggregationSelection"),
            vec!["count", "node", "edge"]
        );
        assert_eq!(
            field_names(&schema, "MovieActorActorsNodeAggregateSelection"),
            vec!["name", "born"]
        );
        assert_eq!(
            field_names(&schema, "MovieActorActorsEdgeAggregateSelection"),
            vec!["screenTime"]
        );
    }

    #[test]
    fn test_aggregate_input() {
        let schema = augmented(MOVIES, &AugmentOptions::default());
        let input = schema.types.input("MovieActorsAggregateInput").unwrap();
        assert!(input.fields["count"].deprecated);
        for name in ["AND", "OR", "NOT", "count_EQ", "count_GTE", "node", "edge"] {
            assert!(input.fields.contains_key(name), "missing {name}");
        }
        let node = field_names(&schema, "MovieActorsNodeAggregationWhereInput");
        assert!(node.contains(&"name_SHORTEST_LENGTH_EQUAL".to_string()));
        assert!(node.contains(&"born_AVERAGE_GT".to_string()));
        let edge = field_names(&schema, "MovieActorsEdgeAggregationWhereInput");
        assert!(edge.contains(&"screenTime_SUM_LTE".to_string()));
    }

    #[test]
    fn test_abstract_targets_have_no_aggregation() {
        let schema = augmented(
            r#"
            interface Person { name: String! }
            type Actor implements Person { name: String! }
            type Movie {
                title: String
                people: [Person!]! @relationship(type: "ACTED_IN", direction: IN)
            }
            "#,
            &AugmentOptions::default(),
        );
        assert!(!schema.types.contains("MoviePersonPeopleAggregationSelection"));
        assert!(!schema.types.contains("MoviePeopleAggregateInput"));
        let movie = schema.types.object("Movie").unwrap();
        assert!(!movie.fields.contains_key("peopleAggregate"));
        assert!(!schema.types.input("MovieWhere").unwrap().fields.contains_key("peopleAggregate"));
    }

    #[test]
    fn test_aggregate_false_suppresses_aggregation() {
        let schema = augmented(
            r#"
            type Movie {
                title: String
                actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, aggregate: false)
            }
            type Actor { name: String }
            "#,
            &AugmentOptions::default(),
        );
        assert!(!schema.types.contains("MovieActorActorsAggregationSelection"));
        assert!(!schema.types.contains("MovieActorsAggregateInput"));
    }
}
