//! Derived type and field names.
//!
//! Every generated name is a pure function of the owner name, the field
//! name and a fixed suffix. Two generators producing the same name is a
//! naming collision, reported by the type graph.

/// Suffixes of generated type names.
pub mod suffix {
    pub const WHERE: &str = "Where";
    pub const SORT: &str = "Sort";
    pub const CREATE_INPUT: &str = "CreateInput";
    pub const UPDATE_INPUT: &str = "UpdateInput";
    pub const CONNECT_INPUT: &str = "ConnectInput";
    pub const DISCONNECT_INPUT: &str = "DisconnectInput";
    pub const DELETE_INPUT: &str = "DeleteInput";
    pub const RELATION_INPUT: &str = "RelationInput";
    pub const CONNECT_WHERE: &str = "ConnectWhere";
    pub const AGGREGATE_SELECTION: &str = "AggregateSelection";
    pub const EDGE: &str = "Edge";
    pub const CONNECTION: &str = "Connection";
    pub const IMPLEMENTATION: &str = "Implementation";
    pub const SUBSCRIPTION_WHERE: &str = "SubscriptionWhere";
    pub const EVENT_PAYLOAD: &str = "EventPayload";
    pub const CREATED_EVENT: &str = "CreatedEvent";
    pub const UPDATED_EVENT: &str = "UpdatedEvent";
    pub const DELETED_EVENT: &str = "DeletedEvent";

    pub const FIELD_INPUT: &str = "FieldInput";
    pub const CREATE_FIELD_INPUT: &str = "CreateFieldInput";
    pub const CONNECT_FIELD_INPUT: &str = "ConnectFieldInput";
    pub const UPDATE_FIELD_INPUT: &str = "UpdateFieldInput";
    pub const UPDATE_CONNECTION_INPUT: &str = "UpdateConnectionInput";
    pub const DISCONNECT_FIELD_INPUT: &str = "DisconnectFieldInput";
    pub const DELETE_FIELD_INPUT: &str = "DeleteFieldInput";
    pub const CONNECTION_WHERE: &str = "ConnectionWhere";
    pub const CONNECTION_SORT: &str = "ConnectionSort";
    pub const RELATIONSHIP: &str = "Relationship";
    pub const RELATIONSHIP_PROPERTIES: &str = "RelationshipProperties";
    pub const EDGE_WHERE: &str = "EdgeWhere";
    pub const AGGREGATE_INPUT: &str = "AggregateInput";
    pub const NODE_AGGREGATION_WHERE_INPUT: &str = "NodeAggregationWhereInput";
    pub const EDGE_AGGREGATION_WHERE_INPUT: &str = "EdgeAggregationWhereInput";
    pub const AGGREGATION_SELECTION: &str = "AggregationSelection";
    pub const NODE_AGGREGATE_SELECTION: &str = "NodeAggregateSelection";
    pub const EDGE_AGGREGATE_SELECTION: &str = "EdgeAggregateSelection";
}

/// Names of the shared types.
pub mod shared {
    pub const SORT_DIRECTION: &str = "SortDirection";
    pub const PAGE_INFO: &str = "PageInfo";
    pub const CREATE_INFO: &str = "CreateInfo";
    pub const UPDATE_INFO: &str = "UpdateInfo";
    pub const DELETE_INFO: &str = "DeleteInfo";
    pub const EVENT_TYPE: &str = "EventType";
}

/// `<base><suffix>`.
#[must_use]
pub fn derived(base: &str, suffix: &str) -> String {
    format!("{base}{suffix}")
}

/// Uppercases the first character.
#[must_use]
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercases the first character.
#[must_use]
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prefix of every relationship-level type: `<Owner><Field>`.
#[must_use]
pub fn relationship_prefix(owner: &str, field: &str) -> String {
    format!("{owner}{}", upper_first(field))
}

/// Prefix of a per-member variant under an abstract target: `<Owner><Field><Member>`.
#[must_use]
pub fn member_prefix(prefix: &str, member: &str) -> String {
    format!("{prefix}{member}")
}

/// `<Owner><Target><Field>` base of relationship aggregation selections.
#[must_use]
pub fn aggregation_base(owner: &str, target: &str, field: &str) -> String {
    format!("{owner}{target}{}", upper_first(field))
}

/// `<Plural>Connection` of a root connection field.
#[must_use]
pub fn root_connection(plural_type: &str) -> String {
    derived(plural_type, suffix::CONNECTION)
}

/// `Create<Plural>MutationResponse` and friends.
#[must_use]
pub fn mutation_response(verb: &str, plural_type: &str) -> String {
    format!("{verb}{plural_type}MutationResponse")
}

/// Root mutation field, e.g. `createMovies`.
#[must_use]
pub fn mutation_field(verb: &str, plural_type: &str) -> String {
    format!("{verb}{plural_type}")
}

/// Root subscription field, e.g. `movieCreated`.
#[must_use]
pub fn subscription_field(entity: &str, event: &str) -> String {
    format!("{}{event}", lower_first(entity))
}

/// Relationship output fields: `fConnection` and `fAggregate`.
#[must_use]
pub fn connection_field(field: &str) -> String {
    format!("{field}Connection")
}

#[must_use]
pub fn aggregate_field(field: &str) -> String {
    format!("{field}Aggregate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(upper_first("actors"), "Actors");
        assert_eq!(lower_first("Movie"), "movie");
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn test_relationship_names() {
        let prefix = relationship_prefix("Movie", "actors");
        assert_eq!(prefix, "MovieActors");
        assert_eq!(
            derived(&prefix, suffix::CONNECT_FIELD_INPUT),
            "MovieActorsConnectFieldInput"
        );
        assert_eq!(
            derived(&member_prefix("ActorActedIn", "Movie"), suffix::CONNECTION_WHERE),
            "ActorActedInMovieConnectionWhere"
        );
        assert_eq!(
            aggregation_base("Movie", "Actor", "actors"),
            "MovieActorActors"
        );
    }

    #[test]
    fn test_root_names() {
        assert_eq!(root_connection("Movies"), "MoviesConnection");
        assert_eq!(
            mutation_response("Create", "Movies"),
            "CreateMoviesMutationResponse"
        );
        assert_eq!(mutation_field("delete", "Movies"), "deleteMovies");
        assert_eq!(subscription_field("Movie", "Created"), "movieCreated");
    }
}
