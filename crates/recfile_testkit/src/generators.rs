//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random schemas, records and
//! projections that maintain the schema invariants.

use proptest::prelude::*;
use recfile_codec::{FieldType, Record, Schema, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Strategy for generating valid identifiers.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating field types.
pub fn field_type_strategy() -> impl Strategy<Value = FieldType> {
    prop_oneof![Just(FieldType::String), Just(FieldType::Int32)]
}

/// Strategy for generating schemas with up to `max_fields` fields.
pub fn schema_strategy(max_fields: usize) -> impl Strategy<Value = Arc<Schema>> {
    (
        identifier_strategy(),
        prop::collection::btree_set(identifier_strategy(), 0..=max_fields),
    )
        .prop_flat_map(|(name, field_names)| {
            let count = field_names.len();
            (
                Just(name),
                Just(field_names),
                prop::collection::vec(field_type_strategy(), count),
            )
        })
        .prop_map(|(name, field_names, types)| {
            let builder = field_names
                .into_iter()
                .zip(types)
                .fold(Schema::builder(name), |b, (field, ty)| b.field(field, ty));
            Arc::new(builder.build().expect("Generated schema is invalid"))
        })
}

/// Strategy for generating a value of `field_type`.
pub fn value_strategy(field_type: FieldType) -> BoxedStrategy<Value> {
    match field_type {
        FieldType::Int32 => any::<i32>().prop_map(Value::Int32).boxed(),
        FieldType::String => ".{0,32}".prop_map(Value::String).boxed(),
    }
}

/// Strategy for generating complete records of `schema`.
pub fn record_strategy(schema: Arc<Schema>) -> impl Strategy<Value = Record> {
    let values: Vec<_> = schema
        .fields()
        .iter()
        .map(|field| value_strategy(field.field_type()))
        .collect();
    values.prop_map(move |values| {
        Record::from_values(Arc::clone(&schema), values).expect("Generated record is invalid")
    })
}

/// Strategy for generating a schema together with a batch of its records.
pub fn schema_and_records_strategy(
    max_fields: usize,
    max_records: usize,
) -> impl Strategy<Value = (Arc<Schema>, Vec<Record>)> {
    schema_strategy(max_fields).prop_flat_map(move |schema| {
        (
            Just(Arc::clone(&schema)),
            prop::collection::vec(record_strategy(schema), 0..=max_records),
        )
    })
}

/// Strategy for generating an order-preserving projection of `schema`.
pub fn projection_strategy(schema: Arc<Schema>) -> impl Strategy<Value = Schema> {
    let len = schema.len();
    prop::collection::btree_set(0..len.max(1), 0..=len).prop_map(move |indices| {
        projection_of(&schema, &indices)
    })
}

/// Builds the projection of `schema` keeping the fields at `indices`.
pub fn projection_of(schema: &Schema, indices: &BTreeSet<usize>) -> Schema {
    schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| indices.contains(i))
        .fold(Schema::builder(schema.name()), |b, (_, field)| {
            b.field(field.name(), field.field_type())
        })
        .build()
        .expect("Projection of a valid schema is invalid")
}
