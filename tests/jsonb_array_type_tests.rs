use associated_jsonb::prelude::*;
use associated_jsonb::{AttributeType, JSONB_ARRAY_TYPE_TAG, register_attribute_type};
use serde_json::json;

fn widget(name: &str) -> RecordType {
    RecordType::builder(name)
        .attribute("name", AttributeOptions::typed("string"))
        .unwrap()
        .attribute("price", AttributeOptions::typed("float"))
        .unwrap()
        .attribute("active", AttributeOptions::typed("boolean").with_default(false))
        .unwrap()
        .build()
}

#[test]
fn reports_jsonb_array_tag() {
    let column = JsonbArrayType::new(&widget("TagWidget"));
    assert_eq!(column.type_tag(), JSONB_ARRAY_TYPE_TAG);
    assert_eq!(column.type_tag(), "jsonb_array");
}

#[test]
fn cast_coerces_each_element() {
    let column = JsonbArrayType::new(&widget("CastWidget"));
    let collection = column
        .cast(RawValue::from(json!([{"name": "Widget", "price": "3.5"}])))
        .unwrap();

    assert_eq!(collection.len(), 1);
    assert_eq!(
        JsonValue::Object(collection[0].attributes_snapshot()),
        json!({"name": "Widget", "price": 3.5, "active": false})
    );
}

#[test]
fn deserialize_parses_stored_text() {
    let column = JsonbArrayType::new(&widget("TextWidget"));
    let collection = column
        .deserialize(RawValue::from(r#"[{"name":"A","price":1},{"name":"B","active":"t"}]"#))
        .unwrap();

    assert_eq!(
        collection.to_serializable(),
        json!([
            {"name": "A", "price": 1.0, "active": false},
            {"name": "B", "price": null, "active": true}
        ])
    );
}

#[test]
fn deserialize_of_structured_data_matches_cast() {
    let column = JsonbArrayType::new(&widget("StructuredWidget"));
    let raw = json!([{"name": "Widget", "price": "2"}]);

    let cast = column.cast(RawValue::from(raw.clone())).unwrap();
    let deserialized = column.deserialize(RawValue::from(raw)).unwrap();
    assert_eq!(cast, deserialized);
}

#[test]
fn deserialize_keeps_in_memory_collection() {
    let column = JsonbArrayType::new(&widget("InMemoryWidget"));
    let mut collection = column.cast(RawValue::from(json!([{"name": "A"}]))).unwrap();
    collection.clear_changes();
    collection[0].set("name", "B").unwrap();

    let again = column.deserialize(RawValue::from(collection)).unwrap();
    assert_eq!(again[0].changed_attributes(), vec!["name".to_string()]);
}

#[test]
fn invalid_stored_text_is_a_parse_error() {
    let column = JsonbArrayType::new(&widget("BrokenWidget"));
    assert!(matches!(
        column.deserialize(RawValue::from("[{\"name\":")),
        Err(RecordError::Parse(_))
    ));
}

#[test]
fn serialize_then_cast_round_trips() {
    let column = JsonbArrayType::new(&widget("RoundTripWidget"));
    let input = json!([
        {"name": "Widget", "price": "3.5"},
        {"name": "Gadget", "active": 1, "ignored": true}
    ]);

    let original = RecordCollection::wrap(input, column.child_type().as_ref().unwrap()).unwrap();
    let stored = column.serialize(&original).unwrap().unwrap();
    let parsed: JsonValue = serde_json::from_str(&stored).unwrap();
    let reloaded = column.cast(RawValue::from(parsed)).unwrap();

    assert_eq!(reloaded.to_serializable(), original.to_serializable());
    assert_eq!(
        stored,
        concat!(
            r#"[{"name":"Widget","price":3.5,"active":false},"#,
            r#"{"name":"Gadget","price":null,"active":true}]"#
        )
    );
}

#[test]
fn serialize_handles_null_and_plain_values() {
    let column = JsonbArrayType::new(&widget("PlainWidget"));
    assert_eq!(column.serialize(&RawValue::Null).unwrap(), None);
    assert_eq!(
        column.serialize(&json!([{"name": "x"}])).unwrap().as_deref(),
        Some(r#"[{"name":"x"}]"#)
    );
}

#[test]
fn changed_in_place_compares_serialized_forms() {
    let column = JsonbArrayType::new(&widget("ChangedWidget"));
    let stored = RawValue::from(r#"[{"name":"Widget","price":3.5}]"#);

    let same = column
        .cast(RawValue::from(json!([{"price": "3.5", "name": "Widget", "active": false}])))
        .unwrap();
    assert!(!column.changed_in_place(&stored, &same).unwrap());

    let mut edited = column.deserialize(stored.clone()).unwrap();
    assert!(!column.changed_in_place(&stored, &edited).unwrap());

    edited[0].set("active", true).unwrap();
    assert!(column.changed_in_place(&stored, &edited).unwrap());

    let mut shorter = column.deserialize(stored.clone()).unwrap();
    shorter.remove(0);
    assert!(column.changed_in_place(&stored, &shorter).unwrap());
}

#[test]
fn changed_in_place_ignores_dirty_flags() {
    let column = JsonbArrayType::new(&widget("FlagWidget"));
    let stored = RawValue::from(r#"[{"name":"Widget"}]"#);

    let mut loaded = column.deserialize(stored.clone()).unwrap();
    loaded[0].set("name", "Other").unwrap();
    loaded[0].set("name", "Widget").unwrap();

    assert!(loaded[0].is_changed());
    assert!(!column.changed_in_place(&stored, &loaded).unwrap());
}

#[test]
fn named_child_type_is_resolved_lazily() {
    let column = JsonbArrayType::named("LazyWidget");
    assert!(matches!(
        column.cast(RawValue::Null),
        Err(RecordError::UnresolvedType(name)) if name == "LazyWidget"
    ));

    let record_type = widget("LazyWidget");
    record_type.register().unwrap();

    let collection = column.cast(RawValue::from(json!([{"name": "late"}]))).unwrap();
    assert!(collection.record_type().same_as(&record_type));
    assert!(column.is_resolved().unwrap());
}

#[derive(Debug)]
struct UpcaseType;

impl AttributeType for UpcaseType {
    fn name(&self) -> &str {
        "upcase"
    }

    fn cast(&self, value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::String(s) => JsonValue::String(s.to_uppercase()),
            JsonValue::Null => JsonValue::Null,
            other => JsonValue::String(other.to_string().to_uppercase()),
        }
    }
}

#[test]
fn custom_attribute_types_can_be_registered() {
    let before = RecordType::builder("UpcaseWidgetEarly")
        .attribute("code", AttributeOptions::typed("upcase"));
    assert!(matches!(before, Err(RecordError::UnknownType(tag)) if tag == "upcase"));

    register_attribute_type(UpcaseType).unwrap();

    let record_type = RecordType::builder("UpcaseWidget")
        .attribute("code", AttributeOptions::typed("upcase"))
        .unwrap()
        .build();
    let column = JsonbArrayType::new(&record_type);
    let mut collection = column.deserialize(RawValue::from(r#"[{"code":"ab-1"}]"#)).unwrap();
    assert_eq!(collection.to_serializable(), json!([{"code": "AB-1"}]));

    collection.clear_changes();
    collection[0].set("code", "AB-1").unwrap();
    assert!(!collection.is_changed());
}
