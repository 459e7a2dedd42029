use associated_jsonb::prelude::*;
use associated_jsonb::RecordTypeRegistry;
use serde_json::json;

embedded_record! {
    /// A shipping address kept inside an order's `addresses` column.
    pub struct ShippingAddress {
        street: "string",
        floor: "integer",
        note = "none",
        primary: "boolean" = false,
    }
}

embedded_record! {
    pub struct Coupon {
        code: "string",
    }
}

embedded_record! {
    pub struct GiftNote {
        message: "string",
    }
}

#[test]
fn generated_accessors_read_and_write() {
    let mut address = ShippingAddress::new().unwrap();
    assert_eq!(address.street(), JsonValue::Null);
    assert_eq!(address.note(), json!("none"));
    assert_eq!(address.primary(), json!(false));
    assert!(!address.street_present());

    address.set_street("Storgata 1").unwrap();
    address.set_floor("2").unwrap();

    assert_eq!(address.street(), json!("Storgata 1"));
    assert_eq!(address.floor(), json!(2));
    assert!(address.street_present());
    assert_eq!(
        address.changed_attributes(),
        vec!["street".to_string(), "floor".to_string()]
    );
}

#[test]
fn record_type_is_cached_and_registered() {
    let first = ShippingAddress::record_type().unwrap();
    let second = ShippingAddress::record_type().unwrap();
    assert!(first.same_as(&second));

    let names: Vec<&str> = first.schema().attribute_names().collect();
    assert_eq!(names, vec!["street", "floor", "note", "primary"]);

    let registered = RecordTypeRegistry::global().resolve("ShippingAddress").unwrap();
    assert!(registered.same_as(&first));
}

#[test]
fn adapter_for_generated_type() {
    let column = JsonbArrayType::of::<ShippingAddress>().unwrap();
    let collection = column
        .deserialize(RawValue::from(r#"[{"street":"A","floor":"3"},{"street":"B"}]"#))
        .unwrap();

    let addresses: Vec<ShippingAddress> = collection.into_models().unwrap();
    assert_eq!(addresses[0].floor(), json!(3));
    assert_eq!(addresses[1].street(), json!("B"));
}

#[test]
fn adapter_resolves_generated_type_by_name() {
    Coupon::record_type().unwrap();

    let column = JsonbArrayType::named("Coupon");
    let collection = column.cast(RawValue::from(json!({"code": "SPRING"}))).unwrap();
    assert_eq!(collection.to_serializable(), json!([{"code": "SPRING"}]));
}

#[test]
fn models_convert_to_and_from_records() {
    let coupon = Coupon::from_attributes(json!({"code": "X"})).unwrap();
    let record: EmbeddedRecord = coupon.clone().into();
    assert_eq!(Coupon::try_from(record).unwrap(), coupon);

    let address = ShippingAddress::new().unwrap().into_record();
    assert!(matches!(
        Coupon::try_from(address),
        Err(RecordError::InvalidElement(_))
    ));
}

#[test]
fn models_can_be_assigned_to_a_column() {
    let column = JsonbArrayType::of::<Coupon>().unwrap();
    let mut first = Coupon::new().unwrap();
    first.set_code("A").unwrap();
    let second = Coupon::from_attributes(json!({"code": "B"})).unwrap();

    let mut collection = column.cast(RawValue::from_models(vec![first])).unwrap();
    collection.push_model(second).unwrap();

    assert_eq!(
        column.serialize(&collection).unwrap().as_deref(),
        Some(r#"[{"code":"A"},{"code":"B"}]"#)
    );
    assert!(collection.is_changed());
}

#[test]
fn first_construction_registers_type_once() {
    let first = GiftNote::from_attributes(json!({"message": "hi"})).unwrap();
    let registered = RecordTypeRegistry::global().resolve("GiftNote").unwrap();
    assert!(registered.same_as(first.record().record_type()));

    for _ in 0..3 {
        let note = GiftNote::new().unwrap();
        assert!(note.record().record_type().same_as(&registered));
    }
}
