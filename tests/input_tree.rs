//! End-to-end behaviour of a form built from nested fieldsets and
//! collections.

#![allow(missing_docs)]

use std::rc::Rc;

use forminput::{
    BuildError, Error, Export, Fieldset, Filter, Input, NullFilter, Options, Registry, RuleFilter,
};
use serde_json::{json, Value};

fn user(fieldset: &mut Fieldset) -> Result<(), BuildError> {
    fieldset.set_field("name", None)?;
    fieldset
        .set_field("role", Some("select"))?
        .set_choices([("admin", "Administrator"), ("guest", "Guest")]);
    fieldset.set_fieldset("address", None)?;
    fieldset.set_collection("phones", Some("phone"))?;
    Ok(())
}

fn address(fieldset: &mut Fieldset) -> Result<(), BuildError> {
    fieldset.set_field("street", None)?;
    fieldset.set_field("city", None)?;
    Ok(())
}

fn phone(fieldset: &mut Fieldset) -> Result<(), BuildError> {
    fieldset.set_field("number", Some("tel"))?;
    Ok(())
}

fn required_city() -> Rc<dyn Filter> {
    let mut rules = RuleFilter::new();
    rules.add_rule("city", "City is required", |value, _| {
        value.as_value().is_some_and(|v| !v.is_null())
    });
    Rc::new(rules)
}

fn form() -> Fieldset {
    form_filtered_by(Rc::new(NullFilter))
}

fn form_filtered_by(filter: Rc<dyn Filter>) -> Fieldset {
    let mut registry = Registry::new(Rc::new(Options::new()));
    registry
        .register_fieldset("address", required_city, address)
        .register_fieldset("phone", || Rc::new(NullFilter), phone);
    let registry = Rc::new(registry);

    let options = Rc::clone(registry.options());
    let mut form = Fieldset::with_init(registry, filter, options, &user).unwrap();
    form.set_name("F");
    form
}

fn city(form: &Fieldset) -> Option<&Value> {
    form.value("address")
        .ok()?
        .as_fieldset()?
        .value("city")
        .ok()?
        .as_value()
}

#[test]
fn nested_load_reaches_grandchildren() {
    let mut form = form();

    form.load(json!({"address": {"city": "Paris"}})).unwrap();

    assert_eq!(city(&form), Some(&json!("Paris")));
}

#[test]
fn nested_export_is_one_level_at_a_time() {
    let mut form = form();
    form.load(json!({"address": {"city": "Paris"}})).unwrap();

    let inputs = form.export();
    assert_eq!(inputs["address"].array_name(), "F");

    let address = inputs.get_mut("address").unwrap();
    let Export::Fieldset(children) = address.export() else {
        panic!("address should export as a fieldset");
    };
    assert_eq!(children["city"].array_name(), "address");
    assert_eq!(children["city"].read().as_value(), Some(&json!("Paris")));
}

#[test]
fn export_keys_match_registered_children() {
    let mut form = form();

    let inputs = form.export();

    assert_eq!(
        inputs.keys().collect::<Vec<_>>(),
        vec!["name", "role", "address", "phones"]
    );
    assert!(inputs.values().all(|input| input.array_name() == "F"));
}

#[test]
fn collection_child_loads_and_exports_in_order() {
    let mut form = form();

    form.load(json!({
        "name": "Ada",
        "phones": [{"number": "111"}, {"number": "222"}],
    }))
    .unwrap();

    let phones = form.collection_mut("phones").unwrap();
    assert_eq!(phones.len(), 2);

    let numbers: Vec<_> = phones
        .export()
        .into_iter()
        .map(|element| element["number"].read().as_value().cloned())
        .collect();
    assert_eq!(numbers, vec![Some(json!("111")), Some(json!("222"))]);
}

#[test]
fn get_returns_display_ready_field() {
    let mut form = form();
    form.set_value("role", json!("guest")).unwrap();

    let view = form.get("role").unwrap().into_field().unwrap();

    assert_eq!(view.name, "F[role]");
    assert_eq!(view.input_type, "select");
    assert_eq!(view.choices.get("guest").map(String::as_str), Some("Guest"));
    assert_eq!(view.value, &json!("guest"));
}

#[test]
fn over_complete_data_creates_nothing() {
    let mut form = form();

    form.load(json!({"name": "Ada", "nickname": "ada"})).unwrap();

    assert!(!form.contains("nickname"));
    assert_eq!(
        form.value("nickname").unwrap_err(),
        Error::UnknownInput("nickname".to_string())
    );
}

#[test]
fn setting_a_fieldset_value_loads_it() {
    let mut form = form();

    form.set_value("address", json!({"street": "Rue de Rivoli", "city": "Paris"}))
        .unwrap();

    assert_eq!(city(&form), Some(&json!("Paris")));
    assert!(matches!(
        form.input("address").unwrap(),
        Input::Fieldset(address) if address.len() == 2
    ));
}

#[test]
fn nested_fieldsets_keep_their_own_filter() {
    let mut form = form();
    let address = form.fieldset_mut("address").unwrap();

    assert!(!address.filter().unwrap());
    assert_eq!(address.messages_for("city"), vec!["City is required"]);

    address.set_value("city", json!("Paris")).unwrap();
    assert!(address.filter().unwrap());

    assert!(form.filter().unwrap());
    assert!(form.messages().is_empty());
}

#[test]
fn top_level_filter_sees_nested_values() {
    let mut rules = RuleFilter::new();
    rules.add_rule("address", "Address needs a city", |value, _| {
        value
            .as_fieldset()
            .and_then(|address| address.value("city").ok())
            .and_then(|city| city.as_value())
            .is_some_and(|city| !city.is_null())
    });
    let mut form = form_filtered_by(Rc::new(rules));

    assert!(!form.filter().unwrap());
    assert_eq!(form.messages_for("address"), vec!["Address needs a city"]);

    form.load(json!({"address": {"city": "Lyon"}})).unwrap();
    assert!(form.filter().unwrap());
}
