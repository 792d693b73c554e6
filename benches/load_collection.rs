//! This bench test loads a large collection of nested fieldsets, growing it
//! from empty on every iteration.

#![allow(missing_docs)]

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use forminput::{BuildError, Fieldset, NullFilter, Options, Registry};
use serde_json::{json, Value};

fn order(fieldset: &mut Fieldset) -> Result<(), BuildError> {
    fieldset.set_field("customer", None)?;
    fieldset.set_collection("lines", Some("line"))?;
    Ok(())
}

fn line(fieldset: &mut Fieldset) -> Result<(), BuildError> {
    fieldset.set_field("sku", None)?;
    fieldset.set_field("quantity", Some("number"))?;
    fieldset.set_fieldset("shipping", Some("address"))?;
    Ok(())
}

fn address(fieldset: &mut Fieldset) -> Result<(), BuildError> {
    fieldset.set_field("street", None)?;
    fieldset.set_field("city", None)?;
    Ok(())
}

fn new_order() -> Fieldset {
    let mut registry = Registry::new(Rc::new(Options::new()));
    registry
        .register_fieldset("line", || Rc::new(NullFilter), line)
        .register_fieldset("address", || Rc::new(NullFilter), address);
    let registry = Rc::new(registry);
    let options = Rc::clone(registry.options());
    Fieldset::with_init(registry, Rc::new(NullFilter), options, &order).unwrap()
}

fn order_data(lines: usize) -> Value {
    let lines: Vec<Value> = (0..lines)
        .map(|i| {
            json!({
                "sku": format!("SKU-{i:04}"),
                "quantity": i % 7,
                "shipping": {"street": "1 Main St", "city": "Springfield"},
            })
        })
        .collect();
    json!({"customer": "ACME", "lines": lines})
}

fn load_collection(c: &mut Criterion) {
    let data = order_data(1000);

    c.bench_function("load 1000 order lines", |b| {
        b.iter_batched(
            || (new_order(), data.clone()),
            |(mut order, data)| order.load(data).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, load_collection);
criterion_main!(benches);
