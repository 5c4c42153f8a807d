//! End-to-end scenarios: basic collections, alias names and constructor
//! classification, checked against both the emitted text and the runtime
//! registry.

use optreg_analysis::constructors::classify_constructors;
use optreg_conformance::{
    demo, int, model, param, param_with_default, property, registry, run_single, string,
    CompilationBuilder, TypeBuilder, NS,
};
use optreg_model::LookupShape;
use optreg_runtime::{same_instance, KeyRef};
use optreg_symbols::{Accessibility, Compilation, ConstantValue, PropertySymbol};

fn basic() -> Compilation {
    CompilationBuilder::new()
        .widgets()
        .widget("Added", 1, "added")
        .widget("Updated", 2, "updated")
        .widget("Deleted", 3, "deleted")
        .build()
}

#[test]
fn basic_collection_orders_by_logical_name() {
    let c = basic();
    let m = model(&c, "Widgets");
    let names: Vec<&str> = m.options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Added", "Deleted", "Updated"]);

    for shape in [LookupShape::AlternateLookup, LookupShape::PerKeyDictionary] {
        let r = registry(&c, "Widgets", shape).unwrap();
        assert_eq!(r.count(), 3);
        assert_eq!(r.names().collect::<Vec<_>>(), vec!["Added", "Deleted", "Updated"]);
        assert_eq!(r.get(KeyRef::Int(2)).unwrap().full_type_name(), "Demo.Updated");
        let miss = r.get(KeyRef::Int(99)).unwrap();
        assert!(miss.is_empty());
        assert!(same_instance(miss, r.empty()));
    }
}

#[test]
fn basic_collection_emitted_surface() {
    let result = run_single(&basic());
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let text = result.single_text();
    for name in ["Added", "Deleted", "Updated"] {
        assert!(text.contains(&format!(
            "public static global::Demo.Widget {name} => s_instance{name};"
        )));
    }
    assert!(text.contains("public static int Count => 3;"));
    let added = text.find("        s_instanceAdded,").unwrap();
    let deleted = text.find("        s_instanceDeleted,").unwrap();
    let updated = text.find("        s_instanceUpdated,").unwrap();
    assert!(added < deleted && deleted < updated);
    assert!(text.contains("GetById(int id)"));
    assert!(text.contains("TryGetById(int id"));
    assert!(text.contains("GetByName(string name)"));
}

#[test]
fn alias_names_share_one_instance() {
    let c = CompilationBuilder::new()
        .widgets()
        .with(
            TypeBuilder::class(NS, "CRUD")
                .sealed()
                .base(demo("Widget"))
                .option_named("Crud")
                .option_named("CreateReadUpdateDelete")
                .id(4)
                .name_value("crud"),
        )
        .build();

    let result = run_single(&c);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    let text = result.single_text();
    assert_eq!(text.matches("new global::Demo.CRUD()").count(), 1);
    assert!(text.contains("Crud => s_instanceCreateReadUpdateDelete;"));
    assert!(text.contains("CreateReadUpdateDelete => s_instanceCreateReadUpdateDelete;"));

    let r = registry(&c, "Widgets", LookupShape::AlternateLookup).unwrap();
    assert_eq!(r.count(), 2);
    assert_eq!(r.instance_count(), 1);
    let a = r.from_name("Crud");
    let b = r.from_name("CreateReadUpdateDelete");
    assert!(!a.is_empty());
    assert!(same_instance(a, b));
    assert!(same_instance(r.get(KeyRef::Int(4)).unwrap(), a));
}

fn auto(name: &str, ty: optreg_symbols::TypeRef) -> PropertySymbol {
    PropertySymbol {
        is_auto: true,
        ..property(name, ty)
    }
}

#[test]
fn record_primary_constructor_is_detected() {
    let record = TypeBuilder::record(NS, "Entry")
        .property(auto("Id", int()))
        .property(auto("Name", string()))
        .primary_constructor(vec![param("Id", int()), param("Name", string())])
        .build();
    let ctors = classify_constructors(&record);
    assert_eq!(ctors.len(), 1);
    assert!(ctors[0].is_primary);
    assert_eq!(ctors[0].parameters.len(), 2);
}

#[test]
fn explicit_constructors_are_not_primary() {
    let class = TypeBuilder::class(NS, "Entry")
        .property(auto("Id", int()))
        .property(auto("Name", string()))
        .constructor(Accessibility::Public, Vec::new())
        .constructor(
            Accessibility::Public,
            vec![param("id", int()), param("name", string())],
        )
        .build();
    let ctors = classify_constructors(&class);
    assert_eq!(ctors.len(), 2);
    assert!(ctors.iter().all(|c| !c.is_primary));
}

#[test]
fn option_with_defaulted_primary_constructor_is_generated() {
    let c = CompilationBuilder::new()
        .widgets()
        .with(
            TypeBuilder::option("Sized", demo("Widget"))
                .id(7)
                .name_value("sized")
                .primary_constructor(vec![param_with_default(
                    "size",
                    int(),
                    ConstantValue::Int(1),
                )]),
        )
        .build();
    let m = model(&c, "Widgets");
    assert_eq!(m.options.len(), 1);
    assert!(m.options[0].constructors[0].is_primary);
    assert_eq!(
        m.options[0].constructors[0].parameters[0].default_literal.as_deref(),
        Some("1")
    );
    let result = run_single(&c);
    assert!(result.single_text().contains("new global::Demo.Sized()"));
}
