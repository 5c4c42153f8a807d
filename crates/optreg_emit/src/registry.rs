//! Registry Emitter.
//!
//! Renders one collection model as a partial declaration of its registry
//! type. The rendered registry holds one instance per option type, created
//! once during type initialisation, and exposes:
//!
//! - one accessor per logical name (aliases share their instance);
//! - `Empty`, `All` and `Count`;
//! - `FromName` / `TryFromName` over logical names (ordinal);
//! - `Get<By..>` / `TryGet<By..>` per lookup property, and `Get` / `TryGet`
//!   for the default key.
//!
//! Lookup tables are built by inserting options in sorted order with
//! first-wins semantics, skipping null keys. A miss returns `Empty` (or an
//! empty sequence for multi-valued lookups).

use std::collections::{HashMap, HashSet};

use optreg_analysis::hasher::hash_collection;
use optreg_common::ContentHash;
use optreg_diagnostics::{catalog, Diagnostic, DiagnosticSink};
use optreg_model::{CollectionModel, KeyKind, LookupShape, PropertyLookupInfo, TypeInfoModel};

use crate::artifact::{GeneratedArtifact, SourceUnit, UnitStatus};
use crate::literal::{identifier, nullable_type_expr, parameter_name, string_literal, type_expr};
use crate::sentinel::{self, sentinel_class_name};
use crate::strategy::{select_strategy, GenerationStrategy};
use crate::writer::SourceBuilder;

const HEADER: &[&str] = &[
    "// <auto-generated>",
    "//     This file was generated by optreg.",
    "//     Changes to this file will be lost when the code is regenerated.",
    "// </auto-generated>",
];

const DICTIONARY: &str = "global::System.Collections.Generic.Dictionary";
const LIST: &str = "global::System.Collections.Generic.List";
const READ_ONLY_LIST: &str = "global::System.Collections.Generic.IReadOnlyList";
const SPAN: &str = "global::System.ReadOnlySpan<char>";
const AS_SPAN: &str = "global::System.MemoryExtensions.AsSpan";
const NOT_NULL_WHEN_TRUE: &str = "[global::System.Diagnostics.CodeAnalysis.NotNullWhen(true)]";
const APPEND: &str = "AppendToLookup";
const LOGICAL_NAME_FIELD: &str = "s_logicalNames";
const LOGICAL_NAME_SPAN_FIELD: &str = "s_logicalNameSpans";

/// Renders every model under `shape`.
///
/// Collections that fail to render are reported and left out; the others
/// are still emitted. Units are ordered by hint name.
pub fn emit(models: &[CollectionModel], shape: LookupShape) -> GeneratedArtifact {
    let sink = DiagnosticSink::new();
    let mut units: Vec<SourceUnit> = models
        .iter()
        .filter_map(|model| emit_collection(model, shape, &sink))
        .collect();
    units.sort_by(|a, b| a.hint_name.cmp(&b.hint_name));
    GeneratedArtifact {
        units,
        diagnostics: sink.take_all(),
    }
}

/// Renders one collection, or reports why it cannot be rendered.
pub fn emit_collection(
    model: &CollectionModel,
    shape: LookupShape,
    sink: &DiagnosticSink,
) -> Option<SourceUnit> {
    let text = match render(model, shape, sink) {
        Ok(text) => text,
        Err(diag) => {
            sink.emit(diag);
            return None;
        }
    };
    tracing::debug!(
        collection = %model.definition.name,
        shape = shape.label(),
        bytes = text.len(),
        "rendered registry"
    );
    Some(SourceUnit {
        hint_name: model.definition.hint_name(),
        collection: model.definition.name.clone(),
        content_hash: ContentHash::from_bytes(text.as_bytes()),
        fingerprint: hash_collection(model, shape),
        text,
        status: UnitStatus::Fresh,
    })
}

/// Renders the registry text for `model`.
///
/// Options whose logical name collides with a generated member are reported
/// (`E104`) and left out.
pub fn render(
    model: &CollectionModel,
    shape: LookupShape,
    sink: &DiagnosticSink,
) -> Result<String, Diagnostic> {
    sentinel::check(model)?;
    if let Some(l) = model.lookups.iter().find(|l| l.is_default && l.allow_multiple) {
        return Err(catalog::error_internal_invariant(
            &model.definition.name,
            &format!("default key `{}` is multi-valued", l.property_name),
        ));
    }
    let reserved = reserved_names(model);
    let options: Vec<&TypeInfoModel> = model
        .options
        .iter()
        .filter(|option| {
            if !reserved.contains(option.name.as_str()) {
                return true;
            }
            sink.emit(catalog::error_option_generation_failed(
                &option.full_type_name,
                &format!(
                    "logical name `{}` collides with a generated member of `{}`",
                    option.name,
                    model.definition.registry_name
                ),
                option.location.clone(),
            ));
            false
        })
        .collect();
    let mut emitter = Emitter::new(model, shape, options);
    emitter.write()?;
    Ok(emitter.out.build())
}

/// Member names the registry declares itself.
fn reserved_names(model: &CollectionModel) -> HashSet<String> {
    let mut names: HashSet<String> = [
        "All",
        "Count",
        "Empty",
        "FromName",
        "TryFromName",
        "Get",
        "TryGet",
        APPEND,
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    names.insert(model.definition.registry_name.clone());
    names.insert(sentinel_class_name(model));
    for lookup in &model.lookups {
        names.insert(lookup.method_name.clone());
        names.insert(lookup.try_method_name());
        names.insert(builder_name(lookup));
    }
    names
}

fn builder_name(lookup: &PropertyLookupInfo) -> String {
    format!("BuildBy{}", lookup.property_name)
}

/// One option type and the field holding its single instance.
struct Instance<'m> {
    field: String,
    option: &'m TypeInfoModel,
}

struct Emitter<'m> {
    model: &'m CollectionModel,
    shape: LookupShape,
    options: Vec<&'m TypeInfoModel>,
    instances: Vec<Instance<'m>>,
    /// Index into `instances` for each entry of `options`.
    instance_of: Vec<usize>,
    element: String,
    out: SourceBuilder,
}

impl<'m> Emitter<'m> {
    fn new(
        model: &'m CollectionModel,
        shape: LookupShape,
        options: Vec<&'m TypeInfoModel>,
    ) -> Self {
        let mut instances: Vec<Instance<'m>> = Vec::new();
        let mut by_type: HashMap<&str, usize> = HashMap::new();
        let mut instance_of = Vec::with_capacity(options.len());
        for &option in &options {
            let index = *by_type
                .entry(option.full_type_name.as_str())
                .or_insert_with(|| {
                    instances.push(Instance {
                        field: format!("s_instance{}", option.name),
                        option,
                    });
                    instances.len() - 1
                });
            instance_of.push(index);
        }
        Self {
            model,
            shape,
            options,
            instances,
            instance_of,
            element: type_expr(&model.element_type),
            out: SourceBuilder::default(),
        }
    }

    fn write(&mut self) -> Result<(), Diagnostic> {
        for line in HEADER {
            self.out.line(*line);
        }
        self.out.line("#nullable enable");
        self.out.blank();

        let definition = &self.model.definition;
        let namespaced = !definition.namespace.is_empty();
        if namespaced {
            self.out.open(format!("namespace {}", definition.namespace));
        }
        let modifiers = if definition.registry_is_static {
            format!("{} static partial class", definition.registry_accessibility.keyword())
        } else {
            format!("{} partial class", definition.registry_accessibility.keyword())
        };
        self.out.open(format!("{modifiers} {}", definition.registry_name));

        self.write_instances();
        self.write_accessors();
        self.write_all();
        self.write_from_name();
        let model = self.model;
        for lookup in &model.lookups {
            self.write_lookup(lookup);
        }
        if model.lookups.iter().any(|l| l.allow_multiple) {
            self.write_append_helper();
        }
        sentinel::write(&mut self.out, model)?;

        self.out.close();
        if namespaced {
            self.out.close();
        }
        Ok(())
    }

    fn accessor_type(&self, option: &TypeInfoModel) -> String {
        option
            .return_type
            .as_ref()
            .map(|ret| type_expr(&ret.0))
            .unwrap_or_else(|| self.element.clone())
    }

    fn write_instances(&mut self) {
        for instance in &self.instances {
            let ty = format!("global::{}", instance.option.full_type_name);
            self.out.line(format!(
                "private static readonly {ty} {} = new {ty}();",
                instance.field
            ));
        }
        let sentinel = sentinel_class_name(self.model);
        self.out
            .line(format!("private static readonly {sentinel} s_empty = new {sentinel}();"));
        self.out.blank();
    }

    fn write_accessors(&mut self) {
        for (option, &index) in self.options.iter().zip(&self.instance_of) {
            let line = format!(
                "public static {} {} => {};",
                self.accessor_type(option),
                identifier(&option.name),
                self.instances[index].field
            );
            self.out.line(line);
        }
        self.out
            .line("/// <summary>The value returned when a lookup finds no option.</summary>");
        self.out
            .line(format!("public static {} Empty => s_empty;", self.element));
        self.out.blank();
    }

    fn write_all(&mut self) {
        let element = self.element.clone();
        self.out.open(format!(
            "private static readonly {element}[] s_all = new {element}[]"
        ));
        for &index in &self.instance_of {
            let line = format!("{},", self.instances[index].field);
            self.out.line(line);
        }
        self.out.close_with(";");
        self.out.line(format!(
            "public static {READ_ONLY_LIST}<{element}> All => s_all;"
        ));
        self.out
            .line(format!("public static int Count => {};", self.options.len()));
        self.out.blank();
    }

    fn write_from_name(&mut self) {
        let element = self.element.clone();
        let table = format!("{DICTIONARY}<string, {element}>");
        self.out.open(format!(
            "private static readonly {table} {LOGICAL_NAME_FIELD} = new {table}(global::System.StringComparer.Ordinal)"
        ));
        for (option, &index) in self.options.iter().zip(&self.instance_of) {
            let line = format!(
                "[{}] = {},",
                string_literal(&option.name),
                self.instances[index].field
            );
            self.out.line(line);
        }
        self.out.close_with(";");
        let access = KeyAccess {
            field: LOGICAL_NAME_FIELD.to_string(),
            span_field: LOGICAL_NAME_SPAN_FIELD.to_string(),
            param: "name".to_string(),
            param_type: "string".to_string(),
            guard: true,
            value: element.clone(),
            multiple: false,
        };
        match self.shape {
            LookupShape::AlternateLookup => {
                self.write_span_view(&access, "string", &element);
                self.write_span_methods(&access, "FromName", Some("TryFromName"));
            }
            LookupShape::PerKeyDictionary => {
                self.write_direct_methods(&access, "FromName", Some("TryFromName"));
            }
        }
        self.out.blank();
    }

    fn write_lookup(&mut self, lookup: &PropertyLookupInfo) {
        let value = lookup
            .return_type
            .as_ref()
            .map(type_expr)
            .unwrap_or_else(|| self.element.clone());
        let key = type_expr(&lookup.key_type);
        let stored = if lookup.allow_multiple {
            format!("{LIST}<{value}>")
        } else {
            value.clone()
        };
        let access = KeyAccess {
            field: format!("s_by{}", lookup.property_name),
            span_field: format!("s_spanBy{}", lookup.property_name),
            param: parameter_name(&lookup.property_name),
            param_type: nullable_type_expr(&lookup.key_type, lookup.nullable),
            guard: lookup.nullable || lookup.key_kind() == KeyKind::String,
            value,
            multiple: lookup.allow_multiple,
        };
        let table = format!("{DICTIONARY}<{key}, {stored}>");
        let builder = builder_name(lookup);
        self.out.line(format!(
            "private static readonly {table} {} = {builder}();",
            access.field
        ));
        self.out.blank();
        self.out.open(format!("private static {table} {builder}()"));
        let comparer = comparer_expr(lookup).unwrap_or_default();
        self.out.line(format!("var map = new {table}({comparer});"));
        for (i, instance) in self.instances.iter().enumerate() {
            let source = format!("{}.{}", instance.field, lookup.property_name);
            let insert = |key: &str| {
                if lookup.allow_multiple {
                    format!("{APPEND}(map, {key}, {});", instance.field)
                } else {
                    format!("map.TryAdd({key}, {});", instance.field)
                }
            };
            let line = if lookup.nullable {
                let bound = format!("key{i}");
                format!("if ({source} is {{ }} {bound}) {}", insert(&bound))
            } else {
                insert(&source)
            };
            self.out.line(line);
        }
        self.out.line("return map;");
        self.out.close();

        let try_name = lookup.try_get.then(|| lookup.try_method_name());
        match select_strategy(lookup, self.shape) {
            GenerationStrategy::AlternateView => {
                self.write_span_view(&access, &key, &stored);
                self.write_span_methods(&access, &lookup.method_name, try_name.as_deref());
            }
            GenerationStrategy::DirectDictionary => {
                self.write_direct_methods(&access, &lookup.method_name, try_name.as_deref());
            }
        }
        if lookup.is_default {
            self.write_default(lookup, &access);
        }
        self.out.blank();
    }

    fn write_span_view(&mut self, access: &KeyAccess, key: &str, stored: &str) {
        self.out.line(format!(
            "private static readonly {DICTIONARY}<{key}, {stored}>.AlternateLookup<{SPAN}> {} = {}.GetAlternateLookup<{SPAN}>();",
            access.span_field, access.field
        ));
    }

    /// `Get..`/`TryGet..` that query the table directly.
    fn write_direct_methods(&mut self, access: &KeyAccess, get: &str, try_get: Option<&str>) {
        let KeyAccess {
            field,
            param,
            param_type,
            ..
        } = access;
        let (key, condition) = if access.guard {
            ("key", format!("{param} is {{ }} key && "))
        } else {
            (param.as_str(), String::new())
        };
        self.out.line(format!(
            "public static {} {get}({param_type} {param}) => {condition}{field}.TryGetValue({key}, out var found) ? {} : {};",
            access.result_type(),
            access.hit("found"),
            access.miss()
        ));
        if let Some(try_get) = try_get {
            self.write_try(access, try_get, param_type, &condition, &format!("{field}.TryGetValue({key}, out var found)"));
        }
    }

    /// String overloads that forward to span overloads, and span overloads
    /// that query the alternate view.
    fn write_span_methods(&mut self, access: &KeyAccess, get: &str, try_get: Option<&str>) {
        let KeyAccess {
            span_field,
            param,
            param_type,
            ..
        } = access;
        let result = access.result_type();
        self.out.line(format!(
            "public static {result} {get}({param_type} {param}) => {param} is null ? {} : {get}({AS_SPAN}({param}));",
            access.miss()
        ));
        self.out.line(format!(
            "public static {result} {get}({SPAN} {param}) => {span_field}.TryGetValue({param}, out var found) ? {} : {};",
            access.hit("found"),
            access.miss()
        ));
        if let Some(try_get) = try_get {
            let out_param = access.out_param();
            self.out.open(format!(
                "public static bool {try_get}({param_type} {param}, {out_param})"
            ));
            self.out.open(format!("if ({param} is null)"));
            self.out.line(format!("{} = null;", access.out_name()));
            self.out.line("return false;");
            self.out.close();
            self.out.line(format!(
                "return {try_get}({AS_SPAN}({param}), out {});",
                access.out_name()
            ));
            self.out.close();
            self.write_try(
                access,
                try_get,
                SPAN,
                "",
                &format!("{span_field}.TryGetValue({param}, out var found)"),
            );
        }
    }

    fn write_try(
        &mut self,
        access: &KeyAccess,
        try_get: &str,
        param_type: &str,
        condition: &str,
        probe: &str,
    ) {
        let out_name = access.out_name();
        self.out.open(format!(
            "public static bool {try_get}({param_type} {}, {})",
            access.param,
            access.out_param()
        ));
        self.out.open(format!("if ({condition}{probe})"));
        self.out.line(format!("{out_name} = found;"));
        self.out.line("return true;");
        self.out.close();
        self.out.line(format!("{out_name} = null;"));
        self.out.line("return false;");
        self.out.close();
    }

    fn write_default(&mut self, lookup: &PropertyLookupInfo, access: &KeyAccess) {
        let KeyAccess {
            param, param_type, ..
        } = access;
        self.out.line(format!(
            "public static {} Get({param_type} {param}) => {}({param});",
            access.result_type(),
            lookup.method_name
        ));
        if lookup.try_get {
            self.out.line(format!(
                "public static bool TryGet({param_type} {param}, {}) => {}({param}, out {});",
                access.out_param(),
                lookup.try_method_name(),
                access.out_name()
            ));
        }
    }

    fn write_append_helper(&mut self) {
        self.out.line(format!(
            "private static void {APPEND}<TKey, TValue>({DICTIONARY}<TKey, {LIST}<TValue>> map, TKey key, TValue value)"
        ));
        self.out.indent().line("where TKey : notnull").dedent();
        self.out.line("{").indent();
        self.out.open("if (!map.TryGetValue(key, out var list))");
        self.out.line(format!("list = new {LIST}<TValue>();"));
        self.out.line("map.Add(key, list);");
        self.out.close();
        self.out.line("list.Add(value);");
        self.out.close();
        self.out.blank();
    }
}

/// How generated methods read one table.
/// Lookup fields are `s_by{Property}` and `s_spanBy{Property}`; no other
/// generated field starts with either prefix.
struct KeyAccess {
    field: String,
    span_field: String,
    param: String,
    param_type: String,
    /// Null keys short-circuit to a miss before the table is queried.
    guard: bool,
    /// Element type of a hit.
    value: String,
    multiple: bool,
}

impl KeyAccess {
    fn result_type(&self) -> String {
        if self.multiple {
            format!("{READ_ONLY_LIST}<{}>", self.value)
        } else {
            self.value.clone()
        }
    }

    fn hit(&self, found: &str) -> String {
        if self.multiple {
            format!("({}){found}", self.result_type())
        } else {
            found.to_string()
        }
    }

    fn miss(&self) -> String {
        if self.multiple {
            format!("global::System.Array.Empty<{}>()", self.value)
        } else {
            "s_empty".to_string()
        }
    }

    fn out_name(&self) -> &'static str {
        if self.multiple {
            "values"
        } else {
            "value"
        }
    }

    fn out_param(&self) -> String {
        format!(
            "{NOT_NULL_WHEN_TRUE} out {}? {}",
            self.result_type(),
            self.out_name()
        )
    }
}

fn comparer_expr(lookup: &PropertyLookupInfo) -> Option<String> {
    match (&lookup.comparer, lookup.key_kind()) {
        (Some(custom), _) => Some(custom.clone()),
        (None, KeyKind::String) => Some(format!(
            "global::System.StringComparer.{}",
            lookup.comparison.comparer_member()
        )),
        (None, _) => None,
    }
}
