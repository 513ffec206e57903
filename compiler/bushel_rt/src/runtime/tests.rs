use std::sync::Arc;

use bushel_ir::builtin_terms::{Commands, Properties};
use bushel_ir::{ProgramBuilder, Resource, Term, TermDictionary, TermId, TermName};
use pretty_assertions::assert_eq;

use super::Runtime;
use crate::errors::ErrorKind;
use crate::loader::ResourceLoader;
use crate::output::silent_output;
use crate::value::Value;

struct FinderTerms;

impl ResourceLoader for FinderTerms {
    fn load_terminology(&self, locator: &str) -> Option<TermDictionary> {
        (locator == "Finder").then(|| {
            TermDictionary::from_terms([
                Term::named(TermId::type_("Finder/window"), "window"),
                Term::named(TermId::command("Finder/get"), "get"),
            ])
        })
    }
}

#[test]
fn module_ids_go_stale_between_runs() {
    let mut b = ProgramBuilder::new("top");
    let root = b.property(None, Properties::TopScript.id());
    let program = b.finish(root).unwrap();
    let mut runtime = Runtime::builder().output(silent_output()).build();

    let Value::Module(first) = runtime.run(&program).unwrap() else {
        panic!("top script should be a module");
    };
    assert!(runtime.modules.get(first).is_ok());

    runtime.run(&program).unwrap();
    assert_eq!(runtime.modules.get(first).err(), Some(ErrorKind::StaleModule));
    assert!(runtime.modules.get(runtime.core).unwrap().is_core());
}

#[test]
fn globals_set_by_a_run_do_not_leak_into_the_next() {
    let color = TermId::property("color");
    let mut b = ProgramBuilder::new("set");
    let target = b.property(None, color.clone());
    let value = b.string("red");
    let root = b.set(target, value);
    let setter = b.finish(root).unwrap();

    let mut b = ProgramBuilder::new("get");
    let root = b.property(None, color);
    let getter = b.finish(root).unwrap();

    let mut runtime = Runtime::builder().output(silent_output()).build();
    runtime.run(&setter).unwrap();
    let error = runtime.run(&getter).unwrap_err();
    assert!(matches!(error.kind(), Some(ErrorKind::NoPropertyExists { .. })));
}

#[test]
fn application_terminology_cannot_shadow_get() {
    let finder = TermId::resource("Finder");
    let mut b = ProgramBuilder::new("use");
    b.define(Term::named(finder.clone(), "Finder").with_resource(Resource::ApplicationByName {
        name: "Finder".to_owned(),
    }));
    let root = b.use_(finder);
    let program = b.finish(root).unwrap();

    let mut runtime = Runtime::builder()
        .output(silent_output())
        .loader(Arc::new(FinderTerms))
        .build();
    let application = runtime.run(&program).unwrap();
    assert_eq!(application.to_string(), "application \"Finder\"");

    let terms = runtime.terms();
    assert!(terms.lookup_id(&TermId::type_("Finder/window")).is_some());
    assert!(terms.lookup_id(&TermId::command("Finder/get")).is_none());
    let get = terms.lookup_name(&TermName::new("get")).map(|term| term.id.clone());
    assert_eq!(get, Some(Commands::Get.id()));
}

#[test]
fn termination_requested_before_a_run_is_cleared() {
    let mut b = ProgramBuilder::new("one");
    let root = b.integer(1);
    let program = b.finish(root).unwrap();
    let mut runtime = Runtime::builder().output(silent_output()).build();

    runtime.request_termination();
    assert!(matches!(runtime.run(&program), Ok(Value::Integer(1))));
    assert!(!runtime.is_running());
    assert!(!runtime.termination_handle().is_requested());
}
