//! End-to-end runs through the public runtime API.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bushel_ir::builtin_terms::{Commands, Constants, Parameters, Properties, Types};
use bushel_ir::{
    BinaryOp, ExprId, Program, ProgramBuilder, Resource, SemanticAddress, SourceId, SourceLocation,
    Span, SyntacticRole, Term, TermDictionary, TermId,
};
use bushel_rt::protocol::{WireContainer, WireQuery, WireRoot, WireSelector};
use bushel_rt::{
    buffer_output, silent_output, ErrorKind, ProtocolAdapter, ProtocolError, RemoteRequest,
    ResourceLoader, RunError, Runtime, Value, WireValue,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

fn program(build: impl FnOnce(&mut ProgramBuilder) -> ExprId) -> Program {
    let mut b = ProgramBuilder::new("scenario");
    let root = build(&mut b);
    b.finish(root).unwrap()
}

fn runtime() -> Runtime {
    Runtime::builder().output(silent_output()).build()
}

/// Answers `get` with a fixed reply, echoes the new value of `set` and
/// refuses everything else.
#[derive(Default)]
struct RecordingAdapter {
    requests: Mutex<Vec<RemoteRequest>>,
}

impl ProtocolAdapter for RecordingAdapter {
    fn send(&self, request: &RemoteRequest) -> Result<WireValue, ProtocolError> {
        self.requests.lock().push(request.clone());
        if request.command == Commands::Get.id().address {
            Ok(WireValue::Text("Desktop".to_owned()))
        } else if request.command == Commands::Set.id().address {
            Ok(request
                .argument(&Parameters::SetTo.id().address)
                .cloned()
                .unwrap_or(WireValue::Null))
        } else {
            Err(ProtocolError::EventNotHandled)
        }
    }
}

fn finder(b: &mut ProgramBuilder) -> ExprId {
    let id = TermId::resource("Finder");
    b.define(Term::named(id.clone(), "Finder").with_resource(Resource::ApplicationByName {
        name: "Finder".to_owned(),
    }));
    b.use_(id)
}

fn window() -> TermId {
    TermId::new(SyntacticRole::Type, SemanticAddress::code(*b"cwin"))
}

#[test]
fn arithmetic_on_variables() {
    let value = runtime()
        .run(&program(|b| {
            let x = b.variable_term("x");
            let five = b.integer(5);
            let bind = b.let_(&x, Some(five));
            let read = b.variable(&x);
            let three = b.integer(3);
            let sum = b.infix(BinaryOp::Add, read, three);
            b.sequence(vec![bind, sum])
        }))
        .unwrap();
    assert!(matches!(value, Value::Integer(8)));
}

#[test]
fn tell_a_list_for_an_item() {
    let value = runtime()
        .run(&program(|b| {
            let list = b.integers(&[1, 2, 3]);
            let second = b.index(None, Types::Item.id(), 2);
            b.tell(list, second)
        }))
        .unwrap();
    assert!(matches!(value, Value::Integer(2)));
}

#[test]
fn raised_objects_reach_the_handler() {
    let value = runtime()
        .run(&program(|b| {
            let payload = b.integers(&[4, 2]);
            let raise = b.raise(payload);
            let it = b.it();
            let length = b.property(Some(it), Properties::Length.id());
            b.try_(raise, length)
        }))
        .unwrap();
    assert!(matches!(value, Value::Integer(2)));
}

#[test]
fn unhandled_raises_end_the_run() {
    let error = runtime()
        .run(&program(|b| {
            let payload = b.string("nope");
            b.raise(payload)
        }))
        .unwrap_err();
    assert_eq!(
        error.kind(),
        Some(&ErrorKind::Raised {
            description: "\"nope\"".to_owned(),
        })
    );
}

#[test]
fn host_globals_are_found_from_inside_a_tell() {
    let answer = TermId::property("answer");
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .global(answer.clone(), Value::Integer(42))
        .build();
    let value = runtime
        .run(&program(|b| {
            let list = b.integers(&[1]);
            let read = b.property(None, answer);
            b.tell(list, read)
        }))
        .unwrap();
    assert!(matches!(value, Value::Integer(42)));
}

#[test]
fn queries_against_applications_are_sent_whole() {
    let adapter = Arc::new(RecordingAdapter::default());
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .adapter(Arc::clone(&adapter) as Arc<dyn ProtocolAdapter>)
        .build();

    let value = runtime
        .run(&program(|b| {
            let app = finder(b);
            let first_window = b.index(None, window(), 1);
            let name = b.property(Some(first_window), Properties::Name.id());
            b.tell(app, name)
        }))
        .unwrap();
    assert_eq!(value.to_string(), "\"Desktop\"");

    let requests = adapter.requests.lock();
    assert_eq!(requests.len(), 1);
    let expected = WireValue::Query(Box::new(WireQuery {
        container: WireContainer::Query(Box::new(WireQuery {
            container: WireContainer::Root(WireRoot::Application),
            key: window().address,
            selector: WireSelector::Index(WireValue::Integer(1)),
        })),
        key: Properties::Name.id().address,
        selector: WireSelector::Property,
    }));
    assert_eq!(requests[0].argument(&Parameters::Direct.id().address), Some(&expected));
}

#[test]
fn setting_an_application_property_sends_set() {
    let adapter = Arc::new(RecordingAdapter::default());
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .adapter(Arc::clone(&adapter) as Arc<dyn ProtocolAdapter>)
        .build();

    let value = runtime
        .run(&program(|b| {
            let app = finder(b);
            let first_window = b.index(None, window(), 1);
            let name = b.property(Some(first_window), Properties::Name.id());
            let renamed = b.string("Home");
            let set = b.set(name, renamed);
            b.tell(app, set)
        }))
        .unwrap();
    assert_eq!(value.to_string(), "\"Home\"");

    let requests = adapter.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command, Commands::Set.id().address);
    let expected = WireValue::Query(Box::new(WireQuery {
        container: WireContainer::Query(Box::new(WireQuery {
            container: WireContainer::Root(WireRoot::Application),
            key: window().address,
            selector: WireSelector::Index(WireValue::Integer(1)),
        })),
        key: Properties::Name.id().address,
        selector: WireSelector::Property,
    }));
    assert_eq!(requests[0].argument(&Parameters::Direct.id().address), Some(&expected));
    assert_eq!(
        requests[0].argument(&Parameters::SetTo.id().address),
        Some(&WireValue::Text("Home".to_owned()))
    );
}

#[test]
fn unhandled_remote_commands_fall_through_to_core() {
    let adapter = Arc::new(RecordingAdapter::default());
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .adapter(Arc::clone(&adapter) as Arc<dyn ProtocolAdapter>)
        .build();

    let value = runtime
        .run(&program(|b| {
            let app = finder(b);
            let seconds = b.integer(0);
            let delay = b.command(Commands::Delay.id(), vec![(Parameters::Direct.id(), seconds)]);
            b.tell(app, delay)
        }))
        .unwrap();
    assert!(value.is_null());
    assert_eq!(adapter.requests.lock().len(), 1);
}

#[test]
fn remote_targets_need_an_adapter() {
    let error = runtime()
        .run(&program(|b| {
            let app = finder(b);
            let first_window = b.index(None, window(), 1);
            b.tell(app, first_window)
        }))
        .unwrap_err();
    assert!(matches!(error.kind(), Some(ErrorKind::RemoteCommandsDisallowed { .. })));
}

/// Serves `lib/greetings`, which defines `greet` and `explode`, counting
/// its loads, and `lib/broken`, which raises while loading.
#[derive(Default)]
struct Greetings {
    loads: AtomicUsize,
}

impl ResourceLoader for Greetings {
    fn load_terminology(&self, _locator: &str) -> Option<TermDictionary> {
        None
    }

    fn load_library(&self, locator: &str) -> Option<Program> {
        match locator {
            "lib/greetings" => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let mut b = ProgramBuilder::new("greetings");
                let hello = b.string("hello");
                let body = b.return_(Some(hello));
                let greet = b.function(TermId::command("greet"), vec![], body);
                b.at(100, 110);
                let boom = b.string("boom");
                let raise = b.raise(boom);
                let explode = b.function(TermId::command("explode"), vec![], raise);
                let root = b.sequence(vec![greet, explode]);
                b.finish(root).ok()
            }
            "lib/broken" => {
                let mut b = ProgramBuilder::new("broken");
                b.at(50, 60);
                let boom = b.string("boom");
                let root = b.raise(boom);
                b.finish(root).ok()
            }
            _ => None,
        }
    }
}

fn greetings(b: &mut ProgramBuilder) -> ExprId {
    let id = TermId::resource("greetings");
    b.define(Term::named(id.clone(), "greetings").with_resource(Resource::Library {
        name: "greetings".to_owned(),
        locator: "lib/greetings".to_owned(),
    }));
    b.use_(id)
}

#[test]
fn libraries_run_once_and_serve_their_functions() {
    let loader = Arc::new(Greetings::default());
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .loader(Arc::clone(&loader) as Arc<dyn ResourceLoader>)
        .build();
    let script = program(|b| {
        let first = greetings(b);
        let second = greetings(b);
        let greet = b.command(TermId::command("greet"), vec![]);
        let tell = b.tell(second, greet);
        b.sequence(vec![first, tell])
    });

    let value = runtime.run(&script).unwrap();
    assert_eq!(value.to_string(), "\"hello\"");
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

    runtime.run(&script).unwrap();
    assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
}

fn located_at(error: &RunError) -> Option<SourceLocation> {
    match error {
        RunError::Error(error) => error.location,
        RunError::Terminated => None,
    }
}

#[test]
fn library_errors_point_at_the_call_site() {
    let loader = Arc::new(Greetings::default());
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .loader(Arc::clone(&loader) as Arc<dyn ResourceLoader>)
        .build();
    let script = program(|b| {
        let library = greetings(b);
        b.at(7, 14);
        let explode = b.command(TermId::command("explode"), vec![]);
        b.at(0, 30);
        b.tell(library, explode)
    });

    let error = runtime.run(&script).unwrap_err();
    assert_eq!(
        error.kind(),
        Some(&ErrorKind::Raised {
            description: "\"boom\"".to_owned(),
        })
    );
    assert_eq!(
        located_at(&error),
        Some(SourceLocation::new(SourceId::MAIN, Span::new(7, 14)))
    );
}

#[test]
fn errors_while_loading_a_library_point_at_its_use() {
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .loader(Arc::new(Greetings::default()) as Arc<dyn ResourceLoader>)
        .build();
    let script = program(|b| {
        let id = TermId::resource("broken");
        b.define(Term::named(id.clone(), "broken").with_resource(Resource::Library {
            name: "broken".to_owned(),
            locator: "lib/broken".to_owned(),
        }));
        b.at(3, 9);
        b.use_(id)
    });

    let error = runtime.run(&script).unwrap_err();
    assert_eq!(
        located_at(&error),
        Some(SourceLocation::new(SourceId::MAIN, Span::new(3, 9)))
    );
}

#[test]
fn missing_libraries_are_errors() {
    let error = runtime().run(&program(greetings)).unwrap_err();
    assert!(matches!(error.kind(), Some(ErrorKind::MissingResource { .. })));
}

#[test]
fn log_output_is_captured() {
    let output = buffer_output();
    let mut runtime = Runtime::builder().output(output.clone()).build();
    runtime
        .run(&program(|b| {
            let list = b.integers(&[1, 2]);
            b.command(Commands::Log.id(), vec![(Parameters::Direct.id(), list)])
        }))
        .unwrap();
    assert_eq!(output.captured(), "{1, 2}\n");
}

#[test]
fn runs_can_be_terminated_from_another_thread() {
    let mut runtime = runtime();
    let handle = runtime.termination_handle();
    let forever = program(|b| {
        let yes = b.constant(Constants::True.id());
        let body = b.null();
        b.repeat_while(yes, body)
    });

    let worker = thread::spawn(move || {
        let result = runtime.run(&forever);
        (runtime, result)
    });

    let deadline = Instant::now() + Duration::from_secs(10);
    while !handle.is_running() {
        assert!(Instant::now() < deadline, "run never started");
        thread::sleep(Duration::from_millis(1));
    }
    handle.request();

    let (mut runtime, result) = worker.join().unwrap();
    assert!(matches!(result, Err(RunError::Terminated)));
    assert!(!handle.is_running());

    let value = runtime.run(&program(|b| b.integer(1))).unwrap();
    assert!(matches!(value, Value::Integer(1)));
}

#[test]
fn termination_is_not_caught_by_try() {
    let mut runtime = runtime();
    let handle = runtime.termination_handle();
    let guarded = program(|b| {
        let yes = b.constant(Constants::True.id());
        let body = b.null();
        let forever = b.repeat_while(yes, body);
        let fallback = b.integer(1);
        b.try_(forever, fallback)
    });

    let worker = thread::spawn(move || runtime.run(&guarded));
    let deadline = Instant::now() + Duration::from_secs(10);
    while !handle.is_running() {
        assert!(Instant::now() < deadline, "run never started");
        thread::sleep(Duration::from_millis(1));
    }
    handle.request();

    assert!(matches!(worker.join().unwrap(), Err(RunError::Terminated)));
}

#[test]
fn delays_stop_early_on_termination() {
    let mut runtime = Runtime::builder()
        .output(silent_output())
        .delay_slice(Duration::from_millis(5))
        .build();
    let handle = runtime.termination_handle();
    let long_delay = program(|b| {
        let seconds = b.integer(60);
        b.command(Commands::Delay.id(), vec![(Parameters::Direct.id(), seconds)])
    });

    let started = Instant::now();
    let worker = thread::spawn(move || runtime.run(&long_delay));
    while !handle.is_running() {
        thread::sleep(Duration::from_millis(1));
    }
    handle.request();

    assert!(matches!(worker.join().unwrap(), Err(RunError::Terminated)));
    assert!(started.elapsed() < Duration::from_secs(30));
}
