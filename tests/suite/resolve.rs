use std::path::Path;

use capsym::resolve::Resolver;
use capsym::resolve::Strategy;
use capsym::resolve::Symbolized;
use capsym::resolve::UNKNOWN_NAME;
use capsym::CaptureView as _;
use capsym::Lookup;

use test_log::test;

use crate::suite::common::capture;
use crate::suite::common::catalog;
use crate::suite::common::LIBBAZ_START;
use crate::suite::common::LIBFOO;
use crate::suite::common::LIBFOO_START;


/// Check that an address at the start of a function resolves with both
/// lookup kinds, while one just past its end only resolves with a floor
/// lookup.
#[test]
fn resolve_exact_and_floor() {
    let catalog = catalog();
    let capture = capture();
    let resolver = Resolver::new();

    let addr = LIBFOO_START + 0x1050;
    for lookup in [Lookup::Exact, Lookup::Floor] {
        let resolved = resolver
            .find_function(capture.process(), &catalog, addr, lookup)
            .unwrap();
        assert_eq!(resolved.function.name(), "Foo::Bar");
        assert_eq!(resolved.module.path(), Path::new(LIBFOO));
    }

    let addr = LIBFOO_START + 0x1090;
    assert!(resolver
        .find_function(capture.process(), &catalog, addr, Lookup::Exact)
        .is_none());
    let resolved = resolver
        .find_function(capture.process(), &catalog, addr, Lookup::Floor)
        .unwrap();
    assert_eq!(resolved.function.name(), "Foo::Bar");
    assert_eq!(resolver.function_name(&catalog, &capture, addr), "Foo::Bar");
    assert_eq!(
        resolver.find_function_start_addr(&catalog, &capture, addr),
        Some(LIBFOO_START + 0x1050)
    );

    // Functions without size information only ever resolve using a
    // floor lookup.
    let addr = LIBFOO_START + 0x1180;
    assert!(resolver
        .find_function(capture.process(), &catalog, addr, Lookup::Exact)
        .is_none());
    assert_eq!(resolver.function_name(&catalog, &capture, addr), "unsized");
}

/// Check that we report the build ID of the module version actually
/// mapped.
#[test]
fn resolve_module_versions() {
    let catalog = catalog();
    let capture = capture();
    let resolver = Resolver::new();

    assert_eq!(
        resolver.find_module_build_id(capture.process(), &catalog, LIBFOO_START),
        Some("abc")
    );
    assert_eq!(
        resolver.find_module_build_id(capture.process(), &catalog, LIBBAZ_START + 0x104),
        Some("2222")
    );
    assert_eq!(
        resolver.function_name(&catalog, &capture, LIBBAZ_START + 0x104),
        "baz_v2"
    );

    // The second mapping of the module carries no build ID and two
    // versions are known. We fall back to the recorded hint.
    let addr = LIBBAZ_START + 0x10104;
    assert_eq!(
        resolver.find_module_build_id(capture.process(), &catalog, addr),
        None
    );
    let sym = resolver
        .symbolize(&catalog, &capture, addr)
        .into_sym()
        .unwrap();
    assert_eq!(sym.name, "baz_hinted");
    assert_eq!(sym.addr, LIBBAZ_START + 0x10100);
    assert_eq!(sym.offset, 4);
    assert_eq!(sym.strategy, Strategy::Hint);
}

/// Check that we use address hints for modules that are no longer
/// mapped.
#[test]
fn resolve_hint_only() {
    let catalog = catalog();
    let capture = capture();
    let resolver = Resolver::new();

    assert_eq!(
        resolver.module_path(&catalog, &capture, 0x5000),
        "/usr/lib/unloaded.so"
    );
    assert_eq!(
        resolver.function_name(&catalog, &capture, 0x5000),
        "unloaded_fn"
    );
    assert_eq!(
        resolver.find_function_start_addr(&catalog, &capture, 0x5000),
        Some(0x4fe0)
    );
    assert!(resolver
        .symbolize_with(Strategy::Live, &catalog, &capture, 0x5000)
        .is_none());
}

/// Check that we report unresolvable addresses as unknown.
#[test]
fn resolve_unknown() {
    let catalog = catalog();
    let capture = capture();
    let resolver = Resolver::new();

    let addr = 0x1234;
    assert_eq!(resolver.module_path(&catalog, &capture, addr), UNKNOWN_NAME);
    assert_eq!(resolver.function_name(&catalog, &capture, addr), UNKNOWN_NAME);
    assert_eq!(
        resolver.find_function_start_addr(&catalog, &capture, addr),
        None
    );
    assert_eq!(
        resolver.symbolize(&catalog, &capture, addr),
        Symbolized::Unknown
    );

    let names = resolver.function_names(&catalog, &capture, &[addr, 0x5000]);
    assert_eq!(names, vec![UNKNOWN_NAME, "unloaded_fn"]);
}

/// Check that we can map a function found by module identity to the
/// ID it got instrumented with.
#[test]
fn resolve_instrumented_function() {
    let catalog = catalog();
    let capture = capture();
    let resolver = Resolver::new();

    let resolved = resolver
        .find_function_by_identity(&catalog, Path::new(LIBFOO), "abc", 0x1050)
        .unwrap();
    assert_eq!(resolved.function.name(), "Foo::Bar");
    assert_eq!(
        resolver.find_instrumented_function_id_slow(&capture, &resolved),
        Some(1)
    );
    assert_eq!(capture.instrumented_functions().get(1).unwrap().file_offset, 0x1050);

    // Identity lookups are exact, so the unsized function can't be
    // found this way.
    assert!(resolver
        .find_function_by_identity(&catalog, Path::new(LIBFOO), "abc", 0x1100)
        .is_none());
}
