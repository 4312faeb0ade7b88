use capsym::Addr;
use capsym::AddressHint;
use capsym::AddressHints;
use capsym::CaptureData;
use capsym::FunctionRecord;
use capsym::InstrumentedFunction;
use capsym::InstrumentedFunctions;
use capsym::MemoryMapping;
use capsym::ModuleManager;
use capsym::ModuleRecord;
use capsym::ProcessMaps;


pub const LIBFOO: &str = "/usr/lib/libfoo.so";
pub const LIBFOO_START: Addr = 0x7f0000000000;
pub const LIBBAZ: &str = "/usr/lib/libbaz.so";
pub const LIBBAZ_START: Addr = 0x7f3000000000;


/// Create a module catalog knowing about `libfoo.so`, with a single
/// version, and about two versions of `libbaz.so`.
pub fn catalog() -> ModuleManager {
    let libfoo = ModuleRecord::builder(LIBFOO, "abc")
        .load_bias(0x1000)
        .executable_segment_offset(0)
        .functions([
            FunctionRecord::new(0x2050, 0x40, "Foo::Bar"),
            FunctionRecord::new(0x2100, 0, "unsized"),
        ])
        .build()
        .unwrap();
    let libbaz_v1 = ModuleRecord::builder(LIBBAZ, "1111")
        .function(FunctionRecord::new(0x100, 0x10, "baz_v1"))
        .build()
        .unwrap();
    let libbaz_v2 = ModuleRecord::builder(LIBBAZ, "2222")
        .function(FunctionRecord::new(0x100, 0x10, "baz_v2"))
        .build()
        .unwrap();

    let mut catalog = ModuleManager::new();
    let _none = catalog.add_module(libfoo);
    let _none = catalog.add_module(libbaz_v1);
    let _none = catalog.add_module(libbaz_v2);
    catalog
}

/// Create the capture of a process that has `libfoo.so` mapped as well
/// as `libbaz.so` twice, once with and once without build ID.
pub fn capture() -> CaptureData {
    let maps = ProcessMaps::new([
        MemoryMapping::new(LIBFOO_START..LIBFOO_START + 0x10000, LIBFOO),
        MemoryMapping::new(LIBBAZ_START..LIBBAZ_START + 0x1000, LIBBAZ).with_build_id("2222"),
        MemoryMapping::new(LIBBAZ_START + 0x10000..LIBBAZ_START + 0x11000, LIBBAZ),
    ])
    .unwrap();

    let hints = [
        (
            0x5000,
            AddressHint {
                module_path: "/usr/lib/unloaded.so".to_string(),
                function_name: "unloaded_fn".to_string(),
                offset_in_function: 0x20,
            },
        ),
        (
            LIBBAZ_START + 0x10104,
            AddressHint {
                module_path: LIBBAZ.to_string(),
                function_name: "baz_hinted".to_string(),
                offset_in_function: 4,
            },
        ),
    ]
    .into_iter()
    .collect::<AddressHints>();

    let functions = [InstrumentedFunction {
        id: 1,
        file_path: LIBFOO.into(),
        file_offset: 0x1050,
    }]
    .into_iter()
    .collect::<InstrumentedFunctions>();

    CaptureData::new(maps)
        .with_address_hints(hints)
        .with_instrumented_functions(functions)
}
