use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use capsym::resolve::Resolver;
use capsym::Addr;
use capsym::CaptureData;
use capsym::ErrorKind;
use capsym::FunctionRecord;
use capsym::ModuleManager;
use capsym::ModuleRecord;
use capsym::Pid;
use capsym::ProcessAddressSpace as _;
use capsym::ProcessMaps;

use tempfile::NamedTempFile;

use test_log::test;


/// Check that we can resolve addresses using memory mappings read from
/// a maps file recorded earlier.
#[test]
fn resolve_with_recorded_maps() {
    let mut tmpfile = NamedTempFile::new().unwrap();
    let () = writeln!(
        tmpfile,
        "55f4a95c9000-55f4a95cb000 r--p 00000000 00:20 41445      /usr/bin/app
55f4a95cb000-55f4a95cf000 r-xp 00002000 00:20 41445      /usr/bin/app
55f4aa379000-55f4aa39a000 rw-p 00000000 00:00 0          [heap]
7f2321e37000-7f2321f6f000 r-xp 00037000 00:20 1808269    /usr/lib64/libgone.so (deleted)"
    )
    .unwrap();

    let file = File::open(tmpfile.path()).unwrap();
    let maps = ProcessMaps::from_reader(file).unwrap();
    assert_eq!(maps.mappings().len(), 2);
    assert_eq!(
        maps.find_mapping(0x7f2321e37000).unwrap().path(),
        Path::new("/usr/lib64/libgone.so")
    );

    let app = ModuleRecord::builder("/usr/bin/app", "feed")
        .executable_segment_offset(0x2000)
        .function(FunctionRecord::new(0x2400, 0x100, "main"))
        .build()
        .unwrap();
    let mut catalog = ModuleManager::new();
    let _none = catalog.add_module(app);

    let capture = CaptureData::new(maps);
    let resolver = Resolver::new();
    let addr = 0x55f4a95cb480;
    assert_eq!(resolver.function_name(&catalog, &capture, addr), "main");
    assert_eq!(resolver.module_path(&catalog, &capture, addr), "/usr/bin/app");
    assert_eq!(
        resolver.find_function_start_addr(&catalog, &capture, addr),
        Some(0x55f4a95cb400)
    );
}

/// Make sure that we fail reading malformed maps files.
#[test]
fn malformed_maps() {
    let mut tmpfile = NamedTempFile::new().unwrap();
    let () = writeln!(tmpfile, "this is not a maps line").unwrap();

    let file = File::open(tmpfile.path()).unwrap();
    let err = ProcessMaps::from_reader(file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

/// Check that we can read the memory mappings of the calling process.
#[cfg(target_os = "linux")]
#[test]
fn self_process_maps() {
    let maps = ProcessMaps::from_pid(Pid::Slf).unwrap();
    let addr = self_process_maps as Addr;
    let mapping = maps.find_mapping(addr).unwrap();
    assert!(mapping.range.contains(&addr));
}

/// Make sure that we report an error for a process that does not exist.
#[cfg(target_os = "linux")]
#[test]
fn missing_process_maps() {
    // PIDs are limited to 2^22 on Linux.
    let err = ProcessMaps::from_pid(Pid::from(u32::MAX)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
