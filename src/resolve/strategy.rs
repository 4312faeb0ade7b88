use std::borrow::Cow;

use crate::capture::CaptureView;
use crate::catalog::ModuleCatalog;
use crate::hints::AddressHint;
use crate::module::Lookup;
use crate::Addr;

use super::maybe_demangle;
use super::Resolver;
use super::Sym;
use super::UNKNOWN_NAME;


fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}


/// A source of information for resolving an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Resolution based on the process' memory mappings and the module
    /// catalog's function tables.
    Live,
    /// Resolution based on hints recorded during the capture.
    Hint,
}

impl Strategy {
    /// All strategies, in the order in which they are consulted.
    pub const ALL: [Strategy; 2] = [Strategy::Live, Strategy::Hint];

    fn hint<'a>(capture: &'a dyn CaptureView, addr: Addr) -> Option<&'a AddressHint> {
        capture.address_hints().address_hint(addr)
    }

    pub(crate) fn module_path<'a>(
        self,
        resolver: &Resolver,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Option<Cow<'a, str>> {
        match self {
            Self::Live => {
                let module = resolver.find_module(capture.process(), catalog, addr)?;
                let path = module.path().to_string_lossy();
                (!path.is_empty()).then_some(path)
            }
            Self::Hint => {
                let hint = Self::hint(capture, addr)?;
                non_empty(&hint.module_path).map(Cow::Borrowed)
            }
        }
    }

    pub(crate) fn function_name<'a>(
        self,
        resolver: &Resolver,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Option<Cow<'a, str>> {
        match self {
            Self::Live => {
                let resolved =
                    resolver.find_function(capture.process(), catalog, addr, Lookup::Floor)?;
                let name = non_empty(resolved.function.name())?;
                Some(maybe_demangle(name, resolver.demangle))
            }
            Self::Hint => {
                let hint = Self::hint(capture, addr)?;
                non_empty(&hint.function_name).map(Cow::Borrowed)
            }
        }
    }

    pub(crate) fn function_start(
        self,
        resolver: &Resolver,
        catalog: &dyn ModuleCatalog,
        capture: &dyn CaptureView,
        addr: Addr,
    ) -> Option<Addr> {
        match self {
            Self::Live => resolver
                .find_function(capture.process(), catalog, addr, Lookup::Floor)?
                .abs_addr(),
            Self::Hint => {
                let hint = Self::hint(capture, addr)?;
                addr.checked_sub(hint.offset_in_function)
            }
        }
    }

    pub(crate) fn symbolize<'a>(
        self,
        resolver: &Resolver,
        catalog: &'a dyn ModuleCatalog,
        capture: &'a dyn CaptureView,
        addr: Addr,
    ) -> Option<Sym<'a>> {
        let sym = match self {
            Self::Live => {
                let resolved =
                    resolver.find_function(capture.process(), catalog, addr, Lookup::Floor)?;
                let name = non_empty(resolved.function.name())?;
                let start = resolved.abs_addr()?;
                let path = resolved.module.path().to_string_lossy();
                Sym {
                    name: maybe_demangle(name, resolver.demangle),
                    module_path: if path.is_empty() {
                        Cow::Borrowed(UNKNOWN_NAME)
                    } else {
                        path
                    },
                    addr: start,
                    offset: addr.checked_sub(start)?,
                    strategy: self,
                }
            }
            Self::Hint => {
                let hint = Self::hint(capture, addr)?;
                let name = non_empty(&hint.function_name)?;
                Sym {
                    name: Cow::Borrowed(name),
                    module_path: Cow::Borrowed(
                        non_empty(&hint.module_path).unwrap_or(UNKNOWN_NAME),
                    ),
                    addr: addr.checked_sub(hint.offset_in_function)?,
                    offset: hint.offset_in_function,
                    strategy: self,
                }
            }
        };
        Some(sym)
    }
}
