//! Dynamic loading of the vendor encoder runtime.
//!
//! Grounded on the `nvenc-windows` crate's `LoadLibraryExA`/`GetProcAddress`
//! pattern (its `init.rs` resolves `NvEncodeAPICreateInstance` the same
//! way): load the platform shared library lazily, resolve the factory
//! entry point, and fail closed if either step fails rather than panicking
//! on a missing vendor runtime.

use crate::error::{Error, Result};

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use std::ffi::CString;
    use windows::core::PCSTR;
    use windows::Win32::Foundation::HMODULE;
    use windows::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryExA, LOAD_LIBRARY_SEARCH_SYSTEM32};

    /// Handle to the loaded AMF runtime library, freed on drop.
    pub struct AmfLibrary {
        module: HMODULE,
    }

    unsafe impl Send for AmfLibrary {}
    unsafe impl Sync for AmfLibrary {}

    const LIBRARY_NAMES: [&str; 2] = ["amfrt64.dll", "amfrt32.dll"];
    const FACTORY_ENTRY_POINT: &str = "AMFInit";

    impl AmfLibrary {
        /// Loads the first of `amfrt64.dll`/`amfrt32.dll` that resolves,
        /// and verifies the factory entry point is present. Returns
        /// `Error::AmfFail` rather than panicking if the runtime is absent.
        pub fn load() -> Result<Self> {
            for name in LIBRARY_NAMES {
                let c_name = CString::new(name).expect("library name has no interior nul");
                let module = unsafe { LoadLibraryExA(PCSTR(c_name.as_ptr() as *const u8), None, LOAD_LIBRARY_SEARCH_SYSTEM32) };
                if let Ok(module) = module {
                    let lib = Self { module };
                    if lib.resolve(FACTORY_ENTRY_POINT).is_some() {
                        return Ok(lib);
                    }
                    log::warn!("{name} loaded but is missing the {FACTORY_ENTRY_POINT} export");
                }
            }
            Err(Error::AmfFail("vendor encoder runtime not found".into()))
        }

        /// Resolves a named export, or `None` if it is absent. `unsafe`
        /// because the caller must transmute the result to the correct
        /// function-pointer type before calling it.
        pub fn resolve(&self, symbol: &str) -> Option<unsafe extern "system" fn() -> isize> {
            let c_symbol = CString::new(symbol).ok()?;
            unsafe { GetProcAddress(self.module, PCSTR(c_symbol.as_ptr() as *const u8)) }
        }
    }

    impl Drop for AmfLibrary {
        fn drop(&mut self) {
            unsafe {
                let _ = FreeLibrary(self.module);
            }
        }
    }
}

#[cfg(windows)]
pub use windows_impl::AmfLibrary;

/// Non-Windows builds never find a vendor runtime; `load` always fails
/// closed so the rest of the encoder module still type-checks off-Windows.
#[cfg(not(windows))]
pub struct AmfLibrary;

#[cfg(not(windows))]
impl AmfLibrary {
    pub fn load() -> Result<Self> {
        Err(Error::AmfFail("vendor encoder runtime is only available on Windows".into()))
    }
}
