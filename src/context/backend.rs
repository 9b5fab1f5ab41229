//! The one piece of the external-collaborator boundary this crate mocks:
//! zero-copy interop between a native graphics handle (GL texture, D3D9
//! surface, D3D11 texture) and a `wgpu::Texture`.
//!
//! The real interop path for each native API needs vendor driver extensions
//! this crate cannot assume are present in a generic build, so it is
//! expressed as a trait
//! (`InteropBackend`) rather than implemented for real. `GraphicsApi` is
//! carried alongside it purely to validate that an imported handle's origin
//! matches what the context was opened for.

use crate::error::{Error, Result};
use std::sync::Arc;

/// Which native graphics API produced the handles a [`super::Context`] will
/// be asked to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsApi {
    OpenGl,
    D3D9,
    D3D9Ex,
    D3D11,
    /// No native graphics context; capture-only (desktop) sessions.
    None,
}

/// A native render-target handle together with the API it came from, as
/// passed across the C API's `register_render_target`.
#[derive(Debug, Clone, Copy)]
pub struct ForeignHandle {
    pub api: GraphicsApi,
    pub raw: usize,
}

/// Imports a foreign texture/surface handle into a `wgpu::Texture` and
/// mediates the acquire/release pair around each use, mirroring the
/// original's per-API interop function tables.
pub trait InteropBackend: Send + Sync {
    /// Imports `handle` as a `(width, height)` texture. Fails
    /// `Error::InvalidTexture` if `handle.api` does not match the backend.
    fn import(&self, handle: ForeignHandle, width: u32, height: u32) -> Result<Arc<wgpu::Texture>>;

    /// Acquires exclusive GPU-side access before `process_buffer` reads it.
    fn acquire(&self, texture: &wgpu::Texture) -> Result<()>;

    /// Releases access acquired by [`Self::acquire`]. Called on every path,
    /// including error paths, exactly once per successful acquire.
    fn release(&self, texture: &wgpu::Texture) -> Result<()>;

    fn api(&self) -> GraphicsApi;
}

/// An [`InteropBackend`] for desktop-capture sessions, which own their
/// render targets directly (via DXGI Output Duplication, see
/// [`crate::session::dopp`]) and never import an application-supplied
/// handle. `import` always fails; the desktop session registers its capture
/// textures through [`super::Context::register_owned_image`] instead.
pub struct NoInterop;

impl InteropBackend for NoInterop {
    fn import(&self, _handle: ForeignHandle, _width: u32, _height: u32) -> Result<Arc<wgpu::Texture>> {
        Err(Error::InvalidTexture)
    }

    fn acquire(&self, _texture: &wgpu::Texture) -> Result<()> {
        Ok(())
    }

    fn release(&self, _texture: &wgpu::Texture) -> Result<()> {
        Ok(())
    }

    fn api(&self) -> GraphicsApi {
        GraphicsApi::None
    }
}

/// Factory resolving a native [`GraphicsApi`] to its interop backend,
/// installed once by a host that links the vendor GL/D3D interop
/// extensions -- the same "set once, publish immutable" pattern as
/// [`crate::encoder::amf::install_vendor_factory`] and
/// [`crate::session::dopp::install_adapter_factory`].
pub type InteropFactory = fn(GraphicsApi) -> Result<Box<dyn InteropBackend>>;

static INTEROP_FACTORY: once_cell::sync::OnceCell<InteropFactory> = once_cell::sync::OnceCell::new();

pub fn install_interop_factory(factory: InteropFactory) -> Result<()> {
    INTEROP_FACTORY.set(factory).map_err(|_| Error::InvalidConfig)
}

/// Resolves the interop backend for `api`. `GraphicsApi::None` (desktop
/// sessions, which own their capture textures directly) always gets
/// [`NoInterop`] without consulting the factory.
pub fn resolve_interop(api: GraphicsApi) -> Result<Box<dyn InteropBackend>> {
    if api == GraphicsApi::None {
        return Ok(Box::new(NoInterop));
    }
    match INTEROP_FACTORY.get() {
        Some(factory) => factory(api),
        None => {
            log::warn!("no native interop backend installed for {api:?}; render-target registration will fail closed");
            Ok(Box::new(NoInterop))
        }
    }
}
