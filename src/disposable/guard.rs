use super::Disposable;

/// An RAII implementation of a "scoped subscription". When this structure is
/// dropped (falls out of scope), the wrapped disposable is disposed.
///
/// Implements the [must_use](
/// https://doc.rust-lang.org/reference/attributes/diagnostics.html
/// #the-must_use-attribute)
/// attribute
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct DisposeGuard<D: Disposable>(D);

impl<D: Disposable> DisposeGuard<D> {
  /// Wraps an existing disposable with a guard to enable RAII behavior for
  /// it.
  pub fn new(disposable: D) -> DisposeGuard<D> { DisposeGuard(disposable) }

  /// Gives the disposable back without disposing it.
  pub fn into_inner(self) -> D {
    let this = std::mem::ManuallyDrop::new(self);
    // SAFETY: `this` is never dropped, so the field is moved out exactly once.
    unsafe { std::ptr::read(&this.0) }
  }
}

impl<D: Disposable> Drop for DisposeGuard<D> {
  #[inline]
  fn drop(&mut self) { self.0.dispose() }
}
