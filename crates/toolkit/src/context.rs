//! Explicit toolkit context.
//!
//! The native toolkit is initialized once and confined to a single thread.
//! Instead of ambient global state, callers hold a [`Toolkit`] value and pass
//! it to every construction call. The value is `!Send`, so confinement to the
//! toolkit thread is enforced by the compiler.
//!
//! Each toolkit owns its own `glib::MainContext`. Work queued through the
//! toolkit is attached to that context as ordinary GLib sources and is torn
//! down with the toolkit.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use glib::thread_guard::ThreadGuard;
use glib::{ControlFlow, MainContext, MainLoop, Priority, Source};

use crate::error::ToolkitError;
use crate::object::ObjectId;
use crate::remote::RemoteSender;

struct ToolkitInner {
    alive: Cell<bool>,
    main_context: MainContext,
    remote_alive: Arc<AtomicBool>,
    next_object_id: Cell<u64>,
    sources: RefCell<Vec<Source>>,
    extensions: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
}

thread_local! {
    static CURRENT: RefCell<Weak<ToolkitInner>> = RefCell::new(Weak::new());
}

/// Handle to the initialized toolkit of the calling thread.
#[derive(Clone)]
pub struct Toolkit {
    inner: Rc<ToolkitInner>,
}

impl Toolkit {
    /// Initializes the toolkit on the calling thread.
    ///
    /// Calling this again while a live toolkit exists returns a handle to the
    /// same context.
    pub fn init() -> Self {
        CURRENT.with(|current| {
            let existing = current.borrow().upgrade();
            if let Some(inner) = existing.filter(|inner| inner.alive.get()) {
                tracing::debug!("toolkit already initialized, reusing context");
                return Toolkit { inner };
            }

            let inner = Rc::new(ToolkitInner {
                alive: Cell::new(true),
                main_context: MainContext::new(),
                remote_alive: Arc::new(AtomicBool::new(true)),
                next_object_id: Cell::new(1),
                sources: RefCell::new(Vec::new()),
                extensions: RefCell::new(HashMap::new()),
            });
            *current.borrow_mut() = Rc::downgrade(&inner);
            tracing::debug!("toolkit initialized");
            Toolkit { inner }
        })
    }

    /// Returns the live toolkit of the calling thread.
    pub fn current() -> Result<Self, ToolkitError> {
        CURRENT.with(|current| {
            current
                .borrow()
                .upgrade()
                .filter(|inner| inner.alive.get())
                .map(|inner| Toolkit { inner })
                .ok_or(ToolkitError::NotInitialized)
        })
    }

    /// Whether this handle still refers to a live toolkit.
    pub fn is_initialized(&self) -> bool {
        self.inner.alive.get()
    }

    /// Precondition check for native construction calls.
    pub fn ensure_initialized(&self) -> Result<(), ToolkitError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ToolkitError::NotInitialized)
        }
    }

    /// The GLib main context owned by this toolkit.
    pub fn main_context(&self) -> &MainContext {
        &self.inner.main_context
    }

    /// A main loop running this toolkit's context.
    pub fn main_loop(&self) -> MainLoop {
        MainLoop::new(Some(&self.inner.main_context), false)
    }

    /// Allocates a fresh identity for a native object.
    pub fn allocate_object_id(&self) -> ObjectId {
        let raw = self.inner.next_object_id.get();
        self.inner.next_object_id.set(raw + 1);
        ObjectId::new(raw)
    }

    /// Queues one-shot work at default priority.
    ///
    /// Everything queued before an iteration starts runs in that iteration,
    /// in queue order.
    pub fn invoke<F>(&self, f: F) -> Result<Source, ToolkitError>
    where
        F: FnOnce() + 'static,
    {
        self.attach(once_source(Priority::DEFAULT, f))
    }

    /// Queues one-shot work that only runs when nothing of default priority is ready.
    pub fn idle_add_once<F>(&self, f: F) -> Result<Source, ToolkitError>
    where
        F: FnOnce() + 'static,
    {
        self.attach(once_source(Priority::DEFAULT_IDLE, f))
    }

    /// Adds a repeating timer that fires until `f` returns [`ControlFlow::Break`].
    pub fn timeout_add<F>(&self, interval: Duration, f: F) -> Result<Source, ToolkitError>
    where
        F: FnMut() -> ControlFlow + 'static,
    {
        let mut f = ThreadGuard::new(f);
        let source = glib::timeout_source_new(interval, None, Priority::DEFAULT, move || {
            (f.get_mut())()
        });
        self.attach(source)
    }

    /// Returns a `Send` handle that queues work onto this toolkit's context
    /// from any thread.
    pub fn remote_sender(&self) -> RemoteSender {
        RemoteSender::new(
            self.inner.main_context.clone(),
            Arc::clone(&self.inner.remote_alive),
        )
    }

    /// Returns the toolkit-scoped instance of `T`, creating it on first use.
    ///
    /// Libraries layered on the toolkit keep their per-toolkit state here so
    /// that it lives and dies with the toolkit lifecycle.
    pub fn extension<T>(&self) -> Rc<T>
    where
        T: Default + 'static,
    {
        let slot = {
            let mut extensions = self.inner.extensions.borrow_mut();
            Rc::clone(
                extensions
                    .entry(TypeId::of::<T>())
                    .or_insert_with(|| Rc::new(T::default()) as Rc<dyn Any>),
            )
        };
        match slot.downcast::<T>() {
            Ok(ext) => ext,
            Err(_) => unreachable!("extension slots are keyed by their own TypeId"),
        }
    }

    /// Ends the toolkit lifecycle.
    ///
    /// Queued work is destroyed without running and toolkit-scoped
    /// extensions are dropped. Every remaining clone reports
    /// [`is_initialized`](Self::is_initialized) as `false` and construction
    /// calls through it fail.
    pub fn teardown(self) {
        self.inner.alive.set(false);
        self.inner.remote_alive.store(false, Ordering::Release);

        let sources = std::mem::take(&mut *self.inner.sources.borrow_mut());
        let mut dropped = 0;
        for source in sources {
            if !source.is_destroyed() {
                source.destroy();
                dropped += 1;
            }
        }
        let extensions = std::mem::take(&mut *self.inner.extensions.borrow_mut());
        drop(extensions);

        CURRENT.with(|current| {
            let is_current = current
                .borrow()
                .upgrade()
                .is_some_and(|inner| Rc::ptr_eq(&inner, &self.inner));
            if is_current {
                *current.borrow_mut() = Weak::new();
            }
        });
        tracing::debug!(dropped, "toolkit torn down");
    }

    /// Whether two handles refer to the same toolkit.
    pub fn ptr_eq(&self, other: &Toolkit) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn attach(&self, source: Source) -> Result<Source, ToolkitError> {
        if !self.is_initialized() {
            tracing::warn!("work queued on a torn down toolkit was dropped");
            return Err(ToolkitError::ContextClosed);
        }
        source.attach(Some(&self.inner.main_context));
        let mut sources = self.inner.sources.borrow_mut();
        sources.retain(|s| !s.is_destroyed());
        sources.push(source.clone());
        Ok(source)
    }
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit")
            .field("alive", &self.inner.alive.get())
            .field("main_context", &self.inner.main_context)
            .finish_non_exhaustive()
    }
}

fn once_source<F>(priority: Priority, f: F) -> Source
where
    F: FnOnce() + 'static,
{
    let mut f = ThreadGuard::new(Some(f));
    glib::idle_source_new(None, priority, move || {
        if let Some(f) = f.get_mut().take() {
            f();
        }
        ControlFlow::Break
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(tk: &Toolkit) -> usize {
        let mut iterations = 0;
        while tk.main_context().pending() {
            tk.main_context().iteration(true);
            iterations += 1;
        }
        iterations
    }

    #[test]
    fn current_fails_before_init() {
        assert_eq!(Toolkit::current().unwrap_err(), ToolkitError::NotInitialized);
    }

    #[test]
    fn init_is_reentrant() {
        let a = Toolkit::init();
        let b = Toolkit::init();
        assert!(a.ptr_eq(&b));
        assert!(Toolkit::current().unwrap().ptr_eq(&a));
    }

    #[test]
    fn teardown_invalidates_clones() {
        let tk = Toolkit::init();
        let stale = tk.clone();
        tk.teardown();

        assert!(!stale.is_initialized());
        assert_eq!(stale.ensure_initialized(), Err(ToolkitError::NotInitialized));
        assert!(Toolkit::current().is_err());
        assert_eq!(stale.invoke(|| {}).unwrap_err(), ToolkitError::ContextClosed);
    }

    #[test]
    fn init_after_teardown_creates_new_context() {
        let first = Toolkit::init();
        let stale = first.clone();
        first.teardown();

        let second = Toolkit::init();
        assert!(second.is_initialized());
        assert!(!second.ptr_eq(&stale));
    }

    #[test]
    fn object_ids_are_unique() {
        let tk = Toolkit::init();
        let a = tk.allocate_object_id();
        let b = tk.allocate_object_id();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[derive(Default)]
    struct Counter(Cell<u32>);

    #[test]
    fn extension_is_shared_per_toolkit() {
        let tk = Toolkit::init();
        tk.extension::<Counter>().0.set(5);
        assert_eq!(tk.extension::<Counter>().0.get(), 5);
    }

    #[test]
    fn teardown_drops_extensions() {
        let tk = Toolkit::init();
        let ext = tk.extension::<Counter>();
        assert_eq!(Rc::strong_count(&ext), 2);
        tk.teardown();
        assert_eq!(Rc::strong_count(&ext), 1);
    }

    #[test]
    fn invoked_work_waits_for_an_iteration() {
        let tk = Toolkit::init();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            tk.invoke(move || order.borrow_mut().push(n)).unwrap();
        }

        assert!(order.borrow().is_empty());
        assert!(tk.main_context().pending());
        drain(&tk);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert!(!tk.main_context().pending());
    }

    #[test]
    fn idle_work_runs_after_default_work() {
        let tk = Toolkit::init();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&order);
        tk.idle_add_once(move || o.borrow_mut().push("idle")).unwrap();
        let o = Rc::clone(&order);
        tk.invoke(move || o.borrow_mut().push("default")).unwrap();

        drain(&tk);
        assert_eq!(*order.borrow(), vec!["default", "idle"]);
    }

    #[test]
    fn destroyed_source_never_runs() {
        let tk = Toolkit::init();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        let source = tk.idle_add_once(move || r.set(true)).unwrap();
        source.destroy();

        drain(&tk);
        assert!(!ran.get());
    }

    #[test]
    fn timeout_repeats_until_break() {
        let tk = Toolkit::init();
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        tk.timeout_add(Duration::from_millis(2), move || {
            f.set(f.get() + 1);
            if f.get() == 3 {
                ControlFlow::Break
            } else {
                ControlFlow::Continue
            }
        })
        .unwrap();

        while fired.get() < 3 {
            tk.main_context().iteration(true);
        }
        assert_eq!(fired.get(), 3);
        drain(&tk);
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn teardown_destroys_queued_work() {
        let tk = Toolkit::init();
        let context = tk.main_context().clone();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        tk.invoke(move || r.set(true)).unwrap();

        tk.teardown();
        assert!(!context.pending());
        assert!(!ran.get());
    }

    #[test]
    fn main_loop_runs_until_quit() {
        let tk = Toolkit::init();
        let main_loop = tk.main_loop();
        let quit = main_loop.clone();
        tk.invoke(move || quit.quit()).unwrap();

        main_loop.run();
        assert!(!main_loop.is_running());
    }
}
