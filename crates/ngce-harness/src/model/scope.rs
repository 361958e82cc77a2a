#![forbid(unsafe_code)]

//! In-memory reactive scope with a dirty-checking digest loop.
//!
//! [`ModelScope`] is the harness stand-in for a host framework's
//! scope/context object: a string-keyed value store plus registered watchers
//! re-evaluated by [`digest`](ModelScope::digest) until no value changes.
//! Comparison is structural (`serde_json::Value` equality), so deep watches
//! are honest — nested mutations count as changes.
//!
//! # Invariants
//!
//! 1. A watcher's listener fires on the first digest after registration
//!    (with old == new), and afterwards only when the evaluated value
//!    changed structurally.
//! 2. An evaluator `Err` is treated as "unchanged": no listener call, the
//!    remembered value stays.
//! 3. Watcher removal takes effect immediately, including mid-digest.
//! 4. `digest` and `apply` refuse re-entrant calls by panicking — the
//!    harness turns a controller that starts a cycle inside a cycle into a
//!    loud test failure.
//! 5. A digest that stays dirty for 10 iterations panics (runaway watcher).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use ngce_core::host::{HostError, WatchGuard};
use serde_json::Value;

/// Evaluator signature watchers register with.
pub type ScopeEvaluator = Rc<dyn Fn(&ModelScope) -> Result<Value, HostError>>;
/// Change callback: (new, old).
pub type ScopeListener = Box<dyn FnMut(&Value, &Value)>;

const DIGEST_TTL: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Idle,
    Digest,
    Apply,
}

struct Watcher {
    id: u64,
    evaluator: ScopeEvaluator,
    listener: RefCell<ScopeListener>,
    last: RefCell<Option<Value>>,
    deep: bool,
    active: Cell<bool>,
}

struct ScopeState {
    values: RefCell<serde_json::Map<String, Value>>,
    watchers: RefCell<Vec<Rc<Watcher>>>,
    next_watcher_id: Cell<u64>,
    phase: Cell<Phase>,
    digest_count: Cell<u64>,
    fail_next_unwatch: Cell<bool>,
}

/// Shared handle to one model scope. Clones share state.
#[derive(Clone)]
pub struct ModelScope {
    state: Rc<ScopeState>,
}

impl ModelScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(ScopeState {
                values: RefCell::new(serde_json::Map::new()),
                watchers: RefCell::new(Vec::new()),
                next_watcher_id: Cell::new(0),
                phase: Cell::new(Phase::Idle),
                digest_count: Cell::new(0),
                fail_next_unwatch: Cell::new(false),
            }),
        }
    }

    // -- value store --------------------------------------------------------

    /// Set a top-level key. Allowed at any time, including mid-digest.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.state.values.borrow_mut().insert(key.into(), value);
    }

    /// Read a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state.values.borrow().get(key).cloned()
    }

    /// Read a dotted path (`user.name`). `None` when any segment is absent.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let values = self.state.values.borrow();
        let mut current = values.get(root)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    // -- watchers -----------------------------------------------------------

    /// Register a watcher. The guard removes it; removal can be made to fail
    /// once via [`fail_next_unwatch`](Self::fail_next_unwatch).
    pub fn watch(
        &self,
        evaluator: ScopeEvaluator,
        listener: ScopeListener,
        deep: bool,
    ) -> WatchGuard {
        let id = self.state.next_watcher_id.get();
        self.state.next_watcher_id.set(id + 1);
        self.state.watchers.borrow_mut().push(Rc::new(Watcher {
            id,
            evaluator,
            listener: RefCell::new(listener),
            last: RefCell::new(None),
            deep,
            active: Cell::new(true),
        }));

        let state = Rc::clone(&self.state);
        WatchGuard::new(move || {
            if state.fail_next_unwatch.replace(false) {
                return Err(HostError::new("watch removal refused"));
            }
            let mut watchers = state.watchers.borrow_mut();
            if let Some(pos) = watchers.iter().position(|w| w.id == id) {
                watchers[pos].active.set(false);
                watchers.remove(pos);
            }
            Ok(())
        })
    }

    /// Number of registered watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.state.watchers.borrow().len()
    }

    /// True when every registered watcher asked for deep comparison.
    #[must_use]
    pub fn all_watches_deep(&self) -> bool {
        self.state.watchers.borrow().iter().all(|w| w.deep)
    }

    /// Arm the fault injector: the next watch-guard cancel fails and leaves
    /// its watcher registered.
    pub fn fail_next_unwatch(&self) {
        self.state.fail_next_unwatch.set(true);
    }

    // -- propagation --------------------------------------------------------

    /// Run watchers to a fixed point.
    ///
    /// # Panics
    ///
    /// Panics when called while a cycle is already in progress, or when the
    /// loop is still dirty after 10 iterations.
    pub fn digest(&self) {
        assert!(
            self.state.phase.get() == Phase::Idle,
            "digest requested while a propagation cycle is in progress"
        );
        self.state.phase.set(Phase::Digest);
        self.run_watchers();
        self.state.phase.set(Phase::Idle);
        self.state.digest_count.set(self.state.digest_count.get() + 1);
    }

    fn run_watchers(&self) {
        let mut remaining = DIGEST_TTL;
        loop {
            let mut dirty = false;
            let watchers: Vec<Rc<Watcher>> = self.state.watchers.borrow().clone();
            for watcher in watchers {
                if !watcher.active.get() {
                    continue;
                }
                let Ok(new) = (watcher.evaluator)(self) else {
                    // Unchanged by contract; the evaluator owner reported.
                    continue;
                };
                let old = {
                    let last = watcher.last.borrow();
                    match &*last {
                        None => Some(new.clone()),
                        Some(prev) if *prev != new => Some(prev.clone()),
                        Some(_) => None,
                    }
                };
                if let Some(old) = old {
                    dirty = true;
                    *watcher.last.borrow_mut() = Some(new.clone());
                    (watcher.listener.borrow_mut())(&new, &old);
                }
            }
            if !dirty {
                break;
            }
            remaining -= 1;
            assert!(
                remaining > 0,
                "{DIGEST_TTL} digest iterations reached without settling"
            );
        }
    }

    /// Run `work`, then digest, so watchers observe its effects.
    ///
    /// # Panics
    ///
    /// Panics when called while a cycle is already in progress.
    pub fn apply(&self, work: Box<dyn FnOnce()>) {
        assert!(
            self.state.phase.get() == Phase::Idle,
            "apply requested while a propagation cycle is in progress"
        );
        self.state.phase.set(Phase::Apply);
        work();
        self.state.phase.set(Phase::Idle);
        self.digest();
    }

    /// Whether a digest or apply is currently running.
    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.state.phase.get() != Phase::Idle
    }

    /// Completed digest cycles (apply counts as one).
    #[must_use]
    pub fn digest_count(&self) -> u64 {
        self.state.digest_count.get()
    }
}

impl Default for ModelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelScope")
            .field("values", &self.state.values.borrow().len())
            .field("watchers", &self.watcher_count())
            .field("digests", &self.digest_count())
            .finish()
    }
}
