use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use futures::executor::LocalPool;
use web_time::{Duration, Instant};

use crate::View;
use crate::scope::Scope;

thread_local! {
    pub(crate) static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
    static FRAME_REQUESTED: Cell<bool> = const { Cell::new(false) };
    static ACTIVE_RUNTIME: Cell<u64> = const { Cell::new(0) };
    static NEXT_RUNTIME_ID: Cell<u64> = const { Cell::new(1) };
}

struct SlotEntry {
    value: Box<dyn Any>,
    frame: u64,
}

struct GroupEntry {
    scope: Scope,
    frame: u64,
}

struct GroupFrame {
    path: String,
    cursor: usize,
    keys: HashSet<String>,
}

/// Slot table for the composition in progress.
///
/// Slots and groups are addressed by path: positional children of a group get
/// `/<n>`, keyed children get `/k:<key>`, slots get `#<n>` (positional) or
/// `@<key>`. Anything not touched during a frame is torn down when it ends.
#[derive(Default)]
pub struct Composer {
    frame: u64,
    composing: bool,
    log_caught_panics: bool,
    stack: Vec<GroupFrame>,
    slots: HashMap<String, SlotEntry>,
    groups: HashMap<String, GroupEntry>,
    effects: Vec<Box<dyn FnOnce()>>,
    /// Groups whose state was written since they were last composed.
    invalidated: HashSet<String>,
    /// Invalidations visible to the frame being composed.
    frame_invalidated: HashSet<String>,
}

struct FrameEnd {
    dead: Vec<(String, Scope)>,
    dropped: Vec<Box<dyn Any>>,
    effects: Vec<Box<dyn FnOnce()>>,
}

fn within(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => prefix.is_empty() || rest.starts_with(['/', '#', '@']),
        None => false,
    }
}

fn depth(path: &str) -> usize {
    path.matches('/').count()
}

/// Deepest groups first, so children are cleaned up before their parents.
fn sort_for_disposal(dead: &mut [(String, Scope)]) {
    dead.sort_by(|(a, _), (b, _)| depth(b).cmp(&depth(a)).then_with(|| a.cmp(b)));
}

impl Composer {
    fn begin(&mut self, frame: u64, log_caught_panics: bool) {
        self.frame = frame;
        self.composing = true;
        self.log_caught_panics = log_caught_panics;
        self.stack.clear();
        self.effects.clear();
        self.frame_invalidated = std::mem::take(&mut self.invalidated);
        self.enter(String::new());
    }

    fn finish(&mut self) -> FrameEnd {
        self.composing = false;
        self.stack.clear();
        let frame = self.frame;

        let mut dropped = Vec::new();
        let slots = std::mem::take(&mut self.slots);
        for (key, slot) in slots {
            if slot.frame == frame {
                self.slots.insert(key, slot);
            } else {
                log::trace!("dropping slot {key}");
                dropped.push(slot.value);
            }
        }

        let stale: Vec<String> = self
            .groups
            .iter()
            .filter(|(_, g)| g.frame != frame)
            .map(|(k, _)| k.clone())
            .collect();
        let mut dead: Vec<(String, Scope)> = stale
            .into_iter()
            .filter_map(|k| self.groups.remove(&k).map(|g| (k, g.scope)))
            .collect();
        sort_for_disposal(&mut dead);

        FrameEnd {
            dead,
            dropped,
            effects: std::mem::take(&mut self.effects),
        }
    }

    fn enter(&mut self, path: String) {
        let frame = self.frame;
        self.groups
            .entry(path.clone())
            .and_modify(|g| g.frame = frame)
            .or_insert_with(|| GroupEntry {
                scope: Scope::new(),
                frame,
            });
        self.stack.push(GroupFrame {
            path,
            cursor: 0,
            keys: HashSet::new(),
        });
    }

    fn exit(&mut self) {
        self.stack.pop();
    }

    fn next_position(&mut self, sep: char) -> Option<String> {
        let top = self.stack.last_mut()?;
        let n = top.cursor;
        top.cursor += 1;
        Some(format!("{}{}{}", top.path, sep, n))
    }

    fn keyed_path(&mut self, key: &str) -> Option<String> {
        let top = self.stack.last_mut()?;
        let mut unique = key.to_string();
        let mut n = 1;
        while top.keys.contains(&unique) {
            n += 1;
            unique = format!("{key}~{n}");
        }
        if n > 1 {
            log::warn!(
                "key '{}' used more than once under '{}'; later uses get separate state",
                key,
                top.path
            );
        }
        top.keys.insert(unique.clone());
        Some(format!("{}/k:{}", top.path, unique))
    }

    fn current_path(&self) -> Option<&str> {
        self.stack.last().map(|g| g.path.as_str())
    }

    fn lookup<T: 'static>(&mut self, key: &str) -> Option<Rc<T>> {
        let frame = self.frame;
        let slot = self.slots.get_mut(key)?;
        match slot.value.downcast_ref::<Rc<T>>() {
            Some(rc) => {
                slot.frame = frame;
                Some(rc.clone())
            }
            None => {
                log::warn!(
                    "remember: slot '{}' type changed; replacing. \
                     If this is due to conditional composition, wrap branches in with_key.",
                    key
                );
                None
            }
        }
    }

    fn store<T: 'static>(&mut self, key: String, rc: Rc<T>) -> Option<Box<dyn Any>> {
        let frame = self.frame;
        self.slots
            .insert(
                key,
                SlotEntry {
                    value: Box::new(rc),
                    frame,
                },
            )
            .map(|old| old.value)
    }

    fn descendants_invalidated(&self) -> bool {
        let Some(prefix) = self.current_path() else {
            return false;
        };
        self.frame_invalidated
            .iter()
            .any(|p| p != prefix && within(p, prefix))
    }

    fn retain(&mut self) {
        let Some(prefix) = self.current_path().map(str::to_string) else {
            return;
        };
        let frame = self.frame;
        for (k, s) in self.slots.iter_mut() {
            if within(k, &prefix) {
                s.frame = frame;
            }
        }
        for (k, g) in self.groups.iter_mut() {
            if within(k, &prefix) {
                g.frame = frame;
            }
        }
    }
}

fn remember_at<T: 'static>(key: Option<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let Some(key) = key else {
        log::warn!("remember called outside composition; value will not persist");
        return Rc::new(init());
    };

    if let Some(rc) = COMPOSER.with(|c| c.borrow_mut().lookup::<T>(&key)) {
        return rc;
    }

    // init may itself compose, so the table must not be borrowed while it runs
    let rc = Rc::new(init());
    let replaced = COMPOSER.with(|c| c.borrow_mut().store(key, rc.clone()));
    drop(replaced);
    rc
}

/// Slot-based remember: the Nth call inside a group always refers to the Nth stored value.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let key = COMPOSER.with(|c| c.borrow_mut().next_position('#'));
    remember_at(key, init)
}

/// Key-based remember, stable across conditional branches within a group.
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let key = COMPOSER.with(|c| c.borrow().current_path().map(|p| format!("{p}@{key}")));
    remember_at(key, init)
}

fn in_group<R>(path: Option<String>, f: impl FnOnce() -> R) -> R {
    let Some(path) = path else {
        return f();
    };
    COMPOSER.with(|c| c.borrow_mut().enter(path));
    let r = f();
    COMPOSER.with(|c| c.borrow_mut().exit());
    r
}

/// Composes `f` in a positional child group of the current group.
///
/// State remembered inside the group, and cleanups registered on its scope,
/// live exactly as long as the group keeps being composed.
pub fn group<R>(f: impl FnOnce() -> R) -> R {
    let path = COMPOSER.with(|c| c.borrow_mut().next_position('/'));
    in_group(path, f)
}

/// Composes `f` in a child group identified by `key` instead of position.
pub fn with_key<R>(key: impl AsRef<str>, f: impl FnOnce() -> R) -> R {
    let path = COMPOSER.with(|c| c.borrow_mut().keyed_path(key.as_ref()));
    in_group(path, f)
}

/// Keeps every slot and group under the current group alive for this frame
/// without composing it again (used when a cached view is reused).
pub fn retain_group() {
    COMPOSER.with(|c| c.borrow_mut().retain());
}

/// Path of the group currently being composed.
pub fn current_path() -> Option<String> {
    COMPOSER.with(|c| c.borrow().current_path().map(str::to_string))
}

pub(crate) fn current_group_scope() -> Option<Scope> {
    COMPOSER.with(|c| {
        let c = c.borrow();
        let path = c.current_path()?;
        c.groups.get(path).map(|g| g.scope.clone())
    })
}

/// Queues `f` to run once the current frame has been committed.
/// Outside composition it runs immediately.
pub fn after_commit(f: impl FnOnce() + 'static) {
    let queued = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        if c.composing {
            c.effects.push(Box::new(f));
            None
        } else {
            Some(f)
        }
    });
    if let Some(f) = queued {
        f();
    }
}

/// Records that state owned by the group at `path` changed, and asks for a
/// new frame. Cached subtrees containing that group recompose it.
pub fn invalidate(path: &str) {
    COMPOSER.with(|c| c.borrow_mut().invalidated.insert(path.to_string()));
    request_frame();
}

/// Whether a group nested below the current one was invalidated before this
/// frame started. A cached view may only be reused when this is false.
pub fn descendants_invalidated() -> bool {
    COMPOSER.with(|c| c.borrow().descendants_invalidated())
}

/// Asks the host for another composition.
pub fn request_frame() {
    FRAME_REQUESTED.with(|r| r.set(true));
}

pub fn frame_requested() -> bool {
    FRAME_REQUESTED.with(|r| r.get())
}

pub(crate) struct UnwindMark {
    depth: usize,
    effects: usize,
}

pub(crate) fn unwind_mark() -> UnwindMark {
    COMPOSER.with(|c| {
        let c = c.borrow();
        UnwindMark {
            depth: c.stack.len(),
            effects: c.effects.len(),
        }
    })
}

/// Restores the group stack after a caught panic and drops effects queued by
/// the failed subtree. Returns the path that was active when the panic hit.
pub(crate) fn unwind_to(mark: UnwindMark) -> (String, bool) {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let path = c.current_path().unwrap_or_default().to_string();
        c.stack.truncate(mark.depth);
        c.effects.truncate(mark.effects);
        (path, c.log_caught_panics)
    })
}

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Upper bound on recompositions performed by one `Runtime::settle` call.
    pub max_settle_frames: usize,
    /// Log panics recovered by error boundaries at `error` level.
    pub log_caught_panics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_settle_frames: 64,
            log_caught_panics: true,
        }
    }
}

/// Committed output of one composition.
#[derive(Debug)]
pub struct Frame {
    pub root: View,
    pub number: u64,
    pub disposed_groups: usize,
    pub effects_run: usize,
    pub compose_time: Duration,
}

/// The host: drives compositions, commits them, and owns the task queue.
///
/// One runtime per thread; its slot table and task queue are thread-local.
pub struct Runtime {
    id: u64,
    config: RuntimeConfig,
    frame: u64,
    pool: LocalPool,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creating a runtime takes over the thread's slot table and task queue.
    /// Groups left by a runtime it replaced are disposed here, and the
    /// replaced runtime becomes inert: dropping it later leaves the new one
    /// untouched.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let id = NEXT_RUNTIME_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        let previous = ACTIVE_RUNTIME.with(|a| a.replace(id));
        if previous != 0 {
            let disposed = dispose_all();
            log::warn!(
                "runtime {id} replaces runtime {previous} on this thread ({disposed} groups disposed)"
            );
        }
        let pool = LocalPool::new();
        crate::task::install_spawner(pool.spawner());
        COMPOSER.with(|c| *c.borrow_mut() = Composer::default());
        FRAME_REQUESTED.with(|r| r.set(false));
        Self {
            id,
            config,
            frame: 0,
            pool,
        }
    }

    /// Whether this runtime still owns the thread's slot table.
    pub fn is_active(&self) -> bool {
        ACTIVE_RUNTIME.with(|a| a.get()) == self.id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn frame_number(&self) -> u64 {
        self.frame
    }

    pub fn compose(&mut self, build: impl FnOnce() -> View) -> Frame {
        if !self.is_active() {
            log::warn!("runtime {} composes after being replaced on this thread", self.id);
        }
        let start = Instant::now();
        self.frame += 1;
        FRAME_REQUESTED.with(|r| r.set(false));

        let log_caught_panics = self.config.log_caught_panics;
        let frame = self.frame;
        COMPOSER.with(|c| c.borrow_mut().begin(frame, log_caught_panics));
        let root = build();
        let end = COMPOSER.with(|c| c.borrow_mut().finish());

        drop(end.dropped);
        let disposed_groups = end.dead.len();
        for (path, scope) in end.dead {
            log::trace!("disposing group {path}");
            scope.dispose();
        }
        let effects_run = end.effects.len();
        for effect in end.effects {
            effect();
        }

        log::trace!(
            "frame {}: {} groups disposed, {} effects run",
            self.frame,
            disposed_groups,
            effects_run
        );
        #[cfg(feature = "inspector")]
        log::debug!("frame {} tree:\n{}", self.frame, root.dump());

        Frame {
            root,
            number: self.frame,
            disposed_groups,
            effects_run,
            compose_time: start.elapsed(),
        }
    }

    pub fn needs_frame(&self) -> bool {
        frame_requested()
    }

    /// Runs queued tasks (promise settlements, spawned futures) until none can progress.
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Composes, then keeps draining tasks and recomposing while state changes
    /// request new frames.
    pub fn settle(&mut self, mut build: impl FnMut() -> View) -> Frame {
        let mut frame = self.compose(&mut build);
        for _ in 0..self.config.max_settle_frames {
            self.run_until_stalled();
            if !self.needs_frame() {
                return frame;
            }
            frame = self.compose(&mut build);
        }
        log::warn!(
            "settle: {} frames composed and state is still changing; giving up",
            self.config.max_settle_frames
        );
        frame
    }

    /// Tears down every group, running all pending cleanups. Returns how many groups were disposed.
    pub fn teardown(&mut self) -> usize {
        if !self.is_active() {
            log::debug!("runtime {} was replaced; nothing to tear down", self.id);
            return 0;
        }
        dispose_all()
    }
}

/// Disposes every group of the thread's slot table, deepest first, and
/// drops its slots.
fn dispose_all() -> usize {
    let (mut dead, slots) = COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let dead: Vec<(String, Scope)> = c.groups.drain().map(|(k, g)| (k, g.scope)).collect();
        let slots: Vec<SlotEntry> = c.slots.drain().map(|(_, s)| s).collect();
        (dead, slots)
    });
    sort_for_disposal(&mut dead);
    let n = dead.len();
    for (_, scope) in dead {
        scope.dispose();
    }
    drop(slots);
    n
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        self.teardown();
        crate::task::uninstall_spawner();
        ACTIVE_RUNTIME.with(|a| a.set(0));
    }
}
