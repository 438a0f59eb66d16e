use std::cell::RefCell;
use std::rc::Rc;

use crate::*;

fn log_to(log: &Rc<RefCell<Vec<String>>>, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

#[test]
fn test_remember_persists_across_frames() {
    let mut rt = Runtime::new();
    let build = || {
        let n = remember(|| RefCell::new(0));
        *n.borrow_mut() += 1;
        Text(n.borrow().to_string())
    };
    rt.compose(build);
    rt.compose(build);
    let frame = rt.compose(build);
    assert_eq!(frame.root.texts(), vec!["3"]);
}

#[test]
fn test_key_based_remember() {
    let mut rt = Runtime::new();
    rt.compose(|| {
        let val1 = remember_with_key("test", || 42);
        let val2 = remember_with_key("test", || 100);

        // Same key, same instance
        assert_eq!(*val1, 42);
        assert_eq!(*val2, 42);
        View::empty()
    });
}

#[test]
fn test_groups_isolate_positional_slots() {
    let mut rt = Runtime::new();
    let frame = rt.compose(|| {
        let a = group(|| *remember(|| 1));
        let b = group(|| *remember(|| 2));
        Text(format!("{a}{b}"))
    });
    assert_eq!(frame.root.texts(), vec!["12"]);
}

#[test]
fn test_uncomposed_group_is_disposed() {
    let mut rt = Runtime::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let show = Rc::new(RefCell::new(true));

    let build = {
        let log = log.clone();
        let show = show.clone();
        move || {
            if *show.borrow() {
                with_key("panel", || {
                    let log = log.clone();
                    disposable_effect((), move || {
                        on_unmount(move || log_to(&log, "panel disposed"))
                    });
                    Text("panel")
                })
            } else {
                View::empty()
            }
        }
    };

    rt.compose(build.clone());
    rt.compose(build.clone());
    assert!(log.borrow().is_empty());

    *show.borrow_mut() = false;
    let frame = rt.compose(build.clone());
    assert_eq!(frame.disposed_groups, 1);
    assert_eq!(*log.borrow(), vec!["panel disposed"]);
}

#[test]
fn test_children_disposed_before_parents() {
    let mut rt = Runtime::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let show = Rc::new(RefCell::new(true));

    let build = {
        let log = log.clone();
        let show = show.clone();
        move || {
            if !*show.borrow() {
                return View::empty();
            }
            with_key("outer", || {
                let outer_log = log.clone();
                scoped_effect(move || Box::new(move || log_to(&outer_log, "outer")));
                with_key("inner", || {
                    let inner_log = log.clone();
                    scoped_effect(move || Box::new(move || log_to(&inner_log, "inner")));
                    View::empty()
                })
            })
        }
    };

    rt.compose(build.clone());
    *show.borrow_mut() = false;
    rt.compose(build);
    assert_eq!(*log.borrow(), vec!["inner", "outer"]);
}

#[test]
fn test_retain_group_keeps_skipped_subtree() {
    let mut rt = Runtime::new();
    let skip = Rc::new(RefCell::new(false));
    let disposed = Rc::new(RefCell::new(false));

    let build = {
        let skip = skip.clone();
        let disposed = disposed.clone();
        move || {
            with_key("cached", || {
                if *skip.borrow() {
                    retain_group();
                    return View::empty();
                }
                with_key("body", || {
                    let disposed = disposed.clone();
                    scoped_effect(move || Box::new(move || *disposed.borrow_mut() = true));
                    View::empty()
                })
            })
        }
    };

    rt.compose(build.clone());
    *skip.borrow_mut() = true;
    rt.compose(build.clone());
    rt.compose(build);
    assert!(!*disposed.borrow());
}

#[test]
fn test_disposable_effect_runs_after_commit_and_cleans_up() {
    let mut rt = Runtime::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let key = Rc::new(RefCell::new(1));

    let build = {
        let log = log.clone();
        let key = key.clone();
        move || {
            let k = *key.borrow();
            let log2 = log.clone();
            disposable_effect(k, move || {
                log_to(&log2, format!("run {k}"));
                let log3 = log2.clone();
                on_unmount(move || log_to(&log3, format!("cleanup {k}")))
            });
            log_to(&log, "compose");
            View::empty()
        }
    };

    rt.compose(build.clone());
    assert_eq!(*log.borrow(), vec!["compose", "run 1"]);

    rt.compose(build.clone());
    assert_eq!(log.borrow().len(), 3);

    *key.borrow_mut() = 2;
    rt.compose(build);
    assert_eq!(
        *log.borrow(),
        vec!["compose", "run 1", "compose", "compose", "cleanup 1", "run 2"]
    );

    rt.teardown();
    assert_eq!(log.borrow().last().map(String::as_str), Some("cleanup 2"));
}

#[test]
fn test_mutable_state_requests_frame() {
    let mut rt = Runtime::new();
    let handle = Rc::new(RefCell::new(None));
    let build = {
        let handle = handle.clone();
        move || {
            let s = remember_state(|| 0);
            *handle.borrow_mut() = Some(s.clone());
            Text(s.get().to_string())
        }
    };
    rt.compose(build.clone());
    assert!(!rt.needs_frame());

    let state = handle.borrow().clone().unwrap();
    state.set(7);
    assert!(rt.needs_frame());
    let frame = rt.compose(build);
    assert_eq!(frame.root.texts(), vec!["7"]);
    assert!(!rt.needs_frame());

    state.set_silent(8);
    assert!(!rt.needs_frame());
}

#[test]
fn test_promise_callbacks_run_on_task_queue() {
    let mut rt = Runtime::new();
    let got = Rc::new(RefCell::new(None));

    let p: Promise<i32, String> = Promise::resolved(5);
    let got2 = got.clone();
    p.on_settle(move |r| *got2.borrow_mut() = Some(r));
    assert!(got.borrow().is_none());

    rt.run_until_stalled();
    assert_eq!(*got.borrow(), Some(Ok(5)));
}

#[test]
fn test_pending_promise_settles_once() {
    let mut rt = Runtime::new();
    let (p, resolver) = Promise::<i32, String>::pending();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let calls2 = calls.clone();
    p.on_settle(move |r| calls2.borrow_mut().push(r));

    rt.run_until_stalled();
    assert!(calls.borrow().is_empty());
    assert!(!p.is_settled());

    resolver.reject("nope".to_string());
    assert_eq!(p.peek(), Some(Err("nope".to_string())));
    rt.run_until_stalled();
    assert_eq!(*calls.borrow(), vec![Err("nope".to_string())]);
}

#[test]
fn test_spawned_promise() {
    let mut rt = Runtime::new();
    let p = Promise::<&'static str, ()>::spawn(async { Ok("done") }).unwrap();
    let clone = p.clone();
    assert!(p.ptr_eq(&clone));
    assert!(!p.ptr_eq(&Promise::resolved("done")));

    rt.run_until_stalled();
    assert_eq!(p.peek(), Some(Ok("done")));
}

#[test]
fn test_spawn_without_runtime_fails() {
    let err = spawn_local(async {}).unwrap_err();
    assert!(matches!(err, TaskError::NoRuntime));
}

#[test]
fn test_catch_render_restores_stack() {
    let mut rt = Runtime::with_config(RuntimeConfig {
        log_caught_panics: false,
        ..RuntimeConfig::default()
    });
    let frame = rt.compose(|| {
        let err = catch_render::<View>(|| {
            with_key("broken", || {
                after_commit(|| panic!("effect of a failed subtree must not run"));
                panic!("boom")
            })
        })
        .unwrap_err();
        assert_eq!(err.message, "boom");
        assert_eq!(err.component, "/k:broken");
        // composition continues at the boundary's level
        assert_eq!(crate::current_path().as_deref(), Some(""));
        Text(err.to_string())
    });
    assert_eq!(
        frame.root.texts(),
        vec!["render panicked in `/k:broken`: boom"]
    );
}

#[test]
fn test_locals_scoped_override() {
    #[derive(Clone, Default, Debug, PartialEq)]
    struct Depth(u8);

    assert_eq!(local::<Depth>(), Depth(0));
    provide(Depth(1), || {
        assert_eq!(local::<Depth>(), Depth(1));
        provide(Depth(2), || assert_eq!(local::<Depth>(), Depth(2)));
        assert_eq!(local::<Depth>(), Depth(1));
    });
    assert_eq!(local::<Depth>(), Depth(0));
}

#[test]
fn test_settle_stops_when_quiet() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rt = Runtime::with_config(RuntimeConfig {
        max_settle_frames: 3,
        ..RuntimeConfig::default()
    });
    // requests a frame on every composition, so settle has to give up
    let frame = rt.settle(|| {
        request_frame();
        View::empty()
    });
    assert_eq!(frame.number, 4);

    let frame = rt.settle(View::empty);
    assert_eq!(frame.number, 5);
}

#[test]
fn test_view_dump() {
    let tree = Element("list").with_children(vec![
        Text("a").key("1"),
        Fragment([View::empty(), Text("b")]),
    ]);
    assert_eq!(tree.dump(), "list\n  \"a\" #1\n  <>\n    \"b\"\n");
    assert!(Fragment([View::empty()]).is_empty());
    assert_eq!(tree.find_all("list").len(), 1);
}

#[test]
fn test_effect_cleanup_tied_to_group() {
    let mut rt = Runtime::new();
    let cleaned = Rc::new(RefCell::new(0));
    let cleaned2 = cleaned.clone();
    rt.compose(move || {
        with_key("once", || {
            let cleaned = cleaned2.clone();
            let d = effect(move || on_unmount(move || *cleaned.borrow_mut() += 1));
            // running early is allowed; the group's disposer then does nothing
            d.run();
            View::empty()
        })
    });
    assert_eq!(*cleaned.borrow(), 1);
    rt.compose(View::empty);
    assert_eq!(*cleaned.borrow(), 1);
}

#[test]
fn test_state_write_invalidates_enclosing_groups() {
    let mut rt = Runtime::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let handles = Rc::new(RefCell::new(None));

    let build = {
        let seen = seen.clone();
        let handles = handles.clone();
        move || {
            with_key("cached", || {
                seen.borrow_mut().push(descendants_invalidated());
                let own = remember_state(|| 0);
                let inner = with_key("body", || remember_state(|| 0));
                *handles.borrow_mut() = Some((own, inner));
                View::empty()
            })
        }
    };

    rt.compose(build.clone());
    let (own, inner) = handles.borrow().clone().unwrap();

    inner.set(1);
    assert!(rt.needs_frame());
    rt.compose(build.clone());
    rt.compose(build.clone());

    // the group's own state does not count as a descendant
    own.set(1);
    assert!(rt.needs_frame());
    rt.compose(build);

    assert_eq!(*seen.borrow(), vec![false, true, false, false]);
}

#[test]
fn test_replaced_runtime_is_inert() {
    let old_disposed = Rc::new(RefCell::new(0));
    let new_disposed = Rc::new(RefCell::new(0));

    let mut old = Runtime::new();
    let counter = old_disposed.clone();
    old.compose(move || {
        with_key("old", || {
            scoped_effect(move || Box::new(move || *counter.borrow_mut() += 1));
            View::empty()
        })
    });

    let mut rt = Runtime::new();
    assert!(rt.is_active());
    assert!(!old.is_active());
    assert_eq!(*old_disposed.borrow(), 1);

    let counter = new_disposed.clone();
    rt.compose(move || {
        with_key("new", || {
            scoped_effect(move || Box::new(move || *counter.borrow_mut() += 1));
            View::empty()
        })
    });

    assert_eq!(old.teardown(), 0);
    drop(old);
    assert_eq!(*new_disposed.borrow(), 0);
    assert_eq!(*old_disposed.borrow(), 1);

    let got = Rc::new(RefCell::new(None));
    let got2 = got.clone();
    Promise::<i32, String>::resolved(5).on_settle(move |r| *got2.borrow_mut() = Some(r));
    rt.run_until_stalled();
    assert_eq!(*got.borrow(), Some(Ok(5)));

    drop(rt);
    assert_eq!(*new_disposed.borrow(), 1);
}

#[test]
fn test_reassigned_runtime_keeps_task_queue() {
    let mut rt = Runtime::new();
    rt.compose(View::empty);
    rt = Runtime::new();

    let p = Promise::<&'static str, ()>::spawn(async { Ok("ran") }).unwrap();
    rt.run_until_stalled();
    assert_eq!(p.peek(), Some(Ok("ran")));
}
