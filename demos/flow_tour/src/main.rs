use std::cell::RefCell;
use std::rc::Rc;

use reflow_core::prelude::*;
use reflow_flow::*;

#[derive(Clone, Debug)]
struct Report {
    title: &'static str,
    rows: Vec<u32>,
}

fn load_report(title: &'static str) -> Result<Promise<Report, String>, TaskError> {
    Promise::spawn(async move {
        if title.is_empty() {
            return Err("report has no title".to_string());
        }
        Ok(Report {
            title,
            rows: vec![3, 1, 4],
        })
    })
}

struct Tour {
    report: RefCell<Option<Promise<Report, String>>>,
    filter: RefCell<&'static str>,
}

fn report_view(report: &Report) -> View {
    Element("report").with_children(vec![
        Text(report.title),
        Map(&report.rows, |row, i, all| {
            Text(format!("row {}/{}: {row}", i + 1, all.len()))
        }),
    ])
}

fn counter() -> Result<View, FlowError> {
    Bare::<u32>::render_with(|inst| Text(format!("renders {}", inst.render_count())))
        .constructor(|c| c.set_state(1))
        .did_mount(|inst| log::info!("counter mounted with state {}", inst.state()))
        .did_update(|inst, prev| log::info!("counter {prev} -> {}", inst.state()))
        .will_unmount(|_| log::info!("counter unmounted"))
        .view()
}

fn app(tour: &Tour) -> View {
    let filter = *tour.filter.borrow();
    let counter = counter().unwrap_or_else(|err| {
        log::error!("{err}");
        View::empty()
    });

    Element("tour").with_children(vec![
        Switch([
            When(filter == "all", Text("showing everything")),
            When(Test::when(move || filter.starts_with('o')), Text("showing odd rows")),
        ]),
        IfElse(filter.is_empty(), Text("no filter"), Text(format!("filter: {filter}"))),
        Memo(&[Prop::from(filter)], Render::lazy(move || Text(format!("memo for {filter:?}")))),
        Await::new(tour.report.borrow().clone())
            .then_with(report_view)
            .catch_with(|err: &String| Text(format!("failed: {err}")))
            .placeholder(Text("loading report"))
            .finally(Element("footer"))
            .show_stale_data(true)
            .view(),
        TryCatch::new(Render::lazy(move || {
            if filter == "broken" {
                panic!("filter cannot be rendered");
            }
            Text("filter ok")
        }))
        .catch_with(|err| Text(format!("recovered: {}", err.message)))
        .on_error(|err| log::warn!("tour caught {err}"))
        .view(),
        counter,
    ])
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rt = Runtime::with_config(RuntimeConfig {
        log_caught_panics: false,
        ..Default::default()
    });
    let tour = Rc::new(Tour {
        report: RefCell::new(None),
        filter: RefCell::new("all"),
    });
    let build = {
        let tour = tour.clone();
        move || app(&tour)
    };

    let frame = rt.settle(build.clone());
    log::info!("frame {} (no report):\n{}", frame.number, frame.root.dump());

    *tour.report.borrow_mut() = Some(load_report("quarterly")?);
    let frame = rt.compose(build.clone());
    log::info!("frame {} (loading):\n{}", frame.number, frame.root.dump());

    let frame = rt.settle(build.clone());
    log::info!("frame {} (loaded):\n{}", frame.number, frame.root.dump());

    *tour.filter.borrow_mut() = "odd";
    *tour.report.borrow_mut() = Some(load_report("")?);
    let frame = rt.compose(build.clone());
    log::info!("frame {} (stale while reloading):\n{}", frame.number, frame.root.dump());

    let frame = rt.settle(build.clone());
    log::info!("frame {} (reload failed):\n{}", frame.number, frame.root.dump());

    *tour.filter.borrow_mut() = "broken";
    let frame = rt.settle(build);
    log::info!("frame {} (render panic caught):\n{}", frame.number, frame.root.dump());

    let disposed = rt.teardown();
    log::info!("teardown disposed {disposed} groups");
    Ok(())
}
