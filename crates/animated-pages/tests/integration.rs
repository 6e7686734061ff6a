//! Integration tests for PageSwitcher
//!
//! These tests verify complete page change flows including:
//! - Sequences of animated page changes with and without restamp
//! - Queueing and coalescing of page changes while a segue plays
//! - The no-animation fast path
//! - Reverting and canceling page changes
//! - Selection by page definition and id bookkeeping
//! - Lifecycle events and host lifecycle

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use animated_pages::{
    segue_factory, Completion, Disposition, ElementTemplate, LocalBoxFuture, PageChange,
    PageChangeReport, PageChangeRequest, PageEvent, PageEventKind, PageHandle, PageSpec,
    PagesError, Segue, SegueContext, Size, Stage, SwitcherConfig, PageSwitcher,
};
use serde_json::json;
use tokio::task::LocalSet;

// =============================================================================
// Helpers
// =============================================================================

type Log = Rc<RefCell<String>>;

fn push(log: &Log, mark: &str) {
    log.borrow_mut().push_str(mark);
}

fn switcher() -> PageSwitcher {
    let switcher = PageSwitcher::new(Stage::new(Size::new(800.0, 600.0)), SwitcherConfig::default());
    for name in ["1", "2", "3", "4"] {
        switcher.register_template(name, ElementTemplate::new("div").with_text(name));
    }
    switcher
}

fn create_pages(switcher: &PageSwitcher, names: &[&str], restamp: bool) -> Vec<PageHandle> {
    let mut container = switcher.container_mut();
    names
        .iter()
        .map(|name| {
            let page = container.create_page(name).unwrap();
            container.set_restamp(page, restamp);
            page
        })
        .collect()
}

/// Text and hidden flag of the nth stage child
fn study(switcher: &PageSwitcher, nth: usize) -> Option<(String, bool)> {
    switcher
        .container()
        .stage()
        .children()
        .get(nth)
        .map(|element| (element.text(), element.is_hidden()))
}

fn shown(text: &str) -> Option<(String, bool)> {
    Some((text.to_string(), false))
}

fn hidden(text: &str) -> Option<(String, bool)> {
    Some((text.to_string(), true))
}

fn completed(page_a: Option<PageHandle>, page_b: Option<PageHandle>, animated: bool) -> PageChange {
    PageChange::Completed(PageChangeReport {
        page_a,
        page_b,
        canceled: false,
        animated,
        reverted: false,
    })
}

/// Segue writing marks on start, after one yield and on stop
struct LoggedSegue {
    log: Log,
    marks: [&'static str; 3],
}

impl Segue for LoggedSegue {
    fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
        let log = Rc::clone(&self.log);
        let [on_start, on_end, _] = self.marks;
        Box::pin(async move {
            push(&log, on_start);
            tokio::task::yield_now().await;
            push(&log, on_end);
            Ok(None)
        })
    }

    fn stop(&mut self, _canceled: bool) -> anyhow::Result<()> {
        push(&self.log, self.marks[2]);
        Ok(())
    }
}

/// Enqueue a change to `page` with a logged segue
///
/// Marks: resolve, create segue, segue start, segue end, segue stop.
fn logged_change(
    switcher: &PageSwitcher,
    log: &Log,
    page: Option<PageHandle>,
    marks: [&'static str; 5],
) -> Completion<PageChange> {
    let (resolve_log, factory_log) = (Rc::clone(log), Rc::clone(log));
    let request = PageChangeRequest::new(move |_| {
        push(&resolve_log, marks[0]);
        Ok(page)
    })
    .with_segue_factory(segue_factory(move |_| {
        push(&factory_log, marks[1]);
        Ok(Some(Box::new(LoggedSegue {
            log: Rc::clone(&factory_log),
            marks: [marks[2], marks[3], marks[4]],
        }) as Box<dyn Segue>))
    }));
    switcher.enqueue_page_change(request)
}

fn instant_change(switcher: &PageSwitcher, page: Option<PageHandle>) -> Completion<PageChange> {
    switcher.enqueue_page_change(PageChangeRequest::new(move |_| Ok(page)))
}

/// Segue lasting a number of 16ms frames
struct TimedSegue {
    frames: u32,
    disposition: Option<Disposition>,
    stops: Rc<RefCell<Vec<bool>>>,
}

impl Segue for TimedSegue {
    fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
        let (frames, disposition) = (self.frames, self.disposition);
        Box::pin(async move {
            for _ in 0..frames {
                tokio::time::sleep(Duration::from_millis(16)).await;
            }
            Ok(disposition)
        })
    }

    fn stop(&mut self, canceled: bool) -> anyhow::Result<()> {
        self.stops.borrow_mut().push(canceled);
        Ok(())
    }
}

fn timed_factory(
    frames: u32,
    disposition: Option<Disposition>,
    stops: &Rc<RefCell<Vec<bool>>>,
) -> animated_pages::SegueFactory {
    let stops = Rc::clone(stops);
    segue_factory(move |_| {
        Ok(Some(Box::new(TimedSegue {
            frames,
            disposition,
            stops: Rc::clone(&stops),
        }) as Box<dyn Segue>))
    })
}

fn record_events(switcher: &PageSwitcher) -> Rc<RefCell<Vec<(PageEventKind, PageHandle)>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    switcher.on_page_event(move |event: &PageEvent| sink.borrow_mut().push((event.kind, event.page)));
    events
}

// =============================================================================
// Animated Sequences
// =============================================================================

async fn play_sequence(restamp: bool) {
    let switcher = switcher();
    let pages = create_pages(&switcher, &["1", "2"], restamp);
    let (page1, page2) = (pages[0], pages[1]);

    // Change 1: show page 1
    let log = Log::default();
    let change = logged_change(&switcher, &log, Some(page1), ["1", ",2", ",3", ",5", ",6"]);
    push(&log, ",4");

    assert_eq!(*log.borrow(), "1,2,3,4");
    assert!(switcher.is_transitioning());
    assert_eq!(switcher.current_page(), None);
    assert_eq!(study(&switcher, 0), shown("1"));
    assert_eq!(study(&switcher, 1), None);

    let ret = change.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,4,5,6");
    assert!(!switcher.is_transitioning());
    assert_eq!(ret, completed(None, Some(page1), true));
    assert_eq!(switcher.current_page(), Some(page1));
    assert_eq!(study(&switcher, 0), shown("1"));
    assert_eq!(study(&switcher, 1), None);

    // Change 2: show page 2
    let log = Log::default();
    let change = logged_change(&switcher, &log, Some(page2), ["1", ",2", ",3", ",5", ",6"]);
    push(&log, ",4");

    assert_eq!(*log.borrow(), "1,2,3,4");
    assert!(switcher.is_transitioning());
    assert_eq!(study(&switcher, 0), shown("1"));
    assert_eq!(study(&switcher, 1), shown("2"));

    let ret = change.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,4,5,6");
    assert_eq!(ret, completed(Some(page1), Some(page2), true));
    if restamp {
        assert_eq!(study(&switcher, 0), shown("2"));
        assert_eq!(study(&switcher, 1), None);
    } else {
        assert_eq!(study(&switcher, 0), hidden("1"));
        assert_eq!(study(&switcher, 1), shown("2"));
    }

    // Change 3: show page 1 again
    let log = Log::default();
    let change = logged_change(&switcher, &log, Some(page1), ["1", ",2", ",3", ",5", ",6"]);
    push(&log, ",4");

    assert_eq!(*log.borrow(), "1,2,3,4");
    if restamp {
        assert_eq!(study(&switcher, 0), shown("2"));
        assert_eq!(study(&switcher, 1), shown("1"));
    } else {
        assert_eq!(study(&switcher, 0), shown("1"));
        assert_eq!(study(&switcher, 1), shown("2"));
    }

    let ret = change.await.unwrap();
    assert_eq!(ret, completed(Some(page2), Some(page1), true));
    if restamp {
        assert_eq!(study(&switcher, 0), shown("1"));
        assert_eq!(study(&switcher, 1), None);
    } else {
        assert_eq!(study(&switcher, 0), shown("1"));
        assert_eq!(study(&switcher, 1), hidden("2"));
    }

    // Change 4: hide page 1
    let log = Log::default();
    let change = logged_change(&switcher, &log, None, ["1", ",2", ",3", ",5", ",6"]);
    push(&log, ",4");
    assert_eq!(*log.borrow(), "1,2,3,4");

    let ret = change.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,4,5,6");
    assert!(!switcher.is_transitioning());
    assert_eq!(ret, completed(Some(page1), None, true));
    assert_eq!(switcher.current_page(), None);
    if restamp {
        assert_eq!(study(&switcher, 0), None);
    } else {
        assert_eq!(study(&switcher, 0), hidden("1"));
        assert_eq!(study(&switcher, 1), hidden("2"));
    }
}

#[tokio::test]
async fn test_sequence_of_segues_without_restamp() {
    LocalSet::new().run_until(play_sequence(false)).await;
}

#[tokio::test]
async fn test_sequence_of_segues_with_restamp() {
    LocalSet::new().run_until(play_sequence(true)).await;
}

// =============================================================================
// Queueing
// =============================================================================

async fn enqueue_while_playing(restamp: bool) {
    let switcher = switcher();
    let pages = create_pages(&switcher, &["1", "2", "3"], restamp);
    let (page1, page2, page3) = (pages[0], pages[1], pages[2]);

    instant_change(&switcher, Some(page1)).await.unwrap();
    assert!(!switcher.is_transitioning());
    assert_eq!(study(&switcher, 0), shown("1"));

    let log = Log::default();
    let first = logged_change(&switcher, &log, Some(page2), ["1", ",2", ",3", ",5", ",6"]);
    let second = logged_change(&switcher, &log, Some(page3), [",8", ",9", ",10", ",11", ",12"]);
    push(&log, ",4");

    assert_eq!(*log.borrow(), "1,2,3,4");
    assert!(switcher.is_transitioning());
    assert_eq!(study(&switcher, 0), shown("1"));
    assert_eq!(study(&switcher, 1), shown("2"));
    assert_eq!(study(&switcher, 2), None);

    let ret = first.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,4,5,6,8,9,10");
    assert!(switcher.is_transitioning());
    assert_eq!(ret, completed(Some(page1), Some(page2), true));
    if restamp {
        assert_eq!(study(&switcher, 0), shown("2"));
        assert_eq!(study(&switcher, 1), shown("3"));
        assert_eq!(study(&switcher, 2), None);
    } else {
        assert_eq!(study(&switcher, 0), hidden("1"));
        assert_eq!(study(&switcher, 1), shown("2"));
        assert_eq!(study(&switcher, 2), shown("3"));
    }

    let ret = second.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,4,5,6,8,9,10,11,12");
    assert!(!switcher.is_transitioning());
    assert_eq!(ret, completed(Some(page2), Some(page3), true));
    if restamp {
        assert_eq!(study(&switcher, 0), shown("3"));
        assert_eq!(study(&switcher, 1), None);
    } else {
        assert_eq!(study(&switcher, 0), hidden("1"));
        assert_eq!(study(&switcher, 1), hidden("2"));
        assert_eq!(study(&switcher, 2), shown("3"));
    }
}

#[tokio::test]
async fn test_enqueue_while_playing_without_restamp() {
    LocalSet::new().run_until(enqueue_while_playing(false)).await;
}

#[tokio::test]
async fn test_enqueue_while_playing_with_restamp() {
    LocalSet::new().run_until(enqueue_while_playing(true)).await;
}

async fn coalesce_while_playing(restamp: bool) {
    let switcher = switcher();
    let pages = create_pages(&switcher, &["1", "2", "3", "4"], restamp);
    let (page1, page2, page4) = (pages[0], pages[1], pages[3]);

    instant_change(&switcher, Some(page1)).await.unwrap();

    let log = Log::default();
    let first = logged_change(&switcher, &log, Some(page2), ["1", ",2", ",3", ",6", ",7"]);
    let mut second = logged_change(&switcher, &log, Some(pages[2]), ["x1", "x2", "x3", "x4", "x5"]);
    assert_eq!(second.try_result(), None);
    let third = logged_change(&switcher, &log, Some(page4), [",9", ",10", ",11", ",12", ",13"]);

    // The second change was skipped before the third one could start
    assert_eq!(second.try_result(), Some(Ok(PageChange::Skipped)));
    assert_eq!(*log.borrow(), "1,2,3");
    assert_eq!(study(&switcher, 0), shown("1"));
    assert_eq!(study(&switcher, 1), shown("2"));
    assert_eq!(study(&switcher, 2), None);

    let ret = first.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,6,7,9,10,11");
    assert!(switcher.is_transitioning());
    assert_eq!(ret, completed(Some(page1), Some(page2), true));
    if restamp {
        assert_eq!(study(&switcher, 0), shown("2"));
        assert_eq!(study(&switcher, 1), shown("4"));
    } else {
        assert_eq!(study(&switcher, 0), hidden("1"));
        assert_eq!(study(&switcher, 1), shown("2"));
        assert_eq!(study(&switcher, 2), shown("4"));
    }

    let ret = third.await.unwrap();
    assert_eq!(*log.borrow(), "1,2,3,6,7,9,10,11,12,13");
    assert!(!switcher.is_transitioning());
    assert_eq!(ret, completed(Some(page2), Some(page4), true));
    if restamp {
        assert_eq!(study(&switcher, 0), shown("4"));
        assert_eq!(study(&switcher, 1), None);
    } else {
        assert_eq!(study(&switcher, 0), hidden("1"));
        assert_eq!(study(&switcher, 1), hidden("2"));
        assert_eq!(study(&switcher, 2), shown("4"));
    }

    // Page 3 was never shown
    assert!(switcher.container().element(pages[2]).is_none());
}

#[tokio::test]
async fn test_coalesce_while_playing_without_restamp() {
    LocalSet::new().run_until(coalesce_while_playing(false)).await;
}

#[tokio::test]
async fn test_coalesce_while_playing_with_restamp() {
    LocalSet::new().run_until(coalesce_while_playing(true)).await;
}

#[tokio::test]
async fn test_n_sync_enqueues_yield_n_completions() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            let pages = create_pages(&switcher, &["1", "2", "3", "4"], false);

            let log = Log::default();
            let mut completions = vec![logged_change(&switcher, &log, Some(pages[0]), ["a", "", "", "", ""])];
            for page in &pages[1..] {
                completions.push(logged_change(&switcher, &log, Some(*page), ["b", "", "", "", ""]));
            }

            let mut started = 0;
            for completion in completions {
                if completion.await.unwrap().started() {
                    started += 1;
                }
            }
            // The first one plus the last pending one
            assert_eq!(started, 2);
            assert_eq!(switcher.current_page(), Some(pages[3]));
        })
        .await;
}

// =============================================================================
// No-Animation Fast Path
// =============================================================================

fn assert_fast_path(switcher: PageSwitcher) {
    let pages = create_pages(&switcher, &["1", "2"], false);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    switcher.set_segue_factory(Some(segue_factory(move |_| {
        counter.set(counter.get() + 1);
        Ok(None)
    })));

    let mut first = instant_change(&switcher, Some(pages[0]));
    let mut second = instant_change(&switcher, Some(pages[1]));

    assert!(!switcher.is_transitioning());
    assert_eq!(
        first.try_result(),
        Some(Ok(completed(None, Some(pages[0]), false)))
    );
    assert_eq!(
        second.try_result(),
        Some(Ok(completed(Some(pages[0]), Some(pages[1]), false)))
    );
    assert_eq!(study(&switcher, 0), hidden("1"));
    assert_eq!(study(&switcher, 1), shown("2"));
    assert_eq!(calls.get(), 0);
}

#[tokio::test]
async fn test_no_animations_fast_path() {
    let switcher = switcher();
    switcher.set_no_animations(true);
    assert_fast_path(switcher);
}

#[tokio::test]
async fn test_hidden_stage_fast_path() {
    let switcher = switcher();
    switcher.container_mut().stage_mut().set_displayed(false);
    assert_fast_path(switcher);
}

#[tokio::test]
async fn test_collapsed_stage_fast_path() {
    let switcher = switcher();
    switcher.container_mut().stage_mut().set_size(Size::ZERO);
    assert_fast_path(switcher);
}

#[tokio::test]
async fn test_factory_without_segue_is_instant() {
    let switcher = switcher();
    switcher.set_segue_factory(Some(segue_factory(|_| Ok(None))));

    let mut change = switcher.select_page(PageSpec::new("1")).unwrap();
    let ret = change.try_result().unwrap().unwrap();
    assert_eq!(ret.animated(), Some(false));
    assert_eq!(ret.report().unwrap().page_b, switcher.container().lookup("1"));
    assert_eq!(study(&switcher, 0), shown("1"));
}

#[tokio::test]
async fn test_select_with_no_factory() {
    let switcher = switcher();
    let page1 = create_pages(&switcher, &["1"], false)[0];
    switcher.container_mut().bind_id("1", page1);

    let mut change = switcher.select_page(PageSpec::new("1").with_id("1")).unwrap();
    assert_eq!(
        change.try_result(),
        Some(Ok(completed(None, Some(page1), false)))
    );

    let container = switcher.container();
    let page = container.page(page1).unwrap();
    assert!(page.is_inserted());
    assert!(page.is_visible());
    assert!(!page.element().unwrap().is_hidden());
    assert!(container.stage().contains(page.element().unwrap()));
}

// =============================================================================
// Async Segues, Revert And Cancel
// =============================================================================

async fn sequential_selects(restamp: bool) {
    let switcher = switcher();
    switcher.set_restamp(restamp);
    let stops = Rc::default();
    switcher.set_segue_factory(Some(timed_factory(3, None, &stops)));

    let first = switcher.select_page("1").unwrap();
    let second = switcher.select_page("2").unwrap();

    let page1 = switcher.container().lookup("1").unwrap();
    assert_eq!(switcher.container().lookup("2"), None);

    let ret = first.await.unwrap();
    assert_eq!(ret, completed(None, Some(page1), true));

    let ret = second.await.unwrap();
    let page2 = switcher.container().lookup("2").unwrap();
    assert_eq!(ret, completed(Some(page1), Some(page2), true));

    let container = switcher.container();
    if restamp {
        assert!(container.page(page1).unwrap().element().is_none());
        assert_eq!(container.stage().len(), 1);
    } else {
        assert!(container.element(page1).unwrap().is_hidden());
    }
    assert!(!container.element(page2).unwrap().is_hidden());
    assert_eq!(*stops.borrow(), vec![false, false]);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_selects_with_async_segue() {
    LocalSet::new().run_until(sequential_selects(false)).await;
}

#[tokio::test(start_paused = true)]
async fn test_sequential_selects_with_async_segue_and_restamp() {
    LocalSet::new().run_until(sequential_selects(true)).await;
}

async fn revert_law(restamp: bool) {
    let switcher = switcher();
    switcher.set_restamp(restamp);
    switcher.select_page("1").unwrap().await.unwrap();
    let page1 = switcher.current_page().unwrap();

    let stops = Rc::default();
    switcher.set_segue_factory(Some(timed_factory(2, Some(Disposition::Start), &stops)));
    let ret = switcher.select_page("2").unwrap().await.unwrap();
    let page2 = switcher.container().lookup("2").unwrap();

    assert_eq!(
        ret,
        PageChange::Completed(PageChangeReport {
            page_a: Some(page1),
            page_b: Some(page2),
            canceled: false,
            animated: true,
            reverted: true,
        })
    );
    assert_eq!(switcher.current_page(), Some(page1));
    assert!(!switcher.container().element(page1).unwrap().is_hidden());
    if restamp {
        assert!(switcher.container().element(page2).is_none());
    } else {
        assert!(switcher.container().element(page2).unwrap().is_hidden());
    }
    assert_eq!(*stops.borrow(), vec![false]);
}

#[tokio::test(start_paused = true)]
async fn test_revert_law_without_restamp() {
    LocalSet::new().run_until(revert_law(false)).await;
}

#[tokio::test(start_paused = true)]
async fn test_revert_law_with_restamp() {
    LocalSet::new().run_until(revert_law(true)).await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_current_transition_reverts() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher.select_page("1").unwrap().await.unwrap();
            let page1 = switcher.current_page().unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(10, None, &stops)));
            let change = switcher.select_page("2").unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;

            assert!(switcher.cancel_current_transition(Some(Disposition::Start)));
            let ret = change.await.unwrap();
            assert_eq!(ret.canceled(), Some(true));
            assert_eq!(ret.reverted(), Some(true));
            assert_eq!(switcher.current_page(), Some(page1));
            assert_eq!(*stops.borrow(), vec![true]);
            assert!(!switcher.cancel_current_transition(None));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_disabling_animations_jumps_to_end() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(10, None, &stops)));

            let change = switcher.select_page("1").unwrap();
            assert!(switcher.is_transitioning());
            switcher.set_no_animations(true);

            let ret = change.await.unwrap();
            assert_eq!(ret.canceled(), Some(true));
            assert_eq!(ret.reverted(), Some(false));
            assert_eq!(switcher.current_page(), switcher.container().lookup("1"));

            let mut next = switcher.select_page("2").unwrap();
            assert_eq!(next.try_result().unwrap().unwrap().animated(), Some(false));
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_skipped_change_then_revert() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher.select_page("1").unwrap().await.unwrap();
            let page1 = switcher.current_page().unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(10, None, &stops)));
            let first = switcher.select_page("2").unwrap();
            let skipped = switcher.select_page("3").unwrap();

            assert!(switcher.clear_upcoming_transition());
            assert_eq!(skipped.await.unwrap(), PageChange::Skipped);
            // Never started, so nothing was created for it
            assert_eq!(switcher.container().lookup("3"), None);

            switcher.cancel_current_transition(Some(Disposition::Start));
            let ret = first.await.unwrap();
            assert_eq!(ret.reverted(), Some(true));
            assert_eq!(switcher.current_page(), Some(page1));
            assert!(!switcher.is_transitioning());
        })
        .await;
}

#[tokio::test]
async fn test_failing_segue_finishes_without_animation() {
    struct Broken;

    impl Segue for Broken {
        fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
            Box::pin(async { Err(anyhow::anyhow!("no renderer")) })
        }

        fn stop(&mut self, _canceled: bool) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("still no renderer"))
        }
    }

    let switcher = switcher();
    switcher.set_segue_factory(Some(segue_factory(|_| Ok(Some(Box::new(Broken) as Box<dyn Segue>)))));

    let mut change = switcher.select_page("1").unwrap();
    let ret = change.try_result().unwrap().unwrap();
    assert!(ret.started());
    assert_eq!(ret.animated(), Some(false));
    assert_eq!(study(&switcher, 0), shown("1"));
}

#[tokio::test]
async fn test_failing_factory_is_instant() {
    let switcher = switcher();
    switcher.set_segue_factory(Some(segue_factory(|_| Err(anyhow::anyhow!("boom")))));

    let mut change = switcher.select_page("1").unwrap();
    assert_eq!(change.try_result().unwrap().unwrap().animated(), Some(false));
}

// =============================================================================
// Selection And Ids
// =============================================================================

#[tokio::test]
async fn test_invalid_definition_is_rejected() {
    let switcher = switcher();
    assert!(matches!(
        switcher.select_page(PageSpec::new("")),
        Err(PagesError::InvalidPageDefinition(_))
    ));
    assert!(!switcher.is_transitioning());
}

#[tokio::test]
async fn test_unknown_template_selects_no_page() {
    let switcher = switcher();
    switcher.select_page("1").unwrap().await.unwrap();
    let page1 = switcher.current_page();

    let ret = switcher.select_page("missing").unwrap().await.unwrap();
    assert_eq!(ret, completed(page1, None, false));
    assert_eq!(switcher.current_page(), None);
    assert_eq!(study(&switcher, 0), hidden("1"));
}

#[tokio::test]
async fn test_select_reuses_page_by_id() {
    let switcher = switcher();
    switcher.select_page("1").unwrap().await.unwrap();
    let page1 = switcher.current_page().unwrap();
    let element = switcher.container().element(page1).unwrap();

    switcher.select_page("2").unwrap().await.unwrap();
    switcher.select_page("1").unwrap().await.unwrap();

    assert_eq!(switcher.current_page(), Some(page1));
    assert_eq!(switcher.container().element(page1), Some(element));
    assert_eq!(switcher.container().len(), 2);
}

#[tokio::test]
async fn test_select_passes_data_to_page() {
    let switcher = switcher();
    let spec = PageSpec::new("1").with_id("product").with_data(json!({ "sku": 7 }));
    switcher.select_page(spec).unwrap().await.unwrap();

    let page = switcher.current_page().unwrap();
    let element = switcher.container().element(page).unwrap();
    assert_eq!(element.property("page.sku"), Some(json!(7)));
    assert_eq!(switcher.container().lookup("product"), Some(page));
}

#[tokio::test]
async fn test_same_id_new_template_replaces_page() {
    let switcher = switcher();
    switcher
        .select_page(PageSpec::new("1").with_id("x"))
        .unwrap()
        .await
        .unwrap();
    let old = switcher.current_page().unwrap();

    switcher
        .select_page(PageSpec::new("2").with_id("x"))
        .unwrap()
        .await
        .unwrap();
    let new = switcher.current_page().unwrap();

    assert_ne!(old, new);
    assert!(!switcher.container().contains(old));
    assert_eq!(switcher.container().lookup("x"), Some(new));
    assert_eq!(study(&switcher, 0), shown("2"));
    assert_eq!(study(&switcher, 1), None);
}

#[tokio::test(start_paused = true)]
async fn test_reverted_replacement_restores_old_page() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher
                .select_page(PageSpec::new("1").with_id("x"))
                .unwrap()
                .await
                .unwrap();
            let old = switcher.current_page().unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(1, Some(Disposition::Start), &stops)));
            let ret = switcher
                .select_page(PageSpec::new("2").with_id("x"))
                .unwrap()
                .await
                .unwrap();

            assert_eq!(ret.reverted(), Some(true));
            assert_eq!(switcher.current_page(), Some(old));
            assert_eq!(switcher.container().lookup("x"), Some(old));
            assert_eq!(switcher.container().len(), 1);
            assert_eq!(study(&switcher, 0), shown("1"));
        })
        .await;
}

#[tokio::test]
async fn test_reselecting_current_page_keeps_it_visible() {
    let switcher = switcher();
    switcher.select_page("1").unwrap().await.unwrap();
    let ret = switcher.select_page("1").unwrap().await.unwrap();

    let page1 = switcher.current_page();
    assert_eq!(ret, completed(page1, page1, false));
    assert_eq!(study(&switcher, 0), shown("1"));
}

#[tokio::test]
async fn test_restamp_from_config_and_template() {
    let switcher = switcher();
    switcher.register_template("r", ElementTemplate::new("div").with_text("r").restamp());

    switcher.select_page("r").unwrap().await.unwrap();
    let page = switcher.current_page().unwrap();
    assert!(switcher.container().page(page).unwrap().restamp());

    // An explicit `false` cannot override a restamping template
    switcher
        .select_page(PageSpec::new("r").with_restamp(false))
        .unwrap()
        .await
        .unwrap();
    assert!(switcher.container().page(page).unwrap().restamp());
}

#[tokio::test]
async fn test_restamp_idempotence() {
    let switcher = switcher();
    let pages = create_pages(&switcher, &["1", "2"], false);
    switcher.container_mut().set_restamp(pages[1], true);

    let mut kept = Vec::new();
    let mut restamped = Vec::new();
    for _ in 0..3 {
        let mut container = switcher.container_mut();
        for page in &pages {
            container.show(*page);
        }
        kept.push(container.element(pages[0]).unwrap());
        restamped.push(container.element(pages[1]).unwrap());
        for page in &pages {
            container.hide(*page);
        }
    }

    assert!(kept.iter().all(|element| *element == kept[0]));
    assert_ne!(restamped[0], restamped[1]);
    assert_ne!(restamped[1], restamped[2]);
    assert_ne!(restamped[0], restamped[2]);
}

#[tokio::test]
async fn test_delete_current_page() {
    let switcher = switcher();
    switcher.select_page("1").unwrap().await.unwrap();
    let page = switcher.current_page().unwrap();

    assert!(switcher.delete_page(page));
    assert!(!switcher.delete_page(page));
    assert_eq!(switcher.current_page(), None);
    assert_eq!(switcher.container().lookup("1"), None);
    assert!(switcher.container().stage().is_empty());
}

// =============================================================================
// Events And Host Lifecycle
// =============================================================================

#[tokio::test]
async fn test_lifecycle_event_order() {
    let switcher = switcher();
    switcher.select_page("1").unwrap().await.unwrap();
    let page1 = switcher.current_page().unwrap();

    let events = record_events(&switcher);
    switcher.select_page("2").unwrap().await.unwrap();
    let page2 = switcher.current_page().unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            (PageEventKind::WillLeave, page1),
            (PageEventKind::WillEnter, page2),
            (PageEventKind::DidLeave, page1),
            (PageEventKind::DidEnter, page2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_event_order_on_revert() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher.select_page("1").unwrap().await.unwrap();
            let page1 = switcher.current_page().unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(1, Some(Disposition::Start), &stops)));
            let events = record_events(&switcher);
            switcher.select_page("2").unwrap().await.unwrap();
            let page2 = switcher.container().lookup("2").unwrap();

            assert_eq!(
                *events.borrow(),
                vec![
                    (PageEventKind::WillLeave, page1),
                    (PageEventKind::WillEnter, page2),
                    (PageEventKind::WillLeave, page2),
                    (PageEventKind::WillEnter, page1),
                    (PageEventKind::DidLeave, page2),
                    (PageEventKind::DidEnter, page1),
                ]
            );
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_listener_can_cancel_from_event() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher.select_page("1").unwrap().await.unwrap();
            let page1 = switcher.current_page().unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(5, None, &stops)));
            let handle = switcher.clone();
            switcher.on_page_event(move |event| {
                if event.kind == PageEventKind::WillEnter && event.page_id.as_deref() == Some("2") {
                    handle.cancel_current_transition(Some(Disposition::Start));
                }
            });

            let mut change = switcher.select_page("2").unwrap();
            let ret = change.try_result().unwrap().unwrap();
            assert_eq!(ret.canceled(), Some(true));
            assert_eq!(switcher.current_page(), Some(page1));
            assert_eq!(*stops.borrow(), vec![true]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_from_did_leave_waits_for_stop_phase() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher.select_page("1").unwrap().await.unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(3, None, &stops)));
            let handle = switcher.clone();
            let cancels = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&cancels);
            switcher.on_page_event(move |event| {
                if event.kind == PageEventKind::DidLeave {
                    sink.borrow_mut().push(handle.cancel_current_transition(None));
                }
            });

            let second = switcher.select_page("2").unwrap();
            let third = switcher.select_page("3").unwrap();
            assert!(second.await.unwrap().started());
            let ret = third.await.unwrap();

            let page2 = switcher.container().lookup("2");
            let page3 = switcher.container().lookup("3");
            assert_eq!(ret, completed(page2, page3, true));
            assert_eq!(study(&switcher, 0), hidden("1"));
            assert_eq!(study(&switcher, 1), hidden("2"));
            assert_eq!(study(&switcher, 2), shown("3"));
            assert_eq!(switcher.current_page(), page3);
            assert_eq!(*cancels.borrow(), vec![false, false]);
            assert_eq!(*stops.borrow(), vec![false, false]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_from_will_leave_skips_will_enter() {
    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            switcher.select_page("1").unwrap().await.unwrap();
            let page1 = switcher.current_page().unwrap();

            let stops = Rc::default();
            switcher.set_segue_factory(Some(timed_factory(3, None, &stops)));
            let events = record_events(&switcher);
            let handle = switcher.clone();
            switcher.on_page_event(move |event| {
                if event.kind == PageEventKind::WillLeave {
                    handle.cancel_current_transition(None);
                }
            });

            let ret = switcher.select_page("2").unwrap().await.unwrap();
            let page2 = switcher.container().lookup("2").unwrap();

            assert_eq!(ret.canceled(), Some(true));
            assert_eq!(switcher.current_page(), Some(page2));
            assert_eq!(
                *events.borrow(),
                vec![
                    (PageEventKind::WillLeave, page1),
                    (PageEventKind::DidLeave, page1),
                    (PageEventKind::DidEnter, page2),
                ]
            );
            assert_eq!(*stops.borrow(), vec![true]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_panicking_segue_does_not_stall_queue() {
    struct Exploding {
        stops: Rc<RefCell<Vec<bool>>>,
    }

    fn explode() -> anyhow::Result<Option<Disposition>> {
        panic!("segue blew up")
    }

    impl Segue for Exploding {
        fn start(&mut self) -> LocalBoxFuture<anyhow::Result<Option<Disposition>>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(16)).await;
                explode()
            })
        }

        fn stop(&mut self, canceled: bool) -> anyhow::Result<()> {
            self.stops.borrow_mut().push(canceled);
            Ok(())
        }
    }

    LocalSet::new()
        .run_until(async {
            let switcher = switcher();
            let stops: Rc<RefCell<Vec<bool>>> = Rc::default();
            let factory_stops = Rc::clone(&stops);
            switcher.set_segue_factory(Some(segue_factory(move |_| {
                Ok(Some(Box::new(Exploding {
                    stops: Rc::clone(&factory_stops),
                }) as Box<dyn Segue>))
            })));

            let first = switcher.select_page("1").unwrap();
            let second = switcher.select_page("2").unwrap();
            switcher.set_segue_factory(None);

            let ret = first.await.unwrap();
            assert!(ret.started());
            assert_eq!(ret.canceled(), Some(false));
            assert_eq!(*stops.borrow(), vec![false]);

            let ret = second.await.unwrap();
            let page2 = switcher.container().lookup("2");
            assert_eq!(ret, completed(switcher.container().lookup("1"), page2, false));
            assert_eq!(switcher.current_page(), page2);
            assert_eq!(study(&switcher, 0), hidden("1"));
            assert_eq!(study(&switcher, 1), shown("2"));
            assert!(!switcher.is_transitioning());
        })
        .await;
}

#[tokio::test]
async fn test_panicking_factory_changes_page_instantly() {
    let switcher = switcher();
    switcher.set_segue_factory(Some(segue_factory(|_| panic!("factory blew up"))));

    let mut change = switcher.select_page("1").unwrap();
    let ret = change.try_result().unwrap().unwrap();
    assert!(ret.started());
    assert_eq!(ret.animated(), Some(false));
    assert_eq!(study(&switcher, 0), shown("1"));
    assert!(!switcher.is_transitioning());

    switcher.set_segue_factory(None);
    let page2 = switcher.select_page("2").unwrap().await.unwrap();
    assert!(page2.started());
    assert_eq!(study(&switcher, 1), shown("2"));
}

#[tokio::test]
async fn test_segue_context_describes_both_pages() {
    let switcher = switcher();
    switcher
        .select_page(PageSpec::new("1").with_id("list").with_data(json!({ "scroll": 3 })))
        .unwrap()
        .await
        .unwrap();

    let seen: Rc<RefCell<Vec<SegueContext>>> = Rc::default();
    let sink = Rc::clone(&seen);
    switcher.set_segue_factory(Some(segue_factory(move |ctx: &SegueContext| {
        sink.borrow_mut().push(ctx.clone());
        Ok(None)
    })));
    switcher
        .select_page(PageSpec::new("2").with_id("detail").with_data(json!({ "item": 9 })))
        .unwrap()
        .await
        .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    let ctx = &seen[0];
    assert_eq!(ctx.outgoing_id.as_deref(), Some("list"));
    assert_eq!(ctx.outgoing_template_name.as_deref(), Some("1"));
    assert_eq!(ctx.outgoing_data, json!({ "scroll": 3 }));
    assert_eq!(ctx.id.as_deref(), Some("detail"));
    assert_eq!(ctx.template_name.as_deref(), Some("2"));
    assert_eq!(ctx.incoming_data, json!({ "item": 9 }));
    assert_eq!(ctx.data, json!({ "item": 9 }));
}

#[tokio::test]
async fn test_remove_listener() {
    let switcher = switcher();
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    let id = switcher.on_page_event(move |_| counter.set(counter.get() + 1));

    switcher.select_page("1").unwrap().await.unwrap();
    assert_eq!(count.get(), 2);

    assert!(switcher.remove_page_event_listener(id));
    assert!(!switcher.remove_page_event_listener(id));
    switcher.select_page("2").unwrap().await.unwrap();
    assert_eq!(count.get(), 2);
}

#[tokio::test]
async fn test_finished_channel_tracks_last_change() {
    let switcher = switcher();
    let finished = switcher.finished();
    assert_eq!(*finished.borrow(), None);

    let ret = switcher.select_page("1").unwrap().await.unwrap();
    assert_eq!(*finished.borrow(), Some(ret));
}

#[tokio::test]
async fn test_disconnected_switcher_holds_changes() {
    let switcher = switcher();
    switcher.disconnect();
    assert!(!switcher.is_connected());
    assert!(!switcher.is_initial_render());

    let mut first = switcher.select_page("1").unwrap();
    let mut second = switcher.select_page("2").unwrap();
    assert_eq!(first.try_result(), Some(Ok(PageChange::Skipped)));
    assert_eq!(second.try_result(), None);
    assert!(switcher.container().stage().is_empty());

    switcher.connect();
    assert!(switcher.is_initial_render());
    assert!(second.try_result().unwrap().unwrap().started());
    assert_eq!(study(&switcher, 0), shown("2"));
}

#[tokio::test]
async fn test_initial_render_reaches_factory_and_events() {
    let switcher = switcher();
    let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
    let factory_seen = Rc::clone(&seen);
    switcher.set_segue_factory(Some(segue_factory(move |ctx: &SegueContext| {
        factory_seen.borrow_mut().push(ctx.initial_render);
        assert_eq!(ctx.template_name.as_deref(), Some(ctx.id.as_deref().unwrap_or_default()));
        assert!(ctx.incoming.is_some());
        Ok(None)
    })));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    switcher.on_page_event(move |event| sink.borrow_mut().push(event.initial_render));

    switcher.select_page("1").unwrap().await.unwrap();
    switcher.frame_rendered();
    switcher.select_page("2").unwrap().await.unwrap();

    assert_eq!(*seen.borrow(), vec![true, false]);
    assert_eq!(*events.borrow(), vec![true, true, false, false, false, false]);
}
