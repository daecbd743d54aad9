use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use bindy::{Callback, EventHost, InMemoryHost, Observable, Off};
use bindy_events::{Event, HostHandler};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_callback(counter: &Arc<AtomicUsize>) -> Callback {
    let counter = Arc::clone(counter);
    Callback::new(move |_, _, _| {
        counter.fetch_add(1, Ordering::Relaxed);
    })
}

/// Baseline: the same fan-out installed straight on the host, no wrappers.
fn bench_trigger_raw_vs_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigger");

    for listeners in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("raw_host", listeners), &listeners, |b, &n| {
            let host = Arc::new(InMemoryHost::new());
            let instance = Observable::new(host.clone());
            let counter = Arc::new(AtomicUsize::new(0));
            for _ in 0..n {
                let counter = Arc::clone(&counter);
                let handler: HostHandler = Arc::new(move |_: &mut Event, _: &[Value]| {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
                host.subscribe(instance.id(), "click", handler);
            }
            b.iter(|| host.fire(black_box(instance.id()), "click", Event::triggered(), &[]));
        });

        group.bench_with_input(BenchmarkId::new("bound", listeners), &listeners, |b, &n| {
            let host = Arc::new(InMemoryHost::new());
            let instance = Observable::new(host);
            let counter = Arc::new(AtomicUsize::new(0));
            for _ in 0..n {
                instance.on(("click", counting_callback(&counter)));
            }
            let args = [json!(1)];
            b.iter(|| {
                instance.trigger_with("click", black_box(&args));
            });
        });
    }

    group.finish();
}

fn bench_bind_unbind(c: &mut Criterion) {
    let host = Arc::new(InMemoryHost::new());
    let instance = Observable::new(host);
    let counter = Arc::new(AtomicUsize::new(0));
    let callback = counting_callback(&counter);

    c.bench_function("on_off_three_names", |b| {
        b.iter(|| {
            instance
                .on((black_box("click touch tap"), &callback))
                .off(&callback);
        })
    });

    c.bench_function("one_trigger", |b| {
        b.iter(|| {
            instance.one(("click", &callback)).trigger("click");
        })
    });

    instance.off(Off::Purge);
}

criterion_group!(benches, bench_trigger_raw_vs_bound, bench_bind_unbind);
criterion_main!(benches);
