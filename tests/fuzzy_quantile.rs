mod integration {
    mod fuzzy_quantile {
        extern crate fuzzy_quantile;
        extern crate rand;

        use self::fuzzy_quantile::{Config, Error, FuzzyQuantile, Target};
        use self::rand::rngs::StdRng;
        use self::rand::seq::SliceRandom;
        use self::rand::SeedableRng;

        fn shuffled(n: u32, seed: u64) -> Vec<f64> {
            let mut data: Vec<f64> = (0..n).map(f64::from).collect();
            let mut rng = StdRng::seed_from_u64(seed);
            data.shuffle(&mut rng);
            data
        }

        fn targets() -> Vec<Target> {
            vec![
                Target::new(0.5, 0.01).unwrap(),
                Target::new(0.8, 0.001).unwrap(),
                Target::new(0.95, 0.0001).unwrap(),
            ]
        }

        fn check_targets(n: u32) {
            let mut fq = FuzzyQuantile::new(Config::targeted(targets())).unwrap();
            for v in shuffled(n, 0x5eed) {
                fq.insert(v);
            }
            fq.sync();
            assert_eq!(u64::from(n), fq.count());

            let n = f64::from(n);
            for t in targets() {
                let v = fq.query(t.quantile()).unwrap();
                let expected = t.quantile() * n;
                assert!(
                    (v - expected).abs() <= t.error() * n,
                    "q: {} v: {} expected: {}",
                    t.quantile(),
                    v,
                    expected
                );
            }
        }

        #[test]
        fn biased_median() {
            let mut fq = FuzzyQuantile::new(Config::default()).unwrap();
            for v in shuffled(1_000_000, 42) {
                fq.insert(v);
            }
            fq.sync();

            assert_eq!(1_000_000, fq.count());
            let median = fq.query(0.5).unwrap();
            assert!((median - 500_000.0).abs() <= 10_000.0, "median: {}", median);
            assert!(fq.size() < 10_000, "size: {}", fq.size());
        }

        #[test]
        fn targeted_quantiles() {
            check_targets(1_000_000);
        }

        #[test]
        #[ignore]
        fn targeted_quantiles_ten_million() {
            check_targets(10_000_000);
        }

        #[test]
        fn query_errors() {
            let mut fq = FuzzyQuantile::new(Config::default()).unwrap();
            assert_eq!(Err(Error::EmptyStore), fq.query(0.5));

            fq.insert(1.0);
            fq.sync();
            assert_eq!(
                Err(Error::InvalidArgument { percentile: 1.5 }),
                fq.query(1.5)
            );
        }

        #[test]
        fn reset_is_idempotent() {
            let mut fq = FuzzyQuantile::new(Config::default()).unwrap();
            for v in shuffled(10_000, 7) {
                fq.insert(v);
            }
            fq.sync();

            fq.reset();
            fq.reset();
            assert_eq!(0, fq.count());
            assert_eq!(0, fq.buffered());
            assert_eq!(Err(Error::EmptyStore), fq.query(0.5));

            for v in shuffled(1_000, 8) {
                fq.insert(v);
            }
            fq.sync();
            assert_eq!(1_000, fq.count());
            assert_eq!(Some(0.0), fq.min());
            assert_eq!(Some(999.0), fq.max());
        }

        #[test]
        fn count_never_decreases() {
            let mut fq = FuzzyQuantile::new(Config::biased(0.05)).unwrap();
            let mut last = 0;
            for (i, v) in shuffled(20_000, 3).into_iter().enumerate() {
                fq.insert(v);
                if i % 1_000 == 0 {
                    fq.wait();
                    let count = fq.count();
                    assert!(count >= last);
                    last = count;
                }
            }
            fq.sync();
            assert_eq!(20_000, fq.count());
            assert_eq!(20_000, fq.size() as u64 + fq.removed());
        }

        #[test]
        fn nan_is_ignored() {
            let mut fq = FuzzyQuantile::new(Config::default()).unwrap();
            fq.insert(::std::f64::NAN);
            fq.insert(2.0);
            fq.insert(::std::f64::NAN);
            fq.sync();
            assert_eq!(1, fq.count());
            assert_eq!(Some(2.0), fq.min());
        }

        #[test]
        fn describe_storage() {
            let mut fq = FuzzyQuantile::new(Config::default()).unwrap();
            for v in shuffled(120, 9) {
                fq.insert(v);
            }
            fq.wait();
            let desc = fq.describe();
            assert!(desc.starts_with("\nstorage stat:\n"), "{}", desc);
            assert!(desc.contains("buf size: 50\n"), "{}", desc);
            assert!(desc.contains("buf use: 20\n"), "{}", desc);
            assert!(desc.contains("total 100\n"), "{}", desc);
        }

        #[test]
        fn dropped_with_outstanding_values() {
            let mut fq = FuzzyQuantile::new(Config::biased(0.001)).unwrap();
            for v in shuffled(100_000, 11) {
                fq.insert(v);
            }
            drop(fq);
        }
    }

    mod diagnostics {
        extern crate fuzzy_quantile;
        extern crate tracing;

        use self::fuzzy_quantile::{Config, FuzzyQuantile};
        use self::tracing::span::{Attributes, Id, Record};
        use self::tracing::{Dispatch, Event, Metadata, Subscriber};
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        #[derive(Debug, Default)]
        struct Counter {
            events: Arc<AtomicUsize>,
            spans: AtomicUsize,
        }

        impl Subscriber for Counter {
            fn enabled(&self, _: &Metadata) -> bool {
                true
            }

            fn new_span(&self, _: &Attributes) -> Id {
                Id::from_u64(self.spans.fetch_add(1, Ordering::Relaxed) as u64 + 1)
            }

            fn record(&self, _: &Id, _: &Record) {}

            fn record_follows_from(&self, _: &Id, _: &Id) {}

            fn event(&self, _: &Event) {
                self.events.fetch_add(1, Ordering::Relaxed);
            }

            fn enter(&self, _: &Id) {}

            fn exit(&self, _: &Id) {}
        }

        #[test]
        fn diagnostics_reach_injected_sink() {
            let counter = Counter::default();
            let events = Arc::clone(&counter.events);
            let conf = Config::default().with_dispatch(Dispatch::new(counter));

            let mut fq = FuzzyQuantile::new(conf).unwrap();
            assert!(events.load(Ordering::Relaxed) >= 1);

            let before = events.load(Ordering::Relaxed);
            for i in 0..100 {
                fq.insert(f64::from(i));
            }
            fq.sync();
            // two merges and a flush
            assert!(events.load(Ordering::Relaxed) >= before + 3);
        }

        #[test]
        fn diagnostics_discarded_by_default() {
            let mut fq = FuzzyQuantile::new(Config::default()).unwrap();
            for i in 0..100 {
                fq.insert(f64::from(i));
            }
            fq.sync();
            assert_eq!(100, fq.count());
        }
    }
}
