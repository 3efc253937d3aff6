#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate fuzzy_quantile;
extern crate byteorder;

use std::io::Cursor;
use byteorder::{BigEndian, ReadBytesExt};
use fuzzy_quantile::{Config, FuzzyQuantile, Target};

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);

    // unbounded, construction rejects what is out of bounds
    let error: f64 = if let Ok(res) = cursor.read_f64::<BigEndian>() {
        res
    } else {
        return;
    };
    let quantile: f64 = if let Ok(res) = cursor.read_f64::<BigEndian>() {
        res
    } else {
        return;
    };
    // bounded 2**16
    let max_batch: usize = if let Ok(res) = cursor.read_u16::<BigEndian>() {
        res as usize
    } else {
        return;
    };

    let mut conf = Config::biased(error).with_max_batch(max_batch);
    if let Ok(target) = Target::new(quantile, error) {
        conf.quantiles.push(target);
    }
    let mut fq = match FuzzyQuantile::new(conf) {
        Ok(fq) => fq,
        Err(_) => return,
    };

    while let Ok(v) = cursor.read_f64::<BigEndian>() {
        fq.insert(v);
    }
    fq.sync();

    let count = fq.count();
    assert_eq!(count, fq.size() as u64 + fq.removed());
    for p in &[0.0, 0.25, 0.5, 0.75, 0.99, 1.0] {
        if let Ok(v) = fq.query(*p) {
            assert!(fq.min().unwrap() <= v && v <= fq.max().unwrap());
        }
    }
});
